use crate::domain::model::{DashboardReport, FilterCriteria, ForecastSettings, SalesRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn filters(&self) -> FilterCriteria;
    fn forecast_settings(&self) -> ForecastSettings;
    fn top_n(&self) -> usize;
    fn max_records(&self) -> Option<usize>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SalesRecord>>;
    async fn transform(&self, data: Vec<SalesRecord>) -> Result<DashboardReport>;
    async fn load(&self, report: DashboardReport) -> Result<String>;
}
