pub mod model;
pub mod ports;

pub use model::{
    DashboardReport, FilterCriteria, ForecastMethod, ForecastPoint, ForecastSettings,
    KpiSummary, SalesRecord, SalesSeries,
};
pub use ports::{ConfigProvider, Pipeline, Storage};
