use crate::domain::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting dashboard pipeline");

        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} sales records", records.len());
        self.monitor.log_phase("Extract", records.len());

        let report = self.pipeline.transform(records).await?;
        tracing::info!(
            "Selection: {} records, total sales {:.2}, {} forecast periods",
            report.kpis.record_count,
            report.kpis.total_sales,
            report.forecast.len()
        );
        self.monitor.log_phase("Transform", report.kpis.record_count);

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Report bundle written to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
