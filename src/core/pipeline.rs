use crate::core::{aggregate, forecast};
use crate::domain::model::REQUIRED_COLUMNS;
use crate::domain::{ConfigProvider, DashboardReport, Pipeline, SalesRecord, Storage};
use crate::utils::error::{DashError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const REPORT_FILENAME: &str = "dashboard_report.zip";

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn records_to_csv<T: serde::Serialize>(records: &[T]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in records {
            writer.serialize(record)?;
        }
        writer
            .into_inner()
            .map_err(|e| DashError::ProcessingError {
                message: format!("failed to flush CSV buffer: {}", e),
            })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SalesRecord>> {
        let path = self.config.input_path();
        tracing::debug!("Reading sales sheet from: {}", path);
        let data = self.storage.read_file(path).await?;

        let mut reader = csv::Reader::from_reader(data.as_slice());

        // Fail up front with every missing column, not just the first
        // serde complains about.
        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(DashError::MissingColumnsError {
                columns: missing.join(", "),
            });
        }

        let cap = self.config.max_records().unwrap_or(usize::MAX);
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: SalesRecord = row?;
            records.push(record);
            if records.len() >= cap {
                tracing::warn!("Input truncated at {} records", cap);
                break;
            }
        }

        tracing::debug!("Parsed {} sales records", records.len());
        Ok(records)
    }

    async fn transform(&self, data: Vec<SalesRecord>) -> Result<DashboardReport> {
        let criteria = self.config.filters();
        let total = data.len();

        let records: Vec<SalesRecord> = if criteria.is_unrestricted() {
            data
        } else {
            data.into_iter().filter(|r| criteria.matches(r)).collect()
        };
        tracing::info!("Filter kept {} of {} records", records.len(), total);

        let kpis = aggregate::kpi_summary(&records);
        let charts = aggregate::chart_data(&records, self.config.top_n());

        let forecast = match aggregate::resample_daily(&records) {
            Some(series) => {
                let settings = self.config.forecast_settings();
                tracing::debug!(
                    "Forecasting {} periods ({}) over a {}-day series",
                    settings.periods,
                    settings.method,
                    series.len()
                );
                forecast::forecast_sales(&series, &settings)?
            }
            None => {
                tracing::warn!("No records left after filtering, skipping forecast");
                Vec::new()
            }
        };

        Ok(DashboardReport {
            records,
            kpis,
            charts,
            forecast,
        })
    }

    async fn load(&self, report: DashboardReport) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), REPORT_FILENAME);

        let filtered_csv = Self::records_to_csv(&report.records)?;
        let kpis_json = serde_json::to_string_pretty(&report.kpis)?;
        let charts_json = serde_json::to_string_pretty(&report.charts)?;

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("filtered.csv", FileOptions::default())?;
            zip.write_all(&filtered_csv)?;

            zip.start_file::<_, ()>("kpis.json", FileOptions::default())?;
            zip.write_all(kpis_json.as_bytes())?;

            zip.start_file::<_, ()>("charts.json", FileOptions::default())?;
            zip.write_all(charts_json.as_bytes())?;

            if !report.forecast.is_empty() {
                zip.start_file::<_, ()>("forecast.csv", FileOptions::default())?;
                let forecast_csv = Self::records_to_csv(&report.forecast)?;
                zip.write_all(&forecast_csv)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report bundle ({} bytes)", zip_data.len());
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FilterCriteria, ForecastSettings};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DashError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: String,
        filters: FilterCriteria,
        forecast: ForecastSettings,
        top_n: usize,
        max_records: Option<usize>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                input_path: "sales.csv".to_string(),
                output_path: "test_output".to_string(),
                filters: FilterCriteria::default(),
                forecast: ForecastSettings::default(),
                top_n: 10,
                max_records: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn filters(&self) -> FilterCriteria {
            self.filters.clone()
        }

        fn forecast_settings(&self) -> ForecastSettings {
            self.forecast.clone()
        }

        fn top_n(&self) -> usize {
            self.top_n
        }

        fn max_records(&self) -> Option<usize> {
            self.max_records
        }
    }

    fn header() -> String {
        REQUIRED_COLUMNS.join(",")
    }

    fn row(city: &str, customer_type: &str, gender: &str, date: &str, total: f64) -> String {
        format!(
            "750-67-8428,A,{city},{customer_type},{gender},Health and beauty,{unit_price},2,{tax},{total},{date},13:08,Cash,{cogs},4.76,{tax},7.0",
            unit_price = total / 2.0,
            tax = total * 0.05,
            cogs = total * 0.95,
        )
    }

    fn sample_csv(rows: &[String]) -> String {
        let mut lines = vec![header()];
        lines.extend(rows.iter().cloned());
        lines.join("\n")
    }

    async fn pipeline_with_csv(
        csv: &str,
        config: MockConfig,
    ) -> (MockStorage, DashboardPipeline<MockStorage, MockConfig>) {
        let storage = MockStorage::new();
        storage.put_file("sales.csv", csv.as_bytes()).await;
        let pipeline = DashboardPipeline::new(storage.clone(), config);
        (storage, pipeline)
    }

    #[tokio::test]
    async fn test_extract_row_count_matches_file() {
        let csv = sample_csv(&[
            row("Yangon", "Member", "Female", "1/5/2019", 100.0),
            row("Mandalay", "Normal", "Male", "1/6/2019", 200.0),
            row("Naypyitaw", "Member", "Male", "1/7/2019", 300.0),
        ]);
        let (_, pipeline) = pipeline_with_csv(&csv, MockConfig::new()).await;

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].city, "Yangon");
        assert_eq!(
            records[0].date,
            NaiveDate::from_ymd_opt(2019, 1, 5).unwrap()
        );
    }

    #[tokio::test]
    async fn test_extract_reports_all_missing_columns() {
        let csv = "Invoice ID,Branch,City\n750-67-8428,A,Yangon";
        let (_, pipeline) = pipeline_with_csv(csv, MockConfig::new()).await;

        let err = pipeline.extract().await.unwrap_err();
        match err {
            DashError::MissingColumnsError { columns } => {
                assert!(columns.contains("Date"));
                assert!(columns.contains("Total"));
                assert!(columns.contains("Gender"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_rejects_unparseable_date() {
        let csv = sample_csv(&[row("Yangon", "Member", "Female", "not-a-date", 100.0)]);
        let (_, pipeline) = pipeline_with_csv(&csv, MockConfig::new()).await;

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, DashError::CsvError(_)));
        assert!(err.to_string().contains("unparseable date"));
    }

    #[tokio::test]
    async fn test_extract_honors_max_records() {
        let csv = sample_csv(&[
            row("Yangon", "Member", "Female", "1/5/2019", 100.0),
            row("Yangon", "Member", "Female", "1/6/2019", 100.0),
            row("Yangon", "Member", "Female", "1/7/2019", 100.0),
        ]);
        let config = MockConfig {
            max_records: Some(2),
            ..MockConfig::new()
        };
        let (_, pipeline) = pipeline_with_csv(&csv, config).await;

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_transform_applies_intersection_of_criteria() {
        let csv = sample_csv(&[
            row("Yangon", "Member", "Female", "1/5/2019", 100.0),
            row("Yangon", "Normal", "Female", "1/6/2019", 200.0),
            row("Mandalay", "Member", "Female", "1/7/2019", 300.0),
        ]);
        let config = MockConfig {
            filters: FilterCriteria {
                cities: vec!["Yangon".to_string()],
                customer_types: vec!["Member".to_string()],
                genders: vec![],
                date_range: None,
            },
            ..MockConfig::new()
        };
        let (_, pipeline) = pipeline_with_csv(&csv, config).await;

        let records = pipeline.extract().await.unwrap();
        let report = pipeline.transform(records).await.unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].city, "Yangon");
        assert_eq!(report.records[0].customer_type, "Member");
        assert_eq!(report.kpis.total_sales, 100.0);
    }

    #[tokio::test]
    async fn test_transform_empty_selection_yields_zero_kpis_and_no_forecast() {
        let csv = sample_csv(&[row("Yangon", "Member", "Female", "1/5/2019", 100.0)]);
        let config = MockConfig {
            filters: FilterCriteria {
                cities: vec!["Naypyitaw".to_string()],
                ..Default::default()
            },
            ..MockConfig::new()
        };
        let (_, pipeline) = pipeline_with_csv(&csv, config).await;

        let records = pipeline.extract().await.unwrap();
        let report = pipeline.transform(records).await.unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.kpis.record_count, 0);
        assert_eq!(report.kpis.total_sales, 0.0);
        assert!(report.forecast.is_empty());
    }

    #[tokio::test]
    async fn test_transform_produces_forecast_for_requested_periods() {
        let rows: Vec<String> = (1..=20)
            .map(|day| row("Yangon", "Member", "Female", &format!("1/{}/2019", day), 150.0))
            .collect();
        let csv = sample_csv(&rows);
        let config = MockConfig {
            forecast: ForecastSettings {
                periods: 5,
                ..Default::default()
            },
            ..MockConfig::new()
        };
        let (_, pipeline) = pipeline_with_csv(&csv, config).await;

        let records = pipeline.extract().await.unwrap();
        let report = pipeline.transform(records).await.unwrap();

        assert_eq!(report.forecast.len(), 5);
        assert_eq!(
            report.forecast[0].date,
            NaiveDate::from_ymd_opt(2019, 1, 21).unwrap()
        );
        // Constant daily sales forecast the same constant.
        for point in &report.forecast {
            assert!((point.forecast - 150.0).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_load_writes_full_bundle() {
        let csv = sample_csv(&[
            row("Yangon", "Member", "Female", "1/5/2019", 100.0),
            row("Yangon", "Member", "Female", "1/6/2019", 200.0),
        ]);
        let (storage, pipeline) = pipeline_with_csv(&csv, MockConfig::new()).await;

        let records = pipeline.extract().await.unwrap();
        let report = pipeline.transform(records).await.unwrap();
        let output_path = pipeline.load(report).await.unwrap();

        assert_eq!(output_path, "test_output/dashboard_report.zip");

        let zip_data = storage.get_file(&output_path).await.unwrap();
        let cursor = std::io::Cursor::new(zip_data);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(
            file_names,
            vec!["charts.json", "filtered.csv", "forecast.csv", "kpis.json"]
        );

        // KPI JSON round-trips and carries the expected totals.
        let kpis_content = {
            let mut file = archive.by_name("kpis.json").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        let kpis: crate::domain::model::KpiSummary = serde_json::from_str(&kpis_content).unwrap();
        assert_eq!(kpis.record_count, 2);
        assert_eq!(kpis.total_sales, 300.0);
    }

    #[tokio::test]
    async fn test_load_omits_forecast_file_when_empty() {
        let storage = MockStorage::new();
        let pipeline = DashboardPipeline::new(storage.clone(), MockConfig::new());

        let report = DashboardReport {
            records: vec![],
            kpis: Default::default(),
            charts: aggregate::chart_data(&[], 10),
            forecast: vec![],
        };

        let output_path = pipeline.load(report).await.unwrap();
        let zip_data = storage.get_file(&output_path).await.unwrap();
        let cursor = std::io::Cursor::new(zip_data);
        let archive = zip::ZipArchive::new(cursor).unwrap();

        assert_eq!(archive.len(), 3); // no forecast.csv
    }
}
