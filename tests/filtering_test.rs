//! Filter semantics exercised through the full pipeline: every populated
//! criterion must hold at once, and unrestricted dimensions pass everything.

use chrono::NaiveDate;
use sales_dash::domain::ports::Pipeline;
use sales_dash::{CliConfig, DashboardPipeline, LocalStorage};
use tempfile::TempDir;

const HEADER: &str = "Invoice ID,Branch,City,Customer_type,Gender,Product line,Unit price,Quantity,Tax 5%,Total,Date,Time,Payment,cogs,gross margin percentage,gross income,Rating";

fn sales_row(city: &str, customer_type: &str, gender: &str, date: &str, total: f64) -> String {
    format!(
        "750-67-8428,A,{city},{customer_type},{gender},Health and beauty,{unit_price},2,{tax},{total},{date},13:08,Cash,{cogs},4.76,{tax},7.0",
        unit_price = total / 2.0,
        tax = total * 0.05,
        cogs = total * 0.95,
    )
}

fn fixture() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let rows = vec![
        sales_row("Yangon", "Member", "Female", "1/5/2019", 100.0),
        sales_row("Yangon", "Member", "Male", "1/6/2019", 200.0),
        sales_row("Yangon", "Normal", "Female", "1/7/2019", 300.0),
        sales_row("Mandalay", "Member", "Female", "1/8/2019", 400.0),
        sales_row("Naypyitaw", "Normal", "Male", "2/1/2019", 500.0),
    ];
    let mut lines = vec![HEADER.to_string()];
    lines.extend(rows);
    let path = temp_dir.path().join("sales.csv");
    std::fs::write(&path, lines.join("\n")).unwrap();
    let input = path.to_str().unwrap().to_string();
    (temp_dir, input)
}

fn config(input: &str, output: &str) -> CliConfig {
    CliConfig {
        input: input.to_string(),
        output_path: output.to_string(),
        city: vec![],
        customer_type: vec![],
        gender: vec![],
        start_date: None,
        end_date: None,
        periods: 3,
        method: "holt-winters".to_string(),
        season_length: 7,
        top_n: 10,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_unrestricted_filter_keeps_every_row() {
    let (temp_dir, input) = fixture();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let pipeline = DashboardPipeline::new(LocalStorage::default(), config(&input, &output));
    let records = pipeline.extract().await.unwrap();
    assert_eq!(records.len(), 5);

    let report = pipeline.transform(records).await.unwrap();
    assert_eq!(report.records.len(), 5);
    assert_eq!(report.kpis.total_sales, 1500.0);
}

#[tokio::test]
async fn test_all_criteria_intersect() {
    let (temp_dir, input) = fixture();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let mut cfg = config(&input, &output);
    cfg.city = vec!["Yangon".to_string()];
    cfg.customer_type = vec!["Member".to_string()];
    cfg.gender = vec!["Female".to_string()];

    let pipeline = DashboardPipeline::new(LocalStorage::default(), cfg);
    let records = pipeline.extract().await.unwrap();
    let report = pipeline.transform(records).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let survivor = &report.records[0];
    assert_eq!(survivor.city, "Yangon");
    assert_eq!(survivor.customer_type, "Member");
    assert_eq!(survivor.gender, "Female");
}

#[tokio::test]
async fn test_multi_value_dimension_is_a_union_within_the_dimension() {
    let (temp_dir, input) = fixture();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let mut cfg = config(&input, &output);
    cfg.city = vec!["Yangon".to_string(), "Mandalay".to_string()];

    let pipeline = DashboardPipeline::new(LocalStorage::default(), cfg);
    let records = pipeline.extract().await.unwrap();
    let report = pipeline.transform(records).await.unwrap();

    assert_eq!(report.records.len(), 4);
    assert!(report.records.iter().all(|r| r.city != "Naypyitaw"));
}

#[tokio::test]
async fn test_date_range_bounds_are_inclusive() {
    let (temp_dir, input) = fixture();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let mut cfg = config(&input, &output);
    cfg.start_date = NaiveDate::from_ymd_opt(2019, 1, 6);
    cfg.end_date = NaiveDate::from_ymd_opt(2019, 1, 8);

    let pipeline = DashboardPipeline::new(LocalStorage::default(), cfg);
    let records = pipeline.extract().await.unwrap();
    let report = pipeline.transform(records).await.unwrap();

    assert_eq!(report.records.len(), 3);
    let dates: Vec<NaiveDate> = report.records.iter().map(|r| r.date).collect();
    assert!(dates.contains(&NaiveDate::from_ymd_opt(2019, 1, 6).unwrap()));
    assert!(dates.contains(&NaiveDate::from_ymd_opt(2019, 1, 8).unwrap()));
}

#[tokio::test]
async fn test_charts_reflect_only_the_selection() {
    let (temp_dir, input) = fixture();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let mut cfg = config(&input, &output);
    cfg.city = vec!["Naypyitaw".to_string()];

    let pipeline = DashboardPipeline::new(LocalStorage::default(), cfg);
    let records = pipeline.extract().await.unwrap();
    let report = pipeline.transform(records).await.unwrap();

    assert_eq!(report.charts.sales_by_product_line.len(), 1);
    assert_eq!(report.charts.sales_by_product_line[0].total, 500.0);
    assert_eq!(report.kpis.record_count, 1);
}
