pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{FilterCriteria, ForecastMethod, ForecastSettings};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    self, validate_date_order, validate_file_extension, validate_path, validate_range,
};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "sales-dash")]
#[command(about = "Sales dashboard pipeline: filter, aggregate and forecast supermarket sales")]
pub struct CliConfig {
    /// CSV export of the sales sheet
    #[arg(long, default_value = "data/supermarket_sales.csv")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Restrict to these cities (default: all)
    #[arg(long, value_delimiter = ',')]
    pub city: Vec<String>,

    /// Restrict to these customer types (default: all)
    #[arg(long, value_delimiter = ',')]
    pub customer_type: Vec<String>,

    /// Restrict to these genders (default: all)
    #[arg(long, value_delimiter = ',')]
    pub gender: Vec<String>,

    /// Inclusive start of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Inclusive end of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Days to forecast beyond the last date in the selection
    #[arg(long, default_value = "3")]
    pub periods: usize,

    /// Forecast method: holt-winters or ses
    #[arg(long, default_value = "holt-winters")]
    pub method: String,

    /// Season length in days for the seasonal component
    #[arg(long, default_value = "7")]
    pub season_length: usize,

    /// How many product lines the top-N chart keeps
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process resource usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn filters(&self) -> FilterCriteria {
        FilterCriteria {
            cities: self.city.clone(),
            customer_types: self.customer_type.clone(),
            genders: self.gender.clone(),
            date_range: match (self.start_date, self.end_date) {
                (Some(start), Some(end)) => Some((start, end)),
                (Some(start), None) => Some((start, NaiveDate::MAX)),
                (None, Some(end)) => Some((NaiveDate::MIN, end)),
                (None, None) => None,
            },
        }
    }

    fn forecast_settings(&self) -> ForecastSettings {
        ForecastSettings {
            periods: self.periods,
            method: self
                .method
                .parse()
                .unwrap_or(ForecastMethod::HoltWinters),
            season_length: self.season_length,
            ..Default::default()
        }
    }

    fn top_n(&self) -> usize {
        self.top_n
    }

    fn max_records(&self) -> Option<usize> {
        None
    }
}

#[cfg(feature = "cli")]
impl validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &["csv"])?;
        validate_path("output_path", &self.output_path)?;
        validate_range("periods", self.periods, 1, 365)?;
        validate_range("season_length", self.season_length, 2, 90)?;
        validate_range("top_n", self.top_n, 1, 100)?;
        validate_date_order("date range", self.start_date, self.end_date)?;

        self.method.parse::<ForecastMethod>().map_err(|reason| {
            crate::utils::error::DashError::InvalidConfigValueError {
                field: "method".to_string(),
                value: self.method.clone(),
                reason,
            }
        })?;

        Ok(())
    }
}
