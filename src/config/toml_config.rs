use crate::domain::model::{parse_date, FilterCriteria, ForecastMethod, ForecastSettings};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{
    validate_date_order, validate_file_extension, validate_non_empty_string, validate_path,
    validate_range, validate_smoothing_parameter, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub filters: Option<FiltersConfig>,
    pub forecast: Option<ForecastConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub cities: Option<Vec<String>>,
    pub customer_types: Option<Vec<String>>,
    pub genders: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub periods: Option<usize>,
    pub method: Option<String>,
    pub season_length: Option<usize>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values.
    /// Unset variables are left in place so validation can flag them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashError::ProcessingError {
            message: format!("env substitution pattern failed to compile: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validate_path("source.path", &self.source.path)?;
        validate_file_extension("source.path", &self.source.path, &["csv"])?;
        validate_path("load.output_path", &self.load.output_path)?;

        if let Some(max_records) = self.source.max_records {
            validate_range("source.max_records", max_records, 1, usize::MAX)?;
        }

        if let Some(filters) = &self.filters {
            let start = Self::parse_filter_date("filters.start_date", &filters.start_date)?;
            let end = Self::parse_filter_date("filters.end_date", &filters.end_date)?;
            validate_date_order("filters.date_range", start, end)?;
        }

        if let Some(forecast) = &self.forecast {
            if let Some(periods) = forecast.periods {
                validate_range("forecast.periods", periods, 1, 365)?;
            }
            if let Some(season_length) = forecast.season_length {
                validate_range("forecast.season_length", season_length, 2, 90)?;
            }
            if let Some(method) = &forecast.method {
                method.parse::<ForecastMethod>().map_err(|reason| {
                    DashError::InvalidConfigValueError {
                        field: "forecast.method".to_string(),
                        value: method.clone(),
                        reason,
                    }
                })?;
            }
            for (field, value) in [
                ("forecast.alpha", forecast.alpha),
                ("forecast.beta", forecast.beta),
                ("forecast.gamma", forecast.gamma),
            ] {
                if let Some(value) = value {
                    validate_smoothing_parameter(field, value)?;
                }
            }
        }

        Ok(())
    }

    fn parse_filter_date(
        field: &str,
        value: &Option<String>,
    ) -> Result<Option<chrono::NaiveDate>> {
        match value {
            None => Ok(None),
            Some(raw) => parse_date(raw).map(Some).ok_or_else(|| {
                DashError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: raw.clone(),
                    reason: "Expected a date like 2019-01-05".to_string(),
                }
            }),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn filters(&self) -> FilterCriteria {
        let Some(filters) = &self.filters else {
            return FilterCriteria::default();
        };

        // validate_config has already vetted the date strings.
        let start = filters.start_date.as_deref().and_then(parse_date);
        let end = filters.end_date.as_deref().and_then(parse_date);

        FilterCriteria {
            cities: filters.cities.clone().unwrap_or_default(),
            customer_types: filters.customer_types.clone().unwrap_or_default(),
            genders: filters.genders.clone().unwrap_or_default(),
            date_range: match (start, end) {
                (Some(start), Some(end)) => Some((start, end)),
                (Some(start), None) => Some((start, chrono::NaiveDate::MAX)),
                (None, Some(end)) => Some((chrono::NaiveDate::MIN, end)),
                (None, None) => None,
            },
        }
    }

    fn forecast_settings(&self) -> ForecastSettings {
        let defaults = ForecastSettings::default();
        let Some(forecast) = &self.forecast else {
            return defaults;
        };

        ForecastSettings {
            periods: forecast.periods.unwrap_or(defaults.periods),
            method: forecast
                .method
                .as_deref()
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.method),
            season_length: forecast.season_length.unwrap_or(defaults.season_length),
            alpha: forecast.alpha.unwrap_or(defaults.alpha),
            beta: forecast.beta.unwrap_or(defaults.beta),
            gamma: forecast.gamma.unwrap_or(defaults.gamma),
        }
    }

    fn top_n(&self) -> usize {
        self.load.top_n.unwrap_or(10)
    }

    fn max_records(&self) -> Option<usize> {
        self.source.max_records
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "supermarket-dashboard"
description = "Sales dashboard pipeline"
version = "1.0.0"

[source]
path = "data/supermarket_sales.csv"
max_records = 1000

[filters]
cities = ["Yangon", "Mandalay"]
start_date = "2019-01-01"
end_date = "2019-03-30"

[forecast]
periods = 7
method = "holt-winters"

[load]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "supermarket-dashboard");
        assert_eq!(config.input_path(), "data/supermarket_sales.csv");
        assert_eq!(config.max_records(), Some(1000));

        let criteria = config.filters();
        assert_eq!(criteria.cities.len(), 2);
        assert!(criteria.genders.is_empty());
        assert!(criteria.date_range.is_some());

        let settings = config.forecast_settings();
        assert_eq!(settings.periods, 7);
        assert_eq!(settings.method, ForecastMethod::HoltWinters);
        assert_eq!(settings.season_length, 7); // default
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_SALES_INPUT", "data/march.csv");

        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
path = "${TEST_SALES_INPUT}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path(), "data/march.csv");

        std::env::remove_var("TEST_SALES_INPUT");
    }

    #[test]
    fn test_config_validation_rejects_bad_method() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
path = "data/sales.csv"

[forecast]
method = "prophet"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_reversed_dates() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
path = "data/sales.csv"

[filters]
start_date = "2019-03-30"
end_date = "2019-01-01"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_bad_alpha() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
path = "data/sales.csv"

[forecast]
alpha = 1.5

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
description = "File test"
version = "1.0"

[source]
path = "data/sales.csv"

[load]
output_path = "./output"

[monitoring]
enabled = true
log_format = "json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
        assert!(config.monitoring_enabled());
        assert!(config.json_logging());
    }
}
