use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column headers the sales sheet must carry, in dataset order.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "Invoice ID",
    "Branch",
    "City",
    "Customer_type",
    "Gender",
    "Product line",
    "Unit price",
    "Quantity",
    "Tax 5%",
    "Total",
    "Date",
    "Time",
    "Payment",
    "cogs",
    "gross margin percentage",
    "gross income",
    "Rating",
];

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

mod sheet_date {
    use super::{parse_date, NaiveDate};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable date: {:?}", raw)))
    }
}

mod sheet_time {
    use super::{parse_time, NaiveTime};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable time: {:?}", raw)))
    }
}

/// One row of the supermarket sales sheet (columns B:R).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Invoice ID")]
    pub invoice_id: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Customer_type")]
    pub customer_type: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Product line")]
    pub product_line: String,
    #[serde(rename = "Unit price")]
    pub unit_price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Tax 5%")]
    pub tax: f64,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "Date", with = "sheet_date")]
    pub date: NaiveDate,
    #[serde(rename = "Time", with = "sheet_time")]
    pub time: NaiveTime,
    #[serde(rename = "Payment")]
    pub payment: String,
    #[serde(rename = "cogs")]
    pub cogs: f64,
    #[serde(rename = "gross margin percentage")]
    pub gross_margin_percentage: f64,
    #[serde(rename = "gross income")]
    pub gross_income: f64,
    #[serde(rename = "Rating")]
    pub rating: f64,
}

impl SalesRecord {
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Sidebar selection. An empty list leaves that dimension unrestricted,
/// matching the dashboard's "all selected" default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub cities: Vec<String>,
    pub customer_types: Vec<String>,
    pub genders: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl FilterCriteria {
    pub fn is_unrestricted(&self) -> bool {
        self.cities.is_empty()
            && self.customer_types.is_empty()
            && self.genders.is_empty()
            && self.date_range.is_none()
    }

    /// All populated dimensions must match (set intersection).
    pub fn matches(&self, record: &SalesRecord) -> bool {
        let in_dim = |selected: &[String], value: &str| {
            selected.is_empty() || selected.iter().any(|s| s.trim() == value.trim())
        };

        if !in_dim(&self.cities, &record.city) {
            return false;
        }
        if !in_dim(&self.customer_types, &record.customer_type) {
            return false;
        }
        if !in_dim(&self.genders, &record.gender) {
            return false;
        }
        if let Some((start, end)) = self.date_range {
            if record.date < start || record.date > end {
                return false;
            }
        }
        true
    }
}

/// Regular daily series: one value per day starting at `start`, gaps
/// zero-filled. This is the forecasting input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSeries {
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl SalesSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.start + chrono::Days::new(self.values.len() as u64 - 1))
        }
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.start + chrono::Days::new(i as u64), v))
    }
}

/// Headline numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiSummary {
    pub record_count: usize,
    pub total_sales: f64,
    pub average_rating: f64,
    pub star_count: u32,
    pub average_sale_per_transaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourTotal {
    pub hour: u32,
    pub total: f64,
}

/// Hour-of-day rows against Monday..Sunday columns, zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub hours: Vec<u32>,
    pub weekdays: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Chart-ready aggregations; the presentation layer renders these as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub sales_by_product_line: Vec<CategoryTotal>,
    pub top_product_lines: Vec<CategoryTotal>,
    pub sales_by_hour: Vec<HourTotal>,
    pub hour_weekday_heatmap: HeatmapData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(with = "sheet_date")]
    pub date: NaiveDate,
    pub forecast: f64,
}

/// Everything the transform phase produces for one pipeline run.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub records: Vec<SalesRecord>,
    pub kpis: KpiSummary,
    pub charts: ChartData,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    HoltWinters,
    Ses,
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMethod::HoltWinters => write!(f, "holt-winters"),
            ForecastMethod::Ses => write!(f, "ses"),
        }
    }
}

impl FromStr for ForecastMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "holt-winters" | "holtwinters" | "hw" => Ok(ForecastMethod::HoltWinters),
            "ses" | "exponential" => Ok(ForecastMethod::Ses),
            other => Err(format!(
                "unknown forecast method '{}' (expected holt-winters or ses)",
                other
            )),
        }
    }
}

/// Forecast knobs shared by both config front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSettings {
    pub periods: usize,
    pub method: ForecastMethod,
    pub season_length: usize,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            periods: 3,
            method: ForecastMethod::HoltWinters,
            season_length: 7,
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.1,
        }
    }
}
