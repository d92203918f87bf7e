pub mod aggregate;
pub mod engine;
pub mod forecast;
pub mod pipeline;

pub use crate::domain::model::{DashboardReport, SalesRecord, SalesSeries};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
