//! Exponential-smoothing forecasts over the resampled daily sales series.
//!
//! Holt-Winters (additive trend + additive seasonality) is the default.
//! Histories too short to support a component drop it rather than fail:
//! fewer than two full seasons loses the seasonal term, fewer than two
//! observations loses the trend and forecasts the flat smoothed level.

use crate::domain::model::{ForecastMethod, ForecastPoint, ForecastSettings, SalesSeries};
use crate::utils::error::{DashError, Result};

/// Additive Holt-Winters smoother.
pub struct HoltWinters {
    alpha: f64,
    beta: f64,
    gamma: f64,
    season_length: usize,
}

impl HoltWinters {
    pub fn new(settings: &ForecastSettings) -> Self {
        Self {
            alpha: settings.alpha,
            beta: settings.beta,
            gamma: settings.gamma,
            season_length: settings.season_length,
        }
    }

    pub fn forecast(&self, values: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if values.is_empty() {
            return Err(DashError::EmptySeriesError {
                reason: "series has no observations".to_string(),
            });
        }

        let m = self.season_length;
        if m >= 2 && values.len() >= 2 * m {
            Ok(self.triple(values, horizon))
        } else if values.len() >= 2 {
            tracing::debug!(
                "series too short for season length {}, dropping seasonal component",
                m
            );
            Ok(self.double(values, horizon))
        } else {
            tracing::debug!("single observation, forecasting flat level");
            Ok(vec![values[0]; horizon])
        }
    }

    /// Level + trend + seasonal. Requires at least two full seasons.
    fn triple(&self, values: &[f64], horizon: usize) -> Vec<f64> {
        let m = self.season_length;
        let seasons = values.len() / m;

        // Season means anchor the initial components.
        let season_mean = |k: usize| -> f64 {
            values[k * m..(k + 1) * m].iter().sum::<f64>() / m as f64
        };

        let mut level = season_mean(0);
        let mut trend = (0..m)
            .map(|i| (values[m + i] - values[i]) / m as f64)
            .sum::<f64>()
            / m as f64;

        let mut seasonals = vec![0.0; m];
        for (i, seasonal) in seasonals.iter_mut().enumerate() {
            *seasonal = (0..seasons)
                .map(|k| values[k * m + i] - season_mean(k))
                .sum::<f64>()
                / seasons as f64;
        }

        for (t, &value) in values.iter().enumerate() {
            let seasonal = seasonals[t % m];
            let prev_level = level;
            level = self.alpha * (value - seasonal) + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - prev_level) + (1.0 - self.beta) * trend;
            seasonals[t % m] = self.gamma * (value - level) + (1.0 - self.gamma) * seasonal;
        }

        (1..=horizon)
            .map(|h| level + h as f64 * trend + seasonals[(values.len() + h - 1) % m])
            .collect()
    }

    /// Holt's linear method: level + trend, no seasonal term.
    fn double(&self, values: &[f64], horizon: usize) -> Vec<f64> {
        let mut level = values[0];
        let mut trend = values[1] - values[0];

        for &value in &values[1..] {
            let prev_level = level;
            level = self.alpha * value + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - prev_level) + (1.0 - self.beta) * trend;
        }

        (1..=horizon).map(|h| level + h as f64 * trend).collect()
    }
}

/// Simple exponential smoothing: flat forecast at the smoothed level.
pub struct SimpleExponential {
    alpha: f64,
}

impl SimpleExponential {
    pub fn new(settings: &ForecastSettings) -> Self {
        Self {
            alpha: settings.alpha,
        }
    }

    pub fn forecast(&self, values: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if values.is_empty() {
            return Err(DashError::EmptySeriesError {
                reason: "series has no observations".to_string(),
            });
        }

        let mut level = values[0];
        for &value in &values[1..] {
            level = self.alpha * value + (1.0 - self.alpha) * level;
        }

        Ok(vec![level; horizon])
    }
}

pub fn forecast_values(values: &[f64], settings: &ForecastSettings) -> Result<Vec<f64>> {
    match settings.method {
        ForecastMethod::HoltWinters => HoltWinters::new(settings).forecast(values, settings.periods),
        ForecastMethod::Ses => SimpleExponential::new(settings).forecast(values, settings.periods),
    }
}

/// Point forecasts for the days following the end of `series`.
pub fn forecast_sales(series: &SalesSeries, settings: &ForecastSettings) -> Result<Vec<ForecastPoint>> {
    let values = forecast_values(&series.values, settings)?;
    let last = series.end().ok_or_else(|| DashError::EmptySeriesError {
        reason: "series has no observations".to_string(),
    })?;

    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, forecast)| ForecastPoint {
            date: last + chrono::Days::new(i as u64 + 1),
            forecast,
        })
        .collect())
}
