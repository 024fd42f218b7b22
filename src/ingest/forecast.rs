//! Optional forecast append.
//!
//! The modeling pipeline drops a `monthly_forecasts.csv` next to the
//! cleaned data with `Forecast_Month` (day-first dates) and
//! `Predicted_Visits` columns. Only years strictly after the latest
//! historical year are appended, flagged `is_forecast`, so reruns of the
//! model never shadow recorded history.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use super::schema;
use crate::model::{IngestError, VisitRecord};

/// Append forecast rows from `path` to `records`, returning how many
/// were added. A missing file is not an error.
pub fn append_forecasts(records: &mut Vec<VisitRecord>, path: &str) -> Result<usize, IngestError> {
    if !Path::new(path).exists() {
        return Ok(0);
    }

    let latest_year = match records.iter().map(|r| r.year).max() {
        Some(y) => y,
        None => return Ok(0),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let forecast_month = col("Forecast_Month");
    let predicted = col("Predicted_Visits").or_else(|| col("Recreation Visits"));
    let park = col("Park");
    let unit_code = col("Unit Code");
    let park_type = col("Park Type");
    let region = col("Region");
    let state = col("State");
    let year_col = col("Year");
    let month_col = col("Month");

    let mut appended = 0usize;
    let mut dropped = 0usize;
    for row in reader.records() {
        let record = match row {
            Ok(r) => r,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        // Forecast_Month wins over any Year/Month columns when present.
        let (year, month) = match forecast_month {
            Some(_) => match parse_forecast_month(field(forecast_month)) {
                Some(pair) => pair,
                None => {
                    dropped += 1;
                    continue;
                }
            },
            None => {
                let y = schema::parse_integer(field(year_col));
                let m = schema::parse_integer(field(month_col));
                match (y, m) {
                    (Some(y), Some(m)) => (y as i32, m as u32),
                    _ => {
                        dropped += 1;
                        continue;
                    }
                }
            }
        };

        if year <= latest_year {
            continue;
        }

        let visits = match parse_predicted_visits(field(predicted)) {
            Some(v) => v,
            None => {
                dropped += 1;
                continue;
            }
        };

        records.push(VisitRecord {
            park: field(park).to_string(),
            unit_code: field(unit_code).to_string(),
            park_type: field(park_type).to_string(),
            region: field(region).to_string(),
            state: field(state).to_string(),
            year,
            month,
            recreation_visits: visits,
            is_forecast: true,
        });
        appended += 1;
    }

    if dropped > 0 {
        warn!("{}: dropped {} unusable forecast rows", path, dropped);
    }
    if appended > 0 {
        info!(
            "Appended {} forecast rows for years after {}",
            appended, latest_year
        );
    }
    Ok(appended)
}

/// Day-first dates like "01-07-2026", with an ISO fallback.
fn parse_forecast_month(raw: &str) -> Option<(i32, u32)> {
    let date = NaiveDate::parse_from_str(raw, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some((date.year(), date.month()))
}

/// Model output is fractional; counts are rounded to whole visits.
fn parse_predicted_visits(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as i64)
}
