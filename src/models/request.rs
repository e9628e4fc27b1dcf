use super::document::{parse_date_key, DateKey};
use crate::error::{AppError, Result};
use chrono::Days;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inputs for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RunRequest {
    /// Keywords to aggregate; each becomes an independent job
    pub keywords: Vec<String>,

    /// Collection searched for matching documents
    #[validate(length(min = 1, max = 255))]
    pub source_collection: String,

    /// Collection the per-day records are written to
    #[validate(length(min = 1, max = 255))]
    pub destination_collection: String,

    /// Inclusive lower bound, ISO-8601
    pub start_date: String,

    /// Inclusive upper bound, ISO-8601
    pub end_date: String,
}

impl RunRequest {
    pub fn new(
        keywords: Vec<String>,
        source_collection: impl Into<String>,
        destination_collection: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            keywords,
            source_collection: source_collection.into(),
            destination_collection: destination_collection.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Request covering `[end - lookback_days, end]`.
    ///
    /// Fails with a validation error when the window start falls outside the
    /// representable date range.
    pub fn for_window(
        keywords: Vec<String>,
        source_collection: impl Into<String>,
        destination_collection: impl Into<String>,
        end: DateKey,
        lookback_days: u32,
    ) -> Result<Self> {
        let start = end
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "lookback of {} days before {} is out of range",
                    lookback_days, end
                ))
            })?;

        Ok(Self::new(
            keywords,
            source_collection,
            destination_collection,
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        ))
    }

    /// Validate collection names, keywords and the date window.
    ///
    /// The pipeline itself never rejects a request; this is for callers that
    /// want to fail fast on obviously bad input.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if let Some(position) = self.keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "keyword at position {} is blank",
                position
            )));
        }

        let start = parse_date_key(&self.start_date)
            .map_err(|e| AppError::Validation(format!("start_date: {}", e)))?;
        let end = parse_date_key(&self.end_date)
            .map_err(|e| AppError::Validation(format!("end_date: {}", e)))?;

        if start > end {
            return Err(AppError::Validation(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }

        Ok(())
    }
}
