use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Ranking limit must be positive, got {0}")]
    InvalidLimit(i64),

    #[error("Week number must be within 1..=53, got {0}")]
    InvalidWeek(u32),

    #[error("Month must be within 1..=12, got {0}")]
    InvalidMonth(u32),

    #[error(
        "Trend period count must be within 1..={max}, got {0}",
        max = crate::trend::MAX_TREND_PERIODS
    )]
    InvalidPeriodCount(usize),

    #[error("Date arithmetic left the supported calendar range near {0}")]
    DateOutOfRange(NaiveDate),

    #[error("Year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Failed to read facts from CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Fact source failed: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
