use std::path::Path;

use chrono::Weekday;
use serde::Deserialize;

use crate::aggregate::UNKNOWN_NAME;
use crate::error::{ReportError, Result};
use crate::models::EntityKind;
use crate::ranking::TieBreak;
use crate::week::WeekRule;

pub const ENV_PREFIX: &str = "MENTION_REPORTS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub week_start: Weekday,
    pub first_week_min_days: u32,
    pub unknown_name: String,
    pub tie_break: TieBreak,
    pub entity_kind: EntityKind,
    pub default_ranking_limit: i64,
    pub default_trend_periods: usize,
    pub catalog_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let rule = WeekRule::default();
        Self {
            week_start: rule.week_start,
            first_week_min_days: rule.first_week_min_days,
            unknown_name: UNKNOWN_NAME.to_string(),
            tie_break: TieBreak::FirstSeen,
            entity_kind: EntityKind::Instructor,
            default_ranking_limit: 10,
            default_trend_periods: 8,
            catalog_days: 30,
        }
    }
}

impl Settings {
    /// Layers an optional TOML file and `MENTION_REPORTS_*` environment
    /// variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=7).contains(&self.first_week_min_days) {
            return Err(ReportError::InvalidSetting(format!(
                "first_week_min_days must be within 1..=7, got {}",
                self.first_week_min_days
            )));
        }
        if self.default_ranking_limit <= 0 {
            return Err(ReportError::InvalidSetting(
                "default_ranking_limit must be positive".to_string(),
            ));
        }
        if self.default_trend_periods == 0 || self.catalog_days == 0 {
            return Err(ReportError::InvalidSetting(
                "default_trend_periods and catalog_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn week_rule(&self) -> WeekRule {
        WeekRule {
            week_start: self.week_start,
            first_week_min_days: self.first_week_min_days,
        }
    }
}
