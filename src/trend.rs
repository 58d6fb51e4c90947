use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::round_half_up;
use crate::error::{ReportError, Result};
use crate::models::{EntityId, PeriodSummary, PeriodWindow};
use crate::week::WeekCalculator;

/// Weeks a wrapped-back week number is shifted by when it drops below 1.
/// Years with 53 weeks lose their last week from trailing windows.
pub const WEEKS_PER_YEAR_WRAP: i64 = 52;

/// Longest trailing window, in weeks, a trend may ask for.
pub const MAX_TREND_PERIODS: usize = 520;

/// The `count` weeks ending with the week that contains `reference_date`,
/// oldest first.
pub fn trailing_weeks(
    calculator: &WeekCalculator,
    reference_date: NaiveDate,
    count: usize,
) -> Result<Vec<PeriodWindow>> {
    if count == 0 || count > MAX_TREND_PERIODS {
        return Err(ReportError::InvalidPeriodCount(count));
    }
    let span = i64::try_from(count).map_err(|_| ReportError::InvalidPeriodCount(count))?;
    let (current_year, current_week) = calculator.current_week(reference_date)?;

    let mut windows = Vec::with_capacity(count);
    for back in (0..span).rev() {
        let mut year = current_year;
        let mut week = i64::from(current_week) - back;
        while week <= 0 {
            year -= 1;
            week += WEEKS_PER_YEAR_WRAP;
        }
        windows.push(calculator.week_window(year, week as u32)?);
    }

    if let (Some(first), Some(last)) = (windows.first(), windows.last()) {
        debug!(
            count,
            first = %first.label,
            last = %last.label,
            "resolved trailing week window"
        );
    }
    Ok(windows)
}

/// Builds chronological series of summaries. Periods without data are left
/// out, so a series can be shorter than the window it was asked for.
#[derive(Debug, Clone)]
pub struct TrendAssembler {
    unknown_name: String,
}

impl TrendAssembler {
    pub fn new(unknown_name: impl Into<String>) -> Self {
        Self {
            unknown_name: unknown_name.into(),
        }
    }

    /// `periods` must be ordered oldest first.
    pub fn assemble<F>(
        &self,
        entity_id: EntityId,
        periods: &[PeriodWindow],
        mut lookup: F,
    ) -> Result<Vec<PeriodSummary>>
    where
        F: FnMut(EntityId, &PeriodWindow) -> Result<Option<PeriodSummary>>,
    {
        let mut series = Vec::with_capacity(periods.len());
        for period in periods {
            match lookup(entity_id, period)? {
                Some(summary) => series.push(summary),
                None => debug!(entity_id, period = %period.label, "no data for period"),
            }
        }
        Ok(series)
    }

    /// Series for a parent group: each period's child summaries are merged
    /// into one point before being appended.
    pub fn assemble_parent<F>(
        &self,
        parent_id: EntityId,
        periods: &[PeriodWindow],
        mut children: F,
    ) -> Result<Vec<PeriodSummary>>
    where
        F: FnMut(EntityId, &PeriodWindow) -> Result<Vec<PeriodSummary>>,
    {
        self.assemble(parent_id, periods, |id, period| {
            let members = children(id, period)?;
            Ok(self.merge_children(id, period, &members))
        })
    }

    /// Sums the children's counts into a synthetic summary for the parent.
    /// The name comes from the first child's group label.
    pub fn merge_children(
        &self,
        parent_id: EntityId,
        period: &PeriodWindow,
        children: &[PeriodSummary],
    ) -> Option<PeriodSummary> {
        let first = children.first()?;

        let scored: Vec<f64> = children
            .iter()
            .filter(|c| c.sentiment_days > 0)
            .map(|c| c.avg_sentiment_score)
            .collect();
        let avg_sentiment_score = if scored.is_empty() {
            0.0
        } else {
            round_half_up(scored.iter().sum::<f64>() / scored.len() as f64, 2)
        };

        Some(PeriodSummary {
            entity_id: parent_id,
            entity_name: first
                .parent_group_name
                .clone()
                .unwrap_or_else(|| self.unknown_name.clone()),
            parent_id: None,
            parent_group_name: None,
            subject_name: None,
            period_type: period.period_type,
            start_date: period.start_date,
            end_date: period.end_date,
            mention_count: children.iter().map(|c| c.mention_count).sum(),
            positive_count: children.iter().map(|c| c.positive_count).sum(),
            negative_count: children.iter().map(|c| c.negative_count).sum(),
            neutral_count: children.iter().map(|c| c.neutral_count).sum(),
            recommendation_count: children.iter().map(|c| c.recommendation_count).sum(),
            avg_sentiment_score,
            contributing_days: children.iter().map(|c| c.contributing_days).sum(),
            sentiment_days: children.iter().map(|c| c.sentiment_days).sum(),
            daily_distribution: None,
            mention_change_rate: None,
            sentiment_trend: None,
        })
    }
}

impl Default for TrendAssembler {
    fn default() -> Self {
        Self::new(crate::aggregate::UNKNOWN_NAME)
    }
}
