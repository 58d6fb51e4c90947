use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::aggregate::{distinct_parents, PeriodAggregator};
use crate::error::Result;
use crate::models::{
    CurrentPeriod, DayOption, EntityId, EntityKind, MonthOption, ParentWeeklyStats,
    PeriodCatalog, PeriodReport, PeriodSummary, PeriodWindow, RankedSummary, WeekInfo,
    WeeklyDigest,
};
use crate::ranking::{validate_limit, RankingEngine};
use crate::settings::Settings;
use crate::source::FactSource;
use crate::trend::{trailing_weeks, TrendAssembler};
use crate::week::{day_label, shift_days, WeekCalculator};

/// Entry point for every report query. Each call resolves its calendar
/// window, pulls that window's facts from the source and folds them; nothing
/// is cached between calls.
///
/// Parent-scoped queries always read instructor facts, whatever kind the
/// facade is bound to: academies are the parents, instructors their members.
pub struct ReportFacade<S> {
    source: S,
    kind: EntityKind,
    calendar: WeekCalculator,
    aggregator: PeriodAggregator,
    ranking: RankingEngine,
    trends: TrendAssembler,
    catalog_days: u32,
}

impl<S: FactSource> ReportFacade<S> {
    pub fn new(source: S) -> Self {
        Self::with_settings(source, &Settings::default())
    }

    pub fn with_settings(source: S, settings: &Settings) -> Self {
        Self {
            source,
            kind: settings.entity_kind,
            calendar: WeekCalculator::new(settings.week_rule()),
            aggregator: PeriodAggregator::new(settings.unknown_name.clone(), settings.tie_break),
            ranking: RankingEngine::new(settings.tie_break),
            trends: TrendAssembler::new(settings.unknown_name.clone()),
            catalog_days: settings.catalog_days,
        }
    }

    pub fn for_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn calendar(&self) -> &WeekCalculator {
        &self.calendar
    }

    pub fn daily_report(&self, date: NaiveDate) -> Result<PeriodReport> {
        let window = self.calendar.day_window(date);
        info!(kind = ?self.kind, %date, "building daily report");
        self.report_for(&window)
    }

    /// Weekly report with each summary's change against the previous week.
    pub fn weekly_report(&self, year: i32, week: u32) -> Result<PeriodReport> {
        info!(kind = ?self.kind, year, week, "building weekly report");
        let (report, _) = self.week_with_previous(self.kind, year, week)?;
        Ok(report)
    }

    pub fn monthly_report(&self, year: i32, month: u32) -> Result<PeriodReport> {
        let window = self.calendar.month_window(year, month)?;
        info!(kind = ?self.kind, year, month, "building monthly report");
        self.report_for(&window)
    }

    /// Top `limit` entities of a week. Entities without mentions are dropped
    /// before ranking.
    pub fn ranking_for_week(
        &self,
        year: i32,
        week: u32,
        limit: i64,
    ) -> Result<Vec<RankedSummary>> {
        validate_limit(limit)?;
        let report = self.weekly_report(year, week)?;
        let mentioned = report
            .summaries
            .into_iter()
            .filter(|s| s.mention_count > 0)
            .collect();
        self.ranking.rank_numbered(mentioned, limit)
    }

    /// Ranking of one parent group's members for a week.
    pub fn parent_ranking(
        &self,
        year: i32,
        week: u32,
        parent_id: EntityId,
        limit: i64,
    ) -> Result<Vec<RankedSummary>> {
        validate_limit(limit)?;
        info!(year, week, parent_id, limit, "building parent ranking");
        let (report, _) = self.week_with_previous(EntityKind::Instructor, year, week)?;
        let members = report
            .summaries
            .into_iter()
            .filter(|s| s.parent_id == Some(parent_id))
            .collect();
        self.ranking.rank_numbered(members, limit)
    }

    /// Weekly series for one entity over the `period_count` weeks ending with
    /// the week of `reference_date`. Weeks without facts are skipped.
    pub fn entity_trend(
        &self,
        entity_id: EntityId,
        period_count: usize,
        reference_date: NaiveDate,
    ) -> Result<Vec<PeriodSummary>> {
        let windows = trailing_weeks(&self.calendar, reference_date, period_count)?;
        info!(kind = ?self.kind, entity_id, period_count, "building entity trend");

        self.trends.assemble(entity_id, &windows, |id, window| {
            let facts: Vec<_> = self
                .source
                .facts_for_period(self.kind, window)?
                .into_iter()
                .filter(|f| f.entity_id == id)
                .collect();
            let refs: Vec<_> = facts.iter().collect();
            Ok(self.aggregator.summarize_entity(
                window.period_type,
                window.start_date,
                window.end_date,
                &refs,
            ))
        })
    }

    /// Weekly series for a parent group, merging its members per week.
    pub fn parent_trend(
        &self,
        parent_id: EntityId,
        period_count: usize,
        reference_date: NaiveDate,
    ) -> Result<Vec<PeriodSummary>> {
        let windows = trailing_weeks(&self.calendar, reference_date, period_count)?;
        info!(parent_id, period_count, "building parent trend");

        self.trends.assemble_parent(parent_id, &windows, |id, window| {
            let facts: Vec<_> = self
                .source
                .facts_for_period(EntityKind::Instructor, window)?
                .into_iter()
                .filter(|f| f.parent_id == Some(id))
                .collect();
            Ok(self.aggregator.summarize(
                window.period_type,
                window.start_date,
                window.end_date,
                &facts,
            ))
        })
    }

    /// Weekly digest: global totals, distinct parents and change against
    /// the previous week.
    pub fn period_summary_of_summaries(&self, year: i32, week: u32) -> Result<WeeklyDigest> {
        info!(kind = ?self.kind, year, week, "building weekly digest");
        let (report, previous) = self.week_with_previous(self.kind, year, week)?;
        let mut digest = self
            .aggregator
            .digest(&report, year, week, Some(previous.total_mentions));

        if self.kind != EntityKind::Instructor {
            let window = self.calendar.week_window(year, week)?;
            let members = self.report_for_kind(EntityKind::Instructor, &window)?;
            digest.total_parents = distinct_parents(&members.summaries);
        }
        Ok(digest)
    }

    /// Per-parent roll-up of one week's instructor summaries.
    pub fn parent_weekly_stats(&self, year: i32, week: u32) -> Result<Vec<ParentWeeklyStats>> {
        let window = self.calendar.week_window(year, week)?;
        info!(year, week, "building parent weekly stats");
        let report = self.report_for_kind(EntityKind::Instructor, &window)?;
        Ok(self.aggregator.parent_stats(&report, year, week))
    }

    pub fn current_week_info(&self, reference_date: NaiveDate) -> Result<WeekInfo> {
        let (year, week) = self.calendar.current_week(reference_date)?;
        let window = self.calendar.week_window(year, week)?;
        Ok(WeekInfo {
            year,
            week,
            week_label: window.label,
            start_date: window.start_date,
            end_date: window.end_date,
        })
    }

    /// Periods a caller can pick from, newest first.
    pub fn available_periods(&self, reference_date: NaiveDate) -> Result<PeriodCatalog> {
        let mut daily = Vec::with_capacity(self.catalog_days as usize);
        for back in 0..i64::from(self.catalog_days) {
            let date = shift_days(reference_date, -back)?;
            daily.push(DayOption {
                date,
                label: day_label(date),
            });
        }

        let (week_year, current_week) = self.calendar.current_week(reference_date)?;
        let weekly = (1..=current_week)
            .rev()
            .map(|week| self.calendar.week_window(week_year, week))
            .collect::<Result<Vec<_>>>()?;

        let year = reference_date.year();
        let monthly = (1..=reference_date.month())
            .rev()
            .map(|month| MonthOption {
                year,
                month,
                label: format!("{year}-{month:02}"),
            })
            .collect();

        Ok(PeriodCatalog {
            daily,
            weekly,
            monthly,
            current: CurrentPeriod {
                year,
                month: reference_date.month(),
                week_year,
                week: current_week,
                date: reference_date,
            },
        })
    }

    fn report_for(&self, window: &PeriodWindow) -> Result<PeriodReport> {
        self.report_for_kind(self.kind, window)
    }

    fn report_for_kind(&self, kind: EntityKind, window: &PeriodWindow) -> Result<PeriodReport> {
        let facts = self.source.facts_for_period(kind, window)?;
        Ok(self.aggregator.aggregate_window(window, &facts))
    }

    /// The week's report, compared against the calendar-previous week, and
    /// that previous week's report.
    fn week_with_previous(
        &self,
        kind: EntityKind,
        year: i32,
        week: u32,
    ) -> Result<(PeriodReport, PeriodReport)> {
        let window = self.calendar.week_window(year, week)?;
        let (previous_year, previous_week) = self.calendar.previous_week(year, week)?;
        let previous_window = self.calendar.week_window(previous_year, previous_week)?;

        let mut report = self.report_for_kind(kind, &window)?;
        let previous = self.report_for_kind(kind, &previous_window)?;
        self.aggregator.compare_with_previous(&mut report, &previous);
        Ok((report, previous))
    }
}
