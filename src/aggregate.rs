use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::models::{
    DailyFact, EntityId, ParentWeeklyStats, PeriodReport, PeriodSummary, PeriodType,
    PeriodWindow, WeekdayMentions, WeeklyDigest,
};
use crate::ranking::{order_by_mentions, TieBreak};

pub const UNKNOWN_NAME: &str = "Unknown";

/// Folds per-day facts into per-entity period summaries and a report over
/// all of them. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct PeriodAggregator {
    unknown_name: String,
    tie_break: TieBreak,
}

impl Default for PeriodAggregator {
    fn default() -> Self {
        Self::new(UNKNOWN_NAME, TieBreak::FirstSeen)
    }
}

impl PeriodAggregator {
    pub fn new(unknown_name: impl Into<String>, tie_break: TieBreak) -> Self {
        Self {
            unknown_name: unknown_name.into(),
            tie_break,
        }
    }

    /// Builds the report for `start..=end`. Facts dated outside the range are
    /// ignored; an empty input produces a zero-valued report.
    pub fn aggregate(
        &self,
        period_type: PeriodType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        facts: &[DailyFact],
    ) -> PeriodReport {
        let mut summaries = self.summarize(period_type, start_date, end_date, facts);
        order_by_mentions(&mut summaries, self.tie_break);

        let total_mentions = summaries.iter().map(|s| s.mention_count).sum();
        let total_positive = summaries.iter().map(|s| s.positive_count).sum();
        let total_negative = summaries.iter().map(|s| s.negative_count).sum();
        let total_neutral = summaries.iter().map(|s| s.neutral_count).sum();

        let avg_sentiment_score = if summaries.is_empty() {
            0.0
        } else {
            let sum: f64 = summaries.iter().map(|s| s.avg_sentiment_score).sum();
            round_half_up(sum / summaries.len() as f64, 2)
        };

        PeriodReport {
            period_type,
            start_date,
            end_date,
            year: None,
            month: None,
            week: None,
            period_label: None,
            total_entities: summaries.len(),
            total_mentions,
            total_positive,
            total_negative,
            total_neutral,
            avg_sentiment_score,
            positive_ratio: positive_ratio(total_positive, total_mentions),
            summaries,
        }
    }

    pub fn aggregate_window(&self, window: &PeriodWindow, facts: &[DailyFact]) -> PeriodReport {
        self.aggregate(window.period_type, window.start_date, window.end_date, facts)
            .apply_window(window)
    }

    /// One summary per entity, in first-seen order.
    pub fn summarize(
        &self,
        period_type: PeriodType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        facts: &[DailyFact],
    ) -> Vec<PeriodSummary> {
        let mut index: HashMap<EntityId, usize> = HashMap::new();
        let mut groups: Vec<Vec<&DailyFact>> = Vec::new();
        let mut skipped = 0usize;

        for fact in facts {
            if fact.date < start_date || fact.date > end_date {
                skipped += 1;
                continue;
            }
            let slot = *index.entry(fact.entity_id).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(fact);
        }

        debug!(
            entities = groups.len(),
            facts = facts.len(),
            skipped,
            %start_date,
            %end_date,
            "grouped facts by entity"
        );

        groups
            .iter()
            .filter_map(|group| self.summarize_entity(period_type, start_date, end_date, group))
            .collect()
    }

    /// Sums counts with absent values as zero and averages only the present
    /// sentiment scores. Labels come from the first fact.
    pub fn summarize_entity(
        &self,
        period_type: PeriodType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        facts: &[&DailyFact],
    ) -> Option<PeriodSummary> {
        let first = facts.first()?;

        let sum = |field: fn(&DailyFact) -> Option<i64>| -> i64 {
            facts.iter().map(|f| field(f).unwrap_or(0)).sum()
        };

        let scores: Vec<f64> = facts.iter().filter_map(|f| f.avg_sentiment_score).collect();
        let avg_sentiment_score = if scores.is_empty() {
            0.0
        } else {
            round_half_up(scores.iter().sum::<f64>() / scores.len() as f64, 2)
        };

        let daily_distribution = (period_type == PeriodType::Weekly).then(|| {
            let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
            for fact in facts {
                *by_day.entry(fact.date).or_insert(0) += fact.mention_count.unwrap_or(0);
            }
            by_day
                .into_iter()
                .map(|(day, mention_count)| WeekdayMentions {
                    weekday: day.weekday(),
                    mention_count,
                })
                .collect()
        });

        Some(PeriodSummary {
            entity_id: first.entity_id,
            entity_name: first
                .entity_name
                .clone()
                .unwrap_or_else(|| self.unknown_name.clone()),
            parent_id: first.parent_id,
            parent_group_name: first.parent_group_name.clone(),
            subject_name: first.subject_name.clone(),
            period_type,
            start_date,
            end_date,
            mention_count: sum(|f| f.mention_count),
            positive_count: sum(|f| f.positive_count),
            negative_count: sum(|f| f.negative_count),
            neutral_count: sum(|f| f.neutral_count),
            recommendation_count: sum(|f| f.recommendation_count),
            avg_sentiment_score,
            contributing_days: facts.len(),
            sentiment_days: scores.len(),
            daily_distribution,
            mention_change_rate: None,
            sentiment_trend: None,
        })
    }

    /// Fills each summary's week-over-week change from the matching entity in
    /// `previous`. Entities absent from `previous` keep `None`.
    pub fn compare_with_previous(&self, current: &mut PeriodReport, previous: &PeriodReport) {
        let earlier: HashMap<EntityId, &PeriodSummary> = previous
            .summaries
            .iter()
            .map(|s| (s.entity_id, s))
            .collect();

        for summary in &mut current.summaries {
            let Some(before) = earlier.get(&summary.entity_id) else {
                continue;
            };
            summary.mention_change_rate =
                mention_change_rate(summary.mention_count, before.mention_count);
            summary.sentiment_trend = (summary.mention_change_rate.is_some()
                && summary.sentiment_days > 0
                && before.sentiment_days > 0)
                .then(|| {
                    round_half_up(summary.avg_sentiment_score - before.avg_sentiment_score, 2)
                });
        }
    }

    /// Groups a weekly report's summaries by parent, in first-seen order.
    /// Summaries without a parent are left out.
    pub fn parent_stats(
        &self,
        report: &PeriodReport,
        year: i32,
        week: u32,
    ) -> Vec<ParentWeeklyStats> {
        let mut index: HashMap<EntityId, usize> = HashMap::new();
        let mut groups: Vec<(EntityId, Vec<&PeriodSummary>)> = Vec::new();
        for summary in &report.summaries {
            let Some(parent_id) = summary.parent_id else {
                continue;
            };
            let slot = *index.entry(parent_id).or_insert_with(|| {
                groups.push((parent_id, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(summary);
        }

        let week_label = report
            .period_label
            .clone()
            .unwrap_or_else(|| format!("{year} W{week}"));

        groups
            .into_iter()
            .map(|(parent_id, members)| {
                let scored: Vec<f64> = members
                    .iter()
                    .filter(|m| m.sentiment_days > 0)
                    .map(|m| m.avg_sentiment_score)
                    .collect();
                let avg_sentiment_score = if scored.is_empty() {
                    0.0
                } else {
                    round_half_up(scored.iter().sum::<f64>() / scored.len() as f64, 2)
                };

                // first member wins ties
                let top = members
                    .iter()
                    .copied()
                    .fold(None::<&PeriodSummary>, |best, m| match best {
                        Some(b) if b.mention_count >= m.mention_count => Some(b),
                        _ => Some(m),
                    })
                    .filter(|m| m.mention_count > 0);

                ParentWeeklyStats {
                    parent_id,
                    parent_name: members
                        .iter()
                        .find_map(|m| m.parent_group_name.clone())
                        .unwrap_or_else(|| self.unknown_name.clone()),
                    year,
                    week,
                    week_label: week_label.clone(),
                    start_date: report.start_date,
                    end_date: report.end_date,
                    total_mentions: members.iter().map(|m| m.mention_count).sum(),
                    total_members_mentioned: members
                        .iter()
                        .filter(|m| m.mention_count > 0)
                        .count(),
                    total_positive: members.iter().map(|m| m.positive_count).sum(),
                    total_negative: members.iter().map(|m| m.negative_count).sum(),
                    total_recommendations: members.iter().map(|m| m.recommendation_count).sum(),
                    avg_sentiment_score,
                    top_member_id: top.map(|m| m.entity_id),
                    top_member_mentions: top.map(|m| m.mention_count),
                }
            })
            .collect()
    }

    /// Rolls a weekly report up into a digest. `previous_mentions` is the
    /// prior week's total, used for the change rate.
    pub fn digest(
        &self,
        report: &PeriodReport,
        year: i32,
        week: u32,
        previous_mentions: Option<i64>,
    ) -> WeeklyDigest {
        let scored: Vec<f64> = report
            .summaries
            .iter()
            .filter(|s| s.sentiment_days > 0)
            .map(|s| s.avg_sentiment_score)
            .collect();
        let avg_sentiment_score = if scored.is_empty() {
            0.0
        } else {
            round_half_up(scored.iter().sum::<f64>() / scored.len() as f64, 4)
        };

        WeeklyDigest {
            year,
            week,
            week_label: report
                .period_label
                .clone()
                .unwrap_or_else(|| format!("{year} W{week}")),
            start_date: report.start_date,
            end_date: report.end_date,
            total_mentions: report.total_mentions,
            total_positive: report.total_positive,
            total_negative: report.total_negative,
            total_recommendations: report
                .summaries
                .iter()
                .map(|s| s.recommendation_count)
                .sum(),
            total_entities: report.total_entities,
            total_parents: distinct_parents(&report.summaries),
            avg_sentiment_score,
            mention_change_rate: previous_mentions
                .and_then(|previous| mention_change_rate(report.total_mentions, previous)),
        }
    }
}

pub fn distinct_parents(summaries: &[PeriodSummary]) -> usize {
    summaries
        .iter()
        .filter_map(|s| s.parent_id)
        .collect::<HashSet<EntityId>>()
        .len()
}

/// Rounds halves toward positive infinity, so 0.125 becomes 0.13 and
/// -0.125 becomes -0.12.
pub fn round_half_up(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

/// Whole-number share of positive mentions; zero when nothing was mentioned.
pub fn positive_ratio(total_positive: i64, total_mentions: i64) -> i64 {
    if total_mentions > 0 {
        (total_positive as f64 * 100.0 / total_mentions as f64 + 0.5).floor() as i64
    } else {
        0
    }
}

/// Percentage change against a positive previous count.
pub fn mention_change_rate(current: i64, previous: i64) -> Option<f64> {
    if previous > 0 {
        let change = (current - previous) as f64 / previous as f64 * 100.0;
        Some(round_half_up(change, 2))
    } else {
        None
    }
}
