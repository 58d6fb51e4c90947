use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::models::{PeriodSummary, RankedSummary};

/// How summaries with equal mention counts are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order the entities were first seen in.
    #[default]
    FirstSeen,
    /// Lower entity id first.
    EntityId,
}

/// Stable sort by `mention_count`, highest first.
pub fn order_by_mentions(summaries: &mut [PeriodSummary], tie_break: TieBreak) {
    summaries.sort_by(|a, b| compare(a, b, tie_break));
}

fn compare(a: &PeriodSummary, b: &PeriodSummary, tie_break: TieBreak) -> Ordering {
    let by_mentions = b.mention_count.cmp(&a.mention_count);
    match tie_break {
        TieBreak::FirstSeen => by_mentions,
        TieBreak::EntityId => by_mentions.then(a.entity_id.cmp(&b.entity_id)),
    }
}

pub fn validate_limit(limit: i64) -> Result<()> {
    if limit <= 0 {
        return Err(ReportError::InvalidLimit(limit));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    tie_break: TieBreak,
}

impl RankingEngine {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// At most `limit` summaries, most mentioned first. Zero-mention
    /// summaries stay eligible; callers filter them beforehand if needed.
    pub fn rank(
        &self,
        mut summaries: Vec<PeriodSummary>,
        limit: i64,
    ) -> Result<Vec<PeriodSummary>> {
        validate_limit(limit)?;
        order_by_mentions(&mut summaries, self.tie_break);
        summaries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(summaries)
    }

    /// Like [`rank`](Self::rank), with 1-based positions attached.
    pub fn rank_numbered(
        &self,
        summaries: Vec<PeriodSummary>,
        limit: i64,
    ) -> Result<Vec<RankedSummary>> {
        Ok(self
            .rank(summaries, limit)?
            .into_iter()
            .enumerate()
            .map(|(index, summary)| RankedSummary {
                rank: index + 1,
                summary,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodType;
    use chrono::NaiveDate;

    fn summary(entity_id: i64, mention_count: i64) -> PeriodSummary {
        let day = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        PeriodSummary {
            entity_id,
            entity_name: format!("entity-{entity_id}"),
            parent_id: None,
            parent_group_name: None,
            subject_name: None,
            period_type: PeriodType::Weekly,
            start_date: day,
            end_date: day,
            mention_count,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            recommendation_count: 0,
            avg_sentiment_score: 0.0,
            contributing_days: 1,
            sentiment_days: 0,
            daily_distribution: None,
            mention_change_rate: None,
            sentiment_trend: None,
        }
    }

    fn ids(summaries: &[PeriodSummary]) -> Vec<i64> {
        summaries.iter().map(|s| s.entity_id).collect()
    }

    #[test]
    fn limits_and_orders_descending() {
        let engine = RankingEngine::default();
        let input = vec![summary(1, 2), summary(2, 8), summary(3, 5), summary(4, 1)];
        let ranked = engine.rank(input, 3).unwrap();
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn non_positive_limit_is_rejected() {
        let engine = RankingEngine::default();
        assert!(matches!(
            engine.rank(vec![summary(1, 1)], 0),
            Err(ReportError::InvalidLimit(0))
        ));
        assert!(matches!(
            engine.rank(vec![], -3),
            Err(ReportError::InvalidLimit(-3))
        ));
    }

    #[test]
    fn zero_mentions_remain_eligible() {
        let engine = RankingEngine::default();
        let ranked = engine.rank(vec![summary(1, 0), summary(2, 0)], 10).unwrap();
        assert_eq!(ids(&ranked), vec![1, 2]);
    }

    #[test]
    fn ties_keep_input_order_unless_configured() {
        let input = vec![summary(5, 4), summary(3, 4), summary(9, 7)];
        let stable = RankingEngine::default().rank(input.clone(), 10).unwrap();
        assert_eq!(ids(&stable), vec![9, 5, 3]);

        let by_id = RankingEngine::new(TieBreak::EntityId).rank(input, 10).unwrap();
        assert_eq!(ids(&by_id), vec![9, 3, 5]);
    }

    #[test]
    fn numbering_starts_at_one() {
        let ranked = RankingEngine::default()
            .rank_numbered(vec![summary(1, 1), summary(2, 3)], 5)
            .unwrap();
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].summary.entity_id, 2);
        assert_eq!(ranked[1].rank, 2);
    }
}
