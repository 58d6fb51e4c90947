use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::models::{DailyFact, EntityId, EntityKind, PeriodWindow};

/// Storage-side collaborator that hands out already-scored daily facts.
///
/// Implementations should return a consistent snapshot per call; the
/// reporting code never writes back.
pub trait FactSource {
    fn facts_in_range(
        &self,
        kind: EntityKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyFact>>;

    fn facts_for_period(&self, kind: EntityKind, period: &PeriodWindow) -> Result<Vec<DailyFact>> {
        self.facts_in_range(kind, period.start_date, period.end_date)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFactSource {
    facts: Vec<DailyFact>,
}

impl InMemoryFactSource {
    pub fn new(facts: Vec<DailyFact>) -> Self {
        Self { facts }
    }

    pub fn from_csv(path: &Path) -> Result<Self> {
        Ok(Self::new(load_csv(path)?))
    }

    pub fn push(&mut self, fact: DailyFact) {
        self.facts.push(fact);
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FactSource for InMemoryFactSource {
    fn facts_in_range(
        &self,
        kind: EntityKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyFact>> {
        Ok(self
            .facts
            .iter()
            .filter(|f| f.entity_kind == kind && f.date >= start_date && f.date <= end_date)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    entity_kind: EntityKind,
    entity_id: EntityId,
    date: NaiveDate,
    mention_count: Option<i64>,
    positive_count: Option<i64>,
    negative_count: Option<i64>,
    neutral_count: Option<i64>,
    recommendation_count: Option<i64>,
    avg_sentiment_score: Option<f64>,
    entity_name: Option<String>,
    parent_id: Option<EntityId>,
    parent_group_name: Option<String>,
    subject_name: Option<String>,
}

impl From<CsvRow> for DailyFact {
    fn from(row: CsvRow) -> Self {
        DailyFact {
            entity_kind: row.entity_kind,
            entity_id: row.entity_id,
            date: row.date,
            mention_count: row.mention_count,
            positive_count: row.positive_count,
            negative_count: row.negative_count,
            neutral_count: row.neutral_count,
            recommendation_count: row.recommendation_count,
            avg_sentiment_score: row.avg_sentiment_score,
            entity_name: row.entity_name.filter(|s| !s.is_empty()),
            parent_id: row.parent_id,
            parent_group_name: row.parent_group_name.filter(|s| !s.is_empty()),
            subject_name: row.subject_name.filter(|s| !s.is_empty()),
        }
    }
}

/// Reads facts from a headed CSV file. Empty cells become absent values.
pub fn load_csv(path: &Path) -> Result<Vec<DailyFact>> {
    let reader = csv::Reader::from_path(path)?;
    let facts = read_facts(reader)?;
    info!(path = %path.display(), facts = facts.len(), "loaded facts from CSV");
    Ok(facts)
}

pub fn read_facts<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<DailyFact>> {
    let mut facts = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        facts.push(result?.into());
    }
    Ok(facts)
}
