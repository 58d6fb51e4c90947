use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub type EntityId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Instructor,
    Academy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
        }
    }
}

/// One entity's pre-scored counts for a single calendar day.
///
/// Counts that are `None` contribute zero to sums; a `None` sentiment score
/// is left out of the average entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFact {
    #[serde(default)]
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    pub date: NaiveDate,
    pub mention_count: Option<i64>,
    pub positive_count: Option<i64>,
    pub negative_count: Option<i64>,
    pub neutral_count: Option<i64>,
    pub recommendation_count: Option<i64>,
    pub avg_sentiment_score: Option<f64>,
    pub entity_name: Option<String>,
    pub parent_id: Option<EntityId>,
    pub parent_group_name: Option<String>,
    pub subject_name: Option<String>,
}

impl DailyFact {
    pub fn new(entity_id: EntityId, date: NaiveDate) -> Self {
        Self {
            entity_kind: EntityKind::Instructor,
            entity_id,
            date,
            mention_count: None,
            positive_count: None,
            negative_count: None,
            neutral_count: None,
            recommendation_count: None,
            avg_sentiment_score: None,
            entity_name: None,
            parent_id: None,
            parent_group_name: None,
            subject_name: None,
        }
    }
}

/// A resolved calendar window: the "period descriptor" every report and
/// trend point is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub period_type: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub week: Option<u32>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub parent_id: Option<EntityId>,
    pub parent_group_name: Option<String>,
    pub subject_name: Option<String>,
    pub period_type: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub mention_count: i64,
    pub positive_count: i64,
    pub negative_count: i64,
    pub neutral_count: i64,
    pub recommendation_count: i64,
    pub avg_sentiment_score: f64,
    pub contributing_days: usize,
    pub sentiment_days: usize,
    /// Mentions per weekday, in date order. Weekly summaries only.
    pub daily_distribution: Option<Vec<WeekdayMentions>>,
    /// Percent change in mentions against the previous week.
    pub mention_change_rate: Option<f64>,
    /// Sentiment difference against the previous week.
    pub sentiment_trend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayMentions {
    pub weekday: Weekday,
    pub mention_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period_type: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub week: Option<u32>,
    pub period_label: Option<String>,
    pub total_entities: usize,
    pub total_mentions: i64,
    pub total_positive: i64,
    pub total_negative: i64,
    pub total_neutral: i64,
    pub avg_sentiment_score: f64,
    pub positive_ratio: i64,
    pub summaries: Vec<PeriodSummary>,
}

impl PeriodReport {
    pub fn apply_window(mut self, window: &PeriodWindow) -> Self {
        self.year = window.year;
        self.month = window.month;
        self.week = window.week;
        self.period_label = Some(window.label.clone());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSummary {
    pub rank: usize,
    #[serde(flatten)]
    pub summary: PeriodSummary,
}

/// Global roll-up of one week's per-entity summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyDigest {
    pub year: i32,
    pub week: u32,
    pub week_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_mentions: i64,
    pub total_positive: i64,
    pub total_negative: i64,
    pub total_recommendations: i64,
    pub total_entities: usize,
    pub total_parents: usize,
    pub avg_sentiment_score: f64,
    pub mention_change_rate: Option<f64>,
}

/// One parent group's week, rolled up from its members' summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentWeeklyStats {
    pub parent_id: EntityId,
    pub parent_name: String,
    pub year: i32,
    pub week: u32,
    pub week_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_mentions: i64,
    pub total_members_mentioned: usize,
    pub total_positive: i64,
    pub total_negative: i64,
    pub total_recommendations: i64,
    pub avg_sentiment_score: f64,
    pub top_member_id: Option<EntityId>,
    pub top_member_mentions: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekInfo {
    pub year: i32,
    pub week: u32,
    pub week_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOption {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthOption {
    pub year: i32,
    pub month: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPeriod {
    /// Calendar year of `date`; `month` belongs to it.
    pub year: i32,
    pub month: u32,
    /// Week-based year that `week` and the weekly options belong to. Differs
    /// from `year` around January 1.
    pub week_year: i32,
    pub week: u32,
    pub date: NaiveDate,
}

/// Selectable periods relative to a reference date, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCatalog {
    pub daily: Vec<DayOption>,
    pub weekly: Vec<PeriodWindow>,
    pub monthly: Vec<MonthOption>,
    pub current: CurrentPeriod,
}
