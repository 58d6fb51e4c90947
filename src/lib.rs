//! Period roll-ups of per-day instructor and academy mention facts.
//!
//! Facts arrive already scored from a [`FactSource`]; [`ReportFacade`]
//! turns them into daily, weekly and monthly reports, weekly rankings,
//! trend series, weekly digests and per-group weekly stats. All calendar
//! handling goes through [`WeekCalculator`], and every operation takes its
//! reference date explicitly.

pub mod aggregate;
pub mod error;
pub mod facade;
pub mod models;
pub mod ranking;
pub mod render;
pub mod settings;
pub mod source;
pub mod trend;
pub mod week;

pub use aggregate::PeriodAggregator;
pub use error::{ReportError, Result};
pub use facade::ReportFacade;
pub use models::{
    CurrentPeriod, DailyFact, EntityId, EntityKind, ParentWeeklyStats, PeriodCatalog,
    PeriodReport, PeriodSummary, PeriodType, PeriodWindow, RankedSummary, WeekInfo,
    WeekdayMentions, WeeklyDigest,
};
pub use ranking::{RankingEngine, TieBreak};
pub use settings::Settings;
pub use source::{FactSource, InMemoryFactSource};
pub use trend::{TrendAssembler, MAX_TREND_PERIODS};
pub use week::{WeekCalculator, WeekRule};
