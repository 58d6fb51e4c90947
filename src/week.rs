use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReportError, Result};
use crate::models::{PeriodType, PeriodWindow};

/// Which weekday opens a week, and how many days of the new year the first
/// week needs before it counts as week 1.
///
/// The default (Monday, 4 days) is the ISO-8601 convention: week 1 holds the
/// year's first Thursday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRule {
    pub week_start: Weekday,
    pub first_week_min_days: u32,
}

impl Default for WeekRule {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
            first_week_min_days: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeekCalculator {
    rule: WeekRule,
}

impl WeekCalculator {
    pub fn new(rule: WeekRule) -> Self {
        Self { rule }
    }

    /// First day of `week` in `year`. Weeks past the year's real count are
    /// not rejected; their start simply lands in the following year.
    pub fn week_start(&self, year: i32, week: u32) -> Result<NaiveDate> {
        validate_week(week)?;
        let start = shift_days(self.first_week_start(year)?, 7 * (i64::from(week) - 1))?;
        if start.year() > year {
            warn!(year, week, %start, "requested week starts after the end of its year");
        }
        Ok(start)
    }

    pub fn week_end(&self, year: i32, week: u32) -> Result<NaiveDate> {
        shift_days(self.week_start(year, week)?, 6)
    }

    /// Week-based year and week number containing `date`.
    pub fn week_of(&self, date: NaiveDate) -> Result<(i32, u32)> {
        let year = date.year();
        let next_first = self.first_week_start(year + 1)?;
        let this_first = self.first_week_start(year)?;

        let (based_year, first) = if date >= next_first {
            (year + 1, next_first)
        } else if date >= this_first {
            (year, this_first)
        } else {
            (year - 1, self.first_week_start(year - 1)?)
        };

        let week = (date - first).num_days() / 7 + 1;
        Ok((based_year, week as u32))
    }

    pub fn current_week(&self, reference_date: NaiveDate) -> Result<(i32, u32)> {
        self.week_of(reference_date)
    }

    pub fn week_window(&self, year: i32, week: u32) -> Result<PeriodWindow> {
        let start_date = self.week_start(year, week)?;
        let end_date = shift_days(start_date, 6)?;
        Ok(PeriodWindow {
            period_type: PeriodType::Weekly,
            start_date,
            end_date,
            year: Some(year),
            month: None,
            week: Some(week),
            label: week_label(year, week, start_date, end_date),
        })
    }

    pub fn month_window(&self, year: i32, month: u32) -> Result<PeriodWindow> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::InvalidMonth(month));
        }
        let start_date =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(ReportError::YearOutOfRange(year))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(ReportError::YearOutOfRange(year))?;
        let end_date = shift_days(next_month, -1)?;

        Ok(PeriodWindow {
            period_type: PeriodType::Monthly,
            start_date,
            end_date,
            year: Some(year),
            month: Some(month),
            week: None,
            label: format!("{year}-{month:02}"),
        })
    }

    pub fn day_window(&self, date: NaiveDate) -> PeriodWindow {
        PeriodWindow {
            period_type: PeriodType::Daily,
            start_date: date,
            end_date: date,
            year: Some(date.year()),
            month: Some(date.month()),
            week: None,
            label: day_label(date),
        }
    }

    /// The week immediately before (`year`, `week`), resolved through the
    /// calendar rather than by decrementing the number.
    pub fn previous_week(&self, year: i32, week: u32) -> Result<(i32, u32)> {
        let start = self.week_start(year, week)?;
        self.week_of(shift_days(start, -7)?)
    }

    fn first_week_start(&self, year: i32) -> Result<NaiveDate> {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(ReportError::YearOutOfRange(year))?;
        let offset = self.days_into_week(jan1);
        let mut start = shift_days(jan1, -offset)?;
        if 7 - offset < i64::from(self.rule.first_week_min_days) {
            start = shift_days(start, 7)?;
        }
        debug!(year, %start, "resolved first week");
        Ok(start)
    }

    fn days_into_week(&self, date: NaiveDate) -> i64 {
        let day = i64::from(date.weekday().num_days_from_monday());
        let start = i64::from(self.rule.week_start.num_days_from_monday());
        (7 + day - start) % 7
    }
}

pub fn validate_week(week: u32) -> Result<()> {
    if (1..=53).contains(&week) {
        Ok(())
    } else {
        Err(ReportError::InvalidWeek(week))
    }
}

pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(ReportError::DateOutOfRange(date))
}

pub fn week_label(year: i32, week: u32, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{year} W{week} ({}/{}~{}/{})",
        start.month(),
        start.day(),
        end.month(),
        end.day()
    )
}

pub fn day_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thursday_new_year_starts_week_one_in_december() {
        let calc = WeekCalculator::default();
        assert_eq!(calc.week_start(2026, 1).unwrap(), date(2025, 12, 29));
        assert_eq!(calc.week_end(2026, 1).unwrap(), date(2026, 1, 4));
    }

    #[test]
    fn friday_to_sunday_new_year_pushes_week_one_forward() {
        let calc = WeekCalculator::default();
        // 2027-01-01 is a Friday, 2022-01-01 a Saturday, 2023-01-01 a Sunday.
        assert_eq!(calc.week_start(2027, 1).unwrap(), date(2027, 1, 4));
        assert_eq!(calc.week_start(2022, 1).unwrap(), date(2022, 1, 3));
        assert_eq!(calc.week_start(2023, 1).unwrap(), date(2023, 1, 2));
    }

    #[test]
    fn monday_new_year_starts_on_itself() {
        let calc = WeekCalculator::default();
        assert_eq!(calc.week_start(2024, 1).unwrap(), date(2024, 1, 1));
        assert_eq!(calc.week_start(2024, 10).unwrap(), date(2024, 3, 4));
    }

    #[test]
    fn week_end_is_six_days_after_start() {
        let calc = WeekCalculator::default();
        for year in 2018..2032 {
            for week in 1..=53 {
                let start = calc.week_start(year, week).unwrap();
                let end = calc.week_end(year, week).unwrap();
                assert!(start <= end);
                assert_eq!((end - start).num_days(), 6);
            }
        }
    }

    #[test]
    fn out_of_range_weeks_are_rejected() {
        let calc = WeekCalculator::default();
        assert!(matches!(calc.week_start(2026, 0), Err(ReportError::InvalidWeek(0))));
        assert!(matches!(calc.week_start(2026, 54), Err(ReportError::InvalidWeek(54))));
    }

    #[test]
    fn week_beyond_year_length_rolls_into_next_year() {
        let calc = WeekCalculator::default();
        // 2025 has 52 weeks, so its "week 53" is 2026's week 1.
        assert_eq!(calc.week_start(2025, 53).unwrap(), date(2025, 12, 29));
        assert_eq!(calc.week_start(2027, 53).unwrap(), date(2028, 1, 3));
    }

    #[test]
    fn week_of_matches_iso_calendar_under_default_rule() {
        let calc = WeekCalculator::default();
        let mut day = date(2015, 1, 1);
        while day < date(2031, 1, 1) {
            let iso = day.iso_week();
            assert_eq!(calc.week_of(day).unwrap(), (iso.year(), iso.week()), "{day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn week_based_year_can_differ_from_calendar_year() {
        let calc = WeekCalculator::default();
        assert_eq!(calc.current_week(date(2026, 12, 31)).unwrap(), (2026, 53));
        assert_eq!(calc.current_week(date(2027, 1, 3)).unwrap(), (2026, 53));
        assert_eq!(calc.current_week(date(2024, 12, 30)).unwrap(), (2025, 1));
    }

    #[test]
    fn sunday_start_rule_with_one_day_threshold() {
        let calc = WeekCalculator::new(WeekRule {
            week_start: Weekday::Sun,
            first_week_min_days: 1,
        });
        assert_eq!(calc.week_start(2026, 1).unwrap(), date(2025, 12, 28));
        assert_eq!(calc.week_of(date(2026, 1, 3)).unwrap(), (2026, 1));
        assert_eq!(calc.week_of(date(2026, 1, 4)).unwrap(), (2026, 2));
    }

    #[test]
    fn previous_week_crosses_into_fifty_third_week() {
        let calc = WeekCalculator::default();
        assert_eq!(calc.previous_week(2027, 1).unwrap(), (2026, 53));
        assert_eq!(calc.previous_week(2026, 10).unwrap(), (2026, 9));
    }

    #[test]
    fn month_window_covers_whole_month() {
        let calc = WeekCalculator::default();
        let feb = calc.month_window(2028, 2).unwrap();
        assert_eq!(feb.start_date, date(2028, 2, 1));
        assert_eq!(feb.end_date, date(2028, 2, 29));
        assert_eq!(feb.label, "2028-02");

        let dec = calc.month_window(2026, 12).unwrap();
        assert_eq!(dec.end_date, date(2026, 12, 31));
        assert!(matches!(calc.month_window(2026, 13), Err(ReportError::InvalidMonth(13))));
    }

    #[test]
    fn labels_are_human_readable() {
        let calc = WeekCalculator::default();
        let window = calc.week_window(2026, 6).unwrap();
        assert_eq!(window.label, "2026 W6 (2/2~2/8)");
        assert_eq!(calc.day_window(date(2026, 2, 4)).label, "2026-02-04 (Wed)");
    }
}
