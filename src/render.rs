use std::fmt::Write;

use crate::models::{
    ParentWeeklyStats, PeriodCatalog, PeriodReport, PeriodSummary, RankedSummary, WeeklyDigest,
};

fn summary_line(summary: &PeriodSummary) -> String {
    let mut line = format!(
        "{} ({} mentions: +{} / -{} / ={}, {} recommendations, sentiment {:.2}, {} days)",
        summary.entity_name,
        summary.mention_count,
        summary.positive_count,
        summary.negative_count,
        summary.neutral_count,
        summary.recommendation_count,
        summary.avg_sentiment_score,
        summary.contributing_days
    );
    if let Some(rate) = summary.mention_change_rate {
        let _ = write!(line, " {rate:+.2}% vs previous week");
    }
    if let Some(group) = &summary.parent_group_name {
        let _ = write!(line, " [{group}]");
    }
    line
}

pub fn render_report(report: &PeriodReport) -> String {
    let mut output = String::new();
    let label = report
        .period_label
        .clone()
        .unwrap_or_else(|| format!("{} ~ {}", report.start_date, report.end_date));

    let _ = writeln!(output, "# {} Mention Report", capitalize(report.period_type.as_str()));
    let _ = writeln!(output, "Period {} ({} to {})", label, report.start_date, report.end_date);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Entities: {}", report.total_entities);
    let _ = writeln!(output, "- Mentions: {}", report.total_mentions);
    let _ = writeln!(
        output,
        "- Positive / Negative / Neutral: {} / {} / {}",
        report.total_positive, report.total_negative, report.total_neutral
    );
    let _ = writeln!(output, "- Positive ratio: {}%", report.positive_ratio);
    let _ = writeln!(output, "- Average sentiment: {:.2}", report.avg_sentiment_score);
    let _ = writeln!(output);
    let _ = writeln!(output, "## By Entity");

    if report.summaries.is_empty() {
        let _ = writeln!(output, "No mentions recorded for this period.");
    } else {
        for summary in &report.summaries {
            let _ = writeln!(output, "- {}", summary_line(summary));
        }
    }

    output
}

pub fn render_ranking(title: &str, ranking: &[RankedSummary]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {title}");

    if ranking.is_empty() {
        let _ = writeln!(output, "No ranked entities for this week.");
    } else {
        for entry in ranking {
            let _ = writeln!(output, "{}. {}", entry.rank, summary_line(&entry.summary));
        }
    }

    output
}

pub fn render_trend(title: &str, series: &[PeriodSummary]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {title}");

    if series.is_empty() {
        let _ = writeln!(output, "No data in the requested weeks.");
    } else {
        for point in series {
            let _ = writeln!(
                output,
                "- {} ~ {}: {} mentions, {} positive, sentiment {:.2}",
                point.start_date,
                point.end_date,
                point.mention_count,
                point.positive_count,
                point.avg_sentiment_score
            );
        }
    }

    output
}

pub fn render_digest(digest: &WeeklyDigest) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Weekly Digest {}", digest.week_label);
    let _ = writeln!(output, "- Mentions: {}", digest.total_mentions);
    match digest.mention_change_rate {
        Some(rate) => {
            let _ = writeln!(output, "- Change vs previous week: {rate:+.2}%");
        }
        None => {
            let _ = writeln!(output, "- Change vs previous week: n/a");
        }
    }
    let _ = writeln!(
        output,
        "- Positive / Negative: {} / {}",
        digest.total_positive, digest.total_negative
    );
    let _ = writeln!(output, "- Recommendations: {}", digest.total_recommendations);
    let _ = writeln!(
        output,
        "- Entities: {} across {} groups",
        digest.total_entities, digest.total_parents
    );
    let _ = writeln!(output, "- Average sentiment: {:.4}", digest.avg_sentiment_score);
    output
}

pub fn render_catalog(catalog: &PeriodCatalog) -> String {
    let mut output = String::new();
    let current = &catalog.current;
    let _ = writeln!(output, "# Available Periods");
    let _ = writeln!(
        output,
        "Current: {} (year {}, month {}, week {} of {})",
        current.date, current.year, current.month, current.week, current.week_year
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Days");
    for day in &catalog.daily {
        let _ = writeln!(output, "- {}", day.label);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weeks");
    for week in &catalog.weekly {
        let _ = writeln!(output, "- {}", week.label);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Months");
    for month in &catalog.monthly {
        let _ = writeln!(output, "- {}", month.label);
    }

    output
}

pub fn render_parent_stats(stats: &[ParentWeeklyStats]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Group Weekly Stats");

    if stats.is_empty() {
        let _ = writeln!(output, "No groups had members in this week.");
        return output;
    }
    for group in stats {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {} ({})", group.parent_name, group.week_label);
        let _ = writeln!(
            output,
            "- Mentions: {} from {} members",
            group.total_mentions, group.total_members_mentioned
        );
        let _ = writeln!(
            output,
            "- Positive / Negative: {} / {}",
            group.total_positive, group.total_negative
        );
        let _ = writeln!(output, "- Recommendations: {}", group.total_recommendations);
        let _ = writeln!(output, "- Average sentiment: {:.2}", group.avg_sentiment_score);
        if let (Some(id), Some(mentions)) = (group.top_member_id, group.top_member_mentions) {
            let _ = writeln!(output, "- Top member: {id} ({mentions} mentions)");
        }
    }
    output
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PeriodAggregator;
    use crate::models::{DailyFact, PeriodType};
    use chrono::NaiveDate;

    #[test]
    fn empty_report_says_so() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        let report = PeriodAggregator::default().aggregate(PeriodType::Daily, day, day, &[]);
        let text = render_report(&report);
        assert!(text.starts_with("# Daily Mention Report"));
        assert!(text.contains("No mentions recorded for this period."));
        assert!(text.contains("- Positive ratio: 0%"));
    }

    #[test]
    fn entity_lines_include_group_label() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        let fact = DailyFact {
            mention_count: Some(3),
            positive_count: Some(2),
            entity_name: Some("Kim".to_string()),
            parent_group_name: Some("North Academy".to_string()),
            ..DailyFact::new(1, day)
        };
        let report = PeriodAggregator::default().aggregate(PeriodType::Daily, day, day, &[fact]);
        let text = render_report(&report);
        assert!(text.contains("- Kim (3 mentions: +2 / -0 / =0"));
        assert!(text.contains("[North Academy]"));
    }

    #[test]
    fn group_stats_list_top_member() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        let fact = DailyFact {
            mention_count: Some(5),
            parent_id: Some(100),
            parent_group_name: Some("North Academy".to_string()),
            ..DailyFact::new(7, day)
        };
        let report = PeriodAggregator::default().aggregate(PeriodType::Weekly, day, day, &[fact]);
        let stats = PeriodAggregator::default().parent_stats(&report, 2026, 6);
        let text = render_parent_stats(&stats);
        assert!(text.contains("## North Academy (2026 W6)"));
        assert!(text.contains("- Mentions: 5 from 1 members"));
        assert!(text.contains("- Top member: 7 (5 mentions)"));
        assert!(render_parent_stats(&[]).contains("No groups had members in this week."));
    }

    #[test]
    fn empty_trend_and_ranking_render_placeholders() {
        assert!(render_trend("Trend", &[]).contains("No data in the requested weeks."));
        assert!(render_ranking("Top", &[]).contains("No ranked entities for this week."));
    }
}
