use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mention_period_reports::render;
use mention_period_reports::{EntityKind, InMemoryFactSource, ReportFacade, Settings};

#[derive(Parser)]
#[command(name = "mention-reports")]
#[command(
    about = "Daily, weekly and monthly mention reports for instructors and academies",
    long_about = None
)]
struct Cli {
    /// CSV file of pre-scored daily facts
    #[arg(long)]
    csv: PathBuf,
    /// Optional TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Date treated as "today" (defaults to the current UTC date)
    #[arg(long)]
    reference_date: Option<NaiveDate>,
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    #[arg(long, value_enum, default_value_t = Format::Markdown)]
    format: Format,
    /// Write output to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Instructor,
    Academy,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Instructor => EntityKind::Instructor,
            KindArg::Academy => EntityKind::Academy,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Report for a single day
    Daily {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Report for a week
    Weekly {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        week: Option<u32>,
    },
    /// Report for a calendar month
    Monthly {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Most mentioned entities of a week
    Ranking {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        limit: Option<i64>,
        /// Rank only the members of this parent group
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Weekly series for one entity
    Trend {
        #[arg(long)]
        entity: i64,
        #[arg(long)]
        periods: Option<usize>,
    },
    /// Weekly series for a parent group
    ParentTrend {
        #[arg(long)]
        parent: i64,
        #[arg(long)]
        periods: Option<usize>,
    },
    /// Global roll-up of a week
    Digest {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        week: Option<u32>,
    },
    /// Per-group roll-up of a week's instructor mentions
    ParentStats {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        week: Option<u32>,
    },
    /// The week containing the reference date
    CurrentWeek,
    /// Selectable days, weeks and months
    Periods,
}

fn emit<T: Serialize>(
    format: Format,
    value: &T,
    markdown: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        Format::Json => {
            serde_json::to_string_pretty(value).context("failed to serialize output")
        }
        Format::Markdown => Ok(markdown(value)),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(kind) = cli.kind {
        settings.entity_kind = kind.into();
    }

    let source = InMemoryFactSource::from_csv(&cli.csv)
        .with_context(|| format!("failed to read facts from {}", cli.csv.display()))?;
    let facade = ReportFacade::with_settings(source, &settings);

    let today = cli.reference_date.unwrap_or_else(|| Utc::now().date_naive());
    let (current_year, current_week) = facade.calendar().current_week(today)?;

    let output = match cli.command {
        Commands::Daily { date } => {
            let report = facade.daily_report(date.unwrap_or(today))?;
            emit(cli.format, &report, render::render_report)?
        }
        Commands::Weekly { year, week } => {
            let report = facade
                .weekly_report(year.unwrap_or(current_year), week.unwrap_or(current_week))?;
            emit(cli.format, &report, render::render_report)?
        }
        Commands::Monthly { year, month } => {
            let report = facade
                .monthly_report(year.unwrap_or(today.year()), month.unwrap_or(today.month()))?;
            emit(cli.format, &report, render::render_report)?
        }
        Commands::Ranking {
            year,
            week,
            limit,
            parent,
        } => {
            let year = year.unwrap_or(current_year);
            let week = week.unwrap_or(current_week);
            let limit = limit.unwrap_or(settings.default_ranking_limit);
            let ranking = match parent {
                Some(parent_id) => facade.parent_ranking(year, week, parent_id, limit)?,
                None => facade.ranking_for_week(year, week, limit)?,
            };
            let title = format!("Top {limit} for {year} W{week}");
            emit(cli.format, &ranking, |r| render::render_ranking(&title, r))?
        }
        Commands::Trend { entity, periods } => {
            let periods = periods.unwrap_or(settings.default_trend_periods);
            let series = facade.entity_trend(entity, periods, today)?;
            let title = format!("Entity {entity} over {periods} weeks");
            emit(cli.format, &series, |s| render::render_trend(&title, s))?
        }
        Commands::ParentTrend { parent, periods } => {
            let periods = periods.unwrap_or(settings.default_trend_periods);
            let series = facade.parent_trend(parent, periods, today)?;
            let title = format!("Group {parent} over {periods} weeks");
            emit(cli.format, &series, |s| render::render_trend(&title, s))?
        }
        Commands::Digest { year, week } => {
            let digest = facade.period_summary_of_summaries(
                year.unwrap_or(current_year),
                week.unwrap_or(current_week),
            )?;
            emit(cli.format, &digest, render::render_digest)?
        }
        Commands::ParentStats { year, week } => {
            let stats = facade
                .parent_weekly_stats(year.unwrap_or(current_year), week.unwrap_or(current_week))?;
            emit(cli.format, &stats, |s| render::render_parent_stats(s))?
        }
        Commands::CurrentWeek => {
            let info = facade.current_week_info(today)?;
            emit(cli.format, &info, |i| {
                format!("{} ({} to {})\n", i.week_label, i.start_date, i.end_date)
            })?
        }
        Commands::Periods => {
            let catalog = facade.available_periods(today)?;
            emit(cli.format, &catalog, render::render_catalog)?
        }
    };

    match cli.out {
        Some(path) => {
            std::fs::write(&path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{output}"),
    }

    Ok(())
}
