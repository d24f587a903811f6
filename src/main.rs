use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod files;
mod journey;
mod metrics;
mod mock;
mod models;
mod report;
mod summary;

use metrics::{CompletionBand, HandlerFilter, IntentFilter, TrendDirection};
use mock::{Dataset, MockSource, Period};
use models::{ConversationStage, IntentRecord, ResponseRecord};
use summary::PolarityConfig;

const SEED_ENV: &str = "INSIGHTS_SEED";

#[derive(Parser)]
#[command(name = "agent-insights")]
#[command(about = "AI assistant and live agent interaction insights over synthetic data", long_about = None)]
struct Cli {
    /// Seed for the synthetic data generator (falls back to INSIGHTS_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Reporting period (omit for the first-load tables)
    #[arg(long, global = true, value_enum)]
    period: Option<Period>,
    /// JSON file mapping metric names to higher_is_better or lower_is_better
    #[arg(long, global = true)]
    polarity: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show headline KPIs with their trend
    Kpis,
    /// Show the five best or worst completed intents
    Intents {
        #[arg(long)]
        incomplete: bool,
        #[arg(long, value_enum, default_value_t = IntentFilter::All)]
        intent_filter: IntentFilter,
    },
    /// Show the most frequent queries for one handler
    Responses {
        #[arg(long)]
        human: bool,
        #[arg(long, value_enum, default_value_t = HandlerFilter::All)]
        agent_filter: HandlerFilter,
    },
    /// Sentiment improvement, distribution and movement
    Sentiment,
    /// Call journey funnel, handler split and per-stage intents
    Journey {
        #[arg(long, value_enum)]
        stage: Option<journey::JourneyStage>,
    },
    /// Render the executive summary HTML fragment
    Summary {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the derived dashboard views
    Export {
        #[arg(long, value_enum, default_value_t = files::ExportFormat::Json)]
        format: files::ExportFormat,
        #[arg(long)]
        out: PathBuf,
    },
    /// Derive top intents and responses from CSV tables
    #[command(group(
        ArgGroup::new("tables")
            .args(["intents", "responses"])
            .required(true)
            .multiple(true)
    ))]
    Import {
        #[arg(long)]
        intents: Option<PathBuf>,
        #[arg(long)]
        responses: Option<PathBuf>,
    },
}

fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Flag first, then the `INSIGHTS_SEED` value, otherwise unseeded.
fn resolve_seed(
    flag: Option<u64>,
    env: Result<String, std::env::VarError>,
) -> anyhow::Result<Option<u64>> {
    if flag.is_some() {
        return Ok(flag);
    }

    match env {
        Ok(raw) => {
            let seed = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{SEED_ENV} must be an unsigned integer, got {raw:?}"))?;
            Ok(Some(seed))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("{SEED_ENV} is not valid unicode")),
    }
}

fn summary_html(dataset: &Dataset, polarity: &PolarityConfig) -> String {
    let trends = summary::resolve_trends(&dataset.kpis, polarity);
    let improvement = metrics::sentiment_improvement(&dataset.sentiments);

    summary::executive_summary(
        &trends,
        &improvement,
        metrics::kpi_value(&dataset.kpis, summary::ESCALATIONS),
        metrics::kpi_value(&dataset.kpis, summary::RECOGNITION),
        metrics::kpi_value(&dataset.kpis, summary::COMPLETION),
    )
}

fn print_intents(heading: &str, intents: &[IntentRecord]) {
    println!("{heading}:");
    if intents.is_empty() {
        println!("  (none)");
    }
    for intent in intents {
        println!(
            "- {} {:.0}% complete [{}] across {:.0} requests ({:.0} AI / {:.0} live agent)",
            intent.name,
            intent.completion_rate,
            CompletionBand::from_rate(intent.completion_rate).label(),
            intent.total,
            intent.automated_completed,
            intent.human_completed
        );
    }
}

fn print_responses(heading: &str, responses: &[ResponseRecord]) {
    println!("{heading}:");
    if responses.is_empty() {
        println!("  (none)");
    }
    for response in responses {
        println!(
            "- {} ({} times, {:.1}% complete)",
            response.query, response.frequency, response.completion_rate
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let seed = resolve_seed(cli.seed, std::env::var(SEED_ENV))?;
    let polarity = files::load_polarity(cli.polarity.as_deref())?;
    let today = Utc::now().date_naive();
    let mut source = MockSource::new(seed, today);
    let dataset = match cli.period {
        Some(period) => source.for_period(period),
        None => source.initial(),
    };

    info!(
        seed = ?seed,
        period = dataset.period.label(),
        sentiments = dataset.sentiments.len(),
        "dashboard data ready"
    );

    match cli.command {
        Commands::Kpis => {
            let window = source
                .date_filters()
                .into_iter()
                .find(|filter| filter.label == dataset.period.label())
                .context("no date window for the selected period")?;
            println!(
                "Key metrics ({}, {} to {}):",
                window.label, window.start, window.end
            );
            for kpi in &dataset.kpis {
                println!(
                    "- {}: {:.1}{} (previous {:.1}) {} {:.1}%",
                    kpi.name,
                    kpi.value,
                    kpi.unit.as_deref().unwrap_or(""),
                    kpi.previous_value,
                    TrendDirection::from_trend(kpi.trend).symbol(),
                    kpi.trend.abs()
                );
            }
            if let (Some(first), Some(last)) = (dataset.trend.first(), dataset.trend.last()) {
                let peak = dataset.trend.iter().map(|p| p.value).max().unwrap_or(0);
                println!(
                    "Daily conversations {} to {}: {} -> {} (peak {})",
                    first.date, last.date, first.value, last.value, peak
                );
            }
        }
        Commands::Intents {
            incomplete,
            intent_filter,
        } => {
            let intents = metrics::filter_intents(&dataset.intents, intent_filter);
            let heading = if incomplete {
                "Top incomplete intents"
            } else {
                "Top completed intents"
            };
            print_intents(heading, &metrics::top_intents(&intents, !incomplete));
        }
        Commands::Responses {
            human,
            agent_filter,
        } => {
            let responses = metrics::filter_responses(&dataset.responses, agent_filter);
            let heading = if human {
                "Top live agent responses"
            } else {
                "Top AI responses"
            };
            print_responses(heading, &metrics::top_responses(&responses, !human));
        }
        Commands::Sentiment => {
            let improvement = metrics::sentiment_improvement(&dataset.sentiments);
            let movement = metrics::sentiment_movement(&dataset.sentiments);
            let (automated_improved, human_improved) =
                metrics::improved_counts(&dataset.sentiments);

            println!("Conversations sampled: {}", dataset.sentiments.len());
            println!(
                "Improvement rate: AI {:.0}% ({} improved), live agent {:.0}% ({} improved)",
                improvement.automated_rate,
                automated_improved,
                improvement.human_rate,
                human_improved
            );
            println!(
                "Movement: {} improved, {} stayed the same, {} worsened",
                movement.improved, movement.stayed, movement.worsened
            );
            for (label, stage) in [
                ("Start", ConversationStage::Start),
                ("Mid", ConversationStage::Middle),
                ("End", ConversationStage::End),
            ] {
                let distribution = metrics::sentiment_distribution(&dataset.sentiments, stage);
                println!(
                    "- {label}: {} positive, {} neutral, {} negative",
                    distribution.positive, distribution.neutral, distribution.negative
                );
            }
        }
        Commands::Journey { stage } => {
            let funnel = journey::call_funnel(&dataset.kpis);
            println!("Total conversations: {:.0}", funnel.total_calls);
            println!(
                "- Digital agent: {:.0} ({:.0}%)",
                funnel.digital_calls, funnel.digital_pct
            );
            println!(
                "- Live agent direct: {:.0} ({:.0}%)",
                funnel.live_calls, funnel.live_pct
            );
            println!(
                "- Escalated: {:.0} ({:.0}% of digital, {:.0}% resolved digitally)",
                funnel.escalated_calls, funnel.escalated_pct, funnel.resolved_by_digital_pct
            );
            println!(
                "- Positive after escalation: {:.0} ({:.0}%)",
                funnel.positive_after_escalation, funnel.positive_after_escalation_pct
            );

            let split = journey::decompose(dataset.sentiments.len() as f64, &dataset.sentiments);
            println!(
                "Sampled conversations: {:.0} ({} AI {:.0}%, {} live agent {:.0}%)",
                split.total_conversations,
                split.automated,
                split.automated_pct,
                split.human,
                split.human_pct
            );
            println!(
                "- Live agent resolved {} ({:.0}%), unresolved {} ({:.0}%)",
                split.human_resolved,
                split.human_resolved_pct,
                split.human_unresolved,
                split.human_unresolved_pct
            );

            let top = metrics::top_intents(&dataset.intents, true);
            let stages = match stage {
                Some(stage) => vec![stage],
                None => journey::JourneyStage::ALL.to_vec(),
            };
            for stage in stages {
                println!("{} by intent:", stage.label());
                for entry in journey::stage_intents(&top, stage) {
                    println!("- {}: {:.0}", entry.name, entry.value);
                }
            }
        }
        Commands::Summary { out } => {
            let html = summary_html(&dataset, &polarity);
            match out {
                Some(path) => {
                    std::fs::write(&path, &html)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Summary written to {}.", path.display());
                }
                None => print!("{html}"),
            }
        }
        Commands::Report { out } => {
            let html = summary_html(&dataset, &polarity);
            let report = report::build_report(&dataset, today, &html);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { format, out } => {
            let html = summary_html(&dataset, &polarity);
            let snapshot = files::DashboardSnapshot::capture(&dataset, today, html);
            files::export_snapshot(&snapshot, format, &out)?;
            println!("Snapshot written to {}.", out.display());
        }
        Commands::Import { intents, responses } => {
            if let Some(path) = intents {
                let intents = files::import_intents(&path)?;
                print_intents("Top completed intents", &metrics::top_intents(&intents, true));
                print_intents("Top incomplete intents", &metrics::top_intents(&intents, false));
            }
            if let Some(path) = responses {
                let responses = files::import_responses(&path)?;
                print_responses("Top AI responses", &metrics::top_responses(&responses, true));
                print_responses(
                    "Top live agent responses",
                    &metrics::top_responses(&responses, false),
                );
            }
            debug!("import complete");
        }
    }

    Ok(())
}
