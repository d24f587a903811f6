use std::fmt::Write;

use chrono::NaiveDate;

use crate::journey::{self, JourneyStage};
use crate::metrics::{self, CompletionBand, TrendDirection};
use crate::mock::Dataset;
use crate::models::{ConversationStage, IntentRecord, ResponseRecord, SentimentDistribution};

fn intent_lines(output: &mut String, intents: &[IntentRecord]) {
    if intents.is_empty() {
        let _ = writeln!(output, "No intents match this filter.");
        return;
    }

    for intent in intents {
        let _ = writeln!(
            output,
            "- {}: {:.0}% complete ({}) across {:.0} requests ({:.0} AI, {:.0} live agent)",
            intent.name,
            intent.completion_rate,
            CompletionBand::from_rate(intent.completion_rate).label(),
            intent.total,
            intent.automated_completed,
            intent.human_completed
        );
    }
}

fn response_lines(output: &mut String, responses: &[ResponseRecord]) {
    if responses.is_empty() {
        let _ = writeln!(output, "No responses recorded for this handler.");
        return;
    }

    for response in responses {
        let _ = writeln!(
            output,
            "- \"{}\" asked {} times, {:.1}% complete",
            response.query, response.frequency, response.completion_rate
        );
    }
}

fn distribution_line(output: &mut String, label: &str, distribution: &SentimentDistribution) {
    let _ = writeln!(
        output,
        "| {} | {} | {} | {} |",
        label, distribution.positive, distribution.neutral, distribution.negative
    );
}

/// Markdown snapshot of the dashboard. `summary_html` is embedded verbatim.
pub fn build_report(dataset: &Dataset, generated_on: NaiveDate, summary_html: &str) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Agent Interaction Insights");
    let _ = writeln!(
        output,
        "Generated on {} for {}",
        generated_on,
        dataset.period.label()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Executive Summary");
    let _ = writeln!(output);
    let _ = write!(output, "{summary_html}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");

    if dataset.kpis.is_empty() {
        let _ = writeln!(output, "No metrics recorded for this window.");
    } else {
        for kpi in dataset.kpis.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.1}{} (was {:.1}) {} {:.1}%",
                kpi.name,
                kpi.value,
                kpi.unit.as_deref().unwrap_or(""),
                kpi.previous_value,
                TrendDirection::from_trend(kpi.trend).symbol(),
                kpi.trend.abs()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Completed Intents");
    intent_lines(&mut output, &metrics::top_intents(&dataset.intents, true));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Incomplete Intents");
    intent_lines(&mut output, &metrics::top_intents(&dataset.intents, false));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top AI Responses");
    response_lines(&mut output, &metrics::top_responses(&dataset.responses, true));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Live Agent Responses");
    response_lines(&mut output, &metrics::top_responses(&dataset.responses, false));

    let improvement = metrics::sentiment_improvement(&dataset.sentiments);
    let movement = metrics::sentiment_movement(&dataset.sentiments);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Sentiment");
    let _ = writeln!(
        output,
        "Across {} conversations: {} improved, {} stayed the same, {} worsened.",
        dataset.sentiments.len(),
        movement.improved,
        movement.stayed,
        movement.worsened
    );
    let _ = writeln!(
        output,
        "Improvement rate: AI {:.0}%, live agent {:.0}%.",
        improvement.automated_rate, improvement.human_rate
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "| Stage | Positive | Neutral | Negative |");
    let _ = writeln!(output, "|-------|----------|---------|----------|");
    for (label, stage) in [
        ("Start", ConversationStage::Start),
        ("Mid conversation", ConversationStage::Middle),
        ("End", ConversationStage::End),
    ] {
        distribution_line(
            &mut output,
            label,
            &metrics::sentiment_distribution(&dataset.sentiments, stage),
        );
    }

    let funnel = journey::call_funnel(&dataset.kpis);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Call Journey");
    let _ = writeln!(
        output,
        "- {:.0} conversations: {:.0} digital agent ({:.0}%), {:.0} live agent ({:.0}%)",
        funnel.total_calls,
        funnel.digital_calls,
        funnel.digital_pct,
        funnel.live_calls,
        funnel.live_pct
    );
    let _ = writeln!(
        output,
        "- {:.0} escalated ({:.0}% of digital), {:.0}% resolved by the digital agent",
        funnel.escalated_calls, funnel.escalated_pct, funnel.resolved_by_digital_pct
    );
    let _ = writeln!(
        output,
        "- {:.0} escalations ended positive ({:.0}%)",
        funnel.positive_after_escalation, funnel.positive_after_escalation_pct
    );

    let split = journey::decompose(dataset.sentiments.len() as f64, &dataset.sentiments);
    let _ = writeln!(
        output,
        "- Sampled {:.0}: {} AI ({:.0}%), {} live agent ({:.0}%); live agent resolved {} ({:.0}%), unresolved {} ({:.0}%)",
        split.total_conversations,
        split.automated,
        split.automated_pct,
        split.human,
        split.human_pct,
        split.human_resolved,
        split.human_resolved_pct,
        split.human_unresolved,
        split.human_unresolved_pct
    );

    let top = metrics::top_intents(&dataset.intents, true);
    let _ = writeln!(output);
    let _ = writeln!(output, "### Stage Volume by Intent");
    for stage in JourneyStage::ALL {
        let values = journey::stage_intents(&top, stage)
            .iter()
            .map(|entry| format!("{} {:.0}", entry.name, entry.value))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(output, "- {}: {}", stage.label(), values);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSource, Period};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn dataset() -> Dataset {
        let mut source = MockSource::new(Some(42), today());
        Dataset {
            period: Period::Last7Days,
            kpis: source.kpis(),
            intents: source.intents(),
            responses: source.responses(),
            sentiments: source.sentiments(70),
            trend: source.trend(14),
        }
    }

    #[test]
    fn report_lists_every_section() {
        let report = build_report(&dataset(), today(), "<p>summary</p>\n");
        for heading in [
            "# Agent Interaction Insights",
            "## Executive Summary",
            "## Key Metrics",
            "## Top Completed Intents",
            "## Top Incomplete Intents",
            "## Top AI Responses",
            "## Top Live Agent Responses",
            "## Sentiment",
            "## Call Journey",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("Generated on 2026-03-15 for Last 7 Days"));
        assert!(report.contains("<p>summary</p>"));
        assert!(report.contains("- Account Balance Inquiry: 92% complete (high)"));
        assert!(report.contains("- Escalations: 243.0 (was 276.0) ▼ 12.0%"));
        assert!(report.contains("Across 70 conversations"));
        assert!(report.contains("### Stage Volume by Intent"));
        assert!(report.contains("- Escalated: Account Balance Inquiry 27,"));
        assert!(report.contains("- Sampled 70:"));
    }

    #[test]
    fn empty_tables_are_called_out() {
        let mut data = dataset();
        data.kpis.clear();
        data.intents.clear();
        data.responses.clear();
        data.sentiments.clear();

        let report = build_report(&data, today(), "");
        assert!(report.contains("No metrics recorded for this window."));
        assert!(report.contains("No intents match this filter."));
        assert!(report.contains("No responses recorded for this handler."));
        assert!(report.contains("Improvement rate: AI 0%, live agent 0%."));
    }
}
