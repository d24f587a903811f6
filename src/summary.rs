//! Executive summary rendering.
//!
//! Produces the HTML fragment shown at the top of the dashboard. Every figure is
//! rounded to the nearest whole number and each judgement is wrapped in a
//! `trend-positive`, `trend-negative` or `trend-neutral` span.

use std::collections::HashMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::models::{KpiRecord, SentimentImprovement};

pub const ESCALATIONS: &str = "Escalations";
pub const RECOGNITION: &str = "Recognition %";
pub const COMPLETION: &str = "Completion %";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Which direction counts as good news for each metric. Metrics not listed are
/// treated as higher-is-better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolarityConfig {
    metrics: HashMap<String, Polarity>,
}

impl Default for PolarityConfig {
    fn default() -> Self {
        let mut metrics = HashMap::new();
        metrics.insert(ESCALATIONS.to_string(), Polarity::LowerIsBetter);
        Self { metrics }
    }
}

impl PolarityConfig {
    pub fn polarity(&self, metric: &str) -> Polarity {
        self.metrics
            .get(metric)
            .copied()
            .unwrap_or(Polarity::HigherIsBetter)
    }

    /// Entries from `other` replace ours.
    pub fn merge(mut self, other: PolarityConfig) -> Self {
        self.metrics.extend(other.metrics);
        self
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiTrend {
    pub name: String,
    pub trend: f64,
    pub polarity: Polarity,
}

pub fn resolve_trends(kpis: &[KpiRecord], config: &PolarityConfig) -> Vec<KpiTrend> {
    kpis.iter()
        .map(|kpi| KpiTrend {
            name: kpi.name.clone(),
            trend: kpi.trend,
            polarity: config.polarity(&kpi.name),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryThresholds {
    /// Escalation counts above this are off target.
    pub max_escalations: f64,
    pub min_recognition_rate: f64,
    pub min_completion_rate: f64,
    /// Combined automated + human improvement needed for a positive progression.
    pub positive_progression: f64,
}

impl Default for SummaryThresholds {
    fn default() -> Self {
        Self {
            max_escalations: 250.0,
            min_recognition_rate: 85.0,
            min_completion_rate: 75.0,
            positive_progression: 150.0,
        }
    }
}

fn span(positive: bool, text: &str) -> String {
    let class = if positive { "trend-positive" } else { "trend-negative" };
    format!(r#"<span class="{class}">{text}</span>"#)
}

fn whole(value: f64) -> i64 {
    value.round() as i64
}

pub fn trend_sentence(kpi: &KpiTrend) -> String {
    let increased = kpi.trend > 0.0;
    let direction = if increased { "increased" } else { "decreased" };
    let symbol = if increased { "▲" } else { "▼" };
    let good_news = match kpi.polarity {
        Polarity::HigherIsBetter => increased,
        Polarity::LowerIsBetter => !increased,
    };

    span(
        good_news,
        &format!(
            "{} {} by {}% {}",
            kpi.name,
            direction,
            whole(kpi.trend.abs()),
            symbol
        ),
    )
}

pub fn handler_comparison(improvement: &SentimentImprovement) -> String {
    let automated = whole(improvement.automated_rate);
    let human = whole(improvement.human_rate);

    if improvement.human_rate > improvement.automated_rate {
        format!(
            "Live agents demonstrate {} at improving customer sentiment ({human}%) compared to AI assistants ({automated}%)",
            span(true, "higher effectiveness")
        )
    } else {
        format!(
            "AI assistants show {} to live agents at improving customer sentiment ({automated}% vs {human}%)",
            span(true, "comparable effectiveness")
        )
    }
}

pub fn escalation_sentence(escalations: f64, thresholds: &SummaryThresholds) -> String {
    if escalations > thresholds.max_escalations {
        format!(
            "Escalations remain {} at {}",
            span(false, "above target"),
            whole(escalations)
        )
    } else {
        format!(
            "Escalations are {} at {}",
            span(true, "within target range"),
            whole(escalations)
        )
    }
}

pub fn recognition_sentence(rate: f64, thresholds: &SummaryThresholds) -> String {
    if rate >= thresholds.min_recognition_rate {
        format!("Intent recognition is {} at {}%", span(true, "strong"), whole(rate))
    } else {
        format!(
            "Intent recognition {} at {}%",
            span(false, "needs improvement"),
            whole(rate)
        )
    }
}

pub fn completion_sentence(rate: f64, thresholds: &SummaryThresholds) -> String {
    if rate >= thresholds.min_completion_rate {
        format!(
            "Task completion rate is {} at {}%",
            span(true, "satisfactory"),
            whole(rate)
        )
    } else {
        format!(
            "Task completion rate {} at {}%",
            span(false, "requires attention"),
            whole(rate)
        )
    }
}

pub fn progression_is_positive(improvement: &SentimentImprovement, thresholds: &SummaryThresholds) -> bool {
    improvement.automated_rate + improvement.human_rate > thresholds.positive_progression
}

pub fn executive_summary(
    kpi_trends: &[KpiTrend],
    improvement: &SentimentImprovement,
    escalations: f64,
    recognition_rate: f64,
    completion_rate: f64,
) -> String {
    executive_summary_with(
        kpi_trends,
        improvement,
        escalations,
        recognition_rate,
        completion_rate,
        &SummaryThresholds::default(),
    )
}

pub fn executive_summary_with(
    kpi_trends: &[KpiTrend],
    improvement: &SentimentImprovement,
    escalations: f64,
    recognition_rate: f64,
    completion_rate: f64,
    thresholds: &SummaryThresholds,
) -> String {
    let trends = kpi_trends
        .iter()
        .map(trend_sentence)
        .collect::<Vec<_>>()
        .join(". ");

    let progression = if progression_is_positive(improvement, thresholds) {
        span(true, "positive")
    } else {
        r#"<span class="trend-neutral">neutral</span>"#.to_string()
    };

    let mut output = String::new();
    let _ = writeln!(output, r#"<p class="mb-3">{trends}</p>"#);
    let _ = writeln!(
        output,
        r#"<p class="mb-3">{}.</p>"#,
        handler_comparison(improvement)
    );
    let _ = writeln!(
        output,
        r#"<p class="mb-3">{}. {}. {}.</p>"#,
        escalation_sentence(escalations, thresholds),
        recognition_sentence(recognition_rate, thresholds),
        completion_sentence(completion_rate, thresholds)
    );
    let _ = writeln!(
        output,
        "<p>Overall sentiment shows {progression} progression throughout conversations, \
         with most negative interactions resolving to neutral or positive by conversation end.</p>"
    );

    output
}
