use std::cmp::Ordering;

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::models::{
    ConversationStage, IntentRecord, KpiRecord, ResponseRecord, Sentiment, SentimentDistribution,
    SentimentImprovement, SentimentMovement, SentimentRecord,
};

pub const TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntentFilter {
    All,
    Account,
    Billing,
    Support,
}

impl IntentFilter {
    pub fn matches(self, intent: &IntentRecord) -> bool {
        let keyword = match self {
            IntentFilter::All => return true,
            IntentFilter::Account => "account",
            IntentFilter::Billing => "billing",
            IntentFilter::Support => "support",
        };
        intent.name.to_lowercase().contains(keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandlerFilter {
    All,
    Automated,
    Human,
}

impl HandlerFilter {
    pub fn matches(self, response: &ResponseRecord) -> bool {
        match self {
            HandlerFilter::All => true,
            HandlerFilter::Automated => response.automated,
            HandlerFilter::Human => !response.automated,
        }
    }
}

pub fn filter_intents(intents: &[IntentRecord], filter: IntentFilter) -> Vec<IntentRecord> {
    intents.iter().filter(|i| filter.matches(i)).cloned().collect()
}

pub fn filter_responses(responses: &[ResponseRecord], filter: HandlerFilter) -> Vec<ResponseRecord> {
    responses.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Best (`completed`) or worst five intents by completion rate. Equal rates keep input order.
pub fn top_intents(intents: &[IntentRecord], completed: bool) -> Vec<IntentRecord> {
    let mut sorted = intents.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = a
            .completion_rate
            .partial_cmp(&b.completion_rate)
            .unwrap_or(Ordering::Equal);
        if completed {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted.truncate(TOP_N);
    sorted
}

pub fn top_responses(responses: &[ResponseRecord], automated: bool) -> Vec<ResponseRecord> {
    let mut matching: Vec<ResponseRecord> = responses
        .iter()
        .filter(|r| r.automated == automated)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    matching.truncate(TOP_N);
    matching
}

pub fn is_improved(record: &SentimentRecord) -> bool {
    record.end.ordinal() > record.start.ordinal()
}

/// Improved conversation counts as `(automated, human)`.
pub fn improved_counts(records: &[SentimentRecord]) -> (usize, usize) {
    records
        .iter()
        .filter(|r| is_improved(r))
        .fold((0, 0), |(automated, human), r| {
            if r.automated {
                (automated + 1, human)
            } else {
                (automated, human + 1)
            }
        })
}

pub fn sentiment_improvement(records: &[SentimentRecord]) -> SentimentImprovement {
    let mut automated_total = 0usize;
    let mut human_total = 0usize;

    for record in records {
        if record.automated {
            automated_total += 1;
        } else {
            human_total += 1;
        }
    }

    let (automated_improved, human_improved) = improved_counts(records);
    let improvement = SentimentImprovement {
        automated_rate: percentage(automated_improved, automated_total),
        human_rate: percentage(human_improved, human_total),
    };

    debug!(
        automated_total,
        human_total,
        automated_rate = improvement.automated_rate,
        human_rate = improvement.human_rate,
        "computed sentiment improvement"
    );
    improvement
}

/// Whole-number percentage, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64 * 100.0).round()
    }
}

pub fn sentiment_distribution(
    records: &[SentimentRecord],
    stage: ConversationStage,
) -> SentimentDistribution {
    let mut distribution = SentimentDistribution::default();
    for record in records {
        match stage.of(record) {
            Sentiment::Positive => distribution.positive += 1,
            Sentiment::Neutral => distribution.neutral += 1,
            Sentiment::Negative => distribution.negative += 1,
        }
    }
    distribution
}

pub fn sentiment_movement(records: &[SentimentRecord]) -> SentimentMovement {
    let improved = records.iter().filter(|r| is_improved(r)).count();
    let worsened = records
        .iter()
        .filter(|r| r.end.ordinal() < r.start.ordinal())
        .count();

    SentimentMovement {
        improved,
        stayed: records.len() - improved - worsened,
        worsened,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionBand {
    High,
    Medium,
    Low,
}

impl CompletionBand {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 80.0 {
            CompletionBand::High
        } else if rate >= 50.0 {
            CompletionBand::Medium
        } else {
            CompletionBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompletionBand::High => "high",
            CompletionBand::Medium => "medium",
            CompletionBand::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn from_trend(trend: f64) -> Self {
        if trend > 0.0 {
            TrendDirection::Up
        } else if trend < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TrendDirection::Up => "▲",
            TrendDirection::Down => "▼",
            TrendDirection::Flat => "=",
        }
    }
}

pub fn find_kpi<'a>(kpis: &'a [KpiRecord], name: &str) -> Option<&'a KpiRecord> {
    kpis.iter().find(|k| k.name == name)
}

/// Current value of the named KPI, or 0 when the dashboard has no such metric.
pub fn kpi_value(kpis: &[KpiRecord], name: &str) -> f64 {
    find_kpi(kpis, name).map(|k| k.value).unwrap_or(0.0)
}
