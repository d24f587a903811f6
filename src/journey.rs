use clap::ValueEnum;

use crate::metrics::kpi_value;
use crate::models::{
    HandlerDecomposition, IntentRecord, JourneyFunnel, KpiRecord, Sentiment, SentimentRecord,
    StageIntent,
};
use crate::summary::ESCALATIONS;

pub const TOTAL_CONVERSATIONS: &str = "Total Conversations";

/// Share of conversations the digital agent picks up first.
const DIGITAL_SHARE: f64 = 0.75;
/// Share of escalated conversations that end on a positive note.
const POSITIVE_AFTER_ESCALATION: f64 = 0.65;
/// Share of live agent completions assumed to close positively.
const POSITIVE_LIVE_COMPLETIONS: f64 = 0.7;

fn ratio(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        (part / whole * 100.0).round()
    }
}

pub fn call_funnel(kpis: &[KpiRecord]) -> JourneyFunnel {
    let total_calls = kpi_value(kpis, TOTAL_CONVERSATIONS);
    let escalated_calls = kpi_value(kpis, ESCALATIONS);

    let digital_calls = (total_calls * DIGITAL_SHARE).round();
    let live_calls = total_calls - digital_calls;
    let positive_after_escalation = (escalated_calls * POSITIVE_AFTER_ESCALATION).round();
    let escalated_pct = ratio(escalated_calls, digital_calls);

    JourneyFunnel {
        total_calls,
        digital_calls,
        live_calls,
        escalated_calls,
        positive_after_escalation,
        digital_pct: ratio(digital_calls, total_calls),
        live_pct: ratio(live_calls, total_calls),
        escalated_pct,
        resolved_by_digital_pct: 100.0 - escalated_pct,
        positive_after_escalation_pct: ratio(positive_after_escalation, escalated_calls),
    }
}

/// Splits sampled conversations by handler against `total_conversations`.
/// A live agent conversation counts as resolved unless it ends negative.
pub fn decompose(total_conversations: f64, sentiments: &[SentimentRecord]) -> HandlerDecomposition {
    let automated = sentiments.iter().filter(|s| s.automated).count();
    let human = sentiments.len() - automated;
    let human_resolved = sentiments
        .iter()
        .filter(|s| !s.automated && s.end != Sentiment::Negative)
        .count();
    let human_unresolved = human - human_resolved;

    HandlerDecomposition {
        total_conversations,
        automated,
        human,
        automated_pct: ratio(automated as f64, total_conversations),
        human_pct: ratio(human as f64, total_conversations),
        human_resolved,
        human_unresolved,
        human_resolved_pct: ratio(human_resolved as f64, human as f64),
        human_unresolved_pct: ratio(human_unresolved as f64, human as f64),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JourneyStage {
    Total,
    Digital,
    Live,
    Escalated,
    Positive,
}

impl JourneyStage {
    pub const ALL: [JourneyStage; 5] = [
        JourneyStage::Total,
        JourneyStage::Digital,
        JourneyStage::Live,
        JourneyStage::Escalated,
        JourneyStage::Positive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            JourneyStage::Total => "All conversations",
            JourneyStage::Digital => "Digital agent",
            JourneyStage::Live => "Live agent",
            JourneyStage::Escalated => "Escalated",
            JourneyStage::Positive => "Positive outcome",
        }
    }

    fn value(self, intent: &IntentRecord) -> f64 {
        match self {
            JourneyStage::Total => intent.total,
            JourneyStage::Digital => intent.automated_completed,
            JourneyStage::Live => intent.human_completed,
            JourneyStage::Escalated => {
                (intent.total * (1.0 - intent.completion_rate / 100.0)).round()
            }
            JourneyStage::Positive => (intent.human_completed * POSITIVE_LIVE_COMPLETIONS).round(),
        }
    }
}

/// Per-intent volume at one stage of the call journey.
pub fn stage_intents(intents: &[IntentRecord], stage: JourneyStage) -> Vec<StageIntent> {
    intents
        .iter()
        .map(|intent| StageIntent {
            name: intent.name.clone(),
            value: stage.value(intent),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpi(name: &str, value: f64) -> KpiRecord {
        KpiRecord {
            name: name.to_string(),
            value,
            previous_value: value,
            trend: 0.0,
            unit: None,
        }
    }

    #[test]
    fn funnel_splits_conversations_by_handler() {
        let kpis = vec![kpi(TOTAL_CONVERSATIONS, 1247.0), kpi(ESCALATIONS, 243.0)];
        let funnel = call_funnel(&kpis);

        assert_eq!(funnel.digital_calls, 935.0);
        assert_eq!(funnel.live_calls, 312.0);
        assert_eq!(funnel.digital_pct, 75.0);
        assert_eq!(funnel.live_pct, 25.0);
        assert_eq!(funnel.escalated_pct, 26.0);
        assert_eq!(funnel.resolved_by_digital_pct, 74.0);
        assert_eq!(funnel.positive_after_escalation, 158.0);
        assert_eq!(funnel.positive_after_escalation_pct, 65.0);
    }

    #[test]
    fn empty_dashboard_yields_zeroes() {
        let funnel = call_funnel(&[]);
        assert_eq!(funnel.digital_pct, 0.0);
        assert_eq!(funnel.escalated_pct, 0.0);
        assert_eq!(funnel.resolved_by_digital_pct, 100.0);
        assert_eq!(funnel.positive_after_escalation_pct, 0.0);
    }

    fn sentiment(automated: bool, end: Sentiment) -> SentimentRecord {
        SentimentRecord {
            id: "sent-0".to_string(),
            conversation_id: None,
            start: Sentiment::Neutral,
            middle: Sentiment::Neutral,
            end,
            automated,
            date: chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            intent: None,
        }
    }

    #[test]
    fn decomposition_splits_handlers_and_live_outcomes() {
        let sentiments = vec![
            sentiment(true, Sentiment::Negative),
            sentiment(true, Sentiment::Positive),
            sentiment(false, Sentiment::Neutral),
            sentiment(false, Sentiment::Positive),
            sentiment(false, Sentiment::Negative),
        ];
        let split = decompose(10.0, &sentiments);

        assert_eq!(split.automated, 2);
        assert_eq!(split.human, 3);
        assert_eq!(split.automated_pct, 20.0);
        assert_eq!(split.human_pct, 30.0);
        assert_eq!(split.human_resolved, 2);
        assert_eq!(split.human_unresolved, 1);
        assert_eq!(split.human_resolved_pct, 67.0);
        assert_eq!(split.human_unresolved_pct, 33.0);
    }

    #[test]
    fn decomposition_without_conversations_is_zero() {
        let split = decompose(0.0, &[sentiment(true, Sentiment::Positive)]);
        assert_eq!(split.automated_pct, 0.0);
        assert_eq!(split.human_resolved_pct, 0.0);
        assert_eq!(split.human_unresolved_pct, 0.0);
        assert_eq!(decompose(0.0, &[]), HandlerDecomposition::default());
    }

    #[test]
    fn stage_values_follow_intent_fields() {
        let intents = vec![IntentRecord {
            name: "Billing Issue".to_string(),
            total: 183.0,
            automated_completed: 126.0,
            human_completed: 57.0,
            completion_rate: 68.9,
        }];
        let value = |stage| stage_intents(&intents, stage)[0].value;

        assert_eq!(value(JourneyStage::Total), 183.0);
        assert_eq!(value(JourneyStage::Digital), 126.0);
        assert_eq!(value(JourneyStage::Live), 57.0);
        assert_eq!(value(JourneyStage::Escalated), 57.0);
        assert_eq!(value(JourneyStage::Positive), 40.0);
        assert_eq!(stage_intents(&intents, JourneyStage::Total)[0].name, "Billing Issue");
    }
}
