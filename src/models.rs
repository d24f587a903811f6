use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiRecord {
    pub name: String,
    pub value: f64,
    pub previous_value: f64,
    pub trend: f64,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRecord {
    pub name: String,
    pub total: f64,
    pub automated_completed: f64,
    pub human_completed: f64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub query: String,
    pub frequency: u32,
    pub automated: bool,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Ordinal used only for improvement comparisons.
    pub fn ordinal(self) -> u8 {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: String,
    pub conversation_id: Option<Uuid>,
    pub start: Sentiment,
    pub middle: Sentiment,
    pub end: Sentiment,
    pub automated: bool,
    pub date: NaiveDate,
    pub intent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStage {
    Start,
    Middle,
    End,
}

impl ConversationStage {
    pub fn of(self, record: &SentimentRecord) -> Sentiment {
        match self {
            ConversationStage::Start => record.start,
            ConversationStage::Middle => record.middle,
            ConversationStage::End => record.end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateFilter {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Percentage of conversations per handler whose closing sentiment beat the opening one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SentimentImprovement {
    pub automated_rate: f64,
    pub human_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentMovement {
    pub improved: usize,
    pub stayed: usize,
    pub worsened: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct JourneyFunnel {
    pub total_calls: f64,
    pub digital_calls: f64,
    pub live_calls: f64,
    pub escalated_calls: f64,
    pub positive_after_escalation: f64,
    pub digital_pct: f64,
    pub live_pct: f64,
    pub escalated_pct: f64,
    pub resolved_by_digital_pct: f64,
    pub positive_after_escalation_pct: f64,
}

/// Sampled conversations split by handler, with the live agent outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HandlerDecomposition {
    pub total_conversations: f64,
    pub automated: usize,
    pub human: usize,
    pub automated_pct: f64,
    pub human_pct: f64,
    pub human_resolved: usize,
    pub human_unresolved: usize,
    pub human_resolved_pct: f64,
    pub human_unresolved_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageIntent {
    pub name: String,
    pub value: f64,
}
