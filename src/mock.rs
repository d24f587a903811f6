use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    DateFilter, IntentRecord, KpiRecord, ResponseRecord, Sentiment, SentimentRecord, TrendPoint,
};

const SENTIMENT_SAMPLES: usize = 100;
const TREND_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    Today,
    Yesterday,
    #[value(name = "last-7-days")]
    Last7Days,
    #[value(name = "last-30-days")]
    Last30Days,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Yesterday => "Yesterday",
            Period::Last7Days => "Last 7 Days",
            Period::Last30Days => "Last 30 Days",
        }
    }

    /// How many sentiment samples the period keeps.
    pub fn sentiment_window(self) -> usize {
        match self {
            Period::Today => 20,
            Period::Yesterday => 25,
            Period::Last7Days => 70,
            Period::Last30Days => SENTIMENT_SAMPLES,
        }
    }
}

/// Every table the dashboard derives its views from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub period: Period,
    pub kpis: Vec<KpiRecord>,
    pub intents: Vec<IntentRecord>,
    pub responses: Vec<ResponseRecord>,
    pub sentiments: Vec<SentimentRecord>,
    pub trend: Vec<TrendPoint>,
}

/// Seeded source of synthetic dashboard data. Build one per session and pass it down.
pub struct MockSource {
    rng: StdRng,
    today: NaiveDate,
}

impl MockSource {
    pub fn new(seed: Option<u64>, today: NaiveDate) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, today }
    }

    pub fn kpis(&self) -> Vec<KpiRecord> {
        [
            ("Total Conversations", 1247.0, 1153.0, 8.2, None),
            ("Unique Users", 876.0, 812.0, 7.9, None),
            ("Total Requests", 3254.0, 3128.0, 4.0, None),
            ("Recognition %", 87.5, 82.1, 6.6, Some("%")),
            ("Completion %", 78.3, 76.5, 2.4, Some("%")),
            ("Escalations", 243.0, 276.0, -12.0, None),
        ]
        .into_iter()
        .map(|(name, value, previous_value, trend, unit)| KpiRecord {
            name: name.to_string(),
            value,
            previous_value,
            trend,
            unit: unit.map(str::to_string),
        })
        .collect()
    }

    pub fn intents(&self) -> Vec<IntentRecord> {
        [
            ("Account Balance Inquiry", 348.0, 321.0, 27.0, 92.2),
            ("Password Reset", 286.0, 251.0, 35.0, 87.8),
            ("Transaction History", 254.0, 209.0, 45.0, 82.3),
            ("Billing Issue", 183.0, 126.0, 57.0, 68.9),
            ("Service Outage", 155.0, 68.0, 87.0, 43.9),
            ("Product Information", 247.0, 218.0, 29.0, 88.3),
            ("Subscription Change", 129.0, 97.0, 32.0, 75.2),
            ("Refund Request", 112.0, 51.0, 61.0, 45.5),
            ("Shipping Status", 189.0, 172.0, 17.0, 91.0),
            ("Technical Support", 203.0, 112.0, 91.0, 55.2),
        ]
        .into_iter()
        .map(
            |(name, total, automated_completed, human_completed, completion_rate)| IntentRecord {
                name: name.to_string(),
                total,
                automated_completed,
                human_completed,
                completion_rate,
            },
        )
        .collect()
    }

    pub fn responses(&self) -> Vec<ResponseRecord> {
        [
            ("What is my current account balance?", 128, true, 94.5),
            ("How do I reset my password?", 97, true, 91.8),
            ("Show me my recent transactions", 85, true, 89.3),
            ("What are your business hours?", 76, true, 97.2),
            ("How do I update my payment method?", 64, true, 88.6),
            ("Why was I charged twice?", 58, false, 97.8),
            ("My service is down, when will it be fixed?", 51, false, 95.2),
            ("I need a refund for my purchase", 47, false, 94.3),
            ("The product I received is damaged", 42, false, 98.1),
            ("I need to escalate my complaint", 39, false, 96.5),
        ]
        .into_iter()
        .map(|(query, frequency, automated, completion_rate)| ResponseRecord {
            query: query.to_string(),
            frequency,
            automated,
            completion_rate,
        })
        .collect()
    }

    fn any_sentiment(&mut self) -> Sentiment {
        Sentiment::ALL[self.rng.gen_range(0..Sentiment::ALL.len())]
    }

    /// Closing sentiment follows the mid-conversation mood. Human agents recover
    /// negative and neutral conversations more often than automated ones.
    fn closing_sentiment(&mut self, middle: Sentiment, automated: bool) -> Sentiment {
        let (lift_negative, lift_neutral) = if automated { (0.4, 0.5) } else { (0.8, 0.7) };
        match middle {
            Sentiment::Negative if self.rng.gen_bool(lift_negative) => Sentiment::Neutral,
            Sentiment::Negative => Sentiment::Negative,
            Sentiment::Neutral if self.rng.gen_bool(lift_neutral) => Sentiment::Positive,
            Sentiment::Neutral => Sentiment::Neutral,
            Sentiment::Positive => Sentiment::Positive,
        }
    }

    pub fn sentiments(&mut self, count: usize) -> Vec<SentimentRecord> {
        let intents = self.intents();
        let mut records = Vec::with_capacity(count);

        for i in 0..count {
            let start = self.any_sentiment();
            let middle = self.any_sentiment();
            let automated = self.rng.gen_bool(0.6);
            let end = self.closing_sentiment(middle, automated);
            let days_ago = self.rng.gen_range(0..30);
            let intent = intents[self.rng.gen_range(0..intents.len())].name.clone();

            records.push(SentimentRecord {
                id: format!("sent-{i}"),
                conversation_id: Some(Uuid::from_u128(self.rng.gen())),
                start,
                middle,
                end,
                automated,
                date: self.today - Duration::days(days_ago),
                intent: Some(intent),
            });
        }

        records
    }

    /// One point per day from `days` ago through today.
    pub fn trend(&mut self, days: i64) -> Vec<TrendPoint> {
        (0..=days.max(0))
            .rev()
            .map(|days_ago| TrendPoint {
                date: self.today - Duration::days(days_ago),
                value: 600 + self.rng.gen_range(0..700),
            })
            .collect()
    }

    pub fn date_filters(&self) -> Vec<DateFilter> {
        let today = self.today;
        vec![
            DateFilter {
                label: Period::Today.label().to_string(),
                start: today,
                end: today,
            },
            DateFilter {
                label: Period::Yesterday.label().to_string(),
                start: today - Duration::days(1),
                end: today - Duration::days(1),
            },
            DateFilter {
                label: Period::Last7Days.label().to_string(),
                start: today - Duration::days(6),
                end: today,
            },
            DateFilter {
                label: Period::Last30Days.label().to_string(),
                start: today - Duration::days(29),
                end: today,
            },
        ]
    }

    fn jitter(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// First-load snapshot: the literal tables and the full sentiment sample.
    pub fn initial(&mut self) -> Dataset {
        let trend = self.trend(TREND_DAYS);
        let sentiments = self.sentiments(SENTIMENT_SAMPLES);

        Dataset {
            period: Period::Last7Days,
            kpis: self.kpis(),
            intents: self.intents(),
            responses: self.responses(),
            sentiments,
            trend,
        }
    }

    /// Fresh snapshot for `period`, with figures nudged the way the dashboard
    /// refreshes after a time-period change.
    pub fn for_period(&mut self, period: Period) -> Dataset {
        let kpis = self
            .kpis()
            .into_iter()
            .map(|kpi| KpiRecord {
                value: kpi.value * self.jitter(0.9, 1.1),
                trend: kpi.trend * self.jitter(0.8, 1.2),
                ..kpi
            })
            .collect();

        let intents = self
            .intents()
            .into_iter()
            .map(|intent| IntentRecord {
                total: intent.total * self.jitter(0.9, 1.1),
                automated_completed: intent.automated_completed * self.jitter(0.9, 1.1),
                human_completed: intent.human_completed * self.jitter(0.9, 1.1),
                completion_rate: intent.completion_rate * self.jitter(0.9, 1.1),
                ..intent
            })
            .collect();

        let trend = self.trend(TREND_DAYS);
        let mut sentiments = self.sentiments(SENTIMENT_SAMPLES);
        sentiments.truncate(period.sentiment_window());

        debug!(period = period.label(), sentiments = sentiments.len(), "generated dataset");

        Dataset {
            period,
            kpis,
            intents,
            responses: self.responses(),
            sentiments,
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn same_seed_produces_same_sentiments() {
        let first = MockSource::new(Some(7), today()).sentiments(50);
        let second = MockSource::new(Some(7), today()).sentiments(50);
        let summarize = |records: &[SentimentRecord]| {
            records
                .iter()
                .map(|r| (r.start, r.middle, r.end, r.automated, r.date, r.conversation_id))
                .collect::<Vec<_>>()
        };
        assert_eq!(summarize(&first), summarize(&second));
    }

    #[test]
    fn positive_middle_always_closes_positive() {
        let records = MockSource::new(Some(11), today()).sentiments(200);
        for record in records.iter().filter(|r| r.middle == Sentiment::Positive) {
            assert_eq!(record.end, Sentiment::Positive);
        }
    }

    #[test]
    fn sentiment_dates_fall_within_last_thirty_days() {
        let records = MockSource::new(Some(3), today()).sentiments(100);
        assert_eq!(records.len(), 100);
        assert_eq!(records[99].id, "sent-99");
        for record in records {
            assert!(record.date <= today());
            assert!(record.date > today() - Duration::days(30));
        }
    }

    #[test]
    fn trend_covers_each_day_in_order() {
        let points = MockSource::new(Some(1), today()).trend(14);
        assert_eq!(points.len(), 15);
        assert_eq!(points[0].date, today() - Duration::days(14));
        assert_eq!(points[14].date, today());
        assert!(points.iter().all(|p| (600..1300).contains(&p.value)));
    }

    #[test]
    fn fixed_tables_match_dashboard_defaults() {
        let source = MockSource::new(Some(0), today());
        assert_eq!(source.kpis().len(), 6);
        assert_eq!(source.intents().len(), 10);
        let responses = source.responses();
        assert_eq!(responses.iter().filter(|r| r.automated).count(), 5);
        assert_eq!(source.date_filters()[2].start, today() - Duration::days(6));
    }

    #[test]
    fn sentiments_carry_an_intent_from_the_table() {
        let mut source = MockSource::new(Some(13), today());
        let names: Vec<String> = source.intents().into_iter().map(|i| i.name).collect();
        for record in source.sentiments(40) {
            let intent = record.intent.expect("generated sentiment has an intent");
            assert!(names.contains(&intent));
        }
    }

    #[test]
    fn initial_dataset_uses_literal_tables() {
        let mut source = MockSource::new(Some(5), today());
        let dataset = source.initial();
        assert_eq!(dataset.period, Period::Last7Days);
        assert_eq!(dataset.sentiments.len(), 100);

        let escalations = dataset.kpis.iter().find(|k| k.name == "Escalations").unwrap();
        assert_eq!(escalations.value, 243.0);
        assert_eq!(escalations.trend, -12.0);
        assert_eq!(dataset.intents[0].completion_rate, 92.2);
    }

    #[test]
    fn period_limits_sentiment_samples_and_jitters_figures() {
        let mut source = MockSource::new(Some(5), today());
        let dataset = source.for_period(Period::Today);
        assert_eq!(dataset.sentiments.len(), 20);
        assert_eq!(dataset.trend.len(), 15);

        let baseline = source.kpis();
        for (jittered, original) in dataset.kpis.iter().zip(baseline.iter()) {
            assert_eq!(jittered.name, original.name);
            assert!(jittered.value >= original.value * 0.9);
            assert!(jittered.value < original.value * 1.1);
            assert_eq!(jittered.trend.signum(), original.trend.signum());
        }

        assert_eq!(source.for_period(Period::Last7Days).sentiments.len(), 70);
        assert_eq!(source.for_period(Period::Last30Days).sentiments.len(), 100);
    }
}
