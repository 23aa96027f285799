use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four analytic criteria a grader scores a writing task on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AnalyticScores {
    pub task_response: Option<f64>,
    pub lexical_resources: Option<f64>,
    pub grammar_range_and_accuracy: Option<f64>,
    pub coherence_and_cohesion: Option<f64>,
}

impl AnalyticScores {
    pub fn new(
        task_response: f64,
        lexical_resources: f64,
        grammar_range_and_accuracy: f64,
        coherence_and_cohesion: f64,
    ) -> Self {
        AnalyticScores {
            task_response: Some(task_response),
            lexical_resources: Some(lexical_resources),
            grammar_range_and_accuracy: Some(grammar_range_and_accuracy),
            coherence_and_cohesion: Some(coherence_and_cohesion),
        }
    }

    pub fn criteria(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("task_response", self.task_response),
            ("lexical_resources", self.lexical_resources),
            ("grammar_range_and_accuracy", self.grammar_range_and_accuracy),
            ("coherence_and_cohesion", self.coherence_and_cohesion),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WritingGrade {
    pub scores: AnalyticScores,
    pub feedback: String,
    /// Aggregated overall band; `None` when the scores were incomplete.
    #[serde(default)]
    pub band: Option<f64>,
    pub graded_by: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub graded_at: DateTime<Utc>,
}
