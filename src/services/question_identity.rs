use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::domain::content::ContentPart;

/// Number → question id lookup for one content part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartQuestionMap {
    pub part_id: String,
    pub question_ids: BTreeMap<u32, String>,
}

impl PartQuestionMap {
    pub fn question_id(&self, number: u32) -> Option<&str> {
        self.question_ids.get(&number).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

/// Flattens each part's question tree into a map from test-wide question
/// number to the stable id of the answerable item carrying that number.
///
/// A question with sub-questions contributes its sub-questions and never
/// itself. Items without a number are skipped. The output keeps part order.
pub fn resolve_question_ids(parts: &[ContentPart]) -> Vec<PartQuestionMap> {
    parts.iter().map(resolve_part).collect()
}

fn resolve_part(part: &ContentPart) -> PartQuestionMap {
    let mut question_ids = BTreeMap::new();

    let numbered = part.questions.iter().flat_map(|question| {
        if question.sub_questions.is_empty() {
            vec![(question.question_number, question.id.as_str())]
        } else {
            question
                .sub_questions
                .iter()
                .map(|sub| (sub.question_number, sub.id.as_str()))
                .collect()
        }
    });

    for (number, id) in numbered {
        let Some(number) = number else {
            continue;
        };

        if let Some(existing) = question_ids.get(&number) {
            log::warn!(
                "Part '{}' numbers question {} twice ('{}' and '{}'); keeping the first",
                part.id,
                number,
                existing,
                id
            );
            continue;
        }

        question_ids.insert(number, id.to_string());
    }

    PartQuestionMap {
        part_id: part.id.clone(),
        question_ids,
    }
}

pub fn total_questions(mappings: &[PartQuestionMap]) -> usize {
    mappings.iter().map(|m| m.question_ids.len()).sum()
}
