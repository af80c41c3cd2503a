//! Questionnaire scoring for submitted answers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    /// Index of the correct option.
    pub correct: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: i64,
    pub answer: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Score in 0..=100, rounded. Each question counts once however many answers
/// name it. Answers to unknown questions don't count, and a questionnaire with
/// no questions or a missing submission scores 0.
pub fn score(questions: &[Question], submission: Option<&Submission>) -> u32 {
    let Some(submission) = submission else {
        return 0;
    };
    if questions.is_empty() {
        return 0;
    }

    let correct: HashSet<i64> = submission
        .answers
        .iter()
        .filter(|ans| {
            questions
                .iter()
                .find(|q| q.id == ans.question_id)
                .is_some_and(|q| q.correct == ans.answer)
        })
        .map(|ans| ans.question_id)
        .collect();

    let pct = (correct.len() as f64 / questions.len() as f64) * 100.0;
    (pct.round() as u32).min(100)
}
