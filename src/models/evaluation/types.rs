use chrono::NaiveDateTime;
use serde::Serialize;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Evaluation {
    pub id: i64,
    pub score: i32,
    pub created_at: NaiveDateTime,
    pub task_id: i64,
    pub subject_id: i64,
    pub evaluator_id: i64,
}

/// Evaluation joined with task title and both user names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EvaluationListItem {
    pub id: i64,
    pub score: i32,
    pub created_at: NaiveDateTime,
    pub task_id: i64,
    pub task_title: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub evaluator_id: i64,
    pub evaluator_name: String,
}

/// Validated input for create and edit. The evaluator is always the caller.
#[derive(Debug, Clone)]
pub struct EvaluationInput {
    pub score: i32,
    pub task_id: i64,
    pub subject_id: i64,
}

/// Check the score range and the subject/evaluator distinction.
pub fn validate_evaluation(score: i32, subject_id: i64, evaluator_id: i64) -> Vec<String> {
    let mut errors = Vec::new();
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        errors.push(format!("Score must be between {MIN_SCORE} and {MAX_SCORE}"));
    }
    if subject_id == evaluator_id {
        errors.push("You cannot evaluate yourself".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(validate_evaluation(1, 2, 3).is_empty());
        assert!(validate_evaluation(5, 2, 3).is_empty());
        assert_eq!(validate_evaluation(0, 2, 3).len(), 1);
        assert_eq!(validate_evaluation(6, 2, 3).len(), 1);
    }

    #[test]
    fn self_evaluation_rejected() {
        let errors = validate_evaluation(3, 4, 4);
        assert_eq!(errors, vec!["You cannot evaluate yourself".to_string()]);
    }
}
