use sqlx::PgPool;

use super::types::*;

const SELECT_EVALUATION_LIST: &str = "\
    SELECT e.id, e.score, e.created_at, e.task_id, t.title AS task_title, \
           e.subject_id, s.name AS subject_name, e.evaluator_id, ev.name AS evaluator_name \
    FROM evaluations e \
    JOIN tasks t ON t.id = e.task_id \
    JOIN users s ON s.id = e.subject_id \
    JOIN users ev ON ev.id = e.evaluator_id";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Evaluation>, sqlx::Error> {
    sqlx::query_as::<_, Evaluation>(
        "SELECT id, score, created_at, task_id, subject_id, evaluator_id FROM evaluations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Newest first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<EvaluationListItem>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationListItem>(&format!("{SELECT_EVALUATION_LIST} ORDER BY e.created_at DESC, e.id DESC"))
        .fetch_all(pool)
        .await
}

/// Evaluations about one user, newest first.
pub async fn find_for_subject(pool: &PgPool, subject_id: i64) -> Result<Vec<EvaluationListItem>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationListItem>(&format!(
        "{SELECT_EVALUATION_LIST} WHERE e.subject_id = $1 ORDER BY e.created_at DESC, e.id DESC"
    ))
    .bind(subject_id)
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &PgPool, input: &EvaluationInput, evaluator_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO evaluations (score, task_id, subject_id, evaluator_id) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(input.score)
    .bind(input.task_id)
    .bind(input.subject_id)
    .bind(evaluator_id)
    .fetch_one(pool)
    .await
}

/// Overwrite score, task and subject; the editor becomes the evaluator.
pub async fn update(pool: &PgPool, id: i64, input: &EvaluationInput, evaluator_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE evaluations SET score = $1, task_id = $2, subject_id = $3, evaluator_id = $4 WHERE id = $5",
    )
    .bind(input.score)
    .bind(input.task_id)
    .bind(input.subject_id)
    .bind(evaluator_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM evaluations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mean score for a user, `None` when they have no evaluations.
pub async fn average_for_subject(pool: &PgPool, subject_id: i64) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar("SELECT AVG(score)::FLOAT8 FROM evaluations WHERE subject_id = $1")
        .bind(subject_id)
        .fetch_one(pool)
        .await
}
