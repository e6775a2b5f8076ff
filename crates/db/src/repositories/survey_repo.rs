use sqlx::PgPool;

use crate::models::survey::{
    CreateSurvey, CreateSurveyResponse, Survey, SurveyResponse, UpdateSurvey,
};
use glow_core::types::DbId;

const SURVEY_COLUMNS: &str =
    "id, title, description, questions, is_active, created_at, updated_at";

pub struct SurveyRepo;

impl SurveyRepo {
    pub async fn create(pool: &PgPool, data: &CreateSurvey) -> Result<Survey, sqlx::Error> {
        let query = format!(
            "INSERT INTO surveys (title, description, questions) \
             VALUES ($1, $2, $3) RETURNING {SURVEY_COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(&data.title)
            .bind(&data.description)
            .bind(&data.questions)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {SURVEY_COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys \
             WHERE NOT $1 OR is_active \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(active_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateSurvey,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                questions = COALESCE($4, questions), \
                is_active = COALESCE($5, is_active) \
             WHERE id = $1 RETURNING {SURVEY_COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(&data.questions)
            .bind(data.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const RESPONSE_COLUMNS: &str =
    "id, survey_id, profile_id, answers, submitted_at, created_at";

pub struct SurveyResponseRepo;

impl SurveyResponseRepo {
    pub async fn create(
        pool: &PgPool,
        data: &CreateSurveyResponse,
    ) -> Result<SurveyResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO survey_responses (survey_id, profile_id, answers) \
             VALUES ($1, $2, $3) RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(data.survey_id)
            .bind(data.profile_id)
            .bind(&data.answers)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SurveyResponse>, sqlx::Error> {
        let query = format!("SELECT {RESPONSE_COLUMNS} FROM survey_responses WHERE id = $1");
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SurveyResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM survey_responses \
             WHERE survey_id = $1 ORDER BY submitted_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(survey_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SurveyResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM survey_responses \
             WHERE profile_id = $1 ORDER BY submitted_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
