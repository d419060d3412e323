use sqlx::{PgExecutor, PgPool};

use crate::models::consultant::{
    ConsultantRow, CreateConsultantParams, PLACEHOLDER_COMPANY, PLACEHOLDER_CONTACT,
};

pub async fn insert(pool: &PgPool, params: &CreateConsultantParams) -> Result<ConsultantRow, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        r#"
        INSERT INTO consultants (user_id, company_name, contact_person_name, phone_number, email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(params.user_id)
    .bind(PLACEHOLDER_COMPANY)
    .bind(PLACEHOLDER_CONTACT)
    .bind(params.phone_number.trim())
    .bind(params.email.trim())
    .fetch_one(pool)
    .await
}

pub async fn find_by_user_id(pool: &PgPool, user_id: i64) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>("SELECT * FROM consultants WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, consultant_id: i64) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>("SELECT * FROM consultants WHERE id = $1")
        .bind(consultant_id)
        .fetch_optional(pool)
        .await
}

pub async fn exists_for_user(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM consultants WHERE user_id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Case-insensitive; `except` skips the consultant being edited.
pub async fn email_taken(pool: &PgPool, email: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM consultants
            WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(email.trim())
    .bind(except)
    .fetch_one(pool)
    .await
}

/// Writes every editable column back and returns the stored row.
pub async fn save(pool: &PgPool, row: &ConsultantRow) -> Result<ConsultantRow, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        r#"
        UPDATE consultants SET
            company_name = $2, contact_person_name = $3, phone_number = $4,
            alternate_phone_number = $5, email = $6, current_address = $7,
            permanent_address = $8, city = $9, state = $10, country = $11, pincode = $12,
            profile_image_url = $13, industries_served = $14, functional_areas = $15,
            hiring_levels = $16, geographical_coverage = $17, is_profile_complete = $18,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.company_name)
    .bind(&row.contact_person_name)
    .bind(&row.phone_number)
    .bind(&row.alternate_phone_number)
    .bind(&row.email)
    .bind(&row.current_address)
    .bind(&row.permanent_address)
    .bind(&row.city)
    .bind(&row.state)
    .bind(&row.country)
    .bind(&row.pincode)
    .bind(&row.profile_image_url)
    .bind(&row.industries_served)
    .bind(&row.functional_areas)
    .bind(&row.hiring_levels)
    .bind(&row.geographical_coverage)
    .bind(row.is_profile_complete)
    .fetch_one(pool)
    .await
}

pub async fn mark_verified<'e, E>(db: E, consultant_id: i64) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE consultants SET is_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(consultant_id)
        .execute(db)
        .await?;
    Ok(())
}
