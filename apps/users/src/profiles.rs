use chrono::{DateTime, NaiveDate, Utc};
use portal_common::headers::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::warn;

#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileRow {
    /// Blank profile for a user updating for the first time.
    pub fn new_for(user: &AuthenticatedUser) -> Self {
        let now = Utc::now();
        UserProfileRow {
            id: user.id,
            full_name: None,
            email: user.email.clone(),
            phone: None,
            role: user.role.clone(),
            state: None,
            city: None,
            date_of_birth: None,
            profile_picture: None,
            bio: None,
            skills: None,
            education: None,
            experience: None,
            email_verified: false,
            phone_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
}

impl UpdateProfileRequest {
    /// Overwrites only the fields present in the request.
    pub fn apply(self, profile: &mut UserProfileRow) {
        fn set(target: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *target = value;
            }
        }

        set(&mut profile.full_name, self.full_name);
        set(&mut profile.phone, self.phone);
        set(&mut profile.state, self.state);
        set(&mut profile.city, self.city);
        set(&mut profile.profile_picture, self.profile_picture);
        set(&mut profile.bio, self.bio);
        set(&mut profile.skills, self.skills);
        set(&mut profile.education, self.education);
        set(&mut profile.experience, self.experience);

        if let Some(raw) = self.date_of_birth {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => profile.date_of_birth = Some(date),
                Err(e) => warn!(user_id = profile.id, value = %raw, error = %e, "Ignoring invalid dateOfBirth"),
            }
        }
        profile.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub is_active: bool,
}

impl From<UserProfileRow> for UserProfileResponse {
    fn from(row: UserProfileRow) -> Self {
        UserProfileResponse {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            state: row.state,
            city: row.city,
            date_of_birth: row.date_of_birth,
            profile_picture: row.profile_picture,
            bio: row.bio,
            skills: row.skills,
            education: row.education,
            experience: row.experience,
            email_verified: row.email_verified,
            phone_verified: row.phone_verified,
            is_active: row.is_active,
        }
    }
}

pub async fn find(pool: &PgPool, user_id: i64) -> Result<Option<UserProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn upsert(pool: &PgPool, p: &UserProfileRow) -> Result<UserProfileRow, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>(
        r#"
        INSERT INTO user_profiles
            (id, full_name, email, phone, role, state, city, date_of_birth, profile_picture,
             bio, skills, education, experience, email_verified, phone_verified, is_active,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        ON CONFLICT (id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            phone = EXCLUDED.phone,
            state = EXCLUDED.state,
            city = EXCLUDED.city,
            date_of_birth = EXCLUDED.date_of_birth,
            profile_picture = EXCLUDED.profile_picture,
            bio = EXCLUDED.bio,
            skills = EXCLUDED.skills,
            education = EXCLUDED.education,
            experience = EXCLUDED.experience,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(p.id)
    .bind(&p.full_name)
    .bind(&p.email)
    .bind(&p.phone)
    .bind(&p.role)
    .bind(&p.state)
    .bind(&p.city)
    .bind(p.date_of_birth)
    .bind(&p.profile_picture)
    .bind(&p.bio)
    .bind(&p.skills)
    .bind(&p.education)
    .bind(&p.experience)
    .bind(p.email_verified)
    .bind(p.phone_verified)
    .bind(p.is_active)
    .bind(p.created_at)
    .bind(p.updated_at)
    .fetch_one(pool)
    .await
}
