use chrono::{DateTime, Utc};
use portal_common::validation::ValidationErrors;
use portal_common::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{patch, patch_opt, PoolStatus};

#[derive(Debug, Clone, FromRow)]
pub struct PoolRow {
    pub id: i64,
    pub consultant_id: i64,
    pub name: String,
    pub skill_category: String,
    pub description: Option<String>,
    pub status: String,
    pub total_candidates: i32,
    pub active_candidates: i32,
    pub inactive_candidates: i32,
    pub deployed_candidates: i32,
    pub active_jobs: i32,
    pub success_rate: f64,
    pub commission_earned: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_pool_fields(
    v: &mut ValidationErrors,
    name: Option<&str>,
    skill_category: Option<&str>,
    description: Option<&str>,
) {
    v.length("name", name, 0, 100, "Pool name must not exceed 100 characters");
    v.length(
        "skillCategory",
        skill_category,
        0,
        100,
        "Skill category must not exceed 100 characters",
    );
    v.length(
        "description",
        description,
        0,
        500,
        "Description must not exceed 500 characters",
    );
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    pub name: Option<String>,
    pub skill_category: Option<String>,
    pub description: Option<String>,
}

/// A validated pool ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPool {
    pub name: String,
    pub skill_category: String,
    pub description: Option<String>,
}

impl CreatePoolRequest {
    pub fn validate(self) -> Result<NewPool, AppError> {
        let mut v = ValidationErrors::new();
        v.required("name", self.name.as_deref(), "Pool name is required");
        v.required(
            "skillCategory",
            self.skill_category.as_deref(),
            "Skill category is required",
        );
        validate_pool_fields(
            &mut v,
            self.name.as_deref(),
            self.skill_category.as_deref(),
            self.description.as_deref(),
        );
        v.into_result()?;

        Ok(NewPool {
            name: self.name.unwrap_or_default().trim().to_string(),
            skill_category: self.skill_category.unwrap_or_default().trim().to_string(),
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoolRequest {
    pub name: Option<String>,
    pub skill_category: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl UpdatePoolRequest {
    pub fn validate(&self) -> Result<Option<PoolStatus>, AppError> {
        let mut v = ValidationErrors::new();
        validate_pool_fields(
            &mut v,
            self.name.as_deref(),
            self.skill_category.as_deref(),
            self.description.as_deref(),
        );
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = PoolStatus::parse(raw);
                if parsed.is_none() {
                    v.add("status", "Pool status must be ACTIVE, INACTIVE or NEW", Some(raw));
                }
                parsed
            }
        };
        v.into_result()?;
        Ok(status)
    }

    /// The new name when it actually changes the pool's name.
    pub fn renamed_to<'a>(&'a self, row: &PoolRow) -> Option<&'a str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != row.name)
    }

    pub fn apply_to(self, row: &mut PoolRow, status: Option<PoolStatus>) {
        patch(
            &mut row.name,
            self.name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        );
        patch(&mut row.skill_category, self.skill_category);
        patch_opt(&mut row.description, self.description);
        patch(&mut row.status, status.map(|s| s.as_str().to_string()));
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolResponse {
    pub id: i64,
    pub name: String,
    pub skill_category: String,
    pub description: Option<String>,
    pub status: String,
    pub total_candidates: i32,
    pub active_candidates: i32,
    pub inactive_candidates: i32,
    pub deployed_candidates: i32,
    pub active_jobs: i32,
    pub success_rate: f64,
    pub commission_earned: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PoolRow> for PoolResponse {
    fn from(row: PoolRow) -> Self {
        PoolResponse {
            id: row.id,
            name: row.name,
            skill_category: row.skill_category,
            description: row.description,
            status: row.status,
            total_candidates: row.total_candidates,
            active_candidates: row.active_candidates,
            inactive_candidates: row.inactive_candidates,
            deployed_candidates: row.deployed_candidates,
            active_jobs: row.active_jobs,
            success_rate: row.success_rate,
            commission_earned: row.commission_earned,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetricsResponse {
    pub pool_id: i64,
    pub pool_name: String,
    pub workers_in_pool: i32,
    pub active_jobs: i32,
    pub success_rate: f64,
    pub commission_earned: i64,
    pub active_candidates: i32,
    pub inactive_candidates: i32,
    pub deployed_candidates: i32,
}

impl From<PoolRow> for PoolMetricsResponse {
    fn from(row: PoolRow) -> Self {
        PoolMetricsResponse {
            pool_id: row.id,
            pool_name: row.name,
            workers_in_pool: row.total_candidates,
            active_jobs: row.active_jobs,
            success_rate: row.success_rate,
            commission_earned: row.commission_earned,
            active_candidates: row.active_candidates,
            inactive_candidates: row.inactive_candidates,
            deployed_candidates: row.deployed_candidates,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSummaryResponse {
    pub id: i64,
    pub pool_name: String,
    pub total_candidates: i32,
    pub active_candidates: i32,
    pub total_commission_earned: i64,
    pub status: String,
}

impl From<PoolRow> for PoolSummaryResponse {
    fn from(row: PoolRow) -> Self {
        PoolSummaryResponse {
            id: row.id,
            pool_name: row.name,
            total_candidates: row.total_candidates,
            active_candidates: row.active_candidates,
            total_commission_earned: row.commission_earned,
            status: row.status,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn pool_row(id: i64, name: &str) -> PoolRow {
        let now = Utc::now();
        PoolRow {
            id,
            consultant_id: 1,
            name: name.into(),
            skill_category: "Security".into(),
            description: None,
            status: PoolStatus::New.as_str().into(),
            total_candidates: 0,
            active_candidates: 0,
            inactive_candidates: 0,
            deployed_candidates: 0,
            active_jobs: 0,
            success_rate: 0.0,
            commission_earned: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_requires_name_and_category() {
        let err = CreatePoolRequest {
            name: Some(" ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "skillCategory"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_trims_name() {
        let pool = CreatePoolRequest {
            name: Some(" Security Guards ".into()),
            skill_category: Some("Security".into()),
            description: None,
        }
        .validate()
        .unwrap();
        assert_eq!(pool.name, "Security Guards");
    }

    #[test]
    fn test_update_rejects_unknown_status() {
        let update = UpdatePoolRequest {
            status: Some("ARCHIVED".into()),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rename_detection() {
        let row = pool_row(4, "Drivers");
        let same = UpdatePoolRequest {
            name: Some("Drivers".into()),
            ..Default::default()
        };
        assert_eq!(same.renamed_to(&row), None);

        let renamed = UpdatePoolRequest {
            name: Some("Delivery Partners".into()),
            ..Default::default()
        };
        assert_eq!(renamed.renamed_to(&row), Some("Delivery Partners"));
    }

    #[test]
    fn test_update_applies_status_and_keeps_name() {
        let mut row = pool_row(4, "Drivers");
        let update = UpdatePoolRequest {
            description: Some("Two-wheeler licence".into()),
            status: Some("active".into()),
            ..Default::default()
        };
        let status = update.validate().unwrap();
        update.apply_to(&mut row, status);
        assert_eq!(row.name, "Drivers");
        assert_eq!(row.status, "ACTIVE");
        assert_eq!(row.description.as_deref(), Some("Two-wheeler licence"));
    }
}
