use serde::Serialize;
use sqlx::FromRow;

use super::candidate::CandidateResponse;
use super::consultant::ConsultantRow;
use super::pool::PoolSummaryResponse;
use super::verification::VerificationStats;
use super::{percentage, VerificationStatus};

// ──────────────────────────────────────────────
// Aggregates read straight from SQL
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct PoolOverviewStats {
    pub total_pools: i64,
    pub active_pools: i64,
    pub inactive_pools: i64,
    pub total_candidates_in_pools: i64,
    pub total_commission: i64,
    pub active_jobs: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct WorkforceStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub deployed: i64,
    pub verified: i64,
    pub male: i64,
    pub female: i64,
}

/// Recent candidate with the status of its verification record, if any.
#[derive(Debug, Clone, FromRow)]
pub struct OnboardedRow {
    pub candidate_id: i64,
    pub name: String,
    pub position: Option<String>,
    pub verification_status: Option<String>,
}

// ──────────────────────────────────────────────
// Dashboard sections
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverviewResponse {
    pub total_pools: i64,
    pub active_pools: i64,
    pub total_candidates: i64,
    pub active_candidates: i64,
    pub deployed_candidates: i64,
    pub pending_verifications: i64,
    pub verified_candidates: i64,
    pub total_commission_earned: i64,
}

impl DashboardOverviewResponse {
    pub fn new(pools: &PoolOverviewStats, workforce: &WorkforceStats, verifications: &VerificationStats) -> Self {
        DashboardOverviewResponse {
            total_pools: pools.total_pools,
            active_pools: pools.active_pools,
            total_candidates: workforce.total,
            active_candidates: workforce.active,
            deployed_candidates: workforce.deployed,
            pending_verifications: verifications.open(),
            verified_candidates: verifications.verified,
            total_commission_earned: pools.total_commission,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceMetricsResponse {
    pub total_candidates: i64,
    pub active_candidates: i64,
    pub inactive_candidates: i64,
    pub deployed_candidates: i64,
    pub verified_candidates: i64,
    pub male_count: i64,
    pub female_count: i64,
}

impl From<&WorkforceStats> for WorkforceMetricsResponse {
    fn from(stats: &WorkforceStats) -> Self {
        WorkforceMetricsResponse {
            total_candidates: stats.total,
            active_candidates: stats.active,
            inactive_candidates: stats.inactive,
            deployed_candidates: stats.deployed,
            verified_candidates: stats.verified,
            male_count: stats.male,
            female_count: stats.female,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPerformanceResponse {
    pub total_pools: i64,
    pub active_pools: i64,
    pub inactive_pools: i64,
    pub total_candidates_in_pools: i64,
    pub total_commission_earned: i64,
    pub top_performing_pools: Vec<PoolSummaryResponse>,
}

impl PoolPerformanceResponse {
    pub fn new(stats: &PoolOverviewStats, top_performing_pools: Vec<PoolSummaryResponse>) -> Self {
        PoolPerformanceResponse {
            total_pools: stats.total_pools,
            active_pools: stats.active_pools,
            inactive_pools: stats.inactive_pools,
            total_candidates_in_pools: stats.total_candidates_in_pools,
            total_commission_earned: stats.total_commission,
            top_performing_pools,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationProgressResponse {
    pub total_verifications: i64,
    pub pending_verifications: i64,
    pub under_verification: i64,
    pub verified_count: i64,
    pub rejected_count: i64,
    pub completion_percentage: f64,
}

impl From<&VerificationStats> for VerificationProgressResponse {
    fn from(stats: &VerificationStats) -> Self {
        VerificationProgressResponse {
            total_verifications: stats.total,
            pending_verifications: stats.pending,
            under_verification: stats.under_verification,
            verified_count: stats.verified,
            rejected_count: stats.rejected,
            completion_percentage: percentage(stats.verified, stats.total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityResponse {
    pub recent_candidates: Vec<CandidateResponse>,
    pub recent_pools: Vec<PoolSummaryResponse>,
    pub pending_verifications_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummaryResponse {
    pub total_commission_earned: i64,
    pub total_pools: i64,
    pub top_earning_pools: Vec<PoolSummaryResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantPerformanceResponse {
    pub consultant_name: String,
    pub profile_completeness_percentage: i32,
    pub total_pools: i64,
    pub total_candidates: i64,
    pub deployed_candidates: i64,
    pub total_commission_earned: i64,
    pub successful_placements: i64,
    pub verification_rate: f64,
}

impl ConsultantPerformanceResponse {
    /// Placements are counted as currently deployed candidates.
    pub fn new(consultant: &ConsultantRow, overview: &DashboardOverviewResponse) -> Self {
        ConsultantPerformanceResponse {
            consultant_name: consultant.contact_person_name.clone(),
            profile_completeness_percentage: consultant.completeness_percentage(),
            total_pools: overview.total_pools,
            total_candidates: overview.total_candidates,
            deployed_candidates: overview.deployed_candidates,
            total_commission_earned: overview.total_commission_earned,
            successful_placements: overview.deployed_candidates,
            verification_rate: percentage(overview.verified_candidates, overview.total_candidates),
        }
    }
}

// ──────────────────────────────────────────────
// Home screen (GET /api/consultants/dashboard)
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolOverviewResponse {
    pub workers_in_pool: i64,
    pub active_jobs: i64,
    pub success_rate: f64,
    pub commission_earned: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetricsResponse {
    pub past_placements: i32,
    pub success_rate: f64,
    pub incentives: i64,
    pub ratings: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceMetricsResponse {
    pub total_commission: i64,
    pub commission_earned: i64,
    pub pending_commission: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyOnboardedResponse {
    pub candidate_id: i64,
    pub name: String,
    pub position: Option<String>,
    pub verification_status: String,
    pub status_message: &'static str,
}

impl From<OnboardedRow> for RecentlyOnboardedResponse {
    fn from(row: OnboardedRow) -> Self {
        let status = row
            .verification_status
            .as_deref()
            .and_then(VerificationStatus::parse)
            .unwrap_or(VerificationStatus::New);
        RecentlyOnboardedResponse {
            candidate_id: row.candidate_id,
            name: row.name,
            position: row.position,
            verification_status: status.as_str().to_string(),
            status_message: status_message(status),
        }
    }
}

/// Short line shown under each recently onboarded candidate.
pub fn status_message(status: VerificationStatus) -> &'static str {
    match status {
        VerificationStatus::New => "Verification pending",
        VerificationStatus::UnderVerification => "Verification in progress",
        VerificationStatus::PoliceVerified => "Police verification complete",
        VerificationStatus::HealthCheckRequired => "Health check required",
        VerificationStatus::Verified => "Verified and ready to deploy",
        VerificationStatus::Rejected => "Verification rejected",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub pool_overview: PoolOverviewResponse,
    pub workforce_metrics: WorkforceMetricsResponse,
    pub performance_metrics: PerformanceMetricsResponse,
    pub finance_metrics: FinanceMetricsResponse,
    pub recently_onboarded: Vec<RecentlyOnboardedResponse>,
}

impl DashboardResponse {
    pub fn new(
        consultant: &ConsultantRow,
        pools: &PoolOverviewStats,
        workforce: &WorkforceStats,
        onboarded: Vec<OnboardedRow>,
    ) -> Self {
        DashboardResponse {
            pool_overview: PoolOverviewResponse {
                workers_in_pool: workforce.total,
                active_jobs: pools.active_jobs,
                success_rate: consultant.success_rate,
                commission_earned: pools.total_commission,
            },
            workforce_metrics: WorkforceMetricsResponse::from(workforce),
            performance_metrics: PerformanceMetricsResponse {
                past_placements: consultant.total_placements,
                success_rate: consultant.success_rate,
                incentives: consultant.total_incentives_earned,
                ratings: consultant.rating,
            },
            finance_metrics: FinanceMetricsResponse {
                total_commission: consultant.total_commission_earned,
                commission_earned: pools.total_commission,
                pending_commission: consultant.pending_commission,
            },
            recently_onboarded: onboarded.into_iter().map(Into::into).collect(),
        }
    }
}
