//! Dynamic WHERE/ORDER BY construction for job listings.

use portal_common::pagination::PageRequest;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{JobListParams, JobStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobSort {
    #[default]
    Newest,
    Salary,
}

impl JobSort {
    /// `salary` sorts by pay; anything else (`date`, `relevance`, missing) is newest first.
    pub fn from_param(raw: Option<&str>) -> JobSort {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("salary") => JobSort::Salary,
            _ => JobSort::Newest,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            JobSort::Newest => "created_at DESC",
            JobSort::Salary => "min_salary DESC NULLS LAST, created_at DESC",
        }
    }
}

/// Listing filter. Only ACTIVE jobs are ever returned; blank text filters are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub location: Option<String>,
    pub category: Option<String>,
    pub experience: Option<String>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
    pub sort: JobSort,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<&JobListParams> for JobFilter {
    fn from(params: &JobListParams) -> Self {
        JobFilter {
            location: non_blank(params.location.clone()),
            category: non_blank(params.category.clone()),
            experience: non_blank(params.experience.clone()),
            min_salary: params.min_salary,
            max_salary: params.max_salary,
            sort: JobSort::from_param(params.sort.as_deref()),
        }
    }
}

impl JobFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" WHERE status = ").push_bind(JobStatus::Active.as_str());

        if let Some(location) = &self.location {
            qb.push(" AND LOWER(location) LIKE ")
                .push_bind(format!("%{}%", location.to_lowercase()));
        }
        if let Some(category) = &self.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(experience) = &self.experience {
            qb.push(" AND LOWER(experience) LIKE ")
                .push_bind(format!("%{}%", experience.to_lowercase()));
        }
        // Range overlap: the job's band must reach the requested bounds.
        if let Some(min) = self.min_salary {
            qb.push(" AND max_salary >= ").push_bind(min);
        }
        if let Some(max) = self.max_salary {
            qb.push(" AND min_salary <= ").push_bind(max);
        }
    }

    pub fn select_query(&self, page: PageRequest) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT * FROM jobs");
        self.push_where(&mut qb);
        qb.push(" ORDER BY ")
            .push(self.sort.order_by())
            .push(" LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        qb
    }

    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        self.push_where(&mut qb);
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageRequest {
        PageRequest { page: 0, size: 20 }
    }

    #[test]
    fn test_empty_filter_only_selects_active() {
        let qb = JobFilter::default().select_query(page());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM jobs WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_all_filters_in_order() {
        let filter = JobFilter {
            location: Some("Pune".into()),
            category: Some("IT".into()),
            experience: Some("Senior".into()),
            min_salary: Some(500000),
            max_salary: Some(900000),
            sort: JobSort::Salary,
        };
        assert_eq!(
            filter.count_query().sql(),
            "SELECT COUNT(*) FROM jobs WHERE status = $1 AND LOWER(location) LIKE $2 \
             AND category = $3 AND LOWER(experience) LIKE $4 AND max_salary >= $5 AND min_salary <= $6"
        );
        assert!(filter
            .select_query(page())
            .sql()
            .contains("ORDER BY min_salary DESC NULLS LAST, created_at DESC LIMIT $7 OFFSET $8"));
    }

    #[test]
    fn test_blank_params_are_ignored() {
        let params = JobListParams {
            location: Some("   ".into()),
            category: Some("".into()),
            experience: Some(" mid ".into()),
            sort: Some("relevance".into()),
            ..Default::default()
        };
        let filter = JobFilter::from(&params);
        assert_eq!(filter.location, None);
        assert_eq!(filter.category, None);
        assert_eq!(filter.experience.as_deref(), Some("mid"));
        assert_eq!(filter.sort, JobSort::Newest);
    }

    #[test]
    fn test_sort_param() {
        assert_eq!(JobSort::from_param(Some("SALARY")), JobSort::Salary);
        assert_eq!(JobSort::from_param(Some("date")), JobSort::Newest);
        assert_eq!(JobSort::from_param(None), JobSort::Newest);
    }
}
