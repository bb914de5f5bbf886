use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use validator::{Validate, ValidationErrors};

use super::{nullable, reject};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::sql_for_partial_update;
use crate::database::query_builder::bind_all_as;
use crate::filter::{FilterWhere, SqlParam};

const COLUMNS: &str = "id, title, salary, equity, company_handle";

fn equity_in_range(equity: &Decimal) -> bool {
    *equity >= Decimal::ZERO && *equity <= Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Serialized as a decimal string, e.g. `"0.1"`
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Body of `POST /jobs`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Validate for NewJob {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.is_empty() {
            reject(&mut errors, "title", "length", "title must not be empty");
        }
        if matches!(self.salary, Some(s) if s < 0) {
            reject(&mut errors, "salary", "range", "salary must be >= 0");
        }
        if matches!(&self.equity, Some(e) if !equity_in_range(e)) {
            reject(&mut errors, "equity", "range", "equity must be between 0 and 1");
        }
        if self.company_handle.is_empty() || self.company_handle.len() > 25 {
            reject(&mut errors, "companyHandle", "length", "companyHandle must be 1-25 characters");
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Body of `PATCH /jobs/:id`; neither the id nor the company can change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub equity: Option<Option<Decimal>>,
}

impl Validate for JobPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if matches!(&self.title, Some(t) if t.is_empty()) {
            reject(&mut errors, "title", "length", "title must not be empty");
        }
        if matches!(self.salary, Some(Some(s)) if s < 0) {
            reject(&mut errors, "salary", "range", "salary must be >= 0");
        }
        if matches!(&self.equity, Some(Some(e)) if !equity_in_range(e)) {
            reject(&mut errors, "equity", "range", "equity must be between 0 and 1");
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl JobPatch {
    fn into_changes(self) -> Vec<(&'static str, SqlParam)> {
        let mut changes = Vec::new();
        if let Some(title) = self.title {
            changes.push(("title", SqlParam::from(title)));
        }
        if let Some(salary) = self.salary {
            changes.push(("salary", SqlParam::from(salary)));
        }
        if let Some(equity) = self.equity {
            changes.push(("equity", SqlParam::from(equity)));
        }
        changes
    }
}

/// Query string of `GET /jobs`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(range(min = 0))]
    pub min_salary: Option<i32>,
    /// Only `true` narrows the search; `false` means "don't care"
    pub has_equity: Option<bool>,
    pub company_handle: Option<String>,
}

impl Job {
    pub async fn create(pool: &PgPool, data: NewJob) -> Result<Job, DatabaseError> {
        let duplicate: Option<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE title = $1")
            .bind(&data.title)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(DatabaseError::BadRequest(format!("Duplicate job: {}", data.title)));
        }

        let company: Option<String> =
            sqlx::query_scalar("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.company_handle)
                .fetch_optional(pool)
                .await?;
        if company.is_none() {
            return Err(DatabaseError::BadRequest(format!("No company: {}", data.company_handle)));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(data.company_handle)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::from_write)?;

        debug!("Created job {} ({})", job.id, job.title);
        Ok(job)
    }

    /// All jobs matching the filter, ordered by title
    pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, DatabaseError> {
        let mut filter_where = FilterWhere::new();
        if let Some(title) = &filter.title {
            filter_where.ilike("title", title)?;
        }
        if let Some(min_salary) = filter.min_salary {
            filter_where.gte("salary", min_salary)?;
        }
        if filter.has_equity == Some(true) {
            filter_where.raw("\"equity\" > 0");
        }
        if let Some(handle) = &filter.company_handle {
            filter_where.eq("company_handle", handle.as_str())?;
        }
        let where_sql = filter_where.build();

        let sql = format!("SELECT {} FROM jobs {} ORDER BY title", COLUMNS, where_sql.query);
        let jobs = bind_all_as(sqlx::query_as::<_, Job>(&sql), &where_sql.params)
            .fetch_all(pool)
            .await?;
        Ok(jobs)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, DatabaseError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", COLUMNS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }

    pub async fn update(pool: &PgPool, id: i32, patch: JobPatch) -> Result<Job, DatabaseError> {
        let update = sql_for_partial_update(patch.into_changes(), &[])?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = {} RETURNING {}",
            update.set_cols,
            update.next_placeholder(),
            COLUMNS
        );

        let job = bind_all_as(sqlx::query_as::<_, Job>(&sql), &update.values)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from_write)?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))?;

        debug!("Updated job {}", id);
        Ok(job)
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match deleted {
            Some(_) => {
                debug!("Removed job {}", id);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No job: {}", id))),
        }
    }
}
