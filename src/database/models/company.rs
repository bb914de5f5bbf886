use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use validator::{Validate, ValidateUrl, ValidationErrors};

use super::{nullable, reject};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::sql_for_partial_update;
use crate::database::query_builder::bind_all_as;
use crate::filter::{FilterWhere, SqlParam};

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// API field name -> column name for partial updates
const JS_TO_SQL: &[(&str, &str)] = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Body of `POST /companies`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 25))]
    pub handle: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0))]
    pub num_employees: Option<i32>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

/// Body of `PATCH /companies/:handle`; the handle itself is not patchable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub logo_url: Option<Option<String>>,
}

impl Validate for CompanyPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            if name.is_empty() {
                reject(&mut errors, "name", "length", "name must not be empty");
            }
        }
        if let Some(Some(n)) = self.num_employees {
            if n < 0 {
                reject(&mut errors, "numEmployees", "range", "numEmployees must be >= 0");
            }
        }
        if let Some(Some(url)) = &self.logo_url {
            if !url.validate_url() {
                reject(&mut errors, "logoUrl", "url", "logoUrl must be a URL");
            }
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl CompanyPatch {
    fn into_changes(self) -> Vec<(&'static str, SqlParam)> {
        let mut changes = Vec::new();
        if let Some(name) = self.name {
            changes.push(("name", SqlParam::from(name)));
        }
        if let Some(description) = self.description {
            changes.push(("description", SqlParam::from(description)));
        }
        if let Some(num_employees) = self.num_employees {
            changes.push(("numEmployees", SqlParam::from(num_employees)));
        }
        if let Some(logo_url) = self.logo_url {
            changes.push(("logoUrl", SqlParam::from(logo_url)));
        }
        changes
    }
}

/// Query string of `GET /companies`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 0))]
    pub min_employees: Option<i32>,
    #[validate(range(min = 0))]
    pub max_employees: Option<i32>,
}

impl Company {
    /// Insert a company; a duplicate handle is a bad request
    pub async fn create(pool: &PgPool, data: NewCompany) -> Result<Company, DatabaseError> {
        let duplicate: Option<String> =
            sqlx::query_scalar("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.handle)
                .fetch_optional(pool)
                .await?;
        if duplicate.is_some() {
            return Err(DatabaseError::BadRequest(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(data.handle)
            .bind(data.name)
            .bind(data.description)
            .bind(data.num_employees)
            .bind(data.logo_url)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::from_write)?;

        debug!("Created company {}", company.handle);
        Ok(company)
    }

    /// All companies matching the filter, ordered by name
    pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, DatabaseError> {
        if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
            if min > max {
                return Err(DatabaseError::BadRequest(
                    "minEmployees cannot be greater than maxEmployees".to_string(),
                ));
            }
        }

        let mut filter_where = FilterWhere::new();
        if let Some(name) = &filter.name {
            filter_where.ilike("name", name)?;
        }
        if let Some(min) = filter.min_employees {
            filter_where.gte("num_employees", min)?;
        }
        if let Some(max) = filter.max_employees {
            filter_where.lte("num_employees", max)?;
        }
        let where_sql = filter_where.build();

        let sql = format!("SELECT {} FROM companies {} ORDER BY name", COLUMNS, where_sql.query);
        let companies = bind_all_as(sqlx::query_as::<_, Company>(&sql), &where_sql.params)
            .fetch_all(pool)
            .await?;
        Ok(companies)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<Company, DatabaseError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COLUMNS);
        sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    /// Partial update: only the fields present in `patch` change
    pub async fn update(pool: &PgPool, handle: &str, patch: CompanyPatch) -> Result<Company, DatabaseError> {
        let update = sql_for_partial_update(patch.into_changes(), JS_TO_SQL)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            update.set_cols,
            update.next_placeholder(),
            COLUMNS
        );

        let company = bind_all_as(sqlx::query_as::<_, Company>(&sql), &update.values)
            .bind(handle)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from_write)?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))?;

        debug!("Updated company {}", handle);
        Ok(company)
    }

    /// Delete a company; its jobs go with it
    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        let deleted: Option<String> =
            sqlx::query_scalar("DELETE FROM companies WHERE handle = $1 RETURNING handle")
                .bind(handle)
                .fetch_optional(pool)
                .await?;
        match deleted {
            Some(_) => {
                debug!("Removed company {}", handle);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No company: {}", handle))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_fields() {
        let company = Company {
            handle: "c1".to_string(),
            name: "C1".to_string(),
            description: "Desc1".to_string(),
            num_employees: Some(1),
            logo_url: None,
        };
        assert_eq!(
            serde_json::to_value(company).unwrap(),
            json!({
                "handle": "c1",
                "name": "C1",
                "description": "Desc1",
                "numEmployees": 1,
                "logoUrl": null,
            })
        );
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: CompanyPatch =
            serde_json::from_value(json!({ "name": "New", "logoUrl": null })).unwrap();
        assert_eq!(patch.logo_url, Some(None));
        assert_eq!(patch.num_employees, None);

        let changes = patch.into_changes();
        assert_eq!(
            changes,
            vec![("name", SqlParam::from("New")), ("logoUrl", SqlParam::Text(None))]
        );
    }

    #[test]
    fn patch_rejects_handle_changes() {
        let result = serde_json::from_value::<CompanyPatch>(json!({ "handle": "c1-new" }));
        assert!(result.is_err());
    }

    #[test]
    fn patch_validates_url_and_range() {
        let patch: CompanyPatch =
            serde_json::from_value(json!({ "logoUrl": "not-a-url", "numEmployees": -1 })).unwrap();
        let errors = patch.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("logoUrl"));
        assert!(fields.contains_key("numEmployees"));

        let ok: CompanyPatch =
            serde_json::from_value(json!({ "logoUrl": "http://new.img", "numEmployees": null })).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn new_company_requires_name() {
        let result = serde_json::from_value::<NewCompany>(json!({ "handle": "new", "numEmployees": 10 }));
        assert!(result.is_err());
    }

    #[test]
    fn new_company_validates_logo_url() {
        let company: NewCompany = serde_json::from_value(json!({
            "handle": "new",
            "name": "New",
            "description": "DescNew",
            "numEmployees": 10,
            "logoUrl": "not-a-url",
        }))
        .unwrap();
        assert!(company.validate().is_err());
    }
}
