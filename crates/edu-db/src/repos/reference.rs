//! Hierarchy and category catalog.
//!
//! Reference tables are read-only to the engine. They are loaded in bulk
//! from a JSON document with [`EduDb::seed`]; re-seeding updates rows in
//! place so existing entries keep their foreign keys.

use edu_core::entities::{Category, Column, Region, School, Sector, ValidationRules};
use edu_core::errors::StorageError;
use edu_core::ports::ReferenceLookup;
use serde::{Deserialize, Serialize};

use crate::EduDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_enum};

/// A bulk reference data document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub schools: Vec<School>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl ReferenceData {
    /// # Errors
    ///
    /// Returns `DatabaseError::Json` if the document does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, DatabaseError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.regions.len()
            + self.sectors.len()
            + self.schools.len()
            + self.categories.len()
            + self.columns.len()
    }
}

const SCHOOL_COLUMNS: &str = "id, sector_id, region_id, name, admin_id";
const COLUMN_COLUMNS: &str =
    "id, category_id, name, column_type, is_required, validation, options, order_index";

fn school_from_row(row: &libsql::Row) -> Result<School, DatabaseError> {
    Ok(School {
        id: row.get::<String>(0)?,
        sector_id: row.get::<String>(1)?,
        region_id: row.get::<String>(2)?,
        name: row.get::<String>(3)?,
        admin_id: get_opt_string(row, 4)?,
    })
}

fn column_from_row(row: &libsql::Row) -> Result<Column, DatabaseError> {
    let validation = match get_opt_string(row, 5)? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| DatabaseError::InvalidState(format!("column validation: {e}")))?,
        None => ValidationRules::default(),
    };
    let options = match get_opt_string(row, 6)? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| DatabaseError::InvalidState(format!("column options: {e}")))?,
        None => Vec::new(),
    };
    Ok(Column {
        id: row.get::<String>(0)?,
        category_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        column_type: parse_enum(&row.get::<String>(3)?)?,
        is_required: row.get::<i64>(4)? != 0,
        validation,
        options,
        order_index: u32::try_from(row.get::<i64>(7)?)
            .map_err(|e| DatabaseError::InvalidState(format!("column order_index: {e}")))?,
    })
}

impl EduDb {
    /// Insert or update every row of `data` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any row violates the schema; nothing is
    /// written in that case.
    pub async fn seed(&self, data: &ReferenceData) -> Result<usize, DatabaseError> {
        let tx = self.conn.transaction().await?;

        for region in &data.regions {
            tx.execute(
                "INSERT INTO regions (id, name) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                libsql::params![region.id.as_str(), region.name.as_str()],
            )
            .await?;
        }
        for sector in &data.sectors {
            tx.execute(
                "INSERT INTO sectors (id, region_id, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET region_id = excluded.region_id, name = excluded.name",
                libsql::params![
                    sector.id.as_str(),
                    sector.region_id.as_str(),
                    sector.name.as_str()
                ],
            )
            .await?;
        }
        for school in &data.schools {
            tx.execute(
                "INSERT INTO schools (id, sector_id, region_id, name, admin_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    sector_id = excluded.sector_id,
                    region_id = excluded.region_id,
                    name = excluded.name,
                    admin_id = excluded.admin_id",
                libsql::params![
                    school.id.as_str(),
                    school.sector_id.as_str(),
                    school.region_id.as_str(),
                    school.name.as_str(),
                    opt_text(school.admin_id.as_deref())
                ],
            )
            .await?;
        }
        for category in &data.categories {
            tx.execute(
                "INSERT INTO categories (id, name, assignment, status) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    assignment = excluded.assignment,
                    status = excluded.status",
                libsql::params![
                    category.id.as_str(),
                    category.name.as_str(),
                    category.assignment.as_str(),
                    category.status.as_str()
                ],
            )
            .await?;
        }
        for column in &data.columns {
            let validation = serde_json::to_string(&column.validation)?;
            let options = serde_json::to_string(&column.options)?;
            tx.execute(
                "INSERT INTO category_columns
                    (id, category_id, name, column_type, is_required, validation, options, order_index)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    category_id = excluded.category_id,
                    name = excluded.name,
                    column_type = excluded.column_type,
                    is_required = excluded.is_required,
                    validation = excluded.validation,
                    options = excluded.options,
                    order_index = excluded.order_index",
                libsql::params![
                    column.id.as_str(),
                    column.category_id.as_str(),
                    column.name.as_str(),
                    column.column_type.as_str(),
                    i64::from(column.is_required),
                    validation,
                    options,
                    i64::from(column.order_index)
                ],
            )
            .await?;
        }

        tx.commit().await?;
        let rows = data.row_count();
        tracing::debug!(rows, "reference data seeded");
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_school(&self, school_id: &str) -> Result<Option<School>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = ?1"),
                [school_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(school_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_schools(&self, sector_id: Option<&str>) -> Result<Vec<School>, DatabaseError> {
        let mut rows = match sector_id {
            Some(sector_id) => {
                self.conn
                    .query(
                        &format!(
                            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE sector_id = ?1 ORDER BY id"
                        ),
                        [sector_id],
                    )
                    .await?
            }
            None => {
                self.conn
                    .query(&format!("SELECT {SCHOOL_COLUMNS} FROM schools ORDER BY id"), ())
                    .await?
            }
        };
        let mut schools = Vec::new();
        while let Some(row) = rows.next().await? {
            schools.push(school_from_row(&row)?);
        }
        Ok(schools)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a stored enum is invalid.
    pub async fn find_category(&self, category_id: &str) -> Result<Option<Category>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, assignment, status FROM categories WHERE id = ?1",
                [category_id],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        Ok(Some(Category {
            id: row.get::<String>(0)?,
            name: row.get::<String>(1)?,
            assignment: parse_enum(&row.get::<String>(2)?)?,
            status: parse_enum(&row.get::<String>(3)?)?,
        }))
    }

    /// Columns of a category in display order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a stored column is invalid.
    pub async fn list_columns(&self, category_id: &str) -> Result<Vec<Column>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {COLUMN_COLUMNS} FROM category_columns
                     WHERE category_id = ?1 ORDER BY order_index, id"
                ),
                [category_id],
            )
            .await?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next().await? {
            columns.push(column_from_row(&row)?);
        }
        Ok(columns)
    }
}

impl ReferenceLookup for EduDb {
    async fn get_school(&self, school_id: &str) -> Result<Option<School>, StorageError> {
        Ok(self.find_school(school_id).await?)
    }

    async fn schools_in_sector(&self, sector_id: &str) -> Result<Vec<School>, StorageError> {
        Ok(self.list_schools(Some(sector_id)).await?)
    }

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>, StorageError> {
        Ok(self.find_category(category_id).await?)
    }

    async fn category_columns(&self, category_id: &str) -> Result<Vec<Column>, StorageError> {
        Ok(self.list_columns(category_id).await?)
    }
}
