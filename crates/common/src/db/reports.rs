//! Analytical reports backed by set-returning database routines
//!
//! The routines own all query semantics. Each row is fetched as a JSON
//! object (`row_to_json`) so the result can be rendered verbatim without the
//! application knowing the routine's column types.

use crate::errors::{AppError, Result};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use serde::Serialize;
use serde_json::{Map, Value};

/// One invocation of a report routine with its validated parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Biological samples whose density is below the threshold
    BelowDensity { threshold: f64 },
    /// Drugs and allergies associated with a treatment
    TreatmentInfo { treatment_id: i32 },
    /// Donors with a required organ affected by the disease that has future works
    DonorsWithDisease { disease_id: i32 },
    /// Future works of the most productive researchers
    TopResearcherFutureWorks,
}

impl Report {
    /// Name of the database routine
    pub fn routine(&self) -> &'static str {
        match self {
            Report::BelowDensity { .. } => "list_bio_below_density",
            Report::TreatmentInfo { .. } => "get_treatment_info",
            Report::DonorsWithDisease { .. } => "list_donors_required_disease_with_fw",
            Report::TopResearcherFutureWorks => "list_fw_for_top_researchers",
        }
    }

    /// Short identifier used in metrics and logs
    pub fn key(&self) -> &'static str {
        match self {
            Report::BelowDensity { .. } => "op2",
            Report::TreatmentInfo { .. } => "op3",
            Report::DonorsWithDisease { .. } => "op4",
            Report::TopResearcherFutureWorks => "op5",
        }
    }

    fn statement(&self) -> Statement {
        let (args, values): (&str, Vec<sea_orm::Value>) = match self {
            Report::BelowDensity { threshold } => ("$1::float8", vec![(*threshold).into()]),
            Report::TreatmentInfo { treatment_id } => ("$1::int4", vec![(*treatment_id).into()]),
            Report::DonorsWithDisease { disease_id } => ("$1::int4", vec![(*disease_id).into()]),
            Report::TopResearcherFutureWorks => ("", Vec::new()),
        };

        let sql = format!(
            "SELECT row_to_json(r)::text AS row_json FROM {}({}) AS r",
            self.routine(),
            args
        );

        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    }

    /// Run the routine and collect its rows
    pub async fn run(&self, conn: &DatabaseConnection) -> Result<ReportTable> {
        let rows = conn.query_all(self.statement()).await?;

        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get("", "row_json")?;
            objects.push(raw);
        }

        ReportTable::from_json_rows(&objects)
    }
}

/// Result set of a report, as display strings in routine column order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Build a table from JSON objects, one per row. Columns follow the key
    /// order of the first row.
    pub fn from_json_rows<S: AsRef<str>>(raw_rows: &[S]) -> Result<Self> {
        let mut table = ReportTable::default();

        for raw in raw_rows {
            let object: Map<String, Value> =
                serde_json::from_str(raw.as_ref()).map_err(|e| AppError::Internal {
                    message: format!("report row is not a JSON object: {}", e),
                })?;

            if table.columns.is_empty() {
                table.columns = object.keys().cloned().collect();
            }

            let row = table
                .columns
                .iter()
                .map(|column| object.get(column).map(display_cell).unwrap_or_default())
                .collect();
            table.rows.push(row);
        }

        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    #[test]
    fn test_columns_keep_routine_order() {
        let table = ReportTable::from_json_rows(&[
            r#"{"organ_id": 3, "organ_name": "Liver", "density": 0.75, "donor_cf": null}"#,
            r#"{"organ_id": 5, "organ_name": "Lung", "density": 0.2, "donor_cf": "RSSMRA80A01H501U"}"#,
        ])
        .unwrap();

        assert_eq!(table.columns, vec!["organ_id", "organ_name", "density", "donor_cf"]);
        assert_eq!(table.rows[0], vec!["3", "Liver", "0.75", ""]);
        assert_eq!(table.rows[1][3], "RSSMRA80A01H501U");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_result() {
        let table = ReportTable::from_json_rows::<&str>(&[]).unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_non_object_row_is_rejected() {
        assert!(ReportTable::from_json_rows(&["[1, 2]"]).is_err());
    }

    #[test]
    fn test_statement_binds_parameter() {
        let stmt = Report::BelowDensity { threshold: 0.0 }.statement();
        assert_eq!(
            stmt.sql,
            "SELECT row_to_json(r)::text AS row_json FROM list_bio_below_density($1::float8) AS r"
        );
        assert_eq!(stmt.values.map(|v| v.0.len()), Some(1));

        let stmt = Report::TopResearcherFutureWorks.statement();
        assert!(stmt.sql.contains("list_fw_for_top_researchers()"));
    }

    #[tokio::test]
    async fn test_run_is_stable_for_identical_rows() {
        let row = || {
            BTreeMap::from([(
                "row_json",
                sea_orm::Value::String(Some(Box::new(
                    r#"{"title": "Follow-up", "researcher": "Bianchi"}"#.to_string(),
                ))),
            )])
        };
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row()], vec![row()]])
            .into_connection();

        let report = Report::TopResearcherFutureWorks;
        let first = report.run(&conn).await.unwrap();
        let second = report.run(&conn).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.columns, vec!["title", "researcher"]);
    }

    #[tokio::test]
    async fn test_run_with_no_rows() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, sea_orm::Value>>::new()])
            .into_connection();

        let table = Report::BelowDensity { threshold: 0.0 }.run(&conn).await.unwrap();
        assert!(table.is_empty());
    }
}
