//! Joined rows for list views and options for form dropdowns

use chrono::NaiveDate;
use sea_orm::FromQueryResult;
use serde::Serialize;

// ============================================================================
// List rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct AssignRow {
    pub id: i32,
    pub treatment_id: i32,
    pub treatment_name: String,
    pub drug_id: i32,
    pub drug_name: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct WritesRow {
    pub id: i32,
    pub researcher_cf: String,
    pub researcher_name: String,
    pub researcher_surname: String,
    pub publication_doi: String,
    pub publication_title: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct AffectedRow {
    pub id: i32,
    pub biological_data_id: i32,
    pub biological_data_name: String,
    pub disease_id: i32,
    pub disease_name: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct CauseRow {
    pub id: i32,
    pub drug_id: i32,
    pub drug_name: String,
    pub allergy_id: i32,
    pub allergy_name: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct AnalyzeRow {
    pub id: i32,
    pub biological_data_id: i32,
    pub biological_data_name: String,
    pub experiment_id: i32,
    pub experiment_date: NaiveDate,
}

// ============================================================================
// Dropdown options
// ============================================================================

/// Numeric id and display name (diseases, treatments, drugs, allergies)
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct NamedOption {
    pub id: i32,
    pub name: String,
}

/// Donor or researcher
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct PersonOption {
    pub cf: String,
    pub name: String,
    pub surname: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct PublicationOption {
    pub doi: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ExperimentOption {
    pub id: i32,
    pub exper_date: NaiveDate,
}

/// Experiment together with the disease it studies
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ExperimentDiseaseOption {
    pub id: i32,
    pub exper_date: NaiveDate,
    pub disease_id: i32,
    pub disease_name: String,
}

/// Diseased biological sample, with the diseases already linked to it
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct BiologicalDataOption {
    pub id: i32,
    pub name: String,
    pub condition: String,
    /// Comma-separated disease names, absent when no link exists yet
    pub diseases: Option<String>,
}
