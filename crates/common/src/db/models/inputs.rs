//! Validated, typed inputs accepted by the repository insert operations.
//!
//! Numeric identifiers are never part of these: the database assigns them.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDonor {
    pub cf: String,
    pub name: String,
    pub surname: String,
    pub birth: NaiveDate,
    pub sex: String,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewResearcher {
    pub cf: String,
    pub name: String,
    pub surname: String,
    pub birth: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDisease {
    pub name: String,
    pub discovery_date: NaiveDate,
    pub description: Option<String>,
}

/// Arguments of the `record_biological_data` procedure, minus the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBiologicalData {
    pub name: String,
    pub condition: String,
    pub is_required: bool,
    pub description: Option<String>,
    pub position: String,
    pub data_type: String,
    pub density: f64,
    pub donor_cf: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTreatment {
    pub name: String,
    pub success_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDrug {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPublication {
    pub doi: String,
    pub publisher: String,
    pub quality: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAllergy {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExperiment {
    pub exper_date: NaiveDate,
    pub is_positive: bool,
    pub effect_description: Option<String>,
    pub disease_id: i32,
    pub treatment_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFutureWork {
    pub title: String,
    pub experiment_id: i32,
    pub publication_doi: String,
}

/// The five many-to-many link kinds and the keys they connect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewLink {
    /// Treatment uses drug
    Assign { treatment_id: i32, drug_id: i32 },
    /// Researcher wrote publication
    Writes { researcher_cf: String, publication_doi: String },
    /// Biological sample affected by disease
    Affected { biological_data_id: i32, disease_id: i32 },
    /// Drug causes allergy
    Cause { drug_id: i32, allergy_id: i32 },
    /// Biological sample analysed in experiment
    Analyze { biological_data_id: i32, experiment_id: i32 },
}

impl NewLink {
    /// Resource name, used for metrics and messages
    pub fn resource(&self) -> &'static str {
        match self {
            NewLink::Assign { .. } => "assign",
            NewLink::Writes { .. } => "writes",
            NewLink::Affected { .. } => "affected",
            NewLink::Cause { .. } => "cause",
            NewLink::Analyze { .. } => "analyze",
        }
    }

    /// Human description of the two referenced rows
    pub fn describe_refs(&self) -> String {
        match self {
            NewLink::Assign { treatment_id, drug_id } => {
                format!("treatment {} or drug {} does not exist", treatment_id, drug_id)
            }
            NewLink::Writes { researcher_cf, publication_doi } => format!(
                "researcher {} or publication {} does not exist",
                researcher_cf, publication_doi
            ),
            NewLink::Affected { biological_data_id, disease_id } => format!(
                "biological data {} or disease {} does not exist",
                biological_data_id, disease_id
            ),
            NewLink::Cause { drug_id, allergy_id } => {
                format!("drug {} or allergy {} does not exist", drug_id, allergy_id)
            }
            NewLink::Analyze { biological_data_id, experiment_id } => format!(
                "biological data {} or experiment {} does not exist",
                biological_data_id, experiment_id
            ),
        }
    }
}
