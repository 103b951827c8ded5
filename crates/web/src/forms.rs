//! Submitted form payloads and their coercion into repository inputs
//!
//! Every field deserializes as a string and defaults to empty, so a missing
//! key and a blank value are reported the same way. Presence is checked with
//! `validator`, then each value is coerced to its column type.

use biobank_common::db::models::*;
use biobank_common::errors::{AppError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Date format accepted from `<input type="date">`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn required(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Run the presence checks, naming every blank field
fn check<T: Validate>(form: &T) -> Result<()> {
    form.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();

        if fields.len() == 1 {
            AppError::MissingField { field: fields.remove(0) }
        } else {
            AppError::Validation {
                message: format!("Required fields missing: {}", fields.join(", ")),
            }
        }
    })
}

// ============================================================================
// Coercion helpers
// ============================================================================

pub fn text(value: &str) -> String {
    value.trim().to_string()
}

/// Values accepted for a sample's condition. Samples marked `disease` are
/// the ones offered for `affected` and `analyze` links.
pub const CONDITIONS: &[&str] = &["healthy", "disease"];

pub fn parse_condition(field: &str, value: &str) -> Result<String> {
    let condition = value.trim().to_ascii_lowercase();
    if CONDITIONS.contains(&condition.as_str()) {
        Ok(condition)
    } else {
        Err(AppError::InvalidFormat {
            field: field.to_string(),
            message: format!("'{}' is not one of: {}", value.trim(), CONDITIONS.join(", ")),
        })
    }
}

/// Blank text becomes `None`
pub fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn parse_int(field: &str, value: &str) -> Result<i32> {
    value.trim().parse().map_err(|_| AppError::InvalidFormat {
        field: field.to_string(),
        message: format!("'{}' is not an integer", value.trim()),
    })
}

pub fn parse_float(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidFormat {
            field: field.to_string(),
            message: format!("'{}' is not a number", value.trim()),
        })
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| AppError::InvalidFormat {
        field: field.to_string(),
        message: format!("'{}' is not a date (expected YYYY-MM-DD)", value.trim()),
    })
}

/// Checkbox and select booleans. An absent checkbox submits nothing, which
/// reads as false.
pub fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" | "off" => Ok(false),
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        other => Err(AppError::InvalidFormat {
            field: field.to_string(),
            message: format!("'{}' is not a yes/no value", other),
        }),
    }
}

// ============================================================================
// Entity forms
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct DonorForm {
    #[validate(custom(function = "required"))]
    pub cf: String,
    #[validate(custom(function = "required"))]
    pub name: String,
    #[validate(custom(function = "required"))]
    pub surname: String,
    #[validate(custom(function = "required"))]
    pub birth: String,
    #[validate(custom(function = "required"))]
    pub sex: String,
    #[validate(custom(function = "required"))]
    pub age: String,
}

impl DonorForm {
    pub fn parse(&self) -> Result<NewDonor> {
        check(self)?;
        Ok(NewDonor {
            cf: text(&self.cf),
            name: text(&self.name),
            surname: text(&self.surname),
            birth: parse_date("birth", &self.birth)?,
            sex: text(&self.sex),
            age: parse_int("age", &self.age)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ResearcherForm {
    #[validate(custom(function = "required"))]
    pub cf: String,
    #[validate(custom(function = "required"))]
    pub name: String,
    #[validate(custom(function = "required"))]
    pub surname: String,
    #[validate(custom(function = "required"))]
    pub birth: String,
}

impl ResearcherForm {
    pub fn parse(&self) -> Result<NewResearcher> {
        check(self)?;
        Ok(NewResearcher {
            cf: text(&self.cf),
            name: text(&self.name),
            surname: text(&self.surname),
            birth: parse_date("birth", &self.birth)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct DiseaseForm {
    #[validate(custom(function = "required"))]
    pub name: String,
    #[validate(custom(function = "required"))]
    pub discovery_date: String,
    pub description: String,
}

impl DiseaseForm {
    pub fn parse(&self) -> Result<NewDisease> {
        check(self)?;
        Ok(NewDisease {
            name: text(&self.name),
            discovery_date: parse_date("discovery_date", &self.discovery_date)?,
            description: optional_text(&self.description),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct BiologicalDataForm {
    #[validate(custom(function = "required"))]
    pub name: String,
    #[validate(custom(function = "required"))]
    pub condition: String,
    pub is_required: String,
    pub description: String,
    #[validate(custom(function = "required"))]
    pub position: String,
    #[validate(custom(function = "required"))]
    pub data_type: String,
    #[validate(custom(function = "required"))]
    pub density: String,
    #[validate(custom(function = "required"))]
    pub donor_cf: String,
}

impl BiologicalDataForm {
    pub fn parse(&self) -> Result<NewBiologicalData> {
        check(self)?;
        Ok(NewBiologicalData {
            name: text(&self.name),
            condition: parse_condition("condition", &self.condition)?,
            is_required: parse_bool("is_required", &self.is_required)?,
            description: optional_text(&self.description),
            position: text(&self.position),
            data_type: text(&self.data_type),
            density: parse_float("density", &self.density)?,
            donor_cf: text(&self.donor_cf),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct TreatmentForm {
    #[validate(custom(function = "required"))]
    pub name: String,
    #[validate(custom(function = "required"))]
    pub success_percentage: String,
}

impl TreatmentForm {
    pub fn parse(&self) -> Result<NewTreatment> {
        check(self)?;
        Ok(NewTreatment {
            name: text(&self.name),
            success_percentage: parse_float("success_percentage", &self.success_percentage)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct DrugForm {
    #[validate(custom(function = "required"))]
    pub name: String,
    pub description: String,
}

impl DrugForm {
    pub fn parse(&self) -> Result<NewDrug> {
        check(self)?;
        Ok(NewDrug {
            name: text(&self.name),
            description: optional_text(&self.description),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct PublicationForm {
    #[validate(custom(function = "required"))]
    pub doi: String,
    #[validate(custom(function = "required"))]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub quality: String,
    #[validate(custom(function = "required"))]
    pub publisher: String,
}

impl PublicationForm {
    pub fn parse(&self) -> Result<NewPublication> {
        check(self)?;
        Ok(NewPublication {
            doi: text(&self.doi),
            publisher: text(&self.publisher),
            quality: text(&self.quality),
            title: text(&self.title),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct AllergyForm {
    #[validate(custom(function = "required"))]
    pub name: String,
}

impl AllergyForm {
    pub fn parse(&self) -> Result<NewAllergy> {
        check(self)?;
        Ok(NewAllergy { name: text(&self.name) })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ExperimentForm {
    #[validate(custom(function = "required"))]
    pub exper_date: String,
    pub is_positive: String,
    pub effect_description: String,
    #[validate(custom(function = "required"))]
    pub disease_id: String,
    #[validate(custom(function = "required"))]
    pub treatment_id: String,
}

impl ExperimentForm {
    pub fn parse(&self) -> Result<NewExperiment> {
        check(self)?;
        Ok(NewExperiment {
            exper_date: parse_date("exper_date", &self.exper_date)?,
            is_positive: parse_bool("is_positive", &self.is_positive)?,
            effect_description: optional_text(&self.effect_description),
            disease_id: parse_int("disease_id", &self.disease_id)?,
            treatment_id: parse_int("treatment_id", &self.treatment_id)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct FutureWorkForm {
    #[validate(custom(function = "required"))]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub exp_id: String,
    #[validate(custom(function = "required"))]
    pub pub_doi: String,
}

impl FutureWorkForm {
    pub fn parse(&self) -> Result<NewFutureWork> {
        check(self)?;
        Ok(NewFutureWork {
            title: text(&self.title),
            experiment_id: parse_int("exp_id", &self.exp_id)?,
            publication_doi: text(&self.pub_doi),
        })
    }
}

// ============================================================================
// Association forms
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct AssignForm {
    #[validate(custom(function = "required"))]
    pub treatment_id: String,
    #[validate(custom(function = "required"))]
    pub drug_id: String,
}

impl AssignForm {
    pub fn parse(&self) -> Result<NewLink> {
        check(self)?;
        Ok(NewLink::Assign {
            treatment_id: parse_int("treatment_id", &self.treatment_id)?,
            drug_id: parse_int("drug_id", &self.drug_id)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct WritesForm {
    #[validate(custom(function = "required"))]
    pub researcher_cf: String,
    #[validate(custom(function = "required"))]
    pub publication_doi: String,
}

impl WritesForm {
    pub fn parse(&self) -> Result<NewLink> {
        check(self)?;
        Ok(NewLink::Writes {
            researcher_cf: text(&self.researcher_cf),
            publication_doi: text(&self.publication_doi),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct AffectedForm {
    #[validate(custom(function = "required"))]
    pub bio_id: String,
    #[validate(custom(function = "required"))]
    pub disease_id: String,
}

impl AffectedForm {
    pub fn parse(&self) -> Result<NewLink> {
        check(self)?;
        Ok(NewLink::Affected {
            biological_data_id: parse_int("bio_id", &self.bio_id)?,
            disease_id: parse_int("disease_id", &self.disease_id)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct CauseForm {
    #[validate(custom(function = "required"))]
    pub drug_id: String,
    #[validate(custom(function = "required"))]
    pub allergy_id: String,
}

impl CauseForm {
    pub fn parse(&self) -> Result<NewLink> {
        check(self)?;
        Ok(NewLink::Cause {
            drug_id: parse_int("drug_id", &self.drug_id)?,
            allergy_id: parse_int("allergy_id", &self.allergy_id)?,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct AnalyzeForm {
    #[validate(custom(function = "required"))]
    pub bio_id: String,
    #[validate(custom(function = "required"))]
    pub exp_id: String,
}

impl AnalyzeForm {
    pub fn parse(&self) -> Result<NewLink> {
        check(self)?;
        Ok(NewLink::Analyze {
            biological_data_id: parse_int("bio_id", &self.bio_id)?,
            experiment_id: parse_int("exp_id", &self.exp_id)?,
        })
    }
}

// ============================================================================
// Report parameters
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdForm {
    pub threshold: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TreatmentParamForm {
    pub treatment_id: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DiseaseParamForm {
    pub disease_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor_form() -> DonorForm {
        DonorForm {
            cf: "RSSMRA80A01H501U".into(),
            name: "Mario".into(),
            surname: "Rossi".into(),
            birth: "1980-01-01".into(),
            sex: "M".into(),
            age: "45".into(),
        }
    }

    #[test]
    fn test_donor_form_parses() {
        let donor = donor_form().parse().unwrap();
        assert_eq!(donor.cf, "RSSMRA80A01H501U");
        assert_eq!(donor.birth, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
        assert_eq!(donor.age, 45);
    }

    #[test]
    fn test_blank_field_is_named() {
        let form = DonorForm { age: "  ".into(), ..donor_form() };
        match form.parse().unwrap_err() {
            AppError::MissingField { field } => assert_eq!(field, "age"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_several_blank_fields_are_listed() {
        let err = DonorForm::default().parse().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Required fields missing: age, birth, cf, name, sex, surname"
        );
    }

    #[test]
    fn test_bad_age_is_invalid_format() {
        let form = DonorForm { age: "forty".into(), ..donor_form() };
        let err = form.parse().unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { ref field, .. } if field == "age"));
    }

    #[test]
    fn test_parse_bool_variants() {
        for truthy in ["1", "true", "Yes", "y", "on"] {
            assert!(parse_bool("f", truthy).unwrap());
        }
        for falsy in ["", "0", "false", "NO", "n", "off"] {
            assert!(!parse_bool("f", falsy).unwrap());
        }
        assert!(parse_bool("f", "maybe").is_err());
    }

    #[test]
    fn test_parse_float_rejects_nan() {
        assert_eq!(parse_float("density", " 0.5 ").unwrap(), 0.5);
        assert!(parse_float("density", "NaN").is_err());
        assert!(parse_float("density", "abc").is_err());
    }

    #[test]
    fn test_parse_date_format() {
        assert!(parse_date("birth", "2024-02-30").is_err());
        assert!(parse_date("birth", "01/02/2024").is_err());
        assert!(parse_date("birth", "2024-02-29").is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("   "), None);
        assert_eq!(optional_text(" note "), Some("note".to_string()));
    }

    #[test]
    fn test_experiment_without_checkbox_is_negative() {
        let form = ExperimentForm {
            exper_date: "2024-05-02".into(),
            is_positive: String::new(),
            effect_description: String::new(),
            disease_id: "2".into(),
            treatment_id: "3".into(),
        };
        let exp = form.parse().unwrap();
        assert!(!exp.is_positive);
        assert_eq!(exp.effect_description, None);
    }

    #[test]
    fn test_cause_form_builds_link() {
        let form = CauseForm { drug_id: "3".into(), allergy_id: "999".into() };
        assert_eq!(form.parse().unwrap(), NewLink::Cause { drug_id: 3, allergy_id: 999 });
    }

    fn sample_form(condition: &str) -> BiologicalDataForm {
        BiologicalDataForm {
            name: "Liver".into(),
            condition: condition.into(),
            is_required: "true".into(),
            description: String::new(),
            position: "abdomen".into(),
            data_type: "tissue".into(),
            density: "1.05".into(),
            donor_cf: "RSSMRA80A01H501U".into(),
        }
    }

    #[test]
    fn test_condition_is_normalized() {
        assert_eq!(sample_form(" Disease ").parse().unwrap().condition, "disease");
        assert_eq!(sample_form("healthy").parse().unwrap().condition, "healthy");
    }

    #[test]
    fn test_unknown_condition_is_rejected() {
        let err = sample_form("diseased").parse().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for condition: 'diseased' is not one of: healthy, disease"
        );
    }
}
