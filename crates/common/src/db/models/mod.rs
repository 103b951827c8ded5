//! SeaORM entity models
//!
//! One entity per registry table, plus the joined row shapes used by the
//! association list views, the dropdown options used by the add forms, and
//! the validated inputs accepted by the repository.

mod donor;
mod researcher;
mod disease;
mod biological_data;
mod treatment;
mod drug;
mod publication;
mod allergy;
mod experiment;
mod future_work;
mod inputs;
mod views;

pub use donor::{
    Entity as DonorEntity,
    Model as Donor,
    ActiveModel as DonorActiveModel,
    Column as DonorColumn,
};

pub use researcher::{
    Entity as ResearcherEntity,
    Model as Researcher,
    ActiveModel as ResearcherActiveModel,
    Column as ResearcherColumn,
};

pub use disease::{
    Entity as DiseaseEntity,
    Model as Disease,
    ActiveModel as DiseaseActiveModel,
    Column as DiseaseColumn,
};

pub use biological_data::{
    Entity as BiologicalDataEntity,
    Model as BiologicalData,
    Column as BiologicalDataColumn,
};

pub use treatment::{
    Entity as TreatmentEntity,
    Model as Treatment,
    ActiveModel as TreatmentActiveModel,
    Column as TreatmentColumn,
};

pub use drug::{
    Entity as DrugEntity,
    Model as Drug,
    ActiveModel as DrugActiveModel,
    Column as DrugColumn,
};

pub use publication::{
    Entity as PublicationEntity,
    Model as Publication,
    ActiveModel as PublicationActiveModel,
    Column as PublicationColumn,
};

pub use allergy::{
    Entity as AllergyEntity,
    Model as Allergy,
    ActiveModel as AllergyActiveModel,
    Column as AllergyColumn,
};

pub use experiment::{
    Entity as ExperimentEntity,
    Model as Experiment,
    Column as ExperimentColumn,
};

pub use future_work::{
    Entity as FutureWorkEntity,
    Model as FutureWork,
    Column as FutureWorkColumn,
};

pub use inputs::*;
pub use views::*;

/// Number of characters of long text shown in list views
pub const EXCERPT_CHARS: usize = 100;

/// First `EXCERPT_CHARS` characters of a long text, `N/A` when absent or blank.
pub fn excerpt(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.chars().take(EXCERPT_CHARS).collect(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let cut = excerpt(Some(&long));
        assert_eq!(cut.chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn test_excerpt_missing_text() {
        assert_eq!(excerpt(None), "N/A");
        assert_eq!(excerpt(Some("   ")), "N/A");
        assert_eq!(excerpt(Some("short")), "short");
    }
}
