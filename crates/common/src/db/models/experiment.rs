//! Experiment entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "experiments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub exper_date: Date,

    pub is_positive: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub effect_description: Option<String>,

    /// References diseases.id
    pub disease_id: i32,

    /// References treatments.id
    pub treatment_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::disease::Entity",
        from = "Column::DiseaseId",
        to = "super::disease::Column::Id"
    )]
    Disease,

    #[sea_orm(
        belongs_to = "super::treatment::Entity",
        from = "Column::TreatmentId",
        to = "super::treatment::Column::Id"
    )]
    Treatment,
}

impl Related<super::disease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disease.def()
    }
}

impl Related<super::treatment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treatment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
