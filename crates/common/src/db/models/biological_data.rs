//! Biological data (organ/tissue sample) entity
//!
//! Rows are written only through the `record_biological_data` procedure.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "biological_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub data_type: String,

    /// "healthy" or "disease"
    #[sea_orm(column_type = "Text")]
    pub condition: String,

    pub is_required: bool,

    #[sea_orm(column_type = "Double")]
    pub density: f64,

    #[sea_orm(column_type = "Text")]
    pub position: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// References donors.cf
    #[sea_orm(column_type = "Text")]
    pub donor_cf: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donor::Entity",
        from = "Column::DonorCf",
        to = "super::donor::Column::Cf"
    )]
    Donor,
}

impl Related<super::donor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
