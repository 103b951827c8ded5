//! Future work entity: a follow-up of an experiment tied to a publication

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "future_works")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    pub experiment_id: i32,

    #[sea_orm(column_type = "Text")]
    pub publication_doi: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::experiment::Entity",
        from = "Column::ExperimentId",
        to = "super::experiment::Column::Id"
    )]
    Experiment,

    #[sea_orm(
        belongs_to = "super::publication::Entity",
        from = "Column::PublicationDoi",
        to = "super::publication::Column::Doi"
    )]
    Publication,
}

impl ActiveModelBehavior for ActiveModel {}
