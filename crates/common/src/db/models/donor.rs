//! Donor entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donors")]
pub struct Model {
    /// Personal tax code
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub cf: String,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub surname: String,

    pub birth: Date,

    #[sea_orm(column_type = "Text")]
    pub sex: String,

    pub age: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
