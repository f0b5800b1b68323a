use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// One record of a named collection. `position` orders the rows by insertion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub position: i32,
    #[sea_orm(unique)]
    pub id: Uuid,
    pub collection: String,
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
