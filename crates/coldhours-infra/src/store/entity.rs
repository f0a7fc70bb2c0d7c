//! Document entity for SeaORM - one row per document.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub fields: Json,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to a store document.
impl From<Model> for coldhours_core::ports::Document {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            fields: match model.fields {
                Json::Object(fields) => fields,
                _ => Default::default(),
            },
        }
    }
}
