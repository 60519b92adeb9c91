use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(table_name = "delivery_methods")]
#[serde(rename_all = "camelCase")]
#[schema(as = DeliveryMethod)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub short_name: String,
    pub delivery_time: String,
    pub description: String,
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
