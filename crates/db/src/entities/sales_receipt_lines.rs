//! `SeaORM` Entity for sales_receipt_lines table.
//!
//! Sales receipt item lines.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sales_receipt_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sales_receipt_id: i64,
    pub position: i32,
    pub item_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub quantity_scaled: i64,
    pub rate_scaled: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_receipts::Entity",
        from = "Column::SalesReceiptId",
        to = "super::sales_receipts::Column::Id"
    )]
    SalesReceipts,
}

impl Related<super::sales_receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesReceipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
