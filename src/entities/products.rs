use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// laboratory | industrial | portable | accessories | retail
    pub category: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Public URL of the current image
    pub image: String,

    /// Blob handle used to delete the hosted image, if we own it
    pub cloudinary_id: Option<String>,

    pub indiamart_url: String,

    #[sea_orm(column_type = "Text")]
    pub whatsapp_message: String,

    pub rating: f64,

    pub is_active: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
