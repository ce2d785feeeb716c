use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, products};
use crate::models::product::{Product, ProductRecord};

/// Repository for catalog entries
pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: products::Model) -> Product {
        Product {
            id: m.id,
            name: m.name,
            category: m.category,
            description: m.description,
            image: m.image,
            cloudinary_id: m.cloudinary_id,
            indiamart_url: m.indiamart_url,
            whatsapp_message: m.whatsapp_message,
            rating: m.rating,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    /// Newest first. Inactive products are only included on request.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Product>> {
        let mut query = Products::find();
        if !include_inactive {
            query = query.filter(products::Column::IsActive.eq(true));
        }

        let rows = query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list products")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Product>> {
        let row = Products::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query product")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn insert(&self, record: ProductRecord) -> Result<Product> {
        let now = chrono::Utc::now().to_rfc3339();
        let active = products::ActiveModel {
            name: Set(record.name),
            category: Set(record.category.as_str().to_string()),
            description: Set(record.description),
            image: Set(record.image),
            cloudinary_id: Set(record.cloudinary_id),
            indiamart_url: Set(record.indiamart_url),
            whatsapp_message: Set(record.whatsapp_message),
            rating: Set(record.rating),
            is_active: Set(record.is_active),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = Products::insert(active)
            .exec_with_returning(&self.conn)
            .await
            .context("Failed to insert product")?;

        Ok(Self::map_model(model))
    }

    /// Overwrites every mutable column. Returns `None` when the row no longer exists.
    pub async fn update(&self, id: i32, record: ProductRecord) -> Result<Option<Product>> {
        let active = products::ActiveModel {
            id: Unchanged(id),
            name: Set(record.name),
            category: Set(record.category.as_str().to_string()),
            description: Set(record.description),
            image: Set(record.image),
            cloudinary_id: Set(record.cloudinary_id),
            indiamart_url: Set(record.indiamart_url),
            whatsapp_message: Set(record.whatsapp_message),
            rating: Set(record.rating),
            is_active: Set(record.is_active),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.update(&self.conn).await {
            Ok(model) => Ok(Some(Self::map_model(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to update product")),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Products::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete product")?;

        Ok(result.rows_affected > 0)
    }
}
