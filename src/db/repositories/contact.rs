use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};

use crate::entities::{contacts, prelude::*};
use crate::models::lead::{Lead, NewLead};

/// Repository for contact submissions (leads)
pub struct ContactRepository {
    conn: DatabaseConnection,
}

impl ContactRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: contacts::Model) -> Lead {
        Lead {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            subject: m.subject,
            message: m.message,
            is_read: m.is_read,
            created_at: m.created_at,
        }
    }

    pub async fn create(&self, lead: NewLead) -> Result<Lead> {
        let active = contacts::ActiveModel {
            name: Set(lead.name),
            email: Set(lead.email),
            phone: Set(lead.phone),
            subject: Set(lead.subject),
            message: Set(lead.message),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = Contacts::insert(active)
            .exec_with_returning(&self.conn)
            .await
            .context("Failed to insert contact")?;

        Ok(Self::map_model(model))
    }

    /// Newest first.
    pub async fn list_all(&self) -> Result<Vec<Lead>> {
        let rows = Contacts::find()
            .order_by_desc(contacts::Column::CreatedAt)
            .order_by_desc(contacts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list contacts")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Lead>> {
        let row = Contacts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query contact")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Contacts::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete contact")?;

        Ok(result.rows_affected > 0)
    }

    /// Sets `is_read`; never clears it.
    pub async fn mark_read(&self, id: i32) -> Result<bool> {
        let result = Contacts::update_many()
            .col_expr(contacts::Column::IsRead, Expr::value(true))
            .filter(contacts::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to mark contact as read")?;

        Ok(result.rows_affected > 0)
    }
}
