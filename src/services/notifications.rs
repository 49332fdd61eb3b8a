use crate::{
    db::DbPool,
    entities::notification::{self, Entity as NotificationEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{EntityTrait, ModelTrait, PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// A new-order notification shown in the admin panel.
///
/// Rows are written by the event consumer task only; this service reads
/// and deletes them.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub checkout_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Paginated notification listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// List notifications, newest first
    #[instrument(skip(self))]
    pub async fn list_notifications(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<NotificationListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = NotificationEntity::find()
            .order_by_desc(notification::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!("Failed to count notifications: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let notifications = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| {
                error!("Failed to fetch notifications page {}: {}", page, e);
                ServiceError::DatabaseError(e)
            })?;

        Ok(NotificationListResponse {
            notifications: notifications.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Delete a notification once it has been acted on
    #[instrument(skip(self))]
    pub async fn delete_notification(&self, notification_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let row = NotificationEntity::find_by_id(notification_id)
            .one(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch notification {}: {}", notification_id, e);
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Notification with ID {} not found",
                    notification_id
                ))
            })?;

        row.delete(db).await.map_err(|e| {
            error!("Failed to delete notification {}: {}", notification_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(notification_id = %notification_id, "Notification deleted");

        Ok(())
    }
}

fn model_to_response(model: notification::Model) -> NotificationResponse {
    NotificationResponse {
        id: model.id,
        title: model.title,
        body: model.body,
        checkout_id: model.checkout_id,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_to_response_preserves_fields() {
        let checkout_id = Uuid::new_v4();
        let model = notification::Model {
            id: Uuid::new_v4(),
            title: "New Order".to_string(),
            body: "Amina Haddad - Total: $120.50".to_string(),
            checkout_id: Some(checkout_id),
            created_at: Utc::now(),
        };

        let response = model_to_response(model);

        assert_eq!(response.title, "New Order");
        assert_eq!(response.checkout_id, Some(checkout_id));
    }
}
