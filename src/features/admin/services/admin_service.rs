use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{image_extension, BulkAction, BulkActionResultDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::news::repository::NewsRepository;
use crate::modules::storage::ObjectStorage;

/// Editorial back-office operations
pub struct AdminService {
    news: Arc<dyn NewsRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl AdminService {
    pub fn new(news: Arc<dyn NewsRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { news, storage }
    }

    /// Apply `action` to every id in `ids`.
    ///
    /// Publish, archive and soft delete skip soft-deleted records; restore only
    /// touches soft-deleted ones. Unknown ids are skipped.
    pub async fn bulk_action(
        &self,
        user: &AuthenticatedUser,
        action: BulkAction,
        ids: &[i32],
    ) -> Result<BulkActionResultDto> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let now = Utc::now();
        let mut affected = 0;

        for id in ids {
            let Some(mut news) = self.news.find(id, true).await? else {
                continue;
            };

            let applies = match action {
                BulkAction::Publish => news.publish(user.user_id, now).is_ok(),
                BulkAction::Archive => news.archive(user.user_id, now).is_ok(),
                BulkAction::SoftDelete => {
                    if news.is_deleted() {
                        false
                    } else {
                        news.soft_delete(user.user_id, now);
                        true
                    }
                }
                BulkAction::Restore => news.restore(now).is_ok(),
            };

            if applies {
                self.news.save(&news, None).await?;
                affected += 1;
            }
        }

        tracing::info!(
            "Bulk {:?} by user {}: {} news affected",
            action,
            user.user_id,
            affected
        );

        Ok(BulkActionResultDto {
            action,
            affected,
            message: format!("{} news {}.", affected, action.verb()),
        })
    }

    /// Store an image under `news/<uuid>.<ext>` and return its public URL
    pub async fn upload_image(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        let extension = image_extension(content_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type: {}", content_type))
        })?;

        let path = format!("news/{}.{}", Uuid::new_v4(), extension);
        let size = data.len();
        let url = self.storage.put_public(&path, data, content_type).await?;

        tracing::info!("Image uploaded: path={}, size={}", path, size);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::news::models::NewsStatus;
    use crate::shared::test_helpers::{staff_user, InMemoryDb, MemoryStorage};

    fn service(db: &Arc<InMemoryDb>, storage: &Arc<MemoryStorage>) -> AdminService {
        AdminService::new(db.clone(), storage.clone())
    }

    #[tokio::test]
    async fn test_bulk_publish_skips_deleted() {
        let db = InMemoryDb::new();
        let svc = service(&db, &MemoryStorage::new());
        let draft = db.add_news("Draft", false).await;
        let gone = db.add_news("Gone", false).await;
        db.update_news(gone.id, |n| n.deleted_at = Some(Utc::now()))
            .await;

        let result = svc
            .bulk_action(&staff_user(), BulkAction::Publish, &[draft.id, gone.id, 999])
            .await
            .unwrap();

        assert_eq!(result.affected, 1);
        assert_eq!(result.message, "1 news published.");
        let published = db.get_news(draft.id).await.unwrap();
        assert_eq!(published.status, NewsStatus::Published);
        assert!(published.published_at.is_some());
        assert_eq!(db.get_news(gone.id).await.unwrap().status, NewsStatus::Draft);
    }

    #[tokio::test]
    async fn test_bulk_archive_and_restore() {
        let db = InMemoryDb::new();
        let svc = service(&db, &MemoryStorage::new());
        let live = db.add_news("Live", true).await;
        let gone = db.add_news("Gone", true).await;
        db.update_news(gone.id, |n| n.deleted_at = Some(Utc::now()))
            .await;

        let archived = svc
            .bulk_action(&staff_user(), BulkAction::Archive, &[live.id, gone.id])
            .await
            .unwrap();
        assert_eq!(archived.affected, 1);
        assert_eq!(
            db.get_news(live.id).await.unwrap().status,
            NewsStatus::Archived
        );

        let restored = svc
            .bulk_action(&staff_user(), BulkAction::Restore, &[live.id, gone.id])
            .await
            .unwrap();
        assert_eq!(restored.affected, 1);
        assert!(db.get_news(gone.id).await.unwrap().deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_bulk_soft_delete_counts_once() {
        let db = InMemoryDb::new();
        let svc = service(&db, &MemoryStorage::new());
        let news = db.add_news("Once", true).await;

        let first = svc
            .bulk_action(&staff_user(), BulkAction::SoftDelete, &[news.id, news.id])
            .await
            .unwrap();
        let second = svc
            .bulk_action(&staff_user(), BulkAction::SoftDelete, &[news.id])
            .await
            .unwrap();

        assert_eq!(first.affected, 1);
        assert_eq!(second.affected, 0);
        let stored = db.get_news(news.id).await.unwrap();
        assert_eq!(stored.updated_by, Some(staff_user().user_id));
    }

    #[tokio::test]
    async fn test_upload_image_key_and_url() {
        let db = InMemoryDb::new();
        let storage = MemoryStorage::new();
        let svc = service(&db, &storage);

        let url = svc
            .upload_image(vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        let paths = storage.paths().await;
        assert_eq!(paths.len(), 1);
        assert!(paths[0].starts_with("news/"));
        assert!(paths[0].ends_with(".png"));
        assert!(url.ends_with(&paths[0]));
    }
}
