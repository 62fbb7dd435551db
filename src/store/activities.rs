//! Per-user track activity rows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::error::AppError;
use crate::store::Database;

/// A user's recorded like/unlike state for one catalog track. At most one
/// row exists per (user_id, spotify_id) pair, enforced by find-or-create in
/// the service layer. Rows are never hard-deleted.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TrackActivity {
    pub id: i64,
    pub user_id: i64,
    pub spotify_id: String,
    pub is_liked: Option<bool>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for a new activity row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrackActivity {
    pub user_id: i64,
    pub spotify_id: String,
    pub is_liked: Option<bool>,
}

/// Activity persistence, as consumed by the orchestrator.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Returns `AppError::NotFound` when no row matches.
    async fn get(&self, user_id: i64, spotify_id: &str) -> Result<TrackActivity, AppError>;

    /// Bulk lookup keyed by spotify ID. IDs without recorded activity are
    /// simply absent from the map.
    async fn get_bulk(
        &self,
        user_id: i64,
        spotify_ids: &[String],
    ) -> Result<HashMap<String, TrackActivity>, AppError>;

    async fn create(&self, activity: NewTrackActivity) -> Result<(), AppError>;

    async fn update(&self, activity: &TrackActivity) -> Result<(), AppError>;
}

#[async_trait]
impl ActivityStore for Database {
    async fn get(&self, user_id: i64, spotify_id: &str) -> Result<TrackActivity, AppError> {
        let row = sqlx::query_as::<_, TrackActivity>(
            "SELECT id, user_id, spotify_id, is_liked, created_at, updated_at
             FROM track_activities
             WHERE user_id = ? AND spotify_id = ?",
        )
        .bind(user_id)
        .bind(spotify_id)
        .fetch_optional(self.pool())
        .await?;

        row.ok_or_else(|| AppError::NotFound("track activity not found".into()))
    }

    async fn get_bulk(
        &self,
        user_id: i64,
        spotify_ids: &[String],
    ) -> Result<HashMap<String, TrackActivity>, AppError> {
        if spotify_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; spotify_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, user_id, spotify_id, is_liked, created_at, updated_at
             FROM track_activities
             WHERE user_id = ? AND spotify_id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_as::<_, TrackActivity>(&sql).bind(user_id);
        for spotify_id in spotify_ids {
            query = query.bind(spotify_id);
        }

        let rows = query.fetch_all(self.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.spotify_id.clone(), row))
            .collect())
    }

    async fn create(&self, activity: NewTrackActivity) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO track_activities (user_id, spotify_id, is_liked, created_at, updated_at)
             VALUES (?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(activity.user_id)
        .bind(&activity.spotify_id)
        .bind(activity.is_liked)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn update(&self, activity: &TrackActivity) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE track_activities
             SET is_liked = ?, updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(activity.is_liked)
        .bind(activity.id)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_activity(user_id: i64, spotify_id: &str, is_liked: Option<bool>) -> NewTrackActivity {
        NewTrackActivity {
            user_id,
            spotify_id: spotify_id.into(),
            is_liked,
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let db = Database::in_memory().await.unwrap();

        db.create(new_activity(1, "track-a", Some(true)))
            .await
            .unwrap();

        let found = db.get(1, "track-a").await.unwrap();
        assert_eq!(found.user_id, 1);
        assert_eq!(found.spotify_id, "track-a");
        assert_eq!(found.is_liked, Some(true));
    }

    #[tokio::test]
    async fn get_missing_row_is_not_found() {
        let db = Database::in_memory().await.unwrap();

        let err = db.get(1, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_does_not_return_other_users_rows() {
        let db = Database::in_memory().await.unwrap();

        db.create(new_activity(1, "track-a", Some(true)))
            .await
            .unwrap();

        let err = db.get(2, "track-a").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_bulk_only_contains_recorded_ids() {
        let db = Database::in_memory().await.unwrap();

        db.create(new_activity(1, "track-a", Some(true)))
            .await
            .unwrap();
        db.create(new_activity(1, "track-b", Some(false)))
            .await
            .unwrap();
        db.create(new_activity(2, "track-c", Some(true)))
            .await
            .unwrap();

        let ids: Vec<String> = ["track-a", "track-b", "track-c", "track-d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = db.get_bulk(1, &ids).await.unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["track-a"].is_liked, Some(true));
        assert_eq!(map["track-b"].is_liked, Some(false));
        assert!(!map.contains_key("track-c"));
        assert!(!map.contains_key("track-d"));
    }

    #[tokio::test]
    async fn get_bulk_with_no_ids_is_empty() {
        let db = Database::in_memory().await.unwrap();
        let map = db.get_bulk(1, &[]).await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_like_state() {
        let db = Database::in_memory().await.unwrap();

        db.create(new_activity(1, "track-a", Some(false)))
            .await
            .unwrap();

        let mut activity = db.get(1, "track-a").await.unwrap();
        activity.is_liked = Some(true);
        db.update(&activity).await.unwrap();

        let found = db.get(1, "track-a").await.unwrap();
        assert_eq!(found.is_liked, Some(true));
        assert_eq!(found.id, activity.id);
    }
}
