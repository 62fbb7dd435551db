//! Search orchestration: combines upstream catalog results with locally
//! stored per-user like activity.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::spotify::{RawSearchResponse, SearchOutbound};
use crate::store::{ActivityStore, NewTrackActivity, TrackActivity};

/// Aggregate search response returned to the API boundary.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub items: Vec<TrackResponse>,
    pub limit: u32,
    pub offset: u32,
    pub total: u32,
}

/// One upstream track merged with the caller's like state.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub album_type: String,
    pub album_total_tracks: u32,
    pub album_image_url: Vec<String>,
    pub album_name: String,
    pub artists_name: Vec<String>,
    pub explicit: bool,
    pub href: String,
    pub id: String,
    pub name: String,
    pub is_liked: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackActivityRequest {
    pub spotify_id: String,
    #[serde(default)]
    pub is_liked: Option<bool>,
}

pub struct CatalogueService {
    outbound: Arc<dyn SearchOutbound>,
    activities: Arc<dyn ActivityStore>,
}

impl CatalogueService {
    pub fn new(outbound: Arc<dyn SearchOutbound>, activities: Arc<dyn ActivityStore>) -> Self {
        Self {
            outbound,
            activities,
        }
    }

    /// Search the catalog, then merge each returned track with the user's
    /// recorded like state. Page indices are 1-based.
    pub async fn search(
        &self,
        query: &str,
        page_size: u32,
        page_index: u32,
        user_id: i64,
    ) -> Result<SearchResponse, AppError> {
        if page_index < 1 || page_size < 1 {
            return Err(AppError::Validation(
                "pageIndex and pageSize must be at least 1".into(),
            ));
        }

        let limit = page_size;
        let offset = page_index
            .checked_sub(1)
            .and_then(|i| i.checked_mul(page_size))
            .ok_or_else(|| AppError::Validation("page window is out of range".into()))?;

        let details = self.outbound.search(query, limit, offset).await.map_err(|e| {
            tracing::error!("error searching tracks upstream: {}", e);
            e
        })?;

        let track_ids: Vec<String> = details.tracks.items.iter().map(|t| t.id.clone()).collect();

        let activities = self
            .activities
            .get_bulk(user_id, &track_ids)
            .await
            .map_err(|e| {
                tracing::error!("error fetching track activities: {}", e);
                e
            })?;

        Ok(merge_response(details, &activities))
    }

    /// Record a like/unlike action. The first action for a (user, track)
    /// pair creates the row, later actions overwrite its like state.
    pub async fn upsert_activity(
        &self,
        user_id: i64,
        request: TrackActivityRequest,
    ) -> Result<(), AppError> {
        match self.activities.get(user_id, &request.spotify_id).await {
            Ok(mut existing) => {
                existing.is_liked = request.is_liked;
                self.activities.update(&existing).await
            }
            Err(err) if err.is_not_found() => {
                self.activities
                    .create(NewTrackActivity {
                        user_id,
                        spotify_id: request.spotify_id,
                        is_liked: request.is_liked,
                    })
                    .await
            }
            Err(err) => {
                tracing::error!("error fetching track activity: {}", err);
                Err(err)
            }
        }
    }
}

/// Merge upstream tracks with the activity map, preserving upstream order.
/// Tracks without recorded activity keep `is_liked` unset; the merge never
/// fails because the map is smaller than the track list.
fn merge_response(
    details: RawSearchResponse,
    activities: &HashMap<String, TrackActivity>,
) -> SearchResponse {
    let items = details
        .tracks
        .items
        .into_iter()
        .map(|track| {
            let is_liked = activities.get(&track.id).and_then(|a| a.is_liked);
            TrackResponse {
                album_type: track.album.album_type,
                album_total_tracks: track.album.total_tracks,
                album_image_url: track.album.images.into_iter().map(|i| i.url).collect(),
                album_name: track.album.name,
                artists_name: track.artists.into_iter().map(|a| a.name).collect(),
                explicit: track.explicit,
                href: track.href,
                id: track.id,
                name: track.name,
                is_liked,
            }
        })
        .collect();

    SearchResponse {
        items,
        limit: details.tracks.limit,
        offset: details.tracks.offset,
        total: details.tracks.total,
    }
}
