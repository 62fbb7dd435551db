//! Service layer: search orchestration, activity upserts and user accounts.

pub mod catalogue;
pub mod users;

pub use catalogue::{CatalogueService, SearchResponse, TrackActivityRequest, TrackResponse};
pub use users::{SignInRequest, SignUpRequest, UserService};
