use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use music_catalogue::auth::AuthService;
use music_catalogue::config::Config;
use music_catalogue::handlers::{router, AppState};
use music_catalogue::service::{CatalogueService, UserService};
use music_catalogue::spotify::SpotifyClient;
use music_catalogue::store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    tracing::info!("database connected");

    let spotify = SpotifyClient::new(config.spotify_client_id, config.spotify_client_secret);
    let auth = AuthService::new(config.jwt_secret, chrono::Duration::minutes(10));

    let state = AppState {
        catalogue: Arc::new(CatalogueService::new(
            Arc::new(spotify),
            Arc::new(db.clone()),
        )),
        users: Arc::new(UserService::new(db, auth.clone())),
        auth,
    };

    let app = router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
