use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use amen_api::auth::{self, AppState, AppStateInner};
use amen_api::middleware::require_auth;
use amen_api::{comments, content, favorites, prayers, seed};
use amen_gateway::connection;
use amen_gateway::dispatcher::Dispatcher;

#[derive(Clone)]
struct ServerState {
    dispatcher: Dispatcher,
    jwt_secret: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amen=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("AMEN_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("AMEN_DB_PATH").unwrap_or_else(|_| "amen.db".into());
    let host = std::env::var("AMEN_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("AMEN_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = amen_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let dispatcher = Dispatcher::new();
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: jwt_secret.clone(),
        dispatcher: dispatcher.clone(),
    });

    let state = ServerState {
        dispatcher,
        jwt_secret,
    };

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/social", post(auth::social_login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/me", put(auth::update_me))
        .route("/devotions", get(content::list_devotions))
        .route("/devotions", post(content::add_devotion))
        .route("/verses", get(content::list_verses))
        .route("/verses", post(content::add_verse))
        .route("/videos", get(content::list_videos))
        .route("/videos", post(content::add_video))
        .route("/admin/seed", post(seed::seed))
        .route("/prayers", get(prayers::get_prayers))
        .route("/prayers", post(prayers::add_prayer))
        .route("/prayers/{prayer_id}", put(prayers::update_prayer))
        .route("/prayers/{prayer_id}", delete(prayers::delete_prayer))
        .route("/prayers/{prayer_id}/pray", post(prayers::pray))
        .route("/prayers/{prayer_id}/comments", post(comments::add_comment))
        .route(
            "/prayers/{prayer_id}/comments/{comment_id}/like",
            post(comments::toggle_like),
        )
        .route("/favorites", get(favorites::list_favorites))
        .route("/favorites", post(favorites::add_favorite))
        .route("/favorites/{favorite_id}", delete(favorites::delete_favorite))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("The Morning Amen server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn ws_upgrade(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        connection::handle_connection(socket, state.dispatcher, state.jwt_secret)
    })
}
