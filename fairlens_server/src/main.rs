use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use fairlens_core::{CrashChain, DiceRoll, MinesRound, VerifyError};
use fairlens_shared::{
    ApiError, CrashRequest, CrashResponse, CrashRow, DiceRequest, DiceResponse, ErrorBody,
    MinesRequest, MinesResponse,
};

mod config;

use config::ServerConfig;

struct AppState {
    config: ServerConfig,
}

struct AppError(ApiError);

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        Self(ApiError::Verify(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::Verify(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self.0);
        } else {
            warn!("rejected request: {}", self.0);
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn route_health() -> &'static str {
    "ok"
}

async fn route_crash(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CrashRequest>,
) -> Result<Json<CrashResponse>, AppError> {
    if req.num_games == 0 || req.num_games > state.config.max_games {
        return Err(ApiError::Invalid(format!(
            "num_games must be between 1 and {}",
            state.config.max_games
        ))
        .into());
    }
    debug!(num_games = req.num_games, "verifying crash chain");
    // a long walk is CPU-bound; keep it off the async workers
    let games = tokio::task::spawn_blocking(move || {
        let chain = CrashChain::new(req.salt).link_encoding(req.link_encoding);
        chain
            .walk(&req.game_hash, req.num_games)
            .map(|game| game.map(CrashRow::from))
            .collect::<fairlens_core::Result<Vec<_>>>()
    })
    .await
    .map_err(|e| {
        error!("crash walk task failed: {e}");
        ApiError::Internal
    })??;
    Ok(Json(CrashResponse { games }))
}

async fn route_dice(Json(req): Json<DiceRequest>) -> Result<Json<DiceResponse>, AppError> {
    let roll = DiceRoll::verify(&req.server_hash, &req.client_secret, &req.nonce)?;
    debug!(roll = roll.0, "verified dice roll");
    Ok(Json(DiceResponse {
        roll: roll.0,
        display: roll.display(),
    }))
}

async fn route_mines(Json(req): Json<MinesRequest>) -> Result<Json<MinesResponse>, AppError> {
    let grid = MinesRound::new(req.server_secret, req.client_secret, req.nonce, req.mine_count)
        .client_secret_encoding(req.client_secret_encoding)
        .verify()?;
    debug!(mines = ?grid.mine_positions(), "verified mines board");
    Ok(Json(MinesResponse {
        grid: grid.rows().map(<[bool]>::to_vec).collect(),
        mine_positions: grid.mine_positions(),
    }))
}

fn app(config: ServerConfig) -> Router {
    let state = Arc::new(AppState { config });
    Router::new()
        .route("/health", get(route_health))
        .route("/crash", post(route_crash))
        .route("/dice", post(route_dice))
        .route("/mines", post(route_mines))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let config = ServerConfig::from_env()?;
    let addr = config.bind.clone();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(max_games = config.max_games, "listening on {addr}");
    axum::serve(listener, app(config)).await?;
    Ok(())
}
