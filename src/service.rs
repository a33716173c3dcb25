//! The `GET /cotacao` pipeline: fetch the quote, persist it, answer with it.

use crate::config::ServerConfig;
use crate::deadline::Deadline;
use crate::error::{ServiceError, ServiceResult};
use crate::source::RateSource;
use crate::store::RateStore;
use crate::types::Rate;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{info, log, warn, Level};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Fetching,
    Fetched,
    FetchFailed,
    Saving,
    Done,
    SaveFailed,
}

pub struct RateService {
    source: RateSource,
    store: Arc<RateStore>,
    save_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl RateService {
    pub fn new(cfg: &ServerConfig, store: Arc<RateStore>) -> reqwest::Result<Self> {
        Ok(Self {
            source: RateSource::new(cfg)?,
            store,
            save_timeout: cfg.save_timeout,
            request_timeout: cfg.request_timeout,
        })
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Deadline carried by an inbound request.
    pub fn inbound_deadline(&self) -> Deadline {
        self.request_timeout
            .map(Deadline::after)
            .unwrap_or_else(Deadline::none)
    }

    /// Fetch under a child of `inbound`, then save under a fresh budget that
    /// ignores whatever is left of `inbound`.
    pub async fn get_current_rate(&self, inbound: Deadline) -> ServiceResult<Rate> {
        let req_id = Uuid::new_v4();
        transition(req_id, Stage::Start);

        transition(req_id, Stage::Fetching);
        let rate = match self.source.fetch(inbound).await {
            Ok(r) => r,
            Err(e) => {
                transition(req_id, Stage::FetchFailed);
                warn!("[{}] fetch stage failed: {}", req_id, e);
                return Err(e);
            }
        };
        transition(req_id, Stage::Fetched);

        transition(req_id, Stage::Saving);
        let save_deadline = Deadline::after(self.save_timeout);
        if let Err(e) = self.store.save(&rate, save_deadline).await {
            transition(req_id, Stage::SaveFailed);
            warn!(
                "[{}] save stage failed for bid {:?}: {}",
                req_id, rate.bid, e
            );
            return Err(e);
        }

        transition(req_id, Stage::Done);
        info!("[{}] served bid {:?}", req_id, rate.bid);
        Ok(rate)
    }
}

fn stage_level(stage: Stage) -> Level {
    match stage {
        Stage::Fetching | Stage::Saving | Stage::Done => Level::Info,
        _ => Level::Debug,
    }
}

fn transition(req_id: Uuid, stage: Stage) {
    log!(stage_level(stage), "[{}] stage -> {:?}", req_id, stage);
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.public_message()).into_response()
    }
}

async fn get_cotacao(State(service): State<Arc<RateService>>) -> Result<Json<Rate>, ServiceError> {
    let inbound = service.inbound_deadline();
    service.get_current_rate(inbound).await.map(Json)
}

pub fn router(service: Arc<RateService>) -> Router {
    Router::new()
        .route("/cotacao", get(get_cotacao))
        .with_state(service)
}

/// Serve until `shutdown` resolves. In-flight requests finish first.
pub async fn serve<F>(listener: TcpListener, service: Arc<RateService>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Server running on {}", addr);
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
