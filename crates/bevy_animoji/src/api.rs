use std::sync::Arc;

use axum::{Json, Router};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::put;
use bevy::prelude::{EventWriter, ResMut, Resource};
use tokio::sync::mpsc;
use tracing::trace;

use animoji_api::{ApiError, SetFacesRequest, SetViewRequest};

use crate::tracking::TrackingUpdate;
use crate::view::ViewEvent;

/// Largest accepted request body. Landmark-heavy face updates stay well below this.
const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug)]
pub enum Command {
    SetFaces(SetFacesRequest),
    SetView(SetViewRequest),
}

pub struct ApiState {
    tx: mpsc::UnboundedSender<Command>,
}

impl ApiState {
    pub fn new() -> (Arc<Self>, ApiResource) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self {
            tx,
        }), ApiResource {
            rx
        })
    }

    pub fn submit(&self, command: Command) -> Result<(), ApiError> {
        self.tx.send(command).map_err(|_| ApiError::unavailable())
    }
}

async fn put_faces(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SetFacesRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    state.submit(Command::SetFaces(request))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn put_view(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SetViewRequest>,
) -> Result<StatusCode, ApiError> {
    state.submit(Command::SetView(request))?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn new_api() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/v1/faces", put(put_faces))
        .route("/v1/view", put(put_view))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}

#[derive(Resource)]
pub struct ApiResource {
    rx: mpsc::UnboundedReceiver<Command>,
}

/// Hands commands received by the HTTP server to the game.
pub fn update_api(
    mut api: ResMut<ApiResource>,
    mut tracking: EventWriter<TrackingUpdate>,
    mut views: EventWriter<ViewEvent>,
) {
    while let Ok(command) = api.rx.try_recv() {
        trace!(?command, "api command");
        match command {
            Command::SetFaces(request) => {
                tracking.send(TrackingUpdate::from(request));
            }
            Command::SetView(request) => {
                views.send(if request.visible {
                    ViewEvent::Appeared
                } else {
                    ViewEvent::Disappeared
                });
            }
        }
    }
}
