use std::borrow::Cow;
use std::collections::HashMap;
use axum::http::StatusCode;
use axum::Json;
use axum::response::{IntoResponse, Response};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Blend shape reporting how closed the left eye is, in `[0, 1]`.
pub const EYE_BLINK_LEFT: &str = "eyeBlinkLeft";
/// Blend shape reporting how closed the right eye is, in `[0, 1]`.
pub const EYE_BLINK_RIGHT: &str = "eyeBlinkRight";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    Cancelled,
    InvalidArgument,
}

impl ErrorCategory {
    pub fn to_status_code(self) -> StatusCode {
        match self {
            ErrorCategory::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::InvalidArgument => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub category: ErrorCategory,
    pub error_code: Cow<'static, str>,
    pub instance_id: String,
    pub message: Cow<'static, str>,
}

impl ApiError {
    pub fn with_message(
        category: ErrorCategory,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            category,
            error_code: code.into(),
            instance_id: nanoid::nanoid!(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorCategory::InvalidArgument, "invalid_argument", message)
    }

    /// The game loop is gone, so nothing will consume the request.
    pub fn unavailable() -> Self {
        Self::with_message(ErrorCategory::Cancelled, "unavailable", "service unavailable")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.category.to_status_code();
        (status_code, Json(self)).into_response()
    }
}

/// Accepted for compatibility with landmark-producing trackers; the game only
/// uses blend shapes and the face transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceLandmark {
    pub position: Vec3,
    pub presence: Option<f32>,
    pub visibility: Option<f32>,
}

/// One tracked face as reported by the tracker for a single frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    /// Accepted and ignored.
    #[serde(default)]
    pub landmarks: Vec<FaceLandmark>,
    pub blend_shapes: HashMap<String, f32>,
    /// Column-major world transform of the face.
    pub transform: Mat4,
}

/// Every anchor seen by the tracker in one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFacesRequest {
    pub faces: Vec<Face>,
}

impl SetFacesRequest {
    /// Rejects requests carrying NaN or infinite blend shapes or transforms.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (index, face) in self.faces.iter().enumerate() {
            if !face.transform.is_finite() {
                return Err(ApiError::invalid_argument(format!("face {index} has a non-finite transform")));
            }
            if let Some((name, _)) = face.blend_shapes.iter().find(|(_, weight)| !weight.is_finite()) {
                return Err(ApiError::invalid_argument(format!("face {index} blend shape `{name}` is not finite")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetViewRequest {
    pub visible: bool,
}
