use std::collections::HashMap;

use bevy::prelude::{Event, Transform};

use animoji_api::{EYE_BLINK_LEFT, EYE_BLINK_RIGHT};

#[derive(Debug, Clone)]
pub struct Face {
    pub blend_shapes: HashMap<String, f32>,
    pub transform: Transform,
}

impl Face {
    /// Returns `(left, right)` blink intensities, or `None` unless both are tracked.
    pub fn eye_blink(&self) -> Option<(f32, f32)> {
        let left = *self.blend_shapes.get(EYE_BLINK_LEFT)?;
        let right = *self.blend_shapes.get(EYE_BLINK_RIGHT)?;
        Some((left, right))
    }
}

/// Landmarks are not used by the game and are dropped here.
impl From<animoji_api::Face> for Face {
    fn from(face: animoji_api::Face) -> Self {
        Self {
            blend_shapes: face.blend_shapes,
            transform: Transform::from_matrix(face.transform),
        }
    }
}

/// All anchors reported by the tracker for one frame.
#[derive(Debug, Clone, Default, Event)]
pub struct TrackingUpdate {
    pub faces: Vec<Face>,
}

impl TrackingUpdate {
    /// The face driving the animoji. With several faces the last one wins.
    pub fn face(&self) -> Option<&Face> {
        self.faces.last()
    }
}

impl From<animoji_api::SetFacesRequest> for TrackingUpdate {
    fn from(request: animoji_api::SetFacesRequest) -> Self {
        Self {
            faces: request.faces.into_iter().map(From::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::{Mat4, Vec3};

    use super::*;

    fn face_at(position: Vec3, blink: Option<(f32, f32)>) -> Face {
        let mut blend_shapes = HashMap::new();
        if let Some((left, right)) = blink {
            blend_shapes.insert(EYE_BLINK_LEFT.to_string(), left);
            blend_shapes.insert(EYE_BLINK_RIGHT.to_string(), right);
        }
        Face {
            blend_shapes,
            transform: Transform::from_translation(position),
        }
    }

    #[test]
    fn test_last_face_wins() {
        let update = TrackingUpdate {
            faces: vec![
                face_at(Vec3::X, Some((0.1, 0.1))),
                face_at(Vec3::Y, Some((0.9, 0.9))),
            ],
        };
        let face = update.face().unwrap();
        assert_eq!(face.transform.translation, Vec3::Y);
        assert_eq!(face.eye_blink(), Some((0.9, 0.9)));
    }

    #[test]
    fn test_empty_update_has_no_face() {
        assert!(TrackingUpdate::default().face().is_none());
    }

    #[test]
    fn test_partial_blink_is_missing() {
        let mut face = face_at(Vec3::ZERO, None);
        face.blend_shapes.insert(EYE_BLINK_RIGHT.to_string(), 0.4);
        assert_eq!(face.eye_blink(), None);
    }

    #[test]
    fn test_from_api_face() {
        let face = Face::from(animoji_api::Face {
            landmarks: vec![animoji_api::FaceLandmark {
                position: Vec3::new(0.1, 0.1, 0.0),
                presence: Some(1.0),
                visibility: None,
            }],
            blend_shapes: HashMap::from([
                (EYE_BLINK_LEFT.to_string(), 0.2),
                (EYE_BLINK_RIGHT.to_string(), 0.3),
            ]),
            transform: Mat4::from_translation(Vec3::new(0.5, 1.0, -2.0)),
        });
        assert_eq!(face.transform.translation, Vec3::new(0.5, 1.0, -2.0));
        assert_eq!(face.eye_blink(), Some((0.2, 0.3)));
    }
}
