use std::fmt;

use crate::scene::SceneState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The host could not provide a drawing surface.
    SurfaceUnavailable,
    /// A lifecycle call was made from a state that does not allow it.
    InvalidTransition {
        from: SceneState,
        action: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::SurfaceUnavailable => write!(f, "drawing surface unavailable"),
            SceneError::InvalidTransition { from, action } => {
                write!(f, "cannot {action} a scene that is {from}")
            }
        }
    }
}

impl std::error::Error for SceneError {}

pub type Result<T> = std::result::Result<T, SceneError>;
