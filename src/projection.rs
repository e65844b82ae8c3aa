//! View frustum parameters.
//!
//! The [`Frustum`] struct is the single source of truth for the camera's
//! projection volume (left/right/bottom/top on the near plane plus the near and
//! far distances). It generates either a perspective or an orthographic matrix.

use serde::{Deserialize, Serialize};

use crate::math::mat4::Mat4;
use crate::scene::SceneError;

/// Which projection the camera uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}

/// Frustum bounds in camera space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Frustum {
    fn default() -> Self {
        Self::symmetric(0.5, 0.5, 1.0, 20.0)
    }
}

impl Frustum {
    /// Creates a new frustum with the given planes.
    ///
    /// # Arguments
    /// * `left`, `right` - Horizontal extent on the near plane
    /// * `bottom`, `top` - Vertical extent on the near plane
    /// * `near`, `far` - Clipping plane distances along -Z
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    /// Creates a frustum centered on the view axis.
    pub fn symmetric(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self::new(-half_width, half_width, -half_height, half_height, near, far)
    }

    /// Checks that the frustum encloses a non-empty volume.
    ///
    /// A perspective frustum additionally needs a near plane in front of the eye.
    pub fn validate(&self, kind: ProjectionKind) -> Result<(), SceneError> {
        let reason = if self.left == self.right {
            Some("left and right planes coincide")
        } else if self.bottom == self.top {
            Some("bottom and top planes coincide")
        } else if self.near == self.far {
            Some("near and far planes coincide")
        } else if kind == ProjectionKind::Perspective && self.near <= 0.0 {
            Some("perspective near plane must be positive")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SceneError::InvalidFrustum { reason }),
            None => Ok(()),
        }
    }

    /// Generates the projection matrix for the requested kind.
    pub fn matrix(&self, kind: ProjectionKind) -> Mat4 {
        let Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        } = *self;
        match kind {
            ProjectionKind::Perspective => Mat4::perspective(left, right, bottom, top, near, far),
            ProjectionKind::Orthographic => Mat4::orthographic(left, right, bottom, top, near, far),
        }
    }
}
