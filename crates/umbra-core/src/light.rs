// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the per-light configuration consumed by the shadow subsystem.
//!
//! A [`LightDescriptor`] is pure data: which projection the light uses, how large
//! its shadow atlas is, and a weak reference to the transform the host owns. The
//! registry in `umbra-data` assigns each active descriptor a dense index, and the
//! lanes in `umbra-lanes` turn it into matrices and passes.

use crate::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, Weak};

/// The maximum number of lights that can hold a shadow slot at the same time.
///
/// This is also the capacity of the light information buffer.
pub const MAX_LIGHTS: usize = 100;

/// The number of faces rendered for an omnidirectional (point) light.
pub const POINT_LIGHT_FACES: usize = 6;

/// A stable, host-assigned identity for a light.
///
/// Lights are indexed in ascending `LightId` order, so the host should hand out
/// ids in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightId(pub u64);

/// The projection family of a light, as seen by shading code.
///
/// The discriminants are part of the GPU contract: they are written verbatim into
/// the `lightMode` field of each light record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum LightMode {
    /// Orthographic projection.
    Directional = 0,
    /// Perspective projection.
    Spot = 1,
    /// Omnidirectional, rendered as six perspective faces.
    Point = 2,
}

impl LightMode {
    /// Returns the value written to the GPU record.
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// How a light projects the scene into its shadow atlas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightProjection {
    /// An orthographic box of half-size `horizontal_extent` x `vertical_extent`.
    Directional {
        /// Horizontal half-extent of the box, in world units.
        horizontal_extent: f32,
        /// Vertical half-extent of the box, in world units.
        vertical_extent: f32,
        /// Near clipping plane.
        near: f32,
        /// Far clipping plane.
        far: f32,
    },
    /// A perspective frustum.
    Spot {
        /// Vertical field of view, in degrees.
        fov_degrees: f32,
        /// Width / height ratio.
        aspect: f32,
        /// Near clipping plane.
        near: f32,
        /// Far clipping plane.
        far: f32,
    },
    /// Six 90 degree faces around the light position.
    Point {
        /// Far plane of every face, and half-size of the culling box.
        radius: f32,
    },
}

impl LightProjection {
    /// Returns the [`LightMode`] shading code uses for this projection.
    pub fn mode(&self) -> LightMode {
        match self {
            LightProjection::Directional { .. } => LightMode::Directional,
            LightProjection::Spot { .. } => LightMode::Spot,
            LightProjection::Point { .. } => LightMode::Point,
        }
    }

    /// Returns the far plane stored in the light record.
    pub fn far_plane(&self) -> f32 {
        match *self {
            LightProjection::Directional { far, .. } | LightProjection::Spot { far, .. } => far,
            LightProjection::Point { radius } => radius,
        }
    }

    /// The number of horizontal slices the light occupies in its atlas.
    pub fn face_count(&self) -> usize {
        match self {
            LightProjection::Point { .. } => POINT_LIGHT_FACES,
            _ => 1,
        }
    }
}

impl Default for LightProjection {
    fn default() -> Self {
        LightProjection::Directional {
            horizontal_extent: 20.0,
            vertical_extent: 20.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

/// The world-space placement of a light, owned by the host scene graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTransform {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation. Must be a unit quaternion.
    pub rotation: Quat,
}

impl LightTransform {
    /// Creates a transform from a position and a rotation.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Creates a transform at `position` with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for LightTransform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

/// The host-side handle to a light's transform.
///
/// Descriptors only keep a [`Weak`] to it; dropping the last `Arc` is how the host
/// signals that the light's owning object was destroyed.
pub type SharedLightTransform = Arc<RwLock<LightTransform>>;

/// Size of one face of a light's shadow atlas, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasResolution {
    /// Width of a single face.
    pub width: u32,
    /// Height of a single face.
    pub height: u32,
}

impl AtlasResolution {
    /// Creates a new resolution.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the full atlas extent for a light with `face_count` faces laid out
    /// side by side.
    pub fn strip_extent(&self, face_count: usize) -> (u32, u32) {
        (self.width * face_count as u32, self.height)
    }
}

impl Default for AtlasResolution {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

/// Per-light shadow configuration.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, RwLock};
/// use umbra_core::light::{LightDescriptor, LightId, LightProjection, LightTransform};
/// use umbra_core::math::Vec3;
///
/// let transform = Arc::new(RwLock::new(LightTransform::from_position(Vec3::new(0.0, 4.0, 0.0))));
/// let lamp = LightDescriptor::new(LightId(7), LightProjection::Point { radius: 5.0 }, &transform)
///     .with_fall_off_range(8.0);
///
/// assert_eq!(lamp.atlas_extent(), (6 * 1024, 1024));
/// assert!(lamp.transform().is_some());
///
/// drop(transform);
/// assert!(lamp.transform().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct LightDescriptor {
    /// Host identity; determines index assignment order.
    pub id: LightId,
    /// Dense slot in `[0, MAX_LIGHTS)`, or `None` while unindexed.
    pub index: Option<usize>,
    /// Projection kind and its parameters.
    pub projection: LightProjection,
    /// Shading-side falloff distance. Not used for culling.
    pub fall_off_range: f32,
    /// Size of a single atlas face.
    pub atlas_resolution: AtlasResolution,
    /// Added by the override shader to every shadow id this light writes.
    pub shadow_id_offset: i32,
    /// Name of a material that replaces the feature-wide override material for this light.
    pub override_material: Option<String>,
    transform: Weak<RwLock<LightTransform>>,
}

impl LightDescriptor {
    /// Creates an unindexed descriptor bound to `transform`.
    pub fn new(id: LightId, projection: LightProjection, transform: &SharedLightTransform) -> Self {
        Self {
            id,
            index: None,
            projection,
            fall_off_range: 20.0,
            atlas_resolution: AtlasResolution::default(),
            shadow_id_offset: 0,
            override_material: None,
            transform: Arc::downgrade(transform),
        }
    }

    /// Sets the atlas face resolution.
    pub fn with_atlas_resolution(mut self, width: u32, height: u32) -> Self {
        self.atlas_resolution = AtlasResolution::new(width, height);
        self
    }

    /// Sets the shading-side falloff distance.
    pub fn with_fall_off_range(mut self, range: f32) -> Self {
        self.fall_off_range = range;
        self
    }

    /// Sets the shadow id offset.
    pub fn with_shadow_id_offset(mut self, offset: i32) -> Self {
        self.shadow_id_offset = offset;
        self
    }

    /// Overrides the feature-wide override material for this light.
    pub fn with_override_material(mut self, material: impl Into<String>) -> Self {
        self.override_material = Some(material.into());
        self
    }

    /// Returns the light mode of the descriptor's projection.
    pub fn mode(&self) -> LightMode {
        self.projection.mode()
    }

    /// Returns the full atlas extent (six faces wide for point lights).
    pub fn atlas_extent(&self) -> (u32, u32) {
        self.atlas_resolution.strip_extent(self.projection.face_count())
    }

    /// Reads the current transform.
    ///
    /// Returns `None` when the host dropped the transform or its lock is poisoned;
    /// both mean the light is stale.
    pub fn transform(&self) -> Option<LightTransform> {
        let shared = self.transform.upgrade()?;
        let guard = shared.read().ok()?;
        Some(*guard)
    }

    /// Returns `true` while the host still owns the light's transform.
    pub fn is_alive(&self) -> bool {
        self.transform.strong_count() > 0
    }
}
