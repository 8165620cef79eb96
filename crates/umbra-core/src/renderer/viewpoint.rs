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

//! The camera-equivalent viewpoints a host renders each frame.

use super::TextureDescriptor;
use crate::light::LightId;
use crate::math::Vec3;

/// What kind of camera a viewpoint is. Only [`CameraKind::Game`] runs the shadow passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// An in-game camera, including cameras attached to lights.
    Game,
    /// The editor scene view.
    SceneView,
    /// An inspector or asset preview.
    Preview,
    /// A reflection probe capture.
    Reflection,
}

/// A stable identity for a viewpoint across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewpointId(pub u64);

/// A rendering viewpoint, as exposed by the host for the current camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    /// Stable identity.
    pub id: ViewpointId,
    /// Camera type, used to gate execution.
    pub kind: CameraKind,
    /// World-space position of the viewer.
    pub position: Vec3,
    /// The light component attached to the same scene object, if any.
    pub attached_light: Option<LightId>,
    /// Descriptor of the color target. `None` for depth-only cameras.
    pub color_target: Option<TextureDescriptor<'static>>,
    /// Descriptor of the depth target.
    pub depth_target: Option<TextureDescriptor<'static>>,
}

impl Viewpoint {
    /// Creates a game viewpoint at `position` with no attached light and no targets.
    pub fn game(id: ViewpointId, position: Vec3) -> Self {
        Self {
            id,
            kind: CameraKind::Game,
            position,
            attached_light: None,
            color_target: None,
            depth_target: None,
        }
    }

    /// Sets the color and depth target descriptors.
    pub fn with_targets(
        mut self,
        color: TextureDescriptor<'static>,
        depth: TextureDescriptor<'static>,
    ) -> Self {
        self.color_target = Some(color);
        self.depth_target = Some(depth);
        self
    }

    /// Marks the viewpoint as driven by `light`.
    pub fn attached_to(mut self, light: LightId) -> Self {
        self.attached_light = Some(light);
        self
    }

    /// Returns `true` if the shadow passes should run for this viewpoint.
    pub fn renders_shadows(&self) -> bool {
        self.kind == CameraKind::Game && self.color_target.is_some()
    }
}
