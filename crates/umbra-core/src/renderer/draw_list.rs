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

//! Descriptors for host-built draw lists.
//!
//! A draw list is the host's culled and sorted set of draw calls for one filter.
//! The shadow passes describe *what* to draw; culling, batching and submission stay
//! on the host side.

use super::MaterialId;
use crate::math::Mat4;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Selects which render-queue range a draw list pulls geometry from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderQueueType {
    /// Opaque and alpha-tested geometry.
    #[default]
    Opaque,
    /// Alpha-blended geometry.
    Transparent,
}

/// A bit mask of scene layers. Bit `n` selects layer `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Selects no layer.
    pub const NONE: LayerMask = LayerMask(0);
    /// Selects every layer.
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Returns `true` if `layer` is selected.
    pub fn contains(self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

/// Sort order applied by the host when building a draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortingCriteria {
    /// Front to back, grouped by material. Used for opaque geometry.
    CommonOpaque,
    /// Back to front. Used for transparent geometry.
    CommonTransparent,
}

impl From<RenderQueueType> for SortingCriteria {
    fn from(queue: RenderQueueType) -> Self {
        match queue {
            RenderQueueType::Opaque => SortingCriteria::CommonOpaque,
            RenderQueueType::Transparent => SortingCriteria::CommonTransparent,
        }
    }
}

/// Describes a draw list to build for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawListDescriptor<'a> {
    /// A debug label.
    pub label: Option<Cow<'a, str>>,
    /// Only shader passes carrying one of these tags are drawn.
    pub shader_tags: Cow<'a, [String]>,
    /// Render-queue range filter.
    pub queue: RenderQueueType,
    /// Layer filter.
    pub layer_mask: LayerMask,
    /// Sort order.
    pub sorting: SortingCriteria,
    /// Material whose shader replaces every drawn object's own shader.
    pub override_material: MaterialId,
    /// Pass of the override material to draw with.
    pub override_pass: u32,
    /// Combined projection x view matrix the host culls against.
    pub culling_matrix: Mat4,
    /// Depth writes with a `Less` depth test when `true`.
    pub depth_write: bool,
}
