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

//! Provides the backend-agnostic contracts between the shadow subsystem and its host.
//!
//! The host renderer owns the scene, culling, draw submission and the graph
//! executor. This module only states what the shadow passes need from it:
//! persistent resources and frame-global shader state through [`GraphicsDevice`],
//! and per-frame pass declarations through [`RenderGraph`] and [`RasterPass`].
//! A concrete implementation lives in `umbra-infra`.

pub mod clip_space;
pub mod draw_list;
pub mod error;
pub mod resource;
pub mod texture;
pub mod traits;
pub mod viewpoint;

// Re-export the most important traits and types for easier use.
pub use self::clip_space::ClipSpaceConvention;
pub use self::draw_list::{DrawListDescriptor, LayerMask, RenderQueueType, SortingCriteria};
pub use self::error::{GraphError, ResourceError};
pub use self::resource::{BufferId, DrawListHandle, MaterialId, TextureHandle, TextureId};
pub use self::texture::{TextureDescriptor, TextureFormat};
pub use self::traits::{
    BlitPassDescriptor, GraphicsDevice, RasterPass, RasterPassDescriptor, RenderGraph,
    ShaderGlobals, StructuredBufferDescriptor, TextureInfo,
};
pub use self::viewpoint::{CameraKind, Viewpoint, ViewpointId};
