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

//! Error types shared by the host-renderer contracts.

use super::{DrawListHandle, TextureFormat, TextureHandle};
use thiserror::Error;

/// An error raised by a [`GraphicsDevice`](super::GraphicsDevice) while creating,
/// writing or destroying a resource.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// A generic resource could not be found.
    #[error("Resource not found with ID.")]
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    #[error("Invalid resource handle or ID.")]
    InvalidHandle,
    /// The device cannot create a texture in the requested format.
    #[error("Unsupported texture format: {0:?}")]
    UnsupportedFormat(TextureFormat),
    /// A write went past the end of a buffer.
    #[error("Resource access out of bounds.")]
    OutOfBounds,
    /// An error originating from the specific graphics backend implementation.
    #[error("Backend-specific resource error: {0}")]
    BackendError(String),
}

/// An error raised by a [`RenderGraph`](super::RenderGraph) while declaring passes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// The texture handle was never created or imported in this graph.
    #[error("Texture handle {0:?} is not valid in this graph")]
    InvalidTexture(TextureHandle),
    /// The backbuffer was used where an intermediate texture is required.
    #[error("Texture handle {0:?} refers to the backbuffer")]
    BackbufferNotAllowed(TextureHandle),
    /// The draw list handle was never created in this graph.
    #[error("Draw list handle {0:?} is not valid in this graph")]
    InvalidDrawList(DrawListHandle),
    /// A device-level failure surfaced while building the graph.
    #[error("Resource error while building the graph: {0}")]
    Resource(#[from] ResourceError),
}
