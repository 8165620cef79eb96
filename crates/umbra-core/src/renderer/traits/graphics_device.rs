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

use crate::math::{Mat4, Vec4};
use crate::renderer::error::ResourceError;
use crate::renderer::{BufferId, ClipSpaceConvention, MaterialId, TextureDescriptor, TextureId};
use std::borrow::Cow;
use std::fmt::Debug;

/// Frame-global shader state, visible to every material that reads it.
///
/// Values stay bound until overwritten, so anything published here outlives the
/// pass that published it.
pub trait ShaderGlobals {
    /// Binds `texture` under `name`.
    fn set_global_texture(&self, name: &str, texture: TextureId);

    /// Binds a 4x4 matrix under `name`.
    fn set_global_matrix(&self, name: &str, value: Mat4);

    /// Binds a 4-component vector under `name`.
    fn set_global_vector(&self, name: &str, value: Vec4);

    /// Binds a float under `name`.
    fn set_global_float(&self, name: &str, value: f32);

    /// Binds an integer under `name`.
    fn set_global_int(&self, name: &str, value: i32);

    /// Binds a structured buffer under `name`.
    fn set_global_buffer(&self, name: &str, buffer: BufferId);
}

/// Describes a fixed-capacity structured buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredBufferDescriptor<'a> {
    /// A debug label.
    pub label: Option<Cow<'a, str>>,
    /// Number of elements.
    pub capacity: usize,
    /// Size in bytes of a single element.
    pub stride: usize,
}

impl StructuredBufferDescriptor<'_> {
    /// Total size in bytes.
    pub fn size(&self) -> usize {
        self.capacity * self.stride
    }
}

/// The persistent-resource side of the host renderer.
///
/// Implementations are shared behind an `Arc` and take `&self` everywhere, so they
/// are expected to use interior mutability for their own bookkeeping.
pub trait GraphicsDevice: ShaderGlobals + Send + Sync + Debug + 'static {
    /// Creates a new GPU texture.
    /// ## Errors
    /// * `ResourceError` - If the texture cannot be created.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a GPU texture.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the texture was already destroyed.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates a structured buffer of `capacity` elements of `stride` bytes, zero-filled.
    /// ## Errors
    /// * `ResourceError` - If the buffer cannot be created.
    fn create_structured_buffer(
        &self,
        descriptor: &StructuredBufferDescriptor,
    ) -> Result<BufferId, ResourceError>;

    /// Writes `data` into a buffer at byte `offset`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the write does not fit in the buffer.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Destroys a GPU buffer.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the buffer was already destroyed.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Looks up a material by name.
    fn find_material(&self, name: &str) -> Option<MaterialId>;

    /// The material the host uses for plain texture blits.
    fn default_blit_material(&self) -> MaterialId;

    /// The clip-space depth convention of the backend.
    fn clip_space(&self) -> ClipSpaceConvention;

    /// Whether multisampled textures can be bound for sampling.
    fn supports_multisampled_textures(&self) -> bool;
}
