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

use crate::math::{Mat4, Vec4, Viewport};
use crate::renderer::error::GraphError;
use crate::renderer::{
    DrawListDescriptor, DrawListHandle, MaterialId, TextureDescriptor, TextureHandle, TextureId,
};
use std::borrow::Cow;

/// What the graph knows about a texture handle.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// The texture's descriptor.
    pub descriptor: TextureDescriptor<'static>,
    /// The persistent texture behind the handle, for imported textures.
    pub imported: Option<TextureId>,
    /// Whether the handle is the frame's final presentation target.
    pub is_backbuffer: bool,
}

/// Declares a raster pass and its resource accesses.
///
/// The graph orders passes by these declarations: a pass that reads a texture runs
/// after every earlier pass that wrote it.
#[derive(Debug, Clone, Default)]
pub struct RasterPassDescriptor<'a> {
    /// A debug label.
    pub label: Option<Cow<'a, str>>,
    /// Color attachment written by the pass.
    pub color_attachment: Option<TextureHandle>,
    /// Depth attachment written by the pass.
    pub depth_attachment: Option<TextureHandle>,
    /// Textures sampled by the pass.
    pub reads: Cow<'a, [TextureHandle]>,
    /// Draw lists the pass will issue.
    pub draw_lists: Cow<'a, [DrawListHandle]>,
    /// Whether the pass sets frame-global shader state.
    pub modifies_global_state: bool,
    /// Whether the graph may drop the pass when nothing reads its outputs.
    pub allow_culling: bool,
}

/// Declares a full-screen blit from one texture to another.
#[derive(Debug, Clone)]
pub struct BlitPassDescriptor<'a> {
    /// A debug label.
    pub label: Option<Cow<'a, str>>,
    /// Texture read by the blit.
    pub source: TextureHandle,
    /// Texture written by the blit.
    pub destination: TextureHandle,
    /// Material used to blit.
    pub material: MaterialId,
    /// Pass of `material` to draw with.
    pub pass_index: u32,
}

/// Commands recorded into a raster pass.
///
/// Commands execute in the order they are recorded, when the host executes the graph.
pub trait RasterPass {
    /// Restricts rasterization to `viewport`.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Sets the view and projection matrices for the following draws.
    fn set_view_projection(&mut self, view: Mat4, projection: Mat4);

    /// Issues every draw call of a draw list declared on this pass.
    fn draw_list(&mut self, list: DrawListHandle);

    /// Sets a pass-scoped global vector.
    fn set_global_vector(&mut self, name: &str, value: Vec4);

    /// Sets a pass-scoped global float.
    fn set_global_float(&mut self, name: &str, value: f32);

    /// Binds a texture handle declared as read by this pass under `name`.
    fn set_global_texture(&mut self, name: &str, texture: TextureHandle);

    /// Enables or disables a shader keyword on `material`.
    fn set_keyword(&mut self, material: MaterialId, keyword: &str, enabled: bool);

    /// Sets a float property on `material`.
    fn set_material_float(&mut self, material: MaterialId, property: &str, value: f32);

    /// Draws a full-screen triangle with `material`.
    fn draw_fullscreen(&mut self, material: MaterialId, pass_index: u32);
}

/// The per-frame render graph of the host.
pub trait RenderGraph {
    /// Declares a transient texture that lives for this frame only.
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureHandle;

    /// Imports a persistent texture so passes can read or write it.
    fn import_texture(&mut self, id: TextureId, descriptor: &TextureDescriptor) -> TextureHandle;

    /// Returns what the graph knows about `handle`, or `None` if it is invalid.
    fn texture_info(&self, handle: TextureHandle) -> Option<TextureInfo>;

    /// Returns the frame's presentation target.
    fn backbuffer(&self) -> TextureHandle;

    /// Builds a draw list against this frame's scene.
    /// ## Errors
    /// * `GraphError` - If the host cannot build the list.
    fn create_draw_list(
        &mut self,
        descriptor: &DrawListDescriptor,
    ) -> Result<DrawListHandle, GraphError>;

    /// Adds a raster pass and returns a recorder for its commands.
    /// ## Errors
    /// * `GraphError` - If an attachment, read or draw list handle is invalid.
    fn add_raster_pass<'g>(
        &'g mut self,
        descriptor: &RasterPassDescriptor,
    ) -> Result<Box<dyn RasterPass + 'g>, GraphError>;

    /// Adds a blit pass.
    /// ## Errors
    /// * `GraphError` - If either handle is invalid.
    fn add_blit_pass(&mut self, descriptor: &BlitPassDescriptor) -> Result<(), GraphError>;
}
