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

use std::borrow::Cow;
use umbra_core::math::{Mat4, Vec4, Viewport};
use umbra_core::renderer::{
    BlitPassDescriptor, DrawListDescriptor, DrawListHandle, GraphError, MaterialId, RasterPass,
    RasterPassDescriptor, RenderGraph, ResourceError, TextureDescriptor, TextureHandle, TextureId,
    TextureInfo,
};

/// A command recorded into a raster pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassCommand {
    /// `RasterPass::set_viewport`.
    SetViewport(Viewport),
    /// `RasterPass::set_view_projection`.
    SetViewProjection {
        /// View matrix.
        view: Mat4,
        /// Projection matrix.
        projection: Mat4,
    },
    /// `RasterPass::draw_list`.
    DrawList(DrawListHandle),
    /// `RasterPass::set_global_vector`.
    SetGlobalVector(String, Vec4),
    /// `RasterPass::set_global_float`.
    SetGlobalFloat(String, f32),
    /// `RasterPass::set_global_texture`.
    SetGlobalTexture(String, TextureHandle),
    /// `RasterPass::set_keyword`.
    SetKeyword {
        /// Target material.
        material: MaterialId,
        /// Keyword name.
        keyword: String,
        /// New state.
        enabled: bool,
    },
    /// `RasterPass::set_material_float`.
    SetMaterialFloat {
        /// Target material.
        material: MaterialId,
        /// Property name.
        property: String,
        /// New value.
        value: f32,
    },
    /// `RasterPass::draw_fullscreen`.
    DrawFullscreen {
        /// Material drawn.
        material: MaterialId,
        /// Pass of the material.
        pass_index: u32,
    },
}

/// A pass declared on a [`HeadlessGraph`], in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedPass {
    /// A raster pass and the commands recorded into it.
    Raster {
        /// Debug label.
        label: String,
        /// Color attachment.
        color: Option<TextureHandle>,
        /// Depth attachment.
        depth: Option<TextureHandle>,
        /// Declared reads.
        reads: Vec<TextureHandle>,
        /// Declared draw lists.
        draw_lists: Vec<DrawListHandle>,
        /// Recorded commands.
        commands: Vec<PassCommand>,
    },
    /// A blit pass.
    Blit {
        /// Debug label.
        label: String,
        /// Texture read.
        source: TextureHandle,
        /// Texture written.
        destination: TextureHandle,
        /// Blit material.
        material: MaterialId,
    },
}

impl RecordedPass {
    /// Returns the pass label.
    pub fn label(&self) -> &str {
        match self {
            RecordedPass::Raster { label, .. } | RecordedPass::Blit { label, .. } => label,
        }
    }

    /// Returns `true` if the pass writes `texture`.
    pub fn writes(&self, texture: TextureHandle) -> bool {
        match self {
            RecordedPass::Raster { color, depth, .. } => {
                *color == Some(texture) || *depth == Some(texture)
            }
            RecordedPass::Blit { destination, .. } => *destination == texture,
        }
    }

    /// Returns `true` if the pass reads `texture`.
    pub fn reads(&self, texture: TextureHandle) -> bool {
        match self {
            RecordedPass::Raster { reads, .. } => reads.contains(&texture),
            RecordedPass::Blit { source, .. } => *source == texture,
        }
    }
}

/// A render graph that records declarations for inspection instead of executing them.
///
/// Handle 0 is always the backbuffer.
#[derive(Debug)]
pub struct HeadlessGraph {
    textures: Vec<TextureInfo>,
    draw_lists: Vec<DrawListDescriptor<'static>>,
    passes: Vec<RecordedPass>,
}

impl HeadlessGraph {
    /// Creates an empty graph whose backbuffer is described by `backbuffer`.
    pub fn new(backbuffer: TextureDescriptor<'static>) -> Self {
        Self {
            textures: vec![TextureInfo {
                descriptor: backbuffer,
                imported: None,
                is_backbuffer: true,
            }],
            draw_lists: Vec::new(),
            passes: Vec::new(),
        }
    }

    /// Returns every declared pass, in declaration order.
    pub fn passes(&self) -> &[RecordedPass] {
        &self.passes
    }

    /// Returns the descriptor of a declared draw list.
    pub fn draw_list(&self, handle: DrawListHandle) -> Option<&DrawListDescriptor<'static>> {
        self.draw_lists.get(handle.0)
    }

    /// Number of draw lists built this frame.
    pub fn draw_list_count(&self) -> usize {
        self.draw_lists.len()
    }

    /// Returns the handles of every imported texture, with the persistent id behind each.
    pub fn imported_textures(&self) -> Vec<(TextureHandle, TextureId)> {
        self.textures
            .iter()
            .enumerate()
            .filter_map(|(i, info)| info.imported.map(|id| (TextureHandle(i), id)))
            .collect()
    }

    /// Returns the index of the first pass labelled `label`.
    pub fn pass_index(&self, label: &str) -> Option<usize> {
        self.passes.iter().position(|p| p.label() == label)
    }

    fn check_texture(&self, handle: TextureHandle) -> Result<(), GraphError> {
        if handle.0 < self.textures.len() {
            Ok(())
        } else {
            Err(GraphError::InvalidTexture(handle))
        }
    }

    fn push_texture(&mut self, info: TextureInfo) -> TextureHandle {
        self.textures.push(info);
        TextureHandle(self.textures.len() - 1)
    }
}

struct HeadlessRasterPass<'g> {
    commands: &'g mut Vec<PassCommand>,
}

impl RasterPass for HeadlessRasterPass<'_> {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(PassCommand::SetViewport(viewport));
    }

    fn set_view_projection(&mut self, view: Mat4, projection: Mat4) {
        self.commands.push(PassCommand::SetViewProjection { view, projection });
    }

    fn draw_list(&mut self, list: DrawListHandle) {
        self.commands.push(PassCommand::DrawList(list));
    }

    fn set_global_vector(&mut self, name: &str, value: Vec4) {
        self.commands.push(PassCommand::SetGlobalVector(name.to_string(), value));
    }

    fn set_global_float(&mut self, name: &str, value: f32) {
        self.commands.push(PassCommand::SetGlobalFloat(name.to_string(), value));
    }

    fn set_global_texture(&mut self, name: &str, texture: TextureHandle) {
        self.commands.push(PassCommand::SetGlobalTexture(name.to_string(), texture));
    }

    fn set_keyword(&mut self, material: MaterialId, keyword: &str, enabled: bool) {
        self.commands.push(PassCommand::SetKeyword {
            material,
            keyword: keyword.to_string(),
            enabled,
        });
    }

    fn set_material_float(&mut self, material: MaterialId, property: &str, value: f32) {
        self.commands.push(PassCommand::SetMaterialFloat {
            material,
            property: property.to_string(),
            value,
        });
    }

    fn draw_fullscreen(&mut self, material: MaterialId, pass_index: u32) {
        self.commands.push(PassCommand::DrawFullscreen {
            material,
            pass_index,
        });
    }
}

impl RenderGraph for HeadlessGraph {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureHandle {
        self.push_texture(TextureInfo {
            descriptor: descriptor.clone().into_owned(),
            imported: None,
            is_backbuffer: false,
        })
    }

    fn import_texture(&mut self, id: TextureId, descriptor: &TextureDescriptor) -> TextureHandle {
        self.push_texture(TextureInfo {
            descriptor: descriptor.clone().into_owned(),
            imported: Some(id),
            is_backbuffer: false,
        })
    }

    fn texture_info(&self, handle: TextureHandle) -> Option<TextureInfo> {
        self.textures.get(handle.0).cloned()
    }

    fn backbuffer(&self) -> TextureHandle {
        TextureHandle(0)
    }

    fn create_draw_list(
        &mut self,
        descriptor: &DrawListDescriptor,
    ) -> Result<DrawListHandle, GraphError> {
        self.draw_lists.push(DrawListDescriptor {
            label: descriptor.label.clone().map(|l| Cow::Owned(l.into_owned())),
            shader_tags: Cow::Owned(descriptor.shader_tags.to_vec()),
            queue: descriptor.queue,
            layer_mask: descriptor.layer_mask,
            sorting: descriptor.sorting,
            override_material: descriptor.override_material,
            override_pass: descriptor.override_pass,
            culling_matrix: descriptor.culling_matrix,
            depth_write: descriptor.depth_write,
        });
        Ok(DrawListHandle(self.draw_lists.len() - 1))
    }

    fn add_raster_pass<'g>(
        &'g mut self,
        descriptor: &RasterPassDescriptor,
    ) -> Result<Box<dyn RasterPass + 'g>, GraphError> {
        for handle in descriptor
            .color_attachment
            .iter()
            .chain(descriptor.depth_attachment.iter())
            .chain(descriptor.reads.iter())
        {
            self.check_texture(*handle)?;
        }
        if let Some(list) = descriptor
            .draw_lists
            .iter()
            .find(|l| l.0 >= self.draw_lists.len())
        {
            return Err(GraphError::InvalidDrawList(*list));
        }

        self.passes.push(RecordedPass::Raster {
            label: descriptor.label.as_deref().unwrap_or("").to_string(),
            color: descriptor.color_attachment,
            depth: descriptor.depth_attachment,
            reads: descriptor.reads.to_vec(),
            draw_lists: descriptor.draw_lists.to_vec(),
            commands: Vec::new(),
        });
        match self.passes.last_mut() {
            Some(RecordedPass::Raster { commands, .. }) => {
                Ok(Box::new(HeadlessRasterPass { commands }))
            }
            _ => Err(GraphError::Resource(ResourceError::BackendError(
                "raster pass was not recorded".to_string(),
            ))),
        }
    }

    fn add_blit_pass(&mut self, descriptor: &BlitPassDescriptor) -> Result<(), GraphError> {
        self.check_texture(descriptor.source)?;
        self.check_texture(descriptor.destination)?;

        self.passes.push(RecordedPass::Blit {
            label: descriptor.label.as_deref().unwrap_or("").to_string(),
            source: descriptor.source,
            destination: descriptor.destination,
            material: descriptor.material,
        });
        Ok(())
    }
}
