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

//! The per-light render step that draws scene geometry into a light's atlas.

use super::projection::{self, LightView};
use super::{ShadowFrame, ShadowSystemContext};
use std::borrow::Cow;
use umbra_core::light::{AtlasResolution, LightDescriptor, LightId, LightMode};
use umbra_core::math::{Mat4, Vec3, Viewport};
use umbra_core::renderer::{
    DrawListDescriptor, DrawListHandle, GraphicsDevice, LayerMask, MaterialId,
    RasterPassDescriptor, RenderGraph, RenderQueueType, TextureDescriptor, TextureFormat,
    TextureHandle, TextureId, Viewpoint,
};
use umbra_core::settings::{FaceCulling, ShadowFeatureSettings, UploadTrigger};
use umbra_data::{AtlasFormats, LightInformationRecord, ShadowError};

/// Pass-scoped light position, set while drawing point lights.
pub const LIGHT_POS_NAME: &str = "_ColoredLightPos";
/// Pass-scoped far plane, set while drawing point lights.
pub const LIGHT_FAR_PLANE_NAME: &str = "_ColoredLightFarPlane";

const SOURCE_COLOR_NAME: &str = "SOURCE_COLOR";
const SOURCE_DEPTH_NAME: &str = "SOURCE_DEPTH";

/// What a recorded shadow pass produced, consumed by the depth copy and capture lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPassOutput {
    /// Index of the light.
    pub light_index: usize,
    /// Identity of the light.
    pub light_id: LightId,
    /// Transient color attachment drawn this frame.
    pub color: TextureHandle,
    /// Transient depth attachment drawn this frame.
    pub depth: TextureHandle,
    /// The persistent shadow id texture, imported into the graph.
    pub atlas_color: TextureHandle,
    /// The persistent depth texture, imported into the graph.
    pub atlas_depth: TextureHandle,
    /// Device id of the persistent shadow id texture.
    pub atlas_color_id: TextureId,
    /// Device id of the persistent depth texture.
    pub atlas_depth_id: TextureId,
    /// The light-space matrix written to the light's record.
    pub light_matrix: Mat4,
    /// World-space light position.
    pub light_position: Vec3,
    /// Far plane of the light's projection.
    pub far_plane: f32,
}

/// Records the shadow render pass of one light per call.
#[derive(Debug, Clone)]
pub struct ShadowPassLane {
    shader_tags: Vec<String>,
    queue: RenderQueueType,
    layer_mask: LayerMask,
    override_material: String,
    override_pass: u32,
    formats: AtlasFormats,
    face_culling: FaceCulling,
    upload_trigger: UploadTrigger,
}

impl ShadowPassLane {
    /// Creates the lane from the feature settings.
    pub fn new(settings: &ShadowFeatureSettings) -> Self {
        Self {
            shader_tags: settings.filter.effective_shader_tags(),
            queue: settings.filter.queue,
            layer_mask: settings.filter.layer_mask,
            override_material: settings.override_material.clone(),
            override_pass: settings.override_material_pass,
            formats: AtlasFormats {
                color: settings.color_format,
                depth: settings.depth_format,
            },
            face_culling: settings.face_culling,
            upload_trigger: settings.upload_trigger,
        }
    }

    /// Records the shadow pass of the light at `light_index`.
    ///
    /// On any failure (stale light, missing material, allocation or graph error) the
    /// light's record is reset to inactive, the failure is logged, and `None` is
    /// returned; nothing is drawn for that light this frame.
    pub fn record(
        &self,
        ctx: &mut ShadowSystemContext,
        frame: &mut ShadowFrame<'_>,
        light_index: usize,
    ) -> Option<ShadowPassOutput> {
        match self.try_record(ctx, frame, light_index) {
            Ok(output) => Some(output),
            Err(e) => {
                match e {
                    ShadowError::StaleLight(_) => {
                        log::warn!("ShadowPassLane: Skipping light {light_index}: {e}")
                    }
                    _ => log::error!("ShadowPassLane: Failed to record light {light_index}: {e}"),
                }
                if let Err(e) = ctx.light_buffer.mark_inactive(light_index) {
                    log::debug!("ShadowPassLane: No record slot to reset: {e}");
                }
                self.upload_if_triggered(ctx, frame.device, light_index);
                None
            }
        }
    }

    fn try_record(
        &self,
        ctx: &mut ShadowSystemContext,
        frame: &mut ShadowFrame<'_>,
        light_index: usize,
    ) -> Result<ShadowPassOutput, ShadowError> {
        let light = ctx
            .registry
            .get(light_index)
            .cloned()
            .ok_or(ShadowError::IndexOutOfRange {
                index: light_index,
                capacity: ctx.registry.len(),
            })?;
        let transform = light.transform().ok_or(ShadowError::StaleLight(light.id))?;
        let material_name = light
            .override_material
            .as_deref()
            .unwrap_or(&self.override_material);
        let material = frame
            .device
            .find_material(material_name)
            .ok_or_else(|| ShadowError::MissingMaterial(material_name.to_string()))?;

        // 1. Light matrices
        let view = projection::light_view(&light.projection, &transform);
        let faces = light.projection.face_count();
        let (width, height) = light.atlas_extent();

        // 2. Persistent atlas and this frame's attachments
        let atlas = ctx.allocator.ensure_atlas(
            light_index,
            AtlasResolution::new(width, height),
            self.formats,
        )?;
        let atlas_color_id = atlas.color.id();
        let atlas_depth_id = atlas.depth.id();
        let atlas_color = frame
            .graph
            .import_texture(atlas_color_id, atlas.color.descriptor());
        let atlas_depth = frame
            .graph
            .import_texture(atlas_depth_id, atlas.depth.descriptor());

        let color = frame
            .graph
            .create_texture(&self.transient_color(frame.viewpoint, width, height));
        let depth = frame
            .graph
            .create_texture(&transient_depth(frame.viewpoint, width, height));

        // 3. Draw lists
        let draw_lists =
            self.build_draw_lists(frame.graph, &light, light_index, &view, material)?;

        // 4. One draw per face, each into its slice of the strip
        {
            let mut pass = frame.graph.add_raster_pass(&RasterPassDescriptor {
                label: Some(format!("ColoredShadows.Render{light_index}").into()),
                color_attachment: Some(color),
                depth_attachment: Some(depth),
                reads: Cow::Borrowed(&[]),
                draw_lists: Cow::Borrowed(&draw_lists),
                modifies_global_state: true,
                allow_culling: false,
            })?;

            if light.mode() == LightMode::Point {
                pass.set_global_vector(LIGHT_POS_NAME, transform.position.extend(1.0));
                pass.set_global_float(LIGHT_FAR_PLANE_NAME, light.projection.far_plane());
            }
            for face in 0..faces {
                let face_view = if faces > 1 {
                    match projection::face_view(view.view, face) {
                        Some(face_view) => face_view,
                        None => continue,
                    }
                } else {
                    view.view
                };
                pass.set_viewport(Viewport::horizontal_slice(width, height, face, faces));
                pass.set_view_projection(face_view, view.projection);
                if let Some(list) = draw_lists.get(face).or_else(|| draw_lists.first()) {
                    pass.draw_list(*list);
                }
            }
        }

        // 5. Record this light's slot
        let light_matrix = projection::gpu_light_matrix(&view, frame.device.clip_space());
        ctx.light_buffer.record(
            light_index,
            LightInformationRecord::for_light(
                &light,
                light_index,
                transform.position,
                light_matrix,
                frame.viewpoint.position,
            ),
        )?;

        // 6. Legacy upload from light 0
        self.upload_if_triggered(ctx, frame.device, light_index);

        Ok(ShadowPassOutput {
            light_index,
            light_id: light.id,
            color,
            depth,
            atlas_color,
            atlas_depth,
            atlas_color_id,
            atlas_depth_id,
            light_matrix,
            light_position: transform.position,
            far_plane: light.projection.far_plane(),
        })
    }

    fn build_draw_lists(
        &self,
        graph: &mut dyn RenderGraph,
        light: &LightDescriptor,
        light_index: usize,
        view: &LightView,
        material: MaterialId,
    ) -> Result<Vec<DrawListHandle>, ShadowError> {
        let culling: Vec<Mat4> =
            if light.mode() == LightMode::Point && self.face_culling == FaceCulling::PerFace {
                (0..light.projection.face_count())
                    .filter_map(|face| projection::face_view(view.view, face))
                    .map(|face_view| view.projection * face_view)
                    .collect()
            } else {
                vec![view.culling]
            };

        culling
            .into_iter()
            .enumerate()
            .map(|(i, culling_matrix)| {
                graph
                    .create_draw_list(&DrawListDescriptor {
                        label: Some(format!("ColoredShadows.Light{light_index}.List{i}").into()),
                        shader_tags: Cow::Borrowed(&self.shader_tags),
                        queue: self.queue,
                        layer_mask: self.layer_mask,
                        sorting: self.queue.into(),
                        override_material: material,
                        override_pass: self.override_pass,
                        culling_matrix,
                        depth_write: true,
                    })
                    .map_err(ShadowError::from)
            })
            .collect()
    }

    fn transient_color(
        &self,
        viewpoint: &Viewpoint,
        width: u32,
        height: u32,
    ) -> TextureDescriptor<'static> {
        let mut descriptor = match &viewpoint.color_target {
            Some(target) => target.resized(SOURCE_COLOR_NAME, width, height),
            None => TextureDescriptor::new(SOURCE_COLOR_NAME, width, height, self.formats.color),
        };
        descriptor.format = self.formats.color;
        descriptor
    }

    fn upload_if_triggered(
        &self,
        ctx: &mut ShadowSystemContext,
        device: &dyn GraphicsDevice,
        light_index: usize,
    ) {
        if self.upload_trigger == UploadTrigger::LightIndexZero && light_index == 0 {
            if let Err(e) = ctx.light_buffer.upload() {
                log::error!("ShadowPassLane: Failed to upload light information: {e}");
            }
        }
        ctx.light_buffer.bind(device);
    }
}

fn transient_depth(viewpoint: &Viewpoint, width: u32, height: u32) -> TextureDescriptor<'static> {
    match &viewpoint.depth_target {
        Some(target) => target.resized(SOURCE_DEPTH_NAME, width, height),
        None => {
            TextureDescriptor::new(SOURCE_DEPTH_NAME, width, height, TextureFormat::Depth32Float)
        }
    }
}
