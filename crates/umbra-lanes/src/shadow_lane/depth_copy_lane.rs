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

//! Copies a light's transient depth into its atlas depth texture.

use super::ShadowFrame;
use std::borrow::Cow;
use umbra_core::math::Viewport;
use umbra_core::renderer::{
    GraphError, RasterPassDescriptor, RenderGraph, TextureHandle, TextureInfo,
};
use umbra_core::settings::ShadowFeatureSettings;
use umbra_data::ShadowError;

/// Name the source depth is bound under while copying.
pub const CAMERA_DEPTH_ATTACHMENT_NAME: &str = "_CameraDepthAttachment";

const MSAA_KEYWORDS: [(u32, &str); 3] = [
    (2, "_DEPTH_MSAA_2"),
    (4, "_DEPTH_MSAA_4"),
    (8, "_DEPTH_MSAA_8"),
];
const OUTPUT_DEPTH_KEYWORD: &str = "_OUTPUT_DEPTH";
const ZWRITE_PROPERTY: &str = "_ZWrite";

/// Converts a native depth attachment into a texture shading code can sample.
#[derive(Debug, Clone)]
pub struct DepthCopyLane {
    material: String,
}

impl DepthCopyLane {
    /// Creates the lane with the conversion material named in `settings`.
    pub fn new(settings: &ShadowFeatureSettings) -> Self {
        Self {
            material: settings.copy_depth_material.clone(),
        }
    }

    /// Records a depth conversion from `source` into `destination`.
    ///
    /// With `resolve_multisample`, a multisampled source is resolved in the shader;
    /// otherwise only its first sample is read. With `write_as_depth`, `destination`
    /// is bound as the depth attachment instead of the color attachment.
    ///
    /// Returns `false` and records nothing if the conversion material is missing or a
    /// handle is unusable.
    pub fn copy(
        &self,
        frame: &mut ShadowFrame<'_>,
        source: TextureHandle,
        destination: TextureHandle,
        resolve_multisample: bool,
        write_as_depth: bool,
    ) -> bool {
        match self.try_copy(frame, source, destination, resolve_multisample, write_as_depth) {
            Ok(()) => true,
            Err(e) => {
                log::error!("DepthCopyLane: Skipping depth copy: {e}");
                false
            }
        }
    }

    fn try_copy(
        &self,
        frame: &mut ShadowFrame<'_>,
        source: TextureHandle,
        destination: TextureHandle,
        resolve_multisample: bool,
        write_as_depth: bool,
    ) -> Result<(), ShadowError> {
        let material = frame
            .device
            .find_material(&self.material)
            .ok_or_else(|| ShadowError::MissingMaterial(self.material.clone()))?;
        let source_info = offscreen_texture(frame.graph, source)?;
        let destination_info = offscreen_texture(frame.graph, destination)?;

        let samples = if resolve_multisample && frame.device.supports_multisampled_textures() {
            source_info.descriptor.sample_count
        } else {
            1
        };

        let label = format!(
            "ColoredShadows.CopyDepth.{}",
            destination_info.descriptor.label_str()
        );
        let mut pass = frame.graph.add_raster_pass(&RasterPassDescriptor {
            label: Some(label.into()),
            color_attachment: (!write_as_depth).then_some(destination),
            depth_attachment: write_as_depth.then_some(destination),
            reads: Cow::Borrowed(std::slice::from_ref(&source)),
            draw_lists: Cow::Borrowed(&[]),
            modifies_global_state: false,
            allow_culling: false,
        })?;

        for (count, keyword) in MSAA_KEYWORDS {
            pass.set_keyword(material, keyword, samples == count);
        }
        pass.set_keyword(material, OUTPUT_DEPTH_KEYWORD, write_as_depth);
        pass.set_material_float(material, ZWRITE_PROPERTY, if write_as_depth { 1.0 } else { 0.0 });
        pass.set_global_texture(CAMERA_DEPTH_ATTACHMENT_NAME, source);
        pass.set_viewport(Viewport::full(
            destination_info.descriptor.width,
            destination_info.descriptor.height,
        ));
        pass.draw_fullscreen(material, 0);
        Ok(())
    }
}

/// Looks up `handle`, rejecting invalid handles and the backbuffer.
pub(crate) fn offscreen_texture(
    graph: &dyn RenderGraph,
    handle: TextureHandle,
) -> Result<TextureInfo, GraphError> {
    let info = graph
        .texture_info(handle)
        .ok_or(GraphError::InvalidTexture(handle))?;
    if info.is_backbuffer {
        return Err(GraphError::BackbufferNotAllowed(handle));
    }
    Ok(info)
}
