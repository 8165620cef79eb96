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

//! Blits a light's transient color into its atlas and publishes its shading globals.
//!
//! Runs after the depth copy, so the atlas depth is already in place when the
//! globals point shaders at it.

use super::depth_copy_lane::offscreen_texture;
use super::shadow_pass_lane::{LIGHT_FAR_PLANE_NAME, LIGHT_POS_NAME};
use super::{ShadowFrame, ShadowPassOutput};
use umbra_core::renderer::{BlitPassDescriptor, GraphicsDevice};
use umbra_core::settings::ShadowFeatureSettings;
use umbra_data::atlas::{SHADOW_DEPTH_NAME, SHADOW_MAP_NAME};
use umbra_data::ShadowError;

/// Name prefix of the published per-light matrices.
pub const SHADOW_MATRIX_NAME: &str = "_ColoredShadowMatrix";

/// Commits a light's transient color into its persistent atlas and publishes the
/// light's shading globals.
#[derive(Debug, Clone)]
pub struct ShadowCaptureLane {
    blit_material: Option<String>,
}

impl ShadowCaptureLane {
    /// Creates the lane. Without a configured blit material the host default is used.
    pub fn new(settings: &ShadowFeatureSettings) -> Self {
        Self {
            blit_material: settings.blit_material.clone(),
        }
    }

    /// Records the capture blit for `output` and publishes its globals.
    ///
    /// Returns `false` and publishes nothing when the blit cannot be recorded.
    pub fn capture(&self, frame: &mut ShadowFrame<'_>, output: &ShadowPassOutput) -> bool {
        match self.try_capture(frame, output) {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "ShadowCaptureLane: Skipping capture of light {}: {e}",
                    output.light_index
                );
                false
            }
        }
    }

    fn try_capture(
        &self,
        frame: &mut ShadowFrame<'_>,
        output: &ShadowPassOutput,
    ) -> Result<(), ShadowError> {
        offscreen_texture(frame.graph, output.color)?;
        offscreen_texture(frame.graph, output.atlas_color)?;

        let material = match &self.blit_material {
            Some(name) => frame
                .device
                .find_material(name)
                .ok_or_else(|| ShadowError::MissingMaterial(name.clone()))?,
            None => frame.device.default_blit_material(),
        };

        frame.graph.add_blit_pass(&BlitPassDescriptor {
            label: Some(format!("CaptureShadowsColor{}", output.light_index).into()),
            source: output.color,
            destination: output.atlas_color,
            material,
            pass_index: 0,
        })?;

        publish(frame.device, output);
        Ok(())
    }
}

fn publish(device: &dyn GraphicsDevice, output: &ShadowPassOutput) {
    let i = output.light_index;
    device.set_global_texture(&format!("{SHADOW_MAP_NAME}{i}"), output.atlas_color_id);
    device.set_global_texture(&format!("{SHADOW_DEPTH_NAME}{i}"), output.atlas_depth_id);
    device.set_global_matrix(&format!("{SHADOW_MATRIX_NAME}{i}"), output.light_matrix);
    device.set_global_vector(
        &format!("{LIGHT_POS_NAME}{i}"),
        output.light_position.extend(1.0),
    );
    device.set_global_float(&format!("{LIGHT_FAR_PLANE_NAME}{i}"), output.far_plane);
}
