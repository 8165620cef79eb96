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

//! Feature-level configuration for the colored-shadow subsystem.
//!
//! [`ShadowFeatureSettings`] is plain serde data. Hosts usually ship it as a RON
//! file next to their renderer configuration and load it with
//! [`ShadowFeatureSettings::from_ron_str`].

use crate::renderer::{LayerMask, RenderQueueType, TextureFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shader tags drawn when the filter lists none.
pub const FALLBACK_SHADER_TAGS: [&str; 3] =
    ["SRPDefaultUnlit", "UniversalForward", "UniversalForwardOnly"];

/// An error that can occur while loading or saving settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// The RON text could not be parsed into settings.
    #[error("Failed to parse shadow settings: {0}")]
    Parse(String),
    /// The settings could not be serialized.
    #[error("Failed to serialize shadow settings: {0}")]
    Serialize(String),
}

/// The point in the host's frame timeline at which the shadow passes are inserted.
///
/// Variants are listed in frame order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum InjectionPoint {
    /// Before anything else is rendered.
    BeforeRendering,
    /// Before the host's own shadow maps.
    BeforeRenderingShadows,
    /// After the host's own shadow maps.
    AfterRenderingShadows,
    /// Before depth and normal prepasses.
    BeforeRenderingPrePasses,
    /// After depth and normal prepasses.
    AfterRenderingPrePasses,
    /// Before opaque geometry.
    BeforeRenderingOpaques,
    /// After opaque geometry.
    AfterRenderingOpaques,
    /// Before the skybox.
    BeforeRenderingSkybox,
    /// After the skybox.
    AfterRenderingSkybox,
    /// Before transparent geometry.
    BeforeRenderingTransparents,
    /// After transparent geometry.
    #[default]
    AfterRenderingTransparents,
    /// Before post-processing.
    BeforeRenderingPostProcessing,
    /// After post-processing.
    AfterRenderingPostProcessing,
    /// After everything else.
    AfterRendering,
}

/// When the light information buffer is uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UploadTrigger {
    /// Once per frame, after every light has recorded its slot.
    #[default]
    FrameEnd,
    /// From the pass of light index 0. Light 0 is then recorded last.
    LightIndexZero,
}

/// How point-light faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FaceCulling {
    /// One draw list culled against a box around the light, issued for all six faces.
    #[default]
    Shared,
    /// One draw list per face, each culled against that face's frustum.
    PerFace,
}

/// Which geometry the shadow passes draw.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Render-queue range.
    pub queue: RenderQueueType,
    /// Layer filter.
    pub layer_mask: LayerMask,
    /// Shader tags to draw. Empty means [`FALLBACK_SHADER_TAGS`].
    pub shader_tags: Vec<String>,
}

impl FilterSettings {
    /// Returns the configured shader tags, or the fallback tags when none are set.
    pub fn effective_shader_tags(&self) -> Vec<String> {
        if self.shader_tags.is_empty() {
            FALLBACK_SHADER_TAGS.iter().map(|t| t.to_string()).collect()
        } else {
            self.shader_tags.clone()
        }
    }
}

/// Configuration of the colored-shadow feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowFeatureSettings {
    /// Where in the frame the passes run.
    pub injection_point: InjectionPoint,
    /// Geometry filter for the shadow draw lists.
    pub filter: FilterSettings,
    /// Material drawn in place of every object's own material.
    pub override_material: String,
    /// Pass of the override material to draw with.
    pub override_material_pass: u32,
    /// Material converting the native depth attachment to `depth_format`.
    pub copy_depth_material: String,
    /// Material used for atlas blits. `None` uses the host's default blit material.
    pub blit_material: Option<String>,
    /// When the light information buffer is uploaded.
    pub upload_trigger: UploadTrigger,
    /// How point-light faces are culled.
    pub face_culling: FaceCulling,
    /// Format of the persistent shadow id atlas.
    pub color_format: TextureFormat,
    /// Format of the persistent depth atlas.
    pub depth_format: TextureFormat,
    /// Resolve multisampled depth when copying it.
    pub resolve_multisample_depth: bool,
    /// Write the copy as depth rather than as a color value.
    pub copy_depth_as_depth: bool,
}

impl Default for ShadowFeatureSettings {
    fn default() -> Self {
        Self {
            injection_point: InjectionPoint::default(),
            filter: FilterSettings::default(),
            override_material: "ColoredShadow/OverrideShadowId".to_string(),
            override_material_pass: 0,
            copy_depth_material: "Hidden/ColoredShadow/CopyDepth".to_string(),
            blit_material: None,
            upload_trigger: UploadTrigger::default(),
            face_culling: FaceCulling::default(),
            color_format: TextureFormat::Rgba32Float,
            depth_format: TextureFormat::R32Float,
            resolve_multisample_depth: true,
            copy_depth_as_depth: false,
        }
    }
}

impl ShadowFeatureSettings {
    /// Parses settings from RON text. Missing fields take their default value.
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        ron::de::from_str(text).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Serializes the settings to pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SettingsError::Serialize(e.to_string()))
    }
}
