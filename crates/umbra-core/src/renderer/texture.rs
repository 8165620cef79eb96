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

//! Texture formats and descriptors.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Pixel formats the shadow subsystem allocates or inherits from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// 8-bit normalized RGBA.
    Rgba8Unorm,
    /// 16-bit float RGBA.
    Rgba16Float,
    /// 32-bit float RGBA.
    Rgba32Float,
    /// 32-bit signed integer RGBA.
    Rgba32Sint,
    /// Single-channel 32-bit float.
    R32Float,
    /// 16-bit normalized depth.
    Depth16Unorm,
    /// At least 24-bit depth.
    Depth24Plus,
    /// At least 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// Returns `true` for depth (and depth-stencil) formats.
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16Unorm
                | TextureFormat::Depth24Plus
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32Float
        )
    }
}

/// Describes a 2D texture to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor<'a> {
    /// A debug label, used by backends for diagnostics.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// MSAA sample count. 1 means single-sampled.
    pub sample_count: u32,
}

impl<'a> TextureDescriptor<'a> {
    /// Creates a single-sampled descriptor.
    pub fn new(
        label: impl Into<Cow<'a, str>>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: Some(label.into()),
            width,
            height,
            format,
            sample_count: 1,
        }
    }

    /// Returns a copy of this descriptor with a new label and size, keeping the
    /// format and sample count.
    pub fn resized<'b>(
        &self,
        label: impl Into<Cow<'b, str>>,
        width: u32,
        height: u32,
    ) -> TextureDescriptor<'b> {
        TextureDescriptor {
            label: Some(label.into()),
            width,
            height,
            format: self.format,
            sample_count: self.sample_count,
        }
    }

    /// Converts the descriptor into one that owns its label.
    pub fn into_owned(self) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: self.label.map(|l| Cow::Owned(l.into_owned())),
            width: self.width,
            height: self.height,
            format: self.format,
            sample_count: self.sample_count,
        }
    }

    /// Returns the label, or an empty string.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_depth() {
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(TextureFormat::Depth24PlusStencil8.is_depth());
        assert!(!TextureFormat::R32Float.is_depth());
        assert!(!TextureFormat::Rgba32Float.is_depth());
    }

    #[test]
    fn test_resized_keeps_format_and_samples() {
        let mut camera_depth =
            TextureDescriptor::new("CameraDepth", 1920, 1080, TextureFormat::Depth24Plus);
        camera_depth.sample_count = 4;

        let strip = camera_depth.resized("SOURCE_DEPTH", 6 * 256, 256);
        assert_eq!(strip.width, 1536);
        assert_eq!(strip.height, 256);
        assert_eq!(strip.format, TextureFormat::Depth24Plus);
        assert_eq!(strip.sample_count, 4);
        assert_eq!(strip.label_str(), "SOURCE_DEPTH");
    }
}
