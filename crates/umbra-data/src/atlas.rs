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

//! Per-light persistent shadow textures.

use crate::error::ShadowError;
use crate::gpu::GpuTexture;
use std::sync::Arc;
use umbra_core::light::{AtlasResolution, MAX_LIGHTS};
use umbra_core::renderer::{GraphicsDevice, TextureDescriptor, TextureFormat};

/// Prefix of the persistent shadow id texture name; the light index is appended.
pub const SHADOW_MAP_NAME: &str = "_ColoredShadowMap";
/// Prefix of the persistent depth texture name; the light index is appended.
pub const SHADOW_DEPTH_NAME: &str = "_ColoredShadowDepth";

/// Pixel formats of the two textures of an atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasFormats {
    /// Format of the shadow id texture.
    pub color: TextureFormat,
    /// Format of the depth texture.
    pub depth: TextureFormat,
}

/// The persistent textures of one light.
///
/// Both textures share the atlas footprint, which is six faces wide for point lights.
#[derive(Debug)]
pub struct ShadowAtlas {
    /// The shadow id / color texture sampled by shading.
    pub color: GpuTexture,
    /// The depth texture sampled by shading.
    pub depth: GpuTexture,
}

impl ShadowAtlas {
    /// Returns the atlas footprint.
    pub fn extent(&self) -> AtlasResolution {
        let desc = self.color.descriptor();
        AtlasResolution::new(desc.width, desc.height)
    }

    /// Returns the formats of the two textures.
    pub fn formats(&self) -> AtlasFormats {
        AtlasFormats {
            color: self.color.descriptor().format,
            depth: self.depth.descriptor().format,
        }
    }

    fn matches(&self, extent: AtlasResolution, formats: AtlasFormats) -> bool {
        self.color.matches(extent.width, extent.height, formats.color)
            && self.depth.matches(extent.width, extent.height, formats.depth)
    }
}

/// Owns the [`ShadowAtlas`] of every light index.
///
/// Atlases are cached between frames and only reallocated when the requested
/// footprint or a format changes. Dropping the allocator releases everything.
#[derive(Debug)]
pub struct ShadowAtlasAllocator {
    device: Arc<dyn GraphicsDevice>,
    slots: Vec<Option<ShadowAtlas>>,
}

impl ShadowAtlasAllocator {
    /// Creates an empty allocator with one slot per possible light index.
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            slots: (0..MAX_LIGHTS).map(|_| None).collect(),
        }
    }

    /// Returns the atlas of `light_index`, allocating or reallocating it if needed.
    ///
    /// `extent` is the full atlas footprint. A cached atlas is reused as long as its
    /// footprint and formats are unchanged; otherwise it is released before the new
    /// one is created.
    pub fn ensure_atlas(
        &mut self,
        light_index: usize,
        extent: AtlasResolution,
        formats: AtlasFormats,
    ) -> Result<&ShadowAtlas, ShadowError> {
        let slot = self
            .slots
            .get_mut(light_index)
            .ok_or(ShadowError::IndexOutOfRange {
                index: light_index,
                capacity: MAX_LIGHTS,
            })?;

        let reusable = slot
            .as_ref()
            .is_some_and(|atlas| atlas.matches(extent, formats));
        if !reusable {
            if let Some(old) = slot.take() {
                log::debug!(
                    "ShadowAtlasAllocator: Reallocating atlas {} ({}x{} -> {}x{})",
                    light_index,
                    old.extent().width,
                    old.extent().height,
                    extent.width,
                    extent.height
                );
            }
            let color = GpuTexture::new(
                &self.device,
                TextureDescriptor::new(
                    format!("{SHADOW_MAP_NAME}{light_index}"),
                    extent.width,
                    extent.height,
                    formats.color,
                ),
            )?;
            let depth = GpuTexture::new(
                &self.device,
                TextureDescriptor::new(
                    format!("{SHADOW_DEPTH_NAME}{light_index}"),
                    extent.width,
                    extent.height,
                    formats.depth,
                ),
            )?;
            log::debug!(
                "ShadowAtlasAllocator: Allocated atlas {} ({}x{}, {:?})",
                light_index,
                extent.width,
                extent.height,
                formats
            );
            *slot = Some(ShadowAtlas { color, depth });
        }

        slot.as_ref().ok_or(ShadowError::IndexOutOfRange {
            index: light_index,
            capacity: MAX_LIGHTS,
        })
    }

    /// Returns the cached atlas of `light_index`, if any.
    pub fn get(&self, light_index: usize) -> Option<&ShadowAtlas> {
        self.slots.get(light_index)?.as_ref()
    }

    /// Releases the atlas of `light_index`. Returns `false` if there was none.
    pub fn release(&mut self, light_index: usize) -> bool {
        self.slots
            .get_mut(light_index)
            .and_then(Option::take)
            .is_some()
    }

    /// Releases every atlas. Safe to call repeatedly.
    pub fn release_all(&mut self) {
        let released = self.slots.iter_mut().filter_map(Option::take).count();
        if released > 0 {
            log::debug!("ShadowAtlasAllocator: Released {released} atlases");
        }
    }

    /// Number of atlases currently allocated.
    pub fn allocated_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_infra::HeadlessDevice;

    const FORMATS: AtlasFormats = AtlasFormats {
        color: TextureFormat::Rgba32Float,
        depth: TextureFormat::R32Float,
    };

    fn allocator() -> (HeadlessDevice, ShadowAtlasAllocator) {
        let headless = HeadlessDevice::default();
        let allocator = ShadowAtlasAllocator::new(Arc::new(headless.clone()));
        (headless, allocator)
    }

    #[test]
    fn test_ensure_atlas_reuses_until_size_changes() {
        let (headless, mut allocator) = allocator();
        let size = AtlasResolution::new(256, 256);

        let first = allocator.ensure_atlas(0, size, FORMATS).unwrap().color.id();
        let second = allocator.ensure_atlas(0, size, FORMATS).unwrap().color.id();
        assert_eq!(first, second);
        assert_eq!(headless.stats().textures_created, 2);

        let third = allocator
            .ensure_atlas(0, AtlasResolution::new(512, 256), FORMATS)
            .unwrap()
            .color
            .id();
        assert_ne!(first, third);
        assert_eq!(headless.stats().textures_created, 4);
        assert_eq!(headless.stats().textures_destroyed, 2);
        assert_eq!(headless.live_textures(), 2);
    }

    #[test]
    fn test_format_change_reallocates() {
        let (headless, mut allocator) = allocator();
        let size = AtlasResolution::new(64, 64);
        allocator.ensure_atlas(1, size, FORMATS).unwrap();

        let formats = AtlasFormats {
            depth: TextureFormat::Depth32Float,
            ..FORMATS
        };
        let atlas = allocator.ensure_atlas(1, size, formats).unwrap();
        assert_eq!(atlas.formats(), formats);
        assert_eq!(headless.stats().textures_destroyed, 2);
    }

    #[test]
    fn test_textures_are_named_by_index() {
        let (headless, mut allocator) = allocator();
        let atlas = allocator
            .ensure_atlas(7, AtlasResolution::new(32, 32), FORMATS)
            .unwrap();

        let color = headless.texture_descriptor(atlas.color.id()).unwrap();
        let depth = headless.texture_descriptor(atlas.depth.id()).unwrap();
        assert_eq!(color.label_str(), "_ColoredShadowMap7");
        assert_eq!(depth.label_str(), "_ColoredShadowDepth7");
    }

    #[test]
    fn test_out_of_range_index() {
        let (_, mut allocator) = allocator();
        let result = allocator.ensure_atlas(MAX_LIGHTS, AtlasResolution::new(8, 8), FORMATS);
        assert!(matches!(result, Err(ShadowError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_release_is_idempotent() {
        let (headless, mut allocator) = allocator();
        allocator.release_all();
        assert!(!allocator.release(3));

        allocator
            .ensure_atlas(3, AtlasResolution::new(8, 8), FORMATS)
            .unwrap();
        assert!(allocator.release(3));
        assert!(!allocator.release(3));

        allocator.release_all();
        allocator.release_all();
        assert_eq!(headless.stats().textures_destroyed, 2);
        assert_eq!(allocator.allocated_count(), 0);
    }
}
