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

//! RAII guards over device resources.
//!
//! A guard destroys its resource exactly once, when it is dropped. Replacing a
//! guard (for instance on an atlas resize) therefore releases the old resource
//! without any explicit bookkeeping.

use std::sync::Arc;
use umbra_core::renderer::{
    BufferId, GraphicsDevice, ResourceError, StructuredBufferDescriptor, TextureDescriptor,
    TextureFormat, TextureId,
};

/// An owned device texture, destroyed on drop.
#[derive(Debug)]
pub struct GpuTexture {
    device: Arc<dyn GraphicsDevice>,
    id: TextureId,
    descriptor: TextureDescriptor<'static>,
}

impl GpuTexture {
    /// Creates a texture on `device`.
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        descriptor: TextureDescriptor<'static>,
    ) -> Result<Self, ResourceError> {
        let id = device.create_texture(&descriptor)?;
        Ok(Self {
            device: Arc::clone(device),
            id,
            descriptor,
        })
    }

    /// The device id of the texture.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// The descriptor the texture was created with.
    pub fn descriptor(&self) -> &TextureDescriptor<'static> {
        &self.descriptor
    }

    /// Returns `true` if the texture already has this size and format.
    pub fn matches(&self, width: u32, height: u32, format: TextureFormat) -> bool {
        self.descriptor.width == width
            && self.descriptor.height == height
            && self.descriptor.format == format
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_texture(self.id) {
            log::warn!(
                "GpuTexture: Failed to destroy texture '{}' ({:?}): {}",
                self.descriptor.label_str(),
                self.id,
                e
            );
        }
    }
}

/// An owned structured buffer, destroyed on drop.
#[derive(Debug)]
pub struct GpuBuffer {
    device: Arc<dyn GraphicsDevice>,
    id: BufferId,
}

impl GpuBuffer {
    /// Creates a structured buffer on `device`.
    pub fn new_structured(
        device: &Arc<dyn GraphicsDevice>,
        descriptor: &StructuredBufferDescriptor,
    ) -> Result<Self, ResourceError> {
        let id = device.create_structured_buffer(descriptor)?;
        Ok(Self {
            device: Arc::clone(device),
            id,
        })
    }

    /// The device id of the buffer.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Writes `data` at byte `offset`.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        self.device.write_buffer(self.id, offset, data)
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_buffer(self.id) {
            log::warn!("GpuBuffer: Failed to destroy buffer {:?}: {}", self.id, e);
        }
    }
}
