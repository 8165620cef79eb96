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

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use umbra_core::math::{Mat4, Vec4};
use umbra_core::renderer::{
    BufferId, ClipSpaceConvention, GraphicsDevice, MaterialId, ResourceError, ShaderGlobals,
    StructuredBufferDescriptor, TextureDescriptor, TextureId,
};

/// Name under which the device registers its default blit material.
pub const DEFAULT_BLIT_MATERIAL: &str = "Hidden/Blit";

/// A value bound to a frame-global shader name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobalValue {
    /// A texture binding.
    Texture(TextureId),
    /// A 4x4 matrix.
    Matrix(Mat4),
    /// A 4-component vector.
    Vector(Vec4),
    /// A float.
    Float(f32),
    /// An integer.
    Int(i32),
    /// A structured buffer binding.
    Buffer(BufferId),
}

/// Allocation counters of a [`HeadlessDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStats {
    /// Textures created since the device was made.
    pub textures_created: usize,
    /// Textures destroyed since the device was made.
    pub textures_destroyed: usize,
    /// Buffers created since the device was made.
    pub buffers_created: usize,
    /// Buffers destroyed since the device was made.
    pub buffers_destroyed: usize,
    /// Successful `write_buffer` calls.
    pub buffer_writes: usize,
}

#[derive(Debug)]
struct HeadlessBufferEntry {
    stride: usize,
    data: Vec<u8>,
}

#[derive(Debug)]
struct HeadlessDeviceInternal {
    textures: Mutex<HashMap<TextureId, TextureDescriptor<'static>>>,
    buffers: Mutex<HashMap<BufferId, HeadlessBufferEntry>>,
    materials: Mutex<HashMap<String, MaterialId>>,
    globals: Mutex<HashMap<String, GlobalValue>>,

    next_texture_id: AtomicUsize,
    next_buffer_id: AtomicUsize,
    next_material_id: AtomicUsize,

    textures_created: AtomicUsize,
    textures_destroyed: AtomicUsize,
    buffers_created: AtomicUsize,
    buffers_destroyed: AtomicUsize,
    buffer_writes: AtomicUsize,

    clip_space: ClipSpaceConvention,
    multisampled_textures: bool,
}

/// A clonable, thread-safe device that keeps every resource in host memory.
///
/// Buffers keep their bytes so uploads can be read back, textures keep their
/// descriptors, and every global binding is remembered by name.
#[derive(Clone, Debug)]
pub struct HeadlessDevice {
    internal: Arc<HeadlessDeviceInternal>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new(ClipSpaceConvention::ZeroToOne, true)
    }
}

impl HeadlessDevice {
    /// Creates a device reporting `clip_space` and, optionally, multisampled texture support.
    pub fn new(clip_space: ClipSpaceConvention, multisampled_textures: bool) -> Self {
        let device = Self {
            internal: Arc::new(HeadlessDeviceInternal {
                textures: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                materials: Mutex::new(HashMap::new()),
                globals: Mutex::new(HashMap::new()),
                next_texture_id: AtomicUsize::new(0),
                next_buffer_id: AtomicUsize::new(0),
                next_material_id: AtomicUsize::new(0),
                textures_created: AtomicUsize::new(0),
                textures_destroyed: AtomicUsize::new(0),
                buffers_created: AtomicUsize::new(0),
                buffers_destroyed: AtomicUsize::new(0),
                buffer_writes: AtomicUsize::new(0),
                clip_space,
                multisampled_textures,
            }),
        };
        device.register_material(DEFAULT_BLIT_MATERIAL);
        device
    }

    /// Makes a material findable by name, returning its id.
    ///
    /// Registering the same name twice returns the existing id.
    pub fn register_material(&self, name: &str) -> MaterialId {
        let Ok(mut materials) = self.internal.materials.lock() else {
            return MaterialId(usize::MAX);
        };
        *materials.entry(name.to_string()).or_insert_with(|| {
            MaterialId(self.internal.next_material_id.fetch_add(1, Ordering::Relaxed))
        })
    }

    /// Returns the allocation counters.
    pub fn stats(&self) -> DeviceStats {
        DeviceStats {
            textures_created: self.internal.textures_created.load(Ordering::Relaxed),
            textures_destroyed: self.internal.textures_destroyed.load(Ordering::Relaxed),
            buffers_created: self.internal.buffers_created.load(Ordering::Relaxed),
            buffers_destroyed: self.internal.buffers_destroyed.load(Ordering::Relaxed),
            buffer_writes: self.internal.buffer_writes.load(Ordering::Relaxed),
        }
    }

    /// Number of textures currently alive.
    pub fn live_textures(&self) -> usize {
        self.internal.textures.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Returns the descriptor a live texture was created with.
    pub fn texture_descriptor(&self, id: TextureId) -> Option<TextureDescriptor<'static>> {
        self.internal.textures.lock().ok()?.get(&id).cloned()
    }

    /// Returns a copy of a live buffer's bytes.
    pub fn read_buffer(&self, id: BufferId) -> Option<Vec<u8>> {
        self.internal
            .buffers
            .lock()
            .ok()?
            .get(&id)
            .map(|entry| entry.data.clone())
    }

    /// Returns the element stride a live buffer was created with.
    pub fn buffer_stride(&self, id: BufferId) -> Option<usize> {
        self.internal.buffers.lock().ok()?.get(&id).map(|e| e.stride)
    }

    /// Returns the value currently bound under `name`.
    pub fn global(&self, name: &str) -> Option<GlobalValue> {
        self.internal.globals.lock().ok()?.get(name).copied()
    }

    /// Returns the integer bound under `name`, if it is one.
    pub fn global_int(&self, name: &str) -> Option<i32> {
        match self.global(name)? {
            GlobalValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the texture bound under `name`, if it is one.
    pub fn global_texture(&self, name: &str) -> Option<TextureId> {
        match self.global(name)? {
            GlobalValue::Texture(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the matrix bound under `name`, if it is one.
    pub fn global_matrix(&self, name: &str) -> Option<Mat4> {
        match self.global(name)? {
            GlobalValue::Matrix(m) => Some(m),
            _ => None,
        }
    }

    fn set_global(&self, name: &str, value: GlobalValue) {
        if let Ok(mut globals) = self.internal.globals.lock() {
            globals.insert(name.to_string(), value);
        }
    }
}

impl ShaderGlobals for HeadlessDevice {
    fn set_global_texture(&self, name: &str, texture: TextureId) {
        self.set_global(name, GlobalValue::Texture(texture));
    }

    fn set_global_matrix(&self, name: &str, value: Mat4) {
        self.set_global(name, GlobalValue::Matrix(value));
    }

    fn set_global_vector(&self, name: &str, value: Vec4) {
        self.set_global(name, GlobalValue::Vector(value));
    }

    fn set_global_float(&self, name: &str, value: f32) {
        self.set_global(name, GlobalValue::Float(value));
    }

    fn set_global_int(&self, name: &str, value: i32) {
        self.set_global(name, GlobalValue::Int(value));
    }

    fn set_global_buffer(&self, name: &str, buffer: BufferId) {
        self.set_global(name, GlobalValue::Buffer(buffer));
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::BackendError(format!(
                "Texture '{}' has a zero-sized extent",
                descriptor.label_str()
            )));
        }
        if descriptor.sample_count > 1 && !self.internal.multisampled_textures {
            return Err(ResourceError::UnsupportedFormat(descriptor.format));
        }

        let id = TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .textures
            .lock()
            .map_err(|_| ResourceError::BackendError("texture table poisoned".to_string()))?
            .insert(id, descriptor.clone().into_owned());
        self.internal.textures_created.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "HeadlessDevice: Created texture '{}' ({}x{}, {:?}) with ID: {id:?}",
            descriptor.label_str(),
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut textures = self
            .internal
            .textures
            .lock()
            .map_err(|_| ResourceError::BackendError("texture table poisoned".to_string()))?;

        if textures.remove(&id).is_some() {
            self.internal.textures_destroyed.fetch_add(1, Ordering::Relaxed);
            log::debug!("HeadlessDevice: Destroyed texture with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn create_structured_buffer(
        &self,
        descriptor: &StructuredBufferDescriptor,
    ) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .buffers
            .lock()
            .map_err(|_| ResourceError::BackendError("buffer table poisoned".to_string()))?
            .insert(
                id,
                HeadlessBufferEntry {
                    stride: descriptor.stride,
                    data: vec![0; descriptor.size()],
                },
            );
        self.internal.buffers_created.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "HeadlessDevice: Created structured buffer '{}' ({} x {} bytes) with ID: {id:?}",
            descriptor.label.as_deref().unwrap_or(""),
            descriptor.capacity,
            descriptor.stride
        );
        Ok(id)
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut buffers = self
            .internal
            .buffers
            .lock()
            .map_err(|_| ResourceError::BackendError("buffer table poisoned".to_string()))?;
        let entry = buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;

        let start = offset as usize;
        let end = start.checked_add(data.len()).ok_or(ResourceError::OutOfBounds)?;
        let target = entry
            .data
            .get_mut(start..end)
            .ok_or(ResourceError::OutOfBounds)?;
        target.copy_from_slice(data);
        self.internal.buffer_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self
            .internal
            .buffers
            .lock()
            .map_err(|_| ResourceError::BackendError("buffer table poisoned".to_string()))?;

        if buffers.remove(&id).is_some() {
            self.internal.buffers_destroyed.fetch_add(1, Ordering::Relaxed);
            log::debug!("HeadlessDevice: Destroyed buffer with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.internal.materials.lock().ok()?.get(name).copied()
    }

    fn default_blit_material(&self) -> MaterialId {
        self.register_material(DEFAULT_BLIT_MATERIAL)
    }

    fn clip_space(&self) -> ClipSpaceConvention {
        self.internal.clip_space
    }

    fn supports_multisampled_textures(&self) -> bool {
        self.internal.multisampled_textures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::renderer::TextureFormat;

    #[test]
    fn test_texture_lifetime_is_counted() {
        let device = HeadlessDevice::default();
        let desc = TextureDescriptor::new("atlas", 64, 64, TextureFormat::R32Float);

        let id = device.create_texture(&desc).unwrap();
        assert_eq!(device.live_textures(), 1);
        assert_eq!(device.texture_descriptor(id).map(|d| d.width), Some(64));

        device.destroy_texture(id).unwrap();
        assert_eq!(device.destroy_texture(id), Err(ResourceError::InvalidHandle));

        let stats = device.stats();
        assert_eq!(stats.textures_created, 1);
        assert_eq!(stats.textures_destroyed, 1);
        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn test_buffer_write_bounds() {
        let device = HeadlessDevice::default();
        let id = device
            .create_structured_buffer(&StructuredBufferDescriptor {
                label: None,
                capacity: 2,
                stride: 4,
            })
            .unwrap();

        device.write_buffer(id, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(device.read_buffer(id), Some(vec![0, 0, 0, 0, 1, 2, 3, 4]));
        assert_eq!(device.write_buffer(id, 6, &[0; 4]), Err(ResourceError::OutOfBounds));
    }

    #[test]
    fn test_multisampled_texture_needs_support() {
        let device = HeadlessDevice::new(ClipSpaceConvention::ZeroToOne, false);
        let mut desc = TextureDescriptor::new("msaa", 8, 8, TextureFormat::Depth32Float);
        desc.sample_count = 4;
        assert!(device.create_texture(&desc).is_err());
    }

    #[test]
    fn test_materials_and_globals() {
        let device = HeadlessDevice::default();
        let id = device.register_material("Override");
        assert_eq!(device.register_material("Override"), id);
        assert_eq!(device.find_material("Override"), Some(id));
        assert_eq!(device.find_material("Missing"), None);
        assert!(device.find_material(DEFAULT_BLIT_MATERIAL).is_some());

        device.set_global_int("Count", 3);
        device.set_global_float("Far", 2.5);
        assert_eq!(device.global_int("Count"), Some(3));
        assert_eq!(device.global_int("Far"), None);
        assert_eq!(device.global("Far"), Some(GlobalValue::Float(2.5)));
    }
}
