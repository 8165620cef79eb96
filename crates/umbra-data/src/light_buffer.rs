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

//! The structured buffer of per-light records read by shadow sampling.

use crate::error::ShadowError;
use crate::gpu::GpuBuffer;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;
use std::sync::Arc;
use umbra_core::light::{LightDescriptor, MAX_LIGHTS};
use umbra_core::math::{Mat4, Vec3};
use umbra_core::renderer::{BufferId, GraphicsDevice, ShaderGlobals, StructuredBufferDescriptor};

/// Global name the buffer is bound under.
pub const LIGHT_INFORMATION_BUFFER_NAME: &str = "ColoredShadowLightInformation";

/// One light's entry in the GPU buffer.
///
/// The layout is tightly packed, 4-byte aligned, and must match the shading code
/// field for field.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightInformationRecord {
    /// Light index, or -1 for an inactive slot.
    pub index: i32,
    /// [`LightMode`](umbra_core::light::LightMode) discriminant, or -1 for an inactive slot.
    pub light_mode: i32,
    /// GPU projection x view, column-major.
    pub light_matrix: [[f32; 4]; 4],
    /// World-space light position.
    pub light_position: [f32; 3],
    /// Shading-side falloff distance.
    pub fall_off_range: f32,
    /// Far plane of the light's projection.
    pub far_plane: f32,
    /// World-space position of the viewpoint that recorded the light.
    pub viewer_position: [f32; 3],
    /// Width of one atlas face.
    pub atlas_width: i32,
    /// Height of one atlas face.
    pub atlas_height: i32,
    /// Offset added to the shadow ids the light writes.
    pub shadow_id_offset: i32,
}

const _: () = assert!(size_of::<LightInformationRecord>() == 116);

impl LightInformationRecord {
    /// Size in bytes of one record, used both to allocate and to upload.
    pub const STRIDE: usize = size_of::<LightInformationRecord>();

    /// The record stored in slots with no active light.
    pub const INACTIVE: LightInformationRecord = LightInformationRecord {
        index: -1,
        light_mode: -1,
        light_matrix: [[0.0; 4]; 4],
        light_position: [0.0; 3],
        fall_off_range: 0.0,
        far_plane: 0.0,
        viewer_position: [0.0; 3],
        atlas_width: 0,
        atlas_height: 0,
        shadow_id_offset: 0,
    };

    /// Builds the record of `light` at `index`.
    pub fn for_light(
        light: &LightDescriptor,
        index: usize,
        light_position: Vec3,
        light_matrix: Mat4,
        viewer_position: Vec3,
    ) -> Self {
        Self {
            index: index as i32,
            light_mode: light.mode().as_i32(),
            light_matrix: light_matrix.to_cols_array_2d(),
            light_position: light_position.to_array(),
            fall_off_range: light.fall_off_range,
            far_plane: light.projection.far_plane(),
            viewer_position: viewer_position.to_array(),
            atlas_width: light.atlas_resolution.width as i32,
            atlas_height: light.atlas_resolution.height as i32,
            shadow_id_offset: light.shadow_id_offset,
        }
    }

    /// Returns `true` unless this is an inactive slot.
    pub fn is_active(&self) -> bool {
        self.index >= 0
    }

    /// Returns the light matrix.
    pub fn light_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.light_matrix)
    }
}

impl Default for LightInformationRecord {
    fn default() -> Self {
        Self::INACTIVE
    }
}

/// A CPU array of [`LightInformationRecord`]s mirrored into a structured buffer of
/// fixed capacity [`MAX_LIGHTS`].
///
/// Passes write their own slot with [`record`](Self::record); the whole array is
/// written to the GPU in one [`upload`](Self::upload).
#[derive(Debug)]
pub struct LightInformationBuffer {
    records: Vec<LightInformationRecord>,
    gpu: Option<GpuBuffer>,
    dirty: bool,
}

impl LightInformationBuffer {
    /// Allocates the GPU buffer and fills every slot with [`LightInformationRecord::INACTIVE`].
    pub fn new(device: &Arc<dyn GraphicsDevice>) -> Result<Self, ShadowError> {
        let gpu = GpuBuffer::new_structured(
            device,
            &StructuredBufferDescriptor {
                label: Some(LIGHT_INFORMATION_BUFFER_NAME.into()),
                capacity: MAX_LIGHTS,
                stride: LightInformationRecord::STRIDE,
            },
        )?;
        let mut buffer = Self {
            records: vec![LightInformationRecord::INACTIVE; MAX_LIGHTS],
            gpu: Some(gpu),
            dirty: true,
        };
        buffer.upload()?;
        Ok(buffer)
    }

    /// Writes `record` into slot `index` of the CPU array.
    pub fn record(
        &mut self,
        index: usize,
        record: LightInformationRecord,
    ) -> Result<(), ShadowError> {
        let slot = self
            .records
            .get_mut(index)
            .ok_or(ShadowError::IndexOutOfRange {
                index,
                capacity: MAX_LIGHTS,
            })?;
        *slot = record;
        self.dirty = true;
        Ok(())
    }

    /// Resets slot `index` to [`LightInformationRecord::INACTIVE`].
    pub fn mark_inactive(&mut self, index: usize) -> Result<(), ShadowError> {
        self.record(index, LightInformationRecord::INACTIVE)
    }

    /// Resets every slot at or above `active_count`.
    pub fn clear_from(&mut self, active_count: usize) {
        for slot in self.records.iter_mut().skip(active_count) {
            if slot.is_active() {
                *slot = LightInformationRecord::INACTIVE;
                self.dirty = true;
            }
        }
    }

    /// The CPU-side records.
    pub fn records(&self) -> &[LightInformationRecord] {
        &self.records
    }

    /// Returns `true` if a slot changed since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the whole CPU array to the GPU buffer.
    pub fn upload(&mut self) -> Result<(), ShadowError> {
        let gpu = self.gpu.as_ref().ok_or(ShadowError::BufferReleased)?;
        gpu.write(0, bytemuck::cast_slice(&self.records))?;
        self.dirty = false;
        log::trace!(
            "LightInformationBuffer: Uploaded {} records ({} active)",
            self.records.len(),
            self.records.iter().filter(|r| r.is_active()).count()
        );
        Ok(())
    }

    /// Binds the buffer under [`LIGHT_INFORMATION_BUFFER_NAME`].
    pub fn bind(&self, globals: &(impl ShaderGlobals + ?Sized)) {
        if let Some(gpu) = &self.gpu {
            globals.set_global_buffer(LIGHT_INFORMATION_BUFFER_NAME, gpu.id());
        }
    }

    /// The device id of the buffer, until it is released.
    pub fn buffer_id(&self) -> Option<BufferId> {
        self.gpu.as_ref().map(GpuBuffer::id)
    }

    /// Releases the GPU buffer. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("LightInformationBuffer: Released GPU buffer");
        }
    }
}
