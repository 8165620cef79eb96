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

//! State threaded through every shadow lane.

use std::sync::Arc;
use umbra_core::renderer::{GraphicsDevice, RenderGraph, Viewpoint};
use umbra_data::{LightInformationBuffer, LightRegistry, ShadowAtlasAllocator, ShadowError};

/// The cross-frame state of the shadow subsystem.
///
/// One instance is owned by the feature and lent to each lane; nothing in the
/// subsystem is process-global.
#[derive(Debug)]
pub struct ShadowSystemContext {
    /// Active lights and their indices.
    pub registry: LightRegistry,
    /// Persistent per-light textures.
    pub allocator: ShadowAtlasAllocator,
    /// CPU records and their GPU buffer.
    pub light_buffer: LightInformationBuffer,
}

impl ShadowSystemContext {
    /// Creates an empty context and allocates the light information buffer.
    pub fn new(device: &Arc<dyn GraphicsDevice>) -> Result<Self, ShadowError> {
        Ok(Self {
            registry: LightRegistry::new(),
            allocator: ShadowAtlasAllocator::new(Arc::clone(device)),
            light_buffer: LightInformationBuffer::new(device)?,
        })
    }

    /// Releases every GPU resource the context owns. Safe to call repeatedly.
    pub fn release(&mut self) {
        self.allocator.release_all();
        self.light_buffer.release();
    }
}

/// What a lane records into for the current camera.
pub struct ShadowFrame<'a> {
    /// The host's graph for this frame.
    pub graph: &'a mut dyn RenderGraph,
    /// The host's device, for materials and global state.
    pub device: &'a dyn GraphicsDevice,
    /// The viewpoint being rendered.
    pub viewpoint: &'a Viewpoint,
}
