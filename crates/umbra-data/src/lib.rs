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

//! Data layouts and allocators for the colored-shadow subsystem.
//!
//! This crate owns everything that persists across frames: the [`LightRegistry`]
//! that maps lights to dense indices, the [`ShadowAtlasAllocator`] that owns each
//! light's textures, and the [`LightInformationBuffer`] that mirrors per-light
//! records into a structured GPU buffer. GPU handles are wrapped in the RAII
//! guards of [`gpu`] so nothing here can leak or double-free a resource.

#![warn(missing_docs)]

pub mod atlas;
pub mod error;
pub mod gpu;
pub mod light_buffer;
pub mod registry;

pub use atlas::{AtlasFormats, ShadowAtlas, ShadowAtlasAllocator};
pub use error::ShadowError;
pub use gpu::{GpuBuffer, GpuTexture};
pub use light_buffer::{LightInformationBuffer, LightInformationRecord};
pub use registry::LightRegistry;
