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

//! Foundational crate for the colored-shadow subsystem.
//!
//! `umbra-core` holds the contracts every other crate builds on: the light data
//! model, the host-renderer traits a backend must implement ([`GraphicsDevice`],
//! [`RenderGraph`], [`RasterPass`]), the shared error types, and the feature
//! settings loaded from configuration. Nothing in here records a pass or owns a
//! GPU resource; that is the job of `umbra-data`, `umbra-lanes` and `umbra-agents`.
//!
//! [`GraphicsDevice`]: renderer::GraphicsDevice
//! [`RenderGraph`]: renderer::RenderGraph
//! [`RasterPass`]: renderer::RasterPass

#![warn(missing_docs)]

pub mod light;
pub mod math;
pub mod renderer;
pub mod settings;

pub use light::{
    AtlasResolution, LightDescriptor, LightId, LightMode, LightProjection, LightTransform,
    SharedLightTransform, MAX_LIGHTS,
};
pub use settings::{SettingsError, ShadowFeatureSettings};
