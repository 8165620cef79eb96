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

//! The error type of the shadow subsystem.

use thiserror::Error;
use umbra_core::light::LightId;
use umbra_core::renderer::{GraphError, ResourceError};

/// An error raised while allocating or recording shadow work for one light.
///
/// Recording entry points log these and carry on with the next light; only
/// construction surfaces them to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShadowError {
    /// A light index fell outside `[0, MAX_LIGHTS)`.
    #[error("Light index {index} is out of range (capacity {capacity})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The fixed capacity.
        capacity: usize,
    },
    /// A material the pass depends on is not known to the host.
    #[error("Material '{0}' is not available")]
    MissingMaterial(String),
    /// The light's owning object was destroyed.
    #[error("Light {0:?} is stale")]
    StaleLight(LightId),
    /// The light information buffer was already released.
    #[error("The light information buffer was released")]
    BufferReleased,
    /// A device-level failure.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// A graph-level failure.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
