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

//! Hot-path recording for the colored-shadow subsystem.
//!
//! Lanes turn light descriptors into render-graph work: the shadow pass that draws
//! a light's atlas, the depth copy that converts its depth, and the capture that
//! commits the result and publishes it to shading. Each lane logs and skips on
//! failure, so one broken light never aborts the frame.

#![warn(missing_docs)]

pub mod shadow_lane;
