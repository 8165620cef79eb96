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

//! Shadow lanes and the state they share.

mod capture_lane;
mod context;
mod depth_copy_lane;
pub mod projection;
mod shadow_pass_lane;

pub use capture_lane::*;
pub use context::*;
pub use depth_copy_lane::*;
pub use shadow_pass_lane::*;
