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

//! Concrete implementations of the host-renderer contracts defined in `umbra-core`.
//!
//! The only backend shipped here is [`headless`]: a CPU-side device and render
//! graph that record every allocation, global binding and pass instead of talking
//! to a GPU. It is what the sandbox runs on and what the other crates test against.

#![warn(missing_docs)]

pub mod headless;

pub use headless::{GlobalValue, HeadlessDevice, HeadlessGraph, PassCommand, RecordedPass};
