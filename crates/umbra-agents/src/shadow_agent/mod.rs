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

//! Acts as the **[A]gent** for colored shadows.
//!
//! The agent owns the shadow subsystem's cross-frame state and, for every viewpoint
//! the host renders, enqueues the shadow render passes, the depth copies, and the
//! captures in that order, then finalizes the light information buffer.

mod agent;

pub use agent::*;
