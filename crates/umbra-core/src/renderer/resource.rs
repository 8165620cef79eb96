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

//! Opaque identifiers for device resources and graph-scoped handles.
//!
//! Device ids ([`TextureId`], [`BufferId`], [`MaterialId`]) live as long as the
//! resource they name. Graph handles ([`TextureHandle`], [`DrawListHandle`]) are only
//! meaningful inside the [`RenderGraph`](super::RenderGraph) that returned them.

/// An opaque handle to a GPU texture owned by a [`GraphicsDevice`](super::GraphicsDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle to a GPU buffer owned by a [`GraphicsDevice`](super::GraphicsDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// An opaque handle to a material (shader plus properties) known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// A texture declared in the current frame's render graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

/// A culled and sorted list of draw calls declared in the current frame's render graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawListHandle(pub usize);
