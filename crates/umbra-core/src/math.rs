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

//! Math types shared by the shadow subsystem.
//!
//! Vector, quaternion and matrix types come from `glam`; this module re-exports the
//! ones the crates use so downstream code only depends on `umbra_core::math`.

pub use glam::{vec3, vec4, Mat4, Quat, UVec2, Vec3, Vec4};

/// Tolerance used when comparing floating-point values for approximate equality.
pub const EPSILON: f32 = 1e-6;

/// A pixel-space rectangle inside a render target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge, in pixels.
    pub x: f32,
    /// Top edge, in pixels.
    pub y: f32,
    /// Width, in pixels.
    pub width: f32,
    /// Height, in pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport from its origin and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a viewport covering a whole `width` x `height` target.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Returns the `slice`-th of `count` equal horizontal slices of a `width` x `height` target.
    ///
    /// Slice 0 is the leftmost one.
    pub fn horizontal_slice(width: u32, height: u32, slice: usize, count: usize) -> Self {
        let slice_width = width as f32 / count.max(1) as f32;
        Self::new(slice_width * slice as f32, 0.0, slice_width, height as f32)
    }
}
