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

//! Clip-space depth conventions and the projection adjustment between them.

use crate::math::Mat4;

/// The depth range a graphics backend expects after projection.
///
/// Projections are built OpenGL-style (`-1..1`); [`ClipSpaceConvention::to_gpu_projection`]
/// remaps them to what the device reports. No y-flip is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClipSpaceConvention {
    /// Depth in `-1..1` (OpenGL).
    #[default]
    NegativeOneToOne,
    /// Depth in `0..1` (Vulkan, Metal, D3D, WebGPU).
    ZeroToOne,
    /// Depth in `1..0`, near mapped to 1.
    ReversedZeroToOne,
}

impl ClipSpaceConvention {
    /// Adapts an OpenGL-style projection matrix to this convention.
    pub fn to_gpu_projection(self, projection: Mat4) -> Mat4 {
        let (scale, bias) = match self {
            ClipSpaceConvention::NegativeOneToOne => return projection,
            ClipSpaceConvention::ZeroToOne => (0.5, 0.5),
            ClipSpaceConvention::ReversedZeroToOne => (-0.5, 0.5),
        };
        // z' = scale * z + bias * w, i.e. row 2 of the matrix.
        let row2 = projection.row(2) * scale + projection.row(3) * bias;
        let mut cols = projection.to_cols_array_2d();
        for (col, value) in cols.iter_mut().zip(row2.to_array()) {
            col[2] = value;
        }
        Mat4::from_cols_array_2d(&cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::{vec4, Vec4};

    fn ndc_depth(projection: Mat4, point: Vec4) -> f32 {
        let clip = projection * point;
        clip.z / clip.w
    }

    fn gl_projection() -> Mat4 {
        Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, 0.1, 10.0)
    }

    #[test]
    fn test_negative_one_to_one_is_identity() {
        let p = gl_projection();
        assert_eq!(ClipSpaceConvention::NegativeOneToOne.to_gpu_projection(p), p);
    }

    #[test]
    fn test_zero_to_one_remaps_near_and_far() {
        let p = ClipSpaceConvention::ZeroToOne.to_gpu_projection(gl_projection());
        assert_abs_diff_eq!(ndc_depth(p, vec4(0.0, 0.0, -0.1, 1.0)), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ndc_depth(p, vec4(0.0, 0.0, -10.0, 1.0)), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_reversed_remaps_near_to_one() {
        let p = ClipSpaceConvention::ReversedZeroToOne.to_gpu_projection(gl_projection());
        assert_abs_diff_eq!(ndc_depth(p, vec4(0.0, 0.0, -0.1, 1.0)), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ndc_depth(p, vec4(0.0, 0.0, -10.0, 1.0)), 0.0, epsilon = 1e-5);
    }
}
