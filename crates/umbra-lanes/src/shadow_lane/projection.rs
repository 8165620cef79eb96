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

//! View and projection matrices for light viewpoints.
//!
//! Everything here is pure. Projections are OpenGL-style (right-handed, depth in
//! `-1..1`); [`gpu_light_matrix`] adapts them to the backend convention. Lights look
//! along their local `+Z`, which the view matrix maps to the `-Z` view axis.

use std::f32::consts::{FRAC_PI_2, PI};
use umbra_core::light::{LightProjection, LightTransform};
use umbra_core::math::{Mat4, Quat, Vec3};
use umbra_core::renderer::ClipSpaceConvention;

/// Field of view of every point-light face, in degrees.
pub const POINT_FACE_FOV_DEGREES: f32 = 90.0;
/// Near plane of every point-light face.
pub const POINT_FACE_NEAR: f32 = 0.1;

/// The matrices of a light viewpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightView {
    /// Base view matrix. For point lights, face views are derived from it.
    pub view: Mat4,
    /// Projection matrix, shared by all faces.
    pub projection: Mat4,
    /// Combined projection x view used for culling only.
    pub culling: Mat4,
}

/// Builds a view matrix for a light at `position` looking along its rotated `+Z`.
///
/// `rotation` must be a unit quaternion.
pub fn build_view_matrix(position: Vec3, rotation: Quat) -> Mat4 {
    // Negating the third row flips the forward axis from +Z to -Z.
    Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0))
        * Mat4::from_quat(rotation.inverse())
        * Mat4::from_translation(-position)
}

/// Builds the projection matrix of a light.
///
/// Degenerate parameters (`near >= far`, zero extents) give degenerate matrices.
pub fn build_projection(projection: &LightProjection) -> Mat4 {
    match *projection {
        LightProjection::Directional {
            horizontal_extent,
            vertical_extent,
            near,
            far,
        } => Mat4::orthographic_rh_gl(
            -horizontal_extent,
            horizontal_extent,
            -vertical_extent,
            vertical_extent,
            near,
            far,
        ),
        LightProjection::Spot {
            fov_degrees,
            aspect,
            near,
            far,
        } => Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect, near, far),
        LightProjection::Point { radius } => Mat4::perspective_rh_gl(
            POINT_FACE_FOV_DEGREES.to_radians(),
            1.0,
            POINT_FACE_NEAR,
            radius,
        ),
    }
}

/// Returns the rotation of point-light face `face`.
///
/// Applied to `+Z`, faces 0 to 5 give `+Z, +X, -Z, -X, +Y, -Y`. Returns `None` for
/// any other index.
pub fn face_rotation(face: usize) -> Option<Quat> {
    let rotation = match face {
        0 => Quat::IDENTITY,
        1 => Quat::from_rotation_y(FRAC_PI_2),
        2 => Quat::from_rotation_y(PI),
        3 => Quat::from_rotation_y(3.0 * FRAC_PI_2),
        4 => Quat::from_rotation_x(-FRAC_PI_2),
        5 => Quat::from_rotation_x(FRAC_PI_2),
        _ => return None,
    };
    Some(rotation)
}

/// Returns the view matrix of point-light face `face`, derived from `base_view`.
pub fn face_view(base_view: Mat4, face: usize) -> Option<Mat4> {
    face_rotation(face).map(|rotation| Mat4::from_quat(rotation) * base_view)
}

/// Returns the `(view, projection)` pair used to cull for a light.
///
/// Directional and spot lights cull with their render matrices. Point lights cull
/// with an orthographic box of half-extent `radius`, seen from just outside the
/// sphere so the near plane sits behind its back pole. The box covers all six faces
/// at once.
pub fn culling_volume(projection: &LightProjection, transform: &LightTransform) -> (Mat4, Mat4) {
    match *projection {
        LightProjection::Point { radius } => {
            let eye = transform.position - Vec3::Z * (radius + POINT_FACE_NEAR);
            let view = build_view_matrix(eye, Quat::IDENTITY);
            let projection = Mat4::orthographic_rh_gl(
                -radius,
                radius,
                -radius,
                radius,
                POINT_FACE_NEAR,
                radius * 2.0 + POINT_FACE_NEAR,
            );
            (view, projection)
        }
        _ => (
            build_view_matrix(transform.position, transform.rotation),
            build_projection(projection),
        ),
    }
}

/// Builds every matrix the shadow pass needs for one light.
pub fn light_view(projection: &LightProjection, transform: &LightTransform) -> LightView {
    let rotation = match projection {
        LightProjection::Point { .. } => Quat::IDENTITY,
        _ => transform.rotation,
    };
    let (cull_view, cull_projection) = culling_volume(projection, transform);
    LightView {
        view: build_view_matrix(transform.position, rotation),
        projection: build_projection(projection),
        culling: cull_projection * cull_view,
    }
}

/// Returns the light-space matrix stored for shading: GPU projection x view.
pub fn gpu_light_matrix(view: &LightView, convention: ClipSpaceConvention) -> Mat4 {
    convention.to_gpu_projection(view.projection) * view.view
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use umbra_core::light::POINT_LIGHT_FACES;
    use umbra_core::math::Vec4;

    fn project(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * Vec4::new(p.x, p.y, p.z, 1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_view_matrix_looks_down_local_z() {
        let view = build_view_matrix(Vec3::new(0.0, 0.0, -5.0), Quat::IDENTITY);
        let p = view.transform_point3(Vec3::new(0.0, 0.0, 1.0));
        // Six units in front of the light, on the -Z view axis.
        assert_abs_diff_eq!(p.z, -6.0, epsilon = 1e-5);
        assert!(view.determinant().abs() > 1e-6);
    }

    #[test]
    fn test_view_matrix_respects_rotation() {
        let rotation = Quat::from_rotation_y(FRAC_PI_2);
        let view = build_view_matrix(Vec3::ZERO, rotation);
        // Rotated +Z points along world +X.
        let p = view.transform_point3(Vec3::new(3.0, 0.0, 0.0));
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.z, -3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_directional_corner_maps_to_unit_clip() {
        let projection = LightProjection::Directional {
            horizontal_extent: 20.0,
            vertical_extent: 20.0,
            near: 0.1,
            far: 50.0,
        };
        let view = build_view_matrix(Vec3::ZERO, Quat::IDENTITY);
        let m = build_projection(&projection) * view;

        let corner = project(m, Vec3::new(20.0, 20.0, 10.0));
        assert_abs_diff_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(corner.y, 1.0, epsilon = 1e-5);

        let corner = project(m, Vec3::new(-20.0, -20.0, 10.0));
        assert_abs_diff_eq!(corner.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(corner.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_point_projection_far_plane_is_radius() {
        let m = build_projection(&LightProjection::Point { radius: 5.0 });
        let far = project(m, Vec3::new(0.0, 0.0, -5.0));
        let near = project(m, Vec3::new(0.0, 0.0, -POINT_FACE_NEAR));
        assert_abs_diff_eq!(far.z, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(near.z, -1.0, epsilon = 1e-4);

        // 90 degree FOV: the frustum edge at depth d is at +-d.
        let edge = project(m, Vec3::new(2.0, 2.0, -2.0));
        assert_abs_diff_eq!(edge.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(edge.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_face_rotations_cover_every_axis_in_order() {
        let expected = [Vec3::Z, Vec3::X, -Vec3::Z, -Vec3::X, Vec3::Y, -Vec3::Y];
        for (face, axis) in expected.iter().enumerate() {
            let direction = face_rotation(face).unwrap() * Vec3::Z;
            assert_abs_diff_eq!(direction.x, axis.x, epsilon = 1e-5);
            assert_abs_diff_eq!(direction.y, axis.y, epsilon = 1e-5);
            assert_abs_diff_eq!(direction.z, axis.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_face_views_look_along_their_axis() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let base = build_view_matrix(position, Quat::IDENTITY);
        let axes = [Vec3::Z, Vec3::X, -Vec3::Z, -Vec3::X, Vec3::Y, -Vec3::Y];

        for (face, axis) in axes.iter().enumerate() {
            let p = face_view(base, face)
                .unwrap()
                .transform_point3(position + *axis * 4.0);
            assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(p.z, -4.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_point_culling_box_contains_the_sphere() {
        let transform = LightTransform::from_position(Vec3::new(10.0, 0.0, 0.0));
        let projection = LightProjection::Point { radius: 3.0 };
        let (view, proj) = culling_volume(&projection, &transform);
        let m = proj * view;

        // Out to the radius itself, including the back pole along -Z.
        for distance in [0.0, 1.0, 2.5, 2.95, 2.99, 3.0] {
            for offset in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z] {
                let p = project(m, transform.position + offset * distance);
                assert!(
                    p.abs().max_element() <= 1.0 + 1e-5,
                    "{distance} along {offset:?} -> {p:?}"
                );
            }
        }
    }

    #[test]
    fn test_face_rotation_rejects_out_of_range_faces() {
        assert!(face_rotation(POINT_LIGHT_FACES - 1).is_some());
        assert!(face_rotation(POINT_LIGHT_FACES).is_none());
        assert!(face_view(Mat4::IDENTITY, 17).is_none());
    }

    #[test]
    fn test_gpu_light_matrix_zero_to_one() {
        let transform = LightTransform::from_position(Vec3::ZERO);
        let projection = LightProjection::Spot {
            fov_degrees: 60.0,
            aspect: 1.0,
            near: 1.0,
            far: 10.0,
        };
        let view = light_view(&projection, &transform);
        let m = gpu_light_matrix(&view, ClipSpaceConvention::ZeroToOne);

        assert_abs_diff_eq!(project(m, Vec3::new(0.0, 0.0, 1.0)).z, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(project(m, Vec3::new(0.0, 0.0, 10.0)).z, 1.0, epsilon = 1e-5);
    }
}
