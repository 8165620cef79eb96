use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use umbra_core::light::{LightProjection, LightTransform};
use umbra_core::math::{vec3, Quat};
use umbra_core::renderer::ClipSpaceConvention;
use umbra_lanes::shadow_lane::projection;

fn bench_light_views(c: &mut Criterion) {
    let transform = LightTransform::new(
        vec3(4.0, 12.0, -3.0),
        Quat::from_rotation_x(-0.9) * Quat::from_rotation_y(0.4),
    );
    let lights = [
        ("Directional", LightProjection::default()),
        (
            "Spot",
            LightProjection::Spot {
                fov_degrees: 60.0,
                aspect: 1.0,
                near: 0.1,
                far: 40.0,
            },
        ),
        ("Point", LightProjection::Point { radius: 15.0 }),
    ];

    let mut group = c.benchmark_group("Light Projection");

    for (name, light) in &lights {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let view = projection::light_view(black_box(light), black_box(&transform));
                black_box(projection::gpu_light_matrix(
                    &view,
                    ClipSpaceConvention::ZeroToOne,
                ))
            });
        });
    }

    // Six face matrices, as issued for one point light per frame.
    group.bench_function("Point Faces", |b| {
        let view = projection::light_view(&lights[2].1, &transform);
        b.iter(|| {
            for face in 0..6 {
                if let Some(face_view) = projection::face_view(black_box(view.view), face) {
                    black_box(view.projection * face_view);
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_light_views);
criterion_main!(benches);
