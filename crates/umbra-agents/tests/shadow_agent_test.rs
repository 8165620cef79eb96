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

//! Integration tests for the colored-shadow agent on the headless backend.

use approx::assert_relative_eq;
use std::sync::{Arc, RwLock};
use umbra_agents::shadow_agent::ColoredShadowAgent;
use umbra_core::light::{
    LightDescriptor, LightId, LightProjection, LightTransform, SharedLightTransform,
};
use umbra_core::math::vec3;
use umbra_core::renderer::{
    CameraKind, GraphicsDevice, TextureDescriptor, TextureFormat, Viewpoint, ViewpointId,
};
use umbra_core::settings::{ShadowFeatureSettings, UploadTrigger};
use umbra_data::registry::LIGHT_COUNT_NAME;
use umbra_data::LightInformationRecord;
use umbra_infra::{HeadlessDevice, HeadlessGraph};
use umbra_lanes::shadow_lane::projection;

fn device(settings: &ShadowFeatureSettings) -> HeadlessDevice {
    let device = HeadlessDevice::default();
    device.register_material(&settings.override_material);
    device.register_material(&settings.copy_depth_material);
    device
}

fn agent(
    device: &HeadlessDevice,
    settings: ShadowFeatureSettings,
    lights: &[LightDescriptor],
) -> ColoredShadowAgent {
    let shared: Arc<dyn GraphicsDevice> = Arc::new(device.clone());
    ColoredShadowAgent::new(settings, shared, lights).expect("agent")
}

fn transform(position: [f32; 3]) -> SharedLightTransform {
    Arc::new(RwLock::new(LightTransform::from_position(position.into())))
}

fn camera() -> Viewpoint {
    Viewpoint::game(ViewpointId(1), vec3(0.0, 1.5, -6.0)).with_targets(
        TextureDescriptor::new("CameraColor", 1600, 900, TextureFormat::Rgba8Unorm),
        TextureDescriptor::new("CameraDepth", 1600, 900, TextureFormat::Depth32Float),
    )
}

fn graph() -> HeadlessGraph {
    HeadlessGraph::new(TextureDescriptor::new(
        "Backbuffer",
        1600,
        900,
        TextureFormat::Rgba8Unorm,
    ))
}

fn graph_for(agent: &mut ColoredShadowAgent, view: &Viewpoint) -> HeadlessGraph {
    let mut graph = graph();
    agent.add_passes(&mut graph, view);
    graph
}

fn uploaded_records(
    device: &HeadlessDevice,
    agent: &ColoredShadowAgent,
) -> Vec<LightInformationRecord> {
    let buffer = agent.context().light_buffer.buffer_id().expect("buffer");
    device
        .read_buffer(buffer)
        .expect("buffer bytes")
        .chunks_exact(LightInformationRecord::STRIDE)
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

fn render_order(graph: &HeadlessGraph) -> Vec<String> {
    graph
        .passes()
        .iter()
        .map(|p| p.label().to_string())
        .filter(|l| l.starts_with("ColoredShadows.Render"))
        .collect()
}

#[test]
fn test_directional_and_point_light_frame() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let sun = transform([0.0, 20.0, 0.0]);
    let lamp = transform([2.0, 1.0, 2.0]);
    let lights = [
        LightDescriptor::new(
            LightId(1),
            LightProjection::Directional {
                horizontal_extent: 20.0,
                vertical_extent: 20.0,
                near: 0.1,
                far: 50.0,
            },
            &sun,
        ),
        LightDescriptor::new(LightId(2), LightProjection::Point { radius: 5.0 }, &lamp),
    ];
    let mut agent = agent(&device, settings, &lights);
    let mut graph = graph();

    assert_eq!(agent.add_passes(&mut graph, &camera()), 2);

    let registry = &agent.context().registry;
    assert_eq!(registry.by_id(LightId(1)).and_then(|l| l.index), Some(0));
    assert_eq!(registry.by_id(LightId(2)).and_then(|l| l.index), Some(1));

    let allocator = &agent.context().allocator;
    let directional = allocator.get(0).expect("atlas 0").extent();
    let point = allocator.get(1).expect("atlas 1").extent();
    assert_eq!((directional.width, directional.height), (1024, 1024));
    assert_eq!((point.width, point.height), (1024 * 6, 1024));

    assert_eq!(device.global_int(LIGHT_COUNT_NAME), Some(2));

    let records = uploaded_records(&device, &agent);
    assert!(records[0].is_active());
    assert!(records[1].is_active());
    assert_eq!(records[0].light_mode, 0);
    assert_eq!(records[1].light_mode, 2);
    assert_relative_eq!(records[1].far_plane, 5.0);
    assert!(records[2..].iter().all(|r| *r == LightInformationRecord::INACTIVE));
}

#[test]
fn test_passes_are_enqueued_render_then_copy_then_capture() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights = [
        LightDescriptor::new(LightId(1), LightProjection::default(), &t),
        LightDescriptor::new(LightId(2), LightProjection::Point { radius: 3.0 }, &t),
    ];
    let mut agent = agent(&device, settings, &lights);
    let mut graph = graph();
    agent.add_passes(&mut graph, &camera());

    let labels: Vec<&str> = graph.passes().iter().map(|p| p.label()).collect();
    assert_eq!(
        labels,
        vec![
            "ColoredShadows.Render0",
            "ColoredShadows.Render1",
            "ColoredShadows.CopyDepth._ColoredShadowDepth0",
            "ColoredShadows.CopyDepth._ColoredShadowDepth1",
            "CaptureShadowsColor0",
            "CaptureShadowsColor1",
        ]
    );
}

#[test]
fn test_frame_end_upload_sees_every_light() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let transforms: Vec<_> = (0..3)
        .map(|i| transform([i as f32 * 4.0, 6.0, 0.0]))
        .collect();
    let lights: Vec<_> = transforms
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let projection = match i {
                0 => LightProjection::default(),
                1 => LightProjection::Spot {
                    fov_degrees: 45.0,
                    aspect: 1.0,
                    near: 0.1,
                    far: 30.0,
                },
                _ => LightProjection::Point { radius: 8.0 },
            };
            LightDescriptor::new(LightId(i as u64 + 1), projection, t)
                .with_shadow_id_offset(i as i32 * 10)
        })
        .collect();
    let mut agent = agent(&device, settings, &lights);
    let view = camera();

    let writes_before = device.stats().buffer_writes;
    let graph = graph_for(&mut agent, &view);
    assert_eq!(device.stats().buffer_writes, writes_before + 1);
    assert_eq!(
        render_order(&graph),
        vec![
            "ColoredShadows.Render0",
            "ColoredShadows.Render1",
            "ColoredShadows.Render2",
        ]
    );

    let records = uploaded_records(&device, &agent);
    for (index, light) in agent.context().registry.lights().iter().enumerate() {
        let transform = light.transform().expect("live light");
        let view_matrices = projection::light_view(&light.projection, &transform);
        let expected = LightInformationRecord::for_light(
            light,
            index,
            transform.position,
            projection::gpu_light_matrix(&view_matrices, device.clip_space()),
            view.position,
        );
        assert_eq!(records[index], expected);
        assert_eq!(records[index].shadow_id_offset, index as i32 * 10);
    }
}

#[test]
fn test_light_index_zero_trigger_records_index_zero_last() {
    let settings = ShadowFeatureSettings {
        upload_trigger: UploadTrigger::LightIndexZero,
        ..Default::default()
    };
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights: Vec<_> = (1..=3)
        .map(|id| LightDescriptor::new(LightId(id), LightProjection::default(), &t))
        .collect();
    let mut agent = agent(&device, settings, &lights);

    let writes_before = device.stats().buffer_writes;
    let graph = graph_for(&mut agent, &camera());
    assert_eq!(
        render_order(&graph),
        vec![
            "ColoredShadows.Render1",
            "ColoredShadows.Render2",
            "ColoredShadows.Render0",
        ]
    );
    assert_eq!(device.stats().buffer_writes, writes_before + 1);

    let records = uploaded_records(&device, &agent);
    assert!(records[..3].iter().all(LightInformationRecord::is_active));
}

#[test]
fn test_non_game_and_depth_only_viewpoints_are_skipped() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights = [LightDescriptor::new(LightId(1), LightProjection::default(), &t)];
    let mut agent = agent(&device, settings, &lights);

    for kind in [CameraKind::SceneView, CameraKind::Preview, CameraKind::Reflection] {
        let view = Viewpoint { kind, ..camera() };
        let graph = graph_for(&mut agent, &view);
        assert!(graph.passes().is_empty(), "{kind:?}");
    }

    let depth_only = Viewpoint {
        color_target: None,
        ..camera()
    };
    assert!(graph_for(&mut agent, &depth_only).passes().is_empty());
    assert_eq!(agent.frame_count(), 0);
    assert_eq!(agent.context().allocator.allocated_count(), 0);
}

#[test]
fn test_light_driven_viewpoint_renders_only_its_light() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights: Vec<_> = (1..=3)
        .map(|id| LightDescriptor::new(LightId(id), LightProjection::default(), &t))
        .collect();
    let mut agent = agent(&device, settings, &lights);

    let view = Viewpoint::game(ViewpointId(9), vec3(0.0, 5.0, 0.0))
        .with_targets(
            TextureDescriptor::new("LightColor", 512, 512, TextureFormat::Rgba8Unorm),
            TextureDescriptor::new("LightDepth", 512, 512, TextureFormat::Depth32Float),
        )
        .attached_to(LightId(2));
    let graph = graph_for(&mut agent, &view);
    assert_eq!(render_order(&graph), vec!["ColoredShadows.Render1"]);

    let unknown = Viewpoint {
        id: ViewpointId(10),
        ..view.clone().attached_to(LightId(99))
    };
    assert!(graph_for(&mut agent, &unknown).passes().is_empty());
}

#[test]
fn test_light_driven_viewpoint_follows_its_light_across_rescans() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights: Vec<_> = [2, 4]
        .into_iter()
        .map(|id| LightDescriptor::new(LightId(id), LightProjection::default(), &t))
        .collect();
    let mut agent = agent(&device, settings, &lights[..1]);

    let view = Viewpoint::game(ViewpointId(9), vec3(0.0, 5.0, 0.0))
        .with_targets(
            TextureDescriptor::new("LightColor", 512, 512, TextureFormat::Rgba8Unorm),
            TextureDescriptor::new("LightDepth", 512, 512, TextureFormat::Depth32Float),
        )
        .attached_to(LightId(2));
    assert_eq!(agent.add_passes(&mut graph(), &view), 1);

    assert_eq!(agent.rescan_lights(&lights[1..]), 1);
    let reattached = view.clone().attached_to(LightId(4));
    let mut graph = graph();
    assert_eq!(agent.add_passes(&mut graph, &reattached), 1);
    assert_eq!(render_order(&graph), vec!["ColoredShadows.Render0"]);
}

#[test]
fn test_stale_light_does_not_block_other_lights() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let kept = transform([0.0, 5.0, 0.0]);
    let doomed = transform([3.0, 5.0, 0.0]);
    let lights = [
        LightDescriptor::new(LightId(1), LightProjection::default(), &kept),
        LightDescriptor::new(LightId(2), LightProjection::Point { radius: 4.0 }, &doomed),
    ];
    let mut agent = agent(&device, settings, &lights);
    drop(doomed);

    let graph = graph_for(&mut agent, &camera());
    assert_eq!(render_order(&graph), vec!["ColoredShadows.Render0"]);
    assert!(graph.pass_index("CaptureShadowsColor0").is_some());
    assert!(graph.pass_index("CaptureShadowsColor1").is_none());

    let records = uploaded_records(&device, &agent);
    assert!(records[0].is_active());
    assert_eq!(records[1], LightInformationRecord::INACTIVE);
}

#[test]
fn test_rescan_releases_unused_atlases_and_records() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights: Vec<_> = (1..=3)
        .map(|id| LightDescriptor::new(LightId(id), LightProjection::default(), &t))
        .collect();
    let mut agent = agent(&device, settings, &lights);
    graph_for(&mut agent, &camera());
    assert_eq!(agent.context().allocator.allocated_count(), 3);

    assert_eq!(agent.rescan_lights(&lights[..1]), 1);
    graph_for(&mut agent, &camera());

    assert_eq!(agent.context().allocator.allocated_count(), 1);
    assert_eq!(device.live_textures(), 2);
    assert_eq!(device.global_int(LIGHT_COUNT_NAME), Some(1));
    let records = uploaded_records(&device, &agent);
    assert!(records[0].is_active());
    assert!(records[1..].iter().all(|r| !r.is_active()));
}

#[test]
fn test_dispose_releases_everything_once() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights = [
        LightDescriptor::new(LightId(1), LightProjection::default(), &t),
        LightDescriptor::new(LightId(2), LightProjection::Point { radius: 2.0 }, &t),
    ];
    let mut agent = agent(&device, settings, &lights);
    graph_for(&mut agent, &camera());
    assert_eq!(device.live_textures(), 4);

    agent.dispose();
    agent.dispose();
    assert!(agent.is_disposed());
    assert_eq!(device.live_textures(), 0);
    assert_eq!(device.stats().buffers_destroyed, 1);
    assert_eq!(agent.add_passes(&mut graph(), &camera()), 0);

    drop(agent);
    let stats = device.stats();
    assert_eq!(stats.textures_destroyed, stats.textures_created);
    assert_eq!(stats.buffers_destroyed, 1);
}

#[test]
fn test_drop_disposes_undisposed_agent() {
    let settings = ShadowFeatureSettings::default();
    let device = device(&settings);
    let t = transform([0.0, 5.0, 0.0]);
    let lights = [LightDescriptor::new(LightId(1), LightProjection::default(), &t)];
    let mut agent = agent(&device, settings, &lights);
    graph_for(&mut agent, &camera());

    drop(agent);
    assert_eq!(device.live_textures(), 0);
    assert_eq!(device.stats().buffers_destroyed, 1);
}

#[test]
fn test_injection_point_comes_from_settings() {
    let settings = ShadowFeatureSettings::from_ron_str("(injection_point: BeforeRenderingOpaques)")
        .expect("settings");
    let device = device(&settings);
    let agent = agent(&device, settings.clone(), &[]);
    assert_eq!(agent.injection_point(), settings.injection_point);
    assert_eq!(device.global_int(LIGHT_COUNT_NAME), Some(0));
}
