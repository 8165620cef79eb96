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

// Colored shadows sandbox
// Runs a few frames of the shadow feature against the headless backend and logs
// what it publishes.

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context, Result};
use umbra_agents::shadow_agent::ColoredShadowAgent;
use umbra_core::light::{LightDescriptor, LightId, LightProjection, LightTransform};
use umbra_core::math::{vec3, Quat};
use umbra_core::renderer::{
    CameraKind, GraphicsDevice, TextureDescriptor, TextureFormat, Viewpoint, ViewpointId,
};
use umbra_core::ShadowFeatureSettings;
use umbra_data::registry::LIGHT_COUNT_NAME;
use umbra_data::LightInformationRecord;
use umbra_infra::{HeadlessDevice, HeadlessGraph};

const DEFAULT_SETTINGS: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shadow_settings.ron");
const FRAMES: usize = 3;

fn load_settings() -> Result<ShadowFeatureSettings> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS.to_string());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings from {path}"))?;
    let settings = ShadowFeatureSettings::from_ron_str(&text)
        .with_context(|| format!("Invalid settings in {path}"))?;
    log::info!("Loaded shadow settings from {path}");
    Ok(settings)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = load_settings()?;
    let device = HeadlessDevice::default();
    device.register_material(&settings.override_material);
    device.register_material(&settings.copy_depth_material);
    if let Some(blit) = &settings.blit_material {
        device.register_material(blit);
    }

    let sun = Arc::new(RwLock::new(LightTransform::new(
        vec3(0.0, 25.0, 0.0),
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
    )));
    let lamp = Arc::new(RwLock::new(LightTransform::from_position(vec3(3.0, 2.0, 1.0))));
    let spot = Arc::new(RwLock::new(LightTransform::new(
        vec3(-4.0, 6.0, -2.0),
        Quat::from_rotation_x(-0.7),
    )));
    let lights = [
        LightDescriptor::new(LightId(1), LightProjection::default(), &sun),
        LightDescriptor::new(LightId(2), LightProjection::Point { radius: 5.0 }, &lamp)
            .with_atlas_resolution(512, 512),
        LightDescriptor::new(
            LightId(3),
            LightProjection::Spot {
                fov_degrees: 50.0,
                aspect: 1.0,
                near: 0.1,
                far: 30.0,
            },
            &spot,
        )
        .with_shadow_id_offset(16),
    ];

    let shared: Arc<dyn GraphicsDevice> = Arc::new(device.clone());
    let mut agent = ColoredShadowAgent::new(settings, shared, &lights)
        .context("Failed to create the colored-shadow feature")?;

    let camera = Viewpoint::game(ViewpointId(1), vec3(0.0, 3.0, -10.0)).with_targets(
        TextureDescriptor::new("CameraColor", 1920, 1080, TextureFormat::Rgba8Unorm),
        TextureDescriptor::new("CameraDepth", 1920, 1080, TextureFormat::Depth24PlusStencil8),
    );
    let scene_view = Viewpoint {
        id: ViewpointId(2),
        kind: CameraKind::SceneView,
        ..camera.clone()
    };

    for frame in 0..FRAMES {
        {
            let mut transform = lamp
                .write()
                .map_err(|_| anyhow!("Lamp transform lock poisoned"))?;
            transform.position.x = 3.0 - frame as f32;
        }

        let mut graph = HeadlessGraph::new(TextureDescriptor::new(
            "Backbuffer",
            1920,
            1080,
            TextureFormat::Rgba8Unorm,
        ));
        let captured = agent.add_passes(&mut graph, &camera);
        agent.add_passes(&mut graph, &scene_view);
        log::info!(
            "Frame {frame}: {} passes, {} lights captured",
            graph.passes().len(),
            captured
        );
        for pass in graph.passes() {
            log::debug!("  {}", pass.label());
        }
    }

    log::info!("{} = {:?}", LIGHT_COUNT_NAME, device.global_int(LIGHT_COUNT_NAME));
    for index in 0..agent.context().registry.len() {
        let map = device.global_texture(&format!("_ColoredShadowMap{index}"));
        let matrix = device.global_matrix(&format!("_ColoredShadowMatrix{index}"));
        log::info!(
            "Light {index}: map {:?}, matrix published: {}",
            map,
            matrix.is_some()
        );
    }

    if let Some(buffer) = agent.context().light_buffer.buffer_id() {
        let bytes = device
            .read_buffer(buffer)
            .ok_or_else(|| anyhow!("Light information buffer was not uploaded"))?;
        let active: Vec<LightInformationRecord> = bytes
            .chunks_exact(LightInformationRecord::STRIDE)
            .map(bytemuck::pod_read_unaligned::<LightInformationRecord>)
            .filter(LightInformationRecord::is_active)
            .collect();
        for record in &active {
            log::info!(
                "Record {}: mode {}, atlas {}x{}, far plane {}",
                record.index,
                record.light_mode,
                record.atlas_width,
                record.atlas_height,
                record.far_plane
            );
        }
    }

    agent.dispose();
    let stats = device.stats();
    log::info!(
        "Device: {} textures created, {} destroyed, {} buffer writes",
        stats.textures_created,
        stats.textures_destroyed,
        stats.buffer_writes
    );
    Ok(())
}
