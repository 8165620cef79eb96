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

//! Defines the ColoredShadowAgent, the orchestrator of the shadow lanes.

use std::sync::Arc;
use umbra_core::light::{LightDescriptor, MAX_LIGHTS};
use umbra_core::renderer::{GraphicsDevice, RenderGraph, Viewpoint};
use umbra_core::settings::{InjectionPoint, ShadowFeatureSettings, UploadTrigger};
use umbra_data::registry::LIGHT_COUNT_NAME;
use umbra_data::ShadowError;
use umbra_lanes::shadow_lane::{
    DepthCopyLane, ShadowCaptureLane, ShadowFrame, ShadowPassLane, ShadowPassOutput,
    ShadowSystemContext,
};

/// The agent responsible for the colored-shadow feature of one renderer.
pub struct ColoredShadowAgent {
    settings: ShadowFeatureSettings,
    device: Arc<dyn GraphicsDevice>,
    // Registry, atlases and light records, lent to each lane.
    context: ShadowSystemContext,
    shadow_lane: ShadowPassLane,
    depth_copy_lane: DepthCopyLane,
    capture_lane: ShadowCaptureLane,
    disposed: bool,
    frame_count: u64,
}

impl ColoredShadowAgent {
    /// Creates the feature: allocates the light information buffer and indexes `lights`.
    ///
    /// Atlases are allocated lazily, the first time each light is drawn.
    /// ## Errors
    /// * `ShadowError` - If the light information buffer cannot be created.
    pub fn new(
        settings: ShadowFeatureSettings,
        device: Arc<dyn GraphicsDevice>,
        lights: &[LightDescriptor],
    ) -> Result<Self, ShadowError> {
        let context = ShadowSystemContext::new(&device)?;
        let mut agent = Self {
            shadow_lane: ShadowPassLane::new(&settings),
            depth_copy_lane: DepthCopyLane::new(&settings),
            capture_lane: ShadowCaptureLane::new(&settings),
            settings,
            device,
            context,
            disposed: false,
            frame_count: 0,
        };
        let count = agent.rescan_lights(lights);
        log::info!(
            "ColoredShadowAgent: Created with {} lights at {:?}",
            count,
            agent.settings.injection_point
        );
        Ok(agent)
    }

    /// Re-indexes the scene's lights and returns how many are active.
    ///
    /// Records and atlases of indices that are no longer used are released.
    pub fn rescan_lights(&mut self, lights: &[LightDescriptor]) -> usize {
        let count = self.context.registry.rescan(lights, self.device.as_ref());
        self.context.light_buffer.clear_from(count);
        for index in count..MAX_LIGHTS {
            self.context.allocator.release(index);
        }
        count
    }

    /// Enqueues this frame's shadow work for `viewpoint` into `graph`.
    ///
    /// Viewpoints that are not game cameras, or have no color target, are skipped.
    /// A viewpoint attached to a light renders only that light; any other viewpoint
    /// renders every active light. Returns the number of lights whose shadows were
    /// captured.
    pub fn add_passes(&mut self, graph: &mut dyn RenderGraph, viewpoint: &Viewpoint) -> usize {
        if self.disposed {
            log::warn!("ColoredShadowAgent: add_passes called after dispose");
            return 0;
        }
        if !viewpoint.renders_shadows() {
            log::trace!(
                "ColoredShadowAgent: Skipping {:?} viewpoint {:?}",
                viewpoint.kind,
                viewpoint.id
            );
            return 0;
        }

        self.device.set_global_int(LIGHT_COUNT_NAME, self.context.registry.len() as i32);
        let order = self.light_order(viewpoint);

        let mut frame = ShadowFrame {
            graph,
            device: self.device.as_ref(),
            viewpoint,
        };

        let outputs: Vec<ShadowPassOutput> = order
            .into_iter()
            .filter_map(|index| self.shadow_lane.record(&mut self.context, &mut frame, index))
            .collect();

        for output in &outputs {
            self.depth_copy_lane.copy(
                &mut frame,
                output.depth,
                output.atlas_depth,
                self.settings.resolve_multisample_depth,
                self.settings.copy_depth_as_depth,
            );
        }

        let captured = outputs
            .iter()
            .filter(|output| self.capture_lane.capture(&mut frame, output))
            .count();

        self.end_frame();
        self.frame_count += 1;
        captured
    }

    /// Uploads the light records once every light of the frame has been recorded.
    ///
    /// Called by [`add_passes`](Self::add_passes); a no-op when nothing changed or
    /// when the upload is tied to light index 0.
    pub fn end_frame(&mut self) {
        if self.disposed {
            return;
        }
        if self.settings.upload_trigger == UploadTrigger::FrameEnd
            && self.context.light_buffer.is_dirty()
        {
            if let Err(e) = self.context.light_buffer.upload() {
                log::error!("ColoredShadowAgent: Failed to upload light information: {e}");
            }
        }
        self.context.light_buffer.bind(self.device.as_ref());
    }

    /// Releases the light information buffer and every atlas. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.context.release();
        self.disposed = true;
        log::info!("ColoredShadowAgent: Disposed after {} frames", self.frame_count);
    }

    /// Where in the host's frame the passes are meant to be inserted.
    pub fn injection_point(&self) -> InjectionPoint {
        self.settings.injection_point
    }

    /// The feature settings.
    pub fn settings(&self) -> &ShadowFeatureSettings {
        &self.settings
    }

    /// The shadow subsystem's state, for inspection.
    pub fn context(&self) -> &ShadowSystemContext {
        &self.context
    }

    /// Number of frames in which passes were enqueued.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn light_order(&mut self, viewpoint: &Viewpoint) -> Vec<usize> {
        let driving = self
            .context
            .registry
            .viewpoint_for(viewpoint)
            .map(|light| light.index);
        match driving {
            Some(index) => index.into_iter().collect(),
            None if viewpoint.attached_light.is_some() => {
                log::warn!(
                    "ColoredShadowAgent: Viewpoint {:?} is attached to an unindexed light",
                    viewpoint.id
                );
                Vec::new()
            }
            None => {
                let mut order: Vec<usize> = (0..self.context.registry.len()).collect();
                // Index 0 uploads the records, so it must see every other light first.
                if self.settings.upload_trigger == UploadTrigger::LightIndexZero {
                    order.rotate_left(1);
                }
                order
            }
        }
    }
}

impl Drop for ColoredShadowAgent {
    fn drop(&mut self) {
        self.dispose();
    }
}
