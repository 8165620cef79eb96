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

//! Tracks the active lights, their dense indices, and the viewpoints they drive.

use std::collections::HashMap;
use umbra_core::light::{LightDescriptor, LightId, MAX_LIGHTS};
use umbra_core::renderer::{ShaderGlobals, Viewpoint, ViewpointId};

/// Global name of the active light count.
pub const LIGHT_COUNT_NAME: &str = "CurrentAmountCustomLights";

/// Maps active lights to indices in `[0, MAX_LIGHTS)` and viewpoints to lights.
///
/// Indices are reassigned from scratch on every [`rescan`](Self::rescan), in
/// ascending [`LightId`] order, so they are always dense and unique.
#[derive(Debug, Default)]
pub struct LightRegistry {
    lights: Vec<LightDescriptor>,
    overflow: Vec<LightId>,
    viewpoints: HashMap<ViewpointId, Option<LightId>>,
}

impl LightRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index assignment from `lights` and publishes the active count.
    ///
    /// Stale lights are pruned first. If more than [`MAX_LIGHTS`] remain, only the
    /// first `MAX_LIGHTS` are indexed and the rest are reported as overflow.
    /// Viewpoints remembered against a light that is no longer indexed are
    /// forgotten. Returns the number of indexed lights.
    pub fn rescan(
        &mut self,
        lights: &[LightDescriptor],
        globals: &(impl ShaderGlobals + ?Sized),
    ) -> usize {
        let mut active: Vec<LightDescriptor> =
            lights.iter().filter(|l| l.is_alive()).cloned().collect();
        let pruned = lights.len() - active.len();
        if pruned > 0 {
            log::debug!("LightRegistry: Pruned {pruned} stale lights");
        }

        active.sort_by_key(|l| l.id);
        active.dedup_by_key(|l| l.id);

        self.overflow.clear();
        if active.len() > MAX_LIGHTS {
            self.overflow = active.split_off(MAX_LIGHTS).iter().map(|l| l.id).collect();
            log::error!(
                "LightRegistry: Cannot have more than {} lights, {} were excluded: {:?}",
                MAX_LIGHTS,
                self.overflow.len(),
                self.overflow
            );
        }

        for (index, light) in active.iter_mut().enumerate() {
            light.index = Some(index);
        }
        self.lights = active;

        let lights = &self.lights;
        self.viewpoints
            .retain(|_, light| light.is_some_and(|id| lights.iter().any(|l| l.id == id)));

        globals.set_global_int(LIGHT_COUNT_NAME, self.lights.len() as i32);
        self.lights.len()
    }

    /// Returns the light driven by `viewpoint`, if any.
    ///
    /// The first time a viewpoint is seen, its attached light is remembered; later
    /// calls use the remembered light even if the viewpoint changes, until a
    /// rescan drops that light.
    pub fn viewpoint_for(&mut self, viewpoint: &Viewpoint) -> Option<&LightDescriptor> {
        let light = *self
            .viewpoints
            .entry(viewpoint.id)
            .or_insert(viewpoint.attached_light);
        self.by_id(light?)
    }

    /// Forgets the light remembered for `viewpoint`.
    pub fn forget_viewpoint(&mut self, viewpoint: ViewpointId) {
        self.viewpoints.remove(&viewpoint);
    }

    /// The indexed lights, in index order.
    pub fn lights(&self) -> &[LightDescriptor] {
        &self.lights
    }

    /// Returns the light at `index`.
    pub fn get(&self, index: usize) -> Option<&LightDescriptor> {
        self.lights.get(index)
    }

    /// Returns the indexed light with `id`.
    pub fn by_id(&self, id: LightId) -> Option<&LightDescriptor> {
        self.lights.iter().find(|l| l.id == id)
    }

    /// Lights excluded by the last rescan because the capacity was exceeded.
    pub fn overflow(&self) -> &[LightId] {
        &self.overflow
    }

    /// Number of indexed lights.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Returns `true` if no light is indexed.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, RwLock};
    use umbra_core::light::{LightProjection, LightTransform, SharedLightTransform};
    use umbra_core::math::Vec3;
    use umbra_infra::HeadlessDevice;

    fn transform() -> SharedLightTransform {
        Arc::new(RwLock::new(LightTransform::default()))
    }

    fn light(id: u64, transform: &SharedLightTransform) -> LightDescriptor {
        LightDescriptor::new(LightId(id), LightProjection::default(), transform)
    }

    #[test]
    fn test_indices_follow_id_order() {
        let device = HeadlessDevice::default();
        let t = transform();
        let lights = vec![light(30, &t), light(10, &t), light(20, &t)];

        let mut registry = LightRegistry::new();
        assert_eq!(registry.rescan(&lights, &device), 3);

        let ids: Vec<_> = registry.lights().iter().map(|l| (l.id.0, l.index)).collect();
        assert_eq!(ids, vec![(10, Some(0)), (20, Some(1)), (30, Some(2))]);
        assert_eq!(device.global_int(LIGHT_COUNT_NAME), Some(3));
    }

    #[test]
    fn test_stale_lights_are_pruned_before_indexing() {
        let device = HeadlessDevice::default();
        let kept = transform();
        let dropped = transform();
        let lights = vec![light(0, &kept), light(1, &dropped), light(2, &kept)];
        drop(dropped);

        let mut registry = LightRegistry::new();
        registry.rescan(&lights, &device);

        let ids: Vec<_> = registry.lights().iter().map(|l| (l.id.0, l.index)).collect();
        assert_eq!(ids, vec![(0, Some(0)), (2, Some(1))]);
        assert_eq!(device.global_int(LIGHT_COUNT_NAME), Some(2));
    }

    #[test]
    fn test_viewpoint_mapping_is_lazy_and_remembered() {
        let device = HeadlessDevice::default();
        let t = transform();
        let mut registry = LightRegistry::new();
        registry.rescan(&[light(4, &t), light(5, &t)], &device);

        let camera = Viewpoint::game(ViewpointId(1), Vec3::ZERO).attached_to(LightId(5));
        assert_eq!(registry.viewpoint_for(&camera).map(|l| l.index), Some(Some(1)));

        let moved = camera.clone().attached_to(LightId(4));
        assert_eq!(registry.viewpoint_for(&moved).map(|l| l.id), Some(LightId(5)));

        registry.forget_viewpoint(ViewpointId(1));
        assert_eq!(registry.viewpoint_for(&moved).map(|l| l.id), Some(LightId(4)));

        let plain = Viewpoint::game(ViewpointId(2), Vec3::ZERO);
        assert!(registry.viewpoint_for(&plain).is_none());
    }

    #[test]
    fn test_rescan_forgets_viewpoints_of_dropped_lights() {
        let device = HeadlessDevice::default();
        let t = transform();
        let mut registry = LightRegistry::new();
        registry.rescan(&[light(2, &t), light(3, &t)], &device);

        let first = Viewpoint::game(ViewpointId(9), Vec3::ZERO).attached_to(LightId(2));
        let second = Viewpoint::game(ViewpointId(8), Vec3::ZERO).attached_to(LightId(3));
        assert_eq!(registry.viewpoint_for(&first).map(|l| l.id), Some(LightId(2)));
        assert_eq!(registry.viewpoint_for(&second).map(|l| l.id), Some(LightId(3)));

        registry.rescan(&[light(3, &t), light(4, &t)], &device);

        let reattached = first.clone().attached_to(LightId(4));
        assert_eq!(registry.viewpoint_for(&reattached).map(|l| l.id), Some(LightId(4)));
        // Still indexed, so still remembered.
        let moved = second.clone().attached_to(LightId(4));
        assert_eq!(registry.viewpoint_for(&moved).map(|l| l.id), Some(LightId(3)));
    }
}
