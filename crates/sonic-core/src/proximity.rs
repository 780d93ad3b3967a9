//! Pointer-to-species proximity, recomputed each frame.

use crate::config::ProximityParams;
use crate::species::Species;
use glam::Vec2;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixel position to normalized [0,1] space. A degenerate viewport maps
    /// everything to the center.
    pub fn normalize(&self, p: Vec2) -> Vec2 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec2::splat(0.5);
        }
        Vec2::new(p.x / self.width, p.y / self.height)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ProximityEntry<'a> {
    pub species: &'a Species,
    pub proximity: f32,
}

/// Species id -> closeness. Absent ids have zero proximity.
///
/// Built once per frame and handed read-only to the renderer and the audio
/// mixer.
#[derive(Clone, Debug, Default)]
pub struct ProximityMap<'a> {
    entries: BTreeMap<&'a str, ProximityEntry<'a>>,
}

impl<'a> ProximityMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, species: &'a Species, proximity: f32) {
        self.entries.insert(
            species.id.as_str(),
            ProximityEntry {
                species,
                proximity,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&ProximityEntry<'a>> {
        self.entries.get(id)
    }

    /// Proximity of `id`, 0 when absent.
    pub fn proximity(&self, id: &str) -> f32 {
        self.entries.get(id).map_or(0.0, |e| e.proximity)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProximityEntry<'a>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one proximity pass.
#[derive(Clone, Debug, Default)]
pub struct ProximityScan<'a> {
    pub map: ProximityMap<'a>,
    /// Species whose marker center is under the pointer this frame. Not
    /// debounced: a species stays here every frame the pointer rests on it.
    pub centers: Vec<&'a Species>,
}

/// Distance beyond which a species is omitted from the map.
#[inline]
pub fn proximity_threshold(species: &Species, viewport: Viewport, params: &ProximityParams) -> f32 {
    species.radius * viewport.width * params.threshold_factor
}

pub fn detect<'a>(
    pointer: Vec2,
    viewport: Viewport,
    species: &'a [Species],
    params: &ProximityParams,
) -> ProximityScan<'a> {
    let mut scan = ProximityScan::default();
    for sp in species {
        let dist = pointer.distance(sp.screen_position(viewport.width, viewport.height));
        if dist < params.center_radius_px {
            scan.centers.push(sp);
        }
        let threshold = proximity_threshold(sp, viewport, params);
        if dist < threshold {
            // linear falloff, unlike the smoothstep field kernels
            scan.map.insert(sp, 1.0 - dist / threshold);
        }
    }
    scan
}
