//! Values derived from the depth under the pointer.

use crate::constants::{FILTER_BASE_HZ, FILTER_SPAN_HZ, HUD_DEPTH_METRES};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OceanLayer {
    Photic,
    Mesopelagic,
    Bathypelagic,
    Abyssal,
}

impl OceanLayer {
    pub fn from_depth(depth: f32) -> Self {
        if depth < 0.3 {
            OceanLayer::Photic
        } else if depth < 0.6 {
            OceanLayer::Mesopelagic
        } else if depth < 0.85 {
            OceanLayer::Bathypelagic
        } else {
            OceanLayer::Abyssal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OceanLayer::Photic => "PHOTIC",
            OceanLayer::Mesopelagic => "MESOPELAGIC",
            OceanLayer::Bathypelagic => "BATHYPELAGIC",
            OceanLayer::Abyssal => "ABYSSAL",
        }
    }
}

/// Master lowpass cutoff: bright in the shallows, dark at depth.
#[inline]
pub fn filter_cutoff_hz(depth: f32) -> f32 {
    FILTER_BASE_HZ + (1.0 - depth.clamp(0.0, 1.0)) * FILTER_SPAN_HZ
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthReadout {
    pub depth: f32,
    pub metres: f32,
    pub filter_hz: f32,
    pub layer: OceanLayer,
}

impl DepthReadout {
    pub fn new(depth: f32) -> Self {
        Self {
            depth,
            metres: depth * HUD_DEPTH_METRES,
            filter_hz: filter_cutoff_hz(depth),
            layer: OceanLayer::from_depth(depth),
        }
    }

    /// Three `LABEL value` lines as shown in the corner readout.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("DEPTH {:.0}m", self.metres),
            format!("FREQ {:.0}Hz", self.filter_hz),
            format!("LAYER {}", self.layer.label()),
        ]
    }
}
