//! Spatial and routing parameters passed through to the host
//!
//! The scheduler never interprets these beyond deciding whether each one
//! is set; attenuation math and bus mixing belong to the host engine.

use serde::{Deserialize, Serialize};

use crate::position::Position3D;

/// Output bus identifier (host mixer group)
pub type BusId = u32;

/// Distance attenuation curve selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RolloffMode {
    /// Inverse-distance falloff (louder near, fast drop)
    #[default]
    Logarithmic,
    /// Linear falloff up to the max distance
    Linear,
    /// Host-authored curve, referenced by id
    Custom(u32),
}

/// Spatial/routing fields of a sound, each independently optional
///
/// Unset fields leave the host's defaults untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialParams {
    /// World position of the emitter
    pub position: Option<Position3D>,
    /// Max attenuation distance, applied only when > 0
    pub max_distance: Option<f32>,
    /// Rolloff curve
    pub rolloff: Option<RolloffMode>,
    /// Output bus / mixer group
    pub output_bus: Option<BusId>,
}

impl SpatialParams {
    /// Non-positional sound
    pub fn none() -> Self {
        Self::default()
    }

    /// Positioned sound with host-default attenuation
    pub fn at(position: Position3D) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Max distance if it should be applied
    #[inline]
    pub fn effective_max_distance(&self) -> Option<f32> {
        self.max_distance.filter(|d| *d > 0.0)
    }
}
