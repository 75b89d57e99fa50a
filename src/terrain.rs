//! Multi-scale terrain synthesis.
//!
//! Elevation is composed from four independently seeded noise layers at
//! decreasing wavelengths: continental landmass, mountain ridges, rolling
//! hills, and surface detail. The mountain layer is ridge-transformed and
//! masked by the continental value so ranges rise where continents are
//! high. Internally everything is computed in world units and converted to
//! meters at the end.

use serde::{Deserialize, Serialize};

use crate::noise::{ridged, NoiseField};
use crate::seeds::WorldSeeds;

// =============================================================================
// TERRAIN PARAMETERS
// =============================================================================

/// Tunable wavelengths and amplitudes for the four terrain layers.
///
/// Wavelengths are in world units, amplitudes in world units of elevation.
/// Defaults reproduce the reference terrain shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Continental layer wavelength (~12.5 km features at default scale)
    pub continental_wavelength: f64,
    /// Mountain layer wavelength
    pub mountain_wavelength: f64,
    /// Hill layer wavelength
    pub hill_wavelength: f64,
    /// Detail layer wavelength
    pub detail_wavelength: f64,
    /// Continental amplitude in elevation units
    pub continental_amplitude: f64,
    /// Mountain amplitude in elevation units
    pub mountain_amplitude: f64,
    /// Hill amplitude in elevation units
    pub hill_amplitude: f64,
    /// Detail amplitude in elevation units
    pub detail_amplitude: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            continental_wavelength: 50_000.0,
            mountain_wavelength: 15_000.0,
            hill_wavelength: 5_000.0,
            detail_wavelength: 1_000.0,
            continental_amplitude: 3_200.0,
            mountain_amplitude: 4_800.0,
            hill_amplitude: 1_000.0,
            detail_amplitude: 120.0,
        }
    }
}

/// Continental offset added before masking mountains; keeps ranges present
/// on mid-height continents, not just peaks.
const MOUNTAIN_MASK_BIAS: f64 = 0.3;

/// Exponent of the ridged transform applied to raw mountain noise.
const RIDGE_EXPONENT: f64 = 0.6;

/// Elevation units beyond which soft compression kicks in.
const SOFT_LIMIT_UNITS: f64 = 7_200.0;

/// Fraction of the excess kept when compressing past the soft limit.
const SOFT_COMPRESSION: f64 = 0.3;

/// Hard elevation bound in units (±2048 m at 0.25 m per unit).
const HARD_LIMIT_UNITS: f64 = 8_192.0;

// =============================================================================
// ELEVATION SAMPLES
// =============================================================================

/// Per-layer elevation contributions plus the combined, clamped value.
///
/// Contributions are in elevation units; `meters` is the final converted
/// and bounded elevation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationSample {
    /// Continental layer contribution (units)
    pub continental: f64,
    /// Masked, ridge-transformed mountain contribution (units)
    pub mountain: f64,
    /// Hill layer contribution (units)
    pub hill: f64,
    /// Detail layer contribution (units)
    pub detail: f64,
    /// Combined elevation after compression, clamping, and meter conversion
    pub meters: f64,
}

// =============================================================================
// SYNTHESIZER
// =============================================================================

/// Composes the four noise layers into bounded elevation.
///
/// Pure function of (coordinate, seeds, params); there is no call-order
/// dependence and no interior mutability.
pub struct TerrainSynthesizer {
    continental: NoiseField,
    mountain: NoiseField,
    hill: NoiseField,
    detail: NoiseField,
    params: TerrainParams,
    voxel_scale: f64,
}

impl TerrainSynthesizer {
    pub fn new(seeds: &WorldSeeds, params: TerrainParams, voxel_scale: f64) -> Self {
        Self {
            continental: NoiseField::new(seeds.continental),
            mountain: NoiseField::new(seeds.mountain),
            hill: NoiseField::new(seeds.hill),
            detail: NoiseField::new(seeds.detail),
            params,
            voxel_scale,
        }
    }

    /// Sample all layers at (x, z) world units.
    pub fn sample(&self, x: f64, z: f64) -> ElevationSample {
        let p = &self.params;

        let c = self.continental.noise(x / p.continental_wavelength, z / p.continental_wavelength);
        let m = self.mountain.noise(x / p.mountain_wavelength, z / p.mountain_wavelength);
        let h = self.hill.noise(x / p.hill_wavelength, z / p.hill_wavelength);
        let d = self.detail.noise(x / p.detail_wavelength, z / p.detail_wavelength);

        // Mountains only grow where the continental layer allows them.
        let mountain_factor = (c + MOUNTAIN_MASK_BIAS).max(0.0);
        let ridge = ridged(m, RIDGE_EXPONENT);

        let continental = c * p.continental_amplitude;
        let mountain = ridge * mountain_factor * p.mountain_amplitude;
        let hill = h * p.hill_amplitude;
        let detail = d * p.detail_amplitude;

        let units = compress(continental + mountain + hill + detail);

        ElevationSample {
            continental,
            mountain,
            hill,
            detail,
            meters: units * self.voxel_scale,
        }
    }

    /// Combined elevation in meters at (x, z).
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        self.sample(x, z).meters
    }
}

/// Soft-compress extreme elevations, then hard-clamp to the world bound.
///
/// Values beyond the soft limit keep only a fraction of their excess, which
/// preserves relief near the bound instead of producing flat plateaus.
fn compress(units: f64) -> f64 {
    let compressed = if units > SOFT_LIMIT_UNITS {
        SOFT_LIMIT_UNITS + (units - SOFT_LIMIT_UNITS) * SOFT_COMPRESSION
    } else if units < -SOFT_LIMIT_UNITS {
        -SOFT_LIMIT_UNITS + (units + SOFT_LIMIT_UNITS) * SOFT_COMPRESSION
    } else {
        units
    };

    compressed.clamp(-HARD_LIMIT_UNITS, HARD_LIMIT_UNITS)
}
