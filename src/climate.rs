//! Climate model deriving temperature and precipitation from position and
//! elevation.
//!
//! Temperature falls off with distance from the equator line (z = 0), drops
//! with altitude at the standard lapse rate, and carries a seeded noise
//! variation. Precipitation is remapped noise shaped by temperature (cold
//! air holds less moisture) and orographic lift. Temperature is always
//! computed before precipitation; the latter depends on it.

use crate::noise::NoiseField;
use crate::seeds::WorldSeeds;

// =============================================================================
// CLIMATE PARAMETERS
// =============================================================================

/// Temperature at the equator line at sea level (Celsius)
const EQUATOR_TEMP: f64 = 25.0;

/// Meters of |z| over which the latitude band spans one full drop
const LATITUDE_REFERENCE_M: f64 = 10_000.0;

/// Temperature drop across one latitude reference distance (Celsius)
const LATITUDE_TEMP_DROP: f64 = 30.0;

/// Temperature drop per meter of elevation (standard lapse rate)
const LAPSE_RATE: f64 = 0.0065;

/// Amplitude of seeded temperature variation (Celsius)
const TEMPERATURE_VARIATION: f64 = 15.0;

/// Wavelength of the temperature noise layer (world units)
const TEMPERATURE_WAVELENGTH: f64 = 5_000.0;

/// Wavelength of the precipitation noise layer (world units)
const PRECIPITATION_WAVELENGTH: f64 = 8_000.0;

/// Upper end of the base precipitation range (mm/yr)
const PRECIPITATION_MAX: f64 = 2_000.0;

/// Precipitation multiplier below freezing
const COLD_PRECIPITATION_FACTOR: f64 = 0.3;

/// Elevation over which orographic lift adds half again as much rain
const OROGRAPHIC_REFERENCE_M: f64 = 2_000.0;

/// Orographic gain at the reference elevation
const OROGRAPHIC_GAIN: f64 = 0.5;

// =============================================================================
// CLIMATE MODEL
// =============================================================================

/// Temperature (Celsius) and precipitation (mm/yr) at one coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateSample {
    pub temperature: f64,
    pub precipitation: f64,
}

/// Derives climate from position, elevation, and the climate layer seeds.
pub struct ClimateModel {
    temperature_noise: NoiseField,
    precipitation_noise: NoiseField,
    voxel_scale: f64,
}

impl ClimateModel {
    pub fn new(seeds: &WorldSeeds, voxel_scale: f64) -> Self {
        Self {
            temperature_noise: NoiseField::new(seeds.temperature),
            precipitation_noise: NoiseField::new(seeds.precipitation),
            voxel_scale,
        }
    }

    /// Temperature in Celsius at (x, z) world units with the given
    /// elevation in meters.
    pub fn temperature(&self, x: f64, z: f64, elevation: f64) -> f64 {
        let z_m = z * self.voxel_scale;
        let latitude_temp = EQUATOR_TEMP - z_m.abs() / LATITUDE_REFERENCE_M * LATITUDE_TEMP_DROP;
        let lapse = -LAPSE_RATE * elevation;
        let variation = self
            .temperature_noise
            .noise(x / TEMPERATURE_WAVELENGTH, z / TEMPERATURE_WAVELENGTH)
            * TEMPERATURE_VARIATION;

        latitude_temp + lapse + variation
    }

    /// Precipitation in mm/yr. Requires the temperature already computed
    /// for this coordinate.
    pub fn precipitation(&self, x: f64, z: f64, temperature: f64, elevation: f64) -> f64 {
        let raw = self
            .precipitation_noise
            .noise(x / PRECIPITATION_WAVELENGTH, z / PRECIPITATION_WAVELENGTH);
        let base = (raw + 1.0) * 0.5 * PRECIPITATION_MAX;

        let temp_factor = if temperature > 0.0 { 1.0 } else { COLD_PRECIPITATION_FACTOR };
        let orographic_factor = 1.0 + elevation / OROGRAPHIC_REFERENCE_M * OROGRAPHIC_GAIN;

        (base * temp_factor * orographic_factor).max(0.0)
    }

    /// Full climate sample; temperature first, precipitation from it.
    pub fn sample(&self, x: f64, z: f64, elevation: f64) -> ClimateSample {
        let temperature = self.temperature(x, z, elevation);
        let precipitation = self.precipitation(x, z, temperature, elevation);
        ClimateSample {
            temperature,
            precipitation,
        }
    }
}
