//! Generator configuration.
//!
//! Everything the reference implementation hard-coded as module constants
//! is collected here and validated once, at generator construction. The
//! defaults reproduce the reference world: 0.25 m voxels, 25 km river
//! regions, elevation bounded to ±2048 m.

use serde::{Deserialize, Serialize};

use crate::biomes::BiomeTable;
use crate::carving::CarvingParams;
use crate::error::{Result, WorldGenError};
use crate::rivers::RiverParams;
use crate::terrain::TerrainParams;

/// Full configuration of a world generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Meters per world unit
    pub voxel_scale: f64,
    /// Side length of a river region in world units
    pub region_size: f64,
    /// Hard elevation bound in meters (elevation stays in ±bound)
    pub elevation_bound: f64,
    pub terrain: TerrainParams,
    pub rivers: RiverParams,
    pub carving: CarvingParams,
    pub biomes: BiomeTable,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            voxel_scale: 0.25,
            region_size: 25_000.0,
            elevation_bound: 2_048.0,
            terrain: TerrainParams::default(),
            rivers: RiverParams::default(),
            carving: CarvingParams::default(),
            biomes: BiomeTable::default(),
        }
    }
}

impl GeneratorConfig {
    /// Validate the configuration. Construction refuses invalid configs
    /// outright; queries never re-check.
    pub fn validate(&self) -> Result<()> {
        if !(self.region_size > 0.0) {
            return Err(WorldGenError::InvalidRegionSize(self.region_size));
        }
        if !(self.voxel_scale > 0.0) {
            return Err(WorldGenError::InvalidVoxelScale(self.voxel_scale));
        }
        if !(self.elevation_bound > 0.0) {
            return Err(WorldGenError::InvalidElevationBound(self.elevation_bound));
        }
        if self.biomes.bands.is_empty() {
            return Err(WorldGenError::EmptyBiomeTable);
        }
        Ok(())
    }
}
