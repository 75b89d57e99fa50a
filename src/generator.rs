//! The world generator facade.
//!
//! `WorldGenerator` is the single public query surface: it owns the seed
//! table, the noise layers, the climate model, and the region cache, and
//! exposes every query in a point form and a batch form. Batch forms are
//! the element-wise application of the point form over parallel coordinate
//! slices; there is no separate batch algorithm that could drift, only a
//! parallel map over the same function.

use log::info;
use rayon::prelude::*;

use crate::biomes::Biome;
use crate::carving;
use crate::climate::{ClimateModel, ClimateSample};
use crate::config::GeneratorConfig;
use crate::error::{Result, WorldGenError};
use crate::rivers::{RegionalRiverNetwork, RegionKey, RiverNetwork, RiverQuery};
use crate::seeds::WorldSeeds;
use crate::terrain::{ElevationSample, TerrainSynthesizer};

/// Coordinates beyond this magnitude clamp to it; NaN becomes the origin.
/// Keeps every query total without letting non-finite input poison a batch.
const COORDINATE_LIMIT: f64 = 1.0e12;

/// Deterministic world generation engine for one seed.
///
/// Every query is a pure function of (seed, coordinate) plus read-only
/// cached structures, so a generator is freely shared across threads.
pub struct WorldGenerator {
    seeds: WorldSeeds,
    config: GeneratorConfig,
    terrain: TerrainSynthesizer,
    climate: ClimateModel,
    rivers: RegionalRiverNetwork,
}

impl WorldGenerator {
    /// Create a generator with the default configuration.
    pub fn new(seed: u64) -> Result<Self> {
        Self::with_config(seed, GeneratorConfig::default())
    }

    /// Create a generator with an explicit configuration. Invalid
    /// configuration fails here, never later.
    pub fn with_config(seed: u64, config: GeneratorConfig) -> Result<Self> {
        Self::from_seeds(WorldSeeds::from_master(seed), config)
    }

    /// Create a generator from explicit layer seeds.
    pub fn from_seeds(seeds: WorldSeeds, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        check_layer_collisions(&seeds)?;

        let terrain = TerrainSynthesizer::new(&seeds, config.terrain, config.voxel_scale);
        let climate = ClimateModel::new(&seeds, config.voxel_scale);
        let rivers = RegionalRiverNetwork::new(
            seeds,
            config.rivers,
            config.region_size,
            config.voxel_scale,
        );

        info!("initialized world generator with master seed {}", seeds.master);

        Ok(Self {
            seeds,
            config,
            terrain,
            climate,
            rivers,
        })
    }

    pub fn seeds(&self) -> &WorldSeeds {
        &self.seeds
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    // =========================================================================
    // Point Queries
    // =========================================================================

    /// Base terrain elevation in meters.
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let (x, z) = sanitize(x, z);
        self.terrain.elevation(x, z)
    }

    /// Per-layer elevation contributions plus the combined value.
    pub fn elevation_sample(&self, x: f64, z: f64) -> ElevationSample {
        let (x, z) = sanitize(x, z);
        self.terrain.sample(x, z)
    }

    /// Terrain elevation with river channels carved in. Never exceeds the
    /// base elevation.
    pub fn elevation_with_rivers(&self, x: f64, z: f64) -> f64 {
        let (x, z) = sanitize(x, z);
        let base = self.terrain.elevation(x, z);
        let river = self.rivers.query_point(x, z, &self.terrain, &self.climate);
        carving::carved_elevation(base, &river, &self.config.carving, self.config.elevation_bound)
    }

    /// Temperature and precipitation at the base terrain elevation.
    pub fn climate(&self, x: f64, z: f64) -> ClimateSample {
        let (x, z) = sanitize(x, z);
        let elevation = self.terrain.elevation(x, z);
        self.climate.sample(x, z, elevation)
    }

    /// River state at (x, z).
    pub fn river(&self, x: f64, z: f64) -> RiverQuery {
        let (x, z) = sanitize(x, z);
        self.rivers.query_point(x, z, &self.terrain, &self.climate)
    }

    /// Biome classification from climate and base elevation.
    pub fn biome(&self, x: f64, z: f64) -> Biome {
        let (x, z) = sanitize(x, z);
        let elevation = self.terrain.elevation(x, z);
        let climate = self.climate.sample(x, z, elevation);
        self.config
            .biomes
            .classify(elevation, climate.temperature, climate.precipitation)
    }

    /// Region containing (x, z); exposes the cache partition so consumers
    /// can prefetch.
    pub fn region_of(&self, x: f64, z: f64) -> (i64, i64) {
        let (x, z) = sanitize(x, z);
        let key = self.rivers.region_of(x, z);
        (key.x, key.z)
    }

    /// The cached river network of a region, generating it on first touch.
    pub fn river_network(&self, region_x: i64, region_z: i64) -> std::sync::Arc<RiverNetwork> {
        let key = RegionKey {
            x: region_x,
            z: region_z,
        };
        self.rivers.network(key, &self.terrain, &self.climate)
    }

    // =========================================================================
    // Batch Queries
    // =========================================================================

    /// Element-wise parallel map of a point query over coordinate slices.
    fn batch<T, F>(&self, xs: &[f64], zs: &[f64], query: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(f64, f64) -> T + Sync,
    {
        if xs.len() != zs.len() {
            return Err(WorldGenError::BatchLengthMismatch {
                xs: xs.len(),
                zs: zs.len(),
            });
        }

        Ok(xs
            .par_iter()
            .zip(zs.par_iter())
            .map(|(&x, &z)| query(x, z))
            .collect())
    }

    pub fn elevation_batch(&self, xs: &[f64], zs: &[f64]) -> Result<Vec<f64>> {
        self.batch(xs, zs, |x, z| self.elevation(x, z))
    }

    pub fn elevation_with_rivers_batch(&self, xs: &[f64], zs: &[f64]) -> Result<Vec<f64>> {
        self.batch(xs, zs, |x, z| self.elevation_with_rivers(x, z))
    }

    pub fn climate_batch(&self, xs: &[f64], zs: &[f64]) -> Result<Vec<ClimateSample>> {
        self.batch(xs, zs, |x, z| self.climate(x, z))
    }

    pub fn river_batch(&self, xs: &[f64], zs: &[f64]) -> Result<Vec<RiverQuery>> {
        self.batch(xs, zs, |x, z| self.river(x, z))
    }

    pub fn biome_batch(&self, xs: &[f64], zs: &[f64]) -> Result<Vec<Biome>> {
        self.batch(xs, zs, |x, z| self.biome(x, z))
    }
}

/// Clamp non-finite coordinates into the representable domain. NaN maps to
/// the origin; infinities clamp to the coordinate limit.
fn sanitize(x: f64, z: f64) -> (f64, f64) {
    let fix = |v: f64| {
        if v.is_nan() {
            0.0
        } else {
            v.clamp(-COORDINATE_LIMIT, COORDINATE_LIMIT)
        }
    };
    (fix(x), fix(z))
}

/// Distinct layer names must yield distinct seeds; a collision is a
/// configuration defect, not something to paper over at query time.
fn check_layer_collisions(seeds: &WorldSeeds) -> Result<()> {
    let layers = seeds.layers();
    for (i, &(name_a, seed_a)) in layers.iter().enumerate() {
        for &(name_b, seed_b) in &layers[i + 1..] {
            if seed_a == seed_b {
                return Err(WorldGenError::SubseedCollision(name_a, name_b));
            }
        }
    }
    Ok(())
}
