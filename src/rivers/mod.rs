//! Regionally partitioned, lazily cached river networks.
//!
//! The world is divided into fixed-size square regions. Each region's
//! network is generated at most once per generator, on first touch, through
//! a once-per-key initializer; every caller observes the identical cached
//! network. Point queries consult the containing region and its eight
//! neighbors, which is sufficient because a channel never extends more than
//! one region width past its owner.

pub mod network;
pub mod params;

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::climate::ClimateModel;
use crate::noise::NoiseField;
use crate::seeds::WorldSeeds;
use crate::terrain::TerrainSynthesizer;

pub use network::{Channel, ChannelSample, RiverNetwork};
pub use params::RiverParams;

/// Identifier of one square region: `floor(coord / region_size)` per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionKey {
    pub x: i64,
    pub z: i64,
}

/// Result of a river point query.
///
/// When `has_river` is false, width, depth, and flow are all exactly zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiverQuery {
    pub has_river: bool,
    /// Channel width in meters
    pub width: f64,
    /// Channel depth in meters
    pub depth: f64,
    /// Accumulated flow at the nearest channel point
    pub flow: f64,
}

impl RiverQuery {
    /// The no-river result.
    pub fn none() -> Self {
        Self {
            has_river: false,
            width: 0.0,
            depth: 0.0,
            flow: 0.0,
        }
    }
}

/// Lazily generated, cached river networks keyed by region.
pub struct RegionalRiverNetwork {
    seeds: WorldSeeds,
    meander: NoiseField,
    params: RiverParams,
    region_size: f64,
    voxel_scale: f64,
    cache: DashMap<RegionKey, Arc<RiverNetwork>>,
}

impl RegionalRiverNetwork {
    pub fn new(seeds: WorldSeeds, params: RiverParams, region_size: f64, voxel_scale: f64) -> Self {
        Self {
            seeds,
            meander: NoiseField::new(seeds.rivers),
            params,
            region_size,
            voxel_scale,
            cache: DashMap::new(),
        }
    }

    pub fn params(&self) -> &RiverParams {
        &self.params
    }

    /// Region containing (x, z).
    pub fn region_of(&self, x: f64, z: f64) -> RegionKey {
        RegionKey {
            x: (x / self.region_size).floor() as i64,
            z: (z / self.region_size).floor() as i64,
        }
    }

    /// The cached network for a region, generating it on first touch.
    ///
    /// Generation runs at most once per key even under concurrent callers;
    /// everyone gets the same immutable network.
    pub fn network(
        &self,
        key: RegionKey,
        terrain: &TerrainSynthesizer,
        climate: &ClimateModel,
    ) -> Arc<RiverNetwork> {
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        self.cache
            .entry(key)
            .or_insert_with(|| {
                let net = network::generate_region(
                    key,
                    self.region_size,
                    self.seeds.rivers,
                    &self.meander,
                    terrain,
                    climate,
                    &self.params,
                );
                debug!(
                    "generated river network for region ({}, {}): {} channels",
                    key.x,
                    key.z,
                    net.channels().len()
                );
                Arc::new(net)
            })
            .clone()
    }

    /// River state at (x, z): nearest channel sample within the lateral
    /// tolerance, interpolated along the channel.
    pub fn query_point(
        &self,
        x: f64,
        z: f64,
        terrain: &TerrainSynthesizer,
        climate: &ClimateModel,
    ) -> RiverQuery {
        let center = self.region_of(x, z);

        let mut best: Option<(f64, Arc<RiverNetwork>, u32, u32)> = None;

        for dx in -1..=1 {
            for dz in -1..=1 {
                let key = RegionKey {
                    x: center.x + dx,
                    z: center.z + dz,
                };
                let net = self.network(key, terrain, climate);
                if net.is_empty() {
                    continue;
                }

                // The search must reach any sample whose channel could still
                // cover the query point, plus half a step of slack for the
                // along-channel sampling distance.
                let radius = self
                    .params
                    .query_tolerance
                    .max(net.max_width() * 0.5 / self.voxel_scale)
                    + self.params.trace_step;

                if let Some((dist_sq, ci, si)) = net.nearest_sample(x, z, radius) {
                    if best.as_ref().is_none_or(|(b, _, _, _)| dist_sq < *b) {
                        best = Some((dist_sq, net.clone(), ci, si));
                    }
                }
            }
        }

        let Some((_, net, ci, si)) = best else {
            return RiverQuery::none();
        };

        let (lateral, flow, width, depth) = interpolate_along_channel(&net, ci, si, x, z);

        // Inside the channel itself, or within the configured tolerance.
        let tolerance = self
            .params
            .query_tolerance
            .max(width * 0.5 / self.voxel_scale);

        if lateral <= tolerance {
            RiverQuery {
                has_river: true,
                width,
                depth,
                flow,
            }
        } else {
            RiverQuery::none()
        }
    }
}

/// Interpolate flow/width/depth at the projection of (x, z) onto the
/// channel segments adjacent to the nearest sample. Returns the lateral
/// distance to the channel centerline and the interpolated values.
fn interpolate_along_channel(
    net: &RiverNetwork,
    channel: u32,
    sample: u32,
    x: f64,
    z: f64,
) -> (f64, f64, f64, f64) {
    let samples = &net.channels()[channel as usize].samples;
    let si = sample as usize;
    let s = &samples[si];

    let mut lateral = ((s.x - x).powi(2) + (s.z - z).powi(2)).sqrt();
    let mut flow = s.flow;
    let mut width = s.width;
    let mut depth = s.depth;

    let mut consider = |a: &network::ChannelSample, b: &network::ChannelSample| {
        let seg_x = b.x - a.x;
        let seg_z = b.z - a.z;
        let len_sq = seg_x * seg_x + seg_z * seg_z;
        if len_sq <= f64::EPSILON {
            return;
        }
        let t = (((x - a.x) * seg_x + (z - a.z) * seg_z) / len_sq).clamp(0.0, 1.0);
        let px = a.x + seg_x * t;
        let pz = a.z + seg_z * t;
        let dist = ((px - x).powi(2) + (pz - z).powi(2)).sqrt();
        if dist < lateral {
            lateral = dist;
            flow = a.flow + (b.flow - a.flow) * t;
            width = a.width + (b.width - a.width) * t;
            depth = a.depth + (b.depth - a.depth) * t;
        }
    };

    if si > 0 {
        consider(&samples[si - 1], &samples[si]);
    }
    if si + 1 < samples.len() {
        consider(&samples[si], &samples[si + 1]);
    }

    (lateral, flow, width, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainParams;

    fn setup(master: u64) -> (RegionalRiverNetwork, TerrainSynthesizer, ClimateModel) {
        let seeds = WorldSeeds::from_master(master);
        let terrain = TerrainSynthesizer::new(&seeds, TerrainParams::default(), 0.25);
        let climate = ClimateModel::new(&seeds, 0.25);
        let params = RiverParams {
            source_spacing: 2_500.0,
            max_trace_steps: 400,
            ..RiverParams::default()
        };
        let rivers = RegionalRiverNetwork::new(seeds, params, 25_000.0, 0.25);
        (rivers, terrain, climate)
    }

    #[test]
    fn test_region_of_matches_floor_division() {
        let (rivers, _, _) = setup(1);
        assert_eq!(rivers.region_of(0.0, 0.0), RegionKey { x: 0, z: 0 });
        assert_eq!(rivers.region_of(24_999.0, 24_999.0), RegionKey { x: 0, z: 0 });
        assert_eq!(rivers.region_of(25_000.0, 25_000.0), RegionKey { x: 1, z: 1 });
        assert_eq!(rivers.region_of(-0.5, -25_000.5), RegionKey { x: -1, z: -2 });
    }

    #[test]
    fn test_cached_network_is_reused() {
        let (rivers, terrain, climate) = setup(12345);
        let key = RegionKey { x: 0, z: 0 };

        let a = rivers.network(key, &terrain, &climate);
        let b = rivers.network(key, &terrain, &climate);
        assert!(Arc::ptr_eq(&a, &b), "second lookup must hit the cache");
    }

    #[test]
    fn test_query_on_channel_sample_reports_river() {
        let (rivers, terrain, climate) = setup(12345);

        // Find any channel in a 3x3 region block and query its samples.
        let mut checked = 0;
        for rx in -1..=1 {
            for rz in -1..=1 {
                let net = rivers.network(RegionKey { x: rx, z: rz }, &terrain, &climate);
                for channel in net.channels() {
                    for s in channel.samples.iter().step_by(25) {
                        let q = rivers.query_point(s.x, s.z, &terrain, &climate);
                        assert!(q.has_river, "no river reported on a channel sample");
                        assert!(q.flow > 0.0);
                        assert!(q.width > 0.0);
                        assert!(q.depth > 0.0);
                        checked += 1;
                    }
                }
            }
        }
        // The world is seeded so that rivers exist somewhere in this block;
        // if this starts failing the admission defaults changed.
        assert!(checked > 0, "no channels generated in any test region");
    }

    #[test]
    fn test_query_away_from_channels_is_dry() {
        let (rivers, terrain, climate) = setup(12345);

        // Channels cover a thin fraction of any area this size; some of
        // these points must be dry, and every dry result is all zeros.
        let mut found_dry = false;
        for i in 0..50 {
            for j in 0..50 {
                let x = i as f64 * 1_000.0 + 500.0;
                let z = j as f64 * 1_000.0 + 500.0;
                let q = rivers.query_point(x, z, &terrain, &climate);
                if !q.has_river {
                    assert_eq!(q.width, 0.0);
                    assert_eq!(q.depth, 0.0);
                    assert_eq!(q.flow, 0.0);
                    found_dry = true;
                }
            }
        }
        assert!(found_dry, "no dry point in a 50 km sweep");
    }
}
