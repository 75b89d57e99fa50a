//! Traced river channels and per-region network generation.
//!
//! A region's network is generated in one deterministic pass: candidate
//! sources are sampled on a fixed grid, admitted by elevation band and
//! precipitation threshold, then traced downhill by steepest-descent
//! stepping with a small meander deflection. A trace ends when it reaches
//! water, a local minimum, the bounded continuation limit past the owning
//! region, or merges into an already-traced channel, where its flow is
//! added to everything downstream of the merge point.

use std::collections::HashMap;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::climate::ClimateModel;
use crate::noise::NoiseField;
use crate::rivers::params::RiverParams;
use crate::rivers::RegionKey;
use crate::terrain::TerrainSynthesizer;

/// Sea level in meters; traces terminate on reaching water.
const SEA_LEVEL: f64 = 0.0;

/// Spatial index cell size in world units.
const INDEX_CELL: f64 = 256.0;

/// Wavelength of the meander deflection noise (world units).
const MEANDER_WAVELENGTH: f64 = 900.0;

/// Direction table for steepest-descent stepping (8 compass directions).
const DX: [f64; 8] = [0.0, 1.0, 1.0, 1.0, 0.0, -1.0, -1.0, -1.0];
const DZ: [f64; 8] = [-1.0, -1.0, 0.0, 1.0, 1.0, 1.0, 0.0, -1.0];

/// One point along a traced channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSample {
    /// Position in world units
    pub x: f64,
    pub z: f64,
    /// Accumulated flow at this point
    pub flow: f64,
    /// Channel width in meters
    pub width: f64,
    /// Channel depth in meters
    pub depth: f64,
}

/// An ordered path of samples from source to terminus or merge point.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub samples: Vec<ChannelSample>,
}

/// The immutable river network of one region.
///
/// Channels may extend up to one region width past the owning region's
/// boundary; that continuation is the exit state neighbors consult, so
/// accumulated flow never resets at a boundary.
#[derive(Clone, Debug, Default)]
pub struct RiverNetwork {
    channels: Vec<Channel>,
    index: HashMap<(i64, i64), Vec<(u32, u32)>>,
    max_width: f64,
}

impl RiverNetwork {
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Widest channel sample in this network, in meters.
    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    pub fn sample(&self, channel: u32, index: u32) -> &ChannelSample {
        &self.channels[channel as usize].samples[index as usize]
    }

    /// Nearest channel sample within `radius` of (x, z), as
    /// (squared distance, channel index, sample index).
    pub fn nearest_sample(&self, x: f64, z: f64, radius: f64) -> Option<(f64, u32, u32)> {
        let min_cx = ((x - radius) / INDEX_CELL).floor() as i64;
        let max_cx = ((x + radius) / INDEX_CELL).floor() as i64;
        let min_cz = ((z - radius) / INDEX_CELL).floor() as i64;
        let max_cz = ((z + radius) / INDEX_CELL).floor() as i64;

        let radius_sq = radius * radius;
        let mut best: Option<(f64, u32, u32)> = None;

        for cx in min_cx..=max_cx {
            for cz in min_cz..=max_cz {
                let Some(entries) = self.index.get(&(cx, cz)) else {
                    continue;
                };
                for &(ci, si) in entries {
                    let s = self.sample(ci, si);
                    let dx = s.x - x;
                    let dz = s.z - z;
                    let dist_sq = dx * dx + dz * dz;
                    if dist_sq <= radius_sq && best.is_none_or(|(b, _, _)| dist_sq < b) {
                        best = Some((dist_sq, ci, si));
                    }
                }
            }
        }

        best
    }
}

fn index_cell(x: f64, z: f64) -> (i64, i64) {
    ((x / INDEX_CELL).floor() as i64, (z / INDEX_CELL).floor() as i64)
}

/// In-progress channel during generation; merge targets are resolved while
/// flows are still mutable.
struct TracedChannel {
    samples: Vec<(f64, f64, f64)>,
    /// Channel and sample index this trace merged into, if any
    merge_target: Option<(usize, usize)>,
}

/// Generate the river network for one region. Pure function of its inputs:
/// the same (seed, region, config) always produces a bit-identical network.
pub(crate) fn generate_region(
    key: RegionKey,
    region_size: f64,
    rivers_seed: u64,
    meander: &NoiseField,
    terrain: &TerrainSynthesizer,
    climate: &ClimateModel,
    params: &RiverParams,
) -> RiverNetwork {
    let origin_x = key.x as f64 * region_size;
    let origin_z = key.z as f64 * region_size;

    // Bounded continuation: traces may run one region width past the owner.
    let min_x = origin_x - region_size;
    let max_x = origin_x + 2.0 * region_size;
    let min_z = origin_z - region_size;
    let max_z = origin_z + 2.0 * region_size;

    let sources = collect_sources(key, region_size, rivers_seed, terrain, climate, params);

    let mut channels: Vec<TracedChannel> = Vec::new();
    let mut index: HashMap<(i64, i64), Vec<(u32, u32)>> = HashMap::new();

    for (sx, sz, precipitation) in &sources {
        let trace = trace_channel(
            *sx,
            *sz,
            *precipitation,
            (min_x, max_x, min_z, max_z),
            meander,
            terrain,
            params,
            &channels,
            &index,
        );

        if trace.samples.is_empty() {
            continue;
        }

        // Merged flow joins everything downstream, following the chain of
        // earlier merges so confluences of confluences still add up.
        if let Some((target, at)) = trace.merge_target {
            let joining = trace.samples.last().map(|&(_, _, f)| f).unwrap_or(0.0);
            let mut next = Some((target, at));
            while let Some((ci, si)) = next {
                for sample in &mut channels[ci].samples[si..] {
                    sample.2 += joining;
                }
                next = channels[ci].merge_target;
            }
        }

        let channel_id = channels.len() as u32;
        for (si, &(x, z, _)) in trace.samples.iter().enumerate() {
            index
                .entry(index_cell(x, z))
                .or_default()
                .push((channel_id, si as u32));
        }
        channels.push(trace);
    }

    // Flows are final; derive widths and depths per sample.
    let mut max_width = 0.0f64;
    let channels = channels
        .into_iter()
        .map(|traced| Channel {
            samples: traced
                .samples
                .into_iter()
                .map(|(x, z, flow)| {
                    let width = params.width_scale * flow.powf(params.width_exponent);
                    let depth = params.depth_scale * flow.powf(params.depth_exponent);
                    max_width = max_width.max(width);
                    ChannelSample {
                        x,
                        z,
                        flow,
                        width,
                        depth,
                    }
                })
                .collect(),
        })
        .collect();

    RiverNetwork {
        channels,
        index,
        max_width,
    }
}

/// Candidate sources on the region's grid that pass the elevation band and
/// precipitation threshold, in deterministic grid order.
fn collect_sources(
    key: RegionKey,
    region_size: f64,
    rivers_seed: u64,
    terrain: &TerrainSynthesizer,
    climate: &ClimateModel,
    params: &RiverParams,
) -> Vec<(f64, f64, f64)> {
    let origin_x = key.x as f64 * region_size;
    let origin_z = key.z as f64 * region_size;
    let cells = (region_size / params.source_spacing).floor().max(1.0) as i64;

    let mut sources = Vec::new();

    for i in 0..cells {
        for j in 0..cells {
            let mut x = origin_x + (i as f64 + 0.5) * params.source_spacing;
            let mut z = origin_z + (j as f64 + 0.5) * params.source_spacing;

            if params.source_jitter > 0.0 {
                let gx = key.x * cells + i;
                let gz = key.z * cells + j;
                let cell_seed = rivers_seed ^ (((gx as u64) << 32) | (gz as u32 as u64));
                let mut rng = ChaCha8Rng::seed_from_u64(cell_seed);
                let amplitude = params.source_jitter * params.source_spacing;
                x += (rng.gen::<f64>() - 0.5) * amplitude;
                z += (rng.gen::<f64>() - 0.5) * amplitude;
            }

            let elevation = terrain.elevation(x, z);
            if elevation < params.source_min_elevation || elevation > params.source_max_elevation {
                continue;
            }

            let sample = climate.sample(x, z, elevation);
            if sample.precipitation <= params.source_min_precipitation {
                continue;
            }

            sources.push((x, z, sample.precipitation));
        }
    }

    sources
}

/// Trace one channel downhill from a source.
#[allow(clippy::too_many_arguments)]
fn trace_channel(
    source_x: f64,
    source_z: f64,
    precipitation: f64,
    (min_x, max_x, min_z, max_z): (f64, f64, f64, f64),
    meander: &NoiseField,
    terrain: &TerrainSynthesizer,
    params: &RiverParams,
    channels: &[TracedChannel],
    index: &HashMap<(i64, i64), Vec<(u32, u32)>>,
) -> TracedChannel {
    let mut samples = Vec::new();
    let mut merge_target = None;

    let mut x = source_x;
    let mut z = source_z;
    let mut elevation = terrain.elevation(x, z);
    let mut flow = params.source_flow;

    // Wetter catchments gather flow faster along the trace.
    let gain = params.flow_per_step * (precipitation / 1_000.0).clamp(0.25, 2.0);

    for _ in 0..params.max_trace_steps {
        samples.push((x, z, flow));

        if elevation <= SEA_LEVEL {
            break;
        }

        // Steepest descent over the 8 compass directions.
        let mut best: Option<(f64, f64, f64)> = None;
        for dir in 0..8 {
            let len = (DX[dir] * DX[dir] + DZ[dir] * DZ[dir]).sqrt();
            let nx = x + DX[dir] / len * params.trace_step;
            let nz = z + DZ[dir] / len * params.trace_step;
            let ne = terrain.elevation(nx, nz);
            if best.is_none_or(|(_, _, be)| ne < be) {
                best = Some((nx, nz, ne));
            }
        }
        let Some((bx, bz, be)) = best else { break };

        // Local minimum: nowhere lower to go.
        if be >= elevation {
            break;
        }

        // Deflect the descent direction for natural meandering, but never
        // accept an uphill step.
        let angle = meander.fractal(
            x / MEANDER_WAVELENGTH,
            z / MEANDER_WAVELENGTH,
            3,
            0.5,
            2.0,
        ) * params.meander_strength;
        let (dx, dz) = (bx - x, bz - z);
        let (cos_a, sin_a) = (angle.cos(), angle.sin());
        let mx = x + dx * cos_a - dz * sin_a;
        let mz = z + dx * sin_a + dz * cos_a;
        let me = terrain.elevation(mx, mz);

        let (nx, nz, ne) = if me < elevation { (mx, mz, me) } else { (bx, bz, be) };

        // Bounded continuation past the owning region.
        if nx < min_x || nx > max_x || nz < min_z || nz > max_z {
            break;
        }

        // Merge into an already-traced channel when close enough; the flow
        // carried by the last sample joins the target downstream.
        if let Some((ci, si)) = nearest_traced(channels, index, nx, nz, params.merge_radius) {
            merge_target = Some((ci, si));
            break;
        }

        x = nx;
        z = nz;
        elevation = ne;
        flow += gain;
    }

    TracedChannel {
        samples,
        merge_target,
    }
}

/// Nearest existing sample within `radius` during generation.
fn nearest_traced(
    channels: &[TracedChannel],
    index: &HashMap<(i64, i64), Vec<(u32, u32)>>,
    x: f64,
    z: f64,
    radius: f64,
) -> Option<(usize, usize)> {
    let min_cx = ((x - radius) / INDEX_CELL).floor() as i64;
    let max_cx = ((x + radius) / INDEX_CELL).floor() as i64;
    let min_cz = ((z - radius) / INDEX_CELL).floor() as i64;
    let max_cz = ((z + radius) / INDEX_CELL).floor() as i64;

    let radius_sq = radius * radius;
    let mut best: Option<(f64, usize, usize)> = None;

    for cx in min_cx..=max_cx {
        for cz in min_cz..=max_cz {
            let Some(entries) = index.get(&(cx, cz)) else {
                continue;
            };
            for &(ci, si) in entries {
                let (sx, sz, _) = channels[ci as usize].samples[si as usize];
                let dx = sx - x;
                let dz = sz - z;
                let dist_sq = dx * dx + dz * dz;
                if dist_sq <= radius_sq && best.is_none_or(|(b, _, _)| dist_sq < b) {
                    best = Some((dist_sq, ci as usize, si as usize));
                }
            }
        }
    }

    best.map(|(_, ci, si)| (ci, si))
}
