//! River carving: lowering terrain where channels run.
//!
//! Carve depth grows with the channel's depth and width and is capped so a
//! large river can never invert the surrounding terrain. Away from rivers
//! the carve depth is exactly zero, so carved and base elevation agree
//! everywhere water does not flow.

use serde::{Deserialize, Serialize};

use crate::rivers::RiverQuery;

/// Parameters for terrain carving around rivers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarvingParams {
    /// Extra carve depth per meter of channel width
    pub width_factor: f64,
    /// Hard cap on carve depth (meters)
    pub max_carve_depth: f64,
}

impl Default for CarvingParams {
    fn default() -> Self {
        Self {
            width_factor: 0.1,
            max_carve_depth: 15.0,
        }
    }
}

/// Depth to carve for a river query result, in meters. Zero without a river.
pub fn carve_depth(river: &RiverQuery, params: &CarvingParams) -> f64 {
    if !river.has_river {
        return 0.0;
    }
    (river.depth + river.width * params.width_factor).min(params.max_carve_depth)
}

/// Base elevation with the river channel carved in, re-clamped to the world
/// elevation bound.
pub fn carved_elevation(
    base_meters: f64,
    river: &RiverQuery,
    params: &CarvingParams,
    elevation_bound: f64,
) -> f64 {
    (base_meters - carve_depth(river, params)).clamp(-elevation_bound, elevation_bound)
}
