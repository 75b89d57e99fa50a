//! River network generation parameters and configuration

use serde::{Deserialize, Serialize};

/// Tunable parameters for regional river network generation.
///
/// Source admission, trace mechanics, and channel dimension growth are all
/// configuration; the defaults reproduce the reference network density.
/// Distances are in world units, elevations in meters, precipitation in
/// mm/yr.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiverParams {
    // =========================================================================
    // Source Admission
    // =========================================================================
    /// Spacing of the candidate source grid within a region
    pub source_spacing: f64,

    /// Per-cell jitter applied to candidate positions, as a fraction of the
    /// spacing (0.0 keeps candidates exactly on the grid)
    pub source_jitter: f64,

    /// Minimum elevation for a plausible source (meters)
    pub source_min_elevation: f64,

    /// Maximum elevation for a plausible source (meters)
    pub source_max_elevation: f64,

    /// Minimum annual precipitation for a source (mm/yr)
    pub source_min_precipitation: f64,

    // =========================================================================
    // Tracing
    // =========================================================================
    /// Flow carried by a channel at its source
    pub source_flow: f64,

    /// Flow gained per trace step before precipitation scaling
    pub flow_per_step: f64,

    /// Distance covered by one descent step
    pub trace_step: f64,

    /// Hard bound on steps per channel
    pub max_trace_steps: usize,

    /// A trace within this distance of an existing channel merges into it
    pub merge_radius: f64,

    /// Maximum meander deflection angle (radians) applied to the descent
    /// direction
    pub meander_strength: f64,

    // =========================================================================
    // Channel Dimensions
    // =========================================================================
    /// Width (meters) = width_scale * flow ^ width_exponent
    pub width_scale: f64,
    pub width_exponent: f64,

    /// Depth (meters) = depth_scale * flow ^ depth_exponent
    pub depth_scale: f64,
    pub depth_exponent: f64,

    // =========================================================================
    // Queries
    // =========================================================================
    /// Minimum lateral tolerance for point queries; the effective tolerance
    /// is the larger of this and the channel's half width
    pub query_tolerance: f64,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            source_spacing: 500.0,
            source_jitter: 0.0,
            source_min_elevation: 20.0,
            source_max_elevation: 1_500.0,
            source_min_precipitation: 400.0,
            source_flow: 1.0,
            flow_per_step: 0.05,
            trace_step: 40.0,
            max_trace_steps: 2_000,
            merge_radius: 30.0,
            meander_strength: 0.35,
            width_scale: 6.0,
            width_exponent: 0.5,
            depth_scale: 1.2,
            depth_exponent: 0.4,
            query_tolerance: 25.0,
        }
    }
}
