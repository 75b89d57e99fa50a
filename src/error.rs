//! Error types for generator construction and batch queries.

/// Errors produced by the world generation engine.
///
/// Configuration errors are fatal at construction time: a generator with an
/// invalid configuration is never built. Batch queries only fail when the
/// parallel coordinate arrays disagree in length; per-coordinate numeric
/// edge cases degrade by clamping instead of failing the batch.
#[derive(Debug, thiserror::Error)]
pub enum WorldGenError {
    #[error("region size must be positive, got {0}")]
    InvalidRegionSize(f64),

    #[error("voxel scale must be positive, got {0}")]
    InvalidVoxelScale(f64),

    #[error("elevation bound must be positive, got {0}")]
    InvalidElevationBound(f64),

    #[error("biome band table is empty")]
    EmptyBiomeTable,

    #[error("sub-seed collision between noise layers '{0}' and '{1}'")]
    SubseedCollision(&'static str, &'static str),

    #[error("batch arrays must have the same length: {xs} x-coordinates, {zs} z-coordinates")]
    BatchLengthMismatch { xs: usize, zs: usize },
}

pub type Result<T> = std::result::Result<T, WorldGenError>;
