//! Seed management for world generation
//!
//! Provides separate seeds for each noise layer, all derived from a single
//! master seed. Derivation uses an explicit, versioned byte-mixing function
//! rather than the standard library hasher, so a given master seed produces
//! the same world on every machine, in every process, forever.

/// Version tag mixed into every derivation. Bumping this deliberately
/// changes every derived seed, so old worlds can never be reproduced by a
/// generator with different derivation semantics.
const DERIVATION_VERSION: &[u8] = b"worldgen/v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seeds for all world generation layers.
///
/// Each layer gets its own seed, derived from the master by default.
/// Individual seeds can be overridden for experimentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Continental landmass shape (largest terrain wavelength)
    pub continental: u64,
    /// Mountain ridges and valleys
    pub mountain: u64,
    /// Rolling hills
    pub hill: u64,
    /// Fine surface detail
    pub detail: u64,
    /// Temperature variation
    pub temperature: u64,
    /// Precipitation patterns
    pub precipitation: u64,
    /// River source placement and tracing
    pub rivers: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all layer seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            continental: subseed(master, "continental"),
            mountain: subseed(master, "mountain"),
            hill: subseed(master, "hill"),
            detail: subseed(master, "detail"),
            temperature: subseed(master, "temperature"),
            precipitation: subseed(master, "precipitation"),
            rivers: subseed(master, "rivers"),
        }
    }

    /// Create a builder for customizing individual layer seeds.
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }

    /// All named layers with their seeds, in declaration order.
    pub fn layers(&self) -> [(&'static str, u64); 7] {
        [
            ("continental", self.continental),
            ("mountain", self.mountain),
            ("hill", self.hill),
            ("detail", self.detail),
            ("temperature", self.temperature),
            ("precipitation", self.precipitation),
            ("rivers", self.rivers),
        ]
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    /// Override the continental seed
    pub fn continental(mut self, seed: u64) -> Self {
        self.seeds.continental = seed;
        self
    }

    /// Override the mountain seed
    pub fn mountain(mut self, seed: u64) -> Self {
        self.seeds.mountain = seed;
        self
    }

    /// Override the hill seed
    pub fn hill(mut self, seed: u64) -> Self {
        self.seeds.hill = seed;
        self
    }

    /// Override the detail seed
    pub fn detail(mut self, seed: u64) -> Self {
        self.seeds.detail = seed;
        self
    }

    /// Override the temperature seed
    pub fn temperature(mut self, seed: u64) -> Self {
        self.seeds.temperature = seed;
        self
    }

    /// Override the precipitation seed
    pub fn precipitation(mut self, seed: u64) -> Self {
        self.seeds.precipitation = seed;
        self
    }

    /// Override the rivers seed
    pub fn rivers(mut self, seed: u64) -> Self {
        self.seeds.rivers = seed;
        self
    }

    /// Build the final WorldSeeds
    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a layer seed from a master seed and a layer name.
///
/// FNV-1a over the version tag, the master seed's little-endian bytes, and
/// the name's UTF-8 bytes. Stable across processes, platforms, and
/// languages, unlike `DefaultHasher`.
pub fn subseed(master: u64, name: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in DERIVATION_VERSION
        .iter()
        .chain(master.to_le_bytes().iter())
        .chain(name.as_bytes().iter())
    {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, continental: {}, mountain: {}, hill: {}, \
             detail: {}, temperature: {}, precipitation: {}, rivers: {} }}",
            self.master,
            self.continental,
            self.mountain,
            self.hill,
            self.detail,
            self.temperature,
            self.precipitation,
            self.rivers,
        )
    }
}
