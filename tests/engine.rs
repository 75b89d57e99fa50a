//! End-to-end properties of the world generation engine.
//!
//! These tests exercise the public facade the way external consumers
//! (visualizers, chunk generators) do: construct a generator from a seed,
//! query it point-wise and in batches, and hold it to the engine's
//! cross-cutting guarantees.

use voxel_worldgen::{
    Biome, GeneratorConfig, RiverParams, WorldGenError, WorldGenerator,
};

/// Test configuration: default semantics with a sparser river source grid
/// so region generation stays cheap.
fn test_config() -> GeneratorConfig {
    GeneratorConfig {
        rivers: RiverParams {
            source_spacing: 2_500.0,
            max_trace_steps: 400,
            ..RiverParams::default()
        },
        ..GeneratorConfig::default()
    }
}

fn generator(seed: u64) -> WorldGenerator {
    WorldGenerator::with_config(seed, test_config()).unwrap()
}

#[test]
fn determinism_across_independent_generators() {
    let a = generator(12345);
    let b = generator(12345);

    for i in 0..200 {
        let x = (i as f64 * 977.3) - 90_000.0;
        let z = (i as f64 * 541.7) - 50_000.0;

        assert_eq!(a.elevation(x, z), b.elevation(x, z));
        assert_eq!(a.elevation_sample(x, z), b.elevation_sample(x, z));
        assert_eq!(a.climate(x, z), b.climate(x, z));
        assert_eq!(a.biome(x, z), b.biome(x, z));
    }
}

#[test]
fn different_seeds_produce_different_worlds() {
    let a = generator(1);
    let b = generator(2);

    let mut differing = 0;
    for i in 0..100 {
        let x = i as f64 * 1_313.0;
        let z = i as f64 * 719.0;
        if a.elevation(x, z) != b.elevation(x, z) {
            differing += 1;
        }
    }
    assert!(differing > 90, "seeds barely changed the world");
}

#[test]
fn batch_queries_equal_point_queries_elementwise() {
    let gen = generator(12345);

    // A batch large enough to be chunked across worker threads, with
    // repeated and unordered entries.
    let mut xs = Vec::new();
    let mut zs = Vec::new();
    for i in 0..500 {
        let x = ((i * 7919) % 997) as f64 * 173.0 - 80_000.0;
        let z = ((i * 6271) % 883) as f64 * 251.0 - 60_000.0;
        xs.push(x);
        zs.push(z);
    }
    let repeat_x = xs[..3].to_vec();
    let repeat_z = zs[..3].to_vec();
    xs.extend_from_slice(&repeat_x);
    zs.extend_from_slice(&repeat_z);

    let elevations = gen.elevation_batch(&xs, &zs).unwrap();
    let carved = gen.elevation_with_rivers_batch(&xs, &zs).unwrap();
    let climates = gen.climate_batch(&xs, &zs).unwrap();
    let rivers = gen.river_batch(&xs, &zs).unwrap();
    let biomes = gen.biome_batch(&xs, &zs).unwrap();

    for i in 0..xs.len() {
        let (x, z) = (xs[i], zs[i]);
        assert_eq!(elevations[i], gen.elevation(x, z), "elevation diverged at {}", i);
        assert_eq!(carved[i], gen.elevation_with_rivers(x, z), "carved diverged at {}", i);
        assert_eq!(climates[i], gen.climate(x, z), "climate diverged at {}", i);
        assert_eq!(rivers[i], gen.river(x, z), "river diverged at {}", i);
        assert_eq!(biomes[i], gen.biome(x, z), "biome diverged at {}", i);
    }
}

#[test]
fn elevation_bounded_over_wide_sweep() {
    let gen = generator(424242);

    for i in -100..100 {
        for j in -10..10 {
            let x = i as f64 * 3_141.0;
            let z = j as f64 * 27_182.0;
            let e = gen.elevation(x, z);
            assert!(
                (-2048.0..=2048.0).contains(&e),
                "elevation {} out of bounds at ({}, {})",
                e,
                x,
                z
            );
        }
    }
}

#[test]
fn carving_is_monotonic_everywhere_sampled() {
    let gen = generator(12345);

    for i in -40..40 {
        for j in -8..8 {
            let x = i as f64 * 811.0;
            let z = j as f64 * 2_903.0;
            assert!(
                gen.elevation_with_rivers(x, z) <= gen.elevation(x, z),
                "carving raised terrain at ({}, {})",
                x,
                z
            );
        }
    }
}

#[test]
fn river_query_locality() {
    let gen = generator(12345);

    for i in -80..80 {
        let x = i as f64 * 733.0;
        let z = i as f64 * -419.0;
        let q = gen.river(x, z);
        if q.has_river {
            assert!(q.flow > 0.0, "river with no flow at ({}, {})", x, z);
            assert!(q.width > 0.0, "river with no width at ({}, {})", x, z);
        } else {
            assert_eq!(q.width, 0.0);
            assert_eq!(q.depth, 0.0);
        }
    }
}

#[test]
fn every_river_source_reports_a_river() {
    let gen = generator(12345);

    // The first sample of every traced channel is an admitted source.
    let mut sources = 0;
    for rx in -2..=0 {
        for rz in -2..=0 {
            let net = gen.river_network(rx, rz);
            for channel in net.channels() {
                let s = &channel.samples[0];
                let q = gen.river(s.x, s.z);
                assert!(q.has_river, "source at ({}, {}) reports no river", s.x, s.z);
                assert!(q.flow > 0.0);
                sources += 1;

                // Point and batch paths agree at the source.
                let batch = gen.river_batch(&[s.x], &[s.z]).unwrap();
                assert_eq!(batch[0], q);
            }
        }
    }
    assert!(sources > 0, "no river sources admitted in a 3x3 region block");
}

#[test]
fn region_networks_are_reproducible() {
    let a = generator(12345);
    let b = generator(12345);

    for (rx, rz) in [(-1, -1), (0, 0), (1, -2)] {
        let net_a = a.river_network(rx, rz);
        let net_b = b.river_network(rx, rz);
        assert_eq!(
            net_a.channels(),
            net_b.channels(),
            "region ({}, {}) regenerated differently",
            rx,
            rz
        );
    }
}

#[test]
fn flow_is_continuous_across_region_boundaries() {
    let gen = generator(12345);
    let region_size = gen.config().region_size;
    let max_gain = gen.config().rivers.flow_per_step * 2.0;

    // Find channels whose consecutive samples straddle a region boundary
    // and check the flow difference is at most one accumulation step. A
    // confluence sitting exactly on the boundary legitimately adds the
    // tributary's flow, so pairs with another channel nearby are exempt.
    let confluence_radius = gen.config().rivers.merge_radius + 2.0 * gen.config().rivers.trace_step;
    let mut crossings = 0;
    for rx in -2..=2 {
        for rz in -2..=2 {
            let net = gen.river_network(rx, rz);
            for (ci, channel) in net.channels().iter().enumerate() {
                for pair in channel.samples.windows(2) {
                    let ra = (
                        (pair[0].x / region_size).floor() as i64,
                        (pair[0].z / region_size).floor() as i64,
                    );
                    let rb = (
                        (pair[1].x / region_size).floor() as i64,
                        (pair[1].z / region_size).floor() as i64,
                    );
                    if ra == rb {
                        continue;
                    }
                    let near_confluence = net.channels().iter().enumerate().any(|(cj, other)| {
                        cj != ci
                            && other.samples.iter().any(|s| {
                                let dx = s.x - pair[1].x;
                                let dz = s.z - pair[1].z;
                                (dx * dx + dz * dz).sqrt() <= confluence_radius
                            })
                    });
                    if near_confluence {
                        continue;
                    }
                    let diff = (pair[1].flow - pair[0].flow).abs();
                    assert!(
                        diff <= max_gain + 1e-9,
                        "flow jumped by {} across a region boundary",
                        diff
                    );
                    crossings += 1;
                }
            }
        }
    }
    assert!(crossings > 0, "no channel crossed a region boundary in the sweep");
}

#[test]
fn known_seed_region_has_reproducible_sources() {
    // seed 12345, region (-1, -1): the coordinate (-6250, -6250) sits on
    // the candidate source grid (cell 7, 7 at 2500-unit spacing).
    let gen = generator(12345);

    assert_eq!(gen.region_of(-6_250.0, -6_250.0), (-1, -1));

    let elevation = gen.elevation(-6_250.0, -6_250.0);
    let climate = gen.climate(-6_250.0, -6_250.0);
    let rivers = &gen.config().rivers;

    // Whatever the terrain does at this point, a second generator and the
    // batch path must agree with it bit-for-bit.
    let again = generator(12345);
    assert_eq!(elevation, again.elevation(-6_250.0, -6_250.0));
    let batch = gen.elevation_batch(&[-6_250.0], &[-6_250.0]).unwrap();
    assert_eq!(batch[0], elevation);

    // If the admission band accepts the point, a channel must start there
    // and the river query must see it.
    let admitted = elevation >= rivers.source_min_elevation
        && elevation <= rivers.source_max_elevation
        && climate.precipitation > rivers.source_min_precipitation;
    if admitted {
        let q = gen.river(-6_250.0, -6_250.0);
        assert!(q.has_river, "admitted source did not produce a river");
        assert!(q.flow > 0.0);
    }
}

#[test]
fn deep_water_classifies_as_ocean_regardless_of_climate() {
    let gen = generator(31337);

    // Scan for genuinely submerged terrain and check the short-circuit.
    let mut found = false;
    'outer: for i in -60..60 {
        for j in -6..6 {
            let x = i as f64 * 2_111.0;
            let z = j as f64 * 8_887.0;
            if gen.elevation(x, z) < -50.0 {
                assert_eq!(gen.biome(x, z), Biome::Ocean);
                found = true;
                break 'outer;
            }
        }
    }
    assert!(found, "no sub-ocean terrain in the sweep");
}

#[test]
fn construction_rejects_bad_configuration() {
    let bad_region = GeneratorConfig {
        region_size: 0.0,
        ..GeneratorConfig::default()
    };
    assert!(matches!(
        WorldGenerator::with_config(1, bad_region),
        Err(WorldGenError::InvalidRegionSize(_))
    ));

    let bad_scale = GeneratorConfig {
        voxel_scale: 0.0,
        ..GeneratorConfig::default()
    };
    assert!(WorldGenerator::with_config(1, bad_scale).is_err());
}

#[test]
fn generator_shares_across_threads() {
    use std::sync::Arc;

    let gen = Arc::new(generator(2024));
    let mut handles = Vec::new();

    // All threads race the same uncached region; everyone must observe the
    // identical network and identical query results.
    for _ in 0..4 {
        let gen = gen.clone();
        handles.push(std::thread::spawn(move || {
            let q = gen.river(5_000.0, 5_000.0);
            let e = gen.elevation_with_rivers(5_000.0, 5_000.0);
            (q, e)
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for pair in results.windows(2) {
        assert_eq!(pair[0], pair[1], "concurrent callers observed divergent results");
    }
}
