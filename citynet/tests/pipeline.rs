use citynet::geometry::intersect::SegIntersection;
use citynet::{Bounds, FnTerrain, GenConfig, GenError, Phase, Segment, Simulation, Snapshot, Vec2};
use serde_json::json;

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn config(seed: u64) -> GenConfig {
    GenConfig {
        seed,
        hub_count: 4,
        ants_per_hub: 4,
        ant_max_life: 300.0,
        carrier_count: 1,
        ..GenConfig::default()
    }
}

fn resolved(seed: u64) -> Simulation {
    let mut sim = Simulation::new(config(seed), Bounds::from_size(800.0, 800.0)).unwrap();
    sim.resolve();
    sim
}

#[test]
fn config_accepts_camel_case_and_rejects_bad_values() {
    let cfg = GenConfig::from_json_str(r#"{ "hubCount": 7, "antSnapDistance": 4.5, "ringRoadProbability": 0 }"#).unwrap();
    assert_eq!(cfg.hub_count, 7);
    assert_eq!(cfg.ant_snap_distance, 4.5);
    assert_eq!(cfg.lot_spacing, GenConfig::default().lot_spacing);

    let err = GenConfig::from_json_value(json!({ "ringRoadProbability": 1.5 })).unwrap_err();
    assert_eq!(err.code(), "out_of_range");
    let err = GenConfig { ant_speed: f64::INFINITY, ..GenConfig::default() }.validate().unwrap_err();
    assert!(matches!(err, GenError::NonFinite { .. }));
    assert_eq!(GenConfig::from_json_str("[1, 2").unwrap_err().code(), "parse");
}

#[test]
fn resolve_is_deterministic_and_terminates() {
    let a = resolved(42);
    let b = resolved(42);
    assert_eq!(a.phase(), Phase::Done);
    assert_eq!(a.segments(), b.segments());
    assert_eq!(a.blocks(), b.blocks());
    assert_eq!(a.lots(), b.lots());
    assert_eq!(a.hubs(), b.hubs());
}

#[test]
fn finished_network_is_clean() {
    let sim = resolved(7);
    let mut keys = std::collections::HashSet::new();
    for s in sim.segments() {
        assert!(!s.is_degenerate());
        assert!(keys.insert(s.key()));
    }
    for b in sim.blocks() {
        assert!(b.is_solid());
        assert!(b.len() >= 3);
    }
    for l in sim.lots() {
        assert!(l.is_solid());
    }
}

/// Pairs that cross away from any shared endpoint.
fn interior_crossings(segs: &[Segment]) -> usize {
    let mut n = 0;
    for (i, a) in segs.iter().enumerate() {
        for b in &segs[i + 1..] {
            if let SegIntersection::Proper { p, .. } = a.classify(b) {
                let at_end = [a.p1, a.p2, b.p1, b.p2].iter().any(|q| q.distance(p) < 1e-3);
                if !at_end {
                    n += 1;
                }
            }
        }
    }
    n
}

#[test]
fn finished_city_has_blocks_and_lots() {
    for seed in 1..=3 {
        let sim = resolved(seed);
        assert!(sim.blocks().len() > 1, "seed {seed}: {} blocks", sim.blocks().len());
        assert!(sim.lots().len() > 1, "seed {seed}: {} lots", sim.lots().len());
        assert!(!sim.arterials().is_empty());
        assert_eq!(interior_crossings(sim.segments()), 0, "seed {seed}");
    }
}

#[test]
fn snapshot_round_trip_keeps_counts_and_bridges() {
    let sim = resolved(3);
    let value = sim.to_json_value();
    let snap = Snapshot::from_json_value(value).unwrap();
    assert_eq!(snap.segments.len(), sim.segments().len());
    assert_eq!(snap.blocks.len(), sim.blocks().len());

    let bridged = Snapshot::new(
        vec![Segment::bridge(v(0.0, 0.0), v(40.0, 0.0)), Segment::new(v(40.0, 0.0), v(40.0, 40.0))],
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    );
    let mut other = Simulation::new(config(1), Bounds::from_size(100.0, 100.0)).unwrap();
    other.restore(Snapshot::from_json_str(&bridged.to_json_string()).unwrap());
    let flags: Vec<bool> = other.segments().iter().map(|s| s.is_bridge).collect();
    assert_eq!(flags, vec![true, false]);
    assert_eq!(other.find_path(v(0.0, 0.0), v(40.0, 40.0)).map(|p| p.len()), Some(3));
}

#[test]
fn water_keeps_roads_dry() {
    // a lake over the left third
    let lake = FnTerrain::new(|p: Vec2| if p.x < 250.0 { 0.1 } else { 0.8 }, |_| Vec2::ZERO);
    let cfg = GenConfig { bridge_probability: 0.0, ..config(5) };
    let mut sim = Simulation::new(cfg, Bounds::from_size(750.0, 750.0)).unwrap().with_terrain(Box::new(lake));
    sim.resolve();
    assert!(sim.hubs().iter().all(|h| h.x >= 250.0));
    assert!(sim.segments().iter().all(|s| !s.is_bridge));
    // a committed piece may overshoot the shore by at most one step
    assert!(sim.segments().iter().all(|s| s.p1.x > 245.0 && s.p2.x > 245.0));
}

#[test]
fn snapshot_ingestion_caps() {
    let too_many: Vec<_> = (0..500_001).map(|_| json!({ "p1": { "x": 0.0, "y": 0.0 }, "p2": { "x": 1.0, "y": 0.0 } })).collect();
    let err = Snapshot::from_json_value(json!({ "version": 1, "segments": too_many })).unwrap_err();
    assert_eq!(err.code(), "limit_exceeded");
}
