//! The generation context: owns every collection the pipeline produces and
//! advances the stage machine one sub-step at a time.
//!
//! Stages hand over when the live agent list empties. Each stage replaces
//! the collections it owns wholesale; nothing is patched in place across a
//! stage boundary.

use std::collections::HashMap;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agents::collision::find_collisions;
use crate::agents::spawn::{fork_pair, growth_agents, place_hubs, sprawl_agents, termination_agents, Spawner};
use crate::agents::{Agent, AgentEvent, AgentId, AgentKind, ShapeHandle, SteeringContext};
use crate::algorithms::arterials::detect_all;
use crate::algorithms::merge::run_auto_merge;
use crate::algorithms::network::RoadNetwork;
use crate::algorithms::pathfinder::Pathfinder;
use crate::algorithms::shapes::detect_shapes;
use crate::algorithms::spatial_grid::{ShapeSpatialGrid, SpatialGrid};
use crate::algorithms::subdivide::{transpose_grid, wave_one_agents, wave_two_agents, LotParams};
use crate::config::GenConfig;
use crate::error::GenError;
use crate::geometry::capsule::Capsule;
use crate::geometry::limits::{MAX_LIVE_AGENTS, MAX_RESOLVE_ITERATIONS};
use crate::geometry::path::Path;
use crate::geometry::segment::Segment;
use crate::geometry::shape::Shape;
use crate::json::Snapshot;
use crate::model::{Bounds, Vec2};
use crate::terrain::{FlatTerrain, Terrain};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Growth,
    Sprawl,
    WaveOne,
    WaveTwo,
    Done,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Growth => "growth",
            Phase::Sprawl => "sprawl",
            Phase::WaveOne => "waveOne",
            Phase::WaveTwo => "waveTwo",
            Phase::Done => "done",
        }
    }

    /// Whether agents are still being stepped.
    pub fn is_running(&self) -> bool {
        !matches!(self, Phase::Idle | Phase::Done)
    }
}

pub struct Simulation {
    config: GenConfig,
    terrain: Box<dyn Terrain>,
    shorelines: Vec<Segment>,
    bounds: Bounds,
    rng: ChaCha8Rng,
    spawner: Spawner,
    network: RoadNetwork,
    blocks: Vec<Shape>,
    block_index: ShapeSpatialGrid,
    arterials: Vec<Path>,
    lots: Vec<Shape>,
    agents: Vec<Agent>,
    hubs: Vec<Vec2>,
    wave_seeds: Vec<(Vec2, ShapeHandle)>,
    last_seed: HashMap<AgentId, Vec2>,
    phase: Phase,
    paused: bool,
    steps: u64,
}

fn check_bounds(bounds: Bounds) -> Result<(), GenError> {
    if !bounds.min.is_finite() || !bounds.max.is_finite() {
        return Err(GenError::non_finite("bounds"));
    }
    if !bounds.is_valid() {
        return Err(GenError::InvalidBounds);
    }
    Ok(())
}

impl Simulation {
    /// A context over flat dry land. Fails on an invalid config or bounds.
    pub fn new(config: GenConfig, bounds: Bounds) -> Result<Self, GenError> {
        config.validate()?;
        check_bounds(bounds)?;
        Ok(Simulation {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            terrain: Box::new(FlatTerrain { level: 1.0 }),
            shorelines: Vec::new(),
            bounds,
            spawner: Spawner::new(),
            network: RoadNetwork::new(),
            blocks: Vec::new(),
            block_index: ShapeSpatialGrid::build(&[], 1.0),
            arterials: Vec::new(),
            lots: Vec::new(),
            agents: Vec::new(),
            hubs: Vec::new(),
            wave_seeds: Vec::new(),
            last_seed: HashMap::new(),
            phase: Phase::Idle,
            paused: false,
            steps: 0,
        })
    }

    pub fn with_terrain(mut self, terrain: Box<dyn Terrain>) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn set_terrain(&mut self, terrain: Box<dyn Terrain>) {
        self.terrain = terrain;
    }

    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<(), GenError> {
        check_bounds(bounds)?;
        self.bounds = bounds;
        Ok(())
    }

    /// Replace the configuration; takes effect on the next `start`.
    pub fn set_config(&mut self, config: GenConfig) -> Result<(), GenError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn add_shoreline(&mut self, a: Vec2, b: Vec2) {
        if a.is_finite() && b.is_finite() && a != b {
            self.shorelines.push(Segment::new(a, b));
        }
    }

    pub fn clear_shorelines(&mut self) {
        self.shorelines.clear();
    }

    /// Reset every output, reseed and spawn the growth stage.
    pub fn start(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.spawner = Spawner::new();
        self.network.clear();
        self.blocks.clear();
        self.reindex_blocks();
        self.arterials.clear();
        self.lots.clear();
        self.wave_seeds.clear();
        self.last_seed.clear();
        self.steps = 0;

        self.hubs = place_hubs(&mut self.rng, &self.config, self.terrain.as_ref(), self.bounds);
        let agents = growth_agents(
            &mut self.spawner,
            &mut self.rng,
            &self.config,
            self.terrain.as_ref(),
            &self.hubs,
            &self.shorelines,
        );
        self.replace_agents(agents);
        self.phase = Phase::Growth;
        info!(
            "phase {}: {} hubs, {} agents",
            self.phase.name(),
            self.hubs.len(),
            self.agents.len()
        );
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// `stepsPerTick` sub-steps, unless paused.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        for _ in 0..self.config.steps_per_tick {
            self.step();
        }
    }

    /// Tick until `Done`, starting first when idle. Bounded by
    /// `MAX_RESOLVE_ITERATIONS` ticks; returns the ticks spent.
    pub fn resolve(&mut self) -> usize {
        if self.phase == Phase::Idle {
            self.start();
        }
        let mut iterations = 0;
        while self.phase.is_running() {
            if iterations >= MAX_RESOLVE_ITERATIONS {
                warn!("resolve stopped after {MAX_RESOLVE_ITERATIONS} ticks in phase {}", self.phase.name());
                break;
            }
            for _ in 0..self.config.steps_per_tick {
                self.step();
            }
            iterations += 1;
        }
        iterations
    }

    /// One sub-step: move every agent, commit what they leave behind, settle
    /// collisions, then hand over to the next stage once nobody is left.
    pub fn step(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        if self.agents.is_empty() {
            self.advance();
            return;
        }
        self.steps += 1;
        self.network.ensure_index((self.config.ant_snap_distance * 2.0).max(1.0));

        let events = self.move_agents();
        let mut spawned = Vec::new();
        for (i, (from, event)) in events.into_iter().enumerate() {
            self.handle_event(i, from, event, &mut spawned);
        }
        self.settle_collisions();
        self.agents.retain(|a| a.alive);
        self.admit(spawned);
    }

    fn move_agents(&mut self) -> Vec<(Vec2, AgentEvent)> {
        let mut neighbours = SpatialGrid::new(self.config.attraction_radius.max(1.0));
        for a in self.agents.iter().filter(|a| a.alive) {
            neighbours.insert(a.position, (a.id, a.direction));
        }
        let ctx = SteeringContext {
            terrain: self.terrain.as_ref(),
            bounds: self.bounds,
            water_level: self.config.terrain_water_level,
            flow_influence: self.config.flow_field_influence,
            attraction_radius: self.config.attraction_radius,
            neighbours: Some(&neighbours),
            blocks: &self.blocks,
        };
        let rng = &mut self.rng;
        self.agents
            .iter_mut()
            .map(|a| {
                let from = a.position;
                (from, a.update(&ctx, rng))
            })
            .collect()
    }

    fn snap_for(&self, agent: &Agent) -> f64 {
        if agent.parent_shape.is_some() {
            self.config.ant_subdivide_snap
        } else {
            self.config.ant_snap_distance
        }
    }

    fn handle_event(&mut self, i: usize, from: Vec2, event: AgentEvent, spawned: &mut Vec<Agent>) {
        let snap = self.snap_for(&self.agents[i]);
        match event {
            AgentEvent::Died(_) => {}
            AgentEvent::TargetReached => {
                let a = &self.agents[i];
                let to = a.target.unwrap_or(a.position);
                self.commit(i, to, snap);
            }
            AgentEvent::Alive | AgentEvent::TrailLeft => {
                if self.join_road(i, from, snap) {
                    return;
                }
                if event == AgentEvent::TrailLeft {
                    let to = self.agents[i].position;
                    if let Some(len) = self.commit(i, to, snap) {
                        self.after_commit(i, len, spawned);
                    }
                }
            }
        }
    }

    /// Road crossing for the step `from -> position`. Returns true when the
    /// step was settled here.
    fn join_road(&mut self, i: usize, from: Vec2, snap: f64) -> bool {
        let (to, anchor, kind) = {
            let a = &self.agents[i];
            (a.position, a.last_trail, a.kind)
        };
        if let Some((_, hit)) = self.network.first_crossing(from, to, Some(anchor)) {
            self.commit(i, hit, snap);
            if kind.joins_on_crossing() {
                self.agents[i].kill();
            }
            return true;
        }
        if matches!(kind, AgentKind::Fork) {
            let radius = self.config.collision_distance * 0.5;
            if let Some(near) = self.brushed_road(from, to, anchor, radius) {
                self.commit(i, near, snap);
                self.agents[i].kill();
                return true;
            }
        }
        false
    }

    /// Closest point on a road the step capsule brushes against. Roads
    /// touching the trail anchor are the agent's own and are skipped.
    fn brushed_road(&self, from: Vec2, to: Vec2, anchor: Vec2, radius: f64) -> Option<Vec2> {
        let step = Capsule::new(from, to, radius);
        let pad = Vec2::new(radius, radius);
        let lo = Vec2::new(from.x.min(to.x), from.y.min(to.y)) - pad;
        let hi = Vec2::new(from.x.max(to.x), from.y.max(to.y)) + pad;
        let segments = self.network.segments();
        self.network
            .segments_near(lo, hi)
            .into_iter()
            .filter_map(|j| segments.get(j))
            .filter(|s| s.distance_to(anchor) > radius)
            .find(|s| step.intersects(&Capsule::new(s.p1, s.p2, 0.0)))
            .map(|s| s.closest_point(to))
    }

    /// Snap a piece from the agent's last trail point to `to`. Returns the
    /// committed length.
    fn commit(&mut self, i: usize, to: Vec2, snap: f64) -> Option<f64> {
        let agent = &mut self.agents[i];
        let idx = self.network.add_segment_snapped(agent.last_trail, to, snap)?;
        if agent.is_bridge() {
            self.network.set_bridge(idx);
        }
        let s = *self.network.segments().get(idx)?;
        let (start, end) = if s.p1.distance_sq(to) <= s.p2.distance_sq(to) { (s.p2, s.p1) } else { (s.p1, s.p2) };
        agent.commit_trail(end);
        Some(start.distance(end))
    }

    fn after_commit(&mut self, i: usize, len: f64, spawned: &mut Vec<Agent>) {
        let mut fork = false;
        if let AgentKind::Carrier { fork_spacing, since_fork } = &mut self.agents[i].kind {
            *since_fork += len;
            if *since_fork >= *fork_spacing {
                *since_fork = 0.0;
                fork = true;
            }
        }
        if fork {
            spawned.extend(fork_pair(&mut self.spawner, &self.agents[i], &self.config));
        }

        let agent = &self.agents[i];
        if let (AgentKind::Perpendicular { wave: 1 }, Some(handle)) = (agent.kind, agent.parent_shape) {
            let p = agent.last_trail;
            let spacing = self.config.lot_spacing * 2.0;
            let last = self.last_seed.entry(agent.id).or_insert(p);
            if last.distance(p) >= spacing {
                *last = p;
                self.wave_seeds.push((p, handle));
            }
        }
    }

    fn settle_collisions(&mut self) {
        let hits = find_collisions(&self.agents, self.config.collision_distance);
        for c in hits {
            for i in [c.a, c.b] {
                let snap = self.snap_for(&self.agents[i]);
                self.commit(i, c.midpoint, snap);
                self.agents[i].kill();
            }
        }
    }

    /// Add spawned agents up to the live cap.
    fn admit(&mut self, spawned: Vec<Agent>) {
        let room = MAX_LIVE_AGENTS.saturating_sub(self.agents.len());
        if spawned.len() > room {
            warn!("agent cap {MAX_LIVE_AGENTS} reached; dropped {} spawns", spawned.len() - room);
        }
        self.agents.extend(spawned.into_iter().take(room));
    }

    fn replace_agents(&mut self, agents: Vec<Agent>) {
        self.agents.clear();
        self.admit(agents);
    }

    fn advance(&mut self) {
        let next = match self.phase {
            Phase::Idle | Phase::Done => return,
            Phase::Growth => {
                let mut agents = termination_agents(&mut self.spawner, &self.network, &self.config);
                agents.extend(sprawl_agents(
                    &mut self.spawner,
                    &mut self.rng,
                    &self.network,
                    &self.config,
                    self.hubs.len(),
                ));
                self.replace_agents(agents);
                Phase::Sprawl
            }
            Phase::Sprawl => {
                self.rebuild_blocks();
                let agents = wave_one_agents(&mut self.spawner, &mut self.blocks, &self.config);
                self.last_seed = agents.iter().map(|a| (a.id, a.last_trail)).collect();
                self.wave_seeds.clear();
                self.replace_agents(agents);
                Phase::WaveOne
            }
            Phase::WaveOne => {
                let agents = wave_two_agents(&mut self.spawner, &self.blocks, &self.wave_seeds, &self.config);
                debug!("{} wave seeds", self.wave_seeds.len());
                self.replace_agents(agents);
                Phase::WaveTwo
            }
            Phase::WaveTwo => {
                self.finish();
                Phase::Done
            }
        };
        self.phase = next;
        info!(
            "phase {}: {} segments, {} blocks, {} agents",
            next.name(),
            self.network.len(),
            self.blocks.len(),
            self.agents.len()
        );
    }

    fn rebuild_blocks(&mut self) {
        self.network.cleanup_network(self.config.cleanup_snap);
        let faces = detect_shapes(self.network.segments());
        self.blocks = run_auto_merge(&faces, self.config.merge_area_threshold);
        self.reindex_blocks();
        debug!("{} faces merged into {} blocks", faces.len(), self.blocks.len());
        self.arterials = detect_all(&self.blocks, self.config.arterial_angle_threshold);
    }

    /// Final pass: lattice every mid-sized block, then resolve lots.
    fn finish(&mut self) {
        self.rebuild_blocks();
        let params = LotParams::from_config(&self.config);
        let threshold = self.config.arterial_angle_threshold;
        let (min, max) = (self.config.min_subdivision_area, self.config.max_subdivision_area);
        let mut added = 0usize;
        for block in self.blocks.iter_mut() {
            let area = block.area();
            if area < min || area > max {
                continue;
            }
            let Some(guide) = block.ensure_guide_vector(threshold) else { continue };
            for s in transpose_grid(block, guide, &params, &mut self.rng) {
                if self.network.add_segment_snapped(s.p1, s.p2, self.config.subdivide_snap).is_some() {
                    added += 1;
                }
            }
        }
        debug!("lattice added {added} segments");
        self.network.cleanup_network(self.config.cleanup_snap);
        self.arterials = detect_all(&self.blocks, threshold);
        self.lots = detect_shapes(self.network.segments());
    }

    fn reindex_blocks(&mut self) {
        let cell = (self.config.lot_spacing * 4.0).max(1.0);
        self.block_index = ShapeSpatialGrid::build(&self.blocks, cell);
    }

    /// Index of the block containing `p`.
    pub fn block_at(&self, p: Vec2) -> Option<usize> {
        if self.block_index.built_for() != self.blocks.len() {
            return self.blocks.iter().position(|b| b.contains(p));
        }
        self.block_index.find_containing(&self.blocks, p)
    }

    /// Cheapest route over the network, weighted by terrain elevation.
    pub fn find_path(&self, start: Vec2, end: Vec2) -> Option<Vec<Vec2>> {
        let terrain = self.terrain.as_ref();
        let pf = Pathfinder::with_elevation(
            self.network.segments(),
            |p| terrain.height(p),
            self.config.slope_sensitivity,
        );
        pf.find_path(start, end)
    }

    /// Load a finished scene. The context ends up `Done`.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.network = RoadNetwork::from_segments(snapshot.segments);
        self.blocks = snapshot.blocks;
        self.reindex_blocks();
        self.arterials = snapshot.arterials;
        self.lots = snapshot.lots;
        self.hubs = snapshot.hubs;
        self.agents.clear();
        self.wave_seeds.clear();
        self.last_seed.clear();
        self.phase = Phase::Done;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.network.segments().to_vec(),
            self.blocks.clone(),
            self.arterials.clone(),
            self.lots.clone(),
            self.hubs.clone(),
        )
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        self.snapshot().to_value()
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn segments(&self) -> &[Segment] {
        self.network.segments()
    }

    pub fn blocks(&self) -> &[Shape] {
        &self.blocks
    }

    pub fn arterials(&self) -> &[Path] {
        &self.arterials
    }

    pub fn lots(&self) -> &[Shape] {
        &self.lots
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn hubs(&self) -> &[Vec2] {
        &self.hubs
    }

    pub fn shorelines(&self) -> &[Segment] {
        &self.shorelines
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sub-steps that moved at least one agent since `start`.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FnTerrain;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn small_config() -> GenConfig {
        GenConfig {
            seed: 11,
            hub_count: 3,
            ants_per_hub: 3,
            ant_max_life: 200.0,
            carrier_count: 1,
            ..GenConfig::default()
        }
    }

    #[test]
    fn rejects_bad_bounds_and_config() {
        let bad = Bounds::new(v(10.0, 10.0), v(0.0, 0.0));
        assert!(matches!(Simulation::new(GenConfig::default(), bad), Err(GenError::InvalidBounds)));
        let cfg = GenConfig { ant_speed: f64::NAN, ..GenConfig::default() };
        assert!(Simulation::new(cfg, Bounds::from_size(100.0, 100.0)).is_err());
    }

    #[test]
    fn idle_until_started_and_pause_gates_ticks() {
        let mut sim = Simulation::new(small_config(), Bounds::from_size(600.0, 600.0)).unwrap();
        sim.tick();
        assert_eq!(sim.phase(), Phase::Idle);
        sim.start();
        assert_eq!(sim.phase(), Phase::Growth);
        assert_eq!(sim.hubs().len(), 3);
        assert!(!sim.agents().is_empty());
        sim.set_paused(true);
        sim.tick();
        assert_eq!(sim.steps(), 0);
        sim.set_paused(false);
        sim.tick();
        assert_eq!(sim.steps(), u64::from(sim.config().steps_per_tick));
    }

    #[test]
    fn resolve_reaches_done_with_roads() {
        let mut sim = Simulation::new(small_config(), Bounds::from_size(600.0, 600.0)).unwrap();
        let ticks = sim.resolve();
        assert!(ticks < MAX_RESOLVE_ITERATIONS);
        assert_eq!(sim.phase(), Phase::Done);
        assert!(sim.agents().is_empty());
        assert!(!sim.segments().is_empty());
        for s in sim.segments() {
            assert!(!s.is_degenerate());
        }
    }

    #[test]
    fn steps_without_agents_walk_the_stages() {
        // all water: no hubs, so every stage hands straight over
        let mut sim = Simulation::new(small_config(), Bounds::from_size(300.0, 300.0))
            .unwrap()
            .with_terrain(Box::new(FnTerrain::new(|_| 0.0, |_| Vec2::ZERO)));
        sim.start();
        assert!(sim.hubs().is_empty());
        let mut seen = vec![sim.phase()];
        for _ in 0..5 {
            sim.step();
            seen.push(sim.phase());
        }
        assert_eq!(
            seen,
            vec![Phase::Growth, Phase::Sprawl, Phase::WaveOne, Phase::WaveTwo, Phase::Done, Phase::Done]
        );
        assert!(sim.segments().is_empty());
    }

    #[test]
    fn collision_commits_to_the_midpoint() {
        let cfg = small_config();
        let mut sim = Simulation::new(cfg.clone(), Bounds::from_size(300.0, 300.0)).unwrap();
        sim.phase = Phase::Sprawl;
        let mut a = sim.spawner.make(AgentKind::Sprawl, v(100.0, 100.0), v(1.0, 0.0), &cfg);
        let mut b = sim.spawner.make(AgentKind::Sprawl, v(103.0, 100.0), v(-1.0, 0.0), &cfg);
        a.commit_trail(v(90.0, 100.0));
        b.commit_trail(v(113.0, 100.0));
        sim.agents = vec![a, b];
        sim.settle_collisions();
        assert!(sim.agents.iter().all(|a| !a.alive));
        assert_eq!(sim.network.len(), 2);
        assert!(sim.network.contains(v(90.0, 100.0), v(101.5, 100.0)));
        assert!(sim.network.contains(v(113.0, 100.0), v(101.5, 100.0)));
    }

    #[test]
    fn crossing_joins_and_stops_hub_agents() {
        let cfg = small_config();
        let mut sim = Simulation::new(cfg.clone(), Bounds::from_size(300.0, 300.0)).unwrap();
        sim.network.add_segment_snapped(v(50.0, 0.0), v(50.0, 100.0), 1.0);
        let mut hub = sim.spawner.make(AgentKind::Hub, v(52.0, 40.0), v(1.0, 0.0), &cfg);
        hub.commit_trail(v(42.0, 40.0));
        let mut ring = sim.spawner.make(
            AgentKind::Ring { center: v(0.0, 60.0), radius: 50.0, clockwise: true },
            v(52.0, 60.0),
            v(1.0, 0.0),
            &cfg,
        );
        ring.commit_trail(v(44.0, 60.0));
        sim.agents = vec![hub, ring];
        sim.network.ensure_index(12.0);
        assert!(sim.join_road(0, v(48.0, 40.0), 1.0));
        assert!(!sim.agents[0].alive);
        assert!(sim.network.contains(v(42.0, 40.0), v(50.0, 40.0)));
        assert!(sim.join_road(1, v(48.0, 60.0), 1.0));
        assert!(sim.agents[1].alive);
        assert_eq!(sim.agents[1].last_trail, v(50.0, 60.0));
    }

    #[test]
    fn snapshot_restores_a_finished_scene() {
        let mut sim = Simulation::new(small_config(), Bounds::from_size(600.0, 600.0)).unwrap();
        sim.resolve();
        let snap = sim.snapshot();
        let mut other = Simulation::new(small_config(), Bounds::from_size(600.0, 600.0)).unwrap();
        other.restore(snap);
        assert_eq!(other.phase(), Phase::Done);
        assert_eq!(other.segments().len(), sim.segments().len());
        assert_eq!(other.blocks(), sim.blocks());
    }

    #[test]
    fn block_lookup_after_restore() {
        let square = |x: f64| Shape::new(vec![v(x, 0.0), v(x + 10.0, 0.0), v(x + 10.0, 10.0), v(x, 10.0)]);
        let snap = Snapshot::new(Vec::new(), vec![square(0.0), square(10.0)], Vec::new(), Vec::new(), Vec::new());
        let mut sim = Simulation::new(small_config(), Bounds::from_size(100.0, 100.0)).unwrap();
        sim.restore(snap);
        assert_eq!(sim.block_at(v(5.0, 5.0)), Some(0));
        assert_eq!(sim.block_at(v(15.0, 5.0)), Some(1));
        assert_eq!(sim.block_at(v(50.0, 50.0)), None);
        sim.start();
        assert_eq!(sim.block_at(v(5.0, 5.0)), None);
    }

    #[test]
    fn find_path_over_a_built_network() {
        let mut sim = Simulation::new(small_config(), Bounds::from_size(300.0, 300.0)).unwrap();
        sim.network.add_segment_snapped(v(0.0, 0.0), v(100.0, 0.0), 1.0);
        sim.network.add_segment_snapped(v(100.0, 0.0), v(100.0, 100.0), 1.0);
        let path = sim.find_path(v(1.0, 1.0), v(99.0, 99.0)).unwrap();
        assert_eq!(path, vec![v(0.0, 0.0), v(100.0, 0.0), v(100.0, 100.0)]);
    }
}
