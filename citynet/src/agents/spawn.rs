//! Spawn policy: where growth, follow-up and joining agents start.

use std::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::agents::{Agent, AgentId, AgentKind};
use crate::algorithms::network::RoadNetwork;
use crate::config::GenConfig;
use crate::geometry::segment::Segment;
use crate::model::{Bounds, Vec2};
use crate::terrain::Terrain;

/// Ring radius per unit of `ringRoadRadiusMultiplier`.
pub const RING_BASE_RADIUS: f64 = 60.0;
const HUB_INSET: f64 = 0.05;
const HUB_ATTEMPTS_PER_HUB: usize = 50;
const BRIDGE_STEP: f64 = 2.0;

/// Hands out agent ids.
#[derive(Clone, Debug, Default)]
pub struct Spawner {
    next_id: AgentId,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make(&mut self, kind: AgentKind, position: Vec2, direction: Vec2, cfg: &GenConfig) -> Agent {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Agent::new(id, kind, position, direction, cfg)
    }
}

fn random_dir(rng: &mut ChaCha8Rng) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Up to `hubCount` land points inside the inset world bounds.
pub fn place_hubs(rng: &mut ChaCha8Rng, cfg: &GenConfig, terrain: &dyn Terrain, bounds: Bounds) -> Vec<Vec2> {
    let area = bounds.inset(HUB_INSET);
    let want = cfg.hub_count as usize;
    let mut hubs = Vec::with_capacity(want);
    let mut attempts = 0;
    while hubs.len() < want && attempts < want * HUB_ATTEMPTS_PER_HUB {
        attempts += 1;
        let p = Vec2::new(
            rng.gen_range(area.min.x..=area.max.x),
            rng.gen_range(area.min.y..=area.max.y),
        );
        if terrain.height(p) > cfg.terrain_water_level {
            hubs.push(p);
        }
    }
    if hubs.len() < want {
        log::warn!("placed {} of {want} hubs; not enough land", hubs.len());
    }
    hubs
}

/// Every agent of the growth stage.
pub fn growth_agents(
    sp: &mut Spawner,
    rng: &mut ChaCha8Rng,
    cfg: &GenConfig,
    terrain: &dyn Terrain,
    hubs: &[Vec2],
    shorelines: &[Segment],
) -> Vec<Agent> {
    let mut agents = hub_agents(sp, rng, cfg, hubs);
    agents.extend(outward_agents(sp, rng, cfg, hubs));
    agents.extend(carrier_agents(sp, rng, cfg, hubs));
    agents.extend(ring_agents(sp, rng, cfg, hubs));
    agents.extend(bridge_agents(sp, rng, cfg, terrain, hubs, shorelines));
    agents
}

pub fn hub_agents(sp: &mut Spawner, rng: &mut ChaCha8Rng, cfg: &GenConfig, hubs: &[Vec2]) -> Vec<Agent> {
    let per_hub = cfg.scaled(cfg.ants_per_hub);
    let mut out = Vec::with_capacity(per_hub * hubs.len());
    for (i, &hub) in hubs.iter().enumerate() {
        for _ in 0..per_hub {
            let mut a = sp.make(AgentKind::Hub, hub, random_dir(rng), cfg);
            if hubs.len() > 1 {
                let mut j = rng.gen_range(0..hubs.len() - 1);
                if j >= i {
                    j += 1;
                }
                a = a.with_target(hubs[j]);
            }
            out.push(a);
        }
    }
    out
}

pub fn outward_agents(sp: &mut Spawner, rng: &mut ChaCha8Rng, cfg: &GenConfig, hubs: &[Vec2]) -> Vec<Agent> {
    if hubs.is_empty() {
        return Vec::new();
    }
    let centroid = hubs.iter().fold(Vec2::ZERO, |acc, h| acc + *h) / hubs.len() as f64;
    let per_hub = cfg.scaled(2);
    let mut out = Vec::new();
    for &hub in hubs {
        let away = (hub - centroid).normalize();
        for _ in 0..per_hub {
            let dir = if away == Vec2::ZERO {
                random_dir(rng)
            } else {
                away.rotate(rng.gen_range(-0.6..0.6))
            };
            out.push(sp.make(AgentKind::Outward, hub, dir, cfg));
        }
    }
    out
}

/// Near-straight spines between distant hub pairs.
pub fn carrier_agents(sp: &mut Spawner, rng: &mut ChaCha8Rng, cfg: &GenConfig, hubs: &[Vec2]) -> Vec<Agent> {
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for i in 0..hubs.len() {
        for j in 0..hubs.len() {
            if i != j && hubs[i].distance(hubs[j]) >= cfg.carrier_min_distance {
                pairs.push((i, j));
            }
        }
    }
    pairs.shuffle(rng);
    pairs
        .into_iter()
        .take(cfg.carrier_count as usize)
        .map(|(i, j)| {
            let (from, to) = (hubs[i], hubs[j]);
            let kind = AgentKind::Carrier { fork_spacing: cfg.carrier_fork_spacing, since_fork: 0.0 };
            let life = (from.distance(to) / cfg.ant_speed * 1.5).max(cfg.ant_max_life);
            sp.make(kind, from, to - from, cfg).with_target(to).with_life(life)
        })
        .collect()
}

/// The two ribs a carrier drops every `carrierForkSpacing`, rooted at its
/// last committed trail point.
pub fn fork_pair(sp: &mut Spawner, carrier: &Agent, cfg: &GenConfig) -> [Agent; 2] {
    let side = carrier.direction.perp();
    let life = cfg.ant_max_life * 0.3;
    let at = carrier.last_trail;
    [
        sp.make(AgentKind::Fork, at, side, cfg).with_life(life),
        sp.make(AgentKind::Fork, at, -side, cfg).with_life(life),
    ]
}

pub fn ring_agents(sp: &mut Spawner, rng: &mut ChaCha8Rng, cfg: &GenConfig, hubs: &[Vec2]) -> Vec<Agent> {
    let radius = cfg.ring_road_radius_multiplier * RING_BASE_RADIUS;
    if radius <= 0.0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for &center in hubs {
        if !rng.gen_bool(cfg.ring_road_probability) {
            continue;
        }
        out.push(ring_agent(sp, rng, cfg, center, radius));
    }
    out
}

/// A ring agent placed on its circle, heading along the tangent, living for
/// one circumference.
pub fn ring_agent(sp: &mut Spawner, rng: &mut ChaCha8Rng, cfg: &GenConfig, center: Vec2, radius: f64) -> Agent {
    let radial = random_dir(rng);
    let clockwise = rng.gen_bool(0.5);
    let tangent = if clockwise { radial.perp() } else { -radial.perp() };
    let life = TAU * radius / cfg.ant_speed;
    sp.make(AgentKind::Ring { center, radius, clockwise }, center + radial * radius, tangent, cfg)
        .with_life(life)
}

/// Walk from the shoreline point closest to `from` straight across the
/// water. Returns the near and far shore points when land is reached within
/// `max_len`.
pub fn find_bridge(
    shorelines: &[Segment],
    from: Vec2,
    terrain: &dyn Terrain,
    water_level: f64,
    max_len: f64,
) -> Option<(Vec2, Vec2)> {
    let shore = shorelines
        .iter()
        .filter(|s| !s.is_degenerate())
        .min_by(|a, b| a.distance_to(from).total_cmp(&b.distance_to(from)))?;
    let start = shore.closest_point(from);
    let n = shore.direction().perp();
    let normal = [n, -n]
        .into_iter()
        .map(|d| (d, terrain.height(start + d * BRIDGE_STEP)))
        .filter(|(_, h)| *h < water_level)
        .min_by(|a, b| a.1.total_cmp(&b.1))?
        .0;
    let mut t = BRIDGE_STEP;
    while t <= max_len {
        let p = start + normal * t;
        if terrain.height(p) > water_level {
            return Some((start, p));
        }
        t += BRIDGE_STEP;
    }
    None
}

pub fn bridge_agents(
    sp: &mut Spawner,
    rng: &mut ChaCha8Rng,
    cfg: &GenConfig,
    terrain: &dyn Terrain,
    hubs: &[Vec2],
    shorelines: &[Segment],
) -> Vec<Agent> {
    if shorelines.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for &hub in hubs {
        if !rng.gen_bool(cfg.bridge_probability) {
            continue;
        }
        let Some((a, b)) = find_bridge(shorelines, hub, terrain, cfg.terrain_water_level, cfg.max_bridge_length) else {
            continue;
        };
        let life = (a.distance(b) / cfg.ant_speed).ceil() + 10.0;
        out.push(sp.make(AgentKind::Bridge, a, b - a, cfg).with_target(b).with_life(life));
    }
    out
}

/// Agents continuing every dead end toward the nearest vertex ahead of it.
pub fn termination_agents(sp: &mut Spawner, net: &RoadNetwork, cfg: &GenConfig) -> Vec<Agent> {
    let verts = net.vertices();
    let mut out = Vec::new();
    for end in net.dead_ends() {
        let Some(seg) = net.segments().iter().find(|s| s.has_endpoint(end, 0.0)) else { continue };
        let back = if seg.p1 == end { seg.p2 } else { seg.p1 };
        let ahead = (end - back).normalize();
        if ahead == Vec2::ZERO {
            continue;
        }
        let target = verts
            .iter()
            .copied()
            .filter(|&v| v != end && v != back && (v - end).dot(ahead) > 0.0)
            .min_by(|a, b| a.distance_sq(end).total_cmp(&b.distance_sq(end)));
        let mut a = sp.make(AgentKind::Termination, end, ahead, cfg).with_life(cfg.ant_max_life * 0.25);
        if let Some(t) = target {
            a = a.with_target(t);
        }
        out.push(a);
    }
    out
}

/// Short-lived infill agents at random vertices.
pub fn sprawl_agents(sp: &mut Spawner, rng: &mut ChaCha8Rng, net: &RoadNetwork, cfg: &GenConfig, hub_count: usize) -> Vec<Agent> {
    let verts = net.vertices();
    if verts.is_empty() {
        return Vec::new();
    }
    let count = cfg.scaled(cfg.ants_per_hub) * hub_count.max(1) / 2;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(&p) = verts.choose(rng) else { break };
        let dir = random_dir(rng);
        out.push(sp.make(AgentKind::Sprawl, p, dir, cfg).with_life(cfg.ant_max_life * 0.2));
    }
    out
}
