//! Steering agents that grow roads.
//!
//! Every kind shares one kinematic step (`position += direction * speed`);
//! what differs is how the desired direction is blended, which lives in
//! [`Agent::desired_direction`]. Agents never touch the network themselves:
//! they report [`AgentEvent`]s and the simulation commits segments.

pub mod collision;
pub mod spawn;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::algorithms::spatial_grid::SpatialGrid;
use crate::config::GenConfig;
use crate::geometry::limits::{SEEK_SUPPRESS_DIST, STALE_TICKS, TARGET_REACHED_DIST};
use crate::geometry::shape::Shape;
use crate::model::{Bounds, Vec2};
use crate::terrain::Terrain;

pub type AgentId = u32;

/// Index of a block in the block list of the stage that spawned the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeHandle(pub usize);

// Steering weights
const ATTRACTION_WEIGHT: f64 = 2.0;
const ATTRACTION_FACING: f64 = -0.4;
const RING_WEIGHT: f64 = 4.0;
const RING_CORRECTION: f64 = 20.0;
const RING_WANDER: f64 = 0.2;
// Orbits go unstable with heavier filtering, so rings sit at the low end.
const RING_MOMENTUM: f64 = 0.95;
const SEEK_WEIGHT: f64 = 1.5;
const WATER_AVOID_WEIGHT: f64 = 3.0;
const ENV_BAND: f64 = 0.1;
const FLOW_WATER_GAIN: f64 = 4.0;
const WANDER_DRIFT: f64 = 0.5;
const WANDER_DECAY: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AgentKind {
    Hub,
    Carrier {
        #[serde(rename = "forkSpacing")]
        fork_spacing: f64,
        #[serde(rename = "sinceFork")]
        since_fork: f64,
    },
    Fork,
    Ring { center: Vec2, radius: f64, clockwise: bool },
    Outward,
    Sprawl,
    Bridge,
    Termination,
    Perpendicular { wave: u8 },
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Hub => "hub",
            AgentKind::Carrier { .. } => "carrier",
            AgentKind::Fork => "fork",
            AgentKind::Ring { .. } => "ring",
            AgentKind::Outward => "outward",
            AgentKind::Sprawl => "sprawl",
            AgentKind::Bridge => "bridge",
            AgentKind::Termination => "termination",
            AgentKind::Perpendicular { .. } => "perpendicular",
        }
    }

    /// Kinds that stop once they run into an existing road.
    pub fn joins_on_crossing(&self) -> bool {
        !matches!(self, AgentKind::Carrier { .. } | AgentKind::Ring { .. } | AgentKind::Bridge)
    }

    fn seeks_partners(&self) -> bool {
        matches!(
            self,
            AgentKind::Hub | AgentKind::Outward | AgentKind::Sprawl | AgentKind::Termination
        )
    }

    fn inertial(&self) -> bool {
        matches!(self, AgentKind::Carrier { .. } | AgentKind::Fork)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Lifetime,
    OutOfBounds,
    Stale,
    Water,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    Alive,
    TrailLeft,
    TargetReached,
    Died(DeathCause),
}

/// What an agent may look at while steering.
pub struct SteeringContext<'a> {
    pub terrain: &'a dyn Terrain,
    pub bounds: Bounds,
    pub water_level: f64,
    pub flow_influence: f64,
    pub attraction_radius: f64,
    /// Live agents keyed by position, carrying `(id, direction)`.
    pub neighbours: Option<&'a SpatialGrid<(AgentId, Vec2)>>,
    /// Block list that `parent_shape` handles index into.
    pub blocks: &'a [Shape],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f64,
    pub life: f64,
    pub max_life: f64,
    pub trail_distance: f64,
    pub target: Option<Vec2>,
    pub last_trail: Vec2,
    pub ticks_since_trail: u32,
    pub parent_shape: Option<ShapeHandle>,
    pub wander_angle: f64,
    pub wander_intensity: f64,
    pub momentum: f64,
    pub alive: bool,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, position: Vec2, direction: Vec2, cfg: &GenConfig) -> Self {
        let direction = direction.normalize();
        let momentum = match kind {
            AgentKind::Ring { .. } => RING_MOMENTUM,
            _ => (1.0 - cfg.ant_turn_speed).clamp(0.95, 0.99),
        };
        Agent {
            id,
            kind,
            position,
            direction: if direction == Vec2::ZERO { Vec2::new(1.0, 0.0) } else { direction },
            speed: cfg.ant_speed,
            life: cfg.ant_max_life,
            max_life: cfg.ant_max_life,
            trail_distance: cfg.ant_trail_distance,
            target: None,
            last_trail: position,
            ticks_since_trail: 0,
            parent_shape: None,
            wander_angle: 0.0,
            wander_intensity: cfg.ant_wander_intensity,
            momentum,
            alive: true,
        }
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_life(mut self, life: f64) -> Self {
        self.life = life;
        self.max_life = life;
        self
    }

    pub fn with_parent(mut self, parent: ShapeHandle) -> Self {
        self.parent_shape = Some(parent);
        self
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self.kind, AgentKind::Bridge)
    }

    /// Record a committed trail point.
    pub fn commit_trail(&mut self, p: Vec2) {
        self.last_trail = p;
        self.ticks_since_trail = 0;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    fn die(&mut self, cause: DeathCause) -> AgentEvent {
        self.alive = false;
        AgentEvent::Died(cause)
    }

    /// Advance one step.
    pub fn update(&mut self, ctx: &SteeringContext<'_>, rng: &mut ChaCha8Rng) -> AgentEvent {
        if !self.alive {
            return AgentEvent::Died(DeathCause::Lifetime);
        }
        if self.is_bridge() {
            return self.update_bridge();
        }

        if !ctx.bounds.contains(self.position) {
            return self.die(DeathCause::OutOfBounds);
        }
        if ctx.terrain.height(self.position) < ctx.water_level {
            return self.die(DeathCause::Water);
        }
        if let Some(ShapeHandle(i)) = self.parent_shape {
            if !ctx.blocks.get(i).map_or(false, |b| b.contains(self.position)) {
                return self.die(DeathCause::OutOfBounds);
            }
        }
        if self.life <= 0.0 {
            return self.die(DeathCause::Lifetime);
        }
        if self.ticks_since_trail > STALE_TICKS {
            return self.die(DeathCause::Stale);
        }
        if !matches!(self.kind, AgentKind::Ring { .. }) {
            if let Some(t) = self.target {
                if self.position.distance(t) <= TARGET_REACHED_DIST {
                    self.alive = false;
                    return AgentEvent::TargetReached;
                }
            }
        }

        let desired = self.desired_direction(ctx, rng);
        self.blend_direction(desired);
        self.advance()
    }

    fn update_bridge(&mut self) -> AgentEvent {
        if self.life <= 0.0 {
            return self.die(DeathCause::Lifetime);
        }
        let Some(t) = self.target else {
            return self.die(DeathCause::Lifetime);
        };
        if self.position.distance(t) <= self.speed {
            self.position = t;
            self.alive = false;
            return AgentEvent::TargetReached;
        }
        let to_target = (t - self.position).normalize();
        self.direction = (self.direction * 0.2 + to_target * 0.8).normalize();
        self.advance()
    }

    fn advance(&mut self) -> AgentEvent {
        self.position += self.direction * self.speed;
        self.life -= 1.0;
        self.ticks_since_trail += 1;
        if self.position.distance(self.last_trail) >= self.trail_distance {
            AgentEvent::TrailLeft
        } else {
            AgentEvent::Alive
        }
    }

    /// Low-pass filter the heading toward `desired`.
    fn blend_direction(&mut self, desired: Vec2) {
        if desired == Vec2::ZERO {
            return;
        }
        let m = self.momentum;
        let d = (self.direction * m + desired * (1.0 - m)).normalize();
        if d != Vec2::ZERO {
            self.direction = d;
        }
    }

    fn desired_direction(&mut self, ctx: &SteeringContext<'_>, rng: &mut ChaCha8Rng) -> Vec2 {
        let mut desired = Vec2::ZERO;

        // Wander
        let mut drift = rng.gen_range(-1.0..=1.0) * self.wander_intensity * WANDER_DRIFT;
        if self.kind.inertial() {
            drift *= 1.0 - rng.gen_range(0.8..0.99);
        }
        self.wander_angle = self.wander_angle * WANDER_DECAY + drift;
        let wander_weight = if matches!(self.kind, AgentKind::Ring { .. }) { RING_WANDER } else { 1.0 };
        desired += self.direction.rotate(self.wander_angle) * wander_weight;

        // Attraction toward an oncoming neighbour
        let mut attraction = 0.0;
        if self.kind.seeks_partners() && self.parent_shape.is_none() {
            if let Some((pull, strength)) = self.attraction(ctx) {
                desired += pull * (ATTRACTION_WEIGHT * strength);
                attraction = strength;
            }
        }

        // Ring orbit
        let mut orbiting = false;
        if let AgentKind::Ring { center, radius, clockwise } = self.kind {
            let offset = self.position - center;
            let dist = offset.length();
            if dist > 0.0 && radius > 0.0 {
                let radial = offset / dist;
                let tangent = if clockwise { radial.perp() } else { -radial.perp() };
                let err = (dist - radius) / radius;
                let ring = (tangent - radial * (err * RING_CORRECTION)).normalize();
                desired += ring * RING_WEIGHT;
                orbiting = true;
            }
        }

        // Seek
        if let Some(t) = self.target {
            let d = self.position.distance(t);
            if !orbiting && attraction < 0.5 && d > SEEK_SUPPRESS_DIST {
                desired += (t - self.position).normalize() * SEEK_WEIGHT;
            }
        }

        // Terrain: flow pulls harder as the ground sinks toward the water level
        let h = ctx.terrain.height(self.position);
        let priority = ((ENV_BAND - (h - ctx.water_level)) / ENV_BAND).clamp(0.0, 1.0);
        let flow_gain = ctx.flow_influence * (1.0 + priority * FLOW_WATER_GAIN);
        desired += ctx.terrain.flow_at(self.position) * flow_gain;
        if priority > 0.0 {
            let uphill = ctx.terrain.gradient(self.position, self.speed.max(1.0)).normalize();
            desired += uphill * (WATER_AVOID_WEIGHT * priority);
        }

        desired.normalize()
    }

    /// Unit pull toward the closest neighbour heading the other way, with a
    /// proximity weight in `(0, 1]`.
    fn attraction(&self, ctx: &SteeringContext<'_>) -> Option<(Vec2, f64)> {
        let grid = ctx.neighbours?;
        let r = ctx.attraction_radius;
        if r <= 0.0 {
            return None;
        }
        let mut best: Option<(f64, Vec2)> = None;
        for (p, (id, dir)) in grid.query_radius(self.position, r) {
            if *id == self.id || self.direction.dot(*dir) >= ATTRACTION_FACING {
                continue;
            }
            let d = p.distance(self.position);
            if d > 0.0 && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, p));
            }
        }
        let (d, p) = best?;
        Some(((p - self.position).normalize(), 1.0 - d / r))
    }
}
