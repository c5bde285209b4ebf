use std::collections::HashSet;

use crate::agents::{Agent, AgentId};
use crate::algorithms::spatial_grid::SpatialGrid;
use crate::model::Vec2;

/// Two agents are head-on when their headings' dot product is below this.
pub const FACING_DOT: f64 = -0.5;

/// A head-on meeting between `agents[a]` and `agents[b]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    pub a: usize,
    pub b: usize,
    pub midpoint: Vec2,
}

fn eligible(a: &Agent) -> bool {
    a.alive && a.parent_shape.is_none() && !a.is_bridge()
}

/// Head-on pairs closer than `distance`. Each agent takes part in at most
/// one collision; pairs are keyed `(lower id, higher id)` so the result does
/// not depend on which agent of a pair is visited first.
pub fn find_collisions(agents: &[Agent], distance: f64) -> Vec<Collision> {
    if !(distance > 0.0) {
        return Vec::new();
    }
    let mut grid: SpatialGrid<usize> = SpatialGrid::new(distance);
    for (i, a) in agents.iter().enumerate() {
        if eligible(a) {
            grid.insert(a.position, i);
        }
    }
    let mut processed: HashSet<(AgentId, AgentId)> = HashSet::new();
    let mut taken: HashSet<usize> = HashSet::new();
    let mut out = Vec::new();
    for (i, a) in agents.iter().enumerate() {
        if !eligible(a) || taken.contains(&i) {
            continue;
        }
        let mut hits: Vec<usize> = grid
            .query_radius(a.position, distance)
            .into_iter()
            .map(|(_, &j)| j)
            .filter(|&j| j != i && !taken.contains(&j))
            .collect();
        hits.sort_unstable();
        for j in hits {
            let b = &agents[j];
            let key = (a.id.min(b.id), a.id.max(b.id));
            if !processed.insert(key) {
                continue;
            }
            if a.position.distance(b.position) >= distance || a.direction.dot(b.direction) >= FACING_DOT {
                continue;
            }
            taken.insert(i);
            taken.insert(j);
            out.push(Collision { a: i, b: j, midpoint: (a.position + b.position) * 0.5 });
            break;
        }
    }
    out
}
