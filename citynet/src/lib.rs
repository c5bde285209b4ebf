//! Procedural road networks and city blocks.
//!
//! Steering agents grow roads over a terrain; the network is cleaned into a
//! planar graph whose faces become blocks, and blocks are subdivided into
//! lots by perpendicular street waves and a clipped lattice. [`Simulation`]
//! drives the whole pipeline; every stage is also usable on its own.

pub mod model;
pub mod geometry {
    pub mod capsule;
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod path;
    pub mod segment;
    pub mod shape;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod arterials;
    pub mod merge;
    pub mod network;
    pub mod pathfinder;
    pub mod picking;
    pub mod shapes;
    pub mod spatial_grid;
    pub mod subdivide;
    pub mod winding;
}
pub mod agents;
pub mod config;
pub mod error;
pub mod json;
pub mod simulation;
pub mod terrain;

pub use agents::{Agent, AgentEvent, AgentKind, DeathCause, ShapeHandle};
pub use algorithms::arterials::{detect_all, detect_arterials};
pub use algorithms::merge::{merge, run_auto_merge};
pub use algorithms::network::RoadNetwork;
pub use algorithms::pathfinder::Pathfinder;
pub use algorithms::picking::{pick, Pick};
pub use algorithms::shapes::detect_shapes;
pub use algorithms::spatial_grid::{ShapeSpatialGrid, SpatialGrid};
pub use algorithms::subdivide::{compute_guide_vector, transpose_grid, LotParams};
pub use config::GenConfig;
pub use error::GenError;
pub use geometry::capsule::Capsule;
pub use geometry::path::Path;
pub use geometry::segment::Segment;
pub use geometry::shape::Shape;
pub use json::Snapshot;
pub use model::{Bounds, Vec2};
pub use simulation::{Phase, Simulation};
pub use terrain::{FlatTerrain, FnTerrain, HeightField, Terrain};
