use crate::error::GenError;
use crate::geometry::limits::{self, MAX_SEGMENTS, MAX_SHAPES, MAX_SHAPE_POINTS};
use crate::geometry::path::Path;
use crate::geometry::segment::Segment;
use crate::geometry::shape::Shape;
use crate::model::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Finished scene as exchanged with a host: roads, blocks, arterials, lots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub blocks: Vec<Shape>,
    #[serde(default)]
    pub arterials: Vec<Path>,
    #[serde(default)]
    pub lots: Vec<Shape>,
    #[serde(default)]
    pub hubs: Vec<Vec2>,
}

fn check_point(what: &str, p: Vec2) -> Result<(), GenError> {
    if !p.is_finite() {
        return Err(GenError::non_finite(what));
    }
    for c in [p.x, p.y] {
        if !limits::in_coord_bounds(c) {
            return Err(GenError::out_of_range(what, limits::COORD_MIN, limits::COORD_MAX, c));
        }
    }
    Ok(())
}

fn check_shapes(what: &str, shapes: &[Shape]) -> Result<(), GenError> {
    if shapes.len() > MAX_SHAPES {
        return Err(GenError::limit(what, MAX_SHAPES, shapes.len()));
    }
    for s in shapes {
        if s.points.len() > MAX_SHAPE_POINTS {
            return Err(GenError::limit("shape points", MAX_SHAPE_POINTS, s.points.len()));
        }
        for &p in &s.points {
            check_point(what, p)?;
        }
    }
    Ok(())
}

impl Snapshot {
    pub fn new(segments: Vec<Segment>, blocks: Vec<Shape>, arterials: Vec<Path>, lots: Vec<Shape>, hubs: Vec<Vec2>) -> Self {
        Snapshot { version: SNAPSHOT_VERSION, segments, blocks, arterials, lots, hubs }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse and check ingestion caps and coordinate bounds.
    pub fn from_json_value(v: Value) -> Result<Snapshot, GenError> {
        let snap: Snapshot = serde_json::from_value(v)?;
        snap.validate()?;
        Ok(snap)
    }

    pub fn from_json_str(s: &str) -> Result<Snapshot, GenError> {
        let snap: Snapshot = serde_json::from_str(s)?;
        snap.validate()?;
        Ok(snap)
    }

    pub fn validate(&self) -> Result<(), GenError> {
        if self.version == 0 || self.version > SNAPSHOT_VERSION {
            return Err(GenError::out_of_range("version", 1.0, SNAPSHOT_VERSION as f64, self.version as f64));
        }
        if self.segments.len() > MAX_SEGMENTS {
            return Err(GenError::limit("segments", MAX_SEGMENTS, self.segments.len()));
        }
        for s in &self.segments {
            check_point("segments", s.p1)?;
            check_point("segments", s.p2)?;
        }
        check_shapes("blocks", &self.blocks)?;
        check_shapes("lots", &self.lots)?;
        if self.arterials.len() > MAX_SHAPES {
            return Err(GenError::limit("arterials", MAX_SHAPES, self.arterials.len()));
        }
        for a in &self.arterials {
            if a.points.len() > MAX_SHAPE_POINTS {
                return Err(GenError::limit("arterial points", MAX_SHAPE_POINTS, a.points.len()));
            }
            for &p in &a.points {
                check_point("arterials", p)?;
            }
        }
        for &h in &self.hubs {
            check_point("hubs", h)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn round_trip_keeps_bridge_flags() {
        let snap = Snapshot::new(
            vec![Segment::new(v(0.0, 0.0), v(10.0, 0.0)), Segment::bridge(v(10.0, 0.0), v(20.0, 0.0))],
            vec![Shape::new(vec![v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)])],
            vec![Path::open(vec![v(0.0, 0.0), v(10.0, 0.0)])],
            Vec::new(),
            vec![v(5.0, 5.0)],
        );
        let back = Snapshot::from_json_value(snap.to_value()).unwrap();
        assert_eq!(back.segments.len(), 2);
        assert!(!back.segments[0].is_bridge);
        assert!(back.segments[1].is_bridge);
        assert_eq!(back, snap);
    }

    #[test]
    fn accepts_minimal_documents() {
        let doc = json!({
            "version": 1,
            "segments": [{ "p1": { "x": 0.0, "y": 0.0 }, "p2": { "x": 5.0, "y": 0.0 } }]
        });
        let snap = Snapshot::from_json_value(doc).unwrap();
        assert_eq!(snap.segments.len(), 1);
        assert!(snap.blocks.is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Snapshot::from_json_str("{").unwrap_err().code(), "parse");
        let far = json!({
            "version": 1,
            "segments": [{ "p1": { "x": 0.0, "y": 0.0 }, "p2": { "x": 1e9, "y": 0.0 } }]
        });
        assert_eq!(Snapshot::from_json_value(far).unwrap_err().code(), "out_of_range");
        let future = json!({ "version": 99, "segments": [] });
        assert!(Snapshot::from_json_value(future).is_err());
    }
}
