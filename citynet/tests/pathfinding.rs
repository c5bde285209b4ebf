use citynet::{Pathfinder, Segment, Vec2};

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// A hill sits on the straight route; the detour through (50, 60) is flat.
fn hill_and_detour() -> Vec<Segment> {
    vec![
        Segment::new(v(0.0, 0.0), v(50.0, 0.0)),
        Segment::new(v(50.0, 0.0), v(100.0, 0.0)),
        Segment::new(v(0.0, 0.0), v(50.0, 60.0)),
        Segment::new(v(50.0, 60.0), v(100.0, 0.0)),
    ]
}

fn hill(p: Vec2) -> f64 {
    if p.distance(v(50.0, 0.0)) < 1.0 { 1.0 } else { 0.0 }
}

#[test]
fn path_runs_between_the_nearest_nodes() {
    let pf = Pathfinder::new(&hill_and_detour());
    let path = pf.find_path(v(-3.0, 2.0), v(104.0, -1.0)).unwrap();
    assert_eq!(path.first(), Some(&v(0.0, 0.0)));
    assert_eq!(path.last(), Some(&v(100.0, 0.0)));
    // without terrain the straight route is shorter
    assert_eq!(path, vec![v(0.0, 0.0), v(50.0, 0.0), v(100.0, 0.0)]);
}

#[test]
fn flatter_route_wins_with_slope_sensitivity() {
    let pf = Pathfinder::with_elevation(&hill_and_detour(), hill, 10.0);
    let path = pf.find_path(v(0.0, 0.0), v(100.0, 0.0)).unwrap();
    assert_eq!(path, vec![v(0.0, 0.0), v(50.0, 60.0), v(100.0, 0.0)]);

    let flat = Pathfinder::with_elevation(&hill_and_detour(), hill, 0.0);
    assert_eq!(flat.find_path(v(0.0, 0.0), v(100.0, 0.0)).unwrap().len(), 3);
    assert!(flat.find_path(v(0.0, 0.0), v(100.0, 0.0)).unwrap().contains(&v(50.0, 0.0)));
}

#[test]
fn disconnected_and_empty_networks() {
    let pf = Pathfinder::new(&[
        Segment::new(v(0.0, 0.0), v(10.0, 0.0)),
        Segment::new(v(100.0, 0.0), v(110.0, 0.0)),
    ]);
    assert!(pf.find_path(v(0.0, 0.0), v(110.0, 0.0)).is_none());
    assert!(Pathfinder::new(&[]).find_path(v(0.0, 0.0), v(1.0, 0.0)).is_none());
}

#[test]
fn start_equal_to_end_is_a_single_node() {
    let pf = Pathfinder::new(&hill_and_detour());
    assert_eq!(pf.find_path(v(49.0, 61.0), v(51.0, 59.0)), Some(vec![v(50.0, 60.0)]));
}
