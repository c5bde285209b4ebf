use citynet::{Path, Segment, Shape, Vec2};
use js_sys::{Array, Float32Array, Object, Reflect, Uint8Array};
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object { Object::new() }
pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}
pub fn arr_f32(slice: &[f32]) -> Float32Array {
    let arr = Float32Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
pub fn arr_u8(slice: &[u8]) -> Uint8Array {
    let arr = Uint8Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}

/// `{ points: Float32Array, bridges: Uint8Array }`, four floats per segment.
pub fn segment_data(segs: &[Segment]) -> JsValue {
    let mut pts = Vec::with_capacity(segs.len() * 4);
    let mut bridges = Vec::with_capacity(segs.len());
    for s in segs {
        pts.extend_from_slice(&[s.p1.x as f32, s.p1.y as f32, s.p2.x as f32, s.p2.y as f32]);
        bridges.push(s.is_bridge as u8);
    }
    let o = new_obj();
    set_kv(&o, "points", &arr_f32(&pts).into());
    set_kv(&o, "bridges", &arr_u8(&bridges).into());
    o.into()
}

/// Flat `[x0, y0, x1, y1, ...]` per point list.
pub fn flat_points(points: &[Vec2]) -> Float32Array {
    let flat: Vec<f32> = points.iter().flat_map(|p| [p.x as f32, p.y as f32]).collect();
    arr_f32(&flat)
}

pub fn shapes_array(shapes: &[Shape]) -> JsValue {
    let out = Array::new();
    for s in shapes {
        out.push(&flat_points(&s.points).into());
    }
    out.into()
}

pub fn paths_array(paths: &[Path]) -> JsValue {
    let out = Array::new();
    for p in paths {
        let o = new_obj();
        set_kv(&o, "points", &flat_points(&p.points).into());
        set_kv(&o, "closed", &JsValue::from_bool(p.closed));
        out.push(&o.into());
    }
    out.into()
}
