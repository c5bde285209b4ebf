use citynet::GenError;
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

fn set_kv(obj: &Object, k: &str, v: &JsValue) { let _ = Reflect::set(obj, &JsValue::from_str(k), v); }

fn new_obj() -> Object { Object::new() }

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

/// Envelope for a core error; the variant's fields travel in `data`.
pub fn from_gen(e: &GenError) -> JsValue {
    let d = new_obj();
    match e {
        GenError::Parse(_) | GenError::InvalidBounds => {}
        GenError::NonFinite { param } => set_kv(&d, "param", &JsValue::from_str(param)),
        GenError::OutOfRange { param, min, max, got } => {
            set_kv(&d, "param", &JsValue::from_str(param));
            set_kv(&d, "min", &JsValue::from_f64(*min));
            set_kv(&d, "max", &JsValue::from_f64(*max));
            set_kv(&d, "got", &JsValue::from_f64(*got));
        }
        GenError::LimitExceeded { what, max, got } => {
            set_kv(&d, "what", &JsValue::from_str(what));
            set_kv(&d, "max", &JsValue::from_f64(*max as f64));
            set_kv(&d, "got", &JsValue::from_f64(*got as f64));
        }
    }
    err(e.code(), e.to_string(), Some(d.into()))
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    from_gen(&GenError::NonFinite { param: param.to_string() })
}

#[inline]
pub fn invalid_height_field(cols: u32, rows: u32, len: u32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "cols", &JsValue::from_f64(cols as f64));
    set_kv(&d, "rows", &JsValue::from_f64(rows as f64));
    set_kv(&d, "len", &JsValue::from_f64(len as f64));
    err("invalid_height_field", "heights must hold cols * rows samples and cell must be positive", Some(d.into()))
}

#[inline]
pub fn not_started() -> JsValue {
    err("not_started", "generation has not been started", None)
}
