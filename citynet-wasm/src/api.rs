use crate::error;
use crate::interop;
use crate::CityGen;
use citynet::{Bounds, GenConfig, GenError, HeightField, Phase, Vec2};
use js_sys::Float32Array;
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `undefined` and `null` mean the default configuration.
fn config_from_js(config: &JsValue) -> Result<GenConfig, GenError> {
    if config.is_undefined() || config.is_null() {
        return Ok(GenConfig::default());
    }
    let text = js_sys::JSON::stringify(config)
        .ok()
        .and_then(|s| s.as_string())
        .ok_or_else(|| GenError::Parse("config is not JSON-serialisable".to_string()))?;
    GenConfig::from_json_str(&text)
}

fn finite(params: &[(&str, f64)]) -> Result<(), JsValue> {
    match params.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(error::non_finite(name)),
        None => Ok(()),
    }
}

#[wasm_bindgen]
impl CityGen {
    /// Falls back to the default configuration when `config` is rejected;
    /// use `new_res` to see why.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> CityGen {
        let cfg = config_from_js(&config).unwrap_or_else(|e| {
            web_sys::console::warn_1(&JsValue::from_str(&format!("citynet: {e}; using defaults")));
            GenConfig::default()
        });
        match CityGen::rs_new(cfg) {
            Ok(g) => g,
            Err(_) => CityGen::default_gen(),
        }
    }

    /// `{ ok: true, value: CityGen }` or a typed error envelope.
    pub fn new_res(config: JsValue) -> JsValue {
        match config_from_js(&config).and_then(CityGen::rs_new) {
            Ok(g) => error::ok(g.into()),
            Err(e) => error::from_gen(&e),
        }
    }

    pub fn set_bounds(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> JsValue {
        if let Err(e) = finite(&[("min_x", min_x), ("min_y", min_y), ("max_x", max_x), ("max_y", max_y)]) {
            return e;
        }
        match self.inner.set_bounds(Bounds::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::from_gen(&e),
        }
    }

    pub fn set_config(&mut self, config: JsValue) -> JsValue {
        match config_from_js(&config).and_then(|c| self.inner.set_config(c)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::from_gen(&e),
        }
    }

    /// Row-major heights in `[0, 1]`, `cols * rows` samples `cell` apart.
    pub fn set_height_field(&mut self, cols: u32, rows: u32, cell: f64, heights: Vec<f64>) -> JsValue {
        let len = heights.len() as u32;
        match HeightField::new(cols as usize, rows as usize, cell, heights) {
            Some(field) => {
                self.inner.set_terrain(Box::new(field));
                error::ok(JsValue::TRUE)
            }
            None => error::invalid_height_field(cols, rows, len),
        }
    }

    pub fn add_shoreline(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> JsValue {
        if let Err(e) = finite(&[("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2)]) {
            return e;
        }
        self.inner.add_shoreline(Vec2::new(x1, y1), Vec2::new(x2, y2));
        error::ok(JsValue::from_f64(self.inner.shorelines().len() as f64))
    }

    pub fn clear_shorelines(&mut self) {
        self.inner.clear_shorelines();
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    /// Advances one tick; errors with `not_started` while idle.
    pub fn tick(&mut self) -> JsValue {
        if self.inner.phase() == Phase::Idle {
            return error::not_started();
        }
        self.inner.tick();
        error::ok(JsValue::from_str(self.inner.phase().name()))
    }

    /// Runs to completion and returns the number of ticks spent.
    pub fn resolve(&mut self) -> u32 {
        self.inner.resolve() as u32
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.inner.set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    pub fn phase(&self) -> String {
        self.inner.phase().name().to_string()
    }

    pub fn steps(&self) -> f64 {
        self.inner.steps() as f64
    }

    pub fn segment_count(&self) -> u32 {
        self.inner.segments().len() as u32
    }

    pub fn agent_count(&self) -> u32 {
        self.inner.agents().len() as u32
    }

    pub fn get_segment_data(&self) -> JsValue {
        interop::segment_data(self.inner.segments())
    }

    pub fn get_hubs(&self) -> Float32Array {
        interop::flat_points(self.inner.hubs())
    }

    /// Live agent positions, two floats each.
    pub fn get_agent_positions(&self) -> Float32Array {
        let pts: Vec<Vec2> = self.inner.agents().iter().map(|a| a.position).collect();
        interop::flat_points(&pts)
    }

    pub fn get_blocks(&self) -> JsValue {
        interop::shapes_array(self.inner.blocks())
    }

    pub fn get_lots(&self) -> JsValue {
        interop::shapes_array(self.inner.lots())
    }

    pub fn get_arterials(&self) -> JsValue {
        interop::paths_array(self.inner.arterials())
    }

    /// Flat point list of the route, or `null` when there is none.
    pub fn find_path(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> JsValue {
        if finite(&[("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2)]).is_err() {
            return JsValue::NULL;
        }
        match self.inner.find_path(Vec2::new(x1, y1), Vec2::new(x2, y2)) {
            Some(path) => interop::flat_points(&path).into(),
            None => JsValue::NULL,
        }
    }

    /// Index into `get_blocks()` of the block under the point, or `null`.
    pub fn block_at(&self, x: f64, y: f64) -> JsValue {
        if finite(&[("x", x), ("y", y)]).is_err() {
            return JsValue::NULL;
        }
        self.inner
            .block_at(Vec2::new(x, y))
            .map_or(JsValue::NULL, |i| JsValue::from_f64(i as f64))
    }

    /// Nearest vertex or segment within `tol`, or `null`.
    pub fn pick(&self, x: f64, y: f64, tol: f64) -> JsValue {
        if finite(&[("x", x), ("y", y), ("tol", tol)]).is_err() {
            return JsValue::NULL;
        }
        citynet::pick(self.inner.network(), Vec2::new(x, y), tol)
            .and_then(|hit| serde_wasm_bindgen::to_value(&hit).ok())
            .unwrap_or(JsValue::NULL)
    }

    pub fn to_json(&self) -> String {
        self.inner.snapshot().to_json_string()
    }

    /// Replaces the network and outputs with a saved snapshot.
    pub fn from_json(&mut self, json: &str) -> JsValue {
        match citynet::Snapshot::from_json_str(json) {
            Ok(snap) => {
                self.inner.restore(snap);
                error::ok(JsValue::from_f64(self.inner.segments().len() as f64))
            }
            Err(e) => error::from_gen(&e),
        }
    }
}

impl CityGen {
    fn default_gen() -> CityGen {
        let bounds = Bounds::from_size(crate::DEFAULT_SIZE, crate::DEFAULT_SIZE);
        match citynet::Simulation::new(GenConfig::default(), bounds) {
            Ok(inner) => CityGen { inner },
            // the default configuration always validates
            Err(e) => wasm_bindgen::throw_str(&e.to_string()),
        }
    }
}
