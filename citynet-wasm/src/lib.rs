use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

/// Default world extent until `set_bounds` is called.
pub(crate) const DEFAULT_SIZE: f64 = 1000.0;

#[wasm_bindgen]
pub struct CityGen { pub(crate) inner: citynet::Simulation }

impl CityGen {
    pub(crate) fn rs_new(config: citynet::GenConfig) -> Result<CityGen, citynet::GenError> {
        let bounds = citynet::Bounds::from_size(DEFAULT_SIZE, DEFAULT_SIZE);
        Ok(CityGen { inner: citynet::Simulation::new(config, bounds)? })
    }
}
