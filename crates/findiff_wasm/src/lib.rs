//! WASM bridge: selector indices and raw text in, serialized results out.

mod payload;

use findiff_core::difference::approximate_tangent;
use findiff_core::input::ParameterInput;
use findiff_core::optimal::find_optimal_step_size;
use findiff_core::{EvaluationRequest, EvaluatorSettings};
use js_sys::Float64Array;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub use payload::EvaluationPayload;

#[wasm_bindgen]
pub struct WasmEvaluator {
    input: ParameterInput,
    settings: EvaluatorSettings,
}

#[wasm_bindgen]
impl WasmEvaluator {
    /// `settings_val` may be undefined or null for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_val: JsValue) -> Result<WasmEvaluator, JsValue> {
        console_error_panic_hook::set_once();
        let settings = parse_settings(settings_val)?;
        settings
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid evaluator settings: {}", e)))?;
        Ok(WasmEvaluator::with_settings(settings))
    }

    pub fn set_function(&mut self, index: u32) {
        self.input.set_function_index(index as usize);
    }

    pub fn set_method(&mut self, index: u32) -> Result<(), JsValue> {
        self.input
            .set_method_index(index as usize)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Returns the x in effect after the edit; bad text keeps the old value.
    pub fn set_x(&mut self, text: &str) -> f64 {
        self.input.set_x_text(text);
        self.input.x()
    }

    /// Returns the h in effect after the edit; bad or non-positive text keeps the old value.
    pub fn set_h(&mut self, text: &str) -> f64 {
        self.input.set_h_text(text);
        self.input.h()
    }

    pub fn get_x(&self) -> f64 {
        self.input.x()
    }

    pub fn get_h(&self) -> f64 {
        self.input.h()
    }

    pub fn function_label(&self) -> String {
        self.input.function().label().to_string()
    }

    pub fn method_description(&self) -> String {
        self.input.method().description().to_string()
    }

    pub fn evaluate(&self) -> Result<JsValue, JsValue> {
        let payload = payload::build_payload(&self.input.request(), &self.settings)
            .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
        to_value(&payload).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Flattened [x0, y0, x1, y1, ...] samples of the approximate tangent over [from, to].
    pub fn tangent_samples(&self, from: f64, to: f64, count: u32) -> Result<Float64Array, JsValue> {
        let request = self.input.request();
        let line = approximate_tangent(&request.function, request.method, request.x, request.h)
            .map_err(|e| JsValue::from_str(&format!("Tangent computation failed: {}", e)))?;
        let flat: Vec<f64> = line
            .sample(from, to, count as usize)
            .into_iter()
            .flat_map(|(v, y)| [v, y])
            .collect();
        Ok(Float64Array::from(flat.as_slice()))
    }

    /// Moves h to the selected optimal step and returns it. The front end animates
    /// from the previous h on its own.
    pub fn optimize_step(&mut self) -> Result<f64, JsValue> {
        self.apply_optimal_step()
            .map_err(|e| JsValue::from_str(&format!("Step optimization failed: {}", e)))
    }
}

impl WasmEvaluator {
    pub fn with_settings(settings: EvaluatorSettings) -> Self {
        Self {
            input: ParameterInput::default(),
            settings,
        }
    }

    pub fn input(&self) -> &ParameterInput {
        &self.input
    }

    fn apply_optimal_step(&mut self) -> findiff_core::Result<f64> {
        let request = self.input.request();
        let estimate = find_optimal_step_size(
            &request.function,
            request.method,
            request.x,
            request.h,
            &self.settings.step_search,
        )?;
        self.input.set_h(estimate.h);
        Ok(estimate.h)
    }
}

/// Stateless evaluation of a serialized `EvaluationRequest`.
#[wasm_bindgen]
pub fn evaluate_request(request_val: JsValue, settings_val: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let request: EvaluationRequest = from_value(request_val)
        .map_err(|e| JsValue::from_str(&format!("Invalid evaluation request: {}", e)))?;
    let settings = parse_settings(settings_val)?;
    let payload = payload::build_payload(&request, &settings)
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
    to_value(&payload).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_settings(settings_val: JsValue) -> Result<EvaluatorSettings, JsValue> {
    if settings_val.is_undefined() || settings_val.is_null() {
        return Ok(EvaluatorSettings::default());
    }
    from_value(settings_val)
        .map_err(|e| JsValue::from_str(&format!("Invalid evaluator settings: {}", e)))
}
