use crate::config::GeneratorOptions;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_from_json(source: &str) -> Result<String, JsValue> {
    crate::generate_from_json(source, GeneratorOptions::default())
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[wasm_bindgen]
pub fn generate_from_xml(source: &str) -> Result<String, JsValue> {
    crate::generate_from_xml(source, GeneratorOptions::default())
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
