use image::ImageFormat;
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::codec::{self, decode_image_bytes, encode_image_bytes};
use crate::extract::extract;
use crate::quantize::quantize;

/// Build a palette from a reference image.
///
/// Returns `{ image, palette }`: `image` is the PNG palette artifact (one
/// pixel per color) and `palette` the colors as `RRGGBBAA` strings.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette(input: Vec<u8>) -> Result<Object, JsValue> {
    let reference = decode_image_bytes(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    let palette = extract(&reference).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let artifact = encode_image_bytes(&codec::encode(&palette), ImageFormat::Png)
        .map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;

    let palette_js = Array::new();
    for hex in palette.to_hex() {
        palette_js.push(&JsValue::from_str(&hex));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(artifact.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;
    Ok(result)
}

/// Remap `input` onto the colors of a palette artifact and return the PNG.
#[wasm_bindgen]
pub fn convert(input: Vec<u8>, palette_image: Vec<u8>) -> Result<Uint8Array, JsValue> {
    let artifact = decode_image_bytes(&palette_image)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode palette: {e}")))?;
    let palette = codec::decode(&artifact);

    let source = decode_image_bytes(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    let converted = quantize(&source, &palette).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let png = encode_image_bytes(&converted, ImageFormat::Png)
        .map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;
    Ok(Uint8Array::from(png.as_slice()))
}
