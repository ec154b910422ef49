//! KaTeX typesetter, reached through the page's global `katex` object.

use js_sys::{Function, Object, Reflect};
use soku_core::render::{RenderError, TypesetOptions, Typesetter};
use wasm_bindgen::{JsCast, JsValue};

/// Calls `katex.renderToString(markup, options)` on the global object.
pub struct KatexTypesetter;

impl KatexTypesetter {
    fn render_fn() -> Result<(JsValue, Function), RenderError> {
        let katex = Reflect::get(&js_sys::global(), &JsValue::from_str("katex"))
            .map_err(|_| RenderError::Unavailable)?;
        if katex.is_undefined() || katex.is_null() {
            return Err(RenderError::Unavailable);
        }
        let render = Reflect::get(&katex, &JsValue::from_str("renderToString"))
            .map_err(|_| RenderError::Unavailable)?
            .dyn_into::<Function>()
            .map_err(|_| RenderError::Unavailable)?;
        Ok((katex, render))
    }
}

fn options_object(options: &TypesetOptions) -> Result<Object, RenderError> {
    let object = Object::new();
    for (key, value) in [
        ("throwOnError", options.throw_on_error),
        ("displayMode", options.display_mode),
        ("trust", options.trust),
    ] {
        Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_bool(value))
            .map_err(|err| RenderError::Engine(describe(&err)))?;
    }
    Ok(object)
}

fn describe(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

impl Typesetter for KatexTypesetter {
    fn typeset(&self, markup: &str, options: &TypesetOptions) -> Result<String, RenderError> {
        let (katex, render) = Self::render_fn()?;
        let options = options_object(options)?;
        let html = render
            .call2(&katex, &JsValue::from_str(markup), &options)
            .map_err(|err| RenderError::Engine(describe(&err)))?;
        html.as_string()
            .ok_or_else(|| RenderError::Engine("renderToString returned a non-string".into()))
    }
}
