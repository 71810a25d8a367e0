//! # Amount Bindings - Node.js FFI for amount-format and amount-input
//!
//! Formatting functions are stateless. Inputs live in a process-wide registry
//! keyed by caller-chosen ids; every input call returns a JSON snapshot that
//! also carries the values emitted to `onChange` since the previous call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use amount_format::{decompose_number, format_number, to_balance, to_percentage, Decimal, FormatOptions};
use amount_input::{sanitize, AmountInput, InputConfig, InputSnapshot, SystemClock};
use lazy_static::lazy_static;
use neon::prelude::*;
use serde::Serialize;

type Outbox = Arc<Mutex<Vec<Option<Decimal>>>>;

struct InputEntry {
    input: AmountInput,
    outbox: Outbox,
}

#[derive(Serialize)]
struct EntrySnapshot {
    #[serde(flatten)]
    snapshot: InputSnapshot,
    emitted: Vec<Option<Decimal>>,
}

impl InputEntry {
    fn new(config: InputConfig, initial: Option<Decimal>) -> Result<Self, String> {
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
        let sink = outbox.clone();
        let input = AmountInput::new(config, initial, Arc::new(SystemClock), move |value| {
            sink.lock().unwrap_or_else(PoisonError::into_inner).push(value);
        })
        .map_err(|e| e.to_string())?;

        Ok(Self { input, outbox })
    }

    /// Snapshot the input and drain its emitted values
    fn snapshot_json(&self) -> serde_json::Result<String> {
        let emitted = std::mem::take(&mut *self.outbox.lock().unwrap_or_else(PoisonError::into_inner));
        serde_json::to_string(&EntrySnapshot {
            snapshot: self.input.snapshot(),
            emitted,
        })
    }
}

lazy_static! {
    static ref INPUT_REGISTRY: Mutex<HashMap<String, InputEntry>> = Mutex::new(HashMap::new());
}

fn registry() -> MutexGuard<'static, HashMap<String, InputEntry>> {
    INPUT_REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

fn decimal_arg(cx: &mut FunctionContext, index: usize) -> NeonResult<Decimal> {
    let text = cx.argument::<JsString>(index)?.value(cx);
    match text.parse() {
        Ok(value) => Ok(value),
        Err(e) => cx.throw_error(format!("{e}")),
    }
}

fn optional_string_arg(cx: &mut FunctionContext, index: usize) -> NeonResult<Option<String>> {
    match cx.argument_opt(index) {
        Some(value) if value.is_a::<JsString, _>(cx) => {
            let text = value.downcast_or_throw::<JsString, _>(cx)?;
            Ok(Some(text.value(cx)))
        }
        _ => Ok(None),
    }
}

fn optional_decimal_arg(cx: &mut FunctionContext, index: usize) -> NeonResult<Option<Decimal>> {
    match optional_string_arg(cx, index)? {
        Some(text) => match text.parse() {
            Ok(value) => Ok(Some(value)),
            Err(e) => cx.throw_error(format!("{e}")),
        },
        None => Ok(None),
    }
}

fn format_options_arg(cx: &mut FunctionContext, index: usize) -> NeonResult<FormatOptions> {
    match optional_string_arg(cx, index)? {
        Some(json) => serde_json::from_str(&json).or_else(|e| cx.throw_error(format!("Invalid options JSON: {e}"))),
        None => Ok(FormatOptions::default()),
    }
}

/// Run `op` against a registered input and return its snapshot
fn with_input<'a>(
    cx: &mut FunctionContext<'a>,
    id: &str,
    op: impl FnOnce(&mut AmountInput),
) -> JsResult<'a, JsString> {
    try_with_input(cx, id, |input| {
        op(input);
        Ok(())
    })
}

/// Like `with_input`, throwing when `op` refuses the action
fn try_with_input<'a>(
    cx: &mut FunctionContext<'a>,
    id: &str,
    op: impl FnOnce(&mut AmountInput) -> Result<(), String>,
) -> JsResult<'a, JsString> {
    let json = {
        let mut registry = registry();
        let Some(entry) = registry.get_mut(id) else {
            return cx.throw_error(format!("Input not found: {id}"));
        };
        if let Err(message) = op(&mut entry.input) {
            return cx.throw_error(message);
        }
        entry.snapshot_json()
    };

    match json {
        Ok(json) => Ok(cx.string(json)),
        Err(e) => cx.throw_error(format!("Snapshot serialization failed: {e}")),
    }
}

/// Format a decimal string for display
fn format_number_js(mut cx: FunctionContext) -> JsResult<JsString> {
    let value = decimal_arg(&mut cx, 0)?;
    let options = format_options_arg(&mut cx, 1)?;

    Ok(cx.string(format_number(&value, &options)))
}

/// Split a decimal string into prefix, main value, scale suffix and suffix
fn decompose_number_js(mut cx: FunctionContext) -> JsResult<JsObject> {
    let value = decimal_arg(&mut cx, 0)?;
    let options = format_options_arg(&mut cx, 1)?;
    let parts = decompose_number(&value, &options);

    let js_object = JsObject::new(&mut cx);
    let prefix = cx.string(&parts.prefix);
    let main_value = cx.string(&parts.main_value);
    let scale_suffix = cx.string(&parts.scale_suffix);
    let suffix = cx.string(&parts.suffix);

    js_object.set(&mut cx, "prefix", prefix)?;
    js_object.set(&mut cx, "mainValue", main_value)?;
    js_object.set(&mut cx, "scaleSuffix", scale_suffix)?;
    js_object.set(&mut cx, "suffix", suffix)?;

    Ok(js_object)
}

fn to_balance_js(mut cx: FunctionContext) -> JsResult<JsString> {
    let max = decimal_arg(&mut cx, 0)?;
    let percentage = decimal_arg(&mut cx, 1)?;

    Ok(cx.string(to_balance(&max, &percentage).to_string()))
}

/// Percentage of `max` that `balance` represents, or null
fn to_percentage_js(mut cx: FunctionContext) -> JsResult<JsValue> {
    let balance = decimal_arg(&mut cx, 0)?;
    let max = optional_decimal_arg(&mut cx, 1)?;

    match to_percentage(&balance, max.as_ref()) {
        Some(percentage) => Ok(cx.string(percentage.to_string()).upcast()),
        None => Ok(cx.null().upcast()),
    }
}

fn sanitize_js(mut cx: FunctionContext) -> JsResult<JsString> {
    let next = cx.argument::<JsString>(0)?.value(&mut cx);
    let current = cx.argument::<JsString>(1)?.value(&mut cx);

    Ok(cx.string(sanitize(&next, &current)))
}

/// Create (or replace) an input instance
fn create_input(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let config = match optional_string_arg(&mut cx, 1)? {
        Some(json) => serde_json::from_str::<InputConfig>(&json)
            .or_else(|e| cx.throw_error(format!("Invalid config JSON: {e}")))?,
        None => InputConfig::default(),
    };
    let initial = optional_decimal_arg(&mut cx, 2)?;

    let entry = InputEntry::new(config, initial).or_else(|e| cx.throw_error(e))?;
    registry().insert(id.clone(), entry);

    with_input(&mut cx, &id, |_| {})
}

fn input_type(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let text = cx.argument::<JsString>(1)?.value(&mut cx);

    with_input(&mut cx, &id, |input| input.type_text(&text))
}

fn input_blur(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);

    with_input(&mut cx, &id, AmountInput::blur)
}

fn input_drag(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let percentage = decimal_arg(&mut cx, 1)?;

    with_input(&mut cx, &id, |input| input.drag_slider(&percentage))
}

fn input_release(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);

    with_input(&mut cx, &id, AmountInput::release_slider)
}

fn input_chip(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let index = cx.argument::<JsNumber>(1)?.value(&mut cx);
    if !(index >= 0.0 && index.fract() == 0.0) {
        return cx.throw_error(format!("Invalid chip index: {index}"));
    }

    try_with_input(&mut cx, &id, |input| apply_chip(input, index as usize))
}

fn input_max(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);

    try_with_input(&mut cx, &id, apply_max)
}

fn apply_chip(input: &mut AmountInput, index: usize) -> Result<(), String> {
    if index >= input.chips().len() {
        return Err(format!("Chip not found: {index}"));
    }
    if !input.click_chip(index) {
        return Err("Max balance not set".to_string());
    }
    Ok(())
}

fn apply_max(input: &mut AmountInput) -> Result<(), String> {
    if !input.click_max() {
        return Err("Max balance not set".to_string());
    }
    Ok(())
}

fn input_set_max(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let max = optional_decimal_arg(&mut cx, 1)?;

    with_input(&mut cx, &id, |input| input.set_max_balance(max))
}

fn input_set_balance(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let balance = optional_decimal_arg(&mut cx, 1)?;

    with_input(&mut cx, &id, |input| input.set_external_balance(balance))
}

fn input_poll(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);

    with_input(&mut cx, &id, |input| {
        input.poll();
    })
}

fn input_reset(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);

    with_input(&mut cx, &id, AmountInput::reset)
}

/// Formatted amount, maximum and notional value of an input
fn input_display(mut cx: FunctionContext) -> JsResult<JsString> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let options = format_options_arg(&mut cx, 1)?;
    let notional = optional_decimal_arg(&mut cx, 2)?;

    let json = {
        let mut registry = registry();
        let Some(entry) = registry.get_mut(&id) else {
            return cx.throw_error(format!("Input not found: {id}"));
        };
        entry.input.set_notional_value(notional);
        serde_json::to_string(&entry.input.display(&options))
    };

    match json {
        Ok(json) => Ok(cx.string(json)),
        Err(e) => cx.throw_error(format!("Display serialization failed: {e}")),
    }
}

/// Drop an input; its pending commit is discarded
fn input_dispose(mut cx: FunctionContext) -> JsResult<JsBoolean> {
    let id = cx.argument::<JsString>(0)?.value(&mut cx);
    let removed = registry().remove(&id).is_some();

    Ok(cx.boolean(removed))
}

#[neon::main]
fn main(mut cx: ModuleContext) -> NeonResult<()> {
    cx.export_function("formatNumber", format_number_js)?;
    cx.export_function("decomposeNumber", decompose_number_js)?;
    cx.export_function("toBalance", to_balance_js)?;
    cx.export_function("toPercentage", to_percentage_js)?;
    cx.export_function("sanitize", sanitize_js)?;
    cx.export_function("createInput", create_input)?;
    cx.export_function("inputType", input_type)?;
    cx.export_function("inputBlur", input_blur)?;
    cx.export_function("inputDrag", input_drag)?;
    cx.export_function("inputRelease", input_release)?;
    cx.export_function("inputChip", input_chip)?;
    cx.export_function("inputMax", input_max)?;
    cx.export_function("inputSetMax", input_set_max)?;
    cx.export_function("inputSetBalance", input_set_balance)?;
    cx.export_function("inputPoll", input_poll)?;
    cx.export_function("inputReset", input_reset)?;
    cx.export_function("inputDisplay", input_display)?;
    cx.export_function("inputDispose", input_dispose)?;
    Ok(())
}
