use anyhow::{Result, anyhow};
use serde::Serialize;
use wasm_bindgen::JsValue;
use wastemap_core::{OverlayGroup, Tool};

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Serialize through a JSON string and parse it on the JS side.
/// Keeps large scene documents out of per-field conversions.
pub(crate) fn to_js_json(value: &impl Serialize) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value)
        .map_err(|e| js_err(format!("Failed to serialize to JSON: {e}")))?;
    js_sys::JSON::parse(&text).map_err(|e| js_err(format!("Failed to parse JSON string: {e:?}")))
}

pub(crate) fn parse_tool(tool: &str) -> Result<Tool> {
    match tool {
        "bin" => Ok(Tool::Bin),
        "zone" => Ok(Tool::Zone),
        "route" => Ok(Tool::Route),
        other => Err(anyhow!("Unknown tool {other:?}. Expected one of: bin, zone, route")),
    }
}

pub(crate) fn parse_group(group: &str) -> Result<OverlayGroup> {
    match group {
        "zones" => Ok(OverlayGroup::Zones),
        "bins" => Ok(OverlayGroup::Bins),
        "routes" => Ok(OverlayGroup::Routes),
        "blocked" | "blocked_roads" => Ok(OverlayGroup::BlockedRoads),
        other => Err(anyhow!("Unknown layer group {other:?}. Expected one of: zones, bins, routes, blocked")),
    }
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}
