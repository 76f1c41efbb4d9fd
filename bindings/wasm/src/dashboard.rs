use std::collections::HashMap;

use serde_json::{Value, json};
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};
use wastemap_core::{
    Analytics, BinId, Coord, Dashboard, RouteCompletion, RouteId, RoutingError, SceneBackend, Settings, Statistics,
    ZoneId,
    io::write_records_to_geojson_bytes,
    routing::{OsrmEndpoint, parse_route_response},
    workflow::{ClickEffect, RouteRequest},
};

use crate::common::*;

/// The map page for a browser host.
///
/// The host replays `snapshot()` into its MapLibre instance, forwards clicks,
/// reports style load, and performs the routing `fetch` itself:
/// `begin_route()` returns the URL, `finish_route(session, body)` takes the response text
/// (or `null` when the request failed).
#[wasm_bindgen]
pub struct WasmDashboard {
    inner: Dashboard<SceneBackend>,
    endpoint: Option<OsrmEndpoint>, // None: routing disabled
    in_flight: HashMap<u64, RouteRequest>,
}

#[wasm_bindgen]
impl WasmDashboard {
    /// settings: optional object with the same shape as the TOML settings file.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<WasmDashboard, JsValue> {
        let settings: Settings = if settings.is_undefined() || settings.is_null() {
            Settings::default()
        } else {
            serde_wasm_bindgen::from_value(settings).map_err(js_err)?
        };
        let seed = settings.seed.unwrap_or_else(|| (js_sys::Math::random() * u32::MAX as f64) as u64);
        let endpoint = settings.routing.enabled.then(|| settings.routing.endpoint());

        Ok(WasmDashboard {
            inner: Dashboard::new(wastemap_core::seed_with(seed), SceneBackend::new(), settings.map),
            endpoint,
            in_flight: HashMap::new(),
        })
    }

    /// Create the map. Overlays are drawn once `style_loaded` is called.
    pub fn open(&mut self) -> Result<(), JsValue> {
        self.inner.open().map_err(js_err)
    }

    /// Report that the host map finished loading its style. Returns the number of groups drawn.
    pub fn style_loaded(&mut self) -> usize {
        self.inner.surface_mut().backend_mut().finish_loading();
        self.inner.handle_style_load()
    }

    /// Style document, markers and cursor as one object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js_json(&self.inner.surface().backend().snapshot())
    }

    pub fn select_tool(&mut self, tool: String) -> Result<(), JsValue> {
        let tool = parse_tool(&tool).map_err(js_err)?;
        self.inner.select_tool(tool).map_err(js_err)?;
        self.forget_ended_sessions();
        Ok(())
    }

    pub fn is_tool_enabled(&self, tool: String) -> Result<bool, JsValue> {
        Ok(self.inner.is_tool_enabled(parse_tool(&tool).map_err(js_err)?))
    }

    pub fn can_complete(&self) -> bool { self.inner.can_complete() }

    /// Current creation mode as `{ mode, ... }`.
    pub fn mode(&self) -> Result<JsValue, JsValue> { to_js_json(self.inner.workflow().mode()) }

    pub fn cancel(&mut self) {
        self.inner.cancel();
        self.forget_ended_sessions();
    }

    pub fn click_map(&mut self, lng: f64, lat: f64) -> Result<JsValue, JsValue> {
        let effect = match self.inner.click_map(Coord { x: lng, y: lat }) {
            ClickEffect::Ignored => json!({ "kind": "ignored" }),
            ClickEffect::BinPlaced(id) => json!({ "kind": "bin_placed", "id": id }),
            ClickEffect::ZonePointAdded(points) => json!({ "kind": "zone_point_added", "points": points }),
        };
        to_js_json(&effect)
    }

    /// Detail popup content, or `null` when the click went to route building.
    pub fn click_bin(&mut self, id: String) -> Result<JsValue, JsValue> {
        match self.inner.click_bin(&BinId::from(id)) {
            Some(detail) => to_js_json(&json!({ "detail": detail, "text": detail.to_string() })),
            None => Ok(JsValue::NULL),
        }
    }

    /// Zone popup content, or `null` while a creation mode is active.
    pub fn click_zone(&mut self, id: String) -> Result<JsValue, JsValue> {
        match self.inner.click_zone(&ZoneId::from(id)) {
            Some(summary) => to_js_json(&json!({ "summary": summary, "text": summary.to_string() })),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn complete_zone(&mut self, name: Option<String>) -> Result<String, JsValue> {
        let id = self.inner.complete_zone(name).map_err(js_err)?;
        Ok(id.to_string())
    }

    /// Start route completion. Returns `{ session, url }`; `url` is null when routing is disabled.
    pub fn begin_route(&mut self) -> Result<JsValue, JsValue> {
        let request = self.inner.begin_route().map_err(js_err)?;
        // No URL means the host skips the fetch and reports `null`, which degrades to straight lines.
        let url = match &self.endpoint {
            Some(endpoint) => endpoint.route_url(&request.waypoints)
                .map_err(|error| warn(&format!("cannot build routing request: {error}")))
                .ok(),
            None => None,
        };
        let session = request.session;
        self.in_flight.insert(session, request);
        to_js_json(&json!({ "session": session, "url": url }))
    }

    /// Finish route completion with the response body, or `null` if the fetch failed.
    pub fn finish_route(&mut self, session: f64, body: Option<String>) -> Result<JsValue, JsValue> {
        let Some(request) = self.in_flight.remove(&(session as u64)) else {
            return to_js_json(&json!({ "kind": "stale" }));
        };
        let outcome = match body {
            Some(body) => parse_route_response(body.as_bytes()),
            None if self.endpoint.is_none() => Err(RoutingError::Unavailable),
            None => Err(RoutingError::Transport("fetch failed".to_string())),
        };
        if let Err(error) = &outcome {
            warn(&format!("routing failed, using straight-line path: {error}"));
        }

        let result: Value = match self.inner.finish_route(request, outcome) {
            RouteCompletion::Created { id, degraded } => json!({ "kind": "created", "id": id, "degraded": degraded }),
            RouteCompletion::Stale => json!({ "kind": "stale" }),
        };
        to_js_json(&result)
    }

    /// Flip a record layer group. Returns the new visibility.
    pub fn toggle_layer(&mut self, group: String) -> Result<bool, JsValue> {
        let group = parse_group(&group).map_err(js_err)?;
        self.inner.toggle_layer(group).ok_or_else(|| js_err("layer group cannot be toggled"))
    }

    pub fn select_route(&mut self, id: Option<String>) { self.inner.select_route(id.map(RouteId::from)) }

    pub fn clear_selection(&mut self) { self.inner.clear_selection() }

    pub fn delete_zone(&mut self, id: String) -> Result<(), JsValue> {
        self.inner.delete_zone(&ZoneId::from(id)).map_err(js_err)
    }

    pub fn delete_bin(&mut self, id: String) -> Result<(), JsValue> {
        self.inner.delete_bin(&BinId::from(id)).map_err(js_err)
    }

    pub fn delete_route(&mut self, id: String) -> Result<(), JsValue> {
        self.inner.delete_route(&RouteId::from(id)).map_err(js_err)
    }

    pub fn mark_collected(&mut self, id: String) -> Result<(), JsValue> {
        self.inner.mark_collected(&BinId::from(id)).map_err(js_err)
    }

    pub fn statistics(&self) -> Result<JsValue, JsValue> { to_js_json(&Statistics::compute(self.inner.records())) }

    pub fn analytics(&self) -> Result<JsValue, JsValue> { to_js_json(&Analytics::compute(self.inner.records())) }

    /// Zones, bins and routes as a GeoJSON FeatureCollection string.
    pub fn export_geojson(&self) -> Result<String, JsValue> {
        let records = self.inner.records();
        let bytes = write_records_to_geojson_bytes(records.zones(), records.bins(), records.routes()).map_err(js_err)?;
        String::from_utf8(bytes).map_err(js_err)
    }

    /// Release the map. Safe to call more than once.
    pub fn close(&mut self) {
        self.in_flight.clear();
        self.inner.close();
    }
}

impl WasmDashboard {
    /// Pending fetches whose session has ended will only ever be stale.
    fn forget_ended_sessions(&mut self) {
        let workflow = self.inner.workflow();
        self.in_flight.retain(|&session, _| workflow.is_current_session(session));
    }
}
