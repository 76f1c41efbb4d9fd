use geo::Coord;

use crate::map::DrawingKind;
use crate::routing::{RouteResult, Router, RoutingError};
use crate::store::{NewRoute, RecordSet, StoreError};
use crate::types::{BinId, RouteId, RouteMetrics, RouteStatus, ZoneId, closed_ring};

use super::mode::{CreationMode, Tool};

/// Minimum points before a zone can be completed.
pub const MIN_ZONE_POINTS: usize = 3;
/// Minimum stops before a route can be completed.
pub const MIN_ROUTE_STOPS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("the {active} tool is active")]
    ToolLocked { active: Tool },
    #[error("a zone needs at least 3 points, have {0}")]
    NotEnoughPoints(usize),
    #[error("a route needs at least 2 stops, have {0}")]
    NotEnoughStops(usize),
    #[error("a routing request is already in flight")]
    RoutingInFlight,
    #[error("no {0} creation is in progress")]
    NotActive(Tool),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a map click.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickEffect {
    Ignored,
    BinPlaced(BinId),
    ZonePointAdded(usize), // Points so far
}

/// Result of a bin marker click.
#[derive(Debug, Clone, PartialEq)]
pub enum BinClickEffect {
    /// No creation mode: open the bin's detail popup.
    ShowDetail(BinId),
    StopAdded(usize), // Stops so far
    AlreadySelected,
    Ignored,
}

/// A routing request issued by [`CreationWorkflow::begin_route`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub session: u64,
    pub stops: Vec<BinId>,
    pub waypoints: Vec<Coord<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteCompletion {
    /// `degraded` when routing failed and the path is the straight stop sequence.
    Created { id: RouteId, degraded: bool },
    /// The session that issued the request has ended; nothing was created.
    Stale,
}

/// The click-driven creation state machine. At most one flow is active.
#[derive(Debug, Default)]
pub struct CreationWorkflow {
    mode: CreationMode,
    sessions: u64,
}

impl CreationWorkflow {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn mode(&self) -> &CreationMode { &self.mode }

    /// Tool buttons other than the active one are disabled.
    pub fn is_tool_enabled(&self, tool: Tool) -> bool {
        match self.mode.tool() {
            None => true,
            Some(active) => active == tool,
        }
    }

    /// Whether the explicit "complete" action is available.
    pub fn can_complete(&self) -> bool {
        match &self.mode {
            // Distinct points, so repeated clicks on one spot never enable an invalid ring.
            CreationMode::DrawingZone { points } => closed_ring(points).is_ok(),
            CreationMode::BuildingRoute { stops, routing, .. } => !routing && stops.len() >= MIN_ROUTE_STOPS,
            _ => false,
        }
    }

    /// Whether `session` is the route-building session still in progress.
    pub fn is_current_session(&self, session: u64) -> bool {
        matches!(self.mode, CreationMode::BuildingRoute { session: current, .. } if current == session)
    }

    /// Any active mode turns the pointer into a crosshair.
    pub fn cursor_active(&self) -> bool { !self.mode.is_idle() }

    /// Select a tool. Selecting the active tool again cancels it.
    pub fn select_tool(&mut self, tool: Tool) -> Result<(), WorkflowError> {
        if let Some(active) = self.mode.tool() {
            if active == tool {
                self.cancel();
                return Ok(());
            }
            return Err(WorkflowError::ToolLocked { active });
        }

        self.mode = match tool {
            Tool::Bin => CreationMode::PlacingBin,
            Tool::Zone => CreationMode::DrawingZone { points: Vec::new() },
            Tool::Route => {
                self.sessions += 1;
                CreationMode::BuildingRoute { stops: Vec::new(), session: self.sessions, routing: false }
            }
        };
        tracing::debug!(%tool, "creation mode entered");
        Ok(())
    }

    /// Discard pending data and return to idle. Returns whether a mode was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.mode.is_idle();
        if was_active {
            tracing::debug!(mode = ?self.mode.tool(), "creation mode cancelled");
        }
        self.mode = CreationMode::Idle;
        was_active
    }

    pub fn click_map(&mut self, records: &mut RecordSet, at: Coord<f64>) -> ClickEffect {
        if self.mode == CreationMode::PlacingBin {
            self.mode = CreationMode::Idle;
            return ClickEffect::BinPlaced(records.add_bin(at, None));
        }
        match &mut self.mode {
            CreationMode::DrawingZone { points } => {
                points.push(at);
                ClickEffect::ZonePointAdded(points.len())
            }
            _ => ClickEffect::Ignored,
        }
    }

    pub fn click_bin(&mut self, records: &RecordSet, id: &BinId) -> BinClickEffect {
        if records.bin(id).is_none() { return BinClickEffect::Ignored }

        match &mut self.mode {
            // Only route building takes bin clicks; other modes still get the detail popup.
            CreationMode::Idle | CreationMode::PlacingBin | CreationMode::DrawingZone { .. } => {
                BinClickEffect::ShowDetail(id.clone())
            }
            CreationMode::BuildingRoute { routing: true, .. } => BinClickEffect::Ignored,
            CreationMode::BuildingRoute { stops, .. } => {
                if stops.contains(id) {
                    BinClickEffect::AlreadySelected
                } else {
                    stops.push(id.clone());
                    BinClickEffect::StopAdded(stops.len())
                }
            }
        }
    }

    /// Drop a deleted bin from the pending stop list. A request already in flight keeps its snapshot.
    pub fn forget_bin(&mut self, id: &BinId) -> bool {
        match &mut self.mode {
            CreationMode::BuildingRoute { stops, routing: false, .. } => {
                let before = stops.len();
                stops.retain(|s| s != id);
                stops.len() != before
            }
            _ => false,
        }
    }

    /// Materialize the drawn zone. On error the drawing stays in progress.
    pub fn complete_zone(&mut self, records: &mut RecordSet, name: Option<String>) -> Result<ZoneId, WorkflowError> {
        let CreationMode::DrawingZone { points } = &self.mode else {
            return Err(WorkflowError::NotActive(Tool::Zone));
        };
        if points.len() < MIN_ZONE_POINTS {
            return Err(WorkflowError::NotEnoughPoints(points.len()));
        }
        let id = records.add_zone(name, points)?;
        self.mode = CreationMode::Idle;
        Ok(id)
    }

    /// Start completing the route: snapshot the stops and mark the session as routing.
    pub fn begin_route(&mut self, records: &RecordSet) -> Result<RouteRequest, WorkflowError> {
        let CreationMode::BuildingRoute { stops, session, routing } = &mut self.mode else {
            return Err(WorkflowError::NotActive(Tool::Route));
        };
        if *routing {
            return Err(WorkflowError::RoutingInFlight);
        }
        let waypoints = records.stop_coordinates(stops);
        if stops.len() < MIN_ROUTE_STOPS || waypoints.len() < MIN_ROUTE_STOPS {
            return Err(WorkflowError::NotEnoughStops(stops.len().min(waypoints.len())));
        }
        *routing = true;
        Ok(RouteRequest { session: *session, stops: stops.clone(), waypoints })
    }

    /// Apply a routing outcome if its session is still current.
    /// A failed outcome still creates the route, along the straight stop sequence.
    pub fn finish_route(
        &mut self,
        records: &mut RecordSet,
        request: RouteRequest,
        outcome: Result<RouteResult, RoutingError>,
    ) -> RouteCompletion {
        let current = matches!(
            self.mode,
            CreationMode::BuildingRoute { session, routing: true, .. } if session == request.session
        );
        if !current {
            tracing::debug!(session = request.session, "discarding stale routing outcome");
            return RouteCompletion::Stale;
        }

        let (path, metrics, degraded) = match outcome {
            Ok(result) => {
                let metrics = RouteMetrics { distance_km: result.distance_km, duration_min: result.duration_min };
                (result.path.0, Some(metrics), false)
            }
            Err(error) => {
                tracing::warn!(%error, "routing failed, falling back to straight-line path");
                (request.waypoints, None, true)
            }
        };

        let id = records.add_route(NewRoute {
            name: None,
            stops: request.stops,
            path,
            metrics,
            status: RouteStatus::Pending,
        });
        self.mode = CreationMode::Idle;
        RouteCompletion::Created { id, degraded }
    }

    /// Run both halves of route completion against `router`, synchronously.
    pub fn complete_route<R: Router>(&mut self, records: &mut RecordSet, router: &R) -> Result<RouteCompletion, WorkflowError> {
        let request = self.begin_route(records)?;
        let outcome = router.route(&request.waypoints);
        Ok(self.finish_route(records, request, outcome))
    }

    /// Points of the in-progress drawing, if the active mode has one.
    pub fn drawing(&self, records: &RecordSet) -> Option<(Vec<Coord<f64>>, DrawingKind)> {
        match &self.mode {
            CreationMode::DrawingZone { points } => Some((points.clone(), DrawingKind::Zone)),
            CreationMode::BuildingRoute { stops, .. } => Some((records.stop_coordinates(stops), DrawingKind::Route)),
            _ => None,
        }
    }
}
