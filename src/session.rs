//! Click-driven point-acquisition workflow.
//!
//! The workflow is a finite-state machine over discrete operator input:
//!
//! ```text
//! AwaitModeSelect ── direct ──▶ DirectCollect ───────────────▶ Complete
//!        │                                                        ▲
//!        └── inferred ─▶ SegmentCollect ─▶ AwaitCornerIndex ─▶ FillRemaining
//! ```
//!
//! plus a terminal `Cancelled` phase reachable from any non-terminal phase
//! via [`InputEvent::Abort`]. Transitions are expressed as a pure function
//! [`step`] from (context, event) to (context, effect list); the event loop
//! that feeds clicks and renders effects is an external collaborator.
//!
//! Clicks arrive in display coordinates and are converted to source space
//! immediately, so the partial result never holds a display-space point.
//! Input that the current phase has no use for is ignored rather than
//! escalated: the machine is permissive about irrelevant events and strict
//! about per-phase click quotas.

use crate::display::DisplayScale;
use crate::intersect::segment_intersection;
use crate::types::{Point2D, PointSet, POINT_COUNT};
use log::{debug, warn};
use serde::Deserialize;

/// Clicks required by direct collection and by segment collection.
pub const PHASE_ONE_CLICKS: usize = POINT_COUNT;
/// Clicks required to fill the remaining slots after virtual-point
/// assignment.
pub const PHASE_TWO_CLICKS: usize = POINT_COUNT - 1;

/// Acquisition mode, chosen by the operator before any clicking begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Click the four corners directly, in slot order.
    Direct,
    /// Infer one corner as the intersection of two clicked segments, then
    /// click the remaining three.
    Inferred,
}

/// Discrete operator input delivered by the hosting event loop.
#[derive(Clone, Debug)]
pub enum InputEvent {
    SelectMode(Mode),
    /// Primary button press at display coordinates.
    Click { x: f64, y: f64 },
    /// Raw operator text naming the corner slot (1-based) the virtual point
    /// occupies. Parsed here; invalid input defaults to corner 1.
    CornerIndex(String),
    /// Explicit abort (e.g. escape key).
    Abort,
}

/// Workflow phase. `Complete` and `Cancelled` are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    AwaitModeSelect,
    DirectCollect,
    /// Virtual-point phase 1: clicks {1,2} form segment AB, {3,4} form CD.
    SegmentCollect,
    /// The two segments intersected; waiting for the designated-corner
    /// index.
    AwaitCornerIndex { virtual_point: Point2D },
    /// Virtual-point phase 2: remaining clicks fill empty slots in
    /// ascending slot order.
    FillRemaining,
    Complete,
    Cancelled,
}

/// Side effects requested by a transition, in order. The event loop renders
/// or reports them; the state machine itself never touches I/O.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// A click was accepted; mark it on the preview. `ordinal` counts clicks
    /// within the current phase, starting at 1.
    ClickMarked { display: Point2D, ordinal: usize },
    /// The intersection solver produced the virtual point (source space).
    VirtualPointInferred { point: Point2D },
    /// Prompt the operator for the designated-corner index.
    AwaitingCornerIndex,
    /// The supplied corner index was unusable; corner 1 was used instead.
    CornerIndexDefaulted { raw: String },
    /// The clicked segments were parallel or coincident; phase 1 restarts.
    DegenerateSegments,
    /// Phase 2 begins; `occupied_slot` holds the virtual point.
    RemainingPhaseStarted { occupied_slot: usize },
    Completed,
    Cancelled,
}

/// Session state threaded through [`step`]: current phase, the click buffer
/// of the phase in progress (source space), the partially filled result, and
/// the display scale used to convert incoming clicks.
#[derive(Clone, Debug)]
pub struct SessionContext {
    scale: DisplayScale,
    phase: Phase,
    clicks: Vec<Point2D>,
    points: PointSet,
}

impl SessionContext {
    pub fn new(scale: DisplayScale) -> Self {
        Self {
            scale,
            phase: Phase::AwaitModeSelect,
            clicks: Vec::with_capacity(PHASE_ONE_CLICKS),
            points: PointSet::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Partial result; complete only in the `Complete` phase.
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Complete | Phase::Cancelled)
    }

    /// The finished, read-only 4-point result, available once the session
    /// completed. `None` in every other phase, including `Cancelled`.
    pub fn completed_points(&self) -> Option<&PointSet> {
        match self.phase {
            Phase::Complete => Some(&self.points),
            _ => None,
        }
    }
}

/// Advance the workflow by one event.
///
/// Pure with respect to the outside world: all rendering and reporting is
/// returned as [`Effect`]s for the caller to apply.
pub fn step(mut ctx: SessionContext, event: &InputEvent) -> (SessionContext, Vec<Effect>) {
    // Abort wins in every non-terminal phase; no partial results survive.
    if matches!(event, InputEvent::Abort) && !ctx.is_terminal() {
        debug!("session aborted in phase {:?}", ctx.phase);
        ctx.phase = Phase::Cancelled;
        return (ctx, vec![Effect::Cancelled]);
    }

    match (ctx.phase.clone(), event) {
        (Phase::AwaitModeSelect, InputEvent::SelectMode(mode)) => {
            ctx.phase = match mode {
                Mode::Direct => Phase::DirectCollect,
                Mode::Inferred => Phase::SegmentCollect,
            };
            debug!("mode selected: {mode:?}");
            (ctx, Vec::new())
        }

        (Phase::DirectCollect, InputEvent::Click { x, y }) => {
            let (_, effects) = accept_click(&mut ctx, *x, *y);
            if ctx.clicks.len() == PHASE_ONE_CLICKS {
                for (slot, &p) in ctx.clicks.iter().enumerate() {
                    ctx.points.fill(slot, p);
                }
                ctx.phase = Phase::Complete;
                return (ctx, with(effects, Effect::Completed));
            }
            (ctx, effects)
        }

        (Phase::SegmentCollect, InputEvent::Click { x, y }) => {
            let (_, effects) = accept_click(&mut ctx, *x, *y);
            if ctx.clicks.len() < PHASE_ONE_CLICKS {
                return (ctx, effects);
            }
            let (a, b, c, d) = (ctx.clicks[0], ctx.clicks[1], ctx.clicks[2], ctx.clicks[3]);
            ctx.clicks.clear();
            match segment_intersection(a, b, c, d) {
                Some(point) => {
                    debug!("virtual point inferred at ({:.3}, {:.3})", point.x, point.y);
                    ctx.phase = Phase::AwaitCornerIndex {
                        virtual_point: point,
                    };
                    let mut effects = with(effects, Effect::VirtualPointInferred { point });
                    effects.push(Effect::AwaitingCornerIndex);
                    (ctx, effects)
                }
                None => {
                    // Stay in phase 1; the operator re-clicks both segments.
                    warn!("clicked segments are parallel or coincident");
                    (ctx, with(effects, Effect::DegenerateSegments))
                }
            }
        }

        (Phase::AwaitCornerIndex { virtual_point }, InputEvent::CornerIndex(raw)) => {
            let point = virtual_point;
            let mut effects = Vec::new();
            let slot = match parse_corner_index(raw) {
                Some(slot) => slot,
                None => {
                    warn!("corner index {raw:?} invalid, defaulting to corner 1");
                    effects.push(Effect::CornerIndexDefaulted { raw: raw.clone() });
                    0
                }
            };
            ctx.points.fill(slot, point);
            ctx.clicks.clear();
            ctx.phase = Phase::FillRemaining;
            effects.push(Effect::RemainingPhaseStarted {
                occupied_slot: slot,
            });
            (ctx, effects)
        }

        (Phase::FillRemaining, InputEvent::Click { x, y }) => {
            let (point, effects) = accept_click(&mut ctx, *x, *y);
            // Assignment policy: lowest-numbered empty slot, not operator
            // intent.
            if let Some(slot) = ctx.points.first_empty() {
                ctx.points.fill(slot, point);
            }
            if ctx.points.is_complete() {
                ctx.phase = Phase::Complete;
                return (ctx, with(effects, Effect::Completed));
            }
            (ctx, effects)
        }

        // Anything else is irrelevant to the current phase: mode changes
        // after collection began, clicks while a prompt is pending, stray
        // corner-index input, events after a terminal phase.
        _ => (ctx, Vec::new()),
    }
}

/// Convert a display click to source space, buffer it, and emit its marker
/// effect. Returns the source-space point.
fn accept_click(ctx: &mut SessionContext, x: f64, y: f64) -> (Point2D, Vec<Effect>) {
    let display = Point2D::new(x, y);
    let source = ctx.scale.to_source(display);
    ctx.clicks.push(source);
    let effects = vec![Effect::ClickMarked {
        display,
        ordinal: ctx.clicks.len(),
    }];
    (source, effects)
}

/// Parse a 1-based corner index in [1, 4] to a slot number. `None` for
/// unparseable or out-of-range input; both default to slot 0 upstream.
fn parse_corner_index(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(idx) if (1..=POINT_COUNT).contains(&idx) => Some(idx - 1),
        _ => None,
    }
}

fn with(mut effects: Vec<Effect>, extra: Effect) -> Vec<Effect> {
    effects.push(extra);
    effects
}
