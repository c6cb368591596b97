//! Graphical envelope editor.
//!
//! One [`EnvelopeGraph`] exists per (generator, target) pair. It loads the
//! envelope's parameter snapshots, derives pixel geometry with the core
//! layout math, draws the exponential-ramp trace, and lets the user drag a
//! segment's end point to rewrite the underlying rate and level
//! parameters.
//!
//! Dragging pushes plain `set_param_normalized` calls, not edit brackets;
//! the confirmed-change notification then patches the local snapshot and
//! recomputes geometry, so the drawing always reflects host-confirmed
//! state.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use log::warn;

use overtone_core::envelope::{
    layout_segments, trace_segment, SegmentGeometry, SegmentValues, ENVELOPE_PARAMS, NUM_SEGMENTS,
    SEGMENTS,
};
use overtone_core::{plain_value_of, ParamAddress, ParamId, ParamKind, Parameter, Point, TargetKind};

use crate::bus::{ParameterObserver, SubscriptionId};
use crate::controls::Control;
use crate::session::EditSession;
use crate::widget::Canvas;

/// Floor for rate parameters while dragging; a zero rate would collapse the
/// segment and make further horizontal dragging impossible.
pub const MIN_RATE_NORMALIZED: f64 = 0.01;

/// Interactive envelope graph for one generator/target pair.
pub struct EnvelopeGraph {
    session: Rc<EditSession>,
    target: TargetKind,
    generator: Cell<u8>,
    canvas: Rc<dyn Canvas>,
    parameters: RefCell<HashMap<ParamKind, Parameter>>,
    geometry: RefCell<[SegmentGeometry; NUM_SEGMENTS]>,
    dragging: Cell<Option<usize>>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
    self_weak: Weak<EnvelopeGraph>,
}

impl EnvelopeGraph {
    /// Build the graph, subscribe to its parameters, and do the initial
    /// load and draw.
    pub async fn build(
        session: Rc<EditSession>,
        generator: u8,
        target: TargetKind,
        canvas: Rc<dyn Canvas>,
    ) -> Rc<Self> {
        let graph = Rc::new_cyclic(|weak| Self {
            session,
            target,
            generator: Cell::new(generator),
            canvas,
            parameters: RefCell::new(HashMap::new()),
            geometry: RefCell::new([SegmentGeometry::default(); NUM_SEGMENTS]),
            dragging: Cell::new(None),
            subscriptions: RefCell::new(Vec::new()),
            self_weak: weak.clone(),
        });
        graph.subscribe_all();
        graph.reload().await;
        graph
    }

    pub fn generator(&self) -> u8 {
        self.generator.get()
    }

    /// Current segment geometry, for hit testing by the shell and for
    /// inspection in tests.
    pub fn segments(&self) -> [SegmentGeometry; NUM_SEGMENTS] {
        *self.geometry.borrow()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.get().is_some()
    }

    fn address_for(&self, kind: ParamKind) -> ParamAddress {
        ParamAddress::new(self.generator.get(), kind, self.target)
    }

    fn subscribe_all(&self) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        for kind in ENVELOPE_PARAMS {
            let observer: Weak<dyn ParameterObserver> = self.self_weak.clone();
            subscriptions.push(
                self.session
                    .subscribe_parameter(self.address_for(kind).encode(), observer),
            );
        }
    }

    fn unsubscribe_all(&self) {
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            self.session.unsubscribe_parameter(subscription);
        }
    }

    /// Batch-fetch every referenced parameter, then recompute and redraw.
    ///
    /// A parameter the host does not know stays absent, which the layout
    /// treats as a missing reference rather than a zero value.
    pub async fn reload(&self) {
        let ids: Vec<ParamId> = ENVELOPE_PARAMS
            .iter()
            .map(|kind| self.address_for(*kind).encode())
            .collect();
        match self.session.get_parameters(ids).await {
            Ok(mut snapshots) => {
                let mut parameters = self.parameters.borrow_mut();
                parameters.clear();
                for kind in ENVELOPE_PARAMS {
                    let id = self.address_for(kind).encode();
                    if let Some(parameter) = snapshots.remove(&id) {
                        parameters.insert(kind, parameter);
                    }
                }
            }
            Err(err) => {
                warn!(
                    "envelope load failed for generator {}: {}",
                    self.generator.get(),
                    err
                );
                return;
            }
        }
        self.remeasure();
        self.redraw();
    }

    /// Resolve plain values per segment. Level parameters have a 0..1 plain
    /// range, so plain values feed the level axis directly.
    fn segment_values(&self) -> [SegmentValues; NUM_SEGMENTS] {
        let parameters = self.parameters.borrow();
        let mut values = [SegmentValues::default(); NUM_SEGMENTS];
        for (spec, out) in SEGMENTS.iter().zip(&mut values) {
            out.duration = plain_value_of(spec.rate.and_then(|kind| parameters.get(&kind)));
            out.start_level =
                plain_value_of(spec.start_level.and_then(|kind| parameters.get(&kind)));
            out.end_level = plain_value_of(spec.end_level.and_then(|kind| parameters.get(&kind)));
        }
        values
    }

    fn remeasure(&self) {
        *self.geometry.borrow_mut() = layout_segments(&self.segment_values(), self.canvas.size());
    }

    fn redraw(&self) {
        self.canvas.clear();
        let values = self.segment_values();
        let geometry = self.geometry.borrow();
        for (value, segment) in values.iter().zip(geometry.iter()) {
            let trace = trace_segment(value, segment, self.canvas.size());
            if !trace.is_empty() {
                self.canvas.stroke_polyline(&trace);
            }
        }
        for segment in geometry.iter() {
            if let Some(drag_box) = segment.drag_box {
                self.canvas.stroke_rect(drag_box);
            }
        }
    }

    /// Pointer pressed. Latches the segment whose drag box contains the
    /// point (edges inclusive); returns whether the press was consumed.
    pub fn pointer_down(&self, point: Point) -> bool {
        if self.dragging.get().is_some() {
            return false;
        }
        let geometry = self.geometry.borrow();
        for (index, segment) in geometry.iter().enumerate() {
            if segment.drag_box.map_or(false, |b| b.contains(point)) {
                self.dragging.set(Some(index));
                return true;
            }
        }
        false
    }

    /// Pointer moved while latched: push the new rate and end level.
    ///
    /// Horizontal displacement from the segment's end point, divided by its
    /// width, adds to the rate's normalized value (floored at
    /// [`MIN_RATE_NORMALIZED`]); the vertical position maps to the end
    /// level. Geometry is not recomputed here; the change notification
    /// fired by the confirmed set does that.
    pub async fn pointer_move(&self, point: Point) {
        let index = match self.dragging.get() {
            Some(index) => index,
            None => return,
        };
        let spec = &SEGMENTS[index];
        let (width, end_x) = {
            let geometry = self.geometry.borrow();
            (geometry[index].width, geometry[index].end.x)
        };

        if let Some(rate_kind) = spec.rate {
            if width > 0.0 {
                let current = self
                    .parameters
                    .borrow()
                    .get(&rate_kind)
                    .map(|parameter| parameter.normalized);
                if let Some(current) = current {
                    let next = (current + (point.x - end_x) / width).max(MIN_RATE_NORMALIZED);
                    let id = self.address_for(rate_kind).encode();
                    if let Err(err) = self.session.set_param_normalized(id, next).await {
                        warn!("rate drag push failed for {:#010x}: {}", id, err);
                    }
                }
            }
        }

        if let Some(level_kind) = spec.end_level {
            let height = self.canvas.size().height;
            if height > 0.0 {
                let next = (1.0 - point.y / height).clamp(0.0, 1.0);
                let id = self.address_for(level_kind).encode();
                if let Err(err) = self.session.set_param_normalized(id, next).await {
                    warn!("level drag push failed for {:#010x}: {}", id, err);
                }
            }
        }
    }

    /// Pointer released: clear the drag latch.
    pub fn pointer_up(&self) {
        self.dragging.set(None);
    }

    /// Pointer left the canvas or the gesture was cancelled. Local effect
    /// only; nothing in flight is revoked.
    pub fn pointer_cancel(&self) {
        self.dragging.set(None);
    }
}

impl ParameterObserver for EnvelopeGraph {
    fn parameter_changed(&self, parameter: &Parameter) {
        let address = match ParamAddress::decode(parameter.info.id) {
            Some(address) => address,
            None => return,
        };
        if address.generator != self.generator.get() || address.target != self.target {
            return;
        }
        if !ENVELOPE_PARAMS.contains(&address.param) {
            return;
        }
        self.parameters
            .borrow_mut()
            .insert(address.param, parameter.clone());
        self.remeasure();
        self.redraw();
    }
}

impl Control for EnvelopeGraph {
    fn refresh(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(self.reload())
    }

    fn retarget(&self, generator: u8) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            self.dragging.set(None);
            self.unsubscribe_all();
            self.generator.set(generator);
            self.subscribe_all();
            self.reload().await;
        })
    }
}
