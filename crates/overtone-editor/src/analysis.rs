//! Harmonics/spectrum analysis view.
//!
//! A consumer of the generic message channel: it asks the host for an
//! analysis buffer of the active generator and draws the returned samples.
//! Two instances usually exist, one per request/response topic pair
//! (harmonics and spectrum). Oscillator parameter changes and generator
//! reselection invalidate the drawing and trigger a fresh request.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use futures::task::{LocalSpawn, LocalSpawnExt};
use log::{debug, warn};

use overtone_core::{ParamAddress, ParamKind, Parameter, Point, TargetKind};

use crate::bus::{MessageObserver, ParameterObserver, SubscriptionId};
use crate::controls::Control;
use crate::messages::{from_message, into_message, AnalysisBuffer, AnalysisRequest, Message};
use crate::session::EditSession;
use crate::widget::Canvas;

/// Sample rate the analysis is rendered at.
pub const ANALYSIS_SAMPLE_RATE: f64 = 32768.0;

/// Oscillator targets whose changes invalidate the analysis.
const WATCHED_TARGETS: [TargetKind; 5] = [
    TargetKind::Carrier,
    TargetKind::Modulator,
    TargetKind::ModIndex,
    TargetKind::Feedback,
    TargetKind::Shape,
];

/// Message-driven analysis drawing for one generator.
pub struct AnalysisView {
    session: Rc<EditSession>,
    spawner: Rc<dyn LocalSpawn>,
    canvas: Rc<dyn Canvas>,
    gennum: Cell<u8>,
    request_topic: String,
    response_topic: String,
    frequency: f64,
    buffer_size: usize,
    parameter_subscriptions: RefCell<Vec<SubscriptionId>>,
    self_weak: Weak<AnalysisView>,
}

impl AnalysisView {
    /// Build the view, subscribe it, and send the first request.
    #[allow(clippy::too_many_arguments)]
    pub async fn build(
        session: Rc<EditSession>,
        spawner: Rc<dyn LocalSpawn>,
        canvas: Rc<dyn Canvas>,
        gennum: u8,
        request_topic: &str,
        response_topic: &str,
        frequency: f64,
        buffer_size: usize,
    ) -> Rc<Self> {
        let view = Rc::new_cyclic(|weak| Self {
            session,
            spawner,
            canvas,
            gennum: Cell::new(gennum),
            request_topic: request_topic.to_owned(),
            response_topic: response_topic.to_owned(),
            frequency,
            buffer_size,
            parameter_subscriptions: RefCell::new(Vec::new()),
            self_weak: weak.clone(),
        });
        view.subscribe_parameters();
        let observer: Weak<dyn MessageObserver> = view.self_weak.clone();
        view.session.subscribe_message(&view.response_topic, observer);
        view.request_now().await;
        view
    }

    pub fn gennum(&self) -> u8 {
        self.gennum.get()
    }

    fn subscribe_parameters(&self) {
        let mut subscriptions = self.parameter_subscriptions.borrow_mut();
        for target in WATCHED_TARGETS {
            let id = ParamAddress::new(self.gennum.get(), ParamKind::Osc, target).encode();
            let observer: Weak<dyn ParameterObserver> = self.self_weak.clone();
            subscriptions.push(self.session.subscribe_parameter(id, observer));
        }
    }

    fn unsubscribe_parameters(&self) {
        for subscription in self.parameter_subscriptions.borrow_mut().drain(..) {
            self.session.unsubscribe_parameter(subscription);
        }
    }

    /// Ask the host for a fresh buffer.
    async fn request_now(&self) {
        let request = AnalysisRequest {
            sample_rate: ANALYSIS_SAMPLE_RATE,
            gennum: self.gennum.get(),
            buffer_size: self.buffer_size,
            frequency: self.frequency,
        };
        let message = match into_message(&self.request_topic, &request) {
            Ok(message) => message,
            Err(err) => {
                warn!("analysis request not encodable: {}", err);
                return;
            }
        };
        if let Err(err) = self.session.send_message(&self.request_topic, message).await {
            warn!("analysis request failed: {}", err);
        }
    }

    /// Schedule a request from a synchronous notification context.
    fn request_later(&self) {
        if let Some(view) = self.self_weak.upgrade() {
            let result = self
                .spawner
                .spawn_local(async move { view.request_now().await });
            if let Err(err) = result {
                warn!("analysis refresh not scheduled: {}", err);
            }
        }
    }

    fn render(&self, buffer: &AnalysisBuffer) {
        self.canvas.clear();
        if buffer.buffer_data.is_empty() {
            return;
        }
        let size = self.canvas.size();
        let scale = size.width / buffer.buffer_data.len() as f64;
        let midline = size.height / 2.0;
        let points: Vec<Point> = buffer
            .buffer_data
            .iter()
            .enumerate()
            .map(|(i, sample)| Point::new(i as f64 * scale, midline + sample * midline))
            .collect();
        self.canvas.stroke_polyline(&points);
    }
}

impl MessageObserver for AnalysisView {
    fn message_received(&self, _topic: &str, payload: &Message) {
        match from_message::<AnalysisBuffer>(payload) {
            Ok(buffer) => {
                if buffer.gennum == self.gennum.get() {
                    self.render(&buffer);
                } else {
                    debug!(
                        "dropping analysis buffer for generator {} (showing {})",
                        buffer.gennum,
                        self.gennum.get()
                    );
                }
            }
            Err(err) => warn!("bad analysis payload: {}", err),
        }
    }
}

impl ParameterObserver for AnalysisView {
    fn parameter_changed(&self, _parameter: &Parameter) {
        self.request_later();
    }
}

impl Control for AnalysisView {
    fn refresh(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(self.request_now())
    }

    fn retarget(&self, generator: u8) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            self.unsubscribe_parameters();
            self.gennum.set(generator);
            self.subscribe_parameters();
            self.request_now().await;
        })
    }
}
