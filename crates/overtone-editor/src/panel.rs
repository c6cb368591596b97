//! Main editor panel.
//!
//! Wires the whole editor against the shell's widget tree: the generator
//! tab strip, the oscillator knobs, the envelope knob banks and graphs for
//! the modulated targets, and the analysis views. A missing widget slot is
//! logged and skipped; the rest of the panel still comes up. Generator
//! reselection fans out to every generator-scoped control exactly once.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::task::LocalSpawn;
use log::warn;

use overtone_core::{ParamAddress, ParamKind, TargetKind, NUM_GENERATORS};

use crate::analysis::AnalysisView;
use crate::controls::{Control, KnobControl, SwitchControl};
use crate::envelope::EnvelopeGraph;
use crate::messages::{
    REQUEST_HARMONICS_TOPIC, REQUEST_SPECTRUM_TOPIC, RESPONSE_HARMONICS_TOPIC,
    RESPONSE_SPECTRUM_TOPIC,
};
use crate::session::EditSession;
use crate::tabs::{GeneratorTabStrip, SelectionDelegate};
use crate::widget::WidgetTree;

/// Samples requested per analysis buffer.
pub const ANALYSIS_BUFFER_SIZE: usize = 1024;

/// Envelope knob bank: widget slot suffix and the parameter it binds.
const ENVELOPE_KNOBS: [(&str, ParamKind); 10] = [
    ("hold_time", ParamKind::EnvHoldTime),
    ("attack_rate", ParamKind::EnvAttackRate),
    ("attack_level", ParamKind::EnvAttackLevel),
    ("decay1_rate", ParamKind::EnvDecayRate1),
    ("decay1_level", ParamKind::EnvDecayLevel1),
    ("decay2_rate", ParamKind::EnvDecayRate2),
    ("sustain_level", ParamKind::EnvSustainLevel),
    ("release1_rate", ParamKind::EnvReleaseRate1),
    ("release1_level", ParamKind::EnvReleaseLevel1),
    ("release2_rate", ParamKind::EnvReleaseRate2),
];

/// The modulated targets that get an envelope editor.
const ENVELOPE_TARGETS: [TargetKind; 2] = [TargetKind::Amplitude, TargetKind::ModIndex];

fn target_prefix(target: TargetKind) -> &'static str {
    match target {
        TargetKind::None => "none",
        TargetKind::Carrier => "carrier",
        TargetKind::Amplitude => "amp",
        TargetKind::Modulator => "mod",
        TargetKind::ModIndex => "index",
        TargetKind::Feedback => "feedback",
        TargetKind::Shape => "shape",
        TargetKind::Portamento => "portamento",
        TargetKind::OscType => "osc_type",
    }
}

/// The assembled editor.
pub struct EditorPanel {
    session: Rc<EditSession>,
    strip: RefCell<Option<Rc<GeneratorTabStrip>>>,
    controls: RefCell<Vec<Rc<dyn Control>>>,
    self_weak: Weak<EditorPanel>,
}

impl EditorPanel {
    /// Build every control and sub-view the widget tree has slots for.
    pub async fn build(
        session: Rc<EditSession>,
        widgets: &dyn WidgetTree,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Rc<Self> {
        let panel = Rc::new_cyclic(|weak| Self {
            session: session.clone(),
            strip: RefCell::new(None),
            controls: RefCell::new(Vec::new()),
            self_weak: weak.clone(),
        });

        let delegate: SelectionDelegate = {
            let weak = panel.self_weak.clone();
            Box::new(move |generator| {
                let weak = weak.clone();
                Box::pin(async move {
                    if let Some(panel) = weak.upgrade() {
                        panel.update_selected_generator(generator).await;
                    }
                })
            })
        };
        let strip =
            GeneratorTabStrip::build(session.clone(), widgets, NUM_GENERATORS, delegate).await;
        let selected = strip.selected().unwrap_or(0);
        *panel.strip.borrow_mut() = Some(strip);

        // Oscillator knobs, targeting the selected generator.
        let oscillator_knobs = [
            ("carrier_ratio", TargetKind::Carrier),
            ("modulator_ratio", TargetKind::Modulator),
            ("modulation_index", TargetKind::ModIndex),
        ];
        for (slot, target) in oscillator_knobs {
            panel
                .bind_knob(
                    widgets,
                    slot,
                    ParamAddress::new(selected, ParamKind::Osc, target),
                )
                .await;
        }

        // Portamento on/off switch for the selected generator.
        match widgets.switch("portamento_switch") {
            Some(widget) => {
                let address = ParamAddress::new(selected, ParamKind::Osc, TargetKind::Portamento);
                let control = SwitchControl::bind(session.clone(), address, widget).await;
                panel.controls.borrow_mut().push(control);
            }
            None => warn!("missing widget slot: portamento_switch"),
        }

        // Envelope knob banks and graphs.
        for target in ENVELOPE_TARGETS {
            panel.bind_envelope_knobs(widgets, selected, target).await;

            let graph_slot = format!("{}_env_graph", target_prefix(target));
            match widgets.canvas(&graph_slot) {
                Some(canvas) => {
                    let graph =
                        EnvelopeGraph::build(session.clone(), selected, target, canvas).await;
                    panel.controls.borrow_mut().push(graph);
                }
                None => warn!("missing widget slot: {}", graph_slot),
            }
        }

        // Analysis views, one per topic pair.
        let analysis_views = [
            (
                "harmonics_graph",
                REQUEST_HARMONICS_TOPIC,
                RESPONSE_HARMONICS_TOPIC,
                64.0,
            ),
            (
                "spectrum_graph",
                REQUEST_SPECTRUM_TOPIC,
                RESPONSE_SPECTRUM_TOPIC,
                256.0,
            ),
        ];
        for (slot, request_topic, response_topic, frequency) in analysis_views {
            match widgets.canvas(slot) {
                Some(canvas) => {
                    let view = AnalysisView::build(
                        session.clone(),
                        spawner.clone(),
                        canvas,
                        selected,
                        request_topic,
                        response_topic,
                        frequency,
                        ANALYSIS_BUFFER_SIZE,
                    )
                    .await;
                    panel.controls.borrow_mut().push(view);
                }
                None => warn!("missing widget slot: {}", slot),
            }
        }

        panel
    }

    async fn bind_knob(&self, widgets: &dyn WidgetTree, slot: &str, address: ParamAddress) {
        match widgets.knob(slot) {
            Some(widget) => {
                match KnobControl::bind(self.session.clone(), address, widget).await {
                    Ok(control) => self.controls.borrow_mut().push(control),
                    Err(err) => warn!("knob {} not bound: {}", slot, err),
                }
            }
            None => warn!("missing widget slot: {}", slot),
        }
    }

    async fn bind_envelope_knobs(
        &self,
        widgets: &dyn WidgetTree,
        generator: u8,
        target: TargetKind,
    ) {
        let prefix = target_prefix(target);
        for (suffix, kind) in ENVELOPE_KNOBS {
            let slot = format!("{}_env_{}", prefix, suffix);
            self.bind_knob(widgets, &slot, ParamAddress::new(generator, kind, target))
                .await;
        }
    }

    /// The tab strip, once built.
    pub fn tab_strip(&self) -> Option<Rc<GeneratorTabStrip>> {
        self.strip.borrow().clone()
    }

    /// All generator-scoped controls and sub-views.
    pub fn controls(&self) -> Vec<Rc<dyn Control>> {
        self.controls.borrow().clone()
    }

    /// Tab click entry point.
    pub async fn select_generator(&self, index: u8) {
        let strip = self.strip.borrow().clone();
        if let Some(strip) = strip {
            strip.select(index).await;
        }
    }

    /// Fan a new generator index out to every generator-scoped control.
    pub async fn update_selected_generator(&self, generator: u8) {
        let controls = self.controls();
        for control in controls {
            control.retarget(generator).await;
        }
    }
}
