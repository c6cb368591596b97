//! Test doubles shared by the unit tests: a call-recording mock host and
//! recording widget fakes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use overtone_core::{
    EditorError, EditorResult, ParamId, ParamValue, Parameter, ParameterInfo, Point, Rect, Size,
    ValueRange,
};

use crate::bus::{MessageObserver, ParameterObserver};
use crate::host::{HostFuture, HostHandler};
use crate::messages::Message;
use crate::widget::{Canvas, KnobWidget, SwitchWidget, TabWidget, ToggleWidget, WidgetTree};

/// One observed host call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    BeginEdit(ParamId),
    PerformEdit(ParamId, ParamValue),
    EndEdit(ParamId),
    SetParamNormalized(ParamId, ParamValue),
    GetParameter(ParamId),
    GetParameters(Vec<ParamId>),
    GetSelectedUnit,
    SelectUnit(u32),
    SendMessage(String),
}

#[derive(Default)]
struct MockHostState {
    calls: RefCell<Vec<HostCall>>,
    parameters: RefCell<HashMap<ParamId, Parameter>>,
    selected_unit: Cell<u32>,
    clamp_ceiling: Cell<Option<f64>>,
    fail_begin_edit: Cell<bool>,
    sent_messages: RefCell<Vec<(String, Message)>>,
}

/// In-memory host with a canned parameter store. Clones share state, so a
/// test can keep a handle while the session owns another.
#[derive(Clone, Default)]
pub struct MockHost(Rc<MockHostState>);

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_range_parameter(&self, id: ParamId, title: &str, normalized: f64, min: f64, max: f64) {
        self.0.parameters.borrow_mut().insert(
            id,
            Parameter::range(ParameterInfo::new(id, title), normalized, ValueRange::new(min, max)),
        );
    }

    pub fn add_toggle_parameter(&self, id: ParamId, title: &str, normalized: f64) {
        self.0
            .parameters
            .borrow_mut()
            .insert(id, Parameter::toggle(ParameterInfo::new(id, title).with_steps(1), normalized));
    }

    /// Make every pushed value clamp to at most `ceiling`, emulating
    /// host-side quantization.
    pub fn clamp_sets_to(&self, ceiling: f64) {
        self.0.clamp_ceiling.set(Some(ceiling));
    }

    /// Make `begin_edit` fail, to exercise aborted edit chains.
    pub fn fail_begin_edit(&self) {
        self.0.fail_begin_edit.set(true);
    }

    pub fn set_selected_unit(&self, unit_id: u32) {
        self.0.selected_unit.set(unit_id);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.0.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.0.calls.borrow_mut().clear();
    }

    pub fn sent_messages(&self) -> Vec<(String, Message)> {
        self.0.sent_messages.borrow().clone()
    }

    pub fn parameter(&self, id: ParamId) -> Option<Parameter> {
        self.0.parameters.borrow().get(&id).cloned()
    }

    pub fn remove_parameter(&self, id: ParamId) {
        self.0.parameters.borrow_mut().remove(&id);
    }

    /// Overwrite a stored normalized value without going through a set, as
    /// host-side automation would.
    pub fn store_normalized(&self, id: ParamId, normalized: f64) {
        if let Some(parameter) = self.0.parameters.borrow_mut().get_mut(&id) {
            parameter.normalized = normalized;
        }
    }

    fn record(&self, call: HostCall) {
        self.0.calls.borrow_mut().push(call);
    }

    fn done<T: 'static>(result: EditorResult<T>) -> HostFuture<'static, T> {
        Box::pin(async move { result })
    }
}

impl HostHandler for MockHost {
    fn begin_edit(&self, id: ParamId) -> HostFuture<'_, ()> {
        self.record(HostCall::BeginEdit(id));
        if self.0.fail_begin_edit.get() {
            return Self::done(Err(EditorError::HostCallFailed("begin_edit".to_owned())));
        }
        Self::done(Ok(()))
    }

    fn perform_edit(&self, id: ParamId, value: ParamValue) -> HostFuture<'_, ()> {
        self.record(HostCall::PerformEdit(id, value));
        Self::done(Ok(()))
    }

    fn end_edit(&self, id: ParamId) -> HostFuture<'_, ()> {
        self.record(HostCall::EndEdit(id));
        Self::done(Ok(()))
    }

    fn set_param_normalized(&self, id: ParamId, value: ParamValue) -> HostFuture<'_, ()> {
        self.record(HostCall::SetParamNormalized(id, value));
        let mut stored = value.clamp(0.0, 1.0);
        if let Some(ceiling) = self.0.clamp_ceiling.get() {
            stored = stored.min(ceiling);
        }
        match self.0.parameters.borrow_mut().get_mut(&id) {
            Some(parameter) => {
                parameter.normalized = stored;
                Self::done(Ok(()))
            }
            None => Self::done(Err(EditorError::UnknownParameter(id))),
        }
    }

    fn get_parameter(&self, id: ParamId) -> HostFuture<'_, Parameter> {
        self.record(HostCall::GetParameter(id));
        let result = self
            .0
            .parameters
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(EditorError::UnknownParameter(id));
        Self::done(result)
    }

    fn get_parameters(&self, ids: Vec<ParamId>) -> HostFuture<'_, HashMap<ParamId, Parameter>> {
        self.record(HostCall::GetParameters(ids.clone()));
        let parameters = self.0.parameters.borrow();
        let map = ids
            .into_iter()
            .filter_map(|id| parameters.get(&id).map(|p| (id, p.clone())))
            .collect();
        Self::done(Ok(map))
    }

    fn get_selected_unit(&self) -> HostFuture<'_, u32> {
        self.record(HostCall::GetSelectedUnit);
        Self::done(Ok(self.0.selected_unit.get()))
    }

    fn select_unit(&self, unit_id: u32) -> HostFuture<'_, ()> {
        self.record(HostCall::SelectUnit(unit_id));
        self.0.selected_unit.set(unit_id);
        Self::done(Ok(()))
    }

    fn send_message(&self, topic: &str, payload: Message) -> HostFuture<'_, ()> {
        self.record(HostCall::SendMessage(topic.to_owned()));
        self.0.sent_messages.borrow_mut().push((topic.to_owned(), payload));
        Self::done(Ok(()))
    }
}

/// Observer recording everything it is handed.
#[derive(Default)]
pub struct RecordingObserver {
    pub changes: RefCell<Vec<Parameter>>,
    pub messages: RefCell<Vec<(String, Message)>>,
}

impl ParameterObserver for RecordingObserver {
    fn parameter_changed(&self, parameter: &Parameter) {
        self.changes.borrow_mut().push(parameter.clone());
    }
}

impl MessageObserver for RecordingObserver {
    fn message_received(&self, topic: &str, payload: &Message) {
        self.messages.borrow_mut().push((topic.to_owned(), payload.clone()));
    }
}

pub fn parameter_observer(observer: &Rc<RecordingObserver>) -> Weak<dyn ParameterObserver> {
    let observer: Rc<dyn ParameterObserver> = observer.clone();
    Rc::downgrade(&observer)
}

pub fn message_observer(observer: &Rc<RecordingObserver>) -> Weak<dyn MessageObserver> {
    let observer: Rc<dyn MessageObserver> = observer.clone();
    Rc::downgrade(&observer)
}

// ---------------------------------------------------------------------
// Widget fakes
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct FakeKnob {
    pub ranges: RefCell<Vec<ValueRange>>,
    pub shown: RefCell<Vec<f64>>,
}

impl KnobWidget for FakeKnob {
    fn set_range(&self, range: ValueRange) {
        self.ranges.borrow_mut().push(range);
    }

    fn show_plain(&self, plain: f64) {
        self.shown.borrow_mut().push(plain);
    }
}

#[derive(Default)]
pub struct FakeToggle {
    pub checked: RefCell<Vec<bool>>,
}

impl ToggleWidget for FakeToggle {
    fn set_checked(&self, checked: bool) {
        self.checked.borrow_mut().push(checked);
    }
}

#[derive(Default)]
pub struct FakeSwitch {
    pub states: RefCell<Vec<bool>>,
}

impl SwitchWidget for FakeSwitch {
    fn show_on(&self, on: bool) {
        self.states.borrow_mut().push(on);
    }
}

#[derive(Default)]
pub struct FakeTab {
    pub selected: Cell<bool>,
}

impl TabWidget for FakeTab {
    fn set_selected(&self, selected: bool) {
        self.selected.set(selected);
    }
}

pub struct FakeCanvas {
    pub canvas_size: Size,
    pub polylines: RefCell<Vec<Vec<Point>>>,
    pub rects: RefCell<Vec<Rect>>,
    pub clears: Cell<usize>,
}

impl FakeCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            canvas_size: Size::new(width, height),
            polylines: RefCell::new(Vec::new()),
            rects: RefCell::new(Vec::new()),
            clears: Cell::new(0),
        }
    }
}

impl Canvas for FakeCanvas {
    fn size(&self) -> Size {
        self.canvas_size
    }

    fn clear(&self) {
        self.clears.set(self.clears.get() + 1);
        self.polylines.borrow_mut().clear();
        self.rects.borrow_mut().clear();
    }

    fn stroke_polyline(&self, points: &[Point]) {
        self.polylines.borrow_mut().push(points.to_vec());
    }

    fn stroke_rect(&self, rect: Rect) {
        self.rects.borrow_mut().push(rect);
    }
}

/// Slot directory backed by hash maps.
#[derive(Default)]
pub struct FakeWidgetTree {
    knobs: RefCell<HashMap<String, Rc<FakeKnob>>>,
    toggles: RefCell<HashMap<String, Rc<FakeToggle>>>,
    switches: RefCell<HashMap<String, Rc<FakeSwitch>>>,
    tabs: RefCell<HashMap<u8, Rc<FakeTab>>>,
    canvases: RefCell<HashMap<String, Rc<FakeCanvas>>>,
}

impl FakeWidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_knob(&self, slot: &str) -> Rc<FakeKnob> {
        let knob = Rc::new(FakeKnob::default());
        self.knobs.borrow_mut().insert(slot.to_owned(), knob.clone());
        knob
    }

    pub fn add_toggle(&self, slot: &str) -> Rc<FakeToggle> {
        let toggle = Rc::new(FakeToggle::default());
        self.toggles.borrow_mut().insert(slot.to_owned(), toggle.clone());
        toggle
    }

    pub fn add_switch(&self, slot: &str) -> Rc<FakeSwitch> {
        let switch = Rc::new(FakeSwitch::default());
        self.switches.borrow_mut().insert(slot.to_owned(), switch.clone());
        switch
    }

    pub fn add_tab(&self, index: u8) -> Rc<FakeTab> {
        let tab = Rc::new(FakeTab::default());
        self.tabs.borrow_mut().insert(index, tab.clone());
        tab
    }

    pub fn add_canvas(&self, slot: &str, width: f64, height: f64) -> Rc<FakeCanvas> {
        let canvas = Rc::new(FakeCanvas::new(width, height));
        self.canvases.borrow_mut().insert(slot.to_owned(), canvas.clone());
        canvas
    }
}

impl WidgetTree for FakeWidgetTree {
    fn knob(&self, slot: &str) -> Option<Rc<dyn KnobWidget>> {
        self.knobs.borrow().get(slot).cloned().map(|k| k as Rc<dyn KnobWidget>)
    }

    fn toggle(&self, slot: &str) -> Option<Rc<dyn ToggleWidget>> {
        self.toggles.borrow().get(slot).cloned().map(|t| t as Rc<dyn ToggleWidget>)
    }

    fn switch(&self, slot: &str) -> Option<Rc<dyn SwitchWidget>> {
        self.switches.borrow().get(slot).cloned().map(|s| s as Rc<dyn SwitchWidget>)
    }

    fn tab(&self, index: u8) -> Option<Rc<dyn TabWidget>> {
        self.tabs.borrow().get(&index).cloned().map(|t| t as Rc<dyn TabWidget>)
    }

    fn canvas(&self, slot: &str) -> Option<Rc<dyn Canvas>> {
        self.canvases.borrow().get(slot).cloned().map(|c| c as Rc<dyn Canvas>)
    }
}
