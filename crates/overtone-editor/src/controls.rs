//! Parameter controls.
//!
//! A control binds one widget to one [`ParamAddress`]: it converts between
//! the widget's plain values and the host's normalized form, drives the
//! edit transaction when the user moves the widget, and refreshes the
//! widget from the directory on demand. Controls are independent structs
//! sharing the [`Control`] capability trait; there is no view hierarchy.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use log::warn;

use overtone_core::{
    EditorError, EditorResult, ParamAddress, ParamId, ParamValue, Parameter, ValueRange,
};

use crate::bus::{ParameterObserver, SubscriptionId};
use crate::session::EditSession;
use crate::widget::{KnobWidget, SwitchWidget, ToggleWidget};

/// Capability set shared by every bound control.
pub trait Control {
    /// Re-fetch the bound parameter and update the widget.
    ///
    /// Never opens an edit bracket.
    fn refresh(&self) -> LocalBoxFuture<'_, ()>;

    /// Rewrite the bound address's generator slot, then refresh.
    fn retarget(&self, generator: u8) -> LocalBoxFuture<'_, ()>;
}

/// Run one interactive edit transaction: open the bracket, push the value,
/// mark it performed, close the bracket.
///
/// `set` and `perform` carry the same normalized value. A failing step
/// aborts the remaining chain; there is no retry.
pub async fn edit_value(
    session: &EditSession,
    id: ParamId,
    normalized: ParamValue,
) -> EditorResult<()> {
    session.begin_edit(id).await?;
    session.set_param_normalized(id, normalized).await?;
    session.perform_edit(id, normalized).await?;
    session.end_edit(id).await
}

/// Checkbox-style control for a toggle parameter.
pub struct ToggleControl {
    session: Rc<EditSession>,
    address: RefCell<ParamAddress>,
    widget: Rc<dyn ToggleWidget>,
}

impl ToggleControl {
    /// Bind a toggle widget and load its initial state.
    pub async fn bind(
        session: Rc<EditSession>,
        address: ParamAddress,
        widget: Rc<dyn ToggleWidget>,
    ) -> Rc<Self> {
        let control = Rc::new(Self {
            session,
            address: RefCell::new(address),
            widget,
        });
        control.refresh_now().await;
        control
    }

    pub fn param_id(&self) -> ParamId {
        self.address.borrow().encode()
    }

    /// Widget event entry point: the user checked or unchecked the box.
    pub async fn set_checked(&self, checked: bool) -> EditorResult<()> {
        let value = if checked { 1.0 } else { 0.0 };
        edit_value(&self.session, self.param_id(), value).await
    }

    async fn refresh_now(&self) {
        let id = self.param_id();
        match self.session.get_parameter(id).await {
            Ok(parameter) => self.widget.set_checked(parameter.is_on()),
            Err(err) => warn!("toggle refresh failed for {:#010x}: {}", id, err),
        }
    }
}

impl Control for ToggleControl {
    fn refresh(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(self.refresh_now())
    }

    fn retarget(&self, generator: u8) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            self.address.borrow_mut().retarget(generator);
            self.refresh_now().await;
        })
    }
}

/// Cached range snapshot of the bound parameter.
struct KnobState {
    range: ValueRange,
    normalized: ParamValue,
}

/// Rotary control for a range parameter.
///
/// Holds the last-known range snapshot so knob events can be converted to
/// normalized values without a directory round trip.
pub struct KnobControl {
    session: Rc<EditSession>,
    address: RefCell<ParamAddress>,
    widget: Rc<dyn KnobWidget>,
    state: RefCell<KnobState>,
    subscription: Cell<Option<SubscriptionId>>,
    self_weak: Weak<KnobControl>,
}

impl KnobControl {
    /// Bind a knob widget to a range parameter.
    ///
    /// Fetches the snapshot first and refuses to construct the control if
    /// the parameter has no value range.
    pub async fn bind(
        session: Rc<EditSession>,
        address: ParamAddress,
        widget: Rc<dyn KnobWidget>,
    ) -> EditorResult<Rc<Self>> {
        let id = address.encode();
        let parameter = session.get_parameter(id).await?;
        let range = match parameter.value_range() {
            Some(range) => range,
            None => return Err(EditorError::NotARange(id)),
        };
        widget.set_range(range);
        widget.show_plain(range.denormalize(parameter.normalized));

        let control = Rc::new_cyclic(|weak| Self {
            session: session.clone(),
            address: RefCell::new(address),
            widget,
            state: RefCell::new(KnobState {
                range,
                normalized: parameter.normalized,
            }),
            subscription: Cell::new(None),
            self_weak: weak.clone(),
        });
        let observer: Weak<dyn ParameterObserver> = control.self_weak.clone();
        control
            .subscription
            .set(Some(session.subscribe_parameter(id, observer)));
        Ok(control)
    }

    pub fn param_id(&self) -> ParamId {
        self.address.borrow().encode()
    }

    /// Widget event entry point: the user turned the knob to a plain value.
    pub async fn knob_turned(&self, plain: f64) -> EditorResult<()> {
        let normalized = self.state.borrow().range.normalize(plain);
        edit_value(&self.session, self.param_id(), normalized).await
    }

    /// Adopt a confirmed snapshot. Updates the cache and the widget unless
    /// the widget already shows this exact state.
    fn apply_snapshot(&self, parameter: &Parameter) {
        if parameter.info.id != self.param_id() {
            return;
        }
        let range = match parameter.value_range() {
            Some(range) => range,
            None => {
                warn!("range control notified with non-range parameter {:#010x}", parameter.info.id);
                return;
            }
        };
        {
            let mut state = self.state.borrow_mut();
            if state.range == range && state.normalized == parameter.normalized {
                return;
            }
            state.range = range;
            state.normalized = parameter.normalized;
        }
        self.widget.set_range(range);
        self.widget.show_plain(range.denormalize(parameter.normalized));
    }

    async fn refresh_now(&self) {
        let id = self.param_id();
        match self.session.get_parameter(id).await {
            Ok(parameter) => self.apply_snapshot(&parameter),
            Err(err) => warn!("knob refresh failed for {:#010x}: {}", id, err),
        }
    }

    fn move_subscription(&self, new_id: ParamId) {
        if let Some(subscription) = self.subscription.take() {
            self.session.unsubscribe_parameter(subscription);
        }
        let observer: Weak<dyn ParameterObserver> = self.self_weak.clone();
        self.subscription
            .set(Some(self.session.subscribe_parameter(new_id, observer)));
    }
}

impl ParameterObserver for KnobControl {
    fn parameter_changed(&self, parameter: &Parameter) {
        self.apply_snapshot(parameter);
    }
}

impl Control for KnobControl {
    fn refresh(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(self.refresh_now())
    }

    fn retarget(&self, generator: u8) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            let old_id = self.param_id();
            self.address.borrow_mut().retarget(generator);
            let new_id = self.param_id();
            if new_id != old_id {
                self.move_subscription(new_id);
            }
            self.refresh_now().await;
        })
    }
}

/// Image-backed on/off switch.
///
/// Unlike [`ToggleControl`] the widget is display-only; a click toggles the
/// current host value, and the confirmed change notification drives the
/// image swap.
pub struct SwitchControl {
    session: Rc<EditSession>,
    address: RefCell<ParamAddress>,
    widget: Rc<dyn SwitchWidget>,
    subscription: Cell<Option<SubscriptionId>>,
    self_weak: Weak<SwitchControl>,
}

impl SwitchControl {
    /// Bind a switch widget and load its initial state.
    pub async fn bind(
        session: Rc<EditSession>,
        address: ParamAddress,
        widget: Rc<dyn SwitchWidget>,
    ) -> Rc<Self> {
        let id = address.encode();
        let control = Rc::new_cyclic(|weak| Self {
            session: session.clone(),
            address: RefCell::new(address),
            widget,
            subscription: Cell::new(None),
            self_weak: weak.clone(),
        });
        let observer: Weak<dyn ParameterObserver> = control.self_weak.clone();
        control
            .subscription
            .set(Some(session.subscribe_parameter(id, observer)));
        control.refresh_now().await;
        control
    }

    pub fn param_id(&self) -> ParamId {
        self.address.borrow().encode()
    }

    /// Widget event entry point: the user clicked the switch.
    pub async fn toggle(&self) -> EditorResult<()> {
        let id = self.param_id();
        let parameter = self.session.get_parameter(id).await?;
        let next = if parameter.normalized == 0.0 { 1.0 } else { 0.0 };
        edit_value(&self.session, id, next).await
    }

    async fn refresh_now(&self) {
        let id = self.param_id();
        match self.session.get_parameter(id).await {
            Ok(parameter) => self.widget.show_on(parameter.normalized != 0.0),
            Err(err) => warn!("switch refresh failed for {:#010x}: {}", id, err),
        }
    }

    fn move_subscription(&self, new_id: ParamId) {
        if let Some(subscription) = self.subscription.take() {
            self.session.unsubscribe_parameter(subscription);
        }
        let observer: Weak<dyn ParameterObserver> = self.self_weak.clone();
        self.subscription
            .set(Some(self.session.subscribe_parameter(new_id, observer)));
    }
}

impl ParameterObserver for SwitchControl {
    fn parameter_changed(&self, parameter: &Parameter) {
        if parameter.info.id == self.param_id() {
            self.widget.show_on(parameter.normalized != 0.0);
        }
    }
}

impl Control for SwitchControl {
    fn refresh(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(self.refresh_now())
    }

    fn retarget(&self, generator: u8) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            let old_id = self.param_id();
            self.address.borrow_mut().retarget(generator);
            let new_id = self.param_id();
            if new_id != old_id {
                self.move_subscription(new_id);
            }
            self.refresh_now().await;
        })
    }
}
