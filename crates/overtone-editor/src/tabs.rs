//! Generator selection tab strip.
//!
//! One tab per generator slot. Each tab carries that slot's enable toggle
//! and level knob, bound to the slot's own generator index (tab controls
//! are fixed; they are never retargeted). Exactly one tab is selected at a
//! time: selecting a tab deselects every sibling, tells the host which
//! unit is active, and invokes the selection delegate, which fans the new
//! index out to every generator-scoped control.

use std::cell::Cell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::warn;

use overtone_core::{ParamAddress, ParamKind, TargetKind};

use crate::controls::{KnobControl, ToggleControl};
use crate::session::EditSession;
use crate::widget::{TabWidget, WidgetTree};

/// Fan-out hook invoked after the selection changes.
pub type SelectionDelegate = Box<dyn Fn(u8) -> LocalBoxFuture<'static, ()>>;

/// One generator slot's tab.
pub struct GeneratorTab {
    pub index: u8,
    widget: Rc<dyn TabWidget>,
    selected: Cell<bool>,
    /// Enable toggle for this slot, if its widget exists.
    pub toggle: Option<Rc<ToggleControl>>,
    /// Output level knob for this slot, if its widget exists and the
    /// parameter is range-typed.
    pub level: Option<Rc<KnobControl>>,
}

impl GeneratorTab {
    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }
}

/// The tab strip.
pub struct GeneratorTabStrip {
    session: Rc<EditSession>,
    tabs: Vec<GeneratorTab>,
    delegate: SelectionDelegate,
}

impl GeneratorTabStrip {
    /// Build tabs for `count` generator slots and mark the host's currently
    /// selected slot. Slots whose tab widget is missing are skipped.
    pub async fn build(
        session: Rc<EditSession>,
        widgets: &dyn WidgetTree,
        count: u8,
        delegate: SelectionDelegate,
    ) -> Rc<Self> {
        let mut tabs = Vec::new();
        for index in 0..count {
            let widget = match widgets.tab(index) {
                Some(widget) => widget,
                None => {
                    warn!("no tab widget for generator {}", index);
                    continue;
                }
            };

            let toggle_slot = format!("generator_{}_toggle", index);
            let toggle = match widgets.toggle(&toggle_slot) {
                Some(toggle_widget) => Some(
                    ToggleControl::bind(
                        session.clone(),
                        ParamAddress::new(index, ParamKind::GeneratorToggle, TargetKind::None),
                        toggle_widget,
                    )
                    .await,
                ),
                None => {
                    warn!("missing widget slot: {}", toggle_slot);
                    None
                }
            };

            let level_slot = format!("generator_{}_level", index);
            let level = match widgets.knob(&level_slot) {
                Some(knob_widget) => {
                    match KnobControl::bind(
                        session.clone(),
                        ParamAddress::new(index, ParamKind::Osc, TargetKind::Amplitude),
                        knob_widget,
                    )
                    .await
                    {
                        Ok(control) => Some(control),
                        Err(err) => {
                            warn!("level knob for generator {} not bound: {}", index, err);
                            None
                        }
                    }
                }
                None => {
                    warn!("missing widget slot: {}", level_slot);
                    None
                }
            };

            widget.set_selected(false);
            tabs.push(GeneratorTab {
                index,
                widget,
                selected: Cell::new(false),
                toggle,
                level,
            });
        }

        let strip = Rc::new(Self {
            session,
            tabs,
            delegate,
        });
        // The initially active slot comes from the host. Nothing is stale
        // yet, so the delegate is not invoked.
        match strip.session.selected_generator().await {
            Ok(selected) => strip.mark_selected(selected),
            Err(err) => {
                warn!("selected generator query failed: {}", err);
                strip.mark_selected(0);
            }
        }
        strip
    }

    fn mark_selected(&self, index: u8) {
        for tab in &self.tabs {
            let selected = tab.index == index;
            tab.selected.set(selected);
            tab.widget.set_selected(selected);
        }
    }

    /// The currently selected slot.
    pub fn selected(&self) -> Option<u8> {
        self.tabs
            .iter()
            .find(|tab| tab.selected.get())
            .map(|tab| tab.index)
    }

    pub fn tabs(&self) -> &[GeneratorTab] {
        &self.tabs
    }

    /// Tab click entry point. Re-selecting the active tab is a no-op.
    pub async fn select(&self, index: u8) {
        if self.selected() == Some(index) || !self.tabs.iter().any(|tab| tab.index == index) {
            return;
        }
        self.mark_selected(index);
        if let Err(err) = self.session.select_generator(index).await {
            warn!("select generator {} failed: {}", index, err);
        }
        (self.delegate)(index).await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;

    use overtone_core::{encode_unit, UnitKind, NUM_GENERATORS};

    use crate::testing::{FakeWidgetTree, HostCall, MockHost};

    use super::*;

    fn install_generators(host: &MockHost, widgets: &FakeWidgetTree, count: u8) {
        for index in 0..count {
            widgets.add_tab(index);
            widgets.add_toggle(&format!("generator_{}_toggle", index));
            widgets.add_knob(&format!("generator_{}_level", index));
            let toggle_id =
                ParamAddress::new(index, ParamKind::GeneratorToggle, TargetKind::None).encode();
            host.add_toggle_parameter(toggle_id, "Enable", if index == 0 { 1.0 } else { 0.0 });
            let level_id =
                ParamAddress::new(index, ParamKind::Osc, TargetKind::Amplitude).encode();
            host.add_range_parameter(level_id, "Level", 0.5, 0.0, 1.0);
        }
    }

    fn recording_delegate() -> (SelectionDelegate, Rc<RefCell<Vec<u8>>>) {
        let fanned: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = fanned.clone();
        let delegate: SelectionDelegate = Box::new(move |generator| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.borrow_mut().push(generator);
            })
        });
        (delegate, fanned)
    }

    #[test]
    fn test_build_marks_host_selection() {
        let host = MockHost::new();
        let widgets = FakeWidgetTree::new();
        install_generators(&host, &widgets, NUM_GENERATORS);
        host.set_selected_unit(encode_unit(UnitKind::Generator, 2));
        let session = Rc::new(EditSession::new(Box::new(host.clone())));

        let (delegate, fanned) = recording_delegate();
        let strip = block_on(GeneratorTabStrip::build(
            session,
            &widgets,
            NUM_GENERATORS,
            delegate,
        ));

        assert_eq!(strip.selected(), Some(2));
        assert!(fanned.borrow().is_empty());
        // Every tab got its per-slot controls.
        assert!(strip.tabs().iter().all(|tab| tab.toggle.is_some() && tab.level.is_some()));
    }

    #[test]
    fn test_select_is_exclusive_and_fans_out() {
        let host = MockHost::new();
        let widgets = FakeWidgetTree::new();
        install_generators(&host, &widgets, NUM_GENERATORS);
        host.set_selected_unit(encode_unit(UnitKind::Generator, 0));
        let session = Rc::new(EditSession::new(Box::new(host.clone())));

        let (delegate, fanned) = recording_delegate();
        let strip = block_on(GeneratorTabStrip::build(
            session,
            &widgets,
            NUM_GENERATORS,
            delegate,
        ));
        host.clear_calls();

        block_on(strip.select(3));

        assert_eq!(strip.selected(), Some(3));
        let deselected = strip.tabs().iter().filter(|tab| !tab.is_selected()).count();
        assert_eq!(deselected, NUM_GENERATORS as usize - 1);
        assert!(host
            .calls()
            .contains(&HostCall::SelectUnit(encode_unit(UnitKind::Generator, 3))));
        assert_eq!(*fanned.borrow(), vec![3]);
    }

    #[test]
    fn test_reselect_is_a_no_op() {
        let host = MockHost::new();
        let widgets = FakeWidgetTree::new();
        install_generators(&host, &widgets, 4);
        host.set_selected_unit(encode_unit(UnitKind::Generator, 1));
        let session = Rc::new(EditSession::new(Box::new(host.clone())));

        let (delegate, fanned) = recording_delegate();
        let strip = block_on(GeneratorTabStrip::build(session, &widgets, 4, delegate));
        host.clear_calls();

        block_on(strip.select(1));
        assert!(fanned.borrow().is_empty());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_missing_tab_widget_is_skipped() {
        let host = MockHost::new();
        let widgets = FakeWidgetTree::new();
        install_generators(&host, &widgets, 3);
        // Slot 3 has parameters but no widgets at all.
        let toggle_id = ParamAddress::new(3, ParamKind::GeneratorToggle, TargetKind::None).encode();
        host.add_toggle_parameter(toggle_id, "Enable", 0.0);
        let session = Rc::new(EditSession::new(Box::new(host.clone())));

        let (delegate, _fanned) = recording_delegate();
        let strip = block_on(GeneratorTabStrip::build(session, &widgets, 4, delegate));
        assert_eq!(strip.tabs().len(), 3);
    }
}
