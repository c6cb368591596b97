//! Change notification bus.
//!
//! Fan-out of parameter change notifications and host messages to
//! subscribed views, keyed by parameter id or message topic. Subscribers
//! are invoked synchronously, in registration order. Nothing de-duplicates:
//! subscribing twice means being notified twice. Every subscription returns
//! a [`SubscriptionId`] so the owner can move it when its parameter address
//! changes (generator retarget).
//!
//! The bus holds weak references; an entry dies with its owning view and is
//! skipped thereafter.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Weak;

use overtone_core::{ParamId, Parameter};

use crate::messages::Message;

/// A view interested in one parameter's confirmed changes.
pub trait ParameterObserver {
    fn parameter_changed(&self, parameter: &Parameter);
}

/// A view interested in host messages on one topic.
pub trait MessageObserver {
    fn message_received(&self, topic: &str, payload: &Message);
}

/// Handle for one subscription table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscription tables and dispatch.
#[derive(Default)]
pub struct NotificationBus {
    next_id: Cell<u64>,
    parameters: RefCell<HashMap<ParamId, Vec<(SubscriptionId, Weak<dyn ParameterObserver>)>>>,
    messages: RefCell<HashMap<String, Vec<(SubscriptionId, Weak<dyn MessageObserver>)>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SubscriptionId(id)
    }

    /// Register an observer for one parameter id.
    pub fn subscribe_parameter(
        &self,
        id: ParamId,
        observer: Weak<dyn ParameterObserver>,
    ) -> SubscriptionId {
        let subscription = self.next_id();
        self.parameters
            .borrow_mut()
            .entry(id)
            .or_default()
            .push((subscription, observer));
        subscription
    }

    /// Remove one parameter subscription by handle.
    pub fn unsubscribe_parameter(&self, subscription: SubscriptionId) {
        for entries in self.parameters.borrow_mut().values_mut() {
            entries.retain(|(id, _)| *id != subscription);
        }
    }

    /// Invoke every live observer of the parameter's id, in registration
    /// order, with the full snapshot.
    ///
    /// The entry list is cloned before dispatch so an observer may
    /// subscribe or unsubscribe from inside the callback.
    pub fn notify_parameter_change(&self, parameter: &Parameter) {
        let entries = match self.parameters.borrow().get(&parameter.info.id) {
            Some(entries) => entries.clone(),
            None => return,
        };
        for (_, observer) in entries {
            if let Some(observer) = observer.upgrade() {
                observer.parameter_changed(parameter);
            }
        }
    }

    /// Register an observer for one message topic.
    pub fn subscribe_message(
        &self,
        topic: &str,
        observer: Weak<dyn MessageObserver>,
    ) -> SubscriptionId {
        let subscription = self.next_id();
        self.messages
            .borrow_mut()
            .entry(topic.to_owned())
            .or_default()
            .push((subscription, observer));
        subscription
    }

    /// Remove one message subscription by handle.
    pub fn unsubscribe_message(&self, subscription: SubscriptionId) {
        for entries in self.messages.borrow_mut().values_mut() {
            entries.retain(|(id, _)| *id != subscription);
        }
    }

    /// Invoke every live observer of the topic, in registration order.
    ///
    /// Returns the number of observers reached, so the caller can log
    /// unroutable messages.
    pub fn dispatch_message(&self, topic: &str, payload: &Message) -> usize {
        let entries = match self.messages.borrow().get(topic) {
            Some(entries) => entries.clone(),
            None => return 0,
        };
        let mut reached = 0;
        for (_, observer) in entries {
            if let Some(observer) = observer.upgrade() {
                observer.message_received(topic, payload);
                reached += 1;
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use overtone_core::{Parameter, ParameterInfo};

    use super::*;

    struct Recorder {
        label: &'static str,
        seen: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ParameterObserver for Recorder {
        fn parameter_changed(&self, _parameter: &Parameter) {
            self.seen.borrow_mut().push(self.label);
        }
    }

    impl MessageObserver for Recorder {
        fn message_received(&self, _topic: &str, _payload: &Message) {
            self.seen.borrow_mut().push(self.label);
        }
    }

    fn toggle(id: ParamId) -> Parameter {
        Parameter::toggle(ParameterInfo::new(id, "p"), 0.0)
    }

    #[test]
    fn test_fan_out_in_subscription_order() {
        let bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observers: Vec<Rc<Recorder>> = ["first", "second", "third"]
            .iter()
            .map(|label| {
                Rc::new(Recorder {
                    label,
                    seen: seen.clone(),
                })
            })
            .collect();
        for observer in &observers {
            let observer: Rc<dyn ParameterObserver> = observer.clone();
            let weak: Weak<dyn ParameterObserver> = Rc::downgrade(&observer);
            bus.subscribe_parameter(42, weak);
        }

        bus.notify_parameter_change(&toggle(42));
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);

        // A different id reaches nobody.
        bus.notify_parameter_change(&toggle(43));
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_duplicate_subscription_notifies_twice() {
        let bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observer = Rc::new(Recorder {
            label: "dup",
            seen: seen.clone(),
        });
        let observer: Rc<dyn ParameterObserver> = observer;
        let weak: Weak<dyn ParameterObserver> = Rc::downgrade(&observer);
        bus.subscribe_parameter(7, weak.clone());
        bus.subscribe_parameter(7, weak);

        bus.notify_parameter_change(&toggle(7));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_entry() {
        let bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observer = Rc::new(Recorder {
            label: "kept",
            seen: seen.clone(),
        });
        let observer: Rc<dyn ParameterObserver> = observer;
        let weak: Weak<dyn ParameterObserver> = Rc::downgrade(&observer);
        let dropped = bus.subscribe_parameter(7, weak.clone());
        bus.subscribe_parameter(7, weak);
        bus.unsubscribe_parameter(dropped);

        bus.notify_parameter_change(&toggle(7));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_dead_observers_are_skipped() {
        let bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let observer = Rc::new(Recorder {
                label: "gone",
                seen: seen.clone(),
            });
            let observer: Rc<dyn ParameterObserver> = observer;
            let weak: Weak<dyn ParameterObserver> = Rc::downgrade(&observer);
            bus.subscribe_parameter(7, weak);
        }
        bus.notify_parameter_change(&toggle(7));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_message_dispatch_by_topic() {
        let bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observer = Rc::new(Recorder {
            label: "analysis",
            seen: seen.clone(),
        });
        let observer: Rc<dyn MessageObserver> = observer;
        let weak: Weak<dyn MessageObserver> = Rc::downgrade(&observer);
        bus.subscribe_message("ResponseHarmonicsBuffer", weak);

        let payload = serde_json::json!({ "messageId": "ResponseHarmonicsBuffer" });
        assert_eq!(bus.dispatch_message("ResponseHarmonicsBuffer", &payload), 1);
        assert_eq!(bus.dispatch_message("SomethingElse", &payload), 0);
        assert_eq!(*seen.borrow(), vec!["analysis"]);
    }
}
