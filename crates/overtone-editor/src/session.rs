//! Edit session: the service object brokering all host traffic.
//!
//! One [`EditSession`] is constructed per editor window and handed (by
//! `Rc`) to every component that needs directory access or notification
//! subscription; there is no ambient global state. It owns the raw
//! [`HostHandler`] bridge and the [`NotificationBus`], and it is the only
//! code that pushes values to the host, so it can guarantee the
//! convergence contract: every value-changing round trip re-fetches the
//! snapshot after the host confirms and fires exactly one change
//! notification. Widgets therefore settle on host-confirmed state, even
//! when the host clamps or quantizes the pushed value.

use std::collections::HashMap;
use std::rc::Weak;

use log::warn;

use overtone_core::{
    decode_unit, encode_unit, EditorResult, ParamId, ParamValue, Parameter, UnitKind,
};

use crate::bus::{MessageObserver, NotificationBus, ParameterObserver, SubscriptionId};
use crate::host::HostHandler;
use crate::messages::{self, Message};

/// The editor's connection to the host: directory access, edit
/// transactions, and change notification.
pub struct EditSession {
    host: Box<dyn HostHandler>,
    bus: NotificationBus,
}

impl EditSession {
    /// Wrap a host bridge.
    pub fn new(host: Box<dyn HostHandler>) -> Self {
        Self {
            host,
            bus: NotificationBus::new(),
        }
    }

    // -------------------------------------------------------------------
    // Edit transaction operations
    // -------------------------------------------------------------------

    /// Open an edit bracket.
    pub async fn begin_edit(&self, id: ParamId) -> EditorResult<()> {
        self.host.begin_edit(id).await
    }

    /// Mark the bracketed edit performed.
    pub async fn perform_edit(&self, id: ParamId, value: ParamValue) -> EditorResult<()> {
        self.host.perform_edit(id, value).await
    }

    /// Close an edit bracket.
    pub async fn end_edit(&self, id: ParamId) -> EditorResult<()> {
        self.host.end_edit(id).await
    }

    /// Push a normalized value, then re-fetch the confirmed snapshot and
    /// notify subscribers once.
    pub async fn set_param_normalized(&self, id: ParamId, value: ParamValue) -> EditorResult<()> {
        self.host.set_param_normalized(id, value).await?;
        let parameter = self.host.get_parameter(id).await?;
        self.bus.notify_parameter_change(&parameter);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Directory access
    // -------------------------------------------------------------------

    /// Fetch one parameter snapshot.
    pub async fn get_parameter(&self, id: ParamId) -> EditorResult<Parameter> {
        self.host.get_parameter(id).await
    }

    /// Fetch a batch of parameter snapshots. Ids the host does not know are
    /// absent from the result.
    pub async fn get_parameters(
        &self,
        ids: Vec<ParamId>,
    ) -> EditorResult<HashMap<ParamId, Parameter>> {
        self.host.get_parameters(ids).await
    }

    /// Which generator slot is active, decoded from the host's unit id.
    pub async fn selected_generator(&self) -> EditorResult<u8> {
        let unit_id = self.host.get_selected_unit().await?;
        match decode_unit(unit_id) {
            Some((UnitKind::Generator, index)) => Ok(index as u8),
            Some((UnitKind::Root, _)) => Ok(0),
            None => {
                warn!("host reported unknown unit id {:#010x}", unit_id);
                Ok(0)
            }
        }
    }

    /// Tell the host which generator slot is active.
    pub async fn select_generator(&self, generator: u8) -> EditorResult<()> {
        self.host
            .select_unit(encode_unit(UnitKind::Generator, generator as u16))
            .await
    }

    // -------------------------------------------------------------------
    // Notification
    // -------------------------------------------------------------------

    /// Register an observer for one parameter id.
    pub fn subscribe_parameter(
        &self,
        id: ParamId,
        observer: Weak<dyn ParameterObserver>,
    ) -> SubscriptionId {
        self.bus.subscribe_parameter(id, observer)
    }

    /// Remove one parameter subscription.
    pub fn unsubscribe_parameter(&self, subscription: SubscriptionId) {
        self.bus.unsubscribe_parameter(subscription)
    }

    /// Register an observer for one message topic.
    pub fn subscribe_message(
        &self,
        topic: &str,
        observer: Weak<dyn MessageObserver>,
    ) -> SubscriptionId {
        self.bus.subscribe_message(topic, observer)
    }

    /// Remove one message subscription.
    pub fn unsubscribe_message(&self, subscription: SubscriptionId) {
        self.bus.unsubscribe_message(subscription)
    }

    /// Host push entry point: a parameter changed outside the editor
    /// (automation, another controller). Fans out to subscribers.
    pub fn notify_parameter_change(&self, parameter: &Parameter) {
        self.bus.notify_parameter_change(parameter);
    }

    /// Host push entry point: an asynchronous message arrived. The topic is
    /// read from the payload; unroutable payloads are logged and dropped.
    pub fn receive_message(&self, payload: &Message) {
        let topic = match messages::topic_of(payload) {
            Some(topic) => topic,
            None => {
                warn!("dropping message without a {} field", messages::MESSAGE_ID_FIELD);
                return;
            }
        };
        if self.bus.dispatch_message(topic, payload) == 0 {
            warn!("no subscriber for message topic {}", topic);
        }
    }

    /// Send a message to the host.
    pub async fn send_message(&self, topic: &str, payload: Message) -> EditorResult<()> {
        self.host.send_message(topic, payload).await
    }
}
