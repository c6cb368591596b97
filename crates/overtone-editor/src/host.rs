//! Host edit controller contract.
//!
//! The plugin shell bridges these calls to the actual host (over whatever
//! wire the platform uses); the editor only sees this trait. Every call is
//! an asynchronous request/response pair and a potential suspension point.
//! Calls for different parameters may complete in any order; the caller is
//! responsible for not overlapping an edit bracket for a single parameter.

use std::collections::HashMap;

use futures::future::LocalBoxFuture;

use overtone_core::{EditorResult, ParamId, ParamValue, Parameter};

use crate::messages::Message;

/// Future type returned by host calls.
///
/// Futures are local (not `Send`): the whole editor runs on the UI thread.
pub type HostFuture<'a, T> = LocalBoxFuture<'a, EditorResult<T>>;

/// The raw asynchronous bridge to the host edit controller.
pub trait HostHandler {
    /// Open an interactive edit bracket for a parameter.
    fn begin_edit(&self, id: ParamId) -> HostFuture<'_, ()>;

    /// Mark the bracketed edit as performed with its final value. The host
    /// uses this for undo grouping and automation recording.
    fn perform_edit(&self, id: ParamId, value: ParamValue) -> HostFuture<'_, ()>;

    /// Close the edit bracket.
    fn end_edit(&self, id: ParamId) -> HostFuture<'_, ()>;

    /// Push a normalized value. The host may clamp or quantize it.
    fn set_param_normalized(&self, id: ParamId, value: ParamValue) -> HostFuture<'_, ()>;

    /// Fetch the current snapshot of one parameter.
    fn get_parameter(&self, id: ParamId) -> HostFuture<'_, Parameter>;

    /// Fetch snapshots for a batch of parameters. Unknown ids are simply
    /// absent from the result map.
    fn get_parameters(&self, ids: Vec<ParamId>) -> HostFuture<'_, HashMap<ParamId, Parameter>>;

    /// Query the active unit.
    fn get_selected_unit(&self) -> HostFuture<'_, u32>;

    /// Tell the host which unit is active.
    fn select_unit(&self, unit_id: u32) -> HostFuture<'_, ()>;

    /// Send a message to the host on the given topic.
    fn send_message(&self, topic: &str, payload: Message) -> HostFuture<'_, ()>;
}
