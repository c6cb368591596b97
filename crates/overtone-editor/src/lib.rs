//! # overtone-editor
//!
//! Parameter binding and envelope-graph subsystem for the Overtone
//! synthesizer editor.
//!
//! The editor binds shell-supplied widgets to host parameters and keeps
//! them converged on host-confirmed state:
//!
//! ```text
//! user input -> control / envelope graph -> edit transaction
//!        -> host edit controller -> change notification bus
//!        -> every subscribed control refreshes -> redraw
//! ```
//!
//! Everything runs single-threaded on the UI event loop; host calls are
//! asynchronous suspension points. The host side is abstracted as
//! [`HostHandler`], the shell's widgets as the traits in [`widget`].
//!
//! ## Modules
//!
//! - [`session`] - The edit session service object (directory access,
//!   edit transactions, notification fan-out)
//! - [`host`] - The raw asynchronous host bridge trait
//! - [`bus`] - Subscription tables and synchronous fan-out
//! - [`controls`] - Toggle, knob, and switch parameter controls
//! - [`tabs`] - Generator selection tab strip
//! - [`envelope`] - The graphical envelope editor
//! - [`analysis`] - Message-driven harmonics/spectrum views
//! - [`panel`] - Main panel wiring
//! - [`messages`] - Host message payloads
//! - [`widget`] - Widget boundary traits

pub mod analysis;
pub mod bus;
pub mod controls;
pub mod envelope;
pub mod host;
pub mod messages;
pub mod panel;
pub mod session;
pub mod tabs;
pub mod widget;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use analysis::{AnalysisView, ANALYSIS_SAMPLE_RATE};
pub use bus::{MessageObserver, NotificationBus, ParameterObserver, SubscriptionId};
pub use controls::{edit_value, Control, KnobControl, SwitchControl, ToggleControl};
pub use envelope::{EnvelopeGraph, MIN_RATE_NORMALIZED};
pub use host::{HostFuture, HostHandler};
pub use messages::{
    from_message, into_message, topic_of, AnalysisBuffer, AnalysisRequest, Message,
    MESSAGE_ID_FIELD, REQUEST_HARMONICS_TOPIC, REQUEST_SPECTRUM_TOPIC, RESPONSE_HARMONICS_TOPIC,
    RESPONSE_SPECTRUM_TOPIC,
};
pub use panel::{EditorPanel, ANALYSIS_BUFFER_SIZE};
pub use session::EditSession;
pub use tabs::{GeneratorTab, GeneratorTabStrip, SelectionDelegate};
pub use widget::{Canvas, KnobWidget, SwitchWidget, TabWidget, ToggleWidget, WidgetTree};
