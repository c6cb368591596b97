//! # Overtone
//!
//! Editor subsystem for the Overtone multi-generator FM synthesizer.
//!
//! Overtone binds on-screen widgets (knobs, toggles, envelope graphs,
//! analysis views) to host synthesis parameters and keeps both sides
//! converged through the host's edit transaction protocol.
//!
//! ## Architecture
//!
//! ```text
//! Shell (widgets, event loop, host bridge)
//!        ↓ implements WidgetTree + HostHandler
//! EditorPanel (controls, tabs, envelope graphs, analysis views)
//!        ↓ EditSession
//! Host edit controller
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use overtone::prelude::*;
//!
//! async fn open_editor(
//!     host: Box<dyn HostHandler>,
//!     widgets: &dyn WidgetTree,
//!     spawner: Rc<dyn LocalSpawn>,
//! ) -> Rc<EditorPanel> {
//!     let session = Rc::new(EditSession::new(host));
//!     EditorPanel::build(session, widgets, spawner).await
//! }
//! ```

// Re-export sub-crates
pub use overtone_core as core;
pub use overtone_editor as editor;

/// Prelude module for convenient imports.
///
/// Import everything you need to embed the editor:
/// ```rust,ignore
/// use overtone::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use overtone_core::{
        EditorError, EditorResult, ParamAddress, ParamId, ParamKind, ParamValue, Parameter,
        ParameterInfo, ParameterKind, Point, Rect, Size, TargetKind, ValueRange, NUM_GENERATORS,
    };

    // Editor components
    pub use overtone_editor::{
        AnalysisView, Canvas, Control, EditSession, EditorPanel, EnvelopeGraph, GeneratorTabStrip,
        HostFuture, HostHandler, KnobControl, KnobWidget, Message, NotificationBus,
        SwitchControl, SwitchWidget, TabWidget, ToggleControl, ToggleWidget, WidgetTree,
    };
}
