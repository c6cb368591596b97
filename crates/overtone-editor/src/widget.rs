//! Widget boundary traits.
//!
//! The editor never draws or handles raw input itself. The embedding shell
//! supplies the interactive widget primitives (rotary knob, checkbox,
//! image switch, tab header, drawing canvas) and a [`WidgetTree`] to look
//! them up by slot name; the editor computes state and instructs the
//! widgets. Input travels the other way: the shell calls the control and
//! view entry points (`set_checked`, `knob_turned`, `pointer_down`, ...).

use std::rc::Rc;

use overtone_core::{Point, Rect, Size, ValueRange};

/// A rotary knob display.
///
/// The widget owns pointer-to-angle conversion and rendering; the editor
/// only pushes the plain-value range and position.
pub trait KnobWidget {
    /// Configure the plain-value range the knob sweeps.
    fn set_range(&self, range: ValueRange);

    /// Move the knob to a plain value without emitting a change event.
    fn show_plain(&self, plain: f64);
}

/// A checkbox-style on/off widget.
pub trait ToggleWidget {
    /// Set the checked state without emitting a change event.
    fn set_checked(&self, checked: bool);
}

/// An image-backed on/off switch.
pub trait SwitchWidget {
    /// Show the on or off image.
    fn show_on(&self, on: bool);
}

/// One generator tab header.
pub trait TabWidget {
    /// Mark the tab as the selected one (or not).
    fn set_selected(&self, selected: bool);
}

/// A 2D drawing surface.
pub trait Canvas {
    /// Current drawable size in pixels.
    fn size(&self) -> Size;

    /// Erase the surface.
    fn clear(&self);

    /// Stroke a connected polyline.
    fn stroke_polyline(&self, points: &[Point]);

    /// Stroke a rectangle outline.
    fn stroke_rect(&self, rect: Rect);
}

/// Directory of named widget slots in the shell's layout.
///
/// A lookup returning `None` means the slot is absent from the layout; the
/// caller logs and skips the dependent control rather than failing the
/// whole build.
pub trait WidgetTree {
    fn knob(&self, slot: &str) -> Option<Rc<dyn KnobWidget>>;
    fn toggle(&self, slot: &str) -> Option<Rc<dyn ToggleWidget>>;
    fn switch(&self, slot: &str) -> Option<Rc<dyn SwitchWidget>>;
    fn tab(&self, index: u8) -> Option<Rc<dyn TabWidget>>;
    fn canvas(&self, slot: &str) -> Option<Rc<dyn Canvas>>;
}
