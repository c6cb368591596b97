//! Envelope segment layout math.
//!
//! A generator envelope has seven fixed segments (hold, attack, two decays,
//! a sustain plateau, two releases). Each segment references up to three
//! host parameters: a rate, a start level, and an end level. The functions
//! here are pure: given plain parameter values and a canvas size they
//! produce per-segment pixel geometry and the exponential-ramp trace the
//! graph view draws. Fetching values and reacting to changes is the editor
//! crate's job.

use crate::address::ParamKind;
use crate::types::{Point, Rect, Size};

/// Number of envelope segments.
pub const NUM_SEGMENTS: usize = 7;

/// Nominal duration of the sustain plateau, in the same unit as the rate
/// parameters' plain values.
pub const SUSTAIN_DURATION: f64 = 0.10;

/// Floor applied to levels before taking a logarithm.
pub const LEVEL_EPSILON: f64 = 0.001;

/// Half extent of the square drag affordance on a segment's end point.
pub const DRAG_BOX_HALF_EXTENT: f64 = 5.0;

/// One stage of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStage {
    Hold,
    Attack,
    Decay1,
    Decay2,
    Sustain,
    Release1,
    Release2,
}

/// Declarative parameter references of one segment.
///
/// A `None` reference means the segment has no such parameter (the sustain
/// plateau has no rate; hold has no levels), not a zero value.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub stage: SegmentStage,
    pub rate: Option<ParamKind>,
    pub start_level: Option<ParamKind>,
    pub end_level: Option<ParamKind>,
}

impl SegmentSpec {
    /// Whether the segment exposes a drag affordance.
    pub fn draggable(&self) -> bool {
        self.rate.is_some() || self.end_level.is_some()
    }
}

/// The segment chain. Adjacent segments share level parameters: each
/// segment's end level is the next segment's start level, and the sustain
/// plateau holds its level for [`SUSTAIN_DURATION`].
pub const SEGMENTS: [SegmentSpec; NUM_SEGMENTS] = [
    SegmentSpec {
        stage: SegmentStage::Hold,
        rate: Some(ParamKind::EnvHoldTime),
        start_level: None,
        end_level: None,
    },
    SegmentSpec {
        stage: SegmentStage::Attack,
        rate: Some(ParamKind::EnvAttackRate),
        start_level: None,
        end_level: Some(ParamKind::EnvAttackLevel),
    },
    SegmentSpec {
        stage: SegmentStage::Decay1,
        rate: Some(ParamKind::EnvDecayRate1),
        start_level: Some(ParamKind::EnvAttackLevel),
        end_level: Some(ParamKind::EnvDecayLevel1),
    },
    SegmentSpec {
        stage: SegmentStage::Decay2,
        rate: Some(ParamKind::EnvDecayRate2),
        start_level: Some(ParamKind::EnvDecayLevel1),
        end_level: Some(ParamKind::EnvSustainLevel),
    },
    SegmentSpec {
        stage: SegmentStage::Sustain,
        rate: None,
        start_level: Some(ParamKind::EnvSustainLevel),
        end_level: Some(ParamKind::EnvSustainLevel),
    },
    SegmentSpec {
        stage: SegmentStage::Release1,
        rate: Some(ParamKind::EnvReleaseRate1),
        start_level: Some(ParamKind::EnvSustainLevel),
        end_level: Some(ParamKind::EnvReleaseLevel1),
    },
    SegmentSpec {
        stage: SegmentStage::Release2,
        rate: Some(ParamKind::EnvReleaseRate2),
        start_level: Some(ParamKind::EnvReleaseLevel1),
        end_level: None,
    },
];

/// The distinct parameter kinds the envelope references, in host order.
pub const ENVELOPE_PARAMS: [ParamKind; 10] = [
    ParamKind::EnvHoldTime,
    ParamKind::EnvAttackRate,
    ParamKind::EnvAttackLevel,
    ParamKind::EnvDecayRate1,
    ParamKind::EnvDecayLevel1,
    ParamKind::EnvDecayRate2,
    ParamKind::EnvSustainLevel,
    ParamKind::EnvReleaseRate1,
    ParamKind::EnvReleaseLevel1,
    ParamKind::EnvReleaseRate2,
];

/// Plain parameter values of one segment, resolved by the caller.
///
/// Absent references resolve to 0.0 here; [`SEGMENTS`] records which
/// references exist at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentValues {
    /// Plain value of the rate parameter (segment duration).
    pub duration: f64,
    /// Plain start level in 0.0-1.0.
    pub start_level: f64,
    /// Plain end level in 0.0-1.0.
    pub end_level: f64,
}

/// Pixel geometry of one segment, derived from [`SegmentValues`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentGeometry {
    pub width: f64,
    pub start: Point,
    pub end: Point,
    /// Present only on draggable segments.
    pub drag_box: Option<Rect>,
}

/// Duration a segment contributes to the total: the sustain plateau is a
/// fixed constant, everything else is its rate parameter's plain value.
fn segment_duration(spec: &SegmentSpec, values: &SegmentValues) -> f64 {
    if spec.stage == SegmentStage::Sustain {
        SUSTAIN_DURATION
    } else {
        values.duration
    }
}

/// Compute pixel geometry for the whole segment chain.
///
/// Segment widths are proportional to segment durations; levels map to y
/// with 0.0 at the canvas bottom. The walk accumulates an x cursor left to
/// right, so the widths partition the canvas exactly.
pub fn layout_segments(
    values: &[SegmentValues; NUM_SEGMENTS],
    canvas: Size,
) -> [SegmentGeometry; NUM_SEGMENTS] {
    let mut total_duration = 0.0;
    for (spec, values) in SEGMENTS.iter().zip(values) {
        total_duration += segment_duration(spec, values);
    }

    let mut geometry = [SegmentGeometry::default(); NUM_SEGMENTS];
    let mut xpos = 0.0;
    for ((spec, values), out) in SEGMENTS.iter().zip(values).zip(&mut geometry) {
        let width = if total_duration > 0.0 {
            segment_duration(spec, values) / total_duration * canvas.width
        } else {
            0.0
        };

        let start = Point::new(xpos, canvas.height * (1.0 - values.start_level));
        xpos += width;
        let end = Point::new(xpos, canvas.height * (1.0 - values.end_level));

        out.width = width;
        out.start = start;
        out.end = end;
        out.drag_box = spec
            .draggable()
            .then(|| Rect::centered_on(end, DRAG_BOX_HALF_EXTENT));
    }
    geometry
}

/// Per-pixel multiplier of the exponential ramp from `start_level` to
/// `end_level` over `width` pixel columns.
///
/// Levels are floored to [`LEVEL_EPSILON`] before the logarithm, so a zero
/// level never produces an infinite coefficient.
pub fn ramp_coefficient(start_level: f64, end_level: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return 1.0;
    }
    let start = start_level.max(LEVEL_EPSILON);
    let end = end_level.max(LEVEL_EPSILON);
    1.0 + (end.ln() - start.ln()) / width
}

/// Trace one segment as a polyline, one point per pixel column.
///
/// `x_origin` is the segment's left edge; levels follow a geometric ramp,
/// multiplying by the ramp coefficient each column.
pub fn trace_segment(
    values: &SegmentValues,
    geometry: &SegmentGeometry,
    canvas: Size,
) -> Vec<Point> {
    let columns = geometry.width.floor() as usize;
    let coefficient = ramp_coefficient(values.start_level, values.end_level, geometry.width);

    let mut level = values.start_level.max(LEVEL_EPSILON);
    let mut points = Vec::with_capacity(columns);
    for column in 0..columns {
        level *= coefficient;
        points.push(Point::new(
            geometry.start.x + column as f64,
            canvas.height - level * canvas.height,
        ));
    }
    points
}
