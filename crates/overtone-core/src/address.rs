//! Structured parameter addressing.
//!
//! Every host parameter is identified by a flat 32-bit [`ParamId`]. The
//! editor works with the structured form, [`ParamAddress`], and converts at
//! the host boundary:
//!
//! ```text
//! bits 24-31   generator slot index
//! bits  8-23   modulation target (TargetKind)
//! bits  0-7    parameter kind (ParamKind)
//! ```
//!
//! Encoding is pure bit packing: out-of-range discriminants would be masked
//! off silently, so the typed enums below are the only supported way to
//! build an id. Decoding foreign bits yields `None` rather than a mangled
//! address.

use crate::types::ParamId;

/// Number of generator slots the synthesizer exposes.
pub const NUM_GENERATORS: u8 = 8;

/// Parameter kind, the low byte of a parameter id.
///
/// Discriminants are wire format; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParamKind {
    GeneratorSelect = 0,
    GeneratorToggle = 1,
    Osc = 2,
    EnvHoldTime = 3,
    EnvAttackRate = 4,
    EnvAttackLevel = 5,
    EnvDecayRate1 = 6,
    EnvDecayLevel1 = 7,
    EnvDecayRate2 = 8,
    EnvSustainLevel = 9,
    EnvReleaseRate1 = 10,
    EnvReleaseLevel1 = 11,
    EnvReleaseRate2 = 12,
    EnvVelocityScale = 13,
    LfoFrequency = 14,
    LfoAmplitude = 15,
    LfoVelocityScale = 16,
    LfoType = 17,
    Modulations = 18,
}

impl ParamKind {
    /// All parameter kinds, in discriminant order.
    pub const ALL: [ParamKind; 19] = [
        Self::GeneratorSelect,
        Self::GeneratorToggle,
        Self::Osc,
        Self::EnvHoldTime,
        Self::EnvAttackRate,
        Self::EnvAttackLevel,
        Self::EnvDecayRate1,
        Self::EnvDecayLevel1,
        Self::EnvDecayRate2,
        Self::EnvSustainLevel,
        Self::EnvReleaseRate1,
        Self::EnvReleaseLevel1,
        Self::EnvReleaseRate2,
        Self::EnvVelocityScale,
        Self::LfoFrequency,
        Self::LfoAmplitude,
        Self::LfoVelocityScale,
        Self::LfoType,
        Self::Modulations,
    ];

    /// Reconstruct from the low byte of a parameter id.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }
}

/// Modulation-routing target, the middle 16 bits of a parameter id.
///
/// Discriminants are wire format; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TargetKind {
    None = 0,
    Carrier = 1,
    Amplitude = 2,
    Modulator = 3,
    ModIndex = 4,
    Feedback = 5,
    Shape = 6,
    Portamento = 7,
    OscType = 8,
}

impl TargetKind {
    /// All targets, in discriminant order.
    pub const ALL: [TargetKind; 9] = [
        Self::None,
        Self::Carrier,
        Self::Amplitude,
        Self::Modulator,
        Self::ModIndex,
        Self::Feedback,
        Self::Shape,
        Self::Portamento,
        Self::OscType,
    ];

    /// Reconstruct from the target bits of a parameter id.
    pub fn from_bits(bits: u16) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }
}

/// Structured identity of one host parameter.
///
/// Constructed wherever a control is bound. The generator field is rewritten
/// in place when the active generator changes; the identity is otherwise
/// immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamAddress {
    pub generator: u8,
    pub param: ParamKind,
    pub target: TargetKind,
}

impl ParamAddress {
    /// Create an address for one generator slot.
    pub const fn new(generator: u8, param: ParamKind, target: TargetKind) -> Self {
        Self {
            generator,
            param,
            target,
        }
    }

    /// Pack into the flat host id.
    pub fn encode(&self) -> ParamId {
        ((self.generator as u32) << 24)
            | (((self.target as u32) & 0xffff) << 8)
            | ((self.param as u32) & 0xff)
    }

    /// Unpack a flat host id. Returns `None` if the param or target bits do
    /// not name a known discriminant.
    pub fn decode(id: ParamId) -> Option<Self> {
        let generator = (id >> 24) as u8;
        let target = TargetKind::from_bits(((id >> 8) & 0xffff) as u16)?;
        let param = ParamKind::from_bits((id & 0xff) as u8)?;
        Some(Self {
            generator,
            param,
            target,
        })
    }

    /// Rewrite the generator slot, keeping the rest of the identity.
    pub fn retarget(&mut self, generator: u8) {
        self.generator = generator;
    }
}

/// Host unit grouping kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum UnitKind {
    Root = 0,
    Generator = 1,
}

/// Pack a host unit id: unit kind in the high half, slot index in the low.
pub fn encode_unit(kind: UnitKind, index: u16) -> u32 {
    ((kind as u32) << 16) | index as u32
}

/// Unpack a host unit id.
pub fn decode_unit(unit_id: u32) -> Option<(UnitKind, u16)> {
    let kind = match unit_id >> 16 {
        0 => UnitKind::Root,
        1 => UnitKind::Generator,
        _ => return None,
    };
    Some((kind, (unit_id & 0xffff) as u16))
}
