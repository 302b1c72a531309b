//! Fixed-function render state vocabulary
//!
//! Abstract names for the depth, stencil, cull and blend settings the shadow
//! passes toggle. Backends translate these to their native enums.

use serde::{Deserialize, Serialize};

/// Comparison used by depth and stencil tests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunction {
    /// Evaluate `lhs OP rhs`
    #[inline]
    pub fn compare<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Self::Never => false,
            Self::Less => lhs < rhs,
            Self::Equal => lhs == rhs,
            Self::LessEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::NotEqual => lhs != rhs,
            Self::GreaterEqual => lhs >= rhs,
            Self::Always => true,
        }
    }
}

/// Stencil buffer update operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    /// Saturating increment
    Increment,
    /// Saturating decrement
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

impl StencilOp {
    /// Apply to a stored stencil value
    #[inline]
    pub fn apply(self, value: u8, reference: u8) -> u8 {
        match self {
            Self::Keep => value,
            Self::Zero => 0,
            Self::Replace => reference,
            Self::Increment => value.saturating_add(1),
            Self::Decrement => value.saturating_sub(1),
            Self::IncrementWrap => value.wrapping_add(1),
            Self::DecrementWrap => value.wrapping_sub(1),
            Self::Invert => !value,
        }
    }
}

/// Polygon facing selector for culling and per-face stencil ops
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

impl Face {
    /// Does this selector include a polygon with the given facing
    #[inline]
    pub fn includes(self, front_facing: bool) -> bool {
        match self {
            Self::Front => front_facing,
            Self::Back => !front_facing,
            Self::FrontAndBack => true,
        }
    }
}

/// Blend factors for GPU blending
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

impl BlendFactor {
    /// Per-channel weight for a given source and destination RGBA
    pub fn weight(self, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
        match self {
            Self::Zero => [0.0; 4],
            Self::One => [1.0; 4],
            Self::SrcColor => src,
            Self::OneMinusSrcColor => src.map(|c| 1.0 - c),
            Self::DstColor => dst,
            Self::OneMinusDstColor => dst.map(|c| 1.0 - c),
            Self::SrcAlpha => [src[3]; 4],
            Self::OneMinusSrcAlpha => [1.0 - src[3]; 4],
            Self::DstAlpha => [dst[3]; 4],
            Self::OneMinusDstAlpha => [1.0 - dst[3]; 4],
        }
    }
}

/// Toggleable pipeline features
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    DepthTest,
    StencilTest,
    CullFace,
    Blend,
}

/// Vertex attribute streams a draw can consume
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeStream {
    /// xyz positions in the bound model transform's local space
    ObjectPosition,
    /// xyz positions already in normalized device coordinates
    ScreenPosition,
    /// rgba per-vertex colour
    Color,
}

impl AttributeStream {
    /// Floats per vertex
    pub fn components(self) -> usize {
        match self {
            Self::ObjectPosition | Self::ScreenPosition => 3,
            Self::Color => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ObjectPosition => "object position",
            Self::ScreenPosition => "screen position",
            Self::Color => "color",
        }
    }
}
