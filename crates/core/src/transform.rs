//! Normalization of compositor transform properties.
//!
//! Traces describe a layer transform either as explicit matrix coefficients or
//! as an orientation flag word. Both are folded into one [`TransformMatrix`].

use layerscope_protocol::TransformMatrix;
use thiserror::Error;

use crate::model::{PropertyTreeNode, PropertyValue, TreeNode};

bitflags::bitflags! {
    /// Transform type word as written by the compositor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TransformFlags: u32 {
        const TRANSLATE   = 0x0001;
        const ROTATE      = 0x0002;
        const SCALE       = 0x0004;
        const FLIP_H      = 0x0100;
        const FLIP_V      = 0x0200;
        const ROT_90      = 0x0400;
        const ROT_INVALID = 0x8000;
    }
}

impl TransformFlags {
    pub const ROT_180: Self = Self::FLIP_H.union(Self::FLIP_V);
    pub const ROT_270: Self = Self::ROT_180.union(Self::ROT_90);

    /// Orientation-only types whose matrix follows from the flags alone.
    pub fn is_simple(self) -> bool {
        !self.intersects(Self::SCALE | Self::ROT_INVALID)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("transform type `{0}` is not a valid flag word")]
    InvalidType(String),
    #[error("transform coefficient `{0}` is not a number")]
    InvalidCoefficient(&'static str),
    #[error("transform type {0:#x} requires matrix coefficients")]
    MissingMatrix(u32),
}

const COEFFICIENTS: [&str; 4] = ["dsdx", "dtdx", "dsdy", "dtdy"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub flags: TransformFlags,
    pub matrix: TransformMatrix,
}

impl Transform {
    /// Identity; used where no transform property exists, e.g. displays.
    pub const EMPTY: Self = Self {
        flags: TransformFlags::empty(),
        matrix: TransformMatrix::IDENTITY,
    };

    /// Read a transform property node.
    ///
    /// Coefficients are looked up on the node itself or under a `matrix`
    /// child. A simple `type` yields the exact orientation matrix; other
    /// types, or a node without `type`, use the explicit coefficients.
    pub fn from_node(node: &PropertyTreeNode) -> Result<Self, TransformError> {
        let flags = match node.child_value("type") {
            Some(value) => Some(parse_flags(value)?),
            None => None,
        };
        let source = node.child_by_name("matrix").unwrap_or(node);

        let tx = coefficient(source, "tx")?.unwrap_or(0.0);
        let ty = coefficient(source, "ty")?.unwrap_or(0.0);
        let [dsdx, dtdx, dsdy, dtdy] = [
            coefficient(source, COEFFICIENTS[0])?,
            coefficient(source, COEFFICIENTS[1])?,
            coefficient(source, COEFFICIENTS[2])?,
            coefficient(source, COEFFICIENTS[3])?,
        ];
        let has_coefficients = [dsdx, dtdx, dsdy, dtdy].iter().any(Option::is_some);

        match flags {
            Some(flags) if flags.is_simple() => Ok(Self {
                flags,
                matrix: orientation_matrix(flags, tx, ty),
            }),
            Some(flags) if !has_coefficients => Err(TransformError::MissingMatrix(flags.bits())),
            None if !has_coefficients => Ok(Self {
                flags: TransformFlags::empty(),
                matrix: TransformMatrix { tx, ty, ..TransformMatrix::IDENTITY },
            }),
            flags => Ok(Self {
                flags: flags.unwrap_or_else(TransformFlags::empty),
                matrix: TransformMatrix {
                    dsdx: dsdx.unwrap_or(0.0),
                    dtdx: dtdx.unwrap_or(0.0),
                    tx,
                    dsdy: dsdy.unwrap_or(0.0),
                    dtdy: dtdy.unwrap_or(0.0),
                    ty,
                },
            }),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.matrix.is_identity()
    }

    /// Mirrored along the x axis without being a 180 degree rotation.
    pub fn is_flipped_horizontally(&self) -> bool {
        self.flags.is_simple()
            && self.flags.contains(TransformFlags::FLIP_H)
            && !self.flags.contains(TransformFlags::FLIP_V)
    }

    /// Mirrored along the y axis without being a 180 degree rotation.
    pub fn is_flipped_vertically(&self) -> bool {
        self.flags.is_simple()
            && self.flags.contains(TransformFlags::FLIP_V)
            && !self.flags.contains(TransformFlags::FLIP_H)
    }

    /// Clockwise rotation for pure orientation types; `None` for mirrored or
    /// non-orientation transforms.
    pub fn rotation_degrees(&self) -> Option<u32> {
        if !self.flags.is_simple() {
            return None;
        }
        let orientation = self.flags & TransformFlags::ROT_270;
        if orientation.is_empty() {
            Some(0)
        } else if orientation == TransformFlags::ROT_90 {
            Some(90)
        } else if orientation == TransformFlags::ROT_180 {
            Some(180)
        } else if orientation == TransformFlags::ROT_270 {
            Some(270)
        } else {
            None
        }
    }

    /// Human readable type, e.g. `"IDENTITY"` or `"SCALE|TRANSLATE|ROT_90"`.
    pub fn type_description(&self) -> String {
        let flags = self.flags;
        let mut parts: Vec<&str> = Vec::new();
        if flags.contains(TransformFlags::SCALE) {
            parts.push("SCALE");
        }
        if flags.contains(TransformFlags::TRANSLATE) {
            parts.push("TRANSLATE");
        }
        if flags.contains(TransformFlags::ROT_INVALID) {
            parts.push("ROT_INVALID");
        } else if flags.contains(TransformFlags::ROT_270) {
            parts.push("ROT_270");
        } else if flags.contains(TransformFlags::ROT_180) {
            parts.push("ROT_180");
        } else {
            if flags.contains(TransformFlags::ROT_90) {
                parts.push("ROT_90");
            }
            if flags.contains(TransformFlags::FLIP_V) {
                parts.push("FLIP_V");
            }
            if flags.contains(TransformFlags::FLIP_H) {
                parts.push("FLIP_H");
            }
        }
        if flags.contains(TransformFlags::ROTATE) && parts.is_empty() {
            parts.push("ROTATE");
        }

        if parts.is_empty() {
            "IDENTITY".to_string()
        } else {
            parts.join("|")
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn parse_flags(value: &PropertyValue) -> Result<TransformFlags, TransformError> {
    value
        .as_i64()
        .and_then(|bits| u32::try_from(bits).ok())
        .map(TransformFlags::from_bits_retain)
        .ok_or_else(|| TransformError::InvalidType(value.to_string()))
}

fn coefficient(node: &PropertyTreeNode, name: &'static str) -> Result<Option<f64>, TransformError> {
    node.child_value(name)
        .map(|value| value.as_f64().ok_or(TransformError::InvalidCoefficient(name)))
        .transpose()
}

/// Exact matrix for an orientation: flips first, then the 90 degree rotation.
fn orientation_matrix(flags: TransformFlags, tx: f64, ty: f64) -> TransformMatrix {
    let fh = if flags.contains(TransformFlags::FLIP_H) { -1.0 } else { 1.0 };
    let fv = if flags.contains(TransformFlags::FLIP_V) { -1.0 } else { 1.0 };
    let (dsdx, dtdx, dsdy, dtdy) = if flags.contains(TransformFlags::ROT_90) {
        (0.0, fv, -fh, 0.0)
    } else {
        (fh, 0.0, 0.0, fv)
    };
    TransformMatrix {
        dsdx,
        dtdx,
        tx,
        dsdy,
        dtdy,
        ty,
    }
}
