use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rect from its edges, as stored in compositor `bounds` properties.
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }
}

/// A 2D affine transform in compositor notation.
///
/// Maps `(x, y)` to `(dsdx * x + dtdx * y + tx, dsdy * x + dtdy * y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformMatrix {
    pub dsdx: f64,
    pub dtdx: f64,
    pub tx: f64,
    pub dsdy: f64,
    pub dtdy: f64,
    pub ty: f64,
}

impl TransformMatrix {
    pub const IDENTITY: Self = Self {
        dsdx: 1.0,
        dtdx: 0.0,
        tx: 0.0,
        dsdy: 0.0,
        dtdy: 1.0,
        ty: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            self.dsdx * point.x + self.dtdx * point.y + self.tx,
            self.dsdy * point.x + self.dtdy * point.y + self.ty,
        )
    }

    /// Axis-aligned bounding box of `rect` after transformation.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.apply(Point::new(rect.x, rect.y)),
            self.apply(Point::new(rect.x + rect.w, rect.y)),
            self.apply(Point::new(rect.x, rect.y + rect.h)),
            self.apply(Point::new(rect.x + rect.w, rect.y + rect.h)),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);
        Rect::from_ltrb(min_x, min_y, max_x, max_y)
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
