use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Rect, TransformMatrix};

/// One visual rectangle derived from a frame's hierarchy, ready for a viewer.
///
/// Display rects and layer rects share this shape. `depth` is an absolute
/// z-order rank within `group_id`: higher values are painted on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Stable identity used to match the same surface across frames.
    pub id: String,
    /// Display label.
    pub name: String,
    pub corner_radius: f64,
    pub transform: TransformMatrix,
    /// Layer stack of the display this rect is composited onto.
    pub group_id: i64,
    pub is_visible: bool,
    pub is_display: bool,
    pub is_virtual: bool,
    pub depth: u32,
}

impl TraceRect {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceRectBuildError {
    #[error("trace rect is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Incremental builder for [`TraceRect`].
///
/// Every field is required. [`TraceRectBuilder::build`] refuses to produce a
/// rect while any of them is unset.
#[derive(Debug, Clone, Default)]
pub struct TraceRectBuilder {
    x: Option<f64>,
    y: Option<f64>,
    w: Option<f64>,
    h: Option<f64>,
    id: Option<String>,
    name: Option<String>,
    corner_radius: Option<f64>,
    transform: Option<TransformMatrix>,
    group_id: Option<i64>,
    is_visible: Option<bool>,
    is_display: Option<bool>,
    is_virtual: Option<bool>,
    depth: Option<u32>,
}

impl TraceRectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn width(mut self, w: f64) -> Self {
        self.w = Some(w);
        self
    }

    pub fn height(mut self, h: f64) -> Self {
        self.h = Some(h);
        self
    }

    /// Set position and size in one go.
    pub fn rect(self, rect: Rect) -> Self {
        self.x(rect.x).y(rect.y).width(rect.w).height(rect.h)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn corner_radius(mut self, corner_radius: f64) -> Self {
        self.corner_radius = Some(corner_radius);
        self
    }

    pub fn transform(mut self, transform: TransformMatrix) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn group_id(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn is_visible(mut self, is_visible: bool) -> Self {
        self.is_visible = Some(is_visible);
        self
    }

    pub fn is_display(mut self, is_display: bool) -> Self {
        self.is_display = Some(is_display);
        self
    }

    pub fn is_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = Some(is_virtual);
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn build(self) -> Result<TraceRect, TraceRectBuildError> {
        use TraceRectBuildError::MissingField;

        Ok(TraceRect {
            x: self.x.ok_or(MissingField("x"))?,
            y: self.y.ok_or(MissingField("y"))?,
            w: self.w.ok_or(MissingField("width"))?,
            h: self.h.ok_or(MissingField("height"))?,
            id: self.id.ok_or(MissingField("id"))?,
            name: self.name.ok_or(MissingField("name"))?,
            corner_radius: self.corner_radius.ok_or(MissingField("corner_radius"))?,
            transform: self.transform.ok_or(MissingField("transform"))?,
            group_id: self.group_id.ok_or(MissingField("group_id"))?,
            is_visible: self.is_visible.ok_or(MissingField("is_visible"))?,
            is_display: self.is_display.ok_or(MissingField("is_display"))?,
            is_virtual: self.is_virtual.ok_or(MissingField("is_virtual"))?,
            depth: self.depth.ok_or(MissingField("depth"))?,
        })
    }
}
