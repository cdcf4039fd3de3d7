pub mod trace_rect;
pub mod types;

pub use trace_rect::{TraceRect, TraceRectBuildError, TraceRectBuilder};
pub use types::{Point, Rect, TransformMatrix};
