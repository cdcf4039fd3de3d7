use std::io::{self, Write};

use anyhow::Result;
use layerscope_protocol::{TraceRect, TransformMatrix};

pub fn write_json(out: &mut impl Write, rects: &[TraceRect]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rects)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_table(out: &mut impl Write, rects: &[TraceRect]) -> io::Result<()> {
    writeln!(
        out,
        "{:>5} {:>5}  {:>8} {:>8} {:>8} {:>8}  {:<5} {:<10}  {:<24}  {}",
        "group", "depth", "x", "y", "w", "h", "flags", "transform", "on screen", "id"
    )?;
    for rect in rects {
        writeln!(
            out,
            "{:>5} {:>5}  {:>8.1} {:>8.1} {:>8.1} {:>8.1}  {:<5} {:<10}  {:<24}  {}",
            rect.group_id,
            rect.depth,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            flags(rect),
            matrix_summary(&rect.transform),
            screen_bounds(rect),
            rect.id
        )?;
        if rect.is_display && rect.name != rect.id {
            writeln!(out, "{:>5} {:>5}  {}", "", "", rect.name)?;
        }
    }
    Ok(())
}

/// `D` display, `V` visible, `v` virtual.
fn flags(rect: &TraceRect) -> String {
    [
        (rect.is_display, 'D'),
        (rect.is_visible, 'V'),
        (rect.is_virtual, 'v'),
    ]
    .into_iter()
    .map(|(set, flag)| if set { flag } else { '-' })
    .collect()
}

/// Bounding box of the rect after its transform, as `x,y wxh`.
fn screen_bounds(rect: &TraceRect) -> String {
    let screen = rect.transform.transform_rect(&rect.rect());
    format!("{},{} {}x{}", screen.x, screen.y, screen.w, screen.h)
}

fn matrix_summary(matrix: &TransformMatrix) -> String {
    if matrix.is_identity() {
        return "identity".to_string();
    }
    let linear = TransformMatrix {
        tx: 0.0,
        ty: 0.0,
        ..*matrix
    };
    if linear.is_identity() {
        "translate".to_string()
    } else {
        format!("[{} {} {} {}]", matrix.dsdx, matrix.dtdx, matrix.dsdy, matrix.dtdy)
    }
}

#[cfg(test)]
mod tests {
    use layerscope_protocol::TraceRectBuilder;

    use super::*;

    fn rect(id: &str, is_display: bool, transform: TransformMatrix) -> TraceRect {
        TraceRectBuilder::new()
            .x(0.0)
            .y(0.0)
            .width(100.0)
            .height(50.0)
            .id(id)
            .name("Built-in")
            .corner_radius(0.0)
            .transform(transform)
            .group_id(0)
            .is_visible(!is_display)
            .is_display(is_display)
            .is_virtual(false)
            .depth(1)
            .build()
            .unwrap()
    }

    #[test]
    fn table_lists_every_rect() {
        let translated = TransformMatrix {
            tx: 5.0,
            ..TransformMatrix::IDENTITY
        };
        let rects = [
            rect("Display - 1", true, TransformMatrix::IDENTITY),
            rect("7 Launcher", false, translated),
        ];
        let mut out = Vec::new();
        write_table(&mut out, &rects).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("D--") && lines[1].ends_with("Display - 1"));
        assert!(lines[2].trim_end().ends_with("Built-in"));
        assert!(lines[3].contains("-V-") && lines[3].contains("translate"));
        assert!(lines[3].contains("5,0 100x50"));
    }

    #[test]
    fn json_round_trips_rects() {
        let rects = vec![rect("7 Launcher", false, TransformMatrix::IDENTITY)];
        let mut out = Vec::new();
        write_json(&mut out, &rects).unwrap();
        let parsed: Vec<TraceRect> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, rects);
    }

    #[test]
    fn screen_bounds_follow_transform() {
        let rotated = TransformMatrix {
            dsdx: 0.0,
            dtdx: -1.0,
            tx: 100.0,
            dsdy: 1.0,
            dtdy: 0.0,
            ty: 0.0,
        };
        assert_eq!(
            screen_bounds(&rect("1 a", false, TransformMatrix::IDENTITY)),
            "0,0 100x50"
        );
        assert_eq!(screen_bounds(&rect("2 b", false, rotated)), "50,0 50x100");
    }

    #[test]
    fn matrix_summaries() {
        assert_eq!(matrix_summary(&TransformMatrix::IDENTITY), "identity");
        let rotated = TransformMatrix {
            dsdx: 0.0,
            dtdx: 1.0,
            dsdy: -1.0,
            dtdy: 0.0,
            ..TransformMatrix::IDENTITY
        };
        assert_eq!(matrix_summary(&rotated), "[0 1 -1 0]");
    }
}
