//! Emblem image synthesis
//!
//! Fixed 16x16 canvas. Circle positions are hand-placed per count:
//! one centered, two side by side, three as a triangle (two low, one high).

use std::fmt::Write;

pub const CANVAS_SIZE: u32 = 16;
pub const CIRCLE_RADIUS: u32 = 3;

const ONE: [(f32, f32); 1] = [(8.0, 8.0)];
const TWO: [(f32, f32); 2] = [(5.5, 8.0), (10.5, 8.0)];
const THREE: [(f32, f32); 3] = [(5.8, 9.8), (10.2, 9.8), (8.0, 6.2)];

/// Circle centers for `count` circles (clamped to 1..=3)
#[must_use]
pub fn circle_positions(count: usize) -> &'static [(f32, f32)] {
    match count {
        0 | 1 => &ONE,
        2 => &TWO,
        _ => &THREE,
    }
}

/// Renders an emblem with one circle per color, in order
///
/// Callers pass at most three colors; extra colors are ignored.
#[must_use]
pub fn render<S: AsRef<str>>(colors: &[S]) -> String {
    let positions = circle_positions(colors.len());

    let mut svg = String::new();
    let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CANVAS_SIZE}" height="{CANVAS_SIZE}" viewBox="0 0 {CANVAS_SIZE} {CANVAS_SIZE}">"#
    );
    for (color, (cx, cy)) in colors.iter().zip(positions) {
        let _ = write!(
            svg,
            r#"<circle cx="{cx}" cy="{cy}" r="{CIRCLE_RADIUS}" fill="{}"/>"#,
            color.as_ref()
        );
    }
    svg.push_str("\n</svg>");
    svg
}
