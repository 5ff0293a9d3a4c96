//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - a quick visual sanity check right after the report
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fitted curve: `-` line, or the curve style's marker glyph
//! - error bars: `|` (δy) and `=` (δx)
//! - measured points: the point style's marker glyph (`o` by default)
//! - annotation block: right-aligned in the bottom rows

use crate::domain::{Mark, StyleSpec};
use crate::plot::Figure;

/// Render the figure into a `width × height` character grid plus a header.
pub fn render_ascii_plot(figure: &Figure, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let [x_min, x_max] = figure.x_bounds;
    let [y_min, y_max] = figure.y_bounds;

    let mut grid = vec![vec![' '; width]; height];

    // Curve first, so bars and points overlay it.
    let curve_ch = glyph(figure.style.curve, '-');
    let mut prev = None;
    for &(x, y) in &figure.curve {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        match (figure.style.curve.mark, prev) {
            (Mark::Line, Some((x0, y0))) => draw_line(&mut grid, x0, y0, cx, cy, curve_ch),
            _ => grid[cy][cx] = curve_ch,
        }
        prev = Some((cx, cy));
    }

    for p in &figure.points {
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);
        let top = map_y(p.y + p.dy, y_min, y_max, height);
        let bottom = map_y(p.y - p.dy, y_min, y_max, height);
        draw_line(&mut grid, col, top, col, bottom, '|');
        let left = map_x(p.x - p.dx, x_min, x_max, width);
        let right = map_x(p.x + p.dx, x_min, x_max, width);
        draw_line(&mut grid, left, row, right, row, '=');
    }

    let point_ch = glyph(figure.style.points, 'o');
    for p in &figure.points {
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);
        grid[row][col] = point_ch;
    }

    place_annotation(&mut grid, &figure.annotation);

    let mut out = String::new();
    out.push_str(&figure.title);
    out.push('\n');
    out.push_str(&format!(
        "x: {} [{x_min:.3}, {x_max:.3}] | y: {} [{y_min:.3}, {y_max:.3}]\n",
        figure.x_label, figure.y_label
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn glyph(style: StyleSpec, line: char) -> char {
    match style.mark {
        Mark::Marker(shape) => shape.glyph(),
        Mark::Line => line,
    }
}

/// Right-align the annotation in the bottom rows; lines wider than the grid
/// (or more lines than rows) are skipped.
fn place_annotation(grid: &mut [Vec<char>], lines: &[String]) {
    let height = grid.len();
    let width = grid[0].len();
    if lines.len() > height {
        return;
    }
    let first_row = height - lines.len();
    for (k, line) in lines.iter().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() > width {
            continue;
        }
        let start = width - chars.len();
        grid[first_row + k][start..].copy_from_slice(&chars);
    }
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
