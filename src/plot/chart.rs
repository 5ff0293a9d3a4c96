//! Plotters drawing shared by the SVG writer and the terminal viewer.
//!
//! The drawing is written once against a generic `DrawingBackend`; a
//! [`ChartTheme`] carries the few things that differ between a vector file
//! and terminal cells (font size, marker style, mesh, background).

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{Mark, MarkerShape, StyleColor};
use crate::plot::Figure;

#[derive(Debug, Clone, Copy)]
pub struct ChartTheme {
    pub font_size: u32,
    pub margin: u32,
    pub label_area_left: u32,
    pub label_area_bottom: u32,
    pub marker_size: u32,
    pub line_width: u32,
    /// Error bar cap width.
    pub cap_width: u32,
    /// Draw every marker as a single pixel.
    ///
    /// `plotters-ratatui-backend` maps circle radii incorrectly (pixel radius
    /// -> normalized canvas units), producing huge shapes in the terminal.
    pub pixel_markers: bool,
    pub mesh: bool,
    pub legend: bool,
    pub foreground: RGBColor,
    pub background: Option<RGBColor>,
}

impl ChartTheme {
    pub const SVG: Self = Self {
        font_size: 16,
        margin: 20,
        label_area_left: 60,
        label_area_bottom: 50,
        marker_size: 4,
        line_width: 2,
        cap_width: 6,
        pixel_markers: false,
        mesh: true,
        legend: true,
        foreground: BLACK,
        background: Some(WHITE),
    };

    pub const TERMINAL: Self = Self {
        font_size: 10,
        margin: 1,
        label_area_left: 6,
        label_area_bottom: 3,
        marker_size: 1,
        line_width: 1,
        cap_width: 0,
        pixel_markers: true,
        mesh: false,
        legend: false,
        foreground: WHITE,
        background: None,
    };
}

pub fn rgb(color: StyleColor, theme: &ChartTheme) -> RGBColor {
    let (r, g, b) = color.rgb();
    // Black on a dark terminal is invisible; swap to the theme foreground.
    if theme.background.is_none() && color == StyleColor::Black {
        return theme.foreground;
    }
    RGBColor(r, g, b)
}

macro_rules! draw_markers {
    ($chart:expr, $coords:expr, $shape:expr, $color:expr, $theme:expr, $label:expr) => {{
        let color = $color;
        let size = $theme.marker_size as i32;
        let coords = $coords;
        if $theme.pixel_markers {
            $chart
                .draw_series(coords.map(|c| Pixel::new(c, color)))?
                .label($label)
                .legend(move |(x, y)| Pixel::new((x, y), color));
        } else {
            match $shape {
                MarkerShape::Circle => {
                    $chart
                        .draw_series(coords.map(|c| Circle::new(c, size, color.filled())))?
                        .label($label)
                        .legend(move |(x, y)| Circle::new((x, y), size, color.filled()));
                }
                MarkerShape::Square => {
                    $chart
                        .draw_series(coords.map(|c| {
                            EmptyElement::at(c) + Rectangle::new([(-size, -size), (size, size)], color.filled())
                        }))?
                        .label($label)
                        .legend(move |(x, y)| Rectangle::new([(x - size, y - size), (x + size, y + size)], color.filled()));
                }
                MarkerShape::Triangle => {
                    $chart
                        .draw_series(coords.map(|c| TriangleMarker::new(c, size + 1, color.filled())))?
                        .label($label)
                        .legend(move |(x, y)| TriangleMarker::new((x, y), size + 1, color.filled()));
                }
                MarkerShape::Cross => {
                    $chart
                        .draw_series(coords.map(|c| Cross::new(c, size, color.stroke_width(2))))?
                        .label($label)
                        .legend(move |(x, y)| Cross::new((x, y), size, color.stroke_width(2)));
                }
                MarkerShape::Plus => {
                    $chart
                        .draw_series(coords.map(|c| {
                            EmptyElement::at(c)
                                + PathElement::new(vec![(-size, 0), (size, 0)], color.stroke_width(2))
                                + PathElement::new(vec![(0, -size), (0, size)], color.stroke_width(2))
                        }))?
                        .label($label)
                        .legend(move |(x, y)| PathElement::new(vec![(x - size, y), (x + size, y)], color.stroke_width(2)));
                }
                MarkerShape::Dot => {
                    $chart
                        .draw_series(coords.map(|c| Circle::new(c, 1, color.filled())))?
                        .label($label)
                        .legend(move |(x, y)| Circle::new((x, y), 1, color.filled()));
                }
            }
        }
    }};
}

/// Draw the full figure onto `root`.
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    theme: &ChartTheme,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if let Some(bg) = theme.background {
        root.fill(&bg)?;
    }

    let [x0, x1] = figure.x_bounds;
    let [y0, y1] = figure.y_bounds;
    let fg = theme.foreground;

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", theme.font_size + 4).into_font().color(&fg))
        .margin(theme.margin)
        .set_label_area_size(LabelAreaPosition::Left, theme.label_area_left)
        .set_label_area_size(LabelAreaPosition::Bottom, theme.label_area_bottom)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .x_labels(6)
            .y_labels(6)
            .label_style(("sans-serif", theme.font_size).into_font().color(&fg))
            .axis_style(&fg);
        if !theme.mesh {
            mesh.disable_x_mesh().disable_y_mesh();
        }
        mesh.draw()?;
    }

    // 1) Error bars, in the point colour.
    let point_color = rgb(figure.style.points.color, theme);
    let bar_style = point_color.stroke_width(1);
    chart.draw_series(
        figure
            .points
            .iter()
            .map(|p| ErrorBar::new_vertical(p.x, p.y - p.dy, p.y, p.y + p.dy, bar_style, theme.cap_width)),
    )?;
    chart.draw_series(
        figure
            .points
            .iter()
            .map(|p| ErrorBar::new_horizontal(p.y, p.x - p.dx, p.x, p.x + p.dx, bar_style, theme.cap_width)),
    )?;

    // 2) Measured points.
    let point_coords = figure.points.iter().map(|p| (p.x, p.y));
    match figure.style.points.mark {
        Mark::Marker(shape) => draw_markers!(chart, point_coords, shape, point_color, theme, "data"),
        Mark::Line => {
            chart
                .draw_series(LineSeries::new(point_coords, point_color.stroke_width(theme.line_width)))?
                .label("data")
                .legend(move |(x, y)| PathElement::new(vec![(x - 8, y), (x + 8, y)], point_color));
        }
    }

    // 3) Best-fit curve.
    let curve_color = rgb(figure.style.curve.color, theme);
    let curve_coords = figure.curve.iter().copied();
    match figure.style.curve.mark {
        Mark::Line => {
            chart
                .draw_series(LineSeries::new(curve_coords, curve_color.stroke_width(theme.line_width)))?
                .label("fit")
                .legend(move |(x, y)| PathElement::new(vec![(x - 8, y), (x + 8, y)], curve_color));
        }
        Mark::Marker(shape) => draw_markers!(chart, curve_coords, shape, curve_color, theme, "fit"),
    }

    if theme.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(("sans-serif", theme.font_size).into_font().color(&fg))
            .background_style(WHITE.mix(0.8))
            .border_style(&fg)
            .draw()?;
    }

    // 4) Annotation block, anchored bottom-right at 90% / 10% of the plot area.
    let (xr, yr) = chart.plotting_area().get_pixel_range();
    let right = xr.start + ((xr.end - xr.start) as f64 * 0.9) as i32;
    let bottom = yr.start + ((yr.end - yr.start) as f64 * 0.9) as i32;
    let line_height = (f64::from(theme.font_size) * 1.25).ceil() as i32;
    let text_style = ("sans-serif", theme.font_size)
        .into_font()
        .color(&fg)
        .pos(Pos::new(HPos::Right, VPos::Bottom));
    let n = figure.annotation.len() as i32;
    for (k, line) in figure.annotation.iter().enumerate() {
        let y = bottom - (n - 1 - k as i32) * line_height;
        root.draw(&Text::new(line.clone(), (right, y), text_style.clone()))?;
    }

    Ok(())
}
