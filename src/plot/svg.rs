//! SVG figure export.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::error::AppError;
use crate::plot::{ChartTheme, Figure, draw_figure};

/// Pixel size of exported figures.
pub const SVG_SIZE: (u32, u32) = (960, 640);

/// Draw `figure` into an SVG file at `path`, replacing any existing file.
pub fn write_svg(figure: &Figure, path: &Path) -> Result<(), AppError> {
    let fail = |e: &dyn std::fmt::Display| AppError::render(format!("Failed to write figure '{}': {e}", path.display()));

    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    draw_figure(&root, figure, &ChartTheme::SVG).map_err(|e| fail(&e))?;
    root.present().map_err(|e| fail(&e))?;

    info!(path = %path.display(), "figure written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlotStyle;
    use crate::plot::ErrorPoint;

    #[test]
    fn writes_svg_with_title_and_annotation() {
        let figure = Figure {
            title: "INSERT TITLE".to_string(),
            x_label: "INSERT X LABEL".to_string(),
            y_label: "INSERT Y LABEL".to_string(),
            points: vec![
                ErrorPoint { x: 1.0, y: 1.0, dx: 0.1, dy: 0.2 },
                ErrorPoint { x: 2.0, y: 2.1, dx: 0.1, dy: 0.2 },
            ],
            curve: vec![(1.0, 1.0), (2.0, 2.0)],
            x_bounds: [0.5, 2.5],
            y_bounds: [0.5, 2.5],
            annotation: vec!["y = a*x + b".to_string(), "chi= 1.00e-01".to_string()],
            style: PlotStyle::default(),
        };

        let path = std::env::temp_dir().join(format!("tpfit-svg-test-{}.svg", std::process::id()));
        write_svg(&figure, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(svg.contains("<svg"));
        assert!(svg.contains("INSERT TITLE"));
        assert!(svg.contains("chi= 1.00e-01"));
    }

    #[test]
    fn unwritable_path_is_render_error() {
        let figure = Figure {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            points: vec![],
            curve: vec![],
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            annotation: vec![],
            style: PlotStyle::default(),
        };
        let path = Path::new("/nonexistent-dir-for-tpfit/figure.svg");
        let err = write_svg(&figure, path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Render);
    }
}
