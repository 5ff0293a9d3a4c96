//! Matplotlib-style format strings (`"bo"`, `"r"`, `"g-"`).
//!
//! The first character picks a colour, the optional second one a marker or a
//! solid line. Only the codes the renderers can actually draw are accepted.

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleColor {
    Blue,
    Green,
    Red,
    Cyan,
    Magenta,
    Yellow,
    Black,
    White,
}

impl StyleColor {
    fn from_code(c: char) -> Option<Self> {
        Some(match c {
            'b' => StyleColor::Blue,
            'g' => StyleColor::Green,
            'r' => StyleColor::Red,
            'c' => StyleColor::Cyan,
            'm' => StyleColor::Magenta,
            'y' => StyleColor::Yellow,
            'k' => StyleColor::Black,
            'w' => StyleColor::White,
            _ => return None,
        })
    }

    /// RGB triple used by the SVG renderer (matplotlib's base palette).
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            StyleColor::Blue => (0, 0, 255),
            StyleColor::Green => (0, 128, 0),
            StyleColor::Red => (255, 0, 0),
            StyleColor::Cyan => (0, 191, 191),
            StyleColor::Magenta => (191, 0, 191),
            StyleColor::Yellow => (191, 191, 0),
            StyleColor::Black => (0, 0, 0),
            StyleColor::White => (255, 255, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Cross,
    Plus,
    Dot,
}

impl MarkerShape {
    fn from_code(c: char) -> Option<Self> {
        Some(match c {
            'o' => MarkerShape::Circle,
            's' => MarkerShape::Square,
            '^' => MarkerShape::Triangle,
            'x' => MarkerShape::Cross,
            '+' => MarkerShape::Plus,
            '.' => MarkerShape::Dot,
            _ => return None,
        })
    }

    /// Glyph used by the terminal renderer.
    pub fn glyph(self) -> char {
        match self {
            MarkerShape::Circle => 'o',
            MarkerShape::Square => '#',
            MarkerShape::Triangle => '^',
            MarkerShape::Cross => 'x',
            MarkerShape::Plus => '+',
            MarkerShape::Dot => '.',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Marker(MarkerShape),
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    pub color: StyleColor,
    pub mark: Mark,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            color: StyleColor::Black,
            mark: Mark::Line,
        }
    }
}

impl StyleSpec {
    pub fn parse(code: &str) -> Result<Self, AppError> {
        let mut chars = code.trim().chars();
        let Some(c) = chars.next() else {
            return Err(AppError::usage("Plot style must not be empty."));
        };
        let color = StyleColor::from_code(c)
            .ok_or_else(|| AppError::usage(format!("Unknown colour code '{c}' in style '{code}'.")))?;

        let mark = match chars.next() {
            None | Some('-') => Mark::Line,
            Some(m) => Mark::Marker(
                MarkerShape::from_code(m)
                    .ok_or_else(|| AppError::usage(format!("Unknown marker code '{m}' in style '{code}'.")))?,
            ),
        };
        if chars.next().is_some() {
            return Err(AppError::usage(format!(
                "Style '{code}' has trailing characters (expected colour + optional marker)."
            )));
        }
        Ok(Self { color, mark })
    }
}
