//! Traits and supporting types for the slice of the 2D immediate-mode drawing
//! context that path translation targets. Implement them for any surface that
//! should receive resolved operations: the script generator, a rasterizer, or
//! a test double.

use crate::error::Result;

/// Fill or stroke paint. Gradients are referenced by the id they were defined
/// under; a surface fails with `UnknownGradientError` for ids it has not seen.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Color(String),
    Gradient(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
}

/// A linear gradient between `(x1, y1)` and `(x2, y2)` with ordered stops.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn new(id: impl Into<String>, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            id: id.into(),
            x1,
            y1,
            x2,
            y2,
            stops: Vec::new(),
        }
    }

    /// Mirrors CanvasGradient.addColorStop.
    pub fn add_color_stop(&mut self, offset: f64, color: impl Into<String>) {
        self.stops.push(GradientStop {
            offset,
            color: color.into(),
        });
    }
}

/// Straight-alpha RGBA pixels, row-major, `width * height * 4` bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

pub trait CanvasPaths {
    /// Starts a new empty path list. Mirrors beginPath().
    fn begin_path(&mut self) -> Result<()>;
    /// Closes the current subpath. Mirrors closePath().
    fn close_path(&mut self) -> Result<()>;
    /// Moves the current point without drawing. Mirrors moveTo().
    fn move_to(&mut self, x: f64, y: f64) -> Result<()>;
    /// Adds a straight line from the current point to (x, y). Mirrors lineTo().
    fn line_to(&mut self, x: f64, y: f64) -> Result<()>;
    /// Adds a cubic Bezier curve. Mirrors bezierCurveTo().
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) -> Result<()>;
    /// Fills the current path with the fill paint. Mirrors fill().
    fn fill(&mut self) -> Result<()>;
    /// Strokes the current path with the stroke paint. Mirrors stroke().
    fn stroke(&mut self) -> Result<()>;
}

pub trait CanvasFillStrokeStyles {
    /// Sets the paint used for fills. Mirrors fillStyle.
    fn set_fill_style(&mut self, style: Paint) -> Result<()>;
    /// Sets the paint used for strokes. Mirrors strokeStyle.
    fn set_stroke_style(&mut self, style: Paint) -> Result<()>;
    /// Registers a gradient under its id so later paints can refer to it.
    /// Registering an id twice replaces the earlier gradient.
    fn register_gradient(&mut self, gradient: &LinearGradient) -> Result<()>;
}

pub trait CanvasDimensions {
    /// Sets the output surface size in pixels.
    fn set_dimensions(&mut self, width: f64, height: f64) -> Result<()>;
}

pub trait CanvasRenderingContext2D: CanvasPaths + CanvasFillStrokeStyles + CanvasDimensions {}

impl<T> CanvasRenderingContext2D for T where T: CanvasPaths + CanvasFillStrokeStyles + CanvasDimensions {}
