//! Cairo backend implementing the drawing-surface traits behind the optional
//! `cairo` crate feature. It rasterizes the same calls the script generator
//! emits, so a document can be turned into pixels without a script host.
//!
//! Like an immediate-mode canvas, `fill` and `stroke` paint the current path
//! without consuming it.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use cairo::{Context, Format, ImageSurface};
use png::{BitDepth, ColorType, Encoder as PngEncoder};
use tracing::{debug, warn};

use crate::api::*;
use crate::error::{Result, UnknownGradientError};

/// Adapter that translates drawing-surface calls into Cairo operations on an
/// owned ARGB32 image surface.
pub struct CairoCanvas {
    surface: ImageSurface,
    ctx: Context,
    fill_style: Paint,
    stroke_style: Paint,
    gradients: HashMap<String, LinearGradient>,
}

impl CairoCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let (surface, ctx) = create_surface(width, height)?;
        Ok(Self {
            surface,
            ctx,
            fill_style: Paint::Color("#000000".into()),
            stroke_style: Paint::Color("#000000".into()),
            gradients: HashMap::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.surface.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.surface.height() as u32
    }

    fn check_paint(&self, paint: &Paint) -> Result<()> {
        if let Paint::Gradient(id) = paint {
            if !self.gradients.contains_key(id) {
                return Err(UnknownGradientError { id: id.clone() }.into());
            }
        }
        Ok(())
    }

    fn apply_paint(&self, paint: &Paint) -> Result<()> {
        match paint {
            Paint::Color(s) => {
                let (r, g, b, a) = parse_color(s);
                self.ctx.set_source_rgba(r, g, b, a);
            }
            Paint::Gradient(id) => {
                let gradient = self
                    .gradients
                    .get(id)
                    .ok_or_else(|| UnknownGradientError { id: id.clone() })?;
                let pattern = cairo::LinearGradient::new(gradient.x1, gradient.y1, gradient.x2, gradient.y2);
                for stop in &gradient.stops {
                    let (r, g, b, a) = parse_color(&stop.color);
                    pattern.add_color_stop_rgba(stop.offset, r, g, b, a);
                }
                self.ctx.set_source(&pattern)?;
            }
        }
        Ok(())
    }

    /// Finishes drawing and returns the surface as straight-alpha RGBA.
    pub fn into_image_data(self) -> Result<ImageData> {
        let CairoCanvas { surface, ctx, .. } = self;
        // The context holds a reference to the surface; pixel access needs
        // the only one.
        drop(ctx);
        let mut surface = surface;
        surface.flush();

        let width = surface.width() as u32;
        let height = surface.height() as u32;
        let stride = surface.stride() as usize;
        let pixels = surface.data()?;

        let row_bytes = width as usize * 4;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in pixels.chunks(stride).take(height as usize) {
            for px in row[..row_bytes].chunks_exact(4) {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                data.extend_from_slice(&unpremultiply(argb));
            }
        }

        Ok(ImageData {
            width,
            height,
            data,
        })
    }

    /// Finishes drawing and encodes the surface as a PNG data URL.
    pub fn into_data_url(self) -> Result<String> {
        let image = self.into_image_data()?;

        let mut png_bytes = Vec::new();
        let mut encoder = PngEncoder::new(&mut png_bytes, image.width, image.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.data)?;
        writer.finish()?;

        let encoded = BASE64_STANDARD.encode(png_bytes);
        debug!(width = image.width, height = image.height, bytes = encoded.len(), "encoded surface");
        Ok(format!("data:image/png;base64,{}", encoded))
    }
}

impl CanvasPaths for CairoCanvas {
    fn begin_path(&mut self) -> Result<()> {
        self.ctx.new_path();
        Ok(())
    }

    fn close_path(&mut self) -> Result<()> {
        self.ctx.close_path();
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.ctx.move_to(x, y);
        Ok(())
    }

    fn line_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.ctx.line_to(x, y);
        Ok(())
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) -> Result<()> {
        self.ctx.curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
        Ok(())
    }

    fn fill(&mut self) -> Result<()> {
        self.apply_paint(&self.fill_style)?;
        self.ctx.fill_preserve()?;
        Ok(())
    }

    fn stroke(&mut self) -> Result<()> {
        self.apply_paint(&self.stroke_style)?;
        self.ctx.stroke_preserve()?;
        Ok(())
    }
}

impl CanvasFillStrokeStyles for CairoCanvas {
    fn set_fill_style(&mut self, style: Paint) -> Result<()> {
        self.check_paint(&style)?;
        self.fill_style = style;
        Ok(())
    }

    fn set_stroke_style(&mut self, style: Paint) -> Result<()> {
        self.check_paint(&style)?;
        self.stroke_style = style;
        Ok(())
    }

    fn register_gradient(&mut self, gradient: &LinearGradient) -> Result<()> {
        self.gradients.insert(gradient.id.clone(), gradient.clone());
        Ok(())
    }
}

impl CanvasDimensions for CairoCanvas {
    /// Replaces the surface, discarding anything drawn so far.
    fn set_dimensions(&mut self, width: f64, height: f64) -> Result<()> {
        let (surface, ctx) = create_surface(to_pixels(width), to_pixels(height))?;
        self.surface = surface;
        self.ctx = ctx;
        Ok(())
    }
}

fn create_surface(width: u32, height: u32) -> Result<(ImageSurface, Context)> {
    let surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
    let ctx = Context::new(&surface)?;
    // Canvas default; cairo starts at 2.
    ctx.set_line_width(1.0);
    Ok((surface, ctx))
}

fn to_pixels(length: f64) -> u32 {
    if length.is_finite() && length > 0.0 {
        length.ceil() as u32
    } else {
        0
    }
}

/// Premultiplied native-endian ARGB32 → straight RGBA bytes.
fn unpremultiply(argb: u32) -> [u8; 4] {
    let a = (argb >> 24) & 0xff;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let channel = |shift: u32| (((argb >> shift) & 0xff) * 255 + a / 2) / a;
    [channel(16) as u8, channel(8) as u8, channel(0) as u8, a as u8]
}

fn parse_color(color: &str) -> (f64, f64, f64, f64) {
    let c = color.trim();
    if let Some(hex) = c.strip_prefix('#').filter(|h| h.is_ascii()) {
        let byte = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
        let parsed = match hex.len() {
            3 => {
                let nibble = |i: usize| byte(&hex[i..i + 1].repeat(2));
                nibble(0)
                    .zip(nibble(1))
                    .zip(nibble(2))
                    .map(|((r, g), b)| (r, g, b, 1.0))
            }
            6 | 8 => {
                let alpha = if hex.len() == 8 { byte(&hex[6..8]) } else { Some(1.0) };
                byte(&hex[0..2])
                    .zip(byte(&hex[2..4]))
                    .zip(byte(&hex[4..6]))
                    .zip(alpha)
                    .map(|(((r, g), b), a)| (r, g, b, a))
            }
            _ => None,
        };
        if let Some(rgba) = parsed {
            return rgba;
        }
    }

    warn!(color, "unsupported color, painting opaque black");
    (0.0, 0.0, 0.0, 1.0)
}
