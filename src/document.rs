//! Walks an SVG document and drives a drawing surface with what it finds:
//! root dimensions, linear gradients, and `<path>` elements with their fill.
//! Everything else is traversed and ignored.

use std::collections::HashSet;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, trace, warn};

use crate::api::{CanvasRenderingContext2D, GradientStop, LinearGradient, Paint};
use crate::codegen::{CodeGen, DEFAULT_DIMENSION};
use crate::compile_path;
use crate::error::{Result, UnknownGradientError};
use crate::transform::TransformContext;

#[derive(Clone, Debug, Default)]
pub struct DocumentOptions {
    /// Skip paths whose data or fill cannot be resolved instead of failing the
    /// whole document.
    pub skip_invalid_paths: bool,
}

/// Renders `source` onto `canvas`.
///
/// The document is read twice: the first pass registers every linear
/// gradient, the second draws. Fill references may therefore precede the
/// gradient they name.
pub fn render_document<C>(source: &str, canvas: &mut C, options: &DocumentOptions) -> Result<()>
where
    C: CanvasRenderingContext2D + ?Sized,
{
    let mut walker = Walker::new(canvas, options);
    walker.walk(source, Pass::Gradients)?;
    walker.walk(source, Pass::Drawing)?;

    debug!(paths = walker.paths, skipped = walker.skipped, "rendered document");
    Ok(())
}

/// Compiles `source` into a script generator ready to serialize.
pub fn compile_document(source: &str, options: &DocumentOptions) -> Result<CodeGen> {
    let mut codegen = CodeGen::new();
    render_document(source, &mut codegen, options)?;
    Ok(codegen)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Gradients,
    Drawing,
}

struct Walker<'a, C: ?Sized> {
    canvas: &'a mut C,
    options: &'a DocumentOptions,
    pass: Pass,
    pen: TransformContext,
    width: f64,
    height: f64,
    gradient: Option<LinearGradient>,
    gradient_ids: HashSet<String>,
    defs_depth: usize,
    paths: usize,
    skipped: usize,
}

impl<'a, C> Walker<'a, C>
where
    C: CanvasRenderingContext2D + ?Sized,
{
    fn new(canvas: &'a mut C, options: &'a DocumentOptions) -> Self {
        Self {
            canvas,
            options,
            pass: Pass::Gradients,
            pen: TransformContext::new(),
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            gradient: None,
            gradient_ids: HashSet::new(),
            defs_depth: 0,
            paths: 0,
            skipped: 0,
        }
    }

    fn walk(&mut self, source: &str, pass: Pass) -> Result<()> {
        let mut reader = Reader::from_str(source);
        let decoder = reader.decoder();
        self.pass = pass;
        self.defs_depth = 0;

        loop {
            match reader.read_event()? {
                Event::Start(e) => self.open(&e, decoder, false)?,
                Event::Empty(e) => self.open(&e, decoder, true)?,
                Event::End(e) => self.close(e.local_name().as_ref())?,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn open(&mut self, element: &BytesStart<'_>, decoder: Decoder, empty: bool) -> Result<()> {
        match (self.pass, element.local_name().as_ref()) {
            (Pass::Gradients, b"linearGradient") => {
                self.gradient = Some(linear_gradient(&attributes(element, decoder)?));
                if empty {
                    self.finish_gradient()?;
                }
            }
            (Pass::Gradients, b"stop") => self.stop(&attributes(element, decoder)?),
            (Pass::Gradients, _) => {}
            (Pass::Drawing, b"svg") => self.root(&attributes(element, decoder)?)?,
            (Pass::Drawing, b"defs") => {
                if !empty {
                    self.defs_depth += 1;
                }
            }
            (Pass::Drawing, b"path") if self.defs_depth > 0 => trace!("path inside defs is not drawn"),
            (Pass::Drawing, b"path") => self.path(&attributes(element, decoder)?)?,
            (Pass::Drawing, name) => trace!(element = %String::from_utf8_lossy(name), "ignored element"),
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<()> {
        match (self.pass, name) {
            (Pass::Gradients, b"linearGradient") => self.finish_gradient()?,
            (Pass::Drawing, b"defs") => self.defs_depth = self.defs_depth.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }

    fn root(&mut self, attrs: &[(String, String)]) -> Result<()> {
        let mut sized = false;
        for (name, value) in attrs {
            let slot = match name.as_str() {
                "width" => &mut self.width,
                "height" => &mut self.height,
                _ => continue,
            };
            match parse_length(value) {
                Some(length) => {
                    *slot = length;
                    sized = true;
                }
                None => warn!(attribute = %name, value = %value, "unsupported length, keeping current size"),
            }
        }
        if sized {
            self.canvas.set_dimensions(self.width, self.height)?;
        }

        if let Some(paint) = self.fill_paint(attrs)? {
            self.canvas.set_fill_style(paint)?;
        }
        Ok(())
    }

    fn stop(&mut self, attrs: &[(String, String)]) {
        let Some(gradient) = self.gradient.as_mut() else {
            trace!("stop outside of a gradient");
            return;
        };
        let offset = attribute(attrs, "offset").map(parse_offset).unwrap_or(0.0);
        let color = attribute(attrs, "stop-color").unwrap_or("black");
        gradient.stops.push(GradientStop {
            offset,
            color: color.to_string(),
        });
    }

    fn finish_gradient(&mut self) -> Result<()> {
        if let Some(gradient) = self.gradient.take() {
            self.canvas.register_gradient(&gradient)?;
            self.gradient_ids.insert(gradient.id);
        }
        Ok(())
    }

    fn path(&mut self, attrs: &[(String, String)]) -> Result<()> {
        let data = attribute(attrs, "d").unwrap_or("");

        // Each path starts from the origin and leaves the shared pen untouched.
        self.pen.begin_scope();
        let compiled = compile_path(data, &mut self.pen);
        self.pen.end_scope();

        let resolved = compiled.and_then(|ops| Ok((ops, self.fill_paint(attrs)?)));
        let (operations, fill) = match resolved {
            Ok(resolved) => resolved,
            Err(err) if self.options.skip_invalid_paths => {
                warn!(error = %err, "skipping path");
                self.skipped += 1;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        self.canvas.begin_path()?;
        for operation in &operations {
            operation.apply(&mut *self.canvas)?;
        }
        if let Some(paint) = fill {
            self.canvas.set_fill_style(paint)?;
        }
        self.canvas.fill()?;
        self.canvas.close_path()?;

        self.paths += 1;
        Ok(())
    }

    /// The `fill` attribute as a paint, checking gradient references against
    /// the gradients seen so far.
    fn fill_paint(&self, attrs: &[(String, String)]) -> Result<Option<Paint>> {
        let Some(value) = attribute(attrs, "fill") else {
            return Ok(None);
        };
        match gradient_reference(value) {
            Some(id) if self.gradient_ids.contains(id) => Ok(Some(Paint::Gradient(id.to_string()))),
            Some(id) => Err(UnknownGradientError { id: id.to_string() }.into()),
            None => Ok(Some(Paint::Color(value.to_string()))),
        }
    }
}

/// Attribute names and values, with entity and character references in the
/// values resolved.
fn attributes(element: &BytesStart<'_>, decoder: Decoder) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attrs.push((name, value));
    }
    Ok(attrs)
}

fn attribute<'v>(attrs: &'v [(String, String)], name: &str) -> Option<&'v str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn linear_gradient(attrs: &[(String, String)]) -> LinearGradient {
    let coordinate = |name: &str| attribute(attrs, name).and_then(parse_length).unwrap_or(0.0);
    let id = attribute(attrs, "id").unwrap_or_default();
    LinearGradient::new(
        id,
        coordinate("x1"),
        coordinate("y1"),
        coordinate("x2"),
        coordinate("y2"),
    )
}

/// `url(#id)` → `id`.
fn gradient_reference(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?.trim();
    let inner = inner.trim_matches(|c: char| c == '\'' || c == '"');
    Some(inner.strip_prefix('#').unwrap_or(inner))
}

fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}

/// Stop offsets are plain fractions or percentages.
fn parse_offset(value: &str) -> f64 {
    let value = value.trim();
    let parsed = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().map(|p| p / 100.0),
        None => value.parse::<f64>(),
    };
    parsed.unwrap_or_else(|_| {
        warn!(value, "unparsable gradient stop offset, using 0");
        0.0
    })
}
