//! Append-only emitter that turns drawing calls into a self-invoking script.
//!
//! The generated program creates its own drawing surface, replays every
//! accumulated statement against the surface's 2D context, and returns the
//! surface encoded as an image data URL.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::api::{
    CanvasDimensions, CanvasFillStrokeStyles, CanvasPaths, GradientStop, LinearGradient, Paint,
};
use crate::error::{Result, UnknownGradientError};
use crate::translate::Operation;

/// Identifier the prologue binds the 2D context to, unless overridden.
pub const DEFAULT_RECEIVER: &str = "ctx";
/// Surface width and height used until the document sets its own.
pub const DEFAULT_DIMENSION: f64 = 800.0;

/// A value as it appears in generated source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Inserted verbatim, e.g. a variable holding a gradient.
    Raw(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::Text(s) => {
                f.write_str("'")?;
                for ch in s.chars() {
                    match ch {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\u{2028}' => f.write_str("\\u2028")?,
                        '\u{2029}' => f.write_str("\\u2029")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                f.write_str("'")
            }
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Raw(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

/// Numbers in the form a script engine prints them: no trailing `.0`, and
/// named non-finite values.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let name = if value > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn call_statement(receiver: &str, name: &str, arguments: &[Literal]) -> String {
    let arguments = arguments
        .iter()
        .map(Literal::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}.{}({});\n", receiver, name, arguments)
}

#[derive(Clone, Debug)]
pub struct CodeGen {
    receiver: String,
    statements: Vec<String>,
    gradients: HashMap<String, String>,
    gradient_counter: usize,
    width: f64,
    height: f64,
}

impl CodeGen {
    pub fn new() -> Self {
        Self::with_receiver(DEFAULT_RECEIVER)
    }

    /// Uses `receiver` as the name of the drawing context in the output.
    pub fn with_receiver(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            statements: Vec::new(),
            gradients: HashMap::new(),
            gradient_counter: 0,
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
        }
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Statements emitted so far, without prologue or epilogue.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    fn push(&mut self, statement: String) {
        trace!(statement = statement.trim_end(), "emitted statement");
        self.statements.push(statement);
    }

    /// Appends `<receiver>.<name>(<arguments>);`.
    pub fn emit_call(&mut self, name: &str, arguments: &[Literal]) {
        let statement = call_statement(&self.receiver, name, arguments);
        self.push(statement);
    }

    /// Appends `<receiver>.<property> = <value>;`. Strings are quoted; use
    /// [`CodeGen::emit_assign_raw`] to reference an identifier instead.
    pub fn emit_assign(&mut self, property: &str, value: impl Into<Literal>) {
        let statement = format!("{}.{} = {};\n", self.receiver, property, value.into());
        self.push(statement);
    }

    /// Appends an assignment whose right-hand side is inserted unquoted.
    pub fn emit_assign_raw(&mut self, property: &str, identifier: &str) {
        self.emit_assign(property, Literal::Raw(identifier.to_string()));
    }

    pub fn emit_operation(&mut self, operation: &Operation) {
        self.emit_call(operation.name(), &operation.arguments());
    }

    pub fn emit_operations<'a>(&mut self, operations: impl IntoIterator<Item = &'a Operation>) {
        for operation in operations {
            self.emit_operation(operation);
        }
    }

    /// Emits the construction of a linear gradient and binds `id` to the
    /// variable holding it. Returns that variable name.
    pub fn define_linear_gradient(
        &mut self,
        id: &str,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stops: &[GradientStop],
    ) -> String {
        let var = format!("gradient{}", self.gradient_counter);
        self.gradient_counter += 1;

        let coordinates = [x1, y1, x2, y2].map(Literal::Number);
        let constructor = call_statement(&self.receiver, "createLinearGradient", &coordinates);
        self.push(format!("const {} = {}", var, constructor));
        for stop in stops {
            let arguments = [Literal::Number(stop.offset), Literal::Text(stop.color.clone())];
            self.push(call_statement(&var, "addColorStop", &arguments));
        }

        if let Some(previous) = self.gradients.insert(id.to_string(), var.clone()) {
            warn!(id, previous = %previous, current = %var, "gradient id redefined");
        }
        debug!(id, var = %var, stops = stops.len(), "defined linear gradient");
        var
    }

    /// Variable bound to gradient `id` by the latest definition.
    pub fn resolve_gradient_var(&self, id: &str) -> std::result::Result<&str, UnknownGradientError> {
        self.gradients
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| UnknownGradientError { id: id.to_string() })
    }

    fn paint_literal(&self, paint: Paint) -> Result<Literal> {
        match paint {
            Paint::Color(color) => Ok(Literal::Text(color)),
            Paint::Gradient(id) => Ok(Literal::Raw(self.resolve_gradient_var(&id)?.to_string())),
        }
    }

    /// Full program text. Each call builds the prologue and epilogue afresh,
    /// so repeated calls return identical output.
    pub fn serialize(&self) -> String {
        let width = format_number(self.width);
        let height = format_number(self.height);

        let mut out = String::from("(function () {\n\n");
        out.push_str("// Initialize canvas\n");
        out.push_str("const id = crypto.randomUUID();\n");
        out.push_str("const canvas = document.createElement(\"canvas\");\n");
        out.push_str("canvas.setAttribute(\"id\", id);\n");
        out.push_str(&format!("canvas.setAttribute(\"width\", {});\n", width));
        out.push_str(&format!("canvas.setAttribute(\"height\", {});\n", height));
        out.push_str(&format!("const {} = canvas.getContext(\"2d\");\n", self.receiver));
        out.push_str("\n// Begin generation\n");
        for statement in &self.statements {
            out.push_str(statement);
        }
        out.push_str("return canvas.toDataURL();\n");
        out.push_str("\n})()");

        debug!(statements = self.statements.len(), bytes = out.len(), "serialized program");
        out
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CodeGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl CanvasPaths for CodeGen {
    fn begin_path(&mut self) -> Result<()> {
        self.emit_call("beginPath", &[]);
        Ok(())
    }

    fn close_path(&mut self) -> Result<()> {
        self.emit_call("closePath", &[]);
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.emit_operation(&Operation::MoveTo { x, y });
        Ok(())
    }

    fn line_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.emit_operation(&Operation::LineTo { x, y });
        Ok(())
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) -> Result<()> {
        self.emit_operation(&Operation::BezierCurveTo {
            cp1x,
            cp1y,
            cp2x,
            cp2y,
            x,
            y,
        });
        Ok(())
    }

    fn fill(&mut self) -> Result<()> {
        self.emit_call("fill", &[]);
        Ok(())
    }

    fn stroke(&mut self) -> Result<()> {
        self.emit_operation(&Operation::Stroke);
        Ok(())
    }
}

impl CanvasFillStrokeStyles for CodeGen {
    fn set_fill_style(&mut self, style: Paint) -> Result<()> {
        let value = self.paint_literal(style)?;
        self.emit_assign("fillStyle", value);
        Ok(())
    }

    fn set_stroke_style(&mut self, style: Paint) -> Result<()> {
        let value = self.paint_literal(style)?;
        self.emit_assign("strokeStyle", value);
        Ok(())
    }

    fn register_gradient(&mut self, gradient: &LinearGradient) -> Result<()> {
        self.define_linear_gradient(
            &gradient.id,
            gradient.x1,
            gradient.y1,
            gradient.x2,
            gradient.y2,
            &gradient.stops,
        );
        Ok(())
    }
}

impl CanvasDimensions for CodeGen {
    fn set_dimensions(&mut self, width: f64, height: f64) -> Result<()> {
        self.set_size(width, height);
        Ok(())
    }
}
