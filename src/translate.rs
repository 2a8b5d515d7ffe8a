//! Resolves lexed path commands into absolute drawing operations.

use tracing::{debug, trace};

use crate::api::CanvasPaths;
use crate::codegen::Literal;
use crate::error::{Result, TranslationError};
use crate::lexer::{CommandKind, Token};
use crate::transform::TransformContext;

/// A drawing instruction with every coordinate in absolute output space.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    BezierCurveTo {
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    },
    /// Paints the segment just added. Emitted after every line and curve.
    Stroke,
}

impl Operation {
    /// Identifier of the drawing-context method this operation invokes.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::MoveTo { .. } => "moveTo",
            Operation::LineTo { .. } => "lineTo",
            Operation::BezierCurveTo { .. } => "bezierCurveTo",
            Operation::Stroke => "stroke",
        }
    }

    /// Call arguments in declaration order.
    pub fn arguments(&self) -> Vec<Literal> {
        let numbers: Vec<f64> = match *self {
            Operation::MoveTo { x, y } | Operation::LineTo { x, y } => vec![x, y],
            Operation::BezierCurveTo {
                cp1x,
                cp1y,
                cp2x,
                cp2y,
                x,
                y,
            } => vec![cp1x, cp1y, cp2x, cp2y, x, y],
            Operation::Stroke => Vec::new(),
        };
        numbers.into_iter().map(Literal::Number).collect()
    }

    /// Replays the operation onto a drawing surface.
    pub fn apply<C: CanvasPaths + ?Sized>(&self, canvas: &mut C) -> Result<()> {
        match *self {
            Operation::MoveTo { x, y } => canvas.move_to(x, y),
            Operation::LineTo { x, y } => canvas.line_to(x, y),
            Operation::BezierCurveTo {
                cp1x,
                cp1y,
                cp2x,
                cp2y,
                x,
                y,
            } => canvas.bezier_curve_to(cp1x, cp1y, cp2x, cp2y, x, y),
            Operation::Stroke => canvas.stroke(),
        }
    }
}

/// Translates a token sequence, advancing `ctx` to the endpoint of every
/// command that moves the pen.
pub fn translate(
    tokens: &[Token],
    ctx: &mut TransformContext,
) -> std::result::Result<Vec<Operation>, TranslationError> {
    let mut operations = Vec::with_capacity(tokens.len() * 2);
    for token in tokens {
        resolve(token, ctx, &mut operations)?;
    }
    debug!(
        tokens = tokens.len(),
        operations = operations.len(),
        "translated path commands"
    );
    Ok(operations)
}

fn resolve(
    token: &Token,
    ctx: &mut TransformContext,
    out: &mut Vec<Operation>,
) -> std::result::Result<(), TranslationError> {
    let kind = token.kind();
    let (cx, cy) = ctx.current_point();
    // Relative commands are offsets from the pen position before the command.
    let (ox, oy) = if kind.is_relative() { (cx, cy) } else { (0.0, 0.0) };

    match kind {
        CommandKind::MoveTo | CommandKind::RelativeMoveTo => {
            let [dx, dy] = arguments::<2>(token)?;
            let (x, y) = (ox + dx, oy + dy);
            out.push(Operation::MoveTo { x, y });
            ctx.translate(x, y);
        }
        CommandKind::HorizontalLineTo | CommandKind::RelativeHorizontalLineTo => {
            let [dx] = arguments::<1>(token)?;
            line_to(ctx, out, ox + dx, cy);
        }
        CommandKind::VerticalLineTo | CommandKind::RelativeVerticalLineTo => {
            let [dy] = arguments::<1>(token)?;
            line_to(ctx, out, cx, oy + dy);
        }
        CommandKind::LineTo | CommandKind::RelativeLineTo => {
            let [dx, dy] = arguments::<2>(token)?;
            line_to(ctx, out, ox + dx, oy + dy);
        }
        CommandKind::CubicCurveTo | CommandKind::RelativeCubicCurveTo => {
            let [dx1, dy1, dx2, dy2, dx, dy] = arguments::<6>(token)?;
            let (x, y) = (ox + dx, oy + dy);
            out.push(Operation::BezierCurveTo {
                cp1x: ox + dx1,
                cp1y: oy + dy1,
                cp2x: ox + dx2,
                cp2y: oy + dy2,
                x,
                y,
            });
            ctx.translate(x, y);
            out.push(Operation::Stroke);
        }
        CommandKind::ClosePath => {
            // Deliberately does not return the pen to the subpath start.
            arguments::<0>(token)?;
            debug!(x = cx, y = cy, "close-subpath has no geometric effect");
            return Ok(());
        }
    }

    trace!(command = %kind.letter(), x = ctx.current_x(), y = ctx.current_y(), "resolved command");
    Ok(())
}

fn line_to(ctx: &mut TransformContext, out: &mut Vec<Operation>, x: f64, y: f64) {
    out.push(Operation::LineTo { x, y });
    ctx.translate(x, y);
    out.push(Operation::Stroke);
}

fn arguments<const N: usize>(token: &Token) -> std::result::Result<[f64; N], TranslationError> {
    <[f64; N]>::try_from(token.arguments()).map_err(|_| TranslationError::ArityMismatch {
        kind: token.kind(),
        expected: token.kind().arity(),
        found: token.arguments().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn run(path: &str, ctx: &mut TransformContext) -> Vec<Operation> {
        let tokens = tokenize(path).unwrap();
        translate(&tokens, ctx).unwrap()
    }

    fn assert_almost_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn absolute_line_ignores_current_point() {
        let mut ctx = TransformContext::new();
        ctx.translate(5.0, 5.0);

        let ops = run("L 10,20", &mut ctx);

        assert_eq!(ops, vec![Operation::LineTo { x: 10.0, y: 20.0 }, Operation::Stroke]);
        assert_eq!(ctx.current_point(), (10.0, 20.0));
    }

    #[test]
    fn relative_commands_compose() {
        let mut ctx = TransformContext::new();

        let ops = run("m 10,10 l 5,-3", &mut ctx);

        assert_eq!(
            ops,
            vec![
                Operation::MoveTo { x: 10.0, y: 10.0 },
                Operation::LineTo { x: 15.0, y: 7.0 },
                Operation::Stroke,
            ]
        );
        assert_eq!(ctx.current_point(), (15.0, 7.0));
    }

    #[test]
    fn relative_curve_keeps_argument_order() {
        let mut ctx = TransformContext::new();

        let ops = run("c 1,2,3,4,5,6", &mut ctx);

        assert_eq!(
            ops[0],
            Operation::BezierCurveTo {
                cp1x: 1.0,
                cp1y: 2.0,
                cp2x: 3.0,
                cp2y: 4.0,
                x: 5.0,
                y: 6.0,
            }
        );
        assert_eq!(ops[1], Operation::Stroke);
        assert_eq!(ctx.current_point(), (5.0, 6.0));
    }

    #[test]
    fn relative_curve_offsets_every_point_from_start() {
        let mut ctx = TransformContext::new();
        ctx.translate(10.0, 100.0);

        let ops = run("c1 2 3 4 5 6", &mut ctx);

        assert_eq!(
            ops[0],
            Operation::BezierCurveTo {
                cp1x: 11.0,
                cp1y: 102.0,
                cp2x: 13.0,
                cp2y: 104.0,
                x: 15.0,
                y: 106.0,
            }
        );
    }

    #[test]
    fn absolute_curve_passes_arguments_through() {
        let mut ctx = TransformContext::new();
        ctx.translate(7.0, 7.0);

        let ops = run("C1 2 3 4 5 6", &mut ctx);

        assert_eq!(ops[0].arguments().len(), 6);
        assert_eq!(
            ops[0],
            Operation::BezierCurveTo {
                cp1x: 1.0,
                cp1y: 2.0,
                cp2x: 3.0,
                cp2y: 4.0,
                x: 5.0,
                y: 6.0,
            }
        );
    }

    #[test]
    fn horizontal_and_vertical_fill_in_missing_axis() {
        let mut ctx = TransformContext::new();
        ctx.translate(5.0, 30.0);

        let ops = run("H 50", &mut ctx);
        assert_eq!(ops[0], Operation::LineTo { x: 50.0, y: 30.0 });

        let ops = run("v -10", &mut ctx);
        assert_eq!(ops[0], Operation::LineTo { x: 50.0, y: 20.0 });

        let ops = run("h 5 V 1", &mut ctx);
        assert_eq!(ops[0], Operation::LineTo { x: 55.0, y: 20.0 });
        assert_eq!(ops[2], Operation::LineTo { x: 55.0, y: 1.0 });
    }

    #[test]
    fn one_operation_per_command_plus_paint_markers() {
        let mut ctx = TransformContext::new();

        let ops = run("M0 0 L1 1 H2 V3 C1 1 2 2 3 3 l1 1 z", &mut ctx);

        // 6 geometry commands, 5 of which paint, and close-subpath adds nothing.
        assert_eq!(ops.len(), 11);
        let strokes = ops.iter().filter(|op| **op == Operation::Stroke).count();
        assert_eq!(strokes, 5);
        assert_eq!(ops[0].name(), "moveTo");
    }

    #[test]
    fn close_subpath_leaves_pen_in_place() {
        let mut ctx = TransformContext::new();

        let ops = run("M1 1 L9 9 Z", &mut ctx);

        assert_eq!(ops.last(), Some(&Operation::Stroke));
        assert_eq!(ctx.current_point(), (9.0, 9.0));
    }

    #[test]
    fn rejects_tokens_with_wrong_arity() {
        let mut ctx = TransformContext::new();
        let tokens = vec![Token::new(CommandKind::LineTo, vec![1.0])];

        let err = translate(&tokens, &mut ctx).unwrap_err();

        assert_eq!(
            err,
            TranslationError::ArityMismatch {
                kind: CommandKind::LineTo,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn operation_names_and_arguments() {
        let op = Operation::LineTo { x: 1.5, y: -2.0 };
        assert_eq!(op.name(), "lineTo");
        assert_eq!(op.arguments(), vec![Literal::Number(1.5), Literal::Number(-2.0)]);
        assert!(Operation::Stroke.arguments().is_empty());
    }

    #[test]
    fn fractional_offsets_accumulate() {
        let mut ctx = TransformContext::new();

        let ops = run("m.1 .2 l.2 .1 h-.05 v.35", &mut ctx);

        assert_eq!(ops.len(), 7);
        match ops[5] {
            Operation::LineTo { x, y } => {
                assert_almost_eq(x, 0.25);
                assert_almost_eq(y, 0.65);
            }
            ref other => panic!("expected lineTo, got {:?}", other),
        }
        assert_almost_eq(ctx.current_x(), 0.25);
        assert_almost_eq(ctx.current_y(), 0.65);
    }
}
