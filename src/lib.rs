//! Compiles vector path data (the `d` attribute grammar) into imperative
//! drawing calls for a 2D immediate-mode context.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`lexer`] turns the path string into typed command tokens.
//! 2. [`translate`] resolves relative coordinates against a
//!    [`TransformContext`] and yields absolute [`Operation`]s.
//! 3. [`codegen`] serializes operations, style assignments and gradients
//!    into a self-invoking script that returns an encoded image.
//!
//! Resolved operations can also be replayed onto any surface implementing
//! the traits in [`api`], such as the cairo rasterizer behind the `cairo`
//! feature.
//!
//! ```
//! use pathcanvas_rs::{compile_path, CodeGen, TransformContext};
//!
//! let mut pen = TransformContext::new();
//! let ops = compile_path("M10 10 l5 -3", &mut pen)?;
//!
//! let mut cg = CodeGen::new();
//! cg.emit_operations(&ops);
//! assert!(cg.serialize().contains("ctx.lineTo(15, 7);"));
//! # Ok::<(), pathcanvas_rs::Error>(())
//! ```

pub mod api;
#[cfg(feature = "cairo")]
pub mod backends;
pub mod codegen;
#[cfg(feature = "svg")]
pub mod document;
pub mod error;
pub mod lexer;
pub mod transform;
pub mod translate;

pub use codegen::{CodeGen, Literal};
#[cfg(feature = "svg")]
pub use document::{DocumentOptions, compile_document, render_document};
pub use error::{Error, LexError, Result, TranslationError, UnknownGradientError};
pub use lexer::{CommandKind, Token, tokenize};
pub use transform::TransformContext;
pub use translate::{Operation, translate};

/// Lexes and translates one path string, advancing `ctx` along the way.
pub fn compile_path(path: &str, ctx: &mut TransformContext) -> Result<Vec<Operation>> {
    let tokens = tokenize(path)?;
    Ok(translate(&tokens, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_errors_stop_the_pipeline() {
        let mut ctx = TransformContext::new();

        let err = compile_path("M0 0 L5 5 Q1 1 2 2", &mut ctx).unwrap_err();

        assert!(matches!(err, Error::Lex(_)));
        // Nothing was translated, so the pen never moved.
        assert_eq!(ctx.current_point(), (0.0, 0.0));
    }

    #[test]
    fn compiles_and_emits_a_path() {
        let mut ctx = TransformContext::new();
        let ops = compile_path("M0 0 H10 V10 z", &mut ctx).unwrap();

        let mut cg = CodeGen::new();
        cg.emit_operations(&ops);

        assert_eq!(
            cg.statements(),
            &[
                "ctx.moveTo(0, 0);\n".to_string(),
                "ctx.lineTo(10, 0);\n".to_string(),
                "ctx.stroke();\n".to_string(),
                "ctx.lineTo(10, 10);\n".to_string(),
                "ctx.stroke();\n".to_string(),
            ]
        );
    }

    #[test]
    fn error_messages_name_the_problem() {
        let mut ctx = TransformContext::new();

        let err = compile_path("M0 0 Q", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "unrecognized character 'Q' at offset 5");

        let err = compile_path("M1", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "expected a number at offset 2");

        let tokens = vec![Token::new(CommandKind::CubicCurveTo, vec![1.0, 2.0])];
        let err = translate(&tokens, &mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'C' takes 6 arguments but the token carries 2"
        );
    }
}
