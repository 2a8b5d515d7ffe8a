//! Tokenizer for the path-data mini-language (`d` attribute grammar).
//!
//! The lexer only tags each command with its kind and reads exactly as many
//! numbers as that kind takes. Whether coordinates are absolute or relative is
//! left to the translator.

use std::iter::Peekable;
use std::str::CharIndices;

use tracing::{debug, trace};

use crate::error::LexError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MoveTo,
    RelativeMoveTo,
    HorizontalLineTo,
    RelativeHorizontalLineTo,
    VerticalLineTo,
    RelativeVerticalLineTo,
    LineTo,
    RelativeLineTo,
    CubicCurveTo,
    RelativeCubicCurveTo,
    ClosePath,
}

impl CommandKind {
    /// Maps a command letter to its kind. Close-subpath is case-insensitive.
    pub fn from_letter(letter: char) -> Option<Self> {
        let kind = match letter {
            'M' => CommandKind::MoveTo,
            'm' => CommandKind::RelativeMoveTo,
            'H' => CommandKind::HorizontalLineTo,
            'h' => CommandKind::RelativeHorizontalLineTo,
            'V' => CommandKind::VerticalLineTo,
            'v' => CommandKind::RelativeVerticalLineTo,
            'L' => CommandKind::LineTo,
            'l' => CommandKind::RelativeLineTo,
            'C' => CommandKind::CubicCurveTo,
            'c' => CommandKind::RelativeCubicCurveTo,
            'Z' | 'z' => CommandKind::ClosePath,
            _ => return None,
        };
        Some(kind)
    }

    pub fn letter(self) -> char {
        match self {
            CommandKind::MoveTo => 'M',
            CommandKind::RelativeMoveTo => 'm',
            CommandKind::HorizontalLineTo => 'H',
            CommandKind::RelativeHorizontalLineTo => 'h',
            CommandKind::VerticalLineTo => 'V',
            CommandKind::RelativeVerticalLineTo => 'v',
            CommandKind::LineTo => 'L',
            CommandKind::RelativeLineTo => 'l',
            CommandKind::CubicCurveTo => 'C',
            CommandKind::RelativeCubicCurveTo => 'c',
            CommandKind::ClosePath => 'z',
        }
    }

    /// Number of numeric arguments the command consumes.
    pub fn arity(self) -> usize {
        match self {
            CommandKind::ClosePath => 0,
            CommandKind::HorizontalLineTo
            | CommandKind::RelativeHorizontalLineTo
            | CommandKind::VerticalLineTo
            | CommandKind::RelativeVerticalLineTo => 1,
            CommandKind::MoveTo
            | CommandKind::RelativeMoveTo
            | CommandKind::LineTo
            | CommandKind::RelativeLineTo => 2,
            CommandKind::CubicCurveTo | CommandKind::RelativeCubicCurveTo => 6,
        }
    }

    pub fn is_relative(self) -> bool {
        matches!(
            self,
            CommandKind::RelativeMoveTo
                | CommandKind::RelativeHorizontalLineTo
                | CommandKind::RelativeVerticalLineTo
                | CommandKind::RelativeLineTo
                | CommandKind::RelativeCubicCurveTo
        )
    }
}

/// One drawing command with its arguments in document order.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    kind: CommandKind,
    arguments: Vec<f64>,
}

impl Token {
    /// Builds a token directly. The argument count is not checked here; the
    /// translator rejects tokens whose count does not match the kind.
    pub fn new(kind: CommandKind, arguments: Vec<f64>) -> Self {
        Self { kind, arguments }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn arguments(&self) -> &[f64] {
        &self.arguments
    }
}

/// Forward-only scanner over a path-data string.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Consumes the whole input. Any character that is not whitespace or a
    /// supported command letter aborts the scan.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some((position, ch)) = self.chars.next() {
            if ch.is_whitespace() {
                continue;
            }

            let kind = CommandKind::from_letter(ch)
                .ok_or_else(|| LexError::unexpected_character(ch, position))?;
            let arguments = self.read_arguments(kind.arity())?;
            trace!(command = %kind.letter(), ?arguments, position, "lexed command");
            tokens.push(Token { kind, arguments });
        }

        debug!(tokens = tokens.len(), "tokenized path data");
        Ok(tokens)
    }

    fn read_arguments(&mut self, arity: usize) -> Result<Vec<f64>, LexError> {
        let mut arguments = Vec::with_capacity(arity);
        for index in 0..arity {
            if index > 0 {
                self.skip_separator();
            }
            arguments.push(self.read_number()?);
        }
        Ok(arguments)
    }

    /// Between two arguments: any whitespace around at most one comma.
    fn skip_separator(&mut self) {
        self.skip_whitespace();
        if let Some(&(_, ',')) = self.chars.peek() {
            self.chars.next();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.chars.next();
        }
    }

    /// Optional leading minus, digits, and at most one decimal point. A second
    /// point ends the number and starts the next one.
    fn read_number(&mut self) -> Result<f64, LexError> {
        self.skip_whitespace();

        let start = self.offset();
        let mut end = start;

        if let Some(&(i, '-')) = self.chars.peek() {
            self.chars.next();
            end = i + 1;
        }

        let mut seen_dot = false;
        while let Some(&(i, ch)) = self.chars.peek() {
            if ch == '.' {
                if seen_dot {
                    break;
                }
                seen_dot = true;
            } else if !ch.is_ascii_digit() {
                break;
            }
            self.chars.next();
            end = i + 1;
        }

        self.input[start..end]
            .parse::<f64>()
            .map_err(|_| LexError::invalid_number(start))
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.input.len())
    }
}

/// Tokenizes a complete path-data string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexErrorKind;

    fn kinds(tokens: &[Token]) -> Vec<CommandKind> {
        tokens.iter().map(Token::kind).collect()
    }

    #[test]
    fn reads_every_command_letter() {
        let tokens = tokenize("M1 2 m3 4 H5 h6 V7 v8 L9 10 l11 12 C1 2 3 4 5 6 c1 2 3 4 5 6 Z z")
            .unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![
                CommandKind::MoveTo,
                CommandKind::RelativeMoveTo,
                CommandKind::HorizontalLineTo,
                CommandKind::RelativeHorizontalLineTo,
                CommandKind::VerticalLineTo,
                CommandKind::RelativeVerticalLineTo,
                CommandKind::LineTo,
                CommandKind::RelativeLineTo,
                CommandKind::CubicCurveTo,
                CommandKind::RelativeCubicCurveTo,
                CommandKind::ClosePath,
                CommandKind::ClosePath,
            ]
        );
        for token in &tokens {
            assert_eq!(token.arguments().len(), token.kind().arity());
        }
    }

    #[test]
    fn accepts_commas_spaces_and_packed_numbers() {
        let tokens = tokenize("L 10,20 l10-5 M-1.5 .25").unwrap();

        assert_eq!(tokens[0].arguments(), &[10.0, 20.0]);
        assert_eq!(tokens[1].arguments(), &[10.0, -5.0]);
        assert_eq!(tokens[2].arguments(), &[-1.5, 0.25]);
    }

    #[test]
    fn keeps_curve_arguments_in_document_order() {
        let tokens = tokenize("c1,2,3,4,5,6").unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].arguments(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn second_decimal_point_starts_a_new_number() {
        let tokens = tokenize("M1.5.5").unwrap();

        assert_eq!(tokens[0].arguments(), &[1.5, 0.5]);
    }

    #[test]
    fn skips_newlines_and_tabs_between_commands() {
        let tokens = tokenize("M0 0\n\tL1 1\r\nz").unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![CommandKind::MoveTo, CommandKind::LineTo, CommandKind::ClosePath]
        );
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_unsupported_command() {
        let err = tokenize("M0 0 Q1 1 2 2").unwrap_err();

        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('Q'));
        assert_eq!(err.position, 5);
    }

    #[test]
    fn rejects_extra_arguments() {
        let err = tokenize("L1 2 3 4").unwrap_err();

        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('3'));
    }

    #[test]
    fn missing_number_is_an_error_not_zero() {
        let err = tokenize("M10").unwrap_err();
        assert_eq!(err, LexError::invalid_number(3));

        let err = tokenize("L,5 5").unwrap_err();
        assert_eq!(err, LexError::invalid_number(1));

        let err = tokenize("H-").unwrap_err();
        assert_eq!(err, LexError::invalid_number(1));
    }

    #[test]
    fn only_one_comma_between_arguments() {
        let err = tokenize("L1,,2").unwrap_err();

        assert_eq!(err, LexError::invalid_number(3));
    }

    #[test]
    fn whitespace_may_surround_the_comma() {
        let tokens = tokenize("L1 , 2 l 3 ,\t4").unwrap();

        assert_eq!(tokens[0].arguments(), &[1.0, 2.0]);
        assert_eq!(tokens[1].arguments(), &[3.0, 4.0]);
    }

    #[test]
    fn command_metadata() {
        assert_eq!(CommandKind::from_letter('Z'), Some(CommandKind::ClosePath));
        assert_eq!(CommandKind::from_letter('q'), None);
        assert!(CommandKind::RelativeCubicCurveTo.is_relative());
        assert!(!CommandKind::VerticalLineTo.is_relative());
        assert_eq!(CommandKind::RelativeLineTo.letter(), 'l');
    }
}
