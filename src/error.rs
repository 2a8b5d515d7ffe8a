use thiserror::Error;

use crate::lexer::CommandKind;

pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while scanning a path-data string.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LexErrorKind {
    /// A character that is neither whitespace nor a supported command letter.
    #[error("unrecognized character '{0}'")]
    UnexpectedCharacter(char),
    /// A command argument did not start with a readable number.
    #[error("expected a number")]
    InvalidNumber,
}

/// Fatal failure while tokenizing a path-data string. `position` is the byte
/// offset of the offending input.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind} at offset {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: usize,
}

impl LexError {
    pub fn unexpected_character(ch: char, position: usize) -> Self {
        Self {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            position,
        }
    }

    pub fn invalid_number(position: usize) -> Self {
        Self {
            kind: LexErrorKind::InvalidNumber,
            position,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum TranslationError {
    #[error("command '{}' takes {expected} arguments but the token carries {found}", .kind.letter())]
    ArityMismatch {
        kind: CommandKind,
        expected: usize,
        found: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("no gradient has been defined with id '{id}'")]
pub struct UnknownGradientError {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    UnknownGradient(#[from] UnknownGradientError),

    #[cfg(feature = "svg")]
    #[error("malformed document: {0}")]
    Document(#[from] quick_xml::Error),

    #[cfg(feature = "cairo")]
    #[error("drawing backend failed: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    #[cfg(feature = "cairo")]
    #[error("image encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

#[cfg(feature = "cairo")]
impl From<cairo::Error> for Error {
    fn from(err: cairo::Error) -> Self {
        Error::Backend(Box::new(err))
    }
}

#[cfg(feature = "cairo")]
impl From<cairo::BorrowError> for Error {
    fn from(err: cairo::BorrowError) -> Self {
        Error::Backend(Box::new(err))
    }
}
