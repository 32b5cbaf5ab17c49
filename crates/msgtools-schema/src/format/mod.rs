//! Message format dialect validators.

mod indexed;
mod printf;

pub use indexed::{IndexedPart, IndexedValidator};
pub use printf::{ArgIndex, PrintfPart, PrintfValidator};

use crate::prelude::*;
use thiserror::Error as ThisError;

///
/// FormatError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FormatError {
    #[error("duplicate flag '{flag}' in format '{format}'")]
    DuplicateFlag { format: String, flag: char },

    #[error("invalid placeholder '{placeholder}' in format '{format}'")]
    InvalidIndex { format: String, placeholder: String },

    #[error("format '{format}' is missing an ending bracket")]
    MissingBracket { format: String },

    #[error("Formats don't match. Original: '{original}' Reconstructed: '{reconstructed}'")]
    Mismatch {
        original: String,
        reconstructed: String,
    },

    #[error("format '{format}' contains an invalid format specifier in '{text}'")]
    StrayPercent { format: String, text: String },

    #[error(
        "The translated message format ({translation}) does not match the initial message format ({format})."
    )]
    TranslationMismatch { format: String, translation: String },

    #[error("unknown conversion '{conversion}' in format '{format}'")]
    UnknownConversion { format: String, conversion: String },
}

///
/// FormatPart
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormatPart {
    Literal(String),
    Printf(PrintfPart),
    Indexed(IndexedPart),
}

impl FormatPart {
    /// Write the part back in its source form.
    fn reconstruct(&self, out: &mut String) {
        match self {
            Self::Literal(text) => out.push_str(text),
            Self::Printf(part) => part.reconstruct(out),
            Self::Indexed(part) => part.reconstruct(out),
        }
    }
}

///
/// ParsedFormat
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedFormat {
    pub kind: FormatKind,
    pub format: String,
    pub parts: Vec<FormatPart>,
    pub argument_count: usize,
}

impl ParsedFormat {
    #[must_use]
    pub fn reconstruct(&self) -> String {
        let mut out = String::with_capacity(self.format.len());
        for part in &self.parts {
            part.reconstruct(&mut out);
        }

        out
    }

    /// Text with every sequential printf specifier given an explicit `n$` index.
    #[must_use]
    pub fn with_explicit_indexes(&self) -> String {
        let mut out = String::with_capacity(self.format.len() + self.argument_count * 2);
        let mut next = 0;

        for part in &self.parts {
            match part {
                FormatPart::Printf(printf)
                    if printf.index == ArgIndex::Ordinary && !printf.is_constant() =>
                {
                    next += 1;
                    let mut indexed = printf.clone();
                    indexed.index = ArgIndex::Explicit(next);
                    indexed.reconstruct(&mut out);
                }
                other => other.reconstruct(&mut out),
            }
        }

        out
    }

    // Parsing must round-trip; anything else is a parser defect, never a silent pass.
    fn verify_round_trip(self) -> Result<Self, FormatError> {
        let reconstructed = self.reconstruct();
        if reconstructed.eq_ignore_ascii_case(&self.format) {
            Ok(self)
        } else {
            Err(FormatError::Mismatch {
                original: self.format,
                reconstructed,
            })
        }
    }
}

///
/// FormatValidator
///

pub trait FormatValidator: Sync {
    fn kind(&self) -> FormatKind;

    /// Parse into ordered parts and compute the required argument count.
    fn parse(&self, format: &str) -> Result<ParsedFormat, FormatError>;

    /// Validate a translation against the primary format it replaces.
    fn parse_translation(
        &self,
        primary: &ParsedFormat,
        translation: &str,
    ) -> Result<ParsedFormat, FormatError> {
        let _ = primary;
        self.parse(translation)
    }

    /// Parse and confirm that the parts reconstruct the original text.
    fn validate(&self, format: &str) -> Result<ParsedFormat, FormatError> {
        self.parse(format)?.verify_round_trip()
    }
}

///
/// NoFormatValidator
///

pub struct NoFormatValidator;

impl FormatValidator for NoFormatValidator {
    fn kind(&self) -> FormatKind {
        FormatKind::None
    }

    fn parse(&self, format: &str) -> Result<ParsedFormat, FormatError> {
        Ok(ParsedFormat {
            kind: FormatKind::None,
            format: format.to_string(),
            parts: vec![FormatPart::Literal(format.to_string())],
            argument_count: 0,
        })
    }
}

/// Validator for a dialect.
#[must_use]
pub fn validator(kind: FormatKind) -> &'static dyn FormatValidator {
    match kind {
        FormatKind::Indexed => &IndexedValidator,
        FormatKind::None => &NoFormatValidator,
        FormatKind::Printf => &PrintfValidator,
    }
}

/// Validate a message text under its dialect.
pub fn validate(kind: FormatKind, format: &str) -> Result<ParsedFormat, FormatError> {
    validator(kind).validate(format)
}
