use super::{FormatError, FormatPart, FormatValidator, ParsedFormat};
use crate::prelude::*;
use regex::Regex;
use std::{collections::BTreeSet, sync::LazyLock};

static PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\}|\{.+?\}").expect("indexed pattern must compile"));

///
/// IndexedPart
/// `{}` or `{index[,type[,style]]}`
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexedPart {
    pub index: u32,
    /// Everything after the index, including the leading comma.
    pub rest: String,
    /// Written as `{}`; stands for index 0.
    pub bare: bool,
}

impl IndexedPart {
    pub(super) fn reconstruct(&self, out: &mut String) {
        if self.bare {
            out.push_str("{}");
        } else {
            out.push_str(&format!("{{{}{}}}", self.index, self.rest));
        }
    }

    fn parse(format: &str, placeholder: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::InvalidIndex {
            format: format.to_string(),
            placeholder: placeholder.to_string(),
        };

        let inner = &placeholder[1..placeholder.len() - 1];
        if inner.is_empty() {
            return Ok(Self {
                index: 0,
                rest: String::new(),
                bare: true,
            });
        }
        if inner.contains(['{', '}']) {
            return Err(invalid());
        }

        let (index, rest) = match inner.find(',') {
            Some(comma) => inner.split_at(comma),
            None => (inner, ""),
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(Self {
            index: index.parse().map_err(|_| invalid())?,
            rest: rest.to_string(),
            bare: false,
        })
    }
}

///
/// IndexedValidator
///

pub struct IndexedValidator;

impl IndexedValidator {
    fn check_literal(format: &str, text: &str) -> Result<(), FormatError> {
        if text.contains(['{', '}']) {
            return Err(FormatError::MissingBracket {
                format: format.to_string(),
            });
        }

        Ok(())
    }
}

impl FormatValidator for IndexedValidator {
    fn kind(&self) -> FormatKind {
        FormatKind::Indexed
    }

    fn parse(&self, format: &str) -> Result<ParsedFormat, FormatError> {
        let mut parts = Vec::new();
        let mut indices = BTreeSet::new();
        let mut cursor = 0;

        for found in PATTERN.find_iter(format) {
            if found.start() > cursor {
                let text = &format[cursor..found.start()];
                Self::check_literal(format, text)?;
                parts.push(FormatPart::Literal(text.to_string()));
            }

            let part = IndexedPart::parse(format, found.as_str())?;
            indices.insert(part.index);
            parts.push(FormatPart::Indexed(part));
            cursor = found.end();
        }

        if cursor < format.len() {
            let text = &format[cursor..];
            Self::check_literal(format, text)?;
            parts.push(FormatPart::Literal(text.to_string()));
        }

        Ok(ParsedFormat {
            kind: FormatKind::Indexed,
            format: format.to_string(),
            parts,
            argument_count: indices.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_indices() {
        let parsed = IndexedValidator.validate("{0} copied {1} to {0}").unwrap();
        assert_eq!(parsed.argument_count, 2);

        let parsed = IndexedValidator
            .validate("total {0,number,#.##} on {1,date}")
            .unwrap();
        assert_eq!(parsed.argument_count, 2);
        assert_eq!(parsed.reconstruct(), "total {0,number,#.##} on {1,date}");
    }

    #[test]
    fn rejects_malformed_placeholders() {
        let err = IndexedValidator.validate("value {0").expect_err("unterminated");
        assert!(err.to_string().contains("missing an ending bracket"), "{err}");

        let err = IndexedValidator.validate("value {name}").expect_err("non-numeric");
        assert!(matches!(err, FormatError::InvalidIndex { .. }));
    }

    #[test]
    fn bare_placeholder_is_index_zero() {
        let parsed = IndexedValidator.validate("value {}").unwrap();
        assert_eq!(parsed.argument_count, 1);
        assert_eq!(parsed.reconstruct(), "value {}");
        assert!(matches!(
            &parsed.parts[1],
            FormatPart::Indexed(IndexedPart { index: 0, bare: true, .. })
        ));

        let parsed = IndexedValidator.validate("{} and {0}").unwrap();
        assert_eq!(parsed.argument_count, 1);
        assert_eq!(parsed.reconstruct(), "{} and {0}");
    }
}
