use super::{FormatError, FormatPart, FormatValidator, ParsedFormat};
use crate::prelude::*;
use regex::{Captures, Regex};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(\d+\$)?([-#+ 0,(<]*)?(\d+)?(\.\d+)?([tT])?([a-zA-Z%])")
        .expect("printf pattern must compile")
});

const FLAGS: &str = "-#+ 0,(<";
const CONVERSIONS: &str = "bBhHsScCdoxXeEfgGaA%n";
const DATE_TIME_CONVERSIONS: &str = "HIklMSLNpzZsQBbhAaCYyjmdeRTrDFc";

///
/// ArgIndex
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgIndex {
    /// Next sequential argument.
    Ordinary,
    /// `n$`, 1-based.
    Explicit(u32),
    /// `<` flag: reuse the previous argument.
    Previous,
}

///
/// PrintfPart
/// `%[index$][flags][width][.precision][t]conversion`
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrintfPart {
    pub index: ArgIndex,
    pub flags: String,
    pub width: Option<u32>,
    pub precision: Option<u32>,
    pub date_time: bool,
    pub conversion: char,
}

impl PrintfPart {
    /// Consumes no argument.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        !self.date_time && matches!(self.conversion, '%' | 'n')
    }

    /// Conversion identity used to compare translations; case only selects upper-casing.
    #[must_use]
    pub const fn conversion_key(&self) -> (bool, char) {
        (self.date_time, self.conversion.to_ascii_lowercase())
    }

    pub(super) fn reconstruct(&self, out: &mut String) {
        out.push('%');
        if let ArgIndex::Explicit(index) = self.index {
            out.push_str(&format!("{index}$"));
        }
        out.push_str(&self.flags);
        if let Some(width) = self.width {
            out.push_str(&width.to_string());
        }
        if let Some(precision) = self.precision {
            out.push_str(&format!(".{precision}"));
        }
        if self.date_time {
            out.push('t');
        }
        out.push(self.conversion);
    }

    fn from_captures(format: &str, caps: &Captures<'_>) -> Result<Self, FormatError> {
        let group = |i: usize| caps.get(i).map(|m| m.as_str());
        let number = |s: &str| {
            s.parse::<u32>().map_err(|_| FormatError::UnknownConversion {
                format: format.to_string(),
                conversion: caps[0].to_string(),
            })
        };

        // flags
        let flags = group(2).unwrap_or_default().to_string();
        let mut seen = BTreeSet::new();
        for flag in flags.chars() {
            debug_assert!(FLAGS.contains(flag));
            if !seen.insert(flag) {
                return Err(FormatError::DuplicateFlag {
                    format: format.to_string(),
                    flag,
                });
            }
        }

        // index
        let index = if flags.contains('<') {
            ArgIndex::Previous
        } else if let Some(explicit) = group(1) {
            ArgIndex::Explicit(number(explicit.trim_end_matches('$'))?)
        } else {
            ArgIndex::Ordinary
        };

        let width = group(3).map(number).transpose()?;
        let precision = group(4)
            .map(|p| number(p.trim_start_matches('.')))
            .transpose()?;
        let date_time = group(5).is_some();
        let conversion = group(6).and_then(|c| c.chars().next()).unwrap_or('%');

        let known = if date_time {
            DATE_TIME_CONVERSIONS.contains(conversion)
        } else {
            CONVERSIONS.contains(conversion)
        };
        if !known {
            return Err(FormatError::UnknownConversion {
                format: format.to_string(),
                conversion: caps[0].to_string(),
            });
        }

        Ok(Self {
            index,
            flags,
            width,
            precision,
            date_time,
            conversion,
        })
    }
}

///
/// PrintfValidator
///

pub struct PrintfValidator;

impl PrintfValidator {
    fn check_literal(format: &str, text: &str) -> Result<(), FormatError> {
        if text.contains('%') {
            return Err(FormatError::StrayPercent {
                format: format.to_string(),
                text: text.to_string(),
            });
        }

        Ok(())
    }

    // Explicit indices count once each; ordinary parts take the next sequential slot.
    fn argument_count(parts: &[FormatPart]) -> usize {
        let mut counted = BTreeSet::new();
        let mut next = 1;

        for part in parts {
            let FormatPart::Printf(part) = part else {
                continue;
            };
            if part.is_constant() {
                continue;
            }
            match part.index {
                ArgIndex::Explicit(index) => {
                    counted.insert(index);
                }
                ArgIndex::Ordinary => {
                    counted.insert(next);
                    next += 1;
                }
                ArgIndex::Previous => {}
            }
        }

        counted.len()
    }

    /// Argument-consuming parts ordered by argument position, constants last.
    fn sorted_keys(parts: &[FormatPart]) -> Vec<(bool, char)> {
        let mut by_index = BTreeMap::new();
        let mut constants = Vec::new();
        let mut next = 0;

        for part in parts {
            let FormatPart::Printf(part) = part else {
                continue;
            };
            if part.is_constant() {
                constants.push(part.conversion_key());
                continue;
            }
            let index = match part.index {
                ArgIndex::Explicit(index) => index,
                ArgIndex::Ordinary => {
                    next += 1;
                    next
                }
                ArgIndex::Previous => continue,
            };
            by_index.entry(index).or_insert_with(|| part.conversion_key());
        }

        constants.sort_unstable();
        by_index.into_values().chain(constants).collect()
    }
}

impl FormatValidator for PrintfValidator {
    fn kind(&self) -> FormatKind {
        FormatKind::Printf
    }

    fn parse(&self, format: &str) -> Result<ParsedFormat, FormatError> {
        let mut parts = Vec::new();
        let mut cursor = 0;

        for caps in PATTERN.captures_iter(format) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > cursor {
                let text = &format[cursor..whole.start()];
                Self::check_literal(format, text)?;
                parts.push(FormatPart::Literal(text.to_string()));
            }
            parts.push(FormatPart::Printf(PrintfPart::from_captures(format, &caps)?));
            cursor = whole.end();
        }

        if cursor < format.len() {
            let text = &format[cursor..];
            Self::check_literal(format, text)?;
            parts.push(FormatPart::Literal(text.to_string()));
        }

        Ok(ParsedFormat {
            kind: FormatKind::Printf,
            format: format.to_string(),
            argument_count: Self::argument_count(&parts),
            parts,
        })
    }

    fn parse_translation(
        &self,
        primary: &ParsedFormat,
        translation: &str,
    ) -> Result<ParsedFormat, FormatError> {
        let parsed = self.validate(translation)?;

        if Self::sorted_keys(&primary.parts) != Self::sorted_keys(&parsed.parts) {
            return Err(FormatError::TranslationMismatch {
                format: primary.format.clone(),
                translation: translation.to_string(),
            });
        }

        Ok(parsed)
    }
}
