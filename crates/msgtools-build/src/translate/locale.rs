use crate::prelude::*;
use regex::Regex;
use std::{fmt, sync::LazyLock};

static SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]*)(?:_([A-Z]*))?(?:_([A-Z]*))?$").expect("locale suffix pattern")
});

///
/// LocaleTag
/// `lang[_COUNTRY[_VARIANT]]` as used in translation file names
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct LocaleTag {
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl LocaleTag {
    /// Parse a file name suffix such as `de_DE_POSIX`.
    #[must_use]
    pub fn parse(suffix: &str) -> Option<Self> {
        let caps = SUFFIX.captures(suffix)?;
        let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Some(Self {
            language: part(1).unwrap_or_default(),
            country: part(2),
            variant: part(3),
        })
    }

    /// Number of suffix segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + usize::from(self.country.is_some()) + usize::from(self.variant.is_some())
    }

    /// Tag with the last segment removed.
    #[must_use]
    pub fn enclosing(&self) -> Option<Self> {
        if self.variant.is_some() {
            Some(Self {
                variant: None,
                ..self.clone()
            })
        } else if self.country.is_some() {
            Some(Self {
                country: None,
                ..self.clone()
            })
        } else {
            None
        }
    }

    /// Tags from the most general to this one, e.g. `de`, `de_DE`, `de_DE_POSIX`.
    #[must_use]
    pub fn chain(&self) -> Vec<Self> {
        let mut chain = vec![self.clone()];
        while let Some(enclosing) = chain.last().and_then(Self::enclosing) {
            chain.push(enclosing);
        }
        chain.reverse();

        chain
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(country) = &self.country {
            write!(f, "_{country}")?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "_{variant}")?;
        }

        Ok(())
    }
}
