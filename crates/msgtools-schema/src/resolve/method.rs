use crate::prelude::*;

/// Suffix of generated message accessors.
pub const ACCESSOR_SUFFIX: &str = "$str";

///
/// FamilyKey
/// (simple name, format-parameter-count)
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct FamilyKey {
    pub name: String,
    pub count: usize,
}

impl FamilyKey {
    #[must_use]
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }

    #[must_use]
    pub fn of(decl: &MethodDecl) -> Self {
        Self::new(decl.name.clone(), decl.format_param_count())
    }
}

///
/// ResolvedMethod
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedMethod {
    /// Interface that declares the method.
    pub interface: String,
    pub decl: MethodDecl,
    pub format_param_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Family whose owner declared `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_key: Option<FamilyKey>,

    pub inherits_message: bool,
    pub overloaded: bool,
}

impl ResolvedMethod {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    #[must_use]
    pub fn key(&self) -> FamilyKey {
        FamilyKey::new(self.decl.name.clone(), self.format_param_count)
    }

    #[must_use]
    pub const fn is_logging(&self) -> bool {
        self.decl.is_logging()
    }

    #[must_use]
    pub fn has_id(&self) -> bool {
        self.message.as_ref().is_some_and(Message::has_id)
    }

    /// True when the message was taken from a same-named family with another count.
    #[must_use]
    pub fn borrows_message(&self) -> bool {
        self.message_key
            .as_ref()
            .is_some_and(|key| key.count != self.format_param_count)
    }

    // Overloaded names are disambiguated by the owning family's count.
    fn message_count(&self) -> usize {
        self.message_key
            .as_ref()
            .map_or(self.format_param_count, |key| key.count)
    }

    /// Private accessor holding the message literal, shared across a family.
    #[must_use]
    pub fn accessor_name(&self) -> String {
        if self.overloaded {
            format!("{}{}{ACCESSOR_SUFFIX}", self.decl.name, self.message_count())
        } else {
            format!("{}{ACCESSOR_SUFFIX}", self.decl.name)
        }
    }

    /// Key looked up in locale properties files.
    #[must_use]
    pub fn translation_key(&self) -> String {
        if self.overloaded {
            format!("{}.{}", self.decl.name, self.message_count())
        } else {
            self.decl.name.clone()
        }
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin::method(self.interface.clone(), self.decl.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(name: &str, count: usize, overloaded: bool) -> ResolvedMethod {
        ResolvedMethod {
            interface: "app::Log".to_string(),
            decl: MethodDecl::new(name),
            format_param_count: count,
            message: None,
            message_key: None,
            inherits_message: false,
            overloaded,
        }
    }

    #[test]
    fn accessor_and_key_carry_count_only_when_overloaded() {
        let plain = resolved("started", 2, false);
        assert_eq!(plain.accessor_name(), "started$str");
        assert_eq!(plain.translation_key(), "started");

        let overloaded = resolved("started", 2, true);
        assert_eq!(overloaded.accessor_name(), "started2$str");
        assert_eq!(overloaded.translation_key(), "started.2");
    }

    #[test]
    fn borrowed_messages_use_the_owner_family_name() {
        let mut method = resolved("greet", 1, true);
        method.message_key = Some(FamilyKey::new("greet", 0));

        assert!(method.borrows_message());
        assert_eq!(method.accessor_name(), "greet0$str");
        assert_eq!(method.translation_key(), "greet.0");
    }
}
