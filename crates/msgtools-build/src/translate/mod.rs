//! Translation merge: locale subclasses over the already-resolved method set.

mod locale;
mod properties;
mod skeleton;

pub use locale::LocaleTag;
pub use properties::Properties;
pub use skeleton::skeleton;

use crate::prelude::*;
use msgtools_schema::{
    format,
    resolve::{ResolvedInterface, ResolvedMethod},
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// File name suffix of a translation file.
pub const TRANSLATION_FILE_PATTERN: &str = r"\.i18n_([a-z]*(?:_[A-Z]*){0,2})\.properties";

/// Locale of a translation file name for the interface `simple_name`, if it is one.
#[must_use]
pub fn translation_locale(simple_name: &str, file_name: &str) -> Option<LocaleTag> {
    let pattern = format!("^{}{TRANSLATION_FILE_PATTERN}$", regex::escape(simple_name));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(file_name)?;

    LocaleTag::parse(caps.get(1)?.as_str())
}

///
/// TranslationFile
///

#[derive(Clone, Debug)]
pub struct TranslationFile {
    pub locale: LocaleTag,
    pub properties: Properties,
}

///
/// Translator
///

pub struct Translator<'a> {
    primary: &'a ClassDef,
    resolved: &'a ResolvedInterface,
}

impl<'a> Translator<'a> {
    #[must_use]
    pub const fn new(primary: &'a ClassDef, resolved: &'a ResolvedInterface) -> Self {
        Self { primary, resolved }
    }

    /// One class per locale in every file's chain; enclosing locales without a file
    /// are generated empty so the chain stays unbroken.
    #[must_use]
    pub fn translate(&self, files: &[TranslationFile], errs: &mut Diagnostics) -> Vec<ClassDef> {
        let mut translations: BTreeMap<LocaleTag, BTreeMap<String, String>> = BTreeMap::new();
        let mut locales = BTreeSet::new();

        for file in files {
            let valid = self.validate_file(file, errs);
            translations.entry(file.locale.clone()).or_default().extend(valid);
            locales.extend(file.locale.chain());
        }

        // parents before children
        let mut ordered: Vec<LocaleTag> = locales.into_iter().collect();
        ordered.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));

        ordered
            .iter()
            .map(|locale| {
                let empty = BTreeMap::new();
                let messages = translations.get(locale).unwrap_or(&empty);
                let class = self.class_for(locale, messages);

                tracing::debug!(
                    target: "msgtools",
                    stage = "translate",
                    interface = %self.primary.interface,
                    locale = %locale,
                    translated = messages.len(),
                );

                class
            })
            .collect()
    }

    fn class_for(&self, locale: &LocaleTag, messages: &BTreeMap<String, String>) -> ClassDef {
        let parent = locale
            .enclosing()
            .map_or_else(|| self.primary.name.clone(), |p| self.class_name(&p));

        let accessors = self
            .primary
            .accessors
            .iter()
            .map(|accessor| AccessorDef {
                body: messages
                    .get(&accessor.name)
                    .map_or(AccessorBody::Inherited, |text| {
                        AccessorBody::Literal(text.clone())
                    }),
                ..accessor.clone()
            })
            .collect();

        ClassDef {
            name: self.class_name(locale),
            locale: locale.to_string(),
            parent: Some(parent),
            accessors,
            guards: Vec::new(),
            ..self.primary.clone()
        }
    }

    #[must_use]
    pub fn class_name(&self, locale: &LocaleTag) -> String {
        format!("{}_{locale}", self.primary.name)
    }

    // accessor name -> translated text, for the entries that survive validation
    fn validate_file(&self, file: &TranslationFile, errs: &mut Diagnostics) -> BTreeMap<String, String> {
        let mut valid = BTreeMap::new();
        let mut matched = BTreeSet::new();

        for m in &self.resolved.methods {
            let key = m.translation_key();
            let Some(text) = file.properties.get(&key) else {
                continue;
            };
            matched.insert(key.clone());

            if valid.contains_key(&m.accessor_name()) {
                continue;
            }
            if let Some(text) = self.validate_entry(m, &key, text, &file.locale, errs) {
                valid.insert(m.accessor_name(), text);
            }
        }

        for key in file.properties.keys().filter(|k| !matched.contains(*k)) {
            warning!(
                errs,
                self.resolved.descriptor.origin(),
                "The translation message with key {key} has no corresponding method (locale {}).",
                file.locale
            );
        }

        valid
    }

    fn validate_entry(
        &self,
        m: &ResolvedMethod,
        key: &str,
        text: &str,
        locale: &LocaleTag,
        errs: &mut Diagnostics,
    ) -> Option<String> {
        let origin = m.origin();
        let message = m.message.as_ref()?;

        if text.trim().is_empty() {
            warning!(
                errs,
                origin,
                "The translation message with key {key} is ignored because value is empty or contains only whitespace"
            );
            return None;
        }

        let validator = format::validator(message.format);
        let checked = validator
            .validate(&message.text)
            .and_then(|primary| {
                validator
                    .parse_translation(&primary, text)
                    .map(|parsed| (primary, parsed))
            });

        match checked {
            Err(e) => {
                warning!(errs, origin, "{e} Resource bundle locale: {locale}");
                None
            }
            Ok((primary, parsed)) if primary.argument_count != parsed.argument_count => {
                warning!(
                    errs,
                    origin,
                    "The parameter count for the format ({}) and the number of format parameters ({}) do not match.",
                    parsed.argument_count,
                    primary.argument_count
                );
                None
            }
            Ok(_) => Some(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::ImplBuilder;
    use msgtools_schema::resolve::resolve;

    fn schema() -> Schema {
        Schema::new().with_interface(
            InterfaceDescriptor::new("app::AppLogger", InterfaceKind::Logger)
                .with_project_code("EX")
                .with_method(
                    MethodDecl::new("hello")
                        .with_message(100, "hello, %s")
                        .with_level(Level::Info)
                        .with_param(Parameter::format("name", TypeRef::string())),
                )
                .with_method(
                    MethodDecl::new("bye")
                        .with_message(101, "bye")
                        .with_level(Level::Info),
                ),
        )
    }

    fn run(files: &[(&str, &str)]) -> (Vec<ClassDef>, Diagnostics) {
        let schema = schema();
        let index = MethodIndex::new(&schema);
        let catalog = TypeCatalog::new(&schema);
        let mut errs = Diagnostics::new();
        let resolved = resolve(&index, "app::AppLogger", &mut errs).unwrap();
        let primary = ImplBuilder::new(&resolved, &catalog).build().unwrap();

        let files: Vec<TranslationFile> = files
            .iter()
            .map(|(locale, text)| TranslationFile {
                locale: LocaleTag::parse(locale).unwrap(),
                properties: Properties::parse(text).unwrap(),
            })
            .collect();

        let classes = Translator::new(&primary, &resolved).translate(&files, &mut errs);
        (classes, errs)
    }

    #[test]
    fn file_names_select_locales() {
        let tag = translation_locale("AppLogger", "AppLogger.i18n_de_DE.properties").unwrap();
        assert_eq!(tag.to_string(), "de_DE");
        assert!(translation_locale("AppLogger", "Other.i18n_de.properties").is_none());
        assert!(translation_locale("AppLogger", "AppLogger.i18n_de.txt").is_none());
    }

    #[test]
    fn missing_enclosing_locale_is_generated_empty() {
        let (classes, errs) = run(&[("de_DE", "hello=Hallo, %s\n")]);
        assert_eq!(errs.warning_count(), 0, "{errs}");

        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["AppLogger$logger_de", "AppLogger$logger_de_DE"]);

        let de = &classes[0];
        assert_eq!(de.parent.as_deref(), Some("AppLogger$logger"));
        assert!(de.accessors.iter().all(|a| a.body == AccessorBody::Inherited));

        let de_de = &classes[1];
        assert_eq!(de_de.parent.as_deref(), Some("AppLogger$logger_de"));
        assert_eq!(
            de_de.accessor("hello$str").and_then(AccessorDef::literal).as_deref(),
            Some("EX000100: Hallo, %s")
        );
        assert_eq!(
            de_de.accessor("bye$str").map(|a| &a.body),
            Some(&AccessorBody::Inherited)
        );
    }

    #[test]
    fn invalid_entries_are_dropped_with_warnings() {
        let (classes, errs) = run(&[(
            "fr",
            "hello=bonjour %s et %s\nbye=   \nunknown=?\n",
        )]);

        assert_eq!(errs.error_count(), 0);
        assert_eq!(errs.warning_count(), 3, "{errs}");
        assert!(classes[0].accessors.iter().all(|a| a.body == AccessorBody::Inherited));
    }
}
