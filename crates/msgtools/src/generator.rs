use crate::{Error, translations, writer::SourceWriter};
use msgtools_build::{RenderOptions, render::rust_ident, translate::skeleton};
use msgtools_config::MsgtoolsConfig;
use msgtools_schema::{
    prelude::*,
    registry::IdRegistry,
    resolve::{ResolvedInterface, resolve},
    validate::Validator,
};
use std::path::{Path, PathBuf};

///
/// GenerateOptions
///

#[derive(Clone, Debug, Default)]
pub struct GenerateOptions {
    pub render: RenderOptions,

    /// Root searched for translation files, mirrored by module path; none disables lookup.
    pub translation_dir: Option<PathBuf>,
    pub skip_translations: bool,

    /// Also write `<Interface>.i18n_<locale>.properties` listing every key.
    pub skeleton_locale: Option<String>,
}

impl GenerateOptions {
    #[must_use]
    pub fn from_config(config: &MsgtoolsConfig) -> Self {
        let generator = &config.generator;

        Self {
            render: RenderOptions {
                runtime_crate: generator.runtime_crate.clone(),
                header: generator.generated_header,
            },
            translation_dir: generator.translation_files_path.clone(),
            skip_translations: generator.skip_translations,
            skeleton_locale: generator.skeleton_locale.clone(),
        }
    }
}

///
/// Generated
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Generated {
    pub interface: String,
    pub path: PathBuf,
    pub translations: usize,
}

///
/// Report
/// outcome of one run; diagnostics of every interface, skipped ones included
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Report {
    pub generated: Vec<Generated>,
    pub skipped: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl Report {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

///
/// Generator
/// one run; every interface shares the id registry
///

#[derive(Clone, Debug)]
pub struct Generator {
    options: GenerateOptions,
    registry: IdRegistry,
}

impl Generator {
    #[must_use]
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            registry: IdRegistry::new(),
        }
    }

    /// Share ids with other runs, e.g. `IdRegistry::global()`.
    #[must_use]
    pub fn with_registry(mut self, registry: IdRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Resolve, validate and generate every annotated interface.
    ///
    /// Interfaces with ERROR diagnostics are skipped; the run continues with the next one.
    pub fn run(
        &self,
        source: &dyn DeclarationSource,
        writer: &mut dyn SourceWriter,
    ) -> Result<Report, Error> {
        let index = MethodIndex::new(source);
        let catalog = TypeCatalog::new(source);
        let validator = Validator::new(&catalog, self.registry.clone());
        let mut report = Report::default();

        for iface in source.interfaces() {
            let mut errs = Diagnostics::new();
            let generated = self.interface(iface, &index, &catalog, &validator, writer, &mut errs)?;

            match generated {
                Some(generated) => report.generated.push(generated),
                None => {
                    tracing::warn!(
                        target: "msgtools",
                        interface = %iface.path,
                        errors = errs.error_count(),
                        "skipped generation"
                    );
                    report.skipped.push(iface.path.clone());
                }
            }
            report.diagnostics.merge(errs);
        }

        tracing::info!(
            target: "msgtools",
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            errors = report.diagnostics.error_count(),
            warnings = report.diagnostics.warning_count(),
            "generation finished"
        );

        Ok(report)
    }

    fn interface(
        &self,
        iface: &InterfaceDescriptor,
        index: &MethodIndex<'_>,
        catalog: &TypeCatalog<'_>,
        validator: &Validator<'_>,
        writer: &mut dyn SourceWriter,
        errs: &mut Diagnostics,
    ) -> Result<Option<Generated>, Error> {
        let Some(resolved) = resolve(index, &iface.path, errs) else {
            return Ok(None);
        };
        tracing::debug!(
            target: "msgtools",
            stage = "resolve",
            interface = %iface.path,
            methods = resolved.methods.len(),
        );

        validator.validate(&resolved, errs);
        if errs.has_errors() {
            return Ok(None);
        }

        let translations = self.translations(iface)?;
        let code = msgtools_build::generate(
            &resolved,
            catalog,
            &translations,
            &self.options.render,
            errs,
        )?;

        let dir = module_dir(iface.module_path());
        let path = dir.join(format!("{}.rs", rust_ident(&iface.impl_name())));
        writer.write(&path, &code)?;

        if let Some(locale) = &self.options.skeleton_locale {
            self.write_skeleton(&resolved, &dir, locale, writer)?;
        }

        tracing::info!(
            target: "msgtools",
            stage = "synthesize",
            interface = %iface.path,
            path = %path.display(),
            translations = translations.len(),
        );

        Ok(Some(Generated {
            interface: iface.path.clone(),
            path,
            translations: translations.len(),
        }))
    }

    fn translations(
        &self,
        iface: &InterfaceDescriptor,
    ) -> Result<Vec<msgtools_build::TranslationFile>, Error> {
        match &self.options.translation_dir {
            Some(root) if !self.options.skip_translations => {
                translations::discover(&root.join(module_dir(iface.module_path())), iface.ident())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn write_skeleton(
        &self,
        resolved: &ResolvedInterface,
        dir: &Path,
        locale: &str,
        writer: &mut dyn SourceWriter,
    ) -> Result<(), Error> {
        let name = format!("{}.i18n_{locale}.properties", resolved.descriptor.ident());
        writer.write(&dir.join(name), &skeleton(resolved))?;

        Ok(())
    }
}

/// `a::b` → `a/b`
fn module_dir(module: &str) -> PathBuf {
    module.split("::").filter(|s| !s.is_empty()).collect()
}
