pub mod class;
pub mod render;
pub mod synth;
pub mod translate;

pub use render::{RenderOptions, render};
pub use synth::ImplBuilder;
pub use translate::{TranslationFile, Translator};

use msgtools_schema::{
    error::Origin,
    node::TypeCatalog,
    resolve::ResolvedInterface,
};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::class::*;
    pub use msgtools_schema::prelude::*;
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    RenderError(#[from] RenderError),

    #[error(transparent)]
    SynthError(#[from] SynthError),

    #[error(transparent)]
    TranslationError(#[from] TranslationError),
}

///
/// SynthError
///

#[derive(Debug, ThisError)]
pub enum SynthError {
    #[error("{origin}: {message}")]
    InvalidTransform { origin: Origin, message: String },
}

///
/// TranslationError
///

#[derive(Debug, ThisError)]
pub enum TranslationError {
    #[error("invalid escape '{escape}' on line {line}")]
    InvalidEscape { line: usize, escape: String },

    #[error("'{name}' is not a translation file name")]
    InvalidFileName { name: String },
}

///
/// RenderError
///

#[derive(Debug, ThisError)]
pub enum RenderError {
    #[error("invalid path '{path}': {source}")]
    InvalidPath { path: String, source: syn::Error },

    #[error("invalid type '{ty}': {source}")]
    InvalidType { ty: String, source: syn::Error },
}

// generate
/// Synthesize the primary class and every translation class, then render them into one source file.
pub fn generate(
    resolved: &ResolvedInterface,
    catalog: &TypeCatalog<'_>,
    translations: &[TranslationFile],
    options: &RenderOptions,
    errs: &mut msgtools_schema::error::Diagnostics,
) -> Result<String, Error> {
    let primary = ImplBuilder::new(resolved, catalog).build()?;
    let localized = Translator::new(&primary, resolved).translate(translations, errs);

    let mut source = render(&primary, options)?;
    for class in &localized {
        source.push('\n');
        source.push_str(&render(class, options)?);
    }

    Ok(source)
}
