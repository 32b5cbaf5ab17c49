//! ## Crate layout
//! - `schema`: declaration model, diagnostics, format checks, resolution and validation.
//! - `build`: synthetic class construction, translation merge and Rust rendering.
//! - `frontend`: reflection of annotated traits from Rust sources.
//! - `config`: `msgtools.toml`.
//!
//! `generate_dir` runs the whole pipeline over a source directory; `Generator`
//! runs it over any `DeclarationSource`.

pub use msgtools_build as build;
pub use msgtools_config as config;
pub use msgtools_frontend as frontend;
pub use msgtools_schema as schema;

pub mod expr;
pub mod generator;
pub mod translations;
pub mod writer;

pub use generator::{GenerateOptions, Generated, Generator, Report};
pub use writer::{FileWriter, MemoryWriter, SourceWriter, WriteError};

use msgtools_build::{TranslationError, translate::Properties};
use msgtools_config::{ConfigError, MsgtoolsConfig};
use msgtools_frontend::FrontendError;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, GenerateOptions, Generator, Report,
        writer::{FileWriter, MemoryWriter, SourceWriter},
    };
    pub use msgtools_config::MsgtoolsConfig;
    pub use msgtools_schema::prelude::*;
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] msgtools_build::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Frontend(#[from] FrontendError),

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

// generate_dir
/// Scan `src_dir`, substitute expressions, then generate every interface into `writer`.
///
/// Translation files are looked up below `src_dir` unless the config names another root.
pub fn generate_dir(
    config: &MsgtoolsConfig,
    src_dir: &Path,
    writer: &mut dyn SourceWriter,
) -> Result<Report, Error> {
    let mut source = msgtools_frontend::load_dir(src_dir)?;

    if let Some(path) = &config.generator.expression_properties {
        let properties = load_properties(path)?;
        expr::substitute(&mut source, &properties);
    }

    let mut options = GenerateOptions::from_config(config);
    if options.translation_dir.is_none() {
        options.translation_dir = Some(src_dir.to_path_buf());
    }

    Generator::new(options).run(&source, writer)
}

fn load_properties(path: &Path) -> Result<Properties, Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Properties::parse(&text)?)
}
