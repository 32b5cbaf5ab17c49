//! Rust-source front end: discovers annotated traits and reflects the types they return.

pub mod attr;
pub mod collect;
pub mod shape;
pub mod source;

pub use collect::Collector;
pub use source::SourceSet;

use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{FrontendError, collect::Collector, source::SourceSet};
    pub use msgtools_schema::prelude::*;
}

///
/// FrontendError
///

#[derive(Debug, ThisError)]
pub enum FrontendError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse '{}': {source}", path.display())]
    Parse { path: PathBuf, source: syn::Error },

    #[error("invalid attribute on '{item}': {source}")]
    Attribute {
        item: String,
        source: darling::Error,
    },
}

/// Module path of a source file relative to the crate's `src` directory.
///
/// `lib.rs`, `main.rs` and `mod.rs` name their parent directory's module.
#[must_use]
pub fn module_path_for(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(stem) = relative.file_stem().map(|s| s.to_string_lossy())
        && !matches!(stem.as_ref(), "lib" | "main" | "mod")
    {
        segments.push(stem.into_owned());
    }

    segments.join("::")
}

/// Parse one in-memory source as module `module`.
pub fn parse_source(module: &str, source: &str) -> Result<SourceSet, FrontendError> {
    let mut collector = Collector::new();
    collect_str(&mut collector, module, source, Path::new(module))?;

    SourceSet::from_collector(collector)
}

/// Scan every `.rs` file below `src_dir`.
pub fn load_dir(src_dir: &Path) -> Result<SourceSet, FrontendError> {
    let mut files = Vec::new();
    walk(src_dir, &mut files)?;
    files.sort();

    let mut collector = Collector::new();
    for path in &files {
        let relative = path.strip_prefix(src_dir).unwrap_or(path);
        let source = fs::read_to_string(path).map_err(|source| FrontendError::Io {
            path: path.clone(),
            source,
        })?;
        collect_str(&mut collector, &module_path_for(relative), &source, path)?;
    }

    tracing::info!(
        target: "msgtools",
        stage = "discover",
        dir = %src_dir.display(),
        files = files.len(),
        "scanned sources"
    );

    SourceSet::from_collector(collector)
}

fn collect_str(
    collector: &mut Collector,
    module: &str,
    source: &str,
    path: &Path,
) -> Result<(), FrontendError> {
    let file = syn::parse_file(source).map_err(|source| FrontendError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    collector.file(module, &file);

    Ok(())
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), FrontendError> {
    let io = |source| FrontendError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().is_some_and(|e| e == "rs") {
            files.push(path);
        }
    }

    Ok(())
}
