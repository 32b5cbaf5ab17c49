//! Translation file discovery.

use crate::Error;
use msgtools_build::translate::{Properties, TranslationFile, translation_locale};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Properties files in `dir` named `<simple_name>.i18n_<locale>.properties`, sorted by locale.
///
/// A missing directory yields no translations.
pub fn discover(dir: &Path, simple_name: &str) -> Result<Vec<TranslationFile>, Error> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(Vec::new());
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        let Some(locale) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| translation_locale(simple_name, n))
        else {
            continue;
        };

        let text = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
        let properties = Properties::parse(&text)?;
        tracing::debug!(
            target: "msgtools",
            stage = "translate",
            interface = simple_name,
            %locale,
            keys = properties.len(),
        );

        files.push(TranslationFile { locale, properties });
    }

    files.sort_by(|a, b| a.locale.cmp(&b.locale));

    Ok(files)
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: PathBuf::from(path),
        source,
    }
}
