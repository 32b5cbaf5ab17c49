pub mod error;
pub mod format;
pub mod node;
pub mod registry;
pub mod resolve;
pub mod types;
pub mod validate;

use crate::{error::Diagnostics, format::FormatError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::{Diagnostic, Diagnostics, Origin, Severity},
        node::*,
        types::*,
        warning,
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Diagnostics(#[from] Diagnostics),

    #[error(transparent)]
    FormatError(#[from] FormatError),
}
