//! Getter and setter generation for Go struct types.
//!
//! The pipeline is: parse one Go file ([`builder`]), resolve its imports
//! ([`resolve`], [`locate`]), build a [`model::FileModel`], then emit and
//! format accessor methods ([`generate`], [`format`]).

pub mod builder;
pub mod config;
pub mod error;
pub mod format;
pub mod generate;
pub mod locate;
pub mod model;
pub mod resolve;

use std::fs;
use std::path::PathBuf;

use tracing::info;

pub use builder::ModelBuilder;
pub use config::{Config, ImportOverrides, OutputTarget};
pub use error::{Error, Result};
pub use generate::Generator;
pub use locate::{GoModuleLookup, PackageLookup, StaticLookup};
pub use model::{FieldModel, FileModel, StructModel, TypeExpr};

/// Builds the model for `config.source`.
pub fn build_model(config: &Config, lookup: &dyn PackageLookup) -> Result<FileModel> {
    ModelBuilder::new(lookup, &config.imports).build(&config.source)
}

/// Runs the whole pipeline and returns the formatted output text.
pub fn generate_file(config: &Config, lookup: &dyn PackageLookup) -> Result<String> {
    let model = build_model(config, lookup)?;
    let source_name = config
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.source.display().to_string());
    Generator::new(source_name).render(&model)
}

/// Writes `text` where `config` says. Returns the file written, if any.
pub fn write_output(config: &Config, text: &str) -> Result<Option<PathBuf>> {
    let Some(path) = config.output_path() else {
        print!("{text}");
        return Ok(None);
    };
    fs::write(&path, text).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "wrote output");
    Ok(Some(path))
}
