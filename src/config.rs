//! Run configuration, built once from the command line.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Suffix appended to the source file stem to name the generated file.
pub const OUTPUT_SUFFIX: &str = "_getter_setter";

/// Explicit `name=path` imports given on the command line.
///
/// These take precedence over the source file's own imports. The name `.`
/// adds a dot import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOverrides {
    named: Vec<(String, String)>,
    dots: Vec<String>,
}

impl ImportOverrides {
    /// Parses a comma-separated list such as `a=x/y,.=z`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut overrides = Self::default();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let invalid = || Error::InvalidOverride {
                pair: pair.to_owned(),
            };
            let (name, path) = pair.split_once('=').ok_or_else(invalid)?;
            let (name, path) = (name.trim(), path.trim());
            if name.is_empty() || path.is_empty() {
                return Err(invalid());
            }

            if name == "." {
                if !overrides.dots.iter().any(|p| p == path) {
                    overrides.dots.push(path.to_owned());
                }
            } else {
                overrides.named.push((name.to_owned(), path.to_owned()));
            }
        }
        Ok(overrides)
    }

    /// Named overrides in command-line order (duplicates preserved).
    pub fn named(&self) -> &[(String, String)] {
        &self.named
    }

    pub fn dots(&self) -> &[String] {
        &self.dots
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.dots.is_empty()
    }
}

impl FromStr for ImportOverrides {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Where the generated text goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// `<stem>_getter_setter.<ext>` next to the source.
    #[default]
    Default,
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: PathBuf,
    pub imports: ImportOverrides,
    pub output: OutputTarget,
}

impl Config {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            imports: ImportOverrides::default(),
            output: OutputTarget::Default,
        }
    }

    #[must_use]
    pub fn with_imports(mut self, imports: ImportOverrides) -> Self {
        self.imports = imports;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Destination file, or `None` when writing to stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.output {
            OutputTarget::Default => Some(default_output_path(&self.source)),
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Stdout => None,
        }
    }
}

/// `dir/point.go` becomes `dir/point_getter_setter.go`.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{OUTPUT_SUFFIX}");
    if let Some(ext) = source.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    source.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_split_named_and_dot_pairs() {
        let o = ImportOverrides::parse("yaml=gopkg.in/yaml.v2, .=example.com/dsl,.=example.com/dsl")
            .expect("valid overrides");
        assert_eq!(
            o.named(),
            &[("yaml".to_owned(), "gopkg.in/yaml.v2".to_owned())]
        );
        assert_eq!(o.dots(), &["example.com/dsl".to_owned()]);
        assert!(ImportOverrides::parse("").expect("empty is fine").is_empty());
    }

    #[test]
    fn malformed_override_is_rejected() {
        for bad in ["noequals", "=path", "name="] {
            match ImportOverrides::parse(bad) {
                Err(Error::InvalidOverride { pair }) => assert_eq!(pair, bad),
                other => panic!("{bad}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn output_path_keeps_extension() {
        let cfg = Config::new("geo/point.go");
        assert_eq!(
            cfg.output_path(),
            Some(PathBuf::from("geo/point_getter_setter.go"))
        );
        let cfg = cfg.with_output(OutputTarget::Stdout);
        assert_eq!(cfg.output_path(), None);
        assert_eq!(
            default_output_path(Path::new("Makefile")),
            PathBuf::from("Makefile_getter_setter")
        );
    }
}
