//! Error type shared by every stage of the pipeline.

use std::fmt;
use std::path::PathBuf;

use gogetset_parser::{LineIndex, ParseFailure, Span};
use thiserror::Error;

/// Source position rendered as `file:line:column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(file: &str, lines: &LineIndex, span: Span) -> Self {
        let (line, col) = lines.line_col(span.start);
        Self {
            file: file.to_owned(),
            line,
            col,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The source file could not be read.
    #[error("failed reading source file {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file is not valid Go; one entry per diagnostic.
    #[error("failed parsing source file:\n{}", diags.join("\n"))]
    Syntax { diags: Vec<String> },

    /// A type expression this tool cannot model.
    #[error("{pos}: {message}")]
    UnsupportedTypeShape { pos: Pos, message: String },

    /// A qualified type whose package prefix has no import.
    #[error("{pos}: unknown package \"{name}\"")]
    UnresolvedPackage { pos: Pos, name: String },

    /// Two imports bound to the same local name.
    #[error("imported package collision: \"{name}\" imported twice ({first}, {second})")]
    AmbiguousImport {
        name: String,
        first: String,
        second: String,
    },

    /// Generated text failed to reformat; carries the raw text.
    #[error("failed to format generated source: {message}\n{text}")]
    OutputFormat { message: String, text: String },

    /// A malformed `name=path` import override.
    #[error("invalid import override \"{pair}\": expected name=path")]
    InvalidOverride { pair: String },

    #[error("failed to serialize model: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the generated file failed.
    #[error("failed writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn syntax(file: &str, failure: &ParseFailure) -> Self {
        let diags = failure
            .diags
            .iter()
            .map(|diag| format!("{}: {}", Pos::new(file, &failure.lines, diag.span), diag.message))
            .collect();
        Self::Syntax { diags }
    }

    pub(crate) fn unsupported(pos: Pos, message: impl Into<String>) -> Self {
        Self::UnsupportedTypeShape {
            pos,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_render_file_line_column() {
        let lines = LineIndex::new("package p\ntype T struct{}\n");
        let pos = Pos::new("t.go", &lines, Span::new(15, 16));
        assert_eq!(pos.to_string(), "t.go:2:6");

        let err = Error::UnresolvedPackage {
            pos,
            name: "otherpkg".into(),
        };
        assert_eq!(err.to_string(), "t.go:2:6: unknown package \"otherpkg\"");
    }

    #[test]
    fn syntax_error_lists_every_diagnostic() {
        let failure = match gogetset_parser::parse_source("package p\nvar a = 0b2\nvar b = 1e\n") {
            Ok(_) => panic!("expected failure"),
            Err(failure) => failure,
        };
        let err = Error::syntax("bad.go", &failure);
        let Error::Syntax { diags } = &err else {
            panic!("wrong variant");
        };
        assert_eq!(
            diags,
            &[
                "bad.go:2:9: invalid numeric literal".to_owned(),
                "bad.go:3:9: invalid numeric literal".to_owned(),
            ]
        );
    }
}
