//! Go declaration front end (Logos lexer + recursive-descent parser).
//!
//! - The lexer uses Logos and implements Go semicolon insertion.
//! - The parser builds an arena AST of package, imports, type declarations
//!   and function headers; bodies are skipped.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
mod parser_support;

// Re-exports for convenience
pub use error::{Diag, LineIndex, ParseFailure, Span};
pub use lexer::{Keyword, Lexer, Tok, is_ident_continue, is_ident_start, is_keyword};
pub use parser::{ParsedFile, parse_package_clause, parse_source};
