//! Canonical layout for generated Go text.
//!
//! The text is first checked with the Go front end, then re-indented with
//! tabs by bracket depth. Raw strings and block comments that span lines
//! are left untouched.

use std::ops::Range;

use gogetset_parser::{Lexer, Tok, parse_source};
use memchr::memmem;
use thiserror::Error;

use crate::error::Error;

/// Generated text that is not valid Go. Carries the text as generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormatError {
    pub message: String,
    pub text: String,
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::OutputFormat {
            message: err.message,
            text: err.text,
        }
    }
}

pub fn format_source(text: &str) -> Result<String, FormatError> {
    if let Err(failure) = parse_source(text) {
        let message = failure
            .diags
            .iter()
            .map(|diag| {
                let (line, col) = failure.lines.line_col(diag.span.start);
                format!("{line}:{col}: {}", diag.message)
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Err(FormatError {
            message,
            text: text.to_owned(),
        });
    }

    let toks: Vec<(usize, Tok<'_>, usize)> = Lexer::new(text)
        .filter(|&(start, tok, end)| !(tok == Tok::Semi && start == end))
        .collect();
    let verbatim = multi_line_ranges(text, &toks);

    let mut lines: Vec<Line<'_>> = Vec::new();
    let mut depth = 0usize;
    let mut cursor = 0usize;
    let mut line_start = 0usize;
    for raw in text.split_inclusive('\n') {
        let line_end = line_start + raw.len();
        let body = raw.strip_suffix('\n').unwrap_or(raw);

        // Brackets opened or closed before this line.
        while let Some(&(start, tok, _)) = toks.get(cursor) {
            if start >= line_start {
                break;
            }
            depth = bracket_delta(depth, tok);
            cursor += 1;
        }

        if verbatim.iter().any(|r| r.start < line_start && line_start < r.end) {
            lines.push(Line::Verbatim(body));
        } else {
            let content = body.trim();
            if content.is_empty() {
                lines.push(Line::Blank);
            } else {
                let closes = toks
                    .get(cursor)
                    .is_some_and(|&(start, tok, _)| start < line_end && is_closer(tok));
                let indent = if closes { depth.saturating_sub(1) } else { depth };
                lines.push(Line::Code(indent, content));
            }
        }
        line_start = line_end;
    }

    Ok(layout(&lines))
}

enum Line<'a> {
    Blank,
    Code(usize, &'a str),
    Verbatim(&'a str),
}

fn layout(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    let mut pending_blank = false;
    for line in lines {
        match line {
            Line::Blank => {
                pending_blank = !out.is_empty();
                continue;
            }
            Line::Code(indent, content) => {
                if pending_blank {
                    out.push('\n');
                }
                out.extend(std::iter::repeat_n('\t', *indent));
                out.push_str(content);
            }
            Line::Verbatim(content) => {
                if pending_blank {
                    out.push('\n');
                }
                out.push_str(content);
            }
        }
        out.push('\n');
        pending_blank = false;
    }
    out
}

fn bracket_delta(depth: usize, tok: Tok<'_>) -> usize {
    match tok {
        Tok::LParen | Tok::LBrack | Tok::LBrace => depth + 1,
        Tok::RParen | Tok::RBrack | Tok::RBrace => depth.saturating_sub(1),
        _ => depth,
    }
}

fn is_closer(tok: Tok<'_>) -> bool {
    matches!(tok, Tok::RParen | Tok::RBrack | Tok::RBrace)
}

/// Byte ranges of raw strings and block comments that contain a newline.
fn multi_line_ranges(text: &str, toks: &[(usize, Tok<'_>, usize)]) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut prev_end = 0usize;
    for &(start, tok, end) in toks {
        block_comments_in(text, prev_end..start, &mut out);
        if let Tok::RawStringLit(raw) = tok {
            if raw.contains('\n') {
                out.push(start..end);
            }
        }
        prev_end = end;
    }
    block_comments_in(text, prev_end..text.len(), &mut out);
    out
}

/// Scans the text between two tokens, which holds only space and comments.
fn block_comments_in(text: &str, gap: Range<usize>, out: &mut Vec<Range<usize>>) {
    let bytes = text.as_bytes();
    let mut i = gap.start;
    while i + 1 < gap.end {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'/') => match memchr::memchr(b'\n', &bytes[i..gap.end]) {
                Some(off) => i += off + 1,
                None => return,
            },
            (b'/', b'*') => {
                let close = memmem::find(&bytes[i + 2..gap.end], b"*/")
                    .map_or(gap.end, |off| i + 2 + off + 2);
                if memchr::memchr(b'\n', &bytes[i..close]).is_some() {
                    out.push(i..close);
                }
                i = close;
            }
            _ => i += 1,
        }
    }
}
