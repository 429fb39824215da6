use crate::error::{Diag, LexError, LexErrorKind};
use logos::{Lexer as LogosLexer, Logos};
use std::fmt;
use std::ops::Range;

// =============================================================================
// 0. Shared helpers
// =============================================================================

#[inline(always)]
const fn first_newline_offset(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'\n' | b'\r') {
            return Some(i);
        }
        i += 1;
    }

    None
}

#[inline(always)]
const fn is_dec_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline(always)]
const fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

// =============================================================================
// 1. Block comment scanner
// =============================================================================

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    use memchr::memchr;

    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;

        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }

        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

// =============================================================================
// 2. Numbers: maximal munch in the callback, classification in the wrapper
// =============================================================================

/// Literal class of a scanned number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    Int,
    Float,
    Imag,
}

mod num {
    use super::*;

    /// Logos callback: extend the number token to maximal munch.
    ///
    /// Scanning is permissive (`0b2`, `09` stay one token); `classify_number`
    /// decides validity afterwards.
    #[inline]
    pub fn lex_number(lex: &mut LogosLexer<'_, super::RawTok>) -> Result<(), LexErrorKind> {
        let src = lex.source().as_bytes();
        let start = lex.span().start;
        let n = src.len();

        let mut i = start;
        let is_hex = src[i] == b'0' && matches!(src.get(i + 1), Some(b'x' | b'X'));
        if is_hex {
            i += 2;
        }

        while i < n {
            let b = src[i];
            if b.is_ascii_alphanumeric() || b == b'_' {
                i += 1;
            } else if b == b'.' {
                // don't steal ".." / "..."
                if src.get(i + 1) == Some(&b'.') {
                    break;
                }
                i += 1;
            } else if matches!(b, b'+' | b'-') && i > start {
                let prev = src[i - 1] | 0x20;
                let exp_marker = if is_hex { prev == b'p' } else { prev == b'e' };
                if !exp_marker {
                    break;
                }
                i += 1;
            } else {
                break;
            }
        }

        let already = lex.span().end;
        if i > already {
            lex.bump(i - already);
        }
        Ok(())
    }

    fn digits_ok(body: &[u8], digit: fn(u8) -> bool) -> bool {
        !body.is_empty()
            && body.iter().any(|&b| digit(b))
            && body.iter().all(|&b| digit(b) || b == b'_')
    }

    fn exponent_ok(exp: &[u8]) -> bool {
        let digits = match exp.first() {
            Some(b'+' | b'-') => &exp[1..],
            _ => exp,
        };
        digits_ok(digits, is_dec_digit)
    }

    /// Validates a Go numeric literal and reports its class.
    pub fn classify_number(lit: &[u8]) -> Result<NumKind, LexErrorKind> {
        let (lit, imag) = match lit.split_last() {
            Some((b'i', rest)) => (rest, true),
            _ => (lit, false),
        };
        if lit.is_empty() {
            return Err(LexErrorKind::InvalidNumber);
        }

        let prefix = if lit.len() > 1 && lit[0] == b'0' {
            lit[1] | 0x20
        } else {
            0
        };

        let is_float = match prefix {
            b'x' => {
                let body = &lit[2..];
                match body.iter().position(|&b| b | 0x20 == b'p') {
                    Some(p) => {
                        let mantissa = &body[..p];
                        let (int_part, frac) = match mantissa.iter().position(|&b| b == b'.') {
                            Some(d) => (&mantissa[..d], &mantissa[d + 1..]),
                            None => (mantissa, &[][..]),
                        };
                        let any_digits = int_part.iter().chain(frac).any(|&b| is_hex_digit(b));
                        let all_ok = int_part
                            .iter()
                            .chain(frac)
                            .all(|&b| is_hex_digit(b) || b == b'_');
                        if !any_digits || !all_ok || !exponent_ok(&body[p + 1..]) {
                            return Err(LexErrorKind::InvalidNumber);
                        }
                        true
                    }
                    None if digits_ok(body, is_hex_digit) => false,
                    None => return Err(LexErrorKind::InvalidNumber),
                }
            }
            b'b' if digits_ok(&lit[2..], |b| matches!(b, b'0' | b'1')) => false,
            b'o' if digits_ok(&lit[2..], |b| matches!(b, b'0'..=b'7')) => false,
            b'b' | b'o' => return Err(LexErrorKind::InvalidNumber),
            _ => {
                let (mantissa, exp) = match lit.iter().position(|&b| b | 0x20 == b'e') {
                    Some(e) => (&lit[..e], Some(&lit[e + 1..])),
                    None => (lit, None),
                };
                let (int_part, frac) = match mantissa.iter().position(|&b| b == b'.') {
                    Some(d) => (&mantissa[..d], Some(&mantissa[d + 1..])),
                    None => (mantissa, None),
                };
                let int_ok = int_part.is_empty() || digits_ok(int_part, is_dec_digit);
                let frac_ok = frac.is_none_or(|f| f.is_empty() || digits_ok(f, is_dec_digit));
                let has_digits = !int_part.is_empty() || frac.is_some_and(|f| !f.is_empty());
                if !int_ok || !frac_ok || !has_digits || !exp.is_none_or(exponent_ok) {
                    return Err(LexErrorKind::InvalidNumber);
                }
                let float = frac.is_some() || exp.is_some();
                // Legacy octal: 0777 (but 09.5 is a valid float).
                if !float && int_part.len() > 1 && int_part[0] == b'0' && !imag {
                    let octal = int_part.iter().all(|&b| matches!(b, b'0'..=b'7' | b'_'));
                    if !octal {
                        return Err(LexErrorKind::InvalidNumber);
                    }
                }
                float
            }
        };

        Ok(match (imag, is_float) {
            (true, _) => NumKind::Imag,
            (false, true) => NumKind::Float,
            (false, false) => NumKind::Int,
        })
    }
}

pub use num::classify_number;

// =============================================================================
// 3. Raw token definition (logos)
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)] _LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Identifiers and keywords (keywords are split off in the wrapper)
    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    // Numbers (maximal munch in callback)
    #[regex(r"[0-9]|\.[0-9]", num::lex_number)] Number,

    // Strings / runes
    #[regex(r"`[^`]*`")] RawString,
    #[regex(r#""([^"\\\n\r]|\\.)*""#)] String,
    #[regex(r"'([^'\\\n\r]|\\.)+'")] Rune,

    // Punctuation the declaration parser looks at
    #[token("...")] Ellipsis,
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,
    #[token("*")] Star,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("~")] Tilde,
    #[token("|")] Pipe,

    // Everything else only has to be skipped over
    #[regex(r"\+\+|--")] IncDec,
    #[regex(r"<<=|>>=|&\^=|[-+*/%&|^]=|<<|>>|&\^|&&|\|\||==|!=|<=|>=|:=|[-+/%&^!<>]")] Op,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

impl RawTok {
    #[inline]
    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        match self {
            Self::Ident => match Keyword::lookup(slice) {
                Some(kw) => Tok::Keyword(kw),
                None => Tok::Ident(slice),
            },
            Self::Rune => Tok::RuneLit(slice),
            Self::String => Tok::StringLit(slice),
            Self::RawString => Tok::RawStringLit(slice),
            Self::Ellipsis => Tok::Ellipsis,
            Self::LParen => Tok::LParen,
            Self::RParen => Tok::RParen,
            Self::LBrack => Tok::LBrack,
            Self::RBrack => Tok::RBrack,
            Self::LBrace => Tok::LBrace,
            Self::RBrace => Tok::RBrace,
            Self::Comma => Tok::Comma,
            Self::Semi => Tok::Semi,
            Self::Colon => Tok::Colon,
            Self::Dot => Tok::Dot,
            Self::Star => Tok::Star,
            Self::Arrow => Tok::Arrow,
            Self::Assign => Tok::Assign,
            Self::Tilde => Tok::Tilde,
            Self::Pipe => Tok::Pipe,
            Self::IncDec | Self::Op => Tok::Op(slice),
            // Numbers and trivia are handled by the wrapper before we get here.
            Self::Number
            | Self::Bom
            | Self::Newline
            | Self::_LineComment
            | Self::BlockComment
            | Self::Error => Tok::Error,
        }
    }
}

// =============================================================================
// 4. Keywords
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Keyword {
    #[rustfmt::skip]
    pub fn lookup(word: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match word {
            "break" => Break, "case" => Case, "chan" => Chan, "const" => Const,
            "continue" => Continue, "default" => Default, "defer" => Defer,
            "else" => Else, "fallthrough" => Fallthrough, "for" => For,
            "func" => Func, "go" => Go, "goto" => Goto, "if" => If,
            "import" => Import, "interface" => Interface, "map" => Map,
            "package" => Package, "range" => Range, "return" => Return,
            "select" => Select, "struct" => Struct, "switch" => Switch,
            "type" => Type, "var" => Var,
            _ => return None,
        })
    }

    #[rustfmt::skip]
    pub const fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            Break => "break", Case => "case", Chan => "chan", Const => "const",
            Continue => "continue", Default => "default", Defer => "defer",
            Else => "else", Fallthrough => "fallthrough", For => "for",
            Func => "func", Go => "go", Goto => "goto", If => "if",
            Import => "import", Interface => "interface", Map => "map",
            Package => "package", Range => "range", Return => "return",
            Select => "select", Struct => "struct", Switch => "switch",
            Type => "type", Var => "var",
        }
    }

    /// A newline after these keywords terminates the statement.
    #[inline]
    const fn ends_statement(self) -> bool {
        matches!(
            self,
            Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
        )
    }
}

/// True if `word` is one of Go's 25 reserved keywords.
#[inline]
pub fn is_keyword(word: &str) -> bool {
    Keyword::lookup(word).is_some()
}

/// True if `c` can begin an identifier: `_` or a Unicode letter.
pub fn is_ident_start(c: char) -> bool {
    lexes_as_ident(c.encode_utf8(&mut [0u8; 4]))
}

/// True if `c` can follow the first character of an identifier. Only
/// decimal digits (`Nd`) are added to the start set.
pub fn is_ident_continue(c: char) -> bool {
    lexes_as_ident(&format!("_{c}"))
}

fn lexes_as_ident(word: &str) -> bool {
    let mut lex = RawTok::lexer(word);
    matches!(lex.next(), Some(Ok(RawTok::Ident))) && lex.span().end == word.len()
}

// =============================================================================
// 5. Public token definition (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'src> {
    Ident(&'src str),
    Keyword(Keyword),
    IntLit(&'src str),
    FloatLit(&'src str),
    ImagLit(&'src str),
    RuneLit(&'src str),
    StringLit(&'src str),
    RawStringLit(&'src str),

    Ellipsis,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,
    Star,
    Arrow,
    Assign,
    Tilde,
    Pipe,

    /// Any other operator; the declaration parser never inspects these.
    Op(&'src str),

    Error,
}

impl Tok<'_> {
    #[inline]
    const fn can_insert_semicolon(&self) -> bool {
        match self {
            Tok::Ident(_)
            | Tok::IntLit(_)
            | Tok::FloatLit(_)
            | Tok::ImagLit(_)
            | Tok::RuneLit(_)
            | Tok::StringLit(_)
            | Tok::RawStringLit(_)
            | Tok::RParen
            | Tok::RBrack
            | Tok::RBrace => true,
            Tok::Keyword(kw) => kw.ends_statement(),
            Tok::Op(op) => matches!(op.as_bytes(), b"++" | b"--"),
            _ => false,
        }
    }
}

impl fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Ident(s) => write!(f, "name {s}"),
            Tok::Keyword(kw) => write!(f, "keyword {}", kw.as_str()),
            Tok::IntLit(s)
            | Tok::FloatLit(s)
            | Tok::ImagLit(s)
            | Tok::RuneLit(s)
            | Tok::StringLit(s)
            | Tok::RawStringLit(s) => write!(f, "literal {s}"),
            Tok::Op(s) => f.write_str(s),
            Tok::Error => f.write_str("invalid token"),
            punct => f.write_str(match punct {
                Tok::Ellipsis => "...",
                Tok::LParen => "(",
                Tok::RParen => ")",
                Tok::LBrack => "[",
                Tok::RBrack => "]",
                Tok::LBrace => "{",
                Tok::RBrace => "}",
                Tok::Comma => ",",
                Tok::Semi => ";",
                Tok::Colon => ":",
                Tok::Dot => ".",
                Tok::Star => "*",
                Tok::Arrow => "<-",
                Tok::Assign => "=",
                Tok::Tilde => "~",
                _ => "|",
            }),
        }
    }
}

// =============================================================================
// 6. Lexer wrapper: semicolon insertion + imag/number classification + diags
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let sp = crate::error::Span::from_range(span);
        self.diags.push(LexError { kind, span: sp }.diag());
    }

    #[inline]
    fn emit_semi_at(&mut self, pos: usize) {
        self.pending = Some((pos, Tok::Semi, pos));
    }

    /// Returns true if `raw` was trivia (and possibly queued a `;`).
    #[inline]
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>, slice: &str) -> bool {
        match raw {
            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    self.emit_semi_at(span.start);
                }
                true
            }
            RawTok::BlockComment => {
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        self.emit_semi_at(span.start + off);
                    }
                }
                true
            }
            _ => false,
        }
    }

    #[inline]
    fn handle_eof(&mut self) {
        self.eof_done = true;

        if self.last_can_insert_semi {
            self.last_can_insert_semi = false;
            self.emit_semi_at(self.src_len);
        }
    }

    #[inline]
    fn error_token(&mut self, kind: LexErrorKind, span: Range<usize>) -> (usize, Tok<'src>, usize) {
        self.push_lex_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }

    fn handle_raw_token(&mut self, raw: RawTok) -> Option<(usize, Tok<'src>, usize)> {
        let span = self.logos.span();
        let slice = self.logos.slice();

        if raw == RawTok::Bom {
            // Only valid as the very first character.
            return if span.start == 0 {
                None
            } else {
                Some(self.error_token(LexErrorKind::InvalidToken, span))
            };
        }

        if self.handle_trivia(raw, &span, slice) {
            return None;
        }

        let tok = match raw {
            RawTok::Error => {
                let kind = match slice.as_bytes().first() {
                    Some(b'"' | b'`') => LexErrorKind::UnterminatedString,
                    _ => LexErrorKind::InvalidToken,
                };
                return Some(self.error_token(kind, span));
            }
            RawTok::Number => match classify_number(slice.as_bytes()) {
                Ok(NumKind::Int) => Tok::IntLit(slice),
                Ok(NumKind::Float) => Tok::FloatLit(slice),
                Ok(NumKind::Imag) => Tok::ImagLit(slice),
                Err(kind) => return Some(self.error_token(kind, span)),
            },
            other => other.to_token(slice),
        };

        self.last_can_insert_semi = tok.can_insert_semicolon();
        Some((span.start, tok, span.end))
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            match self.logos.next() {
                // Don't return yet: a pending ';' may still need to go out.
                None => self.handle_eof(),
                Some(Err(kind)) => {
                    let span = self.logos.span();
                    let kind = match (kind, self.logos.slice().as_bytes().first()) {
                        (LexErrorKind::InvalidToken, Some(b'"' | b'`')) => {
                            LexErrorKind::UnterminatedString
                        }
                        (kind, _) => kind,
                    };
                    return Some(self.error_token(kind, span));
                }
                Some(Ok(raw)) => {
                    if let Some(item) = self.handle_raw_token(raw) {
                        return Some(item);
                    }
                }
            }
        }
    }
}
