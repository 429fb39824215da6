use crate::ast::{self, Span};

/// One comma-separated entry of a parameter list before grouping.
///
/// `typ == None` means the entry was a lone identifier whose role (name or
/// type) depends on what follows it.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: Vec<ast::IdentName>,
    pub ellipsis_pos: Option<Span>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

/// Groups `a, b int, c string` into fields.
///
/// Lone identifiers pending at the end of the list were types all along
/// (`func(int, string)`), so they become unnamed fields.
pub fn resolve_param_list(arena: &mut ast::AstArena, params: Vec<ParamDecl>) -> Vec<ast::FieldId> {
    let mut out = Vec::new();
    let mut pending_names: Vec<ast::IdentName> = Vec::new();
    let mut pending_start: Option<u32> = None;

    for param in params {
        if let Some(typ) = param.typ {
            let mut names = std::mem::take(&mut pending_names);
            names.extend(param.names);

            let names_ref = if names.is_empty() {
                ast::ListRef::EMPTY
            } else {
                arena.list_ident_names(names)
            };
            let start = pending_start.take().unwrap_or(param.span.start);
            let span = Span {
                start,
                end: param.span.end,
            };
            let field = ast::Field {
                names: names_ref,
                ellipsis_pos: param.ellipsis_pos,
                typ,
                tag: None,
                is_embed: false,
            };
            out.push(arena.fields.alloc(field, span));
        } else {
            if pending_names.is_empty() {
                pending_start = Some(param.span.start);
            }
            pending_names.extend(param.names);
        }
    }

    for name in pending_names {
        let typ = named_type_from_ident(arena, name);
        let field = ast::Field {
            names: ast::ListRef::EMPTY,
            ellipsis_pos: None,
            typ,
            tag: None,
            is_embed: false,
        };
        out.push(arena.fields.alloc(field, name.pos));
    }

    out
}

fn named_type_from_ident(arena: &mut ast::AstArena, name: ast::IdentName) -> ast::TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name: name.sym,
            name_pos: name.pos,
            args: ast::ListRef::EMPTY,
        },
        name.pos,
    )
}

/// Decodes the body of a Go string literal (quotes included in `raw`).
///
/// Raw strings drop carriage returns; interpreted strings handle the usual
/// single-character escapes plus `\xNN`, `\uNNNN` and `\UNNNNNNNN`. Octal and
/// unknown escapes are kept verbatim since import paths never contain them.
pub fn unquote(raw: &str) -> String {
    let body = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
    if raw.starts_with('`') {
        return body.replace('\r', "");
    }
    if !body.contains('\\') {
        return body.to_owned();
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        let simple = match esc {
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0B}'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            _ => None,
        };
        if let Some(ch) = simple {
            out.push(ch);
            continue;
        }
        let width = match esc {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => 0,
        };
        let digits: String = chars.clone().take(width).collect();
        let decoded = (width > 0 && digits.len() == width)
            .then(|| u32::from_str_radix(&digits, 16).ok())
            .flatten()
            .and_then(char::from_u32);
        match decoded {
            Some(ch) => {
                out.push(ch);
                for _ in 0..width {
                    chars.next();
                }
            }
            None => {
                out.push('\\');
                out.push(esc);
            }
        }
    }
    out
}
