//! Recursive-descent parser for Go declarations.
//!
//! Everything that shapes a type is parsed into the AST. Function bodies,
//! `var`/`const` initialisers and generic parameter lists are skipped by
//! bracket balancing and only their spans are kept.

use crate::ast::*;
use crate::error::{Diag, LineIndex, ParseFailure};
use crate::lexer::{Keyword, Lexer, Tok};
use crate::parser_support::{self, ParamDecl, unquote};

type Spanned<'src> = (usize, Tok<'src>, usize);
type PResult<T> = Result<T, Diag>;

/// A successfully parsed file together with everything needed to read it.
#[derive(Debug)]
pub struct ParsedFile {
    pub arena: AstArena,
    pub interner: Interner,
    pub file: SourceFile,
    pub lines: LineIndex,
}

impl ParsedFile {
    #[inline]
    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn package_name(&self) -> &str {
        self.name(self.file.name)
    }

    pub fn imports(&self) -> &[ImportSpec] {
        self.arena.imports_list(self.file.imports)
    }

    pub fn decls(&self) -> &[TopLevelDecl] {
        self.arena.top_decls(self.file.decls)
    }
}

/// Parses one Go source file.
///
/// Lexical errors are all reported together; parsing stops at the first
/// syntax error.
pub fn parse_source(src: &str) -> Result<ParsedFile, ParseFailure> {
    let lines = LineIndex::new(src);
    let mut lexer = Lexer::new(src);
    let toks: Vec<Spanned<'_>> = lexer.by_ref().collect();
    let diags = lexer.take_diags();
    if !diags.is_empty() {
        return Err(ParseFailure { diags, lines });
    }

    let mut parser = Parser::new(src, toks);
    match parser.source_file() {
        Ok(file) => Ok(ParsedFile {
            arena: parser.arena,
            interner: parser.interner,
            file,
            lines,
        }),
        Err(diag) => Err(ParseFailure {
            diags: vec![diag],
            lines,
        }),
    }
}

/// Reads only the leading `package` clause.
pub fn parse_package_clause(src: &str) -> Option<String> {
    let mut toks = Lexer::new(src).map(|(_, tok, _)| tok);
    match (toks.next()?, toks.next()?) {
        (Tok::Keyword(Keyword::Package), Tok::Ident(name)) if name != "_" => Some(name.to_owned()),
        _ => None,
    }
}

struct Parser<'src> {
    src_len: usize,
    toks: Vec<Spanned<'src>>,
    pos: usize,
    arena: AstArena,
    interner: Interner,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str, toks: Vec<Spanned<'src>>) -> Self {
        Self {
            src_len: src.len(),
            toks,
            pos: 0,
            arena: AstArena::new(),
            interner: Interner::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Token cursor
    // -------------------------------------------------------------------------

    #[inline]
    fn peek(&self) -> Option<Tok<'src>> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<Tok<'src>> {
        self.toks.get(self.pos + n).map(|&(_, tok, _)| tok)
    }

    #[inline]
    fn at(&self, tok: Tok<'_>) -> bool {
        self.peek() == Some(tok)
    }

    fn cur_span(&self) -> Span {
        match self.toks.get(self.pos) {
            Some(&(start, _, end)) => Span::new(start, end),
            None => Span::empty_at(self.src_len),
        }
    }

    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.toks.get(i)) {
            Some(&(start, _, end)) => Span::new(start, end),
            None => Span::empty_at(0),
        }
    }

    fn bump(&mut self) -> Span {
        let span = self.cur_span();
        if self.pos < self.toks.len() {
            self.pos += 1;
        }
        span
    }

    fn eat(&mut self, tok: Tok<'_>) -> Option<Span> {
        self.at(tok).then(|| self.bump())
    }

    fn found(&self) -> String {
        match self.toks.get(self.pos) {
            None => "EOF".to_owned(),
            Some(&(start, Tok::Semi, end)) if start == end => "newline".to_owned(),
            Some((_, tok, _)) => tok.to_string(),
        }
    }

    fn unexpected(&self, expected: &str) -> Diag {
        Diag::parse(
            self.cur_span(),
            format!("expected {expected}, found {}", self.found()),
        )
    }

    fn expect(&mut self, tok: Tok<'_>, what: &str) -> PResult<Span> {
        self.eat(tok).ok_or_else(|| self.unexpected(what))
    }

    fn expect_ident(&mut self) -> PResult<IdentName> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let pos = self.bump();
                let sym = self.interner.intern(name);
                Ok(IdentName { sym, pos })
            }
            _ => Err(self.unexpected("name")),
        }
    }

    /// Accepts `;`, end of input, or (without consuming it) `closer`.
    fn expect_semi(&mut self, closer: Option<Tok<'_>>) -> PResult<()> {
        match self.peek() {
            Some(Tok::Semi) => {
                self.bump();
                Ok(())
            }
            None => Ok(()),
            Some(tok) if Some(tok) == closer => Ok(()),
            Some(_) => Err(self.unexpected("';'")),
        }
    }

    /// Index of the bracket closing the one at `open`, if any.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, (_, tok, _)) in self.toks.iter().enumerate().skip(open) {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Skips a bracketed region starting at the current opener.
    fn skip_balanced(&mut self) -> PResult<Span> {
        let start = self.cur_span();
        let Some(close) = self.matching_close(self.pos) else {
            return Err(Diag::parse(start, "unbalanced brackets"));
        };
        self.pos = close + 1;
        Ok(start.to(self.prev_span()))
    }

    // -------------------------------------------------------------------------
    // File level
    // -------------------------------------------------------------------------

    fn source_file(&mut self) -> PResult<SourceFile> {
        let package_pos = self.expect(Tok::Keyword(Keyword::Package), "'package'")?;
        let name = self.expect_ident()?;
        if self.interner.resolve(name.sym) == "_" {
            return Err(Diag::parse(name.pos, "invalid package name _"));
        }
        self.expect_semi(None)?;

        let mut imports = Vec::new();
        while self.at(Tok::Keyword(Keyword::Import)) {
            self.import_decl(&mut imports)?;
            self.expect_semi(None)?;
        }
        let imports = self.arena.list_imports(imports);

        let mut decls = Vec::new();
        while let Some(tok) = self.peek() {
            let decl = match tok {
                Tok::Keyword(Keyword::Type) => TopLevelDecl::Gen(self.gen_decl(GenDeclKind::Type)?),
                Tok::Keyword(Keyword::Var) => TopLevelDecl::Gen(self.gen_decl(GenDeclKind::Var)?),
                Tok::Keyword(Keyword::Const) => {
                    TopLevelDecl::Gen(self.gen_decl(GenDeclKind::Const)?)
                }
                Tok::Keyword(Keyword::Func) => TopLevelDecl::Func(self.func_decl()?),
                Tok::Keyword(Keyword::Import) => {
                    return Err(Diag::parse(
                        self.cur_span(),
                        "imports must appear before other declarations",
                    ));
                }
                Tok::Semi => {
                    self.bump();
                    continue;
                }
                _ => {
                    return Err(Diag::parse(
                        self.cur_span(),
                        "non-declaration statement outside function body",
                    ));
                }
            };
            decls.push(decl);
            self.expect_semi(None)?;
        }
        let decls = self.arena.list_top_decls(decls);

        Ok(SourceFile {
            package_pos,
            name: name.sym,
            name_pos: name.pos,
            imports,
            decls,
        })
    }

    fn import_decl(&mut self, out: &mut Vec<ImportSpec>) -> PResult<()> {
        self.bump();
        if self.eat(Tok::LParen).is_some() {
            while !self.at(Tok::RParen) {
                out.push(self.import_spec()?);
                self.expect_semi(Some(Tok::RParen))?;
            }
            self.bump();
        } else {
            out.push(self.import_spec()?);
        }
        Ok(())
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.peek() {
            Some(Tok::Dot) => Some(ImportName::Dot(self.bump())),
            Some(Tok::Ident("_")) => Some(ImportName::Blank(self.bump())),
            Some(Tok::Ident(name)) => {
                let pos = self.bump();
                Some(ImportName::Name(self.interner.intern(name), pos))
            }
            _ => None,
        };
        let path = match self.peek() {
            Some(Tok::StringLit(raw) | Tok::RawStringLit(raw)) => self.string_lit(raw),
            _ => return Err(self.unexpected("import path")),
        };
        if self.interner.resolve(path.value).is_empty() {
            return Err(Diag::parse(path.raw, "invalid import path (empty string)"));
        }
        Ok(ImportSpec { name, path })
    }

    fn string_lit(&mut self, raw: &str) -> StringLit {
        let span = self.bump();
        let value = self.interner.intern(&unquote(raw));
        StringLit { raw: span, value }
    }

    fn gen_decl(&mut self, kind: GenDeclKind) -> PResult<DeclId> {
        let kw_pos = self.bump();
        let (l_paren, specs, r_paren) = if let Some(l) = self.eat(Tok::LParen) {
            let mut specs = Vec::new();
            while !self.at(Tok::RParen) {
                if self.peek().is_none() {
                    return Err(self.unexpected("')'"));
                }
                specs.push(self.spec(kind)?);
                self.expect_semi(Some(Tok::RParen))?;
            }
            let r = self.bump();
            (Some(l), specs, Some(r))
        } else {
            (None, vec![self.spec(kind)?], None)
        };
        let specs = self.arena.list_specs(specs);
        let decl = GenDecl {
            kw_pos,
            kind,
            l_paren,
            specs,
            r_paren,
        };
        Ok(self.arena.decls.alloc(decl, kw_pos.to(self.prev_span())))
    }

    fn spec(&mut self, kind: GenDeclKind) -> PResult<Spec> {
        match kind {
            GenDeclKind::Type => self.type_spec().map(Spec::Type),
            GenDeclKind::Var | GenDeclKind::Const => self.value_spec().map(Spec::Value),
        }
    }

    fn value_spec(&mut self) -> PResult<ValueSpec> {
        let start = self.cur_span();
        let names = self.ident_list()?;
        let names = self.arena.list_ident_names(names);

        // Type and initialiser: skip to the `;` (or group `)`) at depth 0.
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok {
                Tok::Semi if depth == 0 => break,
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
        }

        Ok(ValueSpec {
            names,
            span: start.to(self.prev_span()),
        })
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.expect_ident()?;
        let type_params = if self.at(Tok::LBrack) && self.looks_like_type_params() {
            Some(self.skip_balanced()?)
        } else {
            None
        };
        let alias = self.eat(Tok::Assign).is_some();
        let typ = self.parse_type()?;
        Ok(TypeSpec {
            name: name.sym,
            name_pos: name.pos,
            type_params,
            alias,
            typ,
        })
    }

    /// `type G[P any]` versus `type A [N]int`.
    fn looks_like_type_params(&self) -> bool {
        // `[P *C, ...]` is a parameter list, `[N * M]` an array length.
        if let (Some(Tok::Ident(_)), Some(Tok::Star)) = (self.peek_at(1), self.peek_at(2)) {
            return self.has_top_level_comma(self.pos);
        }
        matches!(
            (self.peek_at(1), self.peek_at(2)),
            (
                Some(Tok::Ident(_)),
                Some(
                    Tok::Ident(_)
                        | Tok::Tilde
                        | Tok::Comma
                        | Tok::LBrack
                        | Tok::Keyword(
                            Keyword::Interface
                                | Keyword::Chan
                                | Keyword::Map
                                | Keyword::Func
                                | Keyword::Struct
                        )
                )
            )
        )
    }

    fn has_top_level_comma(&self, open: usize) -> bool {
        let Some(close) = self.matching_close(open) else {
            return false;
        };
        let mut depth = 0usize;
        for (_, tok, _) in &self.toks[open + 1..close] {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth = depth.saturating_sub(1),
                Tok::Comma if depth == 0 => return true,
                _ => {}
            }
        }
        false
    }

    fn func_decl(&mut self) -> PResult<FuncDeclId> {
        let func_pos = self.bump();
        let recv = if self.at(Tok::LParen) {
            let list = self.param_list()?;
            match self.arena.fields_list(list.fields) {
                [one] => Some(*one),
                [] => return Err(Diag::parse(list.l_paren.to(list.r_paren), "method has no receiver")),
                _ => {
                    return Err(Diag::parse(
                        list.l_paren.to(list.r_paren),
                        "method has multiple receivers",
                    ));
                }
            }
        } else {
            None
        };
        let name = self.expect_ident()?;
        let type_params = if self.at(Tok::LBrack) {
            Some(self.skip_balanced()?)
        } else {
            None
        };
        let signature = self.signature()?;
        let body = if self.at(Tok::LBrace) {
            Some(self.skip_balanced()?)
        } else {
            None
        };
        let decl = FuncDecl {
            func_pos,
            recv,
            name: name.sym,
            name_pos: name.pos,
            type_params,
            signature,
            body,
        };
        Ok(self.arena.funcs.alloc(decl, func_pos.to(self.prev_span())))
    }

    // -------------------------------------------------------------------------
    // Signatures
    // -------------------------------------------------------------------------

    fn signature(&mut self) -> PResult<Signature> {
        let params = self.param_list()?;
        let results = match self.peek() {
            Some(Tok::LParen) => Some(Results::Params(self.param_list()?)),
            Some(tok) if starts_type(tok) => Some(Results::Type(self.parse_type()?)),
            _ => None,
        };
        Ok(Signature { params, results })
    }

    fn param_list(&mut self) -> PResult<FieldList> {
        let l_paren = self.expect(Tok::LParen, "'('")?;
        let mut params = Vec::new();
        while !self.at(Tok::RParen) {
            params.push(self.param_decl()?);
            if self.eat(Tok::Comma).is_none() {
                break;
            }
        }
        let r_paren = self.expect(Tok::RParen, "')'")?;
        let fields = parser_support::resolve_param_list(&mut self.arena, params);
        let fields = self.arena.list_fields(fields);
        Ok(FieldList {
            l_paren,
            fields,
            r_paren,
        })
    }

    fn param_decl(&mut self) -> PResult<ParamDecl> {
        let start = self.cur_span();
        let named = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Ident(_)), Some(Tok::Comma | Tok::RParen)) => {
                let name = self.expect_ident()?;
                return Ok(ParamDecl {
                    names: vec![name],
                    ellipsis_pos: None,
                    typ: None,
                    span: name.pos,
                });
            }
            (Some(Tok::Ident(_)), Some(Tok::Dot)) => false,
            // `a [2]int` versus the generic type `G[int]`.
            (Some(Tok::Ident(_)), Some(Tok::LBrack)) => self
                .matching_close(self.pos + 1)
                .and_then(|close| self.toks.get(close + 1))
                .is_some_and(|&(_, next, _)| !matches!(next, Tok::Comma | Tok::RParen)),
            (Some(Tok::Ident(_)), Some(tok)) => starts_type(tok) || tok == Tok::Ellipsis,
            _ => false,
        };

        let names = if named {
            vec![self.expect_ident()?]
        } else {
            Vec::new()
        };
        let (ellipsis_pos, typ) = match self.eat(Tok::Ellipsis) {
            Some(ellipsis_pos) => {
                let elem = self.parse_type()?;
                let typ = self.finish_type(ellipsis_pos, Type::Variadic { ellipsis_pos, elem });
                (Some(ellipsis_pos), typ)
            }
            None => (None, self.parse_type()?),
        };
        Ok(ParamDecl {
            names,
            ellipsis_pos,
            typ: Some(typ),
            span: start.to(self.prev_span()),
        })
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    #[inline]
    fn finish_type(&mut self, start: Span, node: Type) -> TypeId {
        let span = start.to(self.prev_span());
        self.arena.types.alloc(node, span)
    }

    fn parse_type(&mut self) -> PResult<TypeId> {
        let Some(tok) = self.peek() else {
            return Err(self.unexpected("type"));
        };
        let start = self.cur_span();
        match tok {
            Tok::Ident(_) => self.type_name(),
            Tok::Star => {
                let star_pos = self.bump();
                let elem = self.parse_type()?;
                Ok(self.finish_type(start, Type::Pointer { star_pos, elem }))
            }
            Tok::LBrack => self.array_or_slice(),
            Tok::LParen => {
                let l_paren = self.bump();
                let typ = self.parse_type()?;
                self.expect(Tok::RParen, "')'")?;
                Ok(self.finish_type(start, Type::Paren { l_paren, typ }))
            }
            Tok::Keyword(Keyword::Map) => {
                let map_pos = self.bump();
                self.expect(Tok::LBrack, "'['")?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack, "']'")?;
                let val = self.parse_type()?;
                Ok(self.finish_type(start, Type::Map { map_pos, key, val }))
            }
            Tok::Keyword(Keyword::Chan) => {
                let chan_pos = self.bump();
                let dir = match self.eat(Tok::Arrow) {
                    Some(_) => ChanDir::Send,
                    None => ChanDir::Both,
                };
                let elem = self.parse_type()?;
                Ok(self.finish_type(start, Type::Chan { dir, chan_pos, elem }))
            }
            Tok::Arrow => {
                self.bump();
                let chan_pos = self.expect(Tok::Keyword(Keyword::Chan), "'chan'")?;
                let elem = self.parse_type()?;
                let dir = ChanDir::Recv;
                Ok(self.finish_type(start, Type::Chan { dir, chan_pos, elem }))
            }
            Tok::Keyword(Keyword::Func) => {
                let func_pos = self.bump();
                let sig = self.signature()?;
                Ok(self.finish_type(start, Type::Func { func_pos, sig }))
            }
            Tok::Keyword(Keyword::Struct) => self.struct_type(),
            Tok::Keyword(Keyword::Interface) => self.interface_type(),
            _ => Err(self.unexpected("type")),
        }
    }

    fn type_name(&mut self) -> PResult<TypeId> {
        let start = self.cur_span();
        let first = self.expect_ident()?;
        let (pkg, name) = if self.eat(Tok::Dot).is_some() {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };
        let args = if self.at(Tok::LBrack) {
            self.type_args()?
        } else {
            ListRef::EMPTY
        };
        let node = Type::Named {
            pkg,
            name: name.sym,
            name_pos: name.pos,
            args,
        };
        Ok(self.finish_type(start, node))
    }

    fn type_args(&mut self) -> PResult<ListRef<TypeId>> {
        self.bump();
        let mut args = Vec::new();
        while !self.at(Tok::RBrack) {
            args.push(self.parse_type()?);
            if self.eat(Tok::Comma).is_none() {
                break;
            }
        }
        self.expect(Tok::RBrack, "']'")?;
        if args.is_empty() {
            return Err(Diag::parse(self.prev_span(), "expected type argument list"));
        }
        Ok(self.arena.list_types(args))
    }

    fn array_or_slice(&mut self) -> PResult<TypeId> {
        let l_brack = self.bump();
        if self.eat(Tok::RBrack).is_some() {
            let elem = self.parse_type()?;
            return Ok(self.finish_type(l_brack, Type::Slice { l_brack, elem }));
        }

        let len = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Ellipsis), Some(Tok::RBrack)) => ArrayLen::Ellipsis(self.bump()),
            (Some(lit), Some(Tok::RBrack)) => match literal_kind(lit) {
                Some((kind, text)) => {
                    let raw = self.bump();
                    let text = self.interner.intern(text);
                    ArrayLen::Lit(BasicLit { kind, raw, text })
                }
                None => ArrayLen::Expr(self.skip_len_expr()?),
            },
            _ => ArrayLen::Expr(self.skip_len_expr()?),
        };

        self.expect(Tok::RBrack, "']'")?;
        let elem = self.parse_type()?;
        Ok(self.finish_type(l_brack, Type::Array { l_brack, len, elem }))
    }

    /// Skips an array length expression up to (not including) its `]`.
    fn skip_len_expr(&mut self) -> PResult<Span> {
        let start = self.cur_span();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(self.unexpected("']'")),
                Some(Tok::Semi) if depth == 0 => return Err(self.unexpected("']'")),
                Some(Tok::RBrack) if depth == 0 => break,
                Some(Tok::LParen | Tok::LBrack | Tok::LBrace) => depth += 1,
                Some(Tok::RParen | Tok::RBrack | Tok::RBrace) => {
                    if depth == 0 {
                        return Err(self.unexpected("']'"));
                    }
                    depth -= 1;
                }
                Some(_) => {}
            }
            self.bump();
        }
        Ok(start.to(self.prev_span()))
    }

    fn struct_type(&mut self) -> PResult<TypeId> {
        let struct_pos = self.bump();
        self.expect(Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            fields.push(self.field_decl()?);
            self.expect_semi(Some(Tok::RBrace))?;
        }
        self.bump();
        let fields = self.arena.list_fields(fields);
        Ok(self.finish_type(struct_pos, Type::Struct { struct_pos, fields }))
    }

    fn field_decl(&mut self) -> PResult<FieldId> {
        let start = self.cur_span();
        let embedded = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Star), _) => true,
            (
                Some(Tok::Ident(_)),
                None
                | Some(Tok::Dot | Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_)),
            ) => true,
            // `f [2]int` versus the embedded generic `G[int]`.
            (Some(Tok::Ident(_)), Some(Tok::LBrack)) => self
                .matching_close(self.pos + 1)
                .and_then(|close| self.toks.get(close + 1))
                .is_none_or(|&(_, next, _)| {
                    matches!(
                        next,
                        Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_)
                    )
                }),
            (Some(Tok::Ident(_)), _) => false,
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let (names, typ) = if embedded {
            (ListRef::EMPTY, self.parse_type()?)
        } else {
            let names = self.ident_list()?;
            let names = self.arena.list_ident_names(names);
            (names, self.parse_type()?)
        };

        let tag = match self.peek() {
            Some(Tok::StringLit(raw) | Tok::RawStringLit(raw)) => Some(self.string_lit(raw)),
            _ => None,
        };

        let field = Field {
            names,
            ellipsis_pos: None,
            typ,
            tag,
            is_embed: embedded,
        };
        Ok(self.arena.fields.alloc(field, start.to(self.prev_span())))
    }

    /// Interface bodies are only counted, not modelled.
    fn interface_type(&mut self) -> PResult<TypeId> {
        let interface_pos = self.bump();
        self.expect(Tok::LBrace, "'{'")?;

        let mut depth = 1usize;
        let mut elems = 0u32;
        let mut in_elem = false;
        loop {
            let Some(tok) = self.peek() else {
                return Err(self.unexpected("'}'"));
            };
            self.bump();
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Tok::Semi if depth == 1 => {
                    in_elem = false;
                    continue;
                }
                _ => {}
            }
            if !in_elem {
                in_elem = true;
                elems += 1;
            }
        }

        let node = Type::Interface {
            interface_pos,
            elems,
        };
        Ok(self.finish_type(interface_pos, node))
    }

    fn ident_list(&mut self) -> PResult<Vec<IdentName>> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(Tok::Comma).is_some() {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }
}

fn starts_type(tok: Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::Ident(_)
            | Tok::Star
            | Tok::LBrack
            | Tok::LParen
            | Tok::Arrow
            | Tok::Keyword(
                Keyword::Map | Keyword::Chan | Keyword::Func | Keyword::Struct | Keyword::Interface
            )
    )
}

fn literal_kind(tok: Tok<'_>) -> Option<(BasicLitKind, &str)> {
    Some(match tok {
        Tok::IntLit(s) => (BasicLitKind::Int, s),
        Tok::FloatLit(s) => (BasicLitKind::Float, s),
        Tok::ImagLit(s) => (BasicLitKind::Imag, s),
        Tok::RuneLit(s) => (BasicLitKind::Rune, s),
        Tok::StringLit(s) | Tok::RawStringLit(s) => (BasicLitKind::String, s),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParsedFile {
        match parse_source(src) {
            Ok(file) => file,
            Err(failure) => panic!("parse failed: {:?}", failure.diags),
        }
    }

    fn only_type_spec(file: &ParsedFile) -> TypeSpec {
        let [TopLevelDecl::Gen(id)] = file.decls() else {
            panic!("expected one declaration");
        };
        let decl = file.arena.decls[*id];
        match file.arena.specs_list(decl.specs) {
            [Spec::Type(ts)] => *ts,
            other => panic!("unexpected specs {other:?}"),
        }
    }

    #[test]
    fn package_clause_only() {
        let file = parse("package geo\n");
        assert_eq!(file.package_name(), "geo");
        assert!(file.imports().is_empty());
        assert!(file.decls().is_empty());
    }

    #[test]
    fn struct_with_tags_and_embeds() {
        let file = parse(
            "package p\n\ntype T struct {\n\tio.Reader\n\t*Base\n\tA, B int `json:\"a\"`\n}\n",
        );
        let ts = only_type_spec(&file);
        let Type::Struct { fields, .. } = file.arena.types[ts.typ] else {
            panic!("not a struct");
        };
        let fields: Vec<Field> = file
            .arena
            .fields_list(fields)
            .iter()
            .map(|&id| file.arena.fields[id])
            .collect();
        assert_eq!(fields.len(), 3);
        assert!(fields[0].is_embed && fields[1].is_embed);
        assert!(!fields[2].is_embed);
        assert_eq!(fields[2].names.len(), 2);
        let tag = fields[2].tag.map(|t| file.name(t.value));
        assert_eq!(tag, Some("json:\"a\""));
    }

    #[test]
    fn array_field_is_not_an_embedded_generic() {
        let file = parse("package p\ntype T struct { buf [4]byte; G[int] }\n");
        let ts = only_type_spec(&file);
        let Type::Struct { fields, .. } = file.arena.types[ts.typ] else {
            panic!("not a struct");
        };
        let ids = file.arena.fields_list(fields);
        let buf = file.arena.fields[ids[0]];
        let generic = file.arena.fields[ids[1]];
        assert!(!buf.is_embed);
        assert!(matches!(file.arena.types[buf.typ], Type::Array { .. }));
        assert!(generic.is_embed);
    }

    #[test]
    fn package_clause_probe() {
        assert_eq!(
            parse_package_clause("// doc\n/* c */ package yaml // x\n"),
            Some("yaml".to_owned())
        );
        assert_eq!(parse_package_clause("func main() {}"), None);
    }
}
