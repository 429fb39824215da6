//! Builds a [`FileModel`] from one Go source file.

use std::fs;
use std::path::{Path, PathBuf};

use gogetset_parser::ast::{
    ArrayLen, BasicLitKind, ChanDir as AstChanDir, Field, FieldId, GenDeclKind, ListRef, Spec,
    TopLevelDecl, Type, TypeId, TypeSpec,
};
use gogetset_parser::{ParsedFile, Span, parse_source};
use tracing::{debug, trace};

use crate::config::ImportOverrides;
use crate::error::{Error, Pos, Result};
use crate::locate::PackageLookup;
use crate::model::{ChanDir, FieldModel, FileModel, StructModel, TypeExpr};
use crate::resolve::{ImportMap, ImportResolver};

/// A top-level `type T struct{...}` declaration.
#[derive(Debug, Clone, Copy)]
pub struct StructDecl {
    pub spec: TypeSpec,
    pub fields: ListRef<FieldId>,
}

/// Struct declarations of `file`, in source order. Aliases are skipped.
pub fn struct_decls(file: &ParsedFile) -> impl Iterator<Item = StructDecl> + '_ {
    file.decls()
        .iter()
        .filter_map(move |decl| match *decl {
            TopLevelDecl::Gen(id) => Some(&file.arena.decls[id]),
            TopLevelDecl::Func(_) => None,
        })
        .filter(|decl| decl.kind == GenDeclKind::Type)
        .flat_map(move |decl| file.arena.specs_list(decl.specs))
        .filter_map(|spec| match *spec {
            Spec::Type(ts) if !ts.alias => Some(ts),
            _ => None,
        })
        .filter_map(move |spec| match file.arena.types[spec.typ] {
            Type::Struct { fields, .. } => Some(StructDecl { spec, fields }),
            _ => None,
        })
}

/// Parses a file and translates its struct declarations.
pub struct ModelBuilder<'a> {
    lookup: &'a dyn PackageLookup,
    overrides: &'a ImportOverrides,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(lookup: &'a dyn PackageLookup, overrides: &'a ImportOverrides) -> Self {
        Self { lookup, overrides }
    }

    pub fn build(&self, path: &Path) -> Result<FileModel> {
        let unreadable = |source| Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let src = fs::read_to_string(path).map_err(unreadable)?;
        let src_dir = source_dir(path).map_err(unreadable)?;
        self.build_source(&path.display().to_string(), &src, &src_dir)
    }

    /// Builds from text already in memory. `file_name` is used in
    /// positions; `src_dir` is the directory the file lives in.
    pub fn build_source(&self, file_name: &str, src: &str, src_dir: &Path) -> Result<FileModel> {
        let parsed = parse_source(src).map_err(|failure| Error::syntax(file_name, &failure))?;
        let import_path = self.lookup.import_path_for_dir(src_dir).unwrap_or_default();
        let imports = ImportResolver::new(self.lookup, src_dir).resolve(&parsed, self.overrides)?;
        debug!(file = file_name, %import_path, "building model");

        let cx = TypeCx {
            file: &parsed,
            file_name,
            import_path: &import_path,
            imports: &imports,
        };
        let structs = struct_decls(&parsed)
            .map(|decl| cx.struct_model(decl))
            .collect::<Result<Vec<_>>>()?;

        let name = parsed.package_name().to_owned();
        let package_name = if import_path.is_empty() {
            None
        } else {
            self.lookup.package_name(&import_path, src_dir)
        }
        .unwrap_or_else(|| name.clone());
        debug!(structs = structs.len(), "model built");

        Ok(FileModel {
            import_path,
            package_name,
            name,
            structs,
            dot_imports: imports.dot_imports().to_vec(),
        })
    }
}

/// Everything type translation needs from the enclosing file.
struct TypeCx<'a> {
    file: &'a ParsedFile,
    file_name: &'a str,
    import_path: &'a str,
    imports: &'a ImportMap,
}

impl TypeCx<'_> {
    fn pos(&self, span: Span) -> Pos {
        Pos::new(self.file_name, &self.file.lines, span)
    }

    fn struct_model(&self, decl: StructDecl) -> Result<StructModel> {
        let name = self.file.name(decl.spec.name).to_owned();
        if decl.spec.type_params.is_some() {
            return Err(Error::unsupported(
                self.pos(decl.spec.name_pos),
                "can't handle generic struct types",
            ));
        }

        let mut fields = Vec::new();
        for &id in self.file.arena.fields_list(decl.fields) {
            let field = self.file.arena.fields[id];
            let ty = self.translate(field.typ)?;
            for field_name in self.field_names(&field) {
                fields.push(FieldModel {
                    name: field_name,
                    ty: ty.clone(),
                });
            }
        }
        debug!(%name, fields = fields.len(), "struct");

        let model = StructModel { name, fields };
        if tracing::enabled!(tracing::Level::TRACE) {
            match serde_json::to_string(&model) {
                Ok(json) => trace!(model = %json, "struct model"),
                Err(err) => trace!(%err, "struct model not serializable"),
            }
        }
        Ok(model)
    }

    /// Field names that can carry accessors; embedded fields are named
    /// after their type.
    fn field_names(&self, field: &Field) -> Vec<String> {
        if field.is_embed {
            return self.embedded_name(field.typ).into_iter().collect();
        }
        self.file
            .arena
            .ident_names(field.names)
            .iter()
            .map(|ident| self.file.name(ident.sym))
            .filter(|name| *name != "_")
            .map(str::to_owned)
            .collect()
    }

    fn embedded_name(&self, typ: TypeId) -> Option<String> {
        match self.file.arena.types[typ] {
            Type::Named { name, .. } => Some(self.file.name(name).to_owned()),
            Type::Pointer { elem, .. } => self.embedded_name(elem),
            _ => None,
        }
    }

    fn translate(&self, id: TypeId) -> Result<TypeExpr> {
        let span = self.file.arena.types.span(id);
        match self.file.arena.types[id] {
            Type::Array { len, elem, .. } => {
                let len = self.array_len(len)?;
                Ok(TypeExpr::Array {
                    len: Some(len),
                    elem: Box::new(self.translate(elem)?),
                })
            }
            Type::Slice { elem, .. } => Ok(TypeExpr::Array {
                len: None,
                elem: Box::new(self.translate(elem)?),
            }),
            Type::Chan { dir, elem, .. } => {
                let dir = match dir {
                    AstChanDir::Both => ChanDir::Both,
                    AstChanDir::Send => ChanDir::Send,
                    AstChanDir::Recv => ChanDir::Recv,
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.translate(elem)?),
                })
            }
            Type::Variadic { elem, .. } => self.translate(elem),
            Type::Named {
                pkg,
                name,
                name_pos,
                args,
            } => {
                if !args.is_empty() {
                    return Err(Error::unsupported(
                        self.pos(name_pos),
                        "don't know how to parse instantiated generic type",
                    ));
                }
                let ident = self.file.name(name).to_owned();
                match pkg {
                    Some(pkg) => {
                        let short = self.file.name(pkg.sym);
                        let import_path = self.imports.get(short).ok_or_else(|| {
                            Error::UnresolvedPackage {
                                pos: self.pos(pkg.pos),
                                name: short.to_owned(),
                            }
                        })?;
                        Ok(TypeExpr::Named {
                            import_path: import_path.to_owned(),
                            ident,
                        })
                    }
                    None if is_exported(&ident) => Ok(TypeExpr::Named {
                        import_path: self.import_path.to_owned(),
                        ident,
                    }),
                    None => Ok(TypeExpr::Predeclared(ident)),
                }
            }
            Type::Interface { elems, .. } => {
                if elems > 0 {
                    return Err(Error::unsupported(
                        self.pos(span),
                        "can't handle non-empty unnamed interface types",
                    ));
                }
                Ok(TypeExpr::Predeclared("interface{}".into()))
            }
            Type::Map { key, val, .. } => Ok(TypeExpr::Map {
                key: Box::new(self.translate(key)?),
                value: Box::new(self.translate(val)?),
            }),
            Type::Pointer { elem, .. } => Ok(TypeExpr::Pointer(Box::new(self.translate(elem)?))),
            Type::Struct { fields, .. } => {
                if !fields.is_empty() {
                    return Err(Error::unsupported(
                        self.pos(span),
                        "can't handle non-empty unnamed struct types",
                    ));
                }
                Ok(TypeExpr::Predeclared("struct{}".into()))
            }
            Type::Func { .. } => Err(Error::unsupported(
                self.pos(span),
                "don't know how to parse function type",
            )),
            Type::Paren { typ, .. } => self.translate(typ),
        }
    }

    fn array_len(&self, len: ArrayLen) -> Result<u64> {
        match len {
            ArrayLen::Lit(lit) if lit.kind == BasicLitKind::Int => {
                let text = self.file.name(lit.text);
                parse_int_lit(text).ok_or_else(|| {
                    Error::unsupported(self.pos(lit.raw), format!("bad array size: {text}"))
                })
            }
            ArrayLen::Lit(lit) => Err(Error::unsupported(
                self.pos(lit.raw),
                format!("bad array size: {}", self.file.name(lit.text)),
            )),
            ArrayLen::Expr(span) => Err(Error::unsupported(
                self.pos(span),
                "bad array size: length must be an integer literal",
            )),
            ArrayLen::Ellipsis(span) => Err(Error::unsupported(
                self.pos(span),
                "bad array size: [...] is only valid in composite literals",
            )),
        }
    }
}

/// Value of a Go integer literal: decimal, `0x`, `0o`, `0b`, or legacy
/// octal, with optional `_` separators.
pub fn parse_int_lit(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let (radix, body) = match digits.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &digits[2..]),
        [b'0', b'o' | b'O', ..] => (8, &digits[2..]),
        [b'0', b'b' | b'B', ..] => (2, &digits[2..]),
        [b'0', _, ..] => (8, &digits[1..]),
        _ => (10, digits.as_str()),
    };
    if body.is_empty() {
        return None;
    }
    u64::from_str_radix(body, radix).ok()
}

/// Whether `name` starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Source directory of `path`, made absolute.
pub fn source_dir(path: &Path) -> std::io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    Ok(abs.parent().map(Path::to_path_buf).unwrap_or_default())
}
