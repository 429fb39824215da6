//! Language-neutral model of a file's struct types.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Channel direction of a [`TypeExpr::Chan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A field's declared type, with package references already resolved to
/// import paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeExpr {
    /// `len == None` is a slice.
    Array { len: Option<u64>, elem: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// An exported type; `import_path` is empty when unknown.
    Named { import_path: String, ident: String },
    Pointer(Box<TypeExpr>),
    /// Builtin or unexported name, or `interface{}` / `struct{}`, rendered verbatim.
    Predeclared(String),
}

impl TypeExpr {
    /// Renders the type as Go source.
    ///
    /// `aliases` maps import paths to local package names. Types from
    /// `current_package` render unqualified, as do types whose path has no
    /// alias.
    pub fn render(&self, aliases: &BTreeMap<String, String>, current_package: &str) -> String {
        let mut out = String::new();
        self.render_into(&mut out, aliases, current_package);
        out
    }

    fn render_into(&self, out: &mut String, aliases: &BTreeMap<String, String>, current: &str) {
        match self {
            TypeExpr::Array { len, elem } => {
                match len {
                    Some(n) => out.push_str(&format!("[{n}]")),
                    None => out.push_str("[]"),
                }
                elem.render_into(out, aliases, current);
            }
            TypeExpr::Chan { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Recv => "<-chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Both => "chan ",
                });
                // `chan (<-chan T)` would otherwise read as `chan<- (chan T)`.
                let paren = *dir == ChanDir::Both
                    && matches!(**elem, TypeExpr::Chan { dir: ChanDir::Recv, .. });
                if paren {
                    out.push('(');
                }
                elem.render_into(out, aliases, current);
                if paren {
                    out.push(')');
                }
            }
            TypeExpr::Map { key, value } => {
                out.push_str("map[");
                key.render_into(out, aliases, current);
                out.push(']');
                value.render_into(out, aliases, current);
            }
            TypeExpr::Named { import_path, ident } => {
                if import_path != current {
                    if let Some(alias) = aliases.get(import_path) {
                        out.push_str(alias);
                        out.push('.');
                    }
                }
                out.push_str(ident);
            }
            TypeExpr::Pointer(elem) => {
                out.push('*');
                elem.render_into(out, aliases, current);
            }
            TypeExpr::Predeclared(name) => out.push_str(name),
        }
    }

    /// Adds every import path this type refers to.
    pub fn collect_imports(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } | TypeExpr::Pointer(elem) => {
                elem.collect_imports(out)
            }
            TypeExpr::Map { key, value } => {
                key.collect_imports(out);
                value.collect_imports(out);
            }
            TypeExpr::Named { import_path, .. } => {
                if !import_path.is_empty() {
                    out.insert(import_path.clone());
                }
            }
            TypeExpr::Predeclared(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructModel {
    pub name: String,
    pub fields: Vec<FieldModel>,
}

impl StructModel {
    pub fn collect_imports(&self, out: &mut BTreeSet<String>) {
        for field in &self.fields {
            field.ty.collect_imports(out);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileModel {
    /// The file's own import path; empty when the package cannot be located.
    pub import_path: String,
    pub package_name: String,
    /// Identifier from the `package` clause.
    pub name: String,
    pub structs: Vec<StructModel>,
    pub dot_imports: Vec<String>,
}

impl FileModel {
    /// Every import path referenced by any field, sorted.
    pub fn imports(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for s in &self.structs {
            s.collect_imports(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(path: &str, ident: &str) -> TypeExpr {
        TypeExpr::Named {
            import_path: path.into(),
            ident: ident.into(),
        }
    }

    fn pre(name: &str) -> TypeExpr {
        TypeExpr::Predeclared(name.into())
    }

    #[test]
    fn renders_every_shape() {
        let aliases = BTreeMap::from([("example.com/otherpkg".to_owned(), "otherpkg".to_owned())]);
        let cases = [
            (
                TypeExpr::Array {
                    len: None,
                    elem: Box::new(pre("string")),
                },
                "[]string",
            ),
            (
                TypeExpr::Array {
                    len: Some(4),
                    elem: Box::new(pre("byte")),
                },
                "[4]byte",
            ),
            (
                TypeExpr::Map {
                    key: Box::new(pre("string")),
                    value: Box::new(TypeExpr::Pointer(Box::new(named(
                        "example.com/otherpkg",
                        "Widget",
                    )))),
                },
                "map[string]*otherpkg.Widget",
            ),
            (
                TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(pre("int")),
                },
                "<-chan int",
            ),
            (
                TypeExpr::Chan {
                    dir: ChanDir::Send,
                    elem: Box::new(pre("int")),
                },
                "chan<- int",
            ),
            (
                TypeExpr::Chan {
                    dir: ChanDir::Both,
                    elem: Box::new(TypeExpr::Chan {
                        dir: ChanDir::Recv,
                        elem: Box::new(pre("int")),
                    }),
                },
                "chan (<-chan int)",
            ),
            (named("example.com/geo", "Point"), "Point"),
            (named("example.com/unaliased", "Thing"), "Thing"),
            (pre("interface{}"), "interface{}"),
        ];
        for (ty, want) in cases {
            assert_eq!(ty.render(&aliases, "example.com/geo"), want);
        }
    }

    #[test]
    fn collects_nested_imports_once() {
        let ty = TypeExpr::Map {
            key: Box::new(named("b/key", "K")),
            value: Box::new(TypeExpr::Array {
                len: None,
                elem: Box::new(TypeExpr::Map {
                    key: Box::new(named("b/key", "K")),
                    value: Box::new(named("a/val", "V")),
                }),
            }),
        };
        let mut out = BTreeSet::new();
        ty.collect_imports(&mut out);
        named("", "Local").collect_imports(&mut out);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), ["a/val", "b/key"]);
    }

    #[test]
    fn model_serializes_for_dumps() {
        let s = StructModel {
            name: "Point".into(),
            fields: vec![FieldModel {
                name: "X".into(),
                ty: pre("int"),
            }],
        };
        let json = serde_json::to_string(&s).expect("serializable");
        assert_eq!(
            json,
            r#"{"name":"Point","fields":[{"name":"X","type":{"Predeclared":"int"}}]}"#
        );
    }
}
