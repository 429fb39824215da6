use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use gogetset::builder::ModelBuilder;
use gogetset::format::format_source;
use gogetset::generate::assign_aliases;
use gogetset::model::ChanDir;
use gogetset::{FieldModel, FileModel, Generator, ImportOverrides, StaticLookup, StructModel, TypeExpr};
use gogetset_parser::is_keyword;
use proptest::prelude::*;

const GEO: &str = "example.com/geo";
const OTHER: &str = "example.com/otherpkg";

fn leaf() -> impl Strategy<Value = TypeExpr> {
    prop_oneof![
        prop::sample::select(vec!["int", "string", "error", "any", "interface{}", "struct{}"])
            .prop_map(|name| TypeExpr::Predeclared(name.to_owned())),
        (
            prop::sample::select(vec![GEO, OTHER]),
            prop::sample::select(vec!["Point", "Widget"]),
        )
            .prop_map(|(path, ident)| TypeExpr::Named {
                import_path: path.to_owned(),
                ident: ident.to_owned(),
            }),
    ]
}

fn type_expr() -> impl Strategy<Value = TypeExpr> {
    leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (prop::option::of(0u64..64), inner.clone()).prop_map(|(len, elem)| TypeExpr::Array {
                len,
                elem: Box::new(elem),
            }),
            (
                prop::sample::select(vec![ChanDir::Both, ChanDir::Send, ChanDir::Recv]),
                inner.clone(),
            )
                .prop_map(|(dir, elem)| TypeExpr::Chan {
                    dir,
                    elem: Box::new(elem),
                }),
            (inner.clone(), inner.clone()).prop_map(|(key, value)| TypeExpr::Map {
                key: Box::new(key),
                value: Box::new(value),
            }),
            inner.prop_map(|elem| TypeExpr::Pointer(Box::new(elem))),
        ]
    })
}

fn reparse(ty: &TypeExpr) -> TypeExpr {
    let aliases = BTreeMap::from([(OTHER.to_owned(), "otherpkg".to_owned())]);
    let src = format!(
        "package geo\n\nimport \"{OTHER}\"\n\ntype T struct {{\n\tF {}\n}}\n",
        ty.render(&aliases, GEO)
    );
    let lookup = StaticLookup::new()
        .with_import_path(GEO)
        .with_package(OTHER, "otherpkg");
    let overrides = ImportOverrides::default();
    let model = ModelBuilder::new(&lookup, &overrides)
        .build_source("t.go", &src, Path::new("/src/geo"))
        .unwrap_or_else(|err| panic!("{src}\n{err}"));
    model.structs[0].fields[0].ty.clone()
}

fn model_with(fields: Vec<TypeExpr>) -> FileModel {
    FileModel {
        import_path: GEO.into(),
        package_name: "geo".into(),
        name: "geo".into(),
        structs: vec![StructModel {
            name: "T".into(),
            fields: fields
                .into_iter()
                .enumerate()
                .map(|(i, ty)| FieldModel {
                    name: format!("F{i}"),
                    ty,
                })
                .collect(),
        }],
        dot_imports: Vec::new(),
    }
}

/// Valid Go with uneven indentation, spacing and blank lines.
fn untidy_file() -> impl Strategy<Value = String> {
    let indent = || prop::sample::select(vec!["", " ", "\t", "\t\t", "    "]);
    let field = (
        indent(),
        prop::sample::select(vec![
            "A int",
            "B, C string   ",
            "D map[string][]int",
            "E struct {\nX int\n}",
            "F interface {\n  Read() error\n\t}",
            "G <-chan *T // doc",
            "H [4]byte /* c */",
            "R string `json:\"r\"`",
        ]),
        prop::sample::select(vec!["\n", "\n\n", "  \n", "\n\n\n"]),
    )
        .prop_map(|(indent, field, end)| format!("{indent}{field}{end}"));
    let decl = (indent(), prop::collection::vec(field, 0..5))
        .prop_map(|(indent, fields)| format!("{indent}type T struct {{\n{}{indent}}}\n", fields.concat()));
    (prop::collection::vec(decl, 0..4), prop::bool::ANY).prop_map(|(decls, func)| {
        let mut src = String::from("\n\npackage geo\n\n");
        for decl in decls {
            src.push_str(&decl);
            src.push('\n');
        }
        if func {
            src.push_str("func (T *T) GetA() int {\n        return T.A\n}\n");
        }
        src
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn rendered_types_parse_back(ty in type_expr()) {
        prop_assert_eq!(reparse(&ty), ty);
    }

    #[test]
    fn aliases_are_distinct_and_never_reserved(
        paths in prop::collection::btree_set(
            (
                prop::sample::select(vec!["a", "b", "example.com/x", "gopkg.in"]),
                prop::sample::select(vec!["v1", "v10", "case", "type", "go-kit", "_", "9p", "v1.2"]),
            )
                .prop_map(|(dir, base)| format!("{dir}/{base}")),
            0..12,
        ),
        reserved in prop::collection::btree_set(
            prop::sample::select(vec!["v1", "v10", "go_kit", "x", "Point"]).prop_map(str::to_owned),
            0..4,
        )
    ) {
        let aliases = assign_aliases(&paths, &reserved);
        prop_assert_eq!(aliases.len(), paths.len());
        let distinct: BTreeSet<&String> = aliases.values().collect();
        prop_assert_eq!(distinct.len(), aliases.len());
        for alias in aliases.values() {
            prop_assert!(!is_keyword(alias), "keyword alias {}", alias);
            prop_assert!(!reserved.contains(alias), "reserved alias {}", alias);
        }
        prop_assert_eq!(assign_aliases(&paths, &reserved), aliases);
    }

    #[test]
    fn formatting_settles_after_one_pass(src in untidy_file()) {
        let once = format_source(&src).unwrap_or_else(|err| panic!("{src}\n{err}"));
        prop_assert_eq!(format_source(&once).expect("formatted text parses"), once.clone());
        prop_assert!(!once.starts_with('\n') && !once.contains("\n\n\n"), "{}", once);
        for line in once.lines() {
            prop_assert_eq!(line.trim_end(), line);
        }
    }

    #[test]
    fn two_accessors_per_field(fields in prop::collection::vec(type_expr(), 0..6)) {
        let n = fields.len();
        let model = model_with(fields);
        let generator = Generator::new("t.go");
        let text = generator.render(&model).expect("formats");

        prop_assert_eq!(text.matches("func (T *T) Get").count(), n);
        prop_assert_eq!(text.matches("func (T *T) Set").count(), n);
        prop_assert_eq!(generator.render(&model).expect("formats"), text);
    }
}
