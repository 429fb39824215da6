use gogetset_parser::ast::{GenDeclKind, Spec, TopLevelDecl, Type};
use gogetset_parser::{Lexer, ParsedFile, Tok, is_keyword, parse_package_clause, parse_source};
use proptest::prelude::*;

fn type_text() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["int", "string", "geo.Point", "any", "struct{}", "interface{}"])
        .prop_map(str::to_owned)
        .prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|t| format!("*{t}")),
                inner.clone().prop_map(|t| format!("[]{t}")),
                (0u8..16, inner.clone()).prop_map(|(n, t)| format!("[{n}]{t}")),
                (inner.clone(), inner.clone()).prop_map(|(k, v)| format!("map[{k}]{v}")),
                inner.clone().prop_map(|t| format!("chan ({t})")),
                inner.clone().prop_map(|t| format!("<-chan {t}")),
                (inner.clone(), inner).prop_map(|(a, b)| format!("func(x {a}, rest ...{b}) error")),
            ]
        })
}

/// A file with one struct declaration per entry, each field on its own line.
fn struct_file() -> impl Strategy<Value = (String, Vec<usize>, String)> {
    let pkg = "[a-z][a-z0-9]{0,6}".prop_filter("keyword", |name| !is_keyword(name));
    let fields = prop::collection::vec(("[A-Z][a-z0-9]{0,3}", type_text()), 0..5);
    (pkg, prop::collection::vec(fields, 0..4)).prop_map(|(pkg, structs)| {
        let mut src = format!("package {pkg}\n\nimport \"example.com/geo\"\n");
        let mut counts = Vec::new();
        for (i, fields) in structs.iter().enumerate() {
            src.push_str(&format!("\ntype S{i} struct {{\n"));
            for (name, ty) in fields {
                src.push_str(&format!("\t{name} {ty}\n"));
            }
            src.push_str("}\n");
            counts.push(fields.len());
        }
        (pkg, counts, src)
    })
}

fn struct_field_counts(file: &ParsedFile) -> Vec<usize> {
    file.decls()
        .iter()
        .filter_map(|decl| match decl {
            TopLevelDecl::Gen(id) => Some(file.arena.decls[*id]),
            TopLevelDecl::Func(_) => None,
        })
        .filter(|decl| decl.kind == GenDeclKind::Type)
        .flat_map(|decl| file.arena.specs_list(decl.specs).to_vec())
        .filter_map(|spec| match spec {
            Spec::Type(ts) => match file.arena.types[ts.typ] {
                Type::Struct { fields, .. } => Some(file.arena.fields_list(fields).len()),
                _ => None,
            },
            Spec::Value(_) => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn arbitrary_text_fails_with_located_diagnostics(s in ".*") {
        let _ = parse_package_clause(&s);
        if let Err(failure) = parse_source(&s) {
            prop_assert!(!failure.diags.is_empty(), "no diagnostics for {s:?}");
            for diag in &failure.diags {
                prop_assert!(diag.span.start <= diag.span.end, "{diag:?} in {s:?}");
                prop_assert!(diag.span.end as usize <= s.len(), "{diag:?} past end of {s:?}");
                let _ = failure.lines.line_col(diag.span.start);
            }
        }
    }

    #[test]
    fn tokens_stay_in_bounds_and_ordered(s in ".*") {
        let mut frontier = 0usize;
        for (start, tok, end) in Lexer::new(&s) {
            prop_assert!(start <= end && end <= s.len(), "({start},{end}) {tok:?} in {s:?}");
            prop_assert!(start >= frontier, "{tok:?} at {start} behind {frontier} in {s:?}");
            if !(tok == Tok::Semi && start == end) {
                frontier = end;
            }
        }
    }

    #[test]
    fn struct_declarations_parse_with_every_field((pkg, counts, src) in struct_file()) {
        let file = match parse_source(&src) {
            Ok(file) => file,
            Err(failure) => return Err(TestCaseError::fail(format!("{src}\n{:?}", failure.diags))),
        };
        prop_assert_eq!(file.package_name(), pkg.as_str());
        prop_assert_eq!(parse_package_clause(&src), Some(pkg));
        prop_assert_eq!(struct_field_counts(&file), counts);
    }
}
