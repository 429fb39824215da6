use std::fs;
use std::path::Path;

use gogetset::{
    Config, Error, GoModuleLookup, ImportOverrides, OutputTarget, generate_file, write_output,
};
use tempfile::TempDir;

fn module(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("go.mod"), "module example.com/geo\n\ngo 1.22\n").expect("go.mod");
    for (rel, text) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, text).expect("write");
    }
    dir
}

fn lookup() -> GoModuleLookup {
    GoModuleLookup::new(None, Vec::new())
}

const POINT: &str = "package geo\n\ntype Point struct {\n\tX int\n\tY int\n}\n";

#[test]
fn point_accessors_are_written_next_to_the_source() {
    let dir = module(&[("point.go", POINT)]);
    let config = Config::new(dir.path().join("point.go"));

    let text = generate_file(&config, &lookup()).expect("generates");
    let written = write_output(&config, &text).expect("writes");
    let out_path = dir.path().join("point_getter_setter.go");
    assert_eq!(written.as_deref(), Some(out_path.as_path()));

    let want = "\
// Code generated by gogetset. DO NOT EDIT.
// Source: point.go

package geo

import (
)

// Getters and setters of Point.
func (Point *Point) GetX() int {
\treturn Point.X
}

func (Point *Point) SetX(val int) {
\tPoint.X = val
}

func (Point *Point) GetY() int {
\treturn Point.Y
}

func (Point *Point) SetY(val int) {
\tPoint.Y = val
}
";
    assert_eq!(fs::read_to_string(out_path).expect("output"), want);
}

#[test]
fn imported_package_gets_an_alias() {
    let dir = module(&[
        ("otherpkg/widget.go", "package otherpkg\n\ntype Widget struct{}\n"),
        (
            "shape.go",
            "package geo\n\nimport \"example.com/geo/otherpkg\"\n\ntype Shape struct {\n\tW *otherpkg.Widget\n\tOrigin Point\n}\n",
        ),
    ]);
    let config = Config::new(dir.path().join("shape.go"));
    let text = generate_file(&config, &lookup()).expect("generates");

    assert!(text.contains("import (\n\totherpkg \"example.com/geo/otherpkg\"\n)\n"));
    assert!(text.contains("func (Shape *Shape) GetW() *otherpkg.Widget {\n"));
    assert!(text.contains("func (Shape *Shape) SetW(val *otherpkg.Widget) {\n"));
    // Same-package types stay unqualified and are not imported.
    assert!(text.contains("func (Shape *Shape) GetOrigin() Point {\n"));
    assert!(!text.contains("\"example.com/geo\""));
}

#[test]
fn colliding_path_bases_are_suffixed() {
    let dir = module(&[(
        "versions.go",
        "package geo\n\nimport (\n\tav1 \"example.com/a/v1\"\n\tbv1 \"example.com/b/v1\"\n)\n\ntype Versions struct {\n\tA av1.Thing\n\tB bv1.Thing\n}\n",
    )]);
    let config = Config::new(dir.path().join("versions.go"));
    let text = generate_file(&config, &lookup()).expect("generates");

    assert!(text.contains("\tv1 \"example.com/a/v1\"\n\tv10 \"example.com/b/v1\"\n"));
    assert!(text.contains("GetA() v1.Thing {"));
    assert!(text.contains("GetB() v10.Thing {"));
}

#[test]
fn inline_struct_field_fails_without_writing() {
    let dir = module(&[(
        "bad.go",
        "package geo\n\ntype Bad struct {\n\tInner struct{ A int }\n}\n",
    )]);
    let config = Config::new(dir.path().join("bad.go"));

    let err = generate_file(&config, &lookup()).expect_err("unsupported");
    assert!(matches!(err, Error::UnsupportedTypeShape { .. }));
    assert!(err.to_string().ends_with("bad.go:4:8: can't handle non-empty unnamed struct types"));
    assert!(!dir.path().join("bad_getter_setter.go").exists());
}

#[test]
fn output_is_deterministic() {
    let src = "package geo\n\nimport (\n\t\"example.com/z/sort\"\n\t\"example.com/a/sort2\"\n\tyaml \"gopkg.in/yaml.v2\"\n)\n\ntype Doc struct {\n\tZ []sort.Key\n\tA map[sort2.K]yaml.Node\n}\n";
    let dir = module(&[("doc.go", src)]);
    let config = Config::new(dir.path().join("doc.go"));

    let first = generate_file(&config, &lookup()).expect("generates");
    let second = generate_file(&config, &lookup()).expect("generates");
    assert_eq!(first, second);
    assert!(first.contains(
        "\tsort2 \"example.com/a/sort2\"\n\tsort \"example.com/z/sort\"\n\tyaml_v2 \"gopkg.in/yaml.v2\"\n"
    ));
}

#[test]
fn override_rebinds_a_file_import() {
    let dir = module(&[(
        "legacy.go",
        "package geo\n\nimport \"example.com/legacy/otherpkg\"\n\ntype L struct {\n\tW otherpkg.Widget\n}\n",
    )]);
    let overrides = ImportOverrides::parse("otherpkg=example.com/next/otherpkg,.=example.com/dsl")
        .expect("valid overrides");
    let config = Config::new(dir.path().join("legacy.go"))
        .with_imports(overrides)
        .with_output(OutputTarget::File(dir.path().join("out.go")));

    let text = generate_file(&config, &lookup()).expect("generates");
    assert!(text.contains("\totherpkg \"example.com/next/otherpkg\"\n\t. \"example.com/dsl\"\n"));
    assert!(!text.contains("legacy"));

    write_output(&config, &text).expect("writes");
    assert!(dir.path().join("out.go").exists());
}

#[test]
fn missing_source_is_unreadable() {
    let config = Config::new(Path::new("/definitely/not/here.go"));
    let err = generate_file(&config, &lookup()).expect_err("missing");
    assert!(matches!(err, Error::SourceUnreadable { .. }));
}

#[test]
fn syntax_errors_name_the_file() {
    let dir = module(&[("broken.go", "package geo\n\ntype T struct {\n\tX int int\n}\n")]);
    let config = Config::new(dir.path().join("broken.go"));
    match generate_file(&config, &lookup()) {
        Err(Error::Syntax { diags }) => {
            assert_eq!(diags.len(), 1);
            assert!(diags[0].ends_with("broken.go:4:8: expected ';', found name int"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
