//! Emits getter/setter source for a [`FileModel`].

use std::collections::{BTreeMap, BTreeSet};

use gogetset_parser::{is_ident_continue, is_ident_start, is_keyword};
use tracing::debug;

use crate::error::Result;
use crate::format::format_source;
use crate::model::{FileModel, StructModel};

/// Turns the last element of an import path into a usable identifier.
pub fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let keep = if out.is_empty() {
            is_ident_start(c)
        } else {
            is_ident_continue(c)
        };
        out.push(if keep { c } else { '_' });
    }
    if out == "_" { "x".to_owned() } else { out }
}

/// Assigns a distinct local name to each import path.
///
/// Paths are visited in sorted order so the result is stable. A name that
/// is taken, `reserved` or a keyword gets `0`, `1`, ... appended.
pub fn assign_aliases(
    paths: &BTreeSet<String>,
    reserved: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    let mut taken = reserved.clone();
    let mut aliases = BTreeMap::new();
    for path in paths {
        let base = sanitize(path.rsplit('/').next().unwrap_or(path));
        let mut alias = base.clone();
        let mut i = 0u32;
        while taken.contains(&alias) || is_keyword(&alias) {
            alias = format!("{base}{i}");
            i += 1;
        }
        debug!(%path, %alias, "import alias");
        taken.insert(alias.clone());
        aliases.insert(path.clone(), alias);
    }
    aliases
}

/// Go double-quoted string literal for `s`.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub struct Generator {
    source_name: String,
}

impl Generator {
    /// `source_name` is recorded in the generated header.
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    /// Generated text before formatting.
    pub fn emit(&self, model: &FileModel) -> String {
        let declared = model.structs.iter().map(|s| s.name.clone()).collect();
        let aliases = assign_aliases(&model.imports(), &declared);
        let mut out = String::new();

        out.push_str("// Code generated by gogetset. DO NOT EDIT.\n");
        out.push_str(&format!("// Source: {}\n", self.source_name));
        out.push('\n');
        out.push_str(&format!("package {}\n", model.name));
        out.push('\n');

        out.push_str("import (\n");
        for (path, alias) in &aliases {
            if *path != model.import_path {
                out.push_str(&format!("\t{} {}\n", alias, go_quote(path)));
            }
        }
        for path in &model.dot_imports {
            out.push_str(&format!("\t. {}\n", go_quote(path)));
        }
        out.push_str(")\n");

        for s in &model.structs {
            self.emit_struct(&mut out, s, &aliases, &model.import_path);
        }
        out
    }

    fn emit_struct(
        &self,
        out: &mut String,
        s: &StructModel,
        aliases: &BTreeMap<String, String>,
        current: &str,
    ) {
        let t = &s.name;
        out.push('\n');
        out.push_str(&format!("// Getters and setters of {t}.\n"));
        for field in &s.fields {
            let f = &field.name;
            let ty = field.ty.render(aliases, current);

            out.push_str(&format!("func ({t} *{t}) Get{f}() {ty} {{\n"));
            out.push_str(&format!("\treturn {t}.{f}\n"));
            out.push_str("}\n\n");

            out.push_str(&format!("func ({t} *{t}) Set{f}(val {ty}) {{\n"));
            out.push_str(&format!("\t{t}.{f} = val\n"));
            out.push_str("}\n\n");
        }
    }

    /// Generated and formatted source.
    pub fn render(&self, model: &FileModel) -> Result<String> {
        let text = self.emit(model);
        Ok(format_source(&text)?)
    }
}
