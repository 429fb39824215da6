//! Binding of local package names to import paths.

use std::collections::BTreeMap;
use std::path::Path;

use gogetset_parser::ParsedFile;
use gogetset_parser::ast::ImportName;
use tracing::debug;

use crate::config::ImportOverrides;
use crate::error::{Error, Result};
use crate::locate::PackageLookup;

/// Local package names in scope for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    by_name: BTreeMap<String, String>,
    dot_imports: Vec<String>,
}

impl ImportMap {
    /// Import path bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn dot_imports(&self) -> &[String] {
        &self.dot_imports
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Binds `name`, failing if it is already taken.
    fn bind(&mut self, name: String, path: String) -> Result<()> {
        if let Some(first) = self.by_name.get(&name) {
            return Err(Error::AmbiguousImport {
                name,
                first: first.clone(),
                second: path,
            });
        }
        self.by_name.insert(name, path);
        Ok(())
    }

    fn push_dot(&mut self, path: &str) {
        if !self.dot_imports.iter().any(|p| p == path) {
            self.dot_imports.push(path.to_owned());
        }
    }
}

pub struct ImportResolver<'a> {
    lookup: &'a dyn PackageLookup,
    src_dir: &'a Path,
}

impl<'a> ImportResolver<'a> {
    pub fn new(lookup: &'a dyn PackageLookup, src_dir: &'a Path) -> Self {
        Self { lookup, src_dir }
    }

    /// The file's own imports, without overrides.
    pub fn file_imports(&self, file: &ParsedFile) -> Result<ImportMap> {
        let mut map = ImportMap::default();
        for spec in file.imports() {
            let path = file.name(spec.path.value);
            let name = match spec.name {
                Some(ImportName::Blank(_)) => continue,
                Some(ImportName::Dot(_)) => {
                    map.push_dot(path);
                    continue;
                }
                Some(ImportName::Name(sym, _)) => file.name(sym).to_owned(),
                None => match self.lookup.package_name(path, self.src_dir) {
                    Some(name) => name,
                    None => {
                        let guess = guess_package_name(path);
                        debug!(path, name = %guess, "package not found, guessing name from path");
                        guess
                    }
                },
            };
            map.bind(name, path.to_owned())?;
        }
        Ok(map)
    }

    /// Merges command-line overrides with the file's imports.
    ///
    /// An override shadows a file import of the same name. Dot imports
    /// from the file come first.
    pub fn resolve(&self, file: &ParsedFile, overrides: &ImportOverrides) -> Result<ImportMap> {
        let mut map = ImportMap::default();
        for (name, path) in overrides.named() {
            map.bind(name.clone(), path.clone())?;
        }

        let own = self.file_imports(file)?;
        for (name, path) in own.by_name {
            match map.by_name.get(&name) {
                Some(kept) => debug!(%name, %path, %kept, "file import shadowed by override"),
                None => {
                    map.by_name.insert(name, path);
                }
            }
        }
        for path in own.dot_imports.iter().chain(overrides.dots()) {
            map.push_dot(path);
        }

        debug!(
            named = map.len(),
            dots = map.dot_imports.len(),
            "resolved imports"
        );
        Ok(map)
    }
}

/// Best guess at the name a package declares: the last path element,
/// up to its first `.`.
pub fn guess_package_name(import_path: &str) -> String {
    let last = import_path.rsplit('/').next().unwrap_or(import_path);
    last.split('.').next().unwrap_or(last).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::StaticLookup;
    use gogetset_parser::parse_source;

    fn parsed(src: &str) -> ParsedFile {
        match parse_source(src) {
            Ok(file) => file,
            Err(failure) => panic!("parse failed: {:?}", failure.diags),
        }
    }

    #[test]
    fn guesses_from_last_element() {
        assert_eq!(guess_package_name("gopkg.in/yaml.v2"), "yaml");
        assert_eq!(guess_package_name("example.com/otherpkg"), "otherpkg");
        assert_eq!(guess_package_name("fmt"), "fmt");
    }

    #[test]
    fn alias_dot_and_blank_imports() {
        let file = parsed(
            "package p\n\nimport (\n\ty \"gopkg.in/yaml.v2\"\n\t. \"example.com/dsl\"\n\t_ \"embed\"\n\t\"example.com/widgets\"\n)\n",
        );
        let lookup = StaticLookup::new().with_package("example.com/widgets", "wdg");
        let map = ImportResolver::new(&lookup, Path::new("."))
            .file_imports(&file)
            .expect("no collisions");

        assert_eq!(map.get("y"), Some("gopkg.in/yaml.v2"));
        assert_eq!(map.get("wdg"), Some("example.com/widgets"));
        assert_eq!(map.get("widgets"), None);
        assert_eq!(map.get("_"), None);
        assert_eq!(map.dot_imports(), &["example.com/dsl".to_owned()]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn same_name_twice_is_ambiguous() {
        let file = parsed("package p\nimport (\n\t\"html/template\"\n\t\"text/template\"\n)\n");
        let lookup = StaticLookup::new();
        let err = ImportResolver::new(&lookup, Path::new("."))
            .file_imports(&file)
            .expect_err("collision");
        match err {
            Error::AmbiguousImport { name, first, second } => {
                assert_eq!(name, "template");
                assert_eq!(first, "html/template");
                assert_eq!(second, "text/template");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn overrides_take_precedence() {
        let file = parsed(
            "package p\nimport (\n\t\"example.com/v1/otherpkg\"\n\t. \"example.com/dsl\"\n\t\"fmt\"\n)\n",
        );
        let overrides = ImportOverrides::parse("otherpkg=example.com/v2/otherpkg,.=example.com/more")
            .expect("valid overrides");
        let lookup = StaticLookup::new();
        let map = ImportResolver::new(&lookup, Path::new("."))
            .resolve(&file, &overrides)
            .expect("resolves");

        assert_eq!(map.get("otherpkg"), Some("example.com/v2/otherpkg"));
        assert_eq!(map.get("fmt"), Some("fmt"));
        assert_eq!(
            map.dot_imports(),
            &["example.com/dsl".to_owned(), "example.com/more".to_owned()]
        );
    }

    #[test]
    fn repeated_override_name_is_ambiguous() {
        let file = parsed("package p\n");
        let overrides = ImportOverrides::parse("a=x/one,a=x/two").expect("valid overrides");
        let lookup = StaticLookup::new();
        let err = ImportResolver::new(&lookup, Path::new("."))
            .resolve(&file, &overrides)
            .expect_err("collision");
        assert!(matches!(err, Error::AmbiguousImport { ref name, .. } if name == "a"));
    }
}
