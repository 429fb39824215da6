//! Package resolution: mapping directories to import paths and import paths
//! to declared package names.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use gogetset_parser::parse_package_clause;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Answers the two questions the builder and resolver ask about packages.
pub trait PackageLookup {
    /// Import path of the package that lives in `dir`.
    fn import_path_for_dir(&self, dir: &Path) -> Option<String>;

    /// Declared name of the package at `import_path`, as seen from `from_dir`.
    fn package_name(&self, import_path: &str, from_dir: &Path) -> Option<String>;
}

/// Lookup backed by the filesystem, following Go module layout.
///
/// Search order for an import path: the main module, its `vendor/`
/// directory, `$GOROOT/src`, then each `$GOPATH/src`.
#[derive(Debug, Clone, Default)]
pub struct GoModuleLookup {
    goroot: Option<PathBuf>,
    gopath: Vec<PathBuf>,
}

/// A module found by walking up from a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub root: PathBuf,
    pub path: String,
}

impl GoModuleLookup {
    pub fn new(goroot: Option<PathBuf>, gopath: Vec<PathBuf>) -> Self {
        Self { goroot, gopath }
    }

    /// Reads `GOROOT` and `GOPATH`, defaulting the latter to `~/go`.
    pub fn from_env() -> Self {
        let goroot = std::env::var_os("GOROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let mut gopath: Vec<PathBuf> = std::env::var_os("GOPATH")
            .map(|v| std::env::split_paths(&v).collect())
            .unwrap_or_default();
        if gopath.is_empty() {
            if let Some(home) = std::env::var_os("HOME") {
                gopath.push(PathBuf::from(home).join("go"));
            }
        }
        debug!(?goroot, ?gopath, "package lookup roots");
        Self::new(goroot, gopath)
    }

    /// Nearest enclosing module of `dir`.
    pub fn find_module(dir: &Path) -> Option<Module> {
        dir.ancestors().find_map(|candidate| {
            let text = fs::read_to_string(candidate.join("go.mod")).ok()?;
            let path = read_module_path(&text)?;
            Some(Module {
                root: candidate.to_path_buf(),
                path,
            })
        })
    }

    fn dir_for_import(&self, import_path: &str, from_dir: &Path) -> Option<PathBuf> {
        let rel = slash_path(import_path)?;
        let mut candidates = Vec::new();

        if let Some(module) = Self::find_module(from_dir) {
            if import_path == module.path {
                candidates.push(module.root.clone());
            } else if let Some(rest) = import_path
                .strip_prefix(&module.path)
                .and_then(|r| r.strip_prefix('/'))
            {
                candidates.extend(slash_path(rest).map(|r| module.root.join(r)));
            }
            candidates.push(module.root.join("vendor").join(&rel));
        }
        if let Some(goroot) = &self.goroot {
            candidates.push(goroot.join("src").join(&rel));
        }
        candidates.extend(self.gopath.iter().map(|p| p.join("src").join(&rel)));

        let found = candidates.into_iter().find(|c| c.is_dir());
        trace!(import_path, ?found, "located import");
        found
    }
}

impl PackageLookup for GoModuleLookup {
    fn import_path_for_dir(&self, dir: &Path) -> Option<String> {
        if let Some(module) = Self::find_module(dir) {
            let rel = dir.strip_prefix(&module.root).ok()?;
            return Some(join_import_path(&module.path, rel));
        }
        // GOPATH mode: the path below `src/` is the import path.
        self.gopath.iter().find_map(|root| {
            let rel = dir.strip_prefix(root.join("src")).ok()?;
            let path = join_import_path("", rel);
            (!path.is_empty()).then_some(path)
        })
    }

    fn package_name(&self, import_path: &str, from_dir: &Path) -> Option<String> {
        let dir = self.dir_for_import(import_path, from_dir)?;
        package_name_in_dir(&dir)
    }
}

/// In-memory lookup, for callers that already know the answers.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    import_path: Option<String>,
    packages: BTreeMap<String, String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import path reported for every directory.
    #[must_use]
    pub fn with_import_path(mut self, path: impl Into<String>) -> Self {
        self.import_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_package(mut self, import_path: impl Into<String>, name: impl Into<String>) -> Self {
        self.packages.insert(import_path.into(), name.into());
        self
    }
}

impl PackageLookup for StaticLookup {
    fn import_path_for_dir(&self, _dir: &Path) -> Option<String> {
        self.import_path.clone()
    }

    fn package_name(&self, import_path: &str, _from_dir: &Path) -> Option<String> {
        self.packages.get(import_path).cloned()
    }
}

/// Extracts the module path from the text of a `go.mod` file.
pub fn read_module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '`') {
            return None;
        }
        let path = rest.trim().trim_matches(|c: char| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_owned())
    })
}

/// Package name declared by the first non-test `.go` file in `dir`.
pub fn package_name_in_dir(dir: &Path) -> Option<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.ends_with(".go") && !name.ends_with("_test.go")
        })
        .find_map(|entry| {
            let text = fs::read_to_string(entry.path()).ok()?;
            parse_package_clause(&text)
        })
}

fn join_import_path(base: &str, rel: &Path) -> String {
    let mut out = base.to_owned();
    for comp in rel.components() {
        if let Component::Normal(part) = comp {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

/// Converts a slash-separated import path into a relative filesystem path,
/// rejecting anything that could escape the search root.
fn slash_path(import_path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for part in import_path.split('/') {
        if part.is_empty() || part == "." || part == ".." {
            return None;
        }
        out.push(part);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_directive_forms() {
        assert_eq!(
            read_module_path("// comment\nmodule example.com/geo\n\ngo 1.22\n"),
            Some("example.com/geo".to_owned())
        );
        assert_eq!(
            read_module_path("module \"example.com/quoted\" // trailing\n"),
            Some("example.com/quoted".to_owned())
        );
        assert_eq!(read_module_path("modules are not this\n"), None);
        assert_eq!(read_module_path("go 1.22\n"), None);
    }

    #[test]
    fn import_paths_join_with_slashes() {
        assert_eq!(
            join_import_path("example.com/m", Path::new("a/b")),
            "example.com/m/a/b"
        );
        assert_eq!(join_import_path("example.com/m", Path::new("")), "example.com/m");
        assert_eq!(slash_path("../etc"), None);
        assert_eq!(slash_path("a//b"), None);
    }

    #[test]
    fn static_lookup_answers_from_its_tables() {
        let lookup = StaticLookup::new()
            .with_import_path("example.com/geo")
            .with_package("gopkg.in/yaml.v2", "yaml");
        let dir = Path::new("/anywhere");
        assert_eq!(lookup.import_path_for_dir(dir).as_deref(), Some("example.com/geo"));
        assert_eq!(lookup.package_name("gopkg.in/yaml.v2", dir).as_deref(), Some("yaml"));
        assert_eq!(lookup.package_name("fmt", dir), None);
    }
}
