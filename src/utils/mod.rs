pub mod config;

pub mod paths {
    use crate::errors::DepGraphError;
    use regex::Regex;
    use std::path::Path;
    use std::sync::LazyLock;

    static MODULE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("module name regex is valid")
    });

    const RESERVED_NAMES: [&str; 22] = [
        "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7",
        "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
    ];

    /// Convert any path to a posix path.
    #[must_use]
    pub fn normalize_path(path: &str) -> String {
        path.replace('\\', "/")
    }

    /// Posix path of `path` relative to `root`, `"."` for the root itself.
    #[must_use]
    pub fn relative_posix(root: &Path, path: &Path) -> String {
        let rel = path.strip_prefix(root).unwrap_or(path);
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(os) => Some(os.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        }
    }

    /// Directory part of a posix relative path, `"."` when there is none.
    #[must_use]
    pub fn parent_dir(rel_path: &str) -> String {
        match rel_path.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir.to_string(),
            _ => ".".to_string(),
        }
    }

    /// Convert a path to a Python file or package directory into a dotted module name.
    ///
    /// With `strict_names` an invalid component is an error; otherwise it is logged
    /// and the name is produced anyway.
    ///
    /// # Errors
    /// Returns `DepGraphError::InvalidModuleName` for an empty path, or for any
    /// invalid component when `strict_names` is set.
    pub fn path_to_module(path: &str, strict_names: bool) -> Result<String, DepGraphError> {
        let norm = normalize_path(path);
        let norm = norm.strip_suffix(".py").unwrap_or(&norm);
        let norm = norm.strip_prefix('/').unwrap_or(norm);
        if norm.is_empty() {
            return Err(DepGraphError::InvalidModuleName {
                path: path.to_string(),
                reason: "empty path".to_string(),
            });
        }
        if norm == "." {
            return Ok(norm.to_string());
        }
        // Dotted components are rejected regardless of `strict_names`.
        if norm.contains('.') {
            return Err(DepGraphError::InvalidModuleName {
                path: path.to_string(),
                reason: "path contains '.'".to_string(),
            });
        }
        if let Err(reason) = validate_module_path(norm) {
            if strict_names {
                return Err(DepGraphError::InvalidModuleName { path: path.to_string(), reason });
            }
            tracing::warn!(path, %reason, "invalid module path, continuing because strict_names is off");
        }
        Ok(norm.replace('/', "."))
    }

    fn validate_module_path(norm: &str) -> Result<(), String> {
        for component in norm.split('/') {
            if component.is_empty() {
                return Err("empty path component".to_string());
            }
            if component.chars().any(|c| c.is_ascii_control()) {
                return Err(format!("control character in module name: '{component}'"));
            }
            if component.len() > 255 {
                return Err(format!("module name component too long: '{component}'"));
            }
            if component.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(format!("module name cannot start with a number: '{component}'"));
            }
            if !MODULE_NAME_RE.is_match(component) {
                return Err(format!("invalid module name component: '{component}'"));
            }
            if RESERVED_NAMES.contains(&component.to_ascii_lowercase().as_str()) {
                return Err(format!("reserved Windows name: '{component}'"));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn normalize_path_cases() {
            assert_eq!(normalize_path(r"C:\path\to\file"), "C:/path/to/file");
            assert_eq!(normalize_path("path\\with/mixed\\separators"), "path/with/mixed/separators");
            assert_eq!(normalize_path(""), "");
            assert_eq!(normalize_path("\\"), "/");
            assert_eq!(normalize_path("path/with/../dotdot"), "path/with/../dotdot");
        }

        #[test]
        fn parent_dir_cases() {
            assert_eq!(parent_dir("a/b/c.py"), "a/b");
            assert_eq!(parent_dir("c.py"), ".");
            assert_eq!(parent_dir("."), ".");
        }

        #[test]
        fn path_to_module_cases() {
            let ok = |p: &str| path_to_module(p, true).unwrap();
            assert_eq!(ok("module/submodule/file.py"), "module.submodule.file");
            assert_eq!(ok(r"module\submodule\file.py"), "module.submodule.file");
            assert_eq!(ok("file.py"), "file");
            assert_eq!(ok("file"), "file");
            assert_eq!(ok("/absolute/path/to/module.py"), "absolute.path.to.module");
            assert_eq!(ok("module/submodule/__init__.py"), "module.submodule.__init__");
            assert_eq!(ok("."), ".");
        }

        #[test]
        fn path_to_module_rejects_invalid_names() {
            for p in [
                "module/submodule/file.name.with.dots.py",
                "module.with.dots/file.py",
                "file.tar.gz",
                ".../file.py",
                "module/.hidden/file.py",
                "file.pyc",
                ".file.py",
                "./file.py",
                "pkg/1st.py",
                "pkg/con.py",
                "pkg/has-dash.py",
            ] {
                assert!(path_to_module(p, true).is_err(), "expected error for {p}");
            }
            assert!(path_to_module("", false).is_err());
        }

        #[test]
        fn path_to_module_lenient_keeps_going() {
            assert_eq!(path_to_module("pkg/has-dash.py", false).unwrap(), "pkg.has-dash");
            assert_eq!(path_to_module("pkg/1st.py", false).unwrap(), "pkg.1st");
        }

        #[test]
        fn path_to_module_dots_fail_even_when_lenient() {
            for p in ["pkg/file.name.py", "pkg.v2/file.py", "pkg/.hidden/file.py"] {
                let err = path_to_module(p, false).unwrap_err();
                assert!(err.to_string().contains("contains '.'"), "unexpected error for {p}: {err}");
            }
        }
    }
}

pub mod file_walker {
    use super::paths::relative_posix;
    use crate::errors::DepGraphError;
    use std::collections::BTreeSet;
    use std::path::Path;

    /// Discover Python files under `root` as sorted posix paths relative to `root`.
    ///
    /// `.gitignore`/`.ignore` rules are honoured unless `no_ignore` is set; hidden
    /// entries are always skipped.
    ///
    /// # Errors
    /// Returns `DepGraphError::NotFound` if `root` does not exist.
    pub fn python_files_with_options(
        root: &Path,
        no_ignore: bool,
    ) -> Result<Vec<String>, DepGraphError> {
        if !root.exists() {
            return Err(DepGraphError::NotFound { path: root.to_path_buf() });
        }
        let mut walker = ignore::WalkBuilder::new(root);
        walker
            .follow_links(false)
            .hidden(true)
            .git_ignore(!no_ignore)
            .git_global(false)
            .git_exclude(false)
            .ignore(!no_ignore)
            .require_git(false)
            .parents(!no_ignore);
        let mut out = Vec::new();
        for entry in walker.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_file())
                && entry.path().extension() == Some(std::ffi::OsStr::new("py"))
            {
                out.push(relative_posix(root, entry.path()));
            }
        }
        out.sort();
        Ok(out)
    }

    /// Same as [`python_files_with_options`] with ignore rules on.
    ///
    /// # Errors
    /// Returns `DepGraphError::NotFound` if `root` does not exist.
    pub fn python_files(root: &Path) -> Result<Vec<String>, DepGraphError> {
        python_files_with_options(root, false)
    }

    /// Every directory that holds a Python file, plus all of its ancestors up to `"."`.
    ///
    /// Empty when the tree has no Python files at all.
    ///
    /// # Errors
    /// Returns `DepGraphError::NotFound` if `root` does not exist.
    pub fn relevant_directories(
        root: &Path,
        no_ignore: bool,
    ) -> Result<BTreeSet<String>, DepGraphError> {
        let files = python_files_with_options(root, no_ignore)?;
        Ok(directories_of(&files))
    }

    #[must_use]
    pub fn directories_of(files: &[String]) -> BTreeSet<String> {
        let mut dirs = BTreeSet::new();
        for file in files {
            let mut dir = super::paths::parent_dir(file);
            while dir != "." {
                let next = super::paths::parent_dir(&dir);
                dirs.insert(dir);
                dir = next;
            }
            dirs.insert(".".to_string());
        }
        dirs
    }
}
