use dep_graph_viz::errors::DepGraphError;
use dep_graph_viz::utils::file_walker::{python_files, python_files_with_options, relevant_directories};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(p, body).unwrap();
}

#[test]
fn lists_python_files_relative_and_sorted() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "b.py", "");
    write(root, "a.py", "");
    write(root, "pkg/__init__.py", "");
    write(root, "pkg/deep/x.py", "");
    write(root, "README.md", "");
    write(root, "pkg/data.pyc", "");

    let files = python_files(root).unwrap();
    assert_eq!(files, vec!["a.py", "b.py", "pkg/__init__.py", "pkg/deep/x.py"]);
}

#[test]
fn relevant_directories_include_all_ancestors() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "a/b/c/mod.py", "");
    write(root, "empty/notes.txt", "");

    let dirs: Vec<String> = relevant_directories(root, false).unwrap().into_iter().collect();
    assert_eq!(dirs, vec![".", "a", "a/b", "a/b/c"]);
}

#[test]
fn no_python_files_means_no_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "notes.txt", "");
    assert!(relevant_directories(dir.path(), false).unwrap().is_empty());
}

#[test]
fn ignores_files_listed_in_gitignore_unless_no_ignore() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".gitignore", "build/\ngenerated.py\n");
    write(root, "kept.py", "");
    write(root, "generated.py", "");
    write(root, "build/out.py", "");

    let files = python_files_with_options(root, false).unwrap();
    assert_eq!(files, vec!["kept.py"]);

    let all = python_files_with_options(root, true).unwrap();
    assert_eq!(all, vec!["build/out.py", "generated.py", "kept.py"]);
}

#[test]
fn nested_ignore_file_in_subdir() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "a/.ignore", "skip.py\n");
    write(root, "a/keep.py", "");
    write(root, "a/skip.py", "");

    let files = python_files(root).unwrap();
    assert_eq!(files, vec!["a/keep.py"]);
}

#[test]
fn hidden_entries_are_always_skipped() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".venv/lib/site.py", "");
    write(root, ".hidden.py", "");
    write(root, "visible.py", "");

    assert_eq!(python_files_with_options(root, true).unwrap(), vec!["visible.py"]);
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let err = python_files(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, DepGraphError::NotFound { .. }));
}
