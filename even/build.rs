// Rejects lint-suppression attributes ("#[" + "allow" + ...) anywhere in the
// crate's Rust sources, tests and benches. Set CHECK_NO_ALLOW=0 to skip.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CHECKED_DIRS: [&str; 3] = ["src", "tests", "benches"];

struct Violation {
    file: PathBuf,
    line: usize,
    content: String,
}

fn main() {
    println!("cargo:rerun-if-env-changed=CHECK_NO_ALLOW");
    if env::var("CHECK_NO_ALLOW").is_ok_and(|v| v == "0") {
        return;
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let mut violations = Vec::new();
    for dir in CHECKED_DIRS {
        let path = manifest_dir.join(dir);
        if path.exists() {
            println!("cargo:rerun-if-changed={}", path.display());
            scan(&path, &mut violations);
        }
    }

    if violations.is_empty() {
        return;
    }

    eprintln!("ERROR: lint suppression attributes found in even:");
    for violation in &violations {
        eprintln!(
            "  {}:{}: {}",
            violation.file.display(),
            violation.line,
            violation.content.trim()
        );
    }
    panic!("lint suppression attributes are forbidden");
}

fn scan(path: &Path, violations: &mut Vec<Violation>) {
    if path.is_dir() {
        if path.ends_with("target") {
            return;
        }
        for entry in fs::read_dir(path).expect("read dir") {
            scan(&entry.expect("dir entry").path(), violations);
        }
        return;
    }

    if path.extension().map_or(true, |ext| ext != "rs") {
        return;
    }

    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let needle = concat!("#", "[allow");
    let inner_needle = concat!("#", "![allow");
    violations.extend(
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(needle) || line.contains(inner_needle))
            .map(|(idx, line)| Violation {
                file: path.to_path_buf(),
                line: idx + 1,
                content: line.to_owned(),
            }),
    );
}
