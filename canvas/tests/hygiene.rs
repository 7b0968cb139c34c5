//! Hygiene: source-level budgets for the whole workspace.
//!
//! Each production tree (editor core, diagram store, CLI) gets a budget per
//! pattern. A budget only ever goes down; fix an existing hit before adding
//! a new one. Sibling `*_test.rs` files are not scanned.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy)]
enum Tree {
    Canvas,
    Store,
    Cli,
}

impl Tree {
    const ALL: [Tree; 3] = [Tree::Canvas, Tree::Store, Tree::Cli];

    fn name(self) -> &'static str {
        match self {
            Tree::Canvas => "canvas",
            Tree::Store => "diagramlab",
            Tree::Cli => "diagram-cli",
        }
    }

    fn root(self) -> PathBuf {
        let canvas = Path::new(env!("CARGO_MANIFEST_DIR"));
        match self {
            Tree::Canvas => canvas.join("src"),
            Tree::Store => canvas.join("../src"),
            Tree::Cli => canvas.join("../cli/src"),
        }
    }
}

/// A pattern and its budget in each tree, ordered like `Tree::ALL`.
struct Rule {
    pattern: &'static str,
    budgets: [usize; 3],
    hint: &'static str,
}

const PANICS: &[Rule] = &[
    Rule { pattern: ".unwrap()", budgets: [0, 0, 0], hint: "propagate with ? or match" },
    Rule { pattern: ".expect(", budgets: [0, 0, 0], hint: "propagate with ? or match" },
    Rule { pattern: "panic!(", budgets: [0, 0, 0], hint: "return an error" },
    Rule { pattern: "unreachable!(", budgets: [0, 0, 0], hint: "make the state unrepresentable" },
    Rule { pattern: "todo!(", budgets: [0, 0, 0], hint: "finish the stub" },
    Rule { pattern: "unimplemented!(", budgets: [0, 0, 0], hint: "finish the stub" },
];

// The store's two `.ok()` calls turn an unset or unparsable env var into a default.
const SILENT_LOSS: &[Rule] = &[
    Rule { pattern: "let _ =", budgets: [0, 0, 0], hint: "inspect or log the result" },
    Rule { pattern: ".ok()", budgets: [0, 2, 0], hint: "inspect or log the error" },
];

// Lint escapes in the editor core: struct_excessive_bools on `Modifiers` and two numeric casts.
const LINT_ESCAPES: &[Rule] = &[
    Rule { pattern: "#[allow(dead_code)]", budgets: [0, 0, 0], hint: "delete unused code" },
    Rule { pattern: "#[allow(clippy::", budgets: [3, 0, 0], hint: "fix the lint instead" },
];

// Only the CLI talks to a terminal. The store prints once, before tracing is installed.
const STDIO: &[Rule] = &[
    Rule { pattern: "println!(", budgets: [0, 0, usize::MAX], hint: "use tracing" },
    Rule { pattern: "eprintln!(", budgets: [0, 1, usize::MAX], hint: "use tracing" },
];

fn collect_rs_files(dir: &Path, out: &mut Vec<(String, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.file_name().is_some_and(|n| n.to_string_lossy().ends_with("_test.rs"));
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path.to_string_lossy().into_owned(), content));
            }
        }
    }
}

fn production_files(tree: Tree) -> Vec<(String, String)> {
    let mut files = Vec::new();
    collect_rs_files(&tree.root(), &mut files);
    files.sort();
    files
}

/// Every rule over-budget in any tree, one line per offending file.
fn violations(rules: &[Rule]) -> Vec<String> {
    let mut report = Vec::new();
    for (slot, tree) in Tree::ALL.into_iter().enumerate() {
        let files = production_files(tree);
        for rule in rules {
            let hits: Vec<(&str, usize)> = files
                .iter()
                .map(|(path, content)| {
                    (path.as_str(), content.lines().filter(|line| line.contains(rule.pattern)).count())
                })
                .filter(|(_, count)| *count > 0)
                .collect();
            let found: usize = hits.iter().map(|(_, count)| count).sum();
            let budget = rule.budgets[slot];
            if found > budget {
                report.push(format!(
                    "{}: `{}` found {found}, budget {budget} ({})",
                    tree.name(),
                    rule.pattern,
                    rule.hint
                ));
                report.extend(hits.iter().map(|(path, count)| format!("    {path}: {count}")));
            }
        }
    }
    report
}

fn assert_within_budget(rules: &[Rule]) {
    let report = violations(rules);
    assert!(report.is_empty(), "hygiene budget exceeded:\n{}", report.join("\n"));
}

#[test]
fn every_tree_is_scanned() {
    for tree in Tree::ALL {
        assert!(
            !production_files(tree).is_empty(),
            "no sources found for {} under {}",
            tree.name(),
            tree.root().display()
        );
    }
}

#[test]
fn test_files_are_skipped() {
    let files = production_files(Tree::Canvas);
    assert!(files.iter().any(|(path, _)| path.ends_with("engine.rs")));
    assert!(!files.iter().any(|(path, _)| path.ends_with("_test.rs")));
}

#[test]
fn panic_budget() {
    assert_within_budget(PANICS);
}

#[test]
fn silent_loss_budget() {
    assert_within_budget(SILENT_LOSS);
}

#[test]
fn lint_escape_budget() {
    assert_within_budget(LINT_ESCAPES);
}

#[test]
fn stdio_budget() {
    assert_within_budget(STDIO);
}
