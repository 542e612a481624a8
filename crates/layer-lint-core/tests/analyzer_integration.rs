//! Discovery and orchestration against real directories.

use layer_lint_core::{
    display_path, Analyzer, AnalyzerError, Location, Policy, Rule, RuleContext, RuleId, Severity,
    Violation,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Reports every discovered path once, so tests can see what was scanned.
struct Inventory;

impl Rule for Inventory {
    fn id(&self) -> RuleId {
        RuleId::ForbiddenPath
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        ctx.graph
            .inventory()
            .iter()
            .map(|p| self.id().violation(Severity::Info, Location::path(p), "seen"))
            .collect()
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seen(result: &layer_lint_core::LintResult) -> Vec<String> {
    result
        .violations
        .iter()
        .filter(|v| v.message == "seen")
        .map(|v| display_path(&v.location.file))
        .collect()
}

fn scan(root: &Path, policy: Policy) -> layer_lint_core::LintResult {
    Analyzer::builder()
        .project_root(root)
        .policy(policy)
        .rule(Inventory)
        .build()
        .unwrap()
        .analyze()
}

#[test]
fn discovers_source_files_only() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/core/a.ts", "");
    write(dir.path(), "src/core/b.tsx", "");
    write(dir.path(), "src/core/readme.md", "");
    write(dir.path(), "src/core/data.json", "{}");
    write(dir.path(), "lib/outside.ts", "");

    let result = scan(dir.path(), Policy::builtin().unwrap());
    assert_eq!(seen(&result), ["src/core/a.ts", "src/core/b.tsx"]);
    assert_eq!(result.files_checked, 2);
}

#[test]
fn ignore_dirs_are_skipped_at_any_depth() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/app/main.ts", "");
    write(dir.path(), "src/node_modules/pkg/index.js", "");
    write(dir.path(), "src/modules/cart/dist/bundle.js", "");
    write(dir.path(), "src/modules/cart/ui.ts", "");

    let result = scan(dir.path(), Policy::builtin().unwrap());
    assert_eq!(seen(&result), ["src/app/main.ts", "src/modules/cart/ui.ts"]);
}

#[test]
fn gitignore_is_respected_without_a_repository() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/.gitignore", "generated/\n");
    write(dir.path(), "src/generated/api.ts", "");
    write(dir.path(), "src/core/a.ts", "");

    let result = scan(dir.path(), Policy::builtin().unwrap());
    assert_eq!(seen(&result), ["src/core/a.ts"]);

    let policy = Policy::from_toml_str("[analyzer]\nrespect_gitignore = false\n").unwrap();
    let result = scan(dir.path(), policy);
    assert_eq!(seen(&result), ["src/core/a.ts", "src/generated/api.ts"]);
}

#[test]
fn policy_and_builder_excludes_combine() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/core/a.ts", "");
    write(dir.path(), "src/core/a.test.ts", "");
    write(dir.path(), "src/legacy/old.ts", "");

    let policy = Policy::from_toml_str("[analyzer]\nexclude = [\"**/*.test.ts\"]\n").unwrap();
    let result = Analyzer::builder()
        .project_root(dir.path())
        .policy(policy)
        .exclude("src/legacy/**")
        .rule(Inventory)
        .build()
        .unwrap()
        .analyze();
    assert_eq!(seen(&result), ["src/core/a.ts"]);
}

#[test]
fn source_root_override() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/core/a.ts", "");
    write(dir.path(), "web/src/core/b.ts", "");

    let result = Analyzer::builder()
        .project_root(dir.path())
        .source_root("web")
        .rule(Inventory)
        .build()
        .unwrap()
        .analyze();
    assert_eq!(seen(&result), ["web/src/core/b.ts"]);
}

#[test]
fn missing_source_root_names_the_directory() {
    let dir = TempDir::new().unwrap();
    let err = Analyzer::builder()
        .project_root(dir.path())
        .source_root("app")
        .build()
        .err()
        .unwrap();
    match err {
        AnalyzerError::MissingRoot { path } => assert!(path.ends_with("app")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn undecodable_file_becomes_an_io_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/core/a.ts", "import { b } from './b';\n");
    fs::write(dir.path().join("src/core/b.ts"), b"\xc3\x28").unwrap();

    let result = Analyzer::builder()
        .project_root(dir.path())
        .build()
        .unwrap()
        .analyze();

    assert_eq!(result.violations.len(), 1);
    let v = &result.violations[0];
    assert_eq!(v.code, "LL900");
    assert_eq!(v.rule, "io-error");
    assert_eq!(v.location.to_string(), "src/core/b.ts");
    assert_eq!(result.files_checked, 2);
    assert_eq!(result.edges_checked, 1);
}

#[test]
fn graph_is_independent_of_path_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/core/a.ts", "import { b } from './b';\nimport '@shared/c';\n");
    write(dir.path(), "src/core/b.ts", "export * from '../app/x';\n");
    write(dir.path(), "src/shared/c.ts", "");
    write(dir.path(), "src/app/x.ts", "");

    let analyzer = Analyzer::builder().project_root(dir.path()).build().unwrap();
    let mut paths: Vec<String> = ["src/core/a.ts", "src/core/b.ts", "src/shared/c.ts", "src/app/x.ts"]
        .map(String::from)
        .to_vec();
    let forward = analyzer.build_graph(paths.clone());
    paths.reverse();
    let backward = analyzer.build_graph(paths);

    let describe = |g: &layer_lint_core::Graph| {
        g.edges()
            .map(|(f, e)| format!("{} -> {} ({})", f.path, e.target.layer, e.specifier))
            .collect::<Vec<_>>()
    };
    assert_eq!(describe(&forward), describe(&backward));
    assert_eq!(
        describe(&forward),
        [
            "src/core/a.ts -> core (./b)",
            "src/core/a.ts -> shared (@shared/c)",
            "src/core/b.ts -> app (../app/x)",
        ]
    );
}
