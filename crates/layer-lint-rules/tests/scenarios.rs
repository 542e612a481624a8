//! End-to-end scenarios: real trees on disk, the full rule set.

use layer_lint_core::{Analyzer, LintResult, SourceReader};
use layer_lint_rules::all_rules;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A tree following the default layout, with `accounts` missing its store
/// and the `billing` store calling `fetch(` directly.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/shared/format.ts", "export const fmt = (n: number) => n.toFixed(2);\n");
    write(
        root,
        "src/core/price.ts",
        "import { fmt } from '@shared/format';\nexport const price = (n: number) => fmt(n);\n",
    );
    for module in ["accounts", "billing"] {
        write(root, &format!("src/modules/{module}/ui.ts"), "export const view = () => null;\n");
        write(
            root,
            &format!("src/modules/{module}/service.ts"),
            "import { price } from '@core/price';\nexport const total = (n: number) => price(n);\n",
        );
        write(
            root,
            &format!("src/modules/{module}/index.ts"),
            "export * from './ui';\nexport { total } from './service';\n",
        );
    }
    write(
        root,
        "src/modules/billing/store.ts",
        "export async function load() {\n  return fetch('/api/bills');\n}\n",
    );
    write(
        root,
        "src/app/main.ts",
        "import { view } from '@modules/accounts';\nimport '@modules/billing';\n",
    );
    dir
}

fn analyze(root: &Path) -> LintResult {
    Analyzer::builder()
        .project_root(root)
        .rules(all_rules())
        .build()
        .unwrap()
        .analyze()
}

fn compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn codes(result: &LintResult) -> Vec<&str> {
    result.violations.iter().map(|v| v.code.as_str()).collect()
}

#[test]
fn test_missing_store_and_store_network_call() {
    let dir = project();
    let result = analyze(dir.path());

    assert_eq!(result.files_checked, 10);
    insta::assert_snapshot!(compact(&result), @r"
    src/modules/accounts: error [LL003] module `accounts` is missing its `store` file
    src/modules/billing/store.ts:2:10: error [LL004] [store-no-network] store files must not perform network calls; move I/O into the module service (found `fetch(`)
    ");
}

#[test]
fn test_layer_and_module_boundaries() {
    let dir = project();
    write(
        dir.path(),
        "src/shared/routes.ts",
        "import { main } from '../app/main';\n",
    );
    write(
        dir.path(),
        "src/modules/accounts/ui.ts",
        "import { load } from '../billing/store';\nimport { total } from '@modules/billing';\n",
    );

    let result = analyze(dir.path());
    let r1: Vec<_> = result.violations.iter().filter(|v| v.code == "LL001").collect();
    let r2: Vec<_> = result.violations.iter().filter(|v| v.code == "LL002").collect();

    assert_eq!(r1.len(), 1);
    assert_eq!(r1[0].location.to_string(), "src/shared/routes.ts:1:22");
    assert_eq!(r2.len(), 1);
    assert_eq!(r2[0].location.to_string(), "src/modules/accounts/ui.ts:1:22");
}

#[test]
fn test_narrowed_source_root_still_sees_upward_imports() {
    let dir = project();
    write(dir.path(), "src/shared/routes.ts", "import { main } from '../app/main';\n");

    let result = Analyzer::builder()
        .project_root(dir.path())
        .source_root("src/shared")
        .rules(all_rules())
        .build()
        .unwrap()
        .analyze();

    assert_eq!(result.files_checked, 2);
    insta::assert_snapshot!(compact(&result), @"src/shared/routes.ts:1:22: error [LL001] layer `shared` must not import from higher layer `app` (`../app/main`)");
}

#[test]
fn test_invalid_utf8_file_is_reported_and_others_still_checked() {
    let dir = project();
    fs::write(dir.path().join("src/shared/broken.ts"), b"\xff\xfe\x00").unwrap();

    let result = analyze(dir.path());
    assert_eq!(codes(&result), ["LL003", "LL004", "LL900"]);
    assert_eq!(
        result.violations[2].location.to_string(),
        "src/shared/broken.ts"
    );
}

/// Reads from disk but refuses one file, as a permission error would.
struct DenyingReader {
    denied: &'static str,
}

impl SourceReader for DenyingReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        if path.ends_with(self.denied) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        fs::read_to_string(path)
    }
}

#[test]
fn test_unreadable_file_is_one_io_error() {
    let dir = project();
    let result = Analyzer::builder()
        .project_root(dir.path())
        .rules(all_rules())
        .reader(DenyingReader {
            denied: "src/core/price.ts",
        })
        .build()
        .unwrap()
        .analyze();

    let io: Vec<_> = result.violations.iter().filter(|v| v.code == "LL900").collect();
    assert_eq!(io.len(), 1);
    assert_eq!(io[0].location.to_string(), "src/core/price.ts");
    assert!(io[0].message.contains("permission denied"));
    // The rest of the tree is still fully checked.
    assert!(codes(&result).contains(&"LL003"));
    assert!(codes(&result).contains(&"LL004"));
    assert_eq!(result.files_checked, 10);
}

#[test]
fn test_file_directly_in_modules_root() {
    let dir = project();
    write(dir.path(), "src/modules/helpers.ts", "export const h = 1;\n");

    let result = analyze(dir.path());
    let issue = result
        .violations
        .iter()
        .find(|v| v.code == "LL901")
        .unwrap();
    assert_eq!(issue.location.to_string(), "src/modules/helpers.ts");
}

#[test]
fn test_disabled_rule_and_severity_override() {
    let dir = project();
    write(
        dir.path(),
        "layer-lint.toml",
        "[rules.required-files]\nenabled = false\n\n[rules.LL004]\nseverity = \"warning\"\n",
    );
    let policy = layer_lint_core::Policy::from_file(&dir.path().join("layer-lint.toml")).unwrap();

    let result = Analyzer::builder()
        .project_root(dir.path())
        .policy(policy)
        .rules(all_rules())
        .build()
        .unwrap()
        .analyze();

    assert_eq!(codes(&result), ["LL004"]);
    assert!(!result.has_errors());
}

#[test]
fn test_forbidden_path_scenario() {
    let dir = project();
    write(dir.path(), "src/mocks/user.json", "{}");
    let policy = layer_lint_core::Policy::from_toml_str(
        "[structure]\nforbidden = [\"src/mocks\"]\n",
    )
    .unwrap();

    let result = Analyzer::builder()
        .project_root(dir.path())
        .policy(policy)
        .rules(all_rules())
        .build()
        .unwrap()
        .analyze();

    assert!(result
        .violations
        .iter()
        .any(|v| v.code == "LL005" && v.location.to_string() == "src/mocks"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = project();
    let first = compact(&analyze(dir.path()));
    let second = compact(&analyze(dir.path()));
    assert_eq!(first, second);
}

#[test]
fn test_discovery_order_does_not_matter() {
    let dir = project();
    let analyzer = Analyzer::builder()
        .project_root(dir.path())
        .rules(all_rules())
        .build()
        .unwrap();

    let mut paths = vec![
        "src/app/main.ts",
        "src/core/price.ts",
        "src/modules/accounts/index.ts",
        "src/modules/accounts/service.ts",
        "src/modules/accounts/ui.ts",
        "src/modules/billing/index.ts",
        "src/modules/billing/service.ts",
        "src/modules/billing/store.ts",
        "src/modules/billing/ui.ts",
        "src/shared/format.ts",
    ];
    let sorted = analyzer.analyze_paths(paths.iter().map(ToString::to_string).collect());
    paths.reverse();
    paths.swap(2, 7);
    let shuffled = analyzer.analyze_paths(paths.iter().map(ToString::to_string).collect());

    assert_eq!(sorted.violations, shuffled.violations);
    assert_eq!(compact(&sorted), compact(&analyze(dir.path())));
}
