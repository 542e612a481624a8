//! List rules command implementation.

use layer_lint_core::RuleId;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<22} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for id in RuleId::ALL {
        let note = if id.is_configurable() { "" } else { " (always on)" };
        println!("{:<8} {:<22} {}{note}", id.code(), id.name(), id.description());
    }

    println!("\nToggle or re-grade a rule in the policy:");
    println!("  [rules.cross-module-import]");
    println!("  enabled = false");
    println!("\nUse --rules to run only some rules, e.g.:");
    println!("  layer-lint check --rules layer-direction,cross-module-import");
    println!("  layer-lint check --rules LL001,LL002");
}
