//! Report rendering for lint results.

use anyhow::Result;
use layer_lint_core::{LintResult, Severity, Violation};
use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use crate::OutputFormat;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(&self, color: &str, text: &str) -> String {
        if self.enabled {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn severity(&self, severity: Severity) -> String {
        let color = match severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => BLUE,
        };
        self.paint(color, &severity.to_string())
    }
}

/// Prints lint results to stdout. Text output is coloured only when
/// stdout is a terminal.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    let color = format == OutputFormat::Text && std::io::stdout().is_terminal();
    let rendered = render(result, format, color)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Renders lint results in the given format.
pub fn render(result: &LintResult, format: OutputFormat, color: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(result, &Palette { enabled: color }),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
        OutputFormat::Compact => render_compact(result),
    })
}

fn render_text(result: &LintResult, palette: &Palette) -> String {
    let mut out = String::new();
    let mut current: Option<&std::path::Path> = None;

    for violation in &result.violations {
        let file = violation.location.file.as_path();
        if current != Some(file) {
            if current.is_some() {
                out.push('\n');
            }
            let header = layer_lint_core::display_path(file);
            let _ = writeln!(out, "{}", palette.paint(BOLD, &header));
            current = Some(file);
        }
        write_violation(&mut out, violation, palette);
    }

    if !result.violations.is_empty() {
        out.push('\n');
    }

    let (errors, warnings, infos) = result.count_by_severity();
    let summary = if result.has_violations() {
        format!(
            "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s), {} import(s)",
            result.files_checked, result.edges_checked
        )
    } else {
        format!(
            "No violations in {} file(s), {} import(s)",
            result.files_checked, result.edges_checked
        )
    };
    let color = if errors > 0 {
        RED
    } else if warnings > 0 {
        YELLOW
    } else {
        GREEN
    };
    let _ = writeln!(out, "{}", palette.paint(color, &summary));
    out
}

fn write_violation(out: &mut String, violation: &Violation, palette: &Palette) {
    let position = if violation.location.line == 0 {
        String::new()
    } else {
        format!("{}:{} ", violation.location.line, violation.location.column)
    };
    let _ = writeln!(
        out,
        "  {position}{}[{}] {}",
        palette.severity(violation.severity),
        violation.code,
        violation.message
    );
    if let Some(suggestion) = &violation.suggestion {
        let _ = writeln!(out, "    = help: {}", suggestion.message);
    }
}

fn render_compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .fold(String::new(), |mut out, violation| {
            let _ = writeln!(out, "{violation}");
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_lint_core::{Location, Suggestion};

    fn sample() -> LintResult {
        let mut result = LintResult::new();
        result.files_checked = 3;
        result.edges_checked = 4;
        result.violations = vec![
            Violation::new(
                "LL003",
                "required-files",
                Severity::Error,
                Location::path("src/modules/accounts"),
                "module `accounts` is missing its `store` file",
            )
            .with_suggestion(Suggestion::new("create `src/modules/accounts/store.ts`")),
            Violation::new(
                "LL001",
                "layer-direction",
                Severity::Warning,
                Location::new("src/shared/a.ts", 2, 19),
                "layer `shared` must not import from higher layer `app` (`@app/x`)",
            ),
        ];
        result
    }

    #[test]
    fn text_groups_by_file() {
        let text = render(&sample(), OutputFormat::Text, false).unwrap();
        assert_eq!(
            text,
            "src/modules/accounts\n\
             \x20 error[LL003] module `accounts` is missing its `store` file\n\
             \x20   = help: create `src/modules/accounts/store.ts`\n\
             \n\
             src/shared/a.ts\n\
             \x20 2:19 warning[LL001] layer `shared` must not import from higher layer `app` (`@app/x`)\n\
             \n\
             Found 1 error(s), 1 warning(s), 0 info(s) in 3 file(s), 4 import(s)\n"
        );
    }

    #[test]
    fn text_without_terminal_has_no_escapes() {
        let text = render(&sample(), OutputFormat::Text, false).unwrap();
        assert!(!text.contains('\x1b'));
        let colored = render(&sample(), OutputFormat::Text, true).unwrap();
        assert!(colored.contains(RED));
    }

    #[test]
    fn clean_summary() {
        let mut result = LintResult::new();
        result.files_checked = 2;
        let text = render(&result, OutputFormat::Text, false).unwrap();
        assert_eq!(text, "No violations in 2 file(s), 0 import(s)\n");
    }

    #[test]
    fn compact_is_one_line_per_violation() {
        let text = render(&sample(), OutputFormat::Compact, false).unwrap();
        assert_eq!(
            text,
            "src/modules/accounts: error [LL003] module `accounts` is missing its `store` file\n\
             src/shared/a.ts:2:19: warning [LL001] layer `shared` must not import from higher layer `app` (`@app/x`)\n"
        );
    }

    #[test]
    fn json_round_trips() {
        let json = render(&sample(), OutputFormat::Json, false).unwrap();
        let parsed: LintResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.violations, sample().violations);
        assert_eq!(parsed.edges_checked, 4);
    }
}
