//! Compiler-style diagnostic parsing
//!
//! Every built-in adapter makes its program report findings as one line per
//! diagnostic:
//!
//! ```text
//! src/main.c:12:5: warning: Variable 'x' is assigned a value that is never used. [unreadVariable]
//! ```
//!
//! The same parser handles live output and replayed output artifacts, so a
//! result re-derived with `parse_results_file` matches the live run.

use crosslint_domain::{Category, Issue, Severity};
use regex::Regex;
use std::sync::LazyLock;

static DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.*?):(?P<line>\d+):(?:(?P<col>\d+):)?\s*(?P<sev>[A-Za-z][A-Za-z ]*?):\s+(?P<msg>.*?)(?:\s+\[(?P<rule>[^\[\]]+)\])?\s*$",
    )
    .expect("diagnostic pattern is valid")
});

/// Parse a single output line. `None` for anything that is not a finding,
/// including `note:` continuation lines.
pub fn parse_line(tool_name: &str, line: &str) -> Option<Issue> {
    let caps = DIAGNOSTIC.captures(line.trim_end())?;

    let raw_severity = caps.name("sev")?.as_str().trim().to_ascii_lowercase();
    if raw_severity == "note" || raw_severity == "remark" {
        return None;
    }
    let severity = map_severity(&raw_severity)?;

    let line_no = caps.name("line")?.as_str().parse().unwrap_or(0);
    let column = caps
        .name("col")
        .and_then(|c| c.as_str().parse().ok())
        .unwrap_or(0);
    let rule = caps.name("rule").map(|r| r.as_str()).unwrap_or_default();

    Some(
        Issue::new(tool_name, rule, caps.name("msg")?.as_str())
            .at(caps.name("file")?.as_str(), line_no, column)
            .with_severity(severity)
            .with_category(map_category(&raw_severity, rule)),
    )
}

/// Parse every finding in `lines`, preserving order.
pub fn parse_lines<'a>(tool_name: &str, lines: impl IntoIterator<Item = &'a str>) -> Vec<Issue> {
    lines
        .into_iter()
        .filter_map(|line| parse_line(tool_name, line))
        .collect()
}

/// Map a program's severity word onto [`Severity`].
///
/// cppcheck's `style`, `performance` and `portability` findings rank as
/// warnings; `information` is informational.
fn map_severity(raw: &str) -> Option<Severity> {
    let severity = match raw {
        "fatal error" | "fatal" | "critical" => Severity::Critical,
        "error" => Severity::Error,
        "warning" | "style" | "performance" | "portability" => Severity::Warning,
        "information" | "info" => Severity::Info,
        _ => return None,
    };
    Some(severity)
}

fn map_category(raw_severity: &str, rule: &str) -> Category {
    match raw_severity {
        "style" => return Category::Style,
        "performance" => return Category::Performance,
        "portability" => return Category::Portability,
        _ => {}
    }

    let prefix = rule.split('-').next().unwrap_or_default();
    match prefix {
        "performance" => Category::Performance,
        "modernize" => Category::Modernization,
        "readability" | "google" | "llvm" => Category::Style,
        "cert" => Category::Security,
        "portability" => Category::Portability,
        "misc" | "cppcoreguidelines" | "hicpp" => Category::Maintainability,
        _ if rule.starts_with("clang-analyzer-security") => Category::Security,
        _ => Category::Bug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cppcheck_line() {
        let issue = parse_line(
            "cppcheck",
            "src/main.c:12:5: style: Variable 'x' is assigned a value that is never used. [unreadVariable]",
        )
        .unwrap();

        assert_eq!(issue.file_path, "src/main.c");
        assert_eq!(issue.line, 12);
        assert_eq!(issue.column, 5);
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.category, Category::Style);
        assert_eq!(issue.rule_id, "unreadVariable");
        assert_eq!(issue.tool_name, "cppcheck");
        assert_eq!(
            issue.message,
            "Variable 'x' is assigned a value that is never used."
        );
    }

    #[test]
    fn test_parse_clang_tidy_line() {
        let issue = parse_line(
            "clang-tidy",
            "/work/a.cpp:3:10: warning: use nullptr [modernize-use-nullptr]",
        )
        .unwrap();

        assert_eq!(issue.file_path, "/work/a.cpp");
        assert_eq!(issue.category, Category::Modernization);
        assert_eq!(issue.rule_id, "modernize-use-nullptr");
    }

    #[test]
    fn test_parse_without_column_or_rule() {
        let issue = parse_line("lint", "a.c:7: error: expected ';'").unwrap();
        assert_eq!(issue.line, 7);
        assert_eq!(issue.column, 0);
        assert_eq!(issue.rule_id, "");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.category, Category::Bug);
    }

    #[test]
    fn test_fatal_error_is_critical() {
        let issue = parse_line("clang-tidy", "a.c:1:10: fatal error: 'x.h' file not found [clang-diagnostic-error]")
            .unwrap();
        assert_eq!(issue.severity, Severity::Critical);
    }

    #[test]
    fn test_notes_and_noise_are_skipped() {
        assert!(parse_line("clang-tidy", "a.c:3:1: note: previous declaration is here").is_none());
        assert!(parse_line("cppcheck", "Checking src/main.c ...").is_none());
        assert!(parse_line("cppcheck", "1/3 files checked 33% done").is_none());
        assert!(parse_line("lint", "a.c:3:1: banana: what").is_none());
    }

    #[test]
    fn test_parse_lines_preserves_order() {
        let output = "Checking a.c ...\n\
                      a.c:1:1: error: first [r1]\n\
                      b.c:2:1: warning: second [r2]\n";
        let issues = parse_lines("cppcheck", output.lines());
        let rules: Vec<&str> = issues.iter().map(|i| i.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["r1", "r2"]);
    }

    #[test]
    fn test_category_from_rule_prefix() {
        assert_eq!(map_category("warning", "cert-err58-cpp"), Category::Security);
        assert_eq!(map_category("warning", "performance-unnecessary-copy"), Category::Performance);
        assert_eq!(map_category("warning", "cppcoreguidelines-avoid-goto"), Category::Maintainability);
        assert_eq!(map_category("error", "nullPointer"), Category::Bug);
        assert_eq!(map_category("portability", "invalidPointerCast"), Category::Portability);
    }
}
