//! Output normalization for persisted reports.

use std::sync::LazyLock;

use regex::Regex;

/// ESC, then anything up to and including the first `m`.
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\x1b[^m]*m").expect("ANSI escape pattern is valid"));

/// Strip ANSI color sequences from every line of `text`.
///
/// Sequences never span lines. Line endings are preserved.
pub fn sanitize(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| ANSI_ESCAPE.replace_all(line, ""))
        .collect()
}

/// Sort lines lexicographically so reports diff cleanly across runs.
///
/// The result ends with a newline unless it is empty.
pub fn sort_lines(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();

    let mut sorted = lines.join("\n");
    if !sorted.is_empty() {
        sorted.push('\n');
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_colors() {
        let colored = "\x1b[1;32mPASS\x1b[0m TestRaiiString\n\x1b[31mFAIL\x1b[0m TestZip\n";
        assert_eq!(sanitize(colored), "PASS TestRaiiString\nFAIL TestZip\n");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "plain text\n",
            "\x1b[0m\x1b[1;33mwarn\x1b[0m\n",
            "\x1b\x1b[0mm nested\n",
            "dangling \x1b[0 escape\nnext line m\n",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {:?}", input);
            for line in once.lines() {
                assert!(!ANSI_ESCAPE.is_match(line), "line: {:?}", line);
            }
        }
    }

    #[test]
    fn test_sanitize_does_not_span_lines() {
        // An unterminated escape must not swallow text up to an `m` on the next line
        let input = "dangling \x1b[0 escape\nnext line m\n";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_sort_lines() {
        let output = "zlib 12ms\nbaseline 3ms\nminizip 7ms\n";
        assert_eq!(sort_lines(output), "baseline 3ms\nminizip 7ms\nzlib 12ms\n");
    }

    #[test]
    fn test_sort_lines_is_stable_under_reapplication() {
        let once = sort_lines("b\na\nc\na\n");
        assert_eq!(sort_lines(&once), once);
        assert_eq!(sort_lines(""), "");
    }
}
