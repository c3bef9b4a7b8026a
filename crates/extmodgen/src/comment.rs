//! Docstring reflowing for embedding as C block comments

use crate::error::{GenerateError, Result};

/// Normalize a docstring into a block suitable for `/*` ... `*/`.
///
/// Surrounding blank lines are dropped, whitespace-only lines become empty and
/// the common indentation is removed. Every line is prefixed with a newline
/// and the block ends with one, so `"/*" + block + "*/"` puts the markers on
/// their own lines.
pub fn reflow_comment(doc: &str) -> Result<String> {
    let mut lines: Vec<&str> = doc.lines().collect();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines
        .iter()
        .take_while(|line| line.trim().is_empty())
        .count();
    lines.drain(..leading);

    if lines.is_empty() {
        return Err(GenerateError::EmptyDocumentation);
    }

    let lines: Vec<&str> = lines
        .into_iter()
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect();

    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut block = String::new();
    for line in lines {
        block.push('\n');
        block.push_str(strip_chars(line, indent));
    }
    block.push('\n');
    Ok(block)
}

/// Reflow `doc` and wrap it in a C block comment.
pub fn block_comment(doc: &str) -> Result<String> {
    let block = reflow_comment(doc)?;
    Ok(format!("/*{}*/", block.replace("*/", "* /")))
}

/// True when `doc` has something worth reflowing
pub fn has_content(doc: Option<&str>) -> bool {
    doc.is_some_and(|doc| !doc.trim().is_empty())
}

/// Squeeze `text` onto one line; every whitespace run becomes one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_reflow_strips_blank_lines_and_indent() {
        let reflowed = reflow_comment("\n\n  Hello\n    World\n\n").unwrap();
        assert_eq!(reflowed, "\nHello\n  World\n");
        let lines: Vec<&str> = reflowed.trim_matches('\n').lines().collect();
        assert_eq!(lines, vec!["Hello", "  World"]);
    }

    #[test]
    fn test_reflow_blanks_whitespace_only_lines() {
        let reflowed = reflow_comment("    first\n      \n    second").unwrap();
        assert_eq!(reflowed, "\nfirst\n\nsecond\n");
    }

    #[test]
    fn test_reflow_single_line() {
        assert_eq!(
            reflow_comment(" We need destructor too ").unwrap(),
            "\nWe need destructor too \n"
        );
    }

    #[test]
    fn test_reflow_empty_documentation() {
        assert!(matches!(
            reflow_comment(""),
            Err(GenerateError::EmptyDocumentation)
        ));
        assert!(matches!(
            reflow_comment("\n   \n\t\n"),
            Err(GenerateError::EmptyDocumentation)
        ));
    }

    #[test]
    fn test_block_comment_escapes_terminator() {
        assert_eq!(
            block_comment("use a */ here").unwrap(),
            "/*\nuse a * / here\n*/"
        );
    }

    #[test]
    fn test_has_content() {
        assert!(has_content(Some(" text ")));
        assert!(!has_content(Some(" \n ")));
        assert!(!has_content(None));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("[\n    1,\n]"), "[ 1, ]");
        assert_eq!(collapse_whitespace("dict[\r\n\tstr,  int\n]"), "dict[ str, int ]");
        assert_eq!(collapse_whitespace("int"), "int");
    }
}
