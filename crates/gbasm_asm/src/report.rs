//! Rendering of errors with the source line they point at.
//!
//! ```text
//! 1:7: range error: 0xFFFF is out of range for an 8-bit operand (-0x80..=0xFF)
//! 1 | LD B, 0xFFFF
//!   |       ^~~~~~
//! ```

use crate::Span;

/// Render `message` followed by line `line` of `source` with a caret under `column` and
/// `width - 1` tildes after it.
pub fn format(source: &str, line: usize, column: usize, message: &str, width: usize) -> String {
    let mut out = String::from(message);
    out.push('\n');
    out.push_str(&excerpt(source, line, column, width));
    out
}

/// Like [`format`], but also renders the source `reference` points at, which is where the erroring
/// value comes from.
pub fn format_with_reference(
    source: &str,
    line: usize,
    column: usize,
    message: &str,
    width: usize,
    reference: Span,
) -> String {
    let mut out = format(source, line, column, message, width);
    out.push_str("\nThe expression is referring to\n");
    out.push_str(&excerpt(source, reference.line, reference.column, reference.width));
    out
}

fn excerpt(source: &str, line: usize, column: usize, width: usize) -> String {
    let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let number = line.to_string();

    // Tabs are kept so the caret lines up with the line above.
    let pad: String = text
        .chars()
        .chain(std::iter::repeat(' '))
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();

    format!(
        "{number} | {text}\n{} | {pad}^{}",
        " ".repeat(number.len()),
        "~".repeat(width.saturating_sub(1)),
    )
}

#[test]
fn caret() {
    let source = "NOP\nLD B, 0xFFFF\n";
    assert_eq!(
        format(source, 2, 7, "bad", 6),
        "bad\n2 | LD B, 0xFFFF\n  |       ^~~~~~",
    );
}

#[test]
fn tabs() {
    let source = "\tJP\tNOWHERE";
    assert_eq!(
        format(source, 1, 5, "bad", 7),
        "bad\n1 | \tJP\tNOWHERE\n  | \t  \t^~~~~~~",
    );
}

#[test]
fn end_of_line() {
    assert_eq!(format("LD A,", 1, 6, "bad", 1), "bad\n1 | LD A,\n  |      ^");
}

#[test]
fn reference() {
    let source = "JR FAR\nNOP\nFAR:";
    let out = format_with_reference(source, 1, 4, "bad", 3, Span::new(3, 1, 4));
    assert_eq!(
        out,
        "bad\n1 | JR FAR\n  |    ^~~\nThe expression is referring to\n3 | FAR:\n  | ^~~~",
    );
}

#[test]
fn wide_line_numbers() {
    let source = "NOP\n".repeat(9) + "HALT x";
    assert_eq!(format(&source, 10, 6, "bad", 1), "bad\n10 | HALT x\n   |      ^");
}
