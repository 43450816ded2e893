use super::{assemble_err, assemble_ok};
use crate::{assemble, assemble_all, ErrorKind, Span};

fn kind(input: &str) -> ErrorKind {
    assemble_err(input).kind()
}

#[test]
fn lexical() {
    assert_eq!(kind("LD A, #5"), ErrorKind::Lexical);
    assert_eq!(kind("LD A, (HL]"), ErrorKind::Lexical);
    assert_eq!(kind("LD A, 0x"), ErrorKind::Lexical);
    assert_eq!(kind("LD A, 12ab"), ErrorKind::Lexical);
}

#[test]
fn grammar() {
    let err = assemble_err("NOP\nMOV A, B");
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert_eq!(err.message(), "unknown mnemonic 'MOV'");
    assert_eq!(err.span(), Span::new(2, 1, 3));

    assert_eq!(kind("LD A B"), ErrorKind::Grammar);
    assert_eq!(kind("LD A,"), ErrorKind::Grammar);
    assert_eq!(kind("PUSH"), ErrorKind::Grammar);
    assert_eq!(kind("0x12"), ErrorKind::Grammar);
    assert_eq!(kind("X EQU"), ErrorKind::Grammar);
    assert_eq!(kind("MAIN: MAIN:"), ErrorKind::Grammar);
}

#[test]
fn unterminated_statement() {
    let err = assemble_err("NOP A");
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert_eq!(err.message(), "expected end of line, found 'A'");

    assert_eq!(kind("INC A, B"), ErrorKind::Grammar);
    assert_eq!(kind("RET NZ, 5"), ErrorKind::Grammar);
}

#[test]
fn operand() {
    assert_eq!(kind("PUSH SP"), ErrorKind::Operand);
    assert_eq!(kind("JP B"), ErrorKind::Operand);
    assert_eq!(kind("ADD B, C"), ErrorKind::Operand);
    assert_eq!(kind("LD 5, A"), ErrorKind::Operand);
    assert_eq!(kind("LD (HL), (HL)"), ErrorKind::Operand);
    assert_eq!(kind("JP XY, 0x10"), ErrorKind::Operand);
    assert_eq!(kind("BIT A, B"), ErrorKind::Operand);
    assert_eq!(kind("SWAP 5"), ErrorKind::Operand);
    assert_eq!(kind("LD A, (SP)"), ErrorKind::Operand);
    assert_eq!(kind("X EQU A"), ErrorKind::Operand);

    let err = assemble_err("LD (BC), B");
    assert_eq!(err.message(), "expected register A, found register B");
    assert_eq!(err.span(), Span::new(1, 10, 1));
}

#[test]
fn range() {
    let err = assemble_err("LD B, 0xFFFF");
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(err.message().contains("8-bit"), "{}", err.message());

    assert_eq!(kind("RST 0x39"), ErrorKind::Range);
    assert_eq!(kind("RST 0x40"), ErrorKind::Range);
    assert_eq!(kind("LDH (0x100), A"), ErrorKind::Range);
}

#[test]
fn unresolved() {
    let err = assemble_err("JP NOWHERE");
    assert_eq!(err.kind(), ErrorKind::SymbolResolution);
    assert_eq!(err.span(), Span::new(1, 4, 7));
    assert_eq!(err.message(), "unknown symbol 'NOWHERE'");

    assert_eq!(kind("X EQU Y\nLD A, X"), ErrorKind::SymbolResolution);
}

#[test]
fn alias_cycle() {
    let err = assemble_err("A1 EQU B1\nB1 EQU A1\nLD A, A1");
    assert_eq!(err.kind(), ErrorKind::SymbolResolution);
    assert_eq!(err.span().line, 3);
}

#[test]
fn duplicate_symbol() {
    let err = assemble_err("MAIN:\nNOP\nMAIN:");
    assert_eq!(err.kind(), ErrorKind::Scope);
    assert_eq!(err.message(), "duplicate symbol 'MAIN'");
    assert_eq!(err.span().line, 3);
    assert_eq!(err.reference().map(|span| span.line), Some(1));

    assert_eq!(kind("MAIN:\n.x\n.x"), ErrorKind::Scope);
    assert_eq!(kind("X EQU 1\nX EQU 2"), ErrorKind::Scope);
}

#[test]
fn rendered() {
    let err = assemble("NOP\nLD B, 0xFFFF", 0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "2:7: range error: 0xFFFF is out of range for an 8-bit operand (-0x80..=0xFF)\n\
         2 | LD B, 0xFFFF\n  \
           |       ^~~~~~",
    );
}

#[test]
fn rendered_with_reference() {
    let err = assemble("BIG EQU 0x100\nLD B, BIG", 0).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("2 | LD B, BIG\n  |       ^~~"), "{text}");
    assert!(text.contains("The expression is referring to\n1 | BIG EQU 0x100\n  | ^~~"), "{text}");
}

#[test]
fn keep_going() {
    let source = "NOP\nFOO A\nLD A, #5 ; bad\nJP NOWHERE\nLD B, 0x100\nHALT";
    let errors = assemble_all(source, 0).unwrap_err();
    let found: Vec<(usize, ErrorKind)> = errors
        .iter()
        .map(|diagnostic| (diagnostic.error().span().line, diagnostic.error().kind()))
        .collect();
    assert_eq!(
        found,
        [
            (2, ErrorKind::Grammar),
            (3, ErrorKind::Lexical),
            (4, ErrorKind::SymbolResolution),
            (5, ErrorKind::Range),
        ],
    );
}

#[test]
fn keep_going_makes_progress() {
    // Every broken line gives exactly one error, however many bad characters it has.
    let source = "LD A, #### $$$\nNOP\n@@@\n(BC\nX EQU\nNOP";
    let errors = assemble_all(source, 0).unwrap_err();
    let lines: Vec<usize> = errors.iter().map(|d| d.error().span().line).collect();
    assert_eq!(lines, [1, 3, 4, 5]);
}

#[test]
fn keep_going_without_errors() {
    let source = "MAIN:\nLD A, 1\nJR MAIN";
    assert_eq!(assemble_all(source, 0).unwrap(), assemble_ok(source));
}
