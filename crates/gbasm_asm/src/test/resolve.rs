use super::{assemble_err, assemble_ok, instructions, single};
use crate::{assemble, ErrorKind, Span, SymbolKind};

use gbasm_isa::{AluOp, Cond, Instruction};

#[test]
fn forward_reference() {
    let program = assemble_ok("JP LABEL1\nLABEL1:\nDEC HL");
    assert_eq!(program.symbols().value("LABEL1"), Some(0x0003));
    assert_eq!(program.instructions()[0].instruction, Instruction::Jp(None, 0x0003));
    assert_eq!(program.image(), [0xc3, 0x03, 0x00, 0x2b]);
}

#[test]
fn backward_relative_jump() {
    let ins = instructions(
        r#"
        LABEL1:
            DEC HL
            DEC HL
            DEC HL
            JR LABEL1
        "#,
    );
    // Relative to the end of the JR at 0x0003, which makes it -5 and not the -3 a count of the
    // DEC instructions alone would give.
    assert_eq!(ins[3], Instruction::Jr(None, -5));
}

#[test]
fn forward_relative_jump() {
    let ins = instructions(
        r#"
        MAIN:
            JR NZ, .done
            NOP
        .done:
            RET
        "#,
    );
    assert_eq!(ins[0], Instruction::Jr(Some(Cond::Nz), 1));
}

#[test]
fn relative_jump_reach() {
    let far = format!("JR FAR\n{}FAR:\nNOP", "NOP\n".repeat(127));
    assert_eq!(instructions(&far)[0], Instruction::Jr(None, 127));

    let back = format!("BACK:\n{}JR BACK", "NOP\n".repeat(126));
    assert_eq!(instructions(&back)[126], Instruction::Jr(None, -128));
}

#[test]
fn relative_jump_out_of_reach() {
    let far = format!("JR FAR\n{}FAR:\nNOP", "NOP\n".repeat(128));
    let err = assemble_err(&far);
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.span(), Span::new(1, 4, 3));
    assert_eq!(err.reference(), Some(Span::new(130, 1, 4)));

    let back = format!("BACK:\n{}JR BACK", "NOP\n".repeat(127));
    assert_eq!(assemble_err(&back).kind(), ErrorKind::Range);
}

#[test]
fn relative_jump_to_extreme_constant() {
    for (source, base) in [("X EQU -0x80000000\nJR X", 0), ("X EQU -0x7FFFFFFF\nJR X", 0x10)] {
        let err = assemble(source, base).unwrap_err();
        let err = err.error();
        assert_eq!(err.kind(), ErrorKind::Range, "{source}");
        assert_eq!(err.span(), Span::new(2, 4, 1));
        assert_eq!(err.reference(), Some(Span::new(1, 1, 1)));
    }
    assert_eq!(assemble_err("X EQU 0x7FFFFFFF\nJR X").kind(), ErrorKind::Range);
}

#[test]
fn literal_displacement() {
    assert_eq!(single("JR -2"), Instruction::Jr(None, -2));
    assert_eq!(assemble_err("JR 128").kind(), ErrorKind::Range);
}

#[test]
fn relative_jump_to_constant() {
    let ins = instructions("DEST EQU 0x10\nJR DEST");
    assert_eq!(ins[0], Instruction::Jr(None, 0x0e));
}

#[test]
fn local_labels() {
    let program = assemble_ok(
        r#"
        LABEL1:
        .LOCAL
            NOP
            JP .LOCAL
        "#,
    );
    assert_eq!(program.symbols().value("LABEL1.LOCAL"), Some(0));
    assert_eq!(program.instructions()[1].instruction, Instruction::Jp(None, 0));
}

#[test]
fn local_label_scopes() {
    let program = assemble_ok(
        r#"
        ONE:
        .loop
            JR .loop
        TWO:
        .loop
            JR .loop
        "#,
    );
    assert_eq!(program.symbols().value("ONE.loop"), Some(0));
    assert_eq!(program.symbols().value("TWO.loop"), Some(2));
    for ins in program.instructions() {
        assert_eq!(ins.instruction, Instruction::Jr(None, -2));
    }
}

#[test]
fn local_label_without_global() {
    let err = assemble_err(".LOCAL\nNOP");
    assert_eq!(err.kind(), ErrorKind::Scope);

    let err = assemble_err("JP .LOCAL\nLABEL1:\n.LOCAL\nNOP");
    assert_eq!(err.kind(), ErrorKind::Scope);
    assert_eq!(err.span().line, 1);
}

#[test]
fn labels_on_instruction_lines() {
    let program = assemble_ok("MAIN: NOP\n.x: JP .x");
    assert_eq!(program.symbols().value("MAIN"), Some(0));
    assert_eq!(program.instructions()[1].instruction, Instruction::Jp(None, 1));
}

#[test]
fn equ_order_independent() {
    let before = single_after_equ("CONST EQU 0xAF\nADC CONST");
    let after = single_after_equ("ADC CONST\nCONST EQU 0xAF");
    assert_eq!(before, Instruction::AluImm(AluOp::Adc, 0xaf));
    assert_eq!(after, Instruction::AluImm(AluOp::Adc, 0xaf));
    assert_eq!(single("ADC A, CONST\nCONST EQU 0xAF"), Instruction::AluImm(AluOp::Adc, 0xaf));
}

fn single_after_equ(input: &str) -> Instruction {
    let program = assemble_ok(input);
    assert_eq!(program.symbols().get("CONST").map(|sym| sym.kind()), Some(SymbolKind::Constant));
    program.instructions()[0].instruction
}

#[test]
fn equ_alias() {
    let program = assemble_ok("JP ALIAS\nALIAS EQU TARGET\nTARGET:\nNOP");
    assert_eq!(program.symbols().value("TARGET"), Some(3));
    assert_eq!(program.instructions()[0].instruction, Instruction::Jp(None, 3));
}

#[test]
fn constant_out_of_range() {
    let err = assemble_err("BIG EQU 0x100\nLD B, BIG");
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.span().line, 2);
    assert_eq!(err.reference().map(|span| span.line), Some(1));
}

#[test]
fn memory_operand_symbol() {
    let ins = instructions("BUF EQU 0xC000\nLD (BUF), A\nLD A, [BUF]");
    assert_eq!(ins[0], Instruction::StoreAAbs(0xc000));
    assert_eq!(ins[1], Instruction::LoadAAbs(0xc000));
    assert_eq!(assemble_err("BUF EQU 0xC000\nLDH A, (BUF)").kind(), ErrorKind::Range);
}

#[test]
fn high_page_symbol() {
    assert_eq!(single("LY EQU 0xFF44\nLDH A, (LY)"), Instruction::LoadAHigh(0x44));
}

#[test]
fn base_address() {
    let program = assemble("MAIN:\nNOP\nJP MAIN", 0x150).unwrap();
    assert_eq!(program.instructions()[0].address, 0x150);
    assert_eq!(program.instructions()[1].address, 0x151);
    assert_eq!(program.instructions()[1].instruction, Instruction::Jp(None, 0x150));
}

#[test]
fn address_space_end() {
    assert!(assemble("NOP", 0xffff).is_ok());

    let err = assemble("NOP\nNOP", 0xffff).unwrap_err();
    assert_eq!(err.error().kind(), ErrorKind::Range);
    assert_eq!(err.error().span().line, 2);

    assert!(assemble("JP 0", 0xfffe).is_err());
}

#[test]
fn deterministic() {
    let source = r#"
        COUNT EQU 8
        MAIN:
            LD B, COUNT
        .loop
            DEC B
            JR NZ, .loop
            CALL DONE
        DONE:
            RET
    "#;
    assert_eq!(assemble(source, 0).unwrap(), assemble(source, 0).unwrap());
    assert_eq!(assemble(source, 0).unwrap().image(), assemble(source, 0).unwrap().image());
}
