use super::{assemble_ok, instructions, single};

use gbasm_isa::{AluOp, BitOp, Cond, Fixed, Indirect, Instruction, Reg16, Reg8, ShiftOp, StackReg};

#[test]
fn alu() {
    assert_eq!(single("ADD A, B"), Instruction::Alu(AluOp::Add, Reg8::B));
    assert_eq!(single("add b"), Instruction::Alu(AluOp::Add, Reg8::B));
    assert_eq!(single("SUB (HL)"), Instruction::Alu(AluOp::Sub, Reg8::HlInd));
    assert_eq!(single("SUB A, [hl]"), Instruction::Alu(AluOp::Sub, Reg8::HlInd));
    assert_eq!(single("CP 0x12"), Instruction::AluImm(AluOp::Cp, 0x12));
    assert_eq!(single("AND -1"), Instruction::AluImm(AluOp::And, 0xff));
    assert_eq!(single("XOR A, 255"), Instruction::AluImm(AluOp::Xor, 0xff));
    assert_eq!(single("OR e"), Instruction::Alu(AluOp::Or, Reg8::E));
    assert_eq!(single("SBC A, 0x10"), Instruction::AluImm(AluOp::Sbc, 0x10));
}

#[test]
fn wide_add() {
    assert_eq!(single("ADD HL, SP"), Instruction::AddHl(Reg16::Sp));
    assert_eq!(single("add hl, de"), Instruction::AddHl(Reg16::De));
    assert_eq!(single("ADD SP, -2"), Instruction::AddSp(-2));
    assert_eq!(single("ADD SP, 0x7f"), Instruction::AddSp(0x7f));
}

#[test]
fn inc_dec() {
    assert_eq!(
        instructions("INC A\nDEC (HL)\nINC BC\nDEC SP"),
        [
            Instruction::Inc(Reg8::A),
            Instruction::Dec(Reg8::HlInd),
            Instruction::Inc16(Reg16::Bc),
            Instruction::Dec16(Reg16::Sp),
        ],
    );
}

#[test]
fn bit_ops() {
    assert_eq!(single("BIT 3, (HL)"), Instruction::Bit(BitOp::Bit, 3, Reg8::HlInd));
    assert_eq!(single("SET 7, A"), Instruction::Bit(BitOp::Set, 7, Reg8::A));
    assert_eq!(single("res 0, b"), Instruction::Bit(BitOp::Res, 0, Reg8::B));
}

#[test]
fn shifts() {
    assert_eq!(single("SWAP A"), Instruction::Shift(ShiftOp::Swap, Reg8::A));
    assert_eq!(single("RLC (HL)"), Instruction::Shift(ShiftOp::Rlc, Reg8::HlInd));
    assert_eq!(single("srl e"), Instruction::Shift(ShiftOp::Srl, Reg8::E));
    assert_eq!(single("RLA"), Instruction::Fixed(Fixed::Rla));
    assert_eq!(single("RRCA"), Instruction::Fixed(Fixed::Rrca));
}

#[test]
fn jumps() {
    assert_eq!(single("JP 0x1234"), Instruction::Jp(None, 0x1234));
    assert_eq!(single("JP NZ, 0x10"), Instruction::Jp(Some(Cond::Nz), 0x10));
    assert_eq!(single("JP HL"), Instruction::Fixed(Fixed::JpHl));
    assert_eq!(single("JP (HL)"), Instruction::Fixed(Fixed::JpHl));
    assert_eq!(single("JR C, 5"), Instruction::Jr(Some(Cond::C), 5));
    assert_eq!(single("CALL Z, 0x100"), Instruction::Call(Some(Cond::Z), 0x100));
    assert_eq!(single("CALL 0x100"), Instruction::Call(None, 0x100));
}

#[test]
fn returns() {
    assert_eq!(
        instructions("RET\nRET NC\nRETI\nRST 0x38\nRST 0"),
        [
            Instruction::Fixed(Fixed::Ret),
            Instruction::RetIf(Cond::Nc),
            Instruction::Fixed(Fixed::Reti),
            Instruction::Rst(0x38),
            Instruction::Rst(0x00),
        ],
    );
}

#[test]
fn loads() {
    assert_eq!(single("LD A, B"), Instruction::Ld(Reg8::A, Reg8::B));
    assert_eq!(single("LD (HL), 0x12"), Instruction::LdImm(Reg8::HlInd, 0x12));
    assert_eq!(single("LD BC, 0x1234"), Instruction::LdImm16(Reg16::Bc, 0x1234));
    assert_eq!(single("LD SP, HL"), Instruction::Fixed(Fixed::LdSpHl));
    assert_eq!(single("LD HL, SP+4"), Instruction::LdHlSp(4));
    assert_eq!(single("LD HL, SP-0x02"), Instruction::LdHlSp(-2));
    assert_eq!(single("LD (0xC000), SP"), Instruction::StoreSp(0xc000));
    assert_eq!(single("LD (BC), A"), Instruction::StoreA(Indirect::Bc));
    assert_eq!(single("LD A, (DE)"), Instruction::LoadA(Indirect::De));
    assert_eq!(single("LD (HL+), A"), Instruction::StoreA(Indirect::HlInc));
    assert_eq!(single("LD A, (HLD)"), Instruction::LoadA(Indirect::HlDec));
    assert_eq!(single("LD (0xC000), A"), Instruction::StoreAAbs(0xc000));
    assert_eq!(single("LD A, [0xC000]"), Instruction::LoadAAbs(0xc000));
    assert_eq!(single("LD (C), A"), Instruction::Fixed(Fixed::StoreAHighC));
    assert_eq!(single("LD A, (C)"), Instruction::Fixed(Fixed::LoadAHighC));
}

#[test]
fn high_page_loads() {
    assert_eq!(single("LDH (0x80), A"), Instruction::StoreAHigh(0x80));
    assert_eq!(single("LDH A, (0xFF44)"), Instruction::LoadAHigh(0x44));
    assert_eq!(single("LDH (C), A"), Instruction::Fixed(Fixed::StoreAHighC));
    assert_eq!(single("LDI (HL), A"), Instruction::StoreA(Indirect::HlInc));
    assert_eq!(single("LDD A, (HL)"), Instruction::LoadA(Indirect::HlDec));
}

#[test]
fn stack() {
    assert_eq!(single("PUSH AF"), Instruction::Push(StackReg::Af));
    assert_eq!(single("pop bc"), Instruction::Pop(StackReg::Bc));
}

#[test]
fn machine_control() {
    assert_eq!(
        instructions("NOP\nHALT\nSTOP\nEI\nDI\nSCF\nCCF\nCPL\nDAA"),
        [
            Fixed::Nop,
            Fixed::Halt,
            Fixed::Stop,
            Fixed::Ei,
            Fixed::Di,
            Fixed::Scf,
            Fixed::Ccf,
            Fixed::Cpl,
            Fixed::Daa,
        ]
        .map(Instruction::Fixed),
    );
}

#[test]
fn image() {
    let program = assemble_ok(
        r#"
        ; Entry point.
        MAIN:
            LD BC, 0x1234
            JP 0x0150
            STOP
            BIT 7, H
        "#,
    );
    assert_eq!(
        program.image(),
        [0x01, 0x34, 0x12, 0xc3, 0x50, 0x01, 0x10, 0x00, 0xcb, 0x7c],
    );
    let addresses: Vec<u16> = program.instructions().iter().map(|ins| ins.address).collect();
    assert_eq!(addresses, [0, 3, 6, 8]);
}
