//! Decoding of Game Boy CPU opcodes.
//!
//! Instructions are 1 to 3 bytes. The first byte is the opcode, except for the extended set
//! where it's [`PREFIX`] and the second byte is the opcode. Operands follow in little endian.
//!
//! An opcode byte splits into fields that select the operation and its register operands:
//! - `x`: bits 6-7.
//!     - `y`: bits 3-5.
//!         - `p`: bits 4-5.
//!         - `q`: bit 3.
//! - `z`: bits 0-2.

use crate::ins::{AluOp, BitOp, Fixed, Instruction, ShiftOp, PREFIX};
use crate::reg::{Cond, Indirect, Reg16, Reg8, StackReg};

/// Length in bytes of the instruction starting with each opcode byte. Zero marks the opcodes the
/// CPU leaves unused.
#[rustfmt::skip]
const LENGTHS: [u8; 256] = [
//  0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    1, 3, 1, 1, 1, 1, 2, 1, 3, 1, 1, 1, 1, 1, 2, 1, // 0
    2, 3, 1, 1, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, // 1
    2, 3, 1, 1, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, // 2
    2, 3, 1, 1, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, // 3
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 4
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 5
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 6
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 7
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 8
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 9
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // A
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // B
    1, 1, 3, 3, 3, 1, 2, 1, 1, 1, 3, 2, 3, 3, 2, 1, // C
    1, 1, 3, 0, 3, 1, 2, 1, 1, 1, 3, 0, 3, 0, 2, 1, // D
    2, 1, 1, 0, 0, 1, 2, 1, 2, 1, 3, 0, 0, 0, 2, 1, // E
    2, 1, 1, 1, 0, 1, 2, 1, 2, 1, 3, 1, 0, 0, 2, 1, // F
];

/// Length in bytes of an instruction given its first byte. Returns 0 for unused opcodes.
pub fn decode_length(opcode: u8) -> usize {
    LENGTHS[opcode as usize] as usize
}

fn x(op: u8) -> u8 {
    op >> 6
}

fn y(op: u8) -> u8 {
    (op >> 3) & 0x7
}

fn z(op: u8) -> u8 {
    op & 0x7
}

fn p(op: u8) -> u8 {
    (op >> 4) & 0x3
}

fn q(op: u8) -> bool {
    op & 0x8 != 0
}

/// Decode the instruction at the start of `bytes`. Returns `None` if it starts with an unused
/// opcode, if `bytes` is too short to hold the whole instruction, or for a STOP that isn't
/// followed by a zero byte.
pub fn decode(bytes: &[u8]) -> Option<Instruction> {
    let op = *bytes.first()?;
    let len = decode_length(op);
    if len == 0 || bytes.len() < len {
        return None;
    }
    if op == PREFIX {
        return Some(decode_extended(bytes[1]));
    }

    let n = if len > 1 { bytes[1] } else { 0 };
    let e = n as i8;
    let nn = if len > 2 { u16::from_le_bytes([bytes[1], bytes[2]]) } else { 0 };

    let ins = match (x(op), z(op)) {
        (0, 0) => match y(op) {
            0 => Instruction::Fixed(Fixed::Nop),
            1 => Instruction::StoreSp(nn),
            2 if n == 0 => Instruction::Fixed(Fixed::Stop),
            2 => return None,
            3 => Instruction::Jr(None, e),
            y => Instruction::Jr(Some(Cond::from_index(y - 4)), e),
        },
        (0, 1) if q(op) => Instruction::AddHl(Reg16::from_index(p(op))),
        (0, 1) => Instruction::LdImm16(Reg16::from_index(p(op)), nn),
        (0, 2) if q(op) => Instruction::LoadA(Indirect::from_index(p(op))),
        (0, 2) => Instruction::StoreA(Indirect::from_index(p(op))),
        (0, 3) if q(op) => Instruction::Dec16(Reg16::from_index(p(op))),
        (0, 3) => Instruction::Inc16(Reg16::from_index(p(op))),
        (0, 4) => Instruction::Inc(Reg8::from_index(y(op))),
        (0, 5) => Instruction::Dec(Reg8::from_index(y(op))),
        (0, 6) => Instruction::LdImm(Reg8::from_index(y(op)), n),
        (0, _) => Instruction::Fixed(match y(op) {
            0 => Fixed::Rlca,
            1 => Fixed::Rrca,
            2 => Fixed::Rla,
            3 => Fixed::Rra,
            4 => Fixed::Daa,
            5 => Fixed::Cpl,
            6 => Fixed::Scf,
            _ => Fixed::Ccf,
        }),
        (1, 6) if y(op) == 6 => Instruction::Fixed(Fixed::Halt),
        (1, _) => Instruction::Ld(Reg8::from_index(y(op)), Reg8::from_index(z(op))),
        (2, _) => Instruction::Alu(AluOp::from_index(y(op)), Reg8::from_index(z(op))),
        (_, 0) => match y(op) {
            4 => Instruction::StoreAHigh(n),
            5 => Instruction::AddSp(e),
            6 => Instruction::LoadAHigh(n),
            7 => Instruction::LdHlSp(e),
            y => Instruction::RetIf(Cond::from_index(y)),
        },
        (_, 1) if !q(op) => Instruction::Pop(StackReg::from_index(p(op))),
        (_, 1) => Instruction::Fixed(match p(op) {
            0 => Fixed::Ret,
            1 => Fixed::Reti,
            2 => Fixed::JpHl,
            _ => Fixed::LdSpHl,
        }),
        (_, 2) => match y(op) {
            4 => Instruction::Fixed(Fixed::StoreAHighC),
            5 => Instruction::StoreAAbs(nn),
            6 => Instruction::Fixed(Fixed::LoadAHighC),
            7 => Instruction::LoadAAbs(nn),
            y => Instruction::Jp(Some(Cond::from_index(y)), nn),
        },
        (_, 3) => match y(op) {
            0 => Instruction::Jp(None, nn),
            6 => Instruction::Fixed(Fixed::Di),
            // The remaining opcodes are either the prefix or unused, which have been handled.
            _ => Instruction::Fixed(Fixed::Ei),
        },
        (_, 4) => Instruction::Call(Some(Cond::from_index(y(op))), nn),
        (_, 5) if !q(op) => Instruction::Push(StackReg::from_index(p(op))),
        (_, 5) => Instruction::Call(None, nn),
        (_, 6) => Instruction::AluImm(AluOp::from_index(y(op)), n),
        _ => Instruction::Rst(y(op) << 3),
    };

    Some(ins)
}

fn decode_extended(op: u8) -> Instruction {
    let r = Reg8::from_index(z(op));
    match x(op) {
        0 => Instruction::Shift(ShiftOp::from_index(y(op)), r),
        1 => Instruction::Bit(BitOp::Bit, y(op), r),
        2 => Instruction::Bit(BitOp::Res, y(op), r),
        _ => Instruction::Bit(BitOp::Set, y(op), r),
    }
}

#[cfg(test)]
fn with_operands(op: u8) -> Vec<u8> {
    let mut bytes = vec![op];
    bytes.resize(decode_length(op).max(1), 0x00);
    bytes
}

#[test]
fn decode_is_inverse_of_encode() {
    for op in 0..=255_u8 {
        let bytes = with_operands(op);
        let Some(ins) = decode(&bytes) else {
            assert_eq!(decode_length(op), 0, "opcode {op:#04x} has a length but doesn't decode");
            continue;
        };
        assert_eq!(ins.bytes(), bytes, "{ins}");
        assert_eq!(ins.opcode().first_byte(), op);
    }
    for op in 0..=255_u8 {
        let ins = decode(&[PREFIX, op]).unwrap();
        assert_eq!(ins.bytes(), [PREFIX, op], "{ins}");
    }
}

#[test]
fn unused_opcodes() {
    let unused: Vec<u8> = (0..=255_u8).filter(|op| decode_length(*op) == 0).collect();
    assert_eq!(
        unused,
        [0xd3, 0xdb, 0xdd, 0xe3, 0xe4, 0xeb, 0xec, 0xed, 0xf4, 0xfc, 0xfd],
    );
}

#[test]
fn operands() {
    assert_eq!(decode(&[0xc3, 0x34, 0x12]), Some(Instruction::Jp(None, 0x1234)));
    assert_eq!(decode(&[0x18, 0xfd]), Some(Instruction::Jr(None, -3)));
    assert_eq!(decode(&[0xe0, 0x80]), Some(Instruction::StoreAHigh(0x80)));
    assert_eq!(decode(&[0xf8, 0xff]), Some(Instruction::LdHlSp(-1)));
    assert_eq!(decode(&[0xcb, 0x7c]), Some(Instruction::Bit(BitOp::Bit, 7, Reg8::H)));
}

#[test]
fn truncated() {
    assert_eq!(decode(&[]), None);
    assert_eq!(decode(&[0xc3, 0x34]), None);
    assert_eq!(decode(&[0xcb]), None);
    assert_eq!(decode(&[0x10, 0x01]), None);
}
