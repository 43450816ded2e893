use crate::reg::{Cond, Indirect, Reg16, Reg8, StackReg};

use std::fmt;

/// First byte of every instruction in the extended (bit manipulation) set.
pub const PREFIX: u8 = 0xcb;

/// Operand-less instructions with a single fixed opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixed {
    Nop,
    /// Encoded as two bytes, `0x10 0x00`.
    Stop,
    Halt,
    Di,
    Ei,
    Scf,
    Ccf,
    Cpl,
    Daa,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Ret,
    Reti,
    /// `JP HL`.
    JpHl,
    /// `LD SP, HL`.
    LdSpHl,
    /// `LD (C), A`.
    StoreAHighC,
    /// `LD A, (C)`.
    LoadAHighC,
}

impl Fixed {
    pub fn opcode(self) -> u8 {
        match self {
            Fixed::Nop => 0x00,
            Fixed::Stop => 0x10,
            Fixed::Halt => 0x76,
            Fixed::Di => 0xf3,
            Fixed::Ei => 0xfb,
            Fixed::Scf => 0x37,
            Fixed::Ccf => 0x3f,
            Fixed::Cpl => 0x2f,
            Fixed::Daa => 0x27,
            Fixed::Rlca => 0x07,
            Fixed::Rrca => 0x0f,
            Fixed::Rla => 0x17,
            Fixed::Rra => 0x1f,
            Fixed::Ret => 0xc9,
            Fixed::Reti => 0xd9,
            Fixed::JpHl => 0xe9,
            Fixed::LdSpHl => 0xf9,
            Fixed::StoreAHighC => 0xe2,
            Fixed::LoadAHighC => 0xf2,
        }
    }

    fn text(self) -> &'static str {
        match self {
            Fixed::Nop => "NOP",
            Fixed::Stop => "STOP",
            Fixed::Halt => "HALT",
            Fixed::Di => "DI",
            Fixed::Ei => "EI",
            Fixed::Scf => "SCF",
            Fixed::Ccf => "CCF",
            Fixed::Cpl => "CPL",
            Fixed::Daa => "DAA",
            Fixed::Rlca => "RLCA",
            Fixed::Rrca => "RRCA",
            Fixed::Rla => "RLA",
            Fixed::Rra => "RRA",
            Fixed::Ret => "RET",
            Fixed::Reti => "RETI",
            Fixed::JpHl => "JP HL",
            Fixed::LdSpHl => "LD SP, HL",
            Fixed::StoreAHighC => "LD (C), A",
            Fixed::LoadAHighC => "LD A, (C)",
        }
    }
}

/// 8-bit arithmetic and logic operations on register A. The discriminant is the 3-bit operation
/// field of the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub const ALL: [AluOp; 8] = [
        AluOp::Add, AluOp::Adc, AluOp::Sub, AluOp::Sbc, AluOp::And, AluOp::Xor, AluOp::Or, AluOp::Cp,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x7) as usize]
    }

    fn text(self) -> &'static str {
        const NAMES: [&str; 8] = ["ADD", "ADC", "SUB", "SBC", "AND", "XOR", "OR", "CP"];
        NAMES[self.index() as usize]
    }

    /// ADD, ADC and SBC are conventionally written with the A destination spelled out.
    fn shows_destination(self) -> bool {
        matches!(self, AluOp::Add | AluOp::Adc | AluOp::Sbc)
    }
}

/// Rotate and shift operations of the extended set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    pub const ALL: [ShiftOp; 8] = [
        ShiftOp::Rlc, ShiftOp::Rrc, ShiftOp::Rl, ShiftOp::Rr, ShiftOp::Sla, ShiftOp::Sra,
        ShiftOp::Swap, ShiftOp::Srl,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x7) as usize]
    }

    fn text(self) -> &'static str {
        const NAMES: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];
        NAMES[self.index() as usize]
    }
}

/// Single bit operations of the extended set. The discriminant is the top two bits of the
/// extended opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOp {
    Bit = 1,
    Res = 2,
    Set = 3,
}

impl BitOp {
    pub fn index(self) -> u8 {
        self as u8
    }

    fn text(self) -> &'static str {
        match self {
            BitOp::Bit => "BIT",
            BitOp::Res => "RES",
            BitOp::Set => "SET",
        }
    }
}

/// Instruction opcode. Extended opcodes are the byte following [`PREFIX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Base(u8),
    Extended(u8),
}

impl Opcode {
    /// The first byte of the instruction. This is what decides the instruction length.
    pub fn first_byte(self) -> u8 {
        match self {
            Opcode::Base(op) => op,
            Opcode::Extended(_) => PREFIX,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::Base(op) => write!(f, "0x{op:02X}"),
            Opcode::Extended(op) => write!(f, "0x{PREFIX:02X}{op:02X}"),
        }
    }
}

/// A single machine instruction with all operands resolved.
///
/// There is a variant per instruction shape rather than per opcode. The register, condition and
/// operation fields select the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Fixed(Fixed),

    Alu(AluOp, Reg8),
    AluImm(AluOp, u8),

    Inc(Reg8),
    Dec(Reg8),
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    AddSp(i8),

    Ld(Reg8, Reg8),
    LdImm(Reg8, u8),
    LdImm16(Reg16, u16),
    StoreA(Indirect),
    LoadA(Indirect),
    StoreAAbs(u16),
    LoadAAbs(u16),
    StoreSp(u16),
    /// `LDH (n), A`. The operand is the offset into the high page at `0xFF00`.
    StoreAHigh(u8),
    /// `LDH A, (n)`.
    LoadAHigh(u8),
    /// `LD HL, SP+e`.
    LdHlSp(i8),

    Jp(Option<Cond>, u16),
    /// The operand is the displacement from the address following the instruction.
    Jr(Option<Cond>, i8),
    Call(Option<Cond>, u16),
    RetIf(Cond),
    /// Restart at one of the vectors `0x00`, `0x08`, ..., `0x38`.
    Rst(u8),

    Push(StackReg),
    Pop(StackReg),

    Shift(ShiftOp, Reg8),
    Bit(BitOp, u8, Reg8),
}

/// Everything there is to know about how an [`Instruction`] is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub opcode: Opcode,
    pub mnemonic: String,
    pub bytes: Vec<u8>,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        use Instruction::*;
        let op = match *self {
            Fixed(fixed) => fixed.opcode(),
            Alu(op, r) => 0x80 | op.index() << 3 | r.index(),
            AluImm(op, _) => 0xc6 | op.index() << 3,
            Inc(r) => 0x04 | r.index() << 3,
            Dec(r) => 0x05 | r.index() << 3,
            Inc16(rr) => 0x03 | rr.index() << 4,
            Dec16(rr) => 0x0b | rr.index() << 4,
            AddHl(rr) => 0x09 | rr.index() << 4,
            AddSp(_) => 0xe8,
            Ld(dst, src) => 0x40 | dst.index() << 3 | src.index(),
            LdImm(r, _) => 0x06 | r.index() << 3,
            LdImm16(rr, _) => 0x01 | rr.index() << 4,
            StoreA(ind) => 0x02 | ind.index() << 4,
            LoadA(ind) => 0x0a | ind.index() << 4,
            StoreAAbs(_) => 0xea,
            LoadAAbs(_) => 0xfa,
            StoreSp(_) => 0x08,
            StoreAHigh(_) => 0xe0,
            LoadAHigh(_) => 0xf0,
            LdHlSp(_) => 0xf8,
            Jp(None, _) => 0xc3,
            Jp(Some(cc), _) => 0xc2 | cc.index() << 3,
            Jr(None, _) => 0x18,
            Jr(Some(cc), _) => 0x20 | cc.index() << 3,
            Call(None, _) => 0xcd,
            Call(Some(cc), _) => 0xc4 | cc.index() << 3,
            RetIf(cc) => 0xc0 | cc.index() << 3,
            Rst(vector) => 0xc7 | (vector & 0x38),
            Push(qq) => 0xc5 | qq.index() << 4,
            Pop(qq) => 0xc1 | qq.index() << 4,
            Shift(op, r) => return Opcode::Extended(op.index() << 3 | r.index()),
            Bit(op, bit, r) => {
                return Opcode::Extended(op.index() << 6 | (bit & 0x7) << 3 | r.index());
            }
        };
        Opcode::Base(op)
    }

    /// Opcode byte(s) followed by the little endian operand bytes.
    pub fn bytes(&self) -> Vec<u8> {
        use Instruction::*;
        let mut bytes = match self.opcode() {
            Opcode::Base(op) => vec![op],
            Opcode::Extended(op) => vec![PREFIX, op],
        };
        match *self {
            Fixed(self::Fixed::Stop) => bytes.push(0x00),
            AluImm(_, n) | LdImm(_, n) | StoreAHigh(n) | LoadAHigh(n) => bytes.push(n),
            AddSp(e) | LdHlSp(e) | Jr(_, e) => bytes.push(e as u8),
            LdImm16(_, nn)
            | StoreAAbs(nn)
            | LoadAAbs(nn)
            | StoreSp(nn)
            | Jp(_, nn)
            | Call(_, nn) => {
                bytes.extend_from_slice(&nn.to_le_bytes());
            }
            _ => (),
        }
        bytes
    }

    pub fn encode(&self) -> Encoding {
        Encoding {
            opcode: self.opcode(),
            mnemonic: self.to_string(),
            bytes: self.bytes(),
        }
    }
}

/// Signed 8-bit value written as a sign and hex magnitude, fx. `-0x03`.
struct Signed(i8);

impl fmt::Display for Signed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let magnitude = (self.0 as i16).unsigned_abs();
        if self.0 < 0 {
            write!(f, "-0x{magnitude:02X}")
        } else {
            write!(f, "0x{magnitude:02X}")
        }
    }
}

/// Optional condition followed by a comma, fx. `NZ, `.
struct CondPrefix(Option<Cond>);

impl fmt::Display for CondPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(cc) => write!(f, "{cc}, "),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;
        match *self {
            Fixed(fixed) => f.write_str(fixed.text()),
            Alu(op, r) if op.shows_destination() => write!(f, "{} A, {r}", op.text()),
            Alu(op, r) => write!(f, "{} {r}", op.text()),
            AluImm(op, n) if op.shows_destination() => write!(f, "{} A, 0x{n:02X}", op.text()),
            AluImm(op, n) => write!(f, "{} 0x{n:02X}", op.text()),
            Inc(r) => write!(f, "INC {r}"),
            Dec(r) => write!(f, "DEC {r}"),
            Inc16(rr) => write!(f, "INC {rr}"),
            Dec16(rr) => write!(f, "DEC {rr}"),
            AddHl(rr) => write!(f, "ADD HL, {rr}"),
            AddSp(e) => write!(f, "ADD SP, {}", Signed(e)),
            Ld(dst, src) => write!(f, "LD {dst}, {src}"),
            LdImm(r, n) => write!(f, "LD {r}, 0x{n:02X}"),
            LdImm16(rr, nn) => write!(f, "LD {rr}, 0x{nn:04X}"),
            StoreA(ind) => write!(f, "LD {ind}, A"),
            LoadA(ind) => write!(f, "LD A, {ind}"),
            StoreAAbs(nn) => write!(f, "LD (0x{nn:04X}), A"),
            LoadAAbs(nn) => write!(f, "LD A, (0x{nn:04X})"),
            StoreSp(nn) => write!(f, "LD (0x{nn:04X}), SP"),
            StoreAHigh(n) => write!(f, "LDH (0x{n:02X}), A"),
            LoadAHigh(n) => write!(f, "LDH A, (0x{n:02X})"),
            LdHlSp(e) if e < 0 => write!(f, "LD HL, SP{}", Signed(e)),
            LdHlSp(e) => write!(f, "LD HL, SP+{}", Signed(e)),
            Jp(cc, nn) => write!(f, "JP {}0x{nn:04X}", CondPrefix(cc)),
            Jr(cc, e) => write!(f, "JR {}{}", CondPrefix(cc), Signed(e)),
            Call(cc, nn) => write!(f, "CALL {}0x{nn:04X}", CondPrefix(cc)),
            RetIf(cc) => write!(f, "RET {cc}"),
            Rst(vector) => write!(f, "RST 0x{vector:02X}"),
            Push(qq) => write!(f, "PUSH {qq}"),
            Pop(qq) => write!(f, "POP {qq}"),
            Shift(op, r) => write!(f, "{} {r}", op.text()),
            Bit(op, bit, r) => write!(f, "{} {bit}, {r}", op.text()),
        }
    }
}

#[test]
fn encode() {
    let enc = Instruction::Jp(None, 0x0003).encode();
    assert_eq!(enc.opcode, Opcode::Base(0xc3));
    assert_eq!(enc.mnemonic, "JP 0x0003");
    assert_eq!(enc.bytes, [0xc3, 0x03, 0x00]);

    let enc = Instruction::Bit(BitOp::Set, 7, Reg8::HlInd).encode();
    assert_eq!(enc.opcode, Opcode::Extended(0xfe));
    assert_eq!(enc.mnemonic, "SET 7, (HL)");
    assert_eq!(enc.bytes, [0xcb, 0xfe]);

    let enc = Instruction::Jr(Some(Cond::Nz), -3).encode();
    assert_eq!(enc.mnemonic, "JR NZ, -0x03");
    assert_eq!(enc.bytes, [0x20, 0xfd]);
}

#[test]
fn opcode_fields() {
    assert_eq!(Instruction::Ld(Reg8::B, Reg8::C).opcode(), Opcode::Base(0x41));
    assert_eq!(Instruction::Ld(Reg8::A, Reg8::HlInd).opcode(), Opcode::Base(0x7e));
    assert_eq!(Instruction::LdImm(Reg8::HlInd, 0).opcode(), Opcode::Base(0x36));
    assert_eq!(Instruction::Alu(AluOp::Cp, Reg8::A).opcode(), Opcode::Base(0xbf));
    assert_eq!(Instruction::AluImm(AluOp::Xor, 0).opcode(), Opcode::Base(0xee));
    assert_eq!(Instruction::Dec16(Reg16::Hl).opcode(), Opcode::Base(0x2b));
    assert_eq!(Instruction::Push(StackReg::Af).opcode(), Opcode::Base(0xf5));
    assert_eq!(Instruction::Rst(0x38).opcode(), Opcode::Base(0xff));
    assert_eq!(Instruction::Shift(ShiftOp::Swap, Reg8::A).opcode(), Opcode::Extended(0x37));
    assert_eq!(Instruction::StoreA(Indirect::HlDec).opcode(), Opcode::Base(0x32));
    assert_eq!(Instruction::Fixed(Fixed::Stop).bytes(), [0x10, 0x00]);
}

#[test]
fn signed_text() {
    assert_eq!(Instruction::AddSp(-128).to_string(), "ADD SP, -0x80");
    assert_eq!(Instruction::LdHlSp(-2).to_string(), "LD HL, SP-0x02");
    assert_eq!(Instruction::LdHlSp(127).to_string(), "LD HL, SP+0x7F");
}
