//! The operand grammar of each mnemonic family.
//!
//! The same grammar builds an instruction in both passes. In the first pass symbols aren't all
//! bound yet, so operands depending on a symbol get a placeholder value. That is enough to select
//! the opcode and thereby the length of the instruction, since it only depends on the form of the
//! operands.

use crate::ir::{Mnemonic, Pending};
use crate::lex::{Token, TokenKind};
use crate::symbol::{self, SymbolTable};
use crate::Error;

use gbasm_isa::{
    is_high_c, is_register_name, AluOp, BitOp, Cond, Fixed, Indirect, Instruction, Reg16, Reg8,
    ShiftOp, StackReg,
};

use std::ops::RangeInclusive;

/// Length of JR, which relative jumps are relative to the end of.
const JR_LEN: i32 = 2;

/// The accepted values of a numeric operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Either a signed or an unsigned byte.
    Either8,
    Unsigned8,
    Signed8,
    /// Either a signed or an unsigned 16-bit word.
    Either16,
    Unsigned16,
    BitIndex,
}

impl Width {
    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            Width::Either8 => -128..=255,
            Width::Unsigned8 => 0..=255,
            Width::Signed8 => -128..=127,
            Width::Either16 => -32768..=65535,
            Width::Unsigned16 => 0..=65535,
            Width::BitIndex => 0..=7,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Width::Either8 => "an 8-bit operand",
            Width::Unsigned8 => "an unsigned 8-bit operand",
            Width::Signed8 => "a signed 8-bit operand",
            Width::Either16 => "a 16-bit operand",
            Width::Unsigned16 => "an unsigned 16-bit operand",
            Width::BitIndex => "a bit index",
        }
    }

    /// Check that `value` fits. Returns a message naming the width if it doesn't.
    pub fn check(self, value: i32) -> Result<i32, String> {
        let range = self.range();
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(format!(
                "{} is out of range for {} ({}..={})",
                hex(value),
                self.name(),
                hex(*range.start()),
                hex(*range.end()),
            ))
        }
    }
}

fn hex(value: i32) -> String {
    if value < 0 {
        format!("-{:#04X}", value.unsigned_abs())
    } else {
        format!("{value:#04X}")
    }
}

/// Where operand values come from.
pub(crate) enum Values<'s, 'a> {
    /// The first pass.
    Layout,
    /// The second pass, with every symbol bound.
    Resolve(&'s SymbolTable<'a>),
}

/// A numeric operand value.
struct Value<'a> {
    value: i32,
    /// The definition of the symbol the value came from.
    origin: Option<Token<'a>>,
}

/// The form of an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    R8(Reg8),
    R16(Reg16),
    Af,
    Ind(Indirect),
    /// '(C)', the high page at offset C.
    HighC,
    /// An address in brackets, fx. '(0xc000)' or '(LABEL)'.
    Mem,
    /// 'SP+e'.
    SpOffset,
    /// A number or a symbol.
    Imm,
    /// A register name that can't be an operand on its own, fx. '(SP)'.
    BadReg,
}

struct Operands<'t, 's, 'a> {
    ins: &'t Pending<'a>,
    values: &'t Values<'s, 'a>,
    pos: usize,
}

/// Build the instruction `ins`.
pub(crate) fn build<'a>(ins: &Pending<'a>, values: &Values<'_, 'a>) -> Result<Instruction, Error> {
    let mut ops = Operands { ins, values, pos: 0 };
    let fixed = |fixed: Fixed| -> Result<Instruction, Error> { Ok(Instruction::Fixed(fixed)) };
    let built = match ins.mnemonic {
        Mnemonic::Add => ops.alu(AluOp::Add),
        Mnemonic::Adc => ops.alu(AluOp::Adc),
        Mnemonic::Sub => ops.alu(AluOp::Sub),
        Mnemonic::Sbc => ops.alu(AluOp::Sbc),
        Mnemonic::And => ops.alu(AluOp::And),
        Mnemonic::Xor => ops.alu(AluOp::Xor),
        Mnemonic::Or => ops.alu(AluOp::Or),
        Mnemonic::Cp => ops.alu(AluOp::Cp),
        Mnemonic::Inc => ops.inc_dec(true),
        Mnemonic::Dec => ops.inc_dec(false),
        Mnemonic::Bit => ops.bit(BitOp::Bit),
        Mnemonic::Res => ops.bit(BitOp::Res),
        Mnemonic::Set => ops.bit(BitOp::Set),
        Mnemonic::Rlc => ops.shift(ShiftOp::Rlc),
        Mnemonic::Rrc => ops.shift(ShiftOp::Rrc),
        Mnemonic::Rl => ops.shift(ShiftOp::Rl),
        Mnemonic::Rr => ops.shift(ShiftOp::Rr),
        Mnemonic::Sla => ops.shift(ShiftOp::Sla),
        Mnemonic::Sra => ops.shift(ShiftOp::Sra),
        Mnemonic::Swap => ops.shift(ShiftOp::Swap),
        Mnemonic::Srl => ops.shift(ShiftOp::Srl),
        Mnemonic::Jp => ops.jp(),
        Mnemonic::Jr => ops.jr(),
        Mnemonic::Call => ops.call(),
        Mnemonic::Ret => ops.ret(),
        Mnemonic::Rst => ops.rst(),
        Mnemonic::Ld => ops.ld(),
        Mnemonic::Ldh => ops.ldh(),
        Mnemonic::Ldi => ops.ld_step(Indirect::HlInc),
        Mnemonic::Ldd => ops.ld_step(Indirect::HlDec),
        Mnemonic::Push => ops.stack(true),
        Mnemonic::Pop => ops.stack(false),
        Mnemonic::Rlca => fixed(Fixed::Rlca),
        Mnemonic::Rrca => fixed(Fixed::Rrca),
        Mnemonic::Rla => fixed(Fixed::Rla),
        Mnemonic::Rra => fixed(Fixed::Rra),
        Mnemonic::Reti => fixed(Fixed::Reti),
        Mnemonic::Nop => fixed(Fixed::Nop),
        Mnemonic::Halt => fixed(Fixed::Halt),
        Mnemonic::Stop => fixed(Fixed::Stop),
        Mnemonic::Di => fixed(Fixed::Di),
        Mnemonic::Ei => fixed(Fixed::Ei),
        Mnemonic::Scf => fixed(Fixed::Scf),
        Mnemonic::Ccf => fixed(Fixed::Ccf),
        Mnemonic::Cpl => fixed(Fixed::Cpl),
        Mnemonic::Daa => fixed(Fixed::Daa),
    }?;
    ops.finish()?;
    Ok(built)
}

impl<'t, 's, 'a> Operands<'t, 's, 'a> {
    fn peek(&self, n: usize) -> Option<&'t Token<'a>> {
        self.ins.operands.get(self.pos + n)
    }

    /// Consume the next operand token.
    fn next(&mut self) -> Result<&'t Token<'a>, Error> {
        let Some(tok) = self.ins.operands.get(self.pos) else {
            let last = match self.pos.checked_sub(1) {
                Some(prev) => &self.ins.operands[prev],
                None => &self.ins.name,
            };
            return Err(Error::grammar(
                last.span(),
                format!("expected operand after {}", last.describe()),
            ));
        };
        self.pos += 1;
        Ok(tok)
    }

    fn comma(&mut self) -> Result<(), Error> {
        let tok = self.next()?;
        if tok.kind == TokenKind::Comma {
            Ok(())
        } else {
            Err(Error::grammar(tok.span(), format!("expected ',', found {}", tok.describe())))
        }
    }

    /// If the next operand is followed by a comma. That is the long form with an explicit
    /// destination or condition.
    fn long_form(&self) -> bool {
        matches!(self.peek(1), Some(tok) if tok.kind == TokenKind::Comma)
    }

    /// Require that every operand has been consumed.
    fn finish(&self) -> Result<(), Error> {
        match self.peek(0) {
            None => Ok(()),
            Some(tok) => Err(Error::grammar(
                tok.span(),
                format!("expected end of line, found {}", tok.describe()),
            )),
        }
    }

    fn shape(&self, tok: &Token<'a>) -> Result<Shape, Error> {
        let shape = match tok.kind {
            TokenKind::Number | TokenKind::LocalLabel => Shape::Imm,
            TokenKind::Address => Shape::Mem,
            TokenKind::SpShifted => Shape::SpOffset,
            TokenKind::Identifier => {
                let name = tok.text;
                if let Some(r) = Reg8::from_name(name) {
                    Shape::R8(r)
                } else if let Some(rr) = Reg16::from_name(name) {
                    Shape::R16(rr)
                } else if let Some(ind) = Indirect::from_name(name) {
                    Shape::Ind(ind)
                } else if name.eq_ignore_ascii_case("AF") {
                    Shape::Af
                } else if is_high_c(name) {
                    Shape::HighC
                } else if is_register_name(name) {
                    Shape::BadReg
                } else if tok.is_bracketed() {
                    Shape::Mem
                } else {
                    Shape::Imm
                }
            }
            _ => {
                return Err(Error::grammar(
                    tok.span(),
                    format!("expected operand, found {}", tok.describe()),
                ));
            }
        };
        Ok(shape)
    }

    /// Error for a token of the wrong shape where `what` was expected.
    fn unexpected(&self, tok: &Token<'a>, shape: Shape, what: &str) -> Error {
        match shape {
            Shape::Imm | Shape::Mem | Shape::SpOffset => {
                Error::operand(tok.span(), format!("expected {what}, found '{}'", tok.text))
            }
            _ => Error::operand(tok.span(), format!("expected {what}, found register {}", tok.text)),
        }
    }

    fn reg8(&self, tok: &Token<'a>) -> Result<Reg8, Error> {
        match self.shape(tok)? {
            Shape::R8(r) => Ok(r),
            shape => Err(self.unexpected(tok, shape, "an 8-bit register")),
        }
    }

    fn reg16(&self, tok: &Token<'a>) -> Result<Reg16, Error> {
        match self.shape(tok)? {
            Shape::R16(rr) => Ok(rr),
            shape => Err(self.unexpected(tok, shape, "register BC, DE, HL or SP")),
        }
    }

    /// Require register A.
    fn expect_a(&self, tok: &Token<'a>) -> Result<(), Error> {
        match self.shape(tok)? {
            Shape::R8(Reg8::A) => Ok(()),
            shape => Err(self.unexpected(tok, shape, "register A")),
        }
    }

    /// The value of a token standing for a number, either a literal or a symbol. Returns `None`
    /// in the first pass if it's a symbol.
    fn value(&self, tok: &Token<'a>) -> Result<Option<Value<'a>>, Error> {
        if let Some(value) = tok.value {
            return Ok(Some(Value { value, origin: None }));
        }
        match self.shape(tok)? {
            Shape::Imm | Shape::Mem => (),
            shape => return Err(self.unexpected(tok, shape, "a number")),
        }
        let key = symbol::key(self.ins.scope, tok)?;
        match self.values {
            Values::Layout => Ok(None),
            Values::Resolve(symbols) => {
                let (value, origin) = symbols.resolve(&key, tok)?;
                Ok(Some(Value { value, origin: Some(origin) }))
            }
        }
    }

    fn number(&self, tok: &Token<'a>, width: Width) -> Result<i32, Error> {
        let Some(Value { value, origin }) = self.value(tok)? else {
            return Ok(0);
        };
        width.check(value).map_err(|msg| {
            Error::range(tok.span(), msg).refers_to(origin.map(|def| def.span()))
        })
    }

    fn imm8(&self, tok: &Token<'a>) -> Result<u8, Error> {
        Ok(self.number(tok, Width::Either8)? as u8)
    }

    fn imm16(&self, tok: &Token<'a>) -> Result<u16, Error> {
        Ok(self.number(tok, Width::Either16)? as u16)
    }

    fn addr(&self, tok: &Token<'a>) -> Result<u16, Error> {
        Ok(self.number(tok, Width::Unsigned16)? as u16)
    }

    fn offset(&self, tok: &Token<'a>) -> Result<i8, Error> {
        Ok(self.number(tok, Width::Signed8)? as i8)
    }

    fn bit_index(&self, tok: &Token<'a>) -> Result<u8, Error> {
        Ok(self.number(tok, Width::BitIndex)? as u8)
    }

    /// The displacement of a relative jump. A number is the displacement itself, while a symbol is
    /// the address to jump to.
    fn relative(&self, tok: &Token<'a>) -> Result<i8, Error> {
        let Some(Value { value, origin }) = self.value(tok)? else {
            return Ok(0);
        };
        let Some(def) = origin else {
            return self.offset(tok);
        };
        let disp = value.checked_sub(i32::from(self.ins.address) + JR_LEN);
        match disp.map(|disp| Width::Signed8.check(disp)) {
            Some(Ok(disp)) => Ok(disp as i8),
            _ => Err(Error::range(
                tok.span(),
                match disp {
                    Some(disp) => format!(
                        "{} is out of reach of a relative jump, the displacement {} doesn't fit \
                         in a signed 8-bit operand (-0x80..=0x7F)",
                        hex(value),
                        hex(disp),
                    ),
                    None => format!("{} is out of reach of a relative jump", hex(value)),
                },
            )
            .refers_to(Some(def.span()))),
        }
    }

    /// An offset into the high page, 0xff00 to 0xffff. Both the offset and the full address are
    /// accepted.
    fn high_page(&self, tok: &Token<'a>) -> Result<u8, Error> {
        let Some(Value { value, origin }) = self.value(tok)? else {
            return Ok(0);
        };
        let offset = if (0xff00..=0xffff).contains(&value) { value - 0xff00 } else { value };
        Width::Unsigned8.check(offset).map(|offset| offset as u8).map_err(|_| {
            Error::range(
                tok.span(),
                format!("{} is not in the high page (0xFF00..=0xFFFF or 0x00..=0xFF)", hex(value)),
            )
            .refers_to(origin.map(|def| def.span()))
        })
    }

    /// ADD, ADC, SUB, SBC, AND, XOR, OR and CP. The long form names A as destination, except for
    /// the 16-bit forms of ADD.
    fn alu(&mut self, op: AluOp) -> Result<Instruction, Error> {
        if !self.long_form() {
            let src = self.next()?;
            return self.alu_source(op, src);
        }
        let dst = self.next()?;
        self.comma()?;
        let src = self.next()?;
        match (op, self.shape(dst)?) {
            (AluOp::Add, Shape::R16(Reg16::Hl)) => Ok(Instruction::AddHl(self.reg16(src)?)),
            (AluOp::Add, Shape::R16(Reg16::Sp)) => Ok(Instruction::AddSp(self.offset(src)?)),
            _ => {
                self.expect_a(dst)?;
                self.alu_source(op, src)
            }
        }
    }

    fn alu_source(&self, op: AluOp, src: &Token<'a>) -> Result<Instruction, Error> {
        match self.shape(src)? {
            Shape::R8(r) => Ok(Instruction::Alu(op, r)),
            Shape::Imm => Ok(Instruction::AluImm(op, self.imm8(src)?)),
            shape => Err(self.unexpected(src, shape, "an 8-bit register or a number")),
        }
    }

    fn inc_dec(&mut self, inc: bool) -> Result<Instruction, Error> {
        let tok = self.next()?;
        match (self.shape(tok)?, inc) {
            (Shape::R8(r), true) => Ok(Instruction::Inc(r)),
            (Shape::R8(r), false) => Ok(Instruction::Dec(r)),
            (Shape::R16(rr), true) => Ok(Instruction::Inc16(rr)),
            (Shape::R16(rr), false) => Ok(Instruction::Dec16(rr)),
            (shape, _) => Err(self.unexpected(tok, shape, "a register")),
        }
    }

    /// BIT, RES and SET.
    fn bit(&mut self, op: BitOp) -> Result<Instruction, Error> {
        let index = self.next()?;
        self.comma()?;
        let reg = self.next()?;
        let reg = self.reg8(reg)?;
        Ok(Instruction::Bit(op, self.bit_index(index)?, reg))
    }

    /// The rotates and shifts of the extended set.
    fn shift(&mut self, op: ShiftOp) -> Result<Instruction, Error> {
        let tok = self.next()?;
        Ok(Instruction::Shift(op, self.reg8(tok)?))
    }

    /// A condition followed by a comma, if there is one.
    fn condition(&mut self) -> Result<Option<Cond>, Error> {
        if !self.long_form() {
            return Ok(None);
        }
        let tok = self.next()?;
        self.comma()?;
        self.cond(tok).map(Some)
    }

    fn cond(&self, tok: &Token<'a>) -> Result<Cond, Error> {
        let cond = match tok.kind {
            TokenKind::Identifier => Cond::from_name(tok.text),
            _ => None,
        };
        cond.ok_or_else(|| {
            Error::operand(
                tok.span(),
                format!("expected condition NZ, Z, NC or C, found '{}'", tok.text),
            )
        })
    }

    fn jp(&mut self) -> Result<Instruction, Error> {
        let cond = self.condition()?;
        let target = self.next()?;
        match (cond, self.shape(target)?) {
            (None, Shape::R16(Reg16::Hl) | Shape::R8(Reg8::HlInd)) => {
                Ok(Instruction::Fixed(Fixed::JpHl))
            }
            _ => Ok(Instruction::Jp(cond, self.addr(target)?)),
        }
    }

    fn jr(&mut self) -> Result<Instruction, Error> {
        let cond = self.condition()?;
        let target = self.next()?;
        Ok(Instruction::Jr(cond, self.relative(target)?))
    }

    fn call(&mut self) -> Result<Instruction, Error> {
        let cond = self.condition()?;
        let target = self.next()?;
        Ok(Instruction::Call(cond, self.addr(target)?))
    }

    fn ret(&mut self) -> Result<Instruction, Error> {
        if self.peek(0).is_none() {
            return Ok(Instruction::Fixed(Fixed::Ret));
        }
        let tok = self.next()?;
        Ok(Instruction::RetIf(self.cond(tok)?))
    }

    fn rst(&mut self) -> Result<Instruction, Error> {
        let tok = self.next()?;
        let Some(Value { value, origin }) = self.value(tok)? else {
            return Ok(Instruction::Rst(0));
        };
        if (0..=0x38).contains(&value) && value % 8 == 0 {
            Ok(Instruction::Rst(value as u8))
        } else {
            Err(Error::range(
                tok.span(),
                format!("{} is not a restart vector (a multiple of 0x08 up to 0x38)", hex(value)),
            )
            .refers_to(origin.map(|def| def.span())))
        }
    }

    fn ld(&mut self) -> Result<Instruction, Error> {
        let dst = self.next()?;
        self.comma()?;
        let src = self.next()?;
        let ins = match (self.shape(dst)?, self.shape(src)?) {
            (Shape::R8(Reg8::HlInd), Shape::R8(Reg8::HlInd)) => {
                return Err(Error::operand(src.span(), "can't load from (HL) to (HL)"));
            }
            (Shape::R8(d), Shape::R8(s)) => Instruction::Ld(d, s),
            (Shape::R8(r), Shape::Imm) => Instruction::LdImm(r, self.imm8(src)?),
            (Shape::R16(rr), Shape::Imm) => Instruction::LdImm16(rr, self.imm16(src)?),
            (Shape::R16(Reg16::Sp), Shape::R16(Reg16::Hl)) => Instruction::Fixed(Fixed::LdSpHl),
            (Shape::R16(Reg16::Hl), Shape::SpOffset) => Instruction::LdHlSp(self.offset(src)?),
            (Shape::Mem, Shape::R16(Reg16::Sp)) => Instruction::StoreSp(self.addr(dst)?),
            (Shape::Ind(ind), _) => {
                self.expect_a(src)?;
                Instruction::StoreA(ind)
            }
            (_, Shape::Ind(ind)) => {
                self.expect_a(dst)?;
                Instruction::LoadA(ind)
            }
            (Shape::Mem, _) => {
                self.expect_a(src)?;
                Instruction::StoreAAbs(self.addr(dst)?)
            }
            (_, Shape::Mem) => {
                self.expect_a(dst)?;
                Instruction::LoadAAbs(self.addr(src)?)
            }
            (Shape::HighC, _) => {
                self.expect_a(src)?;
                Instruction::Fixed(Fixed::StoreAHighC)
            }
            (_, Shape::HighC) => {
                self.expect_a(dst)?;
                Instruction::Fixed(Fixed::LoadAHighC)
            }
            _ => {
                return Err(Error::operand(
                    dst.span(),
                    format!("can't load {} into {}", src.text, dst.text),
                ));
            }
        };
        Ok(ins)
    }

    fn ldh(&mut self) -> Result<Instruction, Error> {
        let dst = self.next()?;
        self.comma()?;
        let src = self.next()?;
        match (self.shape(dst)?, self.shape(src)?) {
            (Shape::HighC, _) => {
                self.expect_a(src)?;
                Ok(Instruction::Fixed(Fixed::StoreAHighC))
            }
            (_, Shape::HighC) => {
                self.expect_a(dst)?;
                Ok(Instruction::Fixed(Fixed::LoadAHighC))
            }
            (Shape::Mem, _) => {
                self.expect_a(src)?;
                Ok(Instruction::StoreAHigh(self.high_page(dst)?))
            }
            (_, Shape::Mem) => {
                self.expect_a(dst)?;
                Ok(Instruction::LoadAHigh(self.high_page(src)?))
            }
            _ => Err(Error::operand(
                dst.span(),
                "expected register A and an address in the high page",
            )),
        }
    }

    /// LDI and LDD, which are LD through (HL+) and (HL-).
    fn ld_step(&mut self, ind: Indirect) -> Result<Instruction, Error> {
        let dst = self.next()?;
        self.comma()?;
        let src = self.next()?;
        match (self.shape(dst)?, self.shape(src)?) {
            (Shape::R8(Reg8::HlInd), _) => {
                self.expect_a(src)?;
                Ok(Instruction::StoreA(ind))
            }
            (_, Shape::R8(Reg8::HlInd)) => {
                self.expect_a(dst)?;
                Ok(Instruction::LoadA(ind))
            }
            _ => Err(Error::operand(dst.span(), "expected register A and (HL)")),
        }
    }

    /// PUSH and POP.
    fn stack(&mut self, push: bool) -> Result<Instruction, Error> {
        let tok = self.next()?;
        let reg = match tok.kind {
            TokenKind::Identifier => StackReg::from_name(tok.text),
            _ => None,
        };
        match reg {
            Some(reg) if push => Ok(Instruction::Push(reg)),
            Some(reg) => Ok(Instruction::Pop(reg)),
            None => {
                let shape = self.shape(tok)?;
                Err(self.unexpected(tok, shape, "register BC, DE, HL or AF"))
            }
        }
    }
}

#[test]
fn width_message() {
    assert_eq!(
        Width::Either8.check(0xffff).unwrap_err(),
        "0xFFFF is out of range for an 8-bit operand (-0x80..=0xFF)",
    );
    assert_eq!(
        Width::BitIndex.check(8).unwrap_err(),
        "0x08 is out of range for a bit index (0x00..=0x07)",
    );
    assert_eq!(Width::Signed8.check(-128), Ok(-128));
}

#[test]
fn hex_text() {
    assert_eq!(hex(0), "0x00");
    assert_eq!(hex(0x1234), "0x1234");
    assert_eq!(hex(-0x80), "-0x80");
    assert_eq!(hex(-32768), "-0x8000");
}
