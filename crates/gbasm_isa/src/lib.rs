//! Instruction set of the Game Boy CPU, a Z80-like 8-bit CPU. Only the encoding is modelled, not
//! what the instructions do.

mod ins;
mod opcode;
mod reg;

pub use ins::{AluOp, BitOp, Encoding, Fixed, Instruction, Opcode, ShiftOp, PREFIX};
pub use opcode::{decode, decode_length};
pub use reg::{is_high_c, is_register_name, Cond, Indirect, Reg16, Reg8, StackReg};
