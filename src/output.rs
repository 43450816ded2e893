//! Writers for assembled programs and binary images.

use gbasm_asm::Program;
use gbasm_isa::{decode, decode_length, Encoding};

/// A listing line, formatted as `0xADDRESS : [0xOPCODE] MNEMONIC`.
fn line(address: u16, encoding: &Encoding) -> String {
    format!("0x{address:04X} : [{}] {}\n", encoding.opcode, encoding.mnemonic)
}

/// List every instruction of `program` with its address.
pub fn listing(program: &Program) -> String {
    program
        .instructions()
        .iter()
        .map(|ins| line(ins.address, &ins.instruction.encode()))
        .collect()
}

/// List the instructions of the binary image `bytes` starting at address `base`. Bytes that don't
/// start an instruction are listed as data.
pub fn disassemble(bytes: &[u8], base: u16) -> String {
    let mut out = String::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let address = base.wrapping_add(pos as u16);
        match decode(&bytes[pos..]) {
            Some(ins) => {
                out.push_str(&line(address, &ins.encode()));
                pos += decode_length(bytes[pos]);
            }
            None => {
                trace!("no instruction at {address:#06x}");
                out.push_str(&format!("0x{address:04X} : [0x{:02X}] DB 0x{:02X}\n", bytes[pos], bytes[pos]));
                pos += 1;
            }
        }
    }
    out
}

#[test]
fn listing_format() {
    let program = gbasm_asm::assemble("MAIN:\nJP MAIN\nBIT 7, H\nNOP", 0x150).unwrap();
    assert_eq!(
        listing(&program),
        "0x0150 : [0xC3] JP 0x0150\n\
         0x0153 : [0xCB7C] BIT 7, H\n\
         0x0155 : [0x00] NOP\n",
    );
}

#[test]
fn disassembly() {
    let bytes = [0x3e, 0x12, 0xd3, 0x18, 0xfe, 0xc3];
    assert_eq!(
        disassemble(&bytes, 0x100),
        "0x0100 : [0x3E] LD A, 0x12\n\
         0x0102 : [0xD3] DB 0xD3\n\
         0x0103 : [0x18] JR -0x02\n\
         0x0105 : [0xC3] DB 0xC3\n",
    );
}

#[test]
fn disassembly_matches_listing() {
    let source = "LD HL, 0xC000\n.fill: LD (HL+), A\nDEC B\nJR NZ, -4\nRET";
    let source = format!("MAIN:\n{source}");
    let program = gbasm_asm::assemble(&source, 0).unwrap();
    assert_eq!(disassemble(&program.image(), 0), listing(&program));
}
