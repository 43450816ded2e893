use crate::lex::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    Inc,
    Dec,
    Bit,
    Res,
    Set,
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Jp,
    Jr,
    Call,
    Ret,
    Reti,
    Rst,
    Ld,
    Ldh,
    Ldi,
    Ldd,
    Push,
    Pop,
    Nop,
    Halt,
    Stop,
    Di,
    Ei,
    Scf,
    Ccf,
    Cpl,
    Daa,
}

impl Mnemonic {
    /// Look up a mnemonic by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let mnemonic = match name.to_ascii_uppercase().as_str() {
            "ADD" => Mnemonic::Add,
            "ADC" => Mnemonic::Adc,
            "SUB" => Mnemonic::Sub,
            "SBC" => Mnemonic::Sbc,
            "AND" => Mnemonic::And,
            "XOR" => Mnemonic::Xor,
            "OR" => Mnemonic::Or,
            "CP" => Mnemonic::Cp,
            "INC" => Mnemonic::Inc,
            "DEC" => Mnemonic::Dec,
            "BIT" => Mnemonic::Bit,
            "RES" => Mnemonic::Res,
            "SET" => Mnemonic::Set,
            "RLC" => Mnemonic::Rlc,
            "RRC" => Mnemonic::Rrc,
            "RL" => Mnemonic::Rl,
            "RR" => Mnemonic::Rr,
            "SLA" => Mnemonic::Sla,
            "SRA" => Mnemonic::Sra,
            "SWAP" => Mnemonic::Swap,
            "SRL" => Mnemonic::Srl,
            "RLCA" => Mnemonic::Rlca,
            "RRCA" => Mnemonic::Rrca,
            "RLA" => Mnemonic::Rla,
            "RRA" => Mnemonic::Rra,
            "JP" => Mnemonic::Jp,
            "JR" => Mnemonic::Jr,
            "CALL" => Mnemonic::Call,
            "RET" => Mnemonic::Ret,
            "RETI" => Mnemonic::Reti,
            "RST" => Mnemonic::Rst,
            "LD" => Mnemonic::Ld,
            "LDH" => Mnemonic::Ldh,
            "LDI" => Mnemonic::Ldi,
            "LDD" => Mnemonic::Ldd,
            "PUSH" => Mnemonic::Push,
            "POP" => Mnemonic::Pop,
            "NOP" => Mnemonic::Nop,
            "HALT" => Mnemonic::Halt,
            "STOP" => Mnemonic::Stop,
            "DI" => Mnemonic::Di,
            "EI" => Mnemonic::Ei,
            "SCF" => Mnemonic::Scf,
            "CCF" => Mnemonic::Ccf,
            "CPL" => Mnemonic::Cpl,
            "DAA" => Mnemonic::Daa,
            _ => return None,
        };
        Some(mnemonic)
    }
}

/// An instruction with unresolved operands, as recorded by the first pass.
#[derive(Debug, Clone)]
pub struct Pending<'a> {
    pub mnemonic: Mnemonic,
    /// The mnemonic token.
    pub name: Token<'a>,
    /// Every token after the mnemonic up to the end of the line.
    pub operands: Vec<Token<'a>>,
    /// Address of the first byte of the instruction.
    pub address: u16,
    /// The global label local label references are qualified with.
    pub scope: Option<&'a str>,
}

#[test]
fn mnemonic_case() {
    assert_eq!(Mnemonic::from_name("ld"), Some(Mnemonic::Ld));
    assert_eq!(Mnemonic::from_name("Swap"), Some(Mnemonic::Swap));
    assert_eq!(Mnemonic::from_name("EQU"), None);
    assert_eq!(Mnemonic::from_name("MOV"), None);
}
