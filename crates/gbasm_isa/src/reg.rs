use std::fmt;

/// If `name` is wrapped in matching brackets, fx. `(HL)` or `[HL]`, return what's inside.
fn inside_brackets(name: &str) -> Option<&str> {
    name.strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .or_else(|| name.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')))
}

/// 8-bit register operand. The order is the order the CPU encodes them in, so the discriminant is
/// the 3-bit register field of an opcode. `(HL)`, the byte in memory pointed to by HL, takes the
/// slot between L and A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    HlInd,
    A,
}

impl Reg8 {
    pub const ALL: [Reg8; 8] = [
        Reg8::B, Reg8::C, Reg8::D, Reg8::E, Reg8::H, Reg8::L, Reg8::HlInd, Reg8::A,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Register from the lower 3 bits of `idx`.
    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x7) as usize]
    }

    /// Look up a register by name. Not case sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(inner) = inside_brackets(name) {
            return inner.eq_ignore_ascii_case("HL").then_some(Reg8::HlInd);
        }
        let reg = match name.to_ascii_uppercase().as_str() {
            "B" => Reg8::B,
            "C" => Reg8::C,
            "D" => Reg8::D,
            "E" => Reg8::E,
            "H" => Reg8::H,
            "L" => Reg8::L,
            "A" => Reg8::A,
            _ => return None,
        };
        Some(reg)
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
        f.write_str(NAMES[self.index() as usize])
    }
}

/// 16-bit register pair used by 16-bit loads and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg16 {
    Bc,
    De,
    Hl,
    Sp,
}

impl Reg16 {
    pub const ALL: [Reg16; 4] = [Reg16::Bc, Reg16::De, Reg16::Hl, Reg16::Sp];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x3) as usize]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let reg = match name.to_ascii_uppercase().as_str() {
            "BC" => Reg16::Bc,
            "DE" => Reg16::De,
            "HL" => Reg16::Hl,
            "SP" => Reg16::Sp,
            _ => return None,
        };
        Some(reg)
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [&str; 4] = ["BC", "DE", "HL", "SP"];
        f.write_str(NAMES[self.index() as usize])
    }
}

/// Register pair used by PUSH and POP. Same as [`Reg16`] except AF replaces SP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackReg {
    Bc,
    De,
    Hl,
    Af,
}

impl StackReg {
    pub const ALL: [StackReg; 4] = [StackReg::Bc, StackReg::De, StackReg::Hl, StackReg::Af];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x3) as usize]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let reg = match name.to_ascii_uppercase().as_str() {
            "BC" => StackReg::Bc,
            "DE" => StackReg::De,
            "HL" => StackReg::Hl,
            "AF" => StackReg::Af,
            _ => return None,
        };
        Some(reg)
    }
}

impl fmt::Display for StackReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [&str; 4] = ["BC", "DE", "HL", "AF"];
        f.write_str(NAMES[self.index() as usize])
    }
}

/// Memory operand addressed by a register pair and only usable together with register A.
/// `(HL+)` and `(HL-)` increment or decrement HL after the access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirect {
    Bc,
    De,
    HlInc,
    HlDec,
}

impl Indirect {
    pub const ALL: [Indirect; 4] = [Indirect::Bc, Indirect::De, Indirect::HlInc, Indirect::HlDec];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x3) as usize]
    }

    /// `(HLI)` and `(HLD)` are accepted as alternative spellings of `(HL+)` and `(HL-)`.
    pub fn from_name(name: &str) -> Option<Self> {
        let ind = match inside_brackets(name)?.to_ascii_uppercase().as_str() {
            "BC" => Indirect::Bc,
            "DE" => Indirect::De,
            "HL+" | "HLI" => Indirect::HlInc,
            "HL-" | "HLD" => Indirect::HlDec,
            _ => return None,
        };
        Some(ind)
    }
}

impl fmt::Display for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [&str; 4] = ["(BC)", "(DE)", "(HL+)", "(HL-)"];
        f.write_str(NAMES[self.index() as usize])
    }
}

/// Branch condition on the zero and carry flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
}

impl Cond {
    pub const ALL: [Cond; 4] = [Cond::Nz, Cond::Z, Cond::Nc, Cond::C];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 0x3) as usize]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let cond = match name.to_ascii_uppercase().as_str() {
            "NZ" => Cond::Nz,
            "Z" => Cond::Z,
            "NC" => Cond::Nc,
            "C" => Cond::C,
            _ => return None,
        };
        Some(cond)
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [&str; 4] = ["NZ", "Z", "NC", "C"];
        f.write_str(NAMES[self.index() as usize])
    }
}

/// `(C)`: the high page address `0xFF00 + C`.
pub fn is_high_c(name: &str) -> bool {
    inside_brackets(name).map_or(false, |inner| inner.eq_ignore_ascii_case("C"))
}

/// If `name` is the name of any register, register pair or register memory operand.
pub fn is_register_name(name: &str) -> bool {
    Reg8::from_name(name).is_some()
        || Reg16::from_name(name).is_some()
        || StackReg::from_name(name).is_some()
        || Indirect::from_name(name).is_some()
        || is_high_c(name)
        || inside_brackets(name).map_or(false, |inner| Reg16::from_name(inner).is_some())
}

#[test]
fn names() {
    assert_eq!(Reg8::from_name("a"), Some(Reg8::A));
    assert_eq!(Reg8::from_name("(hl)"), Some(Reg8::HlInd));
    assert_eq!(Reg8::from_name("[HL]"), Some(Reg8::HlInd));
    assert_eq!(Reg8::from_name("(HL]"), None);
    assert_eq!(Reg8::from_name("(BC)"), None);
    assert_eq!(Reg16::from_name("sp"), Some(Reg16::Sp));
    assert_eq!(StackReg::from_name("AF"), Some(StackReg::Af));
    assert_eq!(Indirect::from_name("[hl-]"), Some(Indirect::HlDec));
    assert_eq!(Indirect::from_name("(HLI)"), Some(Indirect::HlInc));
    assert_eq!(Cond::from_name("nc"), Some(Cond::Nc));
}

#[test]
fn register_probe() {
    for name in ["A", "(HL)", "[HL]", "BC", "af", "(C)", "(DE)", "(HL+)", "(SP)"] {
        assert!(is_register_name(name), "{name}");
    }
    for name in ["LABEL", "(LABEL)", "NZ", "F", "(0x10)"] {
        assert!(!is_register_name(name), "{name}");
    }
}
