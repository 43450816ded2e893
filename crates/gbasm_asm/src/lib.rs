//! A two pass assembler for the Game Boy CPU.
//!
//! The first pass walks the source once. It binds labels and `EQU` constants and records every
//! instruction with its raw operand tokens and address. How long an instruction is only depends on
//! the form of its operands, never on their values, so the addresses are known before any symbol
//! is. The second pass then builds each recorded instruction with the complete symbol table, which
//! is what makes forward references work.
//!
//! ```text
//! source -> Lexer -> tokens -> first pass (Pending + SymbolTable) -> second pass -> Instructions
//! ```

#[macro_use]
extern crate log;

mod gen;
mod grammar;
mod ir;
mod lex;
mod parse;
mod report;
mod symbol;

#[cfg(test)]
mod test;

pub use grammar::Width;
pub use lex::{tokenize, Lexer, Token, TokenKind};
pub use report::{format, format_with_reference};
pub use symbol::{Symbol, SymbolKind, SymbolTable};

use gbasm_isa::Instruction;
use parse::Parser;

use std::fmt;

/// A range of characters on a single line of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
    /// Number of characters.
    pub width: usize,
}

impl Span {
    pub fn new(line: usize, column: usize, width: usize) -> Self {
        Self { line, column, width }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown character, malformed numeric literal or mismatched closing bracket.
    Lexical,
    /// Unexpected token, unterminated statement or unknown mnemonic.
    Grammar,
    /// Not a register, or not a register that can be used here.
    Operand,
    /// Value doesn't fit the operand.
    Range,
    /// Local label without an enclosing global label, or a symbol defined twice.
    Scope,
    /// Symbol that is never bound.
    SymbolResolution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Grammar => "grammar",
            ErrorKind::Operand => "operand",
            ErrorKind::Range => "range",
            ErrorKind::Scope => "scope",
            ErrorKind::SymbolResolution => "symbol resolution",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{span}: {kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
    /// Where the erroring value comes from, fx. the definition of a label.
    refers_to: Option<Span>,
}

impl Error {
    fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self { kind, span, message: message.into(), refers_to: None }
    }

    pub(crate) fn lexical(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lexical, span, message)
    }

    pub(crate) fn grammar(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Grammar, span, message)
    }

    pub(crate) fn operand(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Operand, span, message)
    }

    pub(crate) fn range(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, span, message)
    }

    pub(crate) fn scope(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Scope, span, message)
    }

    pub(crate) fn unresolved(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SymbolResolution, span, message)
    }

    pub(crate) fn refers_to(mut self, span: Option<Span>) -> Self {
        self.refers_to = span;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reference(&self) -> Option<Span> {
        self.refers_to
    }
}

/// An [`Error`] rendered with the source it came from.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{rendered}")]
pub struct Diagnostic {
    error: Error,
    rendered: String,
}

impl Diagnostic {
    pub fn new(source: &str, error: Error) -> Self {
        let header = error.to_string();
        let Span { line, column, width } = error.span;
        let rendered = match error.refers_to {
            Some(reference) => {
                format_with_reference(source, line, column, &header, width, reference)
            }
            None => format(source, line, column, &header, width),
        };
        Self { error, rendered }
    }

    pub fn error(&self) -> &Error {
        &self.error
    }
}

/// An instruction and the address of its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assembled {
    pub address: u16,
    pub instruction: Instruction,
}

/// The result of assembling a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program<'a> {
    instructions: Vec<Assembled>,
    symbols: SymbolTable<'a>,
}

impl<'a> Program<'a> {
    /// Instructions in source order.
    pub fn instructions(&self) -> &[Assembled] {
        &self.instructions
    }

    pub fn symbols(&self) -> &SymbolTable<'a> {
        &self.symbols
    }

    /// The machine code, which is the bytes of every instruction in order.
    pub fn image(&self) -> Vec<u8> {
        self.instructions
            .iter()
            .flat_map(|ins| ins.instruction.bytes())
            .collect()
    }
}

/// Assemble `source`, stopping at the first error. `base` is the address of the first instruction.
pub fn assemble(source: &str, base: u16) -> Result<Program<'_>, Diagnostic> {
    let layout = Parser::new(source, base)
        .parse()
        .map_err(|err| Diagnostic::new(source, err))?;
    let instructions = gen::gen_ins(&layout.pending, &layout.symbols)
        .map_err(|err| Diagnostic::new(source, err))?;
    Ok(Program { instructions, symbols: layout.symbols })
}

/// Assemble `source` like [`assemble`], but keep going after errors and report all of them, in
/// source order.
pub fn assemble_all(source: &str, base: u16) -> Result<Program<'_>, Vec<Diagnostic>> {
    let (layout, mut errors) = Parser::new(source, base).parse_all();
    let (instructions, gen_errors) = gen::gen_all(&layout.pending, &layout.symbols);
    errors.extend(gen_errors);

    if errors.is_empty() {
        return Ok(Program { instructions, symbols: layout.symbols });
    }

    errors.sort_by_key(|err| (err.span.line, err.span.column));
    Err(errors.into_iter().map(|err| Diagnostic::new(source, err)).collect())
}
