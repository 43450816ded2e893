//! The first pass.

use crate::grammar::{self, Values};
use crate::ir::{Mnemonic, Pending};
use crate::lex::{Lexer, Token, TokenKind};
use crate::symbol::{self, Symbol, SymbolTable};
use crate::Error;

use gbasm_isa::{decode_length, is_register_name};

/// Size of the address space.
const ADDRESS_SPACE: u32 = 0x1_0000;

/// The result of the first pass.
pub(crate) struct Layout<'a> {
    /// Instructions in source order.
    pub pending: Vec<Pending<'a>>,
    pub symbols: SymbolTable<'a>,
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    /// The token after the current, if it has been scanned.
    peeked: Option<Token<'a>>,
    symbols: SymbolTable<'a>,
    pending: Vec<Pending<'a>>,
    /// Address of the next instruction.
    address: u32,
    /// The latest global label.
    scope: Option<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, base: u16) -> Self {
        Self {
            lexer: Lexer::new(input),
            peeked: None,
            symbols: SymbolTable::new(),
            pending: Vec::new(),
            address: base.into(),
            scope: None,
        }
    }

    fn next(&mut self) -> Result<Token<'a>, Error> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<Token<'a>, Error> {
        let tok = match self.peeked {
            Some(tok) => tok,
            None => self.lexer.next_token()?,
        };
        self.peeked = Some(tok);
        Ok(tok)
    }

    /// Consume the next token, failing without consuming it if it ends the line.
    fn next_in_line(&mut self, after: &Token<'a>) -> Result<Token<'a>, Error> {
        let tok = self.peek()?;
        if tok.is_line_end() {
            return Err(Error::grammar(
                after.span(),
                format!("unexpected {} after {}", tok.describe(), after.describe()),
            ));
        }
        self.next()
    }

    /// Parse the whole input, stopping at the first error.
    pub fn parse(mut self) -> Result<Layout<'a>, Error> {
        while self.parse_statement()? {}
        Ok(self.finish())
    }

    /// Parse the whole input, skipping the rest of the line after each error. Returns the layout of
    /// the statements that parsed and every error.
    pub fn parse_all(mut self) -> (Layout<'a>, Vec<Error>) {
        let mut errors = Vec::new();
        loop {
            match self.parse_statement() {
                Ok(true) => (),
                Ok(false) => break,
                Err(err) => {
                    debug!("skipping line {}: {err}", err.span().line);
                    errors.push(err);
                    self.recover();
                }
            }
        }
        (self.finish(), errors)
    }

    fn finish(self) -> Layout<'a> {
        debug!(
            "first pass done: {} instructions, {} symbols, ends at {:#06x}",
            self.pending.len(),
            self.symbols.len(),
            self.address,
        );
        Layout { pending: self.pending, symbols: self.symbols }
    }

    /// Discard every token up to and including the end of the line. Each lexical error skips the
    /// rest of the line, so this always makes progress.
    fn recover(&mut self) {
        loop {
            match self.next() {
                Ok(tok) if tok.is_line_end() => break,
                Ok(_) => (),
                Err(_) => self.lexer.skip_line(),
            }
        }
    }

    /// Parse a single statement. Returns false when the end of input is reached.
    fn parse_statement(&mut self) -> Result<bool, Error> {
        let mut tok = self.next()?;
        match tok.kind {
            TokenKind::EndOfFile => return Ok(false),
            TokenKind::EndOfLine => return Ok(true),
            TokenKind::GlobalLabel | TokenKind::LocalLabel => {
                self.define_label(&tok)?;
                if self.peek()?.is_line_end() {
                    return self.end_of_statement();
                }
                tok = self.next()?;
            }
            _ => (),
        }
        match tok.kind {
            TokenKind::Identifier if self.peek_equ()? => self.parse_equ(tok)?,
            TokenKind::Identifier => self.parse_next_instruction(tok)?,
            _ => {
                return Err(Error::grammar(
                    tok.span(),
                    format!("expected label, constant or instruction, found {}", tok.describe()),
                ));
            }
        }
        self.end_of_statement()
    }

    /// Require the end of the line. Returns false at the end of input.
    fn end_of_statement(&mut self) -> Result<bool, Error> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::EndOfLine => Ok(true),
            TokenKind::EndOfFile => Ok(false),
            _ => Err(Error::grammar(
                tok.span(),
                format!("expected end of line, found {}", tok.describe()),
            )),
        }
    }

    fn define_label(&mut self, tok: &Token<'a>) -> Result<(), Error> {
        if tok.kind == TokenKind::GlobalLabel {
            let name = tok.text.trim_end_matches(':');
            if is_register_name(name) {
                return Err(Error::grammar(
                    tok.span(),
                    format!("register name '{name}' can't be used as a label"),
                ));
            }
            self.scope = Some(name);
        }
        let key = symbol::key(self.scope, tok)?;
        self.symbols.bind(key, Symbol::label(self.address, *tok))
    }

    fn peek_equ(&mut self) -> Result<bool, Error> {
        let tok = self.peek()?;
        Ok(tok.kind == TokenKind::Identifier && tok.text.eq_ignore_ascii_case("EQU"))
    }

    /// `NAME EQU <number or symbol>`.
    fn parse_equ(&mut self, name: Token<'a>) -> Result<(), Error> {
        let equ = self.next()?;
        if is_register_name(name.text) || name.is_bracketed() {
            return Err(Error::grammar(
                name.span(),
                format!("'{}' can't be used as a constant name", name.text),
            ));
        }
        let tok = self.next_in_line(&equ)?;
        let symbol = match (tok.kind, tok.value) {
            (TokenKind::Number, Some(value)) => Symbol::constant(value, name),
            (TokenKind::Identifier, _) if is_register_name(tok.text) => {
                return Err(Error::operand(
                    tok.span(),
                    format!("expected a number or symbol, found register {}", tok.text),
                ));
            }
            (TokenKind::Identifier | TokenKind::LocalLabel, _) if !tok.is_bracketed() => {
                Symbol::alias(symbol::key(self.scope, &tok)?, tok, name)
            }
            _ => {
                return Err(Error::grammar(
                    tok.span(),
                    format!("expected a number or symbol after EQU, found {}", tok.describe()),
                ));
            }
        };
        self.symbols.bind(name.text.to_string(), symbol)
    }

    /// Record the instruction with the mnemonic `name` and advance the address by its length.
    fn parse_next_instruction(&mut self, name: Token<'a>) -> Result<(), Error> {
        let mnemonic = Mnemonic::from_name(name.text).ok_or_else(|| {
            Error::grammar(name.span(), format!("unknown mnemonic '{}'", name.text))
        })?;

        let mut operands = Vec::new();
        while !self.peek()?.is_line_end() {
            operands.push(self.next()?);
        }

        let pending = Pending {
            mnemonic,
            name,
            operands,
            address: self.address as u16,
            scope: self.scope,
        };

        let ins = grammar::build(&pending, &Values::Layout)?;
        let len = decode_length(ins.opcode().first_byte()) as u32;

        if self.address + len > ADDRESS_SPACE {
            return Err(Error::range(
                name.span(),
                format!("instruction at {:#06x} doesn't fit in the address space", self.address),
            ));
        }

        trace!("{:#06x}: {len} byte(s) for line {}", self.address, name.line);

        self.address += len;
        self.pending.push(pending);

        Ok(())
    }
}
