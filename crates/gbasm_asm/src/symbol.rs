use crate::lex::{Token, TokenKind};
use crate::Error;

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Bound to the address of the next instruction.
    Label,
    /// Bound by `EQU`.
    Constant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding<'a> {
    Value(i32),
    /// Bound to the value of another symbol, by key. The other symbol may be bound later.
    Alias(String, Token<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol<'a> {
    kind: SymbolKind,
    binding: Binding<'a>,
    /// The token that defined the symbol.
    token: Token<'a>,
}

impl<'a> Symbol<'a> {
    pub(crate) fn label(address: u32, token: Token<'a>) -> Self {
        Self { kind: SymbolKind::Label, binding: Binding::Value(address as i32), token }
    }

    pub(crate) fn constant(value: i32, token: Token<'a>) -> Self {
        Self { kind: SymbolKind::Constant, binding: Binding::Value(value), token }
    }

    pub(crate) fn alias(key: String, to: Token<'a>, token: Token<'a>) -> Self {
        Self { kind: SymbolKind::Constant, binding: Binding::Alias(key, to), token }
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn token(&self) -> &Token<'a> {
        &self.token
    }
}

/// Why following a chain of aliases failed.
enum Chase<'s, 'a> {
    Unknown(&'s str, &'s Token<'a>),
    Cycle,
}

/// Labels and constants by name. Local labels are stored under the name of their global label
/// followed by their own, fx. 'MAIN.loop'.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable<'a> {
    symbols: BTreeMap<String, Symbol<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `symbol`. Fails if `key` is already bound.
    pub(crate) fn bind(&mut self, key: String, symbol: Symbol<'a>) -> Result<(), Error> {
        if let Some(prev) = self.symbols.get(&key) {
            let msg = format!("duplicate symbol '{key}'");
            return Err(Error::scope(symbol.token.span(), msg).refers_to(Some(prev.token.span())));
        }
        trace!("bind '{key}' at line {}", symbol.token.line);
        self.symbols.insert(key, symbol);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Symbol<'a>> {
        self.symbols.get(key)
    }

    fn chase<'s>(&'s self, symbol: &'s Symbol<'a>) -> Result<i32, Chase<'s, 'a>> {
        let mut current = symbol;
        // Any chain longer than the table must loop.
        for _ in 0..=self.symbols.len() {
            match &current.binding {
                Binding::Value(value) => return Ok(*value),
                Binding::Alias(key, token) => {
                    current = self.symbols.get(key).ok_or(Chase::Unknown(key, token))?;
                }
            }
        }
        Err(Chase::Cycle)
    }

    /// The value of `key`, following aliases. `None` if it isn't bound or the aliases loop.
    pub fn value(&self, key: &str) -> Option<i32> {
        self.symbols.get(key).and_then(|symbol| self.chase(symbol).ok())
    }

    /// Resolve `key` referenced by the token `at`. Returns the value and the token that defined
    /// the symbol.
    pub(crate) fn resolve(&self, key: &str, at: &Token<'a>) -> Result<(i32, Token<'a>), Error> {
        let symbol = self
            .symbols
            .get(key)
            .ok_or_else(|| Error::unresolved(at.span(), format!("unknown symbol '{key}'")))?;
        match self.chase(symbol) {
            Ok(value) => Ok((value, symbol.token)),
            Err(Chase::Unknown(next, token)) => {
                Err(Error::unresolved(token.span(), format!("unknown symbol '{next}'")))
            }
            Err(Chase::Cycle) => Err(Error::unresolved(
                at.span(),
                format!("the definition of '{key}' refers to itself"),
            )
            .refers_to(Some(symbol.token.span()))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol<'a>)> {
        self.symbols.iter().map(|(key, symbol)| (key.as_str(), symbol))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// The key a symbol is bound and looked up under. Local labels are qualified with `scope`, the
/// nearest global label before them.
pub(crate) fn key(scope: Option<&str>, tok: &Token) -> Result<String, Error> {
    match tok.kind {
        TokenKind::LocalLabel => {
            let name = tok.text.trim_end_matches(':');
            match scope {
                Some(global) => Ok(format!("{global}{name}")),
                None => Err(Error::scope(
                    tok.span(),
                    format!("local label '{name}' has no global label before it"),
                )),
            }
        }
        _ => Ok(tok.unbracketed().trim_end_matches(':').to_string()),
    }
}

#[cfg(test)]
fn tok(kind: TokenKind, text: &str) -> Token {
    Token::new(kind, text, 1, 1).unwrap()
}

#[test]
fn keys() {
    let local = tok(TokenKind::LocalLabel, ".loop:");
    assert_eq!(key(Some("MAIN"), &local).unwrap(), "MAIN.loop");
    assert_eq!(key(None, &local).unwrap_err().kind(), crate::ErrorKind::Scope);

    assert_eq!(key(None, &tok(TokenKind::GlobalLabel, "MAIN:")).unwrap(), "MAIN");
    assert_eq!(key(Some("MAIN"), &tok(TokenKind::Identifier, "[DATA]")).unwrap(), "DATA");
}

#[test]
fn duplicate() {
    let mut table = SymbolTable::new();
    let first = Token::new(TokenKind::GlobalLabel, "A:", 1, 1).unwrap();
    let second = Token::new(TokenKind::GlobalLabel, "A:", 4, 1).unwrap();

    table.bind("A".to_string(), Symbol::label(0, first)).unwrap();
    let err = table.bind("A".to_string(), Symbol::label(8, second)).unwrap_err();

    assert_eq!(err.kind(), crate::ErrorKind::Scope);
    assert_eq!(err.span().line, 4);
    assert_eq!(err.reference().map(|span| span.line), Some(1));
    assert_eq!(table.value("A"), Some(0));
}

#[test]
fn aliases() {
    let mut table = SymbolTable::new();
    let at = tok(TokenKind::Identifier, "X");

    table.bind("X".to_string(), Symbol::alias("Y".to_string(), tok(TokenKind::Identifier, "Y"), at)).unwrap();
    assert!(table.resolve("X", &at).is_err());

    table.bind("Y".to_string(), Symbol::constant(5, tok(TokenKind::Identifier, "Y"))).unwrap();
    assert_eq!(table.resolve("X", &at).unwrap().0, 5);
    assert_eq!(table.value("X"), Some(5));
}

#[test]
fn alias_cycle() {
    let mut table = SymbolTable::new();
    let a = tok(TokenKind::Identifier, "A");
    let b = tok(TokenKind::Identifier, "B");

    table.bind("A".to_string(), Symbol::alias("B".to_string(), b, a)).unwrap();
    table.bind("B".to_string(), Symbol::alias("A".to_string(), a, b)).unwrap();

    let err = table.resolve("A", &a).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::SymbolResolution);
    assert_eq!(table.value("B"), None);
}
