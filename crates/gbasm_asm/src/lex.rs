use crate::{Error, Span};

use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Mnemonic, register, condition or symbol reference. Can be in brackets, fx. '(HL)' or
    /// '[LABEL]'.
    Identifier,
    /// Integer literal with an optional sign, fx. '-0x12'.
    Number,
    Comma,
    /// Integer literal in brackets, fx. '(0xff80)'.
    Address,
    /// Identifier followed by a ':'.
    GlobalLabel,
    /// '.' followed by a name and optionally a ':'.
    LocalLabel,
    /// 'SP' followed by a signed integer, fx. 'SP+4'.
    SpShifted,
    /// One or more line breaks.
    EndOfLine,
    EndOfFile,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The source text of the token, including brackets, signs and ':'.
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
    /// The value of Number, Address and SpShifted tokens.
    pub value: Option<i32>,
}

impl<'a> Token<'a> {
    /// Create a new token. Fails if it's a numeric token and the literal doesn't parse.
    pub fn new(kind: TokenKind, text: &'a str, line: usize, column: usize) -> Result<Self, Error> {
        let literal = match kind {
            TokenKind::Number => Some(Some(text)),
            TokenKind::Address => Some(text.get(1..text.len().saturating_sub(1))),
            TokenKind::SpShifted => Some(text.get(2..)),
            _ => None,
        };
        let value = literal
            .map(|literal| {
                literal.and_then(parse_number).ok_or_else(|| {
                    let span = Span::new(line, column, text.chars().count().max(1));
                    Error::lexical(span, format!("malformed numeric literal '{text}'"))
                })
            })
            .transpose()?;
        Ok(Self { kind, text, line, column, value })
    }

    pub fn span(&self) -> Span {
        Span::new(self.line, self.column, self.text.chars().count().max(1))
    }

    pub fn is_line_end(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfLine | TokenKind::EndOfFile)
    }

    pub fn is_bracketed(&self) -> bool {
        self.text.starts_with(['(', '['])
    }

    /// The text without surrounding brackets.
    pub fn unbracketed(&self) -> &'a str {
        if self.is_bracketed() {
            self.text.get(1..self.text.len() - 1).unwrap_or("")
        } else {
            self.text
        }
    }

    /// The token as written in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfLine => "end of line".to_string(),
            TokenKind::EndOfFile => "end of file".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Parse a decimal or '0x' prefixed hexadecimal integer with an optional sign.
fn parse_number(text: &str) -> Option<i32> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_id_con(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Inside brackets '+' and '-' are allowed as well, for '(HL+)' and '(HL-)'.
fn is_bracketed_con(c: char) -> bool {
    is_id_con(c) || matches!(c, '+' | '-')
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn describe_char(c: char) -> String {
    match c {
        '\n' => "end of line".to_string(),
        '\0' => "end of file".to_string(),
        c => format!("'{c}'"),
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Chars<'a>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.chars(), line: 1, column: 1 }
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::lexical(Span::new(self.line, self.column, 1), msg)
    }

    /// Peak one character ahead.
    fn first(&self) -> char {
        self.chars.clone().next().unwrap_or('\0')
    }

    /// Peak two characters ahead.
    fn second(&self) -> char {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next().unwrap_or('\0')
    }

    /// If the whole input has been consumed.
    fn is_done(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Consume a single character.
    fn eat(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume a single character if it matches 'c'.
    fn eat_char(&mut self, c: char) -> bool {
        if self.first() == c && !self.is_done() {
            self.eat();
            true
        } else {
            false
        }
    }

    /// Consume characters until pred doesn't return true. Returns the amount of characters
    /// consumed.
    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let mut eaten = 0;
        while pred(self.first()) && !self.is_done() {
            self.eat();
            eaten += 1;
        }
        eaten
    }

    /// Consume whitespace and a comment, but not the line break.
    fn eat_whitespace(&mut self) {
        self.eat_while(is_whitespace);
        if self.first() == ';' {
            self.eat_while(|c| c != '\n');
        }
    }

    /// Skip the rest of the current line, leaving the line break.
    pub fn skip_line(&mut self) {
        self.eat_while(|c| c != '\n');
    }

    /// Scan the token in brackets after the opening bracket `open` has been consumed.
    fn eat_bracketed(&mut self, open: char) -> Result<TokenKind, Error> {
        let close = if open == '(' { ')' } else { ']' };
        let kind = match self.first() {
            c if is_id_start(c) => {
                self.eat_while(is_bracketed_con);
                TokenKind::Identifier
            }
            c if c.is_ascii_digit() => {
                self.eat_while(is_id_con);
                TokenKind::Address
            }
            c => {
                return Err(self.err(format!(
                    "expected register, symbol or address after '{open}', found {}",
                    describe_char(c),
                )));
            }
        };
        if !self.eat_char(close) {
            return Err(self.err(format!(
                "expected '{close}' to close '{open}', found {}",
                describe_char(self.first()),
            )));
        }
        Ok(kind)
    }

    /// Scan the next token. Returns an Invalid token for characters that can't start a token.
    fn scan(&mut self) -> Result<Token<'a>, Error> {
        self.eat_whitespace();

        let (line, column) = (self.line, self.column);
        let start = self.chars.as_str();

        let kind = match self.first() {
            _ if self.is_done() => TokenKind::EndOfFile,
            '\n' => {
                // Collapse blank and comment only lines into a single token.
                while self.first() == '\n' && !self.is_done() {
                    self.eat();
                    self.eat_whitespace();
                }
                let kind = if self.is_done() {
                    TokenKind::EndOfFile
                } else {
                    TokenKind::EndOfLine
                };
                return Token::new(kind, &start[..1], line, column);
            }
            ',' => {
                self.eat();
                TokenKind::Comma
            }
            '.' => {
                self.eat();
                if self.eat_while(is_id_con) == 0 {
                    return Err(self.err(format!(
                        "expected label name after '.', found {}",
                        describe_char(self.first()),
                    )));
                }
                self.eat_char(':');
                TokenKind::LocalLabel
            }
            open @ ('(' | '[') => {
                self.eat();
                self.eat_bracketed(open)?
            }
            c @ ('+' | '-' | '0'..='9') => {
                self.eat();
                if !c.is_ascii_digit() && !self.first().is_ascii_digit() {
                    return Err(self.err(format!(
                        "malformed numeric literal, expected digit after '{c}'"
                    )));
                }
                self.eat_while(is_id_con);
                TokenKind::Number
            }
            c if is_id_start(c) => {
                let len = self.eat_while(is_id_con);
                let id = &start[..len];
                let sign = matches!(self.first(), '+' | '-');
                if id.eq_ignore_ascii_case("SP") && sign && self.second().is_ascii_digit() {
                    self.eat();
                    self.eat_while(is_id_con);
                    TokenKind::SpShifted
                } else if self.eat_char(':') {
                    TokenKind::GlobalLabel
                } else {
                    TokenKind::Identifier
                }
            }
            _ => {
                self.eat();
                TokenKind::Invalid
            }
        };

        let text = &start[..start.len() - self.chars.as_str().len()];
        Token::new(kind, text, line, column)
    }

    /// Scan the next token. Returns an EndOfFile token every time after the whole input has been
    /// consumed.
    pub fn next_token(&mut self) -> Result<Token<'a>, Error> {
        let tok = self.scan()?;
        if tok.kind == TokenKind::Invalid {
            return Err(Error::lexical(
                tok.span(),
                format!("unexpected character '{}'", tok.text),
            ));
        }
        Ok(tok)
    }
}

/// Make an iterator of tokens from an input string. Stops before the EndOfFile token.
pub fn tokenize(input: &str) -> impl Iterator<Item = Result<Token, Error>> + Clone + '_ {
    let mut lexer = Lexer::new(input);
    std::iter::from_fn(move || match lexer.next_token() {
        Ok(t) if t.kind == TokenKind::EndOfFile => None,
        t => Some(t),
    })
}

#[cfg(test)]
fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
    tokenize(input)
        .map(|t| t.unwrap())
        .map(|t| (t.kind, t.text))
        .collect()
}

#[test]
fn comment() {
    let input = "
        ; Comment Comment Comment.
        ADD A, B ; Comment
        ; Comment Comment Comment.
    ";
    assert_eq!(kinds(input), [
        (TokenKind::EndOfLine, "\n"),
        (TokenKind::Identifier, "ADD"),
        (TokenKind::Identifier, "A"),
        (TokenKind::Comma, ","),
        (TokenKind::Identifier, "B"),
    ]);
}

#[test]
fn number() {
    let input = "42 -0x42 +7 0XfF 0x7fffffff";
    let values: Vec<Option<i32>> = tokenize(input).map(|t| t.unwrap().value).collect();
    assert_eq!(values, [Some(42), Some(-0x42), Some(7), Some(0xff), Some(i32::MAX)]);
}

#[test]
fn malformed_number() {
    for input in ["0x", "12ab", "0x1g", "99999999999", "- 5", "(0x12z)"] {
        let err = Lexer::new(input).next_token().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Lexical, "{input}");
    }
}

#[test]
fn short_numeric_tokens() {
    for (kind, text) in [
        (TokenKind::Address, ""),
        (TokenKind::Address, "("),
        (TokenKind::SpShifted, "S"),
        (TokenKind::SpShifted, "é"),
    ] {
        let err = Token::new(kind, text, 1, 1).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Lexical, "{text}");
    }
}

#[test]
fn brackets() {
    assert_eq!(kinds("(HL) [hl+] (0xff80) [LABEL]"), [
        (TokenKind::Identifier, "(HL)"),
        (TokenKind::Identifier, "[hl+]"),
        (TokenKind::Address, "(0xff80)"),
        (TokenKind::Identifier, "[LABEL]"),
    ]);

    let tok = Lexer::new("[0x10]").next_token().unwrap();
    assert_eq!(tok.value, Some(0x10));
    assert_eq!(tok.unbracketed(), "0x10");
}

#[test]
fn mismatched_bracket() {
    let err = Lexer::new("LD A, (HL]").nth_err(3);
    assert_eq!(err.kind(), crate::ErrorKind::Lexical);
    assert_eq!((err.span().line, err.span().column), (1, 10));

    let err = Lexer::new("(BC\n").next_token().unwrap_err();
    assert_eq!(err.message(), "expected ')' to close '(', found end of line");
}

#[cfg(test)]
impl<'a> Lexer<'a> {
    /// Scan `n` tokens successfully and return the error of the next.
    fn nth_err(mut self, n: usize) -> Error {
        for _ in 0..n {
            self.next_token().unwrap();
        }
        self.next_token().unwrap_err()
    }
}

#[test]
fn labels() {
    assert_eq!(kinds("MAIN: .loop .end: JP .loop"), [
        (TokenKind::GlobalLabel, "MAIN:"),
        (TokenKind::LocalLabel, ".loop"),
        (TokenKind::LocalLabel, ".end:"),
        (TokenKind::Identifier, "JP"),
        (TokenKind::LocalLabel, ".loop"),
    ]);
}

#[test]
fn sp_shifted() {
    let toks: Vec<Token> = tokenize("SP+4 sp-0x10 SP").map(|t| t.unwrap()).collect();
    assert_eq!(toks[0].kind, TokenKind::SpShifted);
    assert_eq!(toks[0].value, Some(4));
    assert_eq!(toks[1].kind, TokenKind::SpShifted);
    assert_eq!(toks[1].value, Some(-0x10));
    assert_eq!(toks[2].kind, TokenKind::Identifier);
}

#[test]
fn blank_lines() {
    let input = "NOP\n\n   \n; comment\n\nHALT\n\n";
    assert_eq!(kinds(input), [
        (TokenKind::Identifier, "NOP"),
        (TokenKind::EndOfLine, "\n"),
        (TokenKind::Identifier, "HALT"),
    ]);
}

#[test]
fn position() {
    let mut lexer = Lexer::new("NOP\n\n  LD A, 0x12\n");
    let toks: Vec<(usize, usize)> = std::iter::from_fn(|| {
        let tok = lexer.next_token().unwrap();
        (tok.kind != TokenKind::EndOfFile).then(|| (tok.line, tok.column))
    })
    .collect();
    assert_eq!(toks, [(1, 1), (1, 4), (3, 3), (3, 6), (3, 7), (3, 9)]);
}

#[test]
fn end_of_file() {
    let mut lexer = Lexer::new("NOP");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
    for _ in 0..3 {
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EndOfFile);
    }
}

#[test]
fn invalid_character() {
    let err = Lexer::new("LD A, #5").nth_err(3);
    assert_eq!(err.message(), "unexpected character '#'");
    assert_eq!(err.span().column, 7);
}
