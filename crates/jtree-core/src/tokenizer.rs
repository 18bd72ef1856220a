//! JSON tokenizer: turns a byte stream into the token sequence the parser
//! consumes.
//!
//! The tokenizer checks the full JSON syntax (separators, key positions,
//! number grammar, literals, string escapes) but accepts a sequence of
//! whitespace-separated top-level values; deciding that a document holds
//! exactly one value is left to the parser. String escapes and UTF-8 are
//! decoded by `serde_json`.

use std::io::{BufReader, Bytes, Read};

use crate::error::LexError;

/// One lexical token of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartArray,
    EndArray,
    StartObject,
    EndObject,
    String(String),
    Bool(bool),
    Number(f64),
    Null,
}

/// A source of tokens; `Ok(None)` marks end of stream.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<Token>, LexError>;
}

/// Replays a prepared token list.
impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        Ok(self.next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Array,
    Object,
}

/// What the grammar allows at the current position.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    /// Between top-level values: a value or end of input.
    TopLevel,
    Value,
    /// Right after `[`.
    FirstValueOrEnd,
    CommaOrEndArray,
    /// Right after `{`.
    FirstKeyOrEnd,
    Key,
    Colon,
    CommaOrEndObject,
}

/// Streaming tokenizer over any [`Read`] implementation.
pub struct Tokenizer<R: Read> {
    bytes: Bytes<BufReader<R>>,
    peeked: Option<u8>,
    offset: usize,
    stack: Vec<Frame>,
    expect: Expect,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            peeked: None,
            offset: 0,
            stack: Vec::new(),
            expect: Expect::TopLevel,
        }
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn peek(&mut self) -> Result<Option<u8>, LexError> {
        if self.peeked.is_none() {
            self.peeked = self.bytes.next().transpose()?;
        }
        Ok(self.peeked)
    }

    fn bump(&mut self) -> Result<Option<u8>, LexError> {
        let b = self.peek()?;
        if b.is_some() {
            self.peeked = None;
            self.offset += 1;
        }
        Ok(b)
    }

    fn skip_whitespace(&mut self) -> Result<(), LexError> {
        while let Some(b) = self.peek()? {
            if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                break;
            }
            self.bump()?;
        }
        Ok(())
    }

    fn unexpected(&self, b: u8) -> LexError {
        LexError::UnexpectedChar {
            found: char::from(b),
            offset: self.offset,
        }
    }

    fn after_value(&mut self) {
        self.expect = match self.stack.last() {
            None => Expect::TopLevel,
            Some(Frame::Array) => Expect::CommaOrEndArray,
            Some(Frame::Object) => Expect::CommaOrEndObject,
        };
    }

    fn close(&mut self, token: Token) -> Result<Option<Token>, LexError> {
        self.bump()?;
        self.stack.pop();
        self.after_value();
        Ok(Some(token))
    }

    fn value(&mut self, b: u8) -> Result<Option<Token>, LexError> {
        match b {
            b'[' => {
                self.bump()?;
                self.stack.push(Frame::Array);
                self.expect = Expect::FirstValueOrEnd;
                Ok(Some(Token::StartArray))
            }
            b'{' => {
                self.bump()?;
                self.stack.push(Frame::Object);
                self.expect = Expect::FirstKeyOrEnd;
                Ok(Some(Token::StartObject))
            }
            b'"' => {
                let s = self.read_string()?;
                self.after_value();
                Ok(Some(Token::String(s)))
            }
            b'-' | b'0'..=b'9' => {
                let n = self.read_number()?;
                self.after_value();
                Ok(Some(Token::Number(n)))
            }
            b'a'..=b'z' | b'A'..=b'Z' => {
                let token = self.read_literal()?;
                self.after_value();
                Ok(Some(token))
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Read a quoted string; the raw literal is handed to `serde_json` for
    /// escape decoding and UTF-8 validation.
    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.offset;
        let mut raw = Vec::new();
        if let Some(quote) = self.bump()? {
            raw.push(quote);
        }
        loop {
            match self.bump()? {
                None => return Err(LexError::UnexpectedEnd { offset: self.offset }),
                Some(b'"') => {
                    raw.push(b'"');
                    break;
                }
                Some(b'\\') => {
                    raw.push(b'\\');
                    match self.bump()? {
                        Some(escaped) => raw.push(escaped),
                        None => return Err(LexError::UnexpectedEnd { offset: self.offset }),
                    }
                }
                Some(b) => raw.push(b),
            }
        }
        serde_json::from_slice::<String>(&raw).map_err(|source| LexError::InvalidString {
            offset: start,
            source,
        })
    }

    fn read_number(&mut self) -> Result<f64, LexError> {
        let start = self.offset;
        let mut text = String::new();
        while let Some(b) = self.peek()? {
            if !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                break;
            }
            text.push(char::from(b));
            self.bump()?;
        }
        if !is_json_number(&text) {
            return Err(LexError::InvalidNumber {
                text,
                offset: start,
            });
        }
        // Out-of-range literals parse to infinity.
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(LexError::InvalidNumber {
                text,
                offset: start,
            }),
        }
    }

    fn read_literal(&mut self) -> Result<Token, LexError> {
        let start = self.offset;
        let mut text = String::new();
        while let Some(b) = self.peek()? {
            if !b.is_ascii_alphabetic() {
                break;
            }
            text.push(char::from(b));
            self.bump()?;
        }
        match text.as_str() {
            "true" => Ok(Token::Bool(true)),
            "false" => Ok(Token::Bool(false)),
            "null" => Ok(Token::Null),
            _ => Err(LexError::InvalidLiteral {
                text,
                offset: start,
            }),
        }
    }
}

impl<R: Read> TokenSource for Tokenizer<R> {
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.skip_whitespace()?;
            let Some(b) = self.peek()? else {
                if self.expect == Expect::TopLevel {
                    return Ok(None);
                }
                return Err(LexError::UnexpectedEnd {
                    offset: self.offset,
                });
            };
            match self.expect {
                Expect::TopLevel | Expect::Value => return self.value(b),
                Expect::FirstValueOrEnd => {
                    if b == b']' {
                        return self.close(Token::EndArray);
                    }
                    return self.value(b);
                }
                Expect::CommaOrEndArray => match b {
                    b',' => {
                        self.bump()?;
                        self.expect = Expect::Value;
                    }
                    b']' => return self.close(Token::EndArray),
                    other => return Err(self.unexpected(other)),
                },
                Expect::FirstKeyOrEnd | Expect::Key => match b {
                    b'}' if self.expect == Expect::FirstKeyOrEnd => {
                        return self.close(Token::EndObject);
                    }
                    b'"' => {
                        let key = self.read_string()?;
                        self.expect = Expect::Colon;
                        return Ok(Some(Token::String(key)));
                    }
                    other => return Err(self.unexpected(other)),
                },
                Expect::Colon => {
                    if b != b':' {
                        return Err(self.unexpected(b));
                    }
                    self.bump()?;
                    self.expect = Expect::Value;
                }
                Expect::CommaOrEndObject => match b {
                    b',' => {
                        self.bump()?;
                        self.expect = Expect::Key;
                    }
                    b'}' => return self.close(Token::EndObject),
                    other => return Err(self.unexpected(other)),
                },
            }
        }
    }
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while bytes.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let digits = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == digits {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let digits = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == digits {
            return false;
        }
    }
    i == bytes.len()
}
