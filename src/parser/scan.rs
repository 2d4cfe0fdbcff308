/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::ast::Num;

/// Byte cursor over one source line. All token classes are ASCII, so a
/// non-ASCII byte simply fails to match and the line falls out as a syntax
/// error; the cursor never slices inside a multi-byte character.
pub struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Cursor { line, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        &self.line.as_bytes()[self.pos..]
    }

    /// Unconsumed remainder of the line.
    pub fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().first().copied()
    }

    pub fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Requires at least one whitespace byte (the separator between a
    /// mnemonic and its first operand).
    pub fn skip_ws1(&mut self) -> bool {
        let start = self.pos;
        self.skip_ws();
        self.pos > start
    }

    pub fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// `\s*,\s*`
    pub fn comma(&mut self) -> bool {
        self.skip_ws();
        if !self.eat(b',') {
            return false;
        }
        self.skip_ws();
        true
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.bytes().starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.line.len()
    }

    fn run(&mut self, first: impl Fn(u8) -> bool, rest: impl Fn(u8) -> bool) -> Option<&'a str> {
        let start = self.pos;
        if !self.peek().is_some_and(&first) {
            return None;
        }
        self.pos += 1;
        while self.peek().is_some_and(&rest) {
            self.pos += 1;
        }
        Some(&self.line[start..self.pos])
    }

    /// `[A-Za-z]+`
    pub fn mnemonic(&mut self) -> Option<&'a str> {
        self.run(|b| b.is_ascii_alphabetic(), |b| b.is_ascii_alphabetic())
    }

    /// `[A-Za-z][0-9A-Za-z]*` (no underscore, unlike labels)
    pub fn reg_ident(&mut self) -> Option<&'a str> {
        self.run(|b| b.is_ascii_alphabetic(), |b| b.is_ascii_alphanumeric())
    }

    /// `[A-Za-z_][0-9A-Za-z_]*`
    pub fn label_ident(&mut self) -> Option<&'a str> {
        self.run(
            |b| b.is_ascii_alphabetic() || b == b'_',
            |b| b.is_ascii_alphanumeric() || b == b'_',
        )
    }

    /// `0x[0-9A-Fa-f]+`, saturating to `u64::MAX` on overflow.
    pub fn hex(&mut self) -> Option<u64> {
        let b = self.bytes();
        if !(b.len() >= 3 && b[0] == b'0' && b[1] == b'x' && b[2].is_ascii_hexdigit()) {
            return None;
        }
        self.pos += 2;
        let mut value: u64 = 0;
        while let Some(d) = self.peek().and_then(|b| (b as char).to_digit(16)) {
            value = value.saturating_mul(16).saturating_add(d as u64);
            self.pos += 1;
        }
        Some(value)
    }

    /// A hex literal or `[+-]?[0-9]+`, saturating out-of-range magnitudes so
    /// that later range checks reject them. The hex prefix is exactly `0x`;
    /// `0X` parses as decimal zero followed by junk, as in the grammar.
    pub fn number(&mut self) -> Option<Num> {
        if let Some(value) = self.hex() {
            return Some(Num::Hex(value));
        }
        let start = self.pos;
        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        let mut value: i64 = 0;
        let mut digits = 0;
        while let Some(d) = self.peek().filter(|b| b.is_ascii_digit()) {
            let d = (d - b'0') as i64;
            value = if negative {
                value.saturating_mul(10).saturating_sub(d)
            } else {
                value.saturating_mul(10).saturating_add(d)
            };
            self.pos += 1;
            digits += 1;
        }
        if digits == 0 {
            self.pos = start;
            return None;
        }
        Some(Num::Dec(value))
    }

    /// `"..."` over the printable subset 0x20..=0x7E minus the quote itself.
    pub fn string_literal(&mut self) -> Option<&'a str> {
        if !self.eat(b'"') {
            return None;
        }
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let body = &self.line[start..self.pos];
                    self.pos += 1;
                    return Some(body);
                }
                Some(b) if (0x20..=0x7e).contains(&b) => self.pos += 1,
                _ => return None,
            }
        }
    }
}
