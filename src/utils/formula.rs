//! Minimal formula support for the in-memory sheet
//!
//! Handles what the balance sheet actually contains: numbers, cell
//! references, `+ - * /`, parentheses, and `SUM` over ranges.

use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

use crate::types::*;
use crate::utils::a1::{CellRange, CellRef};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigDecimal),
    Ref(CellRef),
    Range(CellRange),
    Func(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

fn formula_error(formula: &str, reason: impl std::fmt::Display) -> TabError {
    TabError::InvalidCell(format!("cannot evaluate '{}': {}", formula, reason))
}

fn tokenize(expr: &str) -> TabResult<Vec<Token>> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
        } else if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
        } else if c == ',' {
            tokens.push(Token::Comma);
            i += 1;
        } else if matches!(c, '+' | '-' | '*' | '/') {
            tokens.push(Token::Op(c));
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let s: String = chars[start..i].iter().collect();
            let n = BigDecimal::from_str(&s)
                .map_err(|_| formula_error(expr, format!("bad number '{}'", s)))?;
            tokens.push(Token::Number(n));
        } else if c.is_ascii_alphabetic() || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '$' || chars[i] == ':')
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().filter(|c| **c != '$').collect();
            if i < chars.len() && chars[i] == '(' {
                tokens.push(Token::Func(word.to_ascii_uppercase()));
            } else if word.contains(':') {
                tokens.push(Token::Range(word.parse()?));
            } else {
                tokens.push(Token::Ref(word.parse()?));
            }
        } else {
            return Err(formula_error(expr, format!("unexpected character '{}'", c)));
        }
    }

    Ok(tokens)
}

/// Evaluates a formula, resolving cell references through `resolve`.
///
/// The leading `=` is optional. Empty or non-numeric referenced cells
/// must be resolved to zero by the caller.
pub fn evaluate<F>(formula: &str, resolve: &mut F) -> TabResult<BigDecimal>
where
    F: FnMut(CellRef) -> TabResult<BigDecimal>,
{
    let expr = formula.strip_prefix('=').unwrap_or(formula);
    let tokens = tokenize(expr)?;
    let mut parser = Evaluator {
        formula,
        tokens: &tokens,
        pos: 0,
        resolve,
    };
    let value = parser.additive()?;
    if parser.pos != tokens.len() {
        return Err(formula_error(formula, "trailing tokens"));
    }
    Ok(value)
}

struct Evaluator<'a, F> {
    formula: &'a str,
    tokens: &'a [Token],
    pos: usize,
    resolve: &'a mut F,
}

impl<F> Evaluator<'_, F>
where
    F: FnMut(CellRef) -> TabResult<BigDecimal>,
{
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn additive(&mut self) -> TabResult<BigDecimal> {
        let mut value = self.multiplicative()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.multiplicative()?;
            if op == '+' {
                value += rhs;
            } else {
                value -= rhs;
            }
        }
        Ok(value)
    }

    fn multiplicative(&mut self) -> TabResult<BigDecimal> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs.is_zero() {
                    return Err(formula_error(self.formula, "division by zero"));
                }
                value = value / rhs;
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> TabResult<BigDecimal> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> TabResult<BigDecimal> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| formula_error(self.formula, "unexpected end of formula"))?;
        self.pos += 1;

        match token {
            Token::Number(n) => Ok(n),
            Token::Ref(cell) => (self.resolve)(cell),
            Token::LParen => {
                let value = self.additive()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Token::Func(name) => self.function(&name),
            other => Err(formula_error(self.formula, format!("unexpected {:?}", other))),
        }
    }

    fn function(&mut self, name: &str) -> TabResult<BigDecimal> {
        if name != "SUM" {
            return Err(formula_error(self.formula, format!("unsupported function {}", name)));
        }

        self.expect(Token::LParen)?;
        let mut total = BigDecimal::zero();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(total);
        }

        loop {
            if let Some(Token::Range(range)) = self.peek().cloned() {
                self.pos += 1;
                for cell in range.cells() {
                    total += (self.resolve)(cell)?;
                }
            } else {
                total += self.additive()?;
            }

            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    return Ok(total);
                }
                _ => return Err(formula_error(self.formula, "expected ',' or ')' in SUM")),
            }
        }
    }

    fn expect(&mut self, expected: Token) -> TabResult<()> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(formula_error(self.formula, format!("expected {:?}", expected)))
        }
    }
}

/// Rewrites row numbers in cell references after rows were inserted.
///
/// Every reference to a row at or below `from_row` moves down by `by`.
/// Function names and text outside references are left alone.
pub fn shift_row_references(formula: &str, from_row: u32, by: u32) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            // copy string literals through untouched
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                i += 1;
            }
            i = (i + 1).min(chars.len());
            out.extend(&chars[start..i]);
            continue;
        }

        let starts_word = c.is_ascii_alphabetic() || c == '$';
        let after_word_char = i > 0 && chars[i - 1].is_ascii_alphanumeric();
        if !starts_word || after_word_char {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '$') {
            i += 1;
        }
        let letters_end = i;
        let row_locked = letters_end > start && chars[letters_end - 1] == '$';
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }

        let has_digits = i > letters_end;
        let is_call = i < chars.len() && chars[i] == '(';
        let followed_by_word = i < chars.len() && chars[i].is_ascii_alphabetic();
        if !has_digits || is_call || followed_by_word || row_locked {
            out.extend(&chars[start..i]);
            continue;
        }

        let digits: String = chars[letters_end..i].iter().collect();
        out.extend(&chars[start..letters_end]);
        match digits.parse::<u32>() {
            Ok(row) if row >= from_row => out.push_str(&(row + by).to_string()),
            _ => out.push_str(&digits),
        }
    }

    out
}
