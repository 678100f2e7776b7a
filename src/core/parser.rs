//! Scalar token parser: numbers, rationals, constants, functions, and free
//! symbols combined with `+ - * / ^ **`.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := NUMBER | IMAGINARY | IDENT | IDENT '(' expr ')' | '(' expr ')'
//! ```

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

use crate::core::error::{MatrixError, MatrixResult};
use crate::core::expr::{Constant, Expr, Func};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Imaginary(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn is_imaginary_suffix(c: char) -> bool {
    matches!(c, 'i' | 'j' | 'I' | 'J')
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '^' => { tokens.push(Token::Caret); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut seen_dot = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        if seen_dot {
                            return Err(format!("malformed number near position {i}"));
                        }
                        seen_dot = true;
                    }
                    i += 1;
                }
                // scientific exponent: e / E followed by optional sign and digits
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                if text == "." {
                    return Err("lone '.'".to_string());
                }
                let suffix_ends = i + 1 >= chars.len() || !chars[i + 1].is_alphanumeric();
                if i < chars.len() && is_imaginary_suffix(chars[i]) && suffix_ends {
                    tokens.push(Token::Imaginary(text));
                    i += 1;
                } else {
                    tokens.push(Token::Number(text));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

fn number_expr(text: &str) -> Result<Expr, String> {
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>()
            .map(Expr::float)
            .map_err(|_| format!("malformed number '{text}'"))
    } else {
        text.parse::<BigInt>()
            .map(|n| Expr::rational(BigRational::from_integer(n)))
            .map_err(|_| format!("malformed integer '{text}'"))
    }
}

fn function_named(name: &str) -> Option<FunctionKind> {
    Some(match name {
        "sqrt" => FunctionKind::Sqrt,
        "exp" => FunctionKind::Exp,
        "ln" | "log" => FunctionKind::Call(Func::Ln),
        "sin" => FunctionKind::Call(Func::Sin),
        "cos" => FunctionKind::Call(Func::Cos),
        "tan" => FunctionKind::Call(Func::Tan),
        "abs" | "Abs" => FunctionKind::Call(Func::Abs),
        _ => return None,
    })
}

enum FunctionKind {
    Sqrt,
    Exp,
    Call(Func),
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn invalid(&self, reason: impl std::fmt::Display) -> MatrixError {
        MatrixError::InvalidScalar(format!("'{}': {}", self.input, reason))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expect(&mut self, token: Token) -> MatrixResult<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(self.invalid(format!("expected {token:?}, found {t:?}"))),
            None => Err(self.invalid(format!("expected {token:?}, found end of input"))),
        }
    }

    fn expr(&mut self) -> MatrixResult<Expr> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    acc = Expr::add(acc, self.term()?);
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    acc = Expr::sub(acc, self.term()?);
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> MatrixResult<Expr> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc = Expr::mul(acc, self.unary()?);
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor.is_zero() {
                        return Err(MatrixError::division_by_zero());
                    }
                    acc = Expr::div(acc, divisor);
                }
                _ => return Ok(acc),
            }
        }
    }

    fn unary(&mut self) -> MatrixResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::neg(self.unary()?))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> MatrixResult<Expr> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.pos += 1;
            let exp = self.unary()?;
            if base.is_zero() && exp.as_rational().is_some_and(|r| r.is_negative()) {
                return Err(MatrixError::division_by_zero());
            }
            return Ok(Expr::pow(base, exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> MatrixResult<Expr> {
        match self.next() {
            Some(Token::Number(text)) => number_expr(&text).map_err(|e| self.invalid(e)),
            Some(Token::Imaginary(text)) => {
                let magnitude = number_expr(&text).map_err(|e| self.invalid(e))?;
                Ok(Expr::mul(magnitude, Expr::constant(Constant::I)))
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if let Some(kind) = function_named(&name) {
                    self.expect(Token::LParen)?;
                    let arg = self.expr()?;
                    self.expect(Token::RParen)?;
                    return Ok(match kind {
                        FunctionKind::Sqrt => Expr::sqrt(arg),
                        FunctionKind::Exp => Expr::exp(arg),
                        FunctionKind::Call(func) => Expr::call(func, arg),
                    });
                }
                Ok(match name.as_str() {
                    "pi" | "PI" | "Pi" => Expr::constant(Constant::Pi),
                    "e" | "E" => Expr::constant(Constant::E),
                    "i" | "I" | "j" | "J" => Expr::constant(Constant::I),
                    _ => Expr::Symbol(name),
                })
            }
            Some(t) => Err(self.invalid(format!("unexpected token {t:?}"))),
            None => Err(self.invalid("unexpected end of input")),
        }
    }
}

/// Parse one scalar token into a canonical expression.
pub fn parse_expr(input: &str) -> MatrixResult<Expr> {
    let trimmed = input.trim();
    let mut parser = Parser { input: trimmed, tokens: Vec::new(), pos: 0 };
    if trimmed.is_empty() {
        return Err(parser.invalid("empty token"));
    }
    let tokens = tokenize(trimmed).map_err(|e| parser.invalid(e))?;
    parser.tokens = tokens;
    let expr = parser.expr()?;
    if let Some(t) = parser.peek() {
        return Err(parser.invalid(format!("trailing input at {t:?}")));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_rationals_stay_exact() {
        assert_eq!(parse_expr("42").unwrap(), Expr::integer(42));
        assert_eq!(parse_expr("-3/4").unwrap().to_string(), "-3/4");
        assert_eq!(parse_expr("6/4").unwrap().to_string(), "3/2");
    }

    #[test]
    fn decimals_are_floats() {
        assert_eq!(parse_expr("1.5").unwrap(), Expr::float(1.5));
        assert_eq!(parse_expr("2e-3").unwrap(), Expr::float(0.002));
    }

    #[test]
    fn precedence_and_power() {
        assert_eq!(parse_expr("2 + 3*4").unwrap(), Expr::integer(14));
        assert_eq!(parse_expr("-2^2").unwrap(), Expr::integer(-4));
        assert_eq!(parse_expr("2**3").unwrap(), Expr::integer(8));
        assert_eq!(parse_expr("2^-1").unwrap().to_string(), "1/2");
    }

    #[test]
    fn complex_literals() {
        assert_eq!(parse_expr("1+2i").unwrap().to_string(), "1 + 2*I");
        assert_eq!(parse_expr("3j").unwrap().to_string(), "3*I");
    }

    #[test]
    fn functions_and_symbols() {
        assert_eq!(parse_expr("sqrt(16)").unwrap(), Expr::integer(4));
        assert_eq!(parse_expr("cos(pi)").unwrap(), Expr::integer(-1));
        assert_eq!(parse_expr("x*y - y*x").unwrap(), Expr::zero());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_expr("1..2"), Err(MatrixError::InvalidScalar(_))));
        assert!(matches!(parse_expr("2 +"), Err(MatrixError::InvalidScalar(_))));
        assert!(matches!(parse_expr("$"), Err(MatrixError::InvalidScalar(_))));
        assert!(matches!(parse_expr("1/0"), Err(MatrixError::DivisionByZero(_))));
        assert!(matches!(parse_expr(""), Err(MatrixError::InvalidScalar(_))));
        assert!(matches!(parse_expr("sqrt 2"), Err(MatrixError::InvalidScalar(_))));
    }
}
