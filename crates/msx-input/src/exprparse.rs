//! Recursive-descent parser turning one infix expression string (a
//! `[PIPES]`/`[TANKS]`/`[TERMS]` right-hand side) into a [`MathExpr`].
//!
//! The legacy project builds expressions with `mathexpr_create`
//! (`original_source/src/mathexpr.c`), a standalone string parser that is
//! explicitly out of scope here — chemistry expressions are a calculator
//! grammar, not a language, so this is a small hand-written descent rather
//! than a port. Grammar, loosest to tightest:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | power
//! power  := primary ('^' unary)?
//! primary:= NUMBER | IDENT | IDENT '(' expr ')' | '(' expr ')'
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus on its left
//! operand but the parser still reads `-2^2` as `-(2^2)`, matching ordinary
//! calculator convention.

use msx_expr::{Func, MathExpr, Opcode, VarRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprParseError(pub String);

impl std::fmt::Display for ExprParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn lex(text: &str) -> Result<Vec<Tok>, ExprParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut toks = Vec::new();
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '+' => {
                toks.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                toks.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                toks.push(Tok::Star);
                i += 1;
            }
            '/' => {
                toks.push(Tok::Slash);
                i += 1;
            }
            '^' => {
                toks.push(Tok::Caret);
                i += 1;
            }
            '(' => {
                toks.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                toks.push(Tok::RParen);
                i += 1;
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_ascii_digit()
                        || chars[i] == '.'
                        || ((chars[i] == 'e' || chars[i] == 'E')
                            && i + 1 < chars.len()
                            && (chars[i + 1].is_ascii_digit()
                                || chars[i + 1] == '+'
                                || chars[i + 1] == '-'))
                        || ((chars[i] == '+' || chars[i] == '-')
                            && i > start
                            && (chars[i - 1] == 'e' || chars[i - 1] == 'E')))
                {
                    i += 1;
                }
                let s: String = chars[start..i].iter().collect();
                let v: f64 = s
                    .parse()
                    .map_err(|_| ExprParseError(format!("'{s}' is not a valid number")))?;
                toks.push(Tok::Num(v));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                toks.push(Tok::Ident(chars[start..i].iter().collect()));
            }
            _ => return Err(ExprParseError(format!("unexpected character '{c}'"))),
        }
    }
    Ok(toks)
}

struct Parser<'a> {
    toks: Vec<Tok>,
    pos: usize,
    resolve: &'a mut dyn FnMut(&str) -> Option<VarRef>,
    ops: Vec<Opcode>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<(), ExprParseError> {
        self.term()?;
        loop {
            match self.peek() {
                Some(Tok::Plus) => {
                    self.bump();
                    self.term()?;
                    self.ops.push(Opcode::Add);
                }
                Some(Tok::Minus) => {
                    self.bump();
                    self.term()?;
                    self.ops.push(Opcode::Sub);
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn term(&mut self) -> Result<(), ExprParseError> {
        self.unary()?;
        loop {
            match self.peek() {
                Some(Tok::Star) => {
                    self.bump();
                    self.unary()?;
                    self.ops.push(Opcode::Mul);
                }
                Some(Tok::Slash) => {
                    self.bump();
                    self.unary()?;
                    self.ops.push(Opcode::Div);
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<(), ExprParseError> {
        if matches!(self.peek(), Some(Tok::Minus)) {
            self.bump();
            self.unary()?;
            self.ops.push(Opcode::Neg);
            Ok(())
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<(), ExprParseError> {
        self.primary()?;
        if matches!(self.peek(), Some(Tok::Caret)) {
            self.bump();
            self.unary()?;
            self.ops.push(Opcode::Pow);
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<(), ExprParseError> {
        match self.bump() {
            Some(Tok::Num(v)) => {
                self.ops.push(Opcode::PushConst(v));
                Ok(())
            }
            Some(Tok::LParen) => {
                self.expr()?;
                match self.bump() {
                    Some(Tok::RParen) => Ok(()),
                    _ => Err(ExprParseError("missing closing ')'".into())),
                }
            }
            Some(Tok::Ident(name)) => {
                if matches!(self.peek(), Some(Tok::LParen)) {
                    let func = Func::from_name(&name)
                        .ok_or_else(|| ExprParseError(format!("unknown function '{name}'")))?;
                    self.bump();
                    self.expr()?;
                    match self.bump() {
                        Some(Tok::RParen) => {}
                        _ => return Err(ExprParseError("missing closing ')'".into())),
                    }
                    self.ops.push(Opcode::Call(func));
                    Ok(())
                } else {
                    let var = (self.resolve)(&name)
                        .ok_or_else(|| ExprParseError(format!("undefined name '{name}'")))?;
                    self.ops.push(Opcode::PushVar(var));
                    Ok(())
                }
            }
            other => Err(ExprParseError(format!("unexpected token {other:?}"))),
        }
    }
}

/// Parse `text` into a [`MathExpr`], resolving bare identifiers (species,
/// terms, parameters, constants, hydraulic variable names) through
/// `resolve`.
pub fn parse_expr(
    text: &str,
    resolve: &mut dyn FnMut(&str) -> Option<VarRef>,
) -> Result<MathExpr, ExprParseError> {
    let toks = lex(text)?;
    if toks.is_empty() {
        return Err(ExprParseError("empty expression".into()));
    }
    let mut p = Parser {
        toks,
        pos: 0,
        resolve,
        ops: Vec::new(),
    };
    p.expr()?;
    if p.pos != p.toks.len() {
        return Err(ExprParseError("trailing characters after expression".into()));
    }
    MathExpr::from_postfix(p.ops).map_err(|e| ExprParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use msx_core::ConstId;

    #[test]
    fn parses_arithmetic_with_precedence() {
        let expr = parse_expr("2 + 3 * 4", &mut |_| None).unwrap();
        let v = expr.eval(&mut |_| unreachable!()).unwrap();
        assert_eq!(v, 14.0);
    }

    #[test]
    fn right_associative_power_and_unary_minus() {
        let expr = parse_expr("-2^2", &mut |_| None).unwrap();
        let v = expr.eval(&mut |_| unreachable!()).unwrap();
        assert_eq!(v, -4.0);
    }

    #[test]
    fn resolves_identifiers_and_functions() {
        let k = ConstId::from_index(0);
        let expr = parse_expr("sqrt(K1)", &mut |name| {
            (name == "K1").then_some(VarRef::Const(k))
        })
        .unwrap();
        let v = expr
            .eval(&mut |var| match var {
                VarRef::Const(id) if id == k => Ok(9.0),
                _ => panic!("unexpected var"),
            })
            .unwrap();
        assert_eq!(v, 3.0);
    }

    #[test]
    fn undefined_identifier_is_an_error() {
        let err = parse_expr("foo + 1", &mut |_| None).unwrap_err();
        assert!(err.0.contains("undefined"));
    }

    #[test]
    fn scientific_notation_literal() {
        let expr = parse_expr("1.5e2", &mut |_| None).unwrap();
        assert_eq!(expr.eval(&mut |_| unreachable!()).unwrap(), 150.0);
    }
}
