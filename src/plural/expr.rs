//! Restricted evaluator for gettext/CLDR-style plural expressions
//!
//! Supports integer literals, the variable `n`, parentheses, `! - +`
//! prefixes, `* / %`, `+ -`, comparisons, `&&`, `||` and the conditional
//! `?:`. Booleans are 0 and 1. Nothing else is accepted.

use std::iter::Peekable;
use std::str::Chars;

/// Deepest nesting of parentheses, prefixes and conditionals accepted
const MAX_DEPTH: usize = 64;
/// Longest expression accepted, in tokens
const MAX_TOKENS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    N,
    Number(i64),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(i64),
    N,
    Not,
    Question,
    Colon,
    LParen,
    RParen,
    Op(BinaryOp),
}

/// A compiled plural expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralExpr {
    source: String,
    root: Expr,
}

impl PluralExpr {
    /// Compile an expression such as `n != 1` or
    /// `(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2`.
    ///
    /// A gettext header fragment (`nplurals=2; plural=(n != 1);`) is accepted
    /// too; only the part after `plural=` is compiled.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut body = source.trim();
        if let Some(pos) = body.rfind("plural=") {
            body = &body[pos + "plural=".len()..];
        }
        let body = body.trim().trim_end_matches(';');

        let tokens = tokenize(body)?;
        if tokens.is_empty() {
            return Err("empty expression".to_string());
        }
        if tokens.len() > MAX_TOKENS {
            return Err(format!("expression is longer than {} tokens", MAX_TOKENS));
        }
        let mut parser = ExprParser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.conditional()?;
        if parser.pos != parser.tokens.len() {
            return Err(format!("unexpected token at position {}", parser.pos));
        }

        Ok(PluralExpr {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluate with `n = count`.
    ///
    /// Returns `None` on division by zero or arithmetic overflow.
    pub fn evaluate(&self, count: i64) -> Option<i64> {
        eval(&self.root, count)
    }
}

fn eval(expr: &Expr, n: i64) -> Option<i64> {
    match expr {
        Expr::N => Some(n),
        Expr::Number(value) => Some(*value),
        Expr::Not(inner) => Some(i64::from(eval(inner, n)? == 0)),
        Expr::Neg(inner) => eval(inner, n)?.checked_neg(),
        Expr::Conditional(cond, then, otherwise) => {
            if eval(cond, n)? != 0 {
                eval(then, n)
            } else {
                eval(otherwise, n)
            }
        }
        Expr::Binary(BinaryOp::Or, left, right) => {
            if eval(left, n)? != 0 {
                Some(1)
            } else {
                Some(i64::from(eval(right, n)? != 0))
            }
        }
        Expr::Binary(BinaryOp::And, left, right) => {
            if eval(left, n)? == 0 {
                Some(0)
            } else {
                Some(i64::from(eval(right, n)? != 0))
            }
        }
        Expr::Binary(op, left, right) => {
            let a = eval(left, n)?;
            let b = eval(right, n)?;
            match op {
                BinaryOp::Eq => Some(i64::from(a == b)),
                BinaryOp::Ne => Some(i64::from(a != b)),
                BinaryOp::Lt => Some(i64::from(a < b)),
                BinaryOp::Le => Some(i64::from(a <= b)),
                BinaryOp::Gt => Some(i64::from(a > b)),
                BinaryOp::Ge => Some(i64::from(a >= b)),
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div => a.checked_div(b),
                BinaryOp::Rem => a.checked_rem(b),
                BinaryOp::Or | BinaryOp::And => unreachable!("handled above"),
            }
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '0'..='9' => {
                let mut digits = String::from(ch);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() {
                        digits.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|e| format!("invalid number '{}': {}", digits, e))?;
                Token::Number(value)
            }
            'n' => Token::N,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '?' => Token::Question,
            ':' => Token::Colon,
            '+' => Token::Op(BinaryOp::Add),
            '-' => Token::Op(BinaryOp::Sub),
            '*' => Token::Op(BinaryOp::Mul),
            '/' => Token::Op(BinaryOp::Div),
            '%' => Token::Op(BinaryOp::Rem),
            '!' => {
                if next_is(&mut chars, '=') {
                    Token::Op(BinaryOp::Ne)
                } else {
                    Token::Not
                }
            }
            '=' => {
                if !next_is(&mut chars, '=') {
                    return Err("assignment is not allowed, use '=='".to_string());
                }
                Token::Op(BinaryOp::Eq)
            }
            '<' => {
                if next_is(&mut chars, '=') {
                    Token::Op(BinaryOp::Le)
                } else {
                    Token::Op(BinaryOp::Lt)
                }
            }
            '>' => {
                if next_is(&mut chars, '=') {
                    Token::Op(BinaryOp::Ge)
                } else {
                    Token::Op(BinaryOp::Gt)
                }
            }
            '&' => {
                if !next_is(&mut chars, '&') {
                    return Err("bitwise '&' is not allowed, use '&&'".to_string());
                }
                Token::Op(BinaryOp::And)
            }
            '|' => {
                if !next_is(&mut chars, '|') {
                    return Err("bitwise '|' is not allowed, use '||'".to_string());
                }
                Token::Op(BinaryOp::Or)
            }
            other => return Err(format!("unexpected character '{}'", other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn next_is(chars: &mut Peekable<Chars<'_>>, expected: char) -> bool {
    if chars.peek() == Some(&expected) {
        chars.next();
        true
    } else {
        false
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of expression", expected)),
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, String>,
    ) -> Result<T, String> {
        if self.depth >= MAX_DEPTH {
            return Err(format!("expression is nested deeper than {} levels", MAX_DEPTH));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn conditional(&mut self) -> Result<Expr, String> {
        self.nested(Self::conditional_inner)
    }

    fn conditional_inner(&mut self) -> Result<Expr, String> {
        let cond = self.binary(0)?;
        if self.peek() != Some(Token::Question) {
            return Ok(cond);
        }
        self.advance();
        let then = self.conditional()?;
        self.expect(Token::Colon)?;
        let otherwise = self.conditional()?;
        Ok(Expr::Conditional(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    /// Left-associative binary operators, loosest level first
    fn binary(&mut self, level: usize) -> Result<Expr, String> {
        const LEVELS: [&[BinaryOp]; 6] = [
            &[BinaryOp::Or],
            &[BinaryOp::And],
            &[BinaryOp::Eq, BinaryOp::Ne],
            &[BinaryOp::Lt, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Ge],
            &[BinaryOp::Add, BinaryOp::Sub],
            &[BinaryOp::Mul, BinaryOp::Div, BinaryOp::Rem],
        ];

        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };

        let mut left = self.binary(level + 1)?;
        while let Some(Token::Op(op)) = self.peek() {
            if !ops.contains(&op) {
                break;
            }
            self.advance();
            let right = self.binary(level + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        self.nested(Self::unary_inner)
    }

    fn unary_inner(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Not) => {
                self.advance();
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            Some(Token::Op(BinaryOp::Sub)) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Op(BinaryOp::Add)) => {
                self.advance();
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::N) => Ok(Expr::N),
            Some(Token::LParen) => {
                let inner = self.conditional()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(token) => Err(format!("unexpected {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
