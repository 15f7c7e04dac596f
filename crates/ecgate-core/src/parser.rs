//! Lexer and precedence-climbing parser for condition expressions

use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::{ExprError, Value};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

/// Deepest nesting of sub-expressions a condition may use
const MAX_DEPTH: usize = 64;

/// Punctuators, longest first so that `===` wins over `==` and `=`
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "%", "!",
    "?", ":", "(", ")", "[", "]", ".", ",",
];

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn syntax(&self, offset: usize, message: impl Into<String>) -> ExprError {
        ExprError::Syntax {
            offset,
            message: message.into(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>, ExprError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }
            let start = self.pos;
            let token = if c.is_ascii_digit()
                || (c == '.' && self.rest()[1..].starts_with(|d: char| d.is_ascii_digit()))
            {
                self.number()?
            } else if c == '\'' || c == '"' {
                self.string(c)?
            } else if c == '$' || c == '_' || c.is_alphabetic() {
                self.ident()
            } else if let Some(p) = PUNCTUATORS.iter().find(|p| self.rest().starts_with(**p)) {
                self.pos += p.len();
                Token::Punct(*p)
            } else {
                return Err(self.syntax(start, format!("unexpected character '{}'", c)));
            };
            tokens.push((start, token));
        }
        Ok(tokens)
    }

    fn number(&mut self) -> Result<Token, ExprError> {
        let start = self.pos;
        let rest = self.rest();
        let mut len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let mut is_float = false;
        if rest[len..].starts_with('.') {
            is_float = true;
            len += 1;
            len += rest[len..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len() - len);
        }
        let text = &rest[..len];
        self.pos += len;
        if self.peek_char().is_some_and(|c| c == '_' || c.is_alphabetic()) {
            return Err(self.syntax(self.pos, "identifier directly after number"));
        }
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.syntax(start, format!("invalid number '{}'", text)))
        } else {
            match text.parse::<i64>() {
                Ok(i) => Ok(Token::Int(i)),
                Err(_) => text
                    .parse::<f64>()
                    .map(Token::Float)
                    .map_err(|_| self.syntax(start, format!("invalid number '{}'", text))),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<Token, ExprError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos += i + 1;
                    return Ok(Token::Str(out));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c => out.push(c),
            }
        }
        Err(self.syntax(start, "unterminated string"))
    }

    fn ident(&mut self) -> Token {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c == '$' || c == '_' || c.is_alphanumeric()))
            .unwrap_or(rest.len());
        self.pos += len;
        Token::Ident(rest[..len].to_string())
    }
}

/// Parse an expression from source text
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.conditional()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some((offset, token)) => Err(ExprError::Syntax {
            offset: *offset,
            message: format!("unexpected {}", describe(token)),
        }),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(i) => format!("number {}", i),
        Token::Float(f) => format!("number {}", f),
        Token::Str(s) => format!("string '{}'", s),
        Token::Ident(name) => format!("identifier '{}'", name),
        Token::Punct(p) => format!("'{}'", p),
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    /// Height of the tree built so far along the current path
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Result<Token, ExprError> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(_, t)| t.clone())
            .ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), ExprError> {
        if self.eat(punct) {
            return Ok(());
        }
        match self.tokens.get(self.pos) {
            None => Err(ExprError::UnexpectedEnd),
            Some((offset, token)) => Err(ExprError::Syntax {
                offset: *offset,
                message: format!("expected '{}', found {}", punct, describe(token)),
            }),
        }
    }

    /// Enter one more level of nesting
    ///
    /// Evaluation recurses over the tree, so its height is capped here.
    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let offset = self
                .tokens
                .get(self.pos)
                .or(self.tokens.last())
                .map(|(o, _)| *o)
                .unwrap_or_default();
            return Err(ExprError::Syntax {
                offset,
                message: "expression nested too deeply".to_string(),
            });
        }
        Ok(())
    }

    fn conditional(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        self.descend()?;
        let expr = self.ternary();
        self.depth = base;
        expr
    }

    fn ternary(&mut self) -> Result<Expr, ExprError> {
        let cond = self.binary(0)?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then = self.conditional()?;
        self.expect(":")?;
        let otherwise = self.conditional()?;
        Ok(Expr::Conditional(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn peek_binary(&self) -> Option<BinaryOp> {
        let Some(Token::Punct(p)) = self.peek() else {
            return None;
        };
        let op = match *p {
            "||" => BinaryOp::Or,
            "&&" => BinaryOp::And,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNe,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing; every binary operator is left-associative
    ///
    /// Each operator folded into `lhs` makes the tree one level taller.
    fn binary(&mut self, min_precedence: u8) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek_binary() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            self.descend()?;
            let rhs = self.binary(precedence + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = if self.eat("!") {
            UnaryOp::Not
        } else if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else {
            return self.postfix();
        };
        let base = self.depth;
        self.descend()?;
        let operand = self.unary()?;
        self.depth = base;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut expr = self.primary()?;
        loop {
            if matches!(self.peek(), Some(Token::Punct("." | "[" | "("))) {
                self.descend()?;
            }
            if self.eat(".") {
                let offset = self.tokens.get(self.pos).map(|(o, _)| *o);
                match self.next()? {
                    Token::Ident(name) => expr = Expr::Member(Box::new(expr), name),
                    token => {
                        return Err(ExprError::Syntax {
                            offset: offset.unwrap_or_default(),
                            message: format!("expected property name, found {}", describe(&token)),
                        })
                    }
                }
            } else if self.eat("[") {
                let index = self.conditional()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat("(") {
                let args = self.arguments()?;
                expr = Expr::Call(Box::new(expr), args);
            } else {
                self.depth = base;
                return Ok(expr);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.eat(")") {
            return Ok(args);
        }
        loop {
            args.push(self.conditional()?);
            if self.eat(")") {
                return Ok(args);
            }
            self.expect(",")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let offset = self.tokens.get(self.pos).map(|(o, _)| *o);
        let expr = match self.next()? {
            Token::Int(i) => Expr::Literal(Value::Int(i)),
            Token::Float(f) => Expr::Literal(Value::Float(f)),
            Token::Str(s) => Expr::Literal(Value::String(s)),
            Token::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                _ => Expr::Ident(name),
            },
            Token::Punct("(") => {
                let inner = self.conditional()?;
                self.expect(")")?;
                inner
            }
            token => {
                return Err(ExprError::Syntax {
                    offset: offset.unwrap_or_default(),
                    message: format!("unexpected {}", describe(&token)),
                })
            }
        };
        Ok(expr)
    }
}
