//! Recursive-descent parser for query text.

use crate::ast::{Comparator, Condition, Literal, OrderKey, Query};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::{ParseError, ParseResult};

/// Parse a query string. An empty or whitespace-only string yields the
/// match-everything query.
pub fn parse(input: &str) -> ParseResult<Query> {
    let tokens = tokenize(input)?;
    Parser { tokens, pos: 0 }.parse_query()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> ParseResult<Token> {
        let token = self.peek().clone();
        if &token.kind == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected_token(
                token.position,
                what,
                &token.kind.name(),
            ))
        }
    }

    fn parse_query(&mut self) -> ParseResult<Query> {
        let condition = match self.peek().kind {
            TokenKind::Eof | TokenKind::Order => None,
            _ => Some(self.parse_or()?),
        };

        let order = if self.peek().kind == TokenKind::Order {
            self.advance();
            self.expect(&TokenKind::By, "'by'")?;
            self.parse_order_keys()?
        } else {
            Vec::new()
        };

        let end = self.peek().clone();
        if end.kind != TokenKind::Eof {
            return Err(ParseError::unexpected_token(
                end.position,
                "end of query",
                &end.kind.name(),
            ));
        }
        Ok(Query { condition, order })
    }

    // or-combination binds loosest.
    fn parse_or(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_and()?;
        while self.peek().kind == TokenKind::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_primary()?;
        while self.peek().kind == TokenKind::And {
            self.advance();
            let right = self.parse_primary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> ParseResult<Condition> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(_) => self.parse_clause(),
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.position, "a condition")),
            other => Err(ParseError::unexpected_token(
                token.position,
                "a field name or '('",
                &other.name(),
            )),
        }
    }

    fn parse_clause(&mut self) -> ParseResult<Condition> {
        let token = self.advance();
        let field = match token.kind {
            TokenKind::Ident(name) => name.to_lowercase(),
            other => {
                return Err(ParseError::unexpected_token(
                    token.position,
                    "a field name",
                    &other.name(),
                ))
            }
        };

        let op_token = self.advance();
        let op = match op_token.kind {
            TokenKind::Eq => Comparator::Eq,
            TokenKind::NotEq => Comparator::NotEq,
            TokenKind::Lt => Comparator::Lt,
            TokenKind::LtEq => Comparator::LtEq,
            TokenKind::Gt => Comparator::Gt,
            TokenKind::GtEq => Comparator::GtEq,
            TokenKind::Like => Comparator::Like,
            TokenKind::In => {
                self.expect(&TokenKind::LParen, "'('")?;
                let mut values = vec![self.parse_literal()?];
                while self.peek().kind == TokenKind::Comma {
                    self.advance();
                    values.push(self.parse_literal()?);
                }
                self.expect(&TokenKind::RParen, "')'")?;
                return Ok(Condition::In { field, values });
            }
            other => {
                return Err(ParseError::unexpected_token(
                    op_token.position,
                    "a comparison operator",
                    &other.name(),
                ))
            }
        };

        let value = self.parse_literal()?;
        Ok(Condition::Compare { field, op, value })
    }

    fn parse_literal(&mut self) -> ParseResult<Literal> {
        let token = self.advance();
        match token.kind {
            TokenKind::Str(s) => Ok(Literal::Str(s)),
            TokenKind::Int(n) => Ok(Literal::Int(n)),
            other => Err(ParseError::unexpected_token(
                token.position,
                "a string or integer literal",
                &other.name(),
            )),
        }
    }

    fn parse_order_keys(&mut self) -> ParseResult<Vec<OrderKey>> {
        let mut keys = Vec::new();
        loop {
            let token = self.advance();
            let field = match token.kind {
                TokenKind::Ident(name) => name.to_lowercase(),
                other => {
                    return Err(ParseError::unexpected_token(
                        token.position,
                        "a field name",
                        &other.name(),
                    ))
                }
            };
            let descending = match self.peek().kind {
                TokenKind::Asc => {
                    self.advance();
                    false
                }
                TokenKind::Desc => {
                    self.advance();
                    true
                }
                _ => false,
            };
            keys.push(OrderKey { field, descending });

            if self.peek().kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        Ok(keys)
    }
}
