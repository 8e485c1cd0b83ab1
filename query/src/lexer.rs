//! Lexer (tokenizer) for query text.

use crate::{ParseError, ParseResult};

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords (case-insensitive)
    And,
    Or,
    Like,
    In,
    Order,
    By,
    Asc,
    Desc,

    // Literals
    Ident(String),
    Int(i64),
    Str(String),

    // Symbols
    Eq,     // =
    NotEq,  // !=
    Lt,     // <
    LtEq,   // <=
    Gt,     // >
    GtEq,   // >=
    LParen, // (
    RParen, // )
    Comma,  // ,

    // End of input
    Eof,
}

impl TokenKind {
    pub fn name(&self) -> String {
        match self {
            TokenKind::And => "and".to_string(),
            TokenKind::Or => "or".to_string(),
            TokenKind::Like => "like".to_string(),
            TokenKind::In => "in".to_string(),
            TokenKind::Order => "order".to_string(),
            TokenKind::By => "by".to_string(),
            TokenKind::Asc => "asc".to_string(),
            TokenKind::Desc => "desc".to_string(),
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Int(n) => format!("integer {}", n),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Eq => "=".to_string(),
            TokenKind::NotEq => "!=".to_string(),
            TokenKind::Lt => "<".to_string(),
            TokenKind::LtEq => "<=".to_string(),
            TokenKind::Gt => ">".to_string(),
            TokenKind::GtEq => ">=".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Eof => "end of query".to_string(),
        }
    }
}

/// A token with the byte position it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Tokenize a query string.
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos] as char;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match c {
            '(' => {
                pos += 1;
                TokenKind::LParen
            }
            ')' => {
                pos += 1;
                TokenKind::RParen
            }
            ',' => {
                pos += 1;
                TokenKind::Comma
            }
            '=' => {
                pos += 1;
                TokenKind::Eq
            }
            '!' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    pos += 2;
                    TokenKind::NotEq
                } else {
                    return Err(ParseError::new("expected '=' after '!'", pos));
                }
            }
            '<' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    pos += 2;
                    TokenKind::LtEq
                } else {
                    pos += 1;
                    TokenKind::Lt
                }
            }
            '>' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    pos += 2;
                    TokenKind::GtEq
                } else {
                    pos += 1;
                    TokenKind::Gt
                }
            }
            '"' => {
                pos += 1;
                let mut value = String::new();
                loop {
                    match bytes.get(pos) {
                        None => return Err(ParseError::new("unterminated string", start)),
                        Some(b'"') => {
                            pos += 1;
                            break;
                        }
                        Some(b'\\') => match bytes.get(pos + 1) {
                            Some(b'"') => {
                                value.push('"');
                                pos += 2;
                            }
                            Some(b'\\') => {
                                value.push('\\');
                                pos += 2;
                            }
                            _ => return Err(ParseError::new("invalid escape in string", pos)),
                        },
                        Some(&b) => {
                            value.push(b as char);
                            pos += 1;
                        }
                    }
                }
                TokenKind::Str(value)
            }
            _ if c.is_ascii_digit() || c == '-' => {
                pos += 1;
                while pos < bytes.len() && (bytes[pos] as char).is_ascii_digit() {
                    pos += 1;
                }
                let text = &input[start..pos];
                let n = text
                    .parse::<i64>()
                    .map_err(|_| ParseError::new(format!("invalid integer '{}'", text), start))?;
                TokenKind::Int(n)
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                pos += 1;
                while pos < bytes.len() {
                    let c = bytes[pos] as char;
                    if c.is_ascii_alphanumeric() || c == '_' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                let word = &input[start..pos];
                match word.to_ascii_lowercase().as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "like" => TokenKind::Like,
                    "in" => TokenKind::In,
                    "order" => TokenKind::Order,
                    "by" => TokenKind::By,
                    "asc" => TokenKind::Asc,
                    "desc" => TokenKind::Desc,
                    _ => TokenKind::Ident(word.to_string()),
                }
            }
            _ => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", c),
                    pos,
                ))
            }
        };

        tokens.push(Token {
            kind,
            position: start,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: bytes.len(),
    });
    Ok(tokens)
}
