use rust_decimal::Decimal;
use std::str::FromStr;

use super::ast::CompareOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(Decimal),
    Str(String),
    Null,
    And,
    Or,
    Op(CompareOp),
    LParen,
    RParen,
}

/// Turns a condition string into a flat token stream.
///
/// The grammar is deliberately small (comparisons, `&&`/`||`,
/// parenthesization, double-quoted strings, the bare `null` token); see
/// spec §4.1. Anything else is a `LexError`.
pub fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::And);
                    i += 2;
                } else {
                    return Err(format!("unexpected character '&' at position {}", i));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Or);
                    i += 2;
                } else {
                    return Err(format!("unexpected character '|' at position {}", i));
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CompareOp::Eq));
                    i += 2;
                } else {
                    return Err(format!("expected '==' at position {}", i));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CompareOp::Ne));
                    i += 2;
                } else {
                    return Err(format!("expected '!=' at position {}", i));
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CompareOp::Le));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CompareOp::Lt));
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CompareOp::Ge));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CompareOp::Gt));
                    i += 1;
                }
            }
            '"' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j] != '"' {
                    j += 1;
                }
                if j >= chars.len() {
                    return Err("unterminated string literal".to_string());
                }
                let s: String = chars[start..j].iter().collect();
                tokens.push(Token::Str(s));
                i = j + 1;
            }
            c if c.is_ascii_digit() || (c == '-' && starts_number(&chars, i)) => {
                let start = i;
                let mut j = i + 1;
                while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                    j += 1;
                }
                let raw: String = chars[start..j].iter().collect();
                let value = Decimal::from_str(&raw)
                    .map_err(|e| format!("invalid numeric literal '{}': {}", raw, e))?;
                tokens.push(Token::Number(value));
                i = j;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                let mut j = i + 1;
                while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                    j += 1;
                }
                let ident: String = chars[start..j].iter().collect();
                tokens.push(if ident == "null" {
                    Token::Null
                } else {
                    Token::Ident(ident)
                });
                i = j;
            }
            other => {
                return Err(format!("unexpected character '{}' at position {}", other, i));
            }
        }
    }

    Ok(tokens)
}

fn starts_number(chars: &[char], i: usize) -> bool {
    chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
}
