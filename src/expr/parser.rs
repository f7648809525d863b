use super::ast::{CompareOp, Expr, Literal};
use super::lexer::{tokenize, Token};

/// Recursive-descent parser over the restricted boolean grammar of spec
/// §4.1:
///
/// ```text
/// expr       := or_expr
/// or_expr    := and_expr ( '||' and_expr )*
/// and_expr   := comparison ( '&&' comparison )*
/// comparison := '(' expr ')' | IDENT OP literal
/// literal    := NUMBER | STRING | 'null'
/// ```
///
/// No unary negation, no function calls (spec §1 Non-goals).
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

pub fn parse(src: &str) -> Result<Expr, String> {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return Err("expression cannot be empty".to_string());
    }
    let tokens = tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err("expression cannot be empty".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "unexpected trailing tokens starting at token {}",
            parser.pos
        ));
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_atom()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let rhs = self.parse_atom()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("unbalanced parentheses".to_string()),
                }
            }
            Some(Token::Ident(_)) => self.parse_comparison(),
            Some(other) => Err(format!("unexpected token: {:?}", other)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let field = match self.advance() {
            Some(Token::Ident(name)) => name,
            _ => return Err("expected field identifier".to_string()),
        };

        let op = match self.advance() {
            Some(Token::Op(op)) => op,
            _ => return Err(format!("expected comparison operator after '{}'", field)),
        };

        let literal = match self.advance() {
            Some(Token::Number(n)) => Literal::Number(n),
            Some(Token::Str(s)) => Literal::Str(s),
            Some(Token::Null) => Literal::Null,
            _ => return Err(format!("expected literal after '{} {}'", field, op.as_str())),
        };

        if matches!(literal, Literal::Null) && !matches!(op, CompareOp::Eq | CompareOp::Ne) {
            return Err("null may only be compared with == or !=".to_string());
        }

        Ok(Expr::Comparison { field, op, literal })
    }
}
