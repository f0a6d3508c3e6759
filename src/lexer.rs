//! Lexer for the mini-SQL dialect.
//!
//! Tokenizes a single query string: SELECT statements with WHERE, GROUP BY,
//! HAVING and ORDER BY clauses, the COUNT/SUM/AVG aggregates, and the
//! UNION/INTERSECT/EXCEPT set operations. Keywords are case-insensitive.

use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    As,

    // Connectives
    And,
    Or,

    // Sort direction
    Asc,
    Desc,

    // Set operations
    Union,
    Intersect,
    Except,

    // Aggregates
    Count,
    Sum,
    Avg,

    // Literals and identifiers
    Identifier(String),
    Integer(i64),
    Float(f64),
    String(String),

    // Operators
    Equal,         // =
    NotEqual,      // != or <>
    LessThan,      // <
    LessThanEq,    // <=
    GreaterThan,   // >
    GreaterThanEq, // >=

    // Delimiters
    Star,       // *
    Comma,      // ,
    LeftParen,  // (
    RightParen, // )
    Semicolon,  // ;

    // Special
    Eof,
}

impl Token {
    /// Short human-readable description, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => name.clone(),
            Token::String(s) => format!("'{}'", s),
            Token::Integer(n) => n.to_string(),
            Token::Float(n) => n.to_string(),
            Token::Eof => "end of input".to_string(),
            other => format!("{:?}", other).to_uppercase(),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> QueryResult<Token> {
        let mut num_str = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.current_char {
            if ch.is_numeric() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot {
                // Decimal point only when followed by a digit
                if let Some(next) = self.peek() {
                    if next.is_numeric() {
                        has_dot = true;
                        num_str.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        if has_dot {
            num_str
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| QueryError::ParseError(format!("Invalid float number: {}", num_str)))
        } else {
            num_str
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| QueryError::ParseError(format!("Invalid integer number: {}", num_str)))
        }
    }

    fn read_string(&mut self) -> QueryResult<Token> {
        let quote = self.current_char.unwrap();
        self.advance(); // Skip opening quote

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                return Ok(Token::String(string));
            }
            string.push(ch);
            self.advance();
        }

        Err(QueryError::ParseError("Unterminated string".to_string()))
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Check for keywords (case-insensitive)
        match ident.to_uppercase().as_str() {
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "GROUP" => Token::Group,
            "BY" => Token::By,
            "HAVING" => Token::Having,
            "ORDER" => Token::Order,
            "AS" => Token::As,
            "AND" => Token::And,
            "OR" => Token::Or,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "UNION" => Token::Union,
            "INTERSECT" => Token::Intersect,
            "EXCEPT" => Token::Except,
            "COUNT" => Token::Count,
            "SUM" => Token::Sum,
            "AVG" => Token::Avg,
            _ => Token::Identifier(ident),
        }
    }

    pub fn next_token(&mut self) -> QueryResult<Token> {
        self.skip_whitespace();

        let token = match self.current_char {
            None => Token::Eof,

            Some(ch) if ch.is_numeric() => {
                return self.read_number();
            }

            Some('\'') | Some('"') => {
                return self.read_string();
            }

            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                return Ok(self.read_identifier());
            }

            Some('-') => {
                // Negative numeric literal
                self.advance();
                match self.current_char {
                    Some(ch) if ch.is_numeric() => match self.read_number()? {
                        Token::Integer(n) => Token::Integer(-n),
                        Token::Float(n) => Token::Float(-n),
                        other => other,
                    },
                    _ => {
                        return Err(QueryError::ParseError(
                            "Unexpected character: -".to_string(),
                        ));
                    }
                }
            }

            Some('=') => {
                self.advance();
                Token::Equal
            }

            Some('!') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::NotEqual
                } else {
                    return Err(QueryError::ParseError(
                        "Unexpected character: !".to_string(),
                    ));
                }
            }

            Some('<') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::LessThanEq
                } else if self.current_char == Some('>') {
                    self.advance();
                    Token::NotEqual // <>
                } else {
                    Token::LessThan
                }
            }

            Some('>') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterThanEq
                } else {
                    Token::GreaterThan
                }
            }

            Some('*') => {
                self.advance();
                Token::Star
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('(') => {
                self.advance();
                Token::LeftParen
            }
            Some(')') => {
                self.advance();
                Token::RightParen
            }
            Some(';') => {
                self.advance();
                Token::Semicolon
            }

            Some(ch) => {
                return Err(QueryError::ParseError(format!(
                    "Unexpected character: {}",
                    ch
                )));
            }
        };

        Ok(token)
    }

    pub fn tokenize(&mut self) -> QueryResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}
