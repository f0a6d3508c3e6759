//! Recursive-descent parser for the mini-SQL dialect.
//!
//! Produces a typed statement structure instead of scanning the query text
//! by keyword position. Accepted input stays deliberately lenient: a
//! WHERE/HAVING fragment without a recognized comparison operator is
//! dropped from the condition tree rather than rejected, and tokens
//! trailing a complete statement are ignored.

use serde_json::Value;

use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Compound {
        op: SetOp,
        left: SelectStatement,
        right: SelectStatement,
    },
}

/// Top-level set operation combining two SELECT results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub columns: Vec<SelectColumn>,
    pub from: String,
    pub where_clause: Option<ConditionExpr>,
    pub group_by: Vec<String>,
    pub having: Option<ConditionExpr>,
    pub order_by: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    Star,
    Column {
        name: String,
        alias: Option<String>,
    },
    Aggregate {
        func: AggregateFunc,
        arg: String,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
}

impl AggregateFunc {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub field: String,
    pub descending: bool,
}

/// Comparison operators usable in WHERE and HAVING conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// One field/operator/literal comparison term.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

/// Boolean expression tree over comparison terms.
///
/// The parser records the full AND/OR structure; the executor decides
/// whether to honor it or flatten it to a conjunction (see
/// `ExecutorConfig::flatten_connectives`).
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    Leaf(Condition),
    And(Box<ConditionExpr>, Box<ConditionExpr>),
    Or(Box<ConditionExpr>, Box<ConditionExpr>),
}

impl ConditionExpr {
    /// Collect every leaf condition in source order, discarding the
    /// connective structure.
    pub fn leaves(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            ConditionExpr::Leaf(cond) => out.push(cond),
            ConditionExpr::And(left, right) | ConditionExpr::Or(left, right) => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(input: &str) -> QueryResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn peek_token(&self, offset: usize) -> &Token {
        self.tokens.get(self.position + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: Token) -> QueryResult<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(QueryError::ParseError(format!(
                "Expected {:?}, found {}",
                expected,
                self.current_token().describe()
            )))
        }
    }

    /// Consume an identifier. The aggregate keywords double as plain
    /// column names when not followed by an argument list (grouped rows
    /// carry a `count` column).
    fn expect_identifier(&mut self) -> QueryResult<String> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Count => {
                self.advance();
                Ok("count".to_string())
            }
            Token::Sum => {
                self.advance();
                Ok("sum".to_string())
            }
            Token::Avg => {
                self.advance();
                Ok("avg".to_string())
            }
            other => Err(QueryError::ParseError(format!(
                "Expected identifier, found {}",
                other.describe()
            ))),
        }
    }

    /// Parse a full query: a SELECT statement, optionally combined with a
    /// second one through a single UNION/INTERSECT/EXCEPT.
    pub fn parse(&mut self) -> QueryResult<Statement> {
        if *self.current_token() != Token::Select {
            return Err(QueryError::UnsupportedQueryKind(
                self.current_token().describe(),
            ));
        }

        let left = self.parse_select()?;

        let stmt = match self.current_token() {
            Token::Union | Token::Intersect | Token::Except => {
                let op = match self.current_token() {
                    Token::Union => SetOp::Union,
                    Token::Intersect => SetOp::Intersect,
                    _ => SetOp::Except,
                };
                self.advance();

                if *self.current_token() != Token::Select {
                    return Err(QueryError::UnsupportedQueryKind(
                        self.current_token().describe(),
                    ));
                }
                let right = self.parse_select()?;

                // Single split only: queries do not nest set operations
                if matches!(
                    self.current_token(),
                    Token::Union | Token::Intersect | Token::Except
                ) {
                    return Err(QueryError::ParseError(
                        "Nested set operations are not supported".to_string(),
                    ));
                }

                Statement::Compound { op, left, right }
            }
            _ => Statement::Select(left),
        };

        if *self.current_token() == Token::Semicolon {
            self.advance();
        }

        Ok(stmt)
    }

    fn parse_select(&mut self) -> QueryResult<SelectStatement> {
        self.expect(Token::Select)?;

        let columns = self.parse_select_columns()?;

        // The clause scanner this replaces located FROM anywhere in the
        // statement; skip stray tokens between the column list and FROM.
        while !matches!(
            self.current_token(),
            Token::From
                | Token::Union
                | Token::Intersect
                | Token::Except
                | Token::Semicolon
                | Token::Eof
        ) {
            self.advance();
        }
        if *self.current_token() != Token::From {
            return Err(QueryError::MissingFromClause);
        }
        self.advance();

        let from = self.expect_identifier()?;

        let where_clause = if *self.current_token() == Token::Where {
            self.advance();
            self.parse_condition_expr()
        } else {
            None
        };

        let group_by = if *self.current_token() == Token::Group {
            self.advance();
            self.expect(Token::By)?;
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };

        let having = if *self.current_token() == Token::Having {
            self.advance();
            self.parse_condition_expr()
        } else {
            None
        };

        let order_by = if *self.current_token() == Token::Order {
            self.advance();
            self.expect(Token::By)?;
            self.parse_order_by_list()?
        } else {
            Vec::new()
        };

        Ok(SelectStatement {
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by,
        })
    }

    fn parse_select_columns(&mut self) -> QueryResult<Vec<SelectColumn>> {
        let mut columns = Vec::new();

        loop {
            let col = self.parse_select_column()?;
            columns.push(col);

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        Ok(columns)
    }

    fn parse_select_column(&mut self) -> QueryResult<SelectColumn> {
        if *self.current_token() == Token::Star {
            self.advance();
            return Ok(SelectColumn::Star);
        }

        // Aggregate call only when an argument list follows; a bare
        // COUNT/SUM/AVG keyword is an ordinary column reference
        if let Some(func) = self.aggregate_func() {
            if *self.peek_token(1) == Token::LeftParen {
                self.advance();
                self.expect(Token::LeftParen)?;
                let arg = if *self.current_token() == Token::Star {
                    self.advance();
                    "*".to_string()
                } else {
                    self.expect_identifier()?
                };
                self.expect(Token::RightParen)?;

                let alias = self.parse_optional_alias()?;

                return Ok(SelectColumn::Aggregate { func, arg, alias });
            }
        }

        let name = self.expect_identifier()?;
        let alias = self.parse_optional_alias()?;

        Ok(SelectColumn::Column { name, alias })
    }

    fn aggregate_func(&self) -> Option<AggregateFunc> {
        match self.current_token() {
            Token::Count => Some(AggregateFunc::Count),
            Token::Sum => Some(AggregateFunc::Sum),
            Token::Avg => Some(AggregateFunc::Avg),
            _ => None,
        }
    }

    fn parse_optional_alias(&mut self) -> QueryResult<Option<String>> {
        if *self.current_token() == Token::As {
            self.advance();
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_identifier_list(&mut self) -> QueryResult<Vec<String>> {
        let mut list = Vec::new();

        loop {
            list.push(self.expect_identifier()?);

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        Ok(list)
    }

    fn parse_order_by_list(&mut self) -> QueryResult<Vec<OrderByItem>> {
        let mut items = Vec::new();

        loop {
            let field = self.expect_identifier()?;

            let descending = if *self.current_token() == Token::Desc {
                self.advance();
                true
            } else if *self.current_token() == Token::Asc {
                self.advance();
                false
            } else {
                false
            };

            items.push(OrderByItem { field, descending });

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        Ok(items)
    }

    /// Parse a WHERE/HAVING condition expression: comparison terms joined
    /// by AND/OR, with OR binding loosest. Returns None when every
    /// fragment was dropped as malformed.
    fn parse_condition_expr(&mut self) -> Option<ConditionExpr> {
        let mut left = self.parse_condition_conjunction();

        while *self.current_token() == Token::Or {
            self.advance();
            let right = self.parse_condition_conjunction();
            left = Self::combine(left, right, false);
        }

        left
    }

    fn parse_condition_conjunction(&mut self) -> Option<ConditionExpr> {
        let mut left = self.parse_condition_leaf();

        while *self.current_token() == Token::And {
            self.advance();
            let right = self.parse_condition_leaf();
            left = Self::combine(left, right, true);
        }

        left
    }

    fn combine(
        left: Option<ConditionExpr>,
        right: Option<ConditionExpr>,
        conjunction: bool,
    ) -> Option<ConditionExpr> {
        match (left, right) {
            (Some(l), Some(r)) => Some(if conjunction {
                ConditionExpr::And(Box::new(l), Box::new(r))
            } else {
                ConditionExpr::Or(Box::new(l), Box::new(r))
            }),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }

    /// Parse one field/operator/literal term. A fragment missing any of
    /// the three parts is skipped up to the next connective or clause
    /// boundary and dropped.
    fn parse_condition_leaf(&mut self) -> Option<ConditionExpr> {
        let field = match self.parse_condition_field() {
            Some(field) => field,
            None => {
                self.skip_condition_fragment();
                return None;
            }
        };

        let op = match self.current_token() {
            Token::Equal => CompareOp::Eq,
            Token::NotEqual => CompareOp::NotEq,
            Token::LessThan => CompareOp::Lt,
            Token::LessThanEq => CompareOp::LtEq,
            Token::GreaterThan => CompareOp::Gt,
            Token::GreaterThanEq => CompareOp::GtEq,
            _ => {
                self.skip_condition_fragment();
                return None;
            }
        };
        self.advance();

        let value = match self.parse_condition_literal() {
            Some(value) => value,
            None => {
                self.skip_condition_fragment();
                return None;
            }
        };

        Some(ConditionExpr::Leaf(Condition { field, op, value }))
    }

    fn parse_condition_field(&mut self) -> Option<String> {
        // Aggregate-shaped references such as AVG(salary) are accepted as
        // plain field names, matching the original text-keyed lookup.
        if let Some(func) = self.aggregate_func() {
            if *self.peek_token(1) == Token::LeftParen {
                self.advance();
                self.advance();
                let arg = match self.current_token().clone() {
                    Token::Star => {
                        self.advance();
                        "*".to_string()
                    }
                    Token::Identifier(name) => {
                        self.advance();
                        name
                    }
                    _ => return None,
                };
                if *self.current_token() != Token::RightParen {
                    return None;
                }
                self.advance();
                return Some(format!("{}({})", func.name(), arg));
            }
        }

        // Identifiers, with the aggregate keywords doubling as column
        // names (the grouped-row `count` column in particular)
        self.expect_identifier().ok()
    }

    fn parse_condition_literal(&mut self) -> Option<Value> {
        let value = match self.current_token().clone() {
            Token::Integer(n) => Value::from(n),
            Token::Float(n) => Value::from(n),
            Token::String(s) => Value::String(s),
            // Bare words compare as text, like unquoted literals did
            Token::Identifier(s) => Value::String(s),
            _ => return None,
        };
        self.advance();
        Some(value)
    }

    fn skip_condition_fragment(&mut self) {
        while !matches!(
            self.current_token(),
            Token::And
                | Token::Or
                | Token::Group
                | Token::Having
                | Token::Order
                | Token::Union
                | Token::Intersect
                | Token::Except
                | Token::Semicolon
                | Token::Eof
        ) {
            self.advance();
        }
    }
}
