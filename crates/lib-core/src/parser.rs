pub mod function;
pub mod lexer;
pub mod markers;
pub mod token;

use smol_str::SmolStr;

use crate::ast::{
    BinaryOperator, Expr, Identifier, Literal, Ordered, Select, SortDirection, Tuple,
    UnaryOperator,
};
use crate::dialects::Dialect;
use crate::errors::SQLParseError;
use function::{DefaultFunctionParser, FunctionParser};
use token::{Token, TokenKind};

/// Wraps a table reference when its keyword follows it in `FROM`, e.g.
/// ClickHouse `t FINAL`.
pub type TableModifier = fn(Expr) -> Expr;

/// Recursive descent parser over the tokens of one input.
///
/// Function calls are dispatched through the dialect's function parser
/// overrides, keyed by the uppercase function name. Anything without an
/// override goes through [`DefaultFunctionParser`].
#[derive(Clone)]
pub struct Parser<'a> {
    dialect: &'a Dialect,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> Parser<'a> {
    pub fn new(dialect: &'a Dialect, mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|token| token.kind != TokenKind::EndOfFile) {
            let position = tokens
                .last()
                .map(|token| token.position.clone())
                .unwrap_or_default();
            tokens.push(Token::end_of_file(position));
        }

        Self {
            dialect,
            tokens,
            index: 0,
        }
    }

    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    /// Parses every statement in the input.
    pub fn parse(mut self) -> Result<Vec<Expr>, SQLParseError> {
        self.parse_statements()
    }

    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// The token `n` places ahead. Looking past the end yields the
    /// end-of-file token.
    pub fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + n).min(last)]
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndOfFile {
            self.index += 1;
        }
        token
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub fn check_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    pub fn consume(&mut self, kind: TokenKind) -> bool {
        let found = self.check(kind);
        if found {
            self.advance();
        }
        found
    }

    pub fn consume_keyword(&mut self, keyword: &str) -> bool {
        let found = self.check_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    pub fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, SQLParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[expected]))
        }
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> Result<Token, SQLParseError> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[keyword]))
        }
    }

    pub fn expect_end_bracket(&mut self) -> Result<Token, SQLParseError> {
        self.expect(TokenKind::EndBracket, "')'")
    }

    /// An error for the current token, listing what would have been accepted.
    pub fn unexpected(&self, expected: &[&str]) -> SQLParseError {
        SQLParseError::unexpected(
            expected.iter().map(|item| item.to_string()).collect(),
            self.peek(),
        )
    }

    /// Parses one or more comma separated items.
    pub fn parse_csv<T>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T, SQLParseError>,
    ) -> Result<Vec<T>, SQLParseError> {
        let mut items = vec![f(self)?];
        while self.consume(TokenKind::Comma) {
            items.push(f(self)?);
        }
        Ok(items)
    }

    /// Parses a possibly empty comma separated list and the closing bracket
    /// that ends it.
    pub fn parse_csv_to_end_bracket<T>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T, SQLParseError>,
    ) -> Result<Vec<T>, SQLParseError> {
        let mut items = Vec::new();
        if self.consume(TokenKind::EndBracket) {
            return Ok(items);
        }

        loop {
            items.push(f(self)?);

            if self.consume(TokenKind::Comma) {
                continue;
            }
            if self.consume(TokenKind::EndBracket) {
                return Ok(items);
            }
            return Err(self.unexpected(&["','", "')'"]));
        }
    }

    pub fn parse_statements(&mut self) -> Result<Vec<Expr>, SQLParseError> {
        let mut statements = Vec::new();

        loop {
            while self.consume(TokenKind::Semicolon) {}
            if self.check(TokenKind::EndOfFile) {
                break;
            }

            statements.push(self.parse_statement()?);

            if !self.check(TokenKind::Semicolon) && !self.check(TokenKind::EndOfFile) {
                return Err(self.unexpected(&["';'", "end of input"]));
            }
        }

        log::trace!("parsed {} statements", statements.len());
        Ok(statements)
    }

    /// A `SELECT` query or a bare, possibly aliased, expression.
    pub fn parse_statement(&mut self) -> Result<Expr, SQLParseError> {
        if self.check_keyword("SELECT") {
            return Ok(Expr::Select(Box::new(self.parse_select()?)));
        }
        self.parse_aliased_expression()
    }

    pub fn parse_select(&mut self) -> Result<Select, SQLParseError> {
        self.expect_keyword("SELECT")?;

        let mut select = Select {
            distinct: self.consume_keyword("DISTINCT"),
            projections: self.parse_csv(Self::parse_projection)?,
            ..Select::default()
        };

        if self.consume_keyword("FROM") {
            select.from = Some(self.parse_table_reference()?);
        }
        if self.consume_keyword("WHERE") {
            select.where_clause = Some(self.parse_expression()?);
        }
        if self.consume_keyword("GROUP") {
            self.expect_keyword("BY")?;
            select.group_by = self.parse_csv(Self::parse_expression)?;
        }
        if self.consume_keyword("HAVING") {
            select.having = Some(self.parse_expression()?);
        }
        if self.consume_keyword("ORDER") {
            self.expect_keyword("BY")?;
            select.order_by = self.parse_csv(Self::parse_ordered)?;
        }
        if self.consume_keyword("LIMIT") {
            select.limit = Some(self.parse_expression()?);
        }

        Ok(select)
    }

    fn parse_projection(&mut self) -> Result<Expr, SQLParseError> {
        let expr = self.parse_expression()?;
        Ok(match self.parse_alias(true)? {
            Some(alias) => expr.alias(alias),
            None => expr,
        })
    }

    /// A table name or subquery, its alias, then any table modifiers the
    /// dialect registered.
    fn parse_table_reference(&mut self) -> Result<Expr, SQLParseError> {
        let this = if self.check(TokenKind::StartBracket) && self.peek_nth(1).is_keyword("SELECT")
        {
            self.advance();
            let select = self.parse_select()?;
            self.expect_end_bracket()?;
            Expr::Subquery(Box::new(select))
        } else {
            self.parse_column()?
        };

        let mut table = match self.parse_alias(true)? {
            Some(alias) => this.alias(alias),
            None => this,
        };

        while self.check(TokenKind::Keyword) {
            let Some(modifier) = self.dialect.table_modifier(&self.peek().construct_id()) else {
                break;
            };
            self.advance();
            table = modifier(table);
        }

        Ok(table)
    }

    fn parse_ordered(&mut self) -> Result<Ordered, SQLParseError> {
        let this = self.parse_expression()?;
        let direction = if self.consume_keyword("ASC") {
            Some(SortDirection::Asc)
        } else if self.consume_keyword("DESC") {
            Some(SortDirection::Desc)
        } else {
            None
        };

        Ok(Ordered { this, direction })
    }

    /// `AS name`, or a bare name when `implicit` is set.
    fn parse_alias(&mut self, implicit: bool) -> Result<Option<Identifier>, SQLParseError> {
        if self.consume_keyword("AS") {
            return self.parse_identifier().map(Some);
        }

        if implicit && matches!(self.peek().kind, TokenKind::Word | TokenKind::QuotedIdentifier)
        {
            return self.parse_identifier().map(Some);
        }

        Ok(None)
    }

    /// An expression. `AS` is not accepted here; see
    /// [`Parser::parse_aliased_expression`].
    pub fn parse_expression(&mut self) -> Result<Expr, SQLParseError> {
        self.parse_binary(0)
    }

    /// An expression optionally followed by `AS name`.
    pub fn parse_aliased_expression(&mut self) -> Result<Expr, SQLParseError> {
        let expr = self.parse_expression()?;
        Ok(match self.parse_alias(false)? {
            Some(alias) => expr.alias(alias),
            None => expr,
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, SQLParseError> {
        let mut left = self.parse_unary(min_precedence)?;

        while let Some(op) = self.peek_binary_operator() {
            if op.precedence() < min_precedence {
                break;
            }

            self.advance();
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        let token = self.peek();

        let op = match token.kind {
            TokenKind::Plus => BinaryOperator::Plus,
            TokenKind::Minus => BinaryOperator::Minus,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Divide => BinaryOperator::Divide,
            TokenKind::Percent => BinaryOperator::Modulo,
            TokenKind::Concat => BinaryOperator::StringConcat,
            TokenKind::Equals => BinaryOperator::Eq,
            TokenKind::NotEquals => BinaryOperator::NotEq,
            TokenKind::LessThan => BinaryOperator::Lt,
            TokenKind::LessThanOrEqual => BinaryOperator::LtEq,
            TokenKind::GreaterThan => BinaryOperator::Gt,
            TokenKind::GreaterThanOrEqual => BinaryOperator::GtEq,
            TokenKind::Keyword if token.is_keyword("AND") => BinaryOperator::And,
            TokenKind::Keyword if token.is_keyword("OR") => BinaryOperator::Or,
            _ => return None,
        };

        Some(op)
    }

    /// A prefix operator and its operand. `NOT` binds looser than comparisons
    /// and arithmetic, so it cannot start an operand of those operators
    /// without brackets.
    fn parse_unary(&mut self, min_precedence: u8) -> Result<Expr, SQLParseError> {
        let kind = self.peek().kind;
        let op = match kind {
            TokenKind::Keyword if self.check_keyword("NOT") => {
                if min_precedence > UnaryOperator::NOT_PRECEDENCE {
                    return Err(self.unexpected(&["expression"]));
                }
                UnaryOperator::Not
            }
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.advance();
        let expr = self.parse_binary(op.precedence())?;
        Ok(Expr::unary(op, expr))
    }

    fn parse_primary(&mut self) -> Result<Expr, SQLParseError> {
        let kind = self.peek().kind;
        match kind {
            TokenKind::NumericLiteral => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::Number(token.text)))
            }
            TokenKind::StringLiteral => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::String(self.string_value(&token))))
            }
            TokenKind::HexStringLiteral => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::HexString(token.text[2..].into())))
            }
            TokenKind::BitStringLiteral => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::BitString(token.text[2..].into())))
            }
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Star)
            }
            TokenKind::Keyword if self.check_keyword("NULL") => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Keyword if self.check_keyword("TRUE") || self.check_keyword("FALSE") => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::Boolean(token.is_keyword("TRUE"))))
            }
            TokenKind::StartBracket => self.parse_bracketed(),
            TokenKind::Word if self.peek_nth(1).kind == TokenKind::StartBracket => {
                self.parse_function()
            }
            TokenKind::Word | TokenKind::QuotedIdentifier => self.parse_column(),
            _ => Err(self.unexpected(&["expression"])),
        }
    }

    /// A subquery, a parenthesized expression or a tuple.
    fn parse_bracketed(&mut self) -> Result<Expr, SQLParseError> {
        self.expect(TokenKind::StartBracket, "'('")?;

        if self.check_keyword("SELECT") {
            let select = self.parse_select()?;
            self.expect_end_bracket()?;
            return Ok(Expr::Subquery(Box::new(select)));
        }

        let mut elements = self.parse_csv_to_end_bracket(Self::parse_expression)?;
        if elements.len() == 1 {
            if let Some(inner) = elements.pop() {
                return Ok(Expr::Paren(Box::new(inner)));
            }
        }

        Ok(Expr::Tuple(Tuple { elements }))
    }

    /// `name(...)`. Dispatches to the dialect's override for the name, or
    /// parses a plain call.
    pub fn parse_function(&mut self) -> Result<Expr, SQLParseError> {
        let name = self.expect(TokenKind::Word, "function name")?;
        self.expect(TokenKind::StartBracket, "'('")?;

        let dialect = self.dialect;
        match dialect.function_parser(&name.construct_id()) {
            Some(strategy) => {
                log::trace!(
                    "{} dialect overrides parsing of {}",
                    dialect.name().name(),
                    name.text
                );
                strategy.parse(self, &name)
            }
            None => DefaultFunctionParser.parse(self, &name),
        }
    }

    /// A name, possibly qualified with dots.
    fn parse_column(&mut self) -> Result<Expr, SQLParseError> {
        let mut parts = vec![self.parse_identifier()?];
        while self.consume(TokenKind::Dot) {
            parts.push(self.parse_identifier()?);
        }

        if parts.len() == 1 {
            if let Some(part) = parts.pop() {
                return Ok(Expr::Identifier(part));
            }
        }

        Ok(Expr::CompoundIdentifier(parts))
    }

    /// The value of a string literal token, with the quotes removed and the
    /// dialect's escapes decoded.
    pub fn string_value(&self, token: &Token) -> SmolStr {
        let body = &token.text[1..token.text.len() - 1];
        unescape_string(body, self.dialect.string_escape()).into()
    }

    pub fn parse_identifier(&mut self) -> Result<Identifier, SQLParseError> {
        let kind = self.peek().kind;
        match kind {
            TokenKind::Word => Ok(Identifier::new(&self.advance().text)),
            TokenKind::QuotedIdentifier => {
                let token = self.advance();
                Ok(Identifier::quoted(&unquote(&token.text)))
            }
            _ => Err(self.unexpected(&["identifier"])),
        }
    }
}

/// Strips the quotes from a quoted identifier and collapses doubled closing
/// quotes.
fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let Some(_) = chars.next() else {
        return String::new();
    };
    let Some(close) = chars.next_back() else {
        return String::new();
    };

    let doubled = [close, close].iter().collect::<String>();
    chars.as_str().replace(&doubled, &close.to_string())
}

/// Decodes the body of a string literal. A doubled quote stands for one
/// quote, and `escape` protects the character after it.
fn unescape_string(body: &str, escape: Option<char>) -> String {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if Some(ch) == escape {
            match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('0') => value.push('\0'),
                Some(other) => value.push(other),
                None => {}
            }
            continue;
        }

        if ch == '\'' {
            chars.next();
        }
        value.push(ch);
    }

    value
}
