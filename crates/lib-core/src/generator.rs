//! Rendering of syntax trees back to SQL text for a dialect.
//!
//! [`Generator::sql`] first looks for a [`Transform`] the dialect registered
//! for the node kind and otherwise falls back to the built-in rendering.

use itertools::Itertools;

use crate::ast::{
    Alias, BinaryOp, Cast, DataType, DataTypeParam, Expr, Identifier, Literal, Select,
    SortDirection, UnaryOperator,
};
use crate::dialects::Dialect;
use crate::errors::SQLUnsupportedError;
use crate::helpers::is_simple_identifier;
use crate::value::Value;

/// How the names of plain function calls are cased on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NormalizeFunctions {
    #[default]
    Upper,
    Lower,
    /// Keep the name as written.
    None,
}

impl NormalizeFunctions {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(value) if value.eq_ignore_ascii_case("upper") => Some(Self::Upper),
            Value::String(value) if value.eq_ignore_ascii_case("lower") => Some(Self::Lower),
            Value::String(value) if value.eq_ignore_ascii_case("none") => Some(Self::None),
            Value::Bool(false) => Some(Self::None),
            _ => None,
        }
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            NormalizeFunctions::Upper => name.to_ascii_uppercase(),
            NormalizeFunctions::Lower => name.to_ascii_lowercase(),
            NormalizeFunctions::None => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeneratorConfig {
    /// Quote every identifier, not only those that need it.
    pub identify: bool,
    pub normalize_functions: NormalizeFunctions,
    pub identifier_quote: (char, char),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            identify: false,
            normalize_functions: NormalizeFunctions::Upper,
            identifier_quote: ('"', '"'),
        }
    }
}

impl GeneratorConfig {
    /// Overrides settings from a configuration map. Unrecognised values are
    /// ignored with a warning.
    pub fn apply(&mut self, value: &Value) {
        if let Some(identify) = value.get("identify") {
            match identify.as_bool() {
                Some(identify) => self.identify = identify,
                None => log::warn!("ignoring invalid value for identify: {identify:?}"),
            }
        }

        if let Some(normalize) = value.get("normalize_functions") {
            match NormalizeFunctions::from_value(normalize) {
                Some(normalize) => self.normalize_functions = normalize,
                None => log::warn!("ignoring invalid value for normalize_functions: {normalize:?}"),
            }
        }
    }
}

/// Renders one node kind for a dialect, replacing the built-in rendering.
pub trait Transform: Send + Sync {
    fn render(&self, generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError>;
}

pub type TransformFn = fn(&Generator<'_>, &Expr) -> Result<String, SQLUnsupportedError>;

/// A transform backed by a plain function.
#[derive(Clone, Copy)]
pub struct NativeTransform {
    f: TransformFn,
}

impl NativeTransform {
    pub const fn new(f: TransformFn) -> Self {
        Self { f }
    }
}

impl Transform for NativeTransform {
    fn render(&self, generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
        (self.f)(generator, expr)
    }
}

/// Renders canonical function nodes, and plain calls, as a call to a fixed
/// function name, e.g. `ApproxDistinct` as `uniq(x)`.
#[derive(Debug, Clone, Copy)]
pub struct RenameFunction {
    name: &'static str,
}

impl RenameFunction {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Transform for RenameFunction {
    fn render(&self, generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
        let args = match expr {
            Expr::ApproxDistinct(this) | Expr::AnyValue(this) => vec![&**this],
            Expr::RegexpLike(node) => vec![&*node.this, &*node.expression],
            Expr::Function(call) => call.args.iter().collect(),
            _ => return generator.default_sql(expr),
        };

        Ok(format!("{}({})", self.name, generator.expressions(args)?))
    }
}

#[derive(Clone, Copy)]
pub struct Generator<'a> {
    dialect: &'a Dialect,
}

impl<'a> Generator<'a> {
    pub fn new(dialect: &'a Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    pub fn config(&self) -> &'a GeneratorConfig {
        &self.dialect.generator_config
    }

    pub fn unsupported(&self, expr: &Expr) -> SQLUnsupportedError {
        SQLUnsupportedError::new(expr.kind(), self.dialect.name())
    }

    /// Renders `expr`, using the dialect's transform for its kind if one is
    /// registered.
    pub fn sql(&self, expr: &Expr) -> Result<String, SQLUnsupportedError> {
        match self.dialect.transform(expr.kind()) {
            Some(transform) => {
                log::trace!(
                    "{} dialect overrides rendering of {}",
                    self.dialect.name().name(),
                    expr.kind()
                );
                transform.render(self, expr)
            }
            None => self.default_sql(expr),
        }
    }

    /// The built-in rendering of `expr`. Children still go through
    /// [`Generator::sql`].
    pub fn default_sql(&self, expr: &Expr) -> Result<String, SQLUnsupportedError> {
        Ok(match expr {
            Expr::Identifier(identifier) => self.identifier(identifier),
            Expr::CompoundIdentifier(parts) => {
                parts.iter().map(|part| self.identifier(part)).join(".")
            }
            Expr::Literal(literal) => self.literal_sql(expr, literal)?,
            Expr::Star => "*".to_string(),
            Expr::BinaryOp(op) => self.binary_sql(op)?,
            Expr::UnaryOp(op) => {
                let operand = self.operand(&op.expr, op.op.precedence(), false)?;
                match op.op {
                    UnaryOperator::Not => format!("NOT {operand}"),
                    UnaryOperator::Minus if operand.starts_with('-') => format!("- {operand}"),
                    UnaryOperator::Minus => format!("-{operand}"),
                    UnaryOperator::Plus => format!("+{operand}"),
                }
            }
            Expr::Paren(inner) => format!("({})", self.sql(inner)?),
            Expr::Tuple(tuple) => format!("({})", self.expressions(&tuple.elements)?),
            Expr::Alias(alias) => self.alias_sql(alias)?,
            Expr::Function(call) => self.func(&call.name, &call.args)?,
            // Standard SQL has no syntax for naming struct fields inline.
            Expr::Struct(node)
                if node.elements.iter().any(|element| element.alias_name().is_some()) =>
            {
                return Err(self.unsupported(expr));
            }
            Expr::Struct(node) => format!("STRUCT({})", self.expressions(&node.elements)?),
            Expr::Cast(cast) => self.cast_sql(cast)?,
            Expr::ApproxDistinct(this) => self.func("APPROX_DISTINCT", [&**this])?,
            Expr::AnyValue(this) => self.func("ANY_VALUE", [&**this])?,
            Expr::RegexpLike(node) => self.func("REGEXP_LIKE", [&*node.this, &*node.expression])?,
            Expr::Quantile(_) | Expr::VarMap(_) | Expr::Final(_) => {
                return Err(self.unsupported(expr));
            }
            Expr::Subquery(select) => format!("({})", self.select_sql(select)?),
            Expr::Select(select) => self.select_sql(select)?,
        })
    }

    /// Comma separated renderings of `exprs`.
    pub fn expressions<'e>(
        &self,
        exprs: impl IntoIterator<Item = &'e Expr>,
    ) -> Result<String, SQLUnsupportedError> {
        let rendered = exprs
            .into_iter()
            .map(|expr| self.sql(expr))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(", "))
    }

    /// A call to `name`, cased according to the dialect's settings.
    pub fn func<'e>(
        &self,
        name: &str,
        args: impl IntoIterator<Item = &'e Expr>,
    ) -> Result<String, SQLUnsupportedError> {
        Ok(format!(
            "{}({})",
            self.config().normalize_functions.apply(name),
            self.expressions(args)?
        ))
    }

    pub fn alias_sql(&self, alias: &Alias) -> Result<String, SQLUnsupportedError> {
        Ok(format!(
            "{} AS {}",
            self.sql(&alias.this)?,
            self.identifier(&alias.alias)
        ))
    }

    /// Quotes `identifier` when it was quoted in the input, when every
    /// identifier is quoted, or when it would not lex back as a plain word.
    pub fn identifier(&self, identifier: &Identifier) -> String {
        let config = self.config();
        let name = identifier.name.as_str();

        let quote = identifier.quoted
            || config.identify
            || !is_simple_identifier(name)
            || self.dialect.is_reserved_keyword(name);
        if !quote {
            return name.to_string();
        }

        let (open, close) = config.identifier_quote;
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    fn binary_sql(&self, op: &BinaryOp) -> Result<String, SQLUnsupportedError> {
        let precedence = op.op.precedence();
        Ok(format!(
            "{} {} {}",
            self.operand(&op.left, precedence, false)?,
            op.op.as_str(),
            self.operand(&op.right, precedence, true)?
        ))
    }

    /// Renders an operand, bracketing it if it binds looser than its parent.
    fn operand(
        &self,
        child: &Expr,
        parent_precedence: u8,
        right: bool,
    ) -> Result<String, SQLUnsupportedError> {
        let sql = self.sql(child)?;
        let precedence = match child {
            Expr::BinaryOp(op) => op.op.precedence(),
            Expr::UnaryOp(op) => op.op.precedence(),
            _ => return Ok(sql),
        };

        if precedence < parent_precedence || (right && precedence == parent_precedence) {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    /// A string literal quoted for the dialect. With an escape character
    /// quotes, the escape itself and control characters are escaped with it,
    /// otherwise quotes are doubled.
    pub fn string(&self, value: &str) -> String {
        let escape = self.dialect.string_escape();
        let mut sql = String::with_capacity(value.len() + 2);
        sql.push('\'');

        for ch in value.chars() {
            let Some(escape) = escape else {
                if ch == '\'' {
                    sql.push('\'');
                }
                sql.push(ch);
                continue;
            };

            let escaped = match ch {
                '\'' => '\'',
                '\n' => 'n',
                '\t' => 't',
                '\r' => 'r',
                '\0' => '0',
                _ if ch == escape => escape,
                _ => {
                    sql.push(ch);
                    continue;
                }
            };
            sql.push(escape);
            sql.push(escaped);
        }

        sql.push('\'');
        sql
    }

    /// Hex and bit literals render as the number they stand for.
    fn literal_sql(&self, expr: &Expr, literal: &Literal) -> Result<String, SQLUnsupportedError> {
        let (digits, radix) = match literal {
            Literal::Number(number) => return Ok(number.to_string()),
            Literal::String(value) => return Ok(self.string(value)),
            Literal::Boolean(true) => return Ok("TRUE".to_string()),
            Literal::Boolean(false) => return Ok("FALSE".to_string()),
            Literal::Null => return Ok("NULL".to_string()),
            Literal::HexString(digits) => (digits, 16),
            Literal::BitString(digits) => (digits, 2),
        };

        u128::from_str_radix(digits, radix)
            .map(|value| value.to_string())
            .map_err(|_| self.unsupported(expr))
    }

    fn cast_sql(&self, cast: &Cast) -> Result<String, SQLUnsupportedError> {
        Ok(format!(
            "CAST({} AS {})",
            self.sql(&cast.this)?,
            self.data_type(&cast.to)
        ))
    }

    /// A type in the dialect's spelling.
    pub fn data_type(&self, data_type: &DataType) -> String {
        let name = self.dialect.type_name(&data_type.name);
        if data_type.params.is_empty() {
            return name.to_string();
        }

        let params = data_type.params.iter().map(|param| match param {
            DataTypeParam::Number(number) => number.to_string(),
            DataTypeParam::String(value) => self.string(value),
            DataTypeParam::Type(inner) => self.data_type(inner),
        });
        format!("{name}({})", params.format(", "))
    }

    fn select_sql(&self, select: &Select) -> Result<String, SQLUnsupportedError> {
        let mut sql = String::from("SELECT ");
        if select.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.expressions(&select.projections)?);

        if let Some(from) = &select.from {
            sql.push_str(" FROM ");
            sql.push_str(&self.sql(from)?);
        }
        if let Some(condition) = &select.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.sql(condition)?);
        }
        if !select.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.expressions(&select.group_by)?);
        }
        if let Some(condition) = &select.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.sql(condition)?);
        }
        if !select.order_by.is_empty() {
            let ordered = select
                .order_by
                .iter()
                .map(|ordered| {
                    let this = self.sql(&ordered.this)?;
                    Ok(match ordered.direction {
                        Some(SortDirection::Asc) => format!("{this} ASC"),
                        Some(SortDirection::Desc) => format!("{this} DESC"),
                        None => this,
                    })
                })
                .collect::<Result<Vec<_>, SQLUnsupportedError>>()?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&ordered.join(", "));
        }
        if let Some(limit) = &select.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&self.sql(limit)?);
        }

        Ok(sql)
    }
}
