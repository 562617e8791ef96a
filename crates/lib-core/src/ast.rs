//! Dialect neutral syntax tree.
//!
//! Nodes own their children. Nothing here records which dialect produced a
//! node; the only concession to surface syntax is [`Struct::surface`], which
//! generators may consult to reproduce the keyword that was typed.

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expr {
    Identifier(Identifier),
    /// A dotted name such as `schema.table.column`.
    CompoundIdentifier(Vec<Identifier>),
    Literal(Literal),
    Star,
    BinaryOp(BinaryOp),
    UnaryOp(UnaryOp),
    Paren(Box<Expr>),
    Tuple(Tuple),
    Alias(Alias),
    Function(FunctionCall),
    Struct(Struct),
    Cast(Cast),
    ApproxDistinct(Box<Expr>),
    AnyValue(Box<Expr>),
    Quantile(Quantile),
    RegexpLike(RegexpLike),
    VarMap(VarMap),
    /// A table read with merge-on-read semantics, e.g. ClickHouse `t FINAL`.
    Final(Box<Expr>),
    Subquery(Box<Select>),
    Select(Box<Select>),
}

/// The kind of an [`Expr`], used as the key of generator transforms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::IntoStaticStr,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExprKind {
    Identifier,
    CompoundIdentifier,
    Literal,
    Star,
    BinaryOp,
    UnaryOp,
    Paren,
    Tuple,
    Alias,
    Function,
    Struct,
    Cast,
    ApproxDistinct,
    AnyValue,
    Quantile,
    RegexpLike,
    VarMap,
    Final,
    Subquery,
    Select,
}

impl Expr {
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Identifier(_) => ExprKind::Identifier,
            Expr::CompoundIdentifier(_) => ExprKind::CompoundIdentifier,
            Expr::Literal(_) => ExprKind::Literal,
            Expr::Star => ExprKind::Star,
            Expr::BinaryOp(_) => ExprKind::BinaryOp,
            Expr::UnaryOp(_) => ExprKind::UnaryOp,
            Expr::Paren(_) => ExprKind::Paren,
            Expr::Tuple(_) => ExprKind::Tuple,
            Expr::Alias(_) => ExprKind::Alias,
            Expr::Function(_) => ExprKind::Function,
            Expr::Struct(_) => ExprKind::Struct,
            Expr::Cast(_) => ExprKind::Cast,
            Expr::ApproxDistinct(_) => ExprKind::ApproxDistinct,
            Expr::AnyValue(_) => ExprKind::AnyValue,
            Expr::Quantile(_) => ExprKind::Quantile,
            Expr::RegexpLike(_) => ExprKind::RegexpLike,
            Expr::VarMap(_) => ExprKind::VarMap,
            Expr::Final(_) => ExprKind::Final,
            Expr::Subquery(_) => ExprKind::Subquery,
            Expr::Select(_) => ExprKind::Select,
        }
    }

    pub fn ident(name: &str) -> Expr {
        Expr::Identifier(Identifier::new(name))
    }

    pub fn number(value: impl ToString) -> Expr {
        Expr::Literal(Literal::Number(value.to_string().into()))
    }

    /// A string literal holding `value`. Generators escape it for their
    /// dialect.
    pub fn string(value: &str) -> Expr {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOperator, expr: Expr) -> Expr {
        Expr::UnaryOp(UnaryOp {
            op,
            expr: Box::new(expr),
        })
    }

    /// Binds this expression to `alias`. Aliasing an alias rebinds the
    /// underlying expression instead of nesting.
    pub fn alias(self, alias: Identifier) -> Expr {
        let this = match self {
            Expr::Alias(inner) => inner.this,
            other => Box::new(other),
        };

        Expr::Alias(Alias { this, alias })
    }

    pub fn function(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Function(FunctionCall {
            name: name.into(),
            args,
        })
    }

    /// The alias bound to this expression, if any.
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Expr::Alias(alias) => Some(&alias.alias.name),
            _ => None,
        }
    }

    /// The expression with any alias binding removed.
    pub fn unalias(&self) -> &Expr {
        match self {
            Expr::Alias(alias) => &alias.this,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Identifier {
    pub name: SmolStr,
    pub quoted: bool,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: &str) -> Self {
        Self {
            name: name.into(),
            quoted: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Literal {
    /// Kept as written so that no precision is lost.
    Number(SmolStr),
    /// The decoded value, free of any dialect's escapes.
    String(SmolStr),
    /// Hexadecimal digits of a literal such as `0x1F`, without the prefix.
    HexString(SmolStr),
    /// Binary digits of a literal such as `0b101`, without the prefix.
    BitString(SmolStr),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    StringConcat,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    /// Binding power, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq => 4,
            BinaryOperator::StringConcat => 5,
            BinaryOperator::Plus | BinaryOperator::Minus => 6,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "OR",
            BinaryOperator::And => "AND",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::StringConcat => "||",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

impl UnaryOperator {
    pub const NOT_PRECEDENCE: u8 = 3;
    pub const SIGN_PRECEDENCE: u8 = 8;

    pub fn precedence(self) -> u8 {
        match self {
            UnaryOperator::Not => Self::NOT_PRECEDENCE,
            UnaryOperator::Minus | UnaryOperator::Plus => Self::SIGN_PRECEDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BinaryOp {
    pub left: Box<Expr>,
    pub op: BinaryOperator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnaryOp {
    pub op: UnaryOperator,
    pub expr: Box<Expr>,
}

/// A parenthesized list of two or more expressions, or `()`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tuple {
    pub elements: Vec<Expr>,
}

/// An expression bound to a name with `AS`. `this` is never itself an
/// alias; build these with [`Expr::alias`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Alias {
    pub this: Box<Expr>,
    pub alias: Identifier,
}

/// A call to a function without dedicated syntax.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionCall {
    /// The name as written.
    pub name: SmolStr,
    pub args: Vec<Expr>,
}

/// Ordered elements with optional names, e.g. ClickHouse `tuple(a AS x)` or
/// BigQuery `STRUCT(a AS x)`. Named elements are [`Expr::Alias`] nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Struct {
    pub elements: Vec<Expr>,
    /// The keyword as typed. Only generators look at this.
    pub surface: Option<SmolStr>,
}

/// A type with its canonical uppercase name, e.g. `BIGINT` for ClickHouse
/// `Int64`. Dialects map canonical names to their own spelling on output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataType {
    pub name: SmolStr,
    pub params: Vec<DataTypeParam>,
}

impl DataType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<DataTypeParam>) -> Self {
        self.params = params;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DataTypeParam {
    Number(SmolStr),
    String(SmolStr),
    Type(DataType),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cast {
    pub this: Box<Expr>,
    pub to: DataType,
}

/// `REGEXP_LIKE(this, expression)`, ClickHouse `match`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegexpLike {
    pub this: Box<Expr>,
    pub expression: Box<Expr>,
}

/// A map literal built from alternating keys and values, as in ClickHouse
/// `map(k1, v1, k2, v2)`. Both lists have the same length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VarMap {
    pub keys: Vec<Expr>,
    pub values: Vec<Expr>,
}

/// A parametric quantile aggregate, `quantile` level applied to `this`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Quantile {
    pub this: Box<Expr>,
    pub quantile: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ordered {
    pub this: Expr,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Select {
    pub distinct: bool,
    pub projections: Vec<Expr>,
    /// A table name or a subquery, possibly aliased and wrapped by table
    /// modifiers such as [`Expr::Final`].
    pub from: Option<Expr>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<Ordered>,
    pub limit: Option<Expr>,
}
