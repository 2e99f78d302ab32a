use std::fmt;

/// Constant values that can appear as leaves of an expression tree.
///
/// A renderer either binds a constant (collecting it next to the rendered
/// text) or inlines it with [`to_literal`](Value::to_literal). The plain
/// [`Display`](fmt::Display) form is what as-string placeholders (`{0s}`)
/// receive.
///
/// ```rust
/// use query_templates::Value;
///
/// let s: Value = "it's".into();
/// assert_eq!(s.to_literal(), "'it''s'");
/// assert_eq!(s.to_string(), "it's");
///
/// let n: Value = 42i64.into();
/// assert_eq!(n.to_literal(), "42");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Render as an inline literal.
    ///
    /// - `String` — single-quoted, embedded quotes doubled
    /// - `Float` — always carries a fractional part (`1.0`)
    /// - `Null` — `null`
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => format!("{n:?}"),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    /// The [`TypeKind`] an expression holding this constant evaluates to.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Value::Null => TypeKind::Any,
            Value::Bool(_) => TypeKind::Boolean,
            Value::Integer(_) | Value::Float(_) => TypeKind::Number,
            Value::String(_) => TypeKind::String,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ── Result types ────────────────────────────────────────────────────────

/// Runtime tag for the result type of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Number,
    String,
    /// Unknown or mixed; used for `null` constants and untyped operators.
    Any,
}

/// Marker for Rust types that name an expression result type.
///
/// This is what [`Operator<T>`](crate::Operator) and
/// [`TypedExpr<T>`](crate::TypedExpr) are parameterised by. It carries no
/// data at runtime beyond [`KIND`](ExprType::KIND).
pub trait ExprType: Send + Sync + 'static {
    const KIND: TypeKind;
}

impl ExprType for bool {
    const KIND: TypeKind = TypeKind::Boolean;
}

impl ExprType for String {
    const KIND: TypeKind = TypeKind::String;
}

impl ExprType for i64 {
    const KIND: TypeKind = TypeKind::Number;
}

impl ExprType for f64 {
    const KIND: TypeKind = TypeKind::Number;
}

/// Result type for expressions whose type is not tracked statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Any;

impl ExprType for Any {
    const KIND: TypeKind = TypeKind::Any;
}
