use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::template::Template;
use super::value::{ExprType, TypeKind, Value};
use crate::error::RenderError;

// ── Operators ───────────────────────────────────────────────────────────

/// Identity of an operator. Built-in operators use ids below
/// `FIRST_USER_ID`; [`Operator::new`] hands out the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(u32);

const FIRST_USER_ID: u32 = 1 << 16;

static NEXT_OPERATOR_ID: AtomicU32 = AtomicU32::new(FIRST_USER_ID);

/// A named operation whose result has type `T`.
///
/// Operators are identity tokens: two operators created separately are
/// different even if they share a name, and copies of one operator are
/// all equal. The name is only for display and diagnostics.
///
/// ```rust
/// use query_templates::Operator;
///
/// let a: Operator<bool> = Operator::new("MATCHES");
/// let b: Operator<bool> = Operator::new("MATCHES");
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
pub struct Operator<T> {
    id: OperatorId,
    name: &'static str,
    _result: PhantomData<fn() -> T>,
}

impl<T> Operator<T> {
    /// Create a new operator with a fresh identity.
    pub fn new(name: &'static str) -> Self {
        let id = NEXT_OPERATOR_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: OperatorId(id),
            name,
            _result: PhantomData,
        }
    }

    pub(crate) const fn builtin(id: u32, name: &'static str) -> Self {
        assert!(id < FIRST_USER_ID);
        Self {
            id: OperatorId(id),
            name,
            _result: PhantomData,
        }
    }

    pub fn id(&self) -> OperatorId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ExprType> Operator<T> {
    /// Drop the static result type, keeping identity, name and a runtime
    /// [`TypeKind`].
    pub fn erase(&self) -> AnyOperator {
        AnyOperator {
            id: self.id,
            name: self.name,
            result: T::KIND,
        }
    }
}

impl<T> Clone for Operator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Operator<T> {}

impl<T> PartialEq for Operator<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Operator<T> {}

impl<T> Hash for Operator<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Operator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id.0)
    }
}

impl<T> fmt::Display for Operator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An [`Operator`] with its result type erased, as stored in an
/// [`Operation`]. Equality and hashing use the identity only.
#[derive(Debug, Clone, Copy)]
pub struct AnyOperator {
    id: OperatorId,
    name: &'static str,
    result: TypeKind,
}

impl AnyOperator {
    pub fn id(&self) -> OperatorId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn result_type(&self) -> TypeKind {
        self.result
    }

    /// Whether this is the erased form of `operator`.
    pub fn is<T>(&self, operator: &Operator<T>) -> bool {
        self.id == operator.id
    }
}

impl PartialEq for AnyOperator {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnyOperator {}

impl Hash for AnyOperator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> PartialEq<Operator<T>> for AnyOperator {
    fn eq(&self, other: &Operator<T>) -> bool {
        self.is(other)
    }
}

impl<T: ExprType> From<Operator<T>> for AnyOperator {
    fn from(operator: Operator<T>) -> Self {
        operator.erase()
    }
}

impl fmt::Display for AnyOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ── Expressions ─────────────────────────────────────────────────────────

/// An expression node with its result type erased.
///
/// Nodes are immutable values. Children of an [`Operation`] or
/// [`TemplateExpr`] live in an `Arc<[Expr]>`, so cloning a node is cheap
/// and subtrees can be shared freely across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    kind: ExprKind,
    ty: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A constant value: `42`, `'abc'`, `null`.
    Constant(Value),

    /// A reference to a named column or variable: `companies.id`.
    Path(Path),

    /// An operator applied to ordered arguments.
    Operation(Operation),

    /// A custom template applied to ordered arguments.
    Template(TemplateExpr),
}

impl Expr {
    fn new(kind: ExprKind, ty: TypeKind) -> Self {
        Self { kind, ty }
    }

    /// A constant whose type is taken from the value.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.type_kind();
        Self::new(ExprKind::Constant(value), ty)
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// The result type this node was built with.
    pub fn type_kind(&self) -> TypeKind {
        self.ty
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match &self.kind {
            ExprKind::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match &self.kind {
            ExprKind::Path(path) => Some(path),
            _ => None,
        }
    }
}

/// An [`Expr`] that remembers its result type `T` at compile time.
///
/// `TypedExpr<T>` is what the builder functions return. It dereferences to
/// [`Expr`] and converts into one with `.into()` when handed to an
/// operation as an argument.
pub struct TypedExpr<T> {
    expr: Expr,
    _ty: PhantomData<fn() -> T>,
}

impl<T> TypedExpr<T> {
    fn wrap(expr: Expr) -> Self {
        Self {
            expr,
            _ty: PhantomData,
        }
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T> Deref for TypedExpr<T> {
    type Target = Expr;

    fn deref(&self) -> &Expr {
        &self.expr
    }
}

impl<T> Clone for TypedExpr<T> {
    fn clone(&self) -> Self {
        Self::wrap(self.expr.clone())
    }
}

impl<T> fmt::Debug for TypedExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.expr, f)
    }
}

impl<T> From<TypedExpr<T>> for Expr {
    fn from(typed: TypedExpr<T>) -> Self {
        typed.expr
    }
}

impl<T> From<&TypedExpr<T>> for Expr {
    fn from(typed: &TypedExpr<T>) -> Self {
        typed.expr.clone()
    }
}

/// Build a typed constant.
pub fn constant<T: ExprType + Into<Value>>(value: T) -> TypedExpr<T> {
    TypedExpr::wrap(Expr::new(ExprKind::Constant(value.into()), T::KIND))
}

/// Build a typed path from its dotted segments.
///
/// ```rust
/// use query_templates::path;
///
/// let id = path::<i64>(["companies", "id"]);
/// assert_eq!(id.as_path().unwrap().to_string(), "companies.id");
/// ```
pub fn path<T: ExprType>(segments: impl IntoIterator<Item = impl Into<String>>) -> TypedExpr<T> {
    TypedExpr::wrap(Expr::new(ExprKind::Path(Path::from_segments(segments)), T::KIND))
}

/// Build an [`Operation`] node applying `operator` to `args`.
///
/// The result type comes from the operator. Neither the number of
/// arguments nor their types are checked against the operator; that is the
/// job of whatever layer builds expressions.
///
/// ```rust
/// use query_templates::{make_operation, ops, path, constant};
///
/// let cond = make_operation(ops::EQ, [path::<i64>(["t", "id"]).into(), constant(1i64).into()]);
/// let op = cond.as_operation().unwrap();
/// assert_eq!(op.operator(), ops::EQ);
/// assert_eq!(op.args().len(), 2);
/// ```
pub fn make_operation<T: ExprType>(
    operator: Operator<T>,
    args: impl IntoIterator<Item = Expr>,
) -> TypedExpr<T> {
    let operation = Operation {
        operator: operator.erase(),
        args: args.into_iter().collect(),
    };
    TypedExpr::wrap(Expr::new(ExprKind::Operation(operation), T::KIND))
}

/// Build a [`TemplateExpr`] node rendering `template` over `args`.
pub fn template_expr<T: ExprType>(
    template: Arc<Template>,
    args: impl IntoIterator<Item = Expr>,
) -> TypedExpr<T> {
    let node = TemplateExpr {
        template,
        args: args.into_iter().collect(),
    };
    TypedExpr::wrap(Expr::new(ExprKind::Template(node), T::KIND))
}

/// An operator applied to an ordered, fixed list of argument expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    operator: AnyOperator,
    args: Arc<[Expr]>,
}

impl Operation {
    pub fn operator(&self) -> AnyOperator {
        self.operator
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    /// Argument `i`, or an [`IndexOutOfRange`](crate::RenderErrorKind::IndexOutOfRange)
    /// error naming the operator.
    pub fn arg(&self, i: usize) -> Result<&Expr, RenderError> {
        self.args.get(i).ok_or_else(|| {
            let err = RenderError::index_out_of_range(i, self.args.len());
            let message = format!("{} of operator {}", err.message, self.operator);
            RenderError { message, ..err }
        })
    }
}

/// A custom [`Template`] applied to ordered arguments, for one-off
/// fragments that have no operator of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExpr {
    template: Arc<Template>,
    args: Arc<[Expr]>,
}

impl TemplateExpr {
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub fn arg(&self, i: usize) -> Result<&Expr, RenderError> {
        self.args
            .get(i)
            .ok_or_else(|| RenderError::index_out_of_range(i, self.args.len()))
    }
}

/// A dotted reference such as `companies.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            segments: vec![root.into()],
        }
    }

    fn from_segments(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// A new path one level below this one.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment.
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl<T: ExprType> From<Path> for TypedExpr<T> {
    fn from(path: Path) -> Self {
        TypedExpr::wrap(Expr::new(ExprKind::Path(path), T::KIND))
    }
}

// ── Visitor ─────────────────────────────────────────────────────────────

/// Double-dispatch interface for renderers.
///
/// Each expression variant calls exactly one of these methods with itself
/// when it [accepts](Visitable::accept) a visitor. A new rendering target
/// is a new `Visitor` implementation; the expression types do not change.
pub trait Visitor {
    type Output;

    fn visit_constant(&mut self, value: &Value) -> Self::Output;

    fn visit_path(&mut self, path: &Path) -> Self::Output;

    fn visit_operation(&mut self, operation: &Operation) -> Self::Output;

    fn visit_template(&mut self, template: &TemplateExpr) -> Self::Output;
}

/// Implemented by every node type that can be handed to a [`Visitor`].
pub trait Visitable {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output;
}

impl Visitable for Expr {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match &self.kind {
            ExprKind::Constant(value) => value.accept(visitor),
            ExprKind::Path(path) => path.accept(visitor),
            ExprKind::Operation(operation) => operation.accept(visitor),
            ExprKind::Template(template) => template.accept(visitor),
        }
    }
}

impl Visitable for Value {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_constant(self)
    }
}

impl Visitable for Path {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_path(self)
    }
}

impl Visitable for Operation {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_operation(self)
    }
}

impl Visitable for TemplateExpr {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_template(self)
    }
}
