//! Built-in operators and the builder methods that use them.
//!
//! These operators only provide identities. Which pattern an operator
//! renders with is decided by a [`TemplateSource`](crate::TemplateSource),
//! typically a dialect table outside this crate.
//!
//! ```rust
//! use query_templates::{ops, path};
//!
//! let id = path::<i64>(["companies", "id"]);
//! let name = path::<String>(["companies", "name"]);
//! let cond = id.eq(1).and(name.lower().like("acme%"));
//!
//! let and = cond.as_operation().unwrap();
//! assert_eq!(and.operator(), ops::AND);
//! assert_eq!(and.args().len(), 2);
//! ```

use crate::ast::expr::{Expr, Operator, TypedExpr, constant, make_operation};
use crate::ast::value::{Any, ExprType};

// Comparison
pub const EQ: Operator<bool> = Operator::builtin(1, "EQ");
pub const NE: Operator<bool> = Operator::builtin(2, "NE");
pub const LT: Operator<bool> = Operator::builtin(3, "LT");
pub const LOE: Operator<bool> = Operator::builtin(4, "LOE");
pub const GT: Operator<bool> = Operator::builtin(5, "GT");
pub const GOE: Operator<bool> = Operator::builtin(6, "GOE");
pub const IS_NULL: Operator<bool> = Operator::builtin(7, "IS_NULL");
pub const IS_NOT_NULL: Operator<bool> = Operator::builtin(8, "IS_NOT_NULL");
pub const LIKE: Operator<bool> = Operator::builtin(9, "LIKE");

// Logical
pub const AND: Operator<bool> = Operator::builtin(10, "AND");
pub const OR: Operator<bool> = Operator::builtin(11, "OR");
pub const NOT: Operator<bool> = Operator::builtin(12, "NOT");

// Arithmetic
pub const ADD: Operator<Any> = Operator::builtin(13, "ADD");
pub const SUB: Operator<Any> = Operator::builtin(14, "SUB");
pub const MUL: Operator<Any> = Operator::builtin(15, "MUL");
pub const DIV: Operator<Any> = Operator::builtin(16, "DIV");

// String
pub const CONCAT: Operator<String> = Operator::builtin(17, "CONCAT");
pub const LOWER: Operator<String> = Operator::builtin(18, "LOWER");
pub const UPPER: Operator<String> = Operator::builtin(19, "UPPER");

/// Anything usable as an operand of type `T` in the builder methods:
/// another `TypedExpr<T>` or a plain Rust value of the matching type.
pub trait IntoExpr<T> {
    fn into_expr(self) -> Expr;
}

impl<T: ExprType> IntoExpr<T> for TypedExpr<T> {
    fn into_expr(self) -> Expr {
        self.into()
    }
}

impl<T: ExprType> IntoExpr<T> for &TypedExpr<T> {
    fn into_expr(self) -> Expr {
        self.into()
    }
}

impl IntoExpr<bool> for bool {
    fn into_expr(self) -> Expr {
        constant(self).into()
    }
}

impl IntoExpr<i64> for i64 {
    fn into_expr(self) -> Expr {
        constant(self).into()
    }
}

impl IntoExpr<i64> for i32 {
    fn into_expr(self) -> Expr {
        constant(i64::from(self)).into()
    }
}

impl IntoExpr<f64> for f64 {
    fn into_expr(self) -> Expr {
        constant(self).into()
    }
}

impl IntoExpr<String> for String {
    fn into_expr(self) -> Expr {
        constant(self).into()
    }
}

impl IntoExpr<String> for &str {
    fn into_expr(self) -> Expr {
        constant(self.to_string()).into()
    }
}

impl<T: ExprType> TypedExpr<T> {
    fn binary<R: ExprType>(&self, operator: Operator<R>, rhs: impl IntoExpr<T>) -> TypedExpr<R> {
        make_operation(operator, [Expr::from(self), rhs.into_expr()])
    }

    fn unary<R: ExprType>(&self, operator: Operator<R>) -> TypedExpr<R> {
        make_operation(operator, [Expr::from(self)])
    }

    pub fn eq(&self, rhs: impl IntoExpr<T>) -> TypedExpr<bool> {
        self.binary(EQ, rhs)
    }

    pub fn ne(&self, rhs: impl IntoExpr<T>) -> TypedExpr<bool> {
        self.binary(NE, rhs)
    }

    pub fn lt(&self, rhs: impl IntoExpr<T>) -> TypedExpr<bool> {
        self.binary(LT, rhs)
    }

    pub fn loe(&self, rhs: impl IntoExpr<T>) -> TypedExpr<bool> {
        self.binary(LOE, rhs)
    }

    pub fn gt(&self, rhs: impl IntoExpr<T>) -> TypedExpr<bool> {
        self.binary(GT, rhs)
    }

    pub fn goe(&self, rhs: impl IntoExpr<T>) -> TypedExpr<bool> {
        self.binary(GOE, rhs)
    }

    pub fn is_null(&self) -> TypedExpr<bool> {
        self.unary(IS_NULL)
    }

    pub fn is_not_null(&self) -> TypedExpr<bool> {
        self.unary(IS_NOT_NULL)
    }
}

impl TypedExpr<bool> {
    pub fn and(&self, rhs: impl IntoExpr<bool>) -> TypedExpr<bool> {
        self.binary(AND, rhs)
    }

    pub fn or(&self, rhs: impl IntoExpr<bool>) -> TypedExpr<bool> {
        self.binary(OR, rhs)
    }

    pub fn not(&self) -> TypedExpr<bool> {
        self.unary(NOT)
    }
}

impl TypedExpr<String> {
    pub fn lower(&self) -> TypedExpr<String> {
        self.unary(LOWER)
    }

    pub fn upper(&self) -> TypedExpr<String> {
        self.unary(UPPER)
    }

    pub fn concat(&self, rhs: impl IntoExpr<String>) -> TypedExpr<String> {
        self.binary(CONCAT, rhs)
    }

    pub fn like(&self, pattern: impl IntoExpr<String>) -> TypedExpr<bool> {
        self.binary(LIKE, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::path;
    use crate::ast::value::{TypeKind, Value};

    #[test]
    fn test_builtin_identities_are_distinct() {
        let all = [EQ, NE, LT, LOE, GT, GOE, IS_NULL, IS_NOT_NULL, LIKE, AND, OR, NOT];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_ne!(ADD.erase(), CONCAT.erase());
        assert_ne!(Operator::<bool>::new("EQ"), EQ);
    }

    #[test]
    fn test_eq_builds_operation_with_constant() {
        let id = path::<i64>(["t", "id"]);
        let cond = id.eq(5);
        assert_eq!(cond.type_kind(), TypeKind::Boolean);

        let op = cond.as_operation().unwrap();
        assert_eq!(op.operator(), EQ);
        assert_eq!(op.arg(0).unwrap(), &*id);
        assert_eq!(op.arg(1).unwrap().as_constant(), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_nested_builders() {
        let name = path::<String>(["t", "name"]);
        let cond = name.upper().eq("ACME").or(name.is_null()).not();

        let not = cond.as_operation().unwrap();
        assert_eq!(not.operator(), NOT);
        let or = not.arg(0).unwrap().as_operation().unwrap();
        assert_eq!(or.operator(), OR);
        let eq = or.arg(0).unwrap().as_operation().unwrap();
        let upper = eq.arg(0).unwrap().as_operation().unwrap();
        assert_eq!(upper.operator(), UPPER);
        assert_eq!(upper.arg(0).unwrap().type_kind(), TypeKind::String);
    }
}
