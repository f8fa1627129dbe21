//! Uniform concrete/symbolic value representation.
//!
//! A [`Value`] is one memory cell's worth (or a register's worth) of content:
//! either a concrete integer of known width or a handle to a symbolic
//! [`Expr`](crate::Expr) tree. The two arms are handled uniformly by every
//! operation in this module: operations stay concrete while all inputs are
//! concrete and lift to expression nodes the moment any input is symbolic.
//! Callers pattern-match the sum type instead of asking a runtime "is this
//! symbolic" predicate, which keeps the string models exhaustive by
//! construction.

use std::fmt;

use crate::{
    expr::{BitWidth, CondRc, Expr, ExprRc},
    Error, Result,
};

/// A concrete integer or a symbolic bit-vector term.
///
/// The symbolic arm's width lives in the referenced expression, so a value and
/// its formula can never disagree on width. Construct with [`Value::concrete`],
/// [`Value::byte`], or [`Value::symbolic`]; the latter normalizes constant
/// trees back to the concrete arm so a constant has exactly one representation.
///
/// # Examples
///
/// ```rust
/// use binsym::{BitWidth, Expr, Value};
///
/// let concrete = Value::concrete(BitWidth::BYTE, 0x41);
/// assert_eq!(concrete.as_concrete(), Some(0x41));
///
/// let symbolic = Value::symbolic(Expr::variable("input", BitWidth::BYTE));
/// assert!(symbolic.is_symbolic());
/// assert_eq!(symbolic.width(), BitWidth::BYTE);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A concrete integer, stored masked to its width.
    Concrete(BitWidth, u64),
    /// A symbolic term; never a bare constant node.
    Symbolic(ExprRc),
}

impl Value {
    /// Builds a concrete value, masking `bits` to `width`.
    #[must_use]
    pub fn concrete(width: BitWidth, bits: u64) -> Value {
        Value::Concrete(width, bits & width.mask())
    }

    /// Builds a concrete single byte.
    #[must_use]
    pub fn byte(bits: u8) -> Value {
        Value::Concrete(BitWidth::BYTE, u64::from(bits))
    }

    /// Wraps a symbolic term, normalizing constants to the concrete arm.
    #[must_use]
    pub fn symbolic(expr: ExprRc) -> Value {
        match expr.as_const() {
            Some(bits) => Value::Concrete(expr.width(), bits),
            None => Value::Symbolic(expr),
        }
    }

    /// Returns the width of this value.
    #[must_use]
    pub fn width(&self) -> BitWidth {
        match self {
            Value::Concrete(width, _) => *width,
            Value::Symbolic(expr) => expr.width(),
        }
    }

    /// Returns `true` for the concrete arm.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        matches!(self, Value::Concrete(..))
    }

    /// Returns `true` for the symbolic arm.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Value::Symbolic(..))
    }

    /// Returns the payload if this value is concrete.
    #[must_use]
    pub fn as_concrete(&self) -> Option<u64> {
        match self {
            Value::Concrete(_, bits) => Some(*bits),
            Value::Symbolic(_) => None,
        }
    }

    /// Lifts this value into the expression algebra.
    ///
    /// Concrete values become constant nodes; symbolic values hand out another
    /// reference to their existing tree.
    #[must_use]
    pub fn to_expr(&self) -> ExprRc {
        match self {
            Value::Concrete(width, bits) => Expr::constant(*width, *bits),
            Value::Symbolic(expr) => expr.clone(),
        }
    }

    /// Zero-extends this value to `target` width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if `target` is narrower than this
    /// value.
    pub fn zero_extend(&self, target: BitWidth) -> Result<Value> {
        match self {
            Value::Concrete(width, bits) => {
                if target < *width {
                    return Err(Error::WidthMismatch {
                        operation: "zero extend",
                        expected: width.bits(),
                        found: target.bits(),
                    });
                }
                Ok(Value::Concrete(target, *bits))
            }
            Value::Symbolic(expr) => {
                Expr::zero_extend(target, expr.clone()).map(Value::symbolic)
            }
        }
    }

    /// Computes the wrapping difference `lhs - rhs`.
    ///
    /// Stays concrete when both operands are concrete; otherwise builds a
    /// subtraction node over the lifted operands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the operand widths differ.
    pub fn sub(lhs: &Value, rhs: &Value) -> Result<Value> {
        let width = lhs.width();
        if rhs.width() != width {
            return Err(Error::WidthMismatch {
                operation: "subtract",
                expected: width.bits(),
                found: rhs.width().bits(),
            });
        }
        match (lhs.as_concrete(), rhs.as_concrete()) {
            (Some(a), Some(b)) => Ok(Value::concrete(width, a.wrapping_sub(b))),
            _ => Expr::sub(lhs.to_expr(), rhs.to_expr()).map(Value::symbolic),
        }
    }

    /// Selects between `then` and `otherwise` under `cond`.
    ///
    /// A decided condition returns the surviving arm without building a node,
    /// which is how dead branches fall out of model results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the arm widths differ; the check
    /// runs before the condition is inspected, so a decided condition cannot
    /// smuggle mismatched arms past it.
    pub fn ite(cond: &CondRc, then: &Value, otherwise: &Value) -> Result<Value> {
        let width = then.width();
        if otherwise.width() != width {
            return Err(Error::WidthMismatch {
                operation: "if-then-else",
                expected: width.bits(),
                found: otherwise.width().bits(),
            });
        }
        match cond.as_const() {
            Some(true) => Ok(then.clone()),
            Some(false) => Ok(otherwise.clone()),
            None => Expr::ite(cond.clone(), then.to_expr(), otherwise.to_expr())
                .map(Value::symbolic),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Concrete(width, bits) => write!(f, "{bits:#x}:{width}"),
            Value::Symbolic(expr) => write!(f, "{expr}"),
        }
    }
}
