//! Bit-vector expression algebra for symbolic byte reasoning.
//!
//! Models produce formulas over memory bytes, and this module provides the node
//! vocabulary those formulas are assembled from. Bit-vector terms ([`Expr`]) and
//! boolean terms ([`Cond`]) are distinct types, so a condition can never be used
//! where a value is expected or vice versa. Nodes are immutable and shared through
//! [`Arc`] handles ([`ExprRc`], [`CondRc`]); folding one byte into several formulas
//! shares the sub-tree instead of copying it.
//!
//! # Width Discipline
//!
//! Every term carries a [`BitWidth`], a validated multiple of 8 between 8 and 64
//! bits. Combining operations require operand widths to match exactly and reject
//! mismatches at construction time; widths only ever grow, and only through an
//! explicit [`Expr::zero_extend`]. A malformed tree is therefore unrepresentable
//! downstream of the constructors.
//!
//! # Constant Folding
//!
//! Constructors fold eagerly: operations over constant operands produce a constant
//! node, and an if-then-else whose condition is already decided collapses to the
//! surviving arm. Models rely on this to keep result formulas minimal when most of
//! the scanned memory turns out to be concrete.
//!
//! # Examples
//!
//! ```rust
//! use binsym::{BitWidth, Cond, Expr};
//!
//! let byte = Expr::variable("b0", BitWidth::BYTE);
//! let zero = Expr::constant(BitWidth::BYTE, 0);
//! let is_terminator = Cond::eq(byte.clone(), zero.clone())?;
//!
//! // ite(b0 == 0, 0, 1) at byte width
//! let picked = Expr::ite(
//!     is_terminator,
//!     zero,
//!     Expr::constant(BitWidth::BYTE, 1),
//! )?;
//! assert_eq!(picked.width(), BitWidth::BYTE);
//! # Ok::<(), binsym::Error>(())
//! ```

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{Error, Result};

/// A validated bit width: a positive multiple of 8, at most 64 bits.
///
/// Widths name whole runs of memory cells, so only byte multiples are
/// representable. The upper bound of 64 keeps concrete payloads in a `u64`
/// and matches the widest pointer width the models operate at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitWidth(u32);

impl BitWidth {
    /// Width of a single memory cell (8 bits).
    pub const BYTE: BitWidth = BitWidth(8);
    /// 16-bit width.
    pub const W16: BitWidth = BitWidth(16);
    /// 32-bit width, the pointer width of 32-bit targets.
    pub const W32: BitWidth = BitWidth(32);
    /// 64-bit width, the pointer width of 64-bit targets.
    pub const W64: BitWidth = BitWidth(64);

    /// Validates and constructs a width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWidth`] if `bits` is zero, not a multiple of 8,
    /// or larger than 64.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits % 8 != 0 || bits > 64 {
            return Err(Error::InvalidWidth { bits });
        }
        Ok(BitWidth(bits))
    }

    /// Returns the width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the width in whole bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        (self.0 / 8) as usize
    }

    /// Returns the value mask for this width (all representable bits set).
    #[must_use]
    pub const fn mask(self) -> u64 {
        if self.0 == 64 {
            u64::MAX
        } else {
            (1u64 << self.0) - 1
        }
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference-counted handle to a bit-vector term.
pub type ExprRc = Arc<Expr>;

/// Reference-counted handle to a boolean term.
pub type CondRc = Arc<Cond>;

/// A bit-vector term.
///
/// Construct through the associated functions ([`Expr::constant`],
/// [`Expr::variable`], [`Expr::zero_extend`], [`Expr::sub`], [`Expr::ite`]),
/// which enforce the width discipline and fold constants. The variants are
/// public so embedding engines can lower finished trees into their own solver
/// representation by matching.
#[derive(Debug, PartialEq, Eq)]
pub enum Expr {
    /// A constant, stored masked to its width.
    Const {
        /// Width of the constant
        width: BitWidth,
        /// Payload, always `<= width.mask()`
        bits: u64,
    },
    /// A free variable, identified by an interned name.
    Var {
        /// Width of the variable
        width: BitWidth,
        /// Identity of the variable; equal names denote the same variable
        name: Arc<str>,
    },
    /// Zero-extension of a narrower term to `width`.
    ZeroExt {
        /// Target width, strictly wider than the inner term
        width: BitWidth,
        /// The extended term
        inner: ExprRc,
    },
    /// Wrapping subtraction of two equal-width terms.
    Sub {
        /// Minuend
        lhs: ExprRc,
        /// Subtrahend
        rhs: ExprRc,
    },
    /// Conditional choice between two equal-width terms.
    Ite {
        /// The deciding condition
        cond: CondRc,
        /// Value when the condition holds
        then: ExprRc,
        /// Value when the condition does not hold
        otherwise: ExprRc,
    },
}

impl Expr {
    /// Builds a constant term, masking `bits` to `width`.
    #[must_use]
    pub fn constant(width: BitWidth, bits: u64) -> ExprRc {
        Arc::new(Expr::Const {
            width,
            bits: bits & width.mask(),
        })
    }

    /// Builds a free variable term.
    ///
    /// Variable identity is the name: two terms with the same name denote the
    /// same variable and must carry the same width for downstream evaluation
    /// to be meaningful.
    #[must_use]
    pub fn variable(name: impl Into<Arc<str>>, width: BitWidth) -> ExprRc {
        Arc::new(Expr::Var {
            width,
            name: name.into(),
        })
    }

    /// Zero-extends `inner` to `target` width.
    ///
    /// Extension to the same width is the identity and returns `inner`
    /// unchanged; constants extend by re-masking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if `target` is narrower than the inner
    /// term (widths never shrink).
    pub fn zero_extend(target: BitWidth, inner: ExprRc) -> Result<ExprRc> {
        let width = inner.width();
        if target < width {
            return Err(Error::WidthMismatch {
                operation: "zero extend",
                expected: width.bits(),
                found: target.bits(),
            });
        }
        if target == width {
            return Ok(inner);
        }
        if let Expr::Const { bits, .. } = *inner {
            return Ok(Expr::constant(target, bits));
        }
        Ok(Arc::new(Expr::ZeroExt {
            width: target,
            inner,
        }))
    }

    /// Builds the wrapping difference `lhs - rhs`.
    ///
    /// Constant operands fold to a constant node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the operand widths differ.
    pub fn sub(lhs: ExprRc, rhs: ExprRc) -> Result<ExprRc> {
        let width = lhs.width();
        if rhs.width() != width {
            return Err(Error::WidthMismatch {
                operation: "subtract",
                expected: width.bits(),
                found: rhs.width().bits(),
            });
        }
        if let (Some(a), Some(b)) = (lhs.as_const(), rhs.as_const()) {
            return Ok(Expr::constant(width, a.wrapping_sub(b)));
        }
        Ok(Arc::new(Expr::Sub { lhs, rhs }))
    }

    /// Builds the conditional term selecting `then` when `cond` holds and
    /// `otherwise` when it does not.
    ///
    /// A condition that is already decided collapses to the surviving arm, so
    /// dead branches never enter the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the arm widths differ.
    pub fn ite(cond: CondRc, then: ExprRc, otherwise: ExprRc) -> Result<ExprRc> {
        let width = then.width();
        if otherwise.width() != width {
            return Err(Error::WidthMismatch {
                operation: "if-then-else",
                expected: width.bits(),
                found: otherwise.width().bits(),
            });
        }
        match cond.as_const() {
            Some(true) => Ok(then),
            Some(false) => Ok(otherwise),
            None => Ok(Arc::new(Expr::Ite {
                cond,
                then,
                otherwise,
            })),
        }
    }

    /// Returns the width of this term.
    #[must_use]
    pub fn width(&self) -> BitWidth {
        match self {
            Expr::Const { width, .. } | Expr::Var { width, .. } | Expr::ZeroExt { width, .. } => {
                *width
            }
            Expr::Sub { lhs, .. } => lhs.width(),
            Expr::Ite { then, .. } => then.width(),
        }
    }

    /// Returns the payload if this term is a constant.
    #[must_use]
    pub fn as_const(&self) -> Option<u64> {
        match self {
            Expr::Const { bits, .. } => Some(*bits),
            _ => None,
        }
    }

    /// Evaluates the term under concrete variable bindings.
    ///
    /// Returns `None` if a variable on the evaluated path is unbound. The
    /// untaken arm of an if-then-else is not evaluated, so unbound variables
    /// there do not matter.
    #[must_use]
    pub fn evaluate(&self, bindings: &BTreeMap<Arc<str>, u64>) -> Option<u64> {
        match self {
            Expr::Const { bits, .. } => Some(*bits),
            Expr::Var { width, name } => bindings.get(name).map(|v| v & width.mask()),
            Expr::ZeroExt { inner, .. } => inner.evaluate(bindings),
            Expr::Sub { lhs, rhs } => {
                let a = lhs.evaluate(bindings)?;
                let b = rhs.evaluate(bindings)?;
                Some(a.wrapping_sub(b) & lhs.width().mask())
            }
            Expr::Ite {
                cond,
                then,
                otherwise,
            } => {
                if cond.evaluate(bindings)? {
                    then.evaluate(bindings)
                } else {
                    otherwise.evaluate(bindings)
                }
            }
        }
    }

    /// Collects every variable of the term into `out`, keyed by name.
    ///
    /// `BTreeMap` keeps the collection order deterministic, which enumeration
    /// oracles depend on.
    pub fn collect_variables(&self, out: &mut BTreeMap<Arc<str>, BitWidth>) {
        match self {
            Expr::Const { .. } => {}
            Expr::Var { width, name } => {
                out.insert(name.clone(), *width);
            }
            Expr::ZeroExt { inner, .. } => inner.collect_variables(out),
            Expr::Sub { lhs, rhs } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Expr::Ite {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_variables(out);
                then.collect_variables(out);
                otherwise.collect_variables(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { width, bits } => write!(f, "{bits:#x}:{width}"),
            Expr::Var { width, name } => write!(f, "{name}:{width}"),
            Expr::ZeroExt { width, inner } => write!(f, "zext{width}({inner})"),
            Expr::Sub { lhs, rhs } => write!(f, "({lhs} - {rhs})"),
            Expr::Ite {
                cond,
                then,
                otherwise,
            } => write!(f, "ite({cond}, {then}, {otherwise})"),
        }
    }
}

/// A boolean term over bit-vector operands.
///
/// Kept distinct from [`Expr`] so conditions and values cannot be confused.
/// The vocabulary is deliberately small: the models only ever compare terms
/// for equality against each other or against zero.
#[derive(Debug, PartialEq, Eq)]
pub enum Cond {
    /// Equality of two equal-width terms.
    Eq {
        /// Left operand
        lhs: ExprRc,
        /// Right operand
        rhs: ExprRc,
    },
    /// Inequality of two equal-width terms.
    Ne {
        /// Left operand
        lhs: ExprRc,
        /// Right operand
        rhs: ExprRc,
    },
}

impl Cond {
    /// Builds the condition `lhs == rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the operand widths differ.
    pub fn eq(lhs: ExprRc, rhs: ExprRc) -> Result<CondRc> {
        Self::check_widths("equality", &lhs, &rhs)?;
        Ok(Arc::new(Cond::Eq { lhs, rhs }))
    }

    /// Builds the condition `lhs != rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the operand widths differ.
    pub fn ne(lhs: ExprRc, rhs: ExprRc) -> Result<CondRc> {
        Self::check_widths("inequality", &lhs, &rhs)?;
        Ok(Arc::new(Cond::Ne { lhs, rhs }))
    }

    /// Builds the condition `expr == 0`, with zero at the operand's width.
    ///
    /// Infallible: the zero constant is minted at the right width.
    #[must_use]
    pub fn eq_zero(expr: ExprRc) -> CondRc {
        let zero = Expr::constant(expr.width(), 0);
        Arc::new(Cond::Eq {
            lhs: expr,
            rhs: zero,
        })
    }

    /// Builds the condition `expr != 0`, with zero at the operand's width.
    ///
    /// Infallible: the zero constant is minted at the right width.
    #[must_use]
    pub fn ne_zero(expr: ExprRc) -> CondRc {
        let zero = Expr::constant(expr.width(), 0);
        Arc::new(Cond::Ne {
            lhs: expr,
            rhs: zero,
        })
    }

    fn check_widths(operation: &'static str, lhs: &ExprRc, rhs: &ExprRc) -> Result<()> {
        if lhs.width() != rhs.width() {
            return Err(Error::WidthMismatch {
                operation,
                expected: lhs.width().bits(),
                found: rhs.width().bits(),
            });
        }
        Ok(())
    }

    /// Returns the truth value if both operands are constants.
    #[must_use]
    pub fn as_const(&self) -> Option<bool> {
        match self {
            Cond::Eq { lhs, rhs } => Some(lhs.as_const()? == rhs.as_const()?),
            Cond::Ne { lhs, rhs } => Some(lhs.as_const()? != rhs.as_const()?),
        }
    }

    /// Evaluates the condition under concrete variable bindings.
    ///
    /// Returns `None` if a referenced variable is unbound.
    #[must_use]
    pub fn evaluate(&self, bindings: &BTreeMap<Arc<str>, u64>) -> Option<bool> {
        match self {
            Cond::Eq { lhs, rhs } => Some(lhs.evaluate(bindings)? == rhs.evaluate(bindings)?),
            Cond::Ne { lhs, rhs } => Some(lhs.evaluate(bindings)? != rhs.evaluate(bindings)?),
        }
    }

    /// Collects every variable of the condition into `out`, keyed by name.
    pub fn collect_variables(&self, out: &mut BTreeMap<Arc<str>, BitWidth>) {
        match self {
            Cond::Eq { lhs, rhs } | Cond::Ne { lhs, rhs } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Eq { lhs, rhs } => write!(f, "({lhs} == {rhs})"),
            Cond::Ne { lhs, rhs } => write!(f, "({lhs} != {rhs})"),
        }
    }
}
