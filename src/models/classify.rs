//! Null classification of individual bytes.
//!
//! The scanners and models never ask "what is this byte", only "is this byte
//! certainly the terminator" and "is it certainly not". Both questions reduce
//! to one oracle primitive: a symbolic byte is definitely null exactly when
//! the oracle rules out every non-zero value under the path's constraints,
//! and definitely non-null exactly when it rules out zero.
//!
//! # Soundness
//!
//! For a concrete byte the two predicates are complementary. For a symbolic
//! byte both may be `false` (an ambiguous byte that can go either way), and
//! under a satisfiable constraint set they can never both be `true`: a byte
//! always has at least one feasible value, which witnesses one of the two
//! queries. The embedding engine guarantees satisfiability by only exploring
//! feasible paths; on an infeasible path every "definitely" is vacuous and
//! model results are meaningless anyway.

use crate::{expr::Cond, solver::SolverOracle, state::ConstraintSet, value::Value};

/// Returns `true` if `byte` can only be zero under `constraints`.
///
/// Concrete bytes answer without consulting the oracle; symbolic bytes cost
/// one feasibility query.
pub fn is_definitely_null<O>(byte: &Value, constraints: &ConstraintSet, oracle: &O) -> bool
where
    O: SolverOracle + ?Sized,
{
    match byte.as_concrete() {
        Some(bits) => bits == 0,
        None => !oracle.can_be_true(constraints, &Cond::ne_zero(byte.to_expr())),
    }
}

/// Returns `true` if `byte` cannot be zero under `constraints`.
///
/// Concrete bytes answer without consulting the oracle; symbolic bytes cost
/// one feasibility query.
pub fn is_definitely_nonnull<O>(byte: &Value, constraints: &ConstraintSet, oracle: &O) -> bool
where
    O: SolverOracle + ?Sized,
{
    match byte.as_concrete() {
        Some(bits) => bits != 0,
        None => !oracle.can_be_true(constraints, &Cond::eq_zero(byte.to_expr())),
    }
}
