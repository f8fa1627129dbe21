//! Solver-oracle seam between the models and a constraint-solving backend.
//!
//! Everything the model layer wants from a solver is one primitive: *given
//! this path's conditions, can this boolean term be true*. The
//! [`SolverOracle`] trait captures exactly that, so any SMT backend can be
//! plugged in by implementing a single method, and the handle is passed
//! explicitly into every classifier, scanner, and model call instead of
//! living in process-global state.
//!
//! [`ExhaustiveOracle`] is the batteries-included backend: it enumerates
//! assignments to the free variables of a query and checks them against the
//! path conditions. Exponential, but exact, deterministic, and plenty for
//! the byte-sized domains string reasoning produces. The test suites and
//! benchmarks run on it; embedding engines with a real solver implement
//! [`SolverOracle`] over their own stack.

use std::collections::BTreeMap;

use crate::{
    expr::{BitWidth, Cond},
    state::ConstraintSet,
};

/// Feasibility oracle over one path's constraint set.
///
/// Implementations must answer definitively: there is no "unknown" in this
/// contract. A backend that can time out has to resolve the timeout itself
/// (or panic) rather than guess, because the classifiers build soundness
/// arguments directly on these answers.
pub trait SolverOracle {
    /// Returns `true` iff some assignment satisfies every condition in
    /// `constraints` and `condition` simultaneously.
    ///
    /// With an unsatisfiable constraint set every query returns `false`;
    /// the model layer assumes the embedding engine only explores feasible
    /// paths (see the classifier documentation).
    fn can_be_true(&self, constraints: &ConstraintSet, condition: &Cond) -> bool;
}

/// Exact feasibility backend that enumerates variable assignments.
///
/// Collects the free variables of the query and the path conditions, then
/// walks their joint domain in deterministic (name-sorted) order until a
/// satisfying assignment appears. The worst case is the product of the
/// variable domains, so a configurable cap aborts queries that would
/// enumerate more assignments than intended; the byte-granular queries the
/// string models issue stay far below the default.
///
/// # Example
///
/// ```rust
/// use binsym::{BitWidth, Cond, ConstraintSet, ExhaustiveOracle, Expr, SolverOracle};
///
/// let mut constraints = ConstraintSet::new();
/// let b = Expr::variable("b", BitWidth::BYTE);
/// constraints.add(Cond::eq(b.clone(), Expr::constant(BitWidth::BYTE, 5))?);
///
/// let oracle = ExhaustiveOracle::new();
/// let zero = Expr::constant(BitWidth::BYTE, 0);
/// let nonzero = Cond::ne(b.clone(), zero.clone())?;
/// assert!(oracle.can_be_true(&constraints, &nonzero));
/// let is_zero = Cond::eq(b, zero)?;
/// assert!(!oracle.can_be_true(&constraints, &is_zero));
/// # Ok::<(), binsym::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ExhaustiveOracle {
    max_assignments: u128,
}

impl ExhaustiveOracle {
    /// Default cap on enumerated assignments per query.
    pub const DEFAULT_ASSIGNMENT_LIMIT: u128 = 1 << 24;

    /// Creates an oracle with the default assignment cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(Self::DEFAULT_ASSIGNMENT_LIMIT)
    }

    /// Creates an oracle with an explicit assignment cap.
    #[must_use]
    pub fn with_limit(max_assignments: u128) -> Self {
        ExhaustiveOracle { max_assignments }
    }
}

impl Default for ExhaustiveOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverOracle for ExhaustiveOracle {
    /// # Panics
    ///
    /// Panics if the joint variable domain of the query exceeds the
    /// configured assignment cap; that is a misuse of this backend, not a
    /// recoverable condition.
    fn can_be_true(&self, constraints: &ConstraintSet, condition: &Cond) -> bool {
        let mut vars: BTreeMap<_, BitWidth> = BTreeMap::new();
        for accumulated in constraints {
            accumulated.collect_variables(&mut vars);
        }
        condition.collect_variables(&mut vars);

        let names: Vec<_> = vars.keys().cloned().collect();
        let masks: Vec<u64> = vars.values().map(|width| width.mask()).collect();

        let mut total: u128 = 1;
        for &mask in &masks {
            total = total.saturating_mul(u128::from(mask) + 1);
        }
        assert!(
            total <= self.max_assignments,
            "exhaustive oracle query spans {total} assignments (cap {})",
            self.max_assignments
        );

        let mut values = vec![0u64; names.len()];
        loop {
            let bindings: BTreeMap<_, u64> = names
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect();
            let holds = constraints
                .iter()
                .all(|accumulated| accumulated.evaluate(&bindings) == Some(true))
                && condition.evaluate(&bindings) == Some(true);
            if holds {
                return true;
            }

            // Odometer step over the joint domain
            let mut slot = 0;
            while slot < values.len() {
                if values[slot] < masks[slot] {
                    values[slot] += 1;
                    break;
                }
                values[slot] = 0;
                slot += 1;
            }
            if slot == values.len() {
                return false;
            }
        }
    }
}
