//! Per-path execution state: one address space plus one constraint set.
//!
//! The embedding engine owns one [`ExecutionState`] per exploration path and
//! passes it by reference into every model call. Models read and (for copying
//! models) write the state's memory; they never touch the constraint set
//! except through feasibility queries, which go to the solver oracle. Forking
//! a path for concretization is [`ExecutionState::fork`], a deep clone that
//! the engine then specializes per feasible value.

use std::{fmt, slice};

use crate::{
    expr::{BitWidth, CondRc},
    memory::AddressSpace,
};

/// An append-only, ordered collection of path conditions.
///
/// Conditions accumulate as the engine takes branches; the model layer only
/// ever reads them (through the solver oracle), so the sole mutator is
/// [`ConstraintSet::add`]. Order is preserved because engines typically
/// replay conditions into their solver in discovery order.
///
/// # Example
///
/// ```rust
/// use binsym::{BitWidth, Cond, ConstraintSet, Expr};
///
/// let mut constraints = ConstraintSet::new();
/// let b = Expr::variable("b", BitWidth::BYTE);
/// constraints.add(Cond::ne(b, Expr::constant(BitWidth::BYTE, 0))?);
/// assert_eq!(constraints.len(), 1);
/// # Ok::<(), binsym::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    conditions: Vec<CondRc>,
}

impl ConstraintSet {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a condition to the path.
    pub fn add(&mut self, condition: CondRc) {
        self.conditions.push(condition);
    }

    /// Iterates the conditions in discovery order.
    pub fn iter(&self) -> slice::Iter<'_, CondRc> {
        self.conditions.iter()
    }

    /// Returns the number of accumulated conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if no condition has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a CondRc;
    type IntoIter = slice::Iter<'a, CondRc>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// The mutable context of one exploration path.
///
/// Owns the path's [`AddressSpace`] and [`ConstraintSet`]. Models receive a
/// state reference per call; the only externally observable side effect a
/// model may produce is memory mutation through
/// [`memory_mut`](Self::memory_mut). A single state must not be shared
/// between concurrent model invocations, but distinct states are fully
/// independent and may run on different threads.
#[derive(Clone, Debug)]
pub struct ExecutionState {
    memory: AddressSpace,
    constraints: ConstraintSet,
}

impl ExecutionState {
    /// Creates a state over the given address space with no constraints.
    #[must_use]
    pub fn new(memory: AddressSpace) -> Self {
        ExecutionState {
            memory,
            constraints: ConstraintSet::new(),
        }
    }

    /// Returns the pointer width of the modeled target.
    #[must_use]
    pub fn address_width(&self) -> BitWidth {
        self.memory.address_width()
    }

    /// Returns the path's memory.
    #[must_use]
    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    /// Returns the path's memory for mutation.
    pub fn memory_mut(&mut self) -> &mut AddressSpace {
        &mut self.memory
    }

    /// Returns the path's accumulated conditions.
    #[must_use]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Returns the path's conditions for mutation.
    ///
    /// Meant for the embedding engine (and tests); models never add
    /// conditions.
    pub fn constraints_mut(&mut self) -> &mut ConstraintSet {
        &mut self.constraints
    }

    /// Forks this path.
    ///
    /// Produces an independent deep copy; the engine's concretization loop
    /// forks once per feasible value of a symbolic argument, pins the value
    /// in the fork, and re-invokes the model there.
    #[must_use]
    pub fn fork(&self) -> ExecutionState {
        self.clone()
    }
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::new(AddressSpace::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::{BitWidth, Cond, Expr},
        memory::MemoryProtection,
        value::Value,
    };

    #[test]
    fn test_constraint_set_preserves_order() {
        let mut constraints = ConstraintSet::new();
        assert!(constraints.is_empty());

        let b = Expr::variable("b", BitWidth::BYTE);
        let first = Cond::ne(b.clone(), Expr::constant(BitWidth::BYTE, 0)).unwrap();
        let second = Cond::eq(b, Expr::constant(BitWidth::BYTE, 7)).unwrap();
        constraints.add(first.clone());
        constraints.add(second.clone());

        let collected: Vec<_> = constraints.iter().cloned().collect();
        assert_eq!(collected, vec![first, second]);
        assert_eq!(constraints.len(), 2);
    }

    #[test]
    fn test_constraint_set_display() {
        let mut constraints = ConstraintSet::new();
        let b = Expr::variable("b", BitWidth::BYTE);
        constraints.add(Cond::ne(b.clone(), Expr::constant(BitWidth::BYTE, 0)).unwrap());
        constraints.add(Cond::eq(b, Expr::constant(BitWidth::BYTE, 7)).unwrap());
        assert_eq!(
            constraints.to_string(),
            "(b:8 != 0x0:8) && (b:8 == 0x7:8)"
        );
    }

    #[test]
    fn test_fork_is_independent() {
        let mut space = AddressSpace::new(BitWidth::W64);
        let base = space.map(4, MemoryProtection::RW).unwrap();
        let mut state = ExecutionState::new(space);
        state.memory_mut().write_bytes(base, &[1, 2, 3]).unwrap();

        let mut forked = state.fork();
        forked.memory_mut().write_bytes(base, &[9]).unwrap();
        forked
            .constraints_mut()
            .add(Cond::ne(
                Expr::variable("b", BitWidth::BYTE),
                Expr::constant(BitWidth::BYTE, 0),
            )
            .unwrap());

        // The original path is untouched
        assert_eq!(
            state.memory().read(base, BitWidth::BYTE).unwrap(),
            Value::byte(1)
        );
        assert!(state.constraints().is_empty());
        assert_eq!(
            forked.memory().read(base, BitWidth::BYTE).unwrap(),
            Value::byte(9)
        );
        assert_eq!(forked.constraints().len(), 1);
    }

    #[test]
    fn test_address_width_delegates() {
        let state = ExecutionState::new(AddressSpace::new(BitWidth::W32));
        assert_eq!(state.address_width(), BitWidth::W32);
    }
}
