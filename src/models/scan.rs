//! Forward terminator scanners over string memory.
//!
//! Both scanners walk bytes upward from a pointer, classifying each against
//! the path's constraints. [`scan_first_zero`] finds the definite terminator;
//! [`scan_possible_zeros`] additionally records every earlier offset that
//! *could* terminate the string, which is the raw material for the
//! "which candidate is the real terminator" trees `strcpy` builds.
//!
//! # Termination
//!
//! Neither scanner imposes a length bound: memory that never yields a
//! definitely-null byte under the constraints makes the scan diverge, exactly
//! as the real `strlen` diverges on a missing terminator. An artificial bound
//! would silently mis-model legitimately long strings, so callers needing one
//! must impose it externally. In practice a runaway scan leaves the mapped
//! region and surfaces [`Error::UnmappedAddress`](crate::Error::UnmappedAddress).

use crate::{
    expr::{BitWidth, Cond},
    models::classify::is_definitely_null,
    solver::SolverOracle,
    state::ExecutionState,
    Result,
};

/// Returns the offset of the first byte that is definitely null.
///
/// Consumes at most one oracle query per scanned symbolic byte.
///
/// # Errors
///
/// Returns a memory error if the scan walks outside readable mapped memory
/// before finding a terminator.
pub fn scan_first_zero<O>(state: &ExecutionState, oracle: &O, pointer: u64) -> Result<u64>
where
    O: SolverOracle + ?Sized,
{
    let mut offset = 0u64;
    loop {
        let byte = state
            .memory()
            .read(pointer.wrapping_add(offset), BitWidth::BYTE)?;
        if is_definitely_null(&byte, state.constraints(), oracle) {
            return Ok(offset);
        }
        offset += 1;
    }
}

/// Returns every offset that can hold the terminator, in increasing order.
///
/// A symbolic byte is a candidate when zero is feasible for it; the scan
/// stops at the first byte that is definitely null (concrete zero, or
/// symbolic with every non-zero value ruled out) and appends that offset as
/// the final element. The result is therefore non-empty on return, strictly
/// increasing, and its last element equals [`scan_first_zero`] for the same
/// inputs.
///
/// # Errors
///
/// Returns a memory error if the scan walks outside readable mapped memory
/// before finding a definite terminator.
pub fn scan_possible_zeros<O>(
    state: &ExecutionState,
    oracle: &O,
    pointer: u64,
) -> Result<Vec<u64>>
where
    O: SolverOracle + ?Sized,
{
    let mut candidates = Vec::new();
    let mut offset = 0u64;
    loop {
        let byte = state
            .memory()
            .read(pointer.wrapping_add(offset), BitWidth::BYTE)?;
        match byte.as_concrete() {
            Some(0) => {
                candidates.push(offset);
                return Ok(candidates);
            }
            Some(_) => {}
            None => {
                if is_definitely_null(&byte, state.constraints(), oracle) {
                    candidates.push(offset);
                    return Ok(candidates);
                }
                if oracle.can_be_true(state.constraints(), &Cond::eq_zero(byte.to_expr())) {
                    candidates.push(offset);
                }
            }
        }
        offset += 1;
    }
}
