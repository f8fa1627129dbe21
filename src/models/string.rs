//! Symbolic models for the C string primitives.
//!
//! Each model reproduces the observable effect of its libc counterpart over
//! memory that may mix concrete and symbolic bytes, returning a value at the
//! state's pointer width instead of emulating library code instruction by
//! instruction. String pointers must be concrete; a symbolic pointer makes a
//! model return [`ModelOutcome::NeedsConcretization`] before touching memory,
//! and the engine is expected to fork over the feasible pointer values and
//! call the model again.
//!
//! | Model    | Result                                              | Writes memory |
//! |----------|-----------------------------------------------------|---------------|
//! | `strcmp` | difference of the first unequal byte pair, else `0` | no            |
//! | `strlen` | offset of the first null byte                       | no            |
//! | `strcpy` | the destination pointer                             | yes           |
//!
//! The formulas these models build stay small by construction: concrete byte
//! pairs never enter an if-then-else tree, and a concrete mismatch discards
//! the symbolic comparisons folded in before it.

use crate::{
    error::Error,
    expr::{BitWidth, Cond},
    models::{
        classify::{is_definitely_null, is_definitely_nonnull},
        registry::{ModelEntry, ModelOutcome, ModelRegistry},
        scan::{scan_first_zero, scan_possible_zeros},
    },
    solver::SolverOracle,
    state::ExecutionState,
    value::Value,
    Result,
};

/// Compares the strings at `s1` and `s2`, libc `strcmp` style.
///
/// Scans both strings to their definite terminators, then folds the byte
/// pairs from the shorter terminator back to offset 0. A concrete unequal
/// pair replaces everything folded so far, because the pair sits closer to
/// the start of the strings and decides the comparison unconditionally.
/// Symbolic pairs contribute an if-then-else node selecting between their
/// difference and the result of the remaining suffix.
///
/// The result is a [`Value`] at the state's pointer width: zero when the
/// strings are equal, otherwise the wrapped difference of the first unequal
/// byte pair (both bytes zero-extended first).
///
/// # Errors
///
/// Returns a memory error if either scan or byte read leaves readable mapped
/// memory.
pub fn strcmp<O>(
    state: &ExecutionState,
    oracle: &O,
    s1: &Value,
    s2: &Value,
) -> Result<ModelOutcome>
where
    O: SolverOracle + ?Sized,
{
    let Some(left) = s1.as_concrete() else {
        return Ok(ModelOutcome::NeedsConcretization { argument: 0 });
    };
    let Some(right) = s2.as_concrete() else {
        return Ok(ModelOutcome::NeedsConcretization { argument: 1 });
    };
    let width = state.address_width();

    let left_zero = scan_first_zero(state, oracle, left)?;
    let right_zero = scan_first_zero(state, oracle, right)?;
    let min_zero = left_zero.min(right_zero);

    let mut result: Option<Value> = None;
    for offset in (0..=min_zero).rev() {
        let c1 = state
            .memory()
            .read(left.wrapping_add(offset), BitWidth::BYTE)?
            .zero_extend(width)?;
        let c2 = state
            .memory()
            .read(right.wrapping_add(offset), BitWidth::BYTE)?
            .zero_extend(width)?;
        match (c1.as_concrete(), c2.as_concrete()) {
            (Some(a), Some(b)) => {
                if a != b {
                    // This pair decides the comparison for the whole suffix
                    result = Some(Value::sub(&c1, &c2)?);
                } else if result.is_none() {
                    result = Some(Value::concrete(width, 0));
                }
            }
            _ => {
                let difference = Value::sub(&c1, &c2)?;
                result = Some(match result {
                    Some(prev) if prev.as_concrete() != Some(0) => {
                        Value::ite(&Cond::ne(c1.to_expr(), c2.to_expr())?, &difference, &prev)?
                    }
                    // An equal tail contributes nothing: the difference at
                    // this pair is already zero when the bytes agree
                    _ => difference,
                });
            }
        }
    }
    Ok(ModelOutcome::Value(
        result.unwrap_or_else(|| Value::concrete(width, 0)),
    ))
}

/// Measures the string at `s`, libc `strlen` style.
///
/// The definite terminator offset is the base case; every symbolic byte
/// before it wraps the running result in an if-then-else selecting the
/// earlier offset when that byte is zero. Concrete non-zero bytes add no
/// tree nodes. The result is a [`Value`] at the state's pointer width.
///
/// # Errors
///
/// Returns a memory error if the terminator scan leaves readable mapped
/// memory.
pub fn strlen<O>(state: &ExecutionState, oracle: &O, s: &Value) -> Result<ModelOutcome>
where
    O: SolverOracle + ?Sized,
{
    let Some(pointer) = s.as_concrete() else {
        return Ok(ModelOutcome::NeedsConcretization { argument: 0 });
    };
    let width = state.address_width();

    let zero_offset = scan_first_zero(state, oracle, pointer)?;
    let mut result = Value::concrete(width, zero_offset);
    for offset in (0..zero_offset).rev() {
        let byte = state
            .memory()
            .read(pointer.wrapping_add(offset), BitWidth::BYTE)?;
        if byte.is_symbolic() {
            result = Value::ite(
                &Cond::eq_zero(byte.to_expr()),
                &Value::concrete(width, offset),
                &result,
            )?;
        }
    }
    Ok(ModelOutcome::Value(result))
}

/// Copies the string at `src` to `dst`, libc `strcpy` style, and returns the
/// destination pointer.
///
/// Runs in three phases. While the next source byte is provably non-null it
/// is copied verbatim, symbolic or not. If the byte that ends that walk is
/// provably null, a concrete zero terminator is written and the copy is
/// complete. Otherwise the remaining source bytes up to the definite
/// terminator form an ambiguous tail: for each cell in it, the written value
/// folds over every earlier candidate terminator, keeping the copied byte
/// while all earlier candidates are non-zero and reverting to the
/// destination's prior content once one of them terminates the string. The
/// cell at the definite terminator itself is forced to a concrete zero
/// whenever the underlying byte is zero, so the copied string always ends in
/// a valid terminator.
///
/// Both pointers are checked for concreteness before any write, so a
/// concretization request never leaves the destination partially updated.
///
/// # Errors
///
/// Returns a memory error if a scan, read, or write leaves accessible mapped
/// memory.
pub fn strcpy<O>(
    state: &mut ExecutionState,
    oracle: &O,
    dst: &Value,
    src: &Value,
) -> Result<ModelOutcome>
where
    O: SolverOracle + ?Sized,
{
    let Some(dst_ptr) = dst.as_concrete() else {
        return Ok(ModelOutcome::NeedsConcretization { argument: 0 });
    };
    let Some(src_ptr) = src.as_concrete() else {
        return Ok(ModelOutcome::NeedsConcretization { argument: 1 });
    };

    // Phase 1: copy bytes that cannot terminate the string
    let mut offset = 0u64;
    let boundary = loop {
        let byte = state
            .memory()
            .read(src_ptr.wrapping_add(offset), BitWidth::BYTE)?;
        if !is_definitely_nonnull(&byte, state.constraints(), oracle) {
            break byte;
        }
        state
            .memory_mut()
            .write(dst_ptr.wrapping_add(offset), &byte)?;
        offset += 1;
    };

    // Phase 2: a forced terminator ends the copy with a concrete zero
    if is_definitely_null(&boundary, state.constraints(), oracle) {
        state
            .memory_mut()
            .write(dst_ptr.wrapping_add(offset), &Value::byte(0))?;
        return Ok(ModelOutcome::Value(dst.clone()));
    }

    // Phase 3: the boundary byte may or may not terminate the string, so
    // every cell up to the definite terminator carries the case analysis of
    // which candidate actually ended it
    let tail_src = src_ptr.wrapping_add(offset);
    let tail_dst = dst_ptr.wrapping_add(offset);
    let mut candidates = scan_possible_zeros(state, oracle, tail_src)?;
    let terminator = *candidates
        .last()
        .expect("candidate scan always yields the definite terminator");

    for offset in (0..=terminator).rev() {
        let mut value = state
            .memory()
            .read(tail_src.wrapping_add(offset), BitWidth::BYTE)?;
        let previous = state
            .memory()
            .read(tail_dst.wrapping_add(offset), BitWidth::BYTE)?;
        if candidates.last() == Some(&offset) {
            if offset == terminator {
                // The written terminator collapses to zero whenever the
                // source byte is zero, independent of the constraint set
                value = Value::ite(&Cond::ne_zero(value.to_expr()), &value, &Value::byte(0))?;
            }
            candidates.pop();
        }
        for &candidate in candidates.iter().rev() {
            let gate = state
                .memory()
                .read(tail_src.wrapping_add(candidate), BitWidth::BYTE)?;
            value = Value::ite(&Cond::ne_zero(gate.to_expr()), &value, &previous)?;
        }
        state
            .memory_mut()
            .write(tail_dst.wrapping_add(offset), &value)?;
    }
    Ok(ModelOutcome::Value(dst.clone()))
}

fn strcmp_entry(
    state: &mut ExecutionState,
    oracle: &dyn SolverOracle,
    args: &[Value],
) -> Result<ModelOutcome> {
    let [s1, s2] = args else {
        return Err(Error::ArgumentCount {
            model: "strcmp",
            expected: 2,
            found: args.len(),
        });
    };
    strcmp(state, oracle, s1, s2)
}

fn strlen_entry(
    state: &mut ExecutionState,
    oracle: &dyn SolverOracle,
    args: &[Value],
) -> Result<ModelOutcome> {
    let [s] = args else {
        return Err(Error::ArgumentCount {
            model: "strlen",
            expected: 1,
            found: args.len(),
        });
    };
    strlen(state, oracle, s)
}

fn strcpy_entry(
    state: &mut ExecutionState,
    oracle: &dyn SolverOracle,
    args: &[Value],
) -> Result<ModelOutcome> {
    let [dst, src] = args else {
        return Err(Error::ArgumentCount {
            model: "strcpy",
            expected: 2,
            found: args.len(),
        });
    };
    strcpy(state, oracle, dst, src)
}

/// Registers the string models with the given registry.
pub fn register(registry: &mut ModelRegistry) {
    registry.register(ModelEntry::fixed("strcmp", strcmp_entry));
    registry.register(ModelEntry::fixed("strlen", strlen_entry));
    registry.register(ModelEntry::fixed("strcpy", strcpy_entry));
}
