//! Symbolic models of standard library string functions.
//!
//! A model is a hand-written semantic summary of a library routine: instead of
//! emulating `strlen` instruction by instruction, the engine calls the model,
//! which produces an equivalent result directly from the bytes and the path's
//! constraints. Models handle concrete and symbolic bytes uniformly: fully
//! concrete inputs take concrete fast paths, while symbolic bytes fold into
//! if-then-else trees over the candidate terminator positions.
//!
//! # Modeled Functions
//!
//! | Name | Result | Side effect |
//! |------|--------|-------------|
//! | `strcmp` | difference of the first differing bytes, pointer width | none |
//! | `strlen` | offset of the terminator, pointer width | none |
//! | `strcpy` | the destination pointer | copies source into destination |
//!
//! # Layers
//!
//! - [`classify`]: per-byte null classification over the solver oracle.
//! - [`scan`]: forward terminator scanners built on the classifier.
//! - [`string`]: the three models, composed from the two layers above.
//! - [`registry`]: the dispatcher-facing registration surface
//!   ([`ModelRegistry`], [`ModelEntry`], the fixed/variadic tag and the
//!   concretization outcome).
//!
//! # Invocation Contract
//!
//! Pointer arguments must be concrete. A model handed a symbolic pointer
//! performs no computation and returns
//! [`ModelOutcome::NeedsConcretization`] naming the zero-based argument; the
//! engine is expected to enumerate feasible values, fork the state per value
//! ([`ExecutionState::fork`](crate::ExecutionState::fork)), pin the value and
//! re-invoke. All such checks run before any memory write, so a refused
//! invocation leaves the state untouched.

pub mod classify;
pub mod registry;
pub mod scan;
pub mod string;

pub use classify::{is_definitely_nonnull, is_definitely_null};
pub use registry::{
    DispatchOutcome, FixedModelFn, ModelEntry, ModelHandler, ModelKind, ModelOutcome,
    ModelRegistry, VariadicModelFn,
};
pub use scan::{scan_first_zero, scan_possible_zeros};
pub use string::{strcmp, strcpy, strlen};

/// Registers every built-in model.
///
/// Currently the three string models; new model families register here as
/// they are added.
pub fn register(registry: &mut ModelRegistry) {
    string::register(registry);
}
