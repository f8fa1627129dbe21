// Copyright 2025 binsym contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # binsym
//!
//! Symbolic models for C string primitives, built for binary symbolic-execution
//! engines. Instead of emulating `strcmp`, `strlen`, or `strcpy` instruction by
//! instruction, `binsym` computes an equivalent symbolic result directly over
//! memory whose bytes may be concrete, symbolic, or a mix of both.
//!
//! ## Features
//!
//! - **🔀 Uniform byte handling** - Concrete and symbolic bytes flow through the
//!   same algorithms; symbolic content only appears in results where it matters
//! - **📉 Small formulas by construction** - Dead branches collapse at
//!   construction time and concrete comparisons never enter an if-then-else tree
//! - **🧮 Minimal solver traffic** - At most one or two feasibility queries per
//!   scanned byte, issued through a single-method oracle seam
//! - **🗺️ Byte-granular memory** - Mapped regions with per-region protection
//!   flags, mixing concrete and symbolic cells in one address space
//! - **🔌 Engine-friendly dispatch** - A name-keyed registry resolves imported
//!   symbols to models, with a structured concretization request instead of a
//!   failure when a pointer argument is symbolic
//!
//! ## Quick Start
//!
//! Add `binsym` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! binsym = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use binsym::prelude::*;
//!
//! // Map a region and plant a C string
//! let mut space = AddressSpace::new(BitWidth::W64);
//! let base = space.map(16, MemoryProtection::RW)?;
//! space.write_bytes(base, b"hello\0")?;
//! let mut state = ExecutionState::new(space);
//!
//! // Dispatch the strlen model over it
//! let registry = ModelRegistry::with_builtins();
//! let args = [Value::concrete(BitWidth::W64, base)];
//! let outcome = registry.dispatch("strlen", &mut state, &ExhaustiveOracle::new(), &args)?;
//! assert_eq!(
//!     outcome,
//!     DispatchOutcome::Invoked(ModelOutcome::Value(Value::concrete(BitWidth::W64, 5)))
//! );
//! # Ok::<(), binsym::Error>(())
//! ```
//!
//! ### Symbolic Content
//!
//! Bytes read from an input the engine marked symbolic stay symbolic through a
//! model, and the result is an expression tree over them:
//!
//! ```rust
//! use binsym::prelude::*;
//!
//! let mut space = AddressSpace::new(BitWidth::W64);
//! let base = space.map(4, MemoryProtection::RW)?;
//! space.write(base, &Value::byte(b'h'))?;
//! space.write(base + 1, &Value::symbolic(Expr::variable("input", BitWidth::BYTE)))?;
//! space.write(base + 2, &Value::byte(0))?;
//! let state = ExecutionState::new(space);
//!
//! // Length is 1 if the symbolic byte is the terminator, else 2
//! let outcome = binsym::models::strlen(
//!     &state,
//!     &ExhaustiveOracle::new(),
//!     &Value::concrete(BitWidth::W64, base),
//! )?;
//! match outcome {
//!     ModelOutcome::Value(length) => assert!(length.is_symbolic()),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # Ok::<(), binsym::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `binsym` is organized as a ladder of small modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`expr`] - Bit-vector terms and boolean conditions with collapsing constructors
//! - [`value`] - The concrete-or-symbolic machine word models compute with
//! - [`memory`] - Mapped, protected, byte-granular address spaces
//! - [`state`] - Per-path constraint sets and execution state
//! - [`solver`] - The feasibility oracle seam and an enumeration-backed oracle
//! - [`models`] - Terminator scanners, null classifiers, the string models, and
//!   the dispatch registry
//!
//! ## Concretization Contract
//!
//! Models require string pointers to be concrete. When one is symbolic, the
//! model returns [`ModelOutcome::NeedsConcretization`] naming the zero-based
//! argument index, before touching memory. The embedding engine is expected to
//! enumerate feasible pointer values, [fork](state::ExecutionState::fork) one
//! path per value, pin the value there, and invoke the model again on each
//! fork. `binsym` never enumerates or forks by itself.
//!
//! ## Thread Safety
//!
//! Expression trees are immutable and hang off [`Arc`](std::sync::Arc) handles,
//! so values and conditions may be shared freely across threads. A single
//! [`ExecutionState`] must not be mutated concurrently, but distinct states are
//! fully independent; engines routinely explore many paths in parallel, one
//! state per path.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with structured error
//! information:
//!
//! ```rust
//! use binsym::{expr::BitWidth, Error};
//!
//! match BitWidth::new(12) {
//!     Ok(width) => println!("{} bytes", width.bytes()),
//!     Err(Error::InvalidWidth { bits }) => println!("unsupported width: {bits}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```

pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the binsym library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use binsym::prelude::*;
///
/// let registry = ModelRegistry::with_builtins();
/// assert!(registry.get("strcmp").is_some());
/// ```
pub mod prelude;

/// Bit-vector terms and boolean conditions.
///
/// The expression vocabulary is deliberately small: constants, variables,
/// zero-extension, subtraction, and if-then-else, plus equality and
/// disequality conditions. Constructors fold constants and collapse decided
/// branches so formulas stay minimal without a rewrite pass.
pub mod expr;

/// The concrete-or-symbolic machine word.
///
/// [`Value`] is what models read from and write to memory. Operations on two
/// concrete values stay concrete; anything touching a symbolic operand lifts
/// into the [`expr`] algebra.
pub mod value;

/// Byte-granular address spaces with mapped, protected regions.
///
/// Each cell holds a [`Value`], so concrete and symbolic content coexist in
/// the same mapping. Multi-byte accesses are little-endian.
pub mod memory;

/// Per-path execution state: an address space plus accumulated constraints.
pub mod state;

/// The solver seam.
///
/// Models consume exactly one oracle primitive, [`SolverOracle::can_be_true`].
/// [`ExhaustiveOracle`] answers it by enumeration and backs the test suites;
/// production engines wrap their SMT solver instead.
pub mod solver;

/// Symbolic models for string primitives and their dispatch registry.
///
/// # Key Components
///
/// - [`models::strcmp`], [`models::strlen`], [`models::strcpy`] - The model
///   entry points
/// - [`models::scan_first_zero`], [`models::scan_possible_zeros`] - Terminator
///   scanners shared by the models
/// - [`models::is_definitely_null`], [`models::is_definitely_nonnull`] - The
///   byte classifiers every scan decision reduces to
/// - [`ModelRegistry`] - Name-keyed dispatch for import hooking
pub mod models;

/// `binsym` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. This is used consistently throughout the crate for all
/// fallible operations.
///
/// # Examples
///
/// ```rust
/// use binsym::{expr::BitWidth, Result};
///
/// fn word_width(bits: u32) -> Result<BitWidth> {
///     BitWidth::new(bits)
/// }
/// # assert!(word_width(32).is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `binsym` Error type
///
/// The main error type for all operations in this crate. Provides structured
/// error information for width violations, memory faults, and dispatch
/// failures.
///
/// # Examples
///
/// ```rust
/// use binsym::{AddressSpace, BitWidth, Error};
///
/// let space = AddressSpace::new(BitWidth::W64);
/// match space.read(0xdead_beef, BitWidth::BYTE) {
///     Ok(value) => println!("read {value}"),
///     Err(Error::UnmappedAddress { address }) => println!("fault at {address:#x}"),
///     Err(e) => println!("error: {e}"),
/// }
/// ```
pub use error::Error;

/// Width discipline for every term and value in the crate.
///
/// See [`expr::BitWidth`] for the validation rules.
pub use expr::{BitWidth, Cond, Expr};

/// The machine word models compute with.
pub use value::Value;

/// Mapped symbolic memory and its protection flags.
pub use memory::{AddressSpace, MemoryProtection};

/// Per-path state handed to every model invocation.
pub use state::{ConstraintSet, ExecutionState};

/// The feasibility oracle seam and the enumeration-backed implementation.
pub use solver::{ExhaustiveOracle, SolverOracle};

/// Model dispatch surface.
///
/// [`ModelRegistry::with_builtins`] is the usual entry point; engines resolve
/// imported symbol names through [`ModelRegistry::dispatch`] and fall back to
/// real execution on [`DispatchOutcome::NoModel`].
pub use models::{DispatchOutcome, ModelEntry, ModelKind, ModelOutcome, ModelRegistry};
