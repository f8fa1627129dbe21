//! # binsym Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the binsym library. Import this module to get quick access to the essential
//! types for symbolic string modeling.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all binsym operations
pub use crate::Error;

/// The result type used throughout binsym
pub use crate::Result;

// ================================================================================================
// Expression Algebra
// ================================================================================================

/// Bit-vector terms, boolean conditions, and their shared handles
pub use crate::expr::{BitWidth, Cond, CondRc, Expr, ExprRc};

/// Concrete-or-symbolic machine words
pub use crate::value::Value;

// ================================================================================================
// Execution State
// ================================================================================================

/// Byte-granular memory with mixed concrete and symbolic cells
pub use crate::memory::{AddressSpace, MemoryProtection};

/// Path constraints and the per-path state models operate on
pub use crate::state::{ConstraintSet, ExecutionState};

// ================================================================================================
// Solver Oracle
// ================================================================================================

/// Feasibility oracle seam and the enumeration-backed test oracle
pub use crate::solver::{ExhaustiveOracle, SolverOracle};

// ================================================================================================
// Models and Dispatch
// ================================================================================================

/// Model registration and invocation surface
pub use crate::models::{
    DispatchOutcome, ModelEntry, ModelHandler, ModelKind, ModelOutcome, ModelRegistry,
};

/// The string model entry points
pub use crate::models::{strcmp, strcpy, strlen};
