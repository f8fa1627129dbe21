use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of expression construction, simulated memory access,
/// and model dispatch. Each variant carries the specific context needed to act on the
/// failure without re-deriving it from the call site.
///
/// # Error Categories
///
/// ## Expression Shape Errors
/// - [`Error::InvalidWidth`] - Bit width outside the supported lattice
/// - [`Error::WidthMismatch`] - Operands of a combining operation disagree on width
///
/// ## Memory Errors
/// - [`Error::UnmappedAddress`] - Access outside every mapped region
/// - [`Error::AccessViolation`] - Access denied by region protection
/// - [`Error::InvalidPointer`] - Structurally invalid pointer (stale region, bad base)
/// - [`Error::MemoryLimitExceeded`] - Mapping would exceed the configured budget
/// - [`Error::SymbolicAccess`] - Multi-byte access crossing a symbolic cell
///
/// ## Dispatch Errors
/// - [`Error::ArgumentCount`] - Fixed-arity model invoked with the wrong argument count
///
/// Note that a model demanding concretization of a symbolic argument is *not* an error:
/// it is reported through `ModelOutcome::NeedsConcretization`, because the embedding
/// engine is expected to recover by forking.
///
/// # Examples
///
/// ```rust
/// use binsym::{AddressSpace, BitWidth, Error, MemoryProtection};
///
/// let space = AddressSpace::new(BitWidth::W64);
/// match space.read(0xdead_0000, BitWidth::BYTE) {
///     Err(Error::UnmappedAddress { address }) => {
///         eprintln!("no region maps {address:#x}");
///     }
///     other => panic!("expected an unmapped read, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Expression shape Errors
    /// A bit width outside the supported lattice was requested.
    ///
    /// Widths must be positive multiples of 8 and no larger than 64 bits. Anything
    /// else cannot name a run of whole memory cells and is rejected before it can
    /// reach an expression node.
    #[error("invalid bit width {bits} (widths are multiples of 8 between 8 and 64)")]
    InvalidWidth {
        /// The rejected width, in bits
        bits: u32,
    },

    /// Two operands of a combining operation disagree on bit width.
    ///
    /// Every combining operation (subtraction, comparison, if-then-else arms) requires
    /// its operands to match exactly; widths only ever change through explicit
    /// zero-extension. This error is raised at construction time so a malformed tree
    /// can never be observed downstream.
    ///
    /// # Fields
    ///
    /// * `operation` - The operation that was being constructed
    /// * `expected` - Width imposed by the first operand, in bits
    /// * `found` - Width of the offending operand, in bits
    #[error("width mismatch in {operation}: expected {expected} bits, found {found} bits")]
    WidthMismatch {
        /// The operation that was being constructed
        operation: &'static str,
        /// Width imposed by the first operand, in bits
        expected: u32,
        /// Width of the offending operand, in bits
        found: u32,
    },

    // Memory Errors
    /// The address is not covered by any mapped region.
    #[error("unmapped address {address:#x}")]
    UnmappedAddress {
        /// The faulting address
        address: u64,
    },

    /// The access is denied by the protection mask of the containing region.
    ///
    /// # Fields
    ///
    /// * `address` - The faulting address
    /// * `required` - The permission the access needed (`"readable"` or `"writable"`)
    #[error("access violation at {address:#x}: region is not {required}")]
    AccessViolation {
        /// The faulting address
        address: u64,
        /// The permission the access needed
        required: &'static str,
    },

    /// A pointer is structurally invalid for the requested operation.
    ///
    /// Raised for operations that name a region by base address, such as unmapping
    /// an address that is not a region base or reusing a region that was already
    /// unmapped.
    #[error("invalid pointer {address:#x}: {reason}")]
    InvalidPointer {
        /// The offending address
        address: u64,
        /// Why the pointer was rejected
        reason: &'static str,
    },

    /// Mapping the requested region would exceed the configured memory budget.
    ///
    /// # Fields
    ///
    /// * `current` - Bytes currently mapped
    /// * `requested` - Bytes the rejected mapping asked for
    /// * `limit` - The configured budget, in bytes
    #[error("memory limit exceeded: {current} + {requested} bytes over a limit of {limit}")]
    MemoryLimitExceeded {
        /// Bytes currently mapped
        current: usize,
        /// Bytes the rejected mapping asked for
        requested: usize,
        /// The configured budget, in bytes
        limit: usize,
    },

    /// A multi-byte access would cross a symbolic memory cell.
    ///
    /// The address space composes wide reads and decomposes wide writes only over
    /// concrete cells. Symbolic content is accessed one byte at a time, which is all
    /// the string models require; composing wide symbolic values is the job of the
    /// embedding engine's CPU layer.
    #[error("{width}-bit access at {address:#x} crosses a symbolic byte; symbolic cells are byte-granular")]
    SymbolicAccess {
        /// Address of the access
        address: u64,
        /// Requested width, in bits
        width: u32,
    },

    // Dispatch Errors
    /// A fixed-arity model was invoked with the wrong number of arguments.
    ///
    /// # Fields
    ///
    /// * `model` - Registered name of the model
    /// * `expected` - Arity the model declares
    /// * `found` - Number of arguments supplied
    #[error("model '{model}' takes {expected} arguments, found {found}")]
    ArgumentCount {
        /// Registered name of the model
        model: &'static str,
        /// Arity the model declares
        expected: usize,
        /// Number of arguments supplied
        found: usize,
    },
}
