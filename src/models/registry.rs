//! Model registration and dispatch.
//!
//! This module provides [`ModelRegistry`], which maps the import names an
//! engine resolves at call sites (e.g. `"strcmp"`) to model handlers, and the
//! invocation contract those handlers share: the [`ModelOutcome`] result and
//! the fixed/variadic [`ModelKind`] tag.
//!
//! # Dispatch
//!
//! When the engine intercepts a library call it asks the registry by name:
//!
//! 1. No entry means [`DispatchOutcome::NoModel`]; the caller emulates the
//!    real code instead.
//! 2. An entry is invoked with the marshalled arguments and yields
//!    [`DispatchOutcome::Invoked`] around the model's outcome.
//!
//! Re-registering a name replaces the previous entry, so embedders can
//! override the built-ins with their own summaries.

use std::fmt;

use strum::Display;

use crate::{solver::SolverOracle, state::ExecutionState, value::Value, Result};

/// Result of a successful model invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelOutcome {
    /// The model computed the call's result value.
    Value(Value),

    /// A required-concrete argument was symbolic; nothing was computed and no
    /// memory was written.
    ///
    /// Not an error: the engine recovers by enumerating feasible values of
    /// the named argument, forking the state per value and re-invoking the
    /// model on each fork.
    NeedsConcretization {
        /// Zero-based position of the offending argument
        argument: usize,
    },
}

/// Arity class of a registered model.
///
/// The calling-convention layer marshals a fixed argument list for
/// [`ModelKind::Fixed`] models and hands [`ModelKind::Variadic`] models a
/// lazy, single-pass argument stream instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ModelKind {
    /// The model takes a fixed, pre-marshalled argument list.
    Fixed,
    /// The model consumes a lazy stream of remaining arguments.
    Variadic,
}

/// Handler signature of a fixed-arity model.
pub type FixedModelFn =
    fn(&mut ExecutionState, &dyn SolverOracle, &[Value]) -> Result<ModelOutcome>;

/// Handler signature of a variadic model.
///
/// The iterator is single-pass and need not be restartable; it is produced by
/// the engine's calling-convention layer, which may materialize arguments
/// lazily from registers and stack.
pub type VariadicModelFn = fn(
    &mut ExecutionState,
    &dyn SolverOracle,
    &mut dyn Iterator<Item = Value>,
) -> Result<ModelOutcome>;

/// A model handler; the shape *is* the arity tag.
///
/// Deriving [`ModelKind`] from the handler variant means an entry can never
/// claim to be variadic while carrying a fixed-arity function.
#[derive(Clone, Copy)]
pub enum ModelHandler {
    /// Fixed-arity handler.
    Fixed(FixedModelFn),
    /// Variadic handler.
    Variadic(VariadicModelFn),
}

impl ModelHandler {
    /// Returns the arity class this handler implies.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelHandler::Fixed(_) => ModelKind::Fixed,
            ModelHandler::Variadic(_) => ModelKind::Variadic,
        }
    }
}

/// A named, registered model.
#[derive(Clone, Copy)]
pub struct ModelEntry {
    name: &'static str,
    handler: ModelHandler,
}

impl ModelEntry {
    /// Creates an entry for a fixed-arity model.
    #[must_use]
    pub fn fixed(name: &'static str, handler: FixedModelFn) -> Self {
        ModelEntry {
            name,
            handler: ModelHandler::Fixed(handler),
        }
    }

    /// Creates an entry for a variadic model.
    #[must_use]
    pub fn variadic(name: &'static str, handler: VariadicModelFn) -> Self {
        ModelEntry {
            name,
            handler: ModelHandler::Variadic(handler),
        }
    }

    /// Returns the import name this entry answers to.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the arity class of this entry.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.handler.kind()
    }

    /// Invokes the model with a marshalled argument slice.
    ///
    /// A variadic handler receives the slice as its argument stream, so this
    /// entry point works for both kinds. Fixed-arity handlers validate the
    /// count themselves and fail with
    /// [`Error::ArgumentCount`](crate::Error::ArgumentCount) on a mismatch.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns; the registry adds no failure modes of
    /// its own.
    pub fn invoke(
        &self,
        state: &mut ExecutionState,
        oracle: &dyn SolverOracle,
        args: &[Value],
    ) -> Result<ModelOutcome> {
        match self.handler {
            ModelHandler::Fixed(handler) => handler(state, oracle, args),
            ModelHandler::Variadic(handler) => handler(state, oracle, &mut args.iter().cloned()),
        }
    }

    /// Invokes the model with a lazy argument stream.
    ///
    /// The natural entry point for variadic models. A fixed-arity handler
    /// drains the stream first, then validates the count as usual.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns.
    pub fn invoke_variadic(
        &self,
        state: &mut ExecutionState,
        oracle: &dyn SolverOracle,
        args: &mut dyn Iterator<Item = Value>,
    ) -> Result<ModelOutcome> {
        match self.handler {
            ModelHandler::Fixed(handler) => {
                let collected: Vec<Value> = args.collect();
                handler(state, oracle, &collected)
            }
            ModelHandler::Variadic(handler) => handler(state, oracle, args),
        }
    }
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Outcome of a dispatch attempt by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No model is registered under the name; the caller should execute the
    /// real code.
    NoModel,
    /// A model ran; use its outcome instead of executing the real code.
    Invoked(ModelOutcome),
}

/// Registry mapping import names to models.
///
/// # Example
///
/// ```rust
/// use binsym::{
///     AddressSpace, BitWidth, DispatchOutcome, ExecutionState, ExhaustiveOracle,
///     MemoryProtection, ModelOutcome, ModelRegistry, Value,
/// };
///
/// let registry = ModelRegistry::with_builtins();
/// let mut space = AddressSpace::new(BitWidth::W64);
/// let base = space.map(16, MemoryProtection::RW)?;
/// space.write_bytes(base, b"hey\0")?;
/// let mut state = ExecutionState::new(space);
///
/// let args = [Value::concrete(BitWidth::W64, base)];
/// let outcome = registry.dispatch("strlen", &mut state, &ExhaustiveOracle::new(), &args)?;
/// assert_eq!(
///     outcome,
///     DispatchOutcome::Invoked(ModelOutcome::Value(Value::concrete(BitWidth::W64, 3)))
/// );
/// # Ok::<(), binsym::Error>(())
/// ```
#[derive(Default)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in model registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::models::register(&mut registry);
        registry
    }

    /// Registers an entry, replacing any previous entry with the same name.
    pub fn register(&mut self, entry: ModelEntry) {
        self.entries.retain(|existing| existing.name() != entry.name());
        self.entries.push(entry);
    }

    /// Looks up an entry by import name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Dispatches a call by name.
    ///
    /// Returns [`DispatchOutcome::NoModel`] when nothing is registered under
    /// `name`; otherwise invokes the entry with `args` and wraps its outcome.
    ///
    /// # Errors
    ///
    /// Whatever the invoked handler returns.
    pub fn dispatch(
        &self,
        name: &str,
        state: &mut ExecutionState,
        oracle: &dyn SolverOracle,
        args: &[Value],
    ) -> Result<DispatchOutcome> {
        let Some(entry) = self.get(name) else {
            return Ok(DispatchOutcome::NoModel);
        };
        entry.invoke(state, oracle, args).map(DispatchOutcome::Invoked)
    }

    /// Returns the number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no model is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("model_count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expr::BitWidth, solver::ExhaustiveOracle, test::create_test_state};

    fn echo_first(
        _state: &mut ExecutionState,
        _oracle: &dyn SolverOracle,
        args: &[Value],
    ) -> Result<ModelOutcome> {
        Ok(ModelOutcome::Value(args[0].clone()))
    }

    fn count_args(
        _state: &mut ExecutionState,
        _oracle: &dyn SolverOracle,
        args: &mut dyn Iterator<Item = Value>,
    ) -> Result<ModelOutcome> {
        let count = args.count() as u64;
        Ok(ModelOutcome::Value(Value::concrete(BitWidth::W64, count)))
    }

    #[test]
    fn test_registry_empty() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get("strcmp").is_none());
    }

    #[test]
    fn test_registration_and_lookup() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelEntry::fixed("echo", echo_first));
        registry.register(ModelEntry::variadic("count", count_args));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("echo").unwrap().kind(), ModelKind::Fixed);
        assert_eq!(registry.get("count").unwrap().kind(), ModelKind::Variadic);
    }

    #[test]
    fn test_reregistration_replaces() {
        fn other(
            _state: &mut ExecutionState,
            _oracle: &dyn SolverOracle,
            _args: &mut dyn Iterator<Item = Value>,
        ) -> Result<ModelOutcome> {
            Ok(ModelOutcome::Value(Value::byte(0)))
        }

        let mut registry = ModelRegistry::new();
        registry.register(ModelEntry::fixed("name", echo_first));
        registry.register(ModelEntry::variadic("name", other));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("name").unwrap().kind(), ModelKind::Variadic);
    }

    #[test]
    fn test_dispatch_without_entry() {
        let registry = ModelRegistry::new();
        let mut state = create_test_state();
        let outcome = registry
            .dispatch("missing", &mut state, &ExhaustiveOracle::new(), &[])
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::NoModel);
    }

    #[test]
    fn test_dispatch_invokes_entry() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelEntry::fixed("echo", echo_first));

        let mut state = create_test_state();
        let args = [Value::byte(42)];
        let outcome = registry
            .dispatch("echo", &mut state, &ExhaustiveOracle::new(), &args)
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Invoked(ModelOutcome::Value(Value::byte(42)))
        );
    }

    #[test]
    fn test_variadic_entry_accepts_slice_invocation() {
        let entry = ModelEntry::variadic("count", count_args);
        let mut state = create_test_state();
        let args = [Value::byte(1), Value::byte(2), Value::byte(3)];
        let outcome = entry
            .invoke(&mut state, &ExhaustiveOracle::new(), &args)
            .unwrap();
        assert_eq!(
            outcome,
            ModelOutcome::Value(Value::concrete(BitWidth::W64, 3))
        );
    }

    #[test]
    fn test_fixed_entry_accepts_stream_invocation() {
        let entry = ModelEntry::fixed("echo", echo_first);
        let mut state = create_test_state();
        let mut stream = vec![Value::byte(7)].into_iter();
        let outcome = entry
            .invoke_variadic(&mut state, &ExhaustiveOracle::new(), &mut stream)
            .unwrap();
        assert_eq!(outcome, ModelOutcome::Value(Value::byte(7)));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ModelKind::Fixed.to_string(), "fixed");
        assert_eq!(ModelKind::Variadic.to_string(), "variadic");
    }

    #[test]
    fn test_with_builtins_registers_string_models() {
        let registry = ModelRegistry::with_builtins();
        for name in ["strcmp", "strlen", "strcpy"] {
            let entry = registry.get(name).unwrap();
            assert_eq!(entry.kind(), ModelKind::Fixed);
            assert_eq!(entry.name(), name);
        }
    }

    #[test]
    fn test_entry_debug_shows_name_and_kind() {
        let entry = ModelEntry::fixed("echo", echo_first);
        let rendered = format!("{entry:?}");
        assert!(rendered.contains("echo"));
        assert!(rendered.contains("Fixed"));
    }
}
