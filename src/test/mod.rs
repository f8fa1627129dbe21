use crate::{
    expr::{BitWidth, Cond, Expr},
    memory::{AddressSpace, MemoryProtection},
    state::ExecutionState,
    value::Value,
};

// Helper function to create an ExecutionState over a fresh 64-bit address space
pub fn create_test_state() -> ExecutionState {
    ExecutionState::new(AddressSpace::new(BitWidth::W64))
}

// Helper function to create a symbolic byte variable
pub fn sym_byte(name: &str) -> Value {
    Value::symbolic(Expr::variable(name, BitWidth::BYTE))
}

// Helper function to map a readable and writable region holding the given
// cells, returning its base address
pub fn plant_cells(state: &mut ExecutionState, cells: &[Value]) -> u64 {
    let memory = state.memory_mut();
    let base = memory
        .map(cells.len(), MemoryProtection::RW)
        .expect("test region should fit the default limit");
    for (offset, cell) in cells.iter().enumerate() {
        memory
            .write(base + offset as u64, cell)
            .expect("planted cell should be writable");
    }
    base
}

// Helper function to map a readable and writable region holding the given
// concrete bytes, returning its base address
pub fn plant_bytes(state: &mut ExecutionState, bytes: &[u8]) -> u64 {
    let memory = state.memory_mut();
    let base = memory
        .map(bytes.len(), MemoryProtection::RW)
        .expect("test region should fit the default limit");
    memory
        .write_bytes(base, bytes)
        .expect("planted bytes should be writable");
    base
}

// Helper function to pin a byte variable to a concrete value via the
// constraint set
pub fn pin_byte(state: &mut ExecutionState, name: &str, value: u8) {
    state.constraints_mut().add(
        Cond::eq(
            Expr::variable(name, BitWidth::BYTE),
            Expr::constant(BitWidth::BYTE, u64::from(value)),
        )
        .expect("byte widths always match"),
    );
}
