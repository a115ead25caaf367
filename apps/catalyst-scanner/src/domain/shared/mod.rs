//! Shared Value Objects

mod symbol;

pub use symbol::Symbol;
