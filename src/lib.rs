//! A toy imperative language, compiled to a stack bytecode and executed
//! by a lexically-scoped interpreter with first-class closures.
//!
//! The pipeline mirrors [`compile`] → [`run_vm`], with an optional
//! container layer in between for serializing a compiled program to a
//! hex string and back ([`pack_plain`]/[`unpack_plain`]), and a
//! tamper-evident variant of that container
//! ([`pack_protected`]/[`run_protected`]) that permutes the opcode table
//! and masks immediate operands per image (see [`protect`]).
//!
//! ```
//! use jsvmp::{builtins, compile, run_vm};
//!
//! let program = compile("print(1 + 2);").unwrap();
//! run_vm(&program, &builtins::default_builtins()).unwrap();
//! ```

pub mod builtins;
pub mod compiler;
pub mod container;
pub mod env;
pub mod error;
pub mod lexer;
pub mod opcode;
pub mod program;
pub mod protect;
pub mod repl;
pub mod value;
pub mod vm;

pub use builtins::Builtins;
pub use compiler::compile;
pub use container::plain::{pack_plain, unpack_plain};
pub use error::{CompileError, ContainerError, JsvmpError, RuntimeError};
pub use program::CompiledProgram;
pub use value::Value;
pub use vm::run_vm;

/// Pack a compiled program into a tamper-evident, permutation-protected
/// image (§4.6).
pub fn pack_protected(program: &CompiledProgram) -> String {
    container::protected::pack_protected(program)
}

/// Unpack, validate, and execute a protected image in one step. Fails
/// with [`JsvmpError::Container`] before a single instruction runs if the
/// image is malformed or its integrity tag doesn't match.
pub fn run_protected(hex_image: &str, builtins: &Builtins) -> Result<Value, JsvmpError> {
    let program = container::protected::unpack_protected(hex_image)?;
    run_vm(&program, builtins).map_err(JsvmpError::from)
}
