//! # Host Builtins
//!
//! A builtin is just a [`Value::Native`] living in the global environment
//! before execution starts (§4.4: "pre-populated from the host-builtins
//! map"). There is no separate call-builtin opcode — `call` already
//! dispatches on whatever value it pops, so a native function is called
//! exactly like a closure from the bytecode's point of view.
//!
//! This module provides the map type callers build and pass to
//! [`crate::run_vm`]/[`crate::run_protected`], plus one example builtin
//! (`max`) exercised by the concrete scenarios in the test suite.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::value::Value;

/// Name → host-callable mapping injected into the global environment
/// before execution.
pub type Builtins = HashMap<String, Value>;

/// Wrap a Rust closure as a callable [`Value`].
pub fn native(f: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static) -> Value {
    Value::Native(Rc::new(f))
}

/// Two-argument numeric maximum, the builtin the scenario in §8 binds as
/// `max`.
pub fn max_builtin() -> Value {
    native(|args| {
        if args.len() != 2 {
            return Err(RuntimeError::ArityMismatch {
                expect: 2,
                got: args.len(),
            });
        }
        let a = args[0].as_number();
        let b = args[1].as_number();
        Ok(Value::Number(a.max(b)))
    })
}

/// The builtins bound by default when a caller doesn't supply its own
/// map — just `max`, the one the scenarios in the test suite rely on.
pub fn default_builtins() -> Builtins {
    let mut map = Builtins::new();
    map.insert("max".to_string(), max_builtin());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_picks_the_larger_operand() {
        let f = max_builtin();
        let Value::Native(native) = f else {
            panic!("expected a native value");
        };
        let result = native(&[Value::Number(3.0), Value::Number(7.0)]).unwrap();
        assert_eq!(result.as_number(), 7.0);
    }

    #[test]
    fn max_rejects_wrong_arity() {
        let f = max_builtin();
        let Value::Native(native) = f else {
            panic!("expected a native value");
        };
        let err = native(&[Value::Number(1.0)]).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ArityMismatch {
                expect: 2,
                got: 1
            }
        );
    }
}
