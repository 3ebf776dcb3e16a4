//! Call, return, and conditional-branch opcodes — the three instructions
//! that set `ip` themselves instead of letting the dispatch loop advance
//! it, per §4.3/§4.4's call protocol.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::Value;

use super::{Frame, Step, Vm};

/// `call n`: pop `n` args (last-pushed popped first, restored to
/// first-pushed-first order), pop the callee, then either invoke it
/// directly (host-callable) or set up a new call frame and jump to its
/// entry (closure).
pub(super) fn call(vm: &mut Vm) -> Result<Step, RuntimeError> {
    let argc = vm.imm()? as usize;
    let mut args = Vec::with_capacity(argc);
    for _ in 0..argc {
        args.push(vm.pop()?);
    }
    args.reverse();
    let callee = vm.pop()?;

    match callee {
        Value::Native(f) => {
            let result = f(&args)?;
            vm.stack.push(result);
            Ok(Step::Continue)
        }
        Value::Closure(closure) => {
            let func = vm
                .functions
                .get(closure.function_index as usize)
                .ok_or_else(|| {
                    RuntimeError::VmInvariant(format!(
                        "function index {} out of range",
                        closure.function_index
                    ))
                })?
                .clone();
            if func.arity as usize != argc {
                return Err(RuntimeError::ArityMismatch {
                    expect: func.arity as usize,
                    got: argc,
                });
            }

            let return_ip = vm.ip + 2;
            vm.frames.push(Frame {
                return_ip,
                saved_env: Rc::clone(&vm.env),
            });

            let new_env = Environment::child(&closure.captured_env);
            for (&pname_idx, arg) in func.params.iter().zip(args.into_iter()) {
                let name = vm.const_str(pname_idx)?;
                Environment::set_here(&new_env, name, arg);
            }
            vm.env = new_env;
            vm.ip = func.entry;
            Ok(Step::Jumped)
        }
        _ => Err(RuntimeError::NotCallable),
    }
}

/// `ret`: pop the return value (or synthesize `undefined`); if the call
/// stack is empty this is the top-level return and execution halts,
/// otherwise the caller's frame is restored and the value is pushed back
/// onto its stack.
pub(super) fn ret(vm: &mut Vm) -> Result<Step, RuntimeError> {
    let value = vm.stack.pop().unwrap_or(Value::Undefined);
    match vm.frames.pop() {
        None => Ok(Step::Halt(value)),
        Some(frame) => {
            vm.ip = frame.return_ip;
            vm.env = frame.saved_env;
            vm.stack.push(value);
            Ok(Step::Jumped)
        }
    }
}

/// `jmp_if_false a`: pop the condition; jump to `a` if it's falsy,
/// otherwise fall through.
pub(super) fn jmp_if_false(vm: &mut Vm) -> Result<Step, RuntimeError> {
    let addr = vm.imm()?;
    let cond = vm.pop()?;
    if !cond.truthy() {
        vm.ip = addr as usize;
        Ok(Step::Jumped)
    } else {
        Ok(Step::Continue)
    }
}
