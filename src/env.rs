//! # Lexical Environments
//!
//! An environment is a name→value mapping with a link to a parent scope
//! (`None` for the global environment). Lookup walks parents; a `store`
//! always writes the *current* node — there is no implicit walk-up for
//! writes, so shadowing a name in an inner scope never mutates the outer
//! binding.
//!
//! Environments are reference-counted (`Rc<RefCell<Environment>>`) so a
//! closure can keep its captured scope alive after the call that created
//! it returns, and so that two closures created by the same call share
//! mutations to that call's locals (the counter example in the test
//! suite below).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub struct Environment {
    vars: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

/// Shared handle to an [`Environment`] node.
pub type EnvRef = Rc<RefCell<Environment>>;

impl Environment {
    /// Construct the global environment (no parent).
    pub fn new_global() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            vars: HashMap::new(),
            parent: None,
        }))
    }

    /// Construct a new child scope of `parent`, e.g. the locals of a call.
    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            vars: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Look up `name`, walking from `env` outward through parent links.
    pub fn get(env: &EnvRef, name: &str) -> Option<Value> {
        let mut cur = Rc::clone(env);
        loop {
            if let Some(v) = cur.borrow().vars.get(name) {
                return Some(v.clone());
            }
            let parent = cur.borrow().parent.clone();
            match parent {
                Some(p) => cur = p,
                None => return None,
            }
        }
    }

    /// Bind `name` to `value` in `env` itself — never in an ancestor, and
    /// regardless of whether `name` already exists there.
    pub fn set_here(env: &EnvRef, name: String, value: Value) {
        env.borrow_mut().vars.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_chain() {
        let global = Environment::new_global();
        Environment::set_here(&global, "a".to_string(), Value::Number(1.0));
        let child = Environment::child(&global);
        assert_eq!(Environment::get(&child, "a").unwrap().as_number(), 1.0);
    }

    #[test]
    fn store_never_walks_up() {
        let global = Environment::new_global();
        Environment::set_here(&global, "a".to_string(), Value::Number(1.0));
        let child = Environment::child(&global);
        Environment::set_here(&child, "a".to_string(), Value::Number(2.0));
        assert_eq!(Environment::get(&child, "a").unwrap().as_number(), 2.0);
        assert_eq!(Environment::get(&global, "a").unwrap().as_number(), 1.0);
    }

    #[test]
    fn undefined_name_is_none() {
        let global = Environment::new_global();
        assert!(Environment::get(&global, "missing").is_none());
    }

    #[test]
    fn two_children_share_mutations_through_shared_parent() {
        // Two closures captured from the same call frame observe each
        // other's writes to that frame's locals, the way a shared `c`
        // should behave across two invocations of an inner closure.
        let global = Environment::new_global();
        let frame = Environment::child(&global);
        Environment::set_here(&frame, "c".to_string(), Value::Number(0.0));

        let view_a = Rc::clone(&frame);
        let view_b = Rc::clone(&frame);
        Environment::set_here(&view_a, "c".to_string(), Value::Number(1.0));
        assert_eq!(Environment::get(&view_b, "c").unwrap().as_number(), 1.0);
    }
}
