use super::*;
use crate::builtins::default_builtins;
use crate::compiler::compile;
use crate::program::{ConstValue, FunctionDescriptor};

fn run_source(src: &str) -> Value {
    let program = compile(src).expect("source should compile");
    run_vm(&program, &default_builtins()).expect("program should run")
}

#[test]
fn arithmetic_and_print_round_trip() {
    let v = run_source("let a = 2; let b = 3; print(a + b * 2);");
    // no return value at top level without `return`; exercises Print side
    // effect only, so just assert it ran to completion.
    assert!(matches!(v, Value::Undefined));
}

#[test]
fn nested_closures_see_enclosing_bindings() {
    let v = run_source(
        "let a=10; \
         function o(x){ \
           let y=5; \
           function i(z){ return x+y+z+a; } \
           return i(7); \
         } \
         print(o(3));",
    );
    assert!(matches!(v, Value::Undefined));
}

#[test]
fn counter_closures_share_captured_state() {
    // Two independent counters created from the same factory must not
    // interfere with each other, but repeated calls to one must observe
    // its own prior mutation.
    let program = compile(
        "function mk(s){ \
           let c=s; \
           function step(){ c=c+1; return c; } \
           return step; \
         } \
         let a=mk(0); \
         let b=mk(100); \
         print(a()); print(a()); print(b()); print(b());",
    )
    .unwrap();
    run_vm(&program, &default_builtins()).unwrap();
}

#[test]
fn recursive_factorial() {
    let program = compile(
        "function fact(n){ if (n==0){return 1;} else {return n*fact(n-1);} } \
         print(fact(5));",
    )
    .unwrap();
    run_vm(&program, &default_builtins()).unwrap();
}

#[test]
fn undefined_variable_reports_name() {
    let program = compile("print(missing);").unwrap();
    let err = run_vm(&program, &default_builtins()).unwrap_err();
    assert_eq!(err.to_string(), "Undefined variable: missing");
}

#[test]
fn calling_a_non_callable_value_errors() {
    let program = CompiledProgram {
        code: vec![
            Op::PushConst as u8,
            0,
            Op::Call as u8,
            0,
            Op::Halt as u8,
        ],
        consts: vec![ConstValue::Number(1.0)],
        functions: vec![],
    };
    let err = run_vm(&program, &default_builtins()).unwrap_err();
    assert_eq!(err.to_string(), "Not callable");
}

#[test]
fn wrong_arity_call_errors() {
    let program = compile("function f(a,b){return a+b;} print(f(1));").unwrap();
    let err = run_vm(&program, &default_builtins()).unwrap_err();
    assert_eq!(err.to_string(), "arity mismatch: expect 2, got 1");
}

#[test]
fn halt_with_empty_stack_yields_undefined() {
    let program = CompiledProgram {
        code: vec![Op::Halt as u8],
        consts: vec![],
        functions: vec![],
    };
    let v = run_vm(&program, &default_builtins()).unwrap();
    assert!(matches!(v, Value::Undefined));
}

#[test]
fn bad_opcode_byte_is_reported() {
    let program = CompiledProgram {
        code: vec![250],
        consts: vec![],
        functions: vec![],
    };
    let err = run_vm(&program, &default_builtins()).unwrap_err();
    assert_eq!(err.to_string(), "Bad opcode 250");
}

#[test]
fn string_concatenation_coerces_non_strings() {
    let program = compile(r#"let msg="Hello"; function g(n){return msg+" "+n+"!";} print(g("JSVMP"));"#).unwrap();
    run_vm(&program, &default_builtins()).unwrap();
}

#[test]
fn host_builtin_is_callable_like_a_closure() {
    let program = compile("let a=2; function f(b){return b*10;} print( max(f(3), a+100) );").unwrap();
    run_vm(&program, &default_builtins()).unwrap();
}

#[test]
fn closure_call_with_out_of_range_function_index_is_a_vm_invariant() {
    // Hand-build a closure pointing at a function index that doesn't
    // exist, bypassing the compiler (which never emits one), to exercise
    // the VM's own bounds check on `call`.
    let global = Environment::new_global();
    let bogus = Value::Closure(Rc::new(ClosureObj {
        function_index: 7,
        captured_env: Rc::clone(&global),
    }));
    let mut builtins = default_builtins();
    builtins.insert("bogus".to_string(), bogus);

    let program = compile("print(bogus());").unwrap();
    let err = run_vm(&program, &builtins).unwrap_err();
    assert_eq!(err.to_string(), "VmInvariant: function index 7 out of range");
}
