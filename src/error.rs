//! # Error Types
//!
//! One small error enum per pipeline layer — lexing, parsing, container
//! decode, and VM execution — each with a `Display` impl that produces the
//! exact wording callers and tests key off of. [`JsvmpError`] unifies them
//! for the top-level `compile`/`run_vm`/`run_protected` entry points so a
//! caller that doesn't care which layer failed can use one type.

use std::fmt;

/// Errors raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// An input byte didn't start any recognized token.
    UnexpectedChar(char),
    /// A `"..."` string literal ran off the end of the source without a
    /// closing quote.
    UnterminatedString,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar(c) => write!(f, "Unexpected char {}", c),
            LexError::UnterminatedString => write!(f, "Unterminated string"),
        }
    }
}

impl std::error::Error for LexError {}

/// Errors raised by the recursive-descent parser and emitter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Expected one concrete token, found another.
    Expect(String, String),
    /// A primary expression didn't start with a token the grammar allows.
    UnexpectedInFactor(String),
    /// Compiled code length or a backpatch target exceeded the 1-byte
    /// address width. Not part of the stable error surface; this is an
    /// internal safety net a reimplementer would also need.
    ProgramTooLarge,
    /// More than 256 distinct constants were needed (1-byte pool index).
    ConstPoolOverflow,
    /// More than 256 function declarations (1-byte function index).
    FunctionTableOverflow,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Expect(want, got) => write!(f, "Expect {}, got {}", want, got),
            ParseError::UnexpectedInFactor(tok) => {
                write!(f, "Unexpected token in Factor: {}", tok)
            }
            ParseError::ProgramTooLarge => {
                write!(f, "Program too large: exceeds 1-byte code address width")
            }
            ParseError::ConstPoolOverflow => {
                write!(f, "Constant pool overflow: more than 256 distinct constants")
            }
            ParseError::FunctionTableOverflow => {
                write!(f, "Function table overflow: more than 256 functions")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while executing already-compiled bytecode.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// `load_var`/`store_var` resolved to a constant-pool string, but no
    /// such name is visible in any enclosing environment.
    UndefinedVariable(String),
    /// `call` popped a callee that is neither a closure nor a host
    /// function.
    NotCallable,
    /// A closure was called with the wrong number of arguments.
    ArityMismatch { expect: usize, got: usize },
    /// The decoder produced a physical/logical byte with no matching
    /// instruction.
    BadOpcode(u8),
    /// Internal invariant violation (stack underflow, out-of-range pool or
    /// function index reached at run time). Indicates malformed bytecode
    /// that slipped past the container decoder.
    VmInvariant(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable(name) => {
                write!(f, "Undefined variable: {}", name)
            }
            RuntimeError::NotCallable => write!(f, "Not callable"),
            RuntimeError::ArityMismatch { expect, got } => {
                write!(f, "arity mismatch: expect {}, got {}", expect, got)
            }
            RuntimeError::BadOpcode(op) => write!(f, "Bad opcode {}", op),
            RuntimeError::VmInvariant(msg) => write!(f, "VmInvariant: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Errors raised while decoding a plain or protected container image.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerError {
    /// The hex transport string had an odd length or a non-hex digit.
    InvalidHex,
    /// The byte stream ended before a length-prefixed field was fully read.
    Truncated,
    /// A constant-pool or function-table index pointed outside its table.
    IndexOutOfRange,
    /// Protected image: the 3-byte `VM<version>` prefix didn't start with
    /// `VM`.
    BadMagic,
    /// Protected image: the version byte wasn't the one this crate speaks.
    BadVersion,
    /// Protected image: the recomputed integrity tag didn't match the
    /// stored one.
    IntegrityFailed,
    /// Protected image: a code byte, after permutation, didn't name any
    /// logical opcode.
    UnknownPhysicalOpcode { byte: u8, position: usize },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::InvalidHex => write!(f, "Invalid hex image"),
            ContainerError::Truncated => write!(f, "Truncated container image"),
            ContainerError::IndexOutOfRange => write!(f, "Index out of range in container image"),
            ContainerError::BadMagic => write!(f, "Bad magic number"),
            ContainerError::BadVersion => write!(
                f,
                "Bad version - expected VMP protected format v3 (with immediate encryption)"
            ),
            ContainerError::IntegrityFailed => {
                write!(f, "Integrity check failed - code may be tampered")
            }
            ContainerError::UnknownPhysicalOpcode { byte, position } => write!(
                f,
                "Unknown physical opcode: {} at position {}",
                byte, position
            ),
        }
    }
}

impl std::error::Error for ContainerError {}

/// Unified error type for the crate's top-level API.
///
/// Each pipeline layer has its own focused error enum; callers that just
/// want to propagate a failure with `?` can collapse all of them into one
/// `JsvmpError` instead of threading four separate types through `main`.
#[derive(Debug, Clone, PartialEq)]
pub enum JsvmpError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
    Container(ContainerError),
}

impl fmt::Display for JsvmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsvmpError::Lex(e) => write!(f, "{}", e),
            JsvmpError::Parse(e) => write!(f, "{}", e),
            JsvmpError::Runtime(e) => write!(f, "{}", e),
            JsvmpError::Container(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for JsvmpError {}

impl From<LexError> for JsvmpError {
    fn from(e: LexError) -> Self {
        JsvmpError::Lex(e)
    }
}

impl From<ParseError> for JsvmpError {
    fn from(e: ParseError) -> Self {
        JsvmpError::Parse(e)
    }
}

impl From<RuntimeError> for JsvmpError {
    fn from(e: RuntimeError) -> Self {
        JsvmpError::Runtime(e)
    }
}

impl From<ContainerError> for JsvmpError {
    fn from(e: ContainerError) -> Self {
        JsvmpError::Container(e)
    }
}

/// Compilation can fail lexically or syntactically; this groups both so
/// `compile()` has one error type without reaching all the way up to
/// [`JsvmpError`].
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{}", e),
            CompileError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<CompileError> for JsvmpError {
    fn from(e: CompileError) -> Self {
        match e {
            CompileError::Lex(e) => JsvmpError::Lex(e),
            CompileError::Parse(e) => JsvmpError::Parse(e),
        }
    }
}
