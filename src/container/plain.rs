//! # Plain Container Format (§4.5)
//!
//! ```text
//! u32 const_count
//! for each const:
//!   u8 tag  (0 undefined, 1 number, 2 string)
//!   tag 1: 8 bytes f64 bit image
//!   tag 2: u32 length, then UTF-8 bytes
//! u32 func_count
//! for each function:
//!   u32 entry_offset
//!   u32 arity
//!   u32 param_count
//!   param_count x u32 param_name_idx
//! u32 code_length
//! code_length x u8 code bytes
//! ```
//!
//! Hex-encoded for transport. [`pack_protected`](super::protected::pack_protected)
//! reuses [`write_pool_and_functions`]/[`read_pool_and_functions`] for the
//! part of its layout that is identical to this one.

use crate::error::ContainerError;
use crate::program::{CompiledProgram, ConstValue, FunctionDescriptor};

use super::{decode_hex, encode_hex, Reader, Writer};

const TAG_UNDEFINED: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_STRING: u8 = 2;

/// Serialize a compiled program's constant pool and function table. Shared
/// with the protected format, which appends its permutation table and
/// coded bytes after this.
pub(crate) fn write_pool_and_functions(w: &mut Writer, program: &CompiledProgram) {
    w.u32_le(program.consts.len() as u32);
    for c in &program.consts {
        match c {
            ConstValue::Undefined => w.u8(TAG_UNDEFINED),
            ConstValue::Number(n) => {
                w.u8(TAG_NUMBER);
                w.f64_bits(*n);
            }
            ConstValue::Str(s) => {
                w.u8(TAG_STRING);
                w.string_u32_len(s);
            }
        }
    }

    w.u32_le(program.functions.len() as u32);
    for f in &program.functions {
        w.u32_le(f.entry as u32);
        w.u32_le(f.arity as u32);
        w.u32_le(f.params.len() as u32);
        for &p in &f.params {
            w.u32_le(p as u32);
        }
    }
}

/// Inverse of [`write_pool_and_functions`]. Validates that every function's
/// parameter-name index actually lands in the constant pool.
pub(crate) fn read_pool_and_functions(
    r: &mut Reader,
) -> Result<(Vec<ConstValue>, Vec<FunctionDescriptor>), ContainerError> {
    let const_count = r.u32_le()? as usize;
    let mut consts = Vec::with_capacity(const_count);
    for _ in 0..const_count {
        let tag = r.u8()?;
        let value = match tag {
            TAG_UNDEFINED => ConstValue::Undefined,
            TAG_NUMBER => ConstValue::Number(r.f64_bits()?),
            TAG_STRING => ConstValue::Str(r.string_u32_len()?),
            _ => return Err(ContainerError::Truncated),
        };
        consts.push(value);
    }

    let func_count = r.u32_le()? as usize;
    let mut functions = Vec::with_capacity(func_count);
    for _ in 0..func_count {
        let entry = r.u32_le()? as usize;
        let arity = r.u32_le()?;
        let arity =
            u8::try_from(arity).map_err(|_| ContainerError::IndexOutOfRange)?;
        let param_count = r.u32_le()? as usize;
        let mut params = Vec::with_capacity(param_count);
        for _ in 0..param_count {
            let idx = r.u32_le()?;
            let idx = u8::try_from(idx).map_err(|_| ContainerError::IndexOutOfRange)?;
            if idx as usize >= consts.len() {
                return Err(ContainerError::IndexOutOfRange);
            }
            params.push(idx);
        }
        functions.push(FunctionDescriptor {
            entry,
            arity,
            params,
        });
    }

    Ok((consts, functions))
}

/// Serialize `program` into a lowercase hex string (§4.5).
pub fn pack_plain(program: &CompiledProgram) -> String {
    let mut w = Writer::new();
    write_pool_and_functions(&mut w, program);
    w.u32_le(program.code.len() as u32);
    w.bytes(&program.code);
    encode_hex(w.as_bytes())
}

/// Inverse of [`pack_plain`]. Rejects malformed hex and out-of-range
/// indices before returning.
pub fn unpack_plain(hex_str: &str) -> Result<CompiledProgram, ContainerError> {
    let bytes = decode_hex(hex_str)?;
    let mut r = Reader::new(&bytes);
    let (consts, functions) = read_pool_and_functions(&mut r)?;
    let code_length = r.u32_le()? as usize;
    let code = r.take(code_length)?.to_vec();
    Ok(CompiledProgram {
        code,
        consts,
        functions,
    })
}
