//! # Logical Opcode Table
//!
//! The instruction set is a fixed logical enumeration (spec numbering is
//! irrelevant to any concrete format); the plain container uses the index
//! itself as the physical byte, while the protected container (see
//! [`crate::protect`]) remaps each logical opcode to a random physical
//! byte per image. Keeping the enum and its byte width in one place means
//! both container variants and the VM decoder agree on what a "logical
//! opcode" is.

/// Number of logical opcodes. Also the exclusive upper bound for a
/// physical byte's *logical* index, and (via `1..=OPCODE_COUNT`) the
/// inclusive range of physical bytes a permutation may assign.
pub const OPCODE_COUNT: usize = 21;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    PushConst = 0,
    LoadVar = 1,
    StoreVar = 2,
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    Eq = 7,
    Ne = 8,
    Lt = 9,
    Gt = 10,
    Le = 11,
    Ge = 12,
    Print = 13,
    Pop = 14,
    MakeClosure = 15,
    Call = 16,
    Ret = 17,
    Jmp = 18,
    JmpIfFalse = 19,
    Halt = 20,
}

impl Op {
    /// Whether this opcode is followed by one immediate byte in the code
    /// stream.
    pub fn has_immediate(self) -> bool {
        matches!(
            self,
            Op::PushConst
                | Op::LoadVar
                | Op::StoreVar
                | Op::MakeClosure
                | Op::Call
                | Op::Jmp
                | Op::JmpIfFalse
        )
    }
}

impl TryFrom<u8> for Op {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        Ok(match v {
            0 => Op::PushConst,
            1 => Op::LoadVar,
            2 => Op::StoreVar,
            3 => Op::Add,
            4 => Op::Sub,
            5 => Op::Mul,
            6 => Op::Div,
            7 => Op::Eq,
            8 => Op::Ne,
            9 => Op::Lt,
            10 => Op::Gt,
            11 => Op::Le,
            12 => Op::Ge,
            13 => Op::Print,
            14 => Op::Pop,
            15 => Op::MakeClosure,
            16 => Op::Call,
            17 => Op::Ret,
            18 => Op::Jmp,
            19 => Op::JmpIfFalse,
            20 => Op::Halt,
            other => return Err(other),
        })
    }
}
