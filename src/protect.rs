//! # VMP Protection Transform
//!
//! The protected container layers two transforms over the plain code
//! stream, both reversible without touching the bytecode's semantics:
//!
//! - **Opcode permutation** — each logical opcode is rewritten to a
//!   random physical byte, chosen once per image.
//! - **Immediate masking** — every immediate byte is XORed with a
//!   position-keyed stream derived from the image's seed, so two
//!   otherwise-identical programs look nothing alike on the wire.
//!
//! A keyed integrity tag is computed over the whole payload so any bit
//! flip after packing is detected before a single instruction executes.
//!
//! None of this is cryptographic protection — it is the "VMP" style
//! obfuscation the spec asks for, not a security boundary. `mask` and
//! `integrity_tag` are deliberately simple multiplicative hashes so the
//! decoder can recompute them with nothing but the seed.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::opcode::{Op, OPCODE_COUNT};

/// Golden-ratio multiplicative constant used by both the mask function and
/// the integrity hash.
const GOLDEN: u32 = 0x9E37_79B1;
const FMIX_MUL: u32 = 0x85EB_CA6B;

/// Per-byte keystream value for immediate-operand masking.
///
/// `off` is the immediate byte's absolute offset within the code stream;
/// opcode bytes are never masked.
pub fn mask(seed: u32, off: u32) -> u8 {
    let x = (seed ^ off).wrapping_add(GOLDEN);
    let x = (x ^ (x >> 16)).wrapping_mul(FMIX_MUL);
    ((x >> 24) & 0xFF) as u8
}

/// Keyed 32-bit hash over `data`, used as the container's integrity tag.
pub fn integrity_tag(data: &[u8]) -> u32 {
    let mut h: u32 = GOLDEN;
    for &b in data {
        h ^= b as u32;
        h = h.wrapping_mul(GOLDEN);
    }
    h
}

/// Bijection between logical opcode index and physical code-stream byte,
/// unique to one protected image.
#[derive(Debug, Clone)]
pub struct Permutation {
    /// `physical_of[logical]` — byte 0 of `Op` maps to `physical_of[0]`, etc.
    physical_of: Vec<u8>,
    /// Inverse map, built once at construction for decode-time lookups.
    logical_of: [Option<Op>; 256],
}

impl Permutation {
    /// Build a permutation from an explicit `physical_of` table, as read
    /// back from a container image.
    ///
    /// Fails (returns `None`) if the table is the wrong length, contains
    /// the reserved byte `0`, or assigns the same physical byte twice.
    pub fn from_table(physical_of: Vec<u8>) -> Option<Self> {
        if physical_of.len() != OPCODE_COUNT {
            return None;
        }
        let mut logical_of: [Option<Op>; 256] = [None; 256];
        for (logical, &phys) in physical_of.iter().enumerate() {
            if phys == 0 || logical_of[phys as usize].is_some() {
                return None;
            }
            logical_of[phys as usize] = Some(Op::try_from(logical as u8).ok()?);
        }
        Some(Permutation {
            physical_of,
            logical_of,
        })
    }

    /// Draw a fresh uniform random permutation of `1..=OPCODE_COUNT` using
    /// `seed` as the only source of randomness, via Fisher-Yates shuffle
    /// driven by [`mask`] as the per-step random byte. Reusing the same
    /// one-way function the format already needs for immediate masking
    /// avoids taking on a `rand` dependency for what is, here, obfuscation
    /// rather than a security-sensitive draw.
    pub fn generate(seed: u32) -> Self {
        let mut table: Vec<u8> = (1..=OPCODE_COUNT as u32).map(|v| v as u8).collect();
        for i in (1..table.len()).rev() {
            let draw = mask(seed, (i as u32).wrapping_mul(0x0100_0001));
            let j = (draw as usize) % (i + 1);
            table.swap(i, j);
        }
        Permutation::from_table(table).expect("generated table is always a valid bijection")
    }

    pub fn physical_byte(&self, op: Op) -> u8 {
        self.physical_of[op as usize]
    }

    /// Map a physical byte back to its logical opcode, reporting the
    /// unrecognized physical byte if it doesn't appear in this image's
    /// table.
    pub fn logical_op(&self, physical: u8, position: usize) -> Result<Op, (u8, usize)> {
        self.logical_of[physical as usize].ok_or((physical, position))
    }

    pub fn table(&self) -> &[u8] {
        &self.physical_of
    }
}

static SEED_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Produce a fresh per-image seed. Not cryptographically secure — it only
/// needs to differ image-to-image so permutations and masks don't repeat,
/// per property 4 of the protected format.
pub fn fresh_seed() -> u32 {
    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    counter ^ nanos ^ GOLDEN
}
