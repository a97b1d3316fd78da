//! Deterministic seeded generation utilities.
//!
//! Every random decision in the pipeline derives from the world seed and an
//! integer position: a 32-bit avalanche hash for single draws, and per-column
//! or per-chunk [`ChaCha8Rng`] streams for sequences of draws. Trigonometry
//! goes through `libm` so fallback fields are bit-exact across platforms.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Positional hashing
// ---------------------------------------------------------------------------

const PRIME_X: u32 = 0x85EB_CA6B;
const PRIME_Y: u32 = 0xC2B2_AE35;
const PRIME_Z: u32 = 0x27D4_EB2F;
const PRIME_SEED: u32 = 0x9E37_79B9;

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

#[inline]
fn absorb(h: u32, v: u32, prime: u32) -> u32 {
    (h ^ v.wrapping_mul(prime))
        .rotate_left(13)
        .wrapping_mul(5)
        .wrapping_add(0xE654_6B64)
}

/// 32-bit avalanche hash of an integer position and a seed.
///
/// Pure function of its four inputs; flipping any input bit flips roughly
/// half of the output bits.
#[inline]
pub fn position_hash(x: i32, y: i32, z: i32, seed: u64) -> u32 {
    let mut h = (seed as u32) ^ ((seed >> 32) as u32).wrapping_mul(PRIME_SEED);
    h = absorb(h, x as u32, PRIME_X);
    h = absorb(h, y as u32, PRIME_Y);
    h = absorb(h, z as u32, PRIME_Z);
    fmix32(h)
}

/// Uniform value in `[0, 1)` derived from [`position_hash`].
#[inline]
pub fn position_random(x: i32, y: i32, z: i32, seed: u64) -> f64 {
    f64::from(position_hash(x, y, z, seed)) / 4_294_967_296.0
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// SplitMix64 finalizer.
#[inline]
fn mix64(mut v: u64) -> u64 {
    v = (v ^ (v >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^ (v >> 31)
}

/// Derive a u64 seed for a purpose-tagged 2D cell from the world seed.
///
/// `salt` separates independent streams (columns vs. chunks) that share
/// coordinates.
pub fn derive_cell_seed(world_seed: u64, a: i32, b: i32, salt: u64) -> u64 {
    let packed = (u64::from(a as u32) << 32) | u64::from(b as u32);
    mix64(world_seed ^ mix64(packed ^ mix64(salt)))
}

const COLUMN_SALT: u64 = 0xC01_0000;
const CHUNK_SALT: u64 = 0xC4_0000;

/// Deterministic RNG for a single block column.
///
/// Produces the same sequence for the same `(world_seed, x, z)` regardless of
/// thread or generation order.
pub fn column_rng(world_seed: u64, x: i32, z: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_cell_seed(world_seed, x, z, COLUMN_SALT))
}

/// Deterministic RNG for a chunk, keyed by chunk coordinates.
pub fn chunk_rng(world_seed: u64, chunk_x: i32, chunk_z: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_cell_seed(world_seed, chunk_x, chunk_z, CHUNK_SALT))
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f64) -> f64 {
    libm::cos(x)
}

/// Deterministic sqrt using libm.
#[inline]
pub fn det_sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}
