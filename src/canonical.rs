//! Canonical serialization for deterministic hashing.
//!
//! Signatures hash literal values instead of carrying them around, and
//! topic map fingerprints hash whole content trees. Both go through this
//! module so that equal input always yields the same 64-bit value.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap/BTreeSet for maps in hashed data

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Seed shared by every hash in the crate.
const HASH_SEED: u64 = 0;

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<u64, serde_json::Error> {
    Ok(xxh64(&to_canonical_bytes(value)?, HASH_SEED))
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(format!("{:016x}", canonical_hash(value)?))
}

/// Hash of a plain string, used for literal values and datatype IRIs.
pub fn value_hash(value: &str) -> u64 {
    xxh64(value.as_bytes(), HASH_SEED)
}
