//! Stable argument hashing for capture keys.
//!
//! Hashes are derived from content, never from addresses or per-process hash
//! seeds, so a key computed during capture matches the one computed during a
//! later replay run.
//!
//! Arguments are first turned into JSON values and then fed into SHA-256 in a
//! canonical form: object members are visited in sorted key order, so two
//! maps with the same entries hash the same regardless of iteration order.
//! Unit enum variants serialize to their name, which makes an enum constant
//! hash exactly like its canonical string.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hash used for a null or absent argument.
pub const NULL_ARGUMENT_HASH: i64 = 0;

/// Content hash of a serializable argument.
pub fn argument_hash<T: Serialize + ?Sized>(argument: &T) -> serde_json::Result<i64> {
    Ok(value_hash(&serde_json::to_value(argument)?))
}

/// Hash of a symbolic value given by its canonical string form.
pub fn symbol_hash(canonical: &str) -> i64 {
    value_hash(&Value::String(canonical.to_string()))
}

/// Content hash of an already-converted JSON value.
pub fn value_hash(value: &Value) -> i64 {
    if value.is_null() {
        return NULL_ARGUMENT_HASH;
    }
    let mut hasher = Sha256::new();
    feed_canonical(&mut hasher, value);
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(prefix)
}

fn feed_canonical(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update(b"n"),
        Value::Bool(b) => hasher.update(if *b { b"t" } else { b"f" }),
        Value::Number(n) => {
            hasher.update(b"#");
            hasher.update(n.to_string().as_bytes());
            hasher.update(b";");
        }
        Value::String(s) => feed_str(hasher, s),
        Value::Array(items) => {
            hasher.update(b"[");
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                feed_canonical(hasher, item);
            }
            hasher.update(b"]");
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            hasher.update(b"{");
            hasher.update((entries.len() as u64).to_be_bytes());
            for (key, item) in entries {
                feed_str(hasher, key);
                feed_canonical(hasher, item);
            }
            hasher.update(b"}");
        }
    }
}

fn feed_str(hasher: &mut Sha256, s: &str) {
    hasher.update(b"s");
    hasher.update((s.len() as u64).to_be_bytes());
    hasher.update(s.as_bytes());
}
