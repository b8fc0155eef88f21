use md5::{Digest, Md5};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use serde::Serialize;
use serde_json::Value;

use crate::error::PayboxError;

/// Field name carrying the signature itself, excluded from signing input.
pub const SIG_FIELD: &str = "pg_sig";

const SEPARATOR: char = ';';

/// Compute the keyed digest over a payload's present fields.
///
/// The signing string starts with `step_id` (the endpoint script name for
/// requests and responses, the payment's order token for callbacks), then
/// appends `;value` for every present field in ASCII order of field name,
/// skipping `pg_sig`, and finally `;secret`. The digest is lowercase MD5
/// hex.
///
/// Falsy values — empty strings, the integer 0 — are skipped without a
/// separator. The gateway applies the same rule, so a field explicitly set
/// to such a value is indistinguishable from an absent one. The rule looks
/// at the typed value: a raw callback parameter `"0"` is a non-empty string
/// and participates, while a typed amount of `0` does not.
pub fn create_sig<T: Serialize>(
    payload: &T,
    secret: &str,
    step_id: &str,
) -> Result<String, PayboxError> {
    let string = signing_string(payload, secret, step_id)?;
    Ok(hex::encode(Md5::digest(string.as_bytes())))
}

/// Recompute a payload's signature and compare it with the carried one.
///
/// The carried `pg_sig` inside the payload is ignored by [`create_sig`];
/// comparison is constant-time over the hex strings.
pub fn check_sig<T: Serialize>(
    payload: &T,
    secret: &str,
    step_id: &str,
    sig: &str,
) -> Result<bool, PayboxError> {
    let expected = create_sig(payload, secret, step_id)?;
    Ok(constant_time_eq(expected.as_bytes(), sig.as_bytes()))
}

/// Generate a random alphanumeric nonce for the `pg_salt` field.
pub fn random_salt(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn signing_string<T: Serialize>(
    payload: &T,
    secret: &str,
    step_id: &str,
) -> Result<String, PayboxError> {
    let value = serde_json::to_value(payload)
        .map_err(|e| PayboxError::Validation(format!("payload cannot be signed: {e}")))?;
    let fields = match value {
        Value::Object(map) => map,
        other => {
            return Err(PayboxError::Validation(format!(
                "signable payload must be a flat field set, got {other:?}"
            )))
        }
    };

    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();

    let mut string = String::from(step_id);
    for key in keys {
        if key == SIG_FIELD {
            continue;
        }
        if let Some(scalar) = scalar_form(key, &fields[key.as_str()])? {
            string.push(SEPARATOR);
            string.push_str(&scalar);
        }
    }
    string.push(SEPARATOR);
    string.push_str(secret);
    Ok(string)
}

/// String form of one field value, or `None` when the falsy-skip rule drops
/// it. Enums already serialized to their underlying wire scalar.
fn scalar_form(key: &str, value: &Value) -> Result<Option<String>, PayboxError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some("1".to_string())),
        Value::Array(_) | Value::Object(_) => Err(PayboxError::Validation(format!(
            "field {key} is not a scalar"
        ))),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
