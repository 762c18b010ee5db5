//! Random identifier generation for reports

use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate `len` random base36 characters (lowercase)
pub(crate) fn random_base36(len: usize) -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}

/// Assessment id in the `RPT-XXXXXXXXX` format stamped at parse time
pub(crate) fn assessment_id() -> String {
    format!("RPT-{}", random_base36(9).to_uppercase())
}
