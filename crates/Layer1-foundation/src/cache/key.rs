//! Cache key generation
//!
//! Keys are composite strings: a fixed namespace tag, content hashes, and
//! sentinels for absent parts. The hash must be stable across process runs
//! (keys may be compared against externally warmed entries), so it is a
//! fixed 32-bit rolling polynomial rather than the std hasher.

/// Key for a question request
///
/// Capability tags are sorted before joining, so differently ordered but
/// equal sets produce the same key.
pub fn request_key(
    question: &str,
    context: Option<&str>,
    employee_id: Option<&str>,
    capabilities: Option<&[String]>,
) -> String {
    let capability_part = match capabilities {
        Some(tags) if !tags.is_empty() => {
            let mut sorted: Vec<&str> = tags.iter().map(|s| s.as_str()).collect();
            sorted.sort_unstable();
            sorted.join(",")
        }
        _ => "no_capabilities".to_string(),
    };

    format!(
        "api_request:{}:{}:{}:{}",
        hash_base36(question),
        context.map(hash_base36).unwrap_or_else(|| "no_context".to_string()),
        employee_id.unwrap_or("auto_employee"),
        capability_part
    )
}

pub fn employee_list_key() -> String {
    "employee_list".to_string()
}

pub fn employee_key(employee_id: &str) -> String {
    format!("employee:{employee_id}")
}

pub fn health_key() -> String {
    "health_check".to_string()
}

/// 32-bit rolling polynomial hash rendered in base 36
///
/// `h = h * 31 + ch`, computed as `(h << 5) - h + ch` with wrapping i32
/// arithmetic. Collisions are tolerated; the cache is best-effort.
fn hash_base36(input: &str) -> String {
    let mut hash: i32 = 0;
    for ch in input.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as i32);
    }
    to_base36(hash.unsigned_abs() as u64)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    while value > 0 {
        out.insert(0, DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}
