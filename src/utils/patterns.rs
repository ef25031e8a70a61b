/// Pattern helpers used by provider format pre-checks.
pub struct PatternUtils;

impl PatternUtils {
    /// Check if a string has minimum Shannon entropy (filters placeholder
    /// strings like "xxxxxxxx" that still match a broad regex).
    pub fn has_min_entropy(s: &str, min_entropy: f64) -> bool {
        Self::calculate_entropy(s) >= min_entropy
    }

    pub fn calculate_entropy(s: &str) -> f64 {
        use std::collections::HashMap;

        if s.is_empty() {
            return 0.0;
        }

        let mut char_counts = HashMap::new();
        for c in s.chars() {
            *char_counts.entry(c).or_insert(0) += 1;
        }

        let len = s.len() as f64;
        let mut entropy = 0.0;

        for count in char_counts.values() {
            let p = (*count as f64) / len;
            entropy -= p * p.log2();
        }

        entropy
    }

    pub fn is_hex(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Common content-hash lengths; a bare hex string of these sizes is far
    /// more likely a checksum committed to the repo than a credential.
    pub fn looks_like_hash(s: &str) -> bool {
        let common_hash_lengths = [32, 40, 64];
        Self::is_hex(s) && common_hash_lengths.contains(&s.len())
    }
}
