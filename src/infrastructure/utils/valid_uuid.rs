use uuid::Uuid;

use crate::errors::AppError;

/// Parses a canonical UUID string, rejecting with a format error before
/// any storage call is made.
pub fn valid_uuid(id: &str, resource: &str) -> Result<Uuid, AppError> {
    // `Uuid::parse_str` accepts more shapes than the canonical 8-4-4-4-12
    // textual form (simple, urn), so gate on the hyphenated layout first.
    // Positions 14 and 19 are the version (1-5) and RFC 4122 variant
    // (8, 9, a, b) nibbles.
    let canonical = id.len() == 36
        && id.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            14 => matches!(b, b'1'..=b'5'),
            19 => matches!(b.to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b'),
            _ => b.is_ascii_hexdigit(),
        });

    if !canonical {
        return Err(AppError::InvalidId(format!("Invalid {} ID format", resource)));
    }

    Uuid::parse_str(id).map_err(|_| AppError::InvalidId(format!("Invalid {} ID format", resource)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_uuid() {
        assert!(valid_uuid("550e8400-e29b-41d4-a716-446655440000", "project").is_ok());
    }

    #[test]
    fn accepts_generated_v4_ids() {
        let id = Uuid::new_v4().to_string();
        assert!(valid_uuid(&id, "project").is_ok());
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["not-a-uuid", "123", "", "550e8400e29b41d4a716446655440000"] {
            let err = valid_uuid(bad, "project").unwrap_err();
            assert!(matches!(err, AppError::InvalidId(_)));
        }
    }

    #[test]
    fn rejects_bad_version_or_variant_nibbles() {
        // Version nibble 0 and non-RFC-4122 variant nibbles are hex-valid
        // but not real UUIDs.
        for bad in [
            "550e8400-e29b-01d4-0716-446655440000",
            "550e8400-e29b-71d4-a716-446655440000",
            "550e8400-e29b-41d4-c716-446655440000",
            "00000000-0000-0000-0000-000000000000",
        ] {
            let err = valid_uuid(bad, "certification").unwrap_err();
            assert!(matches!(err, AppError::InvalidId(_)));
        }
    }
}
