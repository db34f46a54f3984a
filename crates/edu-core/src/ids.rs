//! ID prefixes and actor-id well-formedness.
//!
//! Storage-generated ids are `{prefix}-{8 hex}`. Actor ids come from the
//! authentication layer and are either canonical UUIDs or `usr-` prefixed ids.

pub const PREFIX_ENTRY: &str = "ent";
pub const PREFIX_AUDIT: &str = "aud";
pub const PREFIX_NOTIFICATION: &str = "ntf";
pub const PREFIX_USER: &str = "usr";

pub const ALL_PREFIXES: [&str; 4] = [PREFIX_ENTRY, PREFIX_AUDIT, PREFIX_NOTIFICATION, PREFIX_USER];

/// Whether `id` is safe to persist as an actor identifier.
///
/// Accepts canonical hyphenated UUIDs and `usr-xxxxxxxx` ids. Anything else
/// (empty strings, display names, placeholder values) is rejected.
#[must_use]
pub fn is_well_formed_actor_id(id: &str) -> bool {
    is_uuid(id) || is_prefixed(id, PREFIX_USER)
}

fn is_uuid(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 36
        && bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

fn is_prefixed(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid() {
        assert!(is_well_formed_actor_id("5f0c2a8e-1b2d-4c3e-9f4a-0123456789ab"));
        assert!(is_well_formed_actor_id("5F0C2A8E-1B2D-4C3E-9F4A-0123456789AB"));
    }

    #[test]
    fn accepts_user_prefix() {
        assert!(is_well_formed_actor_id("usr-a3f8b2c1"));
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "",
            "admin",
            "undefined",
            "usr-",
            "usr-a3f8b2c",
            "usr-a3f8b2c1x",
            "ent-a3f8b2c1",
            "5f0c2a8e1b2d4c3e9f4a0123456789ab",
            "5f0c2a8e-1b2d-4c3e-9f4a-0123456789zz",
        ] {
            assert!(!is_well_formed_actor_id(bad), "{bad:?} should be rejected");
        }
    }
}
