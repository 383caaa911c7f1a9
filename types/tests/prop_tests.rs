use proptest::prelude::*;

use remit_types::{CountryCode, Identity, PairKey, Tick};

proptest! {
    /// Once expired, always expired: the predicate is monotone in `now`.
    #[test]
    fn expiry_is_monotone(
        created in 0u64..1_000_000,
        duration in 1u64..10_000,
        now in 0u64..2_000_000,
        later in 0u64..1_000,
    ) {
        let start = Tick::new(created);
        if start.has_expired(duration, Tick::new(now)) {
            prop_assert!(start.has_expired(duration, Tick::new(now + later)));
        }
    }

    /// The expiry boundary is exactly `created + duration`.
    #[test]
    fn expiry_boundary_is_exact(created in 0u64..1_000_000, duration in 1u64..10_000) {
        let start = Tick::new(created);
        prop_assert!(!start.has_expired(duration, Tick::new(created + duration)));
        prop_assert!(start.has_expired(duration, Tick::new(created + duration + 1)));
    }

    /// Any short alphanumeric handle is a valid identity.
    #[test]
    fn alphanumeric_identities_parse(handle in "[a-zA-Z0-9_]{1,64}") {
        let id = Identity::new(handle.clone()).unwrap();
        prop_assert_eq!(id.as_str(), handle.as_str());
    }

    /// Any ASCII string of at most three bytes is a country code.
    #[test]
    fn country_code_length(code in "[ -~]{0,6}") {
        let parsed = CountryCode::new(code.clone());
        prop_assert_eq!(parsed.is_ok(), code.len() <= CountryCode::MAX_LEN);
    }

    /// Pair keys accept up to 10 printable characters.
    #[test]
    fn pair_key_length(key in "[A-Z-]{1,14}") {
        let parsed = PairKey::new(key.clone());
        prop_assert_eq!(parsed.is_ok(), key.len() <= PairKey::MAX_LEN);
    }
}
