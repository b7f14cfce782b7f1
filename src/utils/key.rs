use uuid::Uuid;

/// Opaque confirmation key mailed to a registering user.
///
/// 122 random bits from the OS-seeded generator behind `Uuid::new_v4`.
pub fn generate_confirmation_key() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_and_url_safe() {
        let a = generate_confirmation_key();
        let b = generate_confirmation_key();

        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
