use sha2::{Digest, Sha256};

/// Gravatar URL for an email address. Best-effort: there is no guarantee the
/// address has an avatar, so we ask Gravatar for an identicon fallback.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon",
        hex::encode(digest)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha256_of_normalized_email() {
        let url = gravatar_url("  Someone@Example.COM ");
        let same = gravatar_url("someone@example.com");
        assert_eq!(url, same);

        let hash = url
            .strip_prefix("https://www.gravatar.com/avatar/")
            .and_then(|rest| rest.split('?').next())
            .unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_emails_get_distinct_urls() {
        assert_ne!(gravatar_url("a@example.com"), gravatar_url("b@example.com"));
    }
}
