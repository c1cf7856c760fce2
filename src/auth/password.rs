use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const METHOD: &str = "sha256";
const SALT_LEN: usize = 16;
const SALT_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Hash a password as `sha256$<salt>$<hex HMAC-SHA256(salt, password)>`
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let digest = hex::encode(keyed(&salt).chain_update(password.as_bytes()).finalize().into_bytes());
    format!("{METHOD}${salt}${digest}")
}

/// Check a password against a stored hash. Malformed hashes never match.
#[must_use]
pub fn verify_password(stored: &str, password: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(method), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if method != METHOD {
        return false;
    }
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };

    keyed(salt)
        .chain_update(password.as_bytes())
        .verify_slice(&expected)
        .is_ok()
}

fn keyed(salt: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts keys of any length")
}

fn generate_salt() -> String {
    let mut rng = rand::rng();
    (0..SALT_LEN)
        .map(|_| SALT_CHARS[rng.random_range(0..SALT_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format() {
        let hash = hash_password("correct horse");
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sha256");
        assert_eq!(parts[1].len(), SALT_LEN);
        assert_eq!(parts[2].len(), 64);
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("correct horse");
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
        assert!(!verify_password(&hash, ""));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_verifies_externally_computed_digest() {
        let mut mac = HmacSha256::new_from_slice(b"pepper").unwrap();
        mac.update(b"password");
        let digest = hex::encode(mac.finalize().into_bytes());
        assert!(verify_password(&format!("sha256$pepper${digest}"), "password"));
        assert!(!verify_password(&format!("sha256$other${digest}"), "password"));
    }

    #[test]
    fn test_malformed_hashes_never_match() {
        assert!(!verify_password("", "pw"));
        assert!(!verify_password("sha256$onlysalt", "pw"));
        assert!(!verify_password("md5$salt$abcd", "pw"));
        assert!(!verify_password("sha256$salt$not-hex", "pw"));
    }
}
