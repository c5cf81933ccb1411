//! Generated identifiers and credentials.
//!
//! Deployment and server names are caller-generated unique identifiers:
//! scoping every cloud resource name per instance is what lets concurrent
//! pipelines for different instances never contend on the same resource,
//! and what makes re-deploy-by-name a safe retry.

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// A fresh deployment name, unique per logical sub-resource.
pub fn deployment_name() -> String {
    Uuid::new_v4().to_string()
}

/// A fresh server name (lowercase, DNS-safe).
pub fn server_name() -> String {
    Uuid::new_v4().to_string()
}

/// A short random lowercase identifier, usable as a login or database name.
pub fn identifier() -> String {
    let mut rng = rand::thread_rng();
    (0..10)
        .map(|_| LOWER[rng.gen_range(0..LOWER.len())] as char)
        .collect()
}

/// A 16-character generated password guaranteed to contain upper- and
/// lowercase letters and digits, satisfying the DBMS complexity rules.
pub fn password() -> String {
    let mut rng = rand::thread_rng();
    let mut chars: Vec<u8> = Vec::with_capacity(16);
    for pool in [UPPER, LOWER, DIGITS] {
        for _ in 0..2 {
            chars.push(pool[rng.gen_range(0..pool.len())]);
        }
    }
    let all: Vec<u8> = [UPPER, LOWER, DIGITS].concat();
    while chars.len() < 16 {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().map(|b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_names_are_unique() {
        assert_ne!(deployment_name(), deployment_name());
    }

    #[test]
    fn identifier_is_short_lowercase() {
        let id = identifier();
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn password_meets_complexity_rules() {
        for _ in 0..32 {
            let p = password();
            assert_eq!(p.len(), 16);
            assert!(p.chars().any(|c| c.is_ascii_uppercase()));
            assert!(p.chars().any(|c| c.is_ascii_lowercase()));
            assert!(p.chars().any(|c| c.is_ascii_digit()));
        }
    }
}
