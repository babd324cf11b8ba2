//! Join code generation for rooms.
//!
//! Codes are 6 uppercase alphanumeric characters. Uniqueness across live
//! rooms is the manager's job; it regenerates on collision.

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LEN: usize = 6;

/// Generate a random join code from the OS-seeded thread RNG.
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_fixed_length_and_alphabet() {
        for _ in 0..100 {
            let code = generate_join_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_vary() {
        let a = generate_join_code();
        let b = generate_join_code();
        let c = generate_join_code();
        assert!(a != b || b != c);
    }
}
