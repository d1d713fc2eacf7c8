use rand::RngExt;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Produces candidate shortcodes; the store handles collisions
pub trait ShortcodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniformly random alphanumeric codes of a fixed length
#[derive(Debug, Clone, Copy)]
pub struct RandomShortcodeGenerator {
    length: usize,
}

impl RandomShortcodeGenerator {
    pub const DEFAULT_LENGTH: usize = 6;

    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomShortcodeGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl ShortcodeGenerator for RandomShortcodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Top-level paths served by fixed routes; a link under one of these
/// names could never be reached
pub const RESERVED_SHORTCODES: &[&str] = &["health"];

pub fn is_reserved_shortcode(code: &str) -> bool {
    RESERVED_SHORTCODES.contains(&code)
}

/// Whether `code` is an acceptable caller-chosen shortcode (`^[A-Za-z0-9]{1,20}$`)
pub fn is_valid_custom_shortcode(code: &str) -> bool {
    (1..=20).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
