//! Token records
//!
//! A token is an immutable value: noise rules never edit a token in place, they
//! build a new one with [`Token::with_surface`] or [`Token::joined`]. This keeps
//! the snapshot taken for augmentation independent from the noisy copy.

/// Opening mark of a placeholder token (e.g. `｟mrk_noisy｠`)
pub const PLACEHOLDER_OPEN: char = '｟';
/// Closing mark of a placeholder token
pub const PLACEHOLDER_CLOSE: char = '｠';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    surface: String,
    is_placeholder: bool,
    join_left: bool,
}

impl Token {
    /// Create a token from its surface, detecting placeholders
    pub fn new(surface: impl Into<String>) -> Self {
        let surface = surface.into();
        let is_placeholder = is_placeholder_surface(&surface);
        Token {
            surface,
            is_placeholder,
            join_left: false,
        }
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn is_placeholder(&self) -> bool {
        self.is_placeholder
    }

    /// No whitespace separates this token from its predecessor
    pub fn join_left(&self) -> bool {
        self.join_left
    }

    /// Number of characters in the surface
    pub fn len(&self) -> usize {
        self.surface.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.surface.is_empty()
    }

    /// Copy of this token carrying a different surface. Flags are kept.
    pub fn with_surface(&self, surface: impl Into<String>) -> Self {
        Token {
            surface: surface.into(),
            ..self.clone()
        }
    }

    /// Copy of this token with `join_left` set to `join`
    pub fn joined(&self, join: bool) -> Self {
        Token {
            join_left: join,
            ..self.clone()
        }
    }

    /// Every character of the surface is alphabetic
    pub fn is_alphabetic(&self) -> bool {
        is_alphabetic(&self.surface)
    }
}

pub(crate) fn is_alphabetic(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_alphabetic)
}

fn is_placeholder_surface(surface: &str) -> bool {
    surface.starts_with(PLACEHOLDER_OPEN) && surface.ends_with(PLACEHOLDER_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert!(Token::new("｟mrk_noisy｠").is_placeholder());
        assert!(Token::new("｟a｠").is_placeholder());
        assert!(!Token::new("hello").is_placeholder());
        assert!(!Token::new("｟open").is_placeholder());
    }

    #[test]
    fn test_with_surface_keeps_flags() {
        let token = Token::new("hello").joined(true);
        let renamed = token.with_surface("world");
        assert_eq!(renamed.surface(), "world");
        assert!(renamed.join_left());
        assert_eq!(token.surface(), "hello");
    }

    #[test]
    fn test_len_counts_characters() {
        assert_eq!(Token::new("élève").len(), 5);
        assert_eq!(Token::new("").len(), 0);
        assert!(Token::new("").is_empty());
    }

    #[test]
    fn test_is_alphabetic() {
        assert!(Token::new("Élève").is_alphabetic());
        assert!(!Token::new("hello.").is_alphabetic());
        assert!(!Token::new("42").is_alphabetic());
    }
}
