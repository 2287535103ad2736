//! Cleanup applied to captured field text.

/// Trim and drop `_` left by scan and kerning noise.
pub fn clean_text(text: &str) -> String {
    text.trim().replace('_', "")
}

/// Drop slashes and every whitespace character.
pub fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '/' && !c.is_whitespace())
        .collect()
}

/// How a captured group is cleaned before it becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Trim surrounding whitespace.
    Trim,
    /// Trim and remove underscores.
    Clean,
    /// Remove slashes and all whitespace.
    Compact,
}

impl Transform {
    /// Apply the transform; an empty result means the field is absent.
    pub fn apply(self, text: &str) -> Option<String> {
        let value = match self {
            Transform::Trim => text.trim().to_string(),
            Transform::Clean => clean_text(text),
            Transform::Compact => compact(text),
        };
        (!value.is_empty()).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  POPESCU_ ION_ "), "POPESCU ION");
        assert_eq!(clean_text("___"), "");
    }

    #[test]
    fn test_transforms() {
        assert_eq!(Transform::Trim.apply(" 12_3 "), Some("12_3".to_string()));
        assert_eq!(Transform::Clean.apply(" 12_3 "), Some("123".to_string()));
        assert_eq!(Transform::Compact.apply(" 123 / 456\n7 "), Some("1234567".to_string()));
        assert_eq!(Transform::Clean.apply(" _ "), None);
    }
}
