//! Flag types and small enums shared by the tokenizer and parser.

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Modifiers collected in front of a class member or parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u16 {
        const NONE      = 0;
        const PUBLIC    = 1 << 0;
        const PRIVATE   = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC    = 1 << 3;
        const READONLY  = 1 << 4;
        const ABSTRACT  = 1 << 5;
        const DECLARE   = 1 << 6;

        const ACCESSIBILITY = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        const PARAMETER_PROPERTY = Self::ACCESSIBILITY.bits() | Self::READONLY.bits();
    }
}

impl ModifierFlags {
    /// Map a modifier keyword to its flag.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "public" => Self::PUBLIC,
            "private" => Self::PRIVATE,
            "protected" => Self::PROTECTED,
            "static" => Self::STATIC,
            "readonly" => Self::READONLY,
            "abstract" => Self::ABSTRACT,
            "declare" => Self::DECLARE,
            _ => return None,
        })
    }

    /// The accessibility keyword, if one is set.
    pub fn accessibility(self) -> Option<&'static str> {
        if self.contains(Self::PUBLIC) {
            Some("public")
        } else if self.contains(Self::PRIVATE) {
            Some("private")
        } else if self.contains(Self::PROTECTED) {
            Some("protected")
        } else {
            None
        }
    }
}

/// How the input should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Script,
    Module,
    /// Module if the input contains `import`/`export`, script otherwise.
    Unambiguous,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Script => "script",
            SourceType::Module => "module",
            SourceType::Unambiguous => "unambiguous",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_keywords() {
        let flags = ModifierFlags::from_keyword("private").unwrap() | ModifierFlags::READONLY;
        assert_eq!(flags.accessibility(), Some("private"));
        assert!(ModifierFlags::PARAMETER_PROPERTY.contains(flags));
        assert_eq!(ModifierFlags::from_keyword("async"), None);
    }

    #[test]
    fn test_source_type_names() {
        assert_eq!(SourceType::Module.to_string(), "module");
        assert_eq!(SourceType::default(), SourceType::Script);
    }
}
