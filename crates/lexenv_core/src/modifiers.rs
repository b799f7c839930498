//! Binding modifier flags.

use std::fmt;

bitflags::bitflags! {
    /// Modifiers attached to a slot when it is declared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const NONE  = 0;
        /// Assignable at most once.
        const FINAL = 1 << 0;
        /// Seeded from a host-provided binding rather than declared in source.
        const HOST  = 1 << 1;
    }
}

impl Modifiers {
    #[inline]
    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }

    /// Parse a single modifier keyword as written in driver traces.
    pub fn from_keyword(word: &str) -> Option<Modifiers> {
        match word {
            "final" => Some(Modifiers::FINAL),
            "host" => Some(Modifiers::HOST),
            _ => None,
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for (keyword, flag) in [("final", Modifiers::FINAL), ("host", Modifiers::HOST)] {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(keyword)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Modifiers::NONE.to_string(), "-");
        assert_eq!(Modifiers::FINAL.to_string(), "final");
        assert_eq!((Modifiers::FINAL | Modifiers::HOST).to_string(), "final host");
    }

    #[test]
    fn test_from_keyword() {
        assert_eq!(Modifiers::from_keyword("final"), Some(Modifiers::FINAL));
        assert_eq!(Modifiers::from_keyword("static"), None);
    }
}
