//! Declared set of AST constructors available to semantic actions.
//!
//! Grammar actions name constructors by their bare, capitalized identifier
//! and the synthesizer qualifies them with the action namespace. A registry
//! turns that naming convention into a checked contract: a synthesizer
//! configured with one refuses to qualify a name the registry lacks.
//!
//! ```rust
//! # use grammex::ConstructorRegistry;
//! let reg: ConstructorRegistry = ["Chain", "Literal", "L"].into_iter().collect();
//! assert!(reg.contains("Chain"));
//! assert!(!reg.contains("Chian"));
//! ```
use crate::symtab::Symtab;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructorRegistry {
    names: Symtab,
}

impl ConstructorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) -> &mut Self {
        self.names.add(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ConstructorRegistry {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_chains_and_keeps_order() {
        let mut reg = ConstructorRegistry::new();
        reg.insert("Op").insert("Chain").insert("Op");
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec!["Op", "Chain"]);
        assert!(!ConstructorRegistry::new().contains("Op"));
    }
}
