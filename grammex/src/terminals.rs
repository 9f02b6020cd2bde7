//! Terminal extraction.
//!
//! Terminals are never declared. A terminal is any pattern symbol that is
//! not a nonterminal of the completed table. The walk goes nonterminal
//! declaration order, then rule order, then pattern position, keeping only
//! the first occurrence of each symbol, so the enumeration handed to the
//! engine is identical from run to run.
use crate::{GrammarTable, Symtab};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSet {
    symtab: Symtab,
}

impl TerminalSet {
    pub fn contains(&self, sym: &str) -> bool {
        self.symtab.contains(sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symtab.iter()
    }

    pub fn len(&self) -> usize {
        self.symtab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symtab.is_empty()
    }

    pub fn as_symtab(&self) -> &Symtab {
        &self.symtab
    }

    /// The engine's token declaration: names joined by single spaces.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl<'a> FromIterator<&'a str> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            symtab: iter.into_iter().collect(),
        }
    }
}

impl Serialize for TerminalSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.joined())
    }
}

/// Collects the terminal vocabulary of a fully populated table.
pub fn extract(table: &GrammarTable) -> TerminalSet {
    let terminals: TerminalSet = table
        .symbols()
        .filter(|s| !table.is_nonterminal(s))
        .collect();
    log::debug!(
        "extracted {} terminals from {} nonterminals",
        terminals.len(),
        table.len()
    );
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("terminals: {}", terminals.joined());
    }
    terminals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GrammarBuilder, rule};

    fn table() -> GrammarTable {
        let mut b = GrammarBuilder::default();
        b.define(
            "Chain",
            [
                rule!("Identifier", "return Chain($1)"),
                rule!("Chain DOT Key", "return $1.add(Key($3))"),
                rule!("Chain DOT List", ditto),
            ],
        )
        .unwrap();
        b.define("List", [rule!("[ ]"), rule!("[ ArgList ]")]).unwrap();
        b.define("ArgList", [rule!("Identifier"), rule!("ArgList , Identifier")])
            .unwrap();
        b.finish()
    }

    #[test]
    fn first_occurrence_order_without_nonterminals() {
        let t = extract(&table());
        assert_eq!(
            t.iter().collect::<Vec<_>>(),
            vec!["Identifier", "DOT", "Key", "[", "]", ","]
        );
        assert_eq!(t.joined(), "Identifier DOT Key [ ] ,");
    }

    #[test]
    fn partition_covers_every_pattern_symbol() {
        let table = table();
        let t = extract(&table);
        for nt in table.nonterminals() {
            assert!(!t.contains(nt));
        }
        for sym in table.symbols() {
            assert!(t.contains(sym) ^ table.is_nonterminal(sym), "{sym}");
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        assert_eq!(extract(&table()), extract(&table()));
        assert!(extract(&GrammarTable::new()).is_empty());
    }
}
