//! Insertion-ordered symbol table.
//!
//! Grammar symbols are compared by name only. The table hands out stable
//! indices in first-insertion order, which is what every derived enumeration
//! (terminals, reachable nonterminals, registered constructors) relies on to
//! stay reproducible across runs.

use indexmap::IndexSet;

/// An atomic grammar name, terminal or nonterminal. Case-sensitive.
pub type Symbol = smartstring::alias::String;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Symtab {
    set: IndexSet<Symbol>,
}

impl Symtab {
    pub fn new() -> Self {
        Self {
            set: IndexSet::new(),
        }
    }

    /// Interns `sym` and returns its index. Re-adding a known symbol returns
    /// the original index and leaves the order untouched.
    pub fn add(&mut self, sym: &str) -> usize {
        if let Some(idx) = self.set.get_index_of(sym) {
            return idx;
        }
        self.set.insert_full(Symbol::from(sym)).0
    }

    pub fn contains(&self, sym: &str) -> bool {
        self.set.contains(sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.set.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Symtab {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tab = Symtab::new();
        for sym in iter {
            tab.add(sym);
        }
        tab
    }
}

impl<'a> Extend<&'a str> for Symtab {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for sym in iter {
            self.add(sym);
        }
    }
}
