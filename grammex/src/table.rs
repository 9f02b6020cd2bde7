//! # Grammar Table
//!
//! [`GrammarTable`] maps each nonterminal to its ordered alternatives and
//! remembers the order nonterminals were first declared in. Terminal
//! extraction and serialization walk it in that order.
//!
//! [`GrammarBuilder`] is the declaration front end: it owns the synthesizer
//! and the [`LastAction`] accumulator, so a ditto in one `define` call can
//! reuse the action compiled at the end of the previous one.
use crate::descriptor::{GrammarDescriptor, StartRule};
use crate::rule::{LastAction, Rule, RuleDecl, compile_rules};
use crate::{GrammarError, OperatorTable, Symbol, Synthesizer};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarTable {
    rules: IndexMap<Symbol, Vec<Rule>>,
}

impl GrammarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rules` to `name`'s alternatives, declaring it if new.
    pub fn push(&mut self, name: &str, rules: impl IntoIterator<Item = Rule>) {
        self.rules.entry(Symbol::from(name)).or_default().extend(rules);
    }

    pub fn get(&self, name: &str) -> Option<&[Rule]> {
        self.rules.get(name).map(Vec::as_slice)
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Nonterminals with their alternatives, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }

    /// Number of nonterminals.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Every pattern symbol in declaration order, repeats included.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rules
            .values()
            .flatten()
            .flat_map(|r| r.pattern.iter().map(|s| s.as_str()))
    }
}

/// A rule serializes as `[pattern, action]`, or `[pattern, action, options]`
/// when it carries options.
impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.options.is_empty() { 2 } else { 3 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.pattern_str())?;
        seq.serialize_element(&self.action)?;
        if !self.options.is_empty() {
            seq.serialize_element(&self.options)?;
        }
        seq.end()
    }
}

impl Serialize for GrammarTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (name, rules) in &self.rules {
            map.serialize_entry(name.as_str(), rules)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    synth: Synthesizer,
    table: GrammarTable,
    last: LastAction,
}

impl GrammarBuilder {
    pub fn new(synth: Synthesizer) -> Self {
        Self {
            synth,
            table: GrammarTable::new(),
            last: LastAction::default(),
        }
    }

    /// Compiles `decls` in order and appends them to `name`.
    ///
    /// On error nothing is appended and the accumulator is left as it was.
    pub fn define(
        &mut self,
        name: &str,
        decls: impl IntoIterator<Item = RuleDecl>,
    ) -> Result<&mut Self, GrammarError> {
        let (rules, last) = compile_rules(&self.synth, self.last.clone(), decls)?;
        log::debug!("{}: {} alternatives", name, rules.len());
        self.table.push(name, rules);
        self.last = last;
        Ok(self)
    }

    pub fn table(&self) -> &GrammarTable {
        &self.table
    }

    pub fn finish(self) -> GrammarTable {
        self.table
    }

    /// Extracts terminals and assembles the descriptor.
    pub fn assemble(
        self,
        operators: OperatorTable,
        start: StartRule,
    ) -> Result<GrammarDescriptor, GrammarError> {
        let table = self.finish();
        let terminals = crate::terminals::extract(&table);
        GrammarDescriptor::assemble(table, terminals, operators, start)
    }
}
