//! Operator precedence and associativity.
//!
//! An [`OperatorTable`] is an ordered list of [`PrecGroup`]s, lowest binding
//! power first. The table is handed to the parsing engine as is; it resolves
//! shift/reduce conflicts between rules whose precedence terminal (see
//! [`Rule::precedence_symbol`](crate::Rule::precedence_symbol)) belongs to a
//! group.
//!
//! ```rust
//! # use grammex::{Assoc, OperatorTable};
//! let ops = OperatorTable::new()
//!     .left(["+", "-"])
//!     .left(["MATH"])
//!     .right(["UNARY"]);
//! let p = ops.lookup("MATH").unwrap();
//! assert_eq!((p.level, p.assoc), (2, Assoc::Left));
//! assert!(ops.lookup("UNARY").unwrap().level > ops.lookup("+").unwrap().level);
//! ```
use crate::Symbol;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// Operator associativity classification.
///
/// | Variant | Description |
/// |----------|--------------|
/// | [`Assoc::Left`]  | Left-associative, groups from left to right. |
/// | [`Assoc::Right`] | Right-associative, groups from right to left. |
/// | [`Assoc::NonAssoc`] | Cannot chain with itself. |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Assoc {
    Left = 0,
    Right = 1,
    NonAssoc = 2,
}

impl Assoc {
    /// Names used by the engine's operator declarations.
    pub const STRS: &[&str] = &["left", "right", "nonassoc"];

    pub fn as_str(self) -> &'static str {
        Self::STRS[self as usize]
    }
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminals sharing one precedence level and associativity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecGroup {
    pub assoc: Assoc,
    pub terminals: Vec<Symbol>,
}

/// Serialized as `[assoc, terminal, ...]`.
impl Serialize for PrecGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.terminals.len() + 1))?;
        seq.serialize_element(self.assoc.as_str())?;
        for t in &self.terminals {
            seq.serialize_element(t.as_str())?;
        }
        seq.end()
    }
}

/// Resolved precedence of one terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    /// 1-based; higher binds tighter.
    pub level: usize,
    pub assoc: Assoc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperatorTable {
    groups: Vec<PrecGroup>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group binding tighter than every group declared so far.
    pub fn group<'a>(mut self, assoc: Assoc, terminals: impl IntoIterator<Item = &'a str>) -> Self {
        self.groups.push(PrecGroup {
            assoc,
            terminals: terminals.into_iter().map(Symbol::from).collect(),
        });
        self
    }

    pub fn left<'a>(self, terminals: impl IntoIterator<Item = &'a str>) -> Self {
        self.group(Assoc::Left, terminals)
    }

    pub fn right<'a>(self, terminals: impl IntoIterator<Item = &'a str>) -> Self {
        self.group(Assoc::Right, terminals)
    }

    pub fn nonassoc<'a>(self, terminals: impl IntoIterator<Item = &'a str>) -> Self {
        self.group(Assoc::NonAssoc, terminals)
    }

    pub fn groups(&self) -> &[PrecGroup] {
        &self.groups
    }

    /// Precedence of the first group declaring `terminal`.
    pub fn lookup(&self, terminal: &str) -> Option<Precedence> {
        self.groups
            .iter()
            .position(|g| g.terminals.iter().any(|t| t == terminal))
            .map(|i| Precedence {
                level: i + 1,
                assoc: self.groups[i].assoc,
            })
    }

    /// Every terminal with its 1-based level, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.terminals.iter().map(move |t| (t.as_str(), i + 1)))
    }

    /// Terminals declared more than once, as `(terminal, first, second)`
    /// levels. A terminal repeated within one group reports the same level
    /// twice.
    pub fn duplicates(&self) -> Vec<(Symbol, usize, usize)> {
        let mut seen: Vec<(&str, usize)> = Vec::new();
        let mut dups = Vec::new();
        for (t, level) in self.iter() {
            match seen.iter().find(|(s, _)| *s == t) {
                Some(&(_, first)) => dups.push((Symbol::from(t), first, level)),
                None => seen.push((t, level)),
            }
        }
        dups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OperatorTable {
        OperatorTable::new()
            .right(["POST_IF", "FOR"])
            .nonassoc(["INDENT", "OUTDENT"])
            .left(["LOGIC"])
            .right(["UNARY"])
    }

    #[test]
    fn assoc_prints_engine_names() {
        let all = [Assoc::Left, Assoc::Right, Assoc::NonAssoc];
        let names: Vec<_> = all.iter().map(|a| a.to_string()).collect();
        assert_eq!(names, Assoc::STRS);
    }

    #[test]
    fn lookup_levels_start_at_one() {
        let ops = sample();
        assert_eq!(
            ops.lookup("FOR"),
            Some(Precedence {
                level: 1,
                assoc: Assoc::Right
            })
        );
        assert_eq!(ops.lookup("OUTDENT").unwrap().assoc, Assoc::NonAssoc);
        assert_eq!(ops.lookup("UNARY").unwrap().level, 4);
        assert_eq!(ops.lookup("MATH"), None);
    }

    #[test]
    fn duplicates_report_both_levels() {
        let ops = sample().left(["LOGIC", "MATH"]);
        assert_eq!(ops.duplicates(), vec![(Symbol::from("LOGIC"), 3, 5)]);
        assert!(sample().duplicates().is_empty());
    }

    #[test]
    fn serializes_as_engine_operator_list() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[["right","POST_IF","FOR"],["nonassoc","INDENT","OUTDENT"],["left","LOGIC"],["right","UNARY"]]"#
        );
    }
}
