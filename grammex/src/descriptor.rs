//! # Grammar Assembler
//!
//! [`GrammarDescriptor::assemble`] freezes the completed [`GrammarTable`], its
//! [`TerminalSet`], the [`OperatorTable`] and a [`StartRule`] into the single
//! bundle handed to the parsing engine. Before freezing, it checks that the
//! four parts agree with one another; a grammar that would only fail later,
//! at table-construction time, is rejected here with a [`GrammarError`].
//!
//! The descriptor serializes to the engine's JSON grammar format:
//!
//! ```text
//! {"bnf": {NT: [[pattern, action], [pattern, action, {"prec": T}], ...], ...},
//!  "operators": [[assoc, T, ...], ...],
//!  "tokens": "T1 T2 ...",
//!  "startSymbol": S}
//! ```
use crate::{
    GrammarError, GrammarTable, OperatorTable, Precedence, Rule, Symbol, Symtab, TerminalSet,
};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::io::{self, Write};

/// The synthetic top rule wrapping the grammar's top-level construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRule {
    pub name: Symbol,
    pub rule: Rule,
}

impl StartRule {
    /// `action` is used as written; the engine's completion signal usually
    /// needs its own syntax (`return $$`), so it is never synthesized.
    pub fn new(name: &str, pattern: &str, action: &str) -> Self {
        Self {
            name: name.into(),
            rule: Rule::raw(pattern, action),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarDescriptor {
    table: GrammarTable,
    terminals: TerminalSet,
    operators: OperatorTable,
    start: Symbol,
}

impl GrammarDescriptor {
    pub fn assemble(
        mut table: GrammarTable,
        terminals: TerminalSet,
        operators: OperatorTable,
        start: StartRule,
    ) -> Result<Self, GrammarError> {
        check(&table, &terminals, &operators, &start)?;
        warn_unused(&table, &terminals, &operators, &start);
        log::debug!(
            "assembled grammar: {} nonterminals, {} rules, {} terminals, {} precedence levels",
            table.len() + 1,
            table.rule_count() + 1,
            terminals.len(),
            operators.len()
        );
        table.push(&start.name, [start.rule]);
        Ok(Self {
            table,
            terminals,
            operators,
            start: start.name,
        })
    }

    /// The rule table, start rule last.
    pub fn table(&self) -> &GrammarTable {
        &self.table
    }

    pub fn terminals(&self) -> &TerminalSet {
        &self.terminals
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// Precedence the engine assigns to alternative `index` of `nonterminal`,
    /// if any.
    pub fn rule_precedence(&self, nonterminal: &str, index: usize) -> Option<Precedence> {
        let rule = self.table.get(nonterminal)?.get(index)?;
        let sym = rule.precedence_symbol(self.terminals.as_symtab())?;
        self.operators.lookup(sym)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes a line-oriented dump of the descriptor.
    ///
    /// # Output Format
    /// ```text
    /// PS,<number of rules>
    ///
    /// P,<index>,<LHS> -> <RHS symbols> [%prec <T>]
    ///
    /// TS,<number of terminals>
    ///
    /// T,<index>,<terminal>
    ///
    /// OS,<number of levels>
    ///
    /// O,<level>,<assoc>,<terminals>
    /// ```
    pub fn write_listing<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "PS,{}\n", self.table.rule_count())?;
        let rules = self
            .table
            .iter()
            .flat_map(|(lhs, rules)| rules.iter().map(move |r| (lhs, r)));
        for (i, (lhs, rule)) in rules.enumerate() {
            write!(out, "P,{},{} ->", i, lhs)?;
            for sym in &rule.pattern {
                write!(out, " {}", sym)?;
            }
            if let Some(prec) = &rule.options.prec {
                write!(out, " %prec {}", prec)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "\nTS,{}\n", self.terminals.len())?;
        for (i, t) in self.terminals.iter().enumerate() {
            writeln!(out, "T,{},{}", i, t)?;
        }
        writeln!(out, "\nOS,{}\n", self.operators.len())?;
        for (i, group) in self.operators.groups().iter().enumerate() {
            writeln!(out, "O,{},{},{}", i + 1, group.assoc, group.terminals.join(" "))?;
        }
        Ok(())
    }
}

impl Serialize for GrammarDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("GrammarDescriptor", 4)?;
        s.serialize_field("bnf", &self.table)?;
        s.serialize_field("operators", &self.operators)?;
        s.serialize_field("tokens", &self.terminals)?;
        s.serialize_field("startSymbol", self.start.as_str())?;
        s.end()
    }
}

fn check(
    table: &GrammarTable,
    terminals: &TerminalSet,
    operators: &OperatorTable,
    start: &StartRule,
) -> Result<(), GrammarError> {
    if table.is_nonterminal(&start.name) || terminals.contains(&start.name) {
        return Err(GrammarError::StartSymbolClash {
            name: start.name.clone(),
        });
    }
    if let Some(t) = terminals.iter().find(|t| table.is_nonterminal(t)) {
        return Err(GrammarError::TerminalIsNonterminal { symbol: t.into() });
    }
    let used: Symtab = all_rules(table, start)
        .flat_map(|(_, r)| r.pattern.iter().map(|s| s.as_str()))
        .collect();
    if let Some(t) = terminals.iter().find(|t| !used.contains(t)) {
        return Err(GrammarError::UnusedTerminal { symbol: t.into() });
    }
    let defined = |s: &str| table.is_nonterminal(s) || terminals.contains(s);
    for (nt, rule) in all_rules(table, start) {
        if let Some(sym) = rule.pattern.iter().find(|s| !defined(s)) {
            return Err(GrammarError::UndefinedSymbol {
                symbol: sym.clone(),
                nonterminal: nt.into(),
            });
        }
    }
    if let Some((name, _)) = table.iter().find(|(_, rules)| rules.is_empty()) {
        return Err(GrammarError::EmptyNonterminal { name: name.into() });
    }
    if let Some((terminal, first, second)) = operators.duplicates().into_iter().next() {
        return Err(GrammarError::DuplicatePrecedence {
            terminal,
            first,
            second,
        });
    }
    if let Some((t, _)) = operators.iter().find(|(t, _)| table.is_nonterminal(t)) {
        return Err(GrammarError::PrecedenceOnNonterminal { symbol: t.into() });
    }
    for (nt, rules) in table.iter() {
        for (i, rule) in rules.iter().enumerate() {
            if let Some(prec) = &rule.options.prec {
                if operators.lookup(prec).is_none() {
                    return Err(GrammarError::UnknownPrecedence {
                        nonterminal: nt.into(),
                        rule: i,
                        terminal: prec.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Every rule paired with its nonterminal, start rule last.
fn all_rules<'a>(
    table: &'a GrammarTable,
    start: &'a StartRule,
) -> impl Iterator<Item = (&'a str, &'a Rule)> {
    table
        .iter()
        .flat_map(|(nt, rules)| rules.iter().map(move |r| (nt, r)))
        .chain(std::iter::once((start.name.as_str(), &start.rule)))
}

/// Reports nonterminals the start rule cannot reach and precedence entries
/// no rule can use. The engine tolerates both.
fn warn_unused(
    table: &GrammarTable,
    terminals: &TerminalSet,
    operators: &OperatorTable,
    start: &StartRule,
) {
    let mut reachable = Symtab::new();
    let mut queue: Vec<&str> = start.rule.pattern.iter().map(|s| s.as_str()).collect();
    while let Some(sym) = queue.pop() {
        if reachable.contains(sym) {
            continue;
        }
        reachable.add(sym);
        for rule in table.get(sym).unwrap_or_default() {
            queue.extend(rule.pattern.iter().map(|s| s.as_str()));
        }
    }
    for nt in table.nonterminals().filter(|nt| !reachable.contains(nt)) {
        log::warn!("nonterminal {} is unreachable from {}", nt, start.name);
    }

    let overrides: Symtab = table
        .iter()
        .flat_map(|(_, rules)| rules.iter())
        .filter_map(|r| r.options.prec.as_deref())
        .collect();
    for (t, level) in operators.iter() {
        if !terminals.contains(t) && !overrides.contains(t) {
            log::warn!("precedence level {} names unused terminal {}", level, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Assoc, GrammarBuilder, RuleDecl, rule, terminals};

    fn builder() -> GrammarBuilder {
        let mut b = GrammarBuilder::default();
        b.define("Body", [rule!("Line"), rule!("Body TERMINATOR Line", "return $1.push($3)")])
            .unwrap()
            .define(
                "Line",
                [
                    rule!("Expression"),
                    rule!("Expression MATH Expression", "return Op($2, $1, $3)"),
                    rule!("UNARY Expression", "return Op($1, $2)", prec = "UNARY"),
                ],
            )
            .unwrap()
            .define("Expression", [rule!("NUMBER", "return Literal($1)")])
            .unwrap();
        b
    }

    fn ops() -> OperatorTable {
        OperatorTable::new().left(["MATH"]).right(["UNARY"])
    }

    fn root() -> StartRule {
        StartRule::new("Root", "Body", "return $$")
    }

    fn assemble(b: GrammarBuilder, ops: OperatorTable) -> Result<GrammarDescriptor, GrammarError> {
        b.assemble(ops, root())
    }

    #[test]
    fn start_rule_is_appended_after_extraction() {
        let d = assemble(builder(), ops()).unwrap();
        assert_eq!(d.start_symbol(), "Root");
        assert_eq!(d.table().nonterminals().last(), Some("Root"));
        assert_eq!(d.table().get("Root").unwrap()[0].action, "return $$");
        assert_eq!(d.terminals().joined(), "TERMINATOR MATH UNARY NUMBER");
    }

    #[test]
    fn rule_precedence_follows_rightmost_terminal_or_override() {
        let d = assemble(builder(), ops()).unwrap();
        assert_eq!(d.rule_precedence("Line", 1).map(|p| p.level), Some(1));
        let p = d.rule_precedence("Line", 2).unwrap();
        assert_eq!((p.level, p.assoc), (2, Assoc::Right));
        assert_eq!(d.rule_precedence("Line", 0), None);
        assert_eq!(d.rule_precedence("Body", 1), None);
    }

    #[test]
    fn serializes_to_engine_json() {
        let mut b = GrammarBuilder::default();
        b.define("Body", [rule!("Body UNARY", "return Op($2, $1)", prec = "UNARY"), rule!("")])
            .unwrap();
        let d = b
            .assemble(OperatorTable::new().right(["UNARY"]), root())
            .unwrap();
        assert_eq!(
            d.to_json().unwrap(),
            concat!(
                r#"{"bnf":{"Body":[["Body UNARY","$$ = yy.Op($2, $1);",{"prec":"UNARY"}],["",""]],"#,
                r#""Root":[["Body","return $$"]]},"#,
                r#""operators":[["right","UNARY"]],"tokens":"UNARY","startSymbol":"Root"}"#
            )
        );
    }

    #[test]
    fn listing_has_all_sections() {
        let d = assemble(builder(), ops()).unwrap();
        let mut buf = Vec::new();
        d.write_listing(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("PS,7\n\nP,0,Body -> Line\n"));
        assert!(text.contains("P,4,Line -> UNARY Expression %prec UNARY\n"));
        assert!(text.contains("P,6,Root -> Body\n"));
        assert!(text.contains("TS,4\n\nT,0,TERMINATOR\n"));
        assert!(text.ends_with("OS,2\n\nO,1,left,MATH\nO,2,right,UNARY\n"));
    }

    #[test]
    fn start_name_must_be_fresh() {
        let err = builder()
            .assemble(ops(), StartRule::new("Line", "Body", "return $$"))
            .unwrap_err();
        assert_eq!(err, GrammarError::StartSymbolClash { name: "Line".into() });
        let err = builder()
            .assemble(ops(), StartRule::new("Root", "Program", "return $$"))
            .unwrap_err();
        assert_eq!(
            err,
            GrammarError::UndefinedSymbol {
                symbol: "Program".into(),
                nonterminal: "Root".into()
            }
        );
    }

    #[test]
    fn foreign_terminal_sets_are_checked() {
        let table = builder().finish();
        let bogus: TerminalSet = ["MATH", "Line"].into_iter().collect();
        let err = GrammarDescriptor::assemble(table.clone(), bogus, ops(), root()).unwrap_err();
        assert_eq!(err, GrammarError::TerminalIsNonterminal { symbol: "Line".into() });

        let padded: TerminalSet = ["TERMINATOR", "MATH", "COMMA", "UNARY", "NUMBER"]
            .into_iter()
            .collect();
        let err = GrammarDescriptor::assemble(table.clone(), padded, ops(), root()).unwrap_err();
        assert_eq!(err, GrammarError::UnusedTerminal { symbol: "COMMA".into() });

        let partial: TerminalSet = ["MATH", "UNARY", "NUMBER"].into_iter().collect();
        let err = GrammarDescriptor::assemble(table, partial, ops(), root()).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UndefinedSymbol {
                symbol: "TERMINATOR".into(),
                nonterminal: "Body".into()
            }
        );
    }

    #[test]
    fn empty_nonterminal_is_rejected() {
        let mut table = builder().finish();
        table.push("Dangling", Vec::<Rule>::new());
        let terms = terminals::extract(&table);
        let err = GrammarDescriptor::assemble(table, terms, ops(), root()).unwrap_err();
        assert_eq!(err, GrammarError::EmptyNonterminal { name: "Dangling".into() });
    }

    #[test]
    fn precedence_table_is_checked() {
        let err = assemble(builder(), ops().left(["MATH"])).unwrap_err();
        assert_eq!(
            err,
            GrammarError::DuplicatePrecedence {
                terminal: "MATH".into(),
                first: 1,
                second: 3
            }
        );
        let err = assemble(builder(), ops().left(["Expression"])).unwrap_err();
        assert_eq!(
            err,
            GrammarError::PrecedenceOnNonterminal { symbol: "Expression".into() }
        );
        let err = assemble(builder(), OperatorTable::new().left(["MATH"])).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownPrecedence {
                nonterminal: "Line".into(),
                rule: 2,
                terminal: "UNARY".into()
            }
        );
    }

    #[test]
    fn unreachable_and_unused_are_not_errors() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut b = builder();
        b.define("Orphan", [RuleDecl::new("NUMBER")]).unwrap();
        let d = assemble(b, ops().nonassoc(["POST_IF"])).unwrap();
        assert!(d.table().is_nonterminal("Orphan"));
    }
}
