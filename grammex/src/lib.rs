//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Grammar rule compiler.
//!
//! `grammex` turns condensed `pattern → action` declarations into the inputs
//! an LALR-style parser generator expects:
//!  * a **grammar table**: nonterminal → ordered alternatives, each with
//!    synthesized action code ([`GrammarBuilder`], [`rule!`]),
//!  * the **terminal vocabulary**, inferred from the patterns
//!    ([`terminals::extract`]),
//!  * an **operator precedence table** ([`OperatorTable`]),
//!  * and a designated **start rule** ([`StartRule`]),
//!
//! frozen together, after a consistency check, into a [`GrammarDescriptor`].
//!
//! ```rust
//! use grammex::{GrammarBuilder, OperatorTable, StartRule, rule};
//!
//! let mut b = GrammarBuilder::default();
//! b.define("Exprs", [
//!     rule!("X Y", "return Foo($1, $2)"),
//!     rule!("X Z", ditto),
//! ])?;
//! let grammar = b.assemble(OperatorTable::new(), StartRule::new("Root", "Exprs", "return $$"))?;
//!
//! let rules = grammar.table().get("Exprs").unwrap();
//! assert_eq!(rules[1].action, "$$ = yy.Foo($1, $2);");
//! assert_eq!(grammar.terminals().joined(), "X Y Z");
//! # Ok::<(), grammex::GrammarError>(())
//! ```

pub mod action;
pub mod descriptor;
pub mod error;
pub mod oper;
pub mod registry;
pub mod rule;
pub mod symtab;
pub mod table;
pub mod terminals;

pub use action::{SynthConfig, Synthesizer};
pub use descriptor::{GrammarDescriptor, StartRule};
pub use error::GrammarError;
pub use oper::{Assoc, OperatorTable, PrecGroup, Precedence};
pub use registry::ConstructorRegistry;
pub use rule::{
    ActionSrc, LastAction, Pattern, Rule, RuleDecl, RuleOptions, compile_rule, compile_rules,
};
pub use symtab::{Symbol, Symtab};
pub use table::{GrammarBuilder, GrammarTable};
pub use terminals::TerminalSet;
