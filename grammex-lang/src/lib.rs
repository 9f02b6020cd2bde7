//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! # grammex-lang
//!
//! The complete syntax of an indentation-based scripting language
//! (expressions, statements, control flow, classes, literals) declared with
//! [`grammex`]. Building it yields the [`GrammarDescriptor`] a parser
//! generator turns into the language's parser.
//!
//! - [`grammar::declare`] declares every nonterminal, in order.
//! - [`grammar::operators`] is the eleven-level precedence table.
//! - [`grammar::CONSTRUCTORS`] lists the AST constructors actions may call.
//!
//! ```rust
//! use grammex::SynthConfig;
//!
//! let grammar = grammex_lang::build(SynthConfig::default(), true)?;
//! assert_eq!(grammar.start_symbol(), "Root");
//! assert!(grammar.terminals().contains("INDENT"));
//! # Ok::<(), grammex::GrammarError>(())
//! ```
//!
//! [`GrammarDescriptor`]: grammex::GrammarDescriptor

pub mod grammar;

pub use grammar::{CONSTRUCTORS, START, build, operators};
