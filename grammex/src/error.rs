//! # Grammar Error Type
//!
//! [`GrammarError`] is the single error surface of the grammar compiler. Rule
//! declaration itself is permissive; the only failures raised while rules are
//! being compiled come from the constructor registry. Everything else is found by
//! the consistency pass that runs when the descriptor is assembled.
use crate::Symbol;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// An action references a constructor the registry does not provide.
    #[error("unknown constructor {name:?} in action {action:?}")]
    UnknownConstructor {
        /// Bare constructor name, before qualification.
        name: Symbol,
        /// Action text as written by the grammar author.
        action: String,
    },

    /// An action holds characters the action lexer cannot classify, so its
    /// constructor references cannot be checked against the registry.
    #[error("unreadable action text at offset {offset}: {action:?}")]
    UnreadableAction { offset: usize, action: String },

    /// A nonterminal was declared without any alternatives.
    #[error("nonterminal {name:?} has no alternatives")]
    EmptyNonterminal { name: Symbol },

    /// A pattern symbol is neither a nonterminal nor a collected terminal.
    #[error("symbol {symbol:?} used by {nonterminal:?} is not defined")]
    UndefinedSymbol { symbol: Symbol, nonterminal: Symbol },

    /// The terminal set handed to the assembler names a nonterminal.
    #[error("terminal {symbol:?} is also declared as a nonterminal")]
    TerminalIsNonterminal { symbol: Symbol },

    /// The terminal set handed to the assembler names a symbol no pattern
    /// uses.
    #[error("terminal {symbol:?} appears in no rule pattern")]
    UnusedTerminal { symbol: Symbol },

    /// The start nonterminal reuses the name of an existing grammar symbol.
    #[error("start symbol {name:?} clashes with an existing grammar symbol")]
    StartSymbolClash { name: Symbol },

    /// A terminal occurs in more than one precedence group.
    #[error("terminal {terminal:?} appears in precedence groups {first} and {second}")]
    DuplicatePrecedence {
        terminal: Symbol,
        /// 1-based level of the first group.
        first: usize,
        /// 1-based level of the conflicting group.
        second: usize,
    },

    /// A precedence group names a nonterminal.
    #[error("precedence declared for nonterminal {symbol:?}")]
    PrecedenceOnNonterminal { symbol: Symbol },

    /// A rule's `prec` override names a terminal the operator table lacks.
    #[error("rule {rule} of {nonterminal:?} takes precedence of {terminal:?}, which has none")]
    UnknownPrecedence {
        nonterminal: Symbol,
        /// 0-based alternative index.
        rule: usize,
        terminal: Symbol,
    },
}
