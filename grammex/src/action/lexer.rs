//! Lexer for semantic-action text.
//!
//! Action text is written in the engine's host expression language: calls,
//! member access, `$n` references to matched constituents, the `$$` result
//! slot, literals and operators. This module turns that text into [`Token`]s
//! for the [`parser`](super::parser) module and for the token-level
//! [`splice`](super::splice) fallback.
//!
//! # Notes
//! - String and template literals keep their quotes and escapes verbatim so
//!   they are printed back byte for byte.
//! - `new`, `return`, `function`, `typeof`, `instanceof` and `in` are
//!   keywords; every other word, including `null`, `true` and `this`, is an
//!   [`Token::Ident`].
//! - Comments are tokens rather than skipped, so text carrying them never
//!   reaches the expression tree and keeps them on output.
use logos::Logos;
use smartstring::alias::String;
use std::ops::Range;

/// Tokens of the action language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("new")]
    New,

    #[token("return")]
    Return,

    #[token("function")]
    Function,

    #[token("typeof")]
    Typeof,

    #[token("instanceof")]
    Instanceof,

    #[token("in")]
    In,

    /// A matched constituent reference (`$1`, `$2`, ...).
    #[regex(r"\$[0-9]+", |lex| lex.slice()[1..].parse::<usize>().ok())]
    Slot(usize),

    /// The reserved result slot (`$$`).
    #[token("$$")]
    ResultSlot,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| String::from(lex.slice()))]
    Ident(String),

    /// A quoted string literal, quotes included.
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| String::from(lex.slice()))]
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| String::from(lex.slice()))]
    Str(String),

    /// A backquoted template literal, backquotes included.
    #[regex(r"`([^`\\]|\\[^\n])*`", |lex| String::from(lex.slice()))]
    Template(String),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| String::from(lex.slice()))]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| String::from(lex.slice()))]
    Num(String),

    #[regex(r"//[^\n]*", |lex| String::from(lex.slice()))]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| String::from(lex.slice()))]
    Comment(String),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=>")]
    Arrow,

    #[token("=")]
    Assign,
    /// `+=`, `||=`, `>>>=` and the other operator-assignments.
    #[regex(r"(\+|-|\*|\*\*|/|%|<<|>>|>>>|&|\||\^|&&|\|\||\?\?)=", |lex| String::from(lex.slice()))]
    CompoundAssign(String),
    #[token("++")]
    Increment,
    #[token("--")]
    Decrement,
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNe,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("&")]
    BitAnd,
    #[token("|")]
    BitOr,
    #[token("^")]
    BitXor,
    #[token("~")]
    BitNot,
    #[token("!")]
    Not,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
}

/// Position of the first character the lexer could not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub offset: usize,
}

/// Source-level lexer for action text.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(input: &'source str) -> Self {
        Self {
            inner: Token::lexer(input),
        }
    }

    /// Returns the next token, `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        let kind = self.inner.next()?;
        Some(kind.map_err(|()| LexError {
            offset: self.inner.span().start,
        }))
    }

    /// Tokenizes the entire input, recovering after unrecognized characters.
    /// Each item carries its byte range in `input`.
    pub fn spanned(input: &'source str) -> Vec<(Result<Token, LexError>, Range<usize>)> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        while let Some(tok) = lex.next_token() {
            out.push((tok, lex.inner.span()));
        }
        out
    }

    /// Tokenizes the entire input, stopping at the first unrecognized
    /// character.
    pub fn tokenize_all(input: &'source str) -> Result<Vec<Token>, LexError> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        while let Some(tok) = lex.next_token() {
            out.push(tok?);
        }
        Ok(out)
    }
}
