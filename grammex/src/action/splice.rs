//! Token-level rewriting for action text the expression tree does not model.
//!
//! Arrow functions, operator-assignments, increments and comments are valid
//! action text, but [`body_parser`](super::parser::body_parser) rejects them.
//! For such text the same three rewrites run over the logos token stream
//! instead: each edit is spliced into the original text, and everything
//! between tokens is copied through byte for byte.
//!
//! The token view agrees with the tree passes on what counts as a candidate:
//! an identifier that is neither a member name (after `.`) nor an object key
//! (`{Key: ...}`), and a marker call is the marker name, bare or as a member,
//! directly followed by `(`.
use super::SynthConfig;
use super::lexer::{LexError, Lexer, Token};
use crate::{ConstructorRegistry, Symbol};
use std::ops::Range;

type Spanned = (Result<Token, LexError>, Range<usize>);

/// Rewrites applied to one action, with their counts.
pub struct Splicer<'a> {
    config: &'a SynthConfig,
    registry: Option<&'a ConstructorRegistry>,
    pub qualified: usize,
    pub tagged: usize,
    /// Offset of the first character the lexer could not classify.
    pub unreadable: Option<usize>,
}

impl<'a> Splicer<'a> {
    pub fn new(config: &'a SynthConfig, registry: Option<&'a ConstructorRegistry>) -> Self {
        Self {
            config,
            registry,
            qualified: 0,
            tagged: 0,
            unreadable: None,
        }
    }

    /// Rewrites a complete action body. A lone `return E` becomes `$$ = E;`;
    /// the rest of the text is qualified and tagged in place.
    pub fn body(&mut self, source: &str) -> Result<String, Symbol> {
        let tokens = Lexer::spanned(source);
        if let Some(expr) = lone_return(&tokens) {
            return Ok(format!("$$ = {};", self.splice(source, expr)?));
        }
        self.splice(source, &tokens)
    }

    /// Rewrites `source` keeping its leading and trailing whitespace.
    fn text(&mut self, source: &str) -> Result<String, Symbol> {
        let tokens = Lexer::spanned(source);
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Ok(source.to_owned());
        };
        let (head, tail) = (&source[..first.1.start], &source[last.1.end..]);
        Ok(format!("{}{}{}", head, self.splice(source, &tokens)?, tail))
    }

    /// Prints `tokens` with their edits, from the first token's start to the
    /// last token's end.
    fn splice(&mut self, source: &str, tokens: &[Spanned]) -> Result<String, Symbol> {
        let mut out = String::with_capacity(source.len());
        let mut copied = tokens.first().map_or(0, |(_, span)| span.start);
        let tok = move |i: usize| tokens.get(i).and_then(|(t, _)| t.as_ref().ok());

        for (i, (token, span)) in tokens.iter().enumerate() {
            out.push_str(&source[copied..span.start]);
            copied = span.end;
            let prev = i.checked_sub(1).and_then(tok);
            match token {
                Err(err) => {
                    self.unreadable.get_or_insert(err.offset);
                    out.push_str(&source[span.clone()]);
                }
                Ok(Token::Ident(name)) if self.is_candidate(name, prev, tok(i + 1)) => {
                    if let Some(registry) = self.registry {
                        if !registry.contains(name) {
                            return Err(name.clone());
                        }
                    }
                    out.push_str(&self.config.namespace);
                    out.push('.');
                    out.push_str(name);
                    self.qualified += 1;
                }
                Ok(Token::LParen) if self.is_marker(prev) => {
                    out.push('(');
                    match tok(i + 1) {
                        Some(Token::Ident(v)) if *v == self.config.line_var => {}
                        Some(Token::RParen) => {
                            out.push_str(&self.config.line_var);
                            self.tagged += 1;
                        }
                        _ => {
                            out.push_str(&self.config.line_var);
                            out.push_str(", ");
                            self.tagged += 1;
                        }
                    }
                }
                Ok(Token::Template(raw)) => out.push_str(&self.template(raw)?),
                Ok(_) => out.push_str(&source[span.clone()]),
            }
        }
        Ok(out)
    }

    fn is_candidate(&self, name: &str, prev: Option<&Token>, next: Option<&Token>) -> bool {
        let member = matches!(prev, Some(Token::Dot));
        let key = matches!(prev, Some(Token::LBrace | Token::Comma))
            && matches!(next, Some(Token::Colon));
        !member && !key && self.config.is_constructor(name)
    }

    fn is_marker(&self, prev: Option<&Token>) -> bool {
        matches!(prev, Some(Token::Ident(name)) if *name == self.config.position_marker)
    }

    /// Rewrites the `${...}` interpolations of a template literal.
    fn template(&mut self, raw: &str) -> Result<String, Symbol> {
        let bytes = raw.as_bytes();
        let mut out = String::with_capacity(raw.len());
        let (mut i, mut copied) = (0, 0);
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    let start = i + 2;
                    let Some(end) = closing_brace(&bytes[start..]).map(|n| start + n) else {
                        break;
                    };
                    out.push_str(&raw[copied..start]);
                    out.push_str(&self.text(&raw[start..end])?);
                    copied = end;
                    i = end + 1;
                }
                _ => i += 1,
            }
        }
        out.push_str(&raw[copied..]);
        Ok(out)
    }
}

/// Offset of the `}` closing an interpolation whose `{` precedes `bytes`.
fn closing_brace(bytes: &[u8]) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// The returned expression's tokens, if `tokens` is one `return E` with an
/// optional trailing `;` and nothing else that could end or nest a statement.
fn lone_return(tokens: &[Spanned]) -> Option<&[Spanned]> {
    let [(Ok(Token::Return), _), rest @ ..] = tokens else {
        return None;
    };
    let expr = match rest {
        [init @ .., (Ok(Token::Semi), _)] => init,
        _ => rest,
    };
    let nested = expr.iter().any(|(t, _)| {
        matches!(
            t,
            Ok(Token::Return | Token::Function | Token::Semi | Token::Comment(_))
        )
    });
    (!expr.is_empty() && !nested).then_some(expr)
}
