//! Semantic-action synthesis.
//!
//! Grammar authors write actions as a bare returned expression, e.g.
//! `return Chain($1)`. The [`Synthesizer`] turns that into code the
//! engine's reduce-time evaluator runs directly:
//!
//! 1. a lone `return E` becomes `$$ = E;`,
//! 2. capitalized constructor references are qualified with the action
//!    namespace (`Chain` → `yy.Chain`), except names starting with the
//!    exempt prefix reserved for the host's error type,
//! 3. calls to the position marker receive the line variable as their first
//!    argument (`yy.L(x)` → `yy.L(yylineno, x)`).
//!
//! The text is tokenized and parsed into a small expression tree
//! ([`ast`]), the passes run over the tree, and the tree is printed back.
//! Text outside the tree's grammar (arrow functions, `+=`, comments, ...)
//! gets the same rewrites at the token level, spliced into the original
//! text. Characters the lexer cannot classify are copied through, unless a
//! [`ConstructorRegistry`] is in force, in which case the action is rejected.
//!
//! ```rust
//! # use grammex::Synthesizer;
//! let synth = Synthesizer::default();
//! let code = synth.synthesize("return Chain(L(Literal($1)))").unwrap();
//! assert_eq!(code, "$$ = yy.Chain(yy.L(yylineno, yy.Literal($1)));");
//! ```

pub mod ast;
mod lexer;
mod parser;
mod rewrite;
mod splice;

use crate::{ConstructorRegistry, GrammarError, Symbol};
use ast::Body;
use chumsky::Parser;
use lexer::Lexer;

/// Names the synthesized code relies on in the engine's reduce-time scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthConfig {
    /// Namespace the AST constructors live in.
    pub namespace: Symbol,
    /// Variable holding the line number at reduce time.
    pub line_var: Symbol,
    /// Constructor that stamps a node with its source line.
    pub position_marker: Symbol,
    /// Capitalized names starting with this prefix are host built-ins.
    pub exempt_prefix: Symbol,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            namespace: "yy".into(),
            line_var: "yylineno".into(),
            position_marker: "L".into(),
            exempt_prefix: "Er".into(),
        }
    }
}

impl SynthConfig {
    /// Whether `name` is treated as a constructor reference.
    pub fn is_constructor(&self, name: &str) -> bool {
        name.starts_with(|c: char| c.is_ascii_uppercase())
            && !name.starts_with(self.exempt_prefix.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthConfig,
    registry: Option<ConstructorRegistry>,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Rejects constructor names missing from `registry`.
    pub fn with_registry(mut self, registry: ConstructorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Parses action text without rewriting it.
    pub fn parse(&self, source: &str) -> Option<Body> {
        let tokens = match Lexer::tokenize_all(source) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::debug!("action not tokenizable at offset {}: {:?}", err.offset, source);
                return None;
            }
        };
        parser::body_parser()
            .parse(tokens.as_slice())
            .into_result()
            .ok()
    }

    /// Produces engine-ready action code from author-written action text.
    pub fn synthesize(&self, source: &str) -> Result<String, GrammarError> {
        let Some(mut body) = self.parse(source) else {
            return self.splice(source);
        };
        rewrite::shorthand(&mut body);
        let qualified = rewrite::qualify(&mut body, &self.config, self.registry.as_ref())
            .map_err(|name| GrammarError::UnknownConstructor {
                name,
                action: source.to_owned(),
            })?;
        let tagged = rewrite::inject_position(&mut body, &self.config);
        let code = body.to_string();
        log::trace!(
            "synthesized {:?} -> {:?} ({} qualified, {} tagged)",
            source,
            code,
            qualified,
            tagged
        );
        Ok(code)
    }

    /// Token-level rewriting for text the expression parser rejects.
    fn splice(&self, source: &str) -> Result<String, GrammarError> {
        let mut splicer = splice::Splicer::new(&self.config, self.registry.as_ref());
        let code = splicer
            .body(source)
            .map_err(|name| GrammarError::UnknownConstructor {
                name,
                action: source.to_owned(),
            })?;
        if let Some(offset) = splicer.unreadable {
            if self.registry.is_some() {
                return Err(GrammarError::UnreadableAction {
                    offset,
                    action: source.to_owned(),
                });
            }
            log::debug!("action has unclassified text at offset {}: {:?}", offset, source);
        }
        log::trace!(
            "spliced {:?} -> {:?} ({} qualified, {} tagged)",
            source,
            code,
            splicer.qualified,
            splicer.tagged
        );
        Ok(code)
    }
}
