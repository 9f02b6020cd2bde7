//! # Rule Builder
//!
//! Compiles one condensed `pattern [, action] [, prec = T]` declaration into
//! a canonical [`Rule`].
//!
//! Actions may repeat the most recently compiled action ([`ActionSrc::Ditto`]).
//! The "last compiled action" is carried explicitly as a [`LastAction`]
//! accumulator that each compilation step consumes and returns, so
//! declaration order alone decides what a ditto resolves to.
//!
//! ```rust
//! # use grammex::{compile_rules, rule, LastAction, Synthesizer};
//! let synth = Synthesizer::default();
//! let (rules, _) = compile_rules(
//!     &synth,
//!     LastAction::default(),
//!     [rule!("X Y", "return Foo($1, $2)"), rule!("X Z", ditto)],
//! )
//! .unwrap();
//! assert_eq!(rules[1].action, "$$ = yy.Foo($1, $2);");
//! assert_eq!(rules[0].action, rules[1].action);
//! ```
use crate::{GrammarError, Symbol, Symtab, Synthesizer};
use serde::Serialize;

/// An ordered sequence of symbols. Empty for an epsilon rule.
pub type Pattern = Vec<Symbol>;

/// Where a rule's action comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionSrc {
    /// No action: compiles to empty text and resets the accumulator.
    #[default]
    None,
    /// Reuse the last compiled action verbatim.
    Ditto,
    /// Author-written action text, run through the synthesizer.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RuleOptions {
    /// Terminal whose precedence this rule takes instead of its rightmost
    /// terminal's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prec: Option<Symbol>,
}

impl RuleOptions {
    pub fn is_empty(&self) -> bool {
        self.prec.is_none()
    }
}

/// A rule as the author declares it, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub pattern: String,
    pub action: ActionSrc,
    pub options: RuleOptions,
}

impl RuleDecl {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action: ActionSrc::None,
            options: RuleOptions::default(),
        }
    }

    pub fn action(mut self, text: impl Into<String>) -> Self {
        self.action = ActionSrc::Text(text.into());
        self
    }

    pub fn ditto(mut self) -> Self {
        self.action = ActionSrc::Ditto;
        self
    }

    pub fn prec(mut self, terminal: &str) -> Self {
        self.options.prec = Some(terminal.into());
        self
    }
}

/// One compiled alternative of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Pattern,
    /// Engine-ready action code; empty for "no special action".
    pub action: String,
    pub options: RuleOptions,
}

impl Rule {
    /// A rule whose action is used as written, bypassing synthesis.
    pub fn raw(pattern: &str, action: impl Into<String>) -> Self {
        Self {
            pattern: split_pattern(pattern),
            action: action.into(),
            options: RuleOptions::default(),
        }
    }

    /// Pattern rendered the way the engine expects it: space-joined.
    pub fn pattern_str(&self) -> String {
        self.pattern.join(" ")
    }

    /// The terminal that decides this rule's precedence: the explicit `prec`
    /// option, otherwise the rightmost pattern symbol in `terminals`.
    pub fn precedence_symbol<'a>(&'a self, terminals: &Symtab) -> Option<&'a str> {
        if let Some(prec) = &self.options.prec {
            return Some(prec.as_str());
        }
        self.pattern
            .iter()
            .rev()
            .find(|s| terminals.contains(s))
            .map(|s| s.as_str())
    }
}

/// The most recently compiled action, threaded through rule compilation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastAction(String);

impl LastAction {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split_pattern(pattern: &str) -> Pattern {
    pattern.split_whitespace().map(Symbol::from).collect()
}

/// Compiles a single declaration.
///
/// Returns the rule together with the accumulator the next declaration
/// must see.
pub fn compile_rule(
    synth: &Synthesizer,
    last: LastAction,
    decl: RuleDecl,
) -> Result<(Rule, LastAction), GrammarError> {
    let pattern = split_pattern(&decl.pattern);
    let (action, last) = match decl.action {
        ActionSrc::Ditto => (last.0.clone(), last),
        ActionSrc::None => (String::new(), LastAction::default()),
        ActionSrc::Text(text) => {
            let code = synth.synthesize(&text)?;
            (code.clone(), LastAction(code))
        }
    };
    let rule = Rule {
        pattern,
        action,
        options: decl.options,
    };
    Ok((rule, last))
}

/// Compiles `decls` strictly in order.
pub fn compile_rules(
    synth: &Synthesizer,
    last: LastAction,
    decls: impl IntoIterator<Item = RuleDecl>,
) -> Result<(Vec<Rule>, LastAction), GrammarError> {
    decls
        .into_iter()
        .try_fold((Vec::new(), last), |(mut rules, last), decl| {
            let (rule, last) = compile_rule(synth, last, decl)?;
            rules.push(rule);
            Ok((rules, last))
        })
}

/// Condensed rule declaration.
///
/// ```rust
/// # use grammex::{rule, ActionSrc};
/// let r = rule!("UNARY Expression", "return Op($1, $2)", prec = "UNARY");
/// assert_eq!(r.options.prec.as_deref(), Some("UNARY"));
/// assert_eq!(rule!("Chain DOT List", ditto).action, ActionSrc::Ditto);
/// assert_eq!(rule!("").action, ActionSrc::None);
/// ```
#[macro_export]
macro_rules! rule {
    ($pattern:expr) => {
        $crate::RuleDecl::new($pattern)
    };
    ($pattern:expr, ditto $(, prec = $prec:expr)?) => {
        $crate::RuleDecl::new($pattern).ditto() $(.prec($prec))?
    };
    ($pattern:expr, $action:expr $(, prec = $prec:expr)?) => {
        $crate::RuleDecl::new($pattern).action($action) $(.prec($prec))?
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(decls: Vec<RuleDecl>) -> Vec<Rule> {
        compile_rules(&Synthesizer::default(), LastAction::default(), decls)
            .unwrap()
            .0
    }

    #[test]
    fn pattern_splits_on_whitespace_runs() {
        let rules = compile(vec![rule!("  Chain\tDOT \n List  "), rule!("   ")]);
        assert_eq!(rules[0].pattern.len(), 3);
        assert_eq!(rules[0].pattern_str(), "Chain DOT List");
        assert!(rules[1].pattern.is_empty());
        assert_eq!(rules[1].action, "");
    }

    #[test]
    fn ditto_repeats_across_nonterminals() {
        let synth = Synthesizer::default();
        let (first, last) = compile_rules(
            &synth,
            LastAction::default(),
            [
                rule!("Chain DOT Key", "return $1.add(Key($3))"),
                rule!("Chain DOT List", ditto),
            ],
        )
        .unwrap();
        let (second, last) =
            compile_rules(&synth, last, [rule!("Expression MATH Expression", ditto)]).unwrap();
        assert_eq!(first[0].action, "$$ = $1.add(yy.Key($3));");
        assert_eq!(first[1].action, first[0].action);
        assert_eq!(second[0].action, first[0].action);
        assert_eq!(last.as_str(), first[0].action);
    }

    #[test]
    fn missing_action_resets_the_chain() {
        let rules = compile(vec![
            rule!("A", "return Foo($1)"),
            rule!("B"),
            rule!("C", ditto),
            rule!("D", "return Bar($1)"),
            rule!("E", ditto, prec = "POST_IF"),
        ]);
        assert_eq!(rules[1].action, "");
        assert_eq!(rules[2].action, "");
        assert_eq!(rules[4].action, "$$ = yy.Bar($1);");
        assert_eq!(rules[4].options.prec.as_deref(), Some("POST_IF"));
    }

    #[test]
    fn ditto_first_is_empty() {
        let rules = compile(vec![rule!("X", ditto)]);
        assert_eq!(rules[0].action, "");
    }

    #[test]
    fn registry_error_stops_the_fold() {
        let synth = Synthesizer::default().with_registry(["Foo"].into_iter().collect());
        let err = compile_rules(
            &synth,
            LastAction::default(),
            [rule!("X", "return Foo($1)"), rule!("Y", "return Fo($1)")],
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::UnknownConstructor { ref name, .. } if name == "Fo"));
    }

    #[test]
    fn precedence_symbol_is_override_or_rightmost_terminal() {
        let terminals: Symtab = ["UNARY", "MATH", "INDENT"].into_iter().collect();
        let rules = compile(vec![
            rule!("Expression MATH Expression", "return Op($2, $1, $3)"),
            rule!("UNARY Expression", "return Op($1, $2)", prec = "UNARY"),
            rule!("- Expression", "return Op('-', $2)", prec = "UNARY"),
            rule!("Expression"),
        ]);
        assert_eq!(rules[0].precedence_symbol(&terminals), Some("MATH"));
        assert_eq!(rules[1].precedence_symbol(&terminals), Some("UNARY"));
        assert_eq!(rules[2].precedence_symbol(&terminals), Some("UNARY"));
        assert_eq!(rules[3].precedence_symbol(&terminals), None);
    }

    #[test]
    fn raw_rule_skips_synthesis() {
        let rule = Rule::raw("Body", "return $$");
        assert_eq!(rule.pattern_str(), "Body");
        assert_eq!(rule.action, "return $$");
    }
}
