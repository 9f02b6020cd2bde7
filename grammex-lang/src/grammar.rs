//! The language grammar.
//!
//! Rules are declared in the order the engine should see them; within a
//! nonterminal that order breaks ties precedence cannot. `ditto` actions
//! reuse whatever was compiled last, so reordering rules can change the
//! actions they end up with.
use grammex::{
    ConstructorRegistry, GrammarBuilder, GrammarDescriptor, GrammarError, OperatorTable,
    StartRule, SynthConfig, Synthesizer, rule,
};
use once_cell::sync::Lazy;

/// Name of the synthetic start nonterminal.
pub const START: &str = "Root";

/// AST constructors the action namespace provides.
pub static CONSTRUCTORS: Lazy<ConstructorRegistry> = Lazy::new(|| {
    [
        "Arr", "Assign", "Block", "Call", "Case", "Chain", "Class", "Existence", "For", "Fun",
        "If", "Import", "Index", "JS", "Jump", "Key", "L", "Label", "Literal", "Obj", "Op",
        "Parens", "Prop", "Splat", "Super", "Switch", "Throw", "Try", "Util", "Var", "While",
    ]
    .into_iter()
    .collect()
});

/// Precedence groups, loosest first.
pub fn operators() -> OperatorTable {
    OperatorTable::new()
        .left(["POST_IF", "FOR", "WHILE"])
        .right([",", "ASSIGN", "HURL", "EXTENDS", "INDENT", "SWITCH", "CASE", "TO", "BY"])
        .right(["LOGIC"])
        .left(["^", "BITWISE"])
        .right(["COMPARE"])
        .left(["RELATION"])
        .left(["SHIFT", "IMPORT"])
        .left(["+-"])
        .left(["MATH"])
        .right(["UNARY"])
        .nonassoc(["CREMENT"])
}

/// Declares every nonterminal into `b`.
pub fn declare(b: &mut GrammarBuilder) -> Result<(), GrammarError> {
    b.define(
        "Chain",
        [
            rule!("Assignable", "return Chain($1)"),
            rule!("Parenthetical", ditto),
            rule!("STRNUM", "return Chain(L(Literal($1)))"),
            rule!("LITERAL", ditto),
            rule!("SUPER", "return Chain(L(new Super))"),
            rule!("Chain CALL( ArgList OptComma )CALL", "return $1.add(Call($3))"),
            rule!(
                "LET   CALL( ArgList OptComma )CALL Block",
                "return Chain(Call['let']($3, $6))"
            ),
            rule!(
                "WITH Expression Block",
                "return Chain(Call.block(Fun([], $3), [$2], '.call'))"
            ),
        ],
    )?;

    b.define(
        "Assignable",
        [
            rule!("ID", "return L(Var($1))"),
            rule!("Chain DOT Key", "return $1.add(Index($3, $2, true))"),
            rule!("Chain DOT List", ditto),
            rule!("Chain ?", "return Existence($1.unwrap())"),
            rule!("List"),
        ],
    )?;

    b.define(
        "List",
        [
            rule!("[ ArgList    OptComma ]", "return L(Arr($2))"),
            rule!("{ Properties OptComma }", "return L(Obj($2))"),
            rule!("[ ArgList    OptComma ] LABEL", "return L(Arr($2)).named($5)"),
            rule!("{ Properties OptComma } LABEL", "return L(Obj($2)).named($5)"),
        ],
    )?;

    b.define("Key", [rule!("KeyBase"), rule!("Parenthetical")])?;

    b.define(
        "KeyBase",
        [
            rule!("ID", "return L(Key($1))"),
            rule!("STRNUM", "return L(Literal($1))"),
        ],
    )?;

    b.define(
        "ArgList",
        [
            rule!("", "return []"),
            rule!("Arg", "return [$1]"),
            rule!("ArgList , Arg", "return $1.concat($3)"),
            rule!("ArgList OptComma TERMINATOR Arg", "return $1.concat($4)"),
            rule!("ArgList OptComma INDENT ArgList OptComma DEDENT", ditto),
        ],
    )?;

    b.define(
        "Arg",
        [
            rule!("Expression"),
            rule!("... Expression", "return Splat($2)"),
            rule!("...", "return Splat(L(Arr()), true)"),
        ],
    )?;

    b.define("OptComma", [rule!(""), rule!(",")])?;

    b.define(
        "Lines",
        [
            rule!("", "return Block()"),
            rule!("Line", "return Block($1)"),
            rule!("Lines TERMINATOR Line", "return $1.add($3)"),
            rule!("Lines TERMINATOR"),
        ],
    )?;

    b.define(
        "Line",
        [
            rule!("Expression"),
            rule!("LABEL Expression", "return new Label($1, $2)"),
            rule!(
                "PARAM( ArgList OptComma )PARAM <- Expression",
                "return Call.back($2, $5, $6)"
            ),
            rule!("COMMENT", "return L(JS($1, true, true))"),
            rule!("...", r#"return L(Throw(JS("Error('unimplemented')")))"#),
        ],
    )?;

    b.define("Block", [rule!("INDENT Lines DEDENT", "return $2.chomp()")])?;

    b.define(
        "Expression",
        [
            rule!("Chain", "return $1.unwrap()"),
            rule!("Assignable ASSIGN Expression", "return Assign($1, $3, $2)"),
            rule!(
                "Assignable ASSIGN INDENT ArgList OptComma DEDENT",
                "return Assign($1, Arr.maybe($4), $2)"
            ),
            rule!(
                "Expression IMPORT Expression",
                "return Import($1, $3, $2 === '<<<<')"
            ),
            rule!(
                "Expression IMPORT INDENT ArgList OptComma DEDENT",
                "return Import($1, Arr.maybe($4), $2 === '<<<<')"
            ),
            rule!("CREMENT Assignable", "return Op($1, $2)"),
            rule!("Assignable CREMENT", "return Op($2, $1, null, true)"),
            rule!("Expression +-      Expression", "return Op($2, $1, $3)"),
            rule!("Expression ^       Expression", ditto),
            rule!("Expression COMPARE Expression", ditto),
            rule!("Expression LOGIC   Expression", ditto),
            rule!("Expression MATH    Expression", ditto),
            rule!("Expression SHIFT   Expression", ditto),
            rule!("Expression BITWISE Expression", ditto),
            rule!(
                "Expression RELATION Expression",
                "return '!' === $2.charAt(0) ? Op($2.slice(1), $1, $3).invert() : Op($2, $1, $3)"
            ),
            rule!("UNARY Expression", "return $1 === '!' ? $2.invert() : Op($1, $2)"),
            rule!("+-    Expression", "return Op($1, $2)", prec = "UNARY"),
            rule!("^     Expression", ditto, prec = "UNARY"),
            rule!("Chain !?", "return Existence($1.unwrap(), true)"),
            rule!(
                "PARAM( ArgList OptComma )PARAM -> Block",
                "return L(Fun($2, $6, $5))"
            ),
            rule!(
                "FUNCTION CALL( ArgList OptComma )CALL Block",
                "return L(Fun($3, $6).named($1))"
            ),
            rule!("IfBlock"),
            rule!("IfBlock ELSE Block", "return $1.addElse($3)"),
            rule!(
                "Expression POST_IF Expression",
                "return If($3, $1, $2 === 'unless')"
            ),
            rule!("LoopHead Block", "return $1.addBody($2)"),
            rule!(
                "LoopHead Block ELSE Block",
                "return $1.addBody($2).addElse($4)"
            ),
            rule!("Expression LoopHead", "return $2.addBody(Block($1))"),
            rule!(
                "DO Block WHILE Expression",
                "return new While($4, $3 === 'until', true).addBody($2)"
            ),
            rule!("HURL Expression", "return Jump[$1]($2)"),
            rule!(
                "HURL INDENT ArgList OptComma DEDENT",
                "return Jump[$1](Arr.maybe($3))"
            ),
            rule!("HURL", "return L(Jump[$1]())"),
            rule!("JUMP", "return L(new Jump($1))"),
            rule!("JUMP ID", "return L(new Jump($1, $2))"),
            rule!("SWITCH Expression Cases", "return new Switch($2, $3)"),
            rule!(
                "SWITCH Expression Cases DEFAULT Block",
                "return new Switch($2, $3, $5)"
            ),
            rule!("SWITCH Cases", "return new Switch(null, $2)"),
            rule!("SWITCH Cases DEFAULT Block", "return new Switch(null, $2, $4)"),
            rule!("SWITCH Block", "return new Switch(null, [], $2)"),
            rule!("TRY Block", "return new Try($2)"),
            rule!("TRY Block CATCH Block", "return new Try($2, $3, $4)"),
            rule!(
                "TRY Block CATCH Block FINALLY Block",
                "return new Try($2, $3, $4, $6)"
            ),
            rule!(
                "TRY Block             FINALLY Block",
                "return new Try($2, null, null, $4)"
            ),
            rule!(
                "CLASS                               Block",
                "return new Class(null, null, $2)"
            ),
            rule!(
                "CLASS            EXTENDS Expression Block",
                "return new Class(null, $3, $4)"
            ),
            rule!(
                "CLASS Assignable                    Block",
                "return new Class($2, null, $3)"
            ),
            rule!(
                "CLASS Assignable EXTENDS Expression Block",
                "return new Class($2, $4, $5)"
            ),
            rule!(
                "Chain EXTENDS Expression",
                "return Util.Extends($1.unwrap(), $3)"
            ),
            rule!("LABEL Block", "return new Label($1, $2)"),
        ],
    )?;

    b.define(
        "KeyValue",
        [
            rule!("Key"),
            rule!(
                "LITERAL DOT KeyBase",
                "return Prop($3, Chain(Literal($1), [Index($3, $2)]))"
            ),
            rule!(
                "Key     DOT KeyBase",
                "return Prop($3, Chain($1, [Index($3, $2)]))"
            ),
        ],
    )?;

    b.define(
        "Property",
        [
            rule!("Key : Expression", "return Prop($1, $3)"),
            rule!(
                "Key : INDENT ArgList OptComma DEDENT",
                "return Prop($1, Arr.maybe($4))"
            ),
            rule!("KeyValue"),
            rule!("KeyValue LOGIC Expression", "return Op($2, $1, $3)"),
            rule!("+- Key", "return Prop($2.maybeKey(), Literal($1 === '+'))"),
            rule!("... Expression", "return Splat($2)"),
            rule!("COMMENT", "return L(JS($1, true, true))"),
        ],
    )?;

    b.define(
        "Properties",
        [
            rule!("", "return []"),
            rule!("Property", "return [$1]"),
            rule!("Properties , Property", "return $1.concat($3)"),
            rule!(
                "Properties OptComma TERMINATOR Property",
                "return $1.concat($4)"
            ),
            rule!("Properties OptComma INDENT Properties OptComma DEDENT", ditto),
        ],
    )?;

    b.define(
        "Parenthetical",
        [rule!(
            "( Body )",
            r#"return Parens($2.chomp().unwrap(), false, $1 === '"')"#
        )],
    )?;

    b.define(
        "Body",
        [
            rule!("Lines"),
            rule!("Block"),
            rule!("Block TERMINATOR Lines", "return $1.add($3)"),
        ],
    )?;

    b.define(
        "IfBlock",
        [
            rule!("IF Expression Block", "return If($2, $3, $1 === 'unless')"),
            rule!(
                "IfBlock ELSE IF Expression Block",
                "return $1.addElse(If($4, $5, $3 === 'unless'))"
            ),
        ],
    )?;

    b.define(
        "LoopHead",
        [
            rule!(
                "FOR Assignable OF Expression",
                "return new For({name: $2, index: $3, source: $4})"
            ),
            rule!(
                "FOR Assignable OF Expression BY Expression",
                "return new For({name: $2, index: $3, source: $4, step: $6})"
            ),
            rule!(
                "FOR     ID              IN Expression",
                "return new For({object: true, own: false, index: $2, source: $4})"
            ),
            rule!(
                "FOR     ID , Assignable IN Expression",
                "return new For({object: true, own: false, index: $2, name: $4, source: $6})"
            ),
            rule!(
                "FOR OWN ID              IN Expression",
                "return new For({object: true, own: true, index: $3, source: $5})"
            ),
            rule!(
                "FOR OWN ID , Assignable IN Expression",
                "return new For({object: true, own: true, index: $3, name: $5, source: $7})"
            ),
            rule!(
                "FOR ID FROM Expression TO Expression",
                "return new For({index: $2, from: $4, op: $5, to: $6})"
            ),
            rule!(
                "FOR ID FROM Expression TO Expression BY Expression",
                "return new For({index: $2, from: $4, op: $5, to: $6, step: $8})"
            ),
            rule!("WHILE Expression", "return new While($2, $1 === 'until')"),
            rule!(
                "WHILE Expression , Expression",
                "return new While($2, $1 === 'until', $4)"
            ),
        ],
    )?;

    b.define(
        "Cases",
        [
            rule!("CASE Exprs Block", "return [new Case($2, $3)]"),
            rule!("Cases CASE Exprs Block", "return $1.concat(new Case($3, $4))"),
        ],
    )?;

    b.define(
        "Exprs",
        [
            rule!("Expression", "return [$1]"),
            rule!("Exprs , Expression", "return $1.concat($3)"),
        ],
    )?;

    Ok(())
}

/// Compiles the grammar into the descriptor handed to the parser generator.
///
/// With `checked`, every constructor an action names must be listed in
/// [`CONSTRUCTORS`].
pub fn build(config: SynthConfig, checked: bool) -> Result<GrammarDescriptor, GrammarError> {
    log::debug!(
        "building grammar: namespace {}, line variable {}, registry {}",
        config.namespace,
        config.line_var,
        if checked { "checked" } else { "unchecked" }
    );
    let mut synth = Synthesizer::new(config);
    if checked {
        synth = synth.with_registry((*CONSTRUCTORS).clone());
    }
    let mut b = GrammarBuilder::new(synth);
    declare(&mut b)?;
    b.assemble(operators(), StartRule::new(START, "Body", "return $$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> GrammarDescriptor {
        let _ = env_logger::builder().is_test(true).try_init();
        build(SynthConfig::default(), true).unwrap()
    }

    #[test]
    fn every_constructor_is_registered() {
        let d = grammar();
        assert_eq!(d.start_symbol(), START);
        assert_eq!(d.table().len(), 22);
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(grammar().to_json().unwrap(), grammar().to_json().unwrap());
    }

    #[test]
    fn terminals_and_nonterminals_partition_the_symbols() {
        let d = grammar();
        let table = d.table();
        let terminals = d.terminals();
        assert!(table.nonterminals().all(|nt| !terminals.contains(nt)));
        assert!(table.symbols().all(|s| terminals.contains(s) ^ table.is_nonterminal(s)));
        assert!(terminals.iter().all(|t| table.symbols().any(|s| s == t)));
        assert!(!terminals.contains(START));
        assert!(terminals.joined().starts_with("STRNUM LITERAL SUPER CALL( )CALL LET WITH ID DOT ?"));
    }

    #[test]
    fn ditto_reuses_the_previous_action() {
        let d = grammar();
        let assignable = d.table().get("Assignable").unwrap();
        assert_eq!(assignable[1].action, "$$ = $1.add(yy.Index($3, $2, true));");
        assert_eq!(assignable[2].action, assignable[1].action);
        assert_eq!(assignable[4].action, "");

        let expr = d.table().get("Expression").unwrap();
        for r in &expr[8..14] {
            assert_eq!(r.action, "$$ = yy.Op($2, $1, $3);");
        }
        assert_eq!(expr[17].action, "$$ = yy.Op($1, $2);");
        assert_eq!(expr[17].options.prec.as_deref(), Some("UNARY"));
    }

    #[test]
    fn position_marker_gets_the_line() {
        let d = grammar();
        let chain = d.table().get("Chain").unwrap();
        assert_eq!(
            chain[4].action,
            "$$ = yy.Chain(yy.L(yylineno, new yy.Super));"
        );
        let line = d.table().get("Line").unwrap();
        assert_eq!(
            line[4].action,
            r#"$$ = yy.L(yylineno, yy.Throw(yy.JS("Error('unimplemented')")));"#
        );
    }

    #[test]
    fn unary_rules_take_unary_precedence() {
        let d = grammar();
        let unary = d.rule_precedence("Expression", 15).unwrap();
        assert_eq!(unary, d.operators().lookup("UNARY").unwrap());
        assert_eq!(d.rule_precedence("Expression", 16), Some(unary));
        assert_eq!(d.rule_precedence("Expression", 17), Some(unary));
        assert_eq!(d.rule_precedence("Expression", 18), None);
        let binary = d.rule_precedence("Expression", 7).unwrap();
        assert_eq!(binary, d.operators().lookup("+-").unwrap());
    }

    #[test]
    fn unchecked_build_accepts_any_capitalized_name() {
        let mut b = GrammarBuilder::new(Synthesizer::default());
        b.define("Body", [rule!("X", "return Unlisted($1)")]).unwrap();
        assert!(b.assemble(operators(), StartRule::new(START, "Body", "return $$")).is_ok());

        let mut b = GrammarBuilder::new(Synthesizer::default().with_registry((*CONSTRUCTORS).clone()));
        assert!(b.define("Body", [rule!("X", "return Unlisted($1)")]).is_err());
    }
}
