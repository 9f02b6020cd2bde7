//! Rewrite passes over a parsed action body.
//!
//! Each pass touches one concern and can run on its own; the synthesizer
//! applies them as shorthand, then qualification, then position tagging.
//! All three leave already-rewritten text unchanged.
use super::SynthConfig;
use super::ast::{Body, Expr, Stmt};
use crate::{ConstructorRegistry, Symbol};

/// Turns a body that is exactly one `return E` into `$$ = E`.
///
/// Returns whether the body was rewritten.
pub fn shorthand(body: &mut Body) -> bool {
    if !matches!(body.stmts.as_slice(), [Stmt::Return(_)]) {
        return false;
    }
    if let Some(Stmt::Return(value)) = body.stmts.pop() {
        body.stmts.push(Stmt::Assign(Expr::ResultSlot, value));
    }
    true
}

/// Prefixes every constructor reference with the action namespace.
///
/// Only identifier references are candidates: member names, object keys and
/// string literals are never rewritten. With a registry, the first candidate
/// it does not list is returned as the error.
pub fn qualify(
    body: &mut Body,
    config: &SynthConfig,
    registry: Option<&ConstructorRegistry>,
) -> Result<usize, Symbol> {
    let mut count = 0;
    for stmt in body.stmts.iter_mut() {
        stmt.try_for_each_expr_mut(|e| qualify_expr(e, config, registry, &mut count))?;
    }
    Ok(count)
}

fn qualify_expr(
    expr: &mut Expr,
    config: &SynthConfig,
    registry: Option<&ConstructorRegistry>,
    count: &mut usize,
) -> Result<(), Symbol> {
    if let Expr::Ident(name) = expr {
        if config.is_constructor(name) {
            if let Some(registry) = registry {
                if !registry.contains(name) {
                    return Err(name.clone());
                }
            }
            let name = std::mem::take(name);
            *expr = Expr::Member(Box::new(Expr::Ident(config.namespace.clone())), name);
            *count += 1;
        }
        return Ok(());
    }
    expr.try_for_each_child_mut(|child| qualify_expr(child, config, registry, count))
}

/// Makes the line variable the first argument of every position-marker call.
///
/// A marker call is a call whose callee is the marker name, bare or as a
/// member (`L(...)`, `yy.L(...)`). Calls that already start with the line
/// variable are left alone. Returns the number of arguments inserted.
pub fn inject_position(body: &mut Body, config: &SynthConfig) -> usize {
    let mut count = 0;
    for stmt in body.stmts.iter_mut() {
        let res = stmt.try_for_each_expr_mut(|e| {
            inject_expr(e, config, &mut count);
            Ok::<(), std::convert::Infallible>(())
        });
        if let Err(never) = res {
            match never {}
        }
    }
    count
}

fn inject_expr(expr: &mut Expr, config: &SynthConfig, count: &mut usize) {
    expr.for_each_child_mut(|child| inject_expr(child, config, count));
    let Expr::Call(callee, args) = expr else {
        return;
    };
    let is_marker = match &**callee {
        Expr::Ident(name) | Expr::Member(_, name) => *name == config.position_marker,
        _ => false,
    };
    if !is_marker {
        return;
    }
    let tagged = matches!(args.first(), Some(Expr::Ident(v)) if *v == config.line_var);
    if !tagged {
        args.insert(0, Expr::Ident(config.line_var.clone()));
        *count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::super::Synthesizer;
    use super::*;

    fn parsed(src: &str) -> Body {
        Synthesizer::default().parse(src).unwrap()
    }

    #[test]
    fn shorthand_only_applies_to_a_lone_return() {
        let mut body = parsed("return Chain($1)");
        assert!(shorthand(&mut body));
        assert_eq!(body.to_string(), "$$ = Chain($1);");

        let mut body = parsed("$$ = $1; return $$");
        assert!(!shorthand(&mut body));
        assert_eq!(body.to_string(), "$$ = $1; return $$;");
    }

    #[test]
    fn qualify_counts_and_skips_member_names() {
        let mut body = parsed("return Chain(Call['let']($3, $6)).add(Index)");
        let n = qualify(&mut body, &SynthConfig::default(), None).unwrap();
        assert_eq!(n, 3);
        assert_eq!(
            body.to_string(),
            "return yy.Chain(yy.Call['let']($3, $6)).add(yy.Index);"
        );
    }

    #[test]
    fn qualify_checks_the_registry() {
        let registry: ConstructorRegistry = ["Chain"].into_iter().collect();
        let mut body = parsed("return Chain(Chian($1), Error)");
        let err = qualify(&mut body, &SynthConfig::default(), Some(&registry)).unwrap_err();
        assert_eq!(err.as_str(), "Chian");
    }

    #[test]
    fn inject_is_idempotent() {
        let config = SynthConfig::default();
        let mut body = parsed("return yy.L(yy.Arr($2)).named(L($5))");
        assert_eq!(inject_position(&mut body, &config), 2);
        assert_eq!(inject_position(&mut body, &config), 0);
        assert_eq!(
            body.to_string(),
            "return yy.L(yylineno, yy.Arr($2)).named(L(yylineno, $5));"
        );
    }
}
