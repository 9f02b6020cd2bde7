use super::ast::{BinOp, Body, Expr, Stmt, UnaryOp};
use super::lexer::Token;
use chumsky::prelude::*;
use smartstring::alias::String;

/// A trailing accessor applied to an expression.
#[derive(Debug, Clone)]
enum Postfix {
    Member(String),
    Index(Expr),
    Call(Vec<Expr>),
}

impl Postfix {
    fn apply(target: Expr, postfix: Postfix) -> Expr {
        match postfix {
            Postfix::Member(name) => Expr::Member(Box::new(target), name),
            Postfix::Index(index) => Expr::Index(Box::new(target), Box::new(index)),
            Postfix::Call(args) => Expr::Call(Box::new(target), args),
        }
    }
}

fn binary(lhs: Expr, (op, rhs): (BinOp, Expr)) -> Expr {
    Expr::Binary(Box::new(lhs), op, Box::new(rhs))
}

pub fn expr_parser<'a>() -> impl Parser<'a, &'a [Token], Expr> + Clone {
    recursive(|expr| {
        let ident = select! { Token::Ident(name) => name };

        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>();
        let call_args = args
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let literal = select! {
            Token::Slot(n) => Expr::Slot(n),
            Token::ResultSlot => Expr::ResultSlot,
            Token::Str(s) => Expr::Str(s),
            Token::Num(n) => Expr::Num(n),
        };

        let array = args
            .clone()
            .delimited_by(just(Token::LBrack), just(Token::RBrack))
            .map(Expr::Array);

        let key = select! { Token::Ident(k) => k, Token::Str(k) => k };
        let object = key
            .then_ignore(just(Token::Colon))
            .then(expr.clone())
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(Expr::Object);

        let paren = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|e| Expr::Paren(Box::new(e)));

        let atom = choice((literal, ident.clone().map(Expr::Ident), array, object, paren));

        let accessor = choice((
            just(Token::Dot).ignore_then(ident.clone()).map(Postfix::Member),
            expr.clone()
                .delimited_by(just(Token::LBrack), just(Token::RBrack))
                .map(Postfix::Index),
        ));

        // `new` binds to a member path; the argument list, when present,
        // belongs to the constructor rather than to a call on the result.
        let new_expr = just(Token::New)
            .ignore_then(
                ident
                    .map(Expr::Ident)
                    .foldl(accessor.clone().repeated(), Postfix::apply),
            )
            .then(call_args.clone().or_not())
            .map(|(callee, args)| Expr::New(Box::new(callee), args));

        let postfix = choice((new_expr, atom)).foldl(
            choice((accessor, call_args.map(Postfix::Call))).repeated(),
            Postfix::apply,
        );

        let unary = select! {
            Token::Not => UnaryOp::Not,
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::BitNot => UnaryOp::BitNot,
            Token::Typeof => UnaryOp::Typeof,
        }
        .repeated()
        .foldr(postfix, |op, e| Expr::Unary(op, Box::new(e)));

        let product = unary.clone().foldl(
            select! {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
            }
            .then(unary)
            .repeated(),
            binary,
        );
        let sum = product.clone().foldl(
            select! { Token::Plus => BinOp::Add, Token::Minus => BinOp::Sub }
                .then(product)
                .repeated(),
            binary,
        );
        let shift = sum.clone().foldl(
            select! {
                Token::Shl => BinOp::Shl,
                Token::Shr => BinOp::Shr,
                Token::UShr => BinOp::UShr,
            }
            .then(sum)
            .repeated(),
            binary,
        );
        let relation = shift.clone().foldl(
            select! {
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                Token::Le => BinOp::Le,
                Token::Ge => BinOp::Ge,
                Token::Instanceof => BinOp::Instanceof,
                Token::In => BinOp::In,
            }
            .then(shift)
            .repeated(),
            binary,
        );
        let equality = relation.clone().foldl(
            select! {
                Token::StrictEq => BinOp::StrictEq,
                Token::StrictNe => BinOp::StrictNe,
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
            }
            .then(relation)
            .repeated(),
            binary,
        );
        let bit_and = equality.clone().foldl(
            just(Token::BitAnd).to(BinOp::BitAnd).then(equality).repeated(),
            binary,
        );
        let bit_xor = bit_and.clone().foldl(
            just(Token::BitXor).to(BinOp::BitXor).then(bit_and).repeated(),
            binary,
        );
        let bit_or = bit_xor
            .clone()
            .foldl(
                just(Token::BitOr).to(BinOp::BitOr).then(bit_xor).repeated(),
                binary,
            )
            .boxed();
        let and = bit_or.clone().foldl(
            just(Token::And).to(BinOp::And).then(bit_or).repeated(),
            binary,
        );
        let or = and
            .clone()
            .foldl(just(Token::Or).to(BinOp::Or).then(and).repeated(), binary)
            .boxed();

        or
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr)
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((then, otherwise)) => {
                    Expr::Cond(Box::new(cond), Box::new(then), Box::new(otherwise))
                }
                None => cond,
            })
    })
}

/// Parser for a complete action body: either a bare statement list or a
/// `function () { ... }` wrapper around one.
pub fn body_parser<'a>() -> impl Parser<'a, &'a [Token], Body> {
    let expr = expr_parser();

    let stmt = choice((
        just(Token::Return).ignore_then(expr.clone()).map(Stmt::Return),
        expr.clone()
            .then(just(Token::Assign).ignore_then(expr).or_not())
            .map(|(lhs, rhs)| match rhs {
                Some(rhs) => Stmt::Assign(lhs, rhs),
                None => Stmt::Expr(lhs),
            }),
    ));

    let stmts = stmt
        .separated_by(just(Token::Semi))
        .allow_trailing()
        .collect::<Vec<_>>();

    let wrapped = just(Token::Function)
        .ignore_then(just(Token::LParen))
        .ignore_then(just(Token::RParen))
        .ignore_then(
            stmts
                .clone()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        );

    wrapped
        .or(stmts)
        .then_ignore(end())
        .map(|stmts| Body { stmts })
}
