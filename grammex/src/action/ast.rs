//! Typed representation of semantic-action text.
//!
//! The tree keeps every grouping the author wrote ([`Expr::Paren`]) and never
//! reassociates, so printing it back through [`fmt::Display`] needs no
//! precedence bookkeeping. The printer only has to keep adjacent operators
//! from fusing: `- -x` must not come out as `--x`. Rewrites only ever swap an
//! identifier for a member access or prepend a call argument, and neither can
//! change how the printed text groups.
use smartstring::alias::String;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    Typeof,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
        }
    }

    /// Whether a space must separate the operator from `operand`, as printed,
    /// for the two to lex back apart.
    fn needs_space(self, operand: &str) -> bool {
        match self {
            UnaryOp::Typeof => true,
            UnaryOp::Neg => operand.starts_with('-'),
            UnaryOp::Plus => operand.starts_with('+'),
            UnaryOp::Not | UnaryOp::BitNot => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Instanceof,
    In,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Instanceof => "instanceof",
            BinOp::In => "in",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::BitOr => "|",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare identifier reference.
    Ident(String),
    /// `$n`, 1-based.
    Slot(usize),
    /// `$$`.
    ResultSlot,
    /// Quoted string literal, quotes included.
    Str(String),
    Num(String),
    Array(Vec<Expr>),
    /// Object literal; keys are printed as written (identifier or quoted).
    Object(Vec<(String, Expr)>),
    Paren(Box<Expr>),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    /// `new Callee` (`args == None`) or `new Callee(args)`.
    New(Box<Expr>, Option<Vec<Expr>>),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Expr)) {
        let res = self.try_for_each_child_mut(|e| {
            f(e);
            Ok::<(), std::convert::Infallible>(())
        });
        if let Err(never) = res {
            match never {}
        }
    }

    /// Visits the direct subexpressions, stopping at the first error.
    pub fn try_for_each_child_mut<E>(
        &mut self,
        mut f: impl FnMut(&mut Expr) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Expr::Ident(_) | Expr::Slot(_) | Expr::ResultSlot | Expr::Str(_) | Expr::Num(_) => {
                Ok(())
            }
            Expr::Array(items) => items.iter_mut().try_for_each(f),
            Expr::Object(props) => props.iter_mut().try_for_each(|(_, v)| f(v)),
            Expr::Paren(e) | Expr::Member(e, _) | Expr::Unary(_, e) => f(e),
            Expr::Index(e, i) => {
                f(e)?;
                f(i)
            }
            Expr::Call(callee, args) => {
                f(callee)?;
                args.iter_mut().try_for_each(f)
            }
            Expr::New(callee, args) => {
                f(callee)?;
                args.iter_mut().flatten().try_for_each(f)
            }
            Expr::Binary(l, _, r) => {
                f(l)?;
                f(r)
            }
            Expr::Cond(c, t, e) => {
                f(c)?;
                f(t)?;
                f(e)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Return(Expr),
    Assign(Expr, Expr),
    Expr(Expr),
}

impl Stmt {
    pub fn try_for_each_expr_mut<E>(
        &mut self,
        mut f: impl FnMut(&mut Expr) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Stmt::Return(e) | Stmt::Expr(e) => f(e),
            Stmt::Assign(target, value) => {
                f(target)?;
                f(value)
            }
        }
    }
}

/// A parsed action: the statement list of the reduce-time function body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub stmts: Vec<Stmt>,
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => f.write_str(name),
            Expr::Slot(n) => write!(f, "${}", n),
            Expr::ResultSlot => f.write_str("$$"),
            Expr::Str(raw) | Expr::Num(raw) => f.write_str(raw),
            Expr::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Expr::Object(props) => {
                f.write_str("{")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Expr::Paren(e) => write!(f, "({})", e),
            Expr::Member(e, name) => write!(f, "{}.{}", e, name),
            Expr::Index(e, i) => write!(f, "{}[{}]", e, i),
            Expr::Call(callee, args) => {
                write!(f, "{}(", callee)?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::New(callee, None) => write!(f, "new {}", callee),
            Expr::New(callee, Some(args)) => {
                write!(f, "new {}(", callee)?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Unary(op, e) => {
                let operand = e.to_string();
                if op.needs_space(&operand) {
                    write!(f, "{} {}", op.as_str(), operand)
                } else {
                    write!(f, "{}{}", op.as_str(), operand)
                }
            }
            Expr::Binary(l, op, r) => write!(f, "{} {} {}", l, op.as_str(), r),
            Expr::Cond(c, t, e) => write!(f, "{} ? {} : {}", c, t, e),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Return(e) => write!(f, "return {};", e),
            Stmt::Assign(target, value) => write!(f, "{} = {};", target, value),
            Stmt::Expr(e) => write!(f, "{};", e),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.stmts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.into())
    }

    #[test]
    fn prints_calls_members_and_new() {
        let e = Expr::Call(
            Box::new(Expr::Member(Box::new(Expr::Slot(1)), "add".into())),
            vec![Expr::New(Box::new(ident("Super")), None), Expr::Array(vec![])],
        );
        assert_eq!(e.to_string(), "$1.add(new Super, [])");
    }

    #[test]
    fn prints_object_and_conditional() {
        let e = Expr::Cond(
            Box::new(Expr::Binary(
                Box::new(Expr::Slot(1)),
                BinOp::StrictEq,
                Box::new(Expr::Str("'!'".into())),
            )),
            Box::new(Expr::Object(vec![("own".into(), ident("true"))])),
            Box::new(Expr::Unary(UnaryOp::Not, Box::new(Expr::Slot(2)))),
        );
        assert_eq!(e.to_string(), "$1 === '!' ? {own: true} : !$2");
    }

    #[test]
    fn stacked_signs_stay_apart() {
        let un = |op, e| Expr::Unary(op, Box::new(e));
        let neg = |e| un(UnaryOp::Neg, e);
        assert_eq!(neg(neg(Expr::Slot(1))).to_string(), "- -$1");
        assert_eq!(neg(neg(Expr::Num("2".into()))).to_string(), "- -2");
        assert_eq!(neg(un(UnaryOp::Plus, Expr::Slot(1))).to_string(), "-+$1");
        let plus = un(UnaryOp::Plus, un(UnaryOp::Plus, Expr::Slot(1)));
        assert_eq!(plus.to_string(), "+ +$1");
        assert_eq!(un(UnaryOp::Not, neg(Expr::Slot(2))).to_string(), "!-$2");
        assert_eq!(un(UnaryOp::Typeof, Expr::Slot(1)).to_string(), "typeof $1");
    }

    #[test]
    fn body_joins_statements() {
        let body = Body {
            stmts: vec![
                Stmt::Assign(Expr::ResultSlot, Expr::Slot(1)),
                Stmt::Return(Expr::ResultSlot),
            ],
        };
        assert_eq!(body.to_string(), "$$ = $1; return $$;");
    }

    #[test]
    fn visitor_reaches_every_child_once() {
        let mut e = Expr::Call(
            Box::new(ident("F")),
            vec![Expr::Index(Box::new(ident("A")), Box::new(Expr::Slot(1)))],
        );
        let mut seen = 0;
        e.try_for_each_child_mut(|_| {
            seen += 1;
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(seen, 2);
    }
}
