//! Turns a candidate term into the surface AST the external tooling
//! understands. Children are translated first (post-order), then the
//! term's action assembles the surface construct from them.

use thiserror::Error;

use crate::ast::{BinopKind, Expr, Instr, Literal, Rvalue, SurfaceNode};
use crate::term::{Action, Term};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// A literal leaf whose value was never filled in.
    #[error("literal has no value yet")]
    UninitializedLiteral,

    /// The whole candidate is an expression or declaration where a
    /// statement list was needed.
    #[error("candidate is not a statement list")]
    NotAStatementList,

    /// A child translated to the wrong syntactic class for its slot.
    #[error("`{action}` expected {expected} at child {position}")]
    ChildClass {
        action: String,
        expected: &'static str,
        position: usize,
    },
}

/// Translates a whole candidate. Total over every term the enumerator
/// can produce from a well-formed grammar; a failure aborts this one
/// candidate only.
pub fn to_surface(term: &Term) -> Result<SurfaceNode, TranslateError> {
    let children = term
        .children()
        .iter()
        .map(|c| to_surface(c))
        .collect::<Result<Vec<_>, _>>()?;
    assemble(term.action(), children)
}

fn assemble(action: &Action, children: Vec<SurfaceNode>) -> Result<SurfaceNode, TranslateError> {
    let mut take = NodeTaker::new(action, children);

    let node = match action {
        Action::Skip => {
            take.done(0);
            SurfaceNode::Block(vec![Instr::Skip])
        }
        Action::If => {
            let cond = take.expr()?;
            let then_branch = take.block()?;
            let else_branch = take.block()?;
            take.done(3);
            SurfaceNode::Block(vec![Instr::If {
                cond,
                then_branch,
                else_branch,
            }])
        }
        Action::Assign => {
            let lhs = take.var_name()?;
            let rhs = take.rvalue()?;
            take.done(2);
            SurfaceNode::Block(vec![Instr::Assign { lhs, rhs }])
        }
        Action::Choice => {
            let left = take.block()?;
            let prob = take.expr()?;
            let right = take.block()?;
            take.done(3);
            SurfaceNode::Block(vec![Instr::Choice { left, prob, right }])
        }
        Action::Seq => {
            let mut first = take.block()?;
            let second = take.block()?;
            take.done(2);
            first.extend(second);
            SurfaceNode::Block(first)
        }

        Action::Or => take.binop(BinopKind::Or)?,
        Action::And => take.binop(BinopKind::And)?,
        Action::Leq => take.binop(BinopKind::Leq)?,
        Action::Lt => take.binop(BinopKind::Lt)?,
        Action::EqCmp => take.binop(BinopKind::Eq)?,
        Action::Add => take.binop(BinopKind::Add)?,
        Action::Sub => take.binop(BinopKind::Sub)?,
        Action::Mul => take.binop(BinopKind::Mul)?,
        Action::Not => {
            let e = take.expr()?;
            take.done(1);
            SurfaceNode::Expr(Expr::Not(Box::new(e)))
        }
        Action::Iverson => {
            let e = take.expr()?;
            take.done(1);
            SurfaceNode::Expr(Expr::Iverson(Box::new(e)))
        }

        Action::DUniform => {
            let (a, b) = (take.expr()?, take.expr()?);
            take.done(2);
            SurfaceNode::Rvalue(Rvalue::DUniform(a, b))
        }
        Action::CUniform => {
            let (a, b) = (take.expr()?, take.expr()?);
            take.done(2);
            SurfaceNode::Rvalue(Rvalue::CUniform(a, b))
        }
        Action::Geometric => {
            let p = take.expr()?;
            take.done(1);
            SurfaceNode::Rvalue(Rvalue::Geometric(p))
        }
        Action::Poisson => {
            let l = take.expr()?;
            take.done(1);
            SurfaceNode::Rvalue(Rvalue::Poisson(l))
        }
        Action::LogDist => {
            let p = take.expr()?;
            take.done(1);
            SurfaceNode::Rvalue(Rvalue::LogDist(p))
        }
        Action::Binomial => {
            let (n, p) = (take.expr()?, take.expr()?);
            take.done(2);
            SurfaceNode::Rvalue(Rvalue::Binomial(n, p))
        }
        Action::Bernoulli => {
            let p = take.expr()?;
            take.done(1);
            SurfaceNode::Rvalue(Rvalue::Bernoulli(p))
        }
        Action::Iid => {
            let rv = take.rvalue()?;
            let x = take.var_name()?;
            take.done(2);
            SurfaceNode::Rvalue(Rvalue::Iid(Box::new(rv), x))
        }

        Action::Var(name) | Action::Param(name) => {
            take.done(0);
            SurfaceNode::Expr(Expr::Var(name.clone()))
        }
        Action::NatLit(Some(n)) => {
            take.done(0);
            SurfaceNode::Expr(Expr::Lit(Literal::Nat(*n)))
        }
        Action::NatLit(None) => return Err(TranslateError::UninitializedLiteral),
        Action::BoolLit(b) => {
            take.done(0);
            SurfaceNode::Expr(Expr::Lit(Literal::Bool(*b)))
        }
    };

    Ok(node)
}

/// Pulls translated children out in order, classifying each into the
/// syntactic class its slot demands.
struct NodeTaker<'a> {
    action: &'a Action,
    children: std::vec::IntoIter<SurfaceNode>,
    arity: usize,
    position: usize,
}

impl<'a> NodeTaker<'a> {
    fn new(action: &'a Action, children: Vec<SurfaceNode>) -> Self {
        Self {
            action,
            arity: children.len(),
            children: children.into_iter(),
            position: 0,
        }
    }

    fn next(&mut self) -> SurfaceNode {
        self.position += 1;
        self.children
            .next()
            .unwrap_or_else(|| panic!("`{}` built with wrong arity", self.action))
    }

    fn done(self, expected: usize) {
        assert_eq!(
            self.arity, expected,
            "`{}` built with wrong arity",
            self.action,
        );
    }

    fn class_error(&self, expected: &'static str) -> TranslateError {
        TranslateError::ChildClass {
            action: self.action.to_string(),
            expected,
            position: self.position - 1,
        }
    }

    fn expr(&mut self) -> Result<Expr, TranslateError> {
        match self.next() {
            SurfaceNode::Expr(e) => Ok(e),
            _ => Err(self.class_error("an expression")),
        }
    }

    fn block(&mut self) -> Result<Vec<Instr>, TranslateError> {
        match self.next() {
            SurfaceNode::Block(instrs) => Ok(instrs),
            _ => Err(self.class_error("a statement list")),
        }
    }

    fn var_name(&mut self) -> Result<String, TranslateError> {
        match self.next() {
            SurfaceNode::Expr(Expr::Var(name)) => Ok(name),
            _ => Err(self.class_error("a variable")),
        }
    }

    fn rvalue(&mut self) -> Result<Rvalue, TranslateError> {
        match self.next() {
            SurfaceNode::Rvalue(rv) => Ok(rv),
            SurfaceNode::Expr(e) => Ok(Rvalue::Expr(e)),
            _ => Err(self.class_error("an rvalue")),
        }
    }

    fn binop(&mut self, kind: BinopKind) -> Result<SurfaceNode, TranslateError> {
        let l = self.expr()?;
        let r = self.expr()?;
        assert_eq!(self.arity, 2, "`{}` built with wrong arity", self.action);
        Ok(SurfaceNode::Expr(Expr::Binop(
            kind,
            Box::new(l),
            Box::new(r),
        )))
    }
}
