use std::fmt;
use std::rc::Rc;

/// Semantic action attached to a grammar rule and to every term the
/// rule builds. One tag per pGCL instruction, expression and
/// distribution kind; leaf tags carry the data needed to rebuild the
/// surface node (a name, a literal value).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    // instructions
    Skip,
    If,
    Assign,
    Choice,
    Seq,
    // expressions
    Or,
    And,
    Leq,
    Lt,
    EqCmp,
    Add,
    Sub,
    Mul,
    Not,
    Iverson,
    // distribution right-hand sides
    DUniform,
    CUniform,
    Geometric,
    Poisson,
    LogDist,
    Binomial,
    Bernoulli,
    Iid,
    // leaves
    Var(String),
    Param(String),
    NatLit(Option<u64>),
    BoolLit(bool),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Skip => write!(f, "skip"),
            Action::If => write!(f, "if"),
            Action::Assign => write!(f, "assign"),
            Action::Choice => write!(f, "choice"),
            Action::Seq => write!(f, "seq"),
            Action::Or => write!(f, "or"),
            Action::And => write!(f, "and"),
            Action::Leq => write!(f, "leq"),
            Action::Lt => write!(f, "lt"),
            Action::EqCmp => write!(f, "eq"),
            Action::Add => write!(f, "add"),
            Action::Sub => write!(f, "sub"),
            Action::Mul => write!(f, "mul"),
            Action::Not => write!(f, "not"),
            Action::Iverson => write!(f, "iverson"),
            Action::DUniform => write!(f, "unif_d"),
            Action::CUniform => write!(f, "unif_c"),
            Action::Geometric => write!(f, "geometric"),
            Action::Poisson => write!(f, "poisson"),
            Action::LogDist => write!(f, "logdist"),
            Action::Binomial => write!(f, "binomial"),
            Action::Bernoulli => write!(f, "bernoulli"),
            Action::Iid => write!(f, "iid"),
            Action::Var(name) | Action::Param(name) => write!(f, "{name}"),
            Action::NatLit(Some(n)) => write!(f, "{n}"),
            Action::NatLit(None) => write!(f, "?"),
            Action::BoolLit(b) => write!(f, "{b}"),
        }
    }
}

/// A candidate program: an immutable syntax tree tagged with its
/// semantic action. Children are shared by reference; terms are never
/// mutated once built, so sharing a sub-term across many parents is
/// safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    action: Action,
    children: Vec<Rc<Term>>,
}

impl Term {
    pub fn new(action: Action, children: Vec<Rc<Term>>) -> Self {
        Self { action, children }
    }

    pub fn leaf(action: Action) -> Rc<Self> {
        Rc::new(Self::new(action, Vec::new()))
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn children(&self) -> &[Rc<Term>] {
        &self.children
    }

    /// Structural size: one node plus the sizes of all children. A
    /// leaf has size 1.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if !self.children.is_empty() {
            write!(f, "(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
