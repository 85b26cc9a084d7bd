//! Surface pGCL syntax, as handed to the external compiler/checker
//! and the equivalence oracle. Pretty-printing is a structural walk
//! over the tree; nothing here ever re-parses formatted text.

use std::fmt;

pub type Var = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Nat,
    Real,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decl {
    Var { name: Var, ty: Type },
    Const { name: Var, value: Expr },
    Param { name: Var, ty: Type },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinopKind {
    Or,
    And,
    Leq,
    Lt,
    Geq,
    Gt,
    Eq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinopKind {
    fn symbol(self) -> &'static str {
        match self {
            BinopKind::Or => "||",
            BinopKind::And => "&",
            BinopKind::Leq => "<=",
            BinopKind::Lt => "<",
            BinopKind::Geq => ">=",
            BinopKind::Gt => ">",
            BinopKind::Eq => "=",
            BinopKind::Add => "+",
            BinopKind::Sub => "-",
            BinopKind::Mul => "*",
            BinopKind::Div => "/",
            BinopKind::Mod => "%",
            BinopKind::Pow => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Nat(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Binop(BinopKind, Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Iverson(Box<Expr>),
    Lit(Literal),
    Var(Var),
}

/// Right-hand side of an assignment: a plain expression or a draw
/// from a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rvalue {
    Expr(Expr),
    DUniform(Expr, Expr),
    CUniform(Expr, Expr),
    Geometric(Expr),
    Poisson(Expr),
    LogDist(Expr),
    Binomial(Expr, Expr),
    Bernoulli(Expr),
    Iid(Box<Rvalue>, Var),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instr {
    Skip,
    If {
        cond: Expr,
        then_branch: Vec<Instr>,
        else_branch: Vec<Instr>,
    },
    /// Loops occur in target programs only; the synthesis grammar
    /// never produces one.
    While {
        cond: Expr,
        body: Vec<Instr>,
    },
    Assign {
        lhs: Var,
        rhs: Rvalue,
    },
    Choice {
        left: Vec<Instr>,
        prob: Expr,
        right: Vec<Instr>,
    },
}

/// A complete surface program: declarations followed by instructions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    pub declarations: Vec<Decl>,
    pub instructions: Vec<Instr>,
}

impl Program {
    pub fn variables(&self) -> Vec<Var> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Decl::Var { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn parameters(&self) -> Vec<Var> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Decl::Param { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Any construct a candidate term can translate to: an expression, an
/// assignment right-hand side, a statement list, or a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceNode {
    Expr(Expr),
    Rvalue(Rvalue),
    Block(Vec<Instr>),
    Decl(Decl),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Nat => write!(f, "nat"),
            Type::Real => write!(f, "real"),
        }
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Var { name, ty } => write!(f, "{ty} {name};"),
            Decl::Const { name, value } => write!(f, "const {name} := {value};"),
            Decl::Param { name, ty: Type::Real } => write!(f, "rparam {name};"),
            Decl::Param { name, .. } => write!(f, "nparam {name};"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Nat(n) => write!(f, "{n}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binop(kind, l, r) => write!(f, "({l} {} {r})", kind.symbol()),
            Expr::Not(e) => write!(f, "not {e}"),
            Expr::Iverson(e) => write!(f, "[{e}]"),
            Expr::Lit(lit) => write!(f, "{lit}"),
            Expr::Var(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Rvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rvalue::Expr(e) => write!(f, "{e}"),
            Rvalue::DUniform(a, b) => write!(f, "unif_d({a}, {b})"),
            Rvalue::CUniform(a, b) => write!(f, "unif_c({a}, {b})"),
            Rvalue::Geometric(p) => write!(f, "geometric({p})"),
            Rvalue::Poisson(l) => write!(f, "poisson({l})"),
            Rvalue::LogDist(p) => write!(f, "logdist({p})"),
            Rvalue::Binomial(n, p) => write!(f, "binomial({n}, {p})"),
            Rvalue::Bernoulli(p) => write!(f, "bernoulli({p})"),
            Rvalue::Iid(rv, x) => write!(f, "iid({rv}, {x})"),
        }
    }
}

fn fmt_block(f: &mut fmt::Formatter<'_>, instrs: &[Instr]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, instr) in instrs.iter().enumerate() {
        if i > 0 {
            write!(f, ";")?;
        }
        write!(f, " {instr}")?;
    }
    write!(f, " }}")
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Skip => write!(f, "skip"),
            Instr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(f, "if ({cond}) ")?;
                fmt_block(f, then_branch)?;
                write!(f, " else ")?;
                fmt_block(f, else_branch)
            }
            Instr::While { cond, body } => {
                write!(f, "while ({cond}) ")?;
                fmt_block(f, body)
            }
            Instr::Assign { lhs, rhs } => write!(f, "{lhs} := {rhs}"),
            Instr::Choice { left, prob, right } => {
                fmt_block(f, left)?;
                write!(f, " [{prob}] ")?;
                fmt_block(f, right)
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in &self.declarations {
            writeln!(f, "{decl}")?;
        }
        for instr in &self.instructions {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SurfaceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceNode::Expr(e) => write!(f, "{e}"),
            SurfaceNode::Rvalue(rv) => write!(f, "{rv}"),
            SurfaceNode::Block(instrs) => {
                for (i, instr) in instrs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{instr}")?;
                }
                Ok(())
            }
            SurfaceNode::Decl(d) => write!(f, "{d}"),
        }
    }
}
