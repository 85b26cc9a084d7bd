//! Boundaries to the external verification tooling: the surface
//! compiler/checker that may reject a candidate as ill-typed, and the
//! equivalence oracle deciding whether two programs denote the same
//! distribution. Their internals (generating functions, algebraic
//! solving) live outside this crate.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ast::Program;

/// One way to instantiate the synthesis parameters so that candidate
/// and target agree, e.g. `{"Param0": "1/2"}`. Values stay opaque
/// solver output.
pub type Substitution = BTreeMap<String, String>;

/// Concrete variable assignment witnessing a divergence.
pub type State = BTreeMap<String, u64>;

/// Outcome of one equivalence query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Provably equal, under each of the given parameter
    /// substitutions (an empty list means unconditionally equal).
    Equivalent { constraints: Vec<Substitution> },
    /// Provably different, with a witnessing state.
    NotEquivalent { counterexample: State },
    /// The oracle's solver could not decide; carries the unresolved
    /// symbolic remainder for diagnostics.
    Unknown { residual: String },
}

pub trait EquivalenceOracle {
    /// Compares the original loop program against one synthesized
    /// candidate invariant.
    fn check(&mut self, target: &Program, candidate: &Program) -> Verdict;
}

/// Rejection payload from the external compiler/checker. The payload
/// is opaque to the search; it is only ever logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("candidate rejected: {reason}")]
pub struct CheckFail {
    pub reason: String,
}

pub trait SurfaceChecker {
    fn check(&self, candidate: &Program) -> Result<(), CheckFail>;
}

/// Checker that accepts every candidate. Stands in where no external
/// type checker is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SurfaceChecker for AcceptAll {
    fn check(&self, _candidate: &Program) -> Result<(), CheckFail> {
        Ok(())
    }
}
