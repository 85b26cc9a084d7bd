use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Decl, Program, SurfaceNode, Type};
use crate::enumerate::{BottomUpSynth, Synthesizer};
use crate::grammar::PgclGrammar;
use crate::oracle::{CheckFail, EquivalenceOracle, State, Substitution, SurfaceChecker, Verdict};
use crate::term::Term;
use crate::translate::{to_surface, TranslateError};

/// What happened to one candidate on its way through
/// translate → check → oracle.
#[derive(Debug)]
pub enum SearchStep {
    /// The candidate could not be assembled into a surface program.
    Unbuildable {
        term: Rc<Term>,
        error: TranslateError,
    },
    /// The external checker rejected the surface program.
    IllTyped { term: Rc<Term>, fail: CheckFail },
    /// The oracle found a state where target and candidate diverge.
    Rejected {
        term: Rc<Term>,
        counterexample: State,
    },
    /// The oracle's solver could not decide.
    Undecided { term: Rc<Term>, residual: String },
    /// A validated invariant.
    Validated {
        term: Rc<Term>,
        invariant: Program,
        constraints: Vec<Substitution>,
    },
}

/// Drives candidates from a synthesizer through the external checker
/// and the equivalence oracle, one candidate per step.
pub struct InvariantSearch<S, C, O> {
    synth: S,
    checker: C,
    oracle: O,
    target: Program,
    declarations: Vec<Decl>,
}

impl<S, C, O> InvariantSearch<S, C, O>
where
    S: Synthesizer,
    C: SurfaceChecker,
    O: EquivalenceOracle,
{
    /// `declarations` is the header every candidate program gets; it
    /// normally extends the target's declarations with the synthetic
    /// parameters.
    pub fn new(target: Program, declarations: Vec<Decl>, synth: S, checker: C, oracle: O) -> Self {
        Self {
            synth,
            checker,
            oracle,
            target,
            declarations,
        }
    }

    pub fn step(&mut self) -> Option<SearchStep> {
        let term = self.synth.next_term()?;
        debug!("try: {term}");

        let instructions = match to_surface(&term) {
            Ok(SurfaceNode::Block(instructions)) => instructions,
            Ok(other) => {
                // Start symbols other than the instruction class yield
                // nothing an invariant program can be built from.
                debug!("not a statement list: {other}");
                return Some(SearchStep::Unbuildable {
                    term,
                    error: TranslateError::NotAStatementList,
                });
            }
            Err(error) => {
                debug!("cannot build surface program: {error}");
                return Some(SearchStep::Unbuildable { term, error });
            }
        };

        let candidate = Program {
            declarations: self.declarations.clone(),
            instructions,
        };

        if let Err(fail) = self.checker.check(&candidate) {
            debug!("checker verdict: {fail}");
            return Some(SearchStep::IllTyped { term, fail });
        }

        Some(match self.oracle.check(&self.target, &candidate) {
            Verdict::Equivalent { constraints } => SearchStep::Validated {
                term,
                invariant: candidate,
                constraints,
            },
            Verdict::NotEquivalent { counterexample } => SearchStep::Rejected {
                term,
                counterexample,
            },
            Verdict::Unknown { residual } => SearchStep::Undecided { term, residual },
        })
    }
}

/// Final outcome of a bounded synthesis run.
#[derive(Debug)]
pub enum SynthesisOutcome {
    Found {
        term: Rc<Term>,
        invariant: Program,
        constraints: Vec<Substitution>,
    },
    /// Not an error: every candidate up to the bound was tried.
    NoInvariantFound { max_size: usize },
}

/// Specializes the stock grammar to the target program's variables and
/// parameters, then searches up to `max_size` for the first candidate
/// the oracle validates.
pub fn synthesize_invariant<C, O>(
    target: Program,
    checker: C,
    oracle: O,
    max_size: usize,
) -> SynthesisOutcome
where
    C: SurfaceChecker,
    O: EquivalenceOracle,
{
    let vars = target.variables();
    let params = target.parameters();
    info!(
        "synthesizing an invariant over {} variables, {} parameters, size bound {max_size}",
        vars.len(),
        params.len(),
    );

    let mut grammar = PgclGrammar::new();
    grammar.specialize(&vars, &params);

    // Candidates share the target's header plus the synthetic
    // parameter the specialization introduced.
    let mut declarations = target.declarations.clone();
    declarations.push(Decl::Param {
        name: "Param0".into(),
        ty: Type::Nat,
    });

    let synth = BottomUpSynth::new(grammar.into_grammar(), max_size);
    let mut search = InvariantSearch::new(target, declarations, synth, checker, oracle);

    let mut tried = 0usize;
    while let Some(step) = search.step() {
        tried += 1;
        match step {
            SearchStep::Validated {
                term,
                invariant,
                constraints,
            } => {
                info!("validated candidate after {tried} tries: {term}");
                return SynthesisOutcome::Found {
                    term,
                    invariant,
                    constraints,
                };
            }
            SearchStep::Rejected { term, .. } => debug!("rejected: {term}"),
            SearchStep::Undecided { term, residual } => {
                debug!("undecided ({residual}): {term}");
            }
            SearchStep::IllTyped { term, .. } => debug!("ill-typed: {term}"),
            SearchStep::Unbuildable { term, .. } => debug!("unbuildable: {term}"),
        }
    }

    info!("no invariant found within size bound {max_size} ({tried} candidates tried)");
    SynthesisOutcome::NoInvariantFound { max_size }
}
