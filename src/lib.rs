//! Grammar-driven, size-bounded synthesis of candidate loop
//! invariants for probabilistic (pGCL-style) programs.
//!
//! The core is a bottom-up enumerator: for each size from 1 upward it
//! applies every production of every non-terminal to the terms already
//! stored at strictly smaller sizes, so recursion in the grammar can
//! never loop. Candidates are translated to surface pGCL and driven
//! through an external equivalence oracle.

pub mod ast;
pub mod enumerate;
pub mod grammar;
pub mod oracle;
pub mod search;
pub mod term;
pub mod translate;
