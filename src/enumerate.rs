use std::collections::VecDeque;
use std::rc::Rc;

use log::debug;

use crate::grammar::{Grammar, Rule};
use crate::term::Term;

/// Size-indexed term storage: `bucket(row, size)` holds every distinct
/// term of the non-terminal with enumeration index `row` and exactly
/// that structural size, in the order the enumerator produced them.
#[derive(Debug)]
pub struct TermBank {
    // [symbol index][size]; size 0 stays empty, it is not a term size
    buckets: Vec<Vec<Vec<Rc<Term>>>>,
}

impl TermBank {
    fn new(symbol_count: usize, max_size: usize) -> Self {
        Self {
            buckets: vec![vec![Vec::new(); max_size + 1]; symbol_count],
        }
    }

    pub fn bucket(&self, row: usize, size: usize) -> &[Rc<Term>] {
        &self.buckets[row][size]
    }

    pub fn max_size(&self) -> usize {
        self.buckets.first().map_or(0, |row| row.len() - 1)
    }

    fn extend(&mut self, row: usize, size: usize, terms: Vec<Rc<Term>>) {
        self.buckets[row][size].extend(terms);
    }
}

/// Progress milestone: how many new terms one (non-terminal, size)
/// bucket just gained. Informational only.
#[derive(Debug, Clone, Copy)]
pub struct Milestone<'g> {
    pub symbol: &'g str,
    pub index: usize,
    pub size: usize,
    pub produced: usize,
}

/// Every way to give each parameter position a term size so that the
/// sizes sum to `remaining`. `slots[i]` lists, in ascending order, the
/// sizes for which position `i` has at least one stored term.
///
/// Depth-first, left to right, ascending per position, so the output
/// order is deterministic. No slots accepts the empty tuple exactly
/// when the budget is already zero, which is how 0-arity rules fall
/// out of the general case.
pub fn partition_sizes(remaining: usize, slots: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut prefix = Vec::with_capacity(slots.len());
    partition_rec(0, remaining, slots, &mut prefix, &mut out);
    out
}

fn partition_rec(
    pos: usize,
    remaining: usize,
    slots: &[Vec<usize>],
    prefix: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if pos == slots.len() {
        if remaining == 0 {
            out.push(prefix.clone());
        }
        return;
    }

    for &size in &slots[pos] {
        if size > remaining {
            continue;
        }
        prefix.push(size);
        partition_rec(pos + 1, remaining - size, slots, prefix, out);
        prefix.pop();
    }
}

/// Applies one rule at one target size: finds every admissible size
/// tuple for the rule's parameters, then builds one term per element
/// of the cross product of the chosen buckets.
fn apply_rule(
    grammar: &Grammar,
    bank: &TermBank,
    rule: &Rule,
    size: usize,
    out: &mut Vec<Rc<Term>>,
) {
    let slots: Vec<Vec<usize>> = rule
        .params()
        .iter()
        .map(|p| {
            let row = grammar.index_of(*p);
            (1..size)
                .filter(|&s| !bank.bucket(row, s).is_empty())
                .collect()
        })
        .collect();

    for scheme in partition_sizes(size - 1, &slots) {
        let chosen: Vec<&[Rc<Term>]> = scheme
            .iter()
            .zip(rule.params())
            .map(|(&s, p)| bank.bucket(grammar.index_of(*p), s))
            .collect();
        let mut picked = Vec::with_capacity(chosen.len());
        cross_product(0, &chosen, rule, &mut picked, out);
    }
}

/// One build call per combination of one term per parameter position,
/// in the same left-to-right depth-first order as the partition
/// search.
fn cross_product(
    pos: usize,
    chosen: &[&[Rc<Term>]],
    rule: &Rule,
    picked: &mut Vec<Rc<Term>>,
    out: &mut Vec<Rc<Term>>,
) {
    if pos == chosen.len() {
        out.push(rule.build(picked.clone()));
        return;
    }

    for term in chosen[pos] {
        picked.push(term.clone());
        cross_product(pos + 1, chosen, rule, picked, out);
        picked.pop();
    }
}

/// Fills every bucket of one exact size, reporting a milestone per
/// non-terminal. All children come from strictly smaller buckets, so
/// the processing order of non-terminals within one size is free.
fn fill_size<'g>(
    grammar: &'g Grammar,
    bank: &mut TermBank,
    size: usize,
    observer: &mut dyn FnMut(Milestone<'g>),
) {
    for row in 0..grammar.symbol_count() {
        let symbol = grammar.symbol_at(row);
        let mut fresh = Vec::new();
        for rule in symbol.rules() {
            apply_rule(grammar, bank, rule, size, &mut fresh);
        }

        let produced = fresh.len();
        debug!(
            "size {size}, {}: {produced} new terms",
            symbol.name(),
        );
        bank.extend(row, size, fresh);
        observer(Milestone {
            symbol: symbol.name(),
            index: row,
            size,
            produced,
        });
    }
}

/// Bottom-up, size-indexed enumerator. Produces, for every
/// non-terminal and every size `1..=max_size`, the complete
/// duplicate-free list of terms of that exact size.
#[derive(Debug)]
pub struct Enumerator<'g> {
    grammar: &'g Grammar,
    max_size: usize,
}

impl<'g> Enumerator<'g> {
    pub fn new(grammar: &'g Grammar, max_size: usize) -> Self {
        assert!(grammar.is_finalized(), "grammar not finalized");
        Self { grammar, max_size }
    }

    /// Runs to `max_size` unconditionally; an empty bucket is a normal
    /// outcome, not a stopping condition.
    pub fn run(self) -> TermBank {
        self.run_with(|_| ())
    }

    pub fn run_with(self, mut observer: impl FnMut(Milestone<'g>)) -> TermBank {
        let mut bank = TermBank::new(self.grammar.symbol_count(), self.max_size);
        for size in 1..=self.max_size {
            debug!("enumerating terms of size {size}");
            fill_size(self.grammar, &mut bank, size, &mut observer);
        }
        bank
    }
}

/// An iterator-like candidate source, in the spirit of a synthesizer
/// that is queried one candidate at a time.
pub trait Synthesizer {
    /// The next candidate, or `None` once the size bound is exhausted.
    fn next_term(&mut self) -> Option<Rc<Term>>;
}

/// Lazy driver over the same bottom-up algorithm: grows the bank one
/// size at a time and hands out the start symbol's terms in bucket
/// order.
#[derive(Debug)]
pub struct BottomUpSynth {
    grammar: Grammar,
    bank: TermBank,
    max_size: usize,
    size: usize,
    pending: VecDeque<Rc<Term>>,
}

impl BottomUpSynth {
    pub fn new(grammar: Grammar, max_size: usize) -> Self {
        assert!(grammar.is_finalized(), "grammar not finalized");
        let bank = TermBank::new(grammar.symbol_count(), max_size);
        Self {
            grammar,
            bank,
            max_size,
            size: 0,
            pending: VecDeque::new(),
        }
    }

    pub fn bank(&self) -> &TermBank {
        &self.bank
    }

    fn grow(&mut self) {
        self.size += 1;
        debug!("growing candidate bank to size {}", self.size);
        fill_size(&self.grammar, &mut self.bank, self.size, &mut |_| ());

        let start = self.grammar.index_of(self.grammar.start());
        self.pending
            .extend(self.bank.bucket(start, self.size).iter().cloned());
    }
}

impl Synthesizer for BottomUpSynth {
    fn next_term(&mut self) -> Option<Rc<Term>> {
        loop {
            if let Some(term) = self.pending.pop_front() {
                return Some(term);
            }
            if self.size >= self.max_size {
                return None;
            }
            self.grow();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_matches_the_reference_scenario() {
        let slots = vec![vec![1, 3], vec![1, 2, 3]];
        assert_eq!(partition_sizes(4, &slots), vec![vec![1, 3], vec![3, 1]]);
    }

    #[test]
    fn partition_of_zero_over_no_slots_is_the_empty_tuple() {
        assert_eq!(partition_sizes(0, &[]), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn partition_of_nonzero_over_no_slots_is_empty() {
        assert!(partition_sizes(3, &[]).is_empty());
    }

    #[test]
    fn partition_skips_empty_slots() {
        let slots = vec![vec![1, 2], vec![]];
        assert!(partition_sizes(3, &slots).is_empty());
    }

    #[test]
    fn partition_order_is_lexicographic() {
        let slots = vec![vec![1, 2, 3], vec![1, 2, 3]];
        assert_eq!(
            partition_sizes(4, &slots),
            vec![vec![1, 3], vec![2, 2], vec![3, 1]],
        );
    }
}
