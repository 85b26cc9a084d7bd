//! Enumerator properties over small fixed grammars, cross-checked
//! against an independent brute-force tree generator.

use std::collections::HashSet;
use std::rc::Rc;

use invsynth::enumerate::{BottomUpSynth, Enumerator, Synthesizer, TermBank};
use invsynth::grammar::{Grammar, PgclGrammar, Rule, SymbolId};
use invsynth::term::{Action, Term};

fn init_logger() {
    let _ = colog::default_builder()
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// The reference grammar: `V` with the two leaves `Var0`/`Var1`, and
/// `E` with `Add(E, E)` whose base cases borrow `V`'s leaves.
fn add_grammar() -> (Grammar, SymbolId, SymbolId) {
    let mut g = Grammar::new();
    let e = g.add_symbol("E");
    let v = g.add_symbol("V");

    let leaves = vec![
        Rule::leaf(Action::Var("Var0".into())),
        Rule::leaf(Action::Var("Var1".into())),
    ];
    let mut e_rules = vec![Rule::new(Action::Add, vec![e, e])];
    e_rules.extend(leaves.iter().cloned());
    g.set_rules(e, e_rules);
    g.set_rules(v, leaves);
    g.finalize(e);
    (g, e, v)
}

/// A grammar with a strictly size-increasing unary rule, so every
/// size has terms.
fn unary_grammar() -> (Grammar, SymbolId) {
    let mut g = Grammar::new();
    let e = g.add_symbol("E");
    g.set_rules(
        e,
        vec![
            Rule::new(Action::Not, vec![e]),
            Rule::new(Action::Add, vec![e, e]),
            Rule::leaf(Action::Var("a".into())),
            Rule::leaf(Action::Var("b".into())),
        ],
    );
    g.finalize(e);
    (g, e)
}

/// Independent generator: every syntax tree over the grammar with
/// exactly `size` nodes rooted at `id`, with no table reuse at all.
fn brute_force(g: &Grammar, id: SymbolId, size: usize) -> HashSet<Rc<Term>> {
    let mut out = HashSet::new();
    if size == 0 {
        return out;
    }
    for rule in g.symbol(id).rules() {
        if rule.arity() == 0 {
            if size == 1 {
                out.insert(rule.build(Vec::new()));
            }
            continue;
        }
        for split in compositions(size - 1, rule.arity()) {
            let child_sets: Vec<Vec<Rc<Term>>> = split
                .iter()
                .zip(rule.params())
                .map(|(&s, p)| brute_force(g, *p, s).into_iter().collect())
                .collect();
            let mut picked = Vec::new();
            product(rule, &child_sets, &mut picked, &mut out);
        }
    }
    out
}

/// All ways to write `total` as an ordered sum of `parts` positive
/// integers.
fn compositions(total: usize, parts: usize) -> Vec<Vec<usize>> {
    if parts == 0 {
        return if total == 0 { vec![Vec::new()] } else { Vec::new() };
    }
    let mut out = Vec::new();
    for first in 1..=total.saturating_sub(parts - 1) {
        for mut rest in compositions(total - first, parts - 1) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}

fn product(
    rule: &Rule,
    child_sets: &[Vec<Rc<Term>>],
    picked: &mut Vec<Rc<Term>>,
    out: &mut HashSet<Rc<Term>>,
) {
    if picked.len() == child_sets.len() {
        out.insert(rule.build(picked.clone()));
        return;
    }
    for t in &child_sets[picked.len()] {
        picked.push(t.clone());
        product(rule, child_sets, picked, out);
        picked.pop();
    }
}

fn names(bank: &TermBank, row: usize, size: usize) -> Vec<String> {
    bank.bucket(row, size).iter().map(|t| t.to_string()).collect()
}

#[test]
fn add_grammar_end_to_end() {
    init_logger();
    let (g, e, _) = add_grammar();
    let row = g.index_of(e);
    let bank = Enumerator::new(&g, 3).run();

    assert_eq!(names(&bank, row, 1), vec!["Var0", "Var1"]);
    assert!(bank.bucket(row, 2).is_empty());
    assert_eq!(
        names(&bank, row, 3),
        vec![
            "add(Var0,Var0)",
            "add(Var0,Var1)",
            "add(Var1,Var0)",
            "add(Var1,Var1)",
        ],
    );
}

#[test]
fn leaf_base_case() {
    let (g, _, v) = add_grammar();
    let row = g.index_of(v);
    let bank = Enumerator::new(&g, 4).run();

    // one size-1 term per 0-arity rule; size 0 is not a term size
    assert_eq!(bank.bucket(row, 1).len(), 2);
    for row in 0..g.symbol_count() {
        assert!(bank.bucket(row, 0).is_empty());
    }
}

#[test]
fn buckets_hold_exact_sizes_and_no_duplicates() {
    let (g, _) = unary_grammar();
    let bank = Enumerator::new(&g, 6).run();

    for row in 0..g.symbol_count() {
        for size in 1..=6 {
            let bucket = bank.bucket(row, size);
            for term in bucket {
                assert_eq!(term.size(), size, "mis-sized term {term}");
            }
            let distinct: HashSet<_> = bucket.iter().collect();
            assert_eq!(distinct.len(), bucket.len(), "duplicates at size {size}");
        }
    }
}

#[test]
fn growth_is_monotone_with_a_size_increasing_rule() {
    let (g, e) = unary_grammar();
    let row = g.index_of(e);
    let bank = Enumerator::new(&g, 7).run();

    let counts: Vec<usize> = (1..=7).map(|s| bank.bucket(row, s).len()).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "counts: {counts:?}");
    assert_eq!(counts[0], 2);
}

#[test]
fn enumeration_matches_brute_force() {
    init_logger();
    let (g, e) = unary_grammar();
    let row = g.index_of(e);
    let bank = Enumerator::new(&g, 6).run();

    for size in 1..=6 {
        let expected = brute_force(&g, e, size);
        let got: HashSet<Rc<Term>> = bank.bucket(row, size).iter().cloned().collect();
        assert_eq!(got.len(), bank.bucket(row, size).len());
        assert_eq!(got, expected, "mismatch at size {size}");
    }
}

#[test]
fn enumeration_is_deterministic() {
    let (g, e) = unary_grammar();
    let row = g.index_of(e);
    let first = Enumerator::new(&g, 5).run();
    let second = Enumerator::new(&g, 5).run();

    for size in 1..=5 {
        assert_eq!(names(&first, row, size), names(&second, row, size));
    }
}

#[test]
fn milestones_report_every_bucket() {
    let (g, e, v) = add_grammar();
    let mut seen = Vec::new();
    let bank = Enumerator::new(&g, 3)
        .run_with(|m| seen.push((m.index, m.size, m.produced)));

    // one milestone per (non-terminal, size)
    assert_eq!(seen.len(), g.symbol_count() * 3);
    for (index, size, produced) in seen {
        assert_eq!(bank.bucket(index, size).len(), produced);
    }
    assert_eq!(g.index_of(e), 0);
    assert_eq!(g.index_of(v), 1);
}

#[test]
fn lazy_stream_agrees_with_the_table() {
    let (g, e) = unary_grammar();
    let row = g.index_of(e);
    let reference = Enumerator::new(&g, 5).run();
    let expected: Vec<String> = (1..=5).flat_map(|s| names(&reference, row, s)).collect();

    let (g, _) = unary_grammar();
    let mut synth = BottomUpSynth::new(g, 5);
    let mut streamed = Vec::new();
    while let Some(term) = synth.next_term() {
        streamed.push(term.to_string());
    }
    assert_eq!(streamed, expected);
}

#[test]
fn stock_grammar_smallest_instructions_are_assignments() {
    init_logger();
    let mut grammar = PgclGrammar::new();
    grammar.specialize(&["x".into(), "y".into()], &[]);
    let g = grammar.into_grammar();
    let bank = Enumerator::new(&g, 3).run();

    // instruction is the start symbol, row 0; no instruction fits in
    // sizes 1 and 2, and at size 3 only assignments fit: two
    // left-hand sides times three expression leaves (x, y, Param0)
    assert!(bank.bucket(0, 1).is_empty());
    assert!(bank.bucket(0, 2).is_empty());
    let assigns = names(&bank, 0, 3);
    assert_eq!(assigns.len(), 6);
    assert!(assigns.contains(&"assign(x,Param0)".to_string()));
    assert!(assigns.iter().all(|t| t.starts_with("assign(")));
}
