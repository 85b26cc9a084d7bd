use std::rc::Rc;

use crate::term::{Action, Term};

/// Handle to a non-terminal inside one [`Grammar`]. Handles are only
/// meaningful for the grammar that issued them; using a handle from
/// another grammar is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// A production: an ordered parameter list of non-terminal references
/// plus the semantic action that assembles a composite term from one
/// term per parameter.
#[derive(Debug, Clone)]
pub struct Rule {
    action: Action,
    params: Vec<SymbolId>,
}

impl Rule {
    pub fn new(action: Action, params: Vec<SymbolId>) -> Self {
        Self { action, params }
    }

    pub fn leaf(action: Action) -> Self {
        Self::new(action, Vec::new())
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn params(&self) -> &[SymbolId] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Assembles a new term from one child per parameter, in order.
    pub fn build(&self, children: Vec<Rc<Term>>) -> Rc<Term> {
        // Arity mismatch is 100% an enumerator bug, not an input error.
        assert_eq!(
            children.len(),
            self.params.len(),
            "rule `{}` built with wrong arity",
            self.action,
        );
        Rc::new(Term::new(self.action.clone(), children))
    }
}

/// Typed grammar symbol: a display name plus the ordered list of
/// productions it owns. The enumeration index is assigned by
/// [`Grammar::finalize`].
#[derive(Debug)]
pub struct NonTerminal {
    name: String,
    rules: Vec<Rule>,
    index: usize,
}

impl NonTerminal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Index assigned at finalization; the start symbol always gets 0.
    pub fn index(&self) -> usize {
        self.index
    }
}

const UNINDEXED: usize = usize::MAX;

/// A typed grammar: a symbol table plus a designated start symbol.
///
/// Rule lists may be rebuilt between synthesis runs (see
/// [`PgclGrammar::specialize`]) but must not change during an
/// enumeration pass. Note that two rules of one non-terminal must not
/// share an action tag, or the enumerator would produce structurally
/// identical terms twice.
#[derive(Debug, Default)]
pub struct Grammar {
    symbols: Vec<NonTerminal>,
    // index -> symbol handle, filled by finalize
    order: Vec<SymbolId>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, name: &str) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(NonTerminal {
            name: name.to_string(),
            rules: Vec::new(),
            index: UNINDEXED,
        });
        id
    }

    /// Replaces the whole rule list of `id`. Requires re-finalization
    /// before the next enumeration.
    pub fn set_rules(&mut self, id: SymbolId, rules: Vec<Rule>) {
        self.symbols[id.0].rules = rules;
        for symbol in &mut self.symbols {
            symbol.index = UNINDEXED;
        }
        self.order.clear();
    }

    /// Assigns every symbol a unique index `0..N-1`, swapping the
    /// start symbol into slot 0. Idempotent for an unchanged symbol
    /// table; must be re-run after rule lists are swapped in.
    pub fn finalize(&mut self, start: SymbolId) {
        assert!(start.0 < self.symbols.len(), "start symbol not in grammar");

        self.order = (0..self.symbols.len()).map(SymbolId).collect();
        let pos = self.order.iter().position(|id| *id == start).unwrap();
        self.order.swap(0, pos);

        for (index, id) in self.order.iter().enumerate() {
            self.symbols[id.0].index = index;
        }
    }

    pub fn is_finalized(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbol(&self, id: SymbolId) -> &NonTerminal {
        &self.symbols[id.0]
    }

    /// Looks a symbol up by its enumeration index.
    pub fn symbol_at(&self, index: usize) -> &NonTerminal {
        let id = self.order[index];
        &self.symbols[id.0]
    }

    /// Enumeration-table row of `id`.
    pub fn index_of(&self, id: SymbolId) -> usize {
        let index = self.symbols[id.0].index;
        assert_ne!(index, UNINDEXED, "grammar not finalized");
        index
    }

    pub fn start(&self) -> SymbolId {
        assert!(self.is_finalized(), "grammar not finalized");
        self.order[0]
    }
}

/// The stock invariant-synthesis grammar over pGCL: instructions
/// (if / assign / choice / sequence), expressions (or / and / add)
/// and the two terminal classes for program variables and synthesis
/// parameters. Expression base cases borrow the terminal rules.
#[derive(Debug)]
pub struct PgclGrammar {
    grammar: Grammar,
    pub instruction: SymbolId,
    pub expression: SymbolId,
    pub var: SymbolId,
    pub param: SymbolId,
}

impl PgclGrammar {
    pub fn new() -> Self {
        let mut grammar = Grammar::new();
        let instruction = grammar.add_symbol("Instruction");
        let expression = grammar.add_symbol("Expression");
        let var = grammar.add_symbol("Var");
        let param = grammar.add_symbol("Param");

        let mut this = Self {
            grammar,
            instruction,
            expression,
            var,
            param,
        };
        this.install_rules(
            vec![
                Rule::leaf(Action::Var("Var0".into())),
                Rule::leaf(Action::Var("Var1".into())),
            ],
            vec![
                Rule::leaf(Action::Param("Param0".into())),
                Rule::leaf(Action::Param("Param1".into())),
            ],
        );
        this
    }

    /// Rebuilds the Var/Param terminals for one concrete program: one
    /// 0-arity rule per discovered variable and parameter name, plus
    /// the synthetic parameter `Param0`. Re-finalizes the grammar.
    pub fn specialize(&mut self, vars: &[String], params: &[String]) {
        let var_rules = vars
            .iter()
            .map(|name| Rule::leaf(Action::Var(name.clone())))
            .collect();
        let param_rules = params
            .iter()
            .map(|name| Rule::leaf(Action::Param(name.clone())))
            .chain(std::iter::once(Rule::leaf(Action::Param("Param0".into()))))
            .collect();
        self.install_rules(var_rules, param_rules);
    }

    fn install_rules(&mut self, var_rules: Vec<Rule>, param_rules: Vec<Rule>) {
        let g = &mut self.grammar;
        g.set_rules(
            self.instruction,
            vec![
                // "if" "(" expression ")" block "else" block
                Rule::new(
                    Action::If,
                    vec![self.expression, self.instruction, self.instruction],
                ),
                // var ":=" rvalue
                Rule::new(Action::Assign, vec![self.var, self.expression]),
                // block "[" expression "]" block
                Rule::new(
                    Action::Choice,
                    vec![self.instruction, self.expression, self.instruction],
                ),
                // instruction instruction
                Rule::new(Action::Seq, vec![self.instruction, self.instruction]),
            ],
        );

        // Expression base cases are rebuilt from the fresh terminal
        // rules, never appended across specializations.
        let mut expr_rules = vec![
            Rule::new(Action::Or, vec![self.expression, self.expression]),
            Rule::new(Action::And, vec![self.expression, self.expression]),
            Rule::new(Action::Add, vec![self.expression, self.expression]),
        ];
        expr_rules.extend(var_rules.iter().cloned());
        expr_rules.extend(param_rules.iter().cloned());
        g.set_rules(self.expression, expr_rules);

        g.set_rules(self.var, var_rules);
        g.set_rules(self.param, param_rules);
        g.finalize(self.instruction);
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }
}

impl Default for PgclGrammar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_puts_start_first() {
        let mut g = Grammar::new();
        let a = g.add_symbol("A");
        let b = g.add_symbol("B");
        let c = g.add_symbol("C");
        g.finalize(b);

        assert_eq!(g.index_of(b), 0);
        assert_eq!(g.start(), b);
        assert_eq!(g.symbol_at(0).name(), "B");
        // b took a's original slot
        assert_eq!(g.index_of(a), 1);
        assert_eq!(g.index_of(c), 2);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut g = Grammar::new();
        let a = g.add_symbol("A");
        let b = g.add_symbol("B");
        g.finalize(b);
        let first: Vec<usize> = vec![g.index_of(a), g.index_of(b)];
        g.finalize(b);
        assert_eq!(first, vec![g.index_of(a), g.index_of(b)]);
    }

    #[test]
    fn set_rules_invalidates_indices() {
        let mut g = Grammar::new();
        let a = g.add_symbol("A");
        g.finalize(a);
        assert!(g.is_finalized());
        g.set_rules(a, vec![Rule::leaf(Action::Var("x".into()))]);
        assert!(!g.is_finalized());
    }

    #[test]
    #[should_panic(expected = "wrong arity")]
    fn build_with_wrong_arity_panics() {
        let mut g = Grammar::new();
        let e = g.add_symbol("E");
        let rule = Rule::new(Action::Add, vec![e, e]);
        rule.build(vec![Term::leaf(Action::Var("x".into()))]);
    }

    #[test]
    fn stock_grammar_is_finalized_on_instruction() {
        let g = PgclGrammar::new();
        assert_eq!(g.grammar().index_of(g.instruction), 0);
        assert_eq!(g.grammar().symbol(g.instruction).rules().len(), 4);
        // or/and/add plus two vars and two params borrowed as bases
        assert_eq!(g.grammar().symbol(g.expression).rules().len(), 7);
    }

    #[test]
    fn specialize_rebuilds_terminals() {
        let mut g = PgclGrammar::new();
        g.specialize(&["x".into(), "y".into()], &["a".into()]);
        assert_eq!(g.grammar().symbol(g.var).rules().len(), 2);
        // discovered parameter plus synthetic Param0
        assert_eq!(g.grammar().symbol(g.param).rules().len(), 2);
        assert_eq!(g.grammar().symbol(g.expression).rules().len(), 7);

        // a second specialization must not accumulate stale bases
        g.specialize(&["x".into()], &[]);
        assert_eq!(g.grammar().symbol(g.expression).rules().len(), 5);
        assert!(g.grammar().is_finalized());
    }
}
