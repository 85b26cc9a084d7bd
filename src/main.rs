use clap::Parser;
use log::{debug, info};

use invsynth::enumerate::{BottomUpSynth, Synthesizer};
use invsynth::grammar::PgclGrammar;
use invsynth::translate::to_surface;

/// Enumerates candidate invariant programs for the given variable and
/// parameter names, printing each one.
#[derive(Parser)]
struct Cli {
    /// Largest candidate term size to enumerate.
    #[arg(long, default_value_t = 7)]
    max_size: usize,

    /// Program variable names available to the candidates.
    #[arg(long = "var")]
    vars: Vec<String>,

    /// Synthesis parameter names available to the candidates.
    #[arg(long = "param")]
    params: Vec<String>,
}

fn main() {
    colog::init();
    let cli = Cli::parse();

    let mut grammar = PgclGrammar::new();
    if !cli.vars.is_empty() || !cli.params.is_empty() {
        grammar.specialize(&cli.vars, &cli.params);
    }

    let mut synth = BottomUpSynth::new(grammar.into_grammar(), cli.max_size);
    let mut printed = 0usize;
    while let Some(term) = synth.next_term() {
        match to_surface(&term) {
            Ok(node) => {
                println!("--------------------------------");
                println!("{node}");
                printed += 1;
            }
            Err(error) => debug!("skipping {term}: {error}"),
        }
    }

    info!("{printed} candidates up to size {}", cli.max_size);
}
