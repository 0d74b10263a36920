use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use remin::{compile_with, run, words, Alphabet, CompileOptions, Strategy, TracingObserver};
use tracing::{debug, info, Level};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RefineStrategy {
    Rescan,
    Worklist,
}

impl From<RefineStrategy> for Strategy {
    fn from(strategy: RefineStrategy) -> Self {
        match strategy {
            RefineStrategy::Rescan => Strategy::Rescan,
            RefineStrategy::Worklist => Strategy::Worklist,
        }
    }
}

/// Compile a regular expression to a minimal DFA and test strings against it
#[derive(Debug, Parser)]
#[command(name = "remin", version)]
struct Cli {
    /// Regular expression using | . * + ( ) and ε
    regex: String,

    /// Strings to run through the minimal DFA
    #[arg(short, long, num_args = 1..)]
    test: Vec<String>,

    /// Run every word up to this length through the minimal DFA
    #[arg(short, long, value_name = "LENGTH")]
    generate: Option<usize>,

    /// Restrict operands to these characters
    #[arg(short, long)]
    alphabet: Option<String>,

    /// Add a trap state so every state has a move on every symbol
    #[arg(long)]
    complete: bool,

    #[arg(long, value_enum, default_value_t = RefineStrategy::Rescan)]
    strategy: RefineStrategy,

    /// Write the minimal DFA as a binary record
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Write the minimal DFA as Graphviz source
    #[arg(long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "debug")]
    verbose: bool,

    /// Turn on debugging information
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::TRACE
    } else if cli.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;

    let alphabet = match &cli.alphabet {
        Some(symbols) => Alphabet::only(symbols.chars()).context("invalid alphabet")?,
        None => Alphabet::Any,
    };
    let options = CompileOptions {
        alphabet,
        complete: cli.complete,
        strategy: cli.strategy.into(),
        ..CompileOptions::default()
    };

    let compilation = compile_with(&cli.regex, &options, &mut TracingObserver)
        .with_context(|| format!("failed to compile '{}'", cli.regex))?;
    let dfa = &compilation.minimal;

    info!("postfix: {}", compilation.postfix_string());
    info!(
        "nfa: {} states, dfa: {} states, minimal dfa: {} states ({} removed)",
        compilation.nfa.len(),
        compilation.dfa.len(),
        dfa.len(),
        compilation.states_removed()
    );

    println!("initial: {}", dfa.initial().map(|s| s.to_string()).unwrap_or_default());
    let accepting: Vec<String> = dfa.accepting().iter().map(|s| s.to_string()).collect();
    println!("accepting: {{{}}}", accepting.join(", "));
    for t in dfa.transitions() {
        println!("{} --{}--> {}", t.origin, t.symbol, t.destination);
    }

    let mut inputs = cli.test.clone();
    if let Some(length) = cli.generate {
        inputs.extend(words(dfa.alphabet(), length));
    }
    for input in &inputs {
        let trace = run(dfa, input).context("minimal dfa is malformed")?;
        let path: Vec<String> = trace.path.iter().map(|s| s.to_string()).collect();
        println!("{:?}: {} [{}]", input, trace.outcome, path.join(" -> "));
    }

    if let Some(path) = &cli.export {
        let bytes = dfa.to_record().encode().context("failed to encode automaton")?;
        std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote binary record to {}", path.display());
    }

    if let Some(path) = &cli.dot {
        std::fs::write(path, dfa.to_dot()).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote dot graph to {}", path.display());
    }

    Ok(())
}
