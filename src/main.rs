use clap::Parser;
use docdex::{
    Engine,
    EngineConfig,
    MatchMode,
    SearchResponse,
    error,
    loader,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCDEX_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let engine = open_engine(&cli)?;

    match cli.command {
        Command::Search(args) => {
            let response = engine.search(&args.query, args.count);
            if args.json {
                print_json(&response)?;
            } else {
                print_results(&response);
            }
        }
        Command::Stats(args) => {
            let stats = engine.stats();
            if args.json {
                print_json(&stats)?;
            } else {
                println!("Documents: {}", stats.docs_count);
            }
        }
        Command::Debug => print_json(&engine.debug())?,
        Command::Fields(args) => {
            let fields = engine.indexed_fields();
            if args.json {
                print_json(&fields)?;
            } else if fields.is_empty() {
                println!("No fields indexed.");
            } else {
                for field in &fields {
                    println!("{field}");
                }
            }
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

/// Build the engine from `--config` and the flags, then load every
/// `--input` file as one batch each.
fn open_engine(cli: &Cli) -> error::Result<Engine> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if cli.match_all {
        config.match_mode = MatchMode::All;
    }
    if cli.exact {
        config.partial_match = false;
    }

    let engine = Engine::new(config)?;
    for path in &cli.inputs {
        let docs = loader::load_documents(path)?;
        let added = engine.add_documents(&docs)?;
        info!(
            path = %path.display(),
            read = docs.len(),
            indexed = added.indexed,
            "loaded documents"
        );
    }
    Ok(engine)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_results(response: &SearchResponse) {
    if response.hits.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, hit) in response.hits.iter().enumerate() {
        match &hit.doc {
            Some(doc) => println!("{:>3}. {} {}", i + 1, hit.id, doc),
            None => println!("{:>3}. {} (missing)", i + 1, hit.id),
        }
    }
    println!("\n{} result(s)", response.total);
}
