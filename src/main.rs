use anyhow::{Context as _, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, warn};
use std::fs;
use std::io::{self, Read};

use srl::{Context, combinator::is_word_char, parse, parse_fragment};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SRL source to compile; read from stdin when neither this nor --file is given
    #[arg(value_name = "SOURCE", conflicts_with = "file")]
    source: Option<String>,

    /// Read the SRL source from a file
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<String>,

    /// Define a name usable as a reference
    #[arg(short = 'd', long = "define", value_name = "NAME=SOURCE")]
    defines: Vec<String>,

    /// Print the parsed pattern as SRL instead of compiling it
    #[arg(long, conflicts_with = "ast")]
    describe: bool,

    /// Print the syntax tree instead of compiling it
    #[arg(long)]
    ast: bool,

    /// More logging; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    let source = read_source(&args)?;
    let pattern = parse(&source).context("Failed to parse source")?;
    if args.ast {
        println!("{pattern:#?}");
        return Ok(());
    }
    if args.describe {
        println!("{pattern}");
        return Ok(());
    }

    let builtins = Context::with_builtins();
    let mut scope = builtins.child();
    for define in &args.defines {
        let (name, body) = define
            .split_once('=')
            .with_context(|| format!("Definition '{define}' is not of the form NAME=SOURCE"))?;
        let name = name.trim();
        if name.is_empty() || !name.chars().all(is_word_char) {
            bail!("Invalid name '{name}': names are made of letters, digits and '_'");
        }
        let node = parse_fragment(body)
            .with_context(|| format!("Failed to parse definition of '{name}'"))?;
        if builtins.get(name).is_some() {
            debug!("'{name}' shadows a built-in");
        }
        if scope.define(name, node).is_some() {
            warn!("'{name}' is defined more than once; using the last definition");
        }
    }

    let regex = pattern
        .translate(&scope)
        .context("Failed to translate pattern")?;
    println!("{regex}");
    Ok(())
}

fn read_source(args: &Args) -> Result<String> {
    if let Some(source) = &args.source {
        return Ok(source.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path).with_context(|| format!("Failed to read {path}"));
    }
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;
    Ok(source)
}
