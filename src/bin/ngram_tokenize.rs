use std::io::{self, Read, Write};
use std::process;

use clap::Parser;
use fts_ngram::{NgramConfig, NgramError, Token, TokenizeFlags, Tokenizer, TokenizerRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ngram-tokenize", about = "Print the n-gram tokens of a text")]
struct Cli {
    /// Text to tokenize (read from stdin if omitted)
    text: Option<String>,

    /// Tokenizer to instantiate
    #[arg(long, default_value = "ngram")]
    tokenizer: String,

    /// Construction argument, repeatable (e.g. --arg unicode61 --arg remove_diacritics --arg 0)
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Tokenize as a query instead of a document
    #[arg(long)]
    query: bool,

    /// Codepoints below this value are bigram-indexed (overrides NGRAM_WIDE_THRESHOLD)
    #[arg(long, value_parser = parse_threshold)]
    wide_threshold: Option<u32>,

    /// Do not emit the first character of each token on its own
    #[arg(long)]
    no_seed: bool,
}

fn parse_threshold(raw: &str) -> Result<u32, String> {
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    };
    match parsed {
        Ok(v) if (1..=0x110000).contains(&v) => Ok(v),
        Ok(v) => Err(format!("{} is outside 1..=0x110000", v)),
        Err(e) => Err(e.to_string()),
    }
}

fn read_input(cli_text: &Option<String>) -> io::Result<Vec<u8>> {
    if let Some(text) = cli_text {
        return Ok(text.as_bytes().to_vec());
    }
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

fn run(cli: &Cli) -> fts_ngram::Result<()> {
    let mut config = NgramConfig::from_env();
    if let Some(threshold) = cli.wide_threshold {
        config.wide_threshold = threshold;
    }
    if cli.no_seed {
        config.seed_first = false;
    }

    let registry = TokenizerRegistry::with_ngram_config(config);
    let args: Vec<&str> = cli.args.iter().map(String::as_str).collect();
    let tokenizer = registry.create(&cli.tokenizer, &args)?;

    let input = read_input(&cli.text)?;
    let flags = if cli.query {
        TokenizeFlags::QUERY
    } else {
        TokenizeFlags::DOCUMENT
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    tokenizer.tokenize(flags, &input, &mut |token: Token<'_>| {
        writeln!(
            out,
            "{}\t{}\t{}",
            token.start,
            token.end,
            String::from_utf8_lossy(token.text)
        )
        .map_err(NgramError::from)
    })?;
    out.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}
