use anyhow::{Context, Result, bail};
use clap::Parser;
use rowsift::query::{FilterOp, QuerySpec, RangeFilter, ValueFilter};
use rowsift::{SearchConfig, SearchEngine, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowsift")]
#[command(about = "Search engine for tabular files")]
struct Cli {
    /// Tabular file to load (.csv, .tsv, .txt, .xlsx, .xls)
    file: PathBuf,

    /// Search term
    term: Option<String>,

    /// Whole combined text must equal the term
    #[arg(long)]
    exact: bool,

    /// Accept matches within edit distance 2
    #[arg(long)]
    fuzzy: bool,

    /// Treat the term as a regular expression
    #[arg(long)]
    regex: bool,

    /// Every whitespace-separated word must appear
    #[arg(long)]
    all_words: bool,

    /// At least one word must appear
    #[arg(long)]
    any_word: bool,

    /// The term must appear as a contiguous substring
    #[arg(long)]
    phrase: bool,

    /// Case-sensitive matching
    #[arg(long)]
    case_sensitive: bool,

    /// Comma-separated column subset to search
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Column value filter as column:op:value (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Numeric range filter as column:min:max (repeatable)
    #[arg(long = "range")]
    ranges: Vec<String>,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<usize>,

    /// Print word completions for a prefix instead of searching
    #[arg(long)]
    suggest: Option<String>,

    /// Print load statistics and exit
    #[arg(long)]
    stats: bool,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    let engine = SearchEngine::new(config.clone());
    engine
        .load(&cli.file)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;

    if cli.stats {
        output::print_stats(
            engine.row_count(),
            &engine.column_headers(),
            engine.memory_estimate(),
            engine.cached_searches(),
        )?;
        return Ok(());
    }

    if let Some(prefix) = &cli.suggest {
        let suggestions = engine.suggest(prefix, cli.limit.unwrap_or(20));
        output::print_suggestions(&suggestions)?;
        return Ok(());
    }

    let spec = build_spec(&cli, &config)?;
    let results = engine.search(&spec)?;
    output::print_records(&results, &engine.column_headers(), !cli.no_color)?;

    Ok(())
}

fn build_spec(cli: &Cli, config: &SearchConfig) -> Result<QuerySpec> {
    let mut value_filters = Vec::new();
    for raw in &cli.filters {
        value_filters.push(parse_value_filter(raw)?);
    }

    let mut range_filters = Vec::new();
    for raw in &cli.ranges {
        range_filters.push(parse_range_filter(raw)?);
    }

    Ok(QuerySpec {
        term: cli.term.clone().unwrap_or_default(),
        exact_match: cli.exact,
        // Config supplies the defaults; the flags can only turn them on
        fuzzy_search: cli.fuzzy || config.fuzzy_search,
        use_regex: cli.regex,
        all_words: cli.all_words,
        any_word: cli.any_word,
        phrase: cli.phrase,
        case_sensitive: cli.case_sensitive || config.case_sensitive,
        columns: cli.columns.clone(),
        value_filters,
        range_filters,
        limit: cli.limit.unwrap_or(0),
        ..QuerySpec::default()
    })
}

fn parse_value_filter(raw: &str) -> Result<ValueFilter> {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    let [column, op, value] = parts.as_slice() else {
        bail!("invalid filter {raw:?}, expected column:op:value");
    };
    let op = FilterOp::parse(op)
        .with_context(|| format!("unknown filter operator {op:?} in {raw:?}"))?;
    Ok(ValueFilter {
        column: column.to_string(),
        op,
        value: value.to_string(),
    })
}

fn parse_range_filter(raw: &str) -> Result<RangeFilter> {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    let [column, min, max] = parts.as_slice() else {
        bail!("invalid range {raw:?}, expected column:min:max");
    };
    Ok(RangeFilter {
        column: column.to_string(),
        min: min
            .parse()
            .with_context(|| format!("invalid range minimum {min:?}"))?,
        max: max
            .parse()
            .with_context(|| format!("invalid range maximum {max:?}"))?,
    })
}
