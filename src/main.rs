mod debug_report;

use graphmaster::{Category, GraphError, Graphmaster, MatchContext, Properties, WordSets};
use std::io::{self, IsTerminal, Read};
use std::time::Instant;

const DEFAULT_THAT: &str = "unknown";
const DEFAULT_TOPIC: &str = "unknown";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut sets = WordSets::new();
    for (name, members) in &config.sets {
        sets.define(name, members.iter().map(String::as_str));
    }
    let mut properties = Properties::new();
    for (name, value) in &config.properties {
        properties.set(name, value.clone());
    }
    let ctx = MatchContext::new(&sets, &properties);

    let mut graph = Graphmaster::new("cli");
    for category in config.categories {
        if let Err(err) = graph.add_category(category, &ctx) {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    }

    let started = Instant::now();
    let result = match graph.matches(&config.input, &config.that, &config.topic, &ctx) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };
    let elapsed = started.elapsed();

    let report = debug_report::Report {
        input: &config.input,
        that: &config.that,
        topic: &config.topic,
        result: result.as_ref(),
        elapsed,
        stats: config.show_stats.then(|| graph.node_stats()),
        graph_lines: config.show_graph.then(|| graph.render_graph()),
    };
    debug_report::print_run(&report, config.color);
}

struct CliConfig {
    input: String,
    that: String,
    topic: String,
    categories: Vec<Category>,
    sets: Vec<(String, Vec<String>)>,
    properties: Vec<(String, String)>,
    show_stats: bool,
    show_graph: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut that = DEFAULT_THAT.to_string();
    let mut topic = DEFAULT_TOPIC.to_string();
    let mut categories = Vec::new();
    let mut sets = Vec::new();
    let mut properties = Vec::new();
    let mut show_stats = false;
    let mut show_graph = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("graphmaster {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--stats" => show_stats = true,
            "--graph" => show_graph = true,
            "--that" => that = expect_value(&mut args, "--that")?,
            "--topic" => topic = expect_value(&mut args, "--topic")?,
            "-c" | "--category" => {
                let spec = expect_value(&mut args, "--category")?;
                categories.push(parse_category(&spec)?);
            }
            "--set" => {
                let spec = expect_value(&mut args, "--set")?;
                sets.push(parse_set(&spec)?);
            }
            "--property" => {
                let spec = expect_value(&mut args, "--property")?;
                properties.push(parse_property(&spec)?);
            }
            "--input" | "-i" => {
                let value = expect_value(&mut args, "--input")?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    if categories.is_empty() {
        return Err(format!("error: no categories defined\n\n{}", help_text()));
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig {
        input,
        that,
        topic,
        categories,
        sets,
        properties,
        show_stats,
        show_graph,
        color,
    })
}

fn expect_value(
    args: &mut std::iter::Peekable<std::iter::Skip<std::env::Args>>,
    option: &str,
) -> Result<String, String> {
    args.next().ok_or_else(|| format!("error: {option} expects a value"))
}

/// `PATTERN | TEMPLATE` or `PATTERN | THAT | TOPIC | TEMPLATE`.
fn parse_category(spec: &str) -> Result<Category, String> {
    let parts: Vec<&str> = spec.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [pattern, template] => Ok(Category::new(pattern, "*", "*", *template)),
        [pattern, that, topic, template] => Ok(Category::new(pattern, that, topic, *template)),
        _ => Err(format!(
            "error: bad category '{spec}' (expected 'PATTERN | TEMPLATE' or 'PATTERN | THAT | TOPIC | TEMPLATE')"
        )),
    }
}

/// `NAME: member, member, ...`
fn parse_set(spec: &str) -> Result<(String, Vec<String>), String> {
    let (name, members) = spec
        .split_once(':')
        .ok_or_else(|| format!("error: bad set '{spec}' (expected 'NAME: member, member')"))?;
    let members: Vec<String> =
        members.split(',').map(|m| m.trim().to_string()).filter(|m| !m.is_empty()).collect();
    Ok((name.trim().to_string(), members))
}

/// `name=value`
fn parse_property(spec: &str) -> Result<(String, String), String> {
    let (name, value) = spec
        .split_once('=')
        .ok_or_else(|| format!("error: bad property '{spec}' (expected 'name=value')"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn read_stdin_input() -> Result<String, String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer).map_err(|e| format!("error reading stdin: {e}"))?;
    Ok(buffer.trim().to_string())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "graphmaster {} - match an input against an inline rule set

USAGE:
    graphmaster [OPTIONS] [INPUT...]

OPTIONS:
    -i, --input <TEXT>       input sentence (or pass it positionally / via stdin)
        --that <TEXT>        previous bot utterance [default: {DEFAULT_THAT}]
        --topic <TEXT>       conversation topic [default: {DEFAULT_TOPIC}]
    -c, --category <SPEC>    add a rule: 'PATTERN | TEMPLATE' or
                             'PATTERN | THAT | TOPIC | TEMPLATE' (repeatable)
        --set <SPEC>         define a word set: 'NAME: member, member' (repeatable)
        --property <SPEC>    set a bot property: 'name=value' (repeatable)
        --stats              print node statistics
        --graph              print the trie rendering
        --color / --no-color force colored output on or off
    -h, --help               print this help
    -V, --version            print version

EXAMPLE:
    graphmaster -c 'I LIKE * | Me too.' -c 'HELLO | Hi there!' -- i like mangoes

Set RUST_LOG=graphmaster=trace to watch the search backtrack.",
        env!("CARGO_PKG_VERSION")
    )
}
