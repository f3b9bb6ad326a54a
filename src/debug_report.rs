use graphmaster::{MatchResult, NodeStats};
use std::time::Duration;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub struct Report<'a> {
    pub input: &'a str,
    pub that: &'a str,
    pub topic: &'a str,
    pub result: Option<&'a MatchResult<'a>>,
    pub elapsed: Duration,
    pub stats: Option<NodeStats>,
    pub graph_lines: Option<Vec<String>>,
}

pub fn print_run(report: &Report<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Matching: \"{}\"", report.input), ansi::CYAN))
    );
    println!(
        "   {} {}  {} {}",
        palette.dim("that:"),
        palette.paint(report.that, ansi::BLUE),
        palette.dim("topic:"),
        palette.paint(report.topic, ansi::BLUE),
    );

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match report.result {
        Some(hit) => print_hit(hit, &palette),
        None => {
            println!("{}", palette.dim("  No match"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No pattern covers the input (add a '*' catch-all to check)");
            println!("  • The rule's that/topic patterns exclude this context");
            println!("  • A set wildcard found no member run at this position");
            println!(
                "\n{}",
                palette.dim("  Tip: set RUST_LOG=graphmaster=trace to see the search backtrack")
            );
        }
    }

    if let Some(stats) = &report.stats {
        println!("\n{}", palette.paint("━━━ Node statistics ━━━", ansi::GRAY));
        print_stats(stats, &palette);
    }

    if let Some(lines) = &report.graph_lines {
        println!("\n{}", palette.paint("━━━ Graph ━━━", ansi::GRAY));
        for line in lines {
            println!("  {}", palette.dim(line));
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!("  Total: {}", palette.paint(format!("{:?}", report.elapsed), ansi::GREEN));
    println!();
}

fn print_hit(hit: &MatchResult<'_>, palette: &ansi::Palette) {
    println!(
        "  {} {}",
        palette.bold(palette.paint(hit.category.template(), ansi::GREEN)),
        palette.dim(format!("│ rule: {}", hit.category.input_that_topic())),
    );
    print_stars("star", &hit.stars.input_stars, palette);
    print_stars("thatstar", &hit.stars.that_stars, palette);
    print_stars("topicstar", &hit.stars.topic_stars, palette);
}

fn print_stars(label: &str, stars: &[String], palette: &ansi::Palette) {
    for (idx, star) in stars.iter().enumerate() {
        println!(
            "      {} {}",
            palette.dim(format!("{label}[{idx}]:")),
            palette.paint(format!("\"{star}\""), ansi::YELLOW)
        );
    }
}

fn print_stats(stats: &NodeStats, palette: &ansi::Palette) {
    println!(
        "  {} categories  {} nodes  {} leaves  {} shortcuts",
        palette.paint(stats.categories.to_string(), ansi::GREEN),
        palette.paint(stats.nodes.to_string(), ansi::BLUE),
        palette.paint(stats.leaves.to_string(), ansi::BLUE),
        palette.paint(stats.shortcuts.to_string(), ansi::BLUE),
    );
    println!(
        "  {} singletons  {} n-ary  {} branches  {} average branching",
        palette.dim(stats.singletons.to_string()),
        palette.dim(stats.nary.to_string()),
        palette.dim(stats.branches.to_string()),
        palette.dim(format!("{:.2}", stats.average_branching)),
    );
}
