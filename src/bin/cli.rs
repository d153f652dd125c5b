use clap::Parser;
use colored::Colorize;
use plotexpr::{FormulaError, Function, FunctionCache, SampleGrid};
use std::process;

#[derive(Parser)]
#[command(name = "plotexpr-cli")]
#[command(about = "Compile a formula of x and print a table of its values")]
#[command(version)]
struct Args {
    /// Formula to compile, e.g. "-(x^2)-sin(x*pi*8)"
    expression: String,

    /// First x value
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    from: f64,

    /// Last x value
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    to: f64,

    /// Number of evenly spaced samples
    #[arg(long, default_value_t = 11)]
    samples: usize,

    /// Print the constant-folded tree
    #[arg(long)]
    tree: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let cache = FunctionCache::new();
    let function = match Function::parse("f", &args.expression, &cache) {
        Ok(function) => function,
        Err(e) => {
            report(&args.expression, &e);
            process::exit(1);
        }
    };

    if args.tree {
        println!("{} {}", "Folded:".cyan(), function.artifact().tree());
    }

    let grid = SampleGrid::between(args.from, args.to, args.samples);
    let values = function.sample(&grid);
    println!("{:>16}  {:>24}", "x".bold(), function.to_string().bold());
    for (x, y) in grid.xs().zip(values) {
        println!("{x:>16.6}  {y:>24.12}");
    }
}

/// Prints an error, with a caret under the offending column when there is one.
fn report(expression: &str, error: &FormulaError) {
    if let FormulaError::Parse(parse_error) = error {
        if let Some(column) = parse_error.column() {
            eprintln!("  {expression}");
            eprintln!("  {}{}", " ".repeat(column - 1), "^".red().bold());
        }
    }
    eprintln!("{} {}", "Error:".red().bold(), error);
}
