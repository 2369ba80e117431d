// Demo host for the option parser: registers a handful of options, reads
// them from the command line (and optionally a config file) and reports
// what it found.

use optparse::{Error, Feature, Opt, OptionParser, Result};
use tracing_subscriber::EnvFilter;

fn build_parser() -> Result<OptionParser> {
    let mut parser = OptionParser::new();
    parser.add_option(Opt::string("input").description("Input file"))?;
    parser.add_option(Opt::string("output").description("Output file"))?;
    parser.add_option(
        Opt::int("count")
            .bounds(1, 100)
            .description("Number of passes"),
    )?;
    parser.add_option(
        Opt::combo("mode", ["fast", "slow", "normal"]).description("Processing mode"),
    )?;
    parser.add_option(Opt::feature("color").description("Colored output"))?;
    parser.add_option(Opt::array("tags").description("Comma separated tags"))?;
    parser.add_option(
        Opt::string("config").description("Read options from FILE; the command line wins"),
    )?;
    parser.add_option(Opt::flag("verbose").description("Report which options were parsed"))?;
    parser.add_option(Opt::flag("help").description("Show this help"))?;
    Ok(parser)
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the diagnostic and exit with status 1.
fn fatal(err: &Error) -> ! {
    eprintln!("{}", err.diagnostic());
    std::process::exit(1);
}

fn or_not_set(value: Option<String>) -> String {
    value.unwrap_or_else(|| "Not set".to_string())
}

fn run(args: &[String]) -> Result<()> {
    let mut parser = build_parser()?;
    parser.process_arguments(args)?;

    if let Some(path) = parser.get::<String>("config") {
        parser.reset_options();
        parser.process_config_file(&path)?;
        parser.process_arguments(args)?;
    }

    if parser.has_option("help") {
        parser.print_usage();
        return Ok(());
    }

    if OptionParser::has_command(args) {
        println!("Command detected: {}", args[1]);
    } else {
        println!("No command detected.");
    }

    println!("Input: {}", or_not_set(parser.get("input")));
    println!("Output: {}", or_not_set(parser.get("output")));
    println!(
        "Count: {}",
        or_not_set(parser.get::<i64>("count").map(|n| n.to_string()))
    );
    println!("Mode: {}", or_not_set(parser.get("mode")));
    println!(
        "Color: {}",
        or_not_set(parser.get::<Feature>("color").map(|f| f.to_string()))
    );
    println!(
        "Tags: {}",
        or_not_set(parser.get::<Vec<String>>("tags").map(|t| t.join(",")))
    );
    println!("Verbose: {}", parser.has_option("verbose"));

    if parser.has_option("verbose") {
        parser.print_parsed_options();
        if !parser.positionals().is_empty() {
            println!("Positional: {}", parser.positionals().join(" "));
        }
    }

    Ok(())
}

fn main() {
    setup_tracing();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        fatal(&e);
    }
}
