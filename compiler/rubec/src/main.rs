//! Rube front-end CLI.

use rubec::commands::{lex_file, LexFlags};

fn main() {
    rubec::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "lex" => {
            let mut flags = LexFlags::default();
            let mut path = None;
            for arg in args.iter().skip(2) {
                match arg.as_str() {
                    "-q" | "--quiet" => flags.verbose = false,
                    "--spans" => flags.spans = true,
                    _ if arg.starts_with('-') => {
                        eprintln!("error: unknown option '{arg}'");
                        std::process::exit(1);
                    }
                    _ if path.is_none() => path = Some(arg.as_str()),
                    _ => {
                        eprintln!("error: unexpected argument '{arg}'");
                        std::process::exit(1);
                    }
                }
            }
            let Some(path) = path else {
                eprintln!("error: missing file path");
                eprintln!("Usage: rubec lex <file.rb> [--quiet] [--spans]");
                std::process::exit(1);
            };
            if !lex_file(path, &flags) {
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("rubec {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Rube front-end developer tool");
    println!();
    println!("Usage: rubec <command> [options]");
    println!();
    println!("Commands:");
    println!("  lex <file>     Dump the token stream and scanner diagnostics");
    println!("  help           Show this message");
    println!("  version        Show version information");
    println!();
    println!("Options for lex:");
    println!("  -q, --quiet    Skip warnings that need verbose mode");
    println!("  --spans        Print byte spans next to tokens");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=rube_lexer=trace) for scanner tracing.");
}
