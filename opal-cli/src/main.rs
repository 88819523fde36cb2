//! Command-line driver for the Opal toolchain.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage or input error
//! - 2: Lex, parse, or static analysis error
//! - 3: Runtime error

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "tokens" => commands::tokens(&args[2..]),
        "parse" => commands::parse_only(&args[2..]),
        "print" => commands::print(&args[2..]),
        "check" => commands::check_only(&args[2..]),
        "ir" => commands::ir(&args[2..]),
        "run" => commands::run(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: opal <command> [file.opal]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens [file]   Print the token stream");
    eprintln!("  parse [file]    Parse, reporting any syntax error");
    eprintln!("  print [file]    Parse and pretty-print the program");
    eprintln!("  check [file]    Parse and run static analysis");
    eprintln!("  ir [file]       Compile and print the bytecode listing");
    eprintln!("  run [file]      Compile and execute the program");
    eprintln!();
    eprintln!("With no file, the program is read from standard input.");
}
