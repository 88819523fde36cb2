//! Command implementations for the `opal` binary.
//!
//! Each command returns `Ok(())` on success or `Err(exit_code)` after
//! printing a diagnostic to stderr.

use std::io::Read;

use opal_frontend::ast;
use opal_frontend::{check, parse, print_program, tokenize, Token};
use opal_vm::Vm;

/// Print the token stream, one token per line.
pub fn tokens(args: &[String]) -> Result<(), i32> {
    let source = read_source(args.first())?;
    let tokens = lex(&source)?;
    for token in &tokens {
        println!("{token}");
    }
    Ok(())
}

/// Parse only, reporting any syntax error.
pub fn parse_only(args: &[String]) -> Result<(), i32> {
    let source = read_source(args.first())?;
    parse_source(&source)?;
    Ok(())
}

/// Parse and pretty-print the program back out.
pub fn print(args: &[String]) -> Result<(), i32> {
    let source = read_source(args.first())?;
    let program = parse_source(&source)?;
    print!("{}", print_program(&program));
    Ok(())
}

/// Run the full static analysis. Silent on success.
pub fn check_only(args: &[String]) -> Result<(), i32> {
    let source = read_source(args.first())?;
    frontend(&source)?;
    Ok(())
}

/// Compile and print the bytecode listing.
pub fn ir(args: &[String]) -> Result<(), i32> {
    let source = read_source(args.first())?;
    let ast = frontend(&source)?;
    let program = compile(&ast)?;
    print!("{program}");
    Ok(())
}

/// Compile and execute the program.
pub fn run(args: &[String]) -> Result<(), i32> {
    let source = read_source(args.first())?;
    let ast = frontend(&source)?;
    let program = compile(&ast)?;
    if let Err(err) = Vm::new(program).run() {
        eprintln!("error: {err}");
        return Err(3);
    }
    Ok(())
}

/// Reads the source file, or standard input when no path is given.
fn read_source(path: Option<&String>) -> Result<String, i32> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            eprintln!("error: cannot read '{path}': {err}");
            1
        }),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source).map_err(|err| {
                eprintln!("error: cannot read standard input: {err}");
                1
            })?;
            Ok(source)
        }
    }
}

fn lex(source: &str) -> Result<Vec<Token>, i32> {
    tokenize(source).map_err(|err| {
        eprintln!("error: {err}");
        2
    })
}

fn parse_source(source: &str) -> Result<ast::Program, i32> {
    let tokens = lex(source)?;
    parse(tokens).map_err(|err| {
        eprintln!("error: {err}");
        2
    })
}

/// Lex, parse, and check; the returned program carries the checker's
/// delete annotations and is ready for the compiler.
fn frontend(source: &str) -> Result<ast::Program, i32> {
    let mut program = parse_source(source)?;
    check(&mut program).map_err(|err| {
        eprintln!("error: {err}");
        2
    })?;
    Ok(program)
}

fn compile(ast: &ast::Program) -> Result<opal_common::Program, i32> {
    opal_compiler::compile(ast).map_err(|err| {
        eprintln!("error: {err}");
        2
    })
}
