use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tapir::frontend::lexer::Lexer;
use tapir::frontend::parser;
use tapir::frontend::token_dumper::TokenDumper;
use tapir::{Program, VM, VMConfig};

/// tapir - interpreter for a tiny tape language
#[derive(Parser, Debug)]
#[command(name = "tapir")]
#[command(about = "Run a tape program", long_about = None)]
struct Args {
    /// Source file (or encoded program with --load-ast)
    file: PathBuf,

    /// Print the tokens and exit
    #[arg(long)]
    tokens: bool,

    /// Disable ANSI colors in --tokens output
    #[arg(long)]
    no_color: bool,

    /// Print the parsed tree and exit
    #[arg(long)]
    ast: bool,

    /// Write the parsed program in binary form to PATH instead of running it
    #[arg(long, value_name = "PATH")]
    emit_ast: Option<PathBuf>,

    /// Treat FILE as a program previously written with --emit-ast
    #[arg(long)]
    load_ast: bool,

    /// Maximum nesting of function calls
    #[arg(long, default_value_t = VMConfig::default().max_call_depth)]
    max_call_depth: usize,

    /// Abort after this many evaluation steps
    #[arg(long)]
    max_steps: Option<usize>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the level; default to WARN so soft faults are visible.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let program = if args.load_ast {
        let bytes = std::fs::read(&args.file)
            .map_err(|e| format!("Failed to read '{}': {}", args.file.display(), e))?;
        Program::from_bytes(&bytes).map_err(|e| format!("Invalid encoded program: {}", e))?
    } else {
        let source = std::fs::read_to_string(&args.file)
            .map_err(|e| format!("Failed to read '{}': {}", args.file.display(), e))?;
        let tokens = Lexer::new(&source).tokenize();

        if args.tokens {
            let mut dumper = TokenDumper::new().pretty();
            if args.no_color {
                dumper = dumper.no_color();
            }
            return dumper
                .dump(&mut io::stdout().lock(), &tokens)
                .map_err(|e| e.to_string());
        }

        parser::parse(tokens).map_err(|e| format!("Parse error: {}", e))?
    };

    if args.ast {
        println!("{:#?}", program);
        return Ok(());
    }

    if let Some(path) = &args.emit_ast {
        let bytes = program.to_bytes().map_err(|e| e.to_string())?;
        return std::fs::write(path, bytes)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e));
    }

    let config = VMConfig {
        max_call_depth: args.max_call_depth,
        max_steps: args.max_steps,
    };
    let mut vm = VM::with_config(tapir::StdHost, config);
    let result = vm.run(&program);

    let diagnostics = vm.diagnostics().len();
    if diagnostics > 0 {
        tracing::warn!(diagnostics, "run finished with reported errors");
    }

    result.map_err(|e| e.to_string())
}
