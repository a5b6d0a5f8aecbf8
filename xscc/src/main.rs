use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
};

use clap::Parser;
use xsc::{Compiler, CompilerErrorLoc, CompilerOptions};

/// Compiles X-dialect source into NASM assembly
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Filename of the input
    #[clap(short, long, value_parser)]
    input: String,

    /// Filename of the output, stdout if not provided
    #[clap(short, long, value_parser)]
    output: Option<String>,

    /// Do not echo source lines as comments
    #[clap(long)]
    no_source: bool,

    /// Drop user comments from the output
    #[clap(long)]
    no_comments: bool,
}

fn print_error(err: &CompilerErrorLoc) {
    eprintln!("Error: {}", err.err);

    if let Some(t) = &err.text {
        eprintln!("{} >> {}", err.line, t);
    }
}

fn main() {
    // Only enable logging if debug build
    #[cfg(debug_assertions)]
    pretty_env_logger::init_timed();

    let args = Args::parse();

    let options = CompilerOptions {
        emit_source: !args.no_source,
        emit_user_comments: !args.no_comments,
    };

    let input = match File::open(&args.input) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Unable to read input file {} - {e}", args.input);
            std::process::exit(1);
        }
    };

    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => {
                eprintln!("Unable to create output file {path} - {e}");
                std::process::exit(1);
            }
        },
        None => Box::new(BufWriter::new(io::stdout())),
    };

    log::info!("compiling {}", args.input);

    let mut compiler = Compiler::new(options);
    if let Err(e) = compiler.compile(input, &mut output) {
        print_error(&e);
        std::process::exit(2);
    }

    if let Err(e) = output.flush() {
        eprintln!("Unable to write output - {e}");
        std::process::exit(1);
    }

    log::info!(
        "compiled {} lines from {}",
        compiler.state().get_line() - 1,
        args.input
    );
}
