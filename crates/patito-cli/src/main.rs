use std::{env, fs, process::ExitCode, time::Instant};

use patito::{Program, StdPrint, StderrTracer, compile};

const USAGE: &str = "usage: patito <tree.json> [--run] [--show-quads] [--trace] [--verbose]";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1).filter(|a| !a.starts_with("--")) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let should_run = args.iter().any(|a| a == "--run");
    let show_quads = args.iter().any(|a| a == "--show-quads");
    let trace = args.iter().any(|a| a == "--trace");
    let verbose = args.iter().any(|a| a == "--verbose");

    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {file_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let program: Program = match serde_json::from_str(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {file_path} is not a valid parse tree: {err}");
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let compiled = match compile(&program) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("compile error [{}]: {err}", err.kind());
            return ExitCode::FAILURE;
        }
    };
    if verbose {
        let elapsed = start.elapsed();
        eprintln!(
            "compiled '{}': {} quadruples, {} constants in {elapsed:?}",
            program.name,
            compiled.quads.len(),
            compiled.memory.constants().len(),
        );
    }

    if show_quads {
        print!("{}", compiled.quads);
    }

    if !should_run {
        return ExitCode::SUCCESS;
    }

    let result = if trace {
        compiled
            .run_traced(&mut StdPrint, StderrTracer::new())
            .map(|(output, _)| output)
    } else {
        compiled.run(&mut StdPrint)
    };
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("runtime error [{}]: {err}", err.kind());
            ExitCode::FAILURE
        }
    }
}
