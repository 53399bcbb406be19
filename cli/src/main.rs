//! problemkit CLI — render a fault description as problem JSON.
//!
//! Usage:
//! ```bash
//! # Render a fault file under status 500
//! problemkit render --fault fault.json --status 500
//!
//! # Inline fault, message overrides, pretty output
//! problemkit render --data '{"kind":"db.Timeout","message":"query timed out"}' \
//!     --catalog messages.json --pretty
//!
//! # Show which catalog keys were consulted
//! problemkit render --fault fault.json --debug
//! ```

use std::env;
use std::fs;
use std::process;
use std::sync::Arc;

use http::StatusCode;
use problemkit_core::{EngineConfig, Fault, MemoryCatalog};
use problemkit_engine::ProblemEngine;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "render" => cmd_render(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("problemkit {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("problemkit {}", env!("CARGO_PKG_VERSION"));
    println!("Render fault descriptions as problem JSON\n");
    println!("USAGE:");
    println!("    problemkit <COMMAND>\n");
    println!("COMMANDS:");
    println!("    render    Render a fault description as a problem");
    println!("    version   Print version");
    println!("    help      Print this help\n");
    println!("RENDER FLAGS:");
    println!("    --fault <FILE>     Fault description JSON file");
    println!("    --data <JSON>      Inline fault description JSON");
    println!("    --status <CODE>    HTTP-like status code (default 500)");
    println!("    --catalog <FILE>   Message catalog JSON (flat key -> template)");
    println!("    --traces           Attach processed stack traces");
    println!("    --no-causes        Do not follow nested causes");
    println!("    --debug            Attach resolver lookup descriptors");
    println!("    --pretty           Pretty-print the output");
}

fn cmd_render(args: &[String]) {
    let mut fault_file: Option<String> = None;
    let mut fault_inline: Option<String> = None;
    let mut status_code: u16 = 500;
    let mut catalog_file: Option<String> = None;
    let mut traces = false;
    let mut no_causes = false;
    let mut debug = false;
    let mut pretty = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--fault" => {
                i += 1;
                fault_file = args.get(i).cloned();
            }
            "--data" => {
                i += 1;
                fault_inline = args.get(i).cloned();
            }
            "--status" => {
                i += 1;
                status_code = match args.get(i).and_then(|s| s.parse().ok()) {
                    Some(code) => code,
                    None => {
                        eprintln!("Error: --status expects a numeric code");
                        process::exit(1);
                    }
                };
            }
            "--catalog" => {
                i += 1;
                catalog_file = args.get(i).cloned();
            }
            "--traces" => traces = true,
            "--no-causes" => no_causes = true,
            "--debug" => debug = true,
            "--pretty" => pretty = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let fault_json = match (fault_inline, fault_file) {
        (Some(inline), _) => inline,
        (None, Some(path)) => match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("Error: one of --fault or --data is required");
            process::exit(1);
        }
    };

    let fault: Fault = match serde_json::from_str(&fault_json) {
        Ok(fault) => fault,
        Err(e) => {
            eprintln!("Invalid fault JSON: {e}");
            process::exit(1);
        }
    };

    let status = match StatusCode::from_u16(status_code) {
        Ok(status) => status,
        Err(_) => {
            eprintln!("Invalid status code: {status_code}");
            process::exit(1);
        }
    };

    let catalog = MemoryCatalog::new();
    if let Some(path) = catalog_file {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                process::exit(1);
            }
        };
        if let Err(e) = catalog.load_json(&content) {
            eprintln!("Invalid catalog JSON: {e}");
            process::exit(1);
        }
    }

    let config = EngineConfig {
        cause_chains: !no_causes,
        stack_traces: traces,
        debug,
        ..EngineConfig::default()
    };
    let engine = ProblemEngine::new(config, Arc::new(catalog));
    let problem = engine.problem_for(&fault, status);

    let rendered = if pretty {
        serde_json::to_string_pretty(&problem)
    } else {
        serde_json::to_string(&problem)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("JSON serialization error: {e}");
            process::exit(1);
        }
    }
}
