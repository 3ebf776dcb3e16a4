//! `jsvmp` command-line entry point.
//!
//! Behavior summary:
//! - With **no args**, start an interactive REPL.
//! - With `-h/--help`, print usage.
//! - With `-v/--version`, print the runtime version.
//! - With a bare **script path**, compile and run it directly.
//! - With **`--pack <script>`**, compile and print a plain hex image.
//! - With **`--pack-protected <script>`**, compile and print a protected
//!   (tamper-evident) hex image.
//! - With **`--run-image <file>`**, load a plain hex image from disk and
//!   execute it.
//! - With **`--run-protected <file>`**, load a protected hex image from
//!   disk, validate its integrity tag, and execute it.

use std::env;
use std::fs;

use jsvmp::builtins::default_builtins;
use jsvmp::repl::repl_interpret;
use jsvmp::{compile, pack_plain, pack_protected, run_protected, run_vm, unpack_plain};

/// Runtime version string, printed by `--version` and included in help
/// text.
const VERSION: &str = "0.1.0";

fn usage() -> String {
    format!(
        r#"jsvmp v{0}

Usage:
    jsvmp <script>
    jsvmp --pack <script>
    jsvmp --pack-protected <script>
    jsvmp --run-image <image-file>
    jsvmp --run-protected <image-file>

Arguments:
    <script>
        Path to a jsvmp source file to compile and run.
    <image-file>
        Path to a hex-encoded container image produced by --pack or
        --pack-protected.

Options:
    -h, --help
        Show this help message and exit.
    -v, --version
        Show runtime version."#,
        VERSION
    )
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("failed to read {}: {}", path, e);
        std::process::exit(1);
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        repl_interpret();
        return;
    }

    if args[1] == "-h" || args[1] == "--help" {
        println!("{}", usage());
        return;
    }

    if args[1] == "-v" || args[1] == "--version" {
        println!("jsvmp-{}-{}: v{}", env::consts::OS, env::consts::ARCH, VERSION);
        return;
    }

    match args[1].as_str() {
        "--pack" => {
            let path = args.get(2).unwrap_or_else(|| {
                eprintln!("--pack requires a script path");
                std::process::exit(1);
            });
            let source = read_source(path);
            match compile(&source) {
                Ok(program) => println!("{}", pack_plain(&program)),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        "--pack-protected" => {
            let path = args.get(2).unwrap_or_else(|| {
                eprintln!("--pack-protected requires a script path");
                std::process::exit(1);
            });
            let source = read_source(path);
            match compile(&source) {
                Ok(program) => println!("{}", pack_protected(&program)),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        "--run-image" => {
            let path = args.get(2).unwrap_or_else(|| {
                eprintln!("--run-image requires an image file path");
                std::process::exit(1);
            });
            let hex_image = read_source(path);
            match unpack_plain(hex_image.trim()) {
                Ok(program) => {
                    if let Err(e) = run_vm(&program, &default_builtins()) {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        "--run-protected" => {
            let path = args.get(2).unwrap_or_else(|| {
                eprintln!("--run-protected requires an image file path");
                std::process::exit(1);
            });
            let hex_image = read_source(path);
            if let Err(e) = run_protected(hex_image.trim(), &default_builtins()) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        script_path => {
            let source = read_source(script_path);
            match compile(&source) {
                Ok(program) => {
                    if let Err(e) = run_vm(&program, &default_builtins()) {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
