//! # Interactive REPL
//!
//! A line-oriented read-eval-print loop: primary prompt `>>> `,
//! continuation prompt `... ` while brace depth is positive so a
//! `function`/`if`/`while` body can span multiple lines before it runs.
//!
//! Execution re-runs the *entire* accumulated history plus the new block
//! each time, by spawning a fresh child process of this same binary
//! against a temporary script file — the VM has no resumable state to
//! carry between `run_vm` calls, so re-running from scratch is the
//! simplest way to make each successful block build on the last one's
//! bindings. Only the stdout produced since the last successful run is
//! printed, via a prefix diff against the previous run's full output.
//!
//! Exits cleanly on EOF (Ctrl+D) or the `exit`/`quit` commands.

use std::fs;
use std::io::{self, Write};
use std::process::Command;

pub fn repl_interpret() {
    println!("jsvmp — type `exit` or `quit` to leave.");

    let mut history = String::new();
    let mut last_output = String::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut brace_depth: i32 = 0;

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };
        print!("{}", prompt);
        io::stdout().flush().unwrap();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap() == 0 {
            println!();
            break;
        }

        let trimmed = line.trim();
        if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
            break;
        }

        let mut in_string = false;
        let mut escape = false;
        for ch in line.chars() {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => brace_depth += 1,
                '}' if !in_string => brace_depth -= 1,
                _ => {}
            }
        }

        buffer.push(line);

        if brace_depth > 0 {
            continue;
        }

        let block = buffer.join("");
        let source = format!("{}{}", history, block);

        let temp_path = std::env::temp_dir().join("jsvmp_repl.jsvmp");
        if fs::write(&temp_path, &source).is_err() {
            println!("failed to write temp file");
            buffer.clear();
            brace_depth = 0;
            continue;
        }

        let output = Command::new(std::env::current_exe().unwrap())
            .arg(temp_path.to_string_lossy().to_string())
            .output();

        let _ = fs::remove_file(&temp_path);

        match output {
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).to_string();
                if !stderr.is_empty() {
                    if stderr.contains("end of input") {
                        // Unexpected-EOF style parse error: the block is
                        // probably still incomplete, give the user another
                        // line instead of discarding their input.
                        continue;
                    }
                    print!("{}", stderr);
                    buffer.clear();
                    brace_depth = 0;
                    continue;
                }

                let stdout = String::from_utf8_lossy(&out.stdout).to_string();
                if stdout.starts_with(&last_output) {
                    print!("{}", &stdout[last_output.len()..]);
                } else {
                    print!("{}", stdout);
                }

                last_output = stdout;
                history.push_str(&block);
                buffer.clear();
                brace_depth = 0;
            }
            Err(_) => {
                println!("failed to run script");
                buffer.clear();
                brace_depth = 0;
            }
        }
    }
}
