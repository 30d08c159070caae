use std::env;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use rsh::{cd_target, parse, run};

const PROMPT: &str = "rsh> ";

fn main() -> Result<()> {
    print_working_directory();
    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line == "exit" {
                    break;
                }
                if !line.is_empty() {
                    let _ = rl.add_history_entry(line);
                }
                eval_line(line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// One iteration of the loop: parse, launch, report. Nothing a line does can
/// take the loop down.
fn eval_line(line: &str) {
    match parse(line) {
        Ok(command) => match run(&command) {
            Ok(()) if cd_target(&command).is_some() => print_working_directory(),
            Ok(()) => {}
            Err(e) => eprintln!("rsh: {e}"),
        },
        Err(e) => eprintln!("rsh: {e}"),
    }
}

fn print_working_directory() {
    if let Ok(dir) = env::current_dir() {
        println!("{}", dir.display());
    }
}
