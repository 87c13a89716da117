use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{bail, IntoDiagnostic, Result};

use stepvm::output::{self, message, MsgColor};
use stepvm::{
    program, to_text, Assembler, Debugger, DebuggerOptions, Vm, DIAGNOSTIC_CONTEXT_LINES,
};

/// stepvm assembles, runs and debugs programs for a tiny register machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble source into an encoded program, one hex word per line
    Assemble {
        /// Source file, or `-` for standard input
        input: PathBuf,
        /// Destination file, or `-` for standard output
        output: PathBuf,
    },
    /// Run an encoded program to completion and show the final machine state
    Run {
        /// Encoded program file, or `-` for standard input
        program: PathBuf,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Run an encoded program under the debugger, pausing before every instruction
    Debug {
        /// Encoded program file, or `-` for standard input
        program: PathBuf,
        /// Read debugger commands from argument, separated by `;` or newlines
        #[arg(short, long)]
        command: Option<String>,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let minimal = match &args.command {
        Command::Assemble { .. } => false,
        Command::Run { minimal, .. } | Command::Debug { minimal, .. } => *minimal,
    };
    output::set_minimal(minimal);
    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .context_lines(DIAGNOSTIC_CONTEXT_LINES)
                .color(!minimal)
                .build(),
        )
    }))?;

    match args.command {
        Command::Assemble { input, output } => {
            message(MsgColor::Green, "Assembling", target(&input));
            let src = read_input(&input)?;

            let mut assembler = Assembler::new();
            let program = assembler.assemble(src.lines())?;

            let mut text = to_text(&program).join("\n");
            if !program.is_empty() {
                text.push('\n');
            }
            write_output(&output, &text)?;

            message(
                MsgColor::Green,
                "Finished",
                format!(
                    "{} words, {} labels",
                    program.len(),
                    assembler.labels().len()
                ),
            );
            message(MsgColor::Green, "Saved", target(&output));
            Ok(())
        }
        Command::Run { program, .. } => {
            let mut vm = load(&program)?;
            message(MsgColor::Green, "Running", target(&program));
            vm.run()?;
            vm.show();
            message(MsgColor::Cyan, "Completed", target(&program));
            Ok(())
        }
        Command::Debug {
            program, command, ..
        } => {
            if is_std_stream(&program) && command.is_none() {
                bail!("Cannot read both program and debugger commands from standard input");
            }
            let vm = load(&program)?;
            message(MsgColor::Green, "Debugging", target(&program));
            let mut debugger = Debugger::new(DebuggerOptions { command }, vm);
            debugger.run()?;
            debugger.show();
            message(MsgColor::Cyan, "Completed", target(&program));
            Ok(())
        }
    }
}

fn target(path: &Path) -> String {
    if is_std_stream(path) {
        return "standard stream".to_string();
    }
    format!("target {}", path.display())
}

fn is_std_stream(path: &Path) -> bool {
    path == Path::new("-")
}

fn read_input(path: &Path) -> Result<String> {
    if is_std_stream(path) {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src).into_diagnostic()?;
        return Ok(src);
    }
    fs::read_to_string(path).into_diagnostic()
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if is_std_stream(path) {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes()).into_diagnostic()?;
        return stdout.flush().into_diagnostic();
    }
    fs::write(path, text).into_diagnostic()
}

/// Read an encoded program into a fresh machine writing to stdout.
fn load(path: &Path) -> Result<Vm<io::Stdout>> {
    let src = read_input(path)?;
    let program = program::from_text(&src)?;
    let mut vm = Vm::new(io::stdout());
    vm.initialize(&program)?;
    Ok(vm)
}
