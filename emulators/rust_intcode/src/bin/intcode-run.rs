use anyhow::{Context, Result};
use clap::Parser;
use rust_intcode::{disassemble, ExecState, Machine, Program, StepEvent, TraceEvent};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
struct Poke {
    address: usize,
    value: i64,
}

fn parse_poke(text: &str) -> Result<Poke, String> {
    let (address, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {text:?}"))?;
    let address = address
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("bad address {address:?}: {err}"))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("bad value {value:?}: {err}"))?;
    Ok(Poke { address, value })
}

#[derive(Parser, Debug)]
#[command(
    name = "intcode-run",
    about = "Run an Intcode program image and print what it outputs."
)]
struct Args {
    /// Program image: comma-separated integers, any number of lines.
    #[arg(long, short, value_name = "PATH")]
    program: PathBuf,

    /// Values queued as input before the program starts.
    #[arg(
        long,
        short,
        value_name = "N",
        num_args = 1..,
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    input: Vec<i64>,

    /// Overwrite a memory cell before running (repeatable).
    #[arg(long, value_name = "ADDR=VALUE", value_parser = parse_poke)]
    poke: Vec<Poke>,

    /// Stop after this many instructions even if the program is still running.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Print outputs below 128 as ASCII characters.
    #[arg(long, default_value_t = false)]
    ascii: bool,

    /// Emit a JSON report instead of plain output.
    #[arg(long, default_value_t = false, conflicts_with = "ascii")]
    json: bool,

    /// Print the disassembly of the image and exit.
    #[arg(long, default_value_t = false)]
    disasm: bool,

    /// Log every executed instruction to stderr.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Print non-zero memory cells after the run.
    #[arg(long, default_value_t = false)]
    dump_memory: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    status: &'static str,
    pc: usize,
    relative_base: i64,
    instructions: u64,
    pending_inputs: usize,
    outputs: &'a [i64],
}

fn drive(machine: &mut Machine, max_steps: Option<u64>, trace: bool) -> rust_intcode::Result<()> {
    if !trace {
        return match max_steps {
            Some(limit) => machine.run_for(limit).map(|_| ()),
            None => machine.run_to_completion(),
        };
    }
    let mut log = |event: TraceEvent| {
        eprintln!(
            "[trace] #{index} pc={before} -> {after} {opcode}",
            index = event.index,
            before = event.pc_before,
            after = event.pc_after,
            opcode = event.opcode,
        );
    };
    let mut executed = 0u64;
    loop {
        if max_steps.is_some_and(|limit| executed >= limit) {
            return Ok(());
        }
        match machine.step_traced(&mut log)? {
            StepEvent::Executed(_) => executed += 1,
            StepEvent::AwaitingInput | StepEvent::Halted => return Ok(()),
        }
    }
}

fn write_ascii(out: &mut impl Write, outputs: &[i64]) -> io::Result<()> {
    for &value in outputs {
        match u8::try_from(value) {
            Ok(byte) if byte.is_ascii() => write!(out, "{}", byte as char)?,
            _ => writeln!(out, "{value}")?,
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let program = Program::from_file(&args.program)
        .with_context(|| format!("loading program {}", args.program.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.disasm {
        for line in disassemble(program.image()) {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    let mut machine = program.machine(args.input.iter().copied());
    for patch in &args.poke {
        machine.poke(patch.address, patch.value);
    }

    drive(&mut machine, args.max_steps, args.trace)
        .with_context(|| format!("running {}", args.program.display()))?;

    let outputs = machine.take_outputs();
    if args.json {
        let report = Report {
            status: machine.state().as_str(),
            pc: machine.pc(),
            relative_base: machine.relative_base(),
            instructions: machine.instruction_count(),
            pending_inputs: machine.pending_inputs(),
            outputs: &outputs,
        };
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else if args.ascii {
        write_ascii(&mut out, &outputs)?;
    } else {
        for value in &outputs {
            writeln!(out, "{value}")?;
        }
    }

    if args.dump_memory {
        for (addr, value) in machine.bus().dump() {
            writeln!(out, "[{addr}] = {value}")?;
        }
    }

    match machine.state() {
        ExecState::Blocked => eprintln!(
            "note: program is waiting for input at pc={}",
            machine.pc()
        ),
        ExecState::Running => eprintln!(
            "note: stopped after {} instructions at pc={}",
            machine.instruction_count(),
            machine.pc()
        ),
        ExecState::Halted => {}
    }
    Ok(())
}
