use crate::ast::{Instr, Opcode, ParamMode};
use crate::bus::Bus;
use crate::ports::Ports;
use crate::state::{ExecState, State};
use once_cell::sync::Lazy;
use std::env;
use thiserror::Error;

static TRACE_ENABLED: Lazy<bool> = Lazy::new(|| env::var_os("INTCODE_TRACE").is_some());

pub type Result<T> = std::result::Result<T, Error>;

/// Faults that stop a program. The machine is left exactly as it was before
/// the failing instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown opcode {opcode} at pc={pc}")]
    UnknownOpcode { opcode: i64, pc: usize },
    #[error("{opcode} at pc={pc} writes parameter {param} in immediate mode")]
    InvalidWriteMode {
        opcode: Opcode,
        param: usize,
        pc: usize,
    },
    #[error("negative address {address} at pc={pc}")]
    NegativeAddress { address: i64, pc: usize },
}

/// What a single call to [`step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Executed(Opcode),
    AwaitingInput,
    Halted,
}

struct Operands<'a, B: Bus> {
    bus: &'a B,
    instr: Instr,
    pc: usize,
    relative_base: i64,
}

impl<'a, B: Bus> Operands<'a, B> {
    fn raw(&self, param: usize) -> i64 {
        self.bus.load(self.pc + 1 + param)
    }

    fn address(&self, address: i64) -> Result<usize> {
        usize::try_from(address).map_err(|_| Error::NegativeAddress {
            address,
            pc: self.pc,
        })
    }

    fn read(&self, param: usize) -> Result<i64> {
        let raw = self.raw(param);
        match self.instr.mode(param) {
            ParamMode::Immediate => Ok(raw),
            ParamMode::Position => Ok(self.bus.load(self.address(raw)?)),
            ParamMode::Relative => {
                let addr = self.address(self.relative_base.wrapping_add(raw))?;
                Ok(self.bus.load(addr))
            }
        }
    }

    fn target(&self, param: usize) -> Result<usize> {
        let raw = self.raw(param);
        match self.instr.mode(param) {
            ParamMode::Immediate => Err(Error::InvalidWriteMode {
                opcode: self.instr.opcode,
                param: param + 1,
                pc: self.pc,
            }),
            ParamMode::Position => self.address(raw),
            ParamMode::Relative => self.address(self.relative_base.wrapping_add(raw)),
        }
    }

    fn binary(&self, op: impl Fn(i64, i64) -> i64) -> Result<(usize, i64)> {
        let a = self.read(0)?;
        let b = self.read(1)?;
        Ok((self.target(2)?, op(a, b)))
    }

    fn operand_cells(&self) -> Vec<i64> {
        (0..self.instr.param_count()).map(|idx| self.raw(idx)).collect()
    }
}

/// Decode and execute the instruction at `state.pc`.
///
/// A halted machine and a blocked machine with no queued input are no-ops.
/// An Input instruction that finds the queue empty parks the machine in
/// [`ExecState::Blocked`] without moving pc, so it is retried once input
/// arrives.
pub fn step<B: Bus>(state: &mut State, bus: &mut B, ports: &mut Ports) -> Result<StepEvent> {
    match state.exec {
        ExecState::Halted => return Ok(StepEvent::Halted),
        ExecState::Blocked if !ports.has_input() => return Ok(StepEvent::AwaitingInput),
        ExecState::Blocked | ExecState::Running => {}
    }

    let pc = state.pc;
    let cell = bus.load(pc);
    let instr = Instr::decode(cell).ok_or(Error::UnknownOpcode { opcode: cell, pc })?;
    let ops = Operands {
        bus: &*bus,
        instr,
        pc,
        relative_base: state.relative_base,
    };
    if *TRACE_ENABLED {
        eprintln!(
            "[intcode-trace] pc={pc} rb={rb} {text}",
            rb = state.relative_base,
            text = instr.render(&ops.operand_cells()),
        );
    }

    let mut next_pc = pc + instr.width();
    let mut relative_base = state.relative_base;
    let mut exec = ExecState::Running;
    let mut write = None;

    match instr.opcode {
        Opcode::Add => write = Some(ops.binary(i64::wrapping_add)?),
        Opcode::Multiply => write = Some(ops.binary(i64::wrapping_mul)?),
        Opcode::Input => {
            let dest = ops.target(0)?;
            match ports.pop_input() {
                Some(value) => write = Some((dest, value)),
                None => {
                    state.exec = ExecState::Blocked;
                    return Ok(StepEvent::AwaitingInput);
                }
            }
        }
        Opcode::Output => ports.push_output(ops.read(0)?),
        Opcode::JumpIfTrue => {
            if ops.read(0)? != 0 {
                next_pc = ops.address(ops.read(1)?)?;
            }
        }
        Opcode::JumpIfFalse => {
            if ops.read(0)? == 0 {
                next_pc = ops.address(ops.read(1)?)?;
            }
        }
        Opcode::LessThan => write = Some(ops.binary(|a, b| i64::from(a < b))?),
        Opcode::Equals => write = Some(ops.binary(|a, b| i64::from(a == b))?),
        Opcode::AdjustRelativeBase => {
            relative_base = relative_base.wrapping_add(ops.read(0)?);
        }
        Opcode::Halt => {
            next_pc = pc;
            exec = ExecState::Halted;
        }
    }

    if let Some((addr, value)) = write {
        bus.store(addr, value);
    }
    state.pc = next_pc;
    state.relative_base = relative_base;
    state.exec = exec;
    state.instruction_count += 1;
    Ok(StepEvent::Executed(instr.opcode))
}
