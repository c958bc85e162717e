//! Intcode machine: a small stored-program interpreter over sparse signed
//! memory, with cooperative blocking input and buffered output.
//!
//! Callers drive a [`Machine`] one instruction at a time, until it has
//! produced a number of outputs, or until it halts or waits for input.

pub mod ast;
pub mod bus;
pub mod eval;
pub mod machine;
pub mod ports;
pub mod program;
pub mod state;

pub use ast::{disassemble, DisasmLine, Instr, Opcode, ParamMode};
pub use bus::{Bus, SparseMemory};
pub use eval::{step, Error, Result, StepEvent};
pub use machine::{Machine, TraceEvent};
pub use ports::Ports;
pub use program::{Program, ProgramError};
pub use state::{ExecState, State};
