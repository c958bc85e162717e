use crate::ast::Opcode;
use crate::bus::{Bus, SparseMemory};
use crate::eval::{step, Result, StepEvent};
use crate::ports::Ports;
use crate::state::{ExecState, State};
use std::collections::VecDeque;

/// One executed instruction, as reported to [`Machine::step_traced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub index: u64,
    pub pc_before: usize,
    pub pc_after: usize,
    pub opcode: Opcode,
}

/// An Intcode machine: memory, registers and I/O queues.
///
/// The machine never blocks the calling thread. When a program asks for input
/// that has not been supplied it parks in [`ExecState::Blocked`] and hands
/// control back; [`Machine::add_input`] followed by another step or run
/// resumes the same Input instruction.
#[derive(Debug, Clone)]
pub struct Machine<B: Bus = SparseMemory> {
    state: State,
    bus: B,
    ports: Ports,
}

impl Machine<SparseMemory> {
    pub fn new(image: impl Into<Vec<i64>>, inputs: impl IntoIterator<Item = i64>) -> Self {
        Self::with_bus(SparseMemory::from_image(image), inputs)
    }
}

impl<B: Bus> Machine<B> {
    pub fn with_bus(bus: B, inputs: impl IntoIterator<Item = i64>) -> Self {
        Self {
            state: State::default(),
            bus,
            ports: Ports::with_inputs(inputs),
        }
    }

    pub fn add_input(&mut self, value: i64) {
        self.ports.push_input(value);
    }

    pub fn extend_inputs(&mut self, values: impl IntoIterator<Item = i64>) {
        self.ports.extend_input(values);
    }

    pub fn step(&mut self) -> Result<StepEvent> {
        step(&mut self.state, &mut self.bus, &mut self.ports)
    }

    /// Like [`Machine::step`], reporting the instruction to `on_trace` when one
    /// actually executed.
    pub fn step_traced(&mut self, on_trace: &mut dyn FnMut(TraceEvent)) -> Result<StepEvent> {
        let pc_before = self.state.pc;
        let event = self.step()?;
        if let StepEvent::Executed(opcode) = event {
            on_trace(TraceEvent {
                index: self.state.instruction_count - 1,
                pc_before,
                pc_after: self.state.pc,
                opcode,
            });
        }
        Ok(event)
    }

    /// Step until the program halts or waits for input that is not queued.
    pub fn run_to_completion(&mut self) -> Result<()> {
        loop {
            match self.step()? {
                StepEvent::Executed(_) => {}
                StepEvent::AwaitingInput | StepEvent::Halted => return Ok(()),
            }
        }
    }

    /// Step until `count` outputs are buffered and return them, oldest first.
    ///
    /// Returns `None` if the program halts or blocks on input first; whatever
    /// it did produce stays buffered. Outputs beyond `count` also stay
    /// buffered for the next call.
    pub fn run_until_outputs(&mut self, count: usize) -> Result<Option<Vec<i64>>> {
        loop {
            if self.ports.output().len() >= count {
                return Ok(Some(self.ports.drain_output(count)));
            }
            match self.step()? {
                StepEvent::Executed(_) => {}
                StepEvent::AwaitingInput | StepEvent::Halted => return Ok(None),
            }
        }
    }

    /// Execute at most `max_steps` instructions.
    ///
    /// The returned state is `Running` only when the budget ran out.
    pub fn run_for(&mut self, max_steps: u64) -> Result<ExecState> {
        for _ in 0..max_steps {
            match self.step()? {
                StepEvent::Executed(_) => {}
                StepEvent::AwaitingInput | StepEvent::Halted => break,
            }
        }
        Ok(self.state.exec)
    }

    pub fn peek(&self, addr: usize) -> i64 {
        self.bus.load(addr)
    }

    pub fn poke(&mut self, addr: usize, value: i64) {
        self.bus.store(addr, value);
    }

    /// Buffered outputs, oldest first, without consuming them.
    pub fn outputs(&self) -> &VecDeque<i64> {
        self.ports.output()
    }

    pub fn take_outputs(&mut self) -> Vec<i64> {
        self.ports.take_output()
    }

    pub fn pending_inputs(&self) -> usize {
        self.ports.pending_input()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_blocked(&self) -> bool {
        self.state.is_blocked()
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    pub fn state(&self) -> ExecState {
        self.state.exec
    }

    pub fn pc(&self) -> usize {
        self.state.pc
    }

    pub fn relative_base(&self) -> i64 {
        self.state.relative_base
    }

    pub fn instruction_count(&self) -> u64 {
        self.state.instruction_count
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_until_outputs_uses_already_buffered_values_first() {
        let mut machine = Machine::new(vec![104, 1, 104, 2, 104, 3, 99], []);
        assert_eq!(machine.run_until_outputs(2).unwrap(), Some(vec![1, 2]));
        assert_eq!(machine.pc(), 4);
        assert_eq!(machine.run_until_outputs(1).unwrap(), Some(vec![3]));
        assert_eq!(machine.run_until_outputs(1).unwrap(), None);
        assert!(machine.is_halted());
    }

    #[test]
    fn zero_outputs_returns_without_stepping() {
        let mut machine = Machine::new(vec![104, 1, 99], []);
        assert_eq!(machine.run_until_outputs(0).unwrap(), Some(vec![]));
        assert_eq!(machine.instruction_count(), 0);
        assert!(machine.is_running());
    }

    #[test]
    fn run_for_stops_on_budget() {
        // Tight infinite loop: JMPIF #1, #0.
        let mut machine = Machine::new(vec![1105, 1, 0], []);
        assert_eq!(machine.run_for(10).unwrap(), ExecState::Running);
        assert_eq!(machine.instruction_count(), 10);
        assert_eq!(machine.pc(), 0);
    }

    #[test]
    fn run_for_reports_halt_and_block() {
        let mut machine = Machine::new(vec![99], []);
        assert_eq!(machine.run_for(5).unwrap(), ExecState::Halted);

        let mut machine = Machine::new(vec![3, 0, 99], []);
        assert_eq!(machine.run_for(5).unwrap(), ExecState::Blocked);
        assert_eq!(machine.instruction_count(), 0);
    }

    #[test]
    fn step_traced_reports_executed_instructions_only() {
        let mut machine = Machine::new(vec![3, 0, 4, 0, 99], []);
        let mut events = Vec::new();
        let mut sink = |event: TraceEvent| events.push(event);
        assert_eq!(
            machine.step_traced(&mut sink).unwrap(),
            StepEvent::AwaitingInput
        );
        machine.add_input(5);
        while !machine.is_halted() {
            machine.step_traced(&mut sink).unwrap();
        }
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            TraceEvent {
                index: 0,
                pc_before: 0,
                pc_after: 2,
                opcode: Opcode::Input
            }
        );
        assert_eq!(events[1].opcode, Opcode::Output);
        assert_eq!(events[2].pc_before, 4);
        assert_eq!(events[2].pc_after, 4);
        assert_eq!(machine.take_outputs(), vec![5]);
    }

    #[test]
    fn custom_bus_is_driven_through_the_trait() {
        let mut bus = SparseMemory::default();
        bus.preload([(0, 1101), (1, 20), (2, 22), (3, 9), (4, 99)]);
        let mut machine = Machine::with_bus(bus, []);
        machine.run_to_completion().unwrap();
        assert_eq!(machine.peek(9), 42);
        assert_eq!(machine.bus().dump().last(), Some(&(9, 42)));
    }
}
