use rust_intcode::{ExecState, Machine, Opcode, Program, StepEvent};

#[test]
fn empty_queue_blocks_on_the_input_instruction() {
    let mut machine = Machine::new(vec![3, 0, 4, 0, 99], []);
    machine.run_to_completion().unwrap();
    assert!(machine.is_blocked());
    assert_eq!(machine.pc(), 0);
    assert!(machine.outputs().is_empty());

    // Stepping while blocked neither moves pc nor counts as an instruction.
    assert_eq!(machine.step().unwrap(), StepEvent::AwaitingInput);
    assert_eq!(machine.step().unwrap(), StepEvent::AwaitingInput);
    assert_eq!(machine.pc(), 0);
    assert_eq!(machine.instruction_count(), 0);

    machine.add_input(7);
    assert_eq!(machine.step().unwrap(), StepEvent::Executed(Opcode::Input));
    assert!(machine.is_running());
    machine.run_to_completion().unwrap();
    assert!(machine.is_halted());
    assert_eq!(machine.take_outputs(), vec![7]);
}

#[test]
fn resumed_input_is_neither_skipped_nor_duplicated() {
    // INPUT [9]; INPUT [10]; OUTPUT [9]; OUTPUT [10]; HALT
    let mut machine = Machine::new(vec![3, 9, 3, 10, 4, 9, 4, 10, 99], [11]);
    machine.run_to_completion().unwrap();
    assert!(machine.is_blocked());
    assert_eq!(machine.pc(), 2);
    assert_eq!(machine.pending_inputs(), 0);

    machine.add_input(22);
    machine.run_to_completion().unwrap();
    assert!(machine.is_halted());
    assert_eq!(machine.take_outputs(), vec![11, 22]);
}

#[test]
fn inputs_queued_ahead_are_consumed_in_order() {
    let mut machine = Machine::new(vec![3, 9, 3, 10, 4, 10, 4, 9, 99], []);
    machine.extend_inputs([5, 6, 7]);
    machine.run_to_completion().unwrap();
    assert_eq!(machine.take_outputs(), vec![6, 5]);
    assert_eq!(machine.pending_inputs(), 1);
}

#[test]
fn run_until_outputs_returns_fifo_batches() {
    let mut machine = Machine::new(vec![104, 1, 104, 2, 104, 3, 104, 4, 104, 5, 99], []);
    assert_eq!(machine.run_until_outputs(3).unwrap(), Some(vec![1, 2, 3]));
    assert!(machine.is_running());
    assert_eq!(machine.run_until_outputs(1).unwrap(), Some(vec![4]));

    machine.run_to_completion().unwrap();
    assert_eq!(machine.outputs().iter().copied().collect::<Vec<_>>(), vec![5]);
    assert_eq!(machine.run_until_outputs(1).unwrap(), Some(vec![5]));
}

#[test]
fn run_until_outputs_keeps_partial_output_on_halt() {
    let mut machine = Machine::new(vec![104, 1, 104, 2, 99], []);
    assert_eq!(machine.run_until_outputs(3).unwrap(), None);
    assert!(machine.is_halted());
    assert_eq!(machine.take_outputs(), vec![1, 2]);
}

#[test]
fn run_until_outputs_returns_none_when_starved() {
    // OUTPUT #1; INPUT [0]; OUTPUT [0]; HALT
    let mut machine = Machine::new(vec![104, 1, 3, 0, 4, 0, 99], []);
    assert_eq!(machine.run_until_outputs(2).unwrap(), None);
    assert!(machine.is_blocked());
    assert_eq!(machine.outputs().len(), 1);

    machine.add_input(9);
    assert_eq!(machine.run_until_outputs(2).unwrap(), Some(vec![1, 9]));
}

/// Caller-driven request/response loop, the way robot controllers talk to a
/// program: feed one value, read a fixed number of replies.
#[test]
fn interactive_doubler_answers_each_request() {
    // loop: INPUT [100]; MUL [100], #2, [101]; OUTPUT [101]; JMPIF #1, #0
    let image = vec![3, 100, 1002, 100, 2, 101, 4, 101, 1105, 1, 0];
    let mut machine = Machine::new(image, []);
    for request in [3, -4, 50] {
        machine.add_input(request);
        let reply = machine.run_until_outputs(1).unwrap();
        assert_eq!(reply, Some(vec![request * 2]));
    }
    assert_eq!(machine.run_until_outputs(1).unwrap(), None);
    assert_eq!(machine.state(), ExecState::Blocked);
}

fn amplifier_chain(program: &Program, phases: &[i64]) -> i64 {
    phases.iter().fold(0, |signal, &phase| {
        let mut amp = program.machine([phase, signal]);
        amp.run_until_outputs(1)
            .unwrap()
            .and_then(|out| out.first().copied())
            .expect("amplifier produced a signal")
    })
}

fn feedback_loop(program: &Program, phases: &[i64]) -> i64 {
    let mut amps: Vec<Machine> = phases
        .iter()
        .map(|&phase| program.machine([phase]))
        .collect();
    let mut signal = 0;
    loop {
        for amp in amps.iter_mut() {
            amp.add_input(signal);
            amp.run_to_completion().unwrap();
            if let Some(&last) = amp.take_outputs().last() {
                signal = last;
            }
        }
        if amps.iter().all(Machine::is_halted) {
            return signal;
        }
    }
}

#[test]
fn independent_machines_compose_through_the_caller() {
    let program: Program = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0"
        .parse()
        .unwrap();
    assert_eq!(amplifier_chain(&program, &[4, 3, 2, 1, 0]), 43210);

    let program: Program = "3,23,3,24,1002,24,10,24,1002,23,-1,23,\
                            101,5,23,23,1,24,23,23,4,23,99,0,0"
        .parse()
        .unwrap();
    assert_eq!(amplifier_chain(&program, &[0, 1, 2, 3, 4]), 54321);
}

#[test]
fn blocked_machines_resume_in_a_feedback_loop() {
    let program: Program = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,\
                            27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5"
        .parse()
        .unwrap();
    assert_eq!(feedback_loop(&program, &[9, 8, 7, 6, 5]), 139629729);
}
