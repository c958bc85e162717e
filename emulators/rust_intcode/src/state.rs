/// Coarse execution state of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecState {
    #[default]
    Running,
    /// Parked on an Input instruction with an empty input queue.
    Blocked,
    /// Terminal; nothing executes after this.
    Halted,
}

impl ExecState {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecState::Running => "running",
            ExecState::Blocked => "blocked",
            ExecState::Halted => "halted",
        }
    }
}

/// Registers and bookkeeping for one machine.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub pc: usize,
    pub relative_base: i64,
    pub exec: ExecState,
    pub instruction_count: u64,
}

impl State {
    pub fn is_running(&self) -> bool {
        self.exec == ExecState::Running
    }

    pub fn is_blocked(&self) -> bool {
        self.exec == ExecState::Blocked
    }

    pub fn is_halted(&self) -> bool {
        self.exec == ExecState::Halted
    }
}
