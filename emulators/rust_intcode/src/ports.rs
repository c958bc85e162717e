use std::collections::VecDeque;

/// Input and output queues owned by one machine.
#[derive(Debug, Clone, Default)]
pub struct Ports {
    input: VecDeque<i64>,
    output: VecDeque<i64>,
}

impl Ports {
    pub fn with_inputs(inputs: impl IntoIterator<Item = i64>) -> Self {
        Self {
            input: inputs.into_iter().collect(),
            output: VecDeque::new(),
        }
    }

    pub fn push_input(&mut self, value: i64) {
        self.input.push_back(value);
    }

    pub fn extend_input(&mut self, values: impl IntoIterator<Item = i64>) {
        self.input.extend(values);
    }

    pub fn pop_input(&mut self) -> Option<i64> {
        self.input.pop_front()
    }

    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn push_output(&mut self, value: i64) {
        self.output.push_back(value);
    }

    pub fn output(&self) -> &VecDeque<i64> {
        &self.output
    }

    /// Remove the oldest `count` outputs. Callers check availability first.
    pub fn drain_output(&mut self, count: usize) -> Vec<i64> {
        let count = count.min(self.output.len());
        self.output.drain(..count).collect()
    }

    pub fn take_output(&mut self) -> Vec<i64> {
        self.output.drain(..).collect()
    }
}
