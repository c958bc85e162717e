use std::collections::HashMap;

/// Word-addressed memory seen by the evaluator.
///
/// Every address is readable; cells that were never stored read as 0.
pub trait Bus {
    fn load(&self, addr: usize) -> i64;
    fn store(&mut self, addr: usize, value: i64);
}

/// Default memory: the program image lives in a dense vector, anything
/// written past its end goes to a hash map until the dense run reaches it.
#[derive(Debug, Clone, Default)]
pub struct SparseMemory {
    dense: Vec<i64>,
    sparse: HashMap<usize, i64>,
}

impl SparseMemory {
    pub fn from_image(image: impl Into<Vec<i64>>) -> Self {
        Self {
            dense: image.into(),
            sparse: HashMap::new(),
        }
    }

    pub fn preload(&mut self, pairs: impl IntoIterator<Item = (usize, i64)>) {
        for (addr, value) in pairs {
            self.store(addr, value);
        }
    }

    /// Non-zero cells in address order.
    pub fn dump(&self) -> Vec<(usize, i64)> {
        let mut cells: Vec<(usize, i64)> = self
            .dense
            .iter()
            .copied()
            .enumerate()
            .chain(self.sparse.iter().map(|(addr, value)| (*addr, *value)))
            .filter(|(_, value)| *value != 0)
            .collect();
        cells.sort_unstable_by_key(|(addr, _)| *addr);
        cells
    }

    fn absorb_sparse(&mut self) {
        while let Some(value) = self.sparse.remove(&self.dense.len()) {
            self.dense.push(value);
        }
    }
}

impl Bus for SparseMemory {
    fn load(&self, addr: usize) -> i64 {
        match self.dense.get(addr) {
            Some(value) => *value,
            None => self.sparse.get(&addr).copied().unwrap_or(0),
        }
    }

    fn store(&mut self, addr: usize, value: i64) {
        if let Some(cell) = self.dense.get_mut(addr) {
            *cell = value;
        } else if addr == self.dense.len() {
            self.dense.push(value);
            self.absorb_sparse();
        } else {
            self.sparse.insert(addr, value);
        }
    }
}
