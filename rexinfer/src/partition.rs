//! Level partitioner: tracks, for each cost level and operator, the half-open `[start, end)`
//! window of the bottom-up enumeration cache that level/operator produced.

use crate::ops::{Operator, ALL_OPERATORS};

#[derive(Clone, Copy, Debug, Default)]
struct Window {
    start: usize,
    end: usize,
}

pub struct LevelPartitioner {
    /// `windows[level][op.index()]`, grown on demand as levels are enumerated.
    windows: Vec<[Window; 4]>,
}

impl LevelPartitioner {
    pub fn new() -> LevelPartitioner {
        LevelPartitioner {
            windows: Vec::new(),
        }
    }

    fn ensure_level(&mut self, level: usize) {
        while self.windows.len() <= level {
            self.windows.push([Window::default(); 4]);
        }
    }

    pub fn set_start(&mut self, level: usize, op: Operator, start: usize) {
        self.ensure_level(level);
        self.windows[level][op.index()].start = start;
    }

    pub fn set_end(&mut self, level: usize, op: Operator, end: usize) {
        self.ensure_level(level);
        self.windows[level][op.index()].end = end;
    }

    pub fn start(&self, level: usize, op: Operator) -> usize {
        self.windows
            .get(level)
            .map(|w| w[op.index()].start)
            .unwrap_or(0)
    }

    pub fn end(&self, level: usize, op: Operator) -> usize {
        self.windows
            .get(level)
            .map(|w| w[op.index()].end)
            .unwrap_or(0)
    }

    /// Recover `(level, operator)` for a cache index, by linear scan over recorded windows.
    /// Runs only during reconstruction of a successful result, so the linear cost is immaterial.
    pub fn index_to_level(&self, index: usize) -> Option<(usize, Operator)> {
        for (level, windows) in self.windows.iter().enumerate() {
            for op in ALL_OPERATORS {
                let w = windows[op.index()];
                if w.end > w.start && index >= w.start && index < w.end {
                    return Some((level, op));
                }
            }
        }
        None
    }
}

impl Default for LevelPartitioner {
    fn default() -> Self {
        Self::new()
    }
}
