//! Small utilities to manage bounded history buffers.

use std::collections::VecDeque;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if cap == 0 {
        return;
    }
    while dq.len() >= cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

// Active/inactive counts per refresh, for the monitoring sparkline
pub struct StatusHistory {
    pub active: VecDeque<u64>,
    pub inactive: VecDeque<u64>,
    cap: usize,
}

impl StatusHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            active: VecDeque::with_capacity(cap),
            inactive: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, active: usize, inactive: usize) {
        push_capped(&mut self.active, active as u64, self.cap);
        push_capped(&mut self.inactive, inactive as u64, self.cap);
    }
}
