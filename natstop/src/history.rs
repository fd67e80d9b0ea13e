//! Small utilities to manage bounded history buffers for charts.

use std::collections::VecDeque;

use crate::rates::RateSample;
use crate::types::Snapshot;

pub const HISTORY_CAP: usize = 150;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if cap == 0 {
        return;
    }
    while dq.len() >= cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

// One deque per graphed metric, all sharing the same capacity
#[derive(Debug, Clone)]
pub struct Histories {
    pub conns: VecDeque<f64>,
    pub mem_mib: VecDeque<f64>,
    pub in_msgs: VecDeque<u64>,
    pub out_msgs: VecDeque<u64>,
    pub in_bytes: VecDeque<u64>,
    pub out_bytes: VecDeque<u64>,
    cap: usize,
}

impl Histories {
    pub fn new(cap: usize) -> Self {
        Self {
            conns: VecDeque::with_capacity(cap),
            mem_mib: VecDeque::with_capacity(cap),
            in_msgs: VecDeque::with_capacity(cap),
            out_msgs: VecDeque::with_capacity(cap),
            in_bytes: VecDeque::with_capacity(cap),
            out_bytes: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    pub fn push(&mut self, snap: &Snapshot, rates: &RateSample) {
        let cap = self.cap;
        push_capped(
            &mut self.conns,
            snap.connections.num_connections as f64,
            cap,
        );
        push_capped(
            &mut self.mem_mib,
            (snap.server.mem_bytes / 1024 / 1024) as f64,
            cap,
        );
        push_capped(&mut self.in_msgs, rates.in_msgs_per_sec as u64, cap);
        push_capped(&mut self.out_msgs, rates.out_msgs_per_sec as u64, cap);
        push_capped(&mut self.in_bytes, rates.in_bytes_per_sec as u64, cap);
        push_capped(&mut self.out_bytes, rates.out_bytes_per_sec as u64, cap);
    }
}

impl Default for Histories {
    fn default() -> Self {
        Self::new(HISTORY_CAP)
    }
}
