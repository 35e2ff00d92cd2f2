// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{BoardError, BoardResult};
use std::collections::VecDeque;

/// Returned by [`ByteFifo::enqueue`] when the queue is full; carries the
/// byte that was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("byte queue full, dropped {0:#04x}")]
pub struct Overrun(pub u8);

/// Bounded, non-blocking byte queue backing the mini-UART RX and TX paths.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ByteFifo {
    capacity: usize,
    data: VecDeque<u8>,
}

impl ByteFifo {
    /// Create an empty queue, reserving all of its storage up front.
    pub fn with_capacity(capacity: usize) -> BoardResult<Self> {
        let mut data = VecDeque::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| BoardError::Allocation(capacity))?;
        Ok(Self { capacity, data })
    }

    pub fn enqueue(&mut self, byte: u8) -> Result<(), Overrun> {
        if self.is_full() {
            return Err(Overrun(byte));
        }
        self.data.push_back(byte);
        Ok(())
    }

    /// Enqueue `byte`, evicting the oldest entry if the queue is full.
    /// Returns the evicted byte.
    pub fn enqueue_evicting(&mut self, byte: u8) -> Option<u8> {
        let evicted = if self.is_full() {
            self.data.pop_front()
        } else {
            None
        };
        if self.capacity > 0 {
            self.data.push_back(byte);
        }
        evicted
    }

    pub fn dequeue(&mut self) -> Option<u8> {
        self.data.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&mut self) -> Vec<u8> {
        self.data.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order_and_bounds() {
        let mut fifo = ByteFifo::with_capacity(2).unwrap();
        assert!(fifo.is_empty());

        fifo.enqueue(b'a').unwrap();
        fifo.enqueue(b'b').unwrap();
        assert!(fifo.is_full());
        assert_eq!(fifo.enqueue(b'c'), Err(Overrun(b'c')));
        assert_eq!(fifo.len(), 2);

        assert_eq!(fifo.dequeue(), Some(b'a'));
        assert_eq!(fifo.dequeue(), Some(b'b'));
        assert_eq!(fifo.dequeue(), None);
    }

    #[test]
    fn test_fifo_evicting_enqueue() {
        let mut fifo = ByteFifo::with_capacity(2).unwrap();
        assert_eq!(fifo.enqueue_evicting(1), None);
        assert_eq!(fifo.enqueue_evicting(2), None);
        assert_eq!(fifo.enqueue_evicting(3), Some(1));
        assert_eq!(fifo.drain(), vec![2, 3]);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_fifo_clear() {
        let mut fifo = ByteFifo::with_capacity(8).unwrap();
        for b in 0..5 {
            fifo.enqueue(b).unwrap();
        }
        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.capacity(), 8);
    }
}
