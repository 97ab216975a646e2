use crate::types::{CenterRadius, Index3};
use std::collections::VecDeque;

/// Run-wide record of committed centres, newest first.
///
/// Rejections undo the most recent commits with [`pop_front_n`], which is why
/// the log is a deque rather than a plain vector. The smoothing pass drains
/// it from the front.
///
/// [`pop_front_n`]: CenterRadiusLog::pop_front_n
#[derive(Clone, Debug, Default)]
pub struct CenterRadiusLog {
    entries: VecDeque<CenterRadius>,
}

impl CenterRadiusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_front(&mut self, center: Index3, radius: f64) {
        self.entries.push_front(CenterRadius { center, radius });
    }

    /// Removes up to `n` newest entries and returns how many were removed.
    pub fn pop_front_n(&mut self, n: usize) -> usize {
        let k = n.min(self.entries.len());
        self.entries.drain(..k);
        k
    }

    pub fn front(&self) -> Option<&CenterRadius> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CenterRadius> {
        self.entries.iter()
    }

    /// Empties the log front to back.
    pub fn drain(&mut self) -> impl Iterator<Item = CenterRadius> + '_ {
        self.entries.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_never_exceed_length() {
        let mut log = CenterRadiusLog::new();
        log.push_front([0, 0, 0], 1.0);
        log.push_front([1, 0, 0], 2.0);
        log.push_front([2, 0, 0], 3.0);
        assert_eq!(log.pop_front_n(2), 2);
        assert_eq!(log.front().map(|e| e.center), Some([0, 0, 0]));
        assert_eq!(log.pop_front_n(3), 1);
        assert!(log.is_empty());
        assert_eq!(log.pop_front_n(1), 0);
    }

    #[test]
    fn drains_newest_first() {
        let mut log = CenterRadiusLog::new();
        log.push_front([0, 0, 0], 1.0);
        log.push_front([1, 0, 0], 2.0);
        let radii: Vec<f64> = log.drain().map(|e| e.radius).collect();
        assert_eq!(radii, vec![2.0, 1.0]);
        assert!(log.is_empty());
    }
}
