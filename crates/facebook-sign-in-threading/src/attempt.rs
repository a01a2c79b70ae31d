use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Identifies one request travelling through a [`PendingResultSlot`](crate::PendingResultSlot),
/// from the moment it is put until it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptToken(u64);

impl AttemptToken {
    #[allow(missing_docs)]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing [`AttemptToken`]s. Safe to share between threads.
#[derive(Debug, Default)]
pub struct AttemptCounter {
    last: AtomicU64,
}

impl AttemptCounter {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next token. The first token is `#1`.
    pub fn next(&self) -> AttemptToken {
        AttemptToken(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn tokens_increase_from_one() {
        let counter = AttemptCounter::new();

        assert_eq!(counter.next().value(), 1);
        assert_eq!(counter.next().value(), 2);
        assert_eq!(counter.next().to_string(), "#3");
    }

    #[test]
    fn tokens_are_unique_across_threads() {
        let counter = AttemptCounter::new();

        let tokens: Vec<AttemptToken> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| (0..100).map(|_| counter.next()).collect::<Vec<_>>()))
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().expect("Thread should not panic"))
                .collect()
        });

        let unique: HashSet<_> = tokens.iter().collect();
        assert_eq!(unique.len(), 400);
    }
}
