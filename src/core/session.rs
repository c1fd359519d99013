use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Ticket identifying one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Latest-wins slot for results of overlapping requests
///
/// Every request takes a ticket with [`GenerationGuard::begin`]. A result is
/// only stored if its ticket is still the newest one issued, so a slow,
/// stale request can never overwrite the result of a newer one.
#[derive(Debug)]
pub struct GenerationGuard<T> {
    issued: AtomicU64,
    published: RwLock<Option<(Generation, T)>>,
}

impl<T: Clone> GenerationGuard<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            published: RwLock::new(None),
        }
    }

    /// Issue a new ticket, superseding all earlier ones
    pub fn begin(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no newer ticket has been issued since `generation`
    pub fn is_current(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::SeqCst) == generation.0
    }

    /// Store `value` if `generation` is still current
    ///
    /// Returns `false` when the result was discarded as stale.
    pub async fn publish(&self, generation: Generation, value: T) -> bool {
        let mut slot = self.published.write().await;

        // Re-check under the lock so a newer publish cannot be overwritten
        if !self.is_current(generation) {
            return false;
        }
        if let Some((existing, _)) = slot.as_ref() {
            if *existing > generation {
                return false;
            }
        }

        *slot = Some((generation, value));
        true
    }

    /// Most recently published value, if any
    pub async fn latest(&self) -> Option<T> {
        self.published.read().await.as_ref().map(|(_, value)| value.clone())
    }

    /// Generation of the most recently published value
    pub async fn latest_generation(&self) -> Option<Generation> {
        self.published.read().await.as_ref().map(|(generation, _)| *generation)
    }
}

impl<T: Clone> Default for GenerationGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_generation_publishes() {
        let guard = GenerationGuard::new();
        let ticket = guard.begin();

        assert!(guard.publish(ticket, "fresh").await);
        assert_eq!(guard.latest().await, Some("fresh"));
        assert_eq!(guard.latest_generation().await, Some(ticket));
    }

    #[tokio::test]
    async fn test_stale_generation_discarded() {
        let guard = GenerationGuard::new();
        let old = guard.begin();
        let new = guard.begin();

        assert!(!guard.is_current(old));
        assert!(guard.publish(new, "new").await);
        assert!(!guard.publish(old, "old").await);
        assert_eq!(guard.latest().await, Some("new"));
    }

    #[tokio::test]
    async fn test_superseded_before_any_publish() {
        let guard: GenerationGuard<u32> = GenerationGuard::new();
        let old = guard.begin();
        let _new = guard.begin();

        assert!(!guard.publish(old, 1).await);
        assert_eq!(guard.latest().await, None);
    }

    #[test]
    fn test_generations_increase() {
        let guard: GenerationGuard<()> = GenerationGuard::new();
        let a = guard.begin();
        let b = guard.begin();
        assert!(b > a);
        assert_eq!(a.value() + 1, b.value());
    }
}
