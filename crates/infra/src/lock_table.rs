//! Per-course mutation locks.
//!
//! Mutations of one course queue behind each other; different courses never
//! share a lock. An entry lives only while some caller holds or waits on it,
//! so ids that are never touched again (or never existed) leave nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use cursos_courses::CourseId;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("timed out after {waited:?} waiting for the lock on course {course_id}")]
pub struct LockTimeout {
    pub course_id: CourseId,
    pub waited: Duration,
}

type LockMap = HashMap<CourseId, Arc<AsyncMutex<()>>>;

/// Lazily-populated table of one async mutex per course id.
#[derive(Debug, Default)]
pub struct CourseLocks {
    locks: Mutex<LockMap>,
}

/// Exclusive access to one course; releasing it drops the table entry when idle.
#[derive(Debug)]
pub struct CourseLockGuard<'a> {
    table: &'a CourseLocks,
    course_id: CourseId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CourseLockGuard<'_> {
    fn drop(&mut self) {
        // Release the mutex first so its Arc no longer counts as a user.
        self.guard.take();
        self.table.prune(self.course_id);
    }
}

impl CourseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        // The map only holds Arcs, so a poisoned guard is still consistent.
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get (or create) the lock guarding `course_id`.
    fn lock_for(&self, course_id: CourseId) -> Arc<AsyncMutex<()>> {
        self.map()
            .entry(course_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Remove the entry for `course_id` if nobody else holds or awaits it.
    ///
    /// Clones happen under the map lock, so a count of one here means only
    /// the map references the mutex.
    fn prune(&self, course_id: CourseId) {
        let mut map = self.map();
        if map
            .get(&course_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&course_id);
        }
    }

    /// Wait at most `timeout` for exclusive access to `course_id`.
    pub async fn acquire(
        &self,
        course_id: CourseId,
        timeout: Duration,
    ) -> Result<CourseLockGuard<'_>, LockTimeout> {
        let lock = self.lock_for(course_id);
        // The timed-out future owns the Arc; it must be gone before pruning.
        let acquired = tokio::time::timeout(timeout, lock.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(CourseLockGuard {
                table: self,
                course_id,
                guard: Some(guard),
            }),
            Err(_) => {
                self.prune(course_id);
                Err(LockTimeout {
                    course_id,
                    waited: timeout,
                })
            }
        }
    }

    /// Number of courses with a live lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> CourseId {
        CourseId::try_from(n).unwrap()
    }

    #[test]
    fn same_course_shares_one_lock() {
        let locks = CourseLocks::new();
        assert!(Arc::ptr_eq(&locks.lock_for(id(1)), &locks.lock_for(id(1))));
        assert!(!Arc::ptr_eq(&locks.lock_for(id(1)), &locks.lock_for(id(2))));
    }

    #[tokio::test]
    async fn held_lock_times_out_for_same_course_only() {
        let locks = CourseLocks::new();
        let _held = locks.acquire(id(1), Duration::from_millis(50)).await.unwrap();

        let err = locks
            .acquire(id(1), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err.course_id, id(1));

        locks
            .acquire(id(2), Duration::from_millis(20))
            .await
            .expect("other courses are independent");
    }

    #[tokio::test]
    async fn released_lock_can_be_reacquired() {
        let locks = CourseLocks::new();
        {
            let _guard = locks.acquire(id(1), Duration::from_millis(50)).await.unwrap();
        }
        assert!(locks.acquire(id(1), Duration::from_millis(50)).await.is_ok());
    }

    #[tokio::test]
    async fn released_locks_leave_no_entries_behind() {
        let locks = CourseLocks::new();
        for n in 1..=10_000 {
            let _guard = locks.acquire(id(n), Duration::from_millis(50)).await.unwrap();
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn entry_survives_while_held_and_after_a_timed_out_waiter() {
        let locks = CourseLocks::new();
        let held = locks.acquire(id(1), Duration::from_millis(50)).await.unwrap();

        locks
            .acquire(id(1), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(locks.len(), 1);

        drop(held);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn waiter_keeps_entry_until_it_releases() {
        let locks = Arc::new(CourseLocks::new());
        let held = locks.acquire(id(1), Duration::from_millis(50)).await.unwrap();

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id(1), Duration::from_secs(1)).await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // The waiter still references the mutex, so releasing here must not prune it.
        drop(held);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
