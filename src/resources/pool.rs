//! # ResourcePool: fixed arena of resources addressed by index.
//!
//! The pool is built once, never grows or shrinks, and hands out resources by
//! id. All resources share one [`Occupancy`] gauge so the number of tasks that
//! hold *any* resource lock at the same time can be observed.

use std::sync::Arc;

use crate::error::PoolError;
use crate::occupancy::Occupancy;

use super::resource::{Resource, ResourceGuard};

/// Final (or intermediate) reading of one resource, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSnapshot {
    /// Resource id.
    pub id: usize,
    /// Fixed capacity.
    pub capacity: u32,
    /// Quota at the time of the reading.
    pub available: u32,
}

impl ResourceSnapshot {
    /// True if `0 ≤ available ≤ capacity`.
    pub fn within_bounds(&self) -> bool {
        self.available <= self.capacity
    }

    /// Units booked at the time of the reading.
    pub fn booked(&self) -> u32 {
        self.capacity.saturating_sub(self.available)
    }
}

/// Ordered, fixed-size collection of [`Resource`]s.
#[derive(Debug)]
pub struct ResourcePool {
    resources: Vec<Resource>,
    holders: Arc<Occupancy>,
}

impl ResourcePool {
    /// Creates `count` resources, ids `0..count`, each fully available.
    pub fn new(count: usize, capacity: u32) -> Self {
        let holders = Arc::new(Occupancy::new());
        let resources = (0..count)
            .map(|id| Resource::with_gauge(id, capacity, Arc::clone(&holders)))
            .collect();
        Self { resources, holders }
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if the pool holds no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resource with the given id.
    pub fn get(&self, id: usize) -> Result<&Resource, PoolError> {
        self.resources.get(id).ok_or(PoolError::UnknownResource {
            id,
            len: self.resources.len(),
        })
    }

    /// Iterates resources in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Locks the resource with the given id.
    pub async fn lock(&self, id: usize) -> Result<ResourceGuard<'_>, PoolError> {
        Ok(self.get(id)?.lock().await)
    }

    /// Reads every resource under its own lock, in id order.
    ///
    /// Locks are taken one at a time; no two are ever held together.
    pub async fn snapshot(&self) -> Vec<ResourceSnapshot> {
        let mut out = Vec::with_capacity(self.resources.len());
        for r in &self.resources {
            let g = r.lock().await;
            out.push(ResourceSnapshot {
                id: g.id(),
                capacity: g.capacity(),
                available: g.available(),
            });
        }
        out
    }

    /// Tasks holding a resource lock right now.
    pub fn lock_holders(&self) -> usize {
        self.holders.current()
    }

    /// Highest number of tasks that held resource locks simultaneously.
    pub fn peak_lock_holders(&self) -> usize {
        self.holders.peak()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_ids_and_initial_state() {
        let pool = ResourcePool::new(5, 500);
        assert_eq!(pool.len(), 5);
        let snap = pool.snapshot().await;
        assert_eq!(snap.len(), 5);
        for (i, s) in snap.iter().enumerate() {
            assert_eq!(s.id, i);
            assert_eq!(s.available, 500);
            assert!(s.within_bounds());
        }
    }

    #[tokio::test]
    async fn test_unknown_resource() {
        let pool = ResourcePool::new(2, 10);
        let err = pool.lock(2).await.err().unwrap();
        assert_eq!(err, PoolError::UnknownResource { id: 2, len: 2 });
    }

    #[tokio::test]
    async fn test_holders_tracked_across_resources() {
        let pool = ResourcePool::new(3, 10);
        {
            let _a = pool.lock(0).await.unwrap();
            let _b = pool.lock(2).await.unwrap();
            assert_eq!(pool.lock_holders(), 2);
        }
        assert_eq!(pool.lock_holders(), 0);
        assert_eq!(pool.peak_lock_holders(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_mutations() {
        let pool = ResourcePool::new(3, 10);
        pool.lock(1).await.unwrap().book(6);
        let snap = pool.snapshot().await;
        assert_eq!(snap[1].available, 4);
        assert_eq!(snap[1].booked(), 6);
        assert_eq!(snap[0].available, 10);
    }
}
