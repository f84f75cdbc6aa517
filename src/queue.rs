//! Lock-free single-producer/single-consumer ring buffer.
//!
//! All inter-component messaging runs over these queues: the gateway feeds
//! requests in, the engine writes responses and market updates out. Capacity
//! is fixed at construction; every slot holds a default-constructed
//! placeholder that the producer overwrites in place before publishing.
//!
//! [`SpscQueue::with_capacity`] splits the buffer into a [`Producer`] and a
//! [`Consumer`], each `Send` and neither clonable, so the one-writer/
//! one-reader discipline is enforced by ownership rather than by deployment
//! convention. There is no blocking and no backpressure beyond capacity:
//! committing a write while the queue is full overwrites the oldest unread
//! element. Exchange traffic is bounded and provisioned, so staying under
//! capacity is the caller's responsibility; a debug assertion is the only
//! tripwire.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The shared ring. Only ever touched through a [`Producer`]/[`Consumer`]
/// pair.
pub struct SpscQueue<T> {
    slots: Box<[UnsafeCell<T>]>,
    len: AtomicUsize,
}

// The producer and consumer dereference disjoint slots: the `len` counter
// (release on publish, acquire on observe) keeps the readable window and the
// writable window from overlapping.
unsafe impl<T: Send> Sync for SpscQueue<T> {}

impl<T: Default> SpscQueue<T> {
    /// Allocate a ring of `capacity` placeholder slots and split it into its
    /// two endpoints.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> (Producer<T>, Consumer<T>) {
        assert!(capacity > 0, "queue capacity must be non-zero");

        let slots = (0..capacity).map(|_| UnsafeCell::new(T::default())).collect();
        let queue = Arc::new(SpscQueue {
            slots,
            len: AtomicUsize::new(0),
        });

        (
            Producer {
                queue: Arc::clone(&queue),
                write: 0,
            },
            Consumer { queue, read: 0 },
        )
    }
}

impl<T> SpscQueue<T> {
    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }
}

/// Writing endpoint. Owned by exactly one thread.
pub struct Producer<T> {
    queue: Arc<SpscQueue<T>>,
    /// Next slot to write; only this endpoint ever moves it.
    write: usize,
}

unsafe impl<T: Send> Send for Producer<T> {}

impl<T> Producer<T> {
    /// The next slot to be written. Mutate it in place, then publish with
    /// [`commit`](Producer::commit).
    #[inline]
    pub fn slot(&mut self) -> &mut T {
        // This slot sits outside the consumer's readable window as long as
        // the queue is under capacity.
        unsafe { &mut *self.queue.slots[self.write].get() }
    }

    /// Publish the slot written via [`slot`](Producer::slot): advance the
    /// write cursor modulo capacity and release one unit to the shared
    /// length counter.
    #[inline]
    pub fn commit(&mut self) {
        debug_assert!(self.queue.len() < self.queue.capacity(), "queue overrun");
        self.write = (self.write + 1) % self.queue.capacity();
        self.queue.len.fetch_add(1, Ordering::AcqRel);
    }

    /// Write-and-publish in one step.
    #[inline]
    pub fn push(&mut self, value: T) {
        *self.slot() = value;
        self.commit();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Reading endpoint. Owned by exactly one thread.
pub struct Consumer<T> {
    queue: Arc<SpscQueue<T>>,
    /// Oldest unread slot; only this endpoint ever moves it.
    read: usize,
}

unsafe impl<T: Send> Send for Consumer<T> {}

impl<T> Consumer<T> {
    /// The oldest unread element, or `None` when the queue is logically
    /// empty.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        if self.queue.len() == 0 {
            return None;
        }
        Some(unsafe { &*self.queue.slots[self.read].get() })
    }

    /// Release the slot returned by [`peek`](Consumer::peek) back to the
    /// producer.
    #[inline]
    pub fn commit(&mut self) {
        debug_assert!(self.queue.len() > 0, "commit on an empty queue");
        self.read = (self.read + 1) % self.queue.capacity();
        self.queue.len.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<T: Copy> Consumer<T> {
    /// Copy out the oldest unread element and release its slot.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let value = *self.peek()?;
        self.commit();
        Some(value)
    }
}
