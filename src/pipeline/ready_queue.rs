// SYNOID Hologram Ready Queue
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Bounded single-producer/single-consumer ring of decoded frames.
//
// `tail` is written only by the producer and `head` only by the consumer.
// Each side publishes its index with Release after touching a slot and
// reads the other side's index with Acquire before touching a slot, so a
// slot is never read before its write is visible nor overwritten before
// its read has finished. One slot is always left empty to tell full from
// empty.
//
// `Producer::clear` cannot move `head`, so it bumps an epoch instead.
// Entries are tagged with the epoch they were pushed under and the
// consumer discards anything older than the current epoch.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

struct Entry<T> {
    epoch: u64,
    value: T,
}

struct Ring<T> {
    slots: Box<[UnsafeCell<MaybeUninit<Entry<T>>>]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    epoch: AtomicU64,
}

// Slots are handed between exactly one producer and one consumer through
// the acquire/release protocol above.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    fn next(&self, i: usize) -> usize {
        let n = i + 1;
        if n == self.slots.len() {
            0
        } else {
            n
        }
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail + self.slots.len() - head) % self.slots.len()
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let mut head = *self.head.get_mut();
        let tail = *self.tail.get_mut();
        while head != tail {
            // SAFETY: slots in [head, tail) hold initialised entries and we
            // have exclusive access.
            unsafe { self.slots[head].get_mut().assume_init_drop() };
            head = self.next(head);
        }
    }
}

/// Create a queue holding at most `capacity` entries.
pub fn ready_queue<T: Send>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    let slots = (0..capacity.max(1) + 1)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect::<Vec<_>>()
        .into_boxed_slice();
    let ring = Arc::new(Ring {
        slots,
        head: AtomicUsize::new(0),
        tail: AtomicUsize::new(0),
        epoch: AtomicU64::new(0),
    });
    (
        Producer {
            ring: ring.clone(),
            epoch: 0,
        },
        Consumer { ring },
    )
}

/// Create a queue from a ring size; one slot stays empty, so
/// `slots - 1` entries fit.
pub fn ready_queue_with_slots<T: Send>(slots: usize) -> (Producer<T>, Consumer<T>) {
    ready_queue(slots.saturating_sub(1))
}

pub struct Producer<T> {
    ring: Arc<Ring<T>>,
    epoch: u64,
}

impl<T> Producer<T> {
    /// Push without blocking. Hands the value back when full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let next = self.ring.next(tail);
        if next == self.ring.head.load(Ordering::Acquire) {
            return Err(value);
        }
        // SAFETY: `tail` is owned by us and the consumer has released it
        // (head != next), so nobody else touches this slot.
        unsafe {
            (*self.ring.slots[tail].get()).write(Entry {
                epoch: self.epoch,
                value,
            });
        }
        self.ring.tail.store(next, Ordering::Release);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        self.ring.next(tail) == self.ring.head.load(Ordering::Acquire)
    }

    /// Invalidate everything pushed so far. Entries are released lazily by
    /// the consumer.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.ring.epoch.store(self.epoch, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// True when nothing is queued, stale entries included.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.slots.len() - 1
    }
}

pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
}

impl<T> Consumer<T> {
    /// Pop the oldest live entry without blocking.
    pub fn pop(&mut self) -> Option<T> {
        self.pop_counting().0
    }

    /// Like [`pop`](Self::pop), also reporting how many cleared entries
    /// were discarded on the way.
    pub fn pop_counting(&mut self) -> (Option<T>, usize) {
        let mut discarded = 0;
        loop {
            let head = self.ring.head.load(Ordering::Relaxed);
            if head == self.ring.tail.load(Ordering::Acquire) {
                return (None, discarded);
            }
            // SAFETY: head != tail, and the Acquire above synchronises with
            // the producer's Release of the slot write.
            let entry = unsafe { (*self.ring.slots[head].get()).assume_init_read() };
            self.ring.head.store(self.ring.next(head), Ordering::Release);

            if entry.epoch < self.ring.epoch.load(Ordering::Acquire) {
                discarded += 1;
                continue;
            }
            return (Some(entry.value), discarded);
        }
    }

    /// Drop everything currently queued. Returns how many entries went.
    pub fn drain(&mut self) -> usize {
        let mut n = 0;
        loop {
            let (value, discarded) = self.pop_counting();
            n += discarded;
            match value {
                Some(_) => n += 1,
                None => return n,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.head.load(Ordering::Relaxed) == self.ring.tail.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.ring.slots.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    #[test]
    fn test_capacity_ten() {
        let (mut tx, mut rx) = ready_queue::<u32>(10);
        for i in 0..10 {
            assert!(tx.push(i).is_ok());
        }
        assert!(tx.is_full());
        assert_eq!(tx.push(10), Err(10));
        assert_eq!(rx.pop(), Some(0));
        assert!(tx.push(10).is_ok());
        assert_eq!(rx.len(), 10);
    }

    #[test]
    fn test_slots_leave_one_empty() {
        let (tx, _rx) = ready_queue_with_slots::<u8>(31);
        assert_eq!(tx.capacity(), 30);
    }

    #[test]
    fn test_fifo_and_empty() {
        let (mut tx, mut rx) = ready_queue::<&str>(3);
        assert!(rx.pop().is_none());
        tx.push("a").unwrap();
        tx.push("b").unwrap();
        assert_eq!(rx.pop(), Some("a"));
        tx.push("c").unwrap();
        tx.push("d").unwrap();
        assert_eq!(rx.pop(), Some("b"));
        assert_eq!(rx.pop(), Some("c"));
        assert_eq!(rx.pop(), Some("d"));
        assert!(rx.is_empty());
    }

    #[test]
    fn test_clear_discards_older_entries() {
        let (mut tx, mut rx) = ready_queue::<u32>(4);
        tx.push(1).unwrap();
        tx.push(2).unwrap();
        tx.clear();
        tx.push(3).unwrap();
        assert_eq!(rx.pop_counting(), (Some(3), 2));
        assert!(rx.pop().is_none());
    }

    #[test]
    fn test_drain() {
        let (mut tx, mut rx) = ready_queue::<u32>(4);
        tx.push(1).unwrap();
        tx.push(2).unwrap();
        assert_eq!(rx.drain(), 2);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_drop_releases_queued_values() {
        let marker = Arc::new(());
        {
            let (mut tx, mut rx) = ready_queue::<Arc<()>>(4);
            tx.push(marker.clone()).unwrap();
            tx.push(marker.clone()).unwrap();
            tx.push(marker.clone()).unwrap();
            drop(rx.pop());
            assert_eq!(Arc::strong_count(&marker), 3);
        }
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn test_concurrent_fifo_exactly_once() {
        const N: u64 = 200_000;
        let (mut tx, mut rx) = ready_queue::<u64>(7);
        let done = Arc::new(AtomicBool::new(false));

        let producer = thread::spawn(move || {
            let mut i = 0;
            while i < N {
                match tx.push(i) {
                    Ok(()) => i += 1,
                    Err(v) => {
                        assert_eq!(v, i);
                        assert!(tx.len() <= tx.capacity());
                        thread::yield_now();
                    }
                }
            }
        });

        let done_rx = done.clone();
        let consumer = thread::spawn(move || {
            let mut expected = 0;
            while expected < N {
                match rx.pop() {
                    Some(v) => {
                        assert_eq!(v, expected);
                        expected += 1;
                    }
                    None => thread::yield_now(),
                }
            }
            assert!(rx.pop().is_none());
            done_rx.store(true, Ordering::Release);
        });

        producer.join().unwrap();
        consumer.join().unwrap();
        assert!(done.load(Ordering::Acquire));
    }

    #[test]
    fn test_concurrent_clear_never_resurrects_older_epoch() {
        const N: u64 = 100_000;
        const CLEAR_EVERY: u64 = 997;
        // Values are (epoch at push time, sequence number).
        let (mut tx, mut rx) = ready_queue::<(u64, u64)>(7);

        let producer = thread::spawn(move || {
            let mut epoch = 0;
            let mut i = 0;
            while i < N {
                if i > 0 && i % CLEAR_EVERY == 0 {
                    tx.clear();
                    epoch += 1;
                }
                while tx.push((epoch, i)).is_err() {
                    thread::yield_now();
                }
                i += 1;
            }
        });

        let consumer = thread::spawn(move || {
            let mut seen_epoch = 0;
            let mut last_seq = None;
            let mut received = 0u64;
            let mut discarded = 0u64;
            loop {
                let (value, dropped) = rx.pop_counting();
                discarded += dropped as u64;
                let Some((epoch, seq)) = value else {
                    thread::yield_now();
                    continue;
                };
                received += 1;
                assert!(epoch >= seen_epoch, "epoch {} after {}", epoch, seen_epoch);
                assert!(last_seq.map_or(true, |l| seq > l));
                seen_epoch = epoch;
                last_seq = Some(seq);
                if seq == N - 1 {
                    break;
                }
            }
            (received, discarded)
        });

        producer.join().unwrap();
        let (received, discarded) = consumer.join().unwrap();
        assert_eq!(received + discarded, N);
    }
}
