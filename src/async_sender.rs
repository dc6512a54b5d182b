//! Priority-queued segment sender (C8).
//!
//! Holds packets produced by TP segmentation (or any other caller) until
//! their scheduled deadline, then hands them to a callback on a single
//! dedicated worker thread. This is a pure scheduling data structure: actual
//! socket I/O is the endpoint's responsibility (out of scope here, see
//! `spec.md` §1).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::net::SocketAddr;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

/// One batch of already-segmented packets waiting to be sent to
/// `destination` at `deadline`.
#[derive(Debug, Clone)]
pub struct PendingSegments {
    pub packets: Vec<Vec<u8>>,
    pub destination: SocketAddr,
    pub deadline: Instant,
}

#[derive(Debug)]
struct QueueEntry {
    entry: PendingSegments,
    // Monotonically increasing, used to break deadline ties in scheduling
    // order (§5 "ties break by insertion order").
    sequence: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.entry.deadline == other.entry.deadline && self.sequence == other.sequence
    }
}
impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest deadline (and,
        // on a tie, the earliest sequence number) sorts to the top.
        other
            .entry
            .deadline
            .cmp(&self.entry.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Shared {
    queue: Mutex<QueueState>,
    cond: Condvar,
}

struct QueueState {
    heap: BinaryHeap<QueueEntry>,
    next_sequence: u64,
    running: bool,
}

/// A min-heap of pending segment batches, drained by a single worker thread
/// in deadline order.
pub struct AsyncSegmentSender {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSegmentSender {
    /// Creates a new sender. No thread is spawned until [`Self::start`] is
    /// called.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(QueueState {
                    heap: BinaryHeap::new(),
                    next_sequence: 0,
                    running: false,
                }),
                cond: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Starts the worker thread, invoking `on_async_send` for every batch
    /// once its deadline has passed. Idempotent: calling `start` while
    /// already running is a no-op; calling it again after [`Self::stop`]
    /// rejoins a fresh worker (§4.8 "start() is idempotent against a prior
    /// stop() but must rejoin the thread").
    pub fn start<F>(&self, on_async_send: F)
    where
        F: Fn(PendingSegments) + Send + 'static,
    {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            return;
        }
        {
            let mut state = self.shared.queue.lock().unwrap();
            state.running = true;
        }
        let shared = Arc::clone(&self.shared);
        *worker = Some(
            std::thread::Builder::new()
                .name("someip-async-sender".into())
                .spawn(move || worker_loop(shared, on_async_send))
                .expect("failed to spawn async sender worker thread"),
        );
    }

    /// Schedules `packets` for delivery to `destination` no earlier than
    /// `deadline`.
    pub fn schedule(&self, packets: Vec<Vec<u8>>, destination: SocketAddr, deadline: Instant) {
        let mut state = self.shared.queue.lock().unwrap();
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.heap.push(QueueEntry {
            entry: PendingSegments {
                packets,
                destination,
                deadline,
            },
            sequence,
        });
        drop(state);
        self.shared.cond.notify_one();
    }

    /// Number of batches currently waiting to be sent.
    pub fn pending_len(&self) -> usize {
        self.shared.queue.lock().unwrap().heap.len()
    }

    /// Stops the worker: sets `running = false`, wakes it, joins it, and
    /// clears the queue (§4.8 "stop() sets running=false, notifies, joins,
    /// and clears the queue").
    pub fn stop(&self) {
        {
            let mut state = self.shared.queue.lock().unwrap();
            state.running = false;
            state.heap.clear();
        }
        self.shared.cond.notify_all();
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Default for AsyncSegmentSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AsyncSegmentSender {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<F>(shared: Arc<Shared>, on_async_send: F)
where
    F: Fn(PendingSegments),
{
    loop {
        let due = {
            let mut state = shared.queue.lock().unwrap();
            loop {
                if !state.running {
                    return;
                }
                match state.heap.peek() {
                    None => {
                        state = shared.cond.wait(state).unwrap();
                    }
                    Some(top) => {
                        let now = Instant::now();
                        if top.entry.deadline <= now {
                            break;
                        }
                        let timeout = top.entry.deadline - now;
                        let (guard, _timeout_result) =
                            shared.cond.wait_timeout(state, timeout).unwrap();
                        state = guard;
                    }
                }
            }

            // Drain every entry whose deadline has passed.
            let mut due = Vec::new();
            let now = Instant::now();
            while let Some(top) = state.heap.peek() {
                if top.entry.deadline <= now {
                    due.push(state.heap.pop().unwrap().entry);
                } else {
                    break;
                }
            }
            due
        };

        for entry in due {
            on_async_send(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn addr() -> SocketAddr {
        "127.0.0.1:30490".parse().unwrap()
    }

    #[test]
    fn delivers_in_deadline_order() {
        let sender = AsyncSegmentSender::new();
        let (tx, rx) = mpsc::channel();
        sender.start(move |entry| {
            tx.send(entry.packets[0][0]).unwrap();
        });

        let now = Instant::now();
        // Scheduled out of deadline order; expect delivery 1, 2, 3.
        sender.schedule(vec![vec![3]], addr(), now + Duration::from_millis(60));
        sender.schedule(vec![vec![1]], addr(), now + Duration::from_millis(5));
        sender.schedule(vec![vec![2]], addr(), now + Duration::from_millis(30));

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        }
        assert_eq!(received, vec![1, 2, 3]);
        sender.stop();
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let sender = AsyncSegmentSender::new();
        let (tx, rx) = mpsc::channel();
        sender.start(move |entry| {
            tx.send(entry.packets[0][0]).unwrap();
        });

        let deadline = Instant::now() + Duration::from_millis(10);
        sender.schedule(vec![vec![10]], addr(), deadline);
        sender.schedule(vec![vec![20]], addr(), deadline);
        sender.schedule(vec![vec![30]], addr(), deadline);

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        }
        assert_eq!(received, vec![10, 20, 30]);
        sender.stop();
    }

    #[test]
    fn stop_clears_pending_queue() {
        let sender = AsyncSegmentSender::new();
        sender.schedule(
            vec![vec![1]],
            addr(),
            Instant::now() + Duration::from_secs(60),
        );
        assert_eq!(sender.pending_len(), 1);
        sender.start(|_| {});
        sender.stop();
        assert_eq!(sender.pending_len(), 0);
    }

    #[test]
    fn start_is_idempotent_and_restart_rejoins() {
        let sender = AsyncSegmentSender::new();
        sender.start(|_| {});
        sender.start(|_| {}); // no-op, does not spawn a second thread
        sender.stop();
        // restart after stop spawns a fresh worker
        let (tx, rx) = mpsc::channel();
        sender.start(move |entry| tx.send(entry.packets[0][0]).unwrap());
        sender.schedule(vec![vec![7]], addr(), Instant::now());
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 7);
        sender.stop();
    }
}
