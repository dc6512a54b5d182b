use crate::*;
use core::hash::Hash;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Fixed window a TP reassembly entry is kept alive since the arrival of its
/// first segment, regardless of completion state.
///
/// Matches the reaper window a segmented transport reassembler runs with: an
/// attacker (or a peer that simply dropped a final segment) must not be able
/// to pin memory in [`TpPool`] forever.
pub const TP_REAP_WINDOW: Duration = Duration::from_secs(5);

/// Pool of buffers to reconstruct multiple SOMEIP TP packet streams in
/// parallel (re-uses buffers to minimize allocations).
///
/// Every active stream is timestamped with the arrival time of its first
/// segment. [`Self::reap`]/[`Self::reap_now`] evict streams older than
/// [`TP_REAP_WINDOW`] even if they never complete, bounding the memory a
/// stalled or malicious sender can pin (see "Issues to keep in mind" below).
///
/// # Issues to keep in mind:
///
/// If you use the [`TpPool`] in an untrusted environment an attacker could
/// cause an "out of memory error" by opening up multiple parallel TP streams,
/// never ending them and filling them up with as much data as possible. Call
/// [`Self::reap_now`] (or [`Self::reap`] with a clock you control) on a
/// regular interval to bound this.
///
/// Mitigations will hopefully be offered in future versions but if you have
/// take care right now you can still use [`TpBuf`] directly and implement the
/// connection handling and mitigation yourself.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TpPool<ChannelId: Hash + Eq + PartialEq + Clone + Sized> {
    /// Currently reconstructing TP streams, keyed by channel id and the
    /// request id shared by all segments of the stream. Each entry also
    /// stores the arrival time of its first segment for reaping.
    active: HashMap<(ChannelId, u32), (Instant, TpBuf)>,

    /// Buffers that have finished receiving data and can be re-used.
    finished: Vec<TpBuf>,

    /// Configuration that should be used for new buffers.
    buf_config: TpBufConfig,
}

impl<ChannelId: Hash + Eq + PartialEq + Clone + Sized> TpPool<ChannelId> {
    pub fn new(buf_config: TpBufConfig) -> TpPool<ChannelId> {
        TpPool {
            active: HashMap::new(),
            finished: Vec::new(),
            buf_config,
        }
    }

    /// Number of streams currently being reassembled.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn consume<'a: 'c, 'b: 'c, 'c: 'a + 'b>(
        &'a mut self,
        id: ChannelId,
        someip_slice: SomeipMsgSlice<'b>,
    ) -> Result<Option<SomeipMsgSlice<'c>>, err::TpReassembleError> {
        self.consume_at(id, someip_slice, Instant::now())
    }

    /// Same as [`Self::consume`] but takes an explicit arrival timestamp,
    /// used by callers that drive the reaper off their own clock (and by
    /// tests that need to deterministically fast-forward past
    /// [`TP_REAP_WINDOW`]).
    pub fn consume_at<'a: 'c, 'b: 'c, 'c: 'a + 'b>(
        &'a mut self,
        id: ChannelId,
        someip_slice: SomeipMsgSlice<'b>,
        now: Instant,
    ) -> Result<Option<SomeipMsgSlice<'c>>, err::TpReassembleError> {
        if someip_slice.is_tp() {
            use std::collections::hash_map::Entry::*;
            match self.active.entry((id, someip_slice.request_id())) {
                Occupied(mut o) => {
                    // stream already known consume the data
                    o.get_mut().1.consume_tp(someip_slice)?;

                    // check if the stream is complete
                    if o.get().1.is_complete() {
                        // if done move the buffer to the finished list and return the result
                        let (_, buf) = o.remove();
                        self.finished.push(buf);
                        Ok(Some(
                            self.finished.last_mut().unwrap().try_finalize().unwrap(),
                        ))
                    } else {
                        Ok(None)
                    }
                }
                Vacant(v) => {
                    // new stream get a finished or new buffer
                    let mut buf = if let Some(mut b) = self.finished.pop() {
                        b.clear();
                        b
                    } else {
                        TpBuf::new(self.buf_config.clone())
                    };

                    // consume the data
                    buf.consume_tp(someip_slice)?;

                    // check if the stream is complete
                    if buf.is_complete() {
                        // if done move the buffer to the finished list and return the result
                        self.finished.push(buf);
                        Ok(Some(
                            self.finished.last_mut().unwrap().try_finalize().unwrap(),
                        ))
                    } else {
                        // stream is not yet done, keep it around until done,
                        // stamped with its creation time for the reaper.
                        v.insert((now, buf));
                        Ok(None)
                    }
                }
            }
        } else {
            Ok(Some(someip_slice))
        }
    }

    /// Evicts every TP stream whose first segment arrived at least
    /// [`TP_REAP_WINDOW`] before `now`, regardless of completion state, and
    /// returns how many were evicted. Evicted buffers are moved to the reuse
    /// pool rather than dropped.
    ///
    /// Callers own the timer driving this: call it from a periodic tick (or
    /// before every `consume`) with the same clock used for `consume_at`, or
    /// use [`TpReaper`] to run it on its own background thread.
    pub fn reap(&mut self, now: Instant) -> usize {
        let stale: Vec<(ChannelId, u32)> = self
            .active
            .iter()
            .filter(|(_, (created, _))| now.saturating_duration_since(*created) >= TP_REAP_WINDOW)
            .map(|(key, _)| key.clone())
            .collect();
        let count = stale.len();
        if count > 0 {
            log::debug!(
                "TP reaper evicting {count} stream(s) that exceeded the {:?} reap window",
                TP_REAP_WINDOW
            );
        }
        for key in stale {
            if let Some((_, mut buf)) = self.active.remove(&key) {
                buf.clear();
                self.finished.push(buf);
            }
        }
        count
    }

    /// Convenience wrapper around [`Self::reap`] using the current time.
    pub fn reap_now(&mut self) -> usize {
        self.reap(Instant::now())
    }
}

/// Runs a [`TpPool`] behind a background timer thread that arms a
/// [`TP_REAP_WINDOW`] timer whenever a stream is active and re-arms itself
/// as long as any stream remains, evicting stale streams without the
/// caller having to drive the timer itself (§4.7, §5 "the TP reaper
/// timer"). Mirrors [`crate::AsyncSegmentSender`]'s condvar-guarded worker
/// thread pattern.
///
/// Because the pool lives behind a [`Mutex`] shared with the reaper thread,
/// completed streams are handed back as an owned [`crate::SomeipMessage`]
/// rather than a [`SomeipMsgSlice`] borrowed from the pool (a borrow tied to
/// the mutex guard could not outlive the call).
pub struct TpReaper<ChannelId: Hash + Eq + PartialEq + Clone + Sized + Send + 'static> {
    shared: std::sync::Arc<ReaperShared<ChannelId>>,
    worker: std::sync::Mutex<Option<std::thread::JoinHandle<()>>>,
}

struct ReaperShared<ChannelId: Hash + Eq + PartialEq + Clone + Sized> {
    state: std::sync::Mutex<ReaperState<ChannelId>>,
    cond: std::sync::Condvar,
}

struct ReaperState<ChannelId: Hash + Eq + PartialEq + Clone + Sized> {
    pool: TpPool<ChannelId>,
    running: bool,
}

impl<ChannelId: Hash + Eq + PartialEq + Clone + Sized + Send + 'static> TpReaper<ChannelId> {
    /// Creates a new reaper. No thread is spawned until [`Self::start`] is
    /// called.
    pub fn new(buf_config: TpBufConfig) -> Self {
        Self {
            shared: std::sync::Arc::new(ReaperShared {
                state: std::sync::Mutex::new(ReaperState {
                    pool: TpPool::new(buf_config),
                    running: false,
                }),
                cond: std::sync::Condvar::new(),
            }),
            worker: std::sync::Mutex::new(None),
        }
    }

    /// Starts the background reaper thread. Idempotent against being
    /// already started; rejoins a fresh worker after a prior [`Self::stop`].
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            return;
        }
        self.shared.state.lock().unwrap().running = true;
        let shared = std::sync::Arc::clone(&self.shared);
        *worker = Some(
            std::thread::Builder::new()
                .name("someip-tp-reaper".into())
                .spawn(move || reaper_loop(shared))
                .expect("failed to spawn TP reaper worker thread"),
        );
    }

    /// Feeds a TP segment into the underlying pool, waking the reaper
    /// thread so it arms its timer promptly if this is the first active
    /// stream.
    pub fn consume_at(
        &self,
        id: ChannelId,
        someip_slice: SomeipMsgSlice,
        now: Instant,
    ) -> Result<Option<SomeipMessage>, err::TpReassembleError> {
        let mut state = self.shared.state.lock().unwrap();
        let was_idle = state.pool.active_len() == 0;
        let result = state
            .pool
            .consume_at(id, someip_slice, now)?
            .map(|slice| SomeipMessage::new(slice.to_header(), slice.payload().to_vec()));
        if was_idle && state.pool.active_len() > 0 {
            drop(state);
            self.shared.cond.notify_one();
        }
        Ok(result)
    }

    /// Same as [`Self::consume_at`] but stamped with the current time.
    pub fn consume(
        &self,
        id: ChannelId,
        someip_slice: SomeipMsgSlice,
    ) -> Result<Option<SomeipMessage>, err::TpReassembleError> {
        self.consume_at(id, someip_slice, Instant::now())
    }

    /// Number of streams currently being reassembled.
    pub fn active_len(&self) -> usize {
        self.shared.state.lock().unwrap().pool.active_len()
    }

    /// Stops the reaper thread: this cancels the timer without evicting or
    /// firing on whatever streams are still active (§5 "reaper cancellation
    /// on shutdown must cancel the timer without firing the callback").
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.running = false;
        }
        self.shared.cond.notify_all();
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl<ChannelId: Hash + Eq + PartialEq + Clone + Sized + Send + 'static> Drop for TpReaper<ChannelId> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reaper_loop<ChannelId: Hash + Eq + PartialEq + Clone + Sized>(
    shared: std::sync::Arc<ReaperShared<ChannelId>>,
) {
    loop {
        let mut state = shared.state.lock().unwrap();
        loop {
            if !state.running {
                return;
            }
            if state.pool.active_len() == 0 {
                state = shared.cond.wait(state).unwrap();
            } else {
                break;
            }
        }

        let (mut state, _timeout_result) =
            shared.cond.wait_timeout(state, TP_REAP_WINDOW).unwrap();
        if !state.running {
            // cancelled while waiting: do not fire the eviction pass.
            return;
        }
        let _ = state.pool.reap_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPacket {
        request_id: u32,
        offset: u32,
        more_segments: bool,
        payload: Vec<u8>,
    }

    impl TestPacket {
        fn new(request_id: u32, offset: u32, more_segments: bool, payload: &[u8]) -> TestPacket {
            TestPacket {
                request_id,
                offset,
                more_segments,
                payload: payload.iter().copied().collect(),
            }
        }

        fn to_vec(&self) -> Vec<u8> {
            let header = SomeIpHeader {
                message_id: 1234,
                length: 8 + 4 + self.payload.len() as u32,
                request_id: self.request_id,
                interface_version: 1,
                message_type: MessageType::Notification,
                return_code: 0,
                tp_header: {
                    let mut tp = TpHeader::new(self.more_segments);
                    tp.set_offset(self.offset).unwrap();
                    Some(tp)
                },
            };
            let mut result = Vec::with_capacity(SOMEIP_HEADER_LENGTH + 4 + self.payload.len());
            result.extend_from_slice(&header.base_to_bytes());
            result.extend_from_slice(&header.tp_header.as_ref().unwrap().to_bytes());
            result.extend_from_slice(&self.payload);
            result
        }

        fn result_header(&self, payload_length: u32) -> SomeIpHeader {
            SomeIpHeader {
                message_id: 1234,
                length: payload_length + 8,
                request_id: self.request_id,
                interface_version: 1,
                message_type: MessageType::Notification,
                return_code: 0,
                tp_header: None,
            }
        }
    }

    /// Returns a u8 vec counting up from "start" until len is reached (truncating bits greater then u8).
    fn sequence(start: usize, len: usize) -> Vec<u8> {
        let mut result = Vec::with_capacity(len);
        for i in start..start + len {
            result.push((i & 0xff) as u8);
        }
        result
    }

    #[rustfmt::skip]
    #[test]
    fn consume() {
        use err::TpReassembleError::*;

        // simple packet forwarding (without TP effect)
        {
            // build a non tp packet
            let header = SomeIpHeader {
                message_id: 1234,
                length: 8 + 8 as u32,
                request_id: 234,
                interface_version: 1,
                message_type: MessageType::Notification,
                return_code: 0,
                // no tp header
                tp_header: None,
            };
            let mut result = Vec::with_capacity(SOMEIP_HEADER_LENGTH + 8);
            result.extend_from_slice(&header.base_to_bytes());
            result.extend_from_slice(&[0;8]);
            
            let someip_slice = SomeipMsgSlice::from_slice(&result).unwrap();

            let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());
            let result = pool.consume((), someip_slice.clone()).unwrap();
            assert_eq!(Some(someip_slice), result);
        }

        // normal reconstruction (without additional id)
        {
            let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());

            let actions = [
                // start two streams in parallel
                (TestPacket::new(1, 0, true, &sequence(1,16)), None),
                (TestPacket::new(2, 0, true, &sequence(2,32)), None),
                // stream 1 ends
                (TestPacket::new(1, 16, false, &sequence(1 + 16,16)), Some(sequence(1,32))),
                // stream 3 which imidiatly ends
                (TestPacket::new(3, 0, false, &sequence(3,16*4)), Some(sequence(3, 16*4))),
                // end stream 2
                (TestPacket::new(2, 32, false, &sequence(32 + 2,16*4)), Some(sequence(2, 16*6))),
            ];
            for a in actions {
                let packet = a.0.to_vec();
                let slice = SomeipMsgSlice::from_slice(&packet).unwrap();
                let result = pool.consume((), slice).unwrap();
                if let Some(expected_payload) = a.1 {
                    let msg = result.unwrap();
                    assert_eq!(msg.to_header(), a.0.result_header(expected_payload.len() as u32));
                    assert_eq!(msg.payload(), expected_payload);
                } else {
                    assert!(result.is_none());
                }
            }
        }

        // normal reconstruction (with additional id)
        {
            let mut pool: TpPool<u32> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());

            // all actions have the same request id have differing id's
            let actions = [
                // start two streams in parallel
                (123, TestPacket::new(1, 0, true, &sequence(1,16)), None),
                (234, TestPacket::new(1, 0, true, &sequence(2,32)), None),
                // stream 1 ends
                (123, TestPacket::new(1, 16, false, &sequence(1 + 16,16)), Some(sequence(1,32))),
                // stream 3 which imidiatly ends
                (345, TestPacket::new(1, 0, false, &sequence(3,16*4)), Some(sequence(3, 16*4))),
                // end stream 2
                (234, TestPacket::new(1, 32, false, &sequence(32 + 2,16*4)), Some(sequence(2, 16*6))),
            ];
            for a in actions {
                let packet = a.1.to_vec();
                let slice = SomeipMsgSlice::from_slice(&packet).unwrap();
                let result = pool.consume(a.0.clone(), slice).unwrap();
                if let Some(expected_payload) = a.2 {
                    let msg = result.unwrap();
                    assert_eq!(msg.to_header(), a.1.result_header(expected_payload.len() as u32));
                    assert_eq!(msg.payload(), expected_payload);
                } else {
                    assert!(result.is_none());
                }
            }
        }

        // error during reconstruction (at start)
        {
            let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());

            // should trigger an error as the payload is not a multiple of 1
            let packet = TestPacket::new(1, 0, true, &sequence(1,15)).to_vec();
            let someip_slice = SomeipMsgSlice::from_slice(&packet).unwrap();
            assert_eq!(
                pool.consume((), someip_slice).unwrap_err(),
                UnalignedTpPayloadLen { offset: 0, payload_len: 15 }
            );
        }

        // error during reconstruction (after start)
        {
            let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());

            {
                let packet = TestPacket::new(1, 0, true, &sequence(1,16)).to_vec();
                let someip_slice = SomeipMsgSlice::from_slice(&packet).unwrap();
                pool.consume((), someip_slice).unwrap();
            }

            // should trigger an error as the payload is not a multiple of 1
            let packet = TestPacket::new(1, 16, true, &sequence(1,15)).to_vec();
            let someip_slice = SomeipMsgSlice::from_slice(&packet).unwrap();
            assert_eq!(
                pool.consume((), someip_slice).unwrap_err(),
                UnalignedTpPayloadLen { offset: 16, payload_len: 15 }
            );
        }

    }

    #[test]
    fn reap_evicts_stale_incomplete_streams() {
        let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());
        let t0 = Instant::now();

        // one non-final segment, stream never completes
        let packet = TestPacket::new(1, 0, true, &sequence(0, 16)).to_vec();
        let slice = SomeipMsgSlice::from_slice(&packet).unwrap();
        assert_eq!(pool.consume_at((), slice, t0).unwrap(), None);
        assert_eq!(pool.active_len(), 1);

        // well before the reap window: nothing is evicted
        assert_eq!(pool.reap(t0 + Duration::from_secs(2)), 0);
        assert_eq!(pool.active_len(), 1);

        // past the 5s window: the stale entry is evicted regardless of
        // completion state and no completion is produced
        assert_eq!(pool.reap(t0 + Duration::from_millis(5100)), 1);
        assert_eq!(pool.active_len(), 0);
    }

    #[test]
    fn reap_keeps_fresh_streams_and_completed_streams_are_not_tracked() {
        let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());
        let t0 = Instant::now();

        let p1 = TestPacket::new(1, 0, true, &sequence(0, 16)).to_vec();
        pool.consume_at((), SomeipMsgSlice::from_slice(&p1).unwrap(), t0)
            .unwrap();

        let p2 = TestPacket::new(1, 16, false, &sequence(16, 16)).to_vec();
        let result = pool
            .consume_at((), SomeipMsgSlice::from_slice(&p2).unwrap(), t0 + Duration::from_secs(1))
            .unwrap();
        assert!(result.is_some());
        // the stream completed before the reaper ever saw it
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.reap(t0 + Duration::from_secs(10)), 0);
    }

    #[test]
    fn reap_now_runs_against_the_real_clock() {
        let mut pool: TpPool<()> = TpPool::new(TpBufConfig::new(1024, 2048).unwrap());
        let packet = TestPacket::new(1, 0, true, &sequence(0, 16)).to_vec();
        pool.consume((), SomeipMsgSlice::from_slice(&packet).unwrap())
            .unwrap();
        assert_eq!(pool.active_len(), 1);
        // not stale yet
        assert_eq!(pool.reap_now(), 0);
        assert_eq!(pool.active_len(), 1);
    }

    #[test]
    fn reaper_consume_completes_and_hands_back_owned_message() {
        let reaper: TpReaper<()> = TpReaper::new(TpBufConfig::new(1024, 2048).unwrap());

        let p1 = TestPacket::new(1, 0, true, &sequence(0, 16)).to_vec();
        assert!(reaper
            .consume((), SomeipMsgSlice::from_slice(&p1).unwrap())
            .unwrap()
            .is_none());
        assert_eq!(reaper.active_len(), 1);

        let p2 = TestPacket::new(1, 16, false, &sequence(16, 16)).to_vec();
        let result = reaper
            .consume((), SomeipMsgSlice::from_slice(&p2).unwrap())
            .unwrap();
        assert_eq!(reaper.active_len(), 0);
        let msg = result.unwrap();
        assert_eq!(msg.payload(), &sequence(0, 32)[..]);
    }

    #[test]
    fn reaper_start_stop_is_idempotent_and_does_not_panic() {
        let reaper: TpReaper<()> = TpReaper::new(TpBufConfig::new(1024, 2048).unwrap());
        reaper.start();
        reaper.start(); // no-op, does not spawn a second thread

        let p1 = TestPacket::new(1, 0, true, &sequence(0, 16)).to_vec();
        reaper
            .consume((), SomeipMsgSlice::from_slice(&p1).unwrap())
            .unwrap();
        assert_eq!(reaper.active_len(), 1);

        // cancellation must not evict/fire, it just stops the timer.
        reaper.stop();
        assert_eq!(reaper.active_len(), 1);
    }
}
