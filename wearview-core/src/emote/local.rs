// File: wearview-core/src/emote/local.rs
//
// Clock-driven playback for previews rendered in-process. The controller
// models the clip position against wall time and runs a timer task per
// play that fires the end-of-clip transition (LOOP or END).

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use wearview_common::Error;

use crate::emote::{EmoteController, EmoteEvent, EmoteEventSender};

/// Nominal frame interval used to defer the re-play after a mid-playback
/// seek, so the pause/seek pair never shows as a T-pose frame.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Stopped,
    Playing,
    Paused,
}

struct Playback {
    status: Status,
    /// Clip position in seconds at `started_at`, or the current position
    /// while not playing.
    baseline: f64,
    started_at: Option<Instant>,
    /// Pending seek target consumed by the next `play()`.
    start_from: Option<f64>,
    /// Bumped on every transition; timer tasks from an older epoch are
    /// stale and must not act.
    epoch: u64,
}

impl Playback {
    fn position(&self, length: f64, looping: bool) -> f64 {
        let Some(started_at) = self.started_at else {
            return self.baseline;
        };
        let raw = self.baseline + started_at.elapsed().as_secs_f64();
        if length <= 0.0 {
            0.0
        } else if looping {
            raw % length
        } else {
            raw.min(length)
        }
    }
}

struct Inner {
    length: f64,
    looping: bool,
    events: EmoteEventSender,
    state: Mutex<Playback>,
}

impl Inner {
    async fn play(self: &Arc<Self>) {
        let mut state = self.state.lock().await;
        if state.status == Status::Playing {
            return;
        }
        let start = state
            .start_from
            .take()
            .unwrap_or(state.baseline)
            .clamp(0.0, self.length);
        state.baseline = start;
        state.started_at = Some(Instant::now());
        state.status = Status::Playing;
        state.epoch += 1;
        let epoch = state.epoch;
        drop(state);
        let _ = self.events.send(EmoteEvent::Play);
        self.arm(epoch, Duration::from_secs_f64((self.length - start).max(0.0)));
    }

    async fn pause(&self) {
        let mut state = self.state.lock().await;
        if state.status != Status::Playing {
            return;
        }
        state.baseline = state.position(self.length, self.looping);
        state.started_at = None;
        state.status = Status::Paused;
        state.epoch += 1;
        drop(state);
        let _ = self.events.send(EmoteEvent::Pause);
    }

    async fn stop(&self) {
        let mut state = self.state.lock().await;
        state.status = Status::Stopped;
        state.baseline = 0.0;
        state.started_at = None;
        state.start_from = None;
        state.epoch += 1;
    }

    async fn go_to(self: &Arc<Self>, seconds: f64) {
        let seconds = seconds.clamp(0.0, self.length);
        let mut state = self.state.lock().await;
        if state.status == Status::Playing {
            // Pause, seek, and resume on the next frame.
            state.status = Status::Paused;
            state.started_at = None;
            state.baseline = seconds;
            state.start_from = Some(seconds);
            state.epoch += 1;
            let epoch = state.epoch;
            drop(state);
            let _ = self.events.send(EmoteEvent::Pause);
            let inner = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(FRAME_INTERVAL).await;
                inner.resume_if_current(epoch).await;
            });
        } else {
            state.baseline = seconds;
            state.start_from = Some(seconds);
            state.epoch += 1;
        }
    }

    /// Deferred re-play after a mid-playback seek. Skipped when another
    /// transition landed in between.
    async fn resume_if_current(self: &Arc<Self>, epoch: u64) {
        {
            let state = self.state.lock().await;
            if state.epoch != epoch {
                return;
            }
        }
        self.play().await;
    }

    fn arm(self: &Arc<Self>, epoch: u64, remaining: Duration) {
        // A zero-length clip has nothing to schedule.
        if self.length <= 0.0 {
            return;
        }
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            inner.on_clip_end(epoch).await;
        });
    }

    async fn on_clip_end(self: &Arc<Self>, epoch: u64) {
        let mut state = self.state.lock().await;
        if state.epoch != epoch || state.status != Status::Playing {
            return;
        }
        if self.looping {
            state.baseline = 0.0;
            state.started_at = Some(Instant::now());
            state.epoch += 1;
            let next = state.epoch;
            drop(state);
            let _ = self.events.send(EmoteEvent::Loop);
            self.arm(next, Duration::from_secs_f64(self.length));
        } else {
            state.status = Status::Stopped;
            state.baseline = 0.0;
            state.started_at = None;
            state.epoch += 1;
            drop(state);
            let _ = self.events.send(EmoteEvent::End);
        }
    }
}

/// In-process emote playback over a wall clock.
pub struct LocalEmoteController {
    inner: Arc<Inner>,
}

impl LocalEmoteController {
    /// `length` is the clip end time in seconds (0 for no clip).
    pub fn new(length: f64, looping: bool, events: EmoteEventSender) -> Self {
        Self {
            inner: Arc::new(Inner {
                length: length.max(0.0),
                looping,
                events,
                state: Mutex::new(Playback {
                    status: Status::Stopped,
                    baseline: 0.0,
                    started_at: None,
                    start_from: None,
                    epoch: 0,
                }),
            }),
        }
    }

    /// Current clip position in seconds.
    pub async fn position(&self) -> f64 {
        let state = self.inner.state.lock().await;
        state.position(self.inner.length, self.inner.looping)
    }
}

#[async_trait]
impl EmoteController for LocalEmoteController {
    async fn play(&self) -> Result<(), Error> {
        self.inner.play().await;
        Ok(())
    }

    async fn pause(&self) -> Result<(), Error> {
        self.inner.pause().await;
        Ok(())
    }

    async fn stop(&self) -> Result<(), Error> {
        self.inner.stop().await;
        Ok(())
    }

    async fn go_to(&self, seconds: f64) -> Result<(), Error> {
        self.inner.go_to(seconds).await;
        Ok(())
    }

    async fn length(&self) -> Result<f64, Error> {
        Ok(self.inner.length)
    }

    async fn is_playing(&self) -> Result<bool, Error> {
        let state = self.inner.state.lock().await;
        Ok(state.status == Status::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emote::{emote_event_channel, EmoteEventReceiver};

    fn drain(rx: &mut EmoteEventReceiver) -> Vec<EmoteEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn test_non_looping_clip_ends_once() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(0.2, false, tx);

        ctl.play().await.unwrap();
        assert!(ctl.is_playing().await.unwrap());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(drain(&mut rx), vec![EmoteEvent::Play, EmoteEvent::End]);
        assert!(!ctl.is_playing().await.unwrap());
        assert_eq!(ctl.position().await, 0.0);

        // No further events without another play().
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_looping_clip_loops() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(0.1, true, tx);

        ctl.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(380)).await;

        let events = drain(&mut rx);
        assert_eq!(events[0], EmoteEvent::Play);
        let loops = events.iter().filter(|e| **e == EmoteEvent::Loop).count();
        assert!(loops >= 2, "expected at least 2 loops, got {loops}");
        assert!(!events.contains(&EmoteEvent::End));
        assert!(ctl.is_playing().await.unwrap());

        ctl.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_goto_while_playing_pauses_then_resumes() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(5.0, false, tx);

        ctl.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(drain(&mut rx), vec![EmoteEvent::Play]);

        ctl.go_to(1.0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(drain(&mut rx), vec![EmoteEvent::Pause, EmoteEvent::Play]);
        assert!(ctl.is_playing().await.unwrap());
        let position = ctl.position().await;
        assert!((1.0..1.6).contains(&position), "position {position}");
    }

    #[tokio::test]
    async fn test_goto_while_stopped_records_start_point() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(5.0, false, tx);

        ctl.go_to(1.5).await.unwrap();
        assert!(!ctl.is_playing().await.unwrap());
        assert_eq!(ctl.position().await, 1.5);
        assert!(drain(&mut rx).is_empty());

        ctl.play().await.unwrap();
        assert!(ctl.position().await >= 1.5);
        assert_eq!(drain(&mut rx), vec![EmoteEvent::Play]);
    }

    #[tokio::test]
    async fn test_pause_holds_position() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(5.0, false, tx);

        ctl.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        ctl.pause().await.unwrap();

        let held = ctl.position().await;
        assert!(held > 0.0);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(ctl.position().await, held);

        ctl.play().await.unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![EmoteEvent::Play, EmoteEvent::Pause, EmoteEvent::Play]
        );
    }

    #[tokio::test]
    async fn test_stop_cancels_pending_end() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(0.15, false, tx);

        ctl.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctl.stop().await.unwrap();
        assert_eq!(ctl.position().await, 0.0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(drain(&mut rx), vec![EmoteEvent::Play]);
    }

    #[tokio::test]
    async fn test_pause_when_not_playing_is_noop() {
        let (tx, mut rx) = emote_event_channel();
        let ctl = LocalEmoteController::new(1.0, false, tx);

        ctl.pause().await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }
}
