//! Background one-second driver for a running session
//!
//! The controller itself never sleeps; this thread owns the wall clock and
//! calls [`SessionController::tick`] once per second under the shared lock,
//! forwarding the session-level stage events to a subscriber channel.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;

use ca_stage::StageEvent;

use crate::session::{SessionController, SessionStatus};

/// Drives a shared [`SessionController`] at one tick per second
pub struct SessionTimer {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    /// Spawn the tick thread.
    ///
    /// Stage events from each tick are forwarded to the returned receiver;
    /// the thread exits on its own once the session finishes.
    pub fn spawn(session: Arc<Mutex<SessionController>>) -> (Self, Receiver<StageEvent>) {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        // Unbounded send would let a stalled subscriber pile up events;
        // a generous bound keeps the tick thread from ever blocking long.
        let (event_tx, event_rx) = bounded::<StageEvent>(1024);

        let handle = std::thread::spawn(move || {
            let ticker = tick(Duration::from_secs(1));
            loop {
                select! {
                    recv(ticker) -> _ => {
                        let events = {
                            let mut session = session.lock();
                            let events = session.tick();
                            if session.status() == SessionStatus::Finished {
                                for event in events {
                                    let _ = event_tx.try_send(event);
                                }
                                log::debug!("session finished, timer thread exiting");
                                return;
                            }
                            events
                        };
                        for event in events {
                            // A full or disconnected subscriber never stalls
                            // the clock
                            let _ = event_tx.try_send(event);
                        }
                    }
                    recv(shutdown_rx) -> _ => {
                        log::debug!("timer thread shut down");
                        return;
                    }
                }
            }
        });

        (
            Self {
                shutdown: shutdown_tx,
                handle: Some(handle),
            },
            event_rx,
        )
    }

    /// Stop the tick thread and wait for it to exit
    pub fn stop(mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::Participant;

    fn session(duration_secs: u32) -> Arc<Mutex<SessionController>> {
        let participants = vec![
            Participant {
                id: "p0".into(),
                name: "Zero".into(),
            },
            Participant {
                id: "p1".into(),
                name: "One".into(),
            },
        ];
        let config = SessionConfig {
            duration_secs,
            ..SessionConfig::default()
        };
        let mut controller = SessionController::seeded(&participants, config, 17).unwrap();
        controller.start();
        Arc::new(Mutex::new(controller))
    }

    #[test]
    fn test_timer_ticks_session_to_completion() {
        let shared = session(2);
        let (timer, events) = SessionTimer::spawn(shared.clone());

        // Two 1s ticks plus margin
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while std::time::Instant::now() < deadline {
            if shared.lock().status() == SessionStatus::Finished {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        assert_eq!(shared.lock().status(), SessionStatus::Finished);
        timer.stop();

        let collected: Vec<StageEvent> = events.try_iter().collect();
        assert!(collected
            .iter()
            .any(|e| e.type_name() == "SESSION_FINISHED"));
        assert!(collected.iter().any(|e| e.type_name() == "COUNTDOWN_TICK"));
    }

    #[test]
    fn test_stop_interrupts_a_long_session() {
        let shared = session(3600);
        let (timer, _events) = SessionTimer::spawn(shared.clone());
        std::thread::sleep(Duration::from_millis(100));
        timer.stop();
        // Timer gone, session merely paused
        assert_eq!(shared.lock().status(), SessionStatus::Playing);
    }
}
