//! Detects when a desktop share picker goes away.
//!
//! The picker takes focus from its parent window while open and gives it back
//! when closed. If focus is never lost within a short grace period, the picker
//! closed immediately (or never showed) and the share counts as finished.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, OnceLock,
};
use std::time::Duration;

use tauri::{Runtime, Window, WindowEvent};

use crate::models::ShareOutcome;
use crate::pending::Completion;
use crate::Error;

const BLUR_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    AwaitingBlur,
    AwaitingRefocus,
    Dismissed,
}

/// Focus transitions for one open picker. Each method returns true when the
/// picker should be considered dismissed by that event.
#[derive(Debug)]
struct Tracker {
    phase: Phase,
    /// Bumped on every arm so a stale grace timer cannot touch a newer picker.
    generation: u64,
}

impl Tracker {
    fn new() -> Self {
        Self {
            phase: Phase::AwaitingBlur,
            generation: 0,
        }
    }

    fn rearm(&mut self) -> u64 {
        self.phase = Phase::AwaitingBlur;
        self.generation += 1;
        self.generation
    }

    fn focus_changed(&mut self, focused: bool) -> bool {
        match (self.phase, focused) {
            (Phase::AwaitingBlur, false) => {
                self.phase = Phase::AwaitingRefocus;
                false
            }
            (Phase::AwaitingRefocus, true) => {
                self.phase = Phase::Dismissed;
                true
            }
            _ => false,
        }
    }

    fn grace_elapsed(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.phase == Phase::AwaitingBlur {
            self.phase = Phase::Dismissed;
            return true;
        }
        false
    }

    fn window_destroyed(&mut self) -> bool {
        let was_open = self.phase != Phase::Dismissed;
        self.phase = Phase::Dismissed;
        was_open
    }
}

struct Watch {
    label: String,
    completion: Mutex<Option<Completion>>,
    tracker: Mutex<Tracker>,
    listening: AtomicBool,
}

impl Watch {
    fn completion(&self) -> MutexGuard<'_, Option<Completion>> {
        self.completion.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn resolve(&self, outcome: ShareOutcome) {
        let completion = self.completion().take();
        if let Some(completion) = completion {
            completion.finish(outcome);
        }
    }
}

/// A completion parked on a window until its picker is dismissed.
pub struct ArmedWatch {
    watch: Arc<Watch>,
    generation: u64,
}

impl ArmedWatch {
    /// Call once the picker is on screen.
    pub fn start(self) {
        let Self { watch, generation } = self;
        std::thread::spawn(move || {
            std::thread::sleep(BLUR_GRACE);
            let dismissed = watch.tracker().grace_elapsed(generation);
            if dismissed {
                watch.resolve(ShareOutcome::success("system"));
            }
        });
    }

    /// The picker never showed. Drops the completion without an outcome.
    pub fn abort(self) {
        self.watch.completion().take();
        self.watch.tracker().phase = Phase::Dismissed;
    }
}

/// Parks `completion` on `window`. Only one picker per window may be open.
pub fn arm<R: Runtime>(window: &Window<R>, completion: Completion) -> Result<ArmedWatch, Error> {
    let watch = watch_for(window);
    listen(window, Arc::clone(&watch));
    {
        let mut slot = watch.completion();
        if slot.is_some() {
            return Err(Error::NativeApi(
                "A share sheet is already open for this window".to_string(),
            ));
        }
        *slot = Some(completion);
    }
    let generation = watch.tracker().rearm();
    Ok(ArmedWatch { watch, generation })
}

fn listen<R: Runtime>(window: &Window<R>, watch: Arc<Watch>) {
    if watch.listening.swap(true, Ordering::SeqCst) {
        return;
    }
    window.on_window_event(move |event| match event {
        WindowEvent::Focused(focused) => {
            let dismissed = watch.tracker().focus_changed(*focused);
            if dismissed {
                watch.resolve(ShareOutcome::success("system"));
            }
        }
        WindowEvent::Destroyed => {
            let was_open = watch.tracker().window_destroyed();
            if was_open {
                watch.resolve(ShareOutcome::failure(
                    "system",
                    "The window closed while sharing",
                ));
            }
            watches()
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .remove(&watch.label);
        }
        _ => {}
    });
}

fn watch_for<R: Runtime>(window: &Window<R>) -> Arc<Watch> {
    let mut map = watches().lock().unwrap_or_else(|p| p.into_inner());
    map.entry(window.label().to_string())
        .or_insert_with(|| {
            Arc::new(Watch {
                label: window.label().to_string(),
                completion: Mutex::new(None),
                tracker: Mutex::new(Tracker::new()),
                listening: AtomicBool::new(false),
            })
        })
        .clone()
}

fn watches() -> &'static Mutex<HashMap<String, Arc<Watch>>> {
    static WATCHES: OnceLock<Mutex<HashMap<String, Arc<Watch>>>> = OnceLock::new();
    WATCHES.get_or_init(|| Mutex::new(HashMap::new()))
}
