//! Background threads feeding the UI: the fetch worker, which owns the data
//! source and performs the blocking network calls, and the refresh timer.
//! Both report through one event channel and wake the UI afterwards.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, info};
#[cfg(not(target_os = "linux"))]
use tray_icon::{TrayIconEvent, menu::MenuEvent};

use crate::reading::Reading;
use crate::source::{DataSource, FETCH_COUNT, FetchError};

/// Asks the UI thread to run an update.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// A finished fetch.
#[derive(Debug)]
pub struct FetchReport {
    pub result: Result<Vec<Reading>, FetchError>,
    pub source: &'static str,
    pub connected: bool,
    /// Why the last connection attempt failed, if it did.
    pub connection_error: Option<FetchError>,
}

/// Everything the UI loop reacts to besides its own input.
pub enum AppEvent {
    Tick,
    Fetched(FetchReport),
    #[cfg(not(target_os = "linux"))]
    Menu(MenuEvent),
    #[cfg(not(target_os = "linux"))]
    Tray(TrayIconEvent),
}

enum Command<S> {
    Fetch,
    Replace(S),
}

/// Handle to the fetch thread. Requests run one after another; the caller
/// makes sure only one is outstanding.
pub struct FetchWorker<S> {
    commands: Sender<Command<S>>,
}

impl<S: DataSource + 'static> FetchWorker<S> {
    pub fn spawn(source: S, events: Sender<AppEvent>, waker: Waker) -> Self {
        let (commands, rx) = mpsc::channel::<Command<S>>();
        thread::spawn(move || {
            let mut source = source;
            while let Ok(command) = rx.recv() {
                match command {
                    Command::Fetch => {
                        debug!("fetch: {}", source.label());
                        let result = source.fetch_latest(FETCH_COUNT);
                        let report = FetchReport {
                            result,
                            source: source.label(),
                            connected: source.is_connected(),
                            connection_error: source.last_error().cloned(),
                        };
                        if events.send(AppEvent::Fetched(report)).is_err() {
                            break;
                        }
                        waker();
                    }
                    Command::Replace(next) => {
                        info!("data source replaced: {}", next.label());
                        source = next;
                    }
                }
            }
            debug!("fetch worker stopped");
        });
        Self { commands }
    }

    pub fn fetch(&self) {
        let _ = self.commands.send(Command::Fetch);
    }

    /// Swaps the data source. A fetch already running finishes on the old one.
    pub fn replace(&self, source: S) {
        let _ = self.commands.send(Command::Replace(source));
    }
}

/// Repeating timer. Changing the interval restarts the period.
pub struct Scheduler {
    control: Sender<Duration>,
}

impl Scheduler {
    pub fn spawn(interval: Duration, events: Sender<AppEvent>, waker: Waker) -> Self {
        let (control, rx) = mpsc::channel::<Duration>();
        thread::spawn(move || {
            let mut interval = interval;
            loop {
                match rx.recv_timeout(interval) {
                    Ok(next) => {
                        debug!("refresh interval set to {}s", next.as_secs());
                        interval = next;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if events.send(AppEvent::Tick).is_err() {
                            break;
                        }
                        waker();
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self { control }
    }

    pub fn set_interval(&self, interval: Duration) {
        let _ = self.control.send(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::Receiver;

    const WAIT: Duration = Duration::from_secs(2);

    struct FakeSource {
        label: &'static str,
        calls: Arc<AtomicUsize>,
        value: i32,
        error: Option<FetchError>,
    }

    impl DataSource for FakeSource {
        fn fetch_latest(&mut self, count: usize) -> Result<Vec<Reading>, FetchError> {
            assert_eq!(count, FETCH_COUNT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.value < 0 {
                self.error = Some(FetchError::Auth("rifiutato".into()));
                return Err(FetchError::Empty);
            }
            Ok(vec![Reading::new(self.value, None, "2025-03-01T10:15:00Z", 0.0)])
        }

        fn is_connected(&self) -> bool {
            self.value >= 0
        }

        fn last_error(&self) -> Option<&FetchError> {
            self.error.as_ref()
        }

        fn label(&self) -> &'static str {
            self.label
        }
    }

    fn fake(label: &'static str, value: i32) -> (FakeSource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            FakeSource {
                label,
                calls: calls.clone(),
                value,
                error: None,
            },
            calls,
        )
    }

    fn counting_waker() -> (Waker, Arc<AtomicUsize>) {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        (
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            wakes,
        )
    }

    /// The wake follows the send, so a received event may not have woken yet.
    fn wait_for_wakes(wakes: &AtomicUsize, at_least: usize) -> usize {
        let deadline = std::time::Instant::now() + WAIT;
        loop {
            let seen = wakes.load(Ordering::SeqCst);
            if seen >= at_least || std::time::Instant::now() >= deadline {
                return seen;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn next_report(rx: &Receiver<AppEvent>) -> FetchReport {
        match rx.recv_timeout(WAIT) {
            Ok(AppEvent::Fetched(report)) => report,
            Ok(_) => panic!("unexpected event"),
            Err(err) => panic!("no report: {err}"),
        }
    }

    #[test]
    fn worker_reports_each_fetch() {
        let (tx, rx) = mpsc::channel();
        let (waker, wakes) = counting_waker();
        let (source, calls) = fake("first", 110);
        let worker = FetchWorker::spawn(source, tx, waker);

        worker.fetch();
        let report = next_report(&rx);
        assert_eq!(report.source, "first");
        assert!(report.connected);
        assert_eq!(report.connection_error, None);
        assert_eq!(report.result.unwrap()[0].value, 110);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(wait_for_wakes(&wakes, 1), 1);
    }

    #[test]
    fn worker_uses_replaced_source() {
        let (tx, rx) = mpsc::channel();
        let (waker, _) = counting_waker();
        let (first, first_calls) = fake("first", 110);
        let (second, second_calls) = fake("second", -1);
        let worker = FetchWorker::spawn(first, tx, waker);

        worker.replace(second);
        worker.fetch();
        let report = next_report(&rx);
        assert_eq!(report.source, "second");
        assert!(!report.connected);
        assert_eq!(report.result, Err(FetchError::Empty));
        assert_eq!(report.connection_error, Some(FetchError::Auth("rifiutato".into())));
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scheduler_ticks_until_interval_changes() {
        let (tx, rx) = mpsc::channel();
        let (waker, wakes) = counting_waker();
        let scheduler = Scheduler::spawn(Duration::from_millis(20), tx, waker);

        assert!(matches!(rx.recv_timeout(WAIT), Ok(AppEvent::Tick)));
        assert!(wait_for_wakes(&wakes, 1) >= 1);

        scheduler.set_interval(Duration::from_secs(3600));
        thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(150)),
            Err(mpsc::RecvTimeoutError::Timeout)
        ));
    }
}
