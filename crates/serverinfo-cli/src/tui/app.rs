//! Dashboard state and polling loop.
//!
//! Each cycle: poll every target (join barrier), draw, sleep. Quit requests
//! (`q`, `Esc`, Ctrl-C as a key, or SIGINT) are watched at both await points;
//! when one arrives the loop returns straight away, without drawing a
//! half-finished cycle.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::poller::{Poller, Snapshot};

/// How often the key reader checks for input and for shutdown.
const KEY_POLL: Duration = Duration::from_millis(50);

pub struct MonitorApp {
    targets: Vec<String>,
    interval: Duration,
    poller: Poller,
    snapshot: Option<Snapshot>,
    cycle_count: u64,
    last_cycle: Duration,
}

/// Keys that end the dashboard.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Reads terminal events on a plain thread and reports the first quit key.
///
/// Raw mode turns Ctrl-C into a key event, so this is where it shows up.
fn spawn_key_reader(stop: Arc<AtomicBool>) -> (thread::JoinHandle<()>, mpsc::UnboundedReceiver<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(KEY_POLL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => {
                        let _ = tx.send(());
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("terminal input failed: {e}");
                        return;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    log::warn!("terminal input failed: {e}");
                    return;
                }
            }
        }
    });
    (handle, rx)
}

impl MonitorApp {
    pub fn new(targets: Vec<String>, interval: Duration, poller: Poller) -> Self {
        Self {
            targets,
            interval,
            poller,
            snapshot: None,
            cycle_count: 0,
            last_cycle: Duration::ZERO,
        }
    }

    pub async fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
            original_hook(info);
        }));

        let stop = Arc::new(AtomicBool::new(false));
        let (reader, mut quit) = spawn_key_reader(Arc::clone(&stop));

        let result = self.run_loop(&mut terminal, &mut quit).await;

        stop.store(true, Ordering::Relaxed);
        let _ = reader.join();

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

        result
    }

    async fn run_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        quit: &mut mpsc::UnboundedReceiver<()>,
    ) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let started = Instant::now();
            let snapshot = tokio::select! {
                snapshot = self.poller.poll_cycle(&self.targets) => snapshot,
                _ = &mut ctrl_c => return Ok(()),
                Some(()) = quit.recv() => return Ok(()),
            };
            self.record(snapshot, started.elapsed());

            terminal.draw(|f| super::ui::draw(f, self))?;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut ctrl_c => return Ok(()),
                Some(()) = quit.recv() => return Ok(()),
            }
        }
    }

    pub(crate) fn record(&mut self, snapshot: Snapshot, took: Duration) {
        self.snapshot = Some(snapshot);
        self.cycle_count += 1;
        self.last_cycle = took;
    }

    // --- Accessors for the renderer ---

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn last_cycle_ms(&self) -> u128 {
        self.last_cycle.as_millis()
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval.as_secs_f64()
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }
}
