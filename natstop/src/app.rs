//! App state and main loop: input handling, consuming poll samples, updating history, and drawing.

use std::{io, sync::Arc, time::Duration};

use crossterm::{
    cursor::{Hide, Show},
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{Stream, StreamExt};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::{
    sync::watch,
    task::{JoinError, JoinHandle},
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::config::{Config, ViewMode};
use crate::error::{MonitorError, Result};
use crate::fetch::Transport;
use crate::history::Histories;
use crate::poll::{PollLoop, Sample, SampleReceiver};
use crate::sort::{rank, SortKey};
use crate::types::ConnectionInfo;
use crate::ui::{compact::draw_compact, graphs::draw_graphs, header::draw_header};

/// How long a rejected sort key stays on the header line.
pub const NOTICE_TTL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Viewing,
    EnteringSortKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub until: Instant,
}

/// What the event loop must do after an event was applied to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Redraw,
    /// Layout changed: clear the surface before the next draw.
    Relayout,
    /// New sort key committed; forward it to the poller.
    SortChanged(SortKey),
    Quit,
}

pub struct App {
    target: String,
    view: ViewMode,
    sort: SortKey,
    mode: InputMode,
    pending_sort: String,
    notice: Option<Notice>,

    // Latest sample + histories
    latest: Option<Arc<Sample>>,
    ranked: Vec<ConnectionInfo>,
    hist: Histories,
}

impl App {
    pub fn new(cfg: &Config) -> Self {
        Self {
            target: cfg.target(),
            view: cfg.view,
            sort: cfg.sort,
            mode: InputMode::Viewing,
            pending_sort: String::new(),
            notice: None,
            latest: None,
            ranked: Vec::new(),
            hist: Histories::default(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn pending_sort(&self) -> &str {
        &self.pending_sort
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.latest.as_deref()
    }

    /// Connections of the latest sample in the current sort order.
    pub fn ranked(&self) -> &[ConnectionInfo] {
        &self.ranked
    }

    pub fn histories(&self) -> &Histories {
        &self.hist
    }

    pub fn on_sample(&mut self, sample: Arc<Sample>) {
        self.hist.push(&sample.snapshot, &sample.rates);
        self.ranked = rank(&sample.snapshot.connections.connections, self.sort);
        self.latest = Some(sample);
    }

    pub fn handle_event(&mut self, ev: Event, now: Instant) -> KeyAction {
        match ev {
            Event::Key(k) if k.kind != KeyEventKind::Release => self.handle_key(k, now),
            // widget sizes come from the frame area on every draw
            Event::Resize(_, _) => KeyAction::Redraw,
            _ => KeyAction::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyAction {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return KeyAction::Quit;
        }
        match self.mode {
            InputMode::Viewing => self.handle_viewing_key(key),
            InputMode::EnteringSortKey => self.handle_sort_entry_key(key, now),
        }
    }

    fn handle_viewing_key(&mut self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
            KeyCode::Char('o') => {
                self.mode = InputMode::EnteringSortKey;
                self.pending_sort.clear();
                self.notice = None;
                KeyAction::Redraw
            }
            KeyCode::Char('g') | KeyCode::Tab => {
                self.view = self.view.toggled();
                KeyAction::Relayout
            }
            _ => KeyAction::None,
        }
    }

    fn handle_sort_entry_key(&mut self, key: KeyEvent, now: Instant) -> KeyAction {
        match key.code {
            KeyCode::Esc => {
                self.pending_sort.clear();
                self.mode = InputMode::Viewing;
                KeyAction::Redraw
            }
            KeyCode::Enter => self.confirm_sort(now),
            KeyCode::Backspace => {
                self.pending_sort.pop();
                KeyAction::Redraw
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    || key.modifiers.contains(KeyModifiers::ALT)
                {
                    return KeyAction::None;
                }
                self.pending_sort.push(c);
                KeyAction::Redraw
            }
            _ => KeyAction::None,
        }
    }

    fn confirm_sort(&mut self, now: Instant) -> KeyAction {
        let input = std::mem::take(&mut self.pending_sort);
        self.mode = InputMode::Viewing;
        match input.trim().parse::<SortKey>() {
            Ok(key) => {
                self.sort = key;
                if let Some(s) = &self.latest {
                    self.ranked = rank(&s.snapshot.connections.connections, key);
                }
                KeyAction::SortChanged(key)
            }
            Err(e) => {
                debug!(error = %e, "rejected sort key");
                self.notice = Some(Notice {
                    text: format!("invalid order: {input}"),
                    until: now + NOTICE_TTL,
                });
                KeyAction::Redraw
            }
        }
    }

    /// Drops an expired notice. Returns true when something changed on screen.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.notice {
            Some(n) if now >= n.until => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }

    /// Takes over the terminal, runs the poller in the background and processes one
    /// event at a time until quit or a fatal poll error.
    pub async fn run<T: Transport + 'static>(
        &mut self,
        poller: PollLoop<T>,
        samples: SampleReceiver,
        sort_tx: watch::Sender<SortKey>,
    ) -> Result<()> {
        // Terminal setup; the guard restores it on every exit path
        enable_raw_mode()?;
        let guard = TerminalGuard;

        // release builds abort on panic, so the guard alone is not enough
        install_panic_hook(restore_terminal);

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let handle = poller.spawn();
        let res = self
            .event_loop(&mut terminal, EventStream::new(), samples, sort_tx, handle)
            .await;

        drop(terminal);
        drop(guard);
        res
    }

    /// Handles one event at a time until quit, a fatal poll error or a terminal
    /// failure. The poll task is aborted on every exit path.
    pub async fn event_loop<B, S>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: S,
        mut samples: SampleReceiver,
        sort_tx: watch::Sender<SortKey>,
        mut poller: JoinHandle<Result<()>>,
    ) -> Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>>,
    {
        let mut events = std::pin::pin!(events);
        let mut dirty = true;

        let res = loop {
            if dirty {
                if let Err(e) = terminal.draw(|f| self.draw(f)) {
                    break Err(MonitorError::Terminal(e));
                }
                dirty = false;
            }
            let notice_deadline = self.notice.as_ref().map(|n| n.until);

            tokio::select! {
                // samples first so a quit key never races a sample already waiting
                biased;

                changed = samples.changed() => {
                    if changed.is_err() {
                        // sender gone: the poller finished, report how
                        break poller_outcome((&mut poller).await);
                    }
                    // only the newest value is kept in the channel
                    let latest = samples.borrow_and_update().clone();
                    if let Some(sample) = latest {
                        self.on_sample(sample);
                        dirty = true;
                    }
                }
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(ev)) => match self.handle_event(ev, Instant::now()) {
                            KeyAction::Quit => break Ok(()),
                            KeyAction::SortChanged(key) => {
                                info!(sort = %key, "sort order changed");
                                let _ = sort_tx.send(key);
                                dirty = true;
                            }
                            KeyAction::Relayout => {
                                if let Err(e) = terminal.clear() {
                                    break Err(MonitorError::Terminal(e));
                                }
                                dirty = true;
                            }
                            KeyAction::Redraw => dirty = true,
                            KeyAction::None => {}
                        },
                        Some(Err(e)) => break Err(MonitorError::Terminal(e)),
                        None => break Ok(()),
                    }
                }
                res = &mut poller => {
                    break poller_outcome(res);
                }
                _ = sleep_until(notice_deadline.unwrap_or_else(Instant::now)), if notice_deadline.is_some() => {
                    dirty |= self.tick(Instant::now());
                }
            }
        };

        // in-flight fetches are dropped, not awaited
        poller.abort();
        res
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, body
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        draw_header(f, rows[0], self);
        match self.view {
            ViewMode::Compact => draw_compact(f, rows[1], self),
            ViewMode::Graphical => draw_graphs(f, rows[1], self),
        }
    }
}

fn poller_outcome(res: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match res {
        Ok(Ok(())) => Err(MonitorError::PollerStopped),
        Ok(Err(e)) => Err(e),
        Err(e) => {
            warn!(error = %e, "poll task ended abnormally");
            Err(MonitorError::PollerStopped)
        }
    }
}

/// Runs `restore` before the previously installed hook reports the panic.
fn install_panic_hook(restore: fn()) {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore();
        original_hook(panic_info);
    }));
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

// Restores cursor, screen and input mode when dropped
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::rates::RateSample;
    use crate::types::{ConnectionList, Snapshot};
    use futures::stream;
    use ratatui::backend::{TestBackend, WindowSize};
    use ratatui::buffer::Cell;
    use ratatui::layout::{Position, Size};
    use tokio::sync::oneshot;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str, now: Instant) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
    }

    fn sample(seq: u64, subs: &[(u64, u32)]) -> Arc<Sample> {
        let connections = subs
            .iter()
            .map(|&(id, n)| ConnectionInfo {
                id,
                subscription_count: n,
                ..Default::default()
            })
            .collect::<Vec<_>>();
        Arc::new(Sample {
            seq,
            snapshot: Snapshot {
                connections: ConnectionList {
                    num_connections: connections.len() as u32,
                    connections,
                },
                ..Default::default()
            },
            rates: RateSample::ZERO,
        })
    }

    #[test]
    fn starts_viewing_with_configured_sort_and_view() {
        let cfg = Config {
            sort: SortKey::Pending,
            view: ViewMode::Graphical,
            ..Default::default()
        };
        let app = App::new(&cfg);
        assert_eq!(app.mode(), InputMode::Viewing);
        assert_eq!(app.sort(), SortKey::Pending);
        assert_eq!(app.view(), ViewMode::Graphical);
        assert!(app.latest().is_none());
    }

    #[test]
    fn valid_sort_entry_commits_and_returns_to_viewing() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        assert_eq!(app.handle_key(key(KeyCode::Char('o')), now), KeyAction::Redraw);
        assert_eq!(app.mode(), InputMode::EnteringSortKey);
        type_str(&mut app, "subs", now);
        assert_eq!(app.pending_sort(), "subs");
        assert_eq!(
            app.handle_key(key(KeyCode::Enter), now),
            KeyAction::SortChanged(SortKey::Subs)
        );
        assert_eq!(app.sort(), SortKey::Subs);
        assert_eq!(app.mode(), InputMode::Viewing);
        assert_eq!(app.pending_sort(), "");
        assert!(app.notice().is_none());
    }

    #[test]
    fn invalid_sort_entry_is_rejected_with_transient_notice() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('o')), now);
        type_str(&mut app, "bogus", now);
        assert_eq!(app.handle_key(key(KeyCode::Enter), now), KeyAction::Redraw);
        assert_eq!(app.sort(), SortKey::Cid);
        assert_eq!(app.mode(), InputMode::Viewing);
        assert_eq!(app.pending_sort(), "");
        assert_eq!(app.notice().map(|n| n.text.as_str()), Some("invalid order: bogus"));

        assert!(!app.tick(now + Duration::from_millis(500)));
        assert!(app.notice().is_some());
        assert!(app.tick(now + NOTICE_TTL));
        assert!(app.notice().is_none());
        assert_eq!(app.sort(), SortKey::Cid);
    }

    #[test]
    fn backspace_and_escape_while_editing() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('o')), now);
        type_str(&mut app, "pendx", now);
        app.handle_key(key(KeyCode::Backspace), now);
        assert_eq!(app.pending_sort(), "pend");
        app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(app.mode(), InputMode::Viewing);
        assert_eq!(app.pending_sort(), "");
        assert_eq!(app.sort(), SortKey::Cid);
    }

    #[test]
    fn q_types_into_the_prompt_but_quits_while_viewing() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('o')), now);
        assert_eq!(app.handle_key(key(KeyCode::Char('q')), now), KeyAction::Redraw);
        assert_eq!(app.pending_sort(), "q");
        app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(app.handle_key(key(KeyCode::Char('q')), now), KeyAction::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_either_state() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        assert_eq!(app.handle_key(ctrl_c, now), KeyAction::Quit);
        app.handle_key(key(KeyCode::Char('o')), now);
        assert_eq!(app.handle_key(ctrl_c, now), KeyAction::Quit);
    }

    #[test]
    fn toggle_view_requests_relayout() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        assert_eq!(app.handle_key(key(KeyCode::Char('g')), now), KeyAction::Relayout);
        assert_eq!(app.view(), ViewMode::Graphical);
        assert_eq!(app.handle_key(key(KeyCode::Tab), now), KeyAction::Relayout);
        assert_eq!(app.view(), ViewMode::Compact);
    }

    #[test]
    fn resize_only_redraws() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('o')), now);
        type_str(&mut app, "su", now);
        assert_eq!(app.handle_event(Event::Resize(80, 24), now), KeyAction::Redraw);
        assert_eq!(app.mode(), InputMode::EnteringSortKey);
        assert_eq!(app.pending_sort(), "su");
    }

    #[test]
    fn samples_are_ranked_and_rerank_on_sort_change() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.on_sample(sample(1, &[(3, 1), (1, 5), (2, 9)]));
        let ids: Vec<u64> = app.ranked().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        app.handle_key(key(KeyCode::Char('o')), now);
        type_str(&mut app, "subs", now);
        app.handle_key(key(KeyCode::Enter), now);
        let ids: Vec<u64> = app.ranked().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn samples_keep_flowing_while_editing() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('o')), now);
        app.on_sample(sample(1, &[(1, 0)]));
        app.on_sample(sample(2, &[(1, 0), (2, 0)]));
        assert_eq!(app.mode(), InputMode::EnteringSortKey);
        assert_eq!(app.latest().map(|s| s.seq), Some(2));
        assert_eq!(app.ranked().len(), 2);
    }

    #[test]
    fn history_stays_bounded() {
        let mut app = App::new(&Config::default());
        for seq in 0..500 {
            app.on_sample(sample(seq, &[]));
        }
        assert_eq!(app.histories().len(), app.histories().capacity());
    }

    fn test_terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(100, 30)).unwrap()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // Poll task that only ends when aborted; `dropped` resolves once it is gone.
    fn idle_poller() -> (JoinHandle<Result<()>>, oneshot::Receiver<()>) {
        let (alive, dropped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _alive = alive;
            std::future::pending::<()>().await;
            Ok(())
        });
        (handle, dropped)
    }

    fn quit_key() -> impl Stream<Item = io::Result<Event>> {
        stream::iter(vec![Ok(Event::Key(key(KeyCode::Char('q'))))])
    }

    #[tokio::test]
    async fn waiting_samples_collapse_into_the_newest() {
        let mut app = App::new(&Config::default());
        let mut terminal = test_terminal();
        let (tx, rx) = watch::channel(None);
        tx.send_replace(Some(sample(1, &[(1, 0)])));
        tx.send_replace(Some(sample(2, &[(1, 0), (2, 0)])));
        let (sort_tx, _sort_rx) = watch::channel(SortKey::Cid);
        let (poller, dropped) = idle_poller();

        let res = app
            .event_loop(&mut terminal, quit_key(), rx, sort_tx, poller)
            .await;

        assert!(res.is_ok());
        assert_eq!(app.latest().map(|s| s.seq), Some(2));
        assert_eq!(app.histories().len(), 1);
        assert_eq!(app.ranked().len(), 2);
        let text = screen(&terminal);
        assert!(text.contains("Connections: 2"), "{text}");
        assert!(dropped.await.is_err(), "poll task should be aborted on quit");
    }

    #[tokio::test]
    async fn quit_with_no_data_aborts_the_poller() {
        let mut app = App::new(&Config::default());
        let mut terminal = test_terminal();
        let (_tx, rx) = watch::channel(None);
        let (sort_tx, _sort_rx) = watch::channel(SortKey::Cid);
        let (poller, dropped) = idle_poller();

        let res = app
            .event_loop(&mut terminal, quit_key(), rx, sort_tx, poller)
            .await;

        assert!(res.is_ok());
        assert!(app.latest().is_none());
        assert!(screen(&terminal).contains("waiting for data..."));
        assert!(dropped.await.is_err());
    }

    #[tokio::test]
    async fn fatal_poller_error_ends_the_loop() {
        let mut app = App::new(&Config::default());
        let mut terminal = test_terminal();
        let (_tx, rx) = watch::channel(None);
        let (sort_tx, _sort_rx) = watch::channel(SortKey::Cid);
        let poller = tokio::spawn(async {
            Err::<(), _>(MonitorError::UnreachableServer {
                endpoint: "/varz".into(),
                attempts: 5,
                source: FetchError::Status(503),
            })
        });

        let res = app
            .event_loop(&mut terminal, stream::pending(), rx, sort_tx, poller)
            .await;

        match res {
            Err(MonitorError::UnreachableServer {
                endpoint, attempts, ..
            }) => {
                assert_eq!(endpoint, "/varz");
                assert_eq!(attempts, 5);
            }
            other => panic!("expected unreachable server, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn committed_sort_key_reaches_the_poller() {
        let mut app = App::new(&Config::default());
        let mut terminal = test_terminal();
        let (_tx, rx) = watch::channel(None);
        let (sort_tx, sort_rx) = watch::channel(SortKey::Cid);
        let (poller, _dropped) = idle_poller();
        let keys = "opending"
            .chars()
            .map(KeyCode::Char)
            .chain([KeyCode::Enter, KeyCode::Char('q')])
            .map(|code| Ok(Event::Key(key(code))))
            .collect::<Vec<_>>();

        app.event_loop(&mut terminal, stream::iter(keys), rx, sort_tx, poller)
            .await
            .unwrap();

        assert_eq!(*sort_rx.borrow(), SortKey::Pending);
    }

    static RESTORED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

    fn mark_restored() {
        RESTORED.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    #[test]
    fn panic_hook_restores_before_reporting() {
        install_panic_hook(mark_restored);
        let res = std::panic::catch_unwind(|| panic!("boom"));
        // back to the default hook for the rest of the test binary
        let _ = std::panic::take_hook();
        assert!(res.is_err());
        assert!(RESTORED.load(std::sync::atomic::Ordering::SeqCst));
    }

    // Every draw fails, as when the terminal goes away mid-session
    struct BrokenBackend(TestBackend);

    impl Backend for BrokenBackend {
        fn draw<'a, I>(&mut self, _content: I) -> io::Result<()>
        where
            I: Iterator<Item = (u16, u16, &'a Cell)>,
        {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }

        fn hide_cursor(&mut self) -> io::Result<()> {
            self.0.hide_cursor()
        }

        fn show_cursor(&mut self) -> io::Result<()> {
            self.0.show_cursor()
        }

        fn get_cursor_position(&mut self) -> io::Result<Position> {
            self.0.get_cursor_position()
        }

        fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
            self.0.set_cursor_position(position)
        }

        fn clear(&mut self) -> io::Result<()> {
            self.0.clear()
        }

        fn size(&self) -> io::Result<Size> {
            self.0.size()
        }

        fn window_size(&mut self) -> io::Result<WindowSize> {
            self.0.window_size()
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.flush()
        }
    }

    #[tokio::test]
    async fn draw_failure_still_aborts_the_poller() {
        let mut app = App::new(&Config::default());
        let mut terminal = Terminal::new(BrokenBackend(TestBackend::new(80, 24))).unwrap();
        let (_tx, rx) = watch::channel(None);
        let (sort_tx, _sort_rx) = watch::channel(SortKey::Cid);
        let (poller, dropped) = idle_poller();

        let res = app
            .event_loop(&mut terminal, stream::pending(), rx, sort_tx, poller)
            .await;

        assert!(matches!(res, Err(MonitorError::Terminal(_))));
        assert!(dropped.await.is_err(), "poll task should be aborted on terminal errors");
    }
}
