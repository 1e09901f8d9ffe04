use std::io;
use std::sync::Arc;
use std::time::Duration;
use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use calstrip::{
    app::{AppState, Effect},
    calendar::AccountId,
    input,
    storage::config::Config,
    sync::{GoogleAuthenticator, GoogleCalendarClient, RequestTicket, SessionTokens, SyncEngine, SyncError, SyncOutcome},
};
use crate::tui::{
    presentation::ui,
    sample_events::add_sample_events,
};

const WHEEL_NOTCH: f64 = 100.0;

type SyncResult = (RequestTicket, SyncOutcome, SessionTokens);

struct Session {
    app: AppState,
    tokens: SessionTokens,
    engine: Arc<SyncEngine<GoogleCalendarClient>>,
    authenticator: Arc<GoogleAuthenticator>,
    results_tx: UnboundedSender<SyncResult>,
    results_rx: UnboundedReceiver<SyncResult>,
}

impl Session {
    fn start_sync(&mut self) {
        let Some(window) = self.app.fetch_window() else {
            self.app.status_message = Some("Timeline has no days to fetch".to_string());
            return;
        };

        let ticket = self.app.begin_sync();
        let engine = Arc::clone(&self.engine);
        let authenticator = Arc::clone(&self.authenticator);
        let mut tokens = self.tokens.clone();
        let tx = self.results_tx.clone();

        tokio::spawn(async move {
            let failed = authenticator.refresh_expiring(&mut tokens).await;
            let mut outcome = engine.fetch_all(&tokens, &window, &Local).await;
            for account in failed {
                if !outcome.needs_reconnect().contains(&account) {
                    outcome.errors.push(SyncError::ReconnectNeeded(account));
                }
            }
            let _ = tx.send((ticket, outcome, tokens));
        });
    }

    fn drain_results(&mut self) {
        while let Ok((ticket, outcome, tokens)) = self.results_rx.try_recv() {
            if self.app.apply_sync(ticket, outcome) {
                self.tokens = tokens;
            }
        }
    }

    fn disconnect(&mut self, account: AccountId) {
        self.authenticator.disconnect(&mut self.tokens, account);
        let interrupted = self.app.disconnect(account);
        self.app.status_message = Some(format!("Disconnected {} calendar", account));
        if interrupted {
            self.start_sync();
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let horizontal = mouse.modifiers.contains(KeyModifiers::SHIFT);
        let (dx, dy) = match mouse.kind {
            MouseEventKind::ScrollUp if horizontal => (-WHEEL_NOTCH, 0.0),
            MouseEventKind::ScrollDown if horizontal => (WHEEL_NOTCH, 0.0),
            MouseEventKind::ScrollUp => (0.0, -WHEEL_NOTCH),
            MouseEventKind::ScrollDown => (0.0, WHEEL_NOTCH),
            MouseEventKind::ScrollLeft => (-WHEEL_NOTCH, 0.0),
            MouseEventKind::ScrollRight => (WHEEL_NOTCH, 0.0),
            _ => return,
        };
        self.app.viewport.handle_wheel(dx, dy);
    }
}

pub async fn run_tui(config: Config, tokens: SessionTokens, sample: bool) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(&config);
    if sample {
        add_sample_events(&mut app);
    }
    for account in config.accounts.enabled() {
        if !sample && !tokens.is_connected(account) {
            app.mark_reconnect_needed(account);
        }
    }

    let client = GoogleCalendarClient::from_accounts(&config.accounts, config.sync.page_size);
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let mut session = Session {
        app,
        tokens,
        engine: Arc::new(SyncEngine::new(client, config.accounts.enabled())),
        authenticator: Arc::new(GoogleAuthenticator::new(&config.google)),
        results_tx,
        results_rx,
    };

    if !sample {
        session.start_sync();
    }

    let res = run_app(&mut terminal, &mut session).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Session ended with error: {:?}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
) -> io::Result<()> {
    loop {
        session.drain_results();
        terminal.draw(|f| ui(f, &mut session.app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                match input::handle_key(key.code, &mut session.app) {
                    Effect::None => {}
                    Effect::Sync => session.start_sync(),
                    Effect::Disconnect(account) => session.disconnect(account),
                    Effect::Quit => return Ok(()),
                }
            }
            TermEvent::Mouse(mouse) => session.handle_mouse(mouse),
            _ => {}
        }
    }
}
