use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::event::Event;
use crate::launcher::Launcher;
use crate::pagination::{Effect, FetchPlan, Pager, PagerEvent};
use crate::source::{fetch_with_retry, ForkSource, RetryPolicy};
use crate::types::{Fork, ForkQuery, RepoId, SortMode};

/// Repository context fixed for the whole browsing session.
#[derive(Debug, Clone)]
pub struct Session {
    pub repo: RepoId,
    /// Upstream ref forks are compared against, `owner:branch`.
    pub head_ref: String,
    pub fork_count: u64,
}

/// One-line feedback shown in the status bar until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

pub struct App {
    pub pager: Pager,
    /// Highlighted row on the current page.
    pub selected: usize,
    pub spinner_frame: usize,
    pub status: Option<Status>,
    pub should_quit: bool,
    /// Set when a fetch failed for good; the session ends with this message.
    pub fatal: Option<String>,
    pub session: Session,
    initial: Vec<Effect>,
    source: Arc<dyn ForkSource>,
    launcher: Arc<dyn Launcher>,
    retry: RetryPolicy,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        source: Arc<dyn ForkSource>,
        launcher: Arc<dyn Launcher>,
        session: Session,
        sort: SortMode,
        retry: RetryPolicy,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let (pager, initial) = Pager::new(sort);
        Self {
            pager,
            selected: 0,
            spinner_frame: 0,
            status: None,
            should_quit: false,
            fatal: None,
            session,
            initial,
            source,
            launcher,
            retry,
            action_tx,
        }
    }

    /// Kick off the first page load.
    pub fn start(&mut self) {
        let effects = std::mem::take(&mut self.initial);
        self.dispatch(effects);
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            Event::Resize => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('h') | KeyCode::Left => Action::PrevPage,
            KeyCode::Char('l') | KeyCode::Right => Action::NextPage,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Char('s') => Action::Sort(SortMode::Stargazers),
            KeyCode::Char('u') => Action::Sort(SortMode::UpdatedAt),
            KeyCode::Enter => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::Tick | Action::ForksLoaded { .. } | Action::None
        ) {
            self.status = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                if self.pager.is_loading() {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
            }
            Action::ScrollDown => {
                if self.pager.is_loading() {
                    return;
                }
                if self.selected + 1 < self.row_count() {
                    self.selected += 1;
                } else {
                    self.page_forward();
                }
            }
            Action::ScrollUp => {
                if self.pager.is_loading() {
                    return;
                }
                if self.selected > 0 {
                    self.selected -= 1;
                } else if self.page_back() {
                    self.selected = self.row_count().saturating_sub(1);
                }
            }
            Action::GoToTop => {
                self.selected = 0;
            }
            Action::GoToBottom => {
                self.selected = self.row_count().saturating_sub(1);
            }
            Action::NextPage => self.page_forward(),
            Action::PrevPage => {
                if self.page_back() {
                    self.selected = 0;
                }
            }
            Action::Sort(mode) => {
                let effects = self.pager.handle(PagerEvent::Sort(mode));
                if !effects.is_empty() {
                    tracing::info!(sort = %mode, "re-sorting forks");
                    self.selected = 0;
                }
                self.dispatch(effects);
            }
            Action::ForksLoaded {
                request,
                page,
                result,
            } => {
                let was_loading = self.pager.is_loading();
                let effects = self.pager.handle(PagerEvent::Loaded {
                    request,
                    page,
                    result,
                });
                if was_loading && !self.pager.is_loading() {
                    self.selected = 0;
                }
                self.dispatch(effects);
            }
            Action::OpenInBrowser => {
                if let Some(url) = self.selected_url() {
                    self.status = Some(match self.launcher.open_url(&url) {
                        Ok(()) => Status::Info(format!("Opened {}", url)),
                        Err(err) => {
                            tracing::warn!(error = %err, "browser launch failed");
                            Status::Error(err.to_string())
                        }
                    });
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_url() {
                    self.status = Some(match self.launcher.copy_to_clipboard(&url) {
                        Ok(()) => Status::Info(format!("Copied {}", url)),
                        Err(err) => Status::Error(err.to_string()),
                    });
                }
            }
            Action::Fatal(msg) => {
                self.fatal = Some(msg);
                self.should_quit = true;
            }
            Action::None => {}
        }
    }

    pub fn selected_fork(&self) -> Option<&Fork> {
        if self.pager.is_loading() {
            return None;
        }
        self.pager.current_forks().get(self.selected)
    }

    /// Total shown in the header: the latest fetched count, or the startup count before that.
    pub fn total_forks(&self) -> u64 {
        self.pager.total_count().unwrap_or(self.session.fork_count)
    }

    fn selected_url(&self) -> Option<String> {
        self.selected_fork().map(|f| f.url.clone())
    }

    fn row_count(&self) -> usize {
        self.pager.current_forks().len()
    }

    fn page_forward(&mut self) {
        let before = self.pager.current_page();
        let effects = self.pager.handle(PagerEvent::NextPage);
        if self.pager.current_page() != before {
            self.selected = 0;
        }
        self.dispatch(effects);
    }

    /// Step back one page; returns whether the page changed.
    fn page_back(&mut self) -> bool {
        let before = self.pager.current_page();
        let effects = self.pager.handle(PagerEvent::PrevPage);
        self.dispatch(effects);
        self.pager.current_page() != before
    }

    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch(plan) => self.spawn_fetch(plan),
            }
        }
    }

    fn spawn_fetch(&self, plan: FetchPlan) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        let retry = self.retry;
        let query = ForkQuery {
            owner: self.session.repo.owner.clone(),
            name: self.session.repo.name.clone(),
            head_ref: self.session.head_ref.clone(),
            sort: plan.sort,
            after: plan.after,
        };
        tokio::spawn(async move {
            let action = match fetch_with_retry(source.as_ref(), &query, retry).await {
                Ok(result) => Action::ForksLoaded {
                    request: plan.request,
                    page: plan.page,
                    result,
                },
                Err(err) => {
                    tracing::error!(page = plan.page, error = %err, "fork page fetch failed");
                    Action::from(err)
                }
            };
            tx.send(action).ok();
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::error::ForkviewError;
    use crate::pagination::Phase;
    use crate::test_utils::{page_of, repo, MockLauncher, MockSource};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn new_app(source: &Arc<MockSource>) -> (App, mpsc::UnboundedReceiver<Action>) {
        new_app_with(source, Arc::new(MockLauncher::default()))
    }

    fn new_app_with(
        source: &Arc<MockSource>,
        launcher: Arc<MockLauncher>,
    ) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            repo: repo(),
            head_ref: "octo:main".to_string(),
            fork_count: 20,
        };
        let retry = RetryPolicy {
            retries: 0,
            backoff: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        };
        let source: Arc<dyn ForkSource> = source.clone();
        (
            App::new(source, launcher, session, SortMode::UpdatedAt, retry, tx),
            rx,
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        let action = app.handle_event(key(code));
        app.update(action);
    }

    /// Deliver the next fetch completion to the app.
    async fn settle(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("fetch task dropped the channel");
        app.update(action);
    }

    /// App on page 0 of a two-page dataset.
    async fn loaded_app() -> (App, mpsc::UnboundedReceiver<Action>, Arc<MockSource>) {
        loaded_app_with(Arc::new(MockLauncher::default())).await
    }

    async fn loaded_app_with(
        launcher: Arc<MockLauncher>,
    ) -> (App, mpsc::UnboundedReceiver<Action>, Arc<MockSource>) {
        let source = Arc::new(MockSource::new(20));
        source.push_page(page_of("p0", 10, Some("c0"), true));
        source.push_page(page_of("p1", 10, None, false));
        let (mut app, mut rx) = new_app_with(&source, launcher);
        app.start();
        settle(&mut app, &mut rx).await;
        (app, rx, source)
    }

    #[tokio::test]
    async fn first_page_loads_on_start() {
        let (app, _rx, source) = loaded_app().await;
        assert_eq!(app.pager.phase(), Phase::Idle);
        assert_eq!(app.pager.current_forks().len(), 10);
        assert_eq!(source.queries()[0].after, None);
        assert_eq!(source.queries()[0].head_ref, "octo:main");
        assert_eq!(source.queries()[0].sort, SortMode::UpdatedAt);
    }

    #[tokio::test]
    async fn right_fetches_then_stops_at_last_page() {
        let (mut app, mut rx, source) = loaded_app().await;

        press(&mut app, KeyCode::Right);
        assert!(matches!(app.pager.phase(), Phase::Loading { target: 1, .. }));
        settle(&mut app, &mut rx).await;

        assert_eq!(source.queries()[1].after.as_deref(), Some("c0"));
        assert_eq!(app.pager.current_page(), 1);
        assert_eq!(app.pager.last_page(), Some(1));

        press(&mut app, KeyCode::Right);
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(source.page_calls(), 2);
        assert_eq!(app.pager.current_page(), 1);
    }

    #[tokio::test]
    async fn left_twice_returns_to_cached_first_page() {
        let (mut app, mut rx, source) = loaded_app().await;
        let first_page: Vec<Fork> = app.pager.current_forks().to_vec();
        press(&mut app, KeyCode::Right);
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);

        assert_eq!(app.pager.current_page(), 0);
        assert_eq!(app.pager.current_forks(), first_page.as_slice());
        assert_eq!(source.page_calls(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn keys_while_loading_do_not_start_more_fetches() {
        let (mut app, mut rx, source) = loaded_app().await;

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Left);
        settle(&mut app, &mut rx).await;

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(source.page_calls(), 2);
        assert_eq!(app.pager.sort(), SortMode::UpdatedAt);
        assert_eq!(app.pager.current_page(), 1);
    }

    #[tokio::test]
    async fn sort_by_stars_restarts_from_first_page() {
        let (mut app, mut rx, source) = loaded_app().await;
        press(&mut app, KeyCode::Right);
        settle(&mut app, &mut rx).await;

        source.push_page(page_of("s0", 10, Some("s0"), true));
        press(&mut app, KeyCode::Char('s'));
        assert!(app.pager.cache().is_empty());
        assert_eq!(app.pager.current_page(), 0);
        settle(&mut app, &mut rx).await;

        let query = source.queries().last().cloned().unwrap();
        assert_eq!(query.sort, SortMode::Stargazers);
        assert_eq!(query.after, None);
        assert_eq!(app.pager.current_forks()[0].full_name, "s0/fork-0");
    }

    #[tokio::test]
    async fn scrolling_past_the_edges_changes_page() {
        let (mut app, mut rx, _source) = loaded_app().await;

        for _ in 0..9 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.selected, 9);
        assert_eq!(app.pager.current_page(), 0);

        press(&mut app, KeyCode::Char('j'));
        settle(&mut app, &mut rx).await;
        assert_eq!(app.pager.current_page(), 1);
        assert_eq!(app.selected, 0);

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.pager.current_page(), 0);
        assert_eq!(app.selected, 9);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.pager.current_page(), 1);
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn top_and_bottom_jumps() {
        let (mut app, _rx, _source) = loaded_app().await;
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.selected, 9);
        assert_eq!(app.selected_fork().unwrap().full_name, "p0/fork-9");
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let source = Arc::new(MockSource::new(20));
        source.fail_next(ForkviewError::Api("Something went wrong".into()));
        let (mut app, mut rx) = new_app(&source);
        app.start();
        settle(&mut app, &mut rx).await;

        assert!(app.should_quit);
        assert!(app.fatal.as_deref().unwrap().contains("Something went wrong"));
    }

    #[tokio::test]
    async fn spinner_only_advances_while_loading() {
        let (mut app, _rx, _source) = loaded_app().await;
        app.update(Action::Tick);
        assert_eq!(app.spinner_frame, 0);

        press(&mut app, KeyCode::Right);
        app.update(Action::Tick);
        app.update(Action::Tick);
        assert_eq!(app.spinner_frame, 2);
    }

    #[tokio::test]
    async fn header_total_prefers_fetched_count() {
        let source = Arc::new(MockSource::new(20));
        let mut page = page_of("p0", 3, None, false);
        page.total_count = 3;
        source.push_page(page);
        let (mut app, mut rx) = new_app(&source);

        assert_eq!(app.total_forks(), 20);
        app.start();
        settle(&mut app, &mut rx).await;
        assert_eq!(app.total_forks(), 3);

        // Re-sorting empties the cache but keeps the fetched total on screen.
        press(&mut app, KeyCode::Char('s'));
        assert!(app.pager.cache().is_empty());
        assert!(app.pager.is_loading());
        assert_eq!(app.total_forks(), 3);
    }

    #[tokio::test]
    async fn key_bindings() {
        let source = Arc::new(MockSource::new(1));
        let (app, _rx) = new_app(&source);
        let cases = [
            (KeyCode::Char('q'), "Quit"),
            (KeyCode::Esc, "Quit"),
            (KeyCode::Down, "ScrollDown"),
            (KeyCode::Char('k'), "ScrollUp"),
            (KeyCode::Char('h'), "PrevPage"),
            (KeyCode::Right, "NextPage"),
            (KeyCode::Enter, "OpenInBrowser"),
            (KeyCode::Char('y'), "YankUrl"),
            (KeyCode::Char('x'), "None"),
        ];
        for (code, expected) in cases {
            let action = app.handle_event(key(code));
            assert_eq!(format!("{:?}", action), expected);
        }
        assert!(matches!(
            app.handle_event(key(KeyCode::Char('s'))),
            Action::Sort(SortMode::Stargazers)
        ));
        assert!(matches!(
            app.handle_event(key(KeyCode::Char('u'))),
            Action::Sort(SortMode::UpdatedAt)
        ));
    }

    #[tokio::test]
    async fn open_is_ignored_while_loading() {
        let source = Arc::new(MockSource::new(20));
        let (mut app, _rx) = new_app(&source);
        app.update(Action::OpenInBrowser);
        assert!(app.status.is_none());
        assert!(app.selected_fork().is_none());
        assert!(app.pager.is_loading());
    }

    #[tokio::test]
    async fn browser_failure_reports_and_keeps_position() {
        let launcher = Arc::new(MockLauncher::failing());
        let (mut app, mut rx, source) = loaded_app_with(Arc::clone(&launcher)).await;
        press(&mut app, KeyCode::Down);
        let forks_before: Vec<Fork> = app.pager.current_forks().to_vec();

        press(&mut app, KeyCode::Enter);

        match &app.status {
            Some(Status::Error(msg)) => assert!(msg.contains("no launcher available"), "{}", msg),
            other => panic!("expected an error status, got {:?}", other),
        }
        assert_eq!(app.pager.current_page(), 0);
        assert_eq!(app.pager.phase(), Phase::Idle);
        assert_eq!(app.pager.cache().len(), 1);
        assert_eq!(app.pager.current_forks(), forks_before.as_slice());
        assert_eq!(app.selected, 1);
        assert!(!app.should_quit);
        assert!(app.fatal.is_none());
        assert_eq!(source.page_calls(), 1);
        assert!(rx.try_recv().is_err());

        // The message clears on the next key press.
        press(&mut app, KeyCode::Up);
        assert!(app.status.is_none());
    }

    #[tokio::test]
    async fn enter_opens_selected_fork() {
        let launcher = Arc::new(MockLauncher::default());
        let (mut app, _rx, _source) = loaded_app_with(Arc::clone(&launcher)).await;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(launcher.opened(), ["https://github.com/p0/fork-1"]);
        assert_eq!(
            app.status,
            Some(Status::Info("Opened https://github.com/p0/fork-1".to_string()))
        );
    }

    #[tokio::test]
    async fn yank_failure_is_reported() {
        let launcher = Arc::new(MockLauncher::failing());
        let (mut app, _rx, _source) = loaded_app_with(Arc::clone(&launcher)).await;
        press(&mut app, KeyCode::Char('y'));

        assert!(matches!(app.status, Some(Status::Error(_))));
        assert!(launcher.copied().is_empty());
        assert_eq!(app.pager.current_page(), 0);
    }

    #[tokio::test]
    async fn yank_copies_selected_url() {
        let launcher = Arc::new(MockLauncher::default());
        let (mut app, _rx, _source) = loaded_app_with(Arc::clone(&launcher)).await;
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(launcher.copied(), ["https://github.com/p0/fork-0"]);
        assert!(matches!(app.status, Some(Status::Info(_))));
    }
}
