//! TUI implementation for docq

use tokio::sync::mpsc;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use docq_api::{BuildRequest, Client, SearchRequest};
use docq_session::{BuildProgress, Session, SessionEvent, WatchConfig, watch_build};
use docq_tui::{
    Theme,
    input::Action,
    widgets::{
        InputBox, Selector, SelectorItem, SelectorState, Spinner, Transcript, TranscriptEntry,
        calculate_transcript_height,
    },
};

use crate::commands::GraphragOp;
use crate::utils;

/// Messages sent from UI state to the session loop
#[derive(Debug)]
pub enum UiMessage {
    /// User submitted a question
    Submit(String),
    /// User requested quit
    Quit,
    /// User requested clear
    Clear,
    /// User requested abort of the in-flight answer
    Abort,
    /// Slash command
    Command(String),
    /// Knowledge scope picked in the selector
    ApplyScope(Vec<i64>),
    /// Update from a background index build watcher
    BuildProgress(BuildProgress),
}

/// TUI application state
pub struct TuiState {
    /// Transcript entries
    entries: Vec<TranscriptEntry>,
    /// Question input
    input: InputBox,
    /// Transcript scroll offset; usize::MAX follows the tail
    scroll: usize,
    /// Whether an answer is currently streaming
    is_streaming: bool,
    /// Status line text
    status: String,
    /// Active color palette
    theme: Theme,
    /// Display name shown in the frame title
    username: String,
    /// Knowledge entry ids constraining answers (empty = everything)
    scope: Vec<i64>,
    /// Answers committed this session
    answered: u64,
    /// Channel to send messages to the session loop
    ui_tx: mpsc::Sender<UiMessage>,
    /// When the in-flight answer started; anchors the spinner
    spinner_start: Instant,
    /// Knowledge selector state
    scope_selector: SelectorState,
    /// Items shown in the knowledge selector
    selector_items: Vec<SelectorItem>,
    /// Knowledge entry id behind each selector item
    selector_ids: Vec<i64>,
    /// Preset questions from the last /presets listing
    presets: Vec<docq_api::PresetQuestion>,
}

impl TuiState {
    pub fn new(username: String, scope: Vec<i64>, theme: Theme, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        let mut input = InputBox::new().with_placeholder("Ask a question...");
        input.set_focused(true);

        Self {
            entries: vec![],
            input,
            scroll: 0,
            is_streaming: false,
            status: "Ready".to_string(),
            theme,
            username,
            scope,
            answered: 0,
            ui_tx,
            spinner_start: Instant::now(),
            scope_selector: SelectorState::default(),
            selector_items: vec![],
            selector_ids: vec![],
            presets: vec![],
        }
    }

    /// Open the knowledge selector popup over a fresh listing
    pub fn open_scope_selector(&mut self, items: Vec<SelectorItem>, ids: Vec<i64>) {
        self.selector_items = items;
        self.selector_ids = ids;
        self.scope_selector.show();
    }

    /// Handle session events
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AskStart { question, .. } => {
                self.is_streaming = true;
                self.entries.push(TranscriptEntry::exchange(question));
                self.scroll_to_bottom();
            }
            SessionEvent::AnswerDelta { delta, .. } => {
                if let Some(TranscriptEntry::Exchange {
                    answer,
                    streaming: true,
                    ..
                }) = self.entries.last_mut()
                {
                    answer.push_str(&delta);
                }
                self.scroll_to_bottom();
            }
            SessionEvent::AskCommitted { record } => {
                self.is_streaming = false;
                if let Some(TranscriptEntry::Exchange {
                    answer,
                    streaming,
                    response_time_ms,
                    ..
                }) = self.entries.last_mut()
                {
                    if *streaming {
                        *answer = record.answer;
                        *streaming = false;
                        *response_time_ms = record.response_time_ms;
                    }
                }
                self.answered += 1;
                self.status = format!("Ready | {} answered", self.answered);
                self.scroll_to_bottom();
            }
            SessionEvent::AskAborted { reason, .. } => {
                self.is_streaming = false;
                // The store has already dropped the half answer; mirror that here
                if self.entries.last().is_some_and(|e| e.is_streaming()) {
                    self.entries.pop();
                }
                self.entries.push(TranscriptEntry::error(reason));
                self.status = "Ready".to_string();
                self.scroll_to_bottom();
            }
        }
    }

    /// Handle progress from a background index build watcher
    pub fn handle_build_progress(&mut self, progress: BuildProgress) {
        match progress {
            BuildProgress::Building { elapsed, status } => {
                self.status = format!(
                    "Building graph index... {}s, {} artifacts",
                    elapsed.as_secs(),
                    status.artifact_count.unwrap_or(0)
                );
            }
            BuildProgress::Ready { status } => {
                let artifacts = status
                    .artifact_count
                    .map(|n| format!(" ({} artifacts)", n))
                    .unwrap_or_default();
                self.show_notice(&format!(
                    "Graph index ready{}. Query it with /graphrag or docq --graph-search.",
                    artifacts
                ));
                self.status = "Ready".to_string();
            }
            BuildProgress::TimedOut { elapsed } => {
                self.show_error(&format!(
                    "Index build still running after {}s; check later with /graphrag status.",
                    elapsed.as_secs()
                ));
                self.status = "Ready".to_string();
            }
        }
    }

    fn scroll_to_bottom(&mut self) {
        // Render clamps this to the real bottom
        self.scroll = usize::MAX;
    }

    /// Show a notice in the transcript
    pub fn show_notice(&mut self, text: &str) {
        self.entries.push(TranscriptEntry::notice(text));
        self.scroll_to_bottom();
    }

    /// Show an error notice in the transcript
    pub fn show_error(&mut self, text: &str) {
        self.entries.push(TranscriptEntry::error(text));
        self.scroll_to_bottom();
    }

    /// Route a keyboard action; returns false when the app should exit
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        // An open selector captures all input
        if self.scope_selector.visible {
            match action {
                Action::Up => {
                    self.scope_selector.up(self.selector_items.len());
                }
                Action::Down => {
                    self.scope_selector.down(self.selector_items.len());
                }
                Action::Char(' ') => {
                    if let Some(item) = self.selector_items.get_mut(self.scope_selector.selected) {
                        item.checked = !item.checked;
                    }
                }
                Action::Submit => {
                    let ids: Vec<i64> = self
                        .selector_items
                        .iter()
                        .zip(&self.selector_ids)
                        .filter(|(item, _)| item.checked)
                        .map(|(_, id)| *id)
                        .collect();
                    self.scope_selector.hide();
                    let _ = self.ui_tx.send(UiMessage::ApplyScope(ids)).await;
                }
                Action::Escape | Action::KnowledgeSelect => {
                    self.scope_selector.hide();
                }
                _ => {}
            }
            return true;
        }

        match action {
            Action::Submit => {
                let content = self.input.content().to_string();
                if !content.is_empty() && !self.is_streaming {
                    self.input.push_history(content.clone());
                    self.input.clear();

                    if content.starts_with('/') {
                        let _ = self.ui_tx.send(UiMessage::Command(content)).await;
                    } else {
                        let _ = self.ui_tx.send(UiMessage::Submit(content)).await;
                    }
                }
                true
            }
            Action::Quit => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::Interrupt | Action::Escape => {
                if self.is_streaming {
                    let _ = self.ui_tx.send(UiMessage::Abort).await;
                    self.status = "Cancelling...".to_string();
                    true
                } else {
                    let _ = self.ui_tx.send(UiMessage::Quit).await;
                    false
                }
            }
            Action::Eof => {
                if self.input.content().is_empty() {
                    let _ = self.ui_tx.send(UiMessage::Quit).await;
                    false
                } else {
                    true
                }
            }
            Action::Up => {
                self.input.history_prev(width);
                true
            }
            Action::Down => {
                self.input.history_next(width);
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::Clear => {
                let _ = self.ui_tx.send(UiMessage::Clear).await;
                true
            }
            Action::KnowledgeSelect => {
                // The listing comes from the server, so this routes through
                // the command handler like /select
                if !self.is_streaming {
                    let _ = self.ui_tx.send(UiMessage::Command("/select".to_string())).await;
                }
                true
            }
            _ => {
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: transcript (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Transcript
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(size);

        self.render_transcript(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);

        if self.scope_selector.visible {
            self.render_scope_selector(frame, size);
        }
    }

    fn render_scope_selector(&self, frame: &mut Frame, area: Rect) {
        let selector = Selector::new("Answer from which entries?", &self.selector_items, &self.theme)
            .with_selected(self.scope_selector.selected);
        selector.render_centered(area, frame.buffer_mut());
    }

    /// Keybinding cheat sheet, shown until the first exchange
    fn welcome_screen(&self) -> Paragraph<'_> {
        const BINDINGS: [(&str, &str); 6] = [
            ("Enter", "Ask a question"),
            ("Ctrl+K", "Choose knowledge entries"),
            ("Ctrl+L", "Clear conversation"),
            ("Ctrl+C", "Abort / Quit"),
            ("Up/Down", "Recall earlier questions"),
            ("PgUp/Dn", "Scroll transcript"),
        ];

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  ▌ ", self.theme.accent_bold()),
                Span::styled("docq", self.theme.base_style().add_modifier(Modifier::BOLD)),
                Span::styled(" - document intelligence", self.theme.dim_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Signed in as {}", self.username),
                self.theme.dim_style(),
            )),
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled("  Keybindings", self.theme.warning_style())),
            Line::from(""),
        ];
        for (key, what) in BINDINGS {
            lines.push(Line::from(vec![
                Span::styled(format!("    {key:<10}"), self.theme.accent_style()),
                Span::styled(what, self.theme.base_style()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Ask a question to get started, or type /help for commands...",
            self.theme.dim_style(),
        )));

        Paragraph::new(lines)
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" docq │ {} ", self.username);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || self.entries.is_empty() {
            frame.render_widget(self.welcome_screen(), inner);
            return;
        }

        let content_height = calculate_transcript_height(&self.entries, inner.width as usize);
        let bottom = content_height.saturating_sub(inner.height as usize);

        // usize::MAX is the follow-the-tail sentinel
        self.scroll = self.scroll.min(bottom);

        let transcript = Transcript::new(&self.entries, &self.theme).scroll(self.scroll);
        frame.render_widget(transcript, inner);

        // Scrollbar only when the transcript overflows
        if content_height > inner.height as usize {
            let mut bar = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                inner,
                &mut bar,
            );
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_streaming {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let scope = if self.scope.is_empty() {
            "scope: all".to_string()
        } else {
            format!("scope: {}", utils::join_ids(&self.scope))
        };
        let left = format!("{} │ {} │ {}", self.username, scope, self.status);
        const HINTS: &str = "Ctrl+K: knowledge │ Ctrl+L: clear │ Ctrl+C: quit";

        // Key hints sit flush right; dropped entirely when the bar is too
        // narrow for both
        let used = left.chars().count() + HINTS.chars().count();
        let mut spans = vec![Span::styled(left, self.theme.dim_style())];
        if used + 2 <= area.width as usize {
            spans.push(Span::raw(" ".repeat(area.width as usize - used)));
            spans.push(Span::styled(HINTS, self.theme.dim_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Run the TUI application
pub async fn run_tui(
    session: &mut Session,
    client: &Client,
    username: &str,
    cfg: &crate::config::Config,
) -> anyhow::Result<()> {
    use crate::commands::{CommandResult, execute_command};
    use crossterm::{
        event::{DisableBracketedPaste, EnableBracketedPaste},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let restore = |terminal: &mut Terminal<CrosstermBackend<io::Stdout>>| -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;
        Ok(())
    };

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let build_tx = ui_tx.clone();

    let theme = cfg
        .theme
        .as_deref()
        .and_then(Theme::from_name)
        .unwrap_or_default();
    let mut state = TuiState::new(username.to_string(), session.scope().to_vec(), theme, ui_tx);

    let mut session_rx = session.subscribe();
    let mut event_stream = EventStream::new();

    // Redraw cadence; also paces the spinner
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    // Cancels the background build watcher, if one is running
    let mut build_cancel = CancellationToken::new();

    // Questions are queued here and picked up at the top of the loop, so
    // the ask future is created where the question String outlives it
    let mut pending_question: Option<String> = None;

    let result = loop {
        if let Some(question) = pending_question.take() {
            state.is_streaming = true;
            state.spinner_start = Instant::now();
            state.status = "Answering...".to_string();

            // The handle aborts without borrowing the session, which the
            // ask future holds mutably until it resolves
            let handle = session.handle();
            let mut ask_future = std::pin::pin!(session.ask(&question));

            loop {
                terminal.draw(|frame| state.render(frame))?;
                let area_width = terminal.size()?.width;

                tokio::select! {
                    biased;

                    result = &mut ask_future => {
                        // Failures have already surfaced through the aborted event
                        let _ = result;
                        break;
                    }

                    event = session_rx.recv() => {
                        if let Ok(session_event) = event {
                            state.handle_session_event(session_event);
                        }
                    }

                    // Input keeps working while the answer streams
                    event = event_stream.next() => {
                        match event {
                            Some(Ok(Event::Key(key))) => {
                                let action = docq_tui::input::key_to_action(key);
                                match action {
                                    Action::Interrupt | Action::Escape => {
                                        handle.abort();
                                        state.status = "Cancelling...".to_string();
                                    }
                                    Action::Quit => {
                                        build_cancel.cancel();
                                        restore(&mut terminal)?;
                                        return Ok(());
                                    }
                                    _ => {
                                        state.input.handle_action(&action, area_width);
                                    }
                                }
                            }
                            Some(Ok(Event::Paste(text))) => {
                                state.input.handle_action(&Action::Paste(text), area_width);
                            }
                            Some(Ok(Event::Resize(_, _))) => {}
                            Some(Err(_)) | None => {
                                build_cancel.cancel();
                                restore(&mut terminal)?;
                                return Ok(());
                            }
                            _ => {}
                        }
                    }

                    _ = tick_interval.tick() => {}
                }
            }

            // The terminal event is broadcast right before the ask future
            // resolves, so it may still be sitting in the channel
            while let Ok(session_event) = session_rx.try_recv() {
                state.handle_session_event(session_event);
            }
            terminal.draw(|frame| state.render(frame))?;

            continue;
        }

        terminal.draw(|frame| state.render(frame))?;

        let area_width = terminal.size()?.width;

        tokio::select! {
            biased;

            event = session_rx.recv() => {
                if let Ok(session_event) = event {
                    state.handle_session_event(session_event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        let action = docq_tui::input::key_to_action(key);
                        if !state.handle_action(action, area_width).await {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        state.handle_action(Action::Paste(text), area_width).await;
                    }
                    Some(Ok(Event::Resize(_, _))) => {}
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                    _ => {}
                }
            }

            _ = tick_interval.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(question)) => {
                        pending_question = Some(question);
                    }
                    Some(UiMessage::Command(cmd)) => {
                        if let Some(result) = execute_command(&cmd) {
                            match result {
                                CommandResult::Message(msg) => {
                                    state.show_notice(&msg);
                                }
                                CommandResult::Clear => {
                                    session.clear();
                                    state.entries.clear();
                                    state.status = "Cleared".to_string();
                                }
                                CommandResult::Exit => {
                                    break Ok(());
                                }
                                CommandResult::Unknown(cmd) => {
                                    state.show_notice(&format!("Unknown command: /{}\nType /help for available commands.", cmd));
                                }
                                CommandResult::SetScope(ids) => {
                                    session.set_scope(ids.clone());
                                    state.scope = ids;
                                    state.show_notice(&scope_notice(&state.scope));
                                }
                                CommandResult::OpenScopeSelector => {
                                    match client.search(&SearchRequest::document_listing(50)).await {
                                        Ok(response) if response.knowledge_items.is_empty() => {
                                            state.show_notice("The knowledge base has no analyzed documents yet. Upload one with: docq --upload <file>");
                                        }
                                        Ok(response) => {
                                            let items: Vec<SelectorItem> = response
                                                .knowledge_items
                                                .iter()
                                                .map(|item| SelectorItem {
                                                    label: format!("[{}] {}", item.id, item.title),
                                                    description: item.summary.as_deref().map(|s| {
                                                        utils::truncate_chars(s, 60).replace('\n', " ")
                                                    }),
                                                    checked: state.scope.contains(&item.id),
                                                })
                                                .collect();
                                            let ids = response.knowledge_items.iter().map(|i| i.id).collect();
                                            state.open_scope_selector(items, ids);
                                        }
                                        Err(e) => {
                                            state.show_error(&format!("Could not list knowledge entries: {e}"));
                                        }
                                    }
                                }
                                CommandResult::ShowHistory(limit) => {
                                    let limit = limit.or(cfg.history_limit).unwrap_or(10);
                                    match client.qa_history(limit).await {
                                        Ok(history) => state.show_notice(&utils::format_history(&history)),
                                        Err(e) => state.show_error(&format!("History fetch failed: {e}")),
                                    }
                                }
                                CommandResult::ShowStats => {
                                    match client.knowledge_stats().await {
                                        Ok(stats) => state.show_notice(&utils::format_stats(&stats)),
                                        Err(e) => state.show_error(&format!("Stats fetch failed: {e}")),
                                    }
                                }
                                CommandResult::ShowPresets(category) => {
                                    match client.preset_questions(category.as_deref()).await {
                                        Ok(presets) => {
                                            state.show_notice(&utils::format_presets(&presets));
                                            state.presets = presets;
                                        }
                                        Err(e) => state.show_error(&format!("Preset fetch failed: {e}")),
                                    }
                                }
                                CommandResult::AskPreset(n) => {
                                    match state.presets.get(n - 1) {
                                        Some(preset) => {
                                            if let Err(e) = client.click_preset_question(preset.id).await {
                                                tracing::debug!("preset click tracking failed: {e}");
                                            }
                                            pending_question = Some(preset.question.clone());
                                        }
                                        None => {
                                            state.show_notice("No such preset. List them first with /presets.");
                                        }
                                    }
                                }
                                CommandResult::SendFeedback(request) => {
                                    match client.submit_feedback(&request).await {
                                        Ok(response) => state.show_notice(&response.message),
                                        Err(e) => state.show_error(&format!("Feedback failed: {e}")),
                                    }
                                }
                                CommandResult::Graphrag(GraphragOp::Status) => {
                                    match client.index_status().await {
                                        Ok(status) => state.show_notice(&utils::format_index_status(&status)),
                                        Err(e) => state.show_error(&format!("Status fetch failed: {e}")),
                                    }
                                }
                                CommandResult::Graphrag(GraphragOp::Delete) => {
                                    match client.delete_index().await {
                                        Ok(response) => state.show_notice(&response.message),
                                        Err(e) => state.show_error(&format!("Index delete failed: {e}")),
                                    }
                                }
                                CommandResult::Graphrag(GraphragOp::Build { rebuild }) => {
                                    // Snapshot freshness before requesting the build, then
                                    // watch in the background so the UI stays usable
                                    let baseline = match client.index_status().await {
                                        Ok(before) if before.index_exists => before.last_modified,
                                        Ok(_) => None,
                                        Err(e) => {
                                            state.show_error(&format!("Status fetch failed: {e}"));
                                            continue;
                                        }
                                    };
                                    let request = BuildRequest {
                                        knowledge_ids: (!state.scope.is_empty())
                                            .then(|| state.scope.clone()),
                                        rebuild,
                                    };
                                    match client.build_index(&request).await {
                                        Ok(accepted) => {
                                            state.show_notice(&format!(
                                                "{} ({} documents)",
                                                accepted.message, accepted.documents_count
                                            ));
                                            state.status = "Building graph index...".to_string();

                                            build_cancel.cancel();
                                            build_cancel = CancellationToken::new();
                                            let mut progress = watch_build(
                                                client.clone(),
                                                baseline,
                                                WatchConfig::default(),
                                                build_cancel.clone(),
                                            );
                                            let tx = build_tx.clone();
                                            tokio::spawn(async move {
                                                while let Some(update) = progress.next().await {
                                                    if tx.send(UiMessage::BuildProgress(update)).await.is_err() {
                                                        break;
                                                    }
                                                }
                                            });
                                        }
                                        Err(e) => state.show_error(&format!("Index build failed: {e}")),
                                    }
                                }
                                CommandResult::SaveTranscript(path) => {
                                    if session.records().is_empty() {
                                        state.show_notice("Nothing to save yet.");
                                    } else {
                                        match utils::save_transcript(session.records(), path) {
                                            Ok(path) => state.show_notice(&format!(
                                                "Transcript saved to {}",
                                                path.display()
                                            )),
                                            Err(e) => state.show_error(&format!("Save failed: {e}")),
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Some(UiMessage::ApplyScope(ids)) => {
                        session.set_scope(ids.clone());
                        state.scope = ids;
                        state.show_notice(&scope_notice(&state.scope));
                    }
                    Some(UiMessage::Clear) => {
                        session.clear();
                        state.entries.clear();
                        state.status = "Cleared".to_string();
                    }
                    Some(UiMessage::Abort) => {
                        session.abort();
                    }
                    Some(UiMessage::BuildProgress(progress)) => {
                        state.handle_build_progress(progress);
                    }
                    Some(UiMessage::Quit) | None => {
                        break Ok(());
                    }
                }
            }
        }
    };

    build_cancel.cancel();
    restore(&mut terminal)?;

    result
}

fn scope_notice(scope: &[i64]) -> String {
    if scope.is_empty() {
        "Answering from the whole knowledge base.".to_string()
    } else if scope.len() == 1 {
        format!("Answering from entry {}.", scope[0])
    } else {
        format!(
            "Answering from {} entries ({}).",
            scope.len(),
            utils::join_ids(scope)
        )
    }
}
