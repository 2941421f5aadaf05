#![forbid(unsafe_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell as TableCell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap,
};

use crate::config::Config;
use crate::output::{format_timestamp, truncate};
use crate::task::manager::{AddOutcome, EditOutcome, TaskListManager};
use crate::task::model::{FilterMode, Priority, Task};
use crate::task::storage::KeyValueStore;
use crate::tui::input::TextInput;
use crate::tui::{self, TerminalGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Search,
    Editor,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorField {
    Title,
    Description,
}

#[derive(Debug, Clone)]
struct Editor {
    /// `None` while adding a new task.
    id: Option<String>,
    title: TextInput,
    description: TextInput,
    field: EditorField,
    notice: Option<String>,
}

impl Editor {
    fn new_task() -> Self {
        Self {
            id: None,
            title: TextInput::new(""),
            description: TextInput::new(""),
            field: EditorField::Title,
            notice: None,
        }
    }

    fn for_task(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: TextInput::new(task.title.as_str()),
            description: TextInput::new(task.description.as_str()),
            field: EditorField::Title,
            notice: None,
        }
    }

    fn active_input(&mut self) -> &mut TextInput {
        match self.field {
            EditorField::Title => &mut self.title,
            EditorField::Description => &mut self.description,
        }
    }
}

#[derive(Debug, Clone)]
enum ConfirmAction {
    DeleteTask { id: String },
    ClearAll,
}

#[derive(Debug, Clone)]
struct ConfirmDialog {
    title: String,
    message: String,
    action: ConfirmAction,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    until: Instant,
}

impl Toast {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            until: Instant::now() + Duration::from_secs(3),
        }
    }
}

pub struct AppState<S> {
    manager: TaskListManager<S>,
    icons: bool,
    show_progress: bool,

    filter: FilterMode,
    search: String,
    search_input: TextInput,

    /// Ids of the rows currently shown, in display order.
    visible: Vec<String>,
    table_state: TableState,
    stale: Rc<Cell<bool>>,

    mode: Mode,
    editor: Option<Editor>,
    confirm: Option<ConfirmDialog>,

    toast: Option<Toast>,
    last_error: Option<String>,
    should_quit: bool,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(cfg: &Config, mut manager: TaskListManager<S>) -> Self {
        let stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&stale);
        manager.subscribe(move |_| flag.set(true));

        let mut table_state = TableState::default();
        table_state.select(Some(0));

        let mut app = Self {
            manager,
            icons: cfg.ui.icons,
            show_progress: cfg.ui.show_progress,
            filter: cfg.ui.filter(),
            search: String::new(),
            search_input: TextInput::new(""),
            visible: Vec::new(),
            table_state,
            stale,
            mode: Mode::Normal,
            editor: None,
            confirm: None,
            toast: None,
            last_error: None,
            should_quit: false,
        };
        app.refresh_view();
        app
    }

    #[must_use]
    pub fn manager(&self) -> &TaskListManager<S> {
        &self.manager
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn refresh_view(&mut self) {
        let selected_id = self.selected_id().map(str::to_owned);
        self.visible = self
            .manager
            .query(self.filter, &self.search)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        self.stale.set(false);

        // Keep the cursor on the same task when it is still shown.
        let idx = selected_id
            .and_then(|id| self.visible.iter().position(|v| *v == id))
            .unwrap_or_else(|| {
                self.selected_index()
                    .min(self.visible.len().saturating_sub(1))
            });
        self.table_state.select(Some(idx));
    }

    fn refresh_if_stale(&mut self) {
        if self.stale.get() {
            self.refresh_view();
        }
        self.last_error = self.manager.last_persist_error().map(str::to_owned);
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_id(&self) -> Option<&str> {
        self.visible.get(self.selected_index()).map(String::as_str)
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_id().and_then(|id| self.manager.get(id))
    }

    fn move_selection(&mut self, delta: i64) {
        if self.visible.is_empty() {
            return;
        }
        let cur = i64::try_from(self.selected_index()).unwrap_or(0);
        let max = i64::try_from(self.visible.len() - 1).unwrap_or(0);
        let next = usize::try_from((cur + delta).clamp(0, max)).unwrap_or(0);
        self.table_state.select(Some(next));
    }

    fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
        self.refresh_view();
    }

    fn expire_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| Instant::now() >= t.until) {
            self.toast = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Confirm => self.handle_confirm_key(key),
            Mode::Editor => self.handle_editor_key(key),
            Mode::Search => self.handle_search_key(key),
            Mode::Normal => self.handle_normal_key(key),
        }
        self.refresh_if_stale();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.search.is_empty() {
                    self.should_quit = true;
                } else {
                    self.search.clear();
                    self.refresh_view();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home | KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::End | KeyCode::Char('G') => {
                self.table_state
                    .select(Some(self.visible.len().saturating_sub(1)));
            }
            KeyCode::Char('1') => self.set_filter(FilterMode::All),
            KeyCode::Char('2') => self.set_filter(FilterMode::Active),
            KeyCode::Char('3') => self.set_filter(FilterMode::Completed),
            KeyCode::Char('f') | KeyCode::Tab => self.set_filter(self.filter.next()),
            KeyCode::Char('/') => {
                self.search_input = TextInput::new(self.search.as_str());
                self.mode = Mode::Search;
            }
            KeyCode::Char('a' | 'n') => {
                self.editor = Some(Editor::new_task());
                self.mode = Mode::Editor;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task() {
                    self.editor = Some(Editor::for_task(task));
                    self.mode = Mode::Editor;
                }
            }
            KeyCode::Char(' ' | 'x') => {
                if let Some(id) = self.selected_id().map(str::to_owned) {
                    self.manager.toggle_done(&id);
                }
            }
            KeyCode::Char('p') => self.cycle_priority(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(task) = self.selected_task() {
                    self.confirm = Some(ConfirmDialog {
                        title: "Delete task".to_owned(),
                        message: format!("Delete '{}'?", truncate(&task.title, 60)),
                        action: ConfirmAction::DeleteTask {
                            id: task.id.clone(),
                        },
                    });
                    self.mode = Mode::Confirm;
                }
            }
            KeyCode::Char('c') => {
                let removed = self.manager.clear_completed();
                self.toast = Some(Toast::info(format!("Cleared {removed} completed")));
            }
            KeyCode::Char('C') => {
                if !self.manager.is_empty() {
                    self.confirm = Some(ConfirmDialog {
                        title: "Clear all".to_owned(),
                        message: format!("Delete all {} tasks?", self.manager.len()),
                        action: ConfirmAction::ClearAll,
                    });
                    self.mode = Mode::Confirm;
                }
            }
            _ => {}
        }
    }

    fn cycle_priority(&mut self) {
        if !self.manager.options().supports_priority {
            self.toast = Some(Toast::info("Priorities are disabled (list.supports_priority)"));
            return;
        }
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let next = task.priority.unwrap_or_default().cycle();
        self.manager.set_priority(&id, next);
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                self.search = self.search_input.as_str().trim().to_owned();
                self.mode = Mode::Normal;
                self.refresh_view();
            }
            _ => {
                // Live filtering while typing, like the search box it replaces.
                if self.search_input.handle_key(key) {
                    self.search = self.search_input.as_str().trim().to_owned();
                    self.refresh_view();
                }
            }
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let supports_description = self.manager.options().supports_description;
        let Some(editor) = self.editor.as_mut() else {
            self.mode = Mode::Normal;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.editor = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down
                if supports_description =>
            {
                editor.field = match editor.field {
                    EditorField::Title => EditorField::Description,
                    EditorField::Description => EditorField::Title,
                };
            }
            KeyCode::Enter => self.submit_editor(),
            _ => {
                editor.active_input().handle_key(key);
            }
        }
    }

    fn submit_editor(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let title = editor.title.as_str().to_owned();
        let description = editor.description.as_str().to_owned();

        let close_with = match editor.id.clone() {
            None => match self.manager.add(&title, &description) {
                AddOutcome::Added { id } => {
                    self.search.clear();
                    self.stale.set(true);
                    self.refresh_view();
                    if let Some(idx) = self.visible.iter().position(|v| *v == id) {
                        self.table_state.select(Some(idx));
                    }
                    Some(format!("Added '{}'", truncate(title.trim(), 40)))
                }
                AddOutcome::Ignored => None,
                AddOutcome::Duplicate { title } => {
                    self.set_editor_notice(format!("Task '{title}' already exists"));
                    None
                }
            },
            Some(id) => match self.manager.edit(&id, &title, &description) {
                EditOutcome::Updated => Some("Saved".to_owned()),
                EditOutcome::Removed => Some("Removed task with empty title".to_owned()),
                EditOutcome::NotFound => Some("Task no longer exists".to_owned()),
                EditOutcome::Ignored => None,
                EditOutcome::Duplicate { title } => {
                    self.set_editor_notice(format!("Task '{title}' already exists"));
                    None
                }
            },
        };

        if let Some(message) = close_with {
            self.editor = None;
            self.mode = Mode::Normal;
            self.toast = Some(Toast::info(message));
        }
    }

    fn set_editor_notice(&mut self, notice: String) {
        if let Some(editor) = self.editor.as_mut() {
            editor.notice = Some(notice);
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                if let Some(confirm) = self.confirm.take() {
                    match confirm.action {
                        ConfirmAction::DeleteTask { id } => {
                            if self.manager.remove(&id) {
                                self.toast = Some(Toast::info("Deleted"));
                            }
                        }
                        ConfirmAction::ClearAll => {
                            let removed = self.manager.clear_all();
                            self.toast = Some(Toast::info(format!("Deleted {removed} tasks")));
                        }
                    }
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => {
                self.confirm = None;
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }
}

pub fn run<S: KeyValueStore>(cfg: &Config, manager: TaskListManager<S>) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::new(tui::init_terminal()?);
    let mut app = AppState::new(cfg, manager);

    loop {
        app.expire_toast();
        guard.terminal()?.draw(|f| draw(f, &mut app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }

    Ok(())
}

pub fn draw<S: KeyValueStore>(f: &mut Frame<'_>, app: &mut AppState<S>) {
    let area = f.area();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, root[0], app);
    draw_body(f, root[1], app);
    draw_footer(f, root[2], app);

    match app.mode {
        Mode::Search => draw_search_popup(f, app),
        Mode::Editor => {
            if let Some(editor) = &app.editor {
                draw_editor_popup(f, editor, app.manager.options().supports_description);
            }
        }
        Mode::Confirm => {
            if let Some(confirm) = &app.confirm {
                draw_confirm(f, confirm);
            }
        }
        Mode::Normal => {}
    }
}

fn draw_header<S: KeyValueStore>(f: &mut Frame<'_>, area: Rect, app: &AppState<S>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(28)])
        .split(area);

    let stats = app.manager.stats();
    let titles: Vec<Line> = FilterMode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let count = match mode {
                FilterMode::All => stats.total,
                FilterMode::Active => stats.active,
                FilterMode::Completed => stats.completed,
            };
            Line::from(format!("{} ({count}) [{}]", mode.title(), i + 1))
        })
        .collect();
    let selected = FilterMode::ALL
        .iter()
        .position(|m| *m == app.filter)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" | ");
    f.render_widget(tabs, chunks[0]);

    if app.show_progress {
        let progress = stats.progress();
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
            .percent(u16::from(progress))
            .label(format!("{progress}% complete"));
        f.render_widget(gauge, chunks[1]);
    }
}

fn draw_body<S: KeyValueStore>(f: &mut Frame<'_>, area: Rect, app: &mut AppState<S>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    draw_task_table(f, layout[0], app);
    draw_task_detail(f, layout[1], app);
}

fn draw_task_table<S: KeyValueStore>(f: &mut Frame<'_>, area: Rect, app: &mut AppState<S>) {
    let with_priority = app.manager.options().supports_priority;
    let mut header = vec!["", "TITLE"];
    if with_priority {
        header.push("PRIO");
    }
    header.push("CREATED");

    let rows: Vec<Row> = app
        .visible
        .iter()
        .filter_map(|id| app.manager.get(id))
        .map(|t| {
            let title_style = if t.done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            let mut cells = vec![
                TableCell::from(done_marker(t.done, app.icons)),
                TableCell::from(t.title.clone()).style(title_style),
            ];
            if with_priority {
                let prio = t.priority.unwrap_or_default();
                cells.push(TableCell::from(prio.as_str()).style(priority_style(prio)));
            }
            cells.push(TableCell::from(format_timestamp(&t.created_at)));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(3), Constraint::Min(10)];
    if with_priority {
        widths.push(Constraint::Length(6));
    }
    widths.push(Constraint::Length(16));

    let title = if app.search.is_empty() {
        format!("Tasks ({})", app.visible.len())
    } else {
        format!("Tasks ({}) matching '{}'", app.visible.len(), app.search)
    };

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_task_detail<S: KeyValueStore>(f: &mut Frame<'_>, area: Rect, app: &AppState<S>) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(t) = app.selected_task() else {
        let msg = if app.manager.is_empty() {
            "No tasks yet. Press 'a' to add one."
        } else {
            "No tasks match your filters."
        };
        f.render_widget(Paragraph::new(msg).wrap(Wrap { trim: true }), inner);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![Span::styled("Title: ", bold), Span::raw(t.title.as_str())]),
        Line::from(format!("ID: {}", t.id)),
        Line::from(format!("Status: {}", if t.done { "done" } else { "active" })),
    ];
    if let Some(prio) = t.priority {
        lines.push(Line::from(format!("Priority: {prio}")));
    }
    lines.push(Line::from(format!(
        "Created: {}",
        format_timestamp(&t.created_at)
    )));
    if !t.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description:", bold)));
        lines.extend(t.description.lines().map(|l| Line::from(l.to_owned())));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_footer<S: KeyValueStore>(f: &mut Frame<'_>, area: Rect, app: &AppState<S>) {
    let mut left = match app.mode {
        Mode::Normal => {
            let mut keys = "q quit • j/k move • space toggle • a add • e edit • d delete • c clear done • C clear all • / search • f filter".to_owned();
            if app.manager.options().supports_priority {
                keys.push_str(" • p priority");
            }
            keys
        }
        Mode::Search => "Enter apply • Esc close".to_owned(),
        Mode::Editor => "Enter save • Tab switch field • Esc cancel".to_owned(),
        Mode::Confirm => "y confirm • n cancel".to_owned(),
    };

    if let Some(err) = &app.last_error {
        left = format!("Error: {err}");
    } else if let Some(toast) = &app.toast {
        left.clone_from(&toast.message);
    }

    let stats = app.manager.stats();
    let right = format!(
        "{} active • {} done • {}",
        stats.active,
        stats.completed,
        app.manager.key()
    );

    let spans = vec![
        Span::styled(left, Style::default().fg(Color::White).bg(Color::Blue)),
        Span::raw(" "),
        Span::styled(
            right,
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::DIM),
        ),
    ];
    let p = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Blue));
    f.render_widget(p, area);
}

fn draw_search_popup<S: KeyValueStore>(f: &mut Frame<'_>, app: &AppState<S>) {
    let area = top_popup_rect(f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("Search tasks");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let prefix = "Search: ";
    let line = Line::from(vec![
        Span::styled(prefix, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.search_input.as_str()),
    ]);
    f.render_widget(Paragraph::new(line), inner);
    f.set_cursor_position((
        inner.x + prefix_width(prefix) + app.search_input.cursor_x(),
        inner.y,
    ));
}

fn draw_editor_popup(f: &mut Frame<'_>, editor: &Editor, supports_description: bool) {
    let area = centered_rect(80, 40, f.area());
    f.render_widget(Clear, area);
    let title = if editor.id.is_some() {
        "Edit task"
    } else {
        "New task"
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let active = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let style_for = |field| {
        if editor.field == field {
            active
        } else {
            Style::default()
        }
    };

    let title_prefix = "Title:       ";
    let desc_prefix = "Description: ";
    let mut lines = vec![Line::from(vec![
        Span::styled(title_prefix, bold),
        Span::styled(editor.title.as_str(), style_for(EditorField::Title)),
    ])];
    if supports_description {
        lines.push(Line::from(vec![
            Span::styled(desc_prefix, bold),
            Span::styled(
                editor.description.as_str(),
                style_for(EditorField::Description),
            ),
        ]));
    }
    if let Some(notice) = editor.notice.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    f.render_widget(Paragraph::new(lines), inner);

    let (row, input) = match editor.field {
        EditorField::Title => (0, &editor.title),
        EditorField::Description => (1, &editor.description),
    };
    f.set_cursor_position((
        inner.x + prefix_width(title_prefix) + input.cursor_x(),
        inner.y + row,
    ));
}

fn draw_confirm(f: &mut Frame<'_>, confirm: &ConfirmDialog) {
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(confirm.title.as_str());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(confirm.message.as_str()),
        Line::from(""),
        Line::from("[y] yes    [n] no"),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn done_marker(done: bool, icons: bool) -> &'static str {
    match (done, icons) {
        (true, true) => "✓",
        (false, true) => "○",
        (true, false) => "[x]",
        (false, false) => "[ ]",
    }
}

fn priority_style(p: Priority) -> Style {
    match p {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Normal => Style::default(),
        Priority::Low => Style::default().fg(Color::DarkGray),
    }
}

fn prefix_width(prefix: &str) -> u16 {
    u16::try_from(prefix.chars().count()).unwrap_or(0)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn top_popup_rect(area: Rect) -> Rect {
    let w = area.width.min(80);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + 1,
        width: w,
        height: 3u16.min(area.height),
    }
}
