use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io;

use crate::editor::LineEditor;
use crate::models::{DraftField, Filter, InputMode, Priority, Task, TaskId};
use crate::state::{Action, TodoState};

const HELP_TEXT: &str = "Draft row\n\
• a / i: Type a new todo\n\
• Enter: Add it\n\
• Tab: Switch text / due date\n\
• Ctrl+P: Cycle draft priority\n\
• Esc: Back to the list\n\n\
List\n\
• ↑/↓ or k/j: Navigate\n\
• Space / x: Toggle complete\n\
• e / Enter: Edit text (Enter or Esc to save)\n\
• D: Edit due date\n\
• p: Cycle priority\n\
• d / Del: Delete\n\
• c: Clear completed\n\
• 1/2/3 or f: Filter All / Active / Completed\n\
• q: Quit\n\n\
Press any key to close";

pub struct App {
    pub state: TodoState,
    pub list_state: ListState,
    pub mode: InputMode,
    pub input: LineEditor,
    pub should_quit: bool,
}

impl App {
    pub fn new(state: TodoState) -> Self {
        let mut app = App {
            state,
            list_state: ListState::default(),
            mode: InputMode::Normal,
            input: LineEditor::default(),
            should_quit: false,
        };
        app.clamp_selection();
        app
    }

    /// Applies an action and keeps the cursor on the same task when it is
    /// still visible after re-sorting.
    fn dispatch(&mut self, action: Action) {
        let selected = self.selected_id();
        self.state.apply(action);
        let position = selected.and_then(|id| {
            self.state.visible().iter().position(|task| task.id == id)
        });
        match position {
            Some(i) => self.list_state.select(Some(i)),
            None => self.clamp_selection(),
        }
    }

    /// Keeps the selection inside the visible list after it changed shape.
    fn clamp_selection(&mut self) {
        let len = self.state.visible().len();
        let selected = match (len, self.list_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
        self.list_state.select(selected);
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.list_state
            .selected()
            .and_then(|i| self.state.visible().get(i).map(|task| task.id))
    }

    pub fn next_item(&mut self) {
        let len = self.state.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.state.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn open_draft(&mut self, field: DraftField) {
        let value = match field {
            DraftField::Text => self.state.draft.text.clone(),
            DraftField::DueDate => self.state.draft.due_date.clone(),
        };
        self.input.set(value);
        self.mode = InputMode::Draft(field);
    }

    pub fn begin_edit_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Some(task) = self.state.task(id) {
                self.input.set(task.text.clone());
                self.dispatch(Action::BeginEdit(id));
                self.mode = InputMode::EditText(id);
            }
        }
    }

    pub fn edit_selected_due_date(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Some(task) = self.state.task(id) {
                self.input.set(task.due_date.clone());
                self.mode = InputMode::EditDueDate(id);
            }
        }
    }

    fn with_selected(&mut self, action: impl FnOnce(TaskId) -> Action) {
        if let Some(id) = self.selected_id() {
            self.dispatch(action(id));
        }
    }

    /// Routes a key press through the current mode.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Draft(field) => self.handle_draft_key(field, key, modifiers),
            InputMode::EditText(id) => match key {
                KeyCode::Enter | KeyCode::Esc => {
                    self.input.take();
                    self.dispatch(Action::EndEdit(id));
                    self.mode = InputMode::Normal;
                }
                _ => {
                    if self.handle_input_key(key) {
                        let text = self.input.get_content().to_string();
                        self.dispatch(Action::EditText(id, text));
                    }
                }
            },
            InputMode::EditDueDate(id) => match key {
                KeyCode::Enter => {
                    let date = self.input.take();
                    self.dispatch(Action::ChangeDueDate(id, date));
                    self.mode = InputMode::Normal;
                }
                KeyCode::Esc => {
                    self.input.take();
                    self.mode = InputMode::Normal;
                }
                _ => {
                    self.handle_input_key(key);
                }
            },
            InputMode::Help => self.mode = InputMode::Normal,
        }
    }

    fn handle_normal_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('a') | KeyCode::Char('i') => {
                self.open_draft(DraftField::Text);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.next_item();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous_item();
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                self.with_selected(Action::ToggleComplete);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                self.begin_edit_selected();
            }
            KeyCode::Char('D') => {
                self.edit_selected_due_date();
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.with_selected(Action::Delete);
            }
            KeyCode::Char('p') => {
                if let Some(task) = self.selected_id().and_then(|id| self.state.task(id)) {
                    let action = Action::ChangePriority(task.id, task.priority.next());
                    self.dispatch(action);
                }
            }
            KeyCode::Char('c') => {
                if self.state.has_completed() {
                    self.dispatch(Action::ClearCompleted);
                }
            }
            KeyCode::Char('1') => self.dispatch(Action::SetFilter(Filter::All)),
            KeyCode::Char('2') => self.dispatch(Action::SetFilter(Filter::Active)),
            KeyCode::Char('3') => self.dispatch(Action::SetFilter(Filter::Completed)),
            KeyCode::Char('f') => {
                let next = self.state.filter.next();
                self.dispatch(Action::SetFilter(next));
            }
            KeyCode::Char('?') => {
                self.mode = InputMode::Help;
            }
            _ => {}
        }
    }

    fn handle_draft_key(&mut self, field: DraftField, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => {
                self.input.take();
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.dispatch(Action::Add);
                self.open_draft(DraftField::Text);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let other = match field {
                    DraftField::Text => DraftField::DueDate,
                    DraftField::DueDate => DraftField::Text,
                };
                self.open_draft(other);
            }
            KeyCode::Char('p') if modifiers.contains(KeyModifiers::CONTROL) => {
                let next = self.state.draft.priority.next();
                self.dispatch(Action::SetDraftPriority(next));
            }
            _ => {
                if self.handle_input_key(key) {
                    let value = self.input.get_content().to_string();
                    let action = match field {
                        DraftField::Text => Action::SetDraftText(value),
                        DraftField::DueDate => Action::SetDraftDueDate(value),
                    };
                    self.dispatch(action);
                }
            }
        }
    }

    /// Applies an editing key to the line editor. Returns true when the
    /// content changed.
    fn handle_input_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char(c) => {
                self.input.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                let before = self.input.content.len();
                self.input.delete_char();
                before != self.input.content.len()
            }
            KeyCode::Delete => {
                let before = self.input.content.len();
                self.input.delete_forward();
                before != self.input.content.len()
            }
            KeyCode::Left => {
                self.input.move_cursor_left();
                false
            }
            KeyCode::Right => {
                self.input.move_cursor_right();
                false
            }
            KeyCode::Home => {
                self.input.move_to_start_of_line();
                false
            }
            KeyCode::End => {
                self.input.move_to_end_of_line();
                false
            }
            _ => false,
        }
    }
}

pub fn run_tui(state: TodoState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(state);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    log::info!("session ended with {}", app.state.status_line());
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    render_draft(f, app, chunks[0]);
    render_tasks(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);

    if app.mode == InputMode::Help {
        let popup_area = centered_rect(60, 70, f.area());
        let block = Block::default()
            .title("Keys")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::DarkGray));
        let content = Paragraph::new(HELP_TEXT)
            .block(block)
            .style(Style::default().fg(Color::White));

        f.render_widget(Clear, popup_area);
        f.render_widget(content, popup_area);
    }
}

// Helper function to create centered rectangles for popups
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

fn editor_spans(editor: &LineEditor) -> Vec<Span<'static>> {
    let (before, at, after) = editor.split_at_cursor();
    vec![
        Span::styled(before, Style::default().fg(Color::White)),
        Span::styled(at, Style::default().bg(Color::Cyan).fg(Color::Black)),
        Span::styled(after, Style::default().fg(Color::White)),
    ]
}

fn render_draft(f: &mut Frame, app: &App, area: Rect) {
    let draft = &app.state.draft;
    let field_spans = |field: DraftField, value: &str, placeholder: &str| -> Vec<Span<'static>> {
        if app.mode == InputMode::Draft(field) {
            editor_spans(&app.input)
        } else if value.is_empty() {
            vec![Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))]
        } else {
            vec![Span::styled(value.to_string(), Style::default().fg(Color::White))]
        }
    };

    let mut spans = field_spans(DraftField::Text, &draft.text, "Add Todo");
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("[{}]", draft.priority),
        Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::raw("  Due: "));
    spans.extend(field_spans(DraftField::DueDate, &draft.due_date, "YYYY-MM-DD"));

    let border = if matches!(app.mode, InputMode::Draft(_)) {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("New Todo"),
    );
    f.render_widget(paragraph, area);
}

fn task_line(app: &App, task: &Task, today: chrono::NaiveDate) -> Line<'static> {
    let mut spans = vec![Span::raw(if task.completed { "[x] " } else { "[ ] " })];

    if app.state.is_editing(task.id) && matches!(app.mode, InputMode::EditText(_)) {
        spans.extend(editor_spans(&app.input));
    } else {
        let mut style = Style::default().fg(Color::White);
        if task.completed {
            style = style.add_modifier(Modifier::CROSSED_OUT).fg(Color::DarkGray);
        }
        spans.push(Span::styled(task.text.clone(), style));
    }

    let priority_color = match task.priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Blue,
    };
    spans.push(Span::styled(
        format!("  Priority: {}", task.priority),
        Style::default().fg(priority_color),
    ));

    if app.mode == InputMode::EditDueDate(task.id) {
        spans.push(Span::raw("  Due: "));
        spans.extend(editor_spans(&app.input));
    } else if !task.due_date.is_empty() {
        let color = if task.is_overdue(today) { Color::Red } else { Color::Green };
        spans.push(Span::styled(
            format!("  Due: {}", task.due_date),
            Style::default().fg(color),
        ));
    }

    Line::from(spans)
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let today = chrono::Local::now().date_naive();
    let items: Vec<ListItem> = {
        let app: &App = app;
        app.state
            .visible()
            .into_iter()
            .map(|task| ListItem::new(task_line(app, task, today)))
            .collect()
    };

    let title = format!("Todos ({})", app.state.filter);
    let tasks_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(tasks_list, area, &mut app.list_state);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let titles: Vec<Line> = Filter::VARIANTS
        .iter()
        .map(|filter| Line::from(filter.to_string()))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(app.state.status_line()))
        .select(app.state.filter.index())
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Black),
        );
    f.render_widget(tabs, chunks[0]);

    let mut hints = String::from("a: Add  ?: Help  q: Quit");
    if app.state.has_completed() {
        hints.push_str(&format!("  c: Clear Completed ({})", app.state.completed_count()));
    }
    let hints = Paragraph::new(hints)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    f.render_widget(hints, chunks[1]);
}
