// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use billdesk_app::{
    AppCommand, AppEvent, AppState, FilterState, FormField, FormKind, FormPayload,
    InvoicePreview, LineItemField, ModalKind, TAX_RATE, TotalsDisplay, ViewKind, format_currency,
};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const FOCUS_MARK: &str = "›";

/// Side effects the dashboard hands off. Every call happens before the
/// matching state transition so a failure can leave the form untouched.
pub trait AppRuntime {
    fn submit_form(&mut self, payload: &FormPayload) -> Result<()>;
    fn apply_filters(&mut self, view: ViewKind, filters: &FilterState) -> Result<()>;
    fn print_invoice(&mut self, preview: &InvoicePreview) -> Result<PathBuf>;
    fn send_invoice(&mut self, preview: &InvoicePreview) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    field_index: usize,
    help_visible: bool,
    body_scroll: u16,
    status_token: u64,
    totals: TotalsDisplay,
    area: Rect,
}

impl ViewData {
    fn new(state: &AppState) -> Self {
        Self {
            totals: state.totals_display(),
            ..Self::default()
        }
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(state);
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| {
            view_data.area = frame.area();
            render(frame, state, &view_data);
        }) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(state, runtime, &mut view_data, &internal_tx, mouse);
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    match state.modals.top() {
        None => handle_nav_key(state, runtime, view_data, internal_tx, key),
        Some(ModalKind::InvoicePreview) => {
            handle_preview_key(state, runtime, view_data, internal_tx, key);
        }
        Some(modal) => {
            if let Some(form) = modal.form() {
                handle_form_key(state, runtime, view_data, internal_tx, form, key);
            }
        }
    }

    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Char('f'), KeyModifiers::NONE) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::NextView, internal_tx);
        }
        (KeyCode::BackTab, _) | (KeyCode::Char('b'), KeyModifiers::NONE) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::PrevView, internal_tx);
        }
        (KeyCode::Char(ch), KeyModifiers::NONE) if ('1'..='5').contains(&ch) => {
            let index = usize::from(ch as u8 - b'1');
            if let Some(view) = ViewKind::ALL.get(index) {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::SetView(*view),
                    internal_tx,
                );
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => match state.active_view.form() {
            Some(form) => {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::OpenModal(form.modal()),
                    internal_tx,
                );
            }
            None => emit_status(state, view_data, internal_tx, "form unavailable"),
        },
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            cycle_status_filter(state, runtime, view_data, internal_tx, 1);
        }
        (KeyCode::Char('S'), _) => {
            cycle_status_filter(state, runtime, view_data, internal_tx, -1);
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            if state.active_view != ViewKind::Projects {
                let message = format!("no client filter on {}", state.active_view.label());
                emit_status(state, view_data, internal_tx, message);
                return;
            }
            if state.clients.is_empty() {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "no clients configured; add [ui] clients to the config",
                );
                return;
            }
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::CycleClientFilter(1),
                internal_tx,
            );
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            scroll_body(state, view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            scroll_body(state, view_data, -1);
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
}

fn cycle_status_filter<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let command = match state.active_view {
        ViewKind::Projects => AppCommand::CycleProjectStatusFilter(delta),
        ViewKind::Invoices => AppCommand::CycleInvoiceStatusFilter(delta),
        view => {
            let message = format!("no status filter on {}", view.label());
            emit_status(state, view_data, internal_tx, message);
            return;
        }
    };
    dispatch_and_refresh(state, runtime, view_data, command, internal_tx);
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    form: FormKind,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::CloseAllModals,
                internal_tx,
            );
        }
        (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::DismissTopModal,
                internal_tx,
            );
        }
        (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            let payload = state.form_payload(form);
            if let Err(error) = runtime.submit_form(&payload) {
                tracing::warn!(form = ?form, error = %error, "form submit failed");
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("save failed: {error}"),
                );
                return;
            }
            tracing::debug!(form = ?payload.kind(), "form submitted");
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::SubmitForm(form),
                internal_tx,
            );
        }
        (KeyCode::Tab, KeyModifiers::NONE) => {
            let status = move_field_focus(state, view_data, form, 1);
            emit_status(state, view_data, internal_tx, status);
        }
        (KeyCode::BackTab, _) => {
            let status = move_field_focus(state, view_data, form, -1);
            emit_status(state, view_data, internal_tx, status);
        }
        (KeyCode::Char('n'), KeyModifiers::CONTROL) if form == FormKind::Invoice => {
            let events = dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::AddLineItem,
                internal_tx,
            );
            let added = events.iter().find_map(|event| match event {
                AppEvent::LineItemAdded(id) => Some(*id),
                _ => None,
            });
            if let Some(id) = added {
                focus_field(
                    state,
                    view_data,
                    form,
                    FormField::LineItem(id, LineItemField::Description),
                );
            }
        }
        (KeyCode::Char('d'), KeyModifiers::CONTROL) if form == FormKind::Invoice => {
            let Some(FormField::LineItem(id, _)) = focused_field(state, view_data) else {
                emit_status(state, view_data, internal_tx, "focus a line item first");
                return;
            };
            let events = dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::RemoveLineItem(id),
                internal_tx,
            );
            if events.is_empty() {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "an invoice needs at least one line item",
                );
            }
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            edit_focused_field(state, runtime, view_data, internal_tx, |value| {
                value.clear();
            });
        }
        (KeyCode::Backspace, _) => {
            edit_focused_field(state, runtime, view_data, internal_tx, |value| {
                value.pop();
            });
        }
        (KeyCode::Left, _) => cycle_focused_choice(state, runtime, view_data, internal_tx, -1),
        (KeyCode::Right, _) => cycle_focused_choice(state, runtime, view_data, internal_tx, 1),
        (KeyCode::Char(ch), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            edit_focused_field(state, runtime, view_data, internal_tx, |value| {
                value.push(ch);
            });
        }
        _ => {}
    }
}

fn handle_preview_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::CloseAllModals,
                internal_tx,
            );
        }
        (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::DismissTopModal,
                internal_tx,
            );
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            let Some(preview) = state.preview.clone() else {
                return;
            };
            let status = match runtime.print_invoice(&preview) {
                Ok(path) => format!("invoice printed to {}", path.display()),
                Err(error) => format!("print failed: {error:#}"),
            };
            emit_status(state, view_data, internal_tx, status);
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            let Some(preview) = state.preview.clone() else {
                return;
            };
            if let Err(error) = runtime.send_invoice(&preview) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("send failed: {error:#}"),
                );
                return;
            }
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::MarkInvoiceSent,
                internal_tx,
            );
        }
        _ => {}
    }
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if view_data.help_visible {
                if !help_area(view_data.area).contains(position) {
                    view_data.help_visible = false;
                }
                return;
            }
            let Some(top) = state.modals.top() else {
                return;
            };
            if !overlay_area(top, view_data.area).contains(position) {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::DismissTopModal,
                    internal_tx,
                );
            }
        }
        MouseEventKind::ScrollDown => scroll_body(state, view_data, 1),
        MouseEventKind::ScrollUp => scroll_body(state, view_data, -1),
        _ => {}
    }
}

fn scroll_body(state: &AppState, view_data: &mut ViewData, delta: i32) {
    if state.modals.scroll_locked() {
        return;
    }
    view_data.body_scroll = if delta < 0 {
        view_data.body_scroll.saturating_sub(delta.unsigned_abs() as u16)
    } else {
        view_data.body_scroll.saturating_add(delta as u16)
    };
}

fn focused_field(state: &AppState, view_data: &ViewData) -> Option<FormField> {
    let form = state.modals.top()?.form()?;
    let fields = state.forms.fields(form);
    let index = view_data.field_index.min(fields.len().checked_sub(1)?);
    fields.get(index).copied()
}

fn sync_field_focus(state: &AppState, view_data: &mut ViewData) {
    let Some(form) = state.modals.top().and_then(ModalKind::form) else {
        view_data.field_index = 0;
        return;
    };
    let max_index = state.forms.fields(form).len().saturating_sub(1);
    view_data.field_index = view_data.field_index.min(max_index);
}

fn focus_field(state: &AppState, view_data: &mut ViewData, form: FormKind, field: FormField) {
    if let Some(index) = state
        .forms
        .fields(form)
        .iter()
        .position(|candidate| *candidate == field)
    {
        view_data.field_index = index;
    }
}

fn move_field_focus(
    state: &AppState,
    view_data: &mut ViewData,
    form: FormKind,
    delta: isize,
) -> String {
    let fields = state.forms.fields(form);
    if fields.is_empty() {
        return "form has no fields".to_owned();
    }
    let len = fields.len() as isize;
    let next = (view_data.field_index as isize + delta).rem_euclid(len) as usize;
    view_data.field_index = next;
    format!("field {}/{}: {}", next + 1, fields.len(), fields[next].label())
}

fn edit_focused_field<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    edit: impl FnOnce(&mut String),
) {
    let Some(field) = focused_field(state, view_data) else {
        return;
    };
    if field.is_choice() {
        let message = format!("left/right changes {}", field.label());
        emit_status(state, view_data, internal_tx, message);
        return;
    }
    let Some(mut value) = state.forms.value(field) else {
        return;
    };
    edit(&mut value);
    dispatch_and_refresh(
        state,
        runtime,
        view_data,
        AppCommand::SetField(field, value),
        internal_tx,
    );
}

fn cycle_focused_choice<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let Some(field) = focused_field(state, view_data) else {
        return;
    };
    if !field.is_choice() {
        return;
    }
    dispatch_and_refresh(
        state,
        runtime,
        view_data,
        AppCommand::CycleChoice(field, delta),
        internal_tx,
    );
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    let mut filter_error = None;
    for event in &events {
        match event {
            AppEvent::ViewChanged(view) => {
                view_data.body_scroll = 0;
                tracing::debug!(view = view.label(), "view changed");
            }
            AppEvent::ModalOpened(kind) => {
                if kind.form().is_some() {
                    view_data.field_index = 0;
                }
                tracing::debug!(modal = kind.title(), "modal opened");
            }
            AppEvent::ModalClosed(kind) => {
                tracing::debug!(modal = kind.title(), "modal closed");
            }
            AppEvent::ScrollLockChanged(locked) => {
                tracing::debug!(locked = *locked, "scroll lock changed");
            }
            AppEvent::FormReset(_) => view_data.field_index = 0,
            AppEvent::TotalsChanged(totals) => view_data.totals = totals.clone(),
            AppEvent::FiltersChanged(view) => {
                if let Err(error) = runtime.apply_filters(*view, &state.filters) {
                    filter_error = Some(format!("filter failed: {error:#}"));
                }
            }
            _ => {}
        }
    }
    sync_field_focus(state, view_data);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    if let Some(message) = filter_error {
        emit_status(state, view_data, internal_tx, message);
    }
    events
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.active_view)
        .unwrap_or(0);
    let tab_titles = ViewKind::ALL
        .iter()
        .enumerate()
        .map(|(index, view)| format!("{} {}", index + 1, view.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("billdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let body_style = if state.modals.scroll_locked() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let body = Paragraph::new(render_view_text(state))
        .style(body_style)
        .scroll((view_data.body_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active_view.label()),
        );
    frame.render_widget(body, layout[1]);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    for modal in state.modals.open_modals() {
        let area = overlay_area(*modal, frame.area());
        frame.render_widget(Clear, area);
        match modal {
            ModalKind::Project | ModalKind::Payment => {
                render_form_overlay(frame, area, state, view_data, *modal);
            }
            ModalKind::Invoice => render_invoice_overlay(frame, area, state, view_data),
            ModalKind::InvoicePreview => {
                let text = state
                    .preview
                    .as_ref()
                    .map(render_preview_overlay_text)
                    .unwrap_or_default();
                let preview = Paragraph::new(text).block(
                    Block::default()
                        .title(modal.title())
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Cyan)),
                );
                frame.render_widget(preview, area);
            }
        }
    }

    if view_data.help_visible {
        let area = help_area(frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_form_overlay(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
    modal: ModalKind,
) {
    let Some(form) = modal.form() else {
        return;
    };
    let focused = focused_field(state, view_data);
    let mut lines = state
        .forms
        .fields(form)
        .into_iter()
        .map(|field| form_field_line(state, field, focused == Some(field)))
        .collect::<Vec<_>>();
    lines.push(Line::default());
    lines.push(Line::styled(
        "enter save | ctrl+w cancel | esc close all",
        Style::default().fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(modal.title())
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White)),
    );
    frame.render_widget(widget, area);
}

fn render_invoice_overlay(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let block = Block::default()
        .title(ModalKind::Invoice.title())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(5),
        ])
        .split(inner);

    let focused = focused_field(state, view_data);
    let mut header = state
        .forms
        .fields(FormKind::Invoice)
        .into_iter()
        .filter(|field| matches!(field, FormField::Invoice(_)))
        .map(|field| form_field_line(state, field, focused == Some(field)))
        .collect::<Vec<_>>();
    header.push(Line::default());
    frame.render_widget(Paragraph::new(header), sections[0]);

    let highlight = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let rows = state
        .forms
        .invoice
        .draft
        .items()
        .iter()
        .map(|item| {
            let mut cells = LineItemField::ALL
                .into_iter()
                .map(|field| {
                    let cell = Cell::from(item.field(field).to_owned());
                    if focused == Some(FormField::LineItem(item.id, field)) {
                        cell.style(highlight)
                    } else {
                        cell
                    }
                })
                .collect::<Vec<_>>();
            cells.push(Cell::from(format_currency(item.line_total())));
            Row::new(cells)
        })
        .collect::<Vec<_>>();
    let header_row = Row::new(
        LineItemField::ALL
            .into_iter()
            .map(LineItemField::label)
            .chain(["amount"]),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(46),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header_row)
    .block(Block::default().borders(Borders::TOP).title("line items"));
    frame.render_widget(table, sections[1]);

    let totals = Paragraph::new(render_totals_text(&view_data.totals))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(totals, sections[2]);
}

fn form_field_line(state: &AppState, field: FormField, focused: bool) -> Line<'static> {
    let value = state.forms.value(field).unwrap_or_default();
    let value = if field.is_choice() {
        format!("< {value} >")
    } else {
        value
    };
    let mark = if focused { FOCUS_MARK } else { " " };
    let text = format!("{mark} {:<14} {value}", field.label());
    if focused {
        Line::styled(
            text,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Line::from(text)
    }
}

fn render_totals_text(totals: &TotalsDisplay) -> String {
    [
        format!("subtotal {}", totals.subtotal),
        format!("tax ({:.0}%) {}", TAX_RATE * 100.0, totals.tax),
        format!("total {}", totals.total),
        "ctrl+n add row | ctrl+d remove row | enter create".to_owned(),
    ]
    .join("\n")
}

fn render_preview_overlay_text(preview: &InvoicePreview) -> String {
    format!(
        "{}\n\np print | s send | ctrl+w close | esc close all",
        preview.render_text()
    )
}

fn render_view_text(state: &AppState) -> String {
    let filters = &state.filters;
    let lines = match state.active_view {
        ViewKind::Dashboard => vec![
            "overview".to_owned(),
            String::new(),
            format!("clients: {}", state.clients.len()),
            format!(
                "project filters: status {} | client {}",
                filters.project_status_label(),
                filters.client_label()
            ),
            format!("invoice filter: status {}", filters.invoice_status_label()),
            String::new(),
            "1-5 or tab to switch views | ? help".to_owned(),
        ],
        ViewKind::Projects => vec![
            format!(
                "filters: status {} | client {}",
                filters.project_status_label(),
                filters.client_label()
            ),
            String::new(),
            "a add project | s/S status filter | c client filter".to_owned(),
        ],
        ViewKind::Invoices => vec![
            format!("filter: status {}", filters.invoice_status_label()),
            String::new(),
            "a create invoice | s/S status filter".to_owned(),
        ],
        ViewKind::Payments => vec!["a record payment".to_owned()],
        ViewKind::Reports => vec!["no reports yet".to_owned()],
    };
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: tab/f next view | shift+tab/b previous view | 1-5 jump | j/k scroll\n\
nav: a add (projects, invoices, payments) | s/S status filter | c client filter\n\
form: tab/shift+tab field | type to edit | backspace | ctrl+u clear | left/right choose\n\
form: enter or ctrl+s submit | ctrl+w cancel | esc close all\n\
invoice: ctrl+n add line item | ctrl+d remove focused line item\n\
preview: p print | s send | ctrl+w close | esc close all\n\
mouse: click outside an overlay to close it"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let (mode, hints) = match state.modals.top() {
        None => ("NAV", "tab/1-5 views | a add | s/c filter | ? help | ctrl+q"),
        Some(ModalKind::InvoicePreview) => ("PREVIEW", "p print | s send | esc close"),
        Some(_) => ("FORM", "tab field | enter save | esc close"),
    };
    let mut default = hints.to_owned();
    if let Some(field) = focused_field(state, view_data) {
        default = format!("{} | {default}", field.label());
    }
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn overlay_area(modal: ModalKind, area: Rect) -> Rect {
    match modal {
        ModalKind::Project | ModalKind::Payment => centered_rect(60, 60, area),
        ModalKind::Invoice => centered_rect(80, 80, area),
        ModalKind::InvoicePreview => centered_rect(70, 70, area),
    }
}

fn help_area(area: Rect) -> Rect {
    centered_rect(80, 60, area)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, handle_key_event, handle_mouse_event,
        help_overlay_text, overlay_area, process_internal_events, render_view_text, status_text,
    };
    use anyhow::{Result, bail};
    use billdesk_app::{
        AppState, FilterState, FormKind, FormPayload, InvoicePreview, ModalKind, ProjectStatus,
        ViewKind,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::layout::Rect;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use time::{Date, Month};

    #[derive(Debug, Default)]
    struct TestRuntime {
        submitted: Vec<FormPayload>,
        filters_applied: Vec<(ViewKind, FilterState)>,
        printed: Vec<InvoicePreview>,
        sent: usize,
        fail_submit: bool,
    }

    impl AppRuntime for TestRuntime {
        fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
            if self.fail_submit {
                bail!("disk full");
            }
            self.submitted.push(payload.clone());
            Ok(())
        }

        fn apply_filters(&mut self, view: ViewKind, filters: &FilterState) -> Result<()> {
            self.filters_applied.push((view, filters.clone()));
            Ok(())
        }

        fn print_invoice(&mut self, preview: &InvoicePreview) -> Result<PathBuf> {
            self.printed.push(preview.clone());
            Ok(PathBuf::from("/prints/invoice-2026-10-16.txt"))
        }

        fn send_invoice(&mut self, _preview: &InvoicePreview) -> Result<()> {
            self.sent += 1;
            Ok(())
        }
    }

    fn state() -> AppState {
        AppState::new(Date::from_calendar_date(2026, Month::October, 16).expect("valid date"))
    }

    fn view_data_for_test(state: &AppState) -> ViewData {
        ViewData {
            area: Rect::new(0, 0, 100, 40),
            ..ViewData::new(state)
        }
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn chars(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn run_key_script(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        keys: &[KeyEvent],
    ) {
        let tx = internal_tx();
        for key in keys {
            let _ = handle_key_event(state, runtime, view_data, &tx, *key);
        }
    }

    #[test]
    fn tab_and_digits_switch_views() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Tab)]);
        assert_eq!(state.active_view, ViewKind::Projects);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('5'))],
        );
        assert_eq!(state.active_view, ViewKind::Reports);

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('f'))]);
        assert_eq!(state.active_view, ViewKind::Dashboard);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)],
        );
        assert_eq!(state.active_view, ViewKind::Reports);
    }

    #[test]
    fn ctrl_q_quits() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);
        let tx = internal_tx();

        assert!(handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            ctrl('q')
        ));
    }

    #[test]
    fn add_key_opens_view_form_or_reports_unavailable() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('a'))]);
        assert_eq!(state.status_line.as_deref(), Some("form unavailable"));
        assert!(!state.modals.scroll_locked());

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('4')), key(KeyCode::Char('a'))],
        );
        assert_eq!(state.modals.top(), Some(ModalKind::Payment));
        assert!(state.modals.scroll_locked());
    }

    #[test]
    fn typing_into_line_items_updates_rendered_totals() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('3')), key(KeyCode::Char('a'))];
        keys.extend(std::iter::repeat_n(key(KeyCode::Tab), 5));
        keys.push(key(KeyCode::Backspace));
        keys.extend(chars("2"));
        keys.push(key(KeyCode::Tab));
        keys.extend(chars("10.00"));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(view_data.totals.subtotal, "$20.00");
        assert_eq!(view_data.totals.tax, "$2.00");
        assert_eq!(view_data.totals.total, "$22.00");
    }

    #[test]
    fn ctrl_n_adds_row_and_focuses_it_and_ctrl_d_removes_it() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('3')), key(KeyCode::Char('a')), ctrl('n')],
        );
        assert_eq!(state.forms.invoice.draft.len(), 2);
        assert_eq!(view_data.field_index, 7);

        run_key_script(&mut state, &mut runtime, &mut view_data, &chars("Hosting"));
        assert_eq!(state.forms.invoice.draft.items()[1].description, "Hosting");

        run_key_script(&mut state, &mut runtime, &mut view_data, &[ctrl('d')]);
        assert_eq!(state.forms.invoice.draft.len(), 1);
        assert_eq!(view_data.field_index, 6);
    }

    #[test]
    fn removing_the_last_row_reports_refusal() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('3')), key(KeyCode::Char('a'))];
        keys.extend(std::iter::repeat_n(key(KeyCode::Tab), 4));
        keys.push(ctrl('d'));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(state.forms.invoice.draft.len(), 1);
        assert_eq!(
            state.status_line.as_deref(),
            Some("an invoice needs at least one line item")
        );
    }

    #[test]
    fn escape_closes_every_modal_and_unlocks_scroll() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[
                key(KeyCode::Char('3')),
                key(KeyCode::Char('a')),
                key(KeyCode::Enter),
            ],
        );
        assert_eq!(
            state.modals.open_modals(),
            &[ModalKind::Invoice, ModalKind::InvoicePreview]
        );

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        assert!(state.modals.open_modals().is_empty());
        assert!(!state.modals.scroll_locked());
        assert!(state.preview.is_none());
    }

    #[test]
    fn project_submit_saves_notifies_and_closes() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('2')), key(KeyCode::Char('a'))];
        keys.extend(chars("Brand refresh"));
        keys.push(key(KeyCode::Tab));
        keys.push(key(KeyCode::Tab));
        keys.push(key(KeyCode::Right));
        keys.push(key(KeyCode::Enter));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        let [FormPayload::Project(project)] = runtime.submitted.as_slice() else {
            panic!("expected one project payload, got {:?}", runtime.submitted);
        };
        assert_eq!(project.name, "Brand refresh");
        assert_eq!(project.status, ProjectStatus::OnHold);
        assert_eq!(
            state.status_line.as_deref(),
            Some("Project added successfully!")
        );
        assert!(!state.modals.is_open(ModalKind::Project));
        assert_eq!(state.forms.project.name, "");
    }

    #[test]
    fn failed_submit_keeps_form_open_and_intact() {
        let mut state = state();
        let mut runtime = TestRuntime {
            fail_submit: true,
            ..TestRuntime::default()
        };
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('4')), key(KeyCode::Char('a'))];
        keys.extend(chars("Acme"));
        keys.push(ctrl('s'));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(state.status_line.as_deref(), Some("save failed: disk full"));
        assert!(state.modals.is_open(ModalKind::Payment));
        assert_eq!(state.forms.payment.client, "Acme");
    }

    #[test]
    fn typing_on_a_choice_field_hints_at_arrows() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('4')), key(KeyCode::Char('a'))];
        keys.push(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        keys.extend(chars("x"));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(
            state.status_line.as_deref(),
            Some("left/right changes method")
        );
        assert_eq!(state.forms.payment.method.as_str(), "bank_transfer");
    }

    #[test]
    fn preview_print_and_send() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('3')), key(KeyCode::Char('a'))];
        keys.extend(chars("Acme"));
        keys.push(key(KeyCode::Enter));
        keys.push(key(KeyCode::Char('p')));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(runtime.printed.len(), 1);
        assert_eq!(runtime.printed[0].client, "Acme");
        assert_eq!(
            state.status_line.as_deref(),
            Some("invoice printed to /prints/invoice-2026-10-16.txt")
        );

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('s'))]);
        assert_eq!(runtime.sent, 1);
        assert_eq!(
            state.status_line.as_deref(),
            Some("Invoice sent to client successfully!")
        );
        assert_eq!(state.modals.top(), Some(ModalKind::Invoice));
    }

    #[test]
    fn click_outside_dismisses_only_the_top_overlay() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);
        let tx = internal_tx();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('2')), key(KeyCode::Char('a'))],
        );
        let area = overlay_area(ModalKind::Project, view_data.area);

        handle_mouse_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            click(area.x + 1, area.y + 1),
        );
        assert!(state.modals.is_open(ModalKind::Project));

        handle_mouse_event(&mut state, &mut runtime, &mut view_data, &tx, click(0, 0));
        assert!(!state.modals.is_open(ModalKind::Project));
        assert!(!state.modals.scroll_locked());
    }

    #[test]
    fn body_scroll_is_suppressed_while_a_modal_is_open() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);
        let tx = internal_tx();
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 10,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('2'))]);
        handle_mouse_event(&mut state, &mut runtime, &mut view_data, &tx, wheel);
        assert_eq!(view_data.body_scroll, 1);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('a')), key(KeyCode::Char('j'))],
        );
        handle_mouse_event(&mut state, &mut runtime, &mut view_data, &tx, wheel);
        assert_eq!(view_data.body_scroll, 1);
        assert_eq!(state.forms.project.name, "j");
    }

    #[test]
    fn filter_keys_apply_through_runtime() {
        let mut state = state();
        state.clients = vec!["Acme".to_owned()];
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[
                key(KeyCode::Char('2')),
                key(KeyCode::Char('s')),
                key(KeyCode::Char('c')),
                key(KeyCode::Char('3')),
                key(KeyCode::Char('s')),
            ],
        );

        let views = runtime
            .filters_applied
            .iter()
            .map(|(view, _)| *view)
            .collect::<Vec<_>>();
        assert_eq!(
            views,
            vec![ViewKind::Projects, ViewKind::Projects, ViewKind::Invoices]
        );
        let (_, last) = &runtime.filters_applied[1];
        assert_eq!(last.client.as_deref(), Some("Acme"));
        assert_eq!(last.project_status, Some(ProjectStatus::Active));
    }

    #[test]
    fn client_filter_without_clients_reports_hint() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('2')), key(KeyCode::Char('c'))],
        );
        assert!(runtime.filters_applied.is_empty());
        assert_eq!(
            state.status_line.as_deref(),
            Some("no clients configured; add [ui] clients to the config")
        );
    }

    #[test]
    fn stale_status_clear_tokens_are_ignored() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);
        let (tx, rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('a')),
        );
        let token = view_data.status_token;

        tx.send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("send stale token");
        process_internal_events(&mut state, &mut view_data, &rx);
        assert_eq!(state.status_line.as_deref(), Some("form unavailable"));

        tx.send(InternalEvent::ClearStatus { token })
            .expect("send current token");
        process_internal_events(&mut state, &mut view_data, &rx);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn help_toggles_and_hides_status() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('?'))]);
        assert!(view_data.help_visible);
        assert_eq!(status_text(&state, &view_data), "");
        assert!(help_overlay_text().contains("ctrl+n add line item"));

        run_key_script(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        assert!(!view_data.help_visible);
    }

    #[test]
    fn status_text_names_mode_and_focused_field() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);
        assert!(status_text(&state, &view_data).starts_with("NAV | "));

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('2')), key(KeyCode::Char('a'))],
        );
        assert!(status_text(&state, &view_data).starts_with("FORM | project name | "));
    }

    #[test]
    fn view_text_reflects_filter_selection() {
        let mut state = state();
        state.active_view = ViewKind::Invoices;
        assert!(render_view_text(&state).contains("filter: status all"));

        state.filters.invoice_status = Some(billdesk_app::InvoiceStatus::Paid);
        assert!(render_view_text(&state).contains("filter: status paid"));
    }

    #[test]
    fn invoice_submit_passes_preview_payload_to_runtime() {
        let mut state = state();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test(&state);

        let mut keys = vec![key(KeyCode::Char('3')), key(KeyCode::Char('a'))];
        keys.extend(std::iter::repeat_n(key(KeyCode::Tab), 6));
        keys.extend(chars("40"));
        keys.push(key(KeyCode::Enter));
        run_key_script(&mut state, &mut runtime, &mut view_data, &keys);

        let [FormPayload::Invoice(preview)] = runtime.submitted.as_slice() else {
            panic!("expected one invoice payload, got {:?}", runtime.submitted);
        };
        assert_eq!(preview.totals.display().total, "$44.00");
        assert_eq!(runtime.submitted[0].kind(), FormKind::Invoice);
        assert_eq!(view_data.totals.total, "$0.00");
    }
}
