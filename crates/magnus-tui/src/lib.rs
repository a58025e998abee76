//! Terminal approvals console
//!
//! Renders the vendor-payments approval queue as a selectable table with
//! search, pagination and single/bulk actions, driven entirely by a
//! [`DashboardController`]. The terminal loop only reads controller state
//! and forwards keystrokes; refresh cadence and error isolation live in
//! the view core.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};
use thiserror::Error;
use tracing::debug;

use magnus_client::{ClientError, MagnusClient, VendorPaymentsFetcher};
use magnus_types::{InvoiceId, VendorInvoice};
use magnus_view::{
    ActionKey, CollectionFetcher, CollectionStatus, DashboardController, MemoryStorage,
    Notification, NotificationSeverity, Projection, QueryHistory, ViewPreset,
};

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// What the keyboard currently drives
enum InputMode {
    /// Keys are table commands
    Table,
    /// Keys edit the search query
    Search { draft: String, recall: usize },
}

struct TuiState {
    mode: InputMode,
    cursor: usize,
    status_line: String,
    status_is_error: bool,
}

impl TuiState {
    fn apply(&mut self, notification: Notification) {
        self.status_line = notification.message;
        self.status_is_error = notification.severity == NotificationSeverity::Error;
    }
}

/// Run the approvals console until the operator quits
///
/// `poll_interval` overrides the preset refresh cadence when given.
pub async fn run_approvals_tui(
    client: MagnusClient,
    poll_interval: Option<Duration>,
) -> Result<(), TuiError> {
    let fetcher: Arc<dyn CollectionFetcher<VendorInvoice>> =
        Arc::new(VendorPaymentsFetcher(client.clone()));
    let preset = match poll_interval {
        Some(interval) => ViewPreset {
            poll_interval: interval,
            ..ViewPreset::APPROVALS
        },
        None => ViewPreset::APPROVALS,
    };
    let controller = DashboardController::new(preset, fetcher);
    controller.hydrate().await;
    controller.start_polling();

    let notifications = controller.notifications();
    let history = QueryHistory::load(Arc::new(MemoryStorage::new()));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = TuiState {
        mode: InputMode::Table,
        cursor: 0,
        status_line: "connected".to_string(),
        status_is_error: false,
    };

    let result = loop {
        while let Ok(notification) = notifications.try_recv() {
            state.apply(notification);
        }

        let projection = controller.projection();
        if projection.rows.is_empty() {
            state.cursor = 0;
        } else {
            state.cursor = state.cursor.min(projection.rows.len() - 1);
        }

        terminal.draw(|frame| draw_ui(frame, &controller, &projection, &state))?;

        if !event::poll(Duration::from_millis(150))? {
            continue;
        }
        let CEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match &mut state.mode {
            InputMode::Search { draft, recall } => match key.code {
                KeyCode::Enter => {
                    let query = draft.clone();
                    if !query.is_empty() {
                        history.record(&query);
                    }
                    controller.set_query(&query);
                    state.mode = InputMode::Table;
                }
                KeyCode::Esc => {
                    state.mode = InputMode::Table;
                }
                KeyCode::Up => {
                    let entries = history.entries();
                    if let Some(record) = entries.get(*recall) {
                        *draft = record.query.clone();
                        *recall = (*recall + 1).min(entries.len().saturating_sub(1));
                    }
                }
                KeyCode::Backspace => {
                    draft.pop();
                }
                KeyCode::Char(c) => {
                    draft.push(c);
                }
                _ => {}
            },
            InputMode::Table => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => {
                    controller.stop_polling();
                    break Ok(());
                }
                KeyCode::Char('/') => {
                    state.mode = InputMode::Search {
                        draft: String::new(),
                        recall: 0,
                    };
                }
                KeyCode::Up => {
                    state.cursor = state.cursor.saturating_sub(1);
                }
                KeyCode::Down => {
                    if state.cursor + 1 < projection.rows.len() {
                        state.cursor += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(row) = projection.rows.get(state.cursor) {
                        controller.toggle_selected(row.invoice_id.as_str());
                    }
                }
                KeyCode::Char('*') => {
                    controller.select_all_visible();
                }
                KeyCode::Char('a') => {
                    if let Some(row) = projection.rows.get(state.cursor) {
                        let id = row.invoice_id.clone();
                        debug!(invoice = %id, "approve requested");
                        controller
                            .run_action("approve", id.as_str(), client.approve_payment(&id))
                            .await;
                    }
                }
                KeyCode::Char('r') => {
                    if let Some(row) = projection.rows.get(state.cursor) {
                        let id = row.invoice_id.clone();
                        debug!(invoice = %id, "reject requested");
                        controller
                            .run_action("reject", id.as_str(), client.reject_payment(&id))
                            .await;
                    }
                }
                KeyCode::Char('A') => {
                    let ids: Vec<InvoiceId> = controller
                        .selection()
                        .ids()
                        .into_iter()
                        .map(InvoiceId::from)
                        .collect();
                    if !ids.is_empty() {
                        debug!(count = ids.len(), "bulk approve requested");
                        controller
                            .run_bulk("bulk-approve", client.bulk_approve(&ids))
                            .await;
                    }
                }
                KeyCode::Char('R') => {
                    let ids: Vec<InvoiceId> = controller
                        .selection()
                        .ids()
                        .into_iter()
                        .map(InvoiceId::from)
                        .collect();
                    if !ids.is_empty() {
                        debug!(count = ids.len(), "bulk reject requested");
                        controller
                            .run_bulk("bulk-reject", client.bulk_reject(&ids))
                            .await;
                    }
                }
                KeyCode::Char('n') => {
                    controller.next_page();
                    state.cursor = 0;
                }
                KeyCode::Char('p') => {
                    controller.prev_page();
                    state.cursor = 0;
                }
                KeyCode::Char('c') => {
                    controller.clear_data().await;
                    state.cursor = 0;
                    state.status_line = "filters cleared, data refetched".to_string();
                    state.status_is_error = false;
                }
                _ => {}
            },
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn draw_ui(
    frame: &mut Frame<'_>,
    controller: &DashboardController<VendorInvoice>,
    projection: &Projection<VendorInvoice>,
    state: &TuiState,
) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, vertical[0], controller, projection);
    render_table(frame, vertical[1], controller, projection, state);
    render_footer(frame, vertical[2], state);
}

fn render_header(
    frame: &mut Frame<'_>,
    area: Rect,
    controller: &DashboardController<VendorInvoice>,
    projection: &Projection<VendorInvoice>,
) {
    let collection = controller.collection();
    let (status_label, status_style) = match collection.status {
        CollectionStatus::Idle => ("idle", Style::default().fg(Color::DarkGray)),
        CollectionStatus::Loading => ("refreshing", Style::default().fg(Color::Yellow)),
        CollectionStatus::Loaded => ("live", Style::default().fg(Color::Green)),
        CollectionStatus::Error => ("degraded, showing stale data", Style::default().fg(Color::Red)),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Magnus Approvals ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " page {}/{} | {} rows | {} selected | ",
            projection.page,
            projection.page_count,
            projection.total,
            controller.selection().len(),
        )),
        Span::styled(status_label, status_style),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_table(
    frame: &mut Frame<'_>,
    area: Rect,
    controller: &DashboardController<VendorInvoice>,
    projection: &Projection<VendorInvoice>,
    state: &TuiState,
) {
    let items: Vec<ListItem<'_>> = projection
        .rows
        .iter()
        .enumerate()
        .map(|(idx, invoice)| {
            let cursor = if idx == state.cursor { ">" } else { " " };
            let selected = if controller.selection().contains(invoice.invoice_id.as_str()) {
                "[x]"
            } else {
                "[ ]"
            };
            let pending = if controller
                .is_pending(&ActionKey::new("approve", invoice.invoice_id.as_str()))
                || controller.is_pending(&ActionKey::new("reject", invoice.invoice_id.as_str()))
            {
                " ..."
            } else {
                ""
            };
            let line = format!(
                "{} {} {} | {} | {} | {} | {}{}",
                cursor,
                selected,
                invoice.invoice_id,
                invoice.beneficiary_label(),
                invoice.amount,
                invoice.status,
                invoice.urgency(),
                pending,
            );
            let style = if idx == state.cursor {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = format!("Pending Payments ({})", projection.total);
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, state: &TuiState) {
    let content = match &state.mode {
        InputMode::Search { draft, .. } => format!("search: {draft}_  (Enter apply, Esc cancel, Up recall)"),
        InputMode::Table => format!(
            "space select | * select all | a/r approve/reject | A/R bulk | / search | n/p page | c clear | q quit   {}",
            state.status_line
        ),
    };
    let style = if state.status_is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let footer = Paragraph::new(Span::styled(content, style))
        .block(Block::default().borders(Borders::ALL).title("Hotkeys"));
    frame.render_widget(footer, area);
}
