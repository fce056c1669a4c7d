//! Draw functions for each wizard screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use syswiz_core::exec::ExecOutcome;
use syswiz_core::navigator::EntryKind;

use super::app::{App, ExecPhase, MenuRow, Screen};

const LOGO: &str = r"
 ___ _   _ ___     __      _(_)____
/ __| | | / __|____\ \ /\ / / |_  /
\__ \ |_| \__ \_____\ V  V /| |/ /
|___/\__, |___/      \_/\_/ |_/___|
     |___/
";

pub fn draw(f: &mut Frame, app: &App) {
    match app.screen {
        Screen::Splash => draw_splash(f, app),
        Screen::Menu => draw_menu(f, app),
        Screen::Input => draw_input(f, app),
        Screen::Execution => draw_execution(f, app),
    }
}

fn draw_splash(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(8),  // Logo
                Constraint::Length(5),  // System info
                Constraint::Min(0),     // Description
                Constraint::Length(3),  // Key hints
            ]
            .as_ref(),
        )
        .split(f.area());

    let logo = Paragraph::new(LOGO)
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title("syswiz"));
    f.render_widget(logo, chunks[0]);

    let user = if app.elevate { "user" } else { "root" };
    let info_lines = vec![
        Line::from(format!(
            "OS:   {} {}",
            app.system_info.os, app.system_info.os_version
        )),
        Line::from(format!("DNF:  {}", app.system_info.dnf_version)),
        Line::from(format!("User: {user}")),
    ];
    let info = Paragraph::new(info_lines)
        .block(Block::default().borders(Borders::ALL).title("System"));
    f.render_widget(info, chunks[1]);

    let mut desc_lines = vec![
        Line::from("A transparent, guided wizard for Fedora package management."),
        Line::from("Every command is shown in full before anything runs."),
    ];
    if app.dry_run {
        desc_lines.push(Line::from(Span::styled(
            "Dry-run mode: commands will be previewed but never executed.",
            Style::default().fg(Color::Yellow),
        )));
    }
    let desc = Paragraph::new(desc_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("About"));
    f.render_widget(desc, chunks[2]);

    draw_hints(f, chunks[3], "Enter: continue | q/Esc: quit");
}

fn draw_menu(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Breadcrumb trail
                Constraint::Min(0),    // Entries
                Constraint::Length(3), // Key hints
            ]
            .as_ref(),
        )
        .split(f.area());

    let trail = Paragraph::new(app.nav.trail())
        .block(Block::default().borders(Borders::ALL).title("Main Menu"));
    f.render_widget(trail, chunks[0]);

    let items: Vec<ListItem> = app
        .menu_rows()
        .iter()
        .map(|row| match row {
            MenuRow::Back => ListItem::new(Line::from(".. [Go Back]")),
            MenuRow::Entry(entry) => match entry.kind {
                EntryKind::Category => ListItem::new(Line::from(format!("📂 {}", entry.label))),
                EntryKind::Operation { risky: true } => ListItem::new(Line::from(Span::styled(
                    format!("⚠️  {}", entry.label),
                    Style::default().fg(Color::Red),
                ))),
                EntryKind::Operation { risky: false } => {
                    ListItem::new(Line::from(format!("🔧 {}", entry.label)))
                }
            },
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, chunks[1], &mut state);

    draw_hints(
        f,
        chunks[2],
        "↑/↓: move | Enter: select | Esc: back | q: quit",
    );
}

fn draw_input(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Prompt
                Constraint::Length(3), // Text field
                Constraint::Length(2), // Error line
                Constraint::Min(0),
                Constraint::Length(3), // Key hints
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = match app.pending_title() {
        Some(title) => format!("Input required for: {title}"),
        None => "Input required".to_string(),
    };
    let header = Paragraph::new(app.input_prompt())
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(header, chunks[0]);

    let field = Paragraph::new(app.input.value())
        .block(Block::default().borders(Borders::ALL).title("Value"));
    f.render_widget(field, chunks[1]);
    // Place the cursor inside the field border.
    let x = chunks[1].x + 1 + app.input.value()[..app.input.cursor()].chars().count() as u16;
    f.set_cursor_position((x, chunks[1].y + 1));

    if let Some(ref message) = app.input_error {
        let error = Paragraph::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ));
        f.render_widget(error, chunks[2]);
    }

    draw_hints(f, chunks[4], "Enter: continue | Esc: cancel");
}

fn draw_execution(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(4), // Operation header
                Constraint::Length(3), // Command preview
                Constraint::Min(0),    // Output log
                Constraint::Length(3), // Status + key hints
            ]
            .as_ref(),
        )
        .split(f.area());

    let Some(rendered) = app.rendered.as_ref() else {
        return;
    };

    let mut header_lines = vec![Line::from(rendered.description.clone())];
    if rendered.is_risky {
        header_lines.push(Line::from(Span::styled(
            "⚠️  This operation is destructive or hard to reverse.",
            Style::default().fg(Color::Red),
        )));
    }
    let header = Paragraph::new(header_lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Operation: {}", rendered.title)),
    );
    f.render_widget(header, chunks[0]);

    let preview = Paragraph::new(format!("$ {}", rendered.command_line(app.elevate)))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Executable Command"),
        );
    f.render_widget(preview, chunks[1]);

    // Tail of the log; the channel has already merged stdout and stderr.
    let log_area = chunks[2];
    let visible = log_area.height.saturating_sub(2) as usize;
    let start = app.log.len().saturating_sub(visible);
    let log_items: Vec<ListItem> = app.log[start..]
        .iter()
        .map(|line| ListItem::new(line.clone()))
        .collect();
    let log = List::new(log_items).block(Block::default().borders(Borders::ALL).title("Output"));
    f.render_widget(log, log_area);

    let (status, hints) = execution_status(app);
    let footer = Paragraph::new(status).block(Block::default().borders(Borders::ALL).title(hints));
    f.render_widget(footer, chunks[3]);
}

fn execution_status(app: &App) -> (Line<'static>, String) {
    match app.exec_phase {
        ExecPhase::Confirm => {
            let status = match app.exec_note {
                Some(ref note) => Line::from(Span::styled(
                    note.clone(),
                    Style::default().fg(Color::Yellow),
                )),
                None => Line::from("Review the command above, then proceed or cancel."),
            };
            (status, "Enter: proceed | Esc: cancel".to_string())
        }
        ExecPhase::Running => (
            Line::from(Span::styled(
                "Running... output streams live; the operation cannot be interrupted.",
                Style::default().fg(Color::Yellow),
            )),
            "please wait".to_string(),
        ),
        ExecPhase::Done => {
            let status = match app.result.as_ref().map(|r| &r.outcome) {
                Some(ExecOutcome::Exited(0)) => Line::from(Span::styled(
                    "SUCCESS: Operation completed.",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )),
                Some(ExecOutcome::Exited(code)) => Line::from(Span::styled(
                    format!("FAILURE: Process exited with code {code}."),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Some(ExecOutcome::LaunchFailed(cause)) => Line::from(Span::styled(
                    format!("FAILURE: {cause}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                None => Line::from("No result recorded."),
            };
            (status, "Enter: back to menu".to_string())
        }
    }
}

fn draw_hints(f: &mut Frame, area: Rect, hints: &str) {
    let footer = Paragraph::new(hints.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
