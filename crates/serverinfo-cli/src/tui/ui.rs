//! TUI rendering — one table row per server.
//!
//! ┌ 📡 serverinfo  #42  2/3 online  18ms  every 1.0s ─────────┐
//! └───────────────────────────────────────────────────────────┘
//! ┌ Network speed ────────────────────────────────────────────┐
//! │ Server                      Incoming        Outgoing      │
//! │ http://10.0.0.5:8765        1.24 MB/s       88.20 KB/s    │
//! │ http://10.0.0.6:8765     disconnected    disconnected     │
//! └───────────────────────────────────────────────────────────┘
//!  q/Esc/Ctrl-C: quit

use super::app::MonitorApp;
use crate::poller::{Snapshot, TargetStatus};
use ratatui::{prelude::*, widgets::*};
use serverinfo_core::format_speed;

/// Shown in both rate columns for a server that did not answer this cycle.
pub const DISCONNECTED: &str = "disconnected";

/// Cell text for every row: server, incoming, outgoing.
pub fn snapshot_rows(snapshot: &Snapshot) -> Vec<[String; 3]> {
    snapshot
        .entries()
        .iter()
        .map(|(target, status)| match status {
            TargetStatus::Online(rates) => [
                target.clone(),
                rate_cell(rates.incoming),
                rate_cell(rates.outgoing),
            ],
            TargetStatus::Unreachable => [
                target.clone(),
                DISCONNECTED.to_string(),
                DISCONNECTED.to_string(),
            ],
        })
        .collect()
}

fn rate_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), format_speed)
}

pub fn draw(f: &mut Frame, app: &MonitorApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(4),    // table
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_table(f, rows[1], app);
    draw_keys(f, rows[2]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &MonitorApp) {
    let total = app.targets().len();
    let online = app.snapshot().map_or(0, Snapshot::online_count);
    let online_style = if online == total {
        Style::default().fg(Color::Green)
    } else if online == 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 📡 serverinfo ", Style::default().bold().fg(Color::Cyan)),
            Span::styled(
                format!(" #{} ", app.cycle_count()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!(" {online}/{total} online "), online_style),
            Span::styled(
                format!(
                    " {}ms  every {:.1}s  {} ",
                    app.last_cycle_ms(),
                    app.interval_secs(),
                    app.poller().unit()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_table(f: &mut Frame, area: Rect, app: &MonitorApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Network speed (nload-style) ");

    let Some(snapshot) = app.snapshot() else {
        let p = Paragraph::new("Waiting for the first poll…")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let items: Vec<Row> = snapshot
        .entries()
        .iter()
        .zip(snapshot_rows(snapshot))
        .map(|((_, status), [server, incoming, outgoing])| {
            let (in_style, out_style) = match status {
                TargetStatus::Online(_) => (
                    Style::default().fg(Color::Green),
                    Style::default().fg(Color::Yellow),
                ),
                TargetStatus::Unreachable => {
                    (Style::default().fg(Color::Red), Style::default().fg(Color::Red))
                }
            };
            Row::new(vec![
                Cell::from(server).style(Style::default().fg(Color::Gray)),
                Cell::from(Line::from(incoming).alignment(Alignment::Right)).style(in_style),
                Cell::from(Line::from(outgoing).alignment(Alignment::Right)).style(out_style),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("Server"),
        Cell::from(Line::from("Incoming").alignment(Alignment::Right)),
        Cell::from(Line::from("Outgoing").alignment(Alignment::Right)),
    ])
    .style(Style::default().bold().fg(Color::Cyan));

    let table = Table::new(
        items,
        [
            Constraint::Min(24),    // server
            Constraint::Length(16), // incoming
            Constraint::Length(16), // outgoing
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(" q/Esc/Ctrl-C: quit")
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}
