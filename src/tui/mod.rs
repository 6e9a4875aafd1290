//! Ratatui-based terminal UI.
//!
//! Space advances the simulation one year, q/Esc asks whether to show the
//! summary charts, and any key leaves the summary.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::warn;

use crate::domain::{Quantity, Series, YearStep};
use crate::error::AppError;
use crate::plot::value_of;
use crate::report::HYDRO_MESSAGE;
use crate::sim::YearStepper;

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Years listed in the history panel.
const HISTORY_ROWS: usize = 12;

/// Run the interactive simulation until the user quits.
///
/// `header` is shown above the simulation (data source, fit summary).
pub fn run(stepper: &mut YearStepper, header: &str) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(stepper, header);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    ConfirmSummary,
    Summary,
}

struct App<'a> {
    stepper: &'a mut YearStepper,
    header: &'a str,
    phase: Phase,
    last: YearStep,
    status: Option<String>,
}

impl<'a> App<'a> {
    fn new(stepper: &'a mut YearStepper, header: &'a str) -> Self {
        let last = stepper.current();
        Self {
            stepper,
            header,
            phase: Phase::Running,
            last,
            status: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the UI should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.phase {
            Phase::Running => match code {
                KeyCode::Char(' ') => self.advance(),
                KeyCode::Char('q') | KeyCode::Esc => self.phase = Phase::ConfirmSummary,
                _ => {}
            },
            Phase::ConfirmSummary => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.phase = Phase::Summary,
                _ => return true,
            },
            Phase::Summary => return true,
        }
        false
    }

    fn advance(&mut self) {
        match self.stepper.advance_year() {
            Ok(step) => {
                self.last = step;
                self.status = None;
            }
            Err(err) => {
                warn!(target: "climsim.tui", error = %err, "step rejected");
                self.status = Some(err.to_string());
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.phase {
            Phase::Summary => self.draw_summary(frame, chunks[1]),
            Phase::Running | Phase::ConfirmSummary => self.draw_body(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        if self.phase == Phase::ConfirmSummary {
            draw_confirm(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("climsim", Style::default().fg(Color::Cyan)),
                Span::raw(" - emission / deforestation / temperature"),
            ]),
            Line::from(Span::styled(self.header, Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_current(frame, chunks[0]);
        self.draw_history(frame, chunks[1]);
    }

    fn draw_current(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let step = &self.last;
        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![Span::styled("Year: ", label), Span::raw(step.year.to_string())]),
            Line::raw(""),
        ];
        for quantity in Quantity::ALL {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", quantity.label()), label),
                Span::raw(format!("{:.3} {}", value_of(step, quantity), quantity.unit())),
            ]));
        }
        if step.hydro {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(HYDRO_MESSAGE, Style::default().fg(Color::Red))));
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(ratatui::widgets::Wrap { trim: true })
            .block(Block::default().title("This year").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_history(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let history = self.stepper.history();
        let items: Vec<ListItem> = history
            .iter()
            .rev()
            .take(HISTORY_ROWS)
            .map(|s| {
                let style = if s.hydro {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                ListItem::new(format!(
                    "{}  {:>8.1}  {:>9.0}  {:>7.3}",
                    s.year, s.emission, s.deforestation, s.temperature
                ))
                .style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Year  Emission  Deforest.  Temp")
                .borders(Borders::ALL),
        );
        frame.render_widget(list, area);
    }

    fn draw_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        let series = [
            (Quantity::Emission, self.stepper.emission()),
            (Quantity::Deforestation, self.stepper.deforestation()),
            (Quantity::Temperature, self.stepper.temperature()),
        ];
        for ((quantity, values), rect) in series.into_iter().zip(chunks.iter()) {
            let highlights: Vec<(f64, f64)> = if quantity == Quantity::Deforestation {
                self.stepper
                    .hydro_years()
                    .iter()
                    .filter_map(|year| values.get(year).map(|&v| (*year as f64, v)))
                    .collect()
            } else {
                Vec::new()
            };
            draw_series_chart(frame, *rect, quantity, values, &highlights);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.phase {
            Phase::Running => "Space next year  q/Esc quit",
            Phase::ConfirmSummary => "y show summary  any other key exit",
            Phase::Summary => "any key exit",
        };
        let mut spans = vec![Span::styled(help, Style::default().fg(Color::Gray))];
        if let Some(status) = &self.status {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(status.as_str(), Style::default().fg(Color::Red)));
        }
        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_confirm(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let width = 40.min(area.width);
    let height = 3.min(area.height);
    let rect = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let p = Paragraph::new("Show summary chart? (y/n)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(Clear, rect);
    frame.render_widget(p, rect);
}

fn draw_series_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    quantity: Quantity,
    values: &Series,
    highlights: &[(f64, f64)],
) {
    let block = Block::default().title(quantity.label()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let points: Vec<(f64, f64)> = values.iter().map(|(&y, &v)| (y as f64, v)).collect();
    let (x_bounds, y_bounds) = chart_bounds(&points);
    let y_label = quantity.axis_label();

    let (chart_rect, insets) = chart_layout(inner);
    let widget = SeriesChart {
        points: &points,
        highlights,
        x_bounds,
        y_bounds,
        x_label: "Year",
        y_label: y_label.clone(),
        fmt_x: fmt_axis_year,
        fmt_y: fmt_axis_value,
    };

    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, &y_label);
    }
}

/// Padded bounds around the plotted points.
fn chart_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() {
        x_min = 0.0;
        x_max = 1.0;
    } else if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 4 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_year(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_value(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Year")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_title = Paragraph::new(y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.saturating_sub(insets.right),
        height: 1,
    };
    frame.render_widget(y_title, y_rect);
}
