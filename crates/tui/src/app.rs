use std::{collections::VecDeque, io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use fueltrack_core::{FleetError, FleetRegistry, FuelMonitors, LowFuelWarning, Vehicle};

use crate::form::{FormAction, FormModal, Submission};

const TICK_RATE: Duration = Duration::from_millis(250);
const HELP: &str = "a add vehicle · t record trip · r refill · m most efficient · ↑/↓ select · q quit";

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug)]
enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front end driving the fleet registry and its fuel monitors.
pub struct FuelTrackerApp {
    fleet: FleetRegistry,
    monitors: FuelMonitors,
    warnings_rx: Option<mpsc::Receiver<LowFuelWarning>>,
    state: UiState,
    form: Option<FormModal>,
    theme: Theme,
}

impl FuelTrackerApp {
    pub fn new(monitors: FuelMonitors, warning_history: usize) -> Self {
        Self {
            fleet: FleetRegistry::new(),
            monitors,
            warnings_rx: None,
            state: UiState::new(warning_history),
            form: None,
            theme: Theme::default(),
        }
    }

    pub fn attach_warnings(&mut self, receiver: mpsc::Receiver<LowFuelWarning>) {
        self.warnings_rx = Some(receiver);
    }

    /// Run the UI until the user quits. Every fuel monitor is stopped before
    /// the terminal is handed back.
    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = self.event_loop(&mut terminal, &mut event_rx).await;

        self.monitors.shutdown().await;
        info!(vehicles = self.fleet.len(), "Exiting tracker");
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        let mut warnings_rx = self.warnings_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let mut warnings_closed = false;
            if let Some(rx) = warnings_rx.as_mut() {
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_warning = rx.recv() => {
                        match maybe_warning {
                            Some(warning) => self.handle_warning(warning),
                            None => warnings_closed = true,
                        }
                    }
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }
            if warnings_closed {
                warnings_rx = None;
            }

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_warning(&mut self, warning: LowFuelWarning) {
        warn!(
            vehicle = %warning.vehicle,
            fuel_level = warning.fuel_level,
            "Low fuel"
        );
        self.state.push_warning(warning);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormAction::Continue => {}
                FormAction::Cancel => {
                    self.form = None;
                    self.state.set_status("Cancelled".to_string());
                }
                FormAction::Submit => self.submit_form(),
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.state.move_cursor(-1, self.fleet.len()),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_cursor(1, self.fleet.len()),
            KeyCode::Char('a') => self.form = Some(FormModal::add_vehicle()),
            KeyCode::Char('t') => self.open_vehicle_form(FormModal::record_trip),
            KeyCode::Char('r') => self.open_vehicle_form(FormModal::refill),
            KeyCode::Char('m') => self.show_most_efficient(),
            _ => {}
        }
    }

    fn open_vehicle_form(&mut self, build: fn(&Vehicle) -> FormModal) {
        if self.fleet.is_empty() {
            self.state.set_status("No vehicles added yet!".to_string());
            return;
        }
        match self.fleet.by_index(self.state.cursor) {
            Ok(vehicle) => self.form = Some(build(vehicle)),
            Err(err) => self.state.set_status(format!("Error: {err}")),
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let submission = match form.submission() {
            Ok(submission) => submission,
            Err(err) => {
                form.error = Some(err.to_string());
                return;
            }
        };
        self.form = None;

        match self.apply(submission) {
            Ok(message) => self.state.set_status(message),
            Err(err) => {
                warn!(%err, "Operation rejected");
                self.state.set_status(format!("Error: {err}"));
            }
        }
    }

    fn apply(&mut self, submission: Submission) -> Result<String, FleetError> {
        match submission {
            Submission::AddVehicle { name, kind } => {
                let vehicle = self.fleet.register(&name, kind)?;
                self.monitors.watch(vehicle);
                let name = vehicle.name().to_string();
                info!(vehicle = %name, %kind, "Vehicle registered");
                self.state.cursor = self.fleet.len() - 1;
                Ok(format!("Vehicle '{name}' added successfully!"))
            }
            Submission::RecordTrip {
                vehicle,
                distance,
                fuel_used,
            } => {
                let target = self.fleet.by_name_mut(&vehicle)?;
                let efficiency = target.add_trip(distance, fuel_used)?.efficiency();
                let fuel_left = target.fuel_level();
                info!(vehicle = %vehicle, distance, fuel_used, efficiency, "Trip recorded");
                Ok(format!(
                    "Trip added successfully! {efficiency:.2} km/l, fuel left: {fuel_left:.2} liters"
                ))
            }
            Submission::Refill {
                vehicle,
                current_level,
                amount,
                price_per_unit,
            } => {
                let target = self.fleet.by_name_mut(&vehicle)?;
                let previous = target.fuel_level();
                target.set_fuel_level(current_level)?;
                if let Err(err) = target.refill_fuel(amount, price_per_unit) {
                    target.set_fuel_level(previous)?;
                    return Err(err);
                }
                let fuel_level = target.fuel_level();
                info!(vehicle = %vehicle, amount, price_per_unit, fuel_level, "Fuel refilled");
                Ok(format!(
                    "Fuel updated successfully! {vehicle} holds {fuel_level:.2} liters"
                ))
            }
        }
    }

    fn show_most_efficient(&mut self) {
        let (name, efficiency) = match self.fleet.most_efficient() {
            Ok(vehicle) => (vehicle.name().to_string(), vehicle.overall_efficiency()),
            Err(FleetError::EmptyFleet) => {
                self.state.set_status("No vehicles added!".to_string());
                return;
            }
            Err(err) => {
                self.state.set_status(format!("Error: {err}"));
                return;
            }
        };
        if let Ok(position) = self.fleet.position(&name) {
            self.state.cursor = position;
        }
        debug!(vehicle = %name, efficiency, "Most efficient vehicle queried");
        self.state.set_status(format!(
            "Most Efficient Vehicle: {name} | Efficiency: {efficiency:.2} km/l"
        ));
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Min(6),
                Constraint::Length(8),
                Constraint::Length(4),
            ])
            .split(frame.size());

        self.draw_header(frame, chunks[0]);
        self.draw_vehicles(frame, chunks[1]);
        self.draw_trips(frame, chunks[2]);
        self.draw_warnings(frame, chunks[3]);
        self.draw_status(frame, chunks[4]);

        if let Some(form) = &self.form {
            self.draw_form(frame, form);
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let settings = self.monitors.settings();
        let line = Line::from(vec![
            Span::styled(
                "Vehicle Fuel Tracker",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ·  {} vehicles  ·  {} monitored  ·  warn below {:.1}",
                    self.fleet.len(),
                    self.monitors.len(),
                    settings.threshold
                ),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let header = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn draw_vehicles(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Vehicles");
        if self.fleet.is_empty() {
            let empty = Paragraph::new("No vehicles added yet! Press 'a' to add one.")
                .style(Style::default().fg(self.theme.muted))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let threshold = self.monitors.settings().threshold;
        let rows = self.fleet.iter().enumerate().map(|(idx, vehicle)| {
            let fuel_style = if vehicle.fuel_level() < threshold {
                Style::default().fg(self.theme.warning)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            Row::new(vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(vehicle.name().to_string()),
                Cell::from(vehicle.kind().label()),
                Cell::from(format_amount(vehicle.fuel_level())).style(fuel_style),
                Cell::from(format_amount(vehicle.total_fuel_added())),
                Cell::from(format_amount(vehicle.price_per_unit())),
                Cell::from(format_amount(vehicle.overall_efficiency())),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Min(15),
                Constraint::Length(6),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(9),
                Constraint::Length(11),
            ],
        )
        .header(header_row(
            &["S.No", "Name", "Type", "FuelExists", "TotalFuel", "Price/L", "Efficiency"],
            self.theme.accent,
        ))
        .block(block)
        .highlight_style(
            Style::default()
                .bg(self.theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        table_state.select(Some(self.state.cursor));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn draw_trips(&self, frame: &mut Frame, area: Rect) {
        let Ok(vehicle) = self.fleet.by_index(self.state.cursor) else {
            let block = Block::default().borders(Borders::ALL).title("Trips");
            frame.render_widget(block, area);
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Trips · {}", vehicle.name()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if vehicle.trips().is_empty() {
            let empty = Paragraph::new("No trips recorded for this vehicle.")
                .style(Style::default().fg(self.theme.muted));
            frame.render_widget(empty, inner);
            return;
        }

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let best = vehicle.best_trip();
        let rows = vehicle.list_trips().map(|(number, trip)| {
            let style = if best.is_some_and(|best| std::ptr::eq(best, trip)) {
                Style::default().fg(self.theme.success)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            Row::new(vec![
                Cell::from(number.to_string()),
                Cell::from(format_amount(trip.distance())),
                Cell::from(format_amount(trip.fuel_used())),
                Cell::from(format_amount(trip.efficiency())),
                Cell::from(
                    trip.recorded_at()
                        .with_timezone(&Local)
                        .format("%H:%M:%S")
                        .to_string(),
                ),
            ])
            .style(style)
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Length(13),
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Min(8),
            ],
        )
        .header(header_row(
            &["S.No", "Distance(km)", "FuelUsed", "Efficiency", "Recorded"],
            self.theme.accent,
        ));
        frame.render_widget(table, sections[0]);

        if let Some(best) = best {
            let summary = Paragraph::new(format!(
                "Most Efficient Trip: {:.2} km/l",
                best.efficiency()
            ))
            .style(Style::default().fg(self.theme.success));
            frame.render_widget(summary, sections[1]);
        }
    }

    fn draw_warnings(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = if self.state.warnings.is_empty() {
            vec![ListItem::new(Span::styled(
                "No low fuel warnings.",
                Style::default().fg(self.theme.muted),
            ))]
        } else {
            self.state
                .warnings
                .iter()
                .map(|warning| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            warning
                                .observed_at
                                .with_timezone(&Local)
                                .format("%H:%M:%S ")
                                .to_string(),
                            Style::default().fg(self.theme.muted),
                        ),
                        Span::styled(
                            format!(
                                "Warning: Low fuel in vehicle {} ({:.2} liters left)",
                                warning.vehicle, warning.fuel_level
                            ),
                            Style::default().fg(self.theme.warning),
                        ),
                    ]))
                })
                .collect()
        };
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Warnings"));
        frame.render_widget(list, area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                self.state.status.clone(),
                Style::default().fg(self.theme.primary_fg),
            )),
            Line::from(Span::styled(HELP, Style::default().fg(self.theme.muted))),
        ];
        let status = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, area);
    }

    fn draw_form(&self, frame: &mut Frame, form: &FormModal) {
        let error_lines = u16::from(form.error.is_some());
        let height = form.fields.len() as u16 * 2 + 4 + error_lines;
        let area = centered_rect(60, height, frame.size());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(form.title.clone())
            .border_style(Style::default().fg(self.theme.accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        for (idx, field) in form.fields.iter().enumerate() {
            let label_style = if idx == form.focus {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            lines.push(Line::from(Span::styled(field.label, label_style)));
            lines.push(Line::from(format!("> {}", field.input)));
        }
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.danger),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter next/submit · Tab switch field · Esc cancel",
            Style::default().fg(self.theme.muted),
        )));
        frame.render_widget(Paragraph::new(lines), inner);

        let field = form.focused();
        let x = inner.x + 2 + field.cursor as u16;
        let y = inner.y + form.focus as u16 * 2 + 1;
        if x < inner.right() && y < inner.bottom() {
            frame.set_cursor(x, y);
        }
    }
}

fn header_row<'a>(titles: &[&'a str], color: Color) -> Row<'a> {
    Row::new(titles.iter().copied().map(Cell::from).collect::<Vec<_>>()).style(
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    cursor: usize,
    status: String,
    warnings: VecDeque<LowFuelWarning>,
    warning_history: usize,
    should_quit: bool,
}

impl UiState {
    fn new(warning_history: usize) -> Self {
        Self {
            cursor: 0,
            status: "Press 'a' to add your first vehicle".to_string(),
            warnings: VecDeque::new(),
            warning_history: warning_history.max(1),
            should_quit: false,
        }
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    /// Newest first; the oldest entry falls off once the history is full.
    fn push_warning(&mut self, warning: LowFuelWarning) {
        self.warnings.push_front(warning);
        self.warnings.truncate(self.warning_history);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fueltrack_core::{MonitorSettings, VehicleKind};

    fn app() -> (FuelTrackerApp, mpsc::Receiver<LowFuelWarning>) {
        let (tx, rx) = mpsc::channel(16);
        let monitors = FuelMonitors::new(MonitorSettings::default(), tx);
        (FuelTrackerApp::new(monitors, 3), rx)
    }

    fn press(app: &mut FuelTrackerApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut FuelTrackerApp, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn add_vehicle(app: &mut FuelTrackerApp, name: &str, kind: VehicleKind) {
        app.apply(Submission::AddVehicle {
            name: name.to_string(),
            kind,
        })
        .expect("register vehicle");
    }

    fn warning(vehicle: &str) -> LowFuelWarning {
        LowFuelWarning {
            vehicle: vehicle.to_string(),
            fuel_level: 1.0,
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn registering_starts_a_monitor_and_selects_vehicle() {
        let (mut app, _rx) = app();
        add_vehicle(&mut app, "Civic", VehicleKind::Car);
        add_vehicle(&mut app, "Vespa", VehicleKind::Bike);

        assert!(app.monitors.is_watching("Civic"));
        assert!(app.monitors.is_watching("Vespa"));
        assert_eq!(app.state.cursor, 1);

        let err = app
            .apply(Submission::AddVehicle {
                name: "Civic".to_string(),
                kind: VehicleKind::Truck,
            })
            .unwrap_err();
        assert_eq!(err, FleetError::DuplicateName("Civic".to_string()));
        assert_eq!(app.monitors.len(), 2);
        app.monitors.shutdown().await;
    }

    #[tokio::test]
    async fn add_vehicle_through_keyboard() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(app.form.is_some());
        type_text(&mut app, "Actros");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "3");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_none());
        assert_eq!(app.fleet.by_name("Actros").map(Vehicle::kind), Ok(VehicleKind::Truck));
        assert!(app.state.status.contains("added successfully"));
        app.monitors.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_form_input_keeps_form_open() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        let form = app.form.as_ref().expect("form stays open");
        assert!(form.error.is_some());
        assert!(app.fleet.is_empty());
    }

    #[tokio::test]
    async fn refill_then_trip_updates_selected_vehicle() -> Result<()> {
        let (mut app, _rx) = app();
        add_vehicle(&mut app, "Civic", VehicleKind::Car);

        app.apply(Submission::Refill {
            vehicle: "Civic".to_string(),
            current_level: 0.0,
            amount: 10.0,
            price_per_unit: 1.5,
        })?;
        let message = app.apply(Submission::RecordTrip {
            vehicle: "Civic".to_string(),
            distance: 50.0,
            fuel_used: 5.0,
        })?;
        assert!(message.contains("5.00 liters"));

        let vehicle = app.fleet.by_name("Civic")?;
        assert_eq!(vehicle.fuel_level(), 5.0);
        assert_eq!(vehicle.total_fuel_added(), 10.0);
        assert_eq!(vehicle.overall_efficiency(), 10.0);
        app.monitors.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn rejected_refill_restores_previous_level() -> Result<()> {
        let (mut app, _rx) = app();
        add_vehicle(&mut app, "Civic", VehicleKind::Car);
        app.fleet.by_name_mut("Civic")?.refill_fuel(6.0, 1.0)?;

        let err = app
            .apply(Submission::Refill {
                vehicle: "Civic".to_string(),
                current_level: 2.0,
                amount: 0.0,
                price_per_unit: 1.0,
            })
            .unwrap_err();
        assert!(matches!(err, FleetError::InvalidAmount { .. }));
        assert_eq!(app.fleet.by_name("Civic")?.fuel_level(), 6.0);
        app.monitors.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn trip_without_fuel_reports_error() {
        let (mut app, _rx) = app();
        add_vehicle(&mut app, "Civic", VehicleKind::Car);

        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "10");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_none());
        assert!(app.state.status.starts_with("Error: not enough fuel"));
        app.monitors.shutdown().await;
    }

    #[tokio::test]
    async fn most_efficient_selects_the_winner() -> Result<()> {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state.status, "No vehicles added!");

        for (name, distance) in [("A", 80.0), ("B", 120.0)] {
            add_vehicle(&mut app, name, VehicleKind::Car);
            let vehicle = app.fleet.by_name_mut(name)?;
            vehicle.refill_fuel(10.0, 1.0)?;
            vehicle.add_trip(distance, 10.0)?;
        }
        app.state.cursor = 0;

        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state.cursor, 1);
        assert_eq!(
            app.state.status,
            "Most Efficient Vehicle: B | Efficiency: 12.00 km/l"
        );
        app.monitors.shutdown().await;
        Ok(())
    }

    #[test]
    fn vehicle_forms_need_a_vehicle() {
        let (tx, _rx) = mpsc::channel(1);
        let monitors = FuelMonitors::new(MonitorSettings::default(), tx);
        let mut app = FuelTrackerApp::new(monitors, 3);
        press(&mut app, KeyCode::Char('t'));
        assert!(app.form.is_none());
        assert_eq!(app.state.status, "No vehicles added yet!");
    }

    #[test]
    fn cursor_is_clamped_to_fleet() {
        let mut state = UiState::new(5);
        state.move_cursor(1, 0);
        assert_eq!(state.cursor, 0);
        state.move_cursor(5, 3);
        assert_eq!(state.cursor, 2);
        state.move_cursor(-10, 3);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn warning_history_is_bounded_newest_first() {
        let mut state = UiState::new(2);
        state.push_warning(warning("A"));
        state.push_warning(warning("B"));
        state.push_warning(warning("C"));
        let names: Vec<&str> = state.warnings.iter().map(|w| w.vehicle.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let (tx, _rx) = mpsc::channel(1);
        let monitors = FuelMonitors::new(MonitorSettings::default(), tx);
        let mut app = FuelTrackerApp::new(monitors, 3);
        assert!(app.process_app_event(Some(AppEvent::Tick)));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.state.should_quit);
        assert!(!app.process_app_event(None));
    }
}
