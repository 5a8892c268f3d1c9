//! Modal input forms for registering vehicles, trips and refills.

use anyhow::{anyhow, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fueltrack_core::{Vehicle, VehicleKind};

const MAX_FIELD_LEN: usize = 32;

/// What the form collects, and for which vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    AddVehicle,
    RecordTrip { vehicle: String },
    Refill { vehicle: String },
}

/// Parsed, ready-to-apply form contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    AddVehicle {
        name: String,
        kind: VehicleKind,
    },
    RecordTrip {
        vehicle: String,
        distance: f64,
        fuel_used: f64,
    },
    Refill {
        vehicle: String,
        current_level: f64,
        amount: f64,
        price_per_unit: f64,
    },
}

/// Outcome of feeding a key to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub input: String,
    pub cursor: usize,
}

impl FormField {
    fn new(label: &'static str, initial: String) -> Self {
        let cursor = initial.len();
        Self {
            label,
            input: initial,
            cursor,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len);
        self.cursor = next as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_FIELD_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }
}

/// A titled set of text fields with one focused field.
#[derive(Debug, Clone)]
pub struct FormModal {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormModal {
    pub fn add_vehicle() -> Self {
        Self::new(
            FormKind::AddVehicle,
            "Add Vehicle".to_string(),
            vec![
                FormField::new("Vehicle name", String::new()),
                FormField::new("Type (1.CAR 2.BIKE 3.TRUCK)", String::new()),
            ],
        )
    }

    pub fn record_trip(vehicle: &Vehicle) -> Self {
        Self::new(
            FormKind::RecordTrip {
                vehicle: vehicle.name().to_string(),
            },
            format!("Record Trip · {}", vehicle.name()),
            vec![
                FormField::new("Distance traveled (km)", String::new()),
                FormField::new("Fuel used (liters)", String::new()),
            ],
        )
    }

    /// The current level and price fields start out with the vehicle's values.
    pub fn refill(vehicle: &Vehicle) -> Self {
        Self::new(
            FormKind::Refill {
                vehicle: vehicle.name().to_string(),
            },
            format!("Refill Fuel · {}", vehicle.name()),
            vec![
                FormField::new("Current fuel (liters)", format_input(vehicle.fuel_level())),
                FormField::new("Fuel added (liters)", String::new()),
                FormField::new("Price per litre", format_input(vehicle.price_per_unit())),
            ],
        )
    }

    fn new(kind: FormKind, title: String, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title,
            fields,
            focus: 0,
            error: None,
        }
    }

    fn value(&self, idx: usize) -> &str {
        self.fields[idx].input.trim()
    }

    pub fn focused(&self) -> &FormField {
        &self.fields[self.focus]
    }

    fn focused_mut(&mut self) -> &mut FormField {
        &mut self.fields[self.focus]
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => {
                if self.focus + 1 < self.fields.len() {
                    self.focus_next();
                } else {
                    return FormAction::Submit;
                }
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Left => self.focused_mut().move_cursor(-1),
            KeyCode::Right => self.focused_mut().move_cursor(1),
            KeyCode::Home => self.focused_mut().cursor = 0,
            KeyCode::End => {
                let field = self.focused_mut();
                field.cursor = field.input.len();
            }
            KeyCode::Backspace => self.focused_mut().backspace(),
            KeyCode::Delete => self.focused_mut().delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.focused_mut().insert(ch);
                }
            }
            _ => {}
        }
        FormAction::Continue
    }

    /// Parse every field into a [`Submission`].
    pub fn submission(&self) -> Result<Submission> {
        let number = |idx: usize| parse_number(self.fields[idx].label, self.value(idx));

        match &self.kind {
            FormKind::AddVehicle => {
                let name = self.value(0);
                if name.is_empty() {
                    return Err(anyhow!("Vehicle name is required"));
                }
                let kind = self.value(1)
                    .parse::<VehicleKind>()
                    .context("Select a type: 1.CAR 2.BIKE 3.TRUCK")?;
                Ok(Submission::AddVehicle {
                    name: name.to_string(),
                    kind,
                })
            }
            FormKind::RecordTrip { vehicle } => Ok(Submission::RecordTrip {
                vehicle: vehicle.clone(),
                distance: number(0)?,
                fuel_used: number(1)?,
            }),
            FormKind::Refill { vehicle } => Ok(Submission::Refill {
                vehicle: vehicle.clone(),
                current_level: number(0)?,
                amount: number(1)?,
                price_per_unit: number(2)?,
            }),
        }
    }
}

fn parse_number(label: &str, raw: &str) -> Result<f64> {
    if raw.is_empty() {
        return Err(anyhow!("{label} is required"));
    }
    let value = raw
        .parse::<f64>()
        .map_err(|_| anyhow!("{label}: '{raw}' is not a number"))?;
    if !value.is_finite() {
        return Err(anyhow!("{label}: '{raw}' is not a number"));
    }
    Ok(value)
}

fn format_input(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        format!("{value}")
    }
}
