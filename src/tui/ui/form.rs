//! Patient indicator input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{BinaryAnswer, PatientIndicators, FEATURE_NAMES, NUM_FEATURES};
use crate::tui::styles::ClinicalTheme;

/// Input widget backing one form field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free numeric entry
    Numeric { value: String, hint: &'static str },
    /// Yes/No toggle for the binary indicators
    Binary { value: BinaryAnswer },
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FormField {
    fn numeric(label: &'static str, hint: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Numeric {
                value: String::new(),
                hint,
            },
        }
    }

    fn binary(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Binary {
                value: BinaryAnswer::No,
            },
        }
    }
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    /// Degraded-state note shown in the footer (e.g. missing reference asset)
    pub notice: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        // Field order mirrors the model's feature order exactly so the
        // submitted row needs no reshuffling.
        Self {
            fields: vec![
                FormField::numeric(FEATURE_NAMES[0], "days (0-365)"),
                FormField::binary(FEATURE_NAMES[1]),
                FormField::binary(FEATURE_NAMES[2]),
                FormField::numeric(FEATURE_NAMES[3], "days (0-365)"),
                FormField::binary(FEATURE_NAMES[4]),
                FormField::binary(FEATURE_NAMES[5]),
                FormField::binary(FEATURE_NAMES[6]),
                FormField::binary(FEATURE_NAMES[7]),
                FormField::numeric(FEATURE_NAMES[8], "g/L (0-100)"),
                FormField::numeric(FEATURE_NAMES[9], "years (0-120)"),
                FormField::binary(FEATURE_NAMES[10]),
                FormField::numeric(FEATURE_NAMES[11], "days (0-365)"),
            ],
            selected_field: 0,
            error_message: None,
            notice: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Character input: digits into numeric fields, y/n into toggles.
    pub fn input_char(&mut self, c: char) {
        match &mut self.fields[self.selected_field].kind {
            FieldKind::Numeric { value, .. } => {
                if c.is_ascii_digit() || c == '.' {
                    value.push(c);
                    self.error_message = None;
                }
            }
            FieldKind::Binary { value } => {
                if let Ok(answer) = BinaryAnswer::parse(&c.to_string()) {
                    *value = answer;
                }
            }
        }
    }

    /// Toggle the current field if it is a Yes/No indicator.
    pub fn toggle_field(&mut self) {
        if let FieldKind::Binary { value } = &mut self.fields[self.selected_field].kind {
            *value = value.toggle();
        }
    }

    /// Delete the last character of a numeric field
    pub fn delete_char(&mut self) {
        if let FieldKind::Numeric { value, .. } = &mut self.fields[self.selected_field].kind {
            value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        match &mut self.fields[self.selected_field].kind {
            FieldKind::Numeric { value, .. } => value.clear(),
            FieldKind::Binary { value } => *value = BinaryAnswer::No,
        }
    }

    /// Validate and convert to PatientIndicators.
    pub fn to_patient_indicators(&self) -> Result<PatientIndicators, String> {
        let mut row = Vec::with_capacity(NUM_FEATURES);
        for field in self.fields.iter() {
            let value = match &field.kind {
                FieldKind::Numeric { value, .. } => value
                    .parse::<f64>()
                    .map_err(|_| format!("{}: Invalid number", field.label))?,
                FieldKind::Binary { value } => value.code(),
            };
            row.push(value);
        }
        PatientIndicators::from_row(&row)
    }

    /// Load sample data for demonstration (typical high-exposure patient)
    pub fn load_sample_data(&mut self) {
        let numeric = [
            (0, "14"),   // urinary catheterization days
            (3, "10"),   // carbapenems days
            (8, "28.5"), // albumin g/L
            (9, "72"),   // age
            (11, "7"),   // beta-lactamase inhibitor days
        ];
        for (i, val) in numeric {
            if let FieldKind::Numeric { value, .. } = &mut self.fields[i].kind {
                *value = val.to_string();
            }
        }
        let yes = [1, 2, 4, 6]; // vascular, respiratory, ICU, respiratory infection
        for (i, field) in self.fields.iter_mut().enumerate() {
            if let FieldKind::Binary { value } = &mut field.kind {
                *value = if yes.contains(&i) {
                    BinaryAnswer::Yes
                } else {
                    BinaryAnswer::No
                };
            }
        }
        self.error_message = None;
    }
}

/// Render the patient indicator input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ", ClinicalTheme::text()),
            Span::styled("Patient Indicators", ClinicalTheme::title()),
            Span::styled(
                " │ CRKP Carbapenem Resistance Risk",
                ClinicalTheme::text_secondary(),
            ),
        ]),
        Line::from(Span::styled(
            " Estimates carbapenem resistance probability for a K. pneumoniae \
             isolate from 12 admission indicators.",
            ClinicalTheme::text_muted(),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            ClinicalTheme::border_focused()
        } else {
            ClinicalTheme::border()
        };

        let title_style = if is_selected {
            ClinicalTheme::focused()
        } else {
            ClinicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = match &field.kind {
            FieldKind::Numeric { value, hint } => {
                if value.is_empty() {
                    Span::styled(*hint, ClinicalTheme::text_muted())
                } else {
                    Span::styled(value.as_str(), ClinicalTheme::text())
                }
            }
            FieldKind::Binary { value } => match value {
                BinaryAnswer::Yes => Span::styled("Yes", ClinicalTheme::warning()),
                BinaryAnswer::No => Span::styled("No", ClinicalTheme::text()),
            },
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", ClinicalTheme::focused())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicalTheme::danger()),
            Span::styled(err.clone(), ClinicalTheme::danger()),
        ])
    } else if let Some(notice) = &state.notice {
        Line::from(vec![
            Span::styled("~ ", ClinicalTheme::warning()),
            Span::styled(notice.clone(), ClinicalTheme::warning()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicalTheme::key_hint()),
            Span::styled("Navigate ", ClinicalTheme::key_desc()),
            Span::styled("[Space] ", ClinicalTheme::key_hint()),
            Span::styled("Toggle Yes/No ", ClinicalTheme::key_desc()),
            Span::styled("[Enter] ", ClinicalTheme::key_hint()),
            Span::styled("Assess ", ClinicalTheme::key_desc()),
            Span::styled("[S] ", ClinicalTheme::key_hint()),
            Span::styled("Sample Data ", ClinicalTheme::key_desc()),
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Quit", ClinicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_matches_feature_names() {
        let state = PatientFormState::default();
        assert_eq!(state.fields.len(), NUM_FEATURES);
        for (field, name) in state.fields.iter().zip(FEATURE_NAMES) {
            assert_eq!(field.label, name);
        }
    }

    #[test]
    fn sample_data_converts_to_valid_indicators() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        let patient = state.to_patient_indicators().expect("convert");
        assert!(patient.validate().is_ok());
        assert!((patient.albumin - 28.5).abs() < f64::EPSILON);
        assert!((patient.icu_admission - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_numeric_field_is_an_input_error() {
        let state = PatientFormState::default();
        let err = state.to_patient_indicators().expect_err("must fail");
        assert!(err.contains("Invalid number"));
    }

    #[test]
    fn y_and_n_keys_set_binary_fields() {
        let mut state = PatientFormState::default();
        state.selected_field = 4; // ICU Admission
        state.input_char('y');
        assert!(matches!(
            state.fields[4].kind,
            FieldKind::Binary {
                value: BinaryAnswer::Yes
            }
        ));
        state.input_char('N');
        assert!(matches!(
            state.fields[4].kind,
            FieldKind::Binary {
                value: BinaryAnswer::No
            }
        ));
    }

    #[test]
    fn toggling_a_binary_field_flips_its_code() {
        let mut state = PatientFormState::default();
        state.selected_field = 1; // Vascular System Disease
        state.toggle_field();
        assert!(matches!(
            state.fields[1].kind,
            FieldKind::Binary {
                value: BinaryAnswer::Yes
            }
        ));
        state.toggle_field();
        assert!(matches!(
            state.fields[1].kind,
            FieldKind::Binary {
                value: BinaryAnswer::No
            }
        ));
    }
}
