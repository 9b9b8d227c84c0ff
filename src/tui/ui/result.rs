//! Assessment result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::Assessment;
use crate::tui::styles::ClinicalTheme;

/// Result screen state
#[derive(Debug, Clone)]
pub enum ResultState {
    /// Completed with an assessment
    Complete { assessment: Assessment },
    /// Prediction failed
    Error { message: String },
}

/// Render the assessment result
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Complete { assessment } => render_assessment(f, chunks[1], assessment),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Assessment Result", ClinicalTheme::title()),
        Span::styled(
            " │ Predicted Carbapenem Resistance",
            ClinicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let block = Block::default()
        .title(Span::styled(" Risk Assessment ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Risk level
            Constraint::Length(4), // Probability
            Constraint::Length(3), // Timestamp
            Constraint::Min(0),    // Padding
        ])
        .margin(1)
        .split(inner);

    let risk_style = ClinicalTheme::risk_level(assessment.risk_level);
    let risk_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} RISK", assessment.risk_level),
            risk_style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            assessment.risk_level.description(),
            ClinicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(risk_display, chunks[0]);

    let prob_gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Resistance Probability ",
                    ClinicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(risk_style)
        .percent((assessment.result.probability * 100.0) as u16)
        .label(format!("{:.1}%", assessment.result.probability * 100.0));
    f.render_widget(prob_gauge, chunks[1]);

    let timestamp = Paragraph::new(Line::from(vec![
        Span::styled("Assessed: ", ClinicalTheme::text_secondary()),
        Span::styled(
            assessment
                .created_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            ClinicalTheme::text(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(timestamp, chunks[2]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", ClinicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, ClinicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match state {
        ResultState::Complete { .. } => Line::from(vec![
            Span::styled("[N] ", ClinicalTheme::key_hint()),
            Span::styled("New Assessment ", ClinicalTheme::key_desc()),
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Quit", ClinicalTheme::key_desc()),
        ]),
        ResultState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", ClinicalTheme::key_hint()),
            Span::styled("Back to Form ", ClinicalTheme::key_desc()),
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Quit", ClinicalTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}
