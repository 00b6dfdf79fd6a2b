use citywaste_core::sensor::{CityWasteSensor, SensorAttributes};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::App;

const NAV_HINT: &str = "↑/↓ select sensor · r refresh · q/Ctrl-C quit";

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("citywaste – household waste discharge this month")
        .block(Block::default().borders(Borders::ALL).title("Citywaste"));
    frame.render_widget(header, *header_area);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(*content_area);

    let [sensors_area, detail_area] = content_chunks.as_ref() else {
        return;
    };

    draw_sensor_table(frame, app, *sensors_area);
    draw_sensor_detail(frame, app, *detail_area);

    let refreshed = app.last_refresh.map_or_else(
        || "never updated".to_owned(),
        |at| format!("last trigger {}", at.format("%H:%M:%S")),
    );

    let status_text = if app.is_loading {
        format!("Updating… · {NAV_HINT}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {refreshed} · {NAV_HINT}")
    } else {
        format!("{refreshed} · {NAV_HINT}")
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_sensor_table(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = app.sensors.iter().map(|sensor| {
        let style = if sensor.available() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        Row::new(vec![
            Cell::from(sensor.name()),
            Cell::from(state_label(sensor)),
            Cell::from(sensor.unit().trim().to_owned()),
            Cell::from(sensor.icon()),
            Cell::from(if sensor.available() { "yes" } else { "no" }),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(5),
        Constraint::Length(20),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Sensor", "Value", "Unit", "Icon", "Available"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Sensors"))
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    if !app.sensors.is_empty() {
        state.select(Some(app.sensor_list_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_sensor_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(sensor) = app.selected_sensor() else {
        let paragraph = Paragraph::new("No sensors configured.")
            .block(Block::default().borders(Borders::ALL).title("Details"));
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!("{} ({})", sensor.name(), sensor.condition());

    let text = match sensor.attributes() {
        Some(attributes) => attribute_lines(&attributes),
        None => vec![Line::from("No attributes for this sensor.")],
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn state_label(sensor: &CityWasteSensor) -> String {
    sensor
        .state()
        .map_or_else(|| "unknown".to_owned(), |value| value.to_string())
}

fn attribute_lines(attributes: &SensorAttributes) -> Vec<Line<'static>> {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_owned());

    vec![
        Line::from(format!("address: {}", attributes.address)),
        Line::from(format!("total_count: {}", attributes.total_count)),
        Line::from(format!(
            "last_kg: {}",
            optional(attributes.last_kg.map(|kg| kg.to_string()))
        )),
        Line::from(format!(
            "last_date: {}",
            optional(attributes.last_date.clone())
        )),
        Line::from(format!("total_kg: {}", attributes.total_kg)),
    ]
}
