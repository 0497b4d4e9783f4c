use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use repset::util::{format_countdown, format_duration, format_weight};
use repset::workout::ExerciseEntry;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Active => render_active(self, area, buf),
            AppState::Search => render_search(self, area, buf),
            AppState::Summary => render_summary(self, area, buf),
        }
    }
}

fn render_active(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let session = &app.session;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(2), // header: name + clocks
                Constraint::Min(3),    // exercise list
                Constraint::Length(2), // rest countdown
                Constraint::Length(1), // notice
                Constraint::Length(1), // key hints
            ]
            .as_ref(),
        )
        .split(area);

    let completed = session.progress().completed_total();
    let total = session.exercises().total_sets();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(session.workout_name().to_string(), bold_style),
        Span::raw("   "),
        Span::styled(
            format_duration(session.elapsed_secs()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("   {completed}/{total} sets   rest ")),
        Span::raw(format_duration(session.total_rest_secs())),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    if session.no_exercises() {
        let empty = Paragraph::new(Span::styled(
            "No exercises - press e to add one from the catalog",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        empty.render(chunks[1], buf);
    } else {
        render_exercise_list(app, chunks[1], buf);
    }

    if let Some(remaining) = session.rest_remaining_secs() {
        let rest = Paragraph::new(Span::styled(
            format!("resting  {}  (+/- adjust, s skip)", format_countdown(remaining)),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        rest.render(chunks[2], buf);
    }

    if let Some(notice) = &app.notice {
        let widget = Paragraph::new(Span::styled(
            notice.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        widget.render(chunks[3], buf);
    }

    let hints = Paragraph::new(Span::styled(
        "space done  j/k set  [/] exercise  a/d +/-set  x remove  e add  r/R reps  w/W weight  f finish  esc quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    hints.render(chunks[4], buf);
}

fn render_exercise_list(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let name_width = session
        .exercises()
        .entries()
        .iter()
        .map(|e| e.name.width())
        .max()
        .unwrap_or(0);

    let cursor_exercise = session.progress().exercise_index();
    let cursor_set = session.progress().set_index();

    let mut lines: Vec<Line> = Vec::new();
    for (ei, exercise) in session.exercises().entries().iter().enumerate() {
        lines.push(exercise_heading(session, exercise, name_width, ei == cursor_exercise));

        for (si, set) in exercise.sets.iter().enumerate() {
            let done = session.progress().is_completed(exercise.id, set.id);
            let at_cursor = ei == cursor_exercise && si == cursor_set;

            let marker = if done { "[x]" } else { "[ ]" };
            let text = format!(
                "    {} set {}  {} x {} {}",
                marker,
                si + 1,
                set.reps,
                format_weight(set.weight),
                app.config.weight_unit,
            );

            let style = match (done, at_cursor) {
                (_, true) => Style::default()
                    .patch(bold_style)
                    .add_modifier(Modifier::UNDERLINED),
                (true, false) => green_bold_style,
                (false, false) => dim_style,
            };
            let style = if done && at_cursor {
                style.fg(Color::Green)
            } else {
                style
            };
            lines.push(Line::from(Span::styled(text, style)));
        }
    }

    // keep the cursor line in view on small terminals
    let cursor_line: usize = session
        .exercises()
        .entries()
        .iter()
        .take(cursor_exercise)
        .map(|e| e.sets.len() + 1)
        .sum::<usize>()
        + cursor_set
        + 1;
    let visible = area.height as usize;
    let scroll = cursor_line.saturating_sub(visible.saturating_sub(2)) as u16;

    Paragraph::new(lines).scroll((scroll, 0)).render(area, buf);
}

fn exercise_heading<'a>(
    session: &repset::session::Session,
    exercise: &'a ExerciseEntry,
    name_width: usize,
    is_current: bool,
) -> Line<'a> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let done = session.progress().is_exercise_complete(exercise);
    let count = session.progress().completed_count_for(exercise);

    let style = if done {
        Style::default().patch(bold_style).fg(Color::Green)
    } else if is_current {
        Style::default().patch(bold_style).fg(Color::Cyan)
    } else {
        bold_style
    };

    Line::from(vec![
        Span::styled(
            format!("{:width$}", exercise.name, width = name_width + 2),
            style,
        ),
        Span::styled(
            format!(
                "{}  {}/{} sets  rest {}s",
                exercise.body_part,
                count,
                exercise.sets.len(),
                exercise.rest_secs
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ])
}

fn render_search(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3), // query box
                Constraint::Min(1),    // results
                Constraint::Length(1), // hints
            ]
            .as_ref(),
        )
        .split(area);

    let query = Paragraph::new(format!("> {}", app.search.query))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Add exercise"),
        )
        .style(Style::default().fg(Color::Cyan));
    query.render(chunks[0], buf);

    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in app.search.results.iter().enumerate() {
        let style = if i == app.search.selected {
            Style::default()
                .patch(bold_style)
                .fg(Color::Black)
                .bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("  {}  ({})", entry.name, entry.body_part),
            style,
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "  no matches",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    Paragraph::new(lines).render(chunks[1], buf);

    let hints = Paragraph::new(Span::styled(
        "type to filter  up/down select  enter add  esc back",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    hints.render(chunks[2], buf);
}

fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let session = &app.session;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Span::styled(
        format!("{} - done", session.workout_name()),
        Style::default().patch(bold_style).fg(Color::Green),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let completed = session.progress().completed_total();
    let total = session.exercises().total_sets();
    let totals = Paragraph::new(Span::styled(
        format!(
            "{} elapsed   {} resting   {}/{} sets completed",
            format_duration(session.elapsed_secs()),
            format_duration(session.total_rest_secs()),
            completed,
            total,
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    totals.render(chunks[1], buf);

    let mut lines: Vec<Line> = Vec::new();
    for exercise in session.exercises().entries() {
        let count = session.progress().completed_count_for(exercise);
        lines.push(Line::from(Span::raw(format!(
            "  {}  {}/{} sets",
            exercise.name,
            count,
            exercise.sets.len()
        ))));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let hints = Paragraph::new(Span::styled(
        "esc quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    hints.render(chunks[3], buf);
}
