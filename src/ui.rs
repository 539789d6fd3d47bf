use crate::app::{ActiveInput, App, InputMode, LoginField, View};
use crate::dates::{self, DateComparison};
use crate::models::{Permission, PermissionState, Priority, Task, TaskStatus};
use crate::notifications::relative_time;
use crate::shifts::{shift_hours, WEEK_DAYS};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Red)),
        Span::raw(action),
    ]
}

fn get_legend(input_mode: &InputMode, view: View) -> Text<'static> {
    let hints: Vec<[Span<'static>; 2]> = match input_mode {
        InputMode::Login => vec![
            key_hint(" Tab ", ": Switch Field "),
            key_hint(" Enter ", ": Log In "),
            key_hint(" Esc ", ": Quit "),
        ],
        InputMode::Normal => {
            let mut hints = vec![
                key_hint(" q ", ": Quit "),
                key_hint(" j ", ": Down "),
                key_hint(" k ", ": Up "),
                key_hint(" Tab ", ": Next View "),
            ];
            hints.extend(match view {
                View::Tasks => vec![
                    key_hint(" f ", ": Filter "),
                    key_hint(" s ", ": Next Status "),
                    key_hint(" Enter ", ": View Details "),
                    key_hint(" a ", ": Add Task "),
                ],
                View::Shifts => vec![
                    key_hint(" ←/→ ", ": Day "),
                    key_hint(" [/] ", ": Week "),
                    key_hint(" a ", ": Add Shift "),
                    key_hint(" d ", ": Delete "),
                ],
                View::Notifications => vec![
                    key_hint(" f ", ": Read Filter "),
                    key_hint(" t ", ": Type "),
                    key_hint(" r ", ": Mark Read "),
                    key_hint(" R ", ": Mark All "),
                    key_hint(" Space ", ": Select "),
                    key_hint(" d/D ", ": Delete "),
                ],
                View::Permissions => vec![
                    key_hint(" [/] ", ": Page "),
                    key_hint(" 1-6 ", ": Toggle Right "),
                    key_hint(" x ", ": Toggle State "),
                    key_hint(" d ", ": Delete "),
                ],
            });
            hints.push(key_hint(" l ", ": Log Out "));
            hints
        }
        InputMode::Editing => vec![
            key_hint(" i ", ": Insert "),
            key_hint(" Tab ", ": Switch Field "),
            key_hint(" Enter ", ": Submit "),
            key_hint(" Esc ", ": Cancel "),
        ],
        InputMode::Insert => vec![key_hint(" Esc ", ": Done Typing ")],
    };
    Text::from(Line::from(hints.into_iter().flatten().collect::<Vec<_>>()))
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Completed => Color::Green,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::Pending => Color::Yellow,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn field_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

fn is_overdue(task: &Task) -> bool {
    task.status != TaskStatus::Completed
        && task
            .end_date
            .as_deref()
            .is_some_and(|end| dates::compare_to_now(end) == DateComparison::Before)
}

fn detail_lines(app: &App, task: &Task) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        field_line(
            "Empresa: ",
            task.company.clone().unwrap_or_else(|| "Sin empresa".to_string()),
        ),
        field_line("Responsable: ", app.dashboard.assignee_name(task).to_string()),
        Line::from(vec![
            Span::styled("Estado: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                task.status.label(),
                Style::default().fg(status_color(task.status)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Prioridad: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                task.priority.label(),
                Style::default().fg(priority_color(task.priority)),
            ),
        ]),
        field_line(
            "Horas: ",
            task.estimated_hours
                .map(|h| h.to_string())
                .unwrap_or_else(|| "0".to_string()),
        ),
        field_line("Inicio: ", display_date(task.start_date.as_deref())),
        Line::from(vec![
            Span::styled("Fin: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(display_date(task.end_date.as_deref())),
            Span::styled(
                if is_overdue(task) { " (vencida)" } else { "" },
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(Span::styled(
            "Descripción: ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    match task.description.as_deref() {
        Some(desc) if !desc.trim().is_empty() => {
            lines.extend(desc.lines().map(|l| Line::from(l.to_string())));
        }
        _ => lines.push(Line::from("Sin descripción")),
    }
    lines
}

fn display_date(value: Option<&str>) -> String {
    match value.and_then(|v| dates::to_date(v)) {
        Some(dt) => dates::format_day_month_year(dt.date()),
        None => "Sin fecha".to_string(),
    }
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_absolute(48, 9, area);
    let active = Style::default().fg(Color::Green);
    let idle = Style::default().fg(Color::White);

    let masked = "*".repeat(app.password.chars().count());
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Usuario:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                app.username.clone(),
                if app.login_field == LoginField::Username { active } else { idle },
            ),
        ]),
        Line::from(vec![
            Span::styled("Contraseña: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                masked,
                if app.login_field == LoginField::Password { active } else { idle },
            ),
        ]),
        Line::from(""),
    ];
    if let Some(message) = &app.message {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .title("¡Hola de nuevo!")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(form, popup_area);
}

const VIEWS: [View; 4] = [View::Tasks, View::Shifts, View::Notifications, View::Permissions];

fn highlighted(list: List<'_>) -> List<'_> {
    list.highlight_style(
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol(">> ")
}

fn draw_board(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);

    let user = app
        .session
        .user()
        .map(|u| u.username.clone())
        .unwrap_or_default();
    let header = Line::from(vec![
        Span::styled(format!(" {} ", user), Style::default().fg(Color::Black).bg(Color::Green)),
        Span::raw(format!(
            "  Notificaciones sin leer: {}",
            app.dashboard.notifications.stats().unread
        )),
    ]);
    f.render_widget(Paragraph::new(header), rows[0]);

    let tabs = Tabs::new(VIEWS.iter().map(|v| v.label()))
        .select(VIEWS.iter().position(|v| *v == app.view).unwrap_or(0))
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, rows[1]);

    match app.view {
        View::Tasks => draw_tasks(f, app, rows[2]),
        View::Shifts => draw_shifts(f, app, rows[2]),
        View::Notifications => draw_notifications(f, app, rows[2]),
        View::Permissions => draw_permissions(f, app, rows[2]),
    }
}

fn draw_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);

    let stats = app.dashboard.stats();
    let header = Paragraph::new(format!(
        "Empresas: {}  Pendientes: {}  Empleados: {}  Horas: {}",
        stats.companies, stats.pending_tasks, stats.employees, stats.assigned_hours
    ));
    f.render_widget(header, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(rows[1]);

    let list_title = format!("Tareas ({})", app.filter.label());

    // Left panel: Task list
    let items: Vec<ListItem> = app
        .visible_tasks()
        .iter()
        .map(|task| {
            ListItem::new(Line::from(vec![
                Span::styled("▍", Style::default().fg(status_color(task.status))),
                Span::raw(task.title.clone()),
                Span::styled(
                    format!("  {}", task.company.as_deref().unwrap_or("")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let tasks_widget = if !items.is_empty() {
        highlighted(
            List::new(items).block(Block::default().borders(Borders::ALL).title(list_title)),
        )
    } else {
        List::new(vec![ListItem::new("No hay tareas")])
            .block(Block::default().borders(Borders::ALL).title(list_title))
    };

    f.render_stateful_widget(tasks_widget, chunks[0], &mut app.state);

    // Right panel: details and upcoming tasks
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)].as_ref())
        .split(chunks[1]);

    let detail_block = Block::default().borders(Borders::ALL).title("Detalle");
    let detail = match app.detail() {
        Some(task) => Paragraph::new(detail_lines(app, task)),
        None => Paragraph::new("Enter para ver el detalle"),
    };
    f.render_widget(detail.block(detail_block).wrap(Wrap { trim: true }), right[0]);

    let upcoming: Vec<ListItem> = app
        .dashboard
        .tasks
        .upcoming(dates::today(), 5)
        .iter()
        .map(|task| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", display_date(task.start_date.as_deref())),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(task.title.clone()),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(upcoming).block(Block::default().borders(Borders::ALL).title("Próximas")),
        right[1],
    );
}

fn draw_shifts(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);

    let stats = app.dashboard.shifts.stats();
    let header = Paragraph::new(format!(
        "Semana {}  Empleados: {}  Turnos: {}  Horas semanales: {:.1}  Matutinos: {}",
        app.week.label(),
        app.dashboard.employees.employees().len(),
        stats.assigned,
        stats.weekly_hours,
        stats.morning
    ));
    f.render_widget(header, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)].as_ref())
        .split(rows[1]);

    let days: Vec<ListItem> = app
        .week
        .dates()
        .iter()
        .enumerate()
        .map(|(day, date)| {
            let count = app.dashboard.shifts.shifts_for_day(day as u8).len();
            let style = if day == usize::from(app.shift_day) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", WEEK_DAYS[day]), style),
                Span::styled(
                    format!("{} ", dates::format_day_month_year(*date)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!("({})", count)),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(days).block(Block::default().borders(Borders::ALL).title("Semana")),
        chunks[0],
    );

    let items: Vec<ListItem> = app
        .visible_shifts()
        .iter()
        .map(|shift| {
            let hours = shift_hours(&shift.start_time, &shift.end_time).unwrap_or(0.0);
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", app.dashboard.employee_name(&shift.employee_id))),
                Span::styled(
                    format!("{} - {} ", shift.start_time, shift.end_time),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{} ({:.1} h) ", shift.shift_type.label(), hours),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!(
                        "semana {:.1} h ",
                        app.dashboard.shifts.total_hours_for_employee(&shift.employee_id)
                    ),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    shift.notes.clone().unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let title = format!("Turnos del {}", WEEK_DAYS[usize::from(app.shift_day)]);
    let list = if items.is_empty() {
        List::new(vec![ListItem::new("Sin turnos asignados")])
            .block(Block::default().borders(Borders::ALL).title(title))
    } else {
        highlighted(List::new(items).block(Block::default().borders(Borders::ALL).title(title)))
    };
    f.render_stateful_widget(list, chunks[1], &mut app.state);
}

fn draw_notifications(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);

    let stats = app.dashboard.notifications.stats();
    let filter = &app.notification_filter;
    let header = Paragraph::new(format!(
        "Total: {}  No leídas: {}  Alta prioridad: {}  Filtro: {} / {}",
        stats.total,
        stats.unread,
        stats.high_unread,
        filter.read.label(),
        filter.kind.map(|k| k.label()).unwrap_or("Todos los tipos")
    ));
    f.render_widget(header, rows[0]);

    let now = dates::now();
    let items: Vec<ListItem> = app
        .visible_notifications()
        .iter()
        .map(|n| {
            let mark = if app.marked.contains(&n.id) { "[x] " } else { "[ ] " };
            let title_style = if n.read {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(mark),
                    Span::styled(if n.read { "  " } else { "● " }, Style::default().fg(Color::Blue)),
                    Span::styled(n.title.clone(), title_style),
                    Span::styled(
                        format!("  {} · {}", n.kind.label(), relative_time(n.timestamp, now)),
                        Style::default().fg(priority_color(n.priority)),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("      {}", n.message),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title("Notificaciones");
    let list = if items.is_empty() {
        List::new(vec![ListItem::new("No hay notificaciones")]).block(block)
    } else {
        highlighted(List::new(items).block(block))
    };
    f.render_stateful_widget(list, rows[1], &mut app.state);
}

fn check(value: bool) -> Cell<'static> {
    if value {
        Cell::from("✓").style(Style::default().fg(Color::Green))
    } else {
        Cell::from("·").style(Style::default().fg(Color::DarkGray))
    }
}

fn permission_row(permission: &Permission) -> Row<'static> {
    let state_color = match permission.state {
        PermissionState::Active => Color::Green,
        PermissionState::Inactive => Color::Red,
    };
    Row::new(vec![
        Cell::from(permission.user.clone()),
        Cell::from(permission.email.clone()),
        Cell::from(permission.company.clone()),
        check(permission.read),
        check(permission.write),
        check(permission.edit),
        check(permission.delete),
        check(permission.reports),
        check(permission.settings),
        Cell::from(permission.state.label()).style(Style::default().fg(state_color)),
    ])
}

fn draw_permissions(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app.visible_permissions().iter().map(permission_row).collect();
    let header = Row::new(vec![
        "Usuario", "Email", "Empresa", "Lec", "Esc", "Edi", "Eli", "Rep", "Conf", "Estado",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(12),
        Constraint::Min(22),
        Constraint::Length(10),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(9),
    ];
    let title = format!(
        "Permisos (página {} de {})",
        app.permission_page,
        app.dashboard.permissions.total_pages().max(1)
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    let mut state = TableState::default().with_selected(app.state.selected());
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_new_task(f: &mut Frame, app: &App, area: Rect) {
    let popup_width_percentage = 60;
    let popup_width = (area.width * popup_width_percentage / 100).saturating_sub(2);

    let title_lines = calculate_wrapped_lines(&app.new_task_title, popup_width).max(1) as u16;
    let description_lines =
        calculate_wrapped_lines(&app.new_task_description, popup_width).max(1) as u16;

    let popup_height = std::cmp::min(
        title_lines + description_lines + 4,
        area.height.saturating_sub(2),
    );
    let popup_area = centered_rect_absolute(popup_width + 2, popup_height, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_lines + 2), Constraint::Min(0)].as_ref())
        .split(popup_area);

    let (form_title, detail_title) = match app.view {
        View::Shifts => ("Nuevo Turno (@empleado día HH:MM-HH:MM !tipo)", "Notas"),
        _ => ("Nueva Tarea (!alta @Empresa ~horas)", "Descripción"),
    };

    let style_for = |input: ActiveInput| {
        if app.active_input == input {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let title = Paragraph::new(app.new_task_title.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(form_title)
                .borders(Borders::ALL)
                .style(style_for(ActiveInput::Title)),
        )
        .wrap(Wrap { trim: false });

    let description = Paragraph::new(app.new_task_description.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(detail_title)
                .borders(Borders::ALL)
                .style(style_for(ActiveInput::Description)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(title, sections[0]);
    f.render_widget(description, sections[1]);
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            let size = f.area();

            // Split the main layout into body and footer
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(0)
                .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
                .split(size);

            let body_chunk = chunks[0];
            let footer_chunk = chunks[1];

            match app.input_mode {
                InputMode::Login => draw_login(f, &app, body_chunk),
                InputMode::Normal => draw_board(f, &mut app, body_chunk),
                InputMode::Editing | InputMode::Insert => {
                    draw_board(f, &mut app, body_chunk);
                    draw_new_task(f, &app, body_chunk);
                }
            }

            // Render the legend in the footer
            let mut legend = get_legend(&app.input_mode, app.view);
            if !matches!(app.input_mode, InputMode::Login) {
                if let Some(message) = &app.message {
                    legend.push_line(Line::from(Span::styled(
                        message.clone(),
                        Style::default().fg(Color::Yellow),
                    )));
                }
            }
            let legend = Paragraph::new(legend)
                .style(Style::default().fg(Color::White))
                .alignment(Alignment::Left)
                .wrap(Wrap { trim: true });

            f.render_widget(legend, footer_chunk);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_input(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn calculate_wrapped_lines(text: &str, max_width: u16) -> usize {
    let max_width = max_width.max(1);
    let mut line_count = 0;
    for line in text.lines() {
        let line_width = line.chars().count() as u16;
        line_count += line_width.div_ceil(max_width) as usize;
    }
    line_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;

    #[test]
    fn test_calculate_wrapped_lines() {
        assert_eq!(calculate_wrapped_lines("", 10), 0);
        assert_eq!(calculate_wrapped_lines("abcde", 10), 1);
        assert_eq!(calculate_wrapped_lines("abcdefghijk", 10), 2);
        assert_eq!(calculate_wrapped_lines("abc\nabcdefghijk", 10), 3);
        assert_eq!(calculate_wrapped_lines("abc", 0), 3);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(Some("2025-11-26")), "26-11-2025");
        assert_eq!(display_date(Some("??")), "Sin fecha");
        assert_eq!(display_date(None), "Sin fecha");
    }

    #[test]
    fn test_is_overdue() {
        let mut task = NewTask {
            title: "Entrega".to_string(),
            end_date: Some("2000-01-01".to_string()),
            ..Default::default()
        }
        .into_task("t".to_string());
        assert!(is_overdue(&task));
        task.status = TaskStatus::Completed;
        assert!(!is_overdue(&task));
        task.status = TaskStatus::Pending;
        task.end_date = Some("2999-01-01".to_string());
        assert!(!is_overdue(&task));
        task.end_date = None;
        assert!(!is_overdue(&task));
    }

    #[test]
    fn test_centered_rect_absolute() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect_absolute(40, 10, area);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (30, 15, 40, 10));
    }
}
