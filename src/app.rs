use crate::dashboard::Dashboard;
use crate::dates;
use crate::models::{
    NewTask, Notification, Permission, PermissionFlag, Shift, Task, TaskChanges, TaskStatus,
};
use crate::notifications::NotificationFilter;
use crate::parser::{parse_shift_input, parse_task_input};
use crate::session::SessionManager;
use crate::shifts::{Week, WEEK_DAYS};
use crate::tasks::StatusFilter;
use chrono::Datelike;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;
use tracing::info;

pub struct App {
    pub session: SessionManager,
    pub dashboard: Dashboard,
    pub state: ListState,
    pub task_detail: Option<String>,
    pub input_mode: InputMode,
    pub active_input: ActiveInput,
    pub login_field: LoginField,
    pub username: String,
    pub password: String,
    pub new_task_title: String,
    pub new_task_description: String,
    pub filter: StatusFilter,
    pub message: Option<String>,
    pub view: View,
    pub week: Week,
    pub shift_day: u8,
    pub notification_filter: NotificationFilter,
    pub marked: Vec<String>,
    pub permission_page: usize,
}

pub enum InputMode {
    Login,
    Normal,
    Editing,
    Insert,
}

#[derive(PartialEq)]
pub enum ActiveInput {
    Title,
    Description,
}

#[derive(PartialEq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tasks,
    Shifts,
    Notifications,
    Permissions,
}

impl View {
    pub fn next(self) -> View {
        match self {
            View::Tasks => View::Shifts,
            View::Shifts => View::Notifications,
            View::Notifications => View::Permissions,
            View::Permissions => View::Tasks,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Tasks => "Tareas",
            View::Shifts => "Horarios",
            View::Notifications => "Notificaciones",
            View::Permissions => "Permisos",
        }
    }
}

const FLAG_KEYS: [(char, PermissionFlag); 6] = [
    ('1', PermissionFlag::Read),
    ('2', PermissionFlag::Write),
    ('3', PermissionFlag::Edit),
    ('4', PermissionFlag::Delete),
    ('5', PermissionFlag::Reports),
    ('6', PermissionFlag::Settings),
];

impl App {
    pub fn new(session: SessionManager, dashboard: Dashboard) -> App {
        let input_mode = if session.is_authenticated() {
            InputMode::Normal
        } else {
            InputMode::Login
        };
        let today = dates::today();
        let mut app = App {
            session,
            dashboard,
            state: ListState::default(),
            task_detail: None,
            input_mode,
            active_input: ActiveInput::Title,
            login_field: LoginField::Username,
            username: String::new(),
            password: String::new(),
            new_task_title: String::new(),
            new_task_description: String::new(),
            filter: StatusFilter::All,
            message: None,
            view: View::Tasks,
            week: Week::containing(today),
            shift_day: today.weekday().num_days_from_sunday() as u8,
            notification_filter: NotificationFilter::default(),
            marked: Vec::new(),
            permission_page: 1,
        };
        app.reset_selection();
        app
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.dashboard.tasks.search("", self.filter)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let index = self.state.selected()?;
        self.visible_tasks().get(index).copied()
    }

    pub fn detail(&self) -> Option<&Task> {
        self.dashboard.tasks.get(self.task_detail.as_deref()?)
    }

    pub fn visible_shifts(&self) -> Vec<&Shift> {
        self.dashboard.shifts.shifts_for_day(self.shift_day)
    }

    pub fn visible_notifications(&self) -> Vec<&Notification> {
        self.dashboard
            .notifications
            .filtered(&self.notification_filter)
    }

    pub fn visible_permissions(&self) -> &[Permission] {
        self.dashboard.permissions.page(self.permission_page)
    }

    fn selected_index(&self) -> Option<usize> {
        self.state.selected().filter(|i| *i < self.visible_len())
    }

    fn selected_shift_id(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.visible_shifts().get(index).map(|s| s.id.clone())
    }

    fn selected_notification_id(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.visible_notifications().get(index).map(|n| n.id.clone())
    }

    fn selected_permission_id(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.visible_permissions().get(index).map(|p| p.id.clone())
    }

    fn visible_len(&self) -> usize {
        match self.view {
            View::Tasks => self.visible_tasks().len(),
            View::Shifts => self.visible_shifts().len(),
            View::Notifications => self.visible_notifications().len(),
            View::Permissions => self.visible_permissions().len(),
        }
    }

    fn reset_selection(&mut self) {
        if self.visible_len() == 0 {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    // Keeps the cursor on a row after the list shrinks
    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn switch_view(&mut self) {
        self.view = self.view.next();
        self.message = None;
        self.reset_selection();
    }

    fn submit_login(&mut self) {
        if self.session.login(&self.username, &self.password) {
            self.message = None;
            self.input_mode = InputMode::Normal;
            self.reset_selection();
        } else {
            self.message = self.session.error().map(|err| err.to_string());
        }
        self.password.clear();
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.username.clear();
        self.password.clear();
        self.login_field = LoginField::Username;
        self.task_detail = None;
        self.message = None;
        self.input_mode = InputMode::Login;
        self.view = View::Tasks;
        self.marked.clear();
    }

    fn advance_selected_status(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let status = match task.status {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        };
        self.dashboard.tasks.update_task(
            &id,
            TaskChanges {
                status: Some(status),
                ..TaskChanges::default()
            },
        );
        self.message = Some(format!("Estado: {}", status.label()));
    }

    fn submit_new_task(&mut self) {
        let parsed = parse_task_input(&self.new_task_title);
        if parsed.title.is_empty() {
            self.message = Some("El título es obligatorio".to_string());
            return;
        }
        let description = self.new_task_description.trim();
        let new_task = NewTask {
            title: parsed.title,
            description: (!description.is_empty()).then(|| description.to_string()),
            company: parsed.company,
            priority: parsed.priority.unwrap_or_default(),
            estimated_hours: parsed.hours,
            ..NewTask::default()
        };
        let task = self.dashboard.create_task(new_task);
        info!(task_id = %task.id, "task created");

        // New tasks are pending, make sure they show up
        if !self.filter.matches(task.status) {
            self.filter = StatusFilter::All;
        }
        self.reset_selection();
        self.task_detail = Some(task.id);
        self.new_task_title.clear();
        self.new_task_description.clear();
        self.input_mode = InputMode::Normal;
    }

    fn submit_new_shift(&mut self) {
        let mut new_shift = parse_shift_input(&self.new_task_title).into_new_shift(self.shift_day);
        let extra_notes = self.new_task_description.trim();
        if !extra_notes.is_empty() {
            new_shift.notes = Some(match new_shift.notes.take() {
                Some(notes) => format!("{} {}", notes, extra_notes),
                None => extra_notes.to_string(),
            });
        }

        match self.dashboard.shifts.add_shift(new_shift) {
            Ok(shift) => {
                info!(shift_id = %shift.id, employee = %shift.employee_id, "shift added");
                self.shift_day = shift.day;
                self.reset_selection();
                self.message = Some(format!(
                    "Turno para {} el {}",
                    self.dashboard.employee_name(&shift.employee_id),
                    WEEK_DAYS[usize::from(shift.day)]
                ));
                self.new_task_title.clear();
                self.new_task_description.clear();
                self.input_mode = InputMode::Normal;
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn submit_form(&mut self) {
        match self.view {
            View::Shifts => self.submit_new_shift(),
            _ => self.submit_new_task(),
        }
    }

    fn open_form(&mut self) {
        self.input_mode = InputMode::Editing;
        self.new_task_title.clear();
        self.new_task_description.clear();
        self.active_input = ActiveInput::Title;
        self.message = None;
    }

    fn move_day(&mut self, forward: bool) {
        self.shift_day = if forward {
            (self.shift_day + 1) % 7
        } else {
            (self.shift_day + 6) % 7
        };
        self.reset_selection();
    }

    fn delete_selected_shift(&mut self) {
        if let Some(id) = self.selected_shift_id() {
            self.dashboard.shifts.delete_shift(&id);
            self.clamp_selection();
        }
    }

    fn toggle_mark(&mut self) {
        let Some(id) = self.selected_notification_id() else {
            return;
        };
        match self.marked.iter().position(|m| *m == id) {
            Some(index) => {
                self.marked.remove(index);
            }
            None => self.marked.push(id),
        }
    }

    fn delete_marked(&mut self) {
        let removed = self.dashboard.notifications.delete_many(&self.marked);
        self.marked.clear();
        self.message = Some(format!("{} notificaciones eliminadas", removed));
        self.clamp_selection();
    }

    fn change_page(&mut self, forward: bool) {
        let last = self.dashboard.permissions.total_pages().max(1);
        self.permission_page = if forward {
            (self.permission_page + 1).min(last)
        } else {
            self.permission_page.saturating_sub(1).max(1)
        };
        self.reset_selection();
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match self.view {
            View::Tasks => match key.code {
                KeyCode::Char('f') => {
                    self.filter = self.filter.next();
                    self.reset_selection();
                }
                KeyCode::Char('s') => self.advance_selected_status(),
                KeyCode::Char('a') => self.open_form(),
                KeyCode::Enter => {
                    self.task_detail = self.selected_task().map(|t| t.id.clone());
                }
                _ => {}
            },
            View::Shifts => match key.code {
                KeyCode::Left => self.move_day(false),
                KeyCode::Right => self.move_day(true),
                KeyCode::Char('[') => self.week = self.week.previous(),
                KeyCode::Char(']') => self.week = self.week.next(),
                KeyCode::Char('a') => self.open_form(),
                KeyCode::Char('d') => self.delete_selected_shift(),
                _ => {}
            },
            View::Notifications => match key.code {
                KeyCode::Char('f') => {
                    self.notification_filter.read = self.notification_filter.read.next();
                    self.reset_selection();
                }
                KeyCode::Char('t') => {
                    self.notification_filter.next_kind();
                    self.reset_selection();
                }
                KeyCode::Char('r') => {
                    if let Some(id) = self.selected_notification_id() {
                        self.dashboard.notifications.mark_read(&id);
                        self.clamp_selection();
                    }
                }
                KeyCode::Char('R') => {
                    self.dashboard.notifications.mark_all_read();
                    self.clamp_selection();
                }
                KeyCode::Char(' ') => self.toggle_mark(),
                KeyCode::Char('d') => {
                    if let Some(id) = self.selected_notification_id() {
                        self.dashboard.notifications.delete(&id);
                        self.marked.retain(|m| *m != id);
                        self.clamp_selection();
                    }
                }
                KeyCode::Char('D') => self.delete_marked(),
                _ => {}
            },
            View::Permissions => match key.code {
                KeyCode::Char('[') => self.change_page(false),
                KeyCode::Char(']') => self.change_page(true),
                KeyCode::Char('x') => {
                    if let Some(id) = self.selected_permission_id() {
                        self.dashboard.permissions.toggle_state(&id);
                    }
                }
                KeyCode::Char('d') => {
                    if let Some(id) = self.selected_permission_id() {
                        self.dashboard.permissions.delete(&id);
                        self.clamp_selection();
                    }
                }
                KeyCode::Char(c) => {
                    let flag = FLAG_KEYS.iter().find(|(k, _)| *k == c).map(|(_, f)| *f);
                    if let (Some(flag), Some(id)) = (flag, self.selected_permission_id()) {
                        self.dashboard.permissions.toggle(&id, flag);
                    }
                }
                _ => {}
            },
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        match self.input_mode {
            InputMode::Login => match key.code {
                KeyCode::Esc => return true,
                KeyCode::Tab => {
                    self.login_field = match self.login_field {
                        LoginField::Username => LoginField::Password,
                        LoginField::Password => LoginField::Username,
                    };
                }
                KeyCode::Enter => self.submit_login(),
                KeyCode::Char(c) => match self.login_field {
                    LoginField::Username => self.username.push(c),
                    LoginField::Password => self.password.push(c),
                },
                KeyCode::Backspace => match self.login_field {
                    LoginField::Username => {
                        self.username.pop();
                    }
                    LoginField::Password => {
                        self.password.pop();
                    }
                },
                _ => {}
            },

            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('j') => self.next(),
                KeyCode::Char('k') => self.previous(),
                KeyCode::Tab => self.switch_view(),
                KeyCode::Char('l') => self.logout(),
                _ => self.handle_board_key(key),
            },

            InputMode::Editing => match key.code {
                KeyCode::Char('i') => {
                    self.input_mode = InputMode::Insert;
                }
                KeyCode::Tab => {
                    self.active_input = match self.active_input {
                        ActiveInput::Title => ActiveInput::Description,
                        ActiveInput::Description => ActiveInput::Title,
                    };
                }
                KeyCode::Enter => self.submit_form(),
                KeyCode::Esc => {
                    self.new_task_title.clear();
                    self.new_task_description.clear();
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },
            InputMode::Insert => match key.code {
                KeyCode::Char(c) => match self.active_input {
                    ActiveInput::Title => self.new_task_title.push(c),
                    ActiveInput::Description => self.new_task_description.push(c),
                },
                KeyCode::Backspace => match self.active_input {
                    ActiveInput::Title => {
                        self.new_task_title.pop();
                    }
                    ActiveInput::Description => {
                        self.new_task_description.pop();
                    }
                },
                KeyCode::Esc => {
                    self.input_mode = InputMode::Editing;
                }
                _ => {}
            },
        }
        false
    }
}
