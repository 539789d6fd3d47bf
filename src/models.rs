use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// Claims carried alongside the account's token
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct JwtPayload {
    pub sub: String,
    pub username: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

// Account record, field names follow the shared accounts document
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub jwt: String,
    pub jwt_payload: Option<JwtPayload>,
    #[serde(rename = "FecIni")]
    pub starts_at: String,
    #[serde(rename = "FecFin")]
    pub ends_at: String,
    #[serde(rename = "EdoCta")]
    pub enabled: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct AccountsMeta {
    pub algo: String,
    pub secret: String,
    pub note: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct AccountsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<AccountsMeta>,
    pub users: Vec<Account>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en-proceso")]
    InProgress,
    #[serde(rename = "completado")]
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pendiente",
            TaskStatus::InProgress => "En Progreso",
            TaskStatus::Completed => "Completada",
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub enum Priority {
    #[serde(rename = "baja")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Baja",
            Priority::Medium => "Media",
            Priority::High => "Alta",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Priority> {
        match keyword.to_lowercase().as_str() {
            "baja" | "low" => Some(Priority::Low),
            "media" | "medium" => Some(Priority::Medium),
            "alta" | "high" => Some(Priority::High),
            _ => None,
        }
    }
}

// Task struct
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "empresa", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "responsableId", default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: TaskStatus,
    #[serde(rename = "prioridad", default)]
    pub priority: Priority,
    #[serde(rename = "tiempoValorado", default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(rename = "fechaInicio", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "fechaFin", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

// Everything but the id
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub company: Option<String>,
    pub assignee_id: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub estimated_hours: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> NewTask {
        NewTask {
            title: title.into(),
            ..NewTask::default()
        }
    }

    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            company: self.company,
            assignee_id: self.assignee_id,
            status: self.status,
            priority: self.priority,
            estimated_hours: self.estimated_hours,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

// Partial update, only the set fields are merged
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub assignee_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TaskChanges {
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if self.description.is_some() {
            task.description = self.description;
        }
        if self.company.is_some() {
            task.company = self.company;
        }
        if self.assignee_id.is_some() {
            task.assignee_id = self.assignee_id;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if self.estimated_hours.is_some() {
            task.estimated_hours = self.estimated_hours;
        }
        if self.start_date.is_some() {
            task.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            task.end_date = self.end_date;
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub active_tasks: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub role: Option<String>,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
}

impl NewEmployee {
    pub fn into_employee(self, id: String) -> Employee {
        Employee {
            id,
            name: self.name,
            role: self.role,
            company: self.company,
            email: self.email,
            phone: self.phone,
            avatar: self.avatar,
            active_tasks: 0,
        }
    }
}

// Millisecond ids that never repeat within one generator
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last.to_string()
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    #[default]
    Morning,
    Afternoon,
    Night,
    Full,
}

impl ShiftType {
    pub fn label(self) -> &'static str {
        match self {
            ShiftType::Morning => "Matutino",
            ShiftType::Afternoon => "Vespertino",
            ShiftType::Night => "Nocturno",
            ShiftType::Full => "Completo",
        }
    }

    // Usual start and end for the type
    pub fn window(self) -> (&'static str, &'static str) {
        match self {
            ShiftType::Morning => ("06:00", "14:00"),
            ShiftType::Afternoon => ("14:00", "22:00"),
            ShiftType::Night => ("22:00", "06:00"),
            ShiftType::Full => ("09:00", "18:00"),
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<ShiftType> {
        match keyword.to_lowercase().as_str() {
            "matutino" | "morning" => Some(ShiftType::Morning),
            "vespertino" | "afternoon" => Some(ShiftType::Afternoon),
            "nocturno" | "night" => Some(ShiftType::Night),
            "completo" | "full" => Some(ShiftType::Full),
            _ => None,
        }
    }
}

// Weekly shift, `day` is 0 (Sunday) to 6 (Saturday)
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub employee_id: String,
    pub day: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub shift_type: ShiftType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewShift {
    pub employee_id: String,
    pub day: u8,
    pub start_time: String,
    pub end_time: String,
    pub shift_type: ShiftType,
    pub notes: Option<String>,
}

impl NewShift {
    /// A shift of `shift_type` using the type's usual hours.
    pub fn typed(employee_id: impl Into<String>, day: u8, shift_type: ShiftType) -> NewShift {
        let (start, end) = shift_type.window();
        NewShift {
            employee_id: employee_id.into(),
            day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            shift_type,
            notes: None,
        }
    }

    pub fn into_shift(self, id: String) -> Shift {
        Shift {
            id,
            employee_id: self.employee_id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            shift_type: self.shift_type,
            notes: self.notes,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    TaskAssigned,
    TaskCompleted,
    TaskOverdue,
    TaskReminder,
    System,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::TaskAssigned,
        NotificationKind::TaskCompleted,
        NotificationKind::TaskOverdue,
        NotificationKind::TaskReminder,
        NotificationKind::System,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NotificationKind::TaskAssigned => "Tarea Asignada",
            NotificationKind::TaskCompleted => "Tarea Completada",
            NotificationKind::TaskOverdue => "Tarea Vencida",
            NotificationKind::TaskReminder => "Recordatorio",
            NotificationKind::System => "Sistema",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub read: bool,
    pub priority: Priority,
    pub related_task: Option<String>,
    pub related_employee: Option<String>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub enum PermissionState {
    #[default]
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
}

impl PermissionState {
    pub fn label(self) -> &'static str {
        match self {
            PermissionState::Active => "Activo",
            PermissionState::Inactive => "Inactivo",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionFlag {
    Read,
    Write,
    Edit,
    Delete,
    Reports,
    Settings,
}

// Access rights of one user within a company
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Permission {
    pub id: String,
    #[serde(rename = "usuario")]
    pub user: String,
    pub email: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "lectura")]
    pub read: bool,
    #[serde(rename = "escritura")]
    pub write: bool,
    #[serde(rename = "edicion")]
    pub edit: bool,
    #[serde(rename = "eliminacion")]
    pub delete: bool,
    #[serde(rename = "reportes")]
    pub reports: bool,
    #[serde(rename = "configuracion")]
    pub settings: bool,
    #[serde(rename = "estado", default)]
    pub state: PermissionState,
}

impl Permission {
    pub fn flag_mut(&mut self, flag: PermissionFlag) -> &mut bool {
        match flag {
            PermissionFlag::Read => &mut self.read,
            PermissionFlag::Write => &mut self.write,
            PermissionFlag::Edit => &mut self.edit,
            PermissionFlag::Delete => &mut self.delete,
            PermissionFlag::Reports => &mut self.reports,
            PermissionFlag::Settings => &mut self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_uses_document_field_names() {
        let json = r#"{
            "id": "1",
            "username": "admin",
            "password": "secret",
            "roles": ["ADMIN"],
            "jwt": "token",
            "jwt_payload": {"sub": "1", "username": "admin", "roles": ["ADMIN"], "iat": 1, "exp": 2},
            "FecIni": "2024-01-01",
            "FecFin": "31-12-2099",
            "EdoCta": true
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.starts_at, "2024-01-01");
        assert_eq!(account.ends_at, "31-12-2099");
        assert!(account.enabled);

        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["EdoCta"], serde_json::json!(true));
    }

    #[test]
    fn test_task_defaults_for_missing_fields() {
        let task: Task = serde_json::from_str(r#"{"id": "t", "title": "Revisar"}"#).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.assignee_id, None);
    }

    #[test]
    fn test_task_status_wire_names() {
        let task: Task = serde_json::from_str(
            r#"{"id": "t", "title": "x", "estado": "en-proceso", "prioridad": "alta"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_task_changes_merge_only_set_fields() {
        let mut task = NewTask {
            title: "Inventario".to_string(),
            company: Some("Tech Solutions".to_string()),
            estimated_hours: Some(5.0),
            ..NewTask::default()
        }
        .into_task("1".to_string());

        TaskChanges {
            status: Some(TaskStatus::Completed),
            estimated_hours: Some(6.5),
            ..TaskChanges::default()
        }
        .apply_to(&mut task);

        assert_eq!(task.title, "Inventario");
        assert_eq!(task.company.as_deref(), Some("Tech Solutions"));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.estimated_hours, Some(6.5));
    }

    #[test]
    fn test_employee_missing_counter_defaults_to_zero() {
        let employee: Employee =
            serde_json::from_str(r#"{"id": "e1", "name": "Carlos"}"#).unwrap();
        assert_eq!(employee.active_tasks, 0);
    }

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let mut ids = IdGenerator::default();
        let first: i64 = ids.next_id().parse().unwrap();
        let second: i64 = ids.next_id().parse().unwrap();
        let third: i64 = ids.next_id().parse().unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_priority_keywords() {
        assert_eq!(Priority::from_keyword("ALTA"), Some(Priority::High));
        assert_eq!(Priority::from_keyword("low"), Some(Priority::Low));
        assert_eq!(Priority::from_keyword("urgente"), None);
    }

    #[test]
    fn test_shift_wire_names() {
        let shift: Shift = serde_json::from_str(
            r#"{"id": "s1", "employeeId": "e2", "day": 1, "startTime": "06:00",
                "endTime": "14:00", "type": "morning"}"#,
        )
        .unwrap();
        assert_eq!(shift.employee_id, "e2");
        assert_eq!(shift.shift_type, ShiftType::Morning);
        assert_eq!(shift.notes, None);
    }

    #[test]
    fn test_shift_keywords() {
        assert_eq!(ShiftType::from_keyword("Nocturno"), Some(ShiftType::Night));
        assert_eq!(ShiftType::from_keyword("full"), Some(ShiftType::Full));
        assert_eq!(ShiftType::from_keyword("doble"), None);
        assert_eq!(ShiftType::Afternoon.window(), ("14:00", "22:00"));
    }

    #[test]
    fn test_permission_wire_names() {
        let permission: Permission = serde_json::from_str(
            r#"{"id": "1", "usuario": "Usuario 1", "email": "usuario1@empresa.com",
                "empresa": "Empresa A", "lectura": true, "escritura": false,
                "edicion": false, "eliminacion": false, "reportes": true,
                "configuracion": false, "estado": "inactivo"}"#,
        )
        .unwrap();
        assert!(permission.read && permission.reports);
        assert_eq!(permission.state, PermissionState::Inactive);
    }
}
