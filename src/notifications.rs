use crate::dates::{format_day_month_year, is_before_today, to_date};
use crate::models::{Employee, Notification, NotificationKind, Priority, Task, TaskStatus};
use chrono::{Duration, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl ReadFilter {
    pub fn matches(self, read: bool) -> bool {
        match self {
            ReadFilter::All => true,
            ReadFilter::Unread => !read,
            ReadFilter::Read => read,
        }
    }

    pub fn next(self) -> ReadFilter {
        match self {
            ReadFilter::All => ReadFilter::Unread,
            ReadFilter::Unread => ReadFilter::Read,
            ReadFilter::Read => ReadFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadFilter::All => "Todas",
            ReadFilter::Unread => "No leídas",
            ReadFilter::Read => "Leídas",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFilter {
    pub search: String,
    pub kind: Option<NotificationKind>,
    pub read: ReadFilter,
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        let term = self.search.trim().to_lowercase();
        let matches_search = term.is_empty()
            || notification.title.to_lowercase().contains(&term)
            || notification.message.to_lowercase().contains(&term);
        matches_search
            && self.kind.map_or(true, |kind| kind == notification.kind)
            && self.read.matches(notification.read)
    }

    // None -> each kind in turn -> None
    pub fn next_kind(&mut self) {
        self.kind = match self.kind {
            None => Some(NotificationKind::ALL[0]),
            Some(kind) => NotificationKind::ALL
                .iter()
                .position(|k| *k == kind)
                .and_then(|i| NotificationKind::ALL.get(i + 1))
                .copied(),
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub high_unread: usize,
}

fn display_date(value: &str) -> String {
    to_date(value)
        .map(|dt| format_day_month_year(dt.date()))
        .unwrap_or_else(|| value.to_string())
}

/// Derives the feed from the current tasks, newest first.
pub fn generate(tasks: &[Task], employees: &[Employee], now: NaiveDateTime) -> Vec<Notification> {
    let employee_name = |id: Option<&str>| {
        id.and_then(|id| employees.iter().find(|e| e.id == id))
            .map(|e| e.name.clone())
    };
    let mut notifications = Vec::new();

    for (idx, task) in tasks.iter().take(3).enumerate() {
        let Some(assignee) = &task.assignee_id else {
            continue;
        };
        notifications.push(Notification {
            id: format!("notif-assign-{idx}"),
            kind: NotificationKind::TaskAssigned,
            title: "Nueva tarea asignada".to_string(),
            message: format!(
                "Se te ha asignado la tarea \"{}\" en {}",
                task.title,
                task.company.as_deref().unwrap_or("Sin empresa")
            ),
            timestamp: now - Duration::hours(idx as i64 + 1),
            read: false,
            priority: task.priority,
            related_task: Some(task.id.clone()),
            related_employee: Some(assignee.clone()),
        });
    }

    let due = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .filter_map(|t| Some((t, t.end_date.as_deref()?)))
        .take(2);
    for (idx, (task, end)) in due.enumerate() {
        let overdue = is_before_today(end, now.date()).unwrap_or(false);
        let (kind, title, verb) = if overdue {
            (NotificationKind::TaskOverdue, "Tarea vencida", "venció")
        } else {
            (NotificationKind::TaskReminder, "Tarea próxima a vencer", "vence")
        };
        notifications.push(Notification {
            id: format!("notif-due-{idx}"),
            kind,
            title: title.to_string(),
            message: format!(
                "La tarea \"{}\" {} el {}",
                task.title,
                verb,
                display_date(end)
            ),
            timestamp: now - Duration::minutes(20 * (idx as i64 + 1)),
            read: false,
            priority: Priority::High,
            related_task: Some(task.id.clone()),
            related_employee: None,
        });
    }

    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .take(2);
    for (idx, task) in completed.enumerate() {
        notifications.push(Notification {
            id: format!("notif-complete-{idx}"),
            kind: NotificationKind::TaskCompleted,
            title: "Tarea completada".to_string(),
            message: format!(
                "{} ha completado la tarea \"{}\"",
                employee_name(task.assignee_id.as_deref())
                    .unwrap_or_else(|| "Un empleado".to_string()),
                task.title
            ),
            timestamp: now - Duration::hours(36 + 12 * idx as i64),
            read: true,
            priority: Priority::Low,
            related_task: Some(task.id.clone()),
            related_employee: task.assignee_id.clone(),
        });
    }

    notifications.push(Notification {
        id: "notif-sys-1".to_string(),
        kind: NotificationKind::System,
        title: "Bienvenido al sistema".to_string(),
        message: "Tu cuenta ha sido activada correctamente. Ya puedes gestionar tareas y equipos."
            .to_string(),
        timestamp: now - Duration::hours(72),
        read: true,
        priority: Priority::Low,
        related_task: None,
        related_employee: None,
    });
    notifications.push(Notification {
        id: "notif-sys-2".to_string(),
        kind: NotificationKind::System,
        title: "Actualización disponible".to_string(),
        message: "Hay nuevas funcionalidades disponibles en el sistema de gestión.".to_string(),
        timestamp: now - Duration::hours(24),
        read: false,
        priority: Priority::Medium,
        related_task: None,
        related_employee: None,
    });

    notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    notifications
}

/// "hace N minutos" style age of `timestamp`.
pub fn relative_time(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let seconds = now.signed_duration_since(timestamp).num_seconds();
    match seconds {
        s if s < 60 => "hace un momento".to_string(),
        s if s < 3_600 => format!("hace {} minutos", s / 60),
        s if s < 86_400 => format!("hace {} horas", s / 3_600),
        s if s < 604_800 => format!("hace {} días", s / 86_400),
        _ => format_day_month_year(timestamp.date()),
    }
}

pub struct NotificationCenter {
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(notifications: Vec<Notification>) -> NotificationCenter {
        NotificationCenter { notifications }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn filtered(&self, filter: &NotificationFilter) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| filter.matches(n))
            .collect()
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    // Returns how many were removed
    pub fn delete_many(&mut self, ids: &[String]) -> usize {
        let before = self.notifications.len();
        self.notifications.retain(|n| !ids.contains(&n.id));
        before - self.notifications.len()
    }

    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            total: self.notifications.len(),
            unread: self.notifications.iter().filter(|n| !n.read).count(),
            high_unread: self
                .notifications
                .iter()
                .filter(|n| !n.read && n.priority == Priority::High)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::sample_employees;
    use crate::models::NewTask;
    use crate::tasks::sample_tasks;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 27)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn center() -> NotificationCenter {
        NotificationCenter::new(generate(&sample_tasks(), &sample_employees(), now()))
    }

    fn ids(notifications: &[&Notification]) -> Vec<String> {
        notifications.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_generate_from_samples() {
        let notifications = generate(&sample_tasks(), &sample_employees(), now());
        let ids: Vec<_> = notifications.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "notif-due-0",
                "notif-due-1",
                "notif-assign-0",
                "notif-assign-1",
                "notif-assign-2",
                "notif-sys-2",
                "notif-complete-0",
                "notif-sys-1",
            ]
        );

        let first_due = &notifications[0];
        assert_eq!(first_due.kind, NotificationKind::TaskReminder);
        assert_eq!(
            first_due.message,
            "La tarea \"Revisión de planos arquitectónicos\" vence el 28-11-2025"
        );

        let completed = notifications
            .iter()
            .find(|n| n.kind == NotificationKind::TaskCompleted)
            .unwrap();
        assert_eq!(
            completed.message,
            "María González ha completado la tarea \"Inventario de almacén\""
        );
        assert!(completed.read);
    }

    #[test]
    fn test_past_due_tasks_are_overdue() {
        let task = NewTask {
            end_date: Some("2025-11-01".to_string()),
            ..NewTask::titled("Cierre de mes")
        }
        .into_task("t1".to_string());
        let notifications = generate(&[task], &[], now());
        let overdue = notifications
            .iter()
            .find(|n| n.id == "notif-due-0")
            .unwrap();
        assert_eq!(overdue.kind, NotificationKind::TaskOverdue);
        assert_eq!(overdue.title, "Tarea vencida");
        assert_eq!(overdue.priority, Priority::High);
    }

    #[test]
    fn test_unassigned_tasks_skip_assignment_notice() {
        let tasks = vec![NewTask::titled("Sin responsable").into_task("t1".to_string())];
        let notifications = generate(&tasks, &[], now());
        assert!(notifications
            .iter()
            .all(|n| n.kind == NotificationKind::System));
    }

    #[test]
    fn test_filters_combine() {
        let center = center();

        let unread_system = NotificationFilter {
            kind: Some(NotificationKind::System),
            read: ReadFilter::Unread,
            ..NotificationFilter::default()
        };
        assert_eq!(ids(&center.filtered(&unread_system)), vec!["notif-sys-2"]);

        let search = NotificationFilter {
            search: "INVENTARIO".to_string(),
            ..NotificationFilter::default()
        };
        assert_eq!(ids(&center.filtered(&search)), vec!["notif-complete-0"]);

        let title_search = NotificationFilter {
            search: "bienvenido".to_string(),
            read: ReadFilter::Unread,
            ..NotificationFilter::default()
        };
        assert!(center.filtered(&title_search).is_empty());
    }

    #[test]
    fn test_mark_read_and_stats() {
        let mut center = center();
        let expected = NotificationStats {
            total: 8,
            unread: 6,
            high_unread: 4,
        };
        assert_eq!(center.stats(), expected);

        assert!(center.mark_read("notif-due-0"));
        assert!(!center.mark_read("missing"));
        assert_eq!(center.stats().high_unread, 3);

        center.mark_all_read();
        assert_eq!(center.stats().unread, 0);
    }

    #[test]
    fn test_delete_and_delete_many() {
        let mut center = center();
        assert!(center.delete("notif-sys-1"));
        assert!(!center.delete("notif-sys-1"));

        let removed = center.delete_many(&[
            "notif-due-0".to_string(),
            "notif-due-1".to_string(),
            "missing".to_string(),
        ]);
        assert_eq!(removed, 2);
        assert_eq!(center.notifications().len(), 5);
    }

    #[test]
    fn test_kind_filter_cycles_back_to_all() {
        let mut filter = NotificationFilter::default();
        for _ in 0..NotificationKind::ALL.len() {
            filter.next_kind();
            assert!(filter.kind.is_some());
        }
        filter.next_kind();
        assert_eq!(filter.kind, None);
    }

    #[test]
    fn test_relative_time() {
        let now = now();
        assert_eq!(relative_time(now, now), "hace un momento");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "hace 5 minutos");
        assert_eq!(relative_time(now - Duration::hours(3), now), "hace 3 horas");
        assert_eq!(relative_time(now - Duration::days(2), now), "hace 2 días");
        assert_eq!(relative_time(now - Duration::days(10), now), "17-11-2025");
    }
}
