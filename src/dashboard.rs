use crate::dates;
use crate::employees::EmployeeStore;
use crate::models::{NewTask, Task, TaskStatus};
use crate::notifications::{self, NotificationCenter};
use crate::permissions::PermissionStore;
use crate::shifts::ShiftStore;
use crate::storage::Storage;
use crate::tasks::TaskStore;
use chrono::NaiveDateTime;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub companies: usize,
    pub pending_tasks: usize,
    pub employees: usize,
    pub assigned_hours: f64,
}

pub struct Dashboard {
    pub tasks: TaskStore,
    pub employees: EmployeeStore,
    pub shifts: ShiftStore,
    pub permissions: PermissionStore,
    pub notifications: NotificationCenter,
}

impl Dashboard {
    pub fn load(storage: Rc<dyn Storage>) -> Dashboard {
        Dashboard::load_at(storage, dates::now())
    }

    // The notification feed is derived from the loaded tasks as of `now`
    pub fn load_at(storage: Rc<dyn Storage>, now: NaiveDateTime) -> Dashboard {
        let tasks = TaskStore::load(storage.clone());
        let employees = EmployeeStore::load(storage.clone());
        let notifications = NotificationCenter::new(notifications::generate(
            tasks.tasks(),
            employees.employees(),
            now,
        ));
        Dashboard {
            tasks,
            employees,
            shifts: ShiftStore::load(storage.clone()),
            permissions: PermissionStore::load(storage),
            notifications,
        }
    }

    /// Adds the task and bumps the assignee's active-task counter.
    pub fn create_task(&mut self, new_task: NewTask) -> Task {
        let task = self.tasks.add_task(new_task);
        if let Some(assignee) = &task.assignee_id {
            self.employees.increment_active_tasks(assignee);
        }
        task
    }

    pub fn assignee_name(&self, task: &Task) -> &str {
        match &task.assignee_id {
            None => "Sin asignar",
            Some(id) => self.employee_name(id),
        }
    }

    pub fn employee_name(&self, id: &str) -> &str {
        self.employees
            .get(id)
            .map(|e| e.name.as_str())
            .unwrap_or("Desconocido")
    }

    pub fn stats(&self) -> DashboardStats {
        let tasks = self.tasks.tasks();
        DashboardStats {
            companies: self.employees.companies().len(),
            pending_tasks: tasks
                .iter()
                .filter(|t| t.status != TaskStatus::Completed)
                .count(),
            employees: self.employees.employees().len(),
            assigned_hours: tasks
                .iter()
                .filter(|t| t.assignee_id.is_some())
                .filter_map(|t| t.estimated_hours)
                .sum(),
        }
    }
}
