use crate::dates::to_date;
use crate::models::{IdGenerator, NewTask, Priority, Task, TaskChanges, TaskStatus};
use crate::storage::{self, Storage, TASKS_KEY};
use chrono::NaiveDate;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }

    // All -> Pending -> InProgress -> Completed -> All
    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Only(TaskStatus::Pending),
            StatusFilter::Only(TaskStatus::Pending) => StatusFilter::Only(TaskStatus::InProgress),
            StatusFilter::Only(TaskStatus::InProgress) => StatusFilter::Only(TaskStatus::Completed),
            StatusFilter::Only(TaskStatus::Completed) => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "Todos los estados",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Rc<dyn Storage>,
    ids: IdGenerator,
}

impl TaskStore {
    /// Rehydrates from storage, seeding sample tasks when nothing usable is stored.
    pub fn load(storage: Rc<dyn Storage>) -> TaskStore {
        let tasks = match storage::load_json::<Vec<Task>>(storage.as_ref(), TASKS_KEY) {
            Ok(Some(tasks)) if !tasks.is_empty() => tasks,
            Ok(_) => sample_tasks(),
            Err(err) => {
                warn!(error = %err, "ignoring stored tasks");
                sample_tasks()
            }
        };
        debug!(count = tasks.len(), "tasks loaded");
        TaskStore {
            tasks,
            storage,
            ids: IdGenerator::default(),
        }
    }

    pub fn with_tasks(tasks: Vec<Task>, storage: Rc<dyn Storage>) -> TaskStore {
        TaskStore {
            tasks,
            storage,
            ids: IdGenerator::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add_task(&mut self, new_task: NewTask) -> Task {
        let task = new_task.into_task(self.ids.next_id());
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.push(task.clone());
        tasks.extend(self.tasks.iter().cloned());
        self.replace(tasks);
        task
    }

    pub fn update_task(&mut self, id: &str, changes: TaskChanges) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let mut tasks = self.tasks.clone();
        changes.apply_to(&mut tasks[index]);
        self.replace(tasks);
        true
    }

    pub fn assign_task(&mut self, id: &str, employee_id: &str) -> bool {
        self.update_task(
            id,
            TaskChanges {
                assignee_id: Some(employee_id.to_string()),
                ..TaskChanges::default()
            },
        )
    }

    pub fn search(&self, term: &str, filter: StatusFilter) -> Vec<&Task> {
        let term = term.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|t| filter.matches(t.status))
            .filter(|t| term.is_empty() || t.title.to_lowercase().contains(&term))
            .collect()
    }

    /// Tasks starting today or later, soonest first.
    pub fn upcoming(&self, today: NaiveDate, limit: usize) -> Vec<&Task> {
        let mut upcoming: Vec<_> = self
            .tasks
            .iter()
            .filter_map(|t| {
                let start = to_date(t.start_date.as_ref()?)?;
                (start.date() >= today).then_some((start, t))
            })
            .collect();
        upcoming.sort_by_key(|(start, _)| *start);
        upcoming.into_iter().take(limit).map(|(_, t)| t).collect()
    }

    // Calendar cell contents
    pub fn on_day(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| {
                t.start_date
                    .as_ref()
                    .and_then(|start| to_date(start))
                    .is_some_and(|start| start.date() == day)
            })
            .collect()
    }

    fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        if let Err(err) = storage::save_json(self.storage.as_ref(), TASKS_KEY, &self.tasks) {
            warn!(error = %err, "could not persist tasks");
        }
    }
}

type SampleRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    TaskStatus,
    Priority,
    f64,
    &'static str,
    &'static str,
);

const SAMPLE_TASKS: [SampleRow; 10] = [
    (
        "task-1",
        "Revisión de planos arquitectónicos",
        "Revisar y aprobar los planos de construcción del proyecto residencial. Verificar medidas, materiales y normativas.",
        "Constructora López",
        "e1",
        TaskStatus::InProgress,
        Priority::High,
        6.0,
        "2025-11-26",
        "2025-11-28",
    ),
    (
        "task-2",
        "Actualización de menú mensual",
        "Diseñar y actualizar el menú del mes con platillos de temporada. Coordinar con proveedores.",
        "Restaurante El Buen Sabor",
        "e2",
        TaskStatus::Pending,
        Priority::Medium,
        4.0,
        "2025-11-28",
        "2025-11-30",
    ),
    (
        "task-3",
        "Desarrollo de módulo de reportes",
        "Implementar sistema de reportes con exportación a PDF y Excel. Incluye gráficas y filtros avanzados.",
        "Tech Solutions",
        "e3",
        TaskStatus::InProgress,
        Priority::High,
        16.0,
        "2025-11-25",
        "2025-12-05",
    ),
    (
        "task-4",
        "Inspección de seguridad en obra",
        "Realizar inspección completa de medidas de seguridad en la obra. Generar reporte fotográfico.",
        "Constructora López",
        "e4",
        TaskStatus::Pending,
        Priority::High,
        3.0,
        "2025-11-27",
        "2025-11-27",
    ),
    (
        "task-5",
        "Reunión de seguimiento con cliente",
        "Presentar avances del proyecto y resolver dudas del cliente. Preparar documentación de soporte.",
        "Tech Solutions",
        "e5",
        TaskStatus::Pending,
        Priority::Medium,
        2.0,
        "2025-12-02",
        "2025-12-02",
    ),
    (
        "task-6",
        "Inventario de almacén",
        "Realizar conteo físico del inventario y actualizar sistema. Identificar productos de baja rotación.",
        "Restaurante El Buen Sabor",
        "e2",
        TaskStatus::Completed,
        Priority::Low,
        5.0,
        "2025-11-20",
        "2025-11-21",
    ),
    (
        "task-7",
        "Capacitación de personal nuevo",
        "Inducción y capacitación del equipo de cocina. Incluye protocolos de higiene y seguridad alimentaria.",
        "Restaurante El Buen Sabor",
        "e1",
        TaskStatus::InProgress,
        Priority::Medium,
        8.0,
        "2025-12-10",
        "2025-12-12",
    ),
    (
        "task-8",
        "Migración de base de datos",
        "Migrar base de datos a servidor en la nube. Incluye respaldos y pruebas de integridad.",
        "Tech Solutions",
        "e3",
        TaskStatus::Pending,
        Priority::High,
        12.0,
        "2025-12-15",
        "2025-12-17",
    ),
    (
        "task-9",
        "Mantenimiento preventivo de equipos",
        "Revisión y mantenimiento de maquinaria de cocina. Cambio de filtros y limpieza profunda.",
        "Restaurante El Buen Sabor",
        "e4",
        TaskStatus::Pending,
        Priority::Medium,
        4.0,
        "2025-11-29",
        "2025-11-29",
    ),
    (
        "task-10",
        "Auditoría de calidad",
        "Evaluación de procesos constructivos y verificación de estándares de calidad del proyecto.",
        "Constructora López",
        "e5",
        TaskStatus::Pending,
        Priority::High,
        5.0,
        "2025-12-03",
        "2025-12-04",
    ),
];

pub fn sample_tasks() -> Vec<Task> {
    SAMPLE_TASKS
        .iter()
        .map(
            |&(id, title, description, company, assignee, status, priority, hours, start, end)| {
                Task {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: Some(description.to_string()),
                    company: Some(company.to_string()),
                    assignee_id: Some(assignee.to_string()),
                    status,
                    priority,
                    estimated_hours: Some(hours),
                    start_date: Some(start.to_string()),
                    end_date: Some(end.to_string()),
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn empty_store() -> (TaskStore, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (TaskStore::with_tasks(Vec::new(), storage.clone()), storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_falls_back_to_samples() {
        let storage = Rc::new(MemoryStorage::new());
        let store = TaskStore::load(storage.clone());
        assert_eq!(store.tasks().len(), sample_tasks().len());

        storage.save(TASKS_KEY, "[]").unwrap();
        let store = TaskStore::load(storage.clone());
        assert_eq!(store.tasks().len(), sample_tasks().len());

        storage.save(TASKS_KEY, "garbage").unwrap();
        let store = TaskStore::load(storage);
        assert_eq!(store.tasks(), sample_tasks().as_slice());
    }

    #[test]
    fn test_add_task_prepends() {
        let (mut store, _) = empty_store();
        let x = store.add_task(NewTask::titled("X"));
        let y = store.add_task(NewTask::titled("Y"));

        assert_ne!(x.id, y.id);
        let titles: Vec<_> = store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Y", "X"]);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let (mut store, storage) = empty_store();
        let task = store.add_task(NewTask::titled("Migración de base de datos"));
        store.update_task(
            &task.id,
            TaskChanges {
                status: Some(TaskStatus::Completed),
                ..TaskChanges::default()
            },
        );

        let reloaded = TaskStore::load(storage);
        assert_eq!(reloaded.tasks().len(), 1);
        assert_eq!(reloaded.tasks()[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_update_unknown_task() {
        let (mut store, _) = empty_store();
        assert!(!store.update_task("missing", TaskChanges::default()));
        assert!(!store.assign_task("missing", "e1"));
    }

    #[test]
    fn test_assign_task() {
        let (mut store, _) = empty_store();
        let task = store.add_task(NewTask::titled("Auditoría"));
        assert!(store.assign_task(&task.id, "e4"));
        assert_eq!(
            store.get(&task.id).and_then(|t| t.assignee_id.as_deref()),
            Some("e4")
        );
    }

    #[test]
    fn test_search_by_title_and_status() {
        let storage = Rc::new(MemoryStorage::new());
        let store = TaskStore::load(storage);

        let hits: Vec<_> = store
            .search("INVENTARIO", StatusFilter::All)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(hits, vec!["task-6"]);

        let in_progress = store.search("", StatusFilter::Only(TaskStatus::InProgress));
        assert_eq!(in_progress.len(), 3);
        assert!(store
            .search("inventario", StatusFilter::Only(TaskStatus::Pending))
            .is_empty());
    }

    #[test]
    fn test_upcoming_sorted_and_limited() {
        let storage = Rc::new(MemoryStorage::new());
        let store = TaskStore::load(storage);

        let upcoming: Vec<_> = store
            .upcoming(date(2025, 11, 26), 2)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(upcoming, vec!["task-1", "task-4"]);
    }

    #[test]
    fn test_on_day_skips_tasks_without_dates() {
        let (mut store, _) = empty_store();
        store.add_task(NewTask::titled("Sin fecha"));
        let dated = store.add_task(NewTask {
            start_date: Some("02/12/2025".to_string()),
            ..NewTask::titled("Reunión")
        });

        let hits = store.on_day(date(2025, 12, 2));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, dated.id);
    }

    #[test]
    fn test_status_filter_cycles() {
        let mut filter = StatusFilter::All;
        for _ in 0..4 {
            filter = filter.next();
        }
        assert_eq!(filter, StatusFilter::All);
    }
}
