use crate::models::{Employee, IdGenerator, NewEmployee};
use crate::storage::{load_or, save_logged, Storage, COMPANIES_KEY, EMPLOYEES_KEY};
use std::rc::Rc;
use tracing::debug;

pub struct EmployeeStore {
    employees: Vec<Employee>,
    companies: Vec<String>,
    storage: Rc<dyn Storage>,
    ids: IdGenerator,
}

impl EmployeeStore {
    // Unlike tasks, an empty stored list is kept as is
    pub fn load(storage: Rc<dyn Storage>) -> EmployeeStore {
        let employees = load_or(storage.as_ref(), EMPLOYEES_KEY, sample_employees);
        let companies = load_or(storage.as_ref(), COMPANIES_KEY, sample_companies);
        debug!(
            employees = employees.len(),
            companies = companies.len(),
            "employees loaded"
        );
        EmployeeStore {
            employees,
            companies,
            storage,
            ids: IdGenerator::default(),
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn get(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn search(&self, term: &str) -> Vec<&Employee> {
        let term = term.trim().to_lowercase();
        self.employees
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&term))
            .collect()
    }

    pub fn add_employee(&mut self, new_employee: NewEmployee) -> Employee {
        let employee = new_employee.into_employee(self.ids.next_id());
        let mut employees = Vec::with_capacity(self.employees.len() + 1);
        employees.push(employee.clone());
        employees.extend(self.employees.iter().cloned());
        self.employees = employees;
        self.persist_employees();
        employee
    }

    pub fn increment_active_tasks(&mut self, id: &str) -> bool {
        let Some(index) = self.employees.iter().position(|e| e.id == id) else {
            return false;
        };
        let mut employees = self.employees.clone();
        employees[index].active_tasks += 1;
        self.employees = employees;
        self.persist_employees();
        true
    }

    /// Appends `name` unless it is already listed.
    pub fn add_company(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.companies.iter().any(|c| c == name) {
            return false;
        }
        let mut companies = self.companies.clone();
        companies.push(name.to_string());
        self.companies = companies;
        save_logged(self.storage.as_ref(), COMPANIES_KEY, &self.companies);
        true
    }

    fn persist_employees(&self) {
        save_logged(self.storage.as_ref(), EMPLOYEES_KEY, &self.employees);
    }
}

pub fn sample_companies() -> Vec<String> {
    ["Constructora del Norte", "Restaurante El Sabor", "Tech Solutions"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn sample_employees() -> Vec<Employee> {
    let companies = sample_companies();
    let rows = [
        ("e1", "Carlos Méndez", "Encargado", 0, "carlos@constructora.com", "+56 9 1234 5678", 3),
        ("e2", "María González", "Chef", 1, "maria@elsabor.com", "+56 9 8765 4321", 2),
        ("e3", "Juan Pérez", "Desarrollador", 2, "juan@techsolutions.com", "+56 9 5555 6666", 5),
        ("e4", "Ana Martínez", "Diseñadora", 2, "ana@techsolutions.com", "+56 9 7777 8888", 4),
        ("e5", "Pedro Ramírez", "Supervisor", 0, "pedro@constructora.com", "+56 9 9999 0000", 2),
    ];
    rows.into_iter()
        .map(|(id, name, role, company, email, phone, active_tasks)| Employee {
            id: id.to_string(),
            name: name.to_string(),
            role: Some(role.to_string()),
            company: companies[company].clone(),
            email: email.to_string(),
            phone: phone.to_string(),
            avatar: None,
            active_tasks,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn new_employee(name: &str) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            role: Some("Mesera".to_string()),
            company: "Restaurante El Sabor".to_string(),
            email: "ana@elsabor.com".to_string(),
            phone: "+52 33 1234 5678".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_seeds_samples_when_storage_empty() {
        let store = EmployeeStore::load(Rc::new(MemoryStorage::new()));
        assert_eq!(store.employees().len(), 5);
        assert_eq!(store.companies(), sample_companies().as_slice());
    }

    #[test]
    fn test_keeps_stored_empty_list() {
        let storage = Rc::new(MemoryStorage::new());
        storage.save(EMPLOYEES_KEY, "[]").unwrap();
        let store = EmployeeStore::load(storage);
        assert!(store.employees().is_empty());
    }

    #[test]
    fn test_add_employee_prepends_with_zero_counter() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = EmployeeStore::load(storage.clone());

        let added = store.add_employee(new_employee("Ana Hernández"));
        assert_eq!(added.active_tasks, 0);
        assert_eq!(store.employees()[0].id, added.id);
        assert_eq!(store.employees().len(), 6);

        let reloaded = EmployeeStore::load(storage);
        assert_eq!(reloaded.employees()[0].name, "Ana Hernández");
    }

    #[test]
    fn test_increment_active_tasks() {
        let mut store = EmployeeStore::load(Rc::new(MemoryStorage::new()));
        assert!(store.increment_active_tasks("e2"));
        assert!(store.increment_active_tasks("e2"));
        assert_eq!(store.get("e2").map(|e| e.active_tasks), Some(4));
        assert!(!store.increment_active_tasks("missing"));
    }

    #[test]
    fn test_add_company_deduplicates() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = EmployeeStore::load(storage.clone());
        assert!(store.add_company("Aserradero Los Pinos"));
        assert!(!store.add_company("Tech Solutions"));
        assert!(!store.add_company("  "));
        assert_eq!(store.companies().len(), 4);

        let reloaded = EmployeeStore::load(storage);
        assert_eq!(
            reloaded.companies().last().map(String::as_str),
            Some("Aserradero Los Pinos")
        );
    }

    #[test]
    fn test_search_by_name() {
        let store = EmployeeStore::load(Rc::new(MemoryStorage::new()));
        let hits: Vec<_> = store.search("MAR").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(hits, vec!["e2", "e4"]);
    }
}
