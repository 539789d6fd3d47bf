use crate::models::{IdGenerator, Permission, PermissionFlag, PermissionState};
use crate::storage::{load_or, save_logged, Storage, PERMISSIONS_KEY};
use std::rc::Rc;
use tracing::debug;

pub const PAGE_SIZE: usize = 10;

pub struct PermissionStore {
    permissions: Vec<Permission>,
    storage: Rc<dyn Storage>,
    ids: IdGenerator,
}

impl PermissionStore {
    pub fn load(storage: Rc<dyn Storage>) -> PermissionStore {
        let permissions = load_or(storage.as_ref(), PERMISSIONS_KEY, sample_permissions);
        debug!(count = permissions.len(), "permissions loaded");
        PermissionStore {
            permissions,
            storage,
            ids: IdGenerator::default(),
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn get(&self, id: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.id == id)
    }

    pub fn total_pages(&self) -> usize {
        self.permissions.len().div_ceil(PAGE_SIZE)
    }

    /// Rows of the 1-based `page`, empty past the last one.
    pub fn page(&self, page: usize) -> &[Permission] {
        let start = page.saturating_sub(1) * PAGE_SIZE;
        if page == 0 || start >= self.permissions.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.permissions.len());
        &self.permissions[start..end]
    }

    /// Replaces the record with the same id, or adds it with a fresh id.
    pub fn save(&mut self, mut permission: Permission) -> Permission {
        let mut permissions = self.permissions.clone();
        match permissions.iter().position(|p| p.id == permission.id) {
            Some(index) if !permission.id.is_empty() => permissions[index] = permission.clone(),
            _ => {
                permission.id = self.ids.next_id();
                permissions.push(permission.clone());
            }
        }
        self.replace(permissions);
        permission
    }

    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let permissions = self
            .permissions
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        self.replace(permissions);
        true
    }

    pub fn toggle(&mut self, id: &str, flag: PermissionFlag) -> bool {
        self.modify(id, |p| {
            let value = p.flag_mut(flag);
            *value = !*value;
        })
    }

    pub fn toggle_state(&mut self, id: &str) -> bool {
        self.modify(id, |p| {
            p.state = match p.state {
                PermissionState::Active => PermissionState::Inactive,
                PermissionState::Inactive => PermissionState::Active,
            };
        })
    }

    fn modify(&mut self, id: &str, change: impl FnOnce(&mut Permission)) -> bool {
        let Some(index) = self.permissions.iter().position(|p| p.id == id) else {
            return false;
        };
        let mut permissions = self.permissions.clone();
        change(&mut permissions[index]);
        self.replace(permissions);
        true
    }

    fn replace(&mut self, permissions: Vec<Permission>) {
        self.permissions = permissions;
        save_logged(self.storage.as_ref(), PERMISSIONS_KEY, &self.permissions);
    }
}

pub fn sample_permissions() -> Vec<Permission> {
    (0..25)
        .map(|i| Permission {
            id: (i + 1).to_string(),
            user: format!("Usuario {}", i + 1),
            email: format!("usuario{}@empresa.com", i + 1),
            company: ["Empresa A", "Empresa B", "Empresa C"][i % 3].to_string(),
            read: true,
            write: i % 2 == 0,
            edit: i % 3 == 0,
            delete: i % 5 == 0,
            reports: i % 2 == 0,
            settings: i % 4 == 0,
            state: if i % 7 != 0 {
                PermissionState::Active
            } else {
                PermissionState::Inactive
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (PermissionStore, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (PermissionStore::load(storage.clone()), storage)
    }

    #[test]
    fn test_samples_and_paging() {
        let (store, _) = store();
        assert_eq!(store.permissions().len(), 25);
        assert_eq!(store.total_pages(), 3);
        assert_eq!(store.page(1).len(), 10);
        assert_eq!(store.page(3).len(), 5);
        assert_eq!(store.page(3)[0].id, "21");
        assert!(store.page(0).is_empty());
        assert!(store.page(4).is_empty());

        let first = &store.permissions()[0];
        assert_eq!(first.company, "Empresa A");
        assert_eq!(first.state, PermissionState::Inactive);
        assert!(first.delete && first.settings);
    }

    #[test]
    fn test_save_updates_or_adds() {
        let (mut store, storage) = store();
        let mut edited = store.get("2").cloned().unwrap();
        edited.email = "ana@empresa.com".to_string();
        store.save(edited);

        let added = store.save(Permission {
            user: "Nuevo".to_string(),
            company: "Empresa B".to_string(),
            read: true,
            ..Permission::default()
        });
        assert!(!added.id.is_empty());

        let reloaded = PermissionStore::load(storage);
        assert_eq!(reloaded.permissions().len(), 26);
        assert_eq!(
            reloaded.get("2").map(|p| p.email.as_str()),
            Some("ana@empresa.com")
        );
        assert_eq!(reloaded.permissions()[25].user, "Nuevo");
    }

    #[test]
    fn test_toggle_flags_and_state() {
        let (mut store, _) = store();
        assert!(store.toggle("2", PermissionFlag::Write));
        assert_eq!(store.get("2").map(|p| p.write), Some(true));
        assert!(store.toggle_state("1"));
        assert_eq!(store.get("1").map(|p| p.state), Some(PermissionState::Active));
        assert!(!store.toggle("99", PermissionFlag::Read));
    }

    #[test]
    fn test_delete() {
        let (mut store, _) = store();
        assert!(store.delete("5"));
        assert!(!store.delete("5"));
        assert_eq!(store.permissions().len(), 24);
    }
}
