use redb::{Database, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

use crate::{task::Task, user::User};

const USERS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("users");
const EMAIL_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("email_index");
const TASKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Open (or create) the database and make sure every table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(TASKS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(DataContext { db: Arc::new(db) })
    }

    // USERS

    /// Insert a new user. Returns false, writing nothing, if the email is taken.
    pub fn create_user(&self, user: &User) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users_table = write_txn.open_table(USERS_TABLE)?;
            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            if email_index.get(user.email.as_str())?.is_some() {
                return Ok(false);
            }
            let user_bytes = encode(user)?;
            let id_bytes = user.id.as_bytes();
            users_table.insert(id_bytes.as_slice(), user_bytes.as_slice())?;
            email_index.insert(user.email.as_str(), id_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let users_table = read_txn.open_table(USERS_TABLE)?;
        let id_bytes = id.as_bytes();
        match users_table.get(id_bytes.as_slice())? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let email_index = read_txn.open_table(EMAIL_INDEX)?;

        match email_index.get(email)? {
            Some(id_data) => {
                let users_table = read_txn.open_table(USERS_TABLE)?;
                match users_table.get(id_data.value())? {
                    Some(user_data) => Ok(Some(decode(user_data.value())?)),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    /// Replace a stored user, moving its email index entry if the email changed.
    /// Returns false if the user is gone or the new email belongs to someone else.
    pub fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users_table = write_txn.open_table(USERS_TABLE)?;
            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            let id_bytes = user.id.as_bytes();

            let previous: User = match users_table.get(id_bytes.as_slice())? {
                Some(data) => decode(data.value())?,
                None => return Ok(false),
            };
            if previous.email != user.email {
                if let Some(owner) = email_index.get(user.email.as_str())? {
                    if owner.value() != id_bytes.as_slice() {
                        return Ok(false);
                    }
                }
                email_index.remove(previous.email.as_str())?;
                email_index.insert(user.email.as_str(), id_bytes.as_slice())?;
            }

            let user_bytes = encode(user)?;
            users_table.insert(id_bytes.as_slice(), user_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    // TASKS

    pub fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let task_bytes = encode(task)?;
            let id_bytes = task.id.as_bytes();
            tasks_table.insert(id_bytes.as_slice(), task_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let id_bytes = id.as_bytes();
        match tasks_table.get(id_bytes.as_slice())? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    /// All tasks owned by `owner`, in key order. No other ordering is implied.
    pub fn list_tasks_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let mut tasks = Vec::new();
        for entry in tasks_table.iter()? {
            let (_, value) = entry?;
            let task: Task = decode(value.value())?;
            if task.owner == owner {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Read, edit and rewrite a task inside one write transaction, so
    /// concurrent edits of the same task are applied one after the other.
    /// `Ok(None)` if the task does not exist. An `Err` from `edit` aborts
    /// the transaction and leaves the stored task as it was.
    pub fn update_task<E, F>(&self, id: Uuid, edit: F) -> Result<Option<Task>, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Task) -> Result<(), E>,
    {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let updated;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE).map_err(StoreError::from)?;
            let id_bytes = id.as_bytes();
            let mut task: Task = match tasks_table.get(id_bytes.as_slice()).map_err(StoreError::from)? {
                Some(data) => decode(data.value())?,
                None => return Ok(None),
            };

            edit(&mut task)?;

            let task_bytes = encode(&task)?;
            tasks_table
                .insert(id_bytes.as_slice(), task_bytes.as_slice())
                .map_err(StoreError::from)?;
            updated = task;
        }
        write_txn.commit().map_err(StoreError::from)?;
        Ok(Some(updated))
    }

    /// Remove a task if `check` accepts it, returning exactly what was removed.
    /// `Ok(None)` if the task does not exist.
    pub fn delete_task<E, F>(&self, id: Uuid, check: F) -> Result<Option<Task>, E>
    where
        E: From<StoreError>,
        F: FnOnce(&Task) -> Result<(), E>,
    {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let deleted;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE).map_err(StoreError::from)?;
            let id_bytes = id.as_bytes();
            let task: Task = match tasks_table.get(id_bytes.as_slice()).map_err(StoreError::from)? {
                Some(data) => decode(data.value())?,
                None => return Ok(None),
            };

            check(&task)?;

            tasks_table.remove(id_bytes.as_slice()).map_err(StoreError::from)?;
            deleted = task;
        }
        write_txn.commit().map_err(StoreError::from)?;
        Ok(Some(deleted))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(value).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb: {0}")]
    Redb(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("encode: {0}")]
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{register_request::RegisterRequest, task_fields::TaskFields};
    use chrono::Utc;
    use tempfile::TempDir;

    fn temp_store() -> (DataContext, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataContext::open(dir.path().join("tasks.redb")).unwrap();
        (store, dir)
    }

    fn task(owner: Uuid, title: &str) -> Task {
        Task::create(owner, TaskFields::with_title(title).normalize().unwrap(), Utc::now()).unwrap()
    }

    fn user(email: &str) -> User {
        User::new(RegisterRequest {
            name: "Test".into(),
            email: email.into(),
            password: "password".into(),
        })
        .unwrap()
    }

    #[test]
    fn empty_store() {
        let (store, _dir) = temp_store();
        assert!(store.list_tasks_by_owner(Uuid::nil()).unwrap().is_empty());
        assert!(store.get_task(Uuid::new_v4()).unwrap().is_none());
        assert!(store.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn insert_get_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.redb");
        let owner = Uuid::new_v4();
        let saved = task(owner, "Survives restart");

        {
            let store = DataContext::open(&path).unwrap();
            store.insert_task(&saved).unwrap();
        }

        let store = DataContext::open(&path).unwrap();
        assert_eq!(store.get_task(saved.id).unwrap(), Some(saved));
    }

    #[test]
    fn list_is_scoped_to_owner() {
        let (store, _dir) = temp_store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert_task(&task(alice, "a1")).unwrap();
        store.insert_task(&task(alice, "a2")).unwrap();
        store.insert_task(&task(bob, "b1")).unwrap();

        let mut titles: Vec<String> = store
            .list_tasks_by_owner(alice)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["a1", "a2"]);
        assert_eq!(store.list_tasks_by_owner(bob).unwrap().len(), 1);
    }

    #[test]
    fn update_and_delete_in_place() {
        let (store, _dir) = temp_store();
        let t = task(Uuid::nil(), "Original");
        store.insert_task(&t).unwrap();

        let updated = store
            .update_task(t.id, |stored: &mut Task| -> Result<(), StoreError> {
                stored.title = "Changed".into();
                Ok(())
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Changed");
        assert_eq!(store.get_task(t.id).unwrap().unwrap(), updated);

        let deleted = store
            .delete_task(t.id, |_: &Task| -> Result<(), StoreError> { Ok(()) })
            .unwrap();
        assert_eq!(deleted, Some(updated));
        assert!(store.get_task(t.id).unwrap().is_none());

        let again = store.delete_task(t.id, |_: &Task| -> Result<(), StoreError> { Ok(()) });
        assert!(again.unwrap().is_none());
        let missing = store.update_task(t.id, |_: &mut Task| -> Result<(), StoreError> { Ok(()) });
        assert!(missing.unwrap().is_none());
    }

    #[test]
    fn rejected_edit_writes_nothing() {
        let (store, _dir) = temp_store();
        let t = task(Uuid::nil(), "Untouched");
        store.insert_task(&t).unwrap();

        let result = store.update_task(t.id, |stored: &mut Task| -> Result<(), StoreError> {
            stored.title = "Half-applied".into();
            Err(StoreError::Encode("refused".into()))
        });
        assert!(result.is_err());

        let kept = store.delete_task(t.id, |_: &Task| -> Result<(), StoreError> {
            Err(StoreError::Encode("refused".into()))
        });
        assert!(kept.is_err());
        assert_eq!(store.get_task(t.id).unwrap(), Some(t));
    }

    #[test]
    fn email_is_unique() {
        let (store, _dir) = temp_store();
        assert!(store.create_user(&user("ada@example.com")).unwrap());
        assert!(!store.create_user(&user("ada@example.com")).unwrap());
    }

    #[test]
    fn update_user_moves_email_index() {
        let (store, _dir) = temp_store();
        let mut ada = user("ada@example.com");
        store.create_user(&ada).unwrap();
        store.create_user(&user("bob@example.com")).unwrap();

        ada.email = "bob@example.com".into();
        assert!(!store.update_user(&ada).unwrap());

        ada.email = "lovelace@example.com".into();
        assert!(store.update_user(&ada).unwrap());
        assert!(store.get_user_by_email("ada@example.com").unwrap().is_none());
        assert_eq!(
            store.get_user_by_email("lovelace@example.com").unwrap().unwrap().id,
            ada.id
        );
    }
}
