use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{Sweet, SweetDraft};
use super::tables::*;

/// Outcome of a read-modify-write on one sweet
#[derive(Debug)]
pub enum Modified<E> {
    /// The change was applied and committed
    Updated(Sweet),
    /// No sweet with that id
    Missing,
    /// The closure refused the change; nothing was written
    Rejected(E),
}

impl Database {
    // ========================================================================
    // Sweet operations
    // ========================================================================

    /// Store a new sweet under the next id from the sweet sequence
    pub fn insert_sweet(&self, draft: SweetDraft) -> Result<Sweet, DatabaseError> {
        let write_txn = self.begin_write()?;
        let sweet = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let last = sequences
                .get(SWEET_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0);
            let id = last + 1;
            sequences.insert(SWEET_SEQUENCE, id)?;

            let sweet = draft.into_sweet(id);
            let data = rmp_serde::to_vec_named(&sweet)?;
            let mut table = write_txn.open_table(SWEETS)?;
            table.insert(id, data.as_slice())?;
            sweet
        };
        write_txn.commit()?;
        Ok(sweet)
    }

    /// Get a sweet by id
    pub fn get_sweet(&self, id: u64) -> Result<Option<Sweet>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SWEETS)?;

        match table.get(id)? {
            Some(data) => {
                let sweet: Sweet = rmp_serde::from_slice(data.value())?;
                Ok(Some(sweet))
            }
            None => Ok(None),
        }
    }

    /// All sweets in ascending id order
    pub fn list_sweets(&self) -> Result<Vec<Sweet>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SWEETS)?;

        let mut sweets = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let sweet: Sweet = rmp_serde::from_slice(value.value())?;
            sweets.push(sweet);
        }

        Ok(sweets)
    }

    /// Delete a sweet, returning whether it existed
    pub fn delete_sweet(&self, id: u64) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(SWEETS)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Read, change and write back one sweet inside a single write transaction.
    ///
    /// `change` sees the committed state of the record. Returning `Err` from it
    /// aborts the transaction, leaving the stored record untouched.
    pub fn modify_sweet<E, F>(&self, id: u64, change: F) -> Result<Modified<E>, DatabaseError>
    where
        F: FnOnce(&mut Sweet) -> Result<(), E>,
    {
        let write_txn = self.begin_write()?;

        let existing: Option<Sweet> = {
            let table = write_txn.open_table(SWEETS)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        let mut sweet = match existing {
            Some(sweet) => sweet,
            None => {
                write_txn.abort()?;
                return Ok(Modified::Missing);
            }
        };

        if let Err(e) = change(&mut sweet) {
            write_txn.abort()?;
            return Ok(Modified::Rejected(e));
        }
        debug_assert_eq!(sweet.id, id, "modify_sweet must not change the id");

        {
            let data = rmp_serde::to_vec_named(&sweet)?;
            let mut table = write_txn.open_table(SWEETS)?;
            table.insert(id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(Modified::Updated(sweet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_draft, setup_db};

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let (db, _temp) = setup_db();

        let a = db.insert_sweet(make_draft("Ladoo", "Bengali", 2.5, 10)).unwrap();
        let b = db.insert_sweet(make_draft("Barfi", "North Indian", 3.0, 5)).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(db.get_sweet(a.id).unwrap().unwrap().name, "Ladoo");
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (db, _temp) = setup_db();

        let a = db.insert_sweet(make_draft("Ladoo", "Bengali", 2.5, 10)).unwrap();
        assert!(db.delete_sweet(a.id).unwrap());

        let b = db.insert_sweet(make_draft("Barfi", "Bengali", 3.0, 5)).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_list_in_insertion_order() {
        let (db, _temp) = setup_db();
        for name in ["Jalebi", "Ladoo", "Barfi"] {
            db.insert_sweet(make_draft(name, "Mixed", 1.0, 1)).unwrap();
        }

        let names: Vec<String> = db.list_sweets().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Jalebi", "Ladoo", "Barfi"]);
    }

    #[test]
    fn test_delete_missing_returns_false() {
        let (db, _temp) = setup_db();
        assert!(!db.delete_sweet(42).unwrap());
    }

    #[test]
    fn test_modify_updates_record() {
        let (db, _temp) = setup_db();
        let sweet = db.insert_sweet(make_draft("Ladoo", "Bengali", 2.5, 10)).unwrap();

        let result = db
            .modify_sweet::<(), _>(sweet.id, |s| {
                s.quantity -= 1;
                Ok(())
            })
            .unwrap();

        match result {
            Modified::Updated(updated) => assert_eq!(updated.quantity, 9),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(db.get_sweet(sweet.id).unwrap().unwrap().quantity, 9);
    }

    #[test]
    fn test_modify_rejected_leaves_record_untouched() {
        let (db, _temp) = setup_db();
        let sweet = db.insert_sweet(make_draft("Ladoo", "Bengali", 2.5, 10)).unwrap();

        let result = db
            .modify_sweet(sweet.id, |s| {
                s.quantity = 0;
                Err("no")
            })
            .unwrap();

        assert!(matches!(result, Modified::Rejected("no")));
        assert_eq!(db.get_sweet(sweet.id).unwrap().unwrap().quantity, 10);
    }

    #[test]
    fn test_modify_missing() {
        let (db, _temp) = setup_db();
        let result = db.modify_sweet::<(), _>(7, |_| Ok(())).unwrap();
        assert!(matches!(result, Modified::Missing));
    }
}
