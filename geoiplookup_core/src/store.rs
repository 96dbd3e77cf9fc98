//! Persistent partitioned store: one partition per address family, each
//! mapping a canonical `network/prefix` key to a country code.
//!
//! Every operation is a single-key transaction. Writers are serialised by
//! the store; readers run on their own snapshot and never block each other.

use crate::errors::Result;
use crate::types::IpFamily;
use log::debug;
use redb::{Database, Durability, ReadableTableMetadata, TableDefinition};
use std::path::{Path, PathBuf};

#[inline]
fn partition(family: IpFamily) -> TableDefinition<'static, &'static str, &'static str> {
    TableDefinition::new(family.partition())
}

pub struct SubnetStore {
    db: Database,
    path: PathBuf,
}

impl SubnetStore {
    /// Open the store file, creating it when absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)?;
        debug!("[STORE] opened {}", path.display());
        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the partition for `family`; a no-op when it already exists.
    pub fn ensure_partition(&self, family: IpFamily) -> Result<()> {
        let txn = self.db.begin_write()?;
        txn.open_table(partition(family))?;
        txn.commit()?;
        Ok(())
    }

    /// Insert or overwrite `key -> country` in one write transaction.
    ///
    /// The commit is only guaranteed durable after the next `sync`.
    pub fn upsert(&self, family: IpFamily, key: &str, country: &str) -> Result<()> {
        let mut txn = self.db.begin_write()?;
        txn.set_durability(Durability::Eventual);
        {
            let mut table = txn.open_table(partition(family))?;
            table.insert(key, country)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Exact-key read in its own read transaction.
    pub fn get(&self, family: IpFamily, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(partition(family))?;
        let country = table.get(key)?.map(|v| v.value().to_owned());
        Ok(country)
    }

    /// Number of keys in a partition.
    pub fn len(&self, family: IpFamily) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(partition(family))?;
        Ok(table.len()?)
    }

    /// Commit an empty transaction with immediate durability, flushing
    /// every earlier eventual commit to disk.
    pub fn sync(&self) -> Result<()> {
        let mut txn = self.db.begin_write()?;
        txn.set_durability(Durability::Immediate);
        txn.commit()?;
        Ok(())
    }
}
