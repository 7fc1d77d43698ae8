//! Database access seam.
//!
//! An [`Adapter`] is one open physical connection. A [`Connector`] knows how to
//! open one for a configured [`Target`].

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::{Bind, config::Target, error::Result};

/// One result row: column name to value, in select order.
pub type Record = IndexMap<SmolStr, Bind>;

pub trait Adapter {
    /// Run a read statement and return every row.
    fn query(&mut self, sql: &str, binds: &[Bind]) -> Result<Vec<Record>>;

    /// Run a write statement and return the affected row count.
    fn execute(&mut self, sql: &str, binds: &[Bind]) -> Result<u64>;

    /// Id generated by the last insert on this connection.
    fn last_insert_id(&mut self) -> Result<Bind>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}

impl<A: Adapter + ?Sized> Adapter for Box<A> {
    fn query(&mut self, sql: &str, binds: &[Bind]) -> Result<Vec<Record>> {
        (**self).query(sql, binds)
    }

    fn execute(&mut self, sql: &str, binds: &[Bind]) -> Result<u64> {
        (**self).execute(sql, binds)
    }

    fn last_insert_id(&mut self) -> Result<Bind> {
        (**self).last_insert_id()
    }

    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<()> {
        (**self).rollback()
    }
}

pub trait Connector {
    type Adapter: Adapter;

    /// Open a connection. `target` has already been validated.
    fn connect(&self, target: &Target) -> Result<Self::Adapter>;
}
