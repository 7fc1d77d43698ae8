mod adapter;
mod bind;
mod builder;
mod col;
mod config;
mod connection;
mod error;
mod expr;
mod grammar;
mod ident;
mod join;
mod paginate;
mod query;
mod raw;
mod row;
mod value;
mod writer;

pub use adapter::Adapter;
pub use adapter::Connector;
pub use adapter::Record;

pub use bind::Array;
pub use bind::Bind;
pub use bind::Binds;
pub use bind::IntoBind;
pub use bind::IntoBinds;

pub use builder::Builder;
pub use builder::QueryKind;
pub use builder::Statement;

pub use col::Columns;
pub use col::IntoColumns;

pub use config::Config;
pub use config::Target;

pub use connection::Connection;

pub use error::Error;
pub use error::Result;

pub use expr::Condition;
pub use expr::Conditions;
pub use expr::Conjunction;
pub use expr::IntoOrder;
pub use expr::OrderExpr;
pub use expr::Ordering;
pub use expr::Where;

pub use grammar::Ansi;
pub use grammar::Clause;
pub use grammar::Grammar;

pub use ident::Ident;
pub use ident::IntoIdent;

pub use join::JoinClause;
pub use join::JoinType;

pub use paginate::Paginator;

pub use query::Query;

pub use raw::IntoRaw;
pub use raw::Raw;

pub use row::Field;
pub use row::IntoField;
pub use row::IntoRow;
pub use row::Row;

pub use value::IntoValue;
pub use value::Value;

pub use writer::FormatContext;

pub fn ident_static(value: &'static str) -> Ident {
    Ident::new_static(value)
}

pub fn ident(value: &str) -> Ident {
    Ident::new(value)
}

pub fn raw_static(value: &'static str) -> Raw {
    Raw::new_static(value)
}

/// Literal SQL, written as is and never bound: `raw("views + 1")`.
pub fn raw(value: &str) -> Raw {
    Raw::new(value)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, rc::Rc};

    use smol_str::SmolStr;

    use crate::{
        Adapter, Bind, Connector, Error, Record, Result, Target,
        bind::Binds,
        writer::{FormatContext, FormatWriter},
    };

    pub(crate) fn format_writer<F: FormatWriter>(value: F) -> (String, Binds) {
        let mut str = String::new();
        let mut context = FormatContext::new(&mut str);
        value.format_writer(&mut context).unwrap();
        let binds = context.take_binds();
        (str, binds)
    }

    pub(crate) fn record<const N: usize>(fields: [(&str, Bind); N]) -> Record {
        fields
            .into_iter()
            .map(|(column, value)| (SmolStr::from(column), value))
            .collect()
    }

    /// Connector double: every adapter it opens answers queries with `rows`
    /// and writes what it is asked to do to a shared event list.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MemoryConnector {
        events: Rc<RefCell<Vec<String>>>,
        rows: Vec<Record>,
        fail_commit: bool,
    }

    impl MemoryConnector {
        pub(crate) fn with_rows(rows: Vec<Record>) -> Self {
            Self {
                rows,
                ..Default::default()
            }
        }

        pub(crate) fn failing_commit(mut self) -> Self {
            self.fail_commit = true;
            self
        }

        pub(crate) fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    pub(crate) struct MemoryAdapter {
        name: String,
        events: Rc<RefCell<Vec<String>>>,
        rows: Vec<Record>,
        fail_commit: bool,
        last_id: u64,
    }

    impl MemoryAdapter {
        fn push(&self, event: &str) {
            self.events
                .borrow_mut()
                .push(format!("{}: {event}", self.name));
        }
    }

    impl Adapter for MemoryAdapter {
        fn query(&mut self, sql: &str, _binds: &[Bind]) -> Result<Vec<Record>> {
            self.push(sql);
            Ok(self.rows.clone())
        }

        fn execute(&mut self, sql: &str, _binds: &[Bind]) -> Result<u64> {
            self.push(sql);
            self.last_id += 1;
            Ok(1)
        }

        fn last_insert_id(&mut self) -> Result<Bind> {
            Ok(Bind::U64(self.last_id))
        }

        fn begin(&mut self) -> Result<()> {
            self.push("BEGIN");
            Ok(())
        }

        fn commit(&mut self) -> Result<()> {
            self.push("COMMIT");
            if self.fail_commit {
                return Err(Error::adapter("commit failed"));
            }
            Ok(())
        }

        fn rollback(&mut self) -> Result<()> {
            self.push("ROLLBACK");
            Ok(())
        }
    }

    impl Connector for MemoryConnector {
        type Adapter = MemoryAdapter;

        fn connect(&self, target: &Target) -> Result<Self::Adapter> {
            self.events
                .borrow_mut()
                .push(format!("connect {}", target.dsn));
            Ok(MemoryAdapter {
                name: target.dsn.clone(),
                events: Rc::clone(&self.events),
                rows: self.rows.clone(),
                fail_commit: self.fail_commit,
                last_id: 0,
            })
        }
    }
}
