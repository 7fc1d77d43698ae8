use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::{
    Ansi, Bind, Builder, Connection, Grammar,
    adapter::{Connector, Record},
    builder::Statement,
    error::Result,
};

/// A [`Builder`] tied to the connection that will run it.
///
/// Mutate it through the builder methods, then call one of the fetch or
/// execute methods; the statement is compiled with `G` on first use.
pub struct Query<'c, C: Connector, G: Grammar = Ansi> {
    builder: Builder,
    connection: &'c mut Connection<C>,
    grammar: PhantomData<G>,
}

impl<'c, C: Connector, G: Grammar> Query<'c, C, G> {
    pub(crate) fn new(connection: &'c mut Connection<C>, builder: Builder) -> Self {
        Self {
            builder,
            connection,
            grammar: PhantomData,
        }
    }

    pub fn with_grammar<O: Grammar>(self) -> Query<'c, C, O> {
        Query::new(self.connection, self.builder)
    }

    pub fn into_builder(self) -> Builder {
        self.builder
    }

    pub fn sql(&mut self) -> Result<&str> {
        self.builder.to_sql::<G>()
    }

    fn statement(&mut self) -> Result<Statement> {
        self.builder.compile::<G>()
    }

    pub fn fetch_all(&mut self) -> Result<Vec<Record>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_all(&sql, binds)
    }

    pub fn fetch_all_indexed(&mut self) -> Result<IndexMap<SmolStr, Record>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_all_indexed(&sql, binds)
    }

    pub fn fetch_all_grouped(&mut self) -> Result<IndexMap<SmolStr, Vec<Record>>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_all_grouped(&sql, binds)
    }

    pub fn fetch_row(&mut self) -> Result<Option<Record>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_row(&sql, binds)
    }

    pub fn fetch_column(&mut self) -> Result<Vec<Bind>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_column(&sql, binds)
    }

    pub fn fetch_pairs(&mut self) -> Result<IndexMap<SmolStr, Bind>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_pairs(&sql, binds)
    }

    pub fn fetch_pairs_grouped(&mut self) -> Result<IndexMap<SmolStr, IndexMap<SmolStr, Bind>>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_pairs_grouped(&sql, binds)
    }

    pub fn fetch_one(&mut self) -> Result<Option<Bind>> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.fetch_one(&sql, binds)
    }

    /// Run an insert, update or delete and return the affected row count.
    pub fn execute(&mut self) -> Result<u64> {
        let Statement { sql, binds } = self.statement()?;
        self.connection.execute(&sql, binds)
    }

    pub fn last_insert_id(&mut self) -> Result<Bind> {
        self.connection.last_insert_id()
    }
}

impl<C: Connector, G: Grammar> Deref for Query<'_, C, G> {
    type Target = Builder;

    fn deref(&self) -> &Self::Target {
        &self.builder
    }
}

impl<C: Connector, G: Grammar> DerefMut for Query<'_, C, G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.builder
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Config, Target,
        tests::{MemoryConnector, record},
    };

    use super::*;

    #[test]
    fn test_query_runs_compiled_statement() {
        let connector = MemoryConnector::with_rows(vec![record([("id", Bind::I32(4))])]);
        let mut conn = Connection::new(connector.clone(), Config::new(Target::new("db1")));

        let mut query = conn.query("users");
        query.select("id").where_clause("name LIKE?", "ann");
        assert_eq!(Some(Bind::I32(4)), query.fetch_one().unwrap());
        // compiled once, a second fetch reuses the same statement
        assert_eq!(1, query.fetch_column().unwrap().len());
        assert_eq!(1, query.binds().len());

        let last = conn.last_log().unwrap();
        assert_eq!("SELECT id FROM users WHERE name LIKE ?", last.sql);
        assert_eq!(vec![Bind::from("%ann%")], last.binds);
    }

    #[test]
    fn test_query_execute_insert() {
        let connector = MemoryConnector::default();
        let mut conn = Connection::new(connector.clone(), Config::new(Target::new("db1")));

        let mut query = conn.query("users");
        query.insert([("name", "ann"), ("email", "ann@example.com")]);
        assert_eq!(1, query.execute().unwrap());
        assert_eq!(Bind::U64(1), query.last_insert_id().unwrap());
        assert_eq!(
            vec!["connect db1", "db1: INSERT INTO users (name, email) VALUES (?, ?)"],
            connector.events()
        );
    }

    #[test]
    fn test_query_compile_error() {
        let connector = MemoryConnector::default();
        let mut conn = Connection::new(connector.clone(), Config::new(Target::new("db1")));

        let mut query = conn.query("users");
        query.where_clause("id IN?", Vec::<i32>::new());
        assert!(query.fetch_all().unwrap_err().is_invalid_argument());
        assert!(connector.events().is_empty());
    }

    #[test]
    fn test_into_builder() {
        let connector = MemoryConnector::default();
        let mut conn = Connection::new(connector, Config::new(Target::new("db1")));
        let mut query = conn.query("users");
        query.limit(1);
        let mut builder = query.into_builder();
        assert_eq!("SELECT * FROM users LIMIT 1", builder.to_sql::<Ansi>().unwrap());
    }
}
