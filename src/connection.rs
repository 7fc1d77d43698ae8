use indexmap::IndexMap;
use smol_str::{SmolStr, format_smolstr};

use crate::{
    Ansi, Bind, Builder, IntoBinds, IntoIdent, IntoRow, Query, Where,
    adapter::{Adapter, Connector, Record},
    builder::Statement,
    config::{Config, Target},
    error::{Error, Result},
};

/// A primary target and an optional read only secondary, opened lazily.
///
/// Reads go to the secondary when one is configured and no transaction is
/// open; everything else goes to the primary. Transactions nest: only the
/// outermost `begin`/`commit` reaches the adapter.
pub struct Connection<C: Connector> {
    connector: C,
    config: Config,
    maybe_primary: Option<C::Adapter>,
    maybe_secondary: Option<C::Adapter>,
    depth: usize,
    maybe_last: Option<Statement>,
}

impl<C: Connector> Connection<C> {
    pub fn new(connector: C, config: Config) -> Self {
        Self {
            connector,
            config: config.normalized(),
            maybe_primary: None,
            maybe_secondary: None,
            depth: 0,
            maybe_last: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The read/write adapter, connecting on first use.
    pub fn primary(&mut self) -> Result<&mut C::Adapter> {
        let adapter = match self.maybe_primary.take() {
            Some(adapter) => adapter,
            None => open(&self.connector, &self.config.primary, "primary")?,
        };
        Ok(self.maybe_primary.insert(adapter))
    }

    /// The adapter reads are routed to.
    pub fn reader(&mut self) -> Result<&mut C::Adapter> {
        if self.depth > 0 {
            return self.primary();
        }
        let Some(target) = self.config.secondary.as_ref() else {
            return self.primary();
        };
        let adapter = match self.maybe_secondary.take() {
            Some(adapter) => adapter,
            None => open(&self.connector, target, "secondary")?,
        };
        Ok(self.maybe_secondary.insert(adapter))
    }

    /// Last statement handed to an adapter.
    pub fn last_log(&self) -> Option<&Statement> {
        self.maybe_last.as_ref()
    }

    fn log(&mut self, sql: &str, binds: Vec<Bind>) {
        tracing::debug!(sql, binds = binds.len(), "running statement");
        self.maybe_last = Some(Statement {
            sql: sql.to_owned(),
            binds,
        });
    }

    fn read<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<Vec<Record>> {
        let binds = binds.into_binds().into_vec();
        self.log(sql, binds.clone());
        self.reader()?.query(sql, &binds)
    }

    // queries

    pub fn query<T: IntoIdent>(&mut self, table: T) -> Query<'_, C> {
        Query::new(self, Builder::table(table))
    }

    pub fn fetch_all<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<Vec<Record>> {
        self.read(sql, binds)
    }

    /// Rows keyed by their first column, which is removed from the row.
    /// A later row with the same key replaces the earlier one.
    pub fn fetch_all_indexed<B: IntoBinds>(
        &mut self,
        sql: &str,
        binds: B,
    ) -> Result<IndexMap<SmolStr, Record>> {
        let mut indexed = IndexMap::new();
        for mut record in self.read(sql, binds)? {
            if let Some((_, first)) = record.shift_remove_index(0) {
                indexed.insert(key(&first), record);
            }
        }
        Ok(indexed)
    }

    /// Rows grouped by their first column, which is removed from the row.
    pub fn fetch_all_grouped<B: IntoBinds>(
        &mut self,
        sql: &str,
        binds: B,
    ) -> Result<IndexMap<SmolStr, Vec<Record>>> {
        let mut grouped: IndexMap<SmolStr, Vec<Record>> = IndexMap::new();
        for mut record in self.read(sql, binds)? {
            if let Some((_, first)) = record.shift_remove_index(0) {
                grouped.entry(key(&first)).or_default().push(record);
            }
        }
        Ok(grouped)
    }

    pub fn fetch_row<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<Option<Record>> {
        Ok(self.read(sql, binds)?.into_iter().next())
    }

    /// First column of every row.
    pub fn fetch_column<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<Vec<Bind>> {
        let column = self
            .read(sql, binds)?
            .into_iter()
            .filter_map(|mut record| record.shift_remove_index(0).map(|(_, value)| value))
            .collect();
        Ok(column)
    }

    /// First column as key, second as value.
    pub fn fetch_pairs<B: IntoBinds>(
        &mut self,
        sql: &str,
        binds: B,
    ) -> Result<IndexMap<SmolStr, Bind>> {
        let mut pairs = IndexMap::new();
        for record in self.read(sql, binds)? {
            let [first, second] = leading::<2>(&record, "fetch_pairs")?;
            pairs.insert(key(first), second.clone());
        }
        Ok(pairs)
    }

    /// `{col0: {col1: col2}}`; a repeated first column replaces the whole
    /// inner map.
    pub fn fetch_pairs_grouped<B: IntoBinds>(
        &mut self,
        sql: &str,
        binds: B,
    ) -> Result<IndexMap<SmolStr, IndexMap<SmolStr, Bind>>> {
        let mut grouped = IndexMap::new();
        for record in self.read(sql, binds)? {
            let [outer, inner, value] = leading::<3>(&record, "fetch_pairs_grouped")?;
            let pair = IndexMap::from([(key(inner), value.clone())]);
            grouped.insert(key(outer), pair);
        }
        Ok(grouped)
    }

    /// First column of the first row.
    pub fn fetch_one<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<Option<Bind>> {
        let first = self
            .read(sql, binds)?
            .into_iter()
            .next()
            .and_then(|mut record| record.shift_remove_index(0))
            .map(|(_, value)| value);
        Ok(first)
    }

    // writes, always on the primary

    pub fn execute<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<u64> {
        let binds = binds.into_binds().into_vec();
        self.log(sql, binds.clone());
        self.primary()?.execute(sql, &binds)
    }

    /// Run an insert and return the generated id.
    pub fn insert<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<Bind> {
        self.execute(sql, binds)?;
        self.last_insert_id()
    }

    pub fn update<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<u64> {
        self.execute(sql, binds)
    }

    pub fn delete<B: IntoBinds>(&mut self, sql: &str, binds: B) -> Result<u64> {
        self.execute(sql, binds)
    }

    pub fn last_insert_id(&mut self) -> Result<Bind> {
        self.primary()?.last_insert_id()
    }

    /// Build and run a single row insert.
    pub fn insert_row<T, R>(&mut self, table: T, row: R) -> Result<u64>
    where
        T: IntoIdent,
        R: IntoRow,
    {
        let mut builder = Builder::new();
        builder.insert_into(table, row);
        self.run(builder)
    }

    pub fn update_rows<T, R, I>(&mut self, table: T, row: R, conditions: I) -> Result<u64>
    where
        T: IntoIdent,
        R: IntoRow,
        I: IntoIterator,
        I::Item: Into<Where>,
    {
        let mut builder = Builder::new();
        builder.update_table(table, row).where_all(conditions);
        self.run(builder)
    }

    pub fn delete_rows<T, I>(&mut self, table: T, conditions: I) -> Result<u64>
    where
        T: IntoIdent,
        I: IntoIterator,
        I::Item: Into<Where>,
    {
        let mut builder = Builder::new();
        builder.delete_from(table).where_all(conditions);
        self.run(builder)
    }

    fn run(&mut self, mut builder: Builder) -> Result<u64> {
        let Statement { sql, binds } = builder.compile::<Ansi>()?;
        self.execute(&sql, binds)
    }

    // transactions

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.depth == 0 {
            self.primary()?.begin()?;
            tracing::debug!("transaction started");
        }
        self.depth += 1;
        tracing::trace!(depth = self.depth, "begin");
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        match self.depth {
            0 => tracing::warn!("commit called without an open transaction"),
            1 => {
                self.primary()?.commit()?;
                self.depth = 0;
                tracing::debug!("transaction committed");
            }
            _ => self.depth -= 1,
        }
        Ok(())
    }

    /// Roll back the outermost level; an inner level only decrements the
    /// depth.
    pub fn rollback(&mut self) -> Result<()> {
        match self.depth {
            0 => tracing::warn!("rollback called without an open transaction"),
            1 => {
                self.depth = 0;
                self.primary()?.rollback()?;
                tracing::debug!("transaction rolled back");
            }
            _ => self.depth -= 1,
        }
        Ok(())
    }

    /// Run `callback` inside a transaction: commit when it returns `Ok`,
    /// roll back and pass the error on otherwise.
    pub fn transaction<T, F>(&mut self, callback: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.begin()?;
        let result = callback(self).and_then(|value| self.commit().map(|()| value));
        if result.is_err() {
            if let Err(err) = self.rollback() {
                tracing::warn!(error = %err, "rollback after a failed transaction failed");
            }
        }
        result
    }
}

fn open<C: Connector>(connector: &C, target: &Target, role: &'static str) -> Result<C::Adapter> {
    target.validate()?;
    tracing::debug!(role, "opening database connection");
    connector.connect(target)
}

fn key(bind: &Bind) -> SmolStr {
    match bind {
        Bind::String(value) => value.clone(),
        other => format_smolstr!("{other}"),
    }
}

fn leading<'r, const N: usize>(record: &'r Record, operation: &str) -> Result<[&'r Bind; N]> {
    if record.len() < N {
        return Err(Error::invalid_argument(format!(
            "{operation} needs rows with at least {N} columns, got {}",
            record.len()
        )));
    }
    Ok(std::array::from_fn(|index| &record[index]))
}

#[cfg(test)]
mod tests {
    use crate::{
        Row,
        tests::{MemoryConnector, record},
    };

    use super::*;

    fn connection(connector: &MemoryConnector) -> Connection<MemoryConnector> {
        Connection::new(connector.clone(), Config::new(Target::new("db1")))
    }

    #[test]
    fn test_connects_lazily_once() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);
        assert!(connector.events().is_empty());

        conn.fetch_all("SELECT 1", ()).unwrap();
        conn.execute("DELETE FROM t", ()).unwrap();
        assert_eq!(
            vec!["connect db1", "db1: SELECT 1", "db1: DELETE FROM t"],
            connector.events()
        );
    }

    #[test]
    fn test_empty_dsn() {
        let connector = MemoryConnector::default();
        let mut conn = Connection::new(connector.clone(), Config::new(Target::default()));
        let err = conn.fetch_all("SELECT 1", ()).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(connector.events().is_empty());
    }

    #[test]
    fn test_reads_use_secondary_outside_transaction() {
        let connector = MemoryConnector::default();
        let config = Config::new(Target::new("db1")).with_secondary(Target::new("db2"));
        let mut conn = Connection::new(connector.clone(), config);

        conn.fetch_all("SELECT a", ()).unwrap();
        conn.execute("UPDATE t SET a=1", ()).unwrap();
        conn.transaction(|conn| conn.fetch_all("SELECT b", ()))
            .unwrap();

        assert_eq!(
            vec![
                "connect db2",
                "db2: SELECT a",
                "connect db1",
                "db1: UPDATE t SET a=1",
                "db1: BEGIN",
                "db1: SELECT b",
                "db1: COMMIT",
            ],
            connector.events()
        );
    }

    #[test]
    fn test_nested_transactions() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);

        conn.begin().unwrap();
        conn.begin().unwrap();
        assert_eq!(2, conn.depth());
        conn.commit().unwrap();
        assert!(conn.in_transaction());
        conn.commit().unwrap();
        assert!(!conn.in_transaction());

        assert_eq!(vec!["connect db1", "db1: BEGIN", "db1: COMMIT"], connector.events());
    }

    #[test]
    fn test_rollback_depth() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);

        conn.begin().unwrap();
        conn.begin().unwrap();
        conn.begin().unwrap();
        conn.rollback().unwrap();
        assert_eq!(2, conn.depth());
        conn.rollback().unwrap();
        conn.rollback().unwrap();
        assert_eq!(0, conn.depth());
        conn.rollback().unwrap();
        assert_eq!(0, conn.depth());
        conn.commit().unwrap();
        assert_eq!(0, conn.depth());

        assert_eq!(vec!["connect db1", "db1: BEGIN", "db1: ROLLBACK"], connector.events());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);

        let result: Result<()> = conn.transaction(|conn| {
            conn.execute("INSERT INTO t (a) VALUES (?)", 1)?;
            Err(Error::invalid_argument("boom"))
        });
        assert!(result.unwrap_err().is_invalid_argument());
        assert_eq!(0, conn.depth());
        assert_eq!(
            vec![
                "connect db1",
                "db1: BEGIN",
                "db1: INSERT INTO t (a) VALUES (?)",
                "db1: ROLLBACK"
            ],
            connector.events()
        );
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let connector = MemoryConnector::default().failing_commit();
        let mut conn = connection(&connector);

        let err = conn.transaction(|_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Adapter(_)));
        assert_eq!(0, conn.depth());
        assert_eq!(
            vec!["connect db1", "db1: BEGIN", "db1: COMMIT", "db1: ROLLBACK"],
            connector.events()
        );
    }

    #[test]
    fn test_last_log() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);
        assert!(conn.last_log().is_none());

        conn.fetch_all("SELECT * FROM t WHERE id=?", 5).unwrap();
        let last = conn.last_log().unwrap();
        assert_eq!("SELECT * FROM t WHERE id=?", last.sql);
        assert_eq!(vec![Bind::I32(5)], last.binds);
    }

    #[test]
    fn test_insert_returns_id() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);
        assert_eq!(Bind::U64(1), conn.insert("INSERT INTO t (a) VALUES (?)", 1).unwrap());
        assert_eq!(Bind::U64(2), conn.insert("INSERT INTO t (a) VALUES (?)", 2).unwrap());
        assert_eq!(Bind::U64(2), conn.last_insert_id().unwrap());
    }

    #[test]
    fn test_fetch_shapes() {
        let connector = MemoryConnector::with_rows(vec![
            record([("id", Bind::I32(1)), ("role", "admin".into()), ("name", "ann".into())]),
            record([("id", Bind::I32(2)), ("role", "user".into()), ("name", "bob".into())]),
            record([("id", Bind::I32(3)), ("role", "user".into()), ("name", "cid".into())]),
        ]);
        let mut conn = connection(&connector);
        let sql = "SELECT id, role, name FROM users";

        assert_eq!(3, conn.fetch_all(sql, ()).unwrap().len());

        let row = conn.fetch_row(sql, ()).unwrap().unwrap();
        assert_eq!(Some(&Bind::from("ann")), row.get("name"));

        assert_eq!(
            vec![Bind::I32(1), Bind::I32(2), Bind::I32(3)],
            conn.fetch_column(sql, ()).unwrap()
        );
        assert_eq!(Some(Bind::I32(1)), conn.fetch_one(sql, ()).unwrap());

        let indexed = conn.fetch_all_indexed(sql, ()).unwrap();
        assert_eq!(3, indexed.len());
        assert_eq!(Some(&Bind::from("bob")), indexed["2"].get("name"));
        assert!(indexed["2"].get("id").is_none());

        let pairs = conn.fetch_pairs(sql, ()).unwrap();
        assert_eq!(Some(&Bind::from("user")), pairs.get("3"));

        let nested = conn.fetch_pairs_grouped(sql, ()).unwrap();
        assert_eq!(Some(&Bind::from("cid")), nested["3"].get("user"));
    }

    #[test]
    fn test_grouped_by_first_column() {
        let connector = MemoryConnector::with_rows(vec![
            record([("role", "user".into()), ("name", Bind::from("bob"))]),
            record([("role", "admin".into()), ("name", Bind::from("ann"))]),
            record([("role", "user".into()), ("name", Bind::from("cid"))]),
        ]);
        let mut conn = connection(&connector);
        let grouped = conn.fetch_all_grouped("SELECT role, name FROM users", ()).unwrap();
        let keys: Vec<_> = grouped.keys().map(SmolStr::as_str).collect();
        assert_eq!(vec!["user", "admin"], keys);
        assert_eq!(2, grouped["user"].len());
        assert_eq!(Some(&Bind::from("cid")), grouped["user"][1].get("name"));
    }

    #[test]
    fn test_pairs_grouped_overwrites_outer_key() {
        let connector = MemoryConnector::with_rows(vec![
            record([("a", "x".into()), ("b", "k1".into()), ("c", Bind::I32(1))]),
            record([("a", "x".into()), ("b", "k2".into()), ("c", Bind::I32(2))]),
        ]);
        let mut conn = connection(&connector);
        let nested = conn.fetch_pairs_grouped("SELECT a, b, c FROM t", ()).unwrap();
        assert_eq!(1, nested.len());
        assert_eq!(1, nested["x"].len());
        assert_eq!(Some(&Bind::I32(2)), nested["x"].get("k2"));
    }

    #[test]
    fn test_pairs_need_enough_columns() {
        let connector = MemoryConnector::with_rows(vec![record([("a", Bind::I32(1)), ("b", Bind::I32(2))])]);
        let mut conn = connection(&connector);
        assert!(conn.fetch_pairs("SELECT a, b FROM t", ()).is_ok());
        let err = conn.fetch_pairs_grouped("SELECT a, b FROM t", ()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_empty_results() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);
        assert!(conn.fetch_row("SELECT 1", ()).unwrap().is_none());
        assert!(conn.fetch_one("SELECT 1", ()).unwrap().is_none());
        assert!(conn.fetch_pairs_grouped("SELECT 1", ()).unwrap().is_empty());
    }

    #[test]
    fn test_row_helpers() {
        let connector = MemoryConnector::default();
        let mut conn = connection(&connector);

        conn.insert_row("users", |row: &mut Row| {
            row.field("name", "ann");
        })
        .unwrap();
        assert_eq!("INSERT INTO users (name) VALUES (?)", conn.last_log().unwrap().sql);

        conn.update_rows("users", [("name", "bob")], [("id", 1)]).unwrap();
        let last = conn.last_log().unwrap();
        assert_eq!("UPDATE users SET name=? WHERE id=?", last.sql);
        assert_eq!(vec![Bind::from("bob"), Bind::I32(1)], last.binds);

        conn.delete_rows("users", [Where::raw("name IS NULL")]).unwrap();
        assert_eq!("DELETE FROM users WHERE name IS NULL", conn.last_log().unwrap().sql);
    }
}
