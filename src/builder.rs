use bindql_derive::or_variant;

use crate::{
    Bind, Grammar, IntoBinds, IntoColumns, IntoIdent, IntoOrder, IntoRaw, IntoRow, IntoValue,
    Raw,
    bind::Binds,
    col::Columns,
    error::Result,
    expr::{Condition, Conditions, Conjunction, Order, Ordering, OrderExpr, Where},
    ident::Ident,
    join::{JoinClause, JoinType, Joins},
    paginate::Paginator,
    row::Row,
    writer::FormatContext,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

/// Compiled statement handed to an adapter, also kept as the last query log.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<Bind>,
}

/// State of one statement, mutated fluently and compiled at most once.
///
/// The first `to_sql` renders the statement and fills the bind list; later
/// calls return the memoized text, so mutations after that point are ignored.
#[derive(Debug, Default, Clone)]
pub struct Builder {
    maybe_query: Option<String>,
    pub(crate) ty: QueryKind,
    pub(crate) distinct: bool,
    pub(crate) maybe_table: Option<Ident>,
    pub(crate) columns: Columns,
    pub(crate) joins: Joins,
    pub(crate) conditions: Conditions,
    pub(crate) maybe_group: Option<Columns>,
    pub(crate) maybe_having: Option<Raw>,
    pub(crate) order: Order,
    pub(crate) paginator: Paginator,
    pub(crate) row: Row,
    binds: Binds,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table<T>(table: T) -> Self
    where
        T: IntoIdent,
    {
        let mut builder = Self::default();
        builder.from(table);
        builder
    }

    pub fn from<T: IntoIdent>(&mut self, table: T) -> &mut Self {
        self.maybe_table = Some(table.into_ident().trimmed());
        self
    }

    // select stuff

    pub fn select<T>(&mut self, cols: T) -> &mut Self
    where
        T: IntoColumns,
    {
        self.columns = cols.into_columns();
        self
    }

    pub fn select_from<C, T>(&mut self, cols: C, table: T) -> &mut Self
    where
        C: IntoColumns,
        T: IntoIdent,
    {
        self.from(table);
        self.select(cols)
    }

    pub fn add_select<T>(&mut self, cols: T) -> &mut Self
    where
        T: IntoColumns,
    {
        let other = cols.into_columns();
        self.columns.append(other);
        self
    }

    pub fn reset_select(&mut self) -> &mut Self {
        self.columns.take();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    // join stuff, the typed `*_join` methods are derived on `JoinType`

    pub(crate) fn join_expr<T, O, B>(&mut self, ty: JoinType, table: T, on: O, binds: B) -> &mut Self
    where
        T: IntoIdent,
        O: IntoRaw,
        B: IntoBinds,
    {
        let join = JoinClause::new(ty, table.into_ident(), on.into_raw(), binds.into_binds());
        self.joins.push(join);
        self
    }

    // where stuff

    /// `("id=?", 1)`, `("id=? AND name IN?", (1, ["a", "b"]))`, `("id", [1, 2, 3])`
    #[or_variant]
    pub fn where_clause<C, V>(&mut self, condition: C, value: V) -> &mut Self
    where
        C: IntoRaw,
        V: IntoValue,
    {
        let condition = Condition::new(
            Conjunction::And,
            condition.into_raw(),
            Some(value.into_value()),
        );
        self.conditions.push(condition);
        self
    }

    /// A complete boolean expression, written as is.
    #[or_variant]
    pub fn where_raw<C>(&mut self, condition: C) -> &mut Self
    where
        C: IntoRaw,
    {
        let condition = Condition::new(Conjunction::And, condition.into_raw(), None);
        self.conditions.push(condition);
        self
    }

    /// Several conditions at once, every one joined with the same conjunction.
    #[or_variant]
    pub fn where_all<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Where>,
    {
        for entry in entries {
            let entry: Where = entry.into();
            self.conditions.push(entry.into_condition(Conjunction::And));
        }
        self
    }

    pub fn has_where(&self) -> bool {
        !self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    // group and order

    pub fn group<T: IntoColumns>(&mut self, cols: T) -> &mut Self {
        let cols = cols.into_columns();
        self.maybe_group = (!cols.is_empty()).then_some(cols);
        self
    }

    pub fn group_having<T, H>(&mut self, cols: T, having: H) -> &mut Self
    where
        T: IntoColumns,
        H: IntoRaw,
    {
        self.group(cols);
        let having = having.into_raw();
        if !having.value().is_empty() {
            self.maybe_having = Some(having);
        }
        self
    }

    /// `"id DESC"`, `"id, name DESC"` or `("id", Ordering::Desc)`; may be repeated.
    pub fn order_by<O: IntoOrder>(&mut self, order: O) -> &mut Self {
        self.order.push(order.into_order());
        self
    }

    pub fn order_by_asc<C: IntoIdent>(&mut self, column: C) -> &mut Self {
        self.order
            .push(OrderExpr::Column(column.into_ident(), Ordering::Asc));
        self
    }

    pub fn order_by_desc<C: IntoIdent>(&mut self, column: C) -> &mut Self {
        self.order
            .push(OrderExpr::Column(column.into_ident(), Ordering::Desc));
        self
    }

    // pagination

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.paginator.limit(limit);
        self
    }

    pub fn limit_offset(&mut self, limit: u64, offset: u64) -> &mut Self {
        self.paginator.limit(limit);
        self.paginator.offset(offset);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.paginator.offset(offset);
        self
    }

    pub fn page(&mut self, page: i64, per_page: u64) -> &mut Self {
        self.paginator.page(page, per_page);
        self
    }

    pub fn for_page(&mut self, page: i64) -> &mut Self {
        self.page(page, Paginator::DEFAULT_PER_PAGE)
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.paginator.maybe_limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.paginator.maybe_offset
    }

    // write statements

    pub fn insert<R: IntoRow>(&mut self, row: R) -> &mut Self {
        self.ty = QueryKind::Insert;
        self.row = row.into_row();
        self
    }

    pub fn insert_into<T, R>(&mut self, table: T, row: R) -> &mut Self
    where
        T: IntoIdent,
        R: IntoRow,
    {
        self.from(table);
        self.insert(row)
    }

    pub fn update<R: IntoRow>(&mut self, row: R) -> &mut Self {
        self.ty = QueryKind::Update;
        self.row = row.into_row();
        self
    }

    pub fn update_table<T, R>(&mut self, table: T, row: R) -> &mut Self
    where
        T: IntoIdent,
        R: IntoRow,
    {
        self.from(table);
        self.update(row)
    }

    pub fn delete(&mut self) -> &mut Self {
        self.ty = QueryKind::Delete;
        self
    }

    pub fn delete_from<T: IntoIdent>(&mut self, table: T) -> &mut Self {
        self.from(table);
        self.delete()
    }

    // building the builder

    pub fn kind(&self) -> QueryKind {
        self.ty
    }

    pub fn table_name(&self) -> Option<&str> {
        self.maybe_table.as_ref().map(Ident::as_str)
    }

    /// Append values to the bind list, a collection in iteration order.
    pub fn bind<B: IntoBinds>(&mut self, binds: B) -> &mut Self {
        self.binds.append(binds.into_binds());
        self
    }

    /// Bind list; filled by `to_sql`.
    pub fn binds(&self) -> &[Bind] {
        self.binds.as_slice()
    }

    pub fn is_compiled(&self) -> bool {
        self.maybe_query.is_some()
    }

    pub fn to_sql<G: Grammar>(&mut self) -> Result<&str> {
        let query = match self.maybe_query.take() {
            Some(query) => query,
            None => self.render::<G>()?,
        };
        Ok(self.maybe_query.insert(query).as_str())
    }

    /// Compile and return the statement as an owned value.
    pub fn compile<G: Grammar>(&mut self) -> Result<Statement> {
        let sql = self.to_sql::<G>()?.to_owned();
        Ok(Statement {
            sql,
            binds: self.binds.as_slice().to_vec(),
        })
    }

    fn render<G: Grammar>(&mut self) -> Result<String> {
        let size_hint = 64;
        let mut str = String::with_capacity(size_hint);
        let mut context = FormatContext::new(&mut str);
        G::compile(self, &mut context)?;
        let placeholders = context.placeholders();
        let binds = context.take_binds();
        tracing::trace!(
            sql = %str,
            placeholders,
            binds = binds.len(),
            "compiled statement"
        );
        self.binds.append(binds);
        Ok(str)
    }
}
