use std::fmt::Write;

use crate::{
    Builder,
    builder::QueryKind,
    error::{Error, Result},
    ident::Ident,
    writer::{FormatContext, FormatWriter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    Joins,
    Wheres,
    Group,
    Having,
    Orders,
    Limit,
    Offset,
}

impl Clause {
    /// Order in which a select statement is assembled.
    pub const SELECT: [Clause; 8] = [
        Clause::Select,
        Clause::Joins,
        Clause::Wheres,
        Clause::Group,
        Clause::Having,
        Clause::Orders,
        Clause::Limit,
        Clause::Offset,
    ];

    pub fn is_present(&self, builder: &Builder) -> bool {
        match self {
            Clause::Select => true,
            Clause::Joins => !builder.joins.is_empty(),
            Clause::Wheres => !builder.conditions.is_empty(),
            Clause::Group => builder.maybe_group.is_some(),
            Clause::Having => builder.maybe_having.is_some(),
            Clause::Orders => !builder.order.is_empty(),
            Clause::Limit => builder.paginator.maybe_limit.is_some(),
            Clause::Offset => builder.paginator.maybe_offset.is_some(),
        }
    }
}

/// Turns builder state into SQL text.
///
/// Every step has a default rendering; a grammar for another engine overrides
/// only the steps that differ.
pub trait Grammar {
    fn compile<W: Write>(builder: &Builder, context: &mut FormatContext<'_, W>) -> Result<()> {
        match builder.ty {
            QueryKind::Select => Self::compile_select(builder, context),
            QueryKind::Insert => Self::compile_insert(builder, context),
            QueryKind::Update => Self::compile_update(builder, context),
            QueryKind::Delete => Self::compile_delete(builder, context),
        }
    }

    /// Present clauses, in [`Clause::SELECT`] order, separated by one space.
    fn compile_select<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        let mut written = false;
        for clause in Clause::SELECT {
            if !clause.is_present(builder) {
                continue;
            }
            if written {
                context.write_char(' ')?;
            }
            written = true;
            Self::compile_clause(clause, builder, context)?;
        }
        Ok(())
    }

    fn compile_clause<W: Write>(
        clause: Clause,
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        match clause {
            Clause::Select => Self::compile_columns(builder, context),
            Clause::Joins => {
                for (index, join) in builder.joins.iter().enumerate() {
                    if index > 0 {
                        context.write_char(' ')?;
                    }
                    join.format_writer(context)?;
                }
                Ok(())
            }
            Clause::Wheres => Self::compile_wheres(builder, context),
            Clause::Group => {
                let Some(group) = &builder.maybe_group else {
                    return Ok(());
                };
                context.write_str("GROUP BY ")?;
                group.format_writer(context)
            }
            Clause::Having => {
                let Some(having) = &builder.maybe_having else {
                    return Ok(());
                };
                context.write_str("HAVING ")?;
                having.format_writer(context)
            }
            Clause::Orders => {
                context.write_str("ORDER BY ")?;
                builder.order.format_writer(context)
            }
            Clause::Limit => Self::compile_limit(builder, context),
            Clause::Offset => Self::compile_offset(builder, context),
        }
    }

    /// `SELECT [DISTINCT] columns [FROM table]`
    fn compile_columns<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        context.write_str("SELECT ")?;
        if builder.distinct {
            context.write_str("DISTINCT ")?;
        }
        builder.columns.format_writer(context)?;
        if let Some(table) = &builder.maybe_table {
            context.write_str(" FROM ")?;
            table.format_writer(context)?;
        }
        Ok(())
    }

    fn compile_wheres<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        context.write_str("WHERE ")?;
        builder.conditions.format_writer(context)
    }

    fn compile_limit<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        if let Some(limit) = builder.paginator.maybe_limit {
            write!(context.writer, "LIMIT {limit}")?;
        }
        Ok(())
    }

    fn compile_offset<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        if let Some(offset) = builder.paginator.maybe_offset {
            write!(context.writer, "OFFSET {offset}")?;
        }
        Ok(())
    }

    fn compile_insert<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        let table = required_table(builder, "insert")?;
        builder.row.ensure_not_empty("insert")?;
        context.write_str("INSERT INTO ")?;
        table.format_writer(context)?;
        context.write_str(" (")?;
        builder.row.format_idents(context)?;
        context.write_str(") VALUES (")?;
        builder.row.format_values(context)?;
        context.write_char(')')
    }

    fn compile_update<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        let table = required_table(builder, "update")?;
        builder.row.ensure_not_empty("update")?;
        context.write_str("UPDATE ")?;
        table.format_writer(context)?;
        context.write_str(" SET ")?;
        builder.row.format_sets(context)?;
        if builder.has_where() {
            context.write_char(' ')?;
            Self::compile_wheres(builder, context)?;
        }
        Ok(())
    }

    fn compile_delete<W: Write>(
        builder: &Builder,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        let table = required_table(builder, "delete")?;
        context.write_str("DELETE FROM ")?;
        table.format_writer(context)?;
        if builder.has_where() {
            context.write_char(' ')?;
            Self::compile_wheres(builder, context)?;
        }
        Ok(())
    }
}

fn required_table<'b>(builder: &'b Builder, statement: &str) -> Result<&'b Ident> {
    builder
        .maybe_table
        .as_ref()
        .ok_or_else(|| Error::invalid_argument(format!("{statement} statement needs a table")))
}

/// Plain SQL understood by the common engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansi;

impl Grammar for Ansi {}
