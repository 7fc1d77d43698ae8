use bindql_derive::JoinMethods;

use crate::{
    Ident, Raw,
    bind::Binds,
    error::Result,
    writer::{FormatContext, FormatWriter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, JoinMethods)]
pub enum JoinType {
    Left,
    Right,
    Inner,
    Full,
}

impl FormatWriter for JoinType {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            JoinType::Left => context.write_str("LEFT JOIN"),
            JoinType::Right => context.write_str("RIGHT JOIN"),
            JoinType::Inner => context.write_str("INNER JOIN"),
            JoinType::Full => context.write_str("FULL JOIN"),
        }
    }
}

/// A join target with its raw `ON` condition.
///
/// `binds` fill the `?` inside `on`; they take their place in the bind list
/// when the join is written.
#[derive(Debug, Clone)]
pub struct JoinClause {
    ty: JoinType,
    table: Ident,
    on: Raw,
    binds: Binds,
}

pub type Joins = Vec<JoinClause>;

impl JoinClause {
    pub(crate) fn new(ty: JoinType, table: Ident, on: Raw, binds: Binds) -> Self {
        Self {
            ty,
            table,
            on,
            binds,
        }
    }

    pub fn join_type(&self) -> JoinType {
        self.ty
    }
}

impl FormatWriter for JoinClause {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        self.ty.format_writer(context)?;
        context.write_char(' ')?;
        self.table.format_writer(context)?;
        context.write_str(" ON ")?;
        self.on.format_writer(context)?;
        context.bind_raw(self.binds.clone());
        Ok(())
    }
}
