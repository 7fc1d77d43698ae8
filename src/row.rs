use indexmap::IndexMap;

use crate::{
    Bind, Ident, IntoBind, IntoIdent, Raw,
    error::{Error, Result},
    writer::{FormatContext, FormatWriter},
};

/// Payload value of an insert or update, resolved once when the row is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Bound(Bind),
    Raw(Raw),
}

impl FormatWriter for Field {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            Field::Bound(bind) => context.write_bound(bind.clone()),
            Field::Raw(raw) => raw.format_writer(context),
        }
    }
}

pub trait IntoField {
    fn into_field(self) -> Field;
}

impl IntoField for Field {
    fn into_field(self) -> Field {
        self
    }
}

impl IntoField for Raw {
    fn into_field(self) -> Field {
        Field::Raw(self)
    }
}

impl<T> IntoField for T
where
    T: IntoBind,
{
    fn into_field(self) -> Field {
        Field::Bound(self.into_bind())
    }
}

/// Column to value mapping, kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Row {
    values: IndexMap<Ident, Field>,
}

impl Row {
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    pub fn field<K, V>(&mut self, column: K, value: V) -> &mut Self
    where
        K: IntoIdent,
        V: IntoField,
    {
        self.values.insert(column.into_ident(), value.into_field());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Field> {
        self.values.get(&Ident::new(column))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Ident, Field> {
        self.values.iter()
    }

    pub(crate) fn ensure_not_empty(&self, statement: &str) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid_argument(format!(
                "{statement} statement needs at least one column"
            )));
        }
        Ok(())
    }

    /// `a, b`
    pub(crate) fn format_idents<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        for (index, ident) in self.values.keys().enumerate() {
            if index > 0 {
                context.write_str(", ")?;
            }
            ident.format_writer(context)?;
        }
        Ok(())
    }

    /// `?, ?`
    pub(crate) fn format_values<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        for (index, field) in self.values.values().enumerate() {
            if index > 0 {
                context.write_str(", ")?;
            }
            field.format_writer(context)?;
        }
        Ok(())
    }

    /// `a=?,b=b+1`
    pub(crate) fn format_sets<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> Result<()> {
        for (index, (ident, field)) in self.values.iter().enumerate() {
            if index > 0 {
                context.write_char(',')?;
            }
            ident.format_writer(context)?;
            context.write_char('=')?;
            field.format_writer(context)?;
        }
        Ok(())
    }
}

pub trait IntoRow {
    fn into_row(self) -> Row;
}

impl IntoRow for Row {
    fn into_row(self) -> Row {
        self
    }
}

impl<F> IntoRow for F
where
    F: FnOnce(&mut Row),
{
    fn into_row(self) -> Row {
        let mut row = Row::new();
        self(&mut row);
        row
    }
}

impl<K, V> IntoRow for Vec<(K, V)>
where
    K: IntoIdent,
    V: IntoField,
{
    fn into_row(self) -> Row {
        let mut row = Row::new();
        for (column, value) in self {
            row.field(column, value);
        }
        row
    }
}

impl<K, V, const N: usize> IntoRow for [(K, V); N]
where
    K: IntoIdent,
    V: IntoField,
{
    fn into_row(self) -> Row {
        let mut row = Row::new();
        for (column, value) in self {
            row.field(column, value);
        }
        row
    }
}
