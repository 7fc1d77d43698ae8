use crate::{
    bind::Array,
    error::Result,
    ident::{Ident, IntoIdent},
    writer::{FormatContext, FormatWriter},
};

pub type Columns = Array<Ident>;

impl FormatWriter for Columns {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            Columns::None => context.write_char('*')?,
            Columns::One(ident) => ident.format_writer(context)?,
            Columns::Many(idents) => {
                // just format the elem seperated with comma
                for (index, elem) in idents.iter().enumerate() {
                    if index > 0 {
                        context.write_str(", ")?;
                    }
                    elem.format_writer(context)?;
                }
            }
        };
        Ok(())
    }
}

pub trait IntoColumns {
    fn into_columns(self) -> Columns;
}

impl IntoColumns for Columns {
    fn into_columns(self) -> Columns {
        self
    }
}

impl<T> IntoColumns for T
where
    T: IntoIdent,
{
    fn into_columns(self) -> Columns {
        Columns::One(self.into_ident())
    }
}

impl<T> IntoColumns for Vec<T>
where
    T: IntoIdent,
{
    fn into_columns(self) -> Columns {
        many(self.into_iter().map(IntoIdent::into_ident).collect())
    }
}

impl<T, const N: usize> IntoColumns for [T; N]
where
    T: IntoIdent,
{
    fn into_columns(self) -> Columns {
        many(self.into_iter().map(IntoIdent::into_ident).collect())
    }
}

fn many(idents: Vec<Ident>) -> Columns {
    if idents.is_empty() {
        Columns::None
    } else {
        Columns::Many(idents)
    }
}
