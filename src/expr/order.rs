use crate::{
    Ident, IntoIdent, IntoRaw, Raw,
    bind::Array,
    error::Result,
    writer::{FormatContext, FormatWriter},
};

#[derive(Debug, Clone)]
pub enum OrderExpr {
    Column(Ident, Ordering),
    Raw(Raw),
}

pub type OrderProjections = Array<OrderExpr>;

impl FormatWriter for OrderExpr {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            OrderExpr::Column(ident, ordering) => {
                ident.format_writer(context)?;
                context.write_char(' ')?;
                ordering.format_writer(context)
            }
            OrderExpr::Raw(raw) => raw.format_writer(context),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Order {
    projections: OrderProjections,
}

impl FormatWriter for Order {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        for (index, proj) in self.projections.iter().enumerate() {
            if index > 0 {
                context.write_char(',')?;
            }
            proj.format_writer(context)?;
        }
        Ok(())
    }
}

impl Order {
    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }

    pub fn push(&mut self, expr: OrderExpr) {
        self.projections.push(expr);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Asc,
    Desc,
}

impl FormatWriter for Ordering {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            Ordering::Asc => context.write_str("ASC"),
            Ordering::Desc => context.write_str("DESC"),
        }
    }
}

/// `"id DESC"`, `"id, name DESC"` are written verbatim, `("id", Ordering::Desc)` as `id DESC`.
pub trait IntoOrder {
    fn into_order(self) -> OrderExpr;
}

impl IntoOrder for OrderExpr {
    fn into_order(self) -> OrderExpr {
        self
    }
}

impl IntoOrder for &str {
    fn into_order(self) -> OrderExpr {
        OrderExpr::Raw(self.into_raw())
    }
}

impl IntoOrder for String {
    fn into_order(self) -> OrderExpr {
        OrderExpr::Raw(self.into_raw())
    }
}

impl IntoOrder for Raw {
    fn into_order(self) -> OrderExpr {
        OrderExpr::Raw(self)
    }
}

impl<C: IntoIdent> IntoOrder for (C, Ordering) {
    fn into_order(self) -> OrderExpr {
        OrderExpr::Column(self.0.into_ident(), self.1)
    }
}
