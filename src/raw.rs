use smol_str::SmolStr;

use crate::{
    error::Result,
    writer::{FormatContext, FormatWriter},
};

/// Literal SQL text embedded verbatim, never parameterized.
///
/// Raw fragments bypass every placeholder; the caller vouches for their safety.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Raw(pub(crate) SmolStr);

impl Raw {
    pub fn new<T>(value: T) -> Self
    where
        T: Into<SmolStr>,
    {
        Self(value.into())
    }

    pub fn new_static(value: &'static str) -> Self {
        Self(SmolStr::new_static(value))
    }

    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

pub trait IntoRaw {
    fn into_raw(self) -> Raw;
}

impl IntoRaw for Raw {
    fn into_raw(self) -> Raw {
        self
    }
}

impl IntoRaw for &str {
    fn into_raw(self) -> Raw {
        Raw::new(self)
    }
}

impl IntoRaw for String {
    fn into_raw(self) -> Raw {
        Raw::new(self)
    }
}

impl IntoRaw for &String {
    fn into_raw(self) -> Raw {
        Raw::new(self.as_str())
    }
}

impl IntoRaw for SmolStr {
    fn into_raw(self) -> Raw {
        Raw(self)
    }
}

impl FormatWriter for Raw {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.write_str(self.value())
    }
}
