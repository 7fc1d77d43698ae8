use std::{borrow::Cow, sync::Arc};

use smol_str::SmolStr;

use crate::{
    error::Result,
    writer::{FormatContext, FormatWriter},
};

/// Table or column name, written as given.
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ident(SmolStr);

pub trait IntoIdent {
    fn into_ident(self) -> Ident;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> Ident {
        self
    }
}

impl IntoIdent for &str {
    #[inline]
    fn into_ident(self) -> Ident {
        Ident::new(self)
    }
}

impl IntoIdent for &String {
    #[inline]
    fn into_ident(self) -> Ident {
        Ident::new(self.as_str())
    }
}

impl IntoIdent for String {
    #[inline(always)]
    fn into_ident(self) -> Ident {
        Ident::new(self)
    }
}

impl IntoIdent for Box<str> {
    #[inline]
    fn into_ident(self) -> Ident {
        Ident::new(self)
    }
}

impl IntoIdent for Arc<str> {
    #[inline]
    fn into_ident(self) -> Ident {
        Ident::new(self)
    }
}

impl IntoIdent for Cow<'_, str> {
    #[inline]
    fn into_ident(self) -> Ident {
        Ident::new(self)
    }
}

impl IntoIdent for SmolStr {
    #[inline(always)]
    fn into_ident(self) -> Ident {
        Ident::new(self)
    }
}

impl Ident {
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: Into<SmolStr>,
    {
        Self(value.into())
    }

    #[inline]
    pub fn new_static(value: &'static str) -> Self {
        Self(SmolStr::new_static(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Same name with surrounding whitespace removed.
    pub(crate) fn trimmed(self) -> Self {
        let trimmed = self.0.trim();
        if trimmed.len() == self.0.len() {
            self
        } else {
            Self(SmolStr::new(trimmed))
        }
    }
}

impl FormatWriter for Ident {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::format_writer;

    use super::*;

    #[test]
    fn test_format_ident_verbatim() {
        let (sql, _) = format_writer(Ident::new_static("users u"));
        assert_eq!("users u", sql);
    }

    #[test]
    fn test_trimmed() {
        assert_eq!("users", " users ".into_ident().trimmed().as_str());
        assert_eq!("a b", "a b".into_ident().trimmed().as_str());
    }
}
