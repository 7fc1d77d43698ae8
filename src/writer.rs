use std::fmt::Write;

use crate::{
    Bind,
    bind::Binds,
    error::Result,
};

pub(crate) trait FormatWriter {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()>;
}

/// Output sink of one compilation.
///
/// Every placeholder written through the context is counted, and the value it
/// stands for is collected in the same left to right order.
pub struct FormatContext<'a, W: Write> {
    pub(crate) writer: &'a mut W,
    pub(crate) binds: Binds,
    pub(crate) placeholders: usize,
}

impl<'a, W: Write> FormatContext<'a, W> {
    pub fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            binds: Binds::None,
            placeholders: 0,
        }
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.writer.write_str(value)?;
        Ok(())
    }

    pub fn write_char(&mut self, value: char) -> Result<()> {
        self.writer.write_char(value)?;
        Ok(())
    }

    /// Write one `?` standing for `bind`.
    pub fn write_bound(&mut self, bind: Bind) -> Result<()> {
        self.placeholders += 1;
        self.writer.write_char('?')?;
        self.binds.push(bind);
        Ok(())
    }

    /// Write `?,?,..` for every member of `set`.
    pub fn write_bound_set(&mut self, set: Vec<Bind>) -> Result<()> {
        for (index, bind) in set.into_iter().enumerate() {
            if index > 0 {
                self.writer.write_char(',')?;
            }
            self.write_bound(bind)?;
        }
        Ok(())
    }

    /// Collect values whose placeholders live in caller supplied raw text.
    pub fn bind_raw(&mut self, binds: Binds) {
        self.binds.append(binds);
    }

    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    pub(crate) fn take_binds(&mut self) -> Binds {
        self.binds.take()
    }
}
