use crate::{
    IntoRaw, IntoValue, Raw, Value,
    error::Result,
    writer::{FormatContext, FormatWriter},
};

use super::template;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl FormatWriter for Conjunction {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            Conjunction::And => context.write_str("AND"),
            Conjunction::Or => context.write_str("OR"),
        }
    }
}

/// One where term: a condition template and the value filling its placeholders.
///
/// Without a value the template already is a complete boolean expression.
#[derive(Debug, Clone)]
pub struct Condition {
    conjunction: Conjunction,
    template: Raw,
    maybe_value: Option<Value>,
}

impl Condition {
    pub fn new(conjunction: Conjunction, template: Raw, maybe_value: Option<Value>) -> Self {
        Self {
            conjunction,
            template,
            maybe_value,
        }
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn template(&self) -> &str {
        self.template.value()
    }

    pub fn value(&self) -> Option<&Value> {
        self.maybe_value.as_ref()
    }
}

impl FormatWriter for Condition {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        template::write_condition(self.template(), self.value(), context)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Conditions(pub(crate) Vec<Condition>);

impl Conditions {
    pub fn push(&mut self, other: Condition) {
        self.0.push(other);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }
}

impl FormatWriter for Conditions {
    fn format_writer<W: std::fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        // the first conjunction is never written, whatever it is
        for (index, condition) in self.0.iter().enumerate() {
            if index > 0 {
                context.write_char(' ')?;
                condition.conjunction.format_writer(context)?;
                context.write_char(' ')?;
            }
            condition.format_writer(context)?;
        }
        Ok(())
    }
}

/// Entry of a multi condition `where_all` call.
#[derive(Debug, Clone)]
pub enum Where {
    /// Complete boolean expression, written as is.
    Raw(Raw),
    /// Condition template with its value.
    Bound(Raw, Value),
}

impl Where {
    pub fn raw<C: IntoRaw>(condition: C) -> Self {
        Self::Raw(condition.into_raw())
    }

    pub fn bound<C: IntoRaw, V: IntoValue>(condition: C, value: V) -> Self {
        Self::Bound(condition.into_raw(), value.into_value())
    }

    pub(crate) fn into_condition(self, conjunction: Conjunction) -> Condition {
        match self {
            Where::Raw(template) => Condition::new(conjunction, template, None),
            Where::Bound(template, value) => Condition::new(conjunction, template, Some(value)),
        }
    }
}

impl From<&str> for Where {
    fn from(value: &str) -> Self {
        Where::raw(value)
    }
}

impl From<String> for Where {
    fn from(value: String) -> Self {
        Where::raw(value)
    }
}

impl<V: IntoValue> From<(&str, V)> for Where {
    fn from((condition, value): (&str, V)) -> Self {
        Where::bound(condition, value)
    }
}
