//! Where condition templates.
//!
//! `?` marks a placeholder. The keyword right before a placeholder decides how
//! the matching value is expanded:
//!
//! - `age BETWEEN?` takes two values: `age BETWEEN ? AND ?`
//! - `name LIKE?` wraps a value without `%` as `%value%`
//! - `id IN?` expands a list (or comma delimited string): `id IN (?,?,?)`
//! - anything else binds the value as is: `id=?`
//!
//! A template without `?` is compared for equality (`id=?`), or membership
//! (`id IN(?,?)`) when the value is a list.

use std::fmt::Write;

use smol_str::SmolStr;

use crate::{
    Bind, Value,
    error::{Error, Result},
    writer::FormatContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Between,
    Like,
    In,
    Plain,
}

impl Keyword {
    fn trailing(fragment: &str) -> Self {
        let start = fragment
            .char_indices()
            .rev()
            .find(|(_, char)| !char.is_ascii_alphabetic())
            .map_or(0, |(index, char)| index + char.len_utf8());
        let word = &fragment[start..];
        if word.eq_ignore_ascii_case("between") {
            Keyword::Between
        } else if word.eq_ignore_ascii_case("like") {
            Keyword::Like
        } else if word.eq_ignore_ascii_case("in") {
            Keyword::In
        } else {
            Keyword::Plain
        }
    }
}

pub(crate) fn write_condition<W: Write>(
    template: &str,
    maybe_value: Option<&Value>,
    context: &mut FormatContext<'_, W>,
) -> Result<()> {
    let Some(value) = maybe_value else {
        return context.write_str(template);
    };

    let count = template.matches('?').count();
    if count == 0 {
        return write_implicit(template, value, context);
    }

    let items: Vec<&Value> = match value {
        Value::List(items) if count > 1 => items.iter().collect(),
        _ => vec![value],
    };
    if items.len() < count {
        return Err(Error::invalid_argument(format!(
            "condition `{template}` has {count} placeholders but {} values",
            items.len()
        )));
    }

    let mut written = false;
    for (index, fragment) in template.split('?').enumerate() {
        let fragment = fragment.trim();
        // text after the last placeholder
        if index == count {
            if !fragment.is_empty() {
                if written {
                    context.write_char(' ')?;
                }
                context.write_str(fragment)?;
            }
            break;
        }

        if written {
            context.write_char(' ')?;
        }
        written = true;
        context.write_str(fragment)?;
        write_placeholder(Keyword::trailing(fragment), items[index], context)?;
    }
    Ok(())
}

fn write_implicit<W: Write>(
    template: &str,
    value: &Value,
    context: &mut FormatContext<'_, W>,
) -> Result<()> {
    context.write_str(template)?;
    match value {
        Value::List(_) => {
            let set = non_empty_set(template, value)?;
            context.write_str(" IN(")?;
            context.write_bound_set(set)?;
            context.write_char(')')
        }
        Value::Scalar(bind) => {
            context.write_char('=')?;
            context.write_bound(bind.clone())
        }
    }
}

fn write_placeholder<W: Write>(
    keyword: Keyword,
    value: &Value,
    context: &mut FormatContext<'_, W>,
) -> Result<()> {
    match keyword {
        Keyword::Between => {
            let mut set = value.to_set().into_iter();
            let (Some(low), Some(high)) = (set.next(), set.next()) else {
                return Err(Error::invalid_argument(
                    "invalid between condition, two values are required",
                ));
            };
            context.write_char(' ')?;
            context.write_bound(low)?;
            context.write_str(" AND ")?;
            context.write_bound(high)
        }
        Keyword::Like => {
            let Value::Scalar(bind) = value else {
                return Err(Error::invalid_argument("like condition takes a single value"));
            };
            context.write_char(' ')?;
            context.write_bound(like_pattern(bind))
        }
        Keyword::In => {
            let set = non_empty_set("in condition", value)?;
            context.write_str(" (")?;
            context.write_bound_set(set)?;
            context.write_char(')')
        }
        Keyword::Plain => {
            let Value::Scalar(bind) = value else {
                return Err(Error::invalid_argument(
                    "a plain placeholder takes a single value, use IN? for lists",
                ));
            };
            context.write_bound(bind.clone())
        }
    }
}

fn like_pattern(bind: &Bind) -> Bind {
    let pattern = match bind {
        Bind::String(value) => value.clone(),
        other => smol_str::format_smolstr!("{other}"),
    };
    if pattern.contains('%') {
        Bind::String(pattern)
    } else {
        Bind::String(SmolStr::from(format!("%{pattern}%")))
    }
}

fn non_empty_set(subject: &str, value: &Value) -> Result<Vec<Bind>> {
    let set = value.to_set();
    if set.is_empty() {
        return Err(Error::invalid_argument(format!(
            "`{subject}` got an empty list"
        )));
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use crate::{IntoValue, bind::Binds};

    use super::*;

    fn render(template: &str, maybe_value: Option<Value>) -> Result<(String, Binds)> {
        let mut sql = String::new();
        let mut context = FormatContext::new(&mut sql);
        write_condition(template, maybe_value.as_ref(), &mut context)?;
        let binds = context.take_binds();
        Ok((sql, binds))
    }

    #[test]
    fn test_keyword() {
        assert_eq!(Keyword::Between, Keyword::trailing("age between"));
        assert_eq!(Keyword::Like, Keyword::trailing("name NOT LIKE"));
        assert_eq!(Keyword::In, Keyword::trailing("t.id IN"));
        assert_eq!(Keyword::Plain, Keyword::trailing("id="));
        assert_eq!(Keyword::Plain, Keyword::trailing("domain"));
        assert_eq!(Keyword::Plain, Keyword::trailing(""));
    }

    #[test]
    fn test_no_value_is_verbatim() {
        let (sql, binds) = render("deleted_at IS NULL", None).unwrap();
        assert_eq!("deleted_at IS NULL", sql);
        assert!(binds.is_empty());
    }

    #[test]
    fn test_implicit_equality() {
        let (sql, binds) = render("id", Some(5.into_value())).unwrap();
        assert_eq!("id=?", sql);
        assert_eq!(&[Bind::I32(5)], binds.as_slice());
    }

    #[test]
    fn test_implicit_in() {
        let (sql, binds) = render("id", Some(vec![1, 2, 3].into_value())).unwrap();
        assert_eq!("id IN(?,?,?)", sql);
        assert_eq!(&[Bind::I32(1), Bind::I32(2), Bind::I32(3)], binds.as_slice());
    }

    #[test]
    fn test_single_placeholder() {
        let (sql, binds) = render("age>=?", Some(18.into_value())).unwrap();
        assert_eq!("age>=?", sql);
        assert_eq!(&[Bind::I32(18)], binds.as_slice());
    }

    #[test]
    fn test_many_placeholders() {
        let (sql, binds) = render(
            "id=? AND name IN? AND age BETWEEN? AND nick LIKE?",
            Some((1, ["a", "b"], [18, 30], "bo").into_value()),
        )
        .unwrap();
        assert_eq!(
            "id=? AND name IN (?,?) AND age BETWEEN ? AND ? AND nick LIKE ?",
            sql
        );
        assert_eq!(
            &[
                Bind::I32(1),
                Bind::from("a"),
                Bind::from("b"),
                Bind::I32(18),
                Bind::I32(30),
                Bind::from("%bo%"),
            ],
            binds.as_slice()
        );
    }

    #[test]
    fn test_trailing_text_kept() {
        let (sql, binds) = render("id=? AND active=1", Some(3.into_value())).unwrap();
        assert_eq!("id=? AND active=1", sql);
        assert_eq!(1, binds.len());
    }

    #[test]
    fn test_in_single_placeholder_takes_whole_list() {
        let (sql, binds) = render("id NOT IN?", Some(vec![4, 5].into_value())).unwrap();
        assert_eq!("id NOT IN (?,?)", sql);
        assert_eq!(2, binds.len());
    }

    #[test]
    fn test_in_delimited_string() {
        let (sql, binds) = render("id IN?", Some("7,8,9".into_value())).unwrap();
        assert_eq!("id IN (?,?,?)", sql);
        assert_eq!(Some("8"), binds.as_slice()[1].as_str());
    }

    #[test]
    fn test_between_needs_two_values() {
        let err = render("age BETWEEN?", Some(vec![18].into_value())).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_between_binds_first_two() {
        let (sql, binds) = render("age BETWEEN?", Some(vec![1, 2, 3].into_value())).unwrap();
        assert_eq!("age BETWEEN ? AND ?", sql);
        assert_eq!(&[Bind::I32(1), Bind::I32(2)], binds.as_slice());
    }

    #[test]
    fn test_like_wraps() {
        let (_, binds) = render("name LIKE?", Some("bob".into_value())).unwrap();
        assert_eq!(&[Bind::from("%bob%")], binds.as_slice());
        let (_, binds) = render("name LIKE?", Some("bob%".into_value())).unwrap();
        assert_eq!(&[Bind::from("bob%")], binds.as_slice());
    }

    #[test]
    fn test_missing_values() {
        let err = render("a=? AND b=?", Some(1.into_value())).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_empty_in() {
        let err = render("id", Some(Vec::<i32>::new().into_value())).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
