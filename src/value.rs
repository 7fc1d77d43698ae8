use crate::{
    Bind, IntoBind,
    bind::Binds,
};

/// Value attached to a where condition.
///
/// A scalar fills one placeholder; a list either expands into an `IN (...)`
/// set or supplies one item per placeholder of a multi-placeholder condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Bind),
    List(Vec<Value>),
}

impl Value {
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Flatten into plain binds, depth first.
    pub fn to_binds(&self) -> Binds {
        let mut binds = Binds::None;
        self.collect_into(&mut binds);
        binds
    }

    fn collect_into(&self, binds: &mut Binds) {
        match self {
            Value::Scalar(bind) => binds.push(bind.clone()),
            Value::List(items) => items.iter().for_each(|item| item.collect_into(binds)),
        }
    }

    /// Members of a set (`IN`, `BETWEEN`); a string scalar is a comma delimited list.
    pub(crate) fn to_set(&self) -> Vec<Bind> {
        match self {
            Value::Scalar(Bind::String(list)) => list
                .split(',')
                .map(|item| Bind::String(item.into()))
                .collect(),
            Value::Scalar(bind) => vec![bind.clone()],
            Value::List(_) => self.to_binds().into_vec(),
        }
    }
}

pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T> IntoValue for T
where
    T: IntoBind,
{
    fn into_value(self) -> Value {
        Value::Scalar(self.into_bind())
    }
}

impl<T> IntoValue for Vec<T>
where
    T: IntoValue,
{
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T, const N: usize> IntoValue for [T; N]
where
    T: IntoValue,
{
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

macro_rules! impl_tuple_value {
    ($($name:ident),+) => {
        impl<$($name),+> IntoValue for ($($name,)+)
        where
            $($name: IntoValue,)+
        {
            #[allow(non_snake_case)]
            fn into_value(self) -> Value {
                let ($($name,)+) = self;
                Value::List(vec![$($name.into_value()),+])
            }
        }
    };
}

impl_tuple_value!(A, B);
impl_tuple_value!(A, B, C);
impl_tuple_value!(A, B, C, D);
