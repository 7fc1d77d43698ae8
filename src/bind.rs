use std::{borrow::Cow, fmt};

use smol_str::SmolStr;

// max size is 32 bytes
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Null,
    String(SmolStr),
    Bool(bool),
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl Bind {
    pub fn is_null(&self) -> bool {
        matches!(self, Bind::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bind::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bind::Null => Ok(()),
            Bind::String(value) => f.write_str(value),
            Bind::Bool(value) => fmt::Display::fmt(value, f),
            Bind::F32(value) => fmt::Display::fmt(value, f),
            Bind::F64(value) => fmt::Display::fmt(value, f),
            Bind::I8(value) => fmt::Display::fmt(value, f),
            Bind::I16(value) => fmt::Display::fmt(value, f),
            Bind::I32(value) => fmt::Display::fmt(value, f),
            Bind::I64(value) => fmt::Display::fmt(value, f),
            Bind::U8(value) => fmt::Display::fmt(value, f),
            Bind::U16(value) => fmt::Display::fmt(value, f),
            Bind::U32(value) => fmt::Display::fmt(value, f),
            Bind::U64(value) => fmt::Display::fmt(value, f),
        }
    }
}

pub type Binds = Array<Bind>;

impl IntoBinds for Binds {
    fn into_binds(self) -> Binds {
        self
    }
}

impl IntoBinds for () {
    fn into_binds(self) -> Binds {
        Binds::None
    }
}

// if T <= 32 bytes we are good and it's a free data structure.
#[derive(Debug, Default, Clone)]
pub enum Array<T> {
    #[default]
    None,
    One(T),
    Many(Vec<T>),
}

impl<T> Array<T> {
    pub fn append(&mut self, other: Self) {
        let combined = match (std::mem::replace(self, Self::None), other) {
            (Self::None, cols) | (cols, Self::None) => cols,
            (Self::One(a), Self::One(b)) => Self::Many(vec![a, b]),
            (Self::One(a), Self::Many(mut b)) => {
                b.insert(0, a);
                Self::Many(b)
            }
            (Self::Many(mut a), Self::One(b)) => {
                a.push(b);
                Self::Many(a)
            }
            (Self::Many(mut a), Self::Many(mut b)) => {
                a.append(&mut b);
                Self::Many(a)
            }
        };
        *self = combined;
    }

    pub fn push(&mut self, value: T) {
        self.append(Self::One(value));
    }

    pub fn len(&self) -> usize {
        match self {
            Array::None => 0,
            Array::One(_) => 1,
            Array::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Array::None => &[],
            Array::One(one) => std::slice::from_ref(one),
            Array::Many(many) => many.as_slice(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::None => Vec::new(),
            Self::One(one) => Vec::from([one]),
            Self::Many(many) => many,
        }
    }
}

pub trait IntoBind {
    fn into_bind(self) -> Bind;
}

pub trait IntoBinds {
    fn into_binds(self) -> Binds;
}

impl<T> IntoBinds for T
where
    T: IntoBind,
{
    fn into_binds(self) -> Binds {
        Binds::One(self.into_bind())
    }
}

impl<T> IntoBinds for Vec<T>
where
    T: IntoBind,
{
    fn into_binds(self) -> Binds {
        Binds::Many(self.into_iter().map(IntoBind::into_bind).collect())
    }
}

impl<T, const N: usize> IntoBinds for [T; N]
where
    T: IntoBind,
{
    fn into_binds(self) -> Binds {
        let mut iter = self.into_iter().map(IntoBind::into_bind);
        match (N, iter.next()) {
            (_, None) => Binds::None,
            (1, Some(one)) => Binds::One(one),
            (_, Some(first)) => {
                let mut many = Vec::with_capacity(N);
                many.push(first);
                many.extend(iter);
                Binds::Many(many)
            }
        }
    }
}

impl<T> IntoBind for Option<T>
where
    T: IntoBind,
{
    fn into_bind(self) -> Bind {
        if let Some(value) = self {
            value.into_bind()
        } else {
            Bind::Null
        }
    }
}

impl IntoBind for Bind {
    fn into_bind(self) -> Bind {
        self
    }
}

macro_rules! impl_bind {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Bind {
                fn from(value: $ty) -> Self {
                    Bind::$variant(value)
                }
            }

            impl IntoBind for $ty {
                fn into_bind(self) -> Bind {
                    Bind::$variant(self)
                }
            }
        )+
    };
}

impl_bind!(
    Bool => bool,
    F32 => f32,
    F64 => f64,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    String => SmolStr,
);

impl IntoBind for &str {
    fn into_bind(self) -> Bind {
        Bind::String(SmolStr::new(self))
    }
}

impl IntoBind for String {
    fn into_bind(self) -> Bind {
        Bind::String(SmolStr::from(self))
    }
}

impl IntoBind for &String {
    fn into_bind(self) -> Bind {
        Bind::String(SmolStr::new(self))
    }
}

impl IntoBind for Cow<'_, str> {
    fn into_bind(self) -> Bind {
        Bind::String(SmolStr::new(self))
    }
}

impl From<&str> for Bind {
    fn from(value: &str) -> Self {
        value.into_bind()
    }
}

impl From<String> for Bind {
    fn from(value: String) -> Self {
        value.into_bind()
    }
}

#[cfg(feature = "chrono")]
impl IntoBind for chrono::NaiveDate {
    fn into_bind(self) -> Bind {
        Bind::String(smol_str::format_smolstr!("{}", self.format("%Y-%m-%d")))
    }
}

#[cfg(feature = "chrono")]
impl IntoBind for chrono::NaiveDateTime {
    fn into_bind(self) -> Bind {
        Bind::String(smol_str::format_smolstr!("{}", self.format("%Y-%m-%d %H:%M:%S")))
    }
}

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone> IntoBind for chrono::DateTime<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn into_bind(self) -> Bind {
        Bind::String(SmolStr::from(self.to_rfc3339()))
    }
}

#[cfg(feature = "time")]
impl IntoBind for time::Date {
    fn into_bind(self) -> Bind {
        Bind::String(smol_str::format_smolstr!("{}", self))
    }
}

#[cfg(feature = "time")]
impl IntoBind for time::OffsetDateTime {
    fn into_bind(self) -> Bind {
        let formatted = self
            .format(&time::format_description::well_known::Rfc3339)
            .map(SmolStr::from)
            .unwrap_or_else(|_| smol_str::format_smolstr!("{}", self));
        Bind::String(formatted)
    }
}

#[cfg(feature = "uuid")]
impl IntoBind for uuid::Uuid {
    fn into_bind(self) -> Bind {
        Bind::String(smol_str::format_smolstr!("{}", self.hyphenated()))
    }
}

#[cfg(feature = "json")]
impl IntoBind for serde_json::Value {
    fn into_bind(self) -> Bind {
        match self {
            serde_json::Value::Null => Bind::Null,
            other => Bind::String(SmolStr::from(other.to_string())),
        }
    }
}
