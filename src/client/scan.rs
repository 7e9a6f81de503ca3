//! Binding SQL result rows to typed records.
//!
//! A record type lists its `(column, setter)` pairs once through
//! [`Scannable::bindings`], usually via [`impl_scannable!`](crate::impl_scannable).
//! A [`RowBinder`] resolves the result set's columns against those bindings
//! once and then applies them to every row.

use crate::client::querier::{ColumnDef, ResultSet, RowData};
use crate::error::ScanError;

/// A value that can be parsed from the engine's textual column encoding
pub trait FromColumn: Sized {
    /// Name used in type-mismatch errors
    const EXPECTED: &'static str;

    fn from_column(raw: &str) -> Option<Self>;
}

macro_rules! from_column_parse {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(impl FromColumn for $ty {
            const EXPECTED: &'static str = $name;

            fn from_column(raw: &str) -> Option<Self> {
                raw.trim().parse().ok()
            }
        })*
    };
}

from_column_parse! {
    i8 => "int", i16 => "int", i32 => "int", i64 => "int",
    u8 => "uint", u16 => "uint", u32 => "uint", u64 => "uint",
    f32 => "float", f64 => "float",
}

impl FromColumn for String {
    const EXPECTED: &'static str = "string";

    fn from_column(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromColumn for bool {
    const EXPECTED: &'static str = "bool";

    fn from_column(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" | "TRUE" | "1" => Some(true),
            "false" | "FALSE" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Empty text and `NULL` read as `None`
impl<T: FromColumn> FromColumn for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_column(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw == "NULL" {
            return Some(None);
        }
        T::from_column(raw).map(Some)
    }
}

/// Writes one parsed column into a record; the error is the expected type name
pub type Setter<T> = fn(&mut T, &str) -> Result<(), &'static str>;

pub struct FieldBinding<T> {
    pub column: &'static str,
    pub set: Setter<T>,
}

impl<T> FieldBinding<T> {
    pub fn new(column: &'static str, set: Setter<T>) -> Self {
        Self { column, set }
    }
}

pub trait Scannable: Default {
    fn bindings() -> Vec<FieldBinding<Self>>;
}

/// Parse `raw` into `slot`
pub fn assign<V: FromColumn>(slot: &mut V, raw: &str) -> Result<(), &'static str> {
    *slot = V::from_column(raw).ok_or(V::EXPECTED)?;
    Ok(())
}

/// Implement [`Scannable`] by naming the field each column lands in.
///
/// ```ignore
/// #[derive(Default)]
/// struct Book { title: String, year: i64 }
/// glitter_sdk::impl_scannable!(Book { title => "title", year => "year" });
/// ```
#[macro_export]
macro_rules! impl_scannable {
    ($ty:ty { $($field:ident => $column:literal),* $(,)? }) => {
        impl $crate::client::scan::Scannable for $ty {
            fn bindings() -> ::std::vec::Vec<$crate::client::scan::FieldBinding<Self>> {
                ::std::vec![$(
                    $crate::client::scan::FieldBinding::new($column, |row: &mut Self, raw: &str| {
                        $crate::client::scan::assign(&mut row.$field, raw)
                    })
                ),*]
            }
        }
    };
}

/// Whether result columns without a binding are an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    Strict,
    #[default]
    Lenient,
}

/// Column-to-setter plan for one result set
pub struct RowBinder<T> {
    columns: Vec<String>,
    setters: Vec<Option<Setter<T>>>,
}

impl<T: Scannable> RowBinder<T> {
    pub fn new(column_defs: &[ColumnDef], mode: ScanMode) -> Result<Self, ScanError> {
        let bindings = T::bindings();
        let mut setters = Vec::with_capacity(column_defs.len());
        for def in column_defs {
            let setter = bindings
                .iter()
                .find(|b| b.column == def.column_name)
                .map(|b| b.set);
            if setter.is_none() && mode == ScanMode::Strict {
                return Err(ScanError::UnmappedColumn(def.column_name.clone()));
            }
            setters.push(setter);
        }
        Ok(Self {
            columns: column_defs.iter().map(|d| d.column_name.clone()).collect(),
            setters,
        })
    }

    pub fn bind(&self, index: usize, row: &RowData) -> Result<T, ScanError> {
        if row.columns.len() != self.setters.len() {
            return Err(ScanError::RowWidth {
                row: index,
                got: row.columns.len(),
                want: self.setters.len(),
            });
        }

        let mut record = T::default();
        for ((setter, raw), column) in self.setters.iter().zip(&row.columns).zip(&self.columns) {
            if let Some(set) = setter {
                set(&mut record, raw).map_err(|expected| ScanError::TypeMismatch {
                    column: column.clone(),
                    expected,
                    value: raw.clone(),
                })?;
            }
        }
        Ok(record)
    }
}

pub fn scan_result_set<T: Scannable>(result_set: &ResultSet, mode: ScanMode) -> Result<Vec<T>, ScanError> {
    let binder = RowBinder::<T>::new(&result_set.column_defs, mode)?;
    result_set
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| binder.bind(i, row))
        .collect()
}
