//! Nested column lists for `select`.

/// A column name or an arbitrarily nested list of them.
///
/// Anything convertible into `Fields` can be passed to
/// [`StatementBuilder::select`](crate::StatementBuilder::select): a single
/// `&str`, an array or `Vec` of names, arrays of arrays, and so on. Mixed
/// nesting is spelled with [`fields!`](crate::fields).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fields {
    One(String),
    Many(Vec<Fields>),
}

impl Fields {
    /// Flatten into column names, depth-first, preserving encounter order.
    pub fn flatten(self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<String>) {
        match self {
            Fields::One(name) => out.push(name),
            Fields::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for Fields {
    fn from(v: &str) -> Self {
        Fields::One(v.to_string())
    }
}

impl From<String> for Fields {
    fn from(v: String) -> Self {
        Fields::One(v)
    }
}

impl From<&String> for Fields {
    fn from(v: &String) -> Self {
        Fields::One(v.clone())
    }
}

impl<T: Into<Fields>> From<Vec<T>> for Fields {
    fn from(v: Vec<T>) -> Self {
        Fields::Many(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Fields>, const N: usize> From<[T; N]> for Fields {
    fn from(v: [T; N]) -> Self {
        Fields::Many(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Fields> + Clone> From<&[T]> for Fields {
    fn from(v: &[T]) -> Self {
        Fields::Many(v.iter().cloned().map(Into::into).collect())
    }
}

/// Build a [`Fields`] list from heterogeneous items.
///
/// ```ignore
/// let cols = pgselect::fields!["id", ["first_name", "last_name"], vec!["email"]];
/// ```
#[macro_export]
macro_rules! fields {
    ($($item:expr),* $(,)?) => {
        $crate::Fields::Many(vec![$($crate::Fields::from($item)),*])
    };
}
