//! Fluent builder producing query strings.
//!
//! For callers who prefer not to hand-write query text:
//!
//! ```
//! use trellis_query::{field, SortDir};
//!
//! let q = field("text")
//!     .eq("foo")
//!     .and(field("n").gt(5))
//!     .order_by("n", SortDir::Desc)
//!     .build();
//! assert_eq!(q, "text = \"foo\" and n > 5 order by n desc");
//! ```

use crate::ast::Literal;
use std::fmt::Write;

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn keyword(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Start a clause on the named field.
pub fn field(code: &str) -> FieldRef {
    FieldRef {
        code: code.to_string(),
    }
}

/// Start a query that only orders, without filtering.
pub fn order_by(code: &str, dir: SortDir) -> Criteria {
    Criteria {
        filter: String::new(),
        order: format!("{} {}", code, dir.keyword()),
    }
}

/// A field awaiting its comparison.
#[derive(Debug, Clone)]
pub struct FieldRef {
    code: String,
}

impl FieldRef {
    fn compare(self, op: &str, value: Literal) -> Criteria {
        Criteria {
            filter: format!("{} {} {}", self.code, op, render(&value)),
            order: String::new(),
        }
    }

    pub fn eq(self, value: impl Into<Literal>) -> Criteria {
        self.compare("=", value.into())
    }

    pub fn ne(self, value: impl Into<Literal>) -> Criteria {
        self.compare("!=", value.into())
    }

    pub fn lt(self, value: impl Into<Literal>) -> Criteria {
        self.compare("<", value.into())
    }

    pub fn lte(self, value: impl Into<Literal>) -> Criteria {
        self.compare("<=", value.into())
    }

    pub fn gt(self, value: impl Into<Literal>) -> Criteria {
        self.compare(">", value.into())
    }

    pub fn gte(self, value: impl Into<Literal>) -> Criteria {
        self.compare(">=", value.into())
    }

    pub fn like(self, value: impl Into<String>) -> Criteria {
        self.compare("like", Literal::Str(value.into()))
    }

    pub fn any_of<I, L>(self, values: I) -> Criteria
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        let mut list = String::new();
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                list.push_str(", ");
            }
            let _ = write!(list, "{}", render(&value.into()));
        }
        Criteria {
            filter: format!("{} in ({})", self.code, list),
            order: String::new(),
        }
    }
}

/// An assembled query, convertible to its string form with [`build`].
///
/// [`build`]: Criteria::build
#[derive(Debug, Clone)]
pub struct Criteria {
    filter: String,
    order: String,
}

impl Criteria {
    /// Both criteria must hold.
    pub fn and(mut self, other: Criteria) -> Criteria {
        self.filter = format!("{} and {}", self.filter, other.filter);
        self
    }

    /// Either criterion may hold. The combination is parenthesized so a
    /// later `and` keeps its meaning.
    pub fn or(mut self, other: Criteria) -> Criteria {
        self.filter = format!("({} or {})", self.filter, other.filter);
        self
    }

    /// Append an order key.
    pub fn order_by(mut self, code: &str, dir: SortDir) -> Criteria {
        if !self.order.is_empty() {
            self.order.push_str(", ");
        }
        let _ = write!(self.order, "{} {}", code, dir.keyword());
        self
    }

    /// Render the query string.
    pub fn build(self) -> String {
        match (self.filter.is_empty(), self.order.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.filter,
            (true, false) => format!("order by {}", self.order),
            (false, false) => format!("{} order by {}", self.filter, self.order),
        }
    }
}

fn render(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Str(s) => {
            let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\"", escaped)
        }
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Str(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}
