//! Query evaluation over records.
//!
//! `Query::matches` decides whether a record satisfies the filter
//! condition; `Query::sort` applies the `order by` keys. The pseudo-field
//! `record_number` resolves to the record id, which never appears in the
//! field mapping itself.

use crate::ast::{Comparator, Condition, Literal, Query};
use std::cmp::Ordering;
use trellis_core::{FieldValue, Record};

/// The value a query clause sees for one field of one record.
enum FieldSlot<'a> {
    Value(&'a FieldValue),
    RecordNumber(u64),
}

fn resolve<'a>(record: &'a Record, field: &str) -> Option<FieldSlot<'a>> {
    if field == "record_number" {
        return Some(FieldSlot::RecordNumber(record.id().raw()));
    }
    record.field(field).map(|f| FieldSlot::Value(f.value()))
}

fn compare_numeric(left: i64, op: Comparator, right: i64) -> bool {
    match op {
        Comparator::Eq => left == right,
        Comparator::NotEq => left != right,
        Comparator::Lt => left < right,
        Comparator::LtEq => left <= right,
        Comparator::Gt => left > right,
        Comparator::GtEq => left >= right,
        Comparator::Like => false,
    }
}

fn compare_text(left: &str, op: Comparator, right: &str) -> bool {
    match op {
        Comparator::Eq => left == right,
        Comparator::NotEq => left != right,
        Comparator::Lt => left < right,
        Comparator::LtEq => left <= right,
        Comparator::Gt => left > right,
        Comparator::GtEq => left >= right,
        Comparator::Like => left.contains(right),
    }
}

/// A string literal against a numeric field compares numerically when it
/// parses as a number (numbers travel the wire as decimal strings).
fn literal_as_int(literal: &Literal) -> Option<i64> {
    match literal {
        Literal::Int(n) => Some(*n),
        Literal::Str(s) => s.parse().ok(),
    }
}

fn clause_matches(slot: &FieldSlot<'_>, op: Comparator, literal: &Literal) -> bool {
    match slot {
        FieldSlot::RecordNumber(n) => match literal_as_int(literal) {
            Some(rhs) => compare_numeric(*n as i64, op, rhs),
            None => false,
        },
        FieldSlot::Value(FieldValue::Number(Some(n))) => match literal_as_int(literal) {
            Some(rhs) => compare_numeric(*n, op, rhs),
            None => false,
        },
        FieldSlot::Value(FieldValue::SingleLineText(s))
        | FieldSlot::Value(FieldValue::MultiLineText(s)) => match literal {
            Literal::Str(rhs) => compare_text(s, op, rhs),
            Literal::Int(_) => false,
        },
        FieldSlot::Value(FieldValue::MultiSelect(items))
        | FieldSlot::Value(FieldValue::CheckBox(items)) => match (op, literal) {
            (Comparator::Eq, Literal::Str(rhs)) => items.iter().any(|i| i == rhs),
            (Comparator::NotEq, Literal::Str(rhs)) => !items.iter().any(|i| i == rhs),
            _ => false,
        },
        FieldSlot::Value(FieldValue::UserSelect(users)) => match (op, literal) {
            (Comparator::Eq, Literal::Str(rhs)) => users.iter().any(|u| u.code == *rhs),
            (Comparator::NotEq, Literal::Str(rhs)) => !users.iter().any(|u| u.code == *rhs),
            _ => false,
        },
        _ => false,
    }
}

fn in_matches(slot: &FieldSlot<'_>, values: &[Literal]) -> bool {
    values.iter().any(|v| clause_matches(slot, Comparator::Eq, v))
}

fn condition_matches(condition: &Condition, record: &Record) -> bool {
    match condition {
        Condition::Compare { field, op, value } => match resolve(record, field) {
            Some(slot) => clause_matches(&slot, *op, value),
            None => false,
        },
        Condition::In { field, values } => match resolve(record, field) {
            Some(slot) => in_matches(&slot, values),
            None => false,
        },
        Condition::And(left, right) => {
            condition_matches(left, record) && condition_matches(right, record)
        }
        Condition::Or(left, right) => {
            condition_matches(left, record) || condition_matches(right, record)
        }
    }
}

/// The comparable projection of one field for ordering. Records missing
/// the key sort before records that have it; values of incomparable kinds
/// tie, and the stable sort keeps their original order.
enum SortValue<'a> {
    Missing,
    Int(i64),
    Text(&'a str),
}

fn sort_value<'a>(record: &'a Record, field: &str) -> SortValue<'a> {
    match resolve(record, field) {
        Some(FieldSlot::RecordNumber(n)) => SortValue::Int(n as i64),
        Some(FieldSlot::Value(FieldValue::Number(Some(n)))) => SortValue::Int(*n),
        Some(FieldSlot::Value(FieldValue::SingleLineText(s)))
        | Some(FieldSlot::Value(FieldValue::MultiLineText(s))) => SortValue::Text(s),
        _ => SortValue::Missing,
    }
}

fn cmp_sort_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, _) => Ordering::Less,
        (_, SortValue::Missing) => Ordering::Greater,
        (SortValue::Int(x), SortValue::Int(y)) => x.cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

impl Query {
    /// Returns true iff the record satisfies the filter condition. The
    /// empty condition matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        match &self.condition {
            Some(condition) => condition_matches(condition, record),
            None => true,
        }
    }

    /// Apply the `order by` keys with a stable sort; no keys leaves the
    /// slice in its original (insertion) order.
    pub fn sort(&self, records: &mut [Record]) {
        if self.order.is_empty() {
            return;
        }
        records.sort_by(|a, b| {
            for key in &self.order {
                let ord = cmp_sort_values(&sort_value(a, &key.field), &sort_value(b, &key.field));
                let ord = if key.descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}
