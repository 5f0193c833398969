//! Query expression evaluation against a document's fields.
//!
//! Evaluation is infallible: a missing field path, a type mismatch, or an
//! incomparable pair of values makes the predicate false, never an error.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::document::Fields;
use crate::query::{CmpOp, Expr};

/// Type-erased, comparable view over JSON values.
///
/// Normalizes all numbers to f64 so that integer and float encodings of the
/// same number compare equal, the way they do in the persisted form.
#[derive(Debug)]
enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Value> for Comparable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Bool(b) => Comparable::Bool(*b),
            Value::Number(n) => Comparable::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Comparable::String(s),
            Value::Array(items) => Comparable::Array(items.iter().map(Comparable::from).collect()),
            Value::Object(map) => Comparable::Map(
                map.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates an expression tree against one document's fields.
pub(crate) fn eval_expr(expr: &Expr, fields: &Fields) -> bool {
    match expr {
        Expr::And(exprs) => exprs.iter().all(|e| eval_expr(e, fields)),
        Expr::Or(exprs) => exprs.iter().any(|e| eval_expr(e, fields)),
        Expr::Not(expr) => !eval_expr(expr, fields),
        Expr::Field { path, op } => match resolve_path(fields, path) {
            Some(value) => eval_op(op, value),
            None => false,
        },
    }
}

/// Walks a field path through nested objects; `None` when any hop is absent
/// or not an object.
fn resolve_path<'a>(fields: &'a Fields, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut value = fields.get(first)?;
    for segment in rest {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

fn eval_op(op: &CmpOp, value: &Value) -> bool {
    match op {
        CmpOp::Eq(rhs) => Comparable::from(value) == Comparable::from(rhs),
        CmpOp::Ne(rhs) => Comparable::from(value) != Comparable::from(rhs),
        CmpOp::Lt(rhs) | CmpOp::Le(rhs) | CmpOp::Gt(rhs) | CmpOp::Ge(rhs) => {
            match Comparable::from(value).partial_cmp(&Comparable::from(rhs)) {
                Some(ordering) => match op {
                    CmpOp::Lt(_) => ordering == Ordering::Less,
                    CmpOp::Le(_) => ordering != Ordering::Greater,
                    CmpOp::Gt(_) => ordering == Ordering::Greater,
                    CmpOp::Ge(_) => ordering != Ordering::Less,
                    _ => unreachable!(),
                },
                None => false,
            }
        }
        CmpOp::Exists => true,
        CmpOp::Contains(rhs) => match Comparable::from(value) {
            Comparable::Array(items) => items.iter().any(|item| *item == Comparable::from(rhs)),
            Comparable::String(hay) => rhs.as_str().is_some_and(|needle| hay.contains(needle)),
            _ => false,
        },
        CmpOp::AnyOf(values) => {
            let lhs = Comparable::from(value);
            values.iter().any(|rhs| lhs == Comparable::from(rhs))
        }
        CmpOp::Matches(re) => value
            .as_str()
            .is_some_and(|s| re.find(s).is_some_and(|m| m.start() == 0)),
        CmpOp::Search(re) => value.as_str().is_some_and(|s| re.is_match(s)),
        CmpOp::Test(f) => f(value),
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;
    use crate::query::field;
    use crate::testutil::fields;
    use regex::Regex;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::new(1, fields(value))
    }

    #[test]
    fn comparisons_on_numbers() {
        let d = doc(json!({"data": 5}));
        assert!(field("data").eq(5).matches(&d));
        assert!(field("data").eq(5.0).matches(&d));
        assert!(field("data").lt(6).matches(&d));
        assert!(field("data").le(5).matches(&d));
        assert!(field("data").gt(4).matches(&d));
        assert!(field("data").ge(5).matches(&d));
        assert!(!field("data").ne(5).matches(&d));
    }

    #[test]
    fn missing_path_is_false_even_negated_ops() {
        let d = doc(json!({"a": 1}));
        assert!(!field("b").eq(1).matches(&d));
        assert!(!field("b").ne(1).matches(&d));
        assert!(!field("b").exists().matches(&d));
        assert!(!field("a.b").eq(1).matches(&d));
    }

    #[test]
    fn exists_ignores_value() {
        let d = doc(json!({"a": null, "b": false}));
        assert!(field("a").exists().matches(&d));
        assert!(field("b").exists().matches(&d));
        assert!(!field("c").exists().matches(&d));
    }

    #[test]
    fn nested_paths_resolve() {
        let d = doc(json!({"user": {"address": {"city": "pune"}}}));
        assert!(field("user.address.city").eq("pune").matches(&d));
        assert!(field("user.address").exists().matches(&d));
        assert!(!field("user.address.zip").exists().matches(&d));
    }

    #[test]
    fn incomparable_types_are_false() {
        let d = doc(json!({"a": "text"}));
        assert!(!field("a").lt(5).matches(&d));
        assert!(!field("a").eq(5).matches(&d));
        assert!(field("a").ne(5).matches(&d));
    }

    #[test]
    fn contains_on_arrays_and_strings() {
        let d = doc(json!({"tags": ["db", "embedded"], "name": "shelfdb"}));
        assert!(field("tags").contains("db").matches(&d));
        assert!(!field("tags").contains("cli").matches(&d));
        assert!(field("name").contains("shelf").matches(&d));
        assert!(!field("name").contains("client").matches(&d));
    }

    #[test]
    fn any_of_checks_membership() {
        let d = doc(json!({"status": "active"}));
        assert!(field("status").any_of(["active", "idle"]).matches(&d));
        assert!(!field("status").any_of(["gone", "banned"]).matches(&d));
    }

    #[test]
    fn matches_anchors_and_search_does_not() {
        let d = doc(json!({"name": "shelfdb"}));
        assert!(field("name").matches(Regex::new("shelf").unwrap()).matches(&d));
        assert!(!field("name").matches(Regex::new("db").unwrap()).matches(&d));
        assert!(field("name").search(Regex::new("db").unwrap()).matches(&d));
        assert!(!field("name").search(Regex::new("^db").unwrap()).matches(&d));
    }

    #[test]
    fn custom_predicates_run_on_the_value() {
        let d = doc(json!({"n": 4}));
        let even = field("n").test(|v| v.as_i64().is_some_and(|n| n % 2 == 0));
        assert!(even.matches(&d));
        assert!(!even.matches(&doc(json!({"n": 3}))));
    }

    #[test]
    fn combinators_follow_boolean_algebra() {
        let first = doc(json!({"a": 1, "b": 1}));
        let second = doc(json!({"a": 1, "b": 2}));

        let both = field("a").eq(1) & field("b").eq(2);
        assert!(!both.matches(&first));
        assert!(both.matches(&second));

        let either = field("b").eq(1) | field("b").eq(2);
        assert!(either.matches(&first));
        assert!(either.matches(&second));

        let negated = !field("b").eq(2);
        assert!(negated.matches(&first));
        assert!(!negated.matches(&second));
    }

    #[test]
    fn equality_over_nested_structures() {
        let d = doc(json!({"point": {"x": 1, "y": 2}, "list": [1, 2]}));
        assert!(field("point").eq(json!({"y": 2, "x": 1})).matches(&d));
        assert!(field("list").eq(json!([1, 2])).matches(&d));
        assert!(!field("list").eq(json!([2, 1])).matches(&d));
    }
}
