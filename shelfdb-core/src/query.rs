//! Query construction for the document store.
//!
//! A [`Query`] is an immutable predicate over a single document, built from
//! field-path tests and logical combinators:
//!
//! ```
//! use shelfdb_core::query::field;
//!
//! let q = field("age").ge(18) & !field("role").eq("bot");
//! ```
//!
//! Field paths are dotted (`field("address.city")`) or built segment by
//! segment with [`Field::key`] when a key contains a literal dot. A missing
//! field path evaluates to false, never an error.
//!
//! Queries compare equal (and hash equal) when built from the same field
//! path and comparison, which lets the table's result cache hit across
//! structurally identical queries issued separately. Queries containing a
//! custom predicate ([`Field::test`]) compare by predicate identity and are
//! not cacheable.

use regex::Regex;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops;
use std::rc::Rc;

use crate::document::Document;
use crate::evaluator;

/// A caller-supplied predicate over a field value.
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// A comparison applied to the value selected by a field path.
#[derive(Clone)]
pub enum CmpOp {
    /// Equal to.
    Eq(Value),
    /// Not equal to.
    Ne(Value),
    /// Less than.
    Lt(Value),
    /// Less than or equal to.
    Le(Value),
    /// Greater than.
    Gt(Value),
    /// Greater than or equal to.
    Ge(Value),
    /// The field path is present, independent of value.
    Exists,
    /// Array membership, or substring containment for strings.
    Contains(Value),
    /// The field value equals any of the given values.
    AnyOf(Vec<Value>),
    /// Regex match anchored at the start of a string field.
    Matches(Regex),
    /// Unanchored regex match anywhere in a string field.
    Search(Regex),
    /// Custom predicate function.
    Test(Predicate),
}

impl fmt::Debug for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmpOp::Eq(v) => f.debug_tuple("Eq").field(v).finish(),
            CmpOp::Ne(v) => f.debug_tuple("Ne").field(v).finish(),
            CmpOp::Lt(v) => f.debug_tuple("Lt").field(v).finish(),
            CmpOp::Le(v) => f.debug_tuple("Le").field(v).finish(),
            CmpOp::Gt(v) => f.debug_tuple("Gt").field(v).finish(),
            CmpOp::Ge(v) => f.debug_tuple("Ge").field(v).finish(),
            CmpOp::Exists => f.write_str("Exists"),
            CmpOp::Contains(v) => f.debug_tuple("Contains").field(v).finish(),
            CmpOp::AnyOf(v) => f.debug_tuple("AnyOf").field(v).finish(),
            CmpOp::Matches(re) => f.debug_tuple("Matches").field(&re.as_str()).finish(),
            CmpOp::Search(re) => f.debug_tuple("Search").field(&re.as_str()).finish(),
            CmpOp::Test(_) => f.write_str("Test(..)"),
        }
    }
}

impl PartialEq for CmpOp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CmpOp::Eq(a), CmpOp::Eq(b)) => a == b,
            (CmpOp::Ne(a), CmpOp::Ne(b)) => a == b,
            (CmpOp::Lt(a), CmpOp::Lt(b)) => a == b,
            (CmpOp::Le(a), CmpOp::Le(b)) => a == b,
            (CmpOp::Gt(a), CmpOp::Gt(b)) => a == b,
            (CmpOp::Ge(a), CmpOp::Ge(b)) => a == b,
            (CmpOp::Exists, CmpOp::Exists) => true,
            (CmpOp::Contains(a), CmpOp::Contains(b)) => a == b,
            (CmpOp::AnyOf(a), CmpOp::AnyOf(b)) => a == b,
            (CmpOp::Matches(a), CmpOp::Matches(b)) => a.as_str() == b.as_str(),
            (CmpOp::Search(a), CmpOp::Search(b)) => a.as_str() == b.as_str(),
            (CmpOp::Test(a), CmpOp::Test(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for CmpOp {}

impl Hash for CmpOp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CmpOp::Eq(v)
            | CmpOp::Ne(v)
            | CmpOp::Lt(v)
            | CmpOp::Le(v)
            | CmpOp::Gt(v)
            | CmpOp::Ge(v)
            | CmpOp::Contains(v) => hash_value(v, state),
            CmpOp::Exists => {}
            CmpOp::AnyOf(values) => {
                state.write_usize(values.len());
                for v in values {
                    hash_value(v, state);
                }
            }
            CmpOp::Matches(re) | CmpOp::Search(re) => re.as_str().hash(state),
            CmpOp::Test(f) => (Rc::as_ptr(f) as *const () as usize).hash(state),
        }
    }
}

/// Hashes a JSON value consistently with `Value`'s equality.
///
/// Numbers hash through their f64 representation so that integer and float
/// encodings of the same number collide rather than split cache entries.
/// Objects hash order-independently, since `Value` equality ignores key
/// order.
fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => state.write_u8(0),
        Value::Bool(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Number(n) => {
            state.write_u8(2);
            n.as_f64().map(f64::to_bits).unwrap_or_default().hash(state);
        }
        Value::String(s) => {
            state.write_u8(3);
            s.hash(state);
        }
        Value::Array(items) => {
            state.write_u8(4);
            state.write_usize(items.len());
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            state.write_u8(5);
            state.write_usize(map.len());
            let mut acc: u64 = 0;
            for (key, val) in map {
                let mut entry = DefaultHasher::new();
                key.hash(&mut entry);
                hash_value(val, &mut entry);
                acc = acc.wrapping_add(entry.finish());
            }
            state.write_u64(acc);
        }
    }
}

/// A predicate expression tree over a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// All sub-expressions must match.
    And(Vec<Expr>),
    /// Any sub-expression must match.
    Or(Vec<Expr>),
    /// Inverts the sub-expression.
    Not(Box<Expr>),
    /// A comparison against the value at a field path.
    Field {
        /// Path segments, outermost first.
        path: Vec<String>,
        /// The comparison to apply.
        op: CmpOp,
    },
}

impl Expr {
    fn has_test(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().any(Expr::has_test),
            Expr::Not(expr) => expr.has_test(),
            Expr::Field { op, .. } => matches!(op, CmpOp::Test(_)),
        }
    }
}

/// An immutable, composable predicate over a single [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    expr: Expr,
}

impl Query {
    pub(crate) fn new(expr: Expr) -> Self {
        Self { expr }
    }

    /// Returns the underlying expression tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates this query against one document.
    pub fn matches(&self, doc: &Document) -> bool {
        evaluator::eval_expr(&self.expr, doc.fields())
    }

    /// Whether results for this query may be held in a result cache.
    ///
    /// Queries containing a custom predicate are only equal to themselves,
    /// so caching them would never pay off.
    pub fn is_cacheable(&self) -> bool {
        !self.expr.has_test()
    }
}

impl ops::BitAnd for Query {
    type Output = Query;

    fn bitand(self, rhs: Query) -> Query {
        Query::new(match self.expr {
            Expr::And(mut list) => {
                list.push(rhs.expr);
                Expr::And(list)
            }
            expr => Expr::And(vec![expr, rhs.expr]),
        })
    }
}

impl ops::BitOr for Query {
    type Output = Query;

    fn bitor(self, rhs: Query) -> Query {
        Query::new(match self.expr {
            Expr::Or(mut list) => {
                list.push(rhs.expr);
                Expr::Or(list)
            }
            expr => Expr::Or(vec![expr, rhs.expr]),
        })
    }
}

impl ops::Not for Query {
    type Output = Query;

    fn not(self) -> Query {
        Query::new(Expr::Not(Box::new(self.expr)))
    }
}

/// A field path under construction; comparison methods finish the [`Query`].
#[derive(Debug, Clone)]
pub struct Field {
    path: Vec<String>,
}

/// Starts a query on a field path; `.` separates nested keys.
pub fn field(path: &str) -> Field {
    Field::new(path)
}

impl Field {
    /// Creates a field path; `.` separates nested keys.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.split('.').map(str::to_string).collect(),
        }
    }

    /// Appends a single literal path segment (no dot splitting).
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }

    fn op(self, op: CmpOp) -> Query {
        Query::new(Expr::Field {
            path: self.path,
            op,
        })
    }

    /// Field value equals `value`.
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Eq(value.into()))
    }

    /// Field value does not equal `value`.
    pub fn ne(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Ne(value.into()))
    }

    /// Field value is less than `value`.
    pub fn lt(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Lt(value.into()))
    }

    /// Field value is less than or equal to `value`.
    pub fn le(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Le(value.into()))
    }

    /// Field value is greater than `value`.
    pub fn gt(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Gt(value.into()))
    }

    /// Field value is greater than or equal to `value`.
    pub fn ge(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Ge(value.into()))
    }

    /// The field path is present, independent of its value.
    pub fn exists(self) -> Query {
        self.op(CmpOp::Exists)
    }

    /// Array field contains `value`, or string field contains the substring.
    pub fn contains(self, value: impl Into<Value>) -> Query {
        self.op(CmpOp::Contains(value.into()))
    }

    /// Field value equals any of `values`.
    pub fn any_of<I, V>(self, values: I) -> Query
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.op(CmpOp::AnyOf(values.into_iter().map(Into::into).collect()))
    }

    /// String field matches `regex` at its start.
    pub fn matches(self, regex: Regex) -> Query {
        self.op(CmpOp::Matches(regex))
    }

    /// String field contains a match of `regex` anywhere.
    pub fn search(self, regex: Regex) -> Query {
        self.op(CmpOp::Search(regex))
    }

    /// Field value satisfies the custom predicate `f`.
    ///
    /// The resulting query is not cacheable and only compares equal to
    /// clones of itself.
    pub fn test(self, f: impl Fn(&Value) -> bool + 'static) -> Query {
        self.op(CmpOp::Test(Rc::new(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(q: &Query) -> u64 {
        let mut hasher = DefaultHasher::new();
        q.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn structurally_identical_queries_are_equal() {
        let a = field("user.name").eq("kafka");
        let b = field("user.name").eq("kafka");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn different_paths_or_values_differ() {
        assert_ne!(field("a").eq(1), field("b").eq(1));
        assert_ne!(field("a").eq(1), field("a").eq(2));
        assert_ne!(field("a").eq(1), field("a").ne(1));
    }

    #[test]
    fn dotted_path_splits_and_key_does_not() {
        let dotted = field("a.b").exists();
        let built = Field::new("a").key("b").exists();
        let literal = Field::new("a").key("b.c").exists();
        assert_eq!(dotted, built);
        assert_ne!(dotted, literal);
    }

    #[test]
    fn combinators_compose_structurally() {
        let a = field("a").eq(1) & field("b").eq(2);
        let b = field("a").eq(1) & field("b").eq(2);
        assert_eq!(a, b);
        assert_ne!(a, field("a").eq(1) | field("b").eq(2));
        assert_eq!(!field("a").eq(1), !field("a").eq(1));
    }

    #[test]
    fn regex_queries_compare_by_pattern() {
        let a = field("name").matches(Regex::new("ka.*").unwrap());
        let b = field("name").matches(Regex::new("ka.*").unwrap());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert!(a.is_cacheable());
    }

    #[test]
    fn test_queries_compare_by_identity_and_skip_cache() {
        let a = field("n").test(|v| v.as_i64().is_some_and(|n| n % 2 == 0));
        let b = field("n").test(|v| v.as_i64().is_some_and(|n| n % 2 == 0));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert!(!a.is_cacheable());
        assert!(!(field("x").eq(1) & b).is_cacheable());
    }

    #[test]
    fn int_and_float_forms_hash_together() {
        let int = field("n").eq(5);
        let float = field("n").eq(5.0);
        // Not equal as JSON values, but must not violate the hash contract
        // for the ones that are equal; the shared f64 path keeps this cheap.
        assert_eq!(hash_of(&int), hash_of(&float));
    }
}
