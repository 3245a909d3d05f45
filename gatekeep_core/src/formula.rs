//! The specification language.
//!
//! A [`Formula`] is an immutable tree over named atomic propositions.
//! Combinators consume their operands and return a new node; nothing is
//! mutated in place, so a formula can be shared freely once built.
//!
//! ```text
//! safety = □ ¬crash        Formula::atomic("crash").not().always()
//! shield = □ ¬(N∧E ∨ ...)  Formula::any([...]).not().always()
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops;

/// A temporal-logic formula.
///
/// The set of variants is closed. The evaluator matches on it exhaustively,
/// so adding an operator means extending this enum and that match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    /// A named proposition resolved per observation. Equality compares the name only.
    Atomic(String),

    /// Constant truth.
    True,

    /// Negation.
    Not(Box<Formula>),

    /// N-ary conjunction.
    And(Vec<Formula>),

    /// N-ary disjunction.
    Or(Vec<Formula>),

    /// Holds at every step.
    Always(Box<Formula>),

    /// Holds at some step.
    Eventually(Box<Formula>),

    /// Constructible, but the evaluator has no semantics for it.
    Until(Box<Formula>, Box<Formula>),
}

impl Formula {
    /// Creates an atomic proposition.
    pub fn atomic(name: impl Into<String>) -> Self {
        Formula::Atomic(name.into())
    }

    pub fn tt() -> Self {
        Formula::True
    }

    /// Constant falsity, `¬⊤`.
    pub fn ff() -> Self {
        Self::tt().not()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Formula::Not(Box::new(self))
    }

    /// Binary conjunction.
    pub fn and(self, other: Self) -> Self {
        Formula::And(vec![self, other])
    }

    /// Binary disjunction.
    pub fn or(self, other: Self) -> Self {
        Formula::Or(vec![self, other])
    }

    /// N-ary conjunction.
    ///
    /// An empty operand list is accepted here but rejected at evaluation.
    pub fn all(operands: impl IntoIterator<Item = Formula>) -> Self {
        Formula::And(operands.into_iter().collect())
    }

    /// N-ary disjunction. See [`Formula::all`] for the empty case.
    pub fn any(operands: impl IntoIterator<Item = Formula>) -> Self {
        Formula::Or(operands.into_iter().collect())
    }

    pub fn always(self) -> Self {
        Formula::Always(Box::new(self))
    }

    pub fn eventually(self) -> Self {
        Formula::Eventually(Box::new(self))
    }

    pub fn until(self, other: Self) -> Self {
        Formula::Until(Box::new(self), Box::new(other))
    }

    /// `a → b`, derived as `¬a ∨ b`.
    pub fn implies(self, other: Self) -> Self {
        self.not().or(other)
    }

    /// `a ↔ b`, derived as `(a → b) ∧ (b → a)`.
    pub fn iff(self, other: Self) -> Self {
        self.clone()
            .implies(other.clone())
            .and(other.implies(self))
    }

    /// Collects the distinct atomic names in first-occurrence order.
    pub fn atoms(&self) -> Vec<&str> {
        fn walk<'a>(f: &'a Formula, out: &mut Vec<&'a str>) {
            match f {
                Formula::Atomic(name) => {
                    if !out.contains(&name.as_str()) {
                        out.push(name);
                    }
                }
                Formula::True => {}
                Formula::Not(p) | Formula::Always(p) | Formula::Eventually(p) => walk(p, out),
                Formula::And(ps) | Formula::Or(ps) => ps.iter().for_each(|p| walk(p, out)),
                Formula::Until(p, q) => {
                    walk(p, out);
                    walk(q, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Formula::Atomic(_) | Formula::True => 1,
            Formula::Not(p) | Formula::Always(p) | Formula::Eventually(p) => 1 + p.size(),
            Formula::And(ps) | Formula::Or(ps) => 1 + ps.iter().map(Formula::size).sum::<usize>(),
            Formula::Until(p, q) => 1 + p.size() + q.size(),
        }
    }
}

// Diagnostic form only; there is no parser for it.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, ps: &[Formula], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, p) in ps.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", p)?;
            }
            write!(f, ")")
        }
        match self {
            Formula::Atomic(name) => write!(f, "{}", name),
            Formula::True => write!(f, "T"),
            Formula::Not(p) => write!(f, "(! {})", p),
            Formula::And(ps) => join(f, ps, "&"),
            Formula::Or(ps) => join(f, ps, "|"),
            Formula::Always(p) => write!(f, "(G {})", p),
            Formula::Eventually(p) => write!(f, "(F {})", p),
            Formula::Until(p, q) => write!(f, "({} U {})", p, q),
        }
    }
}

impl ops::Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        Formula::Not(Box::new(self))
    }
}

impl ops::BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Formula) -> Formula {
        self.and(rhs)
    }
}

impl ops::BitOr for Formula {
    type Output = Formula;

    fn bitor(self, rhs: Formula) -> Formula {
        self.or(rhs)
    }
}

impl From<&str> for Formula {
    fn from(name: &str) -> Self {
        Formula::atomic(name)
    }
}
