//! Recursive interpreter from formulas to robustness degrees.

use crate::degree::Degree;
use crate::error::{EvalError, EvalResult};
use crate::formula::Formula;
use crate::semantics;

/// Resolves an atomic proposition against a single observation.
///
/// Implementations return a degree in `[0, 1]`, or
/// [`EvalError::UnknownAtomic`] for a name outside their domain. Any
/// `Fn(&str, &O) -> EvalResult<f64>` closure is an `AtomicEval<O>`.
pub trait AtomicEval<O>: Send + Sync {
    fn eval(&self, name: &str, observation: &O) -> EvalResult<f64>;
}

impl<O, F> AtomicEval<O> for F
where
    F: Fn(&str, &O) -> EvalResult<f64> + Send + Sync,
{
    fn eval(&self, name: &str, observation: &O) -> EvalResult<f64> {
        self(name, observation)
    }
}

/// Evaluates `spec` over `trajectory`.
///
/// | node | result |
/// |------|--------|
/// | `Atomic`, `Not` | `Sequence`, one value per observation |
/// | `Always`, `Eventually`, `And`, `Or`, `True` | `Scalar` |
/// | `Until` | [`EvalError::UnsupportedSpecification`] |
///
/// An empty trajectory is a precondition violation and fails before any
/// node is visited.
pub fn evaluate<O, E>(spec: &Formula, trajectory: &[O], atomic_eval: &E) -> EvalResult<Degree>
where
    E: AtomicEval<O> + ?Sized,
{
    if trajectory.is_empty() {
        return Err(EvalError::EmptyTrajectory);
    }
    eval_node(spec, trajectory, atomic_eval)
}

fn eval_node<O, E>(spec: &Formula, trajectory: &[O], atomic_eval: &E) -> EvalResult<Degree>
where
    E: AtomicEval<O> + ?Sized,
{
    let eval = |f: &Formula| eval_node(f, trajectory, atomic_eval);

    match spec {
        Formula::Atomic(name) => trajectory
            .iter()
            .map(|obs| atomic_eval.eval(name, obs))
            .collect::<EvalResult<Vec<f64>>>()
            .map(Degree::Sequence),
        Formula::True => Ok(Degree::Scalar(1.0)),
        Formula::Not(p) => Ok(semantics::not(eval(p)?)),
        Formula::Always(p) => semantics::always(&eval(p)?).map(Degree::Scalar),
        Formula::Eventually(p) => semantics::eventually(&eval(p)?).map(Degree::Scalar),
        Formula::And(ps) => {
            let degrees = ps.iter().map(eval).collect::<EvalResult<Vec<_>>>()?;
            semantics::and(&degrees).map(Degree::Scalar)
        }
        Formula::Or(ps) => {
            let degrees = ps.iter().map(eval).collect::<EvalResult<Vec<_>>>()?;
            semantics::or(&degrees).map(Degree::Scalar)
        }
        Formula::Until(..) => Err(EvalError::unsupported(spec)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Obs {
        Flow,
        Crash,
    }

    fn indicator(name: &str, obs: &Obs) -> EvalResult<f64> {
        match (name, obs) {
            ("crash", Obs::Crash) | ("flow", Obs::Flow) => Ok(1.0),
            ("crash", _) | ("flow", _) => Ok(0.0),
            _ => Err(EvalError::unknown_atomic(name)),
        }
    }

    /// Observations are raw degrees; every name resolves to the observation.
    fn identity(_: &str, obs: &f64) -> EvalResult<f64> {
        Ok(*obs)
    }

    fn safety() -> Formula {
        Formula::atomic("crash").not().always()
    }

    #[test]
    fn test_safety_violated_by_single_crash() {
        let trajectory = [Obs::Flow, Obs::Flow, Obs::Crash, Obs::Flow];
        let degree = evaluate(&safety(), &trajectory, &indicator).unwrap();
        assert_eq!(degree, Degree::Scalar(0.0));
    }

    #[test]
    fn test_safety_holds_without_crash() {
        let trajectory = [Obs::Flow; 4];
        let degree = evaluate(&safety(), &trajectory, &indicator).unwrap();
        assert_eq!(degree, Degree::Scalar(1.0));
    }

    #[test]
    fn test_atomic_and_not_keep_sequence_arity() {
        let trajectory = [Obs::Flow, Obs::Crash];
        let atom = evaluate(&Formula::atomic("crash"), &trajectory, &indicator).unwrap();
        let neg = evaluate(&!Formula::atomic("crash"), &trajectory, &indicator).unwrap();

        assert_eq!(atom, Degree::Sequence(vec![0.0, 1.0]));
        assert_eq!(neg, Degree::Sequence(vec![1.0, 0.0]));
    }

    #[test]
    fn test_true_is_scalar_one() {
        let degree = evaluate(&Formula::tt(), &[Obs::Crash], &indicator).unwrap();
        assert_eq!(degree, Degree::Scalar(1.0));
        let degree = evaluate(&Formula::ff(), &[Obs::Crash], &indicator).unwrap();
        assert_eq!(degree, Degree::Scalar(0.0));
    }

    #[test]
    fn test_unknown_atomic_fails() {
        let err = evaluate(&Formula::atomic("gridlock"), &[Obs::Flow], &indicator).unwrap_err();
        assert_eq!(err, EvalError::UnknownAtomic("gridlock".to_string()));
    }

    #[test]
    fn test_unknown_atomic_nested_fails() {
        let spec = (Formula::atomic("flow") & Formula::atomic("gridlock")).always();
        let err = evaluate(&spec, &[Obs::Flow], &indicator).unwrap_err();
        assert!(matches!(err, EvalError::UnknownAtomic(_)));
    }

    #[test]
    fn test_until_unsupported() {
        let spec = Formula::atomic("flow").until(Formula::atomic("crash"));
        let err = evaluate(&spec, &[Obs::Flow], &indicator).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnsupportedSpecification("(flow U crash)".to_string())
        );
    }

    #[test]
    fn test_empty_trajectory_fails() {
        let err = evaluate::<Obs, _>(&safety(), &[], &indicator).unwrap_err();
        assert_eq!(err, EvalError::EmptyTrajectory);
    }

    #[test]
    fn test_zero_operand_conjunction_fails() {
        let err = evaluate(&Formula::all([]), &[Obs::Flow], &indicator).unwrap_err();
        assert_eq!(err, EvalError::EmptyOperands("and"));
        let err = evaluate(&Formula::any([]), &[Obs::Flow], &indicator).unwrap_err();
        assert_eq!(err, EvalError::EmptyOperands("or"));
    }

    #[test]
    fn test_dyn_atomic_eval() {
        let boxed: Box<dyn AtomicEval<Obs>> = Box::new(indicator);
        let degree = evaluate(&safety(), &[Obs::Flow], boxed.as_ref()).unwrap();
        assert_eq!(degree, Degree::Scalar(1.0));
    }

    fn formula_strategy() -> impl Strategy<Value = Formula> {
        let leaf = prop_oneof![Just(Formula::atomic("p")), Just(Formula::tt())];
        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(Formula::not),
                inner.clone().prop_map(Formula::always),
                inner.clone().prop_map(Formula::eventually),
                prop::collection::vec(inner.clone(), 1..3).prop_map(Formula::all),
                prop::collection::vec(inner, 1..3).prop_map(Formula::any),
            ]
        })
    }

    fn trajectory_strategy() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..=1.0, 1..12)
    }

    proptest! {
        #[test]
        fn prop_double_negation(spec in formula_strategy(), t in trajectory_strategy()) {
            let direct = evaluate(&spec, &t, &identity).unwrap();
            let twice = evaluate(&spec.clone().not().not(), &t, &identity).unwrap();

            prop_assert_eq!(direct.is_scalar(), twice.is_scalar());
            for (a, b) in direct.values().iter().zip(twice.values()) {
                prop_assert!((a - b).abs() < 1e-12);
            }
        }

        #[test]
        fn prop_constant_degree_collapses(d in 0.0f64..=1.0, len in 1usize..20) {
            let t = vec![d; len];
            let p = Formula::atomic("p");

            prop_assert_eq!(evaluate(&p.clone().always(), &t, &identity).unwrap(), Degree::Scalar(d));
            prop_assert_eq!(evaluate(&p.eventually(), &t, &identity).unwrap(), Degree::Scalar(d));
        }

        #[test]
        fn prop_and_or_are_min_of_mins(
            a in formula_strategy(),
            b in formula_strategy(),
            t in trajectory_strategy(),
        ) {
            let da = evaluate(&a, &t, &identity).unwrap();
            let db = evaluate(&b, &t, &identity).unwrap();

            let conj = evaluate(&a.clone().and(b.clone()), &t, &identity).unwrap();
            let disj = evaluate(&a.or(b), &t, &identity).unwrap();

            let expected_and = da.reduce_min().unwrap().min(db.reduce_min().unwrap());
            let expected_or = da.reduce_max().unwrap().max(db.reduce_max().unwrap());
            prop_assert_eq!(conj, Degree::Scalar(expected_and));
            prop_assert_eq!(disj, Degree::Scalar(expected_or));
        }
    }

    #[test]
    fn test_graded_conjunction() {
        let t = [0.9, 0.3, 0.7];
        let spec = Formula::atomic("p").always() & Formula::atomic("p").eventually();
        let degree = evaluate(&spec, &t, &identity).unwrap();
        assert_relative_eq!(degree.as_scalar().unwrap(), 0.3);
    }
}
