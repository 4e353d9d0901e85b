use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ndarray::{array, Array2, ArrayView1, ArrayView2};
use rand::RngCore;

use plan::learner::{Champion, History, HistoryPlot, Observer};
use plan::planeat::Evolver;
use plan::{
    evaluate, fit, ActivationChain, Activations, FitnessScorer, GeneticOperator, Learner,
    PlanError, Population, Result,
};

fn toy() -> (Array2<f64>, Array2<f64>) {
    (
        array![[1., 0.1], [0.9, 0.2], [0.1, 1.], [0.2, 0.8]],
        array![[1., 0.], [1., 0.], [0., 1.], [0., 1.]],
    )
}

/// Two noisy blobs in three dimensions.
fn blobs() -> (Array2<f64>, Array2<f64>) {
    let x = Array2::from_shape_fn((40, 3), |(i, j)| {
        let centre = if i % 2 == 0 { 1. } else { -1. };
        centre * (j as f64 + 1.) * 0.3 + ((i * 7 + j * 3) % 5) as f64 * 0.05
    });
    let y = Array2::from_shape_fn((40, 2), |(i, j)| if i % 2 == j { 1. } else { 0. });
    (x, y)
}

fn keep(
    population: Population,
    _: usize,
    _: ArrayView1<f64>,
    _: &mut dyn RngCore,
) -> Result<Population> {
    Ok(population)
}

fn never(_: Population, _: usize, _: ArrayView1<f64>, _: &mut dyn RngCore) -> Result<Population> {
    Err(PlanError::Degenerate("operator should not run".to_string()))
}

fn accuracy_only(_: ArrayView2<f64>, _: ArrayView2<f64>, _: f64, accuracy: f64) -> f64 {
    accuracy
}

fn constant(_: ArrayView2<f64>, _: ArrayView2<f64>, _: f64, _: f64) -> f64 {
    1.
}

struct Counting(Rc<Cell<usize>>);

impl FitnessScorer for Counting {
    fn score(&self, _: ArrayView2<f64>, _: ArrayView2<f64>, _: f64, accuracy: f64) -> f64 {
        self.0.set(self.0.get() + 1);
        accuracy
    }
}

struct Recorder(Rc<RefCell<Vec<Population>>>);

impl GeneticOperator for Recorder {
    fn next_generation(
        &mut self,
        population: Population,
        _: usize,
        _: ArrayView1<f64>,
        _: &mut dyn RngCore,
    ) -> Result<Population> {
        self.0.borrow_mut().push(population.clone());
        Ok(population)
    }
}

#[derive(Default)]
struct NewBests(usize);

impl Observer for NewBests {
    fn on_new_best(&mut self, _: usize, _: &Champion) -> Result<()> {
        self.0 += 1;
        Ok(())
    }
}

struct Broken;

impl Observer for Broken {
    fn on_generation_end(&mut self, _: usize, _: &History) -> Result<()> {
        Err(PlanError::VisualizationFailure("degenerate feature range".to_string()))
    }

    fn on_finish(&mut self, _: &plan::Model) -> Result<()> {
        Err(PlanError::VisualizationFailure("no display".to_string()))
    }
}

#[test]
fn zero_target_accuracy_stops_after_one_genome() {
    let (x, y) = toy();
    let calls = Rc::new(Cell::new(0));

    let model = Learner::new(never)
        .set_scorer(Counting(calls.clone()))
        .set_target_acc(0.)
        .learn(x.view(), y.view())
        .unwrap();

    // One genome scored, then the closing full-dataset pass.
    assert_eq!(calls.get(), 2);
    assert!(model.history.is_empty());
    assert_eq!(model.activations, ActivationChain::single(Activations::Linear));
}

#[test]
fn target_loss_stops_loss_weighted_runs() {
    let (x, y) = toy();
    let model = Learner::new(never)
        .set_target_loss(10.)
        .learn(x.view(), y.view())
        .unwrap();
    assert!(model.history.is_empty());
}

#[test]
fn small_population_with_fit_start_is_rejected_up_front() {
    let (x, y) = toy();
    let calls = Rc::new(Cell::new(0));

    let err = Learner::new(never)
        .set_scorer(Counting(calls.clone()))
        .set_pop_size(Activations::all().len() - 1)
        .learn(x.view(), y.view());

    assert!(matches!(err, Err(PlanError::InvalidArgument(_))));
    assert_eq!(calls.get(), 0);
}

#[test]
fn invalid_configuration_is_rejected() {
    let (x, y) = toy();

    let err = Learner::new(never).set_target_acc(1.5).learn(x.view(), y.view());
    assert!(matches!(err, Err(PlanError::InvalidArgument(_))));

    let err = Learner::new(never).set_batch_size(0.).learn(x.view(), y.view());
    assert!(matches!(err, Err(PlanError::InvalidArgument(_))));

    assert!(matches!(
        Learner::default().set_loss("mean_squared_error"),
        Err(PlanError::InvalidArgument(_))
    ));
    assert!(matches!(
        Learner::default().set_memory("tpu"),
        Err(PlanError::InvalidArgument(_))
    ));
}

#[test]
fn bad_evolver_config_fails_before_any_genome_is_scored() {
    let (x, y) = toy();

    let mut bad_prob = Evolver::new();
    bad_prob.set_activation_add_prob(1.5);
    let mut bad_power = Evolver::new();
    bad_power.set_weight_mutation(1., 0.1, 1e308);

    for evolver in [bad_prob, bad_power] {
        let calls = Rc::new(Cell::new(0));
        let err = Learner::new(evolver)
            .set_scorer(Counting(calls.clone()))
            .learn(x.view(), y.view());

        assert!(matches!(err, Err(PlanError::InvalidArgument(_))));
        assert_eq!(calls.get(), 0);
    }
}

#[test]
fn diversity_history_is_named_fitness() {
    let (x, y) = toy();
    let model = Learner::new(keep)
        .set_fitness_fn(accuracy_only)
        .set_generations(1)
        .learn(x.view(), y.view())
        .unwrap();
    assert_eq!(model.history.metric_name(), "fitness");

    let model = Learner::new(keep)
        .set_generations(1)
        .learn(x.view(), y.view())
        .unwrap();
    assert_eq!(model.history.metric_name(), "loss");
}

#[test]
fn misaligned_dataset_is_a_shape_mismatch() {
    let (x, _) = toy();
    let y = array![[1., 0.], [0., 1.]];
    let err = Learner::new(never).learn(x.view(), y.view());
    assert!(matches!(err, Err(PlanError::ShapeMismatch(_))));
}

#[test]
fn equal_fitness_hands_the_record_to_the_later_genome() {
    let (x, y) = toy();
    let seen = Rc::new(RefCell::new(vec![]));
    let bests = Rc::new(RefCell::new(NewBests::default()));

    let model = Learner::new(Recorder(seen.clone()))
        .set_fitness_fn(constant)
        .set_fit_start(false)
        .set_pop_size(3)
        .set_generations(2)
        .set_seed(3)
        .add_observer(bests.clone())
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(bests.borrow().0, 6);

    let last = seen.borrow().last().cloned().unwrap();
    assert_eq!(model.weights, last.weights[2]);
    assert_eq!(model.activations, last.activations[2].collapsed());
}

#[test]
fn best_accuracy_history_never_decreases() {
    let (x, y) = blobs();
    let model = Learner::default()
        .set_fitness_fn(accuracy_only)
        .set_generations(6)
        .set_seed(11)
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(model.history.len(), 6);
    for pair in model.history.accuracy.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
}

#[test]
fn early_stop_ends_on_a_repeated_generation() {
    let (x, y) = toy();
    let model = Learner::new(keep)
        .set_early_stop(true)
        .set_generations(10)
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(model.history.len(), 2);
    assert_eq!(model.history.accuracy[0], model.history.accuracy[1]);
}

#[test]
fn repeated_activation_is_reported_once() {
    let (x, y) = toy();
    let chain = ActivationChain::new(vec![Activations::Relu; 3]).unwrap();
    let w = fit(x.view(), y.view(), &chain, None, false).unwrap();

    let model = Learner::new(never)
        .start_from(w, chain)
        .set_target_acc(0.)
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(model.activations, ActivationChain::single(Activations::Relu));

    let mixed = ActivationChain::new(vec![Activations::Relu, Activations::Tanh]).unwrap();
    assert_eq!(mixed.collapsed(), mixed);
}

#[test]
fn seeded_runs_are_reproducible() {
    let (x, y) = blobs();
    let run = || {
        Learner::default()
            .set_generations(3)
            .set_batch_size(0.5)
            .set_seed(21)
            .learn(x.view(), y.view())
            .unwrap()
    };

    let (a, b) = (run(), run());
    assert_eq!(a.weights, b.weights);
    assert_eq!(a.activations, b.activations);
    assert_eq!(a.history, b.history);
}

#[test]
fn partial_batches_record_full_dataset_history() {
    let (x, y) = blobs();
    let model = Learner::default()
        .set_generations(3)
        .set_batch_size(0.25)
        .set_seed(5)
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(model.history.len(), 3);
    assert!(model
        .history
        .accuracy
        .iter()
        .all(|a| (0. ..=1.).contains(a)));
}

#[test]
fn failing_observers_do_not_abort_training() {
    let (x, y) = toy();
    let plot = Rc::new(RefCell::new(HistoryPlot::new()));

    let model = Learner::new(keep)
        .set_generations(2)
        .add_observer(Broken)
        .add_observer(plot.clone())
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(model.history.len(), 2);
    assert!(plot.borrow().html().is_some());
}

#[test]
fn toy_problem_end_to_end() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (x, y) = toy();

    let linear = ActivationChain::single(Activations::Linear);
    let w = fit(x.view(), y.view(), &linear, None, false).unwrap();
    assert_eq!(w.dim(), (2, 2));
    assert!(evaluate(x.view(), y.view(), w.view(), &linear).unwrap().accuracy >= 0.75);

    let model = Learner::default()
        .set_target_acc(1.)
        .set_seed(7)
        .learn(x.view(), y.view())
        .unwrap();

    assert_eq!(model.accuracy, 1.);
    let restored = plan::Model::load(&model.dump().unwrap()).unwrap();
    let probs = restored.predict(x.view()).unwrap();
    assert_eq!(probs.dim(), (4, 2));
    assert_eq!(
        plan::f::decode_one_hot(probs.view()),
        plan::f::decode_one_hot(model.predict(x.view()).unwrap().view())
    );
}
