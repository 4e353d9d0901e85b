use plan::f::{as_tensor, onehot};
use plan::learner::{ActivationLog, HistoryPlot, ProgressLog};
use plan::planeat::{Evolver, Policy, Strategy};
use plan::{Dataset, Learner};

use rand::{prelude::*, thread_rng};

/// Three gaussian-ish clusters on a plane.
fn gen_training_data(n: usize) -> Dataset {
    let mut rng = thread_rng();
    let centres = [(0.2, 0.2), (0.8, 0.3), (0.5, 0.9)];

    let (mut x, mut y) = (vec![], vec![]);
    for _ in 0..n {
        let class = rng.gen_range(0..centres.len());
        let (cx, cy) = centres[class];
        x.push(vec![
            cx + rng.gen_range(-0.15..0.15),
            cy + rng.gen_range(-0.15..0.15),
        ]);
        y.push(onehot(class, centres.len()));
    }

    (x, y)
}

fn main() -> plan::Result<()> {
    env_logger::init();

    let (x, y) = gen_training_data(600);
    let (tx, ty) = gen_training_data(100);
    let (x, y) = (as_tensor(&x), as_tensor(&y));
    let (tx, ty) = (as_tensor(&tx), as_tensor(&ty));

    let mut evolver = Evolver::new();
    evolver
        .set_strategy(Strategy::Normal)
        .set_policy(Policy::Explorer)
        .verbose();

    let model = Learner::new(evolver)
        .set_generations(10)
        .set_batch_size(0.2)
        .set_early_stop(true)
        .set_target_acc(0.99)
        .add_observer(ProgressLog)
        .add_observer(ActivationLog)
        .add_observer(HistoryPlot::save_to("history.html"))
        .learn(x.view(), y.view())?;

    let test = model.evaluate(tx.view(), ty.view())?;
    println!(
        "activations {}, train accuracy {:.4}, test accuracy {:.4}",
        model.activations, model.final_accuracy, test.accuracy
    );

    Ok(())
}
