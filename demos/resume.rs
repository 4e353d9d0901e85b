use std::fs;

use plan::f::{as_tensor, onehot};
use plan::{Dataset, Learner, Model};

use rand::{prelude::*, thread_rng};

fn gen_training_data(n: usize) -> Dataset {
    let mut rng = thread_rng();
    let classes: Vec<(Vec<f64>, usize)> = vec![
        (vec![0., 1.], 0),
        (vec![1., 1.], 1),
        (vec![1., 0.], 0),
        (vec![0., 0.], 1),
    ];

    let (mut x, mut y) = (vec![], vec![]);
    for _ in 0..n {
        if let Some((features, class)) = classes.choose(&mut rng) {
            x.push(features.iter().map(|v| v + rng.gen_range(-0.1..0.1)).collect());
            y.push(onehot(*class, 2));
        }
    }

    (x, y)
}

/// Trains briefly, checkpoints the model, then continues the search from the
/// checkpointed genome.
fn main() -> plan::Result<()> {
    env_logger::init();

    let (x, y) = gen_training_data(400);
    let (x, y) = (as_tensor(&x), as_tensor(&y));

    let first = Learner::default()
        .set_generations(3)
        .set_batch_size(0.5)
        .learn(x.view(), y.view())?;

    fs::write("checkpoint.bin", first.dump()?)?;
    let checkpoint = Model::load(&fs::read("checkpoint.bin")?)?;

    let resumed = Learner::default()
        .start_from(checkpoint.weights.clone(), checkpoint.activations.clone())
        .set_generations(5)
        .set_early_stop(true)
        .learn(x.view(), y.view())?;

    println!(
        "checkpoint {} at {:.4}, resumed {} at {:.4}",
        checkpoint.activations,
        checkpoint.final_accuracy,
        resumed.activations,
        resumed.final_accuracy
    );
    println!("{}", resumed.to_json()?);

    Ok(())
}
