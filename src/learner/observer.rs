use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use log::info;
use plotly::common::Title;
use plotly::{Bar, Layout, Plot};

use super::{Champion, History};
use crate::error::{PlanError, Result};
use crate::model::Model;

/// Side-channel hooks into a learner run. Hooks see values that were already
/// computed and cannot change them; a failing hook is logged and training
/// carries on.
pub trait Observer {
    fn on_generation_start(&mut self, _generation: usize, _generations: usize) -> Result<()> {
        Ok(())
    }

    fn on_new_best(&mut self, _generation: usize, _champion: &Champion) -> Result<()> {
        Ok(())
    }

    fn on_generation_end(&mut self, _generation: usize, _history: &History) -> Result<()> {
        Ok(())
    }

    fn on_finish(&mut self, _model: &Model) -> Result<()> {
        Ok(())
    }
}

fn busy() -> PlanError {
    PlanError::VisualizationFailure("observer is already borrowed".to_string())
}

/// Lets a caller keep a handle on an observer after handing it to a learner.
impl<O: Observer> Observer for Rc<RefCell<O>> {
    fn on_generation_start(&mut self, generation: usize, generations: usize) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| busy())?
            .on_generation_start(generation, generations)
    }

    fn on_new_best(&mut self, generation: usize, champion: &Champion) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| busy())?
            .on_new_best(generation, champion)
    }

    fn on_generation_end(&mut self, generation: usize, history: &History) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| busy())?
            .on_generation_end(generation, history)
    }

    fn on_finish(&mut self, model: &Model) -> Result<()> {
        self.try_borrow_mut().map_err(|_| busy())?.on_finish(model)
    }
}

/// Logs the generation counter and the latest history entry.
#[derive(Debug, Default)]
pub struct ProgressLog;

impl Observer for ProgressLog {
    fn on_generation_end(&mut self, generation: usize, history: &History) -> Result<()> {
        if let Some((acc, metric)) = history.last() {
            info!(
                "[gen {}] accuracy = {:.4}, {} = {:.4}",
                generation + 1,
                acc,
                history.metric_name(),
                metric
            );
        }
        Ok(())
    }

    fn on_finish(&mut self, model: &Model) -> Result<()> {
        info!(
            "activations {}, train accuracy = {:.4}, train {} = {:.4}",
            model.activations,
            model.final_accuracy,
            model.history.metric_name(),
            model.final_loss
        );
        Ok(())
    }
}

/// Logs the activation chain every time a new best genome is recorded.
#[derive(Debug, Default)]
pub struct ActivationLog;

impl Observer for ActivationLog {
    fn on_new_best(&mut self, generation: usize, champion: &Champion) -> Result<()> {
        info!(
            "[gen {}] current activations = {}",
            generation + 1,
            champion.activations
        );
        Ok(())
    }
}

/// Renders accuracy and loss (or fitness) history as bar charts once
/// training finishes.
#[derive(Debug, Default)]
pub struct HistoryPlot {
    path: Option<PathBuf>,
    html: Option<String>,
}

impl HistoryPlot {
    pub fn new() -> HistoryPlot {
        HistoryPlot::default()
    }

    /// Also writes the rendered page to `path`.
    pub fn save_to(path: impl Into<PathBuf>) -> HistoryPlot {
        HistoryPlot {
            path: Some(path.into()),
            html: None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn render(history: &History) -> Result<String> {
        if history.is_empty() {
            return Err(PlanError::VisualizationFailure(
                "no completed generation to plot".to_string(),
            ));
        }

        let gens = (1..=history.len()).collect::<Vec<usize>>();
        let mut plot = Plot::new();
        plot.add_trace(Bar::new(gens.clone(), history.accuracy.clone()).name("accuracy"));
        plot.add_trace(Bar::new(gens, history.metric.clone()).name(history.metric_name()));
        plot.set_layout(Layout::new().title(Title::new("Training history")));

        Ok(plot.to_html())
    }
}

impl Observer for HistoryPlot {
    fn on_finish(&mut self, model: &Model) -> Result<()> {
        let html = HistoryPlot::render(&model.history)?;

        if let Some(path) = &self.path {
            fs::write(path, &html).map_err(|e| {
                PlanError::VisualizationFailure(format!("{}: {}", path.display(), e))
            })?;
        }

        self.html = Some(html);
        Ok(())
    }
}
