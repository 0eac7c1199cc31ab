use anyhow::Result;
use chrono::{Months, NaiveDate};
use serde_json::json;

use crate::charts;
use crate::client::MlSource;
use crate::format;
use crate::logging::{log, obj, v_num, Domain, Level, ProfileScope};
use crate::model::{PredictionFeatures, PredictionResult, TrainingResult};
use crate::render::{NoticeLevel, Panel, Renderer, StatCard, Widget};

use super::{hazard_badge, loading, PageOutcome};

const TRAINING: &str = "trainingResult";
const PREDICTION: &str = "predictionResult";

/// Last month up to `today`, the form's initial range.
pub fn default_training_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    (start, today)
}

/// ML page. Keeps the training runs of this session for the history chart.
pub struct MlPage<'a> {
    ml: &'a (dyn MlSource + Send + Sync),
    renderer: &'a dyn Renderer,
    history: Vec<TrainingResult>,
}

impl<'a> MlPage<'a> {
    pub fn new(ml: &'a (dyn MlSource + Send + Sync), renderer: &'a dyn Renderer) -> Self {
        Self {
            ml,
            renderer,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[TrainingResult] {
        &self.history
    }

    /// Both dates are required and must be ordered; checked before any request.
    pub async fn train(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PageOutcome {
        let (Some(start), Some(end)) = (start, end) else {
            self.renderer
                .notify(NoticeLevel::Error, "Please fill in the start and end dates");
            return PageOutcome::failed(TRAINING);
        };
        if start > end {
            self.renderer
                .notify(NoticeLevel::Error, "Start date must not be after end date");
            return PageOutcome::failed(TRAINING);
        }
        loading(
            self.renderer,
            TRAINING,
            &format!("Training model for {} to {}...", start, end),
        );
        let _scope = ProfileScope::new("ml.train");
        let result = self.ml.train(start, end).await;
        self.finish_training(result)
    }

    pub async fn train_all(&mut self) -> PageOutcome {
        loading(self.renderer, TRAINING, "Training model with all available data...");
        let _scope = ProfileScope::new("ml.train_all");
        let result = self.ml.train_all().await;
        self.finish_training(result)
    }

    fn finish_training(&mut self, result: Result<TrainingResult>) -> PageOutcome {
        match result {
            Ok(res) => {
                log(
                    Level::Info,
                    Domain::Ml,
                    "train.ok",
                    obj(&[
                        ("accuracy", v_num(res.accuracy)),
                        ("f1_score", v_num(res.f1_score)),
                        ("train_size", json!(res.train_size)),
                        ("test_size", json!(res.test_size)),
                    ]),
                );
                self.renderer.render(Widget::Panel(training_panel(&res)));
                self.renderer.render(metric_cards(&res));
                self.history.push(res);
                self.renderer
                    .render(Widget::Chart(charts::training_history(&self.history)));
                self.renderer
                    .notify(NoticeLevel::Success, "Model trained successfully");
                PageOutcome::ok()
            }
            Err(err) => {
                let err = format!("{:#}", err);
                log(Level::Error, Domain::Ml, "train.error", obj(&[("msg", json!(err))]));
                self.renderer
                    .section_error(TRAINING, &format!("Training failed: {}", err));
                self.renderer
                    .notify(NoticeLevel::Error, "Failed to train model");
                PageOutcome::failed(TRAINING)
            }
        }
    }

    pub async fn reload(&self) -> PageOutcome {
        self.renderer.notify(NoticeLevel::Info, "Reloading model...");
        match self.ml.reload().await {
            Ok(()) => {
                self.renderer
                    .notify(NoticeLevel::Success, "Model reloaded successfully");
                PageOutcome::ok()
            }
            Err(err) => {
                log(
                    Level::Error,
                    Domain::Ml,
                    "reload.error",
                    obj(&[("msg", json!(format!("{:#}", err)))]),
                );
                self.renderer
                    .notify(NoticeLevel::Error, "Failed to reload model");
                PageOutcome::failed("reload")
            }
        }
    }

    pub async fn predict(&self, features: PredictionFeatures) -> PageOutcome {
        if let Err(err) = features.validate() {
            self.renderer
                .notify(NoticeLevel::Error, &format!("Please fill in every field: {}", err));
            return PageOutcome::failed(PREDICTION);
        }
        loading(self.renderer, PREDICTION, "Running prediction...");
        match self.ml.predict(features).await {
            Ok(prediction) => {
                log(
                    Level::Info,
                    Domain::Ml,
                    "predict.ok",
                    obj(&[
                        ("hazardous", json!(prediction.hazardous)),
                        ("probability", v_num(prediction.probability)),
                        ("probability_reported", json!(prediction.probability_reported)),
                    ]),
                );
                self.renderer
                    .render(Widget::Panel(prediction_panel(&prediction)));
                self.renderer.notify(NoticeLevel::Success, "Prediction done");
                PageOutcome::ok()
            }
            Err(err) => {
                let err = format!("{:#}", err);
                log(Level::Error, Domain::Ml, "predict.error", obj(&[("msg", json!(err))]));
                self.renderer.section_error(
                    PREDICTION,
                    &format!(
                        "Prediction failed: {}. Make sure the model has been trained and loaded.",
                        err
                    ),
                );
                self.renderer
                    .notify(NoticeLevel::Error, "Failed to run prediction");
                PageOutcome::failed(PREDICTION)
            }
        }
    }
}

fn pct(fraction: f64) -> String {
    format!("{}%", format::number(Some(fraction * 100.0)))
}

pub fn training_panel(res: &TrainingResult) -> Panel {
    Panel {
        id: TRAINING.to_string(),
        title: "Training complete".to_string(),
        badge: None,
        items: vec![
            ("Accuracy".to_string(), pct(res.accuracy)),
            ("Precision".to_string(), pct(res.precision)),
            ("Recall".to_string(), pct(res.recall)),
            ("F1-Score".to_string(), pct(res.f1_score)),
            ("Train size".to_string(), res.train_size.to_string()),
            ("Test size".to_string(), res.test_size.to_string()),
        ],
        footer: res
            .model_path
            .as_ref()
            .map(|p| format!("Model saved at: {}", p)),
    }
}

pub fn metric_cards(res: &TrainingResult) -> Widget {
    Widget::StatCards {
        section: "mlStats".to_string(),
        cards: vec![
            StatCard::new("mlAccuracy", "Accuracy", pct(res.accuracy)),
            StatCard::new("mlPrecision", "Precision", pct(res.precision)),
            StatCard::new("mlRecall", "Recall", pct(res.recall)),
            StatCard::new("mlF1Score", "F1-Score", pct(res.f1_score)),
        ],
    }
}

pub fn prediction_panel(p: &PredictionResult) -> Panel {
    let (title, footer) = if p.hazardous {
        (
            "Potentially hazardous NEO",
            "This object shows traits of potential hazard. Continuous monitoring is recommended.",
        )
    } else {
        (
            "Safe NEO",
            "This object shows no significant hazard traits.",
        )
    };
    Panel {
        id: PREDICTION.to_string(),
        title: title.to_string(),
        badge: Some(hazard_badge(p.hazardous)),
        items: vec![
            ("Prediction".to_string(), hazard_badge(p.hazardous)),
            ("Probability".to_string(), pct(p.probability)),
        ],
        footer: Some(footer.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_range_is_one_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (start, end) = default_training_range(today);
        assert_eq!(end, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_prediction_panel_default_confidence() {
        let p = PredictionResult::from_value(&json!({"preditoPerigoso": true}));
        let panel = prediction_panel(&p);
        assert_eq!(panel.items[1].1, "85%");
        assert_eq!(panel.badge.as_deref(), Some("DANGEROUS"));
    }

    #[test]
    fn test_training_panel() {
        let res = TrainingResult {
            accuracy: 0.947,
            precision: 0.945,
            recall: 0.94,
            f1_score: 0.9425,
            train_size: 800,
            test_size: 200,
            model_path: Some("models/rf.model".to_string()),
        };
        let panel = training_panel(&res);
        assert_eq!(panel.items[0].1, "94.7%");
        assert_eq!(panel.items[3].1, "94.25%");
        assert_eq!(panel.footer.as_deref(), Some("Model saved at: models/rf.model"));
    }
}
