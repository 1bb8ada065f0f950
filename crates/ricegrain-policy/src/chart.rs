//! Class probability bar chart
//!
//! Presentation only: the chart never feeds back into the label.

use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};
use ricegrain_core::{ClassProbabilities, RiceClass};
use serde::Serialize;

const CHART_TITLE: &str = "Class Probabilities";

/// One bar per class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub class: RiceClass,
    pub probability: f64,
}

/// Two-bar chart data with the y axis fixed to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityChart {
    pub title: String,
    pub bars: Vec<ChartBar>,
    pub y_range: [f64; 2],
}

impl ProbabilityChart {
    pub fn new(probabilities: &ClassProbabilities) -> Self {
        let bars = [RiceClass::Cammeo, RiceClass::Osmancik]
            .into_iter()
            .map(|class| ChartBar {
                class,
                probability: probabilities.get(class),
            })
            .collect();

        Self {
            title: CHART_TITLE.to_string(),
            bars,
            y_range: [0.0, 1.0],
        }
    }

    /// Build the plotly figure
    pub fn to_plot(&self) -> Plot {
        let labels: Vec<&'static str> = self.bars.iter().map(|b| b.class.as_str()).collect();
        let heights: Vec<f64> = self.bars.iter().map(|b| b.probability).collect();

        let trace = Bar::new(labels, heights).name("Probability");

        let layout = Layout::new()
            .title(self.title.as_str())
            .x_axis(Axis::new().title("Rice type"))
            .y_axis(
                Axis::new()
                    .title("Probability")
                    .range(self.y_range.to_vec()),
            );

        let mut plot = Plot::new();
        plot.add_trace(trace);
        plot.set_layout(layout);
        plot
    }

    /// Self-contained `<div>` fragment for embedding in a page
    pub fn to_inline_html(&self, div_id: &str) -> String {
        self.to_plot().to_inline_html(Some(div_id))
    }
}
