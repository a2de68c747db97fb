use plotters::prelude::*;
use plotters_canvas::CanvasBackend;
use shared::aggregate::DayBucket;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use crate::services::date_utils;

#[derive(Properties, PartialEq)]
pub struct UsageBarChartProps {
    pub days: Vec<DayBucket>,
}

/// Hours per day as vertical bars
pub struct UsageBarChart {
    canvas_ref: NodeRef,
}

/// Top of the y axis: a little above the busiest day, at least one hour
pub fn y_axis_max(days: &[DayBucket]) -> f64 {
    let busiest = days.iter().map(|d| d.hours).fold(0.0_f64, f64::max);
    (busiest * 1.15).max(1.0)
}

impl Component for UsageBarChart {
    type Message = ();
    type Properties = UsageBarChartProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            canvas_ref: NodeRef::default(),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        ctx.props().days != old_props.days
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        self.draw_chart(&ctx.props().days);
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div class="chart-content">
                <canvas ref={self.canvas_ref.clone()} class="usage-bar-chart" width="720" height="320"></canvas>
            </div>
        }
    }
}

impl UsageBarChart {
    fn draw_chart(&self, days: &[DayBucket]) {
        if days.is_empty() {
            return;
        }
        let Some(canvas) = self.canvas_ref.cast::<HtmlCanvasElement>() else {
            return;
        };
        let Some(backend) = CanvasBackend::with_canvas_object(canvas) else {
            return;
        };

        let root = backend.into_drawing_area();
        if root.fill(&WHITE).is_err() {
            return;
        }

        let labels: Vec<String> = days.iter().map(|d| date_utils::axis_label(d.date)).collect();
        let mut chart = match ChartBuilder::on(&root)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d((0..days.len()).into_segmented(), 0.0..y_axis_max(days))
        {
            Ok(chart) => chart,
            Err(_) => return,
        };

        if chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Hours")
            .x_labels(days.len())
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels.get(*i).cloned().unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .y_label_formatter(&|v| format!("{:.1}", v))
            .label_style(("sans-serif", 12, &RGBColor(102, 126, 234)))
            .axis_style(&RGBColor(230, 230, 230))
            .bold_line_style(&RGBColor(245, 245, 245))
            .draw()
            .is_err()
        {
            return;
        }

        let bars = Histogram::vertical(&chart)
            .style(RGBColor(102, 126, 234).filled())
            .margin(12)
            .data(days.iter().enumerate().map(|(i, d)| (i, d.hours)));
        if chart.draw_series(bars).is_err() {
            return;
        }

        let _ = root.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bucket(hours: f64) -> DayBucket {
        DayBucket {
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            hours,
        }
    }

    #[test]
    fn test_y_axis_max_has_a_floor() {
        assert_eq!(y_axis_max(&[]), 1.0);
        assert_eq!(y_axis_max(&[bucket(0.0), bucket(0.5)]), 1.0);
    }

    #[test]
    fn test_y_axis_max_leaves_headroom() {
        let max = y_axis_max(&[bucket(2.0), bucket(4.0)]);
        assert!(max > 4.0 && max < 5.0);
    }
}
