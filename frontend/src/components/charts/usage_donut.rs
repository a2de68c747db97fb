use plotters::prelude::*;
use plotters_canvas::CanvasBackend;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UsageDonutProps {
    pub used_minutes: u64,
    pub remaining_minutes: u64,
}

/// Used vs remaining minutes of the daily limit
pub struct UsageDonut {
    canvas_ref: NodeRef,
}

const USED: RGBColor = RGBColor(240, 128, 128);
const REMAINING: RGBColor = RGBColor(102, 126, 234);
const EMPTY: RGBColor = RGBColor(230, 230, 230);

/// Slice sizes and colours; a single grey ring when both are zero
pub fn slices(used: u64, remaining: u64) -> (Vec<f64>, Vec<RGBColor>, Vec<String>) {
    if used == 0 && remaining == 0 {
        return (vec![1.0], vec![EMPTY], vec![String::new()]);
    }
    (
        vec![used as f64, remaining as f64],
        vec![USED, REMAINING],
        vec!["Used".to_string(), "Remaining".to_string()],
    )
}

impl Component for UsageDonut {
    type Message = ();
    type Properties = UsageDonutProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            canvas_ref: NodeRef::default(),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        ctx.props() != old_props
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        let props = ctx.props();
        self.draw(props.used_minutes, props.remaining_minutes);
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <canvas ref={self.canvas_ref.clone()} class="usage-donut" width="280" height="280"></canvas>
        }
    }
}

impl UsageDonut {
    fn draw(&self, used: u64, remaining: u64) {
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

        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) / 2.0 - 20.0;
        let (sizes, colors, labels) = slices(used, remaining);

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.donut_hole(radius * 0.6);
        pie.label_style(("sans-serif", 12).into_font().color(&BLACK));
        if root.draw(&pie).is_err() {
            return;
        }

        let _ = root.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_for_usage() {
        let (sizes, colors, labels) = slices(30, 90);
        assert_eq!(sizes, vec![30.0, 90.0]);
        assert_eq!(colors.len(), 2);
        assert_eq!(labels, vec!["Used", "Remaining"]);
    }

    #[test]
    fn test_slices_all_zero_is_single_ring() {
        let (sizes, _, labels) = slices(0, 0);
        assert_eq!(sizes, vec![1.0]);
        assert_eq!(labels, vec![""]);
    }
}
