use crate::context::pane::PaneContext;
use crate::context::side::SideEdge;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gutters {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

pub struct GutterManager;

impl GutterManager {
    /// Side gutters are shared by all panes so their plot areas line up.
    pub fn calculate(panes: &[PaneContext], time_axis_height: f32) -> Gutters {
        let mut left: f32 = 0.0;
        let mut right: f32 = 0.0;

        for pane in panes {
            let mut p_left = 0.0;
            let mut p_right = 0.0;
            for side in pane.sides() {
                match side.edge {
                    SideEdge::Left => p_left += side.width,
                    SideEdge::Right => p_right += side.width,
                }
            }
            left = left.max(p_left);
            right = right.max(p_right);
        }

        Gutters {
            left,
            right,
            top: 0.0,
            bottom: time_axis_height.max(0.0),
        }
    }
}
