use serde::{Deserialize, Serialize};

use crate::bead::Bead;
use crate::catalog::CatalogLookup;
use crate::fit::FitStatus;
use crate::gesture::GestureOutcome;
use crate::session::{DesignError, DesignerSession};
use crate::stage::Point;
use crate::timer::LongPressScheduler;

/// Everything a page can ask of the designer, in one dispatchable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DesignerAction {
    Append { catalog_id: String },
    GestureStart { index: usize, x: f32, y: f32 },
    GestureMove { x: f32, y: f32 },
    GestureEnd,
    StageTap,
    RemoveSelected,
    Clear,
    SetGap { gap_mm: f32 },
    SetWristSize { wrist_size_cm: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Appended(Result<FitStatus, DesignError>),
    Gesture(GestureOutcome),
    Removed(Option<Bead>),
    Updated,
}

impl<C: CatalogLookup, S: LongPressScheduler> DesignerSession<C, S> {
    pub fn apply_action(&mut self, action: DesignerAction) -> ActionOutcome {
        match action {
            DesignerAction::Append { catalog_id } => {
                ActionOutcome::Appended(self.append(&catalog_id))
            }
            DesignerAction::GestureStart { index, x, y } => {
                ActionOutcome::Gesture(self.gesture_start(index, Point::new(x, y)))
            }
            DesignerAction::GestureMove { x, y } => {
                ActionOutcome::Gesture(self.gesture_move(Point::new(x, y)))
            }
            DesignerAction::GestureEnd => ActionOutcome::Gesture(self.gesture_end()),
            DesignerAction::StageTap => ActionOutcome::Gesture(self.stage_tap()),
            DesignerAction::RemoveSelected => ActionOutcome::Removed(self.remove_selected()),
            DesignerAction::Clear => {
                self.clear();
                ActionOutcome::Updated
            }
            DesignerAction::SetGap { gap_mm } => {
                self.set_gap_mm(gap_mm);
                ActionOutcome::Updated
            }
            DesignerAction::SetWristSize { wrist_size_cm } => {
                self.set_wrist_size_cm(wrist_size_cm);
                ActionOutcome::Updated
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_tagged_json() {
        let action: DesignerAction =
            serde_json::from_str(r#"{"action":"gesture_start","index":2,"x":10.0,"y":20.5}"#)
                .expect("parse");
        assert_eq!(
            action,
            DesignerAction::GestureStart {
                index: 2,
                x: 10.0,
                y: 20.5
            }
        );
        let action: DesignerAction =
            serde_json::from_str(r#"{"action":"gesture_end"}"#).expect("parse");
        assert_eq!(action, DesignerAction::GestureEnd);
    }
}
