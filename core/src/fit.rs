use serde::{Deserialize, Serialize};

use crate::bead::Bead;

/// Lengths are compared at micrometre resolution so float accumulation
/// never flips a boundary verdict.
const LENGTH_STEPS_PER_MM: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitVerdict {
    Underflow,
    Ok,
    Overflow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitStatus {
    pub verdict: FitVerdict,
    pub current_length_mm: f32,
    pub target_length_mm: f32,
    pub tolerance_mm: f32,
}

impl FitStatus {
    pub fn is_overflow(&self) -> bool {
        self.verdict == FitVerdict::Overflow
    }

    pub fn message(&self) -> String {
        match self.verdict {
            FitVerdict::Overflow => format!(
                "Bracelet is {:.1} mm, over the {:.1} mm wrist target by more than {:.1} mm",
                self.current_length_mm, self.target_length_mm, self.tolerance_mm
            ),
            FitVerdict::Underflow => format!(
                "Bracelet is {:.1} mm, add about {:.1} mm more to fit the {:.1} mm wrist",
                self.current_length_mm,
                (self.target_length_mm - self.current_length_mm).max(0.0),
                self.target_length_mm
            ),
            FitVerdict::Ok => format!(
                "Bracelet is {:.1} mm and fits the {:.1} mm wrist",
                self.current_length_mm, self.target_length_mm
            ),
        }
    }
}

/// Physical strung length: gaps only sit between neighbouring beads.
pub fn strung_length_mm<I>(diameters_mm: I, gap_mm: f32) -> f32
where
    I: IntoIterator<Item = f32>,
{
    let mut count = 0usize;
    let mut total = 0.0f32;
    for diameter in diameters_mm {
        total += diameter;
        count += 1;
    }
    total + count.saturating_sub(1) as f32 * gap_mm.max(0.0)
}

pub fn check_fit(beads: &[Bead], gap_mm: f32, wrist_size_cm: f32, tolerance_mm: f32) -> FitStatus {
    check_fit_diameters(
        beads.iter().map(|bead| bead.diameter_mm),
        gap_mm,
        wrist_size_cm,
        tolerance_mm,
    )
}

pub fn check_fit_diameters<I>(
    diameters_mm: I,
    gap_mm: f32,
    wrist_size_cm: f32,
    tolerance_mm: f32,
) -> FitStatus
where
    I: IntoIterator<Item = f32>,
{
    let current = round_length(strung_length_mm(diameters_mm, gap_mm));
    let target = round_length(wrist_size_cm * 10.0);
    let tolerance = round_length(tolerance_mm.max(0.0));
    let verdict = if current > round_length(target + tolerance) {
        FitVerdict::Overflow
    } else if current <= round_length(target - tolerance) {
        FitVerdict::Underflow
    } else {
        FitVerdict::Ok
    };
    FitStatus {
        verdict,
        current_length_mm: current,
        target_length_mm: target,
        tolerance_mm: tolerance,
    }
}

fn round_length(value: f32) -> f32 {
    (value * LENGTH_STEPS_PER_MM).round() / LENGTH_STEPS_PER_MM
}
