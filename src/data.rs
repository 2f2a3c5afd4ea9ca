//! Bundled datasets.

use crate::{Observation, ObservationSet};

#[rustfmt::skip]
const SPECTOR: [[f64; 4]; 32] = [
    // gpa, tuce, psi, grade
    [2.66, 20.0, 0.0, 0.0], [2.89, 22.0, 0.0, 0.0], [3.28, 24.0, 0.0, 0.0], [2.92, 12.0, 0.0, 0.0],
    [4.00, 21.0, 0.0, 1.0], [2.86, 17.0, 0.0, 0.0], [2.76, 17.0, 0.0, 0.0], [2.87, 21.0, 0.0, 0.0],
    [3.03, 25.0, 0.0, 0.0], [3.92, 29.0, 0.0, 1.0], [2.63, 20.0, 0.0, 0.0], [3.32, 23.0, 0.0, 0.0],
    [3.57, 23.0, 0.0, 0.0], [3.26, 25.0, 0.0, 1.0], [3.53, 26.0, 0.0, 0.0], [2.74, 19.0, 0.0, 0.0],
    [2.75, 25.0, 0.0, 0.0], [2.83, 19.0, 0.0, 0.0], [3.12, 23.0, 1.0, 0.0], [3.16, 25.0, 1.0, 1.0],
    [2.06, 22.0, 1.0, 0.0], [3.62, 28.0, 1.0, 1.0], [2.89, 14.0, 1.0, 0.0], [3.51, 26.0, 1.0, 0.0],
    [3.54, 24.0, 1.0, 1.0], [2.83, 27.0, 1.0, 1.0], [3.39, 17.0, 1.0, 1.0], [2.67, 24.0, 1.0, 0.0],
    [3.65, 21.0, 1.0, 1.0], [4.00, 23.0, 1.0, 1.0], [3.10, 21.0, 1.0, 0.0], [2.39, 19.0, 1.0, 1.0],
];

/// Spector and Mazzeo (1980): whether 32 students improved their grade (`GRADE`) after
/// exposure to a new teaching method (`PSI`), given their `GPA` and `TUCE` pretest score.
pub fn spector() -> ObservationSet {
    ObservationSet::with_observations(
        ["GPA", "TUCE", "PSI"],
        SPECTOR
            .iter()
            .map(|[gpa, tuce, psi, grade]| Observation::new(*grade, [*gpa, *tuce, *psi])),
    )
}
