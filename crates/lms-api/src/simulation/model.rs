use lms_db::models::{Simulation, Step};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SimulationDetail {
    #[serde(flatten)]
    pub simulation: Simulation,
    /// Ordered by position
    pub steps: Vec<Step>,
}
