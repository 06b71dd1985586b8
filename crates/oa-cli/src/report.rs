use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use oa_optimizer::{PointSolution, SubsetSolution};

/// Everything one invocation of the runner produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub id: Uuid,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub subset: SubsetSolution,
    pub gradient: Vec<PointSolution>,
}

impl RunReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Run {} (seed {})\n", self.id, self.seed));

        out.push_str("\n--- Hill Climbing ---\n");
        out.push_str(&format!("Best subset found: {:?}\n", self.subset.subset));
        out.push_str(&format!("Total sum: {}\n", self.subset.sum));
        if !self.subset.feasible {
            out.push_str("Warning: search never reached a subset within the target\n");
        }

        for solution in &self.gradient {
            out.push_str(&format!("\n--- {} ---\n", solution.method));
            out.push_str(&format!(
                "x = {:?}, f = {:.6}\n",
                solution.point, solution.value
            ));
        }

        let elapsed = self.finished_at - self.started_at;
        out.push_str(&format!(
            "\nFinished in {} ms\n",
            elapsed.num_milliseconds()
        ));
        out
    }
}
