//! Runner selection engine.
//!
//! Symbolic layer: [`Ontology`] + [`JobRequirementParser`] + [`ConstraintSolver`] narrow the fleet
//! down to runners that can legally run a job. Statistical layer: [`Selector`] applies UCB1 over that
//! feasible subset and learns from reported outcomes.
//!
//! Everything here is synchronous and I/O free.
pub mod error;
pub mod metrics;
pub mod ontology;
pub mod parser;
pub mod selector;
pub mod solver;

pub use error::CoreError;
pub use metrics::{JobOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use ontology::{Ontology, OntologySnapshot, Runner, RunnerSnapshot, RunnerSpec};
pub use parser::{JobRequirementParser, ParserConfig};
pub use selector::{
    Explanation, RunnerStatistics, RunnerSummary, SelectionMode, Selector, SelectorConfig,
    SharedSelector,
};
pub use solver::{ConstraintSolver, PruneReason, SelectionResult, SolverStatus};

pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::ontology::{Ontology, RunnerSpec};
    pub use crate::parser::JobRequirementParser;
    pub use crate::selector::{Explanation, Selector, SharedSelector};
    pub use crate::solver::{ConstraintSolver, SelectionResult};
}
