mod job;
pub use job::{JobSpec, Timeout};

mod requirements;
pub use requirements::JobRequirements;
