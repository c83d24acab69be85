mod external_stats;
pub use external_stats::ExternalRunnerStats;
