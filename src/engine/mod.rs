//! Module dependency and integration analysis.

pub mod aggregate;
pub mod graph;
pub mod integration;
pub mod metrics;
pub mod modules;
pub mod pipeline;
pub mod report;
pub mod risk;

pub use aggregate::FeatureAggregator;
pub use graph::{DependencyGraphBuilder, GraphBuild};
pub use integration::{classify_relationship, IntegrationPointDetector};
pub use metrics::calculate_metrics;
pub use modules::{classify_module, ModuleCandidate, ModuleIdentifier};
pub use pipeline::{analyze, Engine};
pub use report::{generate_recommendations, ContractView, ReportAssembler, ReportContext};
pub use risk::{find_cycles, RiskAnalyzer};
