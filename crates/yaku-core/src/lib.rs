pub mod chunker;
pub mod error;
pub mod monitor;
pub mod orchestrator;
pub mod pipeline;
pub mod registry;

#[cfg(test)]
mod tests;

pub use chunker::{Chunk, ChunkSet};
pub use error::{RegistryError, RoutingError};
pub use monitor::{CheckOutcome, EndpointMonitor};
pub use orchestrator::{FallbackOrchestrator, RequestRoute};
pub use pipeline::TranslationPipeline;
pub use registry::ProviderRegistry;
