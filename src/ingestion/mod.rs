pub mod pipeline;
pub mod provider;
