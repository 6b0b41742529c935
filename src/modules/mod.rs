pub mod audit;
pub mod batch;
pub mod catalog;
pub mod enrichment;
pub mod matcher;
pub mod provider;
pub mod verification;
