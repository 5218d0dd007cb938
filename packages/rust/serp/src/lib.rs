//! Search engine result page (SERP) extraction.
//!
//! An [`EngineDescriptor`] is the declarative, validated description of one
//! engine (endpoint, query parameters, CSS locators, page budget). The
//! markup quirks of each engine (where the real destination URL hides, how
//! redirects are wrapped) live in one [`EngineAdapter`] per engine. A
//! [`SerpExtractor`] pairs the two and finds the best rank of the monitored
//! site for a keyword.

pub mod adapters;
mod descriptor;
mod extractor;
mod registry;
mod site;

pub use adapters::{EngineAdapter, ParsedPage, SerpResult, adapter_for, parse_results};
pub use descriptor::EngineDescriptor;
pub use extractor::{SerpExtractor, SerpHit};
pub use registry::EngineRegistry;
pub use site::SiteMatcher;
