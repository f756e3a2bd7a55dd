//! Query glue over the external metric sources.
//!
//! Everything in this crate is thin I/O: SPARQL against the Wikidata Query
//! Service, REST against the GitHub issue tracker that backs OpenCitations
//! crowdsourcing, and the partner journal registry the queries are scoped
//! to. The timeline core never sees any of it — the collector hands it
//! plain `(path, value, source)` observations and nothing else.

pub mod collect;
pub mod config;
pub mod error;
pub mod github;
pub mod opencitations;
pub mod wikidata;

pub use collect::{CollectionOutcome, collect_all};
pub use config::{PartnerJournal, SourcesConfig};
pub use error::{Error, Result};
pub use github::{GithubClient, Issue};
pub use opencitations::{ContributionSummary, DepositIssue, DepositStatus};
pub use wikidata::{Discovery, DiscoveryMethod, JournalMatch, SparqlClient};

#[cfg(test)]
mod tests;
