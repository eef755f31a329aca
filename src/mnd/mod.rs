//! Client for the MND (Ministry of National Defense) open menu API.

pub mod client;
pub mod convert;
pub mod normalize;
pub mod parser;

pub use client::MndApi;
pub use convert::{Menu, MenuColumns};
pub use parser::{MndParser, MndRow, MndRowsParser, TotalCountParser};

#[derive(Debug, thiserror::Error)]
pub enum MndError {
    /// Transport failures and non-success statuses alike; `status()` on the
    /// inner error tells them apart.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),
    #[error("unexpected upstream payload: {0}")]
    UpstreamFormat(String),
}
