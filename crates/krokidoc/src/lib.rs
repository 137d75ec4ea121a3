#![forbid(unsafe_code)]

//! `krokidoc` turns fenced diagram blocks in Markdown into Kroki embeds:
//! service GET URLs, generated asset files, or inline SVG.
//!
//! The core transformation is pure; fetching lives behind the
//! [`DiagramRenderer`] seam.
//!
//! # Features
//!
//! - `client`: enable the HTTP rendering client (`krokidoc::client`)

pub use krokidoc_core::*;

#[cfg(feature = "client")]
pub mod client {
    use std::sync::Arc;

    pub use krokidoc_client::{Error as ClientError, KrokiClient, MAX_RESPONSE_BYTES};

    #[derive(Debug, thiserror::Error)]
    pub enum PipelineError {
        #[error(transparent)]
        Core(#[from] krokidoc_core::Error),
        #[error(transparent)]
        Client(#[from] krokidoc_client::Error),
    }

    pub type Result<T> = std::result::Result<T, PipelineError>;

    /// Builds a [`Processor`](krokidoc_core::Processor) with a service client
    /// attached, ready for `post`-mode and inline-SVG pages.
    pub fn processor_from_config(
        config: krokidoc_core::KrokiConfig,
    ) -> Result<krokidoc_core::Processor> {
        let client = KrokiClient::from_config(&config)?;
        Ok(krokidoc_core::Processor::new()
            .with_config(config)
            .with_renderer(Arc::new(client)))
    }
}
