//! Translation providers for clipflow's asynchronous commit handler.
//!
//! [`HttpTranslator`] implements [`clipflow_core::Provider`] against a
//! LibreTranslate-compatible service; [`ProviderKind`] selects the
//! language code table of the service being emulated.

mod error;
mod http;
mod kind;

pub use error::{ProviderError, ProviderResult};
pub use http::{HttpTranslator, TranslatorConfig};
pub use kind::ProviderKind;
