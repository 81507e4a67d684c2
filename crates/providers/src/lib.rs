//! Language-model providers for iSenior.
//!
//! All providers implement the `isenior_core::Provider` trait.
//! [`build_from_config`] selects and configures one from `[llm]`.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, default_base_url};
