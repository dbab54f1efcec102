//! # Parameter profiles
//!
//! Named BFV parameter sets. A deployment resolves exactly one profile at start-up and
//! keeps it for the lifetime of its [`crate::report::manager::ReportManager`].

pub mod profiles;

pub use profiles::{DEFAULT_PROFILE, PLAINTEXT_MODULUS, ParameterProfile, ProfileLiteral, names, resolve};
