mod client;
mod clickup_url;
pub mod domain;

pub use clickup_url::*;

pub use client::*;
pub use domain::*;
