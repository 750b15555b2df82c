mod client;
mod config;
mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientError, ClientResult, HttpResponse, ScholarClient, Transport};
pub use config::{NetworkConfig, NetworkConfigError};
pub use throttle::Throttle;
