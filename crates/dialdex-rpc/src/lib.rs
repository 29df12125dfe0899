pub mod client;
pub mod error;
pub mod source;
pub mod xmlrpc;

pub use client::OdooClient;
pub use error::{Result, RpcError};
pub use source::PartnerSource;
