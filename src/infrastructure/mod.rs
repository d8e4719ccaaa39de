pub mod http_transport;

pub use http_transport::{HttpReply, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub(crate) use http_transport::scripted::ScriptedTransport;
