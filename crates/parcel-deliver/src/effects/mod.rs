pub mod http;

pub use http::Deliverer;

#[cfg(feature = "reqwest")]
pub use http::ReqwestDeliverer;
