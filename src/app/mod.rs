pub mod gateway;
pub mod services;

pub use gateway::{handle_proxy, ProxyRequest, ProxyResponse};
pub use services::AppServices;
