pub mod http_client;
pub mod transport;

pub use http_client::HttpClient;
pub use transport::{decode, decode_list, encode, RestApi, UploadFile};
