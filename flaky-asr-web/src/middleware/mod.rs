pub mod admission;
pub mod request_id;

pub use admission::admission_middleware;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
