mod url;
mod visit;

pub use url::{CreateUrlRequest, ShortUrl, UpdateUrlRequest};
pub use visit::{NewVisit, Visit};
