mod handler;
mod model;

pub use handler::{generate_tweets, remix};
pub use model::{GenerateRequest, GenerateResponse, RemixRequest, RemixResponse};
