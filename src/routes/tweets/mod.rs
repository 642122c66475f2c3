mod handler;

pub use handler::{delete_tweet, list_tweets, save_tweet};
