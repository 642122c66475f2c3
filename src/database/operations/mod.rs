pub mod tweet;
