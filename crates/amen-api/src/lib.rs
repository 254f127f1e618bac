pub mod auth;
pub mod comments;
pub mod content;
pub mod favorites;
pub mod middleware;
pub mod prayers;
pub mod seed;

mod timestamps;
