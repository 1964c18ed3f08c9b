pub mod audio;
pub mod feed;
pub mod graphql;
pub mod submissions;
