pub mod certification;
pub mod project;
pub mod token;
pub mod user;
