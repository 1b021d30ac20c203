pub mod pagination;
pub mod sanitize;
pub mod valid_uuid;
