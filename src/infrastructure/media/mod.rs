pub mod cloudinary;
pub mod reference;
pub mod store;
