pub mod error;
pub mod logger;
pub mod message;
pub mod text;
pub mod validation;
