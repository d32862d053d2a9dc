pub mod engine;
pub mod pipeline;
pub mod reader;
pub mod validator;

pub use crate::domain::model::{RowRecord, ValidatedRecord, Validation};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
