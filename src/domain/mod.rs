pub mod email;
pub mod types;

pub use email::ParsedEmail;
pub use types::{Label, Prediction};
