pub mod quote;
pub mod report;
pub mod settings;
pub mod transaction;
pub mod window;
