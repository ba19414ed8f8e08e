pub mod settings_file;
pub mod sink;
pub mod source;
