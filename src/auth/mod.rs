pub mod client_secret;
pub mod oauth;
pub mod token_file;
pub mod token_manager;
