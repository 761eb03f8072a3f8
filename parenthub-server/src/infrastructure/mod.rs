pub mod database;
pub mod jwt;
pub mod logging;
pub mod oauth;
pub mod settings;
