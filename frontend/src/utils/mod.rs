pub mod cookies;
pub mod locale;
