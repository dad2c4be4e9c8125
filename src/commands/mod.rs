pub mod build;
pub mod inspect;
pub mod status;
