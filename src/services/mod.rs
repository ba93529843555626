//! Service layer
//!
//! Code generation, validation and the URL service shared by every front end.

pub mod code_generator;
mod delete_worker;
mod url_service;
pub mod validation;

pub use code_generator::{ALPHABET, CODE_LENGTH, CodeGenerator, is_valid_code, random_code};
pub use delete_worker::{DeleteDispatcher, DeleteTicket};
pub use url_service::{BatchRequest, Stats, UrlService};
