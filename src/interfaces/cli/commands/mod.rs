//! CLI command implementations

mod config_gen;
mod delete;
mod lookup;
mod shorten;
mod status;

pub use config_gen::config_generate;
pub use delete::delete_codes;
pub use lookup::{get_code, list_urls};
pub use shorten::{shorten_batch, shorten_url};
pub use status::{ping_storage, show_stats};
