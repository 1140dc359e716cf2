//! Command handlers, one per subcommand.

mod init;
pub(crate) mod keys;
mod misc;
mod sign;
mod transfer;

pub use init::handle_init;
pub use keys::{
    handle_add, handle_add_multi, handle_add_offline, handle_delete, handle_list, handle_show,
    handle_update,
};
pub use misc::handle_completions;
pub use sign::handle_sign;
pub use transfer::{handle_export, handle_import};
