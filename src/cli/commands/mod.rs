mod create_admin;
mod init_config;

pub use create_admin::cmd_create_admin;
pub use init_config::cmd_init_config;
