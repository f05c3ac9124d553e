//! Command-line handlers

pub mod commands;

pub use commands::{
    cmd_accounts, cmd_backups, cmd_balance, cmd_confirm, cmd_deploy, cmd_deposit, cmd_execute,
    cmd_export, cmd_import, cmd_info, cmd_list, cmd_propose, cmd_restore, cmd_revoke, cmd_tx,
    load_deploy_config, parse_data, AppState, CliResult,
};
