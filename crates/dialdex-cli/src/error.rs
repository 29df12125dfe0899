use std::process::ExitCode;

use anyhow::Error;
use dialdex_config::ConfigError;
use dialdex_rpc::RpcError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(rpc_err) = cause.downcast_ref::<RpcError>() {
            return ExitCode::from(rpc_exit_code(rpc_err));
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::EmptyEndpointField { .. }
        | ConfigError::InvalidUserId(_)
        | ConfigError::InvalidResultLimit(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn rpc_exit_code(err: &RpcError) -> u8 {
    match err {
        RpcError::Http(_) | RpcError::Parse(_) | RpcError::Fault { .. } => EXIT_FAILURE,
        RpcError::Url(_) => EXIT_INVALID_INPUT,
    }
}
