use error_stack::Report;
use kernel::KernelError;

pub mod database;
pub mod error;
pub mod notify;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key).map_err(|error| {
        Report::new(error)
            .change_context(KernelError::Internal)
            .attach_printable(format!("Env {} not specified", key))
    })
}

pub(crate) fn optional_env(key: &str) -> Option<String> {
    dotenvy::var(key).ok().filter(|value| !value.is_empty())
}
