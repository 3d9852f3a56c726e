use error_stack::Report;
use kernel::KernelError;

pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T> ConvertError for Result<T, reqwest::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = if error.is_timeout() {
                KernelError::Timeout
            } else {
                KernelError::Internal
            };
            Report::new(error).change_context(context)
        })
    }
}
