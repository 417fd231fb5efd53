use std::cell::RefCell;
use std::ffi::CString;

use nt_tensor::TensorError;

use crate::types::NTStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `nt_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record `err` as the last error and map it to a status code.
pub fn report(err: TensorError) -> NTStatus {
    let status = match &err {
        TensorError::RankTooLow { .. }
        | TensorError::RankMismatch { .. }
        | TensorError::ShapeMismatch { .. }
        | TensorError::BatchMismatch { .. }
        | TensorError::MatmulMismatch { .. }
        | TensorError::DataLength { .. } => NTStatus::ErrorShape,
        TensorError::IndexOutOfBounds { .. } | TensorError::InvalidAxis { .. } => {
            NTStatus::ErrorIndex
        }
        TensorError::InvalidConfig { .. } => NTStatus::ErrorInvalidArgument,
        TensorError::ThreadPool(_) => NTStatus::ErrorInternal,
    };
    set_last_error(err.to_string());
    status
}
