use nt_tensor::Tensor;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NTStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorShape = 2,
    ErrorIndex = 3,
    ErrorInternal = 4,
}

/// Opaque tensor handle owned by the caller.
///
/// Created by `nt_tensor_create` or one of the matmul entry points and released
/// with `nt_tensor_destroy`.
pub struct NTTensor {
    pub(crate) inner: Tensor,
}

impl NTTensor {
    pub(crate) fn into_raw(inner: Tensor) -> *mut NTTensor {
        Box::into_raw(Box::new(NTTensor { inner }))
    }
}
