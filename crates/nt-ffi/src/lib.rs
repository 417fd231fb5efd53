mod types;
mod error;

pub use types::*;
pub use error::*;

use std::ffi::CString;
use std::os::raw::c_char;

use nt_tensor::cpu::matmul::matmul_2d;
use nt_tensor::{ComputeBackend, CpuBackend, Tensor};

/// Execute a closure that returns an `NTStatus`, catching any panics
/// and converting them into `NTStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> NTStatus + std::panic::UnwindSafe>(f: F) -> NTStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            NTStatus::ErrorInternal
        }
    }
}

/// Create a zero-filled tensor of rank `ndim` with extents `shape[0..ndim]`.
///
/// On success, writes a heap-allocated `NTTensor` pointer into `*out` and
/// returns `NTStatus::Ok`. The caller must later call `nt_tensor_destroy`.
/// Rank 0 and zero extents are rejected.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_create(
    ndim: usize,
    shape: *const usize,
    out: *mut *mut NTTensor,
) -> NTStatus {
    catch_panic(|| {
        if shape.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        if ndim == 0 {
            set_last_error("ndim must be >= 1".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        let dims = unsafe { std::slice::from_raw_parts(shape, ndim) };
        if dims.contains(&0) {
            set_last_error(format!("shape {:?} has a zero extent", dims));
            return NTStatus::ErrorInvalidArgument;
        }
        unsafe { *out = NTTensor::into_raw(Tensor::zeros(dims)) };
        NTStatus::Ok
    })
}

/// Destroy a tensor previously returned by this library.
///
/// Passing a null pointer is a no-op. Destroying the same tensor twice is
/// undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_destroy(t: *mut NTTensor) {
    if !t.is_null() {
        drop(Box::from_raw(t));
    }
}

/// Rank of `t`, or 0 for a null handle.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_ndim(t: *const NTTensor) -> usize {
    match t.as_ref() {
        Some(t) => t.inner.rank(),
        None => 0,
    }
}

/// Copy the extents of `t` into `out[0..ndim]`. `len` is the capacity of `out`.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_shape(
    t: *const NTTensor,
    out: *mut usize,
    len: usize,
) -> NTStatus {
    catch_panic(|| {
        let t = match unsafe { t.as_ref() } {
            Some(t) if !out.is_null() => t,
            _ => {
                set_last_error("null argument".to_string());
                return NTStatus::ErrorInvalidArgument;
            }
        };
        let dims = t.inner.shape().dims();
        if len < dims.len() {
            set_last_error(format!("shape buffer holds {} of {} dims", len, dims.len()));
            return NTStatus::ErrorInvalidArgument;
        }
        let out = unsafe { std::slice::from_raw_parts_mut(out, dims.len()) };
        out.copy_from_slice(dims);
        NTStatus::Ok
    })
}

/// Pointer to the row-major buffer of `t`, with its length written to `*len_out`.
///
/// The pointer stays valid until `t` is destroyed. Returns null for a null handle.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_data(t: *mut NTTensor, len_out: *mut usize) -> *mut f32 {
    let t = match t.as_mut() {
        Some(t) => t,
        None => return std::ptr::null_mut(),
    };
    if !len_out.is_null() {
        *len_out = t.inner.len();
    }
    t.inner.data_mut().as_mut_ptr()
}

/// Read the element at `indices[0..ndim]` into `*out`.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_get(
    t: *const NTTensor,
    indices: *const usize,
    ndim: usize,
    out: *mut f32,
) -> NTStatus {
    catch_panic(|| {
        if t.is_null() || indices.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        let t = unsafe { &*t };
        let index = unsafe { std::slice::from_raw_parts(indices, ndim) };
        match t.inner.try_get(index) {
            Ok(v) => {
                unsafe { *out = v };
                NTStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Write `value` at `indices[0..ndim]`.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_set(
    t: *mut NTTensor,
    indices: *const usize,
    ndim: usize,
    value: f32,
) -> NTStatus {
    catch_panic(|| {
        if t.is_null() || indices.is_null() {
            set_last_error("null argument".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        let t = unsafe { &mut *t };
        let index = unsafe { std::slice::from_raw_parts(indices, ndim) };
        match t.inner.try_set(index, value) {
            Ok(()) => NTStatus::Ok,
            Err(e) => report(e),
        }
    })
}

/// Batched matmul of `a` [..batch, m, k] and `b` [..batch, k, n].
///
/// With `parallel` set, batches run on rayon's global pool. On success,
/// writes a new tensor into `*out` which the caller must destroy.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_matmul(
    a: *const NTTensor,
    b: *const NTTensor,
    parallel: bool,
    out: *mut *mut NTTensor,
) -> NTStatus {
    catch_panic(|| {
        if a.is_null() || b.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        let (a, b) = unsafe { (&*a, &*b) };
        let backend = if parallel {
            CpuBackend::parallel()
        } else {
            CpuBackend::new()
        };
        match a.inner.matmul(&b.inner, &backend) {
            Ok(r) => {
                unsafe { *out = NTTensor::into_raw(r) };
                NTStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Plain 2D matmul; both operands must have rank 2.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_matmul_2d(
    a: *const NTTensor,
    b: *const NTTensor,
    out: *mut *mut NTTensor,
) -> NTStatus {
    catch_panic(|| {
        if a.is_null() || b.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        let (a, b) = unsafe { (&*a, &*b) };
        match matmul_2d(&a.inner.view(), &b.inner.view()) {
            Ok(r) => {
                unsafe { *out = NTTensor::into_raw(r) };
                NTStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Euclidean distance between two equally shaped tensors, written to `*out`.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_euclidean_distance(
    a: *const NTTensor,
    b: *const NTTensor,
    out: *mut f32,
) -> NTStatus {
    catch_panic(|| {
        if a.is_null() || b.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return NTStatus::ErrorInvalidArgument;
        }
        let (a, b) = unsafe { (&*a, &*b) };
        match CpuBackend::new().euclidean_distance(&a.inner.view(), &b.inner.view()) {
            Ok(d) => {
                unsafe { *out = d };
                NTStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Print `t` to stdout as nested brackets followed by its shape.
#[no_mangle]
pub unsafe extern "C" fn nt_tensor_print(t: *const NTTensor) -> NTStatus {
    catch_panic(|| match unsafe { t.as_ref() } {
        Some(t) => {
            println!("{}", t.inner);
            NTStatus::Ok
        }
        None => {
            set_last_error("null argument".to_string());
            NTStatus::ErrorInvalidArgument
        }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `nt_free_string`.
#[no_mangle]
pub extern "C" fn nt_last_error() -> *mut c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by `nt_last_error`.
#[no_mangle]
pub unsafe extern "C" fn nt_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
