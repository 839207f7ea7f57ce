// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! C ABI exported from the cdylib
//!
//! Array lengths are element counts of the flat buffers (`3 * n` for vertex
//! coordinates, `3 * m` for triangle indices). Functions never unwind across the
//! boundary: failures become a negative status or a null pointer, and the
//! message is kept for [`gdist_last_error`].

use crate::api;
use crate::error::GeodesicError;
use crate::matrix::SparseMatrix;
use log::warn;
use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;
use std::slice;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: String) {
    warn!("gdist C API call failed: {}", message);
    let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// View a caller buffer, treating a zero length as empty regardless of the pointer
unsafe fn view<'a, T>(data: *const T, len: u32, name: &'static str) -> Result<&'a [T], GeodesicError> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(GeodesicError::invalid_param(name, "null", "pointer required for a non-empty buffer"));
    }
    Ok(slice::from_raw_parts(data, len as usize))
}

unsafe fn compute_impl(
    vertices: (*const f64, u32),
    triangles: (*const u32, u32),
    sources: (*const u32, u32),
    targets: (*const u32, u32),
    has_output: bool,
    distance_limit: f64,
) -> Result<Vec<f64>, GeodesicError> {
    let vertices = view(vertices.0, vertices.1, "vertices")?;
    let triangles = view(triangles.0, triangles.1, "triangles")?;
    let sources = view(sources.0, sources.1, "sources")?;
    let targets = view(targets.0, targets.1, "targets")?;
    if !has_output && !targets.is_empty() {
        return Err(GeodesicError::invalid_param("distances", "null", "output buffer required"));
    }
    api::compute_distances(vertices, triangles, sources, targets, Some(distance_limit))
}

unsafe fn matrix_impl(
    vertices: (*const f64, u32),
    triangles: (*const u32, u32),
    max_distance: f64,
) -> Result<SparseMatrix, GeodesicError> {
    let vertices = view(vertices.0, vertices.1, "vertices")?;
    let triangles = view(triangles.0, triangles.1, "triangles")?;
    api::local_distance_matrix(vertices, triangles, Some(max_distance))
}

/// Distances from the nearest source to every target, written to `distances`
/// (`number_of_targets` doubles). Targets farther than `distance_limit` get
/// `GEODESIC_INF`; pass infinity for no limit. A negative or NaN limit fails
/// with -4. Returns 0 on success or a negative error code.
///
/// # Safety
/// Every pointer must reference at least the stated number of elements, and
/// `distances` must be writable for `number_of_targets` doubles.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn gdist_compute(
    number_of_vertices: u32,
    number_of_triangles: u32,
    vertices: *const f64,
    triangles: *const u32,
    number_of_sources: u32,
    number_of_targets: u32,
    sources: *const u32,
    targets: *const u32,
    distances: *mut f64,
    distance_limit: f64,
) -> i32 {
    clear_last_error();
    let outcome = compute_impl(
        (vertices, number_of_vertices),
        (triangles, number_of_triangles),
        (sources, number_of_sources),
        (targets, number_of_targets),
        !distances.is_null(),
        distance_limit,
    );

    match outcome {
        Ok(result) => {
            if !result.is_empty() {
                ptr::copy_nonoverlapping(result.as_ptr(), distances, result.len());
            }
            0
        }
        Err(err) => {
            let code = err.code();
            set_last_error(err.to_string());
            code
        }
    }
}

/// Sparse distance matrix as one heap buffer of `3 * size` doubles laid out
/// rows, then columns, then values; `size` is written to `out_size`. Returns
/// null on failure. Release the buffer with [`gdist_free`].
///
/// # Safety
/// Input pointers must reference the stated number of elements and `out_size`
/// must be writable.
#[no_mangle]
pub unsafe extern "C" fn gdist_local_matrix(
    number_of_vertices: u32,
    number_of_triangles: u32,
    vertices: *const f64,
    triangles: *const u32,
    out_size: *mut u32,
    max_distance: f64,
) -> *mut f64 {
    clear_last_error();
    let outcome = if out_size.is_null() {
        Err(GeodesicError::invalid_param("out_size", "null", "output pointer required"))
    } else {
        matrix_impl((vertices, number_of_vertices), (triangles, number_of_triangles), max_distance)
    };

    match outcome {
        Ok(matrix) => {
            let size = matrix.len();
            let Ok(reported) = u32::try_from(size) else {
                set_last_error(format!("matrix with {} entries does not fit a u32 size", size));
                return ptr::null_mut();
            };
            *out_size = reported;
            let buffer = matrix.into_flat().into_boxed_slice();
            Box::into_raw(buffer) as *mut f64
        }
        Err(err) => {
            set_last_error(err.to_string());
            ptr::null_mut()
        }
    }
}

/// Release a buffer returned by [`gdist_local_matrix`]; `size` is the entry
/// count it reported. Null is ignored.
///
/// # Safety
/// `ptr` must come from `gdist_local_matrix` and must not be used afterwards.
/// `size` must be exactly the count that call reported: any other value frees
/// an allocation of the wrong length, which is undefined behaviour.
#[no_mangle]
pub unsafe extern "C" fn gdist_free(ptr: *mut f64, size: u32) {
    if ptr.is_null() {
        return;
    }
    let len = 3 * size as usize;
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}

/// Message of the last failure on this thread, or null. The pointer stays
/// valid until the next gdist call on the same thread.
#[no_mangle]
pub extern "C" fn gdist_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |message| message.as_ptr())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    const SQUARE: [f64; 12] = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
    ];
    const SQUARE_FACES: [u32; 6] = [0, 1, 2, 0, 2, 3];

    #[test]
    fn test_compute_writes_distances() {
        let sources = [0u32];
        let targets = [2u32, 3];
        let mut out = [0.0f64; 2];
        let status = unsafe {
            gdist_compute(
                SQUARE.len() as u32,
                SQUARE_FACES.len() as u32,
                SQUARE.as_ptr(),
                SQUARE_FACES.as_ptr(),
                1,
                2,
                sources.as_ptr(),
                targets.as_ptr(),
                out.as_mut_ptr(),
                f64::INFINITY,
            )
        };
        assert_eq!(status, 0);
        assert!((out[0] - 2f64.sqrt()).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
        assert!(gdist_last_error().is_null());
    }

    #[test]
    fn test_compute_reports_errors() {
        let sources = [9u32];
        let targets = [0u32];
        let mut out = [0.0f64; 1];
        let status = unsafe {
            gdist_compute(
                SQUARE.len() as u32,
                SQUARE_FACES.len() as u32,
                SQUARE.as_ptr(),
                SQUARE_FACES.as_ptr(),
                1,
                1,
                sources.as_ptr(),
                targets.as_ptr(),
                out.as_mut_ptr(),
                f64::INFINITY,
            )
        };
        assert_eq!(status, -2);
        let message = unsafe { CStr::from_ptr(gdist_last_error()) };
        assert!(message.to_string_lossy().contains("out of range"));
    }

    #[test]
    fn test_matrix_round_trip() {
        let mut size = 0u32;
        let data = unsafe {
            gdist_local_matrix(
                SQUARE.len() as u32,
                SQUARE_FACES.len() as u32,
                SQUARE.as_ptr(),
                SQUARE_FACES.as_ptr(),
                &mut size,
                1.5,
            )
        };
        assert!(!data.is_null());
        assert_eq!(size, 12);

        let flat = unsafe { slice::from_raw_parts(data, 3 * size as usize) };
        let n = size as usize;
        assert!(flat[..n].windows(2).all(|w| w[0] <= w[1]));
        assert!(flat[2 * n..].iter().all(|&d| d > 0.0 && d <= 1.5));
        unsafe { gdist_free(data, size) };
    }

    #[test]
    fn test_matrix_null_out_size() {
        let data = unsafe {
            gdist_local_matrix(
                SQUARE.len() as u32,
                SQUARE_FACES.len() as u32,
                SQUARE.as_ptr(),
                SQUARE_FACES.as_ptr(),
                ptr::null_mut(),
                1.0,
            )
        };
        assert!(data.is_null());
        assert!(!gdist_last_error().is_null());
        unsafe { gdist_free(ptr::null_mut(), 0) };
    }
}
