//! C-ABI wrapper around `coin-core`.
//!
//! # Overview
//! Lets a native host (for example a mobile list view) build the markets
//! request, run the GET with its own networking stack, and hand the response
//! back for classification into coins or one of the `FetchError` codes.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `coin_build_markets_request` / `coin_parse_markets_response` mirror the
//!   core `MarketsClient` 1:1.
//! - The C caller owns all returned pointers and must call the matching
//!   `coin_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use coin_core::http::HttpResponse;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a `MarketsClient` bound to `base_url`. Pass null for the default
/// CoinGecko endpoint.
///
/// The URL is validated when the request is built, not here.
/// The caller must free the returned pointer with `coin_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn coin_client_new(base_url: *const c_char) -> *mut FfiMarketsClient {
    catch_unwind(|| {
        let client = if base_url.is_null() {
            coin_core::MarketsClient::default()
        } else {
            let url = unsafe { CStr::from_ptr(base_url) }.to_str().unwrap_or("");
            coin_core::MarketsClient::new(url)
        };
        Box::into_raw(Box::new(FfiMarketsClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `coin_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn coin_client_free(client: *mut FfiMarketsClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the markets GET request.
///
/// On `Ok`, `*out_request` receives a request the caller must free with
/// `coin_free_request`. On any other code `*out_request` is set to null
/// (when `out_request` itself is non-null). `InvalidUrl` means no request
/// should be sent.
#[unsafe(no_mangle)]
pub extern "C" fn coin_build_markets_request(
    client: *const FfiMarketsClient,
    out_request: *mut *mut FfiHttpRequest,
) -> FfiErrorCode {
    if out_request.is_null() {
        return FfiErrorCode::NullArg;
    }
    unsafe { *out_request = std::ptr::null_mut() };
    if client.is_null() {
        return FfiErrorCode::NullArg;
    }

    catch_unwind(|| {
        let client = unsafe { &*client };
        match client.inner.build_markets_request() {
            Ok(req) => match FfiHttpRequest::from_core(req) {
                Ok(ffi_req) => {
                    unsafe { *out_request = ffi_req };
                    FfiErrorCode::Ok
                }
                Err(code) => code,
            },
            Err(e) => FfiErrorCode::from(&e),
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() || resp.body_len == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(resp.body, resp.body_len) }.to_vec()
    };
    HttpResponse::new(resp.status, body)
}

/// Classify the response to the markets request.
///
/// Never returns null. Free the result with `coin_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn coin_parse_markets_response(
    client: *const FfiMarketsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCoinListResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCoinListResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCoinListResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_markets_response(ffi_response_to_core(resp)) {
            Ok(coins) => FfiCoinListResult::ok(coins),
            Err(e) => FfiCoinListResult::from_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiCoinListResult::panic("panic in coin_parse_markets_response"))
}

/// Report a transport failure observed by the host (no response at all) in
/// the same envelope as parse results, so the host has a single error path.
#[unsafe(no_mangle)]
pub extern "C" fn coin_transport_failure(message: *const c_char) -> *mut FfiCoinListResult {
    catch_unwind(|| {
        let msg = if message.is_null() {
            "transport failure".to_string()
        } else {
            unsafe { CStr::from_ptr(message) }
                .to_string_lossy()
                .into_owned()
        };
        FfiCoinListResult::from_error(&coin_core::FetchError::unknown(msg.into()))
    })
    .unwrap_or_else(|_| FfiCoinListResult::panic("panic in coin_transport_failure"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request from `coin_build_markets_request`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn coin_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a result from `coin_parse_markets_response` or
/// `coin_transport_failure`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn coin_free_result(result: *mut FfiCoinListResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.coins.is_null() && result.coins_len > 0 {
            let coins = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    result.coins,
                    result.coins_len as usize,
                ))
            };
            for coin in coins.iter() {
                free_c_string(coin.id);
                free_c_string(coin.name);
                free_c_string(coin.symbol);
                free_c_string(coin.image);
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn coin_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
