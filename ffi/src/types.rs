//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`,
//! and explicit enum discriminants. A nullable `f64` becomes a value plus a
//! presence flag. Conversion functions live here to keep `lib.rs` focused on
//! the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use coin_core::error::FetchError;
use coin_core::http::HttpMethod;
use coin_core::CoinRecord;

/// Opaque handle to a `MarketsClient`.
pub struct FfiMarketsClient {
    pub(crate) inner: coin_core::MarketsClient,
}

/// Copy `s` into a heap C string owned by the caller. Interior NUL bytes
/// cannot be represented and are dropped.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

/// Length of a Rust-owned array as seen by C. Lengths beyond `u32::MAX`
/// are refused so the matching free never sees a truncated count.
pub(crate) fn c_len(len: usize) -> Result<u32, FfiErrorCode> {
    u32::try_from(len).map_err(|_| FfiErrorCode::TooLarge)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// The markets request as C-compatible plain data.
///
/// The C caller performs the GET and passes the response back through
/// `coin_parse_markets_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: coin_core::HttpRequest) -> Result<*mut Self, FfiErrorCode> {
        let headers_len = c_len(req.headers.len())?;
        let url = to_c_string(&req.url);

        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Ok(Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
        })))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller builds this after executing the request and passes a
/// pointer to `coin_parse_markets_response`. The FFI layer reads but does
/// not free these fields. `body` points at `body_len` raw bytes (no NUL
/// terminator, any encoding); a null `body` is treated as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes. The first five mirror `FetchError`; the rest are FFI-only.
/// `TooLarge` means a result array would not fit a `u32` length.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    ServerError = 2,
    InvalidData = 3,
    Unknown = 4,
    Panic = 5,
    NullArg = 6,
    TooLarge = 7,
}

impl From<&FetchError> for FfiErrorCode {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            FetchError::ServerError { .. } => FfiErrorCode::ServerError,
            FetchError::InvalidData(_) => FfiErrorCode::InvalidData,
            FetchError::Unknown(_) => FfiErrorCode::Unknown,
        }
    }
}

/// One coin exposed to C. `price_change_percentage_24h` is meaningful only
/// when `has_price_change` is true.
#[repr(C)]
pub struct FfiCoin {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub symbol: *mut c_char,
    pub image: *mut c_char,
    pub current_price: f64,
    pub has_price_change: bool,
    pub price_change_percentage_24h: f64,
}

impl FfiCoin {
    fn from_core(coin: &CoinRecord) -> Self {
        FfiCoin {
            id: to_c_string(&coin.id),
            name: to_c_string(&coin.name),
            symbol: to_c_string(&coin.symbol),
            image: to_c_string(&coin.image),
            current_price: coin.current_price,
            has_price_change: coin.price_change_percentage_24h.is_some(),
            price_change_percentage_24h: coin.price_change_percentage_24h.unwrap_or(0.0),
        }
    }
}

/// Result envelope for `coin_parse_markets_response`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `coins`
/// holds `coins_len` entries in server order (null when empty).
/// On failure `coins` is null and `error_message` is a human-readable C
/// string. `http_status` is set for `ServerError`.
#[repr(C)]
pub struct FfiCoinListResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub coins: *mut FfiCoin,
    pub coins_len: u32,
}

impl FfiCoinListResult {
    pub(crate) fn ok(coins: Vec<CoinRecord>) -> *mut Self {
        let Ok(coins_len) = c_len(coins.len()) else {
            return Self::failure(FfiErrorCode::TooLarge, "coin list too large", 0);
        };
        let items = if coins.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_coins: Box<[FfiCoin]> = coins.iter().map(FfiCoin::from_core).collect();
            Box::into_raw(ffi_coins) as *mut FfiCoin
        };

        Box::into_raw(Box::new(FfiCoinListResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            coins: items,
            coins_len,
        }))
    }

    pub(crate) fn from_error(err: &FetchError) -> *mut Self {
        let http_status = match err {
            FetchError::ServerError { status } => *status,
            _ => 0,
        };
        Self::failure(err.into(), &err.to_string(), http_status)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"), 0)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg, 0)
    }

    fn failure(error_code: FfiErrorCode, msg: &str, http_status: u16) -> *mut Self {
        Box::into_raw(Box::new(FfiCoinListResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            coins: std::ptr::null_mut(),
            coins_len: 0,
        }))
    }
}
