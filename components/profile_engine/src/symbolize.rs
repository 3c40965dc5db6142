//! Code-address symbolization

use std::ffi::c_void;

/// Resolve numeric code addresses to human-readable symbol names.
pub trait Symbolizer: Send + Sync {
    /// Resolve `address` to a symbol name, or `None` when the address does
    /// not fall inside any known symbol.
    fn symbolize(&self, address: u64) -> Option<String>;
}

/// Symbolizer over the process's own symbol tables.
#[derive(Debug, Default)]
pub struct BacktraceSymbolizer;

impl BacktraceSymbolizer {
    /// Create the symbolizer.
    pub fn new() -> Self {
        Self
    }
}

impl Symbolizer for BacktraceSymbolizer {
    fn symbolize(&self, address: u64) -> Option<String> {
        let mut name = None;
        backtrace::resolve(address as *mut c_void, |symbol| {
            if name.is_none() {
                name = symbol.name().map(|n| n.to_string());
            }
        });
        name
    }
}
