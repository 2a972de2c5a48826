//! SSRF protection for every outbound request.

mod allowlist;

pub use allowlist::AllowList;
