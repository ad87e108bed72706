pub mod response_envelope;
pub mod session_cookie;
