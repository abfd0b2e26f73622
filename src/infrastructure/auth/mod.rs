//! Bearer token verification against the identity service

mod remote_verifier;

pub use remote_verifier::RemoteTokenVerifier;
