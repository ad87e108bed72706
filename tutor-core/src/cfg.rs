//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::error::TutorError;
use crate::session::SessionStore;

/// Knobs of the tutoring protocol. All fields have defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct TutorConfig {
    /// Documents retrieved for the relevance gate.
    pub top_k: u64,
    /// Minimum mean retrieval score for an in-domain question.
    pub domain_threshold: f32,
    /// Minimum cosine similarity between an answer and the previous hints.
    pub anchor_threshold: f32,
    /// Output token budget per generation call.
    pub max_output_tokens: u32,
    /// Generation attempts before giving up on a structured response.
    pub max_attempts: u32,
    /// Idle lifetime of a session in seconds; `0` keeps sessions until closed.
    pub session_ttl_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            domain_threshold: 0.2,
            anchor_threshold: 0.5,
            max_output_tokens: 600,
            max_attempts: 3,
            session_ttl_secs: 1800,
        }
    }
}

impl TutorConfig {
    /// Build from environment variables, falling back to [`Default`] per field.
    ///
    /// - `TUTOR_TOP_K`
    /// - `TUTOR_DOMAIN_THRESHOLD`
    /// - `TUTOR_ANCHOR_THRESHOLD`
    /// - `TUTOR_MAX_OUTPUT_TOKENS`
    /// - `TUTOR_MAX_ATTEMPTS`
    /// - `TUTOR_SESSION_TTL_SECS`
    ///
    /// # Errors
    /// `TutorError::Config` when a value is set but does not parse, or when
    /// `top_k`/`max_attempts` is zero.
    pub fn from_env() -> Result<Self, TutorError> {
        let d = Self::default();
        let cfg = Self {
            top_k: parse("TUTOR_TOP_K", d.top_k)?,
            domain_threshold: parse("TUTOR_DOMAIN_THRESHOLD", d.domain_threshold)?,
            anchor_threshold: parse("TUTOR_ANCHOR_THRESHOLD", d.anchor_threshold)?,
            max_output_tokens: parse("TUTOR_MAX_OUTPUT_TOKENS", d.max_output_tokens)?,
            max_attempts: parse("TUTOR_MAX_ATTEMPTS", d.max_attempts)?,
            session_ttl_secs: parse("TUTOR_SESSION_TTL_SECS", d.session_ttl_secs)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Store matching `session_ttl_secs`.
    pub fn session_store(&self) -> SessionStore {
        match self.session_ttl_secs {
            0 => SessionStore::new(),
            secs => SessionStore::with_ttl(Duration::from_secs(secs)),
        }
    }

    pub fn validate(&self) -> Result<(), TutorError> {
        if self.top_k == 0 {
            return Err(TutorError::Config("TUTOR_TOP_K must be > 0".into()));
        }
        if self.max_attempts == 0 {
            return Err(TutorError::Config("TUTOR_MAX_ATTEMPTS must be > 0".into()));
        }
        if !self.domain_threshold.is_finite() || !self.anchor_threshold.is_finite() {
            return Err(TutorError::Config("thresholds must be finite".into()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, TutorError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|_| TutorError::Config(format!("{key} has an invalid value: {v:?}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = TutorConfig::default();
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.max_attempts, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let cfg = TutorConfig {
            max_attempts: 0,
            ..TutorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(TutorError::Config(_))));
    }
}
