//! Argon2id hashing for author passwords.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use quill_core::ports::{AuthError, PasswordService};

/// Argon2 cost parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashConfig {
    /// Load cost parameters from `ARGON2_*` variables, keeping defaults for unset ones.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: u32| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        };

        Self {
            memory_kib: read("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: read("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: read("ARGON2_PARALLELISM", defaults.parallelism),
        }
    }
}

/// Argon2id password service. Stored hashes are PHC strings, so hashes made
/// under older cost parameters still verify.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Out-of-range cost parameters fall back to the library defaults.
    pub fn with_config(config: &PasswordHashConfig) -> Self {
        match Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        ) {
            Ok(params) => Self {
                argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            },
            Err(e) => {
                tracing::warn!(error = %e, ?config, "Invalid Argon2 parameters, using defaults");
                Self::new()
            }
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// `Ok(false)` only for a wrong password. A corrupt stored hash is an error
    /// so it is not mistaken for a failed login.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordService {
        Argon2PasswordService::with_config(&PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let service = cheap();
        let hash = service.hash("correct horse battery").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("correct horse battery", &hash).unwrap());
        assert!(!service.verify("wrong horse battery", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = cheap();
        assert_ne!(service.hash("same").unwrap(), service.hash("same").unwrap());
    }

    #[test]
    fn test_cost_parameters_are_recorded_in_hash() {
        let hash = cheap().hash("password1").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"), "{hash}");
    }

    #[test]
    fn test_hash_from_other_parameters_still_verifies() {
        let hash = cheap().hash("password1").unwrap();
        assert!(Argon2PasswordService::new().verify("password1", &hash).unwrap());
    }

    #[test]
    fn test_invalid_parameters_fall_back_to_defaults() {
        let service = Argon2PasswordService::with_config(&PasswordHashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        let hash = service.hash("password1").unwrap();
        assert!(service.verify("password1", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            cheap().verify("anything", "not-a-phc-string"),
            Err(AuthError::HashingError(_))
        ));
    }
}
