use std::env::var;

/// Key locations, taken from flags first and the environment second
pub struct Config {
    pub public_key_path: Option<String>,
    pub secret_key_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let public_key_path = match var("BLINDBALLOT_PUBLIC_KEY") {
            Ok(val) => Some(crate::expand(&val)),
            Err(_e) => None,
        };

        let secret_key_path = match var("BLINDBALLOT_SECRET_KEY") {
            Ok(val) => Some(crate::expand(&val)),
            Err(_e) => None,
        };

        Config {
            public_key_path,
            secret_key_path,
        }
    }

    /// Apply `--public-key` / `--secret` overrides
    pub fn with_matches(mut self, matches: &clap::ArgMatches) -> Self {
        if let Some(path) = matches.value_of("public-key") {
            self.public_key_path = Some(crate::expand(path));
        }
        if let Some(path) = matches.value_of("secret") {
            self.secret_key_path = Some(crate::expand(path));
        }
        self
    }
}
