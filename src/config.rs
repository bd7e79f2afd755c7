pub const DEFAULT_HOSTNAME: &str = "10.5.0.6";
pub const DEFAULT_PORT: &str = "80";
pub const DEFAULT_SUFFIX: &str = "_http";

/// Path of the hashing script on the remote host.
pub const SCRIPT_PATH: &str = "/js/mm.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Settings for a single run, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hostname: String,
    /// Spliced into the URL as given; never range checked.
    pub port: String,
    pub use_tls: bool,
    pub suffix: String,
    pub input: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hostname: DEFAULT_HOSTNAME.to_owned(),
            port: DEFAULT_PORT.to_owned(),
            use_tls: false,
            suffix: DEFAULT_SUFFIX.to_owned(),
            input: String::new(),
        }
    }
}

impl Config {
    pub fn scheme(&self) -> Scheme {
        if self.use_tls {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    pub fn script_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme().as_str(),
            self.hostname,
            self.port,
            SCRIPT_PATH
        )
    }

    /// The string handed to the remote `md5`.
    pub fn hash_input(&self) -> String {
        format!("{}{}", self.input, self.suffix)
    }
}
