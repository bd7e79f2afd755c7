use clap::Parser;
use log::debug;

use crate::config::Config;

/// Raw command line. The grammar is scanned by hand in `Config::from_tokens`
/// because unknown flags must fall through as the string to hash.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// --hostname <host> --port <port> --suffix <s> --tls|--https [string]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config::from_tokens(self.tokens)
    }
}

enum Field {
    Hostname,
    Port,
    Suffix,
}

impl Config {
    pub fn from_tokens<I, S>(tokens: I) -> Config
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut config = Config::default();

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            let field = match token {
                "--hostname" => Some(Field::Hostname),
                "--port" => Some(Field::Port),
                "--suffix" => Some(Field::Suffix),
                "--tls" | "--https" => {
                    config.use_tls = true;
                    None
                }
                _ => {
                    if !config.input.is_empty() {
                        debug!("Discarding earlier input {:?} for {:?}", config.input, token);
                    }
                    config.input = token.to_owned();
                    None
                }
            };

            // A missing or empty value leaves the field alone and the next
            // token is scanned on its own.
            if let Some(field) = field {
                let slot = match field {
                    Field::Hostname => &mut config.hostname,
                    Field::Port => &mut config.port,
                    Field::Suffix => &mut config.suffix,
                };
                if let Some(value) = tokens.get(i + 1).filter(|v| !v.is_empty()) {
                    *slot = value.clone();
                    i += 1;
                } else {
                    debug!("{} given without a value, keeping {:?}", token, slot);
                }
            }
            i += 1;
        }
        config
    }
}
