use std::error::Error as StdError;

use failure::Fail;

pub type Result<T> = std::result::Result<T, HashError>;

/// The two ways a run can end without a digest. Both are terminal.
#[derive(Debug, Fail)]
pub enum HashError {
    #[fail(display = "Error: {}", message)]
    Transport {
        message: String,
        #[cause]
        source: reqwest::Error,
    },
    #[fail(display = "Error executing the remote JS file: {}", _0)]
    Execution(String),
}

impl HashError {
    pub fn exit_code(&self) -> u8 {
        match self {
            HashError::Transport { .. } => 1,
            HashError::Execution(_) => 2,
        }
    }
}

impl From<reqwest::Error> for HashError {
    fn from(source: reqwest::Error) -> Self {
        // reqwest's own message stops at "error sending request"; the reason
        // lives further down the source chain.
        let mut message = source.to_string();
        let mut cause = source.source();
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        HashError::Transport { message, source }
    }
}
