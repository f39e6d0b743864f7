use crate::core::http::{ApiTestRequest, AuthConfig};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;

#[derive(Parser, Debug)]
#[command(name = "devprobe")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "HTTP endpoint tester and MongoDB inspector")]
pub struct Cli {
    /// Write the default configuration file
    #[arg(long = "init")]
    pub init: bool,

    /// Print the effective configuration
    #[arg(long = "print")]
    pub print: bool,

    /// Validate the configuration file
    #[arg(long = "check")]
    pub check: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Send a request and run HTTP checks on the response
    Request(RequestArgs),
    /// Run database checks against a connection string
    Db {
        connection_string: String,
        /// Check to run; repeatable, defaults to the full catalog
        #[arg(short = 't', long = "test")]
        tests: Vec<String>,
    },
    /// Manage saved API presets
    #[command(subcommand)]
    Preset(PresetCommand),
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    pub url: String,

    #[arg(short = 'X', long = "method", default_value = "GET")]
    pub method: String,

    /// Request header as 'Name: value'; repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body (must be JSON for POST/PUT/PATCH)
    #[arg(short = 'd', long = "data")]
    pub body: Option<String>,

    #[arg(long = "expect", default_value_t = 200)]
    pub expected_status: u16,

    /// Check to run; repeatable, defaults to the full catalog
    #[arg(long = "check")]
    pub checks: Vec<String>,

    #[arg(long, conflicts_with_all = ["basic", "api_key"])]
    pub bearer: Option<String>,

    /// Basic credentials as user:password
    #[arg(long, conflicts_with = "api_key")]
    pub basic: Option<String>,

    /// API key as Header:value, or just the value for X-API-Key
    #[arg(long = "api-key")]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// List saved presets
    List,
    /// Save a preset
    Add {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Delete a preset by id
    Remove { id: i64 },
    /// Run a saved preset
    Run { id: i64 },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl RequestArgs {
    /// Headers and credentials parsed into a test request
    pub fn to_request(&self) -> Result<ApiTestRequest, String> {
        let mut headers = BTreeMap::new();
        for raw in &self.headers {
            let (name, value) = raw
                .split_once(':')
                .ok_or_else(|| format!("Invalid header '{}', expected 'Name: value'", raw))?;
            headers.insert(name.trim().to_string(), value.trim().to_string());
        }

        Ok(ApiTestRequest {
            url: self.url.clone(),
            method: Some(self.method.clone()),
            headers,
            body: self.body.clone(),
            auth: self.auth()?,
            expected_status: self.expected_status,
        })
    }

    fn auth(&self) -> Result<AuthConfig, String> {
        if let Some(token) = &self.bearer {
            return Ok(AuthConfig::bearer(token.clone()));
        }
        if let Some(credentials) = &self.basic {
            let (username, password) = credentials
                .split_once(':')
                .ok_or_else(|| "Basic credentials must be user:password".to_string())?;
            return Ok(AuthConfig::basic(username, password));
        }
        if let Some(key) = &self.api_key {
            return Ok(match key.split_once(':') {
                Some((header, value)) => {
                    AuthConfig::api_key(Some(header.trim().to_string()), value.trim())
                }
                None => AuthConfig::api_key(None, key.clone()),
            });
        }
        Ok(AuthConfig::None)
    }
}
