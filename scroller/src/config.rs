use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::from_str;
use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const PAGE_SIZE: u32 = 100;

#[derive(Deserialize, Debug)]
struct ConfigFile {
    api_key: Option<String>,
    credentials: Option<PathBuf>,
    home: Option<PathBuf>,
    api_host: Option<String>,
    proxy: Option<String>,
    host: Option<IpAddr>,
    port: Option<u16>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(rename = "FLICKR_API_KEY")]
    flickr_api_key: String,
}

pub struct Config {
    pub api_key: String,
    pub api_host: Option<String>,
    pub proxy: Option<String>,
    pub addr: SocketAddr,
    pub page_size: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("proxy", &self.proxy)
            .field("addr", &self.addr)
            .field("page_size", &self.page_size)
            .finish()
    }
}

fn read_credentials(path: &Path) -> Result<String> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("unable to access {}", path.display()))?;
    let c: Credentials =
        from_str(&s).with_context(|| format!("error accessing FLICKR_API_KEY in {}", path.display()))?;
    Ok(c.flickr_api_key)
}

fn parse_config(s: &str) -> Result<Config> {
    let config: ConfigFile = from_str(s)?;

    let home = &config.home;
    let at = |f: &Path| match home {
        Some(home) => home.join(f),
        _ => f.into(),
    };

    let api_key = match config.api_key {
        Some(key) => key,
        None => {
            let path = config
                .credentials
                .unwrap_or_else(|| PathBuf::from("api_keys.json"));
            read_credentials(&at(&path))?
        }
    };
    if api_key.is_empty() {
        bail!("empty api key");
    }

    let page_size = config.page_size.unwrap_or(PAGE_SIZE);
    if page_size == 0 {
        bail!("page_size must be positive");
    }

    let host = config.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let port = config.port.unwrap_or(5678);
    let addr = SocketAddr::new(host, port);

    Ok(Config {
        api_key,
        api_host: config.api_host,
        proxy: config.proxy,
        addr,
        page_size,
    })
}

pub fn read_config() -> Result<Config> {
    let config = fs::read_to_string("config.json").context("reading config.json")?;
    parse_config(&config)
}
