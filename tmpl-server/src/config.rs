use std::{fs, ops::RangeInclusive};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug, Clone, Deserialize)]
#[command(name = "server")]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    #[clap(long)]
    #[arg(short = 'c')]
    #[serde(default)]
    pub config: Option<String>,
    #[clap(long, env)]
    #[arg(default_value_t = String::from("server=info"))]
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
    #[clap(long, env)]
    #[arg(value_parser = port_in_range,short = 'p', default_value_t = 30050)]
    #[serde(default = "default_port")]
    pub port: u16,
    #[clap(long, env)]
    #[arg(default_value_t = String::from("tmpl"))]
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            rust_log: default_rust_log(),
            port: default_port(),
            site_name: default_site_name(),
        }
    }
}

fn default_rust_log() -> String {
    String::from("server=info")
}

fn default_port() -> u16 {
    30050
}

fn default_site_name() -> String {
    String::from("tmpl")
}

const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn load(cfg: &str) -> Result<AppConfig> {
    let content =
        fs::read_to_string(cfg).context("could not read config file")?;
    parse(&content)
}

fn parse(content: &str) -> Result<AppConfig> {
    toml::from_str(content).context("could not parse config file")
}
