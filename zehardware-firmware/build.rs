//! Build script for zehardware-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates agent.toml and compiles it into an `AgentConfig` constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Panel the firmware drives (SH1106)
const PANEL_WIDTH: u16 = 128;
const PANEL_HEIGHT: u16 = 64;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentToml {
    serial: SerialSection,
    #[serde(rename = "loop")]
    looping: LoopSection,
    display: DisplaySection,
    log: LogSection,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SerialSection {
    read_timeout_ms: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LoopSection {
    tick_period_ms: u32,
    keep_alive_ms: u32,
    exit_delay_ms: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplaySection {
    width: u16,
    height: u16,
    refresh_ms: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    preview_len: usize,
}

/// Read and parse agent.toml
fn load_config() -> AgentToml {
    // Re-run if agent.toml changes
    println!("cargo:rerun-if-changed=agent.toml");

    let config_path = Path::new("agent.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: agent.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an agent.toml configuration file.         ║\n\
            ║  Please create one in the zehardware-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read agent.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid agent.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check values the agent cannot run with
fn validate_config(config: &AgentToml) {
    let mut errors: Vec<String> = Vec::new();

    if config.looping.tick_period_ms == 0 {
        errors.push("[loop] tick_period_ms must be greater than 0".into());
    }
    if config.looping.keep_alive_ms == 0 {
        errors.push("[loop] keep_alive_ms must be greater than 0".into());
    }
    if config.display.refresh_ms == 0 {
        errors.push("[display] refresh_ms must be greater than 0".into());
    }
    if config.log.preview_len <= 3 {
        errors.push(format!(
            "[log] preview_len = {} must be greater than 3",
            config.log.preview_len
        ));
    }
    if config.display.width % 8 != 0 {
        errors.push(format!(
            "[display] width = {} must be a multiple of 8",
            config.display.width
        ));
    }
    if config.display.width != PANEL_WIDTH || config.display.height != PANEL_HEIGHT {
        errors.push(format!(
            "[display] {}x{} does not match the {}x{} panel",
            config.display.width, config.display.height, PANEL_WIDTH, PANEL_HEIGHT
        ));
    }
    if config.looping.tick_period_ms > 0 && config.display.refresh_ms < config.looping.tick_period_ms
    {
        println!(
            "cargo:warning=agent.toml: refresh_ms is shorter than one tick, refreshing every tick"
        );
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in agent.toml                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=agent.toml validated successfully");
}

/// Write `agent_config.rs` into OUT_DIR
fn generate_config(config: &AgentToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "/// Agent configuration generated from agent.toml\n\
         pub const AGENT_CONFIG: zehardware_core::AgentConfig = zehardware_core::AgentConfig {{\n    \
             read_timeout_ms: {},\n    \
             tick_period_ms: {},\n    \
             keep_alive_ms: {},\n    \
             refresh_ms: {},\n    \
             preview_len: {},\n    \
             exit_delay_ms: {},\n    \
             resolution: zehardware_core::Resolution::new({}, {}),\n\
         }};\n",
        config.serial.read_timeout_ms,
        config.looping.tick_period_ms,
        config.looping.keep_alive_ms,
        config.display.refresh_ms,
        config.log.preview_len,
        config.looping.exit_delay_ms,
        config.display.width,
        config.display.height,
    );
    fs::write(out_dir.join("agent_config.rs"), source).unwrap();
}
