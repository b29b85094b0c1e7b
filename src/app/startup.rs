//! Binary entry point: arguments, configuration, logging, then one command

use crate::app::cli::args::Args;
use crate::app::cli::config::UniBoostConfig;
use crate::app::commands::CommandRunner;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, reconfigure_logging, LogFormat};
use crate::hooks::api::{HookResult, LifecycleEvent, ModuleHooks, ModuleHooksOptions};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

/// Parse the command line, run the selected command and exit
pub fn startup() {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(run(args));
    std::process::exit(code);
}

/// Run to completion and return the process exit code
pub async fn run(args: Args) -> i32 {
    let use_color = args.use_color(std::io::stdout().is_terminal());
    colored::control::set_override(use_color);

    // Log with the command line level until the config file is read
    let log_format = args.log_format.as_deref().and_then(LogFormat::parse);
    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        log_format,
        args.log_file(),
        use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return 1;
    }

    let root = args.root.clone().unwrap_or_else(|| Path::new(".").to_path_buf());
    let mut config = match UniBoostConfig::load(args.config_file.as_deref(), &root).await {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Loading configuration");
            return 1;
        }
    };
    config.apply_overrides(&args.overrides());

    if args.log_level.is_none() {
        if let Err(e) = reconfigure_logging(&config.log_level) {
            log::warn!("Ignoring log-level '{}': {}", config.log_level, e);
        }
    }

    log::debug!("uniboost {}", crate::core::version::long_version());
    log::debug!("Configuration: {:?}", config);

    let hooks = Arc::new(ModuleHooks::new(ModuleHooksOptions {
        enable_logging: config.verbose(),
        ..Default::default()
    }));
    if let Err(e) = register_default_taps(&hooks) {
        log_error_with_context(&e, "Registering lifecycle hooks");
        return 1;
    }

    let runner = CommandRunner::new(config, hooks);
    match runner.run(&args.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            let context = format!("Running '{}'", args.command.name());
            log_error_with_context(&e, &context);
            1
        }
    }
}

/// Taps every run gets: progress at debug level and failures at warn
pub fn register_default_taps(hooks: &ModuleHooks) -> HookResult<()> {
    hooks.before_load.tap("log-start", |event: &LifecycleEvent| {
        log::debug!("Starting {} {}", event.method, event.args);
        Ok(())
    })?;
    hooks.after_load.tap("log-finish", |event: &LifecycleEvent| {
        log::debug!("Finished {}", event.method);
        Ok(())
    })?;
    hooks.on_error.tap("log-error", |event: &LifecycleEvent| {
        log::warn!(
            "{} failed: {}",
            event.method,
            event.error.as_deref().unwrap_or("unknown error")
        );
        Ok(())
    })?;
    Ok(())
}
