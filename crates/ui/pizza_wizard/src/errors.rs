use std::panic::PanicHookInfo;
use std::sync::OnceLock;

use color_eyre::{Result, config::PanicHook};
use tracing::error;

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the eyre report hook and a panic hook that puts the terminal back first.
/// Calling it again is a no-op.
pub fn init() -> Result<()> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "pizza_wizard crashed. Please file a report at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |info| {
        if let Err(e) = crate::tui::restore() {
            error!("could not restore terminal: {e:?}");
        }
        report_panic(&panic_hook, info);
        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = INSTALLED.set(());
    Ok(())
}

fn report_panic(hook: &PanicHook, info: &PanicHookInfo<'_>) {
    let report = hook.panic_report(info).to_string();
    error!("panic: {}", strip_ansi_escapes::strip_str(&report));

    if cfg!(debug_assertions) {
        better_panic::Settings::auto()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(info);
    } else {
        let metadata = human_panic::metadata!();
        let dump = human_panic::handle_dump(&metadata, info);
        if human_panic::print_msg(dump, &metadata).is_err() {
            eprintln!("failed to print the crash report");
        }
        eprintln!("{report}");
    }
}
