//! cmdtree-demo: a small program built on cmdtree-core.
//!
//! Every sub-command exercises a different part of the engine: typed
//! options, positionals, aliases, composite values, statements guarded by
//! an interceptor, and context extensions shared with handlers.
//!
//! Set `RUST_LOG=cmdtree_core=debug` to watch parsing and dispatch.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::process;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use cmdtree_core::{
    Command, Context, FlagSet, Handler, OptionConfig, RegistrationError, TIMESTAMP_FORMAT,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status a handler can raise without tearing the process down
/// mid-chain.
#[derive(Clone, Default)]
struct ExitStatus(Rc<Cell<i32>>);

impl ExitStatus {
    fn fail(&self, code: i32) {
        self.0.set(code);
    }

    fn code(&self) -> i32 {
        self.0.get()
    }
}

fn fail(ctx: &Context, code: i32, message: &str) {
    eprintln!("error: {message}");
    if let Some(status) = ctx.get::<ExitStatus>() {
        status.fail(code);
    }
}

fn main() {
    init_tracing();

    let app = match build() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    let status = ExitStatus::default();
    app.run_cmdline(Context::new().with(status.clone()));
    if status.code() != 0 {
        process::exit(status.code());
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
}

fn build() -> Result<FlagSet, RegistrationError> {
    let app = FlagSet::cmdline("demonstrate typed options and sub-command dispatch");
    let verbose = app.flag::<bool>(
        Some('v'),
        Some("verbose"),
        false,
        "report how long the command took",
    )?;
    app.intercept(move |ctx, next: &Handler| {
        // The context names the root here, not the dispatch target.
        let program = ctx.command().map(Command::name).unwrap_or_default();
        info!(%program, "start");
        let started = Instant::now();
        next(ctx);
        let elapsed = started.elapsed();
        debug!(%program, ?elapsed, "done");
        if verbose.get() {
            eprintln!("finished in {}", humantime::format_duration(elapsed));
        }
    });

    register_echo(&app)?;
    register_sum(&app)?;
    register_env(&app)?;
    register_when(&app)?;
    register_admin(&app)?;
    register_describe(&app)?;
    Ok(app)
}

fn register_echo(app: &Command) -> Result<(), RegistrationError> {
    let echo = app.command("echo", "print the given text")?;
    echo.alias(["say"])?;
    let upper = echo.flag::<bool>(Some('u'), Some("upper"), false, "convert to upper case")?;
    let repeat = echo.flag::<u32>(Some('r'), Some("repeat"), 1, "number of lines to print")?;
    let text = echo.positional::<String>(String::new(), "text to print")?;

    echo.handle(move |_ctx| {
        let mut line = text.get();
        if upper.get() {
            line = line.to_uppercase();
        }
        for _ in 0..repeat.get() {
            println!("{line}");
        }
    });
    Ok(())
}

fn register_sum(app: &Command) -> Result<(), RegistrationError> {
    let sum = app.command("sum", "add up integers")?;
    let numbers = sum.flag::<Vec<i64>>(
        Some('n'),
        Some("num"),
        Vec::new(),
        "numbers to add; repeat or separate with commas",
    )?;

    sum.handle(move |ctx| {
        let total = numbers
            .borrow()
            .iter()
            .try_fold(0i64, |acc, n| acc.checked_add(*n));
        match total {
            Some(total) => println!("{total}"),
            None => fail(&ctx, 2, "sum overflows i64"),
        }
    });
    Ok(())
}

fn register_env(app: &Command) -> Result<(), RegistrationError> {
    let env = app.command("env", "print KEY=VALUE pairs in key order")?;
    let vars = env.flag_with::<BTreeMap<String, String>>(
        Some('e'),
        Some("env"),
        BTreeMap::new(),
        "pairs such as A=1;B=2",
        OptionConfig::new()
            .with_separator(";")
            .with_key_value_separator("="),
    )?;

    env.handle(move |_ctx| {
        for (key, value) in vars.borrow().iter() {
            println!("{key}={value}");
        }
    });
    Ok(())
}

fn register_when(app: &Command) -> Result<(), RegistrationError> {
    let when = app.command("when", "add a duration to a local timestamp")?;
    let at = when.flag::<DateTime<Local>>(
        Some('a'),
        Some("at"),
        DateTime::UNIX_EPOCH.with_timezone(&Local),
        "starting point, YYYY-MM-DDTHH:MM:SS",
    )?;
    let after = when.flag::<Duration>(
        Some('d'),
        Some("after"),
        Duration::ZERO,
        "offset such as 90m or 1h 30m",
    )?;

    when.handle(move |ctx| {
        let Ok(offset) = chrono::Duration::from_std(after.get()) else {
            fail(&ctx, 2, "duration out of range");
            return;
        };
        match at.get().checked_add_signed(offset) {
            Some(then) => println!("{}", then.format(TIMESTAMP_FORMAT)),
            None => fail(&ctx, 2, "timestamp out of range"),
        }
    });
    Ok(())
}

/// Destructive commands live in a statement so that one interceptor
/// guards all of them without affecting the rest of the tree.
fn register_admin(app: &Command) -> Result<(), RegistrationError> {
    let admin = app.statement();
    let confirmed = admin.flag::<bool>(Some('y'), Some("yes"), false, "confirm the action")?;
    admin.intercept(move |ctx, next: &Handler| {
        if confirmed.get() {
            next(ctx);
            return;
        }
        fail(&ctx, 2, "refusing to run without --yes");
    });

    let reset = admin.command("reset", "forget all state")?;
    reset.handle(|_ctx| println!("state reset"));

    let purge = admin.command("purge", "remove cached files older than a cutoff")?;
    let older = purge.flag::<Duration>(
        None,
        Some("older-than"),
        Duration::from_secs(7 * 24 * 60 * 60),
        "age cutoff",
    )?;
    purge.handle(move |_ctx| {
        println!(
            "purged entries older than {}",
            humantime::format_duration(older.get())
        );
    });
    Ok(())
}

fn register_describe(app: &Command) -> Result<(), RegistrationError> {
    let describe = app.command("describe", "print the command tree as JSON")?;
    let compact = describe.flag::<bool>(Some('c'), Some("compact"), false, "single-line output")?;

    describe.handle(move |ctx| {
        let Some(mut root) = ctx.command().cloned() else {
            return;
        };
        while let Some(parent) = root.parent() {
            root = parent;
        }
        let info = root.describe();
        let json = if compact.get() {
            serde_json::to_string(&info)
        } else {
            serde_json::to_string_pretty(&info)
        };
        match json {
            Ok(json) => println!("{json}"),
            Err(err) => fail(&ctx, 1, &err.to_string()),
        }
    });
    Ok(())
}
