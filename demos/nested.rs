//! Git-style nested commands with hooks, global flags and prompts.
//!
//! Set `RUST_LOG=cmdtree_core=debug` to watch resolution.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example nested -- remote add origin https://example.com/repo.git
//! cargo run -p cmdtree-demos --example nested -- --verbose remote list
//! cargo run -p cmdtree-demos --example nested -- remote help add
//! cargo run -p cmdtree-demos --example nested -- --templates help.yaml --help
//! cargo run -p cmdtree-demos --example nested -- init
//! ```

use std::time::Duration;

use cmdtree_core::{
    App, Command, Context, Error, FlagSpec, HelpTemplates, Question, Result, TemplateRenderer,
    get_string_flag_value,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let app = match build_app(&args) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = app.run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn build_app(args: &[String]) -> Result<App> {
    let mut app = App::new("nested")
        .version("0.1.0")
        .usage("A toy version-control front end")
        .flag(FlagSpec::bool("verbose").with_usage("print more detail"))
        .flag(FlagSpec::string("templates").with_usage("help templates file (YAML or JSON)"))
        .before(|ctx| {
            if ctx.bool("verbose") {
                writeln!(ctx.output(), "[verbose]")?;
            }
            Ok(())
        })
        .on_command_not_found(|ctx, name| {
            let _ = writeln!(ctx.output(), "nested: '{name}' is not a command. See 'nested help'.");
        })
        .command(remote_command())
        .command(
            Command::new("init")
                .usage("create a repository interactively")
                .action(init),
        )
        .command(
            Command::new("exec")
                .usage("pass arguments through untouched")
                .skip_flag_parsing()
                .action(|ctx| {
                    writeln!(ctx.output(), "{:?}", ctx.args().as_slice())?;
                    Ok(())
                }),
        );

    // The renderer is fixed before parsing, so the templates path is read
    // straight from the raw arguments.
    let templates = get_string_flag_value(args, &["--templates"]);
    if !templates.is_empty() {
        let loaded = HelpTemplates::load(&templates)?;
        info!(path = %templates, "Loaded help templates");
        app = app.with_renderer(TemplateRenderer::new(loaded)?);
    }
    Ok(app)
}

fn remote_command() -> Command {
    Command::new("remote")
        .usage("manage remotes")
        .description("Add, list and remove tracked repositories")
        .flag(FlagSpec::duration("timeout").with_default(Duration::from_secs(30)))
        .after(|ctx| {
            if ctx.global_bool("verbose") {
                writeln!(ctx.output(), "[{} done]", ctx.full_name())?;
            }
            Ok(())
        })
        .subcommand(
            Command::new("add")
                .usage("add a remote")
                .flag(FlagSpec::bool("fetch").alias("f").with_usage("fetch after adding"))
                .flag(FlagSpec::string_list("tag").alias("t").with_usage("tags to track"))
                .action(remote_add),
        )
        .subcommand(
            Command::new("list")
                .short_name("ls")
                .usage("list remotes")
                .action(|ctx| {
                    writeln!(ctx.output(), "origin")?;
                    if ctx.global_bool("verbose") {
                        writeln!(ctx.output(), "  timeout: {:?}", ctx.global_duration("timeout"))?;
                    }
                    Ok(())
                }),
        )
}

fn remote_add(ctx: &Context<'_>) -> Result<()> {
    let (Some(name), Some(url)) = (ctx.args().get(0), ctx.args().get(1)) else {
        return Err(Error::custom("usage: nested remote add <name> <url>"));
    };
    writeln!(ctx.output(), "added {name} -> {url}")?;
    for tag in ctx.string_list("tag") {
        writeln!(ctx.output(), "  tracking tag {tag}")?;
    }
    if ctx.bool("fetch") {
        writeln!(
            ctx.output(),
            "fetching {name} (timeout {:?})",
            ctx.global_duration("timeout")
        )?;
    }
    Ok(())
}

fn init(ctx: &Context<'_>) -> Result<()> {
    ctx.output().flush()?;
    let name = Question::new("Repository name: ").ask()?;
    if name.is_empty() {
        return Err(Error::custom("a repository name is required"));
    }
    writeln!(ctx.output(), "initialized {name}")?;
    Ok(())
}
