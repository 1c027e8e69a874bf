//! Minimal single-command application.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example greet -- hello
//! cargo run -p cmdtree-demos --example greet -- hello --name Jeremy
//! cargo run -p cmdtree-demos --example greet -- --help
//! ```

use cmdtree_core::{App, Command, FlagSpec};

fn main() {
    let app = App::new("greet")
        .version("0.1.0")
        .usage("Says hello")
        .command(
            Command::new("hello")
                .usage("print a greeting")
                .flag(
                    FlagSpec::string("name")
                        .alias("n")
                        .with_default("world")
                        .with_usage("who to greet"),
                )
                .action(|ctx| {
                    writeln!(ctx.output(), "Hello {}", ctx.string("name"))?;
                    Ok(())
                }),
        );

    if let Err(err) = app.run(std::env::args()) {
        eprintln!("Got an error: {err}");
        std::process::exit(1);
    }
}
