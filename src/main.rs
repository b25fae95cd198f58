#[cfg(feature = "cli")]
fn main() {
    use clap::Parser;
    use std::process::exit;

    env_logger::builder().format_timestamp(None).init();
    let cli = sqlfront::Cli::parse();

    if let Err(error) = cli.run() {
        eprintln!("{error:#}");
        exit(1)
    }
}

#[cfg(not(feature = "cli"))]
fn main() -> ! {
    panic!("cli feature not enabled")
}
