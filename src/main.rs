fn main() {
    #[cfg(feature = "cli")]
    difcodec::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("difcodec: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
