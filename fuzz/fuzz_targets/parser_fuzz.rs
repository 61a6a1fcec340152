#![no_main]
use libfuzzer_sys::fuzz_target;

const SUBCOMMANDS: [&str; 6] = ["encode", "decode", "c", "d", "info", "batch"];

fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };
    // First byte picks a subcommand, the rest become NUL-separated arguments.
    let mut args = vec![SUBCOMMANDS[usize::from(first) % SUBCOMMANDS.len()].to_string()];
    args.extend(
        rest.split(|&b| b == 0)
            .take(16)
            .map(|arg| String::from_utf8_lossy(arg).into_owned()),
    );
    difcodec::cli::fuzz_try_parse_args(&args);
});
