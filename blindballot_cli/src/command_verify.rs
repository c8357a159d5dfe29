use crate::config::Config;
use crate::keys::{load_public_key, parse_hex_arg};

pub fn command_verify(matches: &clap::ArgMatches, config: &Config) {
    let public_key = load_public_key(config, "verify");
    let signature = parse_hex_arg(matches, "SIGNATURE", "verify");
    // Unwrap is OK, MESSAGE is required
    let message = matches.value_of("MESSAGE").unwrap();

    match blindballot::verify(&signature, message.as_bytes(), &public_key) {
        Ok(true) => println!("valid"),
        Ok(false) => {
            println!("invalid");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("blindballot verify: {}", e);
            std::process::exit(1);
        }
    }
}
