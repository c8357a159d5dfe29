use crate::config::Config;
use crate::keys::{load_private_key, parse_hex_arg};

pub fn command_sign(matches: &clap::ArgMatches, config: &Config) {
    let private_key = load_private_key(config, "sign");
    let blinded_value = parse_hex_arg(matches, "BLINDED-VALUE", "sign");

    match blindballot::sign(&blinded_value, &private_key) {
        Ok(blind_signature) => println!("{}", blindballot::integer_to_hex(&blind_signature)),
        Err(e) => {
            eprintln!("blindballot sign: {}", e);
            std::process::exit(1);
        }
    }
}
