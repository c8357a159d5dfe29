use crate::config::Config;
use crate::keys::{load_public_key, parse_hex_arg};

pub fn command_blind(matches: &clap::ArgMatches, config: &Config) {
    let public_key = load_public_key(config, "blind");
    // Unwrap is OK, MESSAGE is required
    let message = matches.value_of("MESSAGE").unwrap();

    let mut rng = rand::rngs::OsRng;
    let blinded = blindballot::blind(&mut rng, message.as_bytes(), &public_key)
        .unwrap_or_else(|e| {
            eprintln!("blindballot blind: {}", e);
            std::process::exit(1);
        });

    // Contains the blinding factor: keep this output, send only blinded_value to the signer
    let blinded = serde_json::to_string_pretty(&blinded).unwrap();
    println!("{}", blinded);
}

pub fn command_unblind(matches: &clap::ArgMatches, config: &Config) {
    let public_key = load_public_key(config, "unblind");
    let blind_signature = parse_hex_arg(matches, "BLIND-SIGNATURE", "unblind");
    let blinding_factor = parse_hex_arg(matches, "BLINDING-FACTOR", "unblind");

    match blindballot::unblind(&blind_signature, &blinding_factor, &public_key) {
        Ok(signature) => println!("{}", blindballot::integer_to_hex(&signature)),
        Err(e) => {
            eprintln!("blindballot unblind: {}", e);
            std::process::exit(1);
        }
    }
}
